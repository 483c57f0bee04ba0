//! Command-line interface.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestResult, INITIAL_CAPITAL};
use crate::domain::config_validation::{
    parse_config_date, validate_data_config, validate_optimize_config, validate_strategy_config,
};
use crate::domain::error::BacktestError;
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::metrics::{pair_trades, Metrics};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::optimizer::{
    run_optimization, CancelToken, Objective, OptimizableParam, OptimizationResult,
};
use crate::domain::range_spec::parse_range_spec;
use crate::domain::strategy::StrategyConfig;
use crate::domain::timeframe::{resample, Timeframe};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

/// Fewest bars a simulation can run on.
const MIN_BARS: usize = 2;

#[derive(Parser, Debug)]
#[command(name = "gridtrader", about = "Single-asset backtester and grid optimizer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        timeframe: Option<String>,
        /// Print every executed trade
        #[arg(long)]
        trades: bool,
    },
    /// Grid-search one or two strategy parameters
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        param1: Option<String>,
        #[arg(long)]
        range1: Option<String>,
        #[arg(long)]
        param2: Option<String>,
        #[arg(long)]
        range2: Option<String>,
        #[arg(long)]
        objective: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute(cli: Cli) -> Result<(), BacktestError> {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            timeframe,
            trades,
        } => run_backtest_command(&config, symbol.as_deref(), timeframe.as_deref(), trades),
        Command::Optimize {
            config,
            symbol,
            param1,
            range1,
            param2,
            range2,
            objective,
        } => {
            let overrides = [
                ("param1", param1),
                ("range1", range1),
                ("param2", param2),
                ("range2", range2),
                ("objective", objective),
            ];
            run_optimize_command(&config, symbol.as_deref(), &overrides)
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, BacktestError> {
    info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Strategy parameters from `[strategy]`, defaults for anything missing.
pub fn build_strategy_config(adapter: &dyn ConfigPort) -> StrategyConfig {
    let d = StrategyConfig::default();
    let period = |key: &str, default: usize| {
        adapter
            .get_int("strategy", key, default as i64)
            .try_into()
            .unwrap_or(default)
    };
    let value = |key: &str, default: f64| adapter.get_double("strategy", key, default);
    let toggle = |key: &str, default: bool| adapter.get_bool("strategy", key, default);

    StrategyConfig {
        use_bollinger: toggle("use_bollinger", d.use_bollinger),
        use_rsi: toggle("use_rsi", d.use_rsi),
        use_macd: toggle("use_macd", d.use_macd),
        use_trend_filter: toggle("use_trend_filter", d.use_trend_filter),
        use_take_profit: toggle("use_take_profit", d.use_take_profit),
        use_momentum: toggle("use_momentum", d.use_momentum),
        rsi_period: period("rsi_period", d.rsi_period),
        rsi_oversold: value("rsi_oversold", d.rsi_oversold),
        rsi_overbought: value("rsi_overbought", d.rsi_overbought),
        macd_fast: period("macd_fast", d.macd_fast),
        macd_slow: period("macd_slow", d.macd_slow),
        macd_signal: period("macd_signal", d.macd_signal),
        bb_period: period("bb_period", d.bb_period),
        bb_std_dev: value("bb_std_dev", d.bb_std_dev),
        atr_period: period("atr_period", d.atr_period),
        sma_fast: period("sma_fast", d.sma_fast),
        sma_slow: period("sma_slow", d.sma_slow),
        risk_pct: value("risk_pct", d.risk_pct),
        stop_atr: value("stop_atr", d.stop_atr),
        take_profit_atr: value("take_profit_atr", d.take_profit_atr),
        commission: value("commission", d.commission),
        slippage_bps: value("slippage_bps", d.slippage_bps),
    }
}

/// Where and what to load, from `[data]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub dir: PathBuf,
    pub symbol: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub timeframe: Timeframe,
}

pub fn build_data_request(adapter: &dyn ConfigPort) -> Result<DataRequest, BacktestError> {
    let symbol = adapter
        .get_string("data", "symbol")
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| BacktestError::ConfigMissing {
            section: "data".into(),
            key: "symbol".into(),
        })?;
    let timeframe = match adapter.get_string("data", "timeframe") {
        Some(s) => s.parse()?,
        None => Timeframe::default(),
    };

    Ok(DataRequest {
        dir: PathBuf::from(adapter.get_string("data", "dir").unwrap_or_else(|| ".".into())),
        symbol: symbol.trim().to_string(),
        start_date: parse_config_date(adapter, "start_date")?,
        end_date: parse_config_date(adapter, "end_date")?,
        timeframe,
    })
}

/// Fetch, resample and size-check the bars for a request.
pub fn load_bars(
    data_port: &dyn DataPort,
    request: &DataRequest,
) -> Result<Vec<OhlcvBar>, BacktestError> {
    let daily = data_port.fetch_ohlcv(&request.symbol, request.start_date, request.end_date)?;
    let bars = resample(&daily, request.timeframe);
    info!(
        "loaded {} {} bars for {} ({} daily)",
        bars.len(),
        request.timeframe,
        request.symbol,
        daily.len()
    );

    if bars.len() < MIN_BARS {
        return Err(BacktestError::InsufficientData {
            symbol: request.symbol.clone(),
            bars: bars.len(),
            minimum: MIN_BARS,
        });
    }
    Ok(bars)
}

/// Load and validate config with CLI overrides applied.
fn prepare(
    config_path: &PathBuf,
    overrides: &[(&str, &str, Option<&str>)],
) -> Result<(FileConfigAdapter, StrategyConfig, DataRequest), BacktestError> {
    let mut adapter = load_config(config_path)?;
    for (section, key, value) in overrides {
        if let Some(value) = value {
            adapter.set(section, key, value);
        }
    }

    validate_data_config(&adapter)?;
    validate_strategy_config(&adapter)?;

    let strategy = build_strategy_config(&adapter);
    let request = build_data_request(&adapter)?;
    Ok((adapter, strategy, request))
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &StrategyConfig,
    request: &DataRequest,
) -> Result<BacktestResult, BacktestError> {
    let bars = load_bars(data_port, request)?;

    info!("computing indicators");
    let indicators = compute_indicators(&bars, strategy);

    info!("running backtest: {} to {}", bars[0].date, bars[bars.len() - 1].date);
    let result = run_backtest(&bars, &indicators, strategy, request.timeframe);
    info!(
        "{} signals, {} trades",
        result.signals.len(),
        result.trades.len()
    );
    Ok(result)
}

fn run_backtest_command(
    config_path: &PathBuf,
    symbol: Option<&str>,
    timeframe: Option<&str>,
    show_trades: bool,
) -> Result<(), BacktestError> {
    let (_, strategy, request) = prepare(
        config_path,
        &[("data", "symbol", symbol), ("data", "timeframe", timeframe)],
    )?;

    let data_port = CsvAdapter::new(request.dir.clone());
    let result = run_backtest_pipeline(&data_port, &strategy, &request)?;

    println!("=== {} ({}) ===", request.symbol, request.timeframe);
    print_metrics(&result.metrics);
    if show_trades {
        print_trades(&result);
    }
    Ok(())
}

/// What to sweep, from `[optimize]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeRequest {
    pub param1: OptimizableParam,
    pub range1: Vec<f64>,
    pub param2: OptimizableParam,
    pub range2: Vec<f64>,
    pub objective: Objective,
}

pub fn build_optimize_request(
    adapter: &dyn ConfigPort,
) -> Result<OptimizeRequest, BacktestError> {
    let param = |key: &str| -> Result<OptimizableParam, BacktestError> {
        match adapter.get_string("optimize", key) {
            Some(s) if !s.trim().is_empty() => s.parse(),
            _ => Ok(OptimizableParam::None),
        }
    };
    let range = |key: &str| {
        adapter
            .get_string("optimize", key)
            .map(|s| parse_range_spec(&s))
            .unwrap_or_default()
    };

    Ok(OptimizeRequest {
        param1: param("param1")?,
        range1: range("range1"),
        param2: param("param2")?,
        range2: range("range2"),
        objective: match adapter.get_string("optimize", "objective") {
            Some(s) => s.parse()?,
            None => Objective::default(),
        },
    })
}

/// Sweep on daily bars; the `[data]` timeframe only applies to backtests.
pub fn run_optimize_pipeline(
    data_port: &dyn DataPort,
    strategy: &StrategyConfig,
    request: &DataRequest,
    optimize: &OptimizeRequest,
    cancel: &CancelToken,
) -> Result<OptimizationResult, BacktestError> {
    if request.timeframe != Timeframe::Daily {
        info!("optimizing on daily bars, ignoring {} timeframe", request.timeframe);
    }
    let daily = DataRequest {
        timeframe: Timeframe::Daily,
        ..request.clone()
    };
    let bars = load_bars(data_port, &daily)?;

    run_optimization(
        &bars,
        strategy,
        optimize.param1,
        &optimize.range1,
        optimize.param2,
        &optimize.range2,
        optimize.objective,
        cancel,
    )
}

fn run_optimize_command(
    config_path: &PathBuf,
    symbol: Option<&str>,
    overrides: &[(&str, Option<String>)],
) -> Result<(), BacktestError> {
    let mut all: Vec<(&str, &str, Option<&str>)> = vec![("data", "symbol", symbol)];
    all.extend(
        overrides
            .iter()
            .map(|(key, value)| ("optimize", *key, value.as_deref())),
    );

    let (adapter, strategy, request) = prepare(config_path, &all)?;
    validate_optimize_config(&adapter)?;
    let optimize = build_optimize_request(&adapter)?;

    let data_port = CsvAdapter::new(request.dir.clone());
    let result = run_optimize_pipeline(
        &data_port,
        &strategy,
        &request,
        &optimize,
        &CancelToken::new(),
    )?;

    println!("=== {} optimize {} by {} ===", request.symbol, optimize.param1, optimize.objective);
    print_grid(&result);
    match &result.best {
        Some(best) => {
            println!();
            match best.value2 {
                Some(v2) => println!(
                    "Best: {}={} {}={} score {:.4}",
                    result.param1, best.value1, result.param2, v2, best.score
                ),
                None => println!("Best: {}={} score {:.4}", result.param1, best.value1, best.score),
            }
            print_metrics(&best.result.metrics);
        }
        None => println!("\nNo cell produced enough round trips to score."),
    }
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> Result<(), BacktestError> {
    let adapter = load_config(config_path)?;
    validate_data_config(&adapter)?;
    validate_strategy_config(&adapter)?;
    if adapter.get_string("optimize", "param1").is_some() {
        validate_optimize_config(&adapter)?;
    }
    println!("Config validated successfully");
    Ok(())
}

fn run_list_symbols(config_path: &PathBuf) -> Result<(), BacktestError> {
    let adapter = load_config(config_path)?;
    let dir = adapter.get_string("data", "dir").unwrap_or_else(|| ".".into());
    let symbols = CsvAdapter::new(PathBuf::from(&dir)).list_symbols()?;
    if symbols.is_empty() {
        println!("No symbols found in {}", dir);
    }
    for symbol in symbols {
        println!("{}", symbol);
    }
    Ok(())
}

fn print_metrics(m: &Metrics) {
    println!("Initial Capital:  {:.2}", INITIAL_CAPITAL);
    println!("Final Equity:     {:.2}", m.final_equity);
    println!("Total Return:     {:.2}%", m.total_return_pct);
    println!("CAGR:             {:.2}%", m.cagr_pct);
    println!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    println!("Sortino Ratio:    {:.2}", m.sortino_ratio);
    println!("Calmar Ratio:     {:.2}", m.calmar_ratio);
    println!("Max Drawdown:     -{:.2}%", m.max_drawdown_pct);
    println!("Total Trades:     {}", m.total_trades);
    println!("Win Rate:         {:.1}% ({}W / {}L)", m.win_rate, m.wins, m.losses);
    println!("Avg Win / Loss:   {:.2}% / {:.2}%", m.avg_win_pct, m.avg_loss_pct);
    println!("Profit Factor:    {:.2}", m.profit_factor);
    println!(
        "Max Streaks:      {} wins, {} losses",
        m.max_consec_wins, m.max_consec_losses
    );
    println!("Exposure:         {:.1}%", m.exposure_pct);
}

fn print_trades(result: &BacktestResult) {
    println!("\n=== Trades ===");
    for trade in &result.trades {
        println!(
            "{}  {:?}  {:>8} @ {:>10.4}  {}",
            trade.date, trade.kind, trade.shares, trade.price, trade.reason
        );
    }

    println!("\n=== Round Trips ===");
    for rt in pair_trades(&result.trades) {
        println!(
            "{} -> {}  {:>8}  {:>+8.2}%  {:>+12.2}  {}",
            rt.entry_date,
            rt.exit_date,
            rt.shares,
            rt.return_pct(),
            rt.pnl(),
            rt.exit_reason
        );
    }
}

fn print_grid(result: &OptimizationResult) {
    let scored = result.grid.iter().flatten().filter(|s| s.is_some()).count();
    println!("{} of {} cells scored", scored, result.cell_count());

    let cell = |score: Option<f64>| match score {
        Some(s) => format!("{:>10.4}", s),
        None => format!("{:>10}", "-"),
    };

    if result.values2.is_empty() {
        println!("{:>10}  {:>10}", result.param1.name(), "score");
        for (v1, row) in result.values1.iter().zip(&result.grid) {
            println!("{:>10}  {}", v1, cell(row[0]));
        }
        return;
    }

    let header: String = result
        .values2
        .iter()
        .map(|v| format!("{:>10}", v))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "{:>10}  {}   ({} across)",
        result.param1.name(),
        header,
        result.param2.name()
    );
    for (v1, row) in result.values1.iter().zip(&result.grid) {
        let cells: Vec<String> = row.iter().map(|&s| cell(s)).collect();
        println!("{:>10}  {}", v1, cells.join(" "));
    }
}
