//! CLI integration tests.
//!
//! Tests cover:
//! - Config parsing (build_strategy_config, build_data_request)
//! - Validation of real INI files on disk
//! - Backtest and optimize commands end to end over CSV fixtures
//! - Error variants surfaced for failures

mod common;

use clap::Parser;
use common::*;
use gridtrader::adapters::csv_adapter::CsvAdapter;
use gridtrader::adapters::file_config_adapter::FileConfigAdapter;
use gridtrader::cli::{self, Cli};
use gridtrader::domain::error::BacktestError;
use gridtrader::domain::optimizer::{CancelToken, Objective, OptimizableParam};
use gridtrader::domain::strategy::StrategyConfig;
use gridtrader::domain::timeframe::Timeframe;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn ini_for(dir: &Path, extra: &str) -> String {
    format!(
        r#"
[data]
dir = {}
symbol = SPY
timeframe = daily

[strategy]
use_bollinger = true
use_rsi = true
rsi_period = 14
slippage_bps = 5
{}
"#,
        dir.display(),
        extra
    )
}

fn run_cli(args: &[&str]) -> Result<(), BacktestError> {
    let mut argv = vec!["gridtrader"];
    argv.extend_from_slice(args);
    cli::execute(Cli::try_parse_from(argv).unwrap())
}

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_csv(dir.path(), "SPY", &oscillating_bars(300));
    dir
}

mod config_loading {
    use super::*;

    #[test]
    fn build_strategy_config_full() {
        let adapter = FileConfigAdapter::from_string(
            r#"
[strategy]
use_bollinger = false
use_rsi = true
use_macd = true
use_trend_filter = true
use_take_profit = false
use_momentum = true
rsi_period = 10
rsi_oversold = 25
rsi_overbought = 75
macd_fast = 8
macd_slow = 21
macd_signal = 5
bb_period = 15
bb_std_dev = 2.5
atr_period = 10
sma_fast = 20
sma_slow = 100
risk_pct = 2
stop_atr = 1.5
take_profit_atr = 4
commission = 1
slippage_bps = 10
"#,
        )
        .unwrap();
        let config = cli::build_strategy_config(&adapter);

        assert_eq!(
            config,
            StrategyConfig {
                use_bollinger: false,
                use_rsi: true,
                use_macd: true,
                use_trend_filter: true,
                use_take_profit: false,
                use_momentum: true,
                rsi_period: 10,
                rsi_oversold: 25.0,
                rsi_overbought: 75.0,
                macd_fast: 8,
                macd_slow: 21,
                macd_signal: 5,
                bb_period: 15,
                bb_std_dev: 2.5,
                atr_period: 10,
                sma_fast: 20,
                sma_slow: 100,
                risk_pct: 2.0,
                stop_atr: 1.5,
                take_profit_atr: 4.0,
                commission: 1.0,
                slippage_bps: 10.0,
            }
        );
    }

    #[test]
    fn build_data_request_parses_dates_and_timeframe() {
        let adapter = FileConfigAdapter::from_string(
            "[data]\ndir = /tmp/bars\nsymbol = QQQ\nstart_date = 2020-01-01\nend_date = 2021-06-30\ntimeframe = 1mo\n",
        )
        .unwrap();
        let request = cli::build_data_request(&adapter).unwrap();
        assert_eq!(request.symbol, "QQQ");
        assert_eq!(request.start_date, Some(date(2020, 1, 1)));
        assert_eq!(request.end_date, Some(date(2021, 6, 30)));
        assert_eq!(request.timeframe, Timeframe::Monthly);
    }

    #[test]
    fn build_data_request_rejects_bad_timeframe() {
        let adapter =
            FileConfigAdapter::from_string("[data]\nsymbol = QQQ\ntimeframe = 4h\n").unwrap();
        assert!(matches!(
            cli::build_data_request(&adapter),
            Err(BacktestError::UnknownTimeframe { .. })
        ));
    }

    #[test]
    fn build_optimize_request_reads_section() {
        let adapter = FileConfigAdapter::from_string(
            "[optimize]\nparam1 = bb_period\nrange1 = 15-25:5\nparam2 = stop_atr\nrange2 = 1.5-2\nobjective = alpha\n",
        )
        .unwrap();
        let request = cli::build_optimize_request(&adapter).unwrap();
        assert_eq!(request.param1, OptimizableParam::BbPeriod);
        assert_eq!(request.range1, vec![15.0, 20.0, 25.0]);
        assert_eq!(request.param2, OptimizableParam::StopAtr);
        assert_eq!(request.range2, vec![1.5, 2.0]);
        assert_eq!(request.objective, Objective::Alpha);
    }

    #[test]
    fn load_config_missing_file() {
        let err = cli::load_config(&"/nonexistent/gridtrader.ini".into()).unwrap_err();
        assert!(matches!(err, BacktestError::ConfigParse { .. }));
    }
}

mod commands {
    use super::*;

    #[test]
    fn validate_accepts_good_config() {
        let dir = data_dir();
        let ini = write_temp_ini(&ini_for(dir.path(), ""));
        let code = run_cli(&["validate", "-c", ini.path().to_str().unwrap()]);
        assert!(code.is_ok(), "{:?}", code);
    }

    #[test]
    fn validate_rejects_bad_strategy() {
        let dir = data_dir();
        let ini = write_temp_ini(&ini_for(dir.path(), "risk_pct = 0"));
        let code = run_cli(&["validate", "-c", ini.path().to_str().unwrap()]);
        assert!(matches!(code, Err(BacktestError::ConfigInvalid { key, .. }) if key == "risk_pct"));
    }

    #[test]
    fn backtest_runs_over_csv() {
        let dir = data_dir();
        let ini = write_temp_ini(&ini_for(dir.path(), ""));
        let code = run_cli(&["backtest", "-c", ini.path().to_str().unwrap(), "--trades"]);
        assert!(code.is_ok(), "{:?}", code);
    }

    #[test]
    fn backtest_weekly_override() {
        let dir = data_dir();
        let ini = write_temp_ini(&ini_for(dir.path(), ""));
        let code = run_cli(&[
            "backtest",
            "-c",
            ini.path().to_str().unwrap(),
            "--timeframe",
            "weekly",
        ]);
        assert!(code.is_ok(), "{:?}", code);
    }

    #[test]
    fn backtest_missing_symbol_is_data_error() {
        let dir = data_dir();
        let ini = write_temp_ini(&ini_for(dir.path(), ""));
        let code = run_cli(&[
            "backtest",
            "-c",
            ini.path().to_str().unwrap(),
            "--symbol",
            "NOPE",
        ]);
        assert!(matches!(code, Err(BacktestError::Data { .. })));
    }

    #[test]
    fn optimize_one_parameter() {
        let dir = data_dir();
        let ini = write_temp_ini(&ini_for(dir.path(), ""));
        let code = run_cli(&[
            "optimize",
            "-c",
            ini.path().to_str().unwrap(),
            "--param1",
            "rsi_period",
            "--range1",
            "10-16:3",
            "--objective",
            "cagr",
        ]);
        assert!(code.is_ok(), "{:?}", code);
    }

    #[test]
    fn optimize_two_parameters_from_ini() {
        let dir = data_dir();
        let ini = write_temp_ini(&format!(
            "{}\n[optimize]\nparam1 = bb_period\nrange1 = 15-25:5\nparam2 = stop_atr\nrange2 = 1.5-2.5:0.5\nobjective = win_rate\n",
            ini_for(dir.path(), "")
        ));
        let code = run_cli(&["optimize", "-c", ini.path().to_str().unwrap()]);
        assert!(code.is_ok(), "{:?}", code);
    }

    #[test]
    fn optimize_with_weekly_config_sweeps_daily_bars() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "SPY", &oscillating_bars(600));
        let sweep = "\n[optimize]\nparam1 = rsi_period\nrange1 = 10-14:2\nobjective = cagr\n";

        let grid_for = |timeframe: &str| {
            let ini = ini_for(dir.path(), "").replace("timeframe = daily", timeframe);
            let adapter = FileConfigAdapter::from_string(&format!("{}{}", ini, sweep)).unwrap();
            cli::run_optimize_pipeline(
                &CsvAdapter::new(dir.path().to_path_buf()),
                &cli::build_strategy_config(&adapter),
                &cli::build_data_request(&adapter).unwrap(),
                &cli::build_optimize_request(&adapter).unwrap(),
                &CancelToken::new(),
            )
            .unwrap()
        };

        let daily = grid_for("timeframe = daily");
        let weekly = grid_for("timeframe = weekly");
        assert_eq!(weekly.grid, daily.grid);
        assert_eq!(
            weekly.best.map(|b| (b.value1, b.score)),
            daily.best.map(|b| (b.value1, b.score))
        );

        let ini = write_temp_ini(&format!(
            "{}{}",
            ini_for(dir.path(), "").replace("timeframe = daily", "timeframe = weekly"),
            sweep
        ));
        let code = run_cli(&["optimize", "-c", ini.path().to_str().unwrap()]);
        assert!(code.is_ok(), "{:?}", code);
    }

    #[test]
    fn optimize_unknown_parameter_fails_fast() {
        let dir = data_dir();
        let ini = write_temp_ini(&ini_for(dir.path(), ""));
        let code = run_cli(&[
            "optimize",
            "-c",
            ini.path().to_str().unwrap(),
            "--param1",
            "lookback",
            "--range1",
            "1-5",
        ]);
        assert!(matches!(code, Err(BacktestError::UnknownParameter { .. })));
    }

    #[test]
    fn optimize_invalid_range_fails() {
        let dir = data_dir();
        let ini = write_temp_ini(&ini_for(dir.path(), ""));
        let code = run_cli(&[
            "optimize",
            "-c",
            ini.path().to_str().unwrap(),
            "--param1",
            "rsi_period",
            "--range1",
            "abc",
        ]);
        assert!(matches!(code, Err(BacktestError::InvalidRange { .. })));
    }

    #[test]
    fn list_symbols_reads_data_dir() {
        let dir = data_dir();
        write_csv(dir.path(), "QQQ", &oscillating_bars(10));
        let ini = write_temp_ini(&ini_for(dir.path(), ""));
        let code = run_cli(&["list-symbols", "-c", ini.path().to_str().unwrap()]);
        assert!(code.is_ok(), "{:?}", code);
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let code = run_cli(&["backtest", "-c", "/nonexistent/gridtrader.ini"]);
        assert!(matches!(code, Err(BacktestError::ConfigParse { .. })));
    }
}
