//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use super::{undefined, Series};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerSeries {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, stddev_mult: f64) -> BollingerSeries {
    let mut upper = undefined(closes.len());
    let mut middle = undefined(closes.len());
    let mut lower = undefined(closes.len());

    if period > 0 && closes.len() >= period {
        for i in (period - 1)..closes.len() {
            let window = &closes[i + 1 - period..=i];

            let mean: f64 = window.iter().sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|c| {
                    let diff = c - mean;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            let stddev = variance.sqrt();

            upper[i] = Some(mean + stddev_mult * stddev);
            middle[i] = Some(mean);
            lower[i] = Some(mean - stddev_mult * stddev);
        }
    }

    BollingerSeries {
        upper,
        middle,
        lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_warmup() {
        let series = calculate_bollinger(&[10.0, 20.0, 30.0, 40.0, 50.0], 3, 2.0);

        assert!(series.middle[0].is_none());
        assert!(series.middle[1].is_none());
        assert!(series.upper[1].is_none());
        assert!(series.lower[1].is_none());
        assert!(series.middle[2].is_some());
        assert!(series.middle[4].is_some());
    }

    #[test]
    fn bollinger_constant_values() {
        let series = calculate_bollinger(&[100.0; 5], 3, 2.0);

        assert_eq!(series.middle[2], Some(100.0));
        assert_eq!(series.upper[2], Some(100.0));
        assert_eq!(series.lower[2], Some(100.0));
    }

    #[test]
    fn bollinger_basic_calculation() {
        let series = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 2.0);

        let expected_middle: f64 = (10.0 + 20.0 + 30.0) / 3.0;
        let variance: f64 = ((10.0 - expected_middle).powi(2)
            + (20.0 - expected_middle).powi(2)
            + (30.0 - expected_middle).powi(2))
            / 3.0;
        let stddev = variance.sqrt();

        assert!((series.middle[2].unwrap() - expected_middle).abs() < 1e-10);
        assert!((series.upper[2].unwrap() - (expected_middle + 2.0 * stddev)).abs() < 1e-10);
        assert!((series.lower[2].unwrap() - (expected_middle - 2.0 * stddev)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_multiplier_variations() {
        let series = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 1.0);
        let stddev = (200.0_f64 / 3.0).sqrt();

        assert!((series.upper[2].unwrap() - (20.0 + stddev)).abs() < 1e-10);
        assert!((series.lower[2].unwrap() - (20.0 - stddev)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let series = calculate_bollinger(&[10.0, 20.0, 30.0], 3, 2.0);

        let upper_dist = series.upper[2].unwrap() - series.middle[2].unwrap();
        let lower_dist = series.middle[2].unwrap() - series.lower[2].unwrap();
        assert!((upper_dist - lower_dist).abs() < 1e-10);
    }

    #[test]
    fn bollinger_zero_period() {
        let series = calculate_bollinger(&[10.0, 20.0], 0, 2.0);
        assert_eq!(series.middle, vec![None, None]);
    }
}
