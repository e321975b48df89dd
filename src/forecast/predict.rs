//! Single-metric forecasting
//!
//! Fits the trend line over an extracted series and projects the next
//! `predict_days` index positions. Date labels are calendar offsets from
//! `today`, not from the index spacing: training indices may have skipped
//! days, but the projected future is labeled as contiguous days. That
//! asymmetry is deliberate and load-bearing for downstream display.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::linear::LinearModel;
use super::metrics::round_to;
use super::series::TrainingSample;

/// A metric forecast: parallel date labels and predicted values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricForecast {
    pub dates: Vec<String>,
    pub values: Vec<f64>,
}

/// Forecast the next `predict_days` values of a series. `None` when the
/// series is too short to fit.
pub fn forecast_series(
    samples: &[TrainingSample],
    today: NaiveDate,
    predict_days: u32,
) -> Option<MetricForecast> {
    let model = LinearModel::fit(samples)?;
    let last_index = samples.last()?.index;

    let mut dates = Vec::with_capacity(predict_days as usize);
    let mut values = Vec::with_capacity(predict_days as usize);

    for offset in 1..=predict_days as i64 {
        let index = last_index as f64 + offset as f64;
        let date = today + Duration::days(offset);
        dates.push(date.format("%m-%d").to_string());
        values.push(round_to(model.predict(index), 2));
    }

    Some(MetricForecast { dates, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Vec<TrainingSample> {
        values
            .iter()
            .enumerate()
            .map(|(index, &value)| TrainingSample { index, value })
            .collect()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_forecast_extends_trend() {
        // y = 100x + 1000 over indices 0..=4
        let samples = series(&[1000.0, 1100.0, 1200.0, 1300.0, 1400.0]);
        let forecast = forecast_series(&samples, day(2026, 3, 28), 3).unwrap();

        assert_eq!(forecast.values, vec![1500.0, 1600.0, 1700.0]);
        assert_eq!(forecast.dates, vec!["03-29", "03-30", "03-31"]);
    }

    #[test]
    fn test_forecast_returns_exact_horizon_length() {
        let samples = series(&[5.0, 6.0, 7.0, 8.0]);
        for horizon in [1u32, 7, 14, 30] {
            let forecast = forecast_series(&samples, day(2026, 1, 1), horizon).unwrap();
            assert_eq!(forecast.dates.len(), horizon as usize);
            assert_eq!(forecast.values.len(), horizon as usize);
        }
    }

    #[test]
    fn test_forecast_insufficient_data() {
        // Two valid samples are below the fit minimum
        let samples = series(&[5.0, 6.0]);
        assert!(forecast_series(&samples, day(2026, 1, 1), 7).is_none());
    }

    #[test]
    fn test_forecast_values_rounded() {
        let samples = series(&[1.0, 1.333, 1.666]);
        let forecast = forecast_series(&samples, day(2026, 1, 1), 2).unwrap();
        for v in forecast.values {
            assert_eq!(v, round_to(v, 2));
        }
    }

    #[test]
    fn test_forecast_dates_cross_month_boundary() {
        let samples = series(&[1.0, 2.0, 3.0]);
        let forecast = forecast_series(&samples, day(2026, 1, 31), 2).unwrap();
        assert_eq!(forecast.dates, vec!["02-01", "02-02"]);
    }
}
