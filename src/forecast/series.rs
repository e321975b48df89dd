//! Time-series extraction
//!
//! Turns a user's date-ordered daily logs into (index, value) training pairs
//! for one metric. Logs without a value for the metric are skipped and do not
//! consume an index slot: the index is the rank among present values, not a
//! calendar position.

use crate::models::{DailyLog, Metric};

/// One supervised training pair: rank in the series and the metric value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSample {
    pub index: usize,
    pub value: f64,
}

/// Extract the training series for a metric from date-ascending logs
pub fn extract_series(logs: &[DailyLog], metric: Metric) -> Vec<TrainingSample> {
    logs.iter()
        .filter_map(|log| metric.value(log))
        .enumerate()
        .map(|(index, value)| TrainingSample { index, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mood;

    fn log(date: &str, steps: Option<i64>, sleep: Option<f64>) -> DailyLog {
        DailyLog {
            id: 0,
            user_id: 1,
            date: date.to_string(),
            calories_intake: None,
            protein_g: None,
            carbs_g: None,
            fats_g: None,
            water_intake_l: None,
            steps,
            exercise_duration_min: None,
            exercise_type: None,
            sleep_hours: sleep,
            weight_kg: None,
            heart_rate: None,
            blood_pressure_sys: None,
            blood_pressure_dia: None,
            mood: Mood::Okay,
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_extract_skips_missing_without_index_gap() {
        let logs = vec![
            log("2026-01-01", Some(5000), None),
            log("2026-01-02", None, Some(7.0)),
            log("2026-01-03", Some(6000), None),
        ];

        let series = extract_series(&logs, Metric::Steps);
        assert_eq!(series.len(), 2);
        // The skipped middle log must not leave a hole in the indices
        assert_eq!(series[0], TrainingSample { index: 0, value: 5000.0 });
        assert_eq!(series[1], TrainingSample { index: 1, value: 6000.0 });
    }

    #[test]
    fn test_extract_empty_when_metric_never_logged() {
        let logs = vec![
            log("2026-01-01", Some(5000), None),
            log("2026-01-02", Some(5100), None),
        ];

        assert!(extract_series(&logs, Metric::SleepHours).is_empty());
        assert!(extract_series(&[], Metric::Steps).is_empty());
    }
}
