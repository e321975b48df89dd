//! Forecast evaluation
//!
//! Holds out the trailing `test_days` samples of a series, fits the trend
//! line on the remainder, and scores the predictions two ways: regression
//! error (R², MAE, RMSE) and direction classification (did the forecast call
//! up-vs-down correctly relative to the last training value). Both run over
//! the identical split; callers usually report them side by side.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::linear::LinearModel;
use super::metrics::{
    accuracy_score, binarize, f1_score, mean_absolute_error, mean_absolute_percentage_error,
    precision_score, r2_score, recall_score, root_mean_squared_error, round_to,
};
use super::series::TrainingSample;
use crate::forecast::energy::WeightBmiProjection;

/// Regression error report for one (user, metric, window)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
    pub mape: f64,
}

/// Direction-classification report for one (user, metric, window)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Both evaluation views for one metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEvaluation {
    pub regression: Option<RegressionReport>,
    pub direction_classification: Option<DirectionReport>,
}

/// Weight-projection error against actually-logged weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightErrorReport {
    pub mae: f64,
    pub rmse: f64,
}

/// Averaged regression errors across metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionAverages {
    pub avg_mae: Option<f64>,
    pub avg_rmse: Option<f64>,
}

/// Averaged classification scores across metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationAverages {
    pub avg_accuracy: Option<f64>,
    pub avg_precision: Option<f64>,
    pub avg_recall: Option<f64>,
    pub avg_f1: Option<f64>,
}

/// Aggregated performance summary across a metric set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallSummary {
    pub metrics_evaluated: usize,
    pub regression: Option<RegressionAverages>,
    pub classification: Option<ClassificationAverages>,
}

/// Positional train/test split; `None` when the series cannot support the
/// held-out window plus the fit minimum.
fn split_series(
    samples: &[TrainingSample],
    test_days: usize,
) -> Option<(&[TrainingSample], &[TrainingSample])> {
    if test_days == 0 || samples.len() < test_days + 3 {
        return None;
    }
    Some(samples.split_at(samples.len() - test_days))
}

/// Train values plus held-out actual/predicted pairs, for comparison charts
pub fn prediction_series(
    samples: &[TrainingSample],
    test_days: usize,
) -> Option<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let (train, test) = split_series(samples, test_days)?;
    let model = LinearModel::fit(train)?;

    let train_values = train.iter().map(|s| s.value).collect();
    let actual = test.iter().map(|s| s.value).collect();
    let predicted = test.iter().map(|s| model.predict(s.index as f64)).collect();
    Some((train_values, actual, predicted))
}

/// Regression evaluation over an extracted series
pub fn evaluate_regression_series(
    samples: &[TrainingSample],
    test_days: usize,
) -> Option<RegressionReport> {
    let (train, test) = split_series(samples, test_days)?;
    let model = LinearModel::fit(train)?;

    let actual: Vec<f64> = test.iter().map(|s| s.value).collect();
    let predicted: Vec<f64> = test.iter().map(|s| model.predict(s.index as f64)).collect();

    Some(RegressionReport {
        r2: round_to(r2_score(&actual, &predicted), 3),
        mae: round_to(mean_absolute_error(&actual, &predicted), 3),
        rmse: round_to(root_mean_squared_error(&actual, &predicted), 3),
        mape: round_to(mean_absolute_percentage_error(&actual, &predicted), 3),
    })
}

/// Direction-classification evaluation over an extracted series
pub fn evaluate_direction_series(
    samples: &[TrainingSample],
    test_days: usize,
) -> Option<DirectionReport> {
    let (train, test) = split_series(samples, test_days)?;
    let model = LinearModel::fit(train)?;

    let last_train_value = train.last()?.value;
    let actual: Vec<f64> = test.iter().map(|s| s.value).collect();
    let predicted: Vec<f64> = test.iter().map(|s| model.predict(s.index as f64)).collect();

    let actual_bin = binarize(&actual, last_train_value);
    let predicted_bin = binarize(&predicted, last_train_value);

    Some(DirectionReport {
        accuracy: round_to(accuracy_score(&actual_bin, &predicted_bin), 4),
        precision: round_to(precision_score(&actual_bin, &predicted_bin), 4),
        recall: round_to(recall_score(&actual_bin, &predicted_bin), 4),
        f1: round_to(f1_score(&actual_bin, &predicted_bin), 4),
    })
}

/// Score a weight projection against weights logged on the matching dates.
/// `None` when no projected date has a logged weight.
pub fn evaluate_weight_projection(
    projection: &WeightBmiProjection,
    actual_by_date: &BTreeMap<String, f64>,
) -> Option<WeightErrorReport> {
    let mut actual = Vec::new();
    let mut predicted = Vec::new();

    for (date, &w) in projection.dates.iter().zip(&projection.weight) {
        if let Some(&logged) = actual_by_date.get(date) {
            actual.push(logged);
            predicted.push(w);
        }
    }

    if actual.is_empty() {
        return None;
    }

    Some(WeightErrorReport {
        mae: round_to(mean_absolute_error(&actual, &predicted), 2),
        rmse: round_to(root_mean_squared_error(&actual, &predicted), 2),
    })
}

/// Average both evaluation views across metrics. A metric counts towards
/// `metrics_evaluated` when either view produced a result; each average only
/// includes the metrics that produced that view. With no results at all the
/// regression/classification fields stay absent.
pub fn aggregate_evaluations(evaluations: &[MetricEvaluation]) -> OverallSummary {
    let mut maes = Vec::new();
    let mut rmses = Vec::new();
    let mut accs = Vec::new();
    let mut precs = Vec::new();
    let mut recs = Vec::new();
    let mut f1s = Vec::new();
    let mut counted = 0;

    for eval in evaluations {
        if eval.regression.is_none() && eval.direction_classification.is_none() {
            continue;
        }
        counted += 1;

        if let Some(ref reg) = eval.regression {
            maes.push(reg.mae);
            rmses.push(reg.rmse);
        }
        if let Some(ref cls) = eval.direction_classification {
            accs.push(cls.accuracy);
            precs.push(cls.precision);
            recs.push(cls.recall);
            f1s.push(cls.f1);
        }
    }

    let avg = |values: &[f64]| -> Option<f64> {
        if values.is_empty() {
            None
        } else {
            Some(round_to(values.iter().sum::<f64>() / values.len() as f64, 4))
        }
    };

    let regression = if maes.is_empty() && rmses.is_empty() {
        None
    } else {
        Some(RegressionAverages {
            avg_mae: avg(&maes),
            avg_rmse: avg(&rmses),
        })
    };

    let classification = if accs.is_empty() {
        None
    } else {
        Some(ClassificationAverages {
            avg_accuracy: avg(&accs),
            avg_precision: avg(&precs),
            avg_recall: avg(&recs),
            avg_f1: avg(&f1s),
        })
    };

    OverallSummary {
        metrics_evaluated: counted,
        regression,
        classification,
    }
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

    #[test]
    fn test_regression_below_minimum_is_none() {
        // test_days + 3 = 6 samples required
        let samples = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(evaluate_regression_series(&samples, 3).is_none());
        assert!(evaluate_direction_series(&samples, 3).is_none());

        let enough = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert!(evaluate_regression_series(&enough, 3).is_some());
        assert!(evaluate_direction_series(&enough, 3).is_some());
    }

    #[test]
    fn test_regression_on_exact_line() {
        // Perfectly linear series: held-out predictions are exact
        let samples = series(&[10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 22.0]);
        let report = evaluate_regression_series(&samples, 3).unwrap();
        assert_eq!(report.r2, 1.0);
        assert_eq!(report.mae, 0.0);
        assert_eq!(report.rmse, 0.0);
    }

    #[test]
    fn test_direction_on_rising_series() {
        // Rising line: every test value and prediction exceeds the last
        // training value, so every score is perfect
        let samples = series(&[10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 22.0]);
        let report = evaluate_direction_series(&samples, 3).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.precision, 1.0);
        assert_eq!(report.recall, 1.0);
        assert_eq!(report.f1, 1.0);
    }

    #[test]
    fn test_direction_on_falling_series_scores_zero_not_error() {
        // Falling line: nothing exceeds the last training value, so both
        // label vectors are all-zero. Precision/recall/f1 degrade to 0.0
        // while accuracy is perfect.
        let samples = series(&[22.0, 20.0, 18.0, 16.0, 14.0, 12.0, 10.0]);
        let report = evaluate_direction_series(&samples, 3).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.precision, 0.0);
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.f1, 0.0);
    }

    #[test]
    fn test_split_is_positional() {
        // 8 samples, test_days 2: train on first 6, test on last 2
        let samples = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 100.0, 200.0]);
        let report = evaluate_regression_series(&samples, 2).unwrap();
        // Model fit on the linear prefix predicts 7.0 and 8.0
        assert!((report.mae - ((100.0 - 7.0) + (200.0 - 8.0)) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_weight_projection_scoring() {
        let projection = WeightBmiProjection {
            dates: vec!["03-02".into(), "03-03".into(), "03-04".into()],
            weight: vec![70.0, 70.1, 70.2],
            height: vec![175.0; 3],
            bmi: vec![22.86; 3],
        };

        let mut actual = BTreeMap::new();
        actual.insert("03-02".to_string(), 70.5);
        actual.insert("03-04".to_string(), 70.2);

        let report = evaluate_weight_projection(&projection, &actual).unwrap();
        assert_eq!(report.mae, 0.25);

        let empty = BTreeMap::new();
        assert!(evaluate_weight_projection(&projection, &empty).is_none());
    }

    #[test]
    fn test_aggregate_single_metric() {
        let evals = vec![MetricEvaluation {
            regression: Some(RegressionReport { r2: 0.9, mae: 500.0, rmse: 700.0, mape: 6.2 }),
            direction_classification: None,
        }];

        let summary = aggregate_evaluations(&evals);
        assert_eq!(summary.metrics_evaluated, 1);
        let reg = summary.regression.unwrap();
        assert_eq!(reg.avg_mae, Some(500.0));
        assert_eq!(reg.avg_rmse, Some(700.0));
        assert!(summary.classification.is_none());
    }

    #[test]
    fn test_aggregate_partial_results_count_once() {
        let evals = vec![
            MetricEvaluation {
                regression: Some(RegressionReport { r2: 0.5, mae: 100.0, rmse: 150.0, mape: 4.0 }),
                direction_classification: Some(DirectionReport {
                    accuracy: 0.8,
                    precision: 0.6,
                    recall: 0.7,
                    f1: 0.65,
                }),
            },
            MetricEvaluation {
                regression: None,
                direction_classification: Some(DirectionReport {
                    accuracy: 0.6,
                    precision: 0.4,
                    recall: 0.5,
                    f1: 0.45,
                }),
            },
            MetricEvaluation {
                regression: None,
                direction_classification: None,
            },
        ];

        let summary = aggregate_evaluations(&evals);
        assert_eq!(summary.metrics_evaluated, 2);

        let reg = summary.regression.unwrap();
        assert_eq!(reg.avg_mae, Some(100.0));

        let cls = summary.classification.unwrap();
        assert_eq!(cls.avg_accuracy, Some(0.7));
        assert_eq!(cls.avg_precision, Some(0.5));
    }

    #[test]
    fn test_aggregate_empty_has_absent_fields() {
        let summary = aggregate_evaluations(&[]);
        assert_eq!(summary.metrics_evaluated, 0);
        assert!(summary.regression.is_none());
        assert!(summary.classification.is_none());
    }
}
