//! Evaluation tools
//!
//! Back-testing for the forecasting core: each call re-reads the user's
//! window, holds out the trailing test days and scores the fitted model.
//! "No result" is the normal outcome for new or sparse users, not an error.

use std::collections::BTreeMap;

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;

use crate::db::Database;
use crate::forecast::{
    aggregate_evaluations, evaluate_direction_series, evaluate_regression_series,
    evaluate_weight_projection, extract_series, prediction_series, DirectionReport,
    MetricEvaluation, OverallSummary, RegressionReport, WeightErrorReport,
};
use crate::models::{DailyLog, Metric};

use super::charts::{generate_evaluation_chart, ChartResponse};
use super::forecasts::project_user_weight_bmi;
use super::users::require_user;

/// Per-user evaluation across a metric set
#[derive(Debug, Serialize)]
pub struct UserEvaluation {
    pub username: String,
    pub metrics: BTreeMap<String, MetricEvaluation>,
    pub weight_bmi: Option<WeightErrorReport>,
}

fn load_series(
    db: &Database,
    username: &str,
    metric: Metric,
    window_days: u32,
) -> Result<Vec<crate::forecast::TrainingSample>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let today = Local::now().date_naive();
    let start = (today - Duration::days(window_days as i64))
        .format("%Y-%m-%d")
        .to_string();
    let logs = DailyLog::list_since(&conn, user.id, &start)
        .map_err(|e| format!("Failed to load daily logs: {}", e))?;

    Ok(extract_series(&logs, metric))
}

/// Regression evaluation for one metric
pub fn evaluate_regression(
    db: &Database,
    username: &str,
    metric: Metric,
    past_days: u32,
    test_days: u32,
) -> Result<Option<RegressionReport>, String> {
    let series = load_series(db, username, metric, past_days + test_days)?;
    Ok(evaluate_regression_series(&series, test_days as usize))
}

/// Direction-classification evaluation for one metric
pub fn evaluate_direction(
    db: &Database,
    username: &str,
    metric: Metric,
    past_days: u32,
    test_days: u32,
) -> Result<Option<DirectionReport>, String> {
    let series = load_series(db, username, metric, past_days + test_days)?;
    Ok(evaluate_direction_series(&series, test_days as usize))
}

/// Render the train/actual/predicted comparison chart for one metric.
/// `None` when the series cannot support the held-out window.
pub fn save_metric_chart(
    db: &Database,
    username: &str,
    metric: Metric,
    past_days: u32,
    test_days: u32,
    out_path: &str,
) -> Result<Option<ChartResponse>, String> {
    let series = load_series(db, username, metric, past_days + test_days)?;

    let (train, actual, predicted) = match prediction_series(&series, test_days as usize) {
        Some(parts) => parts,
        None => return Ok(None),
    };
    let accuracy = evaluate_direction_series(&series, test_days as usize).map(|d| d.accuracy);

    generate_evaluation_chart(
        metric.display_name(),
        &train,
        &actual,
        &predicted,
        accuracy,
        out_path,
        1000,
        400,
    )
    .map(Some)
}

/// Score the weight/BMI projection against weights actually logged in the
/// horizon window. `None` without a projection or without overlapping logs.
pub fn evaluate_weight_bmi(
    db: &Database,
    username: &str,
    past_days: u32,
    predict_days: u32,
) -> Result<Option<WeightErrorReport>, String> {
    let projection = match project_user_weight_bmi(db, username, past_days, predict_days)? {
        Some(p) => p,
        None => return Ok(None),
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let today = Local::now().date_naive();
    let start = today.format("%Y-%m-%d").to_string();
    let logs = DailyLog::list_since(&conn, user.id, &start)
        .map_err(|e| format!("Failed to load daily logs: {}", e))?;

    let horizon_end = today + Duration::days(predict_days as i64);
    let mut actual_by_date = BTreeMap::new();
    for log in &logs {
        if let (Some(weight), Ok(date)) = (
            log.weight_kg,
            NaiveDate::parse_from_str(&log.date, "%Y-%m-%d"),
        ) {
            if date < horizon_end {
                actual_by_date.insert(date.format("%m-%d").to_string(), weight);
            }
        }
    }

    Ok(evaluate_weight_projection(&projection, &actual_by_date))
}

/// Evaluate all requested metrics plus the weight/BMI projection for a user
pub fn evaluate_user(
    db: &Database,
    username: &str,
    metrics: &[Metric],
    past_days: u32,
    test_days: u32,
    predict_days: u32,
) -> Result<UserEvaluation, String> {
    let mut results = BTreeMap::new();

    for &metric in metrics {
        let regression = evaluate_regression(db, username, metric, past_days, test_days)?;
        let direction = evaluate_direction(db, username, metric, past_days, test_days)?;
        results.insert(
            metric.as_str().to_string(),
            MetricEvaluation {
                regression,
                direction_classification: direction,
            },
        );
    }

    let weight_bmi = evaluate_weight_bmi(db, username, past_days, predict_days)?;

    Ok(UserEvaluation {
        username: username.to_string(),
        metrics: results,
        weight_bmi,
    })
}

/// Aggregate performance across a metric set for one user
pub fn evaluate_overall(
    db: &Database,
    username: &str,
    metrics: &[Metric],
    past_days: u32,
    test_days: u32,
    _predict_days: u32,
) -> Result<OverallSummary, String> {
    let mut evaluations = Vec::with_capacity(metrics.len());

    for &metric in metrics {
        let regression = evaluate_regression(db, username, metric, past_days, test_days)?;
        let direction = evaluate_direction(db, username, metric, past_days, test_days)?;
        evaluations.push(MetricEvaluation {
            regression,
            direction_classification: direction,
        });
    }

    Ok(aggregate_evaluations(&evaluations))
}
