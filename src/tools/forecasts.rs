//! Forecasting tools
//!
//! Query the persistence window for a user, hand the records to the pure
//! forecasting core, and return its result. Nothing is cached; every call
//! refits from scratch.

use chrono::{Duration, Local, NaiveDate};

use crate::db::Database;
use crate::forecast::{
    average_daily_calories, extract_series, forecast_series, project_weight_bmi, MetricForecast,
    WeightBmiProjection,
};
use crate::models::{DailyLog, MealEntry, Metric, Profile};

use super::users::require_user;

fn window_start(today: NaiveDate, days: u32) -> String {
    (today - Duration::days(days as i64)).format("%Y-%m-%d").to_string()
}

/// Forecast a metric for a user. `None` when fewer than 3 values of the
/// metric were logged inside the window.
pub fn forecast_metric(
    db: &Database,
    username: &str,
    metric: Metric,
    past_days: u32,
    predict_days: u32,
) -> Result<Option<MetricForecast>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let today = Local::now().date_naive();
    let start = window_start(today, past_days);
    let logs = DailyLog::list_since(&conn, user.id, &start)
        .map_err(|e| format!("Failed to load daily logs: {}", e))?;

    let series = extract_series(&logs, metric);
    Ok(forecast_series(&series, today, predict_days))
}

/// Project weight and BMI for a user from the energy-balance estimate.
/// `None` without a profile or without any intake data in the window.
pub fn project_user_weight_bmi(
    db: &Database,
    username: &str,
    past_days: u32,
    predict_days: u32,
) -> Result<Option<WeightBmiProjection>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let profile = match Profile::get_by_user(&conn, user.id)
        .map_err(|e| format!("Failed to load profile: {}", e))?
    {
        Some(p) => p,
        None => return Ok(None),
    };

    let today = Local::now().date_naive();
    let start = window_start(today, past_days);
    let end = (today + Duration::days(1)).format("%Y-%m-%d").to_string();

    let meals = MealEntry::list_in_range(&conn, user.id, &start, &end)
        .map_err(|e| format!("Failed to load meal entries: {}", e))?;
    let logs = DailyLog::list_since(&conn, user.id, &start)
        .map_err(|e| format!("Failed to load daily logs: {}", e))?;

    let avg_calories = match average_daily_calories(&meals, &logs) {
        Some(avg) => avg,
        None => return Ok(None),
    };

    Ok(Some(project_weight_bmi(&profile, avg_calories, today, predict_days)))
}
