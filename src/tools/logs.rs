//! Daily log tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{DailyLog, DailyLogUpsert};

use super::users::require_user;

/// Response for log_day
#[derive(Debug, Serialize)]
pub struct LogDayResponse {
    pub id: i64,
    pub username: String,
    pub date: String,
    pub updated_at: String,
}

/// Compact log row for listing
#[derive(Debug, Serialize)]
pub struct DailyLogSummary {
    pub id: i64,
    pub date: String,
    pub calories_intake: Option<f64>,
    pub steps: Option<i64>,
    pub sleep_hours: Option<f64>,
    pub weight_kg: Option<f64>,
    pub mood: String,
}

/// Response for list_daily_logs
#[derive(Debug, Serialize)]
pub struct ListDailyLogsResponse {
    pub logs: Vec<DailyLogSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Create or replace a user's log for one date
pub fn log_day(
    db: &Database,
    username: &str,
    data: DailyLogUpsert,
) -> Result<LogDayResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let log = DailyLog::upsert(&conn, user.id, &data)
        .map_err(|e| format!("Failed to save daily log: {}", e))?;

    Ok(LogDayResponse {
        id: log.id,
        username: username.to_string(),
        date: log.date,
        updated_at: log.updated_at,
    })
}

/// Get the full log for a user and date
pub fn get_daily_log(
    db: &Database,
    username: &str,
    date: &str,
) -> Result<Option<DailyLog>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    DailyLog::get_by_date(&conn, user.id, date)
        .map_err(|e| format!("Failed to load daily log: {}", e))
}

/// List a user's logs with optional range and pagination
pub fn list_daily_logs(
    db: &Database,
    username: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<ListDailyLogsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let logs = DailyLog::list(&conn, user.id, start_date, end_date, limit, offset)
        .map_err(|e| format!("Failed to list daily logs: {}", e))?;
    let total = DailyLog::count_for_user(&conn, user.id)
        .map_err(|e| format!("Failed to count daily logs: {}", e))?;

    let summaries = logs
        .into_iter()
        .map(|log| DailyLogSummary {
            id: log.id,
            date: log.date,
            calories_intake: log.calories_intake,
            steps: log.steps,
            sleep_hours: log.sleep_hours,
            weight_kg: log.weight_kg,
            mood: log.mood.as_str().to_string(),
        })
        .collect();

    Ok(ListDailyLogsResponse {
        logs: summaries,
        total,
        limit,
        offset,
    })
}
