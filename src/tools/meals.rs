//! Meal entry tools

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::Database;
use crate::models::{date_part, MealEntry, MealEntryCreate};

use super::users::require_user;

/// Response for log_meal
#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub id: i64,
    pub username: String,
    pub meal_type: String,
    pub calories: f64,
    pub created_at: String,
}

/// Response for list_meals
#[derive(Debug, Serialize)]
pub struct ListMealsResponse {
    pub entries: Vec<MealEntry>,
    pub total: usize,
}

/// Nutrition totals for one calendar day of meals
#[derive(Debug, Serialize)]
pub struct DailyMealTotals {
    pub date: String,
    pub meal_count: usize,
    pub calories: f64,
    pub water_ml: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
}

/// Log a meal for a user
pub fn log_meal(
    db: &Database,
    username: &str,
    data: MealEntryCreate,
) -> Result<LogMealResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let entry = MealEntry::create(&conn, user.id, &data)
        .map_err(|e| format!("Failed to log meal: {}", e))?;

    Ok(LogMealResponse {
        id: entry.id,
        username: username.to_string(),
        meal_type: entry.meal_type.as_str().to_string(),
        calories: entry.calories,
        created_at: entry.created_at,
    })
}

/// List a user's meal entries created in [start, end)
pub fn list_meals(
    db: &Database,
    username: &str,
    start: &str,
    end: &str,
) -> Result<ListMealsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let entries = MealEntry::list_in_range(&conn, user.id, start, end)
        .map_err(|e| format!("Failed to list meals: {}", e))?;

    let total = entries.len();
    Ok(ListMealsResponse { entries, total })
}

/// Aggregate one day's meal entries into nutrition totals
pub fn daily_meal_totals(
    db: &Database,
    username: &str,
    date: &str,
) -> Result<DailyMealTotals, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let parsed = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", date, e))?;
    let end = (parsed + chrono::Duration::days(1)).format("%Y-%m-%d").to_string();

    // Bare date strings compare below any timestamp on the same day
    let entries = MealEntry::list_in_range(&conn, user.id, date, &end)
        .map_err(|e| format!("Failed to list meals: {}", e))?;

    let mut totals = DailyMealTotals {
        date: date.to_string(),
        meal_count: 0,
        calories: 0.0,
        water_ml: 0.0,
        protein_g: 0.0,
        carbs_g: 0.0,
        fat_g: 0.0,
        fiber_g: 0.0,
    };

    for entry in &entries {
        totals.meal_count += 1;
        totals.calories += entry.calories;
        totals.water_ml += entry.water_ml;
        totals.protein_g += entry.protein_g;
        totals.carbs_g += entry.carbs_g;
        totals.fat_g += entry.fat_g;
        totals.fiber_g += entry.fiber_g;
    }

    Ok(totals)
}

/// Sum meal calories per calendar date over a window
pub fn calories_by_date(entries: &[MealEntry]) -> BTreeMap<String, f64> {
    let mut by_date: BTreeMap<String, f64> = BTreeMap::new();
    for entry in entries {
        *by_date
            .entry(date_part(&entry.created_at).to_string())
            .or_insert(0.0) += entry.calories;
    }
    by_date
}
