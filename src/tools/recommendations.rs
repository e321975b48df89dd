//! Rule-based recommendations
//!
//! Fixed thresholds over the trailing week of logs and meals, rendered
//! through static templates. This is deliberately not a learned model;
//! regeneration replaces the user's previous set.

use chrono::{Duration, Local};
use serde::Serialize;

use crate::db::Database;
use crate::models::{
    DailyLog, MealEntry, Metric, Profile, Recommendation, RecommendationCategory,
    RecommendationCreate, RecommendationPriority,
};

use super::meals::calories_by_date;
use super::users::require_user;

// Rule thresholds (per-day averages over the trailing week)
const CALORIES_HIGH: f64 = 2500.0;
const CALORIES_LOW: f64 = 1400.0;
const PROTEIN_LOW_G: f64 = 50.0;
const PROTEIN_HIGH_G: f64 = 200.0;
const FIBER_LOW_G: f64 = 25.0;
const WATER_LOW_L: f64 = 1.5;
const STEPS_LOW: f64 = 5000.0;
const SLEEP_SHORT_H: f64 = 7.0;
const SLEEP_LONG_H: f64 = 9.0;

/// Response for generate_recommendations
#[derive(Debug, Serialize)]
pub struct GenerateRecommendationsResponse {
    pub username: String,
    pub generated: usize,
    pub recommendations: Vec<Recommendation>,
}

fn average_metric(logs: &[DailyLog], metric: Metric) -> Option<f64> {
    let values: Vec<f64> = logs.iter().filter_map(|log| metric.value(log)).collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn average_meal_field(entries: &[MealEntry], field: fn(&MealEntry) -> f64) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    Some(entries.iter().map(field).sum::<f64>() / entries.len() as f64)
}

/// Regenerate a user's recommendations from the last 7 days of data
pub fn generate_recommendations(
    db: &Database,
    username: &str,
) -> Result<GenerateRecommendationsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let today = Local::now().date_naive();
    let start = (today - Duration::days(7)).format("%Y-%m-%d").to_string();
    let end = (today + Duration::days(1)).format("%Y-%m-%d").to_string();

    let logs = DailyLog::list_since(&conn, user.id, &start)
        .map_err(|e| format!("Failed to load daily logs: {}", e))?;
    let meals = MealEntry::list_in_range(&conn, user.id, &start, &end)
        .map_err(|e| format!("Failed to load meal entries: {}", e))?;
    let profile = Profile::get_by_user(&conn, user.id)
        .map_err(|e| format!("Failed to load profile: {}", e))?;

    let mut items = Vec::new();

    // Calories: prefer per-meal data aggregated per day, else the daily logs
    let by_date = calories_by_date(&meals);
    let avg_calories = if by_date.is_empty() {
        average_metric(&logs, Metric::CaloriesIntake)
    } else {
        Some(by_date.values().sum::<f64>() / by_date.len() as f64)
    };

    if let Some(calories) = avg_calories {
        if calories > CALORIES_HIGH {
            items.push(RecommendationCreate {
                category: RecommendationCategory::Nutrition,
                priority: RecommendationPriority::Medium,
                title: "High calorie pattern".to_string(),
                message: format!(
                    "Your average daily intake over the past week is {} kcal. \
                     Consider reducing portion sizes or choosing lower-calorie swaps.",
                    calories as i64
                ),
            });
        } else if calories > 0.0 && calories < CALORIES_LOW {
            items.push(RecommendationCreate {
                category: RecommendationCategory::Nutrition,
                priority: RecommendationPriority::Medium,
                title: "Low calorie intake".to_string(),
                message: format!(
                    "Your average intake ({} kcal) is low. Consider adding calorie-dense \
                     nutritious foods like nuts, avocado, legumes and healthy oils to meet \
                     your energy needs.",
                    calories as i64
                ),
            });
        }
    }

    // Protein from meal entries
    if let Some(protein) = average_meal_field(&meals, |m| m.protein_g) {
        if protein < PROTEIN_LOW_G {
            items.push(RecommendationCreate {
                category: RecommendationCategory::Nutrition,
                priority: RecommendationPriority::Low,
                title: "Increase protein".to_string(),
                message: "Protein intake looks low. Add lean protein sources like chicken, \
                          fish, eggs, tofu, beans or Greek yogurt to support muscle and fullness."
                    .to_string(),
            });
        } else if protein > PROTEIN_HIGH_G {
            items.push(RecommendationCreate {
                category: RecommendationCategory::Nutrition,
                priority: RecommendationPriority::Low,
                title: "Very high protein intake".to_string(),
                message: "Your protein intake appears very high. If you have kidney issues, \
                          discuss very high-protein diets with your healthcare provider and \
                          ensure adequate hydration."
                    .to_string(),
            });
        }
    }

    // Fiber from meal entries
    if let Some(fiber) = average_meal_field(&meals, |m| m.fiber_g) {
        if fiber < FIBER_LOW_G {
            items.push(RecommendationCreate {
                category: RecommendationCategory::Nutrition,
                priority: RecommendationPriority::Low,
                title: "Add more fiber".to_string(),
                message: "Fiber intake is below the recommended 25g per day. Whole grains, \
                          beans, fruit and vegetables are the easiest places to add it."
                    .to_string(),
            });
        }
    }

    // Water from daily logs
    if let Some(water) = average_metric(&logs, Metric::WaterIntake) {
        if water < WATER_LOW_L {
            items.push(RecommendationCreate {
                category: RecommendationCategory::Lifestyle,
                priority: RecommendationPriority::Low,
                title: "Drink more water".to_string(),
                message: format!(
                    "You averaged {:.1} L of water per day this week. Aim for at least \
                     {:.1} L; keeping a bottle at your desk helps.",
                    water, WATER_LOW_L
                ),
            });
        }
    }

    // Activity
    if let Some(steps) = average_metric(&logs, Metric::Steps) {
        if steps < STEPS_LOW {
            items.push(RecommendationCreate {
                category: RecommendationCategory::Exercise,
                priority: RecommendationPriority::Medium,
                title: "Move more".to_string(),
                message: format!(
                    "Your average of {} steps per day is below the {} baseline. Short walks \
                     after meals are an easy way to close the gap.",
                    steps as i64, STEPS_LOW as i64
                ),
            });
        }
    }

    // Sleep
    if let Some(sleep) = average_metric(&logs, Metric::SleepHours) {
        if sleep < SLEEP_SHORT_H {
            items.push(RecommendationCreate {
                category: RecommendationCategory::Sleep,
                priority: RecommendationPriority::High,
                title: "Increase sleep".to_string(),
                message: format!(
                    "You averaged {:.1} hours of sleep this week. Most adults need 7-9 hours; \
                     a consistent bedtime is the most reliable fix.",
                    sleep
                ),
            });
        } else if sleep > SLEEP_LONG_H {
            items.push(RecommendationCreate {
                category: RecommendationCategory::Sleep,
                priority: RecommendationPriority::Low,
                title: "Long sleep pattern".to_string(),
                message: format!(
                    "You averaged {:.1} hours of sleep this week. Consistently sleeping more \
                     than 9 hours can be worth mentioning to your doctor.",
                    sleep
                ),
            });
        }
    }

    // BMI from profile
    if let Some(profile) = profile {
        if profile.bmi() >= 25.0 {
            items.push(RecommendationCreate {
                category: RecommendationCategory::Lifestyle,
                priority: RecommendationPriority::Medium,
                title: "BMI above normal range".to_string(),
                message: format!(
                    "Your BMI is {:.1} ({}). Gradual changes to intake and activity are more \
                     sustainable than aggressive cuts.",
                    profile.bmi(),
                    profile.bmi_category()
                ),
            });
        }
    }

    let recommendations = Recommendation::replace_for_user(&conn, user.id, &items)
        .map_err(|e| format!("Failed to store recommendations: {}", e))?;

    Ok(GenerateRecommendationsResponse {
        username: username.to_string(),
        generated: recommendations.len(),
        recommendations,
    })
}

/// List a user's recommendations
pub fn list_recommendations(
    db: &Database,
    username: &str,
    unread_only: bool,
) -> Result<Vec<Recommendation>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    Recommendation::list_for_user(&conn, user.id, unread_only)
        .map_err(|e| format!("Failed to list recommendations: {}", e))
}

/// Mark a recommendation as read
pub fn mark_recommendation_read(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Recommendation::mark_read(&conn, id)
        .map_err(|e| format!("Failed to mark recommendation read: {}", e))
}
