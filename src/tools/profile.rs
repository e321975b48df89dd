//! Profile tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{Profile, ProfileSet};

use super::users::require_user;

/// Profile details with derived BMI
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub age: i64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub target_weight_kg: Option<f64>,
    pub gender: String,
    pub activity_level: String,
    pub bmi: f64,
    pub bmi_category: String,
    pub updated_at: String,
}

fn to_response(username: &str, profile: &Profile) -> ProfileResponse {
    ProfileResponse {
        username: username.to_string(),
        age: profile.age,
        height_cm: profile.height_cm,
        weight_kg: profile.weight_kg,
        target_weight_kg: profile.target_weight_kg,
        gender: profile.gender.as_str().to_string(),
        activity_level: profile.activity_level.as_str().to_string(),
        bmi: profile.bmi(),
        bmi_category: profile.bmi_category().to_string(),
        updated_at: profile.updated_at.clone(),
    }
}

/// Set or update a user's profile
pub fn set_profile(
    db: &Database,
    username: &str,
    data: ProfileSet,
) -> Result<ProfileResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let profile = Profile::set(&conn, user.id, &data)
        .map_err(|e| format!("Failed to set profile: {}", e))?;

    Ok(to_response(username, &profile))
}

/// Get a user's profile, if one has been set
pub fn get_profile(db: &Database, username: &str) -> Result<Option<ProfileResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let profile = Profile::get_by_user(&conn, user.id)
        .map_err(|e| format!("Failed to load profile: {}", e))?;

    Ok(profile.map(|p| to_response(username, &p)))
}
