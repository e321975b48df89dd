//! Profile model
//!
//! Per-user demographics used for BMI and the BMR/TDEE estimate behind the
//! weight projection.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Gender category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Activity level on the five-point scale used for TDEE conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Very,
    Extra,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Very => "very",
            ActivityLevel::Extra => "extra",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" | "lightly_active" => Some(ActivityLevel::Light),
            "moderate" | "moderately_active" => Some(ActivityLevel::Moderate),
            "very" | "very_active" => Some(ActivityLevel::Very),
            "extra" | "extra_active" => Some(ActivityLevel::Extra),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Lightly Active",
            ActivityLevel::Moderate => "Moderately Active",
            ActivityLevel::Very => "Very Active",
            ActivityLevel::Extra => "Extra Active",
        }
    }

    /// BMR -> TDEE multiplier for this activity level
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Very => 1.725,
            ActivityLevel::Extra => 1.9,
        }
    }
}

/// User profile demographics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub age: i64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub target_weight_kg: Option<f64>,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for setting a profile (upsert)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSet {
    pub age: i64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub target_weight_kg: Option<f64>,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl Profile {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let gender_str: String = row.get("gender")?;
        let activity_str: String = row.get("activity_level")?;

        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            age: row.get("age")?,
            height_cm: row.get("height_cm")?,
            weight_kg: row.get("weight_kg")?,
            target_weight_kg: row.get("target_weight_kg")?,
            gender: Gender::from_str(&gender_str).unwrap_or(Gender::Other),
            activity_level: ActivityLevel::from_str(&activity_str)
                .unwrap_or(ActivityLevel::Moderate),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the profile for a user (zero or one)
    pub fn get_by_user(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM profiles WHERE user_id = ?1")?;

        let result = stmt.query_row([user_id], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or update a user's profile (upsert)
    pub fn set(conn: &Connection, user_id: i64, data: &ProfileSet) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO profiles (user_id, age, height_cm, weight_kg, target_weight_kg, gender, activity_level)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id) DO UPDATE SET
                age = excluded.age,
                height_cm = excluded.height_cm,
                weight_kg = excluded.weight_kg,
                target_weight_kg = excluded.target_weight_kg,
                gender = excluded.gender,
                activity_level = excluded.activity_level,
                updated_at = datetime('now')
            "#,
            params![
                user_id,
                data.age,
                data.height_cm,
                data.weight_kg,
                data.target_weight_kg,
                data.gender.as_str(),
                data.activity_level.as_str(),
            ],
        )?;

        Self::get_by_user(conn, user_id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Body mass index from current weight and height
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        (self.weight_kg / (height_m * height_m) * 100.0).round() / 100.0
    }

    /// Standard BMI category label
    pub fn bmi_category(&self) -> &'static str {
        let bmi = self.bmi();
        if bmi < 18.5 {
            "Underweight"
        } else if bmi < 25.0 {
            "Normal"
        } else if bmi < 30.0 {
            "Overweight"
        } else {
            "Obese"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(weight_kg: f64, height_cm: f64) -> Profile {
        Profile {
            id: 1,
            user_id: 1,
            age: 30,
            height_cm,
            weight_kg,
            target_weight_kg: None,
            gender: Gender::Male,
            activity_level: ActivityLevel::Moderate,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_bmi() {
        let p = profile(70.0, 175.0);
        assert!((p.bmi() - 22.86).abs() < 1e-9);
    }

    #[test]
    fn test_bmi_category() {
        assert_eq!(profile(50.0, 175.0).bmi_category(), "Underweight");
        assert_eq!(profile(70.0, 175.0).bmi_category(), "Normal");
        assert_eq!(profile(85.0, 175.0).bmi_category(), "Overweight");
        assert_eq!(profile(100.0, 175.0).bmi_category(), "Obese");
    }

    #[test]
    fn test_activity_multipliers() {
        assert_eq!(ActivityLevel::Sedentary.multiplier(), 1.2);
        assert_eq!(ActivityLevel::Light.multiplier(), 1.375);
        assert_eq!(ActivityLevel::Moderate.multiplier(), 1.55);
        assert_eq!(ActivityLevel::Very.multiplier(), 1.725);
        assert_eq!(ActivityLevel::Extra.multiplier(), 1.9);
    }

    #[test]
    fn test_activity_from_str() {
        assert_eq!(ActivityLevel::from_str("moderate"), Some(ActivityLevel::Moderate));
        assert_eq!(ActivityLevel::from_str("VERY"), Some(ActivityLevel::Very));
        assert_eq!(ActivityLevel::from_str("couch"), None);
    }
}
