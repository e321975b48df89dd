//! Meal entry model
//!
//! Per-meal nutrition records; multiple entries per day are permitted.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Meal type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            _ => None,
        }
    }
}

/// A logged meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: i64,
    pub user_id: i64,
    pub meal_type: MealType,
    pub calories: f64,
    pub water_ml: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Data for logging a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEntryCreate {
    pub meal_type: MealType,
    pub calories: f64,
    #[serde(default)]
    pub water_ml: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
    #[serde(default)]
    pub fiber_g: f64,
    pub notes: Option<String>,
    /// Timestamp override; defaults to now
    pub created_at: Option<String>,
}

/// Date portion of a stored timestamp ("2026-01-09 08:30:00" or ISO "T" form)
pub fn date_part(timestamp: &str) -> &str {
    timestamp
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(timestamp)
}

impl MealEntry {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type_str: String = row.get("meal_type")?;

        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            meal_type: MealType::from_str(&meal_type_str).unwrap_or(MealType::Snack),
            calories: row.get("calories")?,
            water_ml: row.get("water_ml")?,
            protein_g: row.get("protein_g")?,
            carbs_g: row.get("carbs_g")?,
            fat_g: row.get("fat_g")?,
            fiber_g: row.get("fiber_g")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Log a meal
    pub fn create(conn: &Connection, user_id: i64, data: &MealEntryCreate) -> DbResult<Self> {
        let created_at = data.created_at.clone().unwrap_or_else(|| {
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
        });

        conn.execute(
            r#"
            INSERT INTO meal_entries (user_id, meal_type, calories, water_ml, protein_g, carbs_g, fat_g, fiber_g, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                user_id,
                data.meal_type.as_str(),
                data.calories,
                data.water_ml,
                data.protein_g,
                data.carbs_g,
                data.fat_g,
                data.fiber_g,
                data.notes,
                created_at,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a meal entry by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_entries WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All entries for a user created in [start, end), ordered ascending
    pub fn list_in_range(
        conn: &Connection,
        user_id: i64,
        start: &str,
        end: &str,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meal_entries
             WHERE user_id = ?1 AND created_at >= ?2 AND created_at < ?3
             ORDER BY created_at ASC",
        )?;
        let entries = stmt
            .query_map(params![user_id, start, end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Recent entries for a user
    pub fn list_recent(conn: &Connection, user_id: i64, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meal_entries WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;
        let entries = stmt
            .query_map(params![user_id, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Delete a meal entry
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meal_entries WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_part() {
        assert_eq!(date_part("2026-01-09 08:30:00"), "2026-01-09");
        assert_eq!(date_part("2026-01-09T08:30:00Z"), "2026-01-09");
        assert_eq!(date_part("2026-01-09"), "2026-01-09");
    }

    #[test]
    fn test_meal_type_from_str() {
        assert_eq!(MealType::from_str("Breakfast"), Some(MealType::Breakfast));
        assert_eq!(MealType::from_str("brunch"), None);
    }
}
