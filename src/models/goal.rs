//! Goal model

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Goal type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Weight,
    Steps,
    Exercise,
    Sleep,
    Water,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Weight => "weight",
            GoalType::Steps => "steps",
            GoalType::Exercise => "exercise",
            GoalType::Sleep => "sleep",
            GoalType::Water => "water",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "weight" => Some(GoalType::Weight),
            "steps" => Some(GoalType::Steps),
            "exercise" => Some(GoalType::Exercise),
            "sleep" => Some(GoalType::Sleep),
            "water" => Some(GoalType::Water),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GoalType::Weight => "Weight",
            GoalType::Steps => "Daily Steps",
            GoalType::Exercise => "Exercise Duration",
            GoalType::Sleep => "Sleep Hours",
            GoalType::Water => "Water Intake",
        }
    }
}

/// A tracked goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub goal_type: GoalType,
    pub target_value: f64,
    pub current_value: f64,
    pub deadline: String, // ISO date
    pub is_achieved: bool,
    pub created_at: String,
}

/// Data for creating a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalCreate {
    pub goal_type: GoalType,
    pub target_value: f64,
    pub deadline: String,
}

/// Data for updating a goal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalUpdate {
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub deadline: Option<String>,
    pub is_achieved: Option<bool>,
}

impl Goal {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let goal_type_str: String = row.get("goal_type")?;
        let is_achieved: i64 = row.get("is_achieved")?;

        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            goal_type: GoalType::from_str(&goal_type_str).unwrap_or(GoalType::Steps),
            target_value: row.get("target_value")?,
            current_value: row.get("current_value")?,
            deadline: row.get("deadline")?,
            is_achieved: is_achieved != 0,
            created_at: row.get("created_at")?,
        })
    }

    /// Create a new goal
    pub fn create(conn: &Connection, user_id: i64, data: &GoalCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO goals (user_id, goal_type, target_value, deadline)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![user_id, data.goal_type.as_str(), data.target_value, data.deadline],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a goal by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM goals WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(goal) => Ok(Some(goal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List goals for a user, newest first
    pub fn list_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM goals WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let goals = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(goals)
    }

    /// Update a goal
    pub fn update(conn: &Connection, id: i64, data: &GoalUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(target) = data.target_value {
            updates.push(format!("target_value = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(target));
        }
        if let Some(current) = data.current_value {
            updates.push(format!("current_value = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(current));
        }
        if let Some(ref deadline) = data.deadline {
            updates.push(format!("deadline = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(deadline.clone()));
        }
        if let Some(achieved) = data.is_achieved {
            updates.push(format!("is_achieved = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(achieved as i64));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        let sql = format!(
            "UPDATE goals SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a goal
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM goals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Progress towards the target as a percentage, capped at 100
    pub fn progress_percentage(&self) -> f64 {
        if self.target_value == 0.0 {
            return 0.0;
        }
        let pct = (self.current_value / self.target_value * 100.0 * 10.0).round() / 10.0;
        pct.min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(target: f64, current: f64) -> Goal {
        Goal {
            id: 1,
            user_id: 1,
            goal_type: GoalType::Steps,
            target_value: target,
            current_value: current,
            deadline: "2026-12-31".to_string(),
            is_achieved: false,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(goal(10000.0, 2500.0).progress_percentage(), 25.0);
        assert_eq!(goal(10000.0, 12000.0).progress_percentage(), 100.0);
        assert_eq!(goal(0.0, 500.0).progress_percentage(), 0.0);
    }

    #[test]
    fn test_progress_rounding() {
        assert_eq!(goal(3.0, 1.0).progress_percentage(), 33.3);
    }
}
