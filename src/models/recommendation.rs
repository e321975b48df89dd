//! Recommendation model
//!
//! Rule-generated advice rows. Regeneration replaces a user's existing set.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Recommendation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Nutrition,
    Exercise,
    Sleep,
    Lifestyle,
}

impl RecommendationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationCategory::Nutrition => "nutrition",
            RecommendationCategory::Exercise => "exercise",
            RecommendationCategory::Sleep => "sleep",
            RecommendationCategory::Lifestyle => "lifestyle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nutrition" => Some(RecommendationCategory::Nutrition),
            "exercise" => Some(RecommendationCategory::Exercise),
            "sleep" => Some(RecommendationCategory::Sleep),
            "lifestyle" => Some(RecommendationCategory::Lifestyle),
            _ => None,
        }
    }
}

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

impl RecommendationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationPriority::High => "high",
            RecommendationPriority::Medium => "medium",
            RecommendationPriority::Low => "low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "high" => Some(RecommendationPriority::High),
            "medium" => Some(RecommendationPriority::Medium),
            "low" => Some(RecommendationPriority::Low),
            _ => None,
        }
    }
}

/// A generated recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i64,
    pub user_id: i64,
    pub category: RecommendationCategory,
    pub priority: RecommendationPriority,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

/// Data for inserting a recommendation
#[derive(Debug, Clone)]
pub struct RecommendationCreate {
    pub category: RecommendationCategory,
    pub priority: RecommendationPriority,
    pub title: String,
    pub message: String,
}

impl Recommendation {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category_str: String = row.get("category")?;
        let priority_str: String = row.get("priority")?;
        let is_read: i64 = row.get("is_read")?;

        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            category: RecommendationCategory::from_str(&category_str)
                .unwrap_or(RecommendationCategory::Lifestyle),
            priority: RecommendationPriority::from_str(&priority_str)
                .unwrap_or(RecommendationPriority::Low),
            title: row.get("title")?,
            message: row.get("message")?,
            is_read: is_read != 0,
            created_at: row.get("created_at")?,
        })
    }

    /// Replace a user's recommendation set with freshly generated items
    pub fn replace_for_user(
        conn: &Connection,
        user_id: i64,
        items: &[RecommendationCreate],
    ) -> DbResult<Vec<Self>> {
        conn.execute("DELETE FROM recommendations WHERE user_id = ?1", [user_id])?;

        for item in items {
            conn.execute(
                r#"
                INSERT INTO recommendations (user_id, category, priority, title, message)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    user_id,
                    item.category.as_str(),
                    item.priority.as_str(),
                    item.title,
                    item.message,
                ],
            )?;
        }

        Self::list_for_user(conn, user_id, false)
    }

    /// List recommendations for a user, newest first
    pub fn list_for_user(
        conn: &Connection,
        user_id: i64,
        unread_only: bool,
    ) -> DbResult<Vec<Self>> {
        let sql = if unread_only {
            "SELECT * FROM recommendations WHERE user_id = ?1 AND is_read = 0 ORDER BY created_at DESC, id"
        } else {
            "SELECT * FROM recommendations WHERE user_id = ?1 ORDER BY created_at DESC, id"
        };

        let mut stmt = conn.prepare(sql)?;
        let recs = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(recs)
    }

    /// Mark a recommendation as read
    pub fn mark_read(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "UPDATE recommendations SET is_read = 1 WHERE id = ?1",
            [id],
        )?;
        Ok(rows > 0)
    }
}
