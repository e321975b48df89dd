//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    // Get current version
    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    // Run migrations
    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USERS
        -- Account rows; all tracked data hangs off these
        -- ============================================
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE UNIQUE INDEX idx_users_username ON users(username);

        -- ============================================
        -- PROFILES
        -- One per user; demographics used for BMR/TDEE
        -- ============================================
        CREATE TABLE profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            age INTEGER NOT NULL,
            height_cm REAL NOT NULL,              -- centimeters
            weight_kg REAL NOT NULL,              -- kilograms
            target_weight_kg REAL,                -- nullable
            gender TEXT NOT NULL CHECK(gender IN ('male', 'female', 'other')),
            activity_level TEXT NOT NULL DEFAULT 'moderate'
                CHECK(activity_level IN ('sedentary', 'light', 'moderate', 'very', 'extra')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- DAILY LOGS
        -- One row per (user, calendar date)
        -- Metric columns are nullable; a NULL simply
        -- means the value was not logged that day
        -- ============================================
        CREATE TABLE daily_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date TEXT NOT NULL,                   -- ISO date: "2026-01-09"

            -- Nutrition
            calories_intake REAL,                 -- kcal
            protein_g REAL,
            carbs_g REAL,
            fats_g REAL,
            water_intake_l REAL,                  -- liters

            -- Activity
            steps INTEGER,
            exercise_duration_min REAL,
            exercise_type TEXT,

            -- Sleep & vitals
            sleep_hours REAL,
            weight_kg REAL,
            heart_rate INTEGER,                   -- bpm
            blood_pressure_sys INTEGER,           -- mmHg
            blood_pressure_dia INTEGER,           -- mmHg

            -- Additional
            mood TEXT NOT NULL DEFAULT 'okay'
                CHECK(mood IN ('excellent', 'good', 'okay', 'bad', 'terrible')),
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(user_id, date)                 -- one log per user per day
        );

        CREATE INDEX idx_daily_logs_user_date ON daily_logs(user_id, date);

        -- ============================================
        -- MEAL ENTRIES
        -- Per-meal nutrition; multiple per day permitted
        -- ============================================
        CREATE TABLE meal_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            meal_type TEXT NOT NULL CHECK(meal_type IN ('breakfast', 'lunch', 'dinner', 'snack')),

            calories REAL NOT NULL DEFAULT 0,     -- kcal
            water_ml REAL NOT NULL DEFAULT 0,

            -- Macronutrients (grams)
            protein_g REAL NOT NULL DEFAULT 0,
            carbs_g REAL NOT NULL DEFAULT 0,
            fat_g REAL NOT NULL DEFAULT 0,
            fiber_g REAL NOT NULL DEFAULT 0,

            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meal_entries_user ON meal_entries(user_id);
        CREATE INDEX idx_meal_entries_created ON meal_entries(created_at);

        -- ============================================
        -- GOALS
        -- ============================================
        CREATE TABLE goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            goal_type TEXT NOT NULL CHECK(goal_type IN ('weight', 'steps', 'exercise', 'sleep', 'water')),
            target_value REAL NOT NULL,
            current_value REAL NOT NULL DEFAULT 0,
            deadline TEXT NOT NULL,               -- ISO date
            is_achieved INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_goals_user ON goals(user_id);

        -- ============================================
        -- RECOMMENDATIONS
        -- Rule-generated; regenerated wholesale per user
        -- ============================================
        CREATE TABLE recommendations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            category TEXT NOT NULL CHECK(category IN ('nutrition', 'exercise', 'sleep', 'lifestyle')),
            priority TEXT NOT NULL CHECK(priority IN ('high', 'medium', 'low')),
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_recommendations_user ON recommendations(user_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_migrations_bring_schema_current() {
        let db = Database::new_in_memory().unwrap();
        db.with_conn(|conn| {
            assert!(needs_migration(conn)?);
            run_migrations(conn)?;
            assert_eq!(get_schema_version(conn)?, SCHEMA_VERSION);
            assert!(!needs_migration(conn)?);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let db = Database::new_in_memory().unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            run_migrations(conn)?;
            assert_eq!(get_schema_version(conn)?, SCHEMA_VERSION);
            Ok(())
        })
        .unwrap();
    }
}
