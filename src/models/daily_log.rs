//! Daily log model
//!
//! One row per (user, calendar date) with the day's nutrition, activity,
//! sleep and vital readings. Metric columns are nullable; the forecasting
//! core treats a NULL as "not logged" and skips it.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Mood category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Excellent,
    Good,
    Okay,
    Bad,
    Terrible,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Excellent => "excellent",
            Mood::Good => "good",
            Mood::Okay => "okay",
            Mood::Bad => "bad",
            Mood::Terrible => "terrible",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "excellent" => Some(Mood::Excellent),
            "good" => Some(Mood::Good),
            "okay" | "ok" => Some(Mood::Okay),
            "bad" => Some(Mood::Bad),
            "terrible" => Some(Mood::Terrible),
            _ => None,
        }
    }
}

/// A day's logged health data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLog {
    pub id: i64,
    pub user_id: i64,
    pub date: String, // ISO date: "2026-01-09"

    // Nutrition
    pub calories_intake: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fats_g: Option<f64>,
    pub water_intake_l: Option<f64>,

    // Activity
    pub steps: Option<i64>,
    pub exercise_duration_min: Option<f64>,
    pub exercise_type: Option<String>,

    // Sleep & vitals
    pub sleep_hours: Option<f64>,
    pub weight_kg: Option<f64>,
    pub heart_rate: Option<i64>,
    pub blood_pressure_sys: Option<i64>,
    pub blood_pressure_dia: Option<i64>,

    pub mood: Mood,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating or replacing a day's log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyLogUpsert {
    pub date: String,
    pub calories_intake: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fats_g: Option<f64>,
    pub water_intake_l: Option<f64>,
    pub steps: Option<i64>,
    pub exercise_duration_min: Option<f64>,
    pub exercise_type: Option<String>,
    pub sleep_hours: Option<f64>,
    pub weight_kg: Option<f64>,
    pub heart_rate: Option<i64>,
    pub blood_pressure_sys: Option<i64>,
    pub blood_pressure_dia: Option<i64>,
    pub mood: Option<Mood>,
    pub notes: Option<String>,
}

/// A forecastable numeric metric on the daily log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CaloriesIntake,
    Protein,
    Carbs,
    Fats,
    WaterIntake,
    Steps,
    ExerciseDuration,
    SleepHours,
    Weight,
    HeartRate,
    BloodPressureSys,
    BloodPressureDia,
}

/// Metric set used when the caller asks for "all"
pub const DEFAULT_EVAL_METRICS: [Metric; 5] = [
    Metric::SleepHours,
    Metric::Steps,
    Metric::CaloriesIntake,
    Metric::WaterIntake,
    Metric::ExerciseDuration,
];

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::CaloriesIntake => "calories_intake",
            Metric::Protein => "protein",
            Metric::Carbs => "carbs",
            Metric::Fats => "fats",
            Metric::WaterIntake => "water_intake",
            Metric::Steps => "steps",
            Metric::ExerciseDuration => "exercise_duration",
            Metric::SleepHours => "sleep_hours",
            Metric::Weight => "weight",
            Metric::HeartRate => "heart_rate",
            Metric::BloodPressureSys => "blood_pressure_sys",
            Metric::BloodPressureDia => "blood_pressure_dia",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "calories_intake" | "calories" => Some(Metric::CaloriesIntake),
            "protein" | "protein_g" => Some(Metric::Protein),
            "carbs" | "carbs_g" => Some(Metric::Carbs),
            "fats" | "fat" | "fats_g" => Some(Metric::Fats),
            "water_intake" | "water" => Some(Metric::WaterIntake),
            "steps" => Some(Metric::Steps),
            "exercise_duration" | "exercise" => Some(Metric::ExerciseDuration),
            "sleep_hours" | "sleep" => Some(Metric::SleepHours),
            "weight" | "weight_kg" => Some(Metric::Weight),
            "heart_rate" | "hr" | "pulse" => Some(Metric::HeartRate),
            "blood_pressure_sys" | "systolic" => Some(Metric::BloodPressureSys),
            "blood_pressure_dia" | "diastolic" => Some(Metric::BloodPressureDia),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::CaloriesIntake => "Calorie Intake",
            Metric::Protein => "Protein",
            Metric::Carbs => "Carbohydrates",
            Metric::Fats => "Fats",
            Metric::WaterIntake => "Water Intake",
            Metric::Steps => "Steps",
            Metric::ExerciseDuration => "Exercise Duration",
            Metric::SleepHours => "Sleep Hours",
            Metric::Weight => "Weight",
            Metric::HeartRate => "Heart Rate",
            Metric::BloodPressureSys => "Systolic Blood Pressure",
            Metric::BloodPressureDia => "Diastolic Blood Pressure",
        }
    }

    /// Numeric value of this metric on a log, if present
    pub fn value(&self, log: &DailyLog) -> Option<f64> {
        match self {
            Metric::CaloriesIntake => log.calories_intake,
            Metric::Protein => log.protein_g,
            Metric::Carbs => log.carbs_g,
            Metric::Fats => log.fats_g,
            Metric::WaterIntake => log.water_intake_l,
            Metric::Steps => log.steps.map(|v| v as f64),
            Metric::ExerciseDuration => log.exercise_duration_min,
            Metric::SleepHours => log.sleep_hours,
            Metric::Weight => log.weight_kg,
            Metric::HeartRate => log.heart_rate.map(|v| v as f64),
            Metric::BloodPressureSys => log.blood_pressure_sys.map(|v| v as f64),
            Metric::BloodPressureDia => log.blood_pressure_dia.map(|v| v as f64),
        }
    }
}

impl DailyLog {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let mood_str: String = row.get("mood")?;

        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            calories_intake: row.get("calories_intake")?,
            protein_g: row.get("protein_g")?,
            carbs_g: row.get("carbs_g")?,
            fats_g: row.get("fats_g")?,
            water_intake_l: row.get("water_intake_l")?,
            steps: row.get("steps")?,
            exercise_duration_min: row.get("exercise_duration_min")?,
            exercise_type: row.get("exercise_type")?,
            sleep_hours: row.get("sleep_hours")?,
            weight_kg: row.get("weight_kg")?,
            heart_rate: row.get("heart_rate")?,
            blood_pressure_sys: row.get("blood_pressure_sys")?,
            blood_pressure_dia: row.get("blood_pressure_dia")?,
            mood: Mood::from_str(&mood_str).unwrap_or(Mood::Okay),
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create or replace a user's log for a date
    pub fn upsert(conn: &Connection, user_id: i64, data: &DailyLogUpsert) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO daily_logs (
                user_id, date, calories_intake, protein_g, carbs_g, fats_g,
                water_intake_l, steps, exercise_duration_min, exercise_type,
                sleep_hours, weight_kg, heart_rate, blood_pressure_sys,
                blood_pressure_dia, mood, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            ON CONFLICT(user_id, date) DO UPDATE SET
                calories_intake = excluded.calories_intake,
                protein_g = excluded.protein_g,
                carbs_g = excluded.carbs_g,
                fats_g = excluded.fats_g,
                water_intake_l = excluded.water_intake_l,
                steps = excluded.steps,
                exercise_duration_min = excluded.exercise_duration_min,
                exercise_type = excluded.exercise_type,
                sleep_hours = excluded.sleep_hours,
                weight_kg = excluded.weight_kg,
                heart_rate = excluded.heart_rate,
                blood_pressure_sys = excluded.blood_pressure_sys,
                blood_pressure_dia = excluded.blood_pressure_dia,
                mood = excluded.mood,
                notes = excluded.notes,
                updated_at = datetime('now')
            "#,
            params![
                user_id,
                data.date,
                data.calories_intake,
                data.protein_g,
                data.carbs_g,
                data.fats_g,
                data.water_intake_l,
                data.steps,
                data.exercise_duration_min,
                data.exercise_type,
                data.sleep_hours,
                data.weight_kg,
                data.heart_rate,
                data.blood_pressure_sys,
                data.blood_pressure_dia,
                data.mood.unwrap_or(Mood::Okay).as_str(),
                data.notes,
            ],
        )?;

        Self::get_by_date(conn, user_id, &data.date)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a user's log for a specific date
    pub fn get_by_date(conn: &Connection, user_id: i64, date: &str) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM daily_logs WHERE user_id = ?1 AND date = ?2")?;

        let result = stmt.query_row(params![user_id, date], Self::from_row);
        match result {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All logs for a user with date >= start, ordered by date ascending.
    /// This is the query shape the forecasting core consumes.
    pub fn list_since(conn: &Connection, user_id: i64, start_date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM daily_logs WHERE user_id = ?1 AND date >= ?2 ORDER BY date ASC",
        )?;
        let logs = stmt
            .query_map(params![user_id, start_date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// List logs for display with optional date range and pagination
    pub fn list(
        conn: &Connection,
        user_id: i64,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM daily_logs WHERE user_id = ?1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(start) = start_date {
            params_vec.push(Box::new(start.to_string()));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(end) = end_date {
            params_vec.push(Box::new(end.to_string()));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY date DESC");

        params_vec.push(Box::new(limit));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));

        params_vec.push(Box::new(offset));
        sql.push_str(&format!(" OFFSET ?{}", params_vec.len()));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let logs = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// Total number of logs for a user
    pub fn count_for_user(conn: &Connection, user_id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM daily_logs WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a log
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM daily_logs WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_log() -> DailyLog {
        DailyLog {
            id: 1,
            user_id: 1,
            date: "2026-01-09".to_string(),
            calories_intake: None,
            protein_g: None,
            carbs_g: None,
            fats_g: None,
            water_intake_l: None,
            steps: None,
            exercise_duration_min: None,
            exercise_type: None,
            sleep_hours: None,
            weight_kg: None,
            heart_rate: None,
            blood_pressure_sys: None,
            blood_pressure_dia: None,
            mood: Mood::Okay,
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_upsert_keeps_one_row_per_user_date() {
        let db = crate::db::Database::new_in_memory().unwrap();
        db.with_conn(|conn| {
            crate::db::migrations::run_migrations(conn)?;
            let user = crate::models::User::create(conn, "alice")?;

            let mut data = DailyLogUpsert {
                date: "2026-01-09".to_string(),
                steps: Some(5000),
                ..Default::default()
            };
            DailyLog::upsert(conn, user.id, &data)?;

            data.steps = Some(8000);
            let log = DailyLog::upsert(conn, user.id, &data)?;

            assert_eq!(log.steps, Some(8000));
            assert_eq!(DailyLog::count_for_user(conn, user.id)?, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_since_is_date_ascending() {
        let db = crate::db::Database::new_in_memory().unwrap();
        db.with_conn(|conn| {
            crate::db::migrations::run_migrations(conn)?;
            let user = crate::models::User::create(conn, "bob")?;

            for date in ["2026-01-03", "2026-01-01", "2026-01-02"] {
                DailyLog::upsert(
                    conn,
                    user.id,
                    &DailyLogUpsert {
                        date: date.to_string(),
                        sleep_hours: Some(7.0),
                        ..Default::default()
                    },
                )?;
            }

            let logs = DailyLog::list_since(conn, user.id, "2026-01-02")?;
            let dates: Vec<&str> = logs.iter().map(|l| l.date.as_str()).collect();
            assert_eq!(dates, vec!["2026-01-02", "2026-01-03"]);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_metric_from_str_aliases() {
        assert_eq!(Metric::from_str("steps"), Some(Metric::Steps));
        assert_eq!(Metric::from_str("calories"), Some(Metric::CaloriesIntake));
        assert_eq!(Metric::from_str("sleep"), Some(Metric::SleepHours));
        assert_eq!(Metric::from_str("HR"), Some(Metric::HeartRate));
        assert_eq!(Metric::from_str("bogus"), None);
    }

    #[test]
    fn test_metric_accessor() {
        let mut log = empty_log();
        assert_eq!(Metric::Steps.value(&log), None);

        log.steps = Some(8200);
        log.sleep_hours = Some(7.5);
        assert_eq!(Metric::Steps.value(&log), Some(8200.0));
        assert_eq!(Metric::SleepHours.value(&log), Some(7.5));
        assert_eq!(Metric::Weight.value(&log), None);
    }
}
