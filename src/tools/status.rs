//! HealthTrack Status Tool
//!
//! Provides runtime status information about the HealthTrack service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Daily logging instructions for AI assistants
pub const LOGGING_INSTRUCTIONS: &str = r#"
# HealthTrack Logging Instructions

This guide explains how to record health data with the HealthTrack tools.

## Overview

HealthTrack keeps three kinds of records per user:
1. **Daily logs** - one row per calendar day (nutrition totals, steps,
   exercise, sleep, weight, heart rate, blood pressure, mood)
2. **Meal entries** - individual meals with calories and macros; several per
   day are expected
3. **Profile** - age, height, weight, gender and activity level; required for
   weight/BMI projection

## Workflow

1. Create the user once with `create_user`.
2. Set the profile with `set_profile` (age, height_cm, weight_kg, gender,
   activity_level: sedentary | light | moderate | very | extra).
3. Log each day with `log_day`. Dates use ISO format: YYYY-MM-DD. Any metric
   you omit is stored as missing, not zero - the forecaster skips missing
   values, so leave fields out rather than inventing zeros.
4. Log meals as they happen with `log_meal` (meal_type: breakfast | lunch |
   dinner | snack). Per-meal entries are preferred over the daily calorie
   field for the weight projection.

## Important

- `log_day` replaces the whole row for that date. Re-send every field you
  want to keep when correcting a day.
- Weights are kilograms, heights centimeters, water liters on the daily log
  and milliliters per meal entry.
- One log per (user, date); one profile per user.
"#;

/// Forecasting instructions for AI assistants
pub const FORECAST_INSTRUCTIONS: &str = r#"
# HealthTrack Forecasting Instructions

## Forecasts

- `forecast_metric(username, metric, past_days, predict_days)` fits a
  least-squares trend over the last `past_days` of the metric and projects
  `predict_days` values forward. It needs at least 3 logged values in the
  window; otherwise it returns no result, which is normal for new users.
- Metrics: steps, calories_intake, sleep_hours, water_intake,
  exercise_duration, weight, heart_rate, protein, carbs, fats,
  blood_pressure_sys, blood_pressure_dia.
- `project_weight_bmi(username, past_days, predict_days)` uses the profile
  (Mifflin-St Jeor BMR x activity factor) against average intake. It needs a
  profile and some intake data; a missing profile yields no result.

## Evaluation

- `evaluate_metric` / `evaluate_direction` back-test the model by holding out
  the trailing `test_days`. They need `test_days + 3` logged values.
- `evaluate_user_performance` runs both for a metric list plus the weight
  projection; `evaluate_overall_performance` averages the results.
- "No result" always means insufficient data, never a failure. Do not retry;
  tell the user how many more days of logging are needed.
"#;

/// Runtime status of the HealthTrack service
#[derive(Debug, Clone, Serialize)]
pub struct HealthTrackStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> HealthTrackStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        HealthTrackStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
