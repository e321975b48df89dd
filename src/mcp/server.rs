//! HealthTrack MCP Server Implementation
//!
//! Implements the MCP server with all HealthTrack tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{
    ActivityLevel, DailyLogUpsert, Gender, GoalCreate, GoalType, GoalUpdate, MealEntryCreate,
    MealType, Metric, Mood, ProfileSet, DEFAULT_EVAL_METRICS,
};
use crate::tools::charts;
use crate::tools::evaluation;
use crate::tools::forecasts;
use crate::tools::goals;
use crate::tools::logs;
use crate::tools::meals;
use crate::tools::profile;
use crate::tools::recommendations;
use crate::tools::status::StatusTracker;
use crate::tools::users;

/// HealthTrack MCP Service
#[derive(Clone)]
pub struct HealthTrackService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<HealthTrackService>,
}

impl HealthTrackService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn json_response<T: serde::Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn no_result_response(reason: &str) -> Result<CallToolResult, McpError> {
    let json = serde_json::json!({ "result": null, "reason": reason });
    json_response(&json)
}

fn parse_metric(name: &str) -> Result<Metric, McpError> {
    Metric::from_str(name).ok_or_else(|| {
        McpError::invalid_params(format!("Unknown metric: {}", name), None)
    })
}

/// Resolve a metric list parameter: explicit names, or the default set for
/// "all" / empty
fn parse_metric_list(names: &Option<Vec<String>>) -> Result<Vec<Metric>, McpError> {
    match names {
        None => Ok(DEFAULT_EVAL_METRICS.to_vec()),
        Some(list) if list.is_empty() => Ok(DEFAULT_EVAL_METRICS.to_vec()),
        Some(list) if list.len() == 1 && list[0].eq_ignore_ascii_case("all") => {
            Ok(DEFAULT_EVAL_METRICS.to_vec())
        }
        Some(list) => list.iter().map(|name| parse_metric(name)).collect(),
    }
}

// ============================================================================
// User & Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateUserParams {
    /// Username to create
    pub username: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UsernameParams {
    /// Username
    pub username: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetProfileParams {
    pub username: String,
    /// Age in years
    pub age: i64,
    /// Height in centimeters
    pub height_cm: f64,
    /// Current weight in kilograms
    pub weight_kg: f64,
    /// Target weight in kilograms (optional)
    pub target_weight_kg: Option<f64>,
    /// Gender: male, female, or other
    pub gender: String,
    /// Activity level: sedentary, light, moderate, very, extra
    #[serde(default = "default_activity")]
    pub activity_level: String,
}

fn default_activity() -> String { "moderate".to_string() }

// ============================================================================
// Daily Log Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogDayParams {
    pub username: String,
    /// ISO date: YYYY-MM-DD
    pub date: String,
    /// Calorie intake (kcal)
    pub calories_intake: Option<f64>,
    /// Protein in grams
    pub protein_g: Option<f64>,
    /// Carbohydrates in grams
    pub carbs_g: Option<f64>,
    /// Fats in grams
    pub fats_g: Option<f64>,
    /// Water intake in liters
    pub water_intake_l: Option<f64>,
    /// Step count
    pub steps: Option<i64>,
    /// Exercise duration in minutes
    pub exercise_duration_min: Option<f64>,
    /// Exercise type description
    pub exercise_type: Option<String>,
    /// Sleep hours
    pub sleep_hours: Option<f64>,
    /// Weight in kilograms
    pub weight_kg: Option<f64>,
    /// Resting heart rate (bpm)
    pub heart_rate: Option<i64>,
    /// Systolic blood pressure (mmHg)
    pub blood_pressure_sys: Option<i64>,
    /// Diastolic blood pressure (mmHg)
    pub blood_pressure_dia: Option<i64>,
    /// Mood: excellent, good, okay, bad, terrible
    pub mood: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDailyLogParams {
    pub username: String,
    /// ISO date: YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListDailyLogsParams {
    pub username: String,
    /// Start date (inclusive, optional)
    pub start_date: Option<String>,
    /// End date (inclusive, optional)
    pub end_date: Option<String>,
    /// Maximum results (default 30)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination (default 0)
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 30 }

// ============================================================================
// Meal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    pub username: String,
    /// Meal type: breakfast, lunch, dinner, snack
    pub meal_type: String,
    /// Calories (kcal)
    pub calories: f64,
    /// Water with the meal in milliliters
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
    /// Timestamp override (defaults to now)
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMealsParams {
    pub username: String,
    /// Start date (inclusive)
    pub start_date: String,
    /// End date (exclusive)
    pub end_date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DailyMealTotalsParams {
    pub username: String,
    /// ISO date: YYYY-MM-DD
    pub date: String,
}

// ============================================================================
// Goal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetGoalParams {
    pub username: String,
    /// Goal type: weight, steps, exercise, sleep, water
    pub goal_type: String,
    /// Target value in the metric's unit
    pub target_value: f64,
    /// Deadline as ISO date
    pub deadline: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateGoalParams {
    /// Goal ID
    pub id: i64,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub deadline: Option<String>,
    pub is_achieved: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteGoalParams {
    /// Goal ID
    pub id: i64,
}

// ============================================================================
// Recommendation Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecommendationsParams {
    pub username: String,
    /// Only return unread recommendations (default false)
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MarkRecommendationReadParams {
    /// Recommendation ID
    pub id: i64,
}

// ============================================================================
// Forecast & Evaluation Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ForecastMetricParams {
    pub username: String,
    /// Metric name (e.g., steps, sleep_hours, calories_intake)
    pub metric: String,
    /// Trailing history window in days (default 30)
    #[serde(default = "default_past_days")]
    pub past_days: u32,
    /// Forecast horizon in days (default 7)
    #[serde(default = "default_predict_days")]
    pub predict_days: u32,
}

fn default_past_days() -> u32 { 30 }
fn default_predict_days() -> u32 { 7 }
fn default_projection_days() -> u32 { 14 }
fn default_test_days() -> u32 { 7 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProjectWeightBmiParams {
    pub username: String,
    /// Trailing history window in days (default 30)
    #[serde(default = "default_past_days")]
    pub past_days: u32,
    /// Projection horizon in days (default 14)
    #[serde(default = "default_projection_days")]
    pub predict_days: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EvaluateMetricParams {
    pub username: String,
    /// Metric name
    pub metric: String,
    /// Training window in days (default 30)
    #[serde(default = "default_past_days")]
    pub past_days: u32,
    /// Held-out window in days (default 7)
    #[serde(default = "default_test_days")]
    pub test_days: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EvaluateUserParams {
    pub username: String,
    /// Metric names; omit or pass ["all"] for the default set
    pub metrics: Option<Vec<String>>,
    #[serde(default = "default_past_days")]
    pub past_days: u32,
    #[serde(default = "default_test_days")]
    pub test_days: u32,
    #[serde(default = "default_projection_days")]
    pub predict_days: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveMetricChartParams {
    pub username: String,
    /// Metric name
    pub metric: String,
    #[serde(default = "default_past_days")]
    pub past_days: u32,
    #[serde(default = "default_test_days")]
    pub test_days: u32,
    /// Output PNG path (default <metric>_evaluation.png)
    pub out_path: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveOverallChartParams {
    pub username: String,
    /// Metric names; omit or pass ["all"] for the default set
    pub metrics: Option<Vec<String>>,
    #[serde(default = "default_past_days")]
    pub past_days: u32,
    #[serde(default = "default_test_days")]
    pub test_days: u32,
    /// Output PNG path (default overall_performance.png)
    pub out_path: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl HealthTrackService {
    // --- Status & Instructions ---

    #[tool(description = "Get the current status of the HealthTrack service including build info, database status, and process information")]
    async fn healthtrack_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        json_response(&status)
    }

    #[tool(description = "Get step-by-step instructions for logging daily health data and meals. Call this when starting a logging session or when unsure how to use the logging tools.")]
    fn logging_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::LOGGING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(LOGGING_INSTRUCTIONS)]))
    }

    #[tool(description = "Get instructions for the forecasting and evaluation tools, including metric names and minimum data requirements.")]
    fn forecast_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::FORECAST_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(FORECAST_INSTRUCTIONS)]))
    }

    // --- Users & Profile ---

    #[tool(description = "Create a user account (idempotent for an existing username)")]
    fn create_user(&self, Parameters(p): Parameters<CreateUserParams>) -> Result<CallToolResult, McpError> {
        let result = users::create_user(&self.database, &p.username)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "List all users with their daily log counts")]
    fn list_users(&self) -> Result<CallToolResult, McpError> {
        let result = users::list_users(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "Set or update a user's profile (age, height, weight, gender, activity level). Required before weight/BMI projection.")]
    fn set_profile(&self, Parameters(p): Parameters<SetProfileParams>) -> Result<CallToolResult, McpError> {
        let gender = Gender::from_str(&p.gender)
            .ok_or_else(|| McpError::invalid_params(format!("Unknown gender: {}", p.gender), None))?;
        let activity_level = ActivityLevel::from_str(&p.activity_level)
            .unwrap_or(ActivityLevel::Moderate);

        let data = ProfileSet {
            age: p.age,
            height_cm: p.height_cm,
            weight_kg: p.weight_kg,
            target_weight_kg: p.target_weight_kg,
            gender,
            activity_level,
        };
        let result = profile::set_profile(&self.database, &p.username, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "Get a user's profile with derived BMI and BMI category")]
    fn get_profile(&self, Parameters(p): Parameters<UsernameParams>) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database, &p.username)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(profile) => json_response(&profile),
            None => no_result_response("Profile not set for this user"),
        }
    }

    // --- Daily Logs ---

    #[tool(description = "Create or replace a user's daily log for one date. Omitted metrics are stored as missing, not zero.")]
    fn log_day(&self, Parameters(p): Parameters<LogDayParams>) -> Result<CallToolResult, McpError> {
        let mood = match p.mood {
            Some(ref s) => Some(Mood::from_str(s).ok_or_else(|| {
                McpError::invalid_params(format!("Unknown mood: {}", s), None)
            })?),
            None => None,
        };

        let data = DailyLogUpsert {
            date: p.date,
            calories_intake: p.calories_intake,
            protein_g: p.protein_g,
            carbs_g: p.carbs_g,
            fats_g: p.fats_g,
            water_intake_l: p.water_intake_l,
            steps: p.steps,
            exercise_duration_min: p.exercise_duration_min,
            exercise_type: p.exercise_type,
            sleep_hours: p.sleep_hours,
            weight_kg: p.weight_kg,
            heart_rate: p.heart_rate,
            blood_pressure_sys: p.blood_pressure_sys,
            blood_pressure_dia: p.blood_pressure_dia,
            mood,
            notes: p.notes,
        };
        let result = logs::log_day(&self.database, &p.username, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "Get the full daily log for a user and date")]
    fn get_daily_log(&self, Parameters(p): Parameters<GetDailyLogParams>) -> Result<CallToolResult, McpError> {
        let result = logs::get_daily_log(&self.database, &p.username, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(log) => json_response(&log),
            None => no_result_response("No log for this date"),
        }
    }

    #[tool(description = "List a user's daily logs with optional date range and pagination")]
    fn list_daily_logs(&self, Parameters(p): Parameters<ListDailyLogsParams>) -> Result<CallToolResult, McpError> {
        let result = logs::list_daily_logs(
            &self.database,
            &p.username,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            p.limit,
            p.offset,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    // --- Meals ---

    #[tool(description = "Log a meal with calories and macros for a user")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let meal_type = MealType::from_str(&p.meal_type).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown meal type: {}", p.meal_type), None)
        })?;

        let data = MealEntryCreate {
            meal_type,
            calories: p.calories,
            water_ml: p.water_ml,
            protein_g: p.protein_g,
            carbs_g: p.carbs_g,
            fat_g: p.fat_g,
            fiber_g: p.fiber_g,
            notes: p.notes,
            created_at: p.created_at,
        };
        let result = meals::log_meal(&self.database, &p.username, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "List a user's meal entries created in [start_date, end_date)")]
    fn list_meals(&self, Parameters(p): Parameters<ListMealsParams>) -> Result<CallToolResult, McpError> {
        let result = meals::list_meals(&self.database, &p.username, &p.start_date, &p.end_date)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "Aggregate one day's meal entries into nutrition totals")]
    fn get_daily_meal_totals(&self, Parameters(p): Parameters<DailyMealTotalsParams>) -> Result<CallToolResult, McpError> {
        let result = meals::daily_meal_totals(&self.database, &p.username, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    // --- Goals ---

    #[tool(description = "Create a goal for a user (weight, steps, exercise, sleep, or water)")]
    fn set_goal(&self, Parameters(p): Parameters<SetGoalParams>) -> Result<CallToolResult, McpError> {
        let goal_type = GoalType::from_str(&p.goal_type).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown goal type: {}", p.goal_type), None)
        })?;

        let data = GoalCreate {
            goal_type,
            target_value: p.target_value,
            deadline: p.deadline,
        };
        let result = goals::set_goal(&self.database, &p.username, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "List a user's goals with progress percentages")]
    fn list_goals(&self, Parameters(p): Parameters<UsernameParams>) -> Result<CallToolResult, McpError> {
        let result = goals::list_goals(&self.database, &p.username)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "Update a goal's target, current value, deadline, or achieved flag")]
    fn update_goal(&self, Parameters(p): Parameters<UpdateGoalParams>) -> Result<CallToolResult, McpError> {
        let data = GoalUpdate {
            target_value: p.target_value,
            current_value: p.current_value,
            deadline: p.deadline,
            is_achieved: p.is_achieved,
        };
        let result = goals::update_goal(&self.database, p.id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(goal) => json_response(&goal),
            None => no_result_response("Goal not found"),
        }
    }

    #[tool(description = "Refresh every goal's current value from the user's most recent logs")]
    fn refresh_goal_progress(&self, Parameters(p): Parameters<UsernameParams>) -> Result<CallToolResult, McpError> {
        let result = goals::refresh_goal_progress(&self.database, &p.username)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "Delete a goal")]
    fn delete_goal(&self, Parameters(p): Parameters<DeleteGoalParams>) -> Result<CallToolResult, McpError> {
        let deleted = goals::delete_goal(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&serde_json::json!({ "deleted": deleted, "id": p.id }))
    }

    // --- Recommendations ---

    #[tool(description = "Regenerate rule-based recommendations from the user's last 7 days of logs and meals. Replaces the previous set.")]
    fn generate_recommendations(&self, Parameters(p): Parameters<UsernameParams>) -> Result<CallToolResult, McpError> {
        let result = recommendations::generate_recommendations(&self.database, &p.username)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "List a user's recommendations, optionally unread only")]
    fn list_recommendations(&self, Parameters(p): Parameters<ListRecommendationsParams>) -> Result<CallToolResult, McpError> {
        let result = recommendations::list_recommendations(&self.database, &p.username, p.unread_only)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "Mark a recommendation as read")]
    fn mark_recommendation_read(&self, Parameters(p): Parameters<MarkRecommendationReadParams>) -> Result<CallToolResult, McpError> {
        let updated = recommendations::mark_recommendation_read(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&serde_json::json!({ "updated": updated, "id": p.id }))
    }

    // --- Forecasts ---

    #[tool(description = "Forecast a metric by fitting a linear trend over the trailing window and projecting forward. Returns no result with fewer than 3 logged values.")]
    fn forecast_metric(&self, Parameters(p): Parameters<ForecastMetricParams>) -> Result<CallToolResult, McpError> {
        let metric = parse_metric(&p.metric)?;
        let result = forecasts::forecast_metric(&self.database, &p.username, metric, p.past_days, p.predict_days)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(forecast) => json_response(&forecast),
            None => no_result_response("Insufficient data to fit a trend (need at least 3 logged values in the window)"),
        }
    }

    #[tool(description = "Project weight and BMI from the energy-balance estimate (Mifflin-St Jeor TDEE vs average intake). Requires a profile and intake data.")]
    fn project_weight_bmi(&self, Parameters(p): Parameters<ProjectWeightBmiParams>) -> Result<CallToolResult, McpError> {
        let result = forecasts::project_user_weight_bmi(&self.database, &p.username, p.past_days, p.predict_days)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(projection) => json_response(&projection),
            None => no_result_response("Profile or intake data missing"),
        }
    }

    // --- Evaluation ---

    #[tool(description = "Back-test the forecaster for one metric: hold out the trailing test window and report R2, MAE, and RMSE")]
    fn evaluate_metric(&self, Parameters(p): Parameters<EvaluateMetricParams>) -> Result<CallToolResult, McpError> {
        let metric = parse_metric(&p.metric)?;
        let result = evaluation::evaluate_regression(&self.database, &p.username, metric, p.past_days, p.test_days)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(report) => json_response(&report),
            None => no_result_response("Insufficient data (need test_days + 3 logged values)"),
        }
    }

    #[tool(description = "Back-test the up/down direction call for one metric and report accuracy, precision, recall, and F1")]
    fn evaluate_direction(&self, Parameters(p): Parameters<EvaluateMetricParams>) -> Result<CallToolResult, McpError> {
        let metric = parse_metric(&p.metric)?;
        let result = evaluation::evaluate_direction(&self.database, &p.username, metric, p.past_days, p.test_days)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(report) => json_response(&report),
            None => no_result_response("Insufficient data (need test_days + 3 logged values)"),
        }
    }

    #[tool(description = "Evaluate all requested metrics (regression and direction) plus the weight/BMI projection for a user")]
    fn evaluate_user_performance(&self, Parameters(p): Parameters<EvaluateUserParams>) -> Result<CallToolResult, McpError> {
        let metrics = parse_metric_list(&p.metrics)?;
        let result = evaluation::evaluate_user(&self.database, &p.username, &metrics, p.past_days, p.test_days, p.predict_days)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "Aggregate evaluation results across a metric set into averaged regression and classification scores")]
    fn evaluate_overall_performance(&self, Parameters(p): Parameters<EvaluateUserParams>) -> Result<CallToolResult, McpError> {
        let metrics = parse_metric_list(&p.metrics)?;
        let result = evaluation::evaluate_overall(&self.database, &p.username, &metrics, p.past_days, p.test_days, p.predict_days)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }

    #[tool(description = "Back-test one metric and save the train/actual/predicted comparison chart as a PNG")]
    fn save_metric_chart(&self, Parameters(p): Parameters<SaveMetricChartParams>) -> Result<CallToolResult, McpError> {
        let metric = parse_metric(&p.metric)?;
        let out_path = p
            .out_path
            .unwrap_or_else(|| format!("{}_evaluation.png", metric.as_str()));
        let result = evaluation::save_metric_chart(&self.database, &p.username, metric, p.past_days, p.test_days, &out_path)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(chart) => json_response(&chart),
            None => no_result_response("Insufficient data (need test_days + 3 logged values)"),
        }
    }

    #[tool(description = "Evaluate a user's overall performance and save the two-panel summary bar chart as a PNG")]
    fn save_overall_chart(&self, Parameters(p): Parameters<SaveOverallChartParams>) -> Result<CallToolResult, McpError> {
        let metrics = parse_metric_list(&p.metrics)?;
        let summary = evaluation::evaluate_overall(&self.database, &p.username, &metrics, p.past_days, p.test_days, 14)
            .map_err(|e| McpError::internal_error(e, None))?;

        let out_path = p.out_path.unwrap_or_else(|| "overall_performance.png".to_string());
        let result = charts::generate_overall_chart(&summary, &out_path, 1200, 500)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_response(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for HealthTrackService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "healthtrack".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("HealthTrack".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "HealthTrack - personal health tracking with trend forecasting. \
                 IMPORTANT: Call logging_instructions before logging data and forecast_instructions before forecasting. \
                 Users: create_user, list_users. Profile: set_profile/get_profile (needed for weight projection). \
                 Daily logs: log_day/get_daily_log/list_daily_logs (one row per user per date; omitted metrics stay missing). \
                 Meals: log_meal/list_meals/get_daily_meal_totals. \
                 Goals: set_goal/list_goals/update_goal/refresh_goal_progress/delete_goal. \
                 Recommendations: generate_recommendations/list_recommendations/mark_recommendation_read. \
                 Forecasting: forecast_metric, project_weight_bmi. \
                 Evaluation: evaluate_metric, evaluate_direction, evaluate_user_performance, \
                 evaluate_overall_performance, save_overall_chart. \
                 'No result' responses mean insufficient data for new or sparse users; this is expected, not an error."
                    .into(),
            ),
        }
    }
}
