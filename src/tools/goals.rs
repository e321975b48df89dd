//! Goal tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{DailyLog, Goal, GoalCreate, GoalType, GoalUpdate, Metric};

use super::users::require_user;

/// Goal details with derived progress
#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub id: i64,
    pub goal_type: String,
    pub goal_name: String,
    pub target_value: f64,
    pub current_value: f64,
    pub progress_percentage: f64,
    pub deadline: String,
    pub is_achieved: bool,
}

/// Response for list_goals
#[derive(Debug, Serialize)]
pub struct ListGoalsResponse {
    pub username: String,
    pub goals: Vec<GoalResponse>,
    pub total: usize,
}

fn to_response(goal: &Goal) -> GoalResponse {
    GoalResponse {
        id: goal.id,
        goal_type: goal.goal_type.as_str().to_string(),
        goal_name: goal.goal_type.display_name().to_string(),
        target_value: goal.target_value,
        current_value: goal.current_value,
        progress_percentage: goal.progress_percentage(),
        deadline: goal.deadline.clone(),
        is_achieved: goal.is_achieved,
    }
}

/// Metric that feeds a goal's current value
fn tracking_metric(goal_type: GoalType) -> Metric {
    match goal_type {
        GoalType::Weight => Metric::Weight,
        GoalType::Steps => Metric::Steps,
        GoalType::Exercise => Metric::ExerciseDuration,
        GoalType::Sleep => Metric::SleepHours,
        GoalType::Water => Metric::WaterIntake,
    }
}

/// Create a goal for a user
pub fn set_goal(db: &Database, username: &str, data: GoalCreate) -> Result<GoalResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let goal = Goal::create(&conn, user.id, &data)
        .map_err(|e| format!("Failed to create goal: {}", e))?;

    Ok(to_response(&goal))
}

/// List a user's goals
pub fn list_goals(db: &Database, username: &str) -> Result<ListGoalsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let goals = Goal::list_for_user(&conn, user.id)
        .map_err(|e| format!("Failed to list goals: {}", e))?;

    let responses: Vec<GoalResponse> = goals.iter().map(to_response).collect();
    let total = responses.len();

    Ok(ListGoalsResponse {
        username: username.to_string(),
        goals: responses,
        total,
    })
}

/// Update a goal's fields
pub fn update_goal(
    db: &Database,
    id: i64,
    data: GoalUpdate,
) -> Result<Option<GoalResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let goal = Goal::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update goal: {}", e))?;

    Ok(goal.map(|g| to_response(&g)))
}

/// Refresh every goal's current value from the user's most recent log that
/// carries the tracked metric. Steps/exercise/sleep/water goals also flip
/// is_achieved once the target is reached.
pub fn refresh_goal_progress(
    db: &Database,
    username: &str,
) -> Result<ListGoalsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let user = require_user(&conn, username)?;

    let goals = Goal::list_for_user(&conn, user.id)
        .map_err(|e| format!("Failed to list goals: {}", e))?;
    let logs = DailyLog::list(&conn, user.id, None, None, 90, 0)
        .map_err(|e| format!("Failed to load daily logs: {}", e))?;

    let mut refreshed = Vec::with_capacity(goals.len());
    for goal in goals {
        let metric = tracking_metric(goal.goal_type);
        // Logs come newest-first; take the most recent value present
        let latest = logs.iter().find_map(|log| metric.value(log));

        let updated = match latest {
            Some(value) => {
                // Weight targets can sit below the current value, so they stay
                // manually confirmed
                let achieved = goal.goal_type != GoalType::Weight && value >= goal.target_value;
                Goal::update(
                    &conn,
                    goal.id,
                    &GoalUpdate {
                        current_value: Some(value),
                        is_achieved: Some(achieved || goal.is_achieved),
                        ..Default::default()
                    },
                )
                .map_err(|e| format!("Failed to update goal: {}", e))?
                .unwrap_or(goal)
            }
            None => goal,
        };

        refreshed.push(to_response(&updated));
    }

    let total = refreshed.len();
    Ok(ListGoalsResponse {
        username: username.to_string(),
        goals: refreshed,
        total,
    })
}

/// Delete a goal
pub fn delete_goal(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Goal::delete(&conn, id).map_err(|e| format!("Failed to delete goal: {}", e))
}
