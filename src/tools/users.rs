//! User account tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{DailyLog, User};

/// Response for create_user
#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub id: i64,
    pub username: String,
    pub created: bool, // false if the username already existed
}

/// User summary for listing
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub log_count: i64,
    pub created_at: String,
}

/// Response for list_users
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserSummary>,
    pub total: usize,
}

/// Create a user, or return the existing row for the username
pub fn create_user(db: &Database, username: &str) -> Result<CreateUserResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if let Some(user) = User::get_by_username(&conn, username)
        .map_err(|e| format!("Failed to look up user: {}", e))?
    {
        return Ok(CreateUserResponse {
            id: user.id,
            username: user.username,
            created: false,
        });
    }

    let user = User::create(&conn, username).map_err(|e| format!("Failed to create user: {}", e))?;
    Ok(CreateUserResponse {
        id: user.id,
        username: user.username,
        created: true,
    })
}

/// List all users with their log counts
pub fn list_users(db: &Database) -> Result<ListUsersResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let users = User::list(&conn).map_err(|e| format!("Failed to list users: {}", e))?;

    let mut summaries = Vec::with_capacity(users.len());
    for user in users {
        let log_count = DailyLog::count_for_user(&conn, user.id)
            .map_err(|e| format!("Failed to count logs: {}", e))?;
        summaries.push(UserSummary {
            id: user.id,
            username: user.username,
            log_count,
            created_at: user.created_at,
        });
    }

    let total = summaries.len();
    Ok(ListUsersResponse { users: summaries, total })
}

/// Resolve a username to a user row, as an error message when absent
pub fn require_user(conn: &rusqlite::Connection, username: &str) -> Result<User, String> {
    User::get_by_username(conn, username)
        .map_err(|e| format!("Failed to look up user: {}", e))?
        .ok_or_else(|| format!("User not found: {}", username))
}
