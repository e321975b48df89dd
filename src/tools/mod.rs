//! HealthTrack Tools module
//!
//! Business operations behind the MCP tools and the evaluation CLI.

pub mod charts;
pub mod evaluation;
pub mod forecasts;
pub mod goals;
pub mod logs;
pub mod meals;
pub mod profile;
pub mod recommendations;
pub mod status;
pub mod users;
