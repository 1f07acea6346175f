//! imgcap Server - HTTP front end for size-bounded image re-encoding
//!
//! Exposes `POST /upload`, which screens an image through an optional
//! moderation service and returns it re-encoded under a size budget.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod moderation;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use moderation::{ModerationClient, ModerationVerdict, Moderator};
pub use routes::router;
pub use state::AppState;
