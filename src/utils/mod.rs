//! Shared utilities

pub mod error;
pub mod time;

pub use error::{AppError, AppResult, ErrorResponse};
pub use time::{format_secs, format_time};
