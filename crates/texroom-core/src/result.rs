//! Convenience result type alias for TexRoom.

use crate::error::AppError;

/// A specialized `Result` type for TexRoom operations.
pub type AppResult<T> = Result<T, AppError>;
