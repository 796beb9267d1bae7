//! Credential policy for new accounts.

use texroom_core::config::auth::AuthConfig;
use texroom_core::error::AppError;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;

/// Validates usernames and passwords at signup.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Password must be at least the configured length, counted in characters.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        Ok(())
    }

    /// Username must be 3 to 32 characters of ASCII letters, digits, `_`, `.` or `-`.
    pub fn validate_username(&self, username: &str) -> Result<(), AppError> {
        let len = username.len();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
            return Err(AppError::validation(format!(
                "Username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
            )));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(AppError::validation(
                "Username may only contain letters, digits, '_', '.' and '-'",
            ));
        }
        Ok(())
    }
}
