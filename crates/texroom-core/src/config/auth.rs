//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Credential policy and session cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Minimum password length accepted at signup.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Name of the cookie carrying the raw session token.
    #[serde(default = "default_cookie_name")]
    pub session_cookie: String,
    /// Name of the cookie carrying the display name for the frontend.
    #[serde(default = "default_username_cookie")]
    pub username_cookie: String,
    /// Mark cookies `Secure` (HTTPS only).
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_min_length: default_password_min(),
            session_cookie: default_cookie_name(),
            username_cookie: default_username_cookie(),
            secure_cookies: false,
        }
    }
}

fn default_password_min() -> usize {
    8
}

fn default_cookie_name() -> String {
    "session_id".to_string()
}

fn default_username_cookie() -> String {
    "username".to_string()
}
