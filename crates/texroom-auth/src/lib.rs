//! # texroom-auth
//!
//! Authentication and authorization for TexRoom.
//!
//! ## Modules
//!
//! - `password`: Argon2id password hashing and credential policy
//! - `session`: Session lifecycle (signup, login, logout, validation, cleanup)
//! - `access`: Room role resolution and guards

pub mod access;
pub mod password;
pub mod session;

pub use access::role_of;
pub use password::{PasswordHasher, PasswordValidator};
pub use session::{LoginResult, SessionCleanup, SessionManager};
