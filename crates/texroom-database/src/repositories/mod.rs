//! PostgreSQL repository implementations of the record store traits.

pub mod room;
pub mod session;
pub mod user;

pub use room::RoomRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
