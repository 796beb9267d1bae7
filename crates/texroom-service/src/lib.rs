//! # texroom-service
//!
//! Business logic for TexRoom. The room service orchestrates the room and
//! user stores behind access-control guards; the conversion module turns
//! raw buffer text into LaTeX markup.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod conversion;
pub mod room;

pub use conversion::{Converter, LlmConverter, PassthroughConverter, build_converter};
pub use room::{RoomDetail, RoomService, RoomSummary};
