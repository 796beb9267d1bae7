//! Room broadcast groups and message fan-out.

pub mod fanout;
pub mod registry;

pub use fanout::Fanout;
pub use registry::ChannelRegistry;
