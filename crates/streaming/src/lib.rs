//! Presence data: upstream payload cleaning, the single-flight TTL cache and
//! the service combining them.

pub mod cache;
pub mod protocol;
pub mod residency;
pub mod source;

pub use cache::*;
pub use protocol::*;
pub use residency::*;
pub use source::*;
