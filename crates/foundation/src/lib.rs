pub mod bounds;
pub mod stats;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use stats::*;
pub use time::*;
