//! Tabular dataset store: safe file resolution, loading, type-aware sorting
//! and numeric summaries over delimited report tables.

pub mod detail;
pub mod error;
pub mod sort;
pub mod store;
pub mod summary;

pub use detail::*;
pub use error::*;
pub use sort::*;
pub use store::*;
pub use summary::*;
