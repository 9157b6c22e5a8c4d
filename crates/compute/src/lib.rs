pub mod analysis;
pub mod report;

pub use analysis::breakdown::*;
pub use analysis::profile::*;
pub use analysis::risk::*;
pub use report::*;
