pub mod boundary;
pub mod error;
pub mod table;
pub mod value;

pub use boundary::*;
pub use error::*;
pub use table::*;
pub use value::*;
