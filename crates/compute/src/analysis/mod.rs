pub mod breakdown;
pub mod profile;
pub mod risk;
