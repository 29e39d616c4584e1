mod catalog;
mod processing;

pub use catalog::*;
pub use processing::*;
