mod details;
mod pagination;
mod processing;

pub use details::*;
pub use pagination::*;
pub use processing::*;
