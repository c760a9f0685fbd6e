pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod report;
pub mod roster;
pub mod store;

pub use error::{GroupingError, Result};
