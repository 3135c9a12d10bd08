pub mod clock;
pub mod config;
pub mod curriculum;
pub mod directive;
pub mod error;
pub mod io;
pub mod overlay;
pub mod paths;
pub mod progress;
pub mod report;
pub mod store;
pub mod tracker;
pub mod types;

pub use error::{Result, StrideError};
pub use tracker::Tracker;
