pub mod chat;
pub mod notes;
pub mod progress;
pub mod report;
pub mod serve;
pub mod task;
pub mod theme;
pub mod week;
