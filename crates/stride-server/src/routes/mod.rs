pub mod assistant;
pub mod events;
pub mod progress;
pub mod weeks;
