use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrideError {
    #[error("week not found: {0}")]
    WeekNotFound(u32),

    #[error("task '{task}' not found in week {week}")]
    TaskNotFound { week: u32, task: String },

    #[error("invalid day '{0}': expected mon..sun or 1..7")]
    InvalidDay(String),

    #[error("invalid theme: {0}")]
    InvalidTheme(String),

    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("curriculum is empty")]
    EmptyCurriculum,

    #[error("store error: {0}")]
    Store(String),

    #[error("home directory not found: set HOME or pass --data-dir")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StrideError>;
