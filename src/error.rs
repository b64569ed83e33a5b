use thiserror::Error;

/// Failures raised by a `Storage` backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("referenced {entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i64 },

    #[error("venue {venue_id} still has {count} show(s)")]
    HasShows { venue_id: i64, count: i64 },

    #[error("start time {0} is outside the supported years")]
    StartTimeOutOfRange(chrono::NaiveDateTime),

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("JSON (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<libsql::Error> for StoreError {
    fn from(e: libsql::Error) -> Self {
        StoreError::Database {
            message: e.to_string(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Startup errors: configuration, logging setup, binding the listener.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, AppError>;
