use thiserror::Error;

use crate::{BucketMode, Resolution};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid price literal: {0:?}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Resolution '{resolution}' is not supported in {mode} mode")]
    UnsupportedResolution {
        resolution: Resolution,
        mode: BucketMode,
    },

    #[error("Division by zero: 24h base price is zero")]
    DivisionByZero,

    #[error("Decimal overflow while computing {0}")]
    Overflow(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Quote source error: {0}")]
    Source(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
