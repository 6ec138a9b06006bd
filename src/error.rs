use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContribError>;

/// Everything that can abort a run. None of these are retried.
#[derive(Error, Debug)]
pub enum ContribError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid '{field}' date format: {value:?} (expected YYYY-MM-DD)")]
    InvalidDateFormat { field: &'static str, value: String },

    #[error("'from' date ({from}) must not be after 'to' date ({to})")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("error from github api: {0}")]
    Fetch(String),

    #[error("configuration error: {0}")]
    Config(String),
}
