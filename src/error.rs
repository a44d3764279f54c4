use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrgCheckError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Gemini API error (status {status}): {message}")]
    Transport { status: u16, message: String },

    #[error("API request blocked. Reason: {reason}")]
    Blocked { reason: String },

    #[error("Unexpected response shape: {0}")]
    UnexpectedResponse(String),

    #[error("Verdict parse error: {message}")]
    VerdictParse { message: String, raw: String },

    #[error("The model returned an empty reply")]
    EmptyReply,

    #[error("Invalid review end line {0}: must be 1 or greater")]
    InvalidReviewBound(u32),

    #[error("Cell access error at row {row}, column {column}: {message}")]
    Cell {
        row: u32,
        column: u32,
        message: String,
    },

    #[error("Unknown error code: {0}")]
    UnknownErrorCode(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, FrgCheckError>;
