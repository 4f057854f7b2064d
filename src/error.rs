use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("File '{}' not found or unreadable: {reason}", path.display())]
    NotFound { path: PathBuf, reason: String },

    #[error("Invalid data format: {0}")]
    Format(String),

    #[error("Input is {size} bytes, which exceeds the limit of {limit} bytes")]
    InputTooLarge { size: u64, limit: u64 },

    #[error("Missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet parsing error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{message}")]
    Upload { status: u16, message: String },
}

/// Coarse classification used for exit codes and HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Format,
    Schema,
    Upload,
    Internal,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::NotFound { .. } => ErrorKind::NotFound,
            AnalysisError::Format(_)
            | AnalysisError::InputTooLarge { .. }
            | AnalysisError::Csv(_)
            | AnalysisError::Spreadsheet(_) => ErrorKind::Format,
            AnalysisError::Schema { .. } => ErrorKind::Schema,
            AnalysisError::Upload { .. } => ErrorKind::Upload,
            AnalysisError::Io(_)
            | AnalysisError::Json(_)
            | AnalysisError::Config(_)
            | AnalysisError::Validation(_) => ErrorKind::Internal,
        }
    }

    /// True for the errors that stop the pipeline before any row is cleaned.
    pub fn is_fatal_input_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::Format | ErrorKind::Schema
        )
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind() {
            ErrorKind::NotFound => 2,
            ErrorKind::Format => 3,
            ErrorKind::Schema => 4,
            ErrorKind::Upload => 5,
            ErrorKind::Internal => 1,
        }
    }
}
