use std::path::PathBuf;

use crate::domain::Dimension;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Reference dataset does not have the columns the model builder needs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("No crop identifier column found (expected one of {candidates:?}); columns present: {columns:?}")]
    NoIdentifierColumn {
        candidates: Vec<String>,
        columns: Vec<String>,
    },
    #[error("Missing required feature column `{column}` in crop dataset")]
    MissingFeatureColumn { column: String },
    #[error("Failed to read crop table '{path}': {message}")]
    Unreadable { path: PathBuf, message: String },
}

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        AppError::new(2, err.to_string())
    }
}

/// Scoring precondition violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("Sensor reading `{0}` is missing; complete the sensor vector before scoring")]
    MissingDimension(Dimension),
    #[error("Invalid scoring parameter: {0}")]
    InvalidParameter(String),
    #[error("No crop profiles to score")]
    NoProfiles,
}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        let code = match err {
            ScoreError::MissingDimension(_) | ScoreError::InvalidParameter(_) => 2,
            ScoreError::NoProfiles => 3,
        };
        AppError::new(code, err.to_string())
    }
}
