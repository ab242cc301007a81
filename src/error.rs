/// Error types for farmgenie
///
/// Every fallible operation in the crate returns `AdvisorError`.
/// Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Main error type for farmgenie operations
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O errors (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be loaded or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Caller supplied input the components cannot work with
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Crop is missing from the nutrient reference table
    #[error("Unknown crop: {0}")]
    UnknownCrop(String),

    /// Knowledge base data is malformed
    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    /// Fertilizer rule table data is malformed
    #[error("Rule table error: {0}")]
    RuleTable(String),

    /// Remote language model failed or answered with garbage
    #[error("Language model error: {0}")]
    Model(String),
}

/// Result type alias for farmgenie operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Convert AdvisorError to a user-friendly error message
impl AdvisorError {
    pub fn user_message(&self) -> String {
        match self {
            AdvisorError::Database(e) => {
                format!("Database error occurred. Please try again. Details: {}", e)
            }
            AdvisorError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            AdvisorError::Config(e) => {
                format!("Configuration issue: {}", e)
            }
            AdvisorError::Serialization(e) => {
                format!("Data format error: {}", e)
            }
            AdvisorError::Http(e) => {
                format!("Network request failed. Details: {}", e)
            }
            AdvisorError::InvalidInput(reason) => {
                format!("Invalid input: {}", reason)
            }
            AdvisorError::UnknownCrop(crop) => {
                format!(
                    "Crop '{}' is not in the reference table. Run 'farmgenie crops' to list supported crops",
                    crop
                )
            }
            AdvisorError::KnowledgeBase(msg) => {
                format!("Knowledge base could not be loaded: {}", msg)
            }
            AdvisorError::RuleTable(msg) => {
                format!("Fertilizer rules could not be loaded: {}", msg)
            }
            AdvisorError::Model(msg) => {
                format!("Language model unavailable: {}", msg)
            }
        }
    }
}
