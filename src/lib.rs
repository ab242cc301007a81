/// farmgenie library
///
/// Farming advice engine: keyword-matched chat answers with an optional
/// remote language model, and soil nutrient remediation plans.

pub mod core;
pub mod db;
pub mod error;
pub mod intelligence;
pub mod llm;
pub mod settings;

// Re-exports for convenience
pub use db::Database;
pub use error::{AdvisorError, Result};
pub use settings::Settings;
