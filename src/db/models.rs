/// Data models for database entities
///
/// All models map to database tables and use sqlx for type-safe queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored advisory result
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Prediction {
    pub id: i64,
    pub kind: String,   // 'fertilizer', 'disease' or 'chat'
    pub inputs: String, // JSON object
    pub output: String,
    pub timestamp: String, // RFC 3339
}

impl Prediction {
    /// Parse inputs from JSON
    pub fn get_inputs(&self) -> serde_json::Value {
        serde_json::from_str(&self.inputs).unwrap_or(serde_json::json!({}))
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Timestamp as `YYYY-MM-DD HH:MM:SS`, or the raw column if unparsable
    pub fn display_time(&self) -> String {
        self.recorded_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.timestamp.clone())
    }
}

/// Input for recording a new prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionInput {
    pub kind: PredictionKind,
    pub inputs: serde_json::Value,
    pub output: String,
}

/// What produced a prediction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PredictionKind {
    Fertilizer,
    Disease,
    Chat,
}

impl std::fmt::Display for PredictionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PredictionKind::Fertilizer => "fertilizer",
            PredictionKind::Disease => "disease",
            PredictionKind::Chat => "chat",
        };
        write!(f, "{}", s)
    }
}
