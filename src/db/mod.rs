/// Database module for farmgenie
///
/// Prediction history in SQLite through sqlx, with connection pooling.

pub mod connection;
pub mod models;
pub mod queries;

pub use connection::{Database, DatabaseStats};
pub use models::*;
