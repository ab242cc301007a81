/// SQL query functions for database operations
///
/// All queries use sqlx with bound parameters.

use crate::db::models::*;
use crate::db::Database;
use crate::error::Result;
use chrono::{SecondsFormat, Utc};
use sqlx::Row;

impl Database {
    /// Store an advisory result
    ///
    /// # Returns
    /// * `Ok(i64)` - The prediction ID
    pub async fn record_prediction(&self, input: PredictionInput) -> Result<i64> {
        let inputs = serde_json::to_string(&input.inputs)?;
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let result = sqlx::query(
            r#"
            INSERT INTO predictions (kind, inputs, output, timestamp)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(input.kind.to_string())
        .bind(inputs)
        .bind(&input.output)
        .bind(timestamp)
        .fetch_one(self.pool())
        .await?;

        let id: i64 = result.get(0);
        tracing::info!(id, kind = %input.kind, "prediction recorded");

        Ok(id)
    }

    /// Most recent predictions first
    ///
    /// # Arguments
    /// * `kind` - Optional filter (None for every kind)
    /// * `limit` - Maximum number of rows to return
    pub async fn get_recent_predictions(
        &self,
        kind: Option<PredictionKind>,
        limit: i64,
    ) -> Result<Vec<Prediction>> {
        let predictions = if let Some(kind) = kind {
            sqlx::query_as::<_, Prediction>(
                "SELECT * FROM predictions WHERE kind = ? ORDER BY timestamp DESC, id DESC LIMIT ?",
            )
            .bind(kind.to_string())
            .bind(limit)
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, Prediction>(
                "SELECT * FROM predictions ORDER BY timestamp DESC, id DESC LIMIT ?",
            )
            .bind(limit)
            .fetch_all(self.pool())
            .await?
        };

        Ok(predictions)
    }

    pub async fn get_prediction_by_id(&self, id: i64) -> Result<Option<Prediction>> {
        let prediction = sqlx::query_as::<_, Prediction>("SELECT * FROM predictions WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(prediction)
    }

    /// Remove a prediction; returns whether a row was deleted
    pub async fn delete_prediction(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM predictions WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fertilizer_input(crop: &str) -> PredictionInput {
        PredictionInput {
            kind: PredictionKind::Fertilizer,
            inputs: json!({
                "crop": crop,
                "N": 20,
                "P": 40,
                "K": 40,
                "pH": 6.5,
                "soil_moisture": 50,
            }),
            output: "Nitrogen deficiency.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_and_retrieve_prediction() {
        let db = Database::new_test().await.unwrap();

        let id = db.record_prediction(fertilizer_input("rice")).await.unwrap();
        assert!(id > 0);

        let pred = db.get_prediction_by_id(id).await.unwrap().unwrap();
        assert_eq!(pred.kind, "fertilizer");
        assert_eq!(pred.output, "Nitrogen deficiency.");
        assert_eq!(pred.get_inputs()["crop"], "rice");
        assert!(pred.recorded_at().is_some());
    }

    #[tokio::test]
    async fn test_recent_predictions_newest_first() {
        let db = Database::new_test().await.unwrap();

        for crop in ["rice", "maize", "cotton"] {
            db.record_prediction(fertilizer_input(crop)).await.unwrap();
        }

        let recent = db.get_recent_predictions(None, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].get_inputs()["crop"], "cotton");
        assert_eq!(recent[1].get_inputs()["crop"], "maize");
    }

    #[tokio::test]
    async fn test_recent_predictions_by_kind() {
        let db = Database::new_test().await.unwrap();

        db.record_prediction(fertilizer_input("rice")).await.unwrap();
        db.record_prediction(PredictionInput {
            kind: PredictionKind::Chat,
            inputs: json!({ "message": "pm kisan scheme" }),
            output: "GOVERNMENT SCHEMES".to_string(),
        })
        .await
        .unwrap();

        let chats = db
            .get_recent_predictions(Some(PredictionKind::Chat), 10)
            .await
            .unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].kind, "chat");

        let stats = db.stats().await.unwrap();
        assert_eq!(stats.total_predictions, 2);
        assert_eq!(stats.fertilizer_predictions, 1);
        assert_eq!(stats.chat_predictions, 1);
    }

    #[tokio::test]
    async fn test_missing_prediction() {
        let db = Database::new_test().await.unwrap();
        assert!(db.get_prediction_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_prediction() {
        let db = Database::new_test().await.unwrap();

        let id = db.record_prediction(fertilizer_input("jute")).await.unwrap();
        assert!(db.delete_prediction(id).await.unwrap());
        assert!(!db.delete_prediction(id).await.unwrap());
    }
}
