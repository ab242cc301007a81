// Fertilizer advisor
//
// Looks up the crop's targets, runs the rule resolver and optionally keeps
// the result in the prediction history.

use crate::core::CropReference;
use crate::db::{Database, PredictionInput, PredictionKind};
use crate::error::{AdvisorError, Result};
use crate::intelligence::{NutrientRuleResolver, NutrientTargets, SoilReading};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

const NO_ACTION: &str = "No action needed: nutrients, pH and moisture are all on target.";

#[derive(Debug, Clone, Serialize)]
pub struct FertilizerAdvice {
    pub crop: String,
    pub measured: SoilReading,
    pub recommended: NutrientTargets,
    pub advisories: Vec<String>,
}

impl FertilizerAdvice {
    pub fn needs_action(&self) -> bool {
        !self.advisories.is_empty()
    }

    /// Advisories separated by blank lines
    pub fn render(&self) -> String {
        if self.advisories.is_empty() {
            NO_ACTION.to_string()
        } else {
            self.advisories.join("\n\n")
        }
    }
}

pub struct FertilizerAdvisor {
    reference: Arc<CropReference>,
    resolver: NutrientRuleResolver,
    db: Option<Arc<Database>>,
}

impl FertilizerAdvisor {
    pub fn new(reference: Arc<CropReference>, resolver: NutrientRuleResolver) -> Self {
        Self {
            reference,
            resolver,
            db: None,
        }
    }

    /// Record every piece of advice in `db`
    pub fn with_database(mut self, db: Arc<Database>) -> Self {
        self.db = Some(db);
        self
    }

    pub async fn advise(&self, crop: &str, measured: SoilReading) -> Result<FertilizerAdvice> {
        validate_reading(&measured)?;

        let entry = self.reference.lookup(crop)?;
        let recommended = entry.targets();
        let advisories = self.resolver.resolve(&measured, &recommended);

        let advice = FertilizerAdvice {
            crop: entry.crop.clone(),
            measured,
            recommended,
            advisories,
        };

        if let Some(db) = &self.db {
            let input = PredictionInput {
                kind: PredictionKind::Fertilizer,
                inputs: json!({
                    "crop": advice.crop,
                    "N": measured.n,
                    "P": measured.p,
                    "K": measured.k,
                    "pH": measured.ph,
                    "soil_moisture": measured.moisture,
                }),
                output: advice.render(),
            };
            if let Err(e) = db.record_prediction(input).await {
                warn!(error = %e, "could not record fertilizer advice");
            }
        }

        Ok(advice)
    }
}

// The resolver trusts its input; reject readings no soil test can produce
fn validate_reading(reading: &SoilReading) -> Result<()> {
    if reading.n < 0 || reading.p < 0 || reading.k < 0 {
        return Err(AdvisorError::InvalidInput(
            "nutrient levels cannot be negative".to_string(),
        ));
    }

    if !reading.ph.is_finite() || !(0.0..=14.0).contains(&reading.ph) {
        return Err(AdvisorError::InvalidInput(format!(
            "pH must be between 0 and 14, got {}",
            reading.ph
        )));
    }

    if !reading.moisture.is_finite() || !(0.0..=100.0).contains(&reading.moisture) {
        return Err(AdvisorError::InvalidInput(format!(
            "soil moisture must be a percentage, got {}",
            reading.moisture
        )));
    }

    Ok(())
}
