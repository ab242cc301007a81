// Disease advisor
//
// Turns an image classifier's verdict (crop, condition, confidence) into a
// report with reference guidance, severity and urgency. Seasonal tips and
// treatment cost bands are exposed alongside.

use crate::db::{Database, PredictionInput, PredictionKind};
use crate::error::{AdvisorError, Result};
use crate::intelligence::{
    is_healthy, CostEstimate, CostTier, DiseaseGuidance, DiseaseTable, Season, Severity, Urgency,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Crop and condition split out of a classifier label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantLabel {
    pub crop: String,
    pub condition: String,
}

impl PlantLabel {
    /// Parse `Tomato___Late_blight` style labels; underscores become spaces
    pub fn parse(label: &str) -> Result<Self> {
        let mut parts = label.trim().split("___");

        match (parts.next(), parts.next(), parts.next()) {
            (Some(crop), Some(condition), None) if !crop.is_empty() && !condition.is_empty() => {
                Ok(Self {
                    crop: crop.replace('_', " "),
                    condition: condition.replace('_', " "),
                })
            }
            _ => Err(AdvisorError::InvalidInput(format!(
                "expected a label like 'Tomato___Late_blight', got '{}'",
                label
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum Diagnosis {
    Healthy {
        recommendations: Vec<String>,
    },
    Diseased {
        /// Table entry the condition matched, if any
        matched: Option<String>,
        guidance: DiseaseGuidance,
        severity: Severity,
        urgency: Urgency,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct DiseaseReport {
    pub crop: String,
    pub condition: String,
    pub confidence: f64,
    pub diagnosis: Diagnosis,
}

impl DiseaseReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self.diagnosis, Diagnosis::Healthy { .. })
    }

    pub fn render(&self) -> String {
        let mut out = Vec::new();

        match &self.diagnosis {
            Diagnosis::Healthy { recommendations } => {
                out.push("Status:     HEALTHY".to_string());
                out.push(format!("Crop:       {}", self.crop));
                out.push(format!("Confidence: {:.1}%", self.confidence * 100.0));
                out.push(String::new());
                out.push(format!(
                    "Your {} plant appears to be healthy! No disease symptoms detected.",
                    self.crop
                ));
                push_section(&mut out, "Maintenance recommendations", recommendations);
            }
            Diagnosis::Diseased {
                guidance,
                severity,
                urgency,
                ..
            } => {
                out.push(format!("Crop:       {}", self.crop));
                out.push(format!("Condition:  {}", self.condition));
                out.push(format!("Confidence: {:.1}%", self.confidence * 100.0));
                out.push(format!("Severity:   {}", severity));
                out.push(format!("Urgency:    {}", urgency));
                out.push(String::new());
                out.push(guidance.description.clone());
                push_section(&mut out, "Primary causes", &guidance.causes);
                push_section(&mut out, "Symptoms to monitor", &guidance.symptoms);
                push_section(&mut out, "Prevention", &guidance.prevention);
                push_section(&mut out, "Treatment options", &guidance.treatment);
                push_section(&mut out, "Organic solutions", &guidance.organic_solutions);
            }
        }

        out.join("\n")
    }
}

fn push_section(out: &mut Vec<String>, title: &str, items: &[String]) {
    out.push(String::new());
    out.push(format!("{}:", title));
    out.extend(items.iter().map(|item| format!("  - {}", item)));
}

pub struct DiseaseAdvisor {
    table: Arc<DiseaseTable>,
    db: Option<Arc<Database>>,
}

impl DiseaseAdvisor {
    pub fn new(table: Arc<DiseaseTable>) -> Self {
        Self { table, db: None }
    }

    /// Record every report in `db`
    pub fn with_database(mut self, db: Arc<Database>) -> Self {
        self.db = Some(db);
        self
    }

    /// Build a report for a detected condition
    ///
    /// # Arguments
    /// * `confidence` - Classifier probability in `0.0..=1.0`
    ///
    /// # Returns
    /// * `Err(AdvisorError::InvalidInput)` - blank crop or condition, or confidence out of range
    pub async fn assess(
        &self,
        crop: &str,
        condition: &str,
        confidence: f64,
    ) -> Result<DiseaseReport> {
        let crop = crop.trim();
        let condition = condition.trim();

        if crop.is_empty() || condition.is_empty() {
            return Err(AdvisorError::InvalidInput(
                "crop and condition are required".to_string(),
            ));
        }
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(AdvisorError::InvalidInput(format!(
                "confidence must be between 0 and 1, got {}",
                confidence
            )));
        }

        let diagnosis = if is_healthy(condition) {
            Diagnosis::Healthy {
                recommendations: self.table.healthy_recommendations().to_vec(),
            }
        } else {
            let (matched, guidance) = match self.table.lookup(condition) {
                Some(info) => (Some(info.name.clone()), info.guidance.clone()),
                None => {
                    let mut guidance = self.table.generic().clone();
                    guidance.description = format!("Disease detected in {}: {}", crop, condition);
                    (None, guidance)
                }
            };
            debug!(condition, matched = ?matched, "disease lookup");

            Diagnosis::Diseased {
                matched,
                guidance,
                severity: Severity::assess(condition, confidence),
                urgency: Urgency::assess(condition),
            }
        };

        let report = DiseaseReport {
            crop: crop.to_string(),
            condition: condition.to_string(),
            confidence,
            diagnosis,
        };

        if let Some(db) = &self.db {
            let input = PredictionInput {
                kind: PredictionKind::Disease,
                inputs: json!({
                    "crop": report.crop,
                    "condition": report.condition,
                    "confidence": report.confidence,
                }),
                output: report.render(),
            };
            if let Err(e) = db.record_prediction(input).await {
                warn!(error = %e, "could not record disease report");
            }
        }

        Ok(report)
    }

    /// Disease management tips for the season `month` (1-12) falls in
    pub fn seasonal_recommendations(&self, month: u32) -> (Season, &'static [&'static str]) {
        let season = Season::from_month(month);
        (season, season.recommendations())
    }

    pub fn estimate_cost(&self, condition: &str, tier: CostTier) -> CostEstimate {
        self.table.costs().estimate(condition, tier)
    }
}
