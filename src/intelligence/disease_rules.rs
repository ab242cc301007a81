/// Plant disease rules
///
/// Reference guidance per disease, severity and urgency grading from a
/// classifier's condition label and confidence, and treatment cost bands.
/// The classifier itself lives elsewhere; everything here is table lookups
/// and substring checks on its output.

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

const BUILTIN_DISEASES: &str = include_str!("../../data/disease_info.json");

/// Confidence above which a severe disease is critical
pub const CRITICAL_CONFIDENCE: f64 = 0.8;
/// Confidence above which a moderate disease is worth treating now
pub const MODERATE_CONFIDENCE: f64 = 0.7;

const SEVERE_DISEASES: &[&str] = &[
    "late blight",
    "black rot",
    "haunglongbing",
    "citrus greening",
    "yellow leaf curl virus",
    "mosaic virus",
    "esca",
];

const MODERATE_DISEASES: &[&str] = &[
    "early blight",
    "bacterial spot",
    "powdery mildew",
    "leaf spot",
    "rust",
    "scab",
    "leaf blight",
];

const URGENT_DISEASES: &[&str] = &[
    "late blight",
    "haunglongbing",
    "citrus greening",
    "black rot",
    "yellow leaf curl virus",
    "esca",
];

fn mentions_any(condition: &str, names: &[&str]) -> bool {
    names.iter().any(|name| condition.contains(name))
}

/// True when the label says the plant has no disease
pub fn is_healthy(condition: &str) -> bool {
    condition.to_lowercase().contains("healthy")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Moderate,
    LowToModerate,
    Monitor,
}

impl Severity {
    /// Grade a detected condition
    ///
    /// Severe diseases are critical above 0.8 confidence and high otherwise.
    /// Moderate diseases are moderate above 0.7 and low-to-moderate otherwise.
    /// Anything else is left to monitoring.
    pub fn assess(condition: &str, confidence: f64) -> Self {
        let condition = condition.to_lowercase();

        if mentions_any(&condition, SEVERE_DISEASES) {
            if confidence > CRITICAL_CONFIDENCE {
                Severity::Critical
            } else {
                Severity::High
            }
        } else if mentions_any(&condition, MODERATE_DISEASES) {
            if confidence > MODERATE_CONFIDENCE {
                Severity::Moderate
            } else {
                Severity::LowToModerate
            }
        } else {
            Severity::Monitor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical - Immediate action required",
            Severity::High => "High - Prompt treatment needed",
            Severity::Moderate => "Moderate - Treatment recommended",
            Severity::LowToModerate => "Low to Moderate - Monitor closely",
            Severity::Monitor => "Monitor and assess",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    LowToMedium,
}

impl Urgency {
    /// How soon to act; bacterial and viral conditions outrank the rest
    pub fn assess(condition: &str) -> Self {
        let condition = condition.to_lowercase();

        if mentions_any(&condition, URGENT_DISEASES) {
            Urgency::High
        } else if condition.contains("bacterial") || condition.contains("virus") {
            Urgency::Medium
        } else {
            Urgency::LowToMedium
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::High => "High - Act within 24-48 hours",
            Urgency::Medium => "Medium - Act within 3-5 days",
            Urgency::LowToMedium => "Low to Medium - Act within 1-2 weeks",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    /// Northern-hemisphere meteorological seasons; `month` is 1-12
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            Season::Spring => &[
                "Apply preventive treatments before disease pressure builds",
                "Clean up overwintered plant debris",
                "Begin regular monitoring as temperatures warm",
                "Ensure proper plant spacing for new plantings",
            ],
            Season::Summer => &[
                "Increase monitoring frequency during hot, humid weather",
                "Maintain consistent watering to reduce plant stress",
                "Apply treatments during cooler parts of the day",
                "Provide adequate ventilation in greenhouse settings",
            ],
            Season::Fall => &[
                "Clean up infected plant debris before winter",
                "Apply dormant season treatments where appropriate",
                "Plan crop rotations for next season",
                "Prepare preventive strategies for next year",
            ],
            Season::Winter => &[
                "Plan disease management strategies for next season",
                "Order resistant varieties and treatments",
                "Clean and disinfect tools and equipment",
                "Study and prepare for common regional diseases",
            ],
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        };
        write!(f, "{}", s)
    }
}

/// Treatment intensity used for cost estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CostTier {
    Low,
    #[default]
    Moderate,
    High,
}

impl FromStr for CostTier {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(CostTier::Low),
            "moderate" => Ok(CostTier::Moderate),
            "high" => Ok(CostTier::High),
            _ => Err(AdvisorError::InvalidInput(format!(
                "cost tier must be low, moderate or high, got '{}'",
                s
            ))),
        }
    }
}

/// USD per acre for each tier of one treatment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCosts {
    pub low: i32,
    pub moderate: i32,
    pub high: i32,
}

impl TierCosts {
    pub fn at(&self, tier: CostTier) -> i32 {
        match tier {
            CostTier::Low => self.low,
            CostTier::Moderate => self.moderate,
            CostTier::High => self.high,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentCosts {
    pub fungicide: TierCosts,
    pub bactericide: TierCosts,
    pub organic: TierCosts,
    pub biological: TierCosts,
}

/// Inclusive USD-per-acre range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CostRange {
    pub min: i32,
    pub max: i32,
}

impl CostRange {
    fn around(base: i32, below: i32, above: i32) -> Self {
        Self {
            min: base - below,
            max: base + above,
        }
    }
}

impl fmt::Display for CostRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} - ${}", self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CostEstimate {
    /// Viral infections are handled by removing plants
    NoChemicalTreatment,
    Ranges {
        conventional: CostRange,
        organic: CostRange,
        biological: CostRange,
    },
}

impl TreatmentCosts {
    /// Cost bands for treating `condition` at `tier`
    ///
    /// Bacterial conditions are priced as bactericide, everything else as
    /// fungicide. Viral conditions get no estimate.
    pub fn estimate(&self, condition: &str, tier: CostTier) -> CostEstimate {
        let condition = condition.to_lowercase();

        let conventional = if condition.contains("bacterial") {
            self.bactericide
        } else if condition.contains("virus") {
            return CostEstimate::NoChemicalTreatment;
        } else {
            self.fungicide
        };

        CostEstimate::Ranges {
            conventional: CostRange::around(conventional.at(tier), 10, 20),
            organic: CostRange::around(self.organic.at(tier), 15, 25),
            biological: CostRange::around(self.biological.at(tier), 20, 30),
        }
    }
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostEstimate::NoChemicalTreatment => write!(
                f,
                "Viral diseases require plant removal - no chemical treatment available"
            ),
            CostEstimate::Ranges {
                conventional,
                organic,
                biological,
            } => {
                writeln!(f, "Estimated treatment costs (USD per acre):")?;
                writeln!(f, "  Conventional treatment: {}", conventional)?;
                writeln!(f, "  Organic treatment:      {}", organic)?;
                write!(f, "  Biological control:     {}", biological)
            }
        }
    }
}

/// Causes, symptoms and remedies for one disease
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseGuidance {
    #[serde(default)]
    pub description: String,
    pub causes: Vec<String>,
    pub symptoms: Vec<String>,
    pub prevention: Vec<String>,
    pub treatment: Vec<String>,
    pub organic_solutions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    pub name: String,
    #[serde(flatten)]
    pub guidance: DiseaseGuidance,
}

#[derive(Debug, Deserialize)]
struct DiseaseTableFile {
    healthy_recommendations: Vec<String>,
    generic: DiseaseGuidance,
    treatment_costs: TreatmentCosts,
    diseases: Vec<DiseaseInfo>,
}

/// Immutable disease reference table
#[derive(Debug, Clone)]
pub struct DiseaseTable {
    diseases: Vec<DiseaseInfo>,
    generic: DiseaseGuidance,
    healthy_recommendations: Vec<String>,
    costs: TreatmentCosts,
}

impl DiseaseTable {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: DiseaseTableFile = serde_json::from_str(json)?;

        let mut seen = HashSet::new();
        for disease in &file.diseases {
            let name = disease.name.trim().to_lowercase();

            // a blank name is a substring of every condition
            if name.is_empty() {
                return Err(AdvisorError::KnowledgeBase(
                    "disease entry with a blank name".to_string(),
                ));
            }
            if !seen.insert(name) {
                return Err(AdvisorError::KnowledgeBase(format!(
                    "disease '{}' is listed more than once",
                    disease.name
                )));
            }
        }

        Ok(Self {
            diseases: file.diseases,
            generic: file.generic,
            healthy_recommendations: file.healthy_recommendations,
            costs: file.treatment_costs,
        })
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_DISEASES)
    }

    /// First entry whose name contains the condition or is contained by it
    pub fn lookup(&self, condition: &str) -> Option<&DiseaseInfo> {
        let condition = condition.trim().to_lowercase();
        if condition.is_empty() {
            return None;
        }

        self.diseases.iter().find(|d| {
            let name = d.name.to_lowercase();
            condition.contains(&name) || name.contains(&condition)
        })
    }

    /// Guidance for conditions missing from the table; description left empty
    pub fn generic(&self) -> &DiseaseGuidance {
        &self.generic
    }

    pub fn healthy_recommendations(&self) -> &[String] {
        &self.healthy_recommendations
    }

    pub fn costs(&self) -> &TreatmentCosts {
        &self.costs
    }

    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severe_disease_thresholds() {
        assert_eq!(Severity::assess("Late blight", 0.95), Severity::Critical);
        assert_eq!(Severity::assess("Late blight", 0.8), Severity::High);
        assert_eq!(Severity::assess("Tomato mosaic virus", 0.5), Severity::High);
    }

    #[test]
    fn test_moderate_disease_thresholds() {
        assert_eq!(Severity::assess("Apple scab", 0.71), Severity::Moderate);
        assert_eq!(Severity::assess("Apple scab", 0.7), Severity::LowToModerate);
        assert_eq!(Severity::assess("Cedar apple rust", 0.9), Severity::Moderate);
    }

    #[test]
    fn test_unlisted_disease_is_monitored() {
        assert_eq!(Severity::assess("Leaf Mold", 0.99), Severity::Monitor);
        assert_eq!(Severity::Monitor.label(), "Monitor and assess");
    }

    #[test]
    fn test_severe_list_checked_before_moderate() {
        // "black rot" is severe even though nothing moderate matches
        assert_eq!(Severity::assess("Black rot", 0.9), Severity::Critical);
        // "leaf blight" is moderate; "late blight" would have been severe
        assert_eq!(
            Severity::assess("Leaf blight (Isariopsis Leaf Spot)", 0.9),
            Severity::Moderate
        );
    }

    #[test]
    fn test_urgency_branches() {
        assert_eq!(Urgency::assess("Haunglongbing (Citrus greening)"), Urgency::High);
        assert_eq!(Urgency::assess("Bacterial spot"), Urgency::Medium);
        // mosaic virus is severe but not on the urgent list
        assert_eq!(Urgency::assess("Tomato mosaic virus"), Urgency::Medium);
        assert_eq!(Urgency::assess("Powdery mildew"), Urgency::LowToMedium);
    }

    #[test]
    fn test_season_from_month() {
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(11), Season::Fall);
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::Summer.recommendations().len(), 4);
    }

    #[test]
    fn test_virus_gets_no_chemical_treatment() {
        let table = DiseaseTable::builtin().unwrap();

        let estimate = table
            .costs()
            .estimate("Tomato Yellow Leaf Curl Virus", CostTier::High);
        assert_eq!(estimate, CostEstimate::NoChemicalTreatment);
        assert!(estimate.to_string().contains("plant removal"));
    }

    #[test]
    fn test_cost_ranges() {
        let table = DiseaseTable::builtin().unwrap();

        match table.costs().estimate("Early blight", CostTier::Moderate) {
            CostEstimate::Ranges {
                conventional,
                organic,
                biological,
            } => {
                assert_eq!(conventional, CostRange { min: 25, max: 55 });
                assert_eq!(organic, CostRange { min: 35, max: 75 });
                assert_eq!(biological, CostRange { min: 45, max: 95 });
            }
            other => panic!("Expected cost ranges, got {:?}", other),
        }

        // bacterial conditions are priced as bactericide
        match table.costs().estimate("Bacterial spot", CostTier::Low) {
            CostEstimate::Ranges { conventional, .. } => {
                assert_eq!(conventional, CostRange { min: 10, max: 40 });
            }
            other => panic!("Expected cost ranges, got {:?}", other),
        }
    }

    #[test]
    fn test_cost_tier_parsing() {
        assert_eq!("HIGH".parse::<CostTier>().unwrap(), CostTier::High);
        assert_eq!(CostTier::default(), CostTier::Moderate);
        assert!("extreme".parse::<CostTier>().is_err());
    }

    #[test]
    fn test_lookup_matches_both_directions() {
        let table = DiseaseTable::builtin().unwrap();
        assert_eq!(table.len(), 20);

        // label longer than the table name
        let info = table.lookup("Northern Leaf Blight on corn").unwrap();
        assert_eq!(info.name, "Northern Leaf Blight");

        // label shorter than the table name
        let info = table.lookup("esca").unwrap();
        assert_eq!(info.name, "Esca (Black Measles)");

        assert!(table.lookup("").is_none());
        assert!(table.lookup("Root knot nematode").is_none());
    }

    #[test]
    fn test_builtin_generic_guidance() {
        let table = DiseaseTable::builtin().unwrap();

        assert!(table.generic().description.is_empty());
        assert!(!table.generic().treatment.is_empty());
        assert_eq!(table.healthy_recommendations().len(), 5);
    }

    #[test]
    fn test_duplicate_disease_rejected() {
        let json = r#"{
            "healthy_recommendations": [],
            "generic": {"causes": [], "symptoms": [], "prevention": [], "treatment": [], "organic_solutions": []},
            "treatment_costs": {
                "fungicide": {"low": 1, "moderate": 2, "high": 3},
                "bactericide": {"low": 1, "moderate": 2, "high": 3},
                "organic": {"low": 1, "moderate": 2, "high": 3},
                "biological": {"low": 1, "moderate": 2, "high": 3}
            },
            "diseases": [
                {"name": "Rust", "causes": [], "symptoms": [], "prevention": [], "treatment": [], "organic_solutions": []},
                {"name": "rust ", "causes": [], "symptoms": [], "prevention": [], "treatment": [], "organic_solutions": []}
            ]
        }"#;

        assert!(matches!(
            DiseaseTable::from_json(json),
            Err(AdvisorError::KnowledgeBase(_))
        ));
    }
}
