/// Static farming knowledge base
///
/// Ordered topic entries (keywords + canned answer) used by the keyword
/// matcher. Entry order is evaluation order, which decides score ties.

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const BUILTIN_KNOWLEDGE_BASE: &str = include_str!("../../data/knowledge_base.json");

/// Topics the chatbot knows how to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    GovernmentSchemes,
    CropInsurance,
    MarketPrices,
    DiseaseManagement,
    FertilizerSoil,
    Irrigation,
    CropSelection,
    OrganicFarming,
    Mechanization,
    WeatherClimate,
    Livestock,
    StorageProcessing,
    Marketing,
    Technology,
}

impl Topic {
    /// Every topic, in the order the built-in knowledge base declares them
    pub const ALL: [Topic; 14] = [
        Topic::GovernmentSchemes,
        Topic::CropInsurance,
        Topic::MarketPrices,
        Topic::DiseaseManagement,
        Topic::FertilizerSoil,
        Topic::Irrigation,
        Topic::CropSelection,
        Topic::OrganicFarming,
        Topic::Mechanization,
        Topic::WeatherClimate,
        Topic::Livestock,
        Topic::StorageProcessing,
        Topic::Marketing,
        Topic::Technology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::GovernmentSchemes => "government_schemes",
            Topic::CropInsurance => "crop_insurance",
            Topic::MarketPrices => "market_prices",
            Topic::DiseaseManagement => "disease_management",
            Topic::FertilizerSoil => "fertilizer_soil",
            Topic::Irrigation => "irrigation",
            Topic::CropSelection => "crop_selection",
            Topic::OrganicFarming => "organic_farming",
            Topic::Mechanization => "mechanization",
            Topic::WeatherClimate => "weather_climate",
            Topic::Livestock => "livestock",
            Topic::StorageProcessing => "storage_processing",
            Topic::Marketing => "marketing",
            Topic::Technology => "technology",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One topic: the keywords that select it and the answer it gives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub topic: Topic,
    pub keywords: Vec<String>,
    pub response: String,
}

/// On-disk layout of a knowledge base file
#[derive(Debug, Deserialize)]
struct KnowledgeBaseFile {
    fallback_response: String,
    entries: Vec<KnowledgeEntry>,
}

/// Immutable, ordered collection of knowledge entries
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    fallback_response: String,
}

impl KnowledgeBase {
    /// Build a knowledge base from explicit entries
    ///
    /// # Returns
    /// * `Err(AdvisorError::KnowledgeBase)` - a topic appears twice or has no keywords
    pub fn new(entries: Vec<KnowledgeEntry>, fallback_response: impl Into<String>) -> Result<Self> {
        let mut seen = HashSet::new();

        for entry in &entries {
            if !seen.insert(entry.topic) {
                return Err(AdvisorError::KnowledgeBase(format!(
                    "topic '{}' is declared more than once",
                    entry.topic
                )));
            }

            if entry.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(AdvisorError::KnowledgeBase(format!(
                    "topic '{}' has no keywords",
                    entry.topic
                )));
            }
        }

        Ok(Self {
            entries,
            fallback_response: fallback_response.into(),
        })
    }

    /// Parse a knowledge base from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        let file: KnowledgeBaseFile = serde_json::from_str(json)?;
        Self::new(file.entries, file.fallback_response)
    }

    /// The knowledge base compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_KNOWLEDGE_BASE)
    }

    /// Entries in evaluation order
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn get(&self, topic: Topic) -> Option<&KnowledgeEntry> {
        self.entries.iter().find(|e| e.topic == topic)
    }

    /// Answer given when nothing matches
    pub fn fallback_response(&self) -> &str {
        &self.fallback_response
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(topic: Topic, keywords: &[&str]) -> KnowledgeEntry {
        KnowledgeEntry {
            topic,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            response: format!("{} answer", topic),
        }
    }

    #[test]
    fn test_builtin_loads_every_topic_in_order() {
        let kb = KnowledgeBase::builtin().unwrap();

        let topics: Vec<Topic> = kb.entries().iter().map(|e| e.topic).collect();
        assert_eq!(topics, Topic::ALL.to_vec());
        assert!(kb.fallback_response().contains("FarmGenie"));
    }

    #[test]
    fn test_builtin_keywords() {
        let kb = KnowledgeBase::builtin().unwrap();

        let fert = kb.get(Topic::FertilizerSoil).unwrap();
        assert_eq!(fert.keywords[0], "fertilizer");
        assert!(fert.keywords.contains(&"npk".to_string()));

        let tech = kb.get(Topic::Technology).unwrap();
        assert!(tech.keywords.contains(&"drone".to_string()));
    }

    #[test]
    fn test_duplicate_topic_rejected() {
        let result = KnowledgeBase::new(
            vec![
                entry(Topic::Livestock, &["cow"]),
                entry(Topic::Livestock, &["goat"]),
            ],
            "default",
        );

        match result {
            Err(AdvisorError::KnowledgeBase(msg)) => assert!(msg.contains("livestock")),
            _ => panic!("Expected KnowledgeBase error"),
        }
    }

    #[test]
    fn test_entry_without_keywords_rejected() {
        let result = KnowledgeBase::new(vec![entry(Topic::Marketing, &[" "])], "default");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_json_unknown_topic() {
        let json = r#"{"fallback_response": "x", "entries": [
            {"topic": "astrology", "keywords": ["star"], "response": "no"}
        ]}"#;

        let result = KnowledgeBase::from_json(json);
        assert!(matches!(result, Err(AdvisorError::Serialization(_))));
    }

    #[test]
    fn test_topic_display() {
        assert_eq!(Topic::GovernmentSchemes.to_string(), "government_schemes");
        assert_eq!(Topic::WeatherClimate.to_string(), "weather_climate");
    }
}
