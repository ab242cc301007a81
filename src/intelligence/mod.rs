/// Intelligence module
///
/// Keyword intent matching, nutrient rule resolution and disease grading,
/// plus the static tables and heuristics they run on.

pub mod disease_rules;
pub mod intent_matcher;
pub mod knowledge_base;
pub mod language_detector;
pub mod nutrient_rules;
pub mod rule_resolver;

pub use disease_rules::{
    is_healthy, CostEstimate, CostRange, CostTier, DiseaseGuidance, DiseaseInfo, DiseaseTable,
    Season, Severity, Urgency,
};
pub use intent_matcher::{Classification, KeywordIntentMatcher};
pub use knowledge_base::{KnowledgeBase, KnowledgeEntry, Topic};
pub use language_detector::{detect_language, Language};
pub use nutrient_rules::{
    AdvisoryKey, Deviation, Nutrient, NutrientCombo, NutrientTag, RuleTable, SoilCondition,
};
pub use rule_resolver::{NutrientRuleResolver, NutrientTargets, SoilReading};
