/// Nutrient rule resolver
///
/// Turns a soil test plus a crop's target N/P/K into an ordered list of
/// remediation advisories.

use crate::intelligence::nutrient_rules::{
    AdvisoryKey, Deviation, NutrientCombo, RuleTable, SoilCondition,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// pH below this is acidic
pub const PH_ACIDIC_BELOW: f64 = 5.5;
/// pH above this is alkaline
pub const PH_ALKALINE_ABOVE: f64 = 7.5;
/// Moisture percentage below this is dry
pub const MOISTURE_DRY_BELOW: f64 = 30.0;
/// Moisture percentage above this is waterlogged
pub const MOISTURE_WET_ABOVE: f64 = 70.0;

/// Soil test results
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilReading {
    pub n: i32,
    pub p: i32,
    pub k: i32,
    pub ph: f64,
    pub moisture: f64,
}

/// Recommended N/P/K for a crop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientTargets {
    pub n: i32,
    pub p: i32,
    pub k: i32,
}

pub struct NutrientRuleResolver {
    rules: Arc<RuleTable>,
}

impl NutrientRuleResolver {
    pub fn new(rules: Arc<RuleTable>) -> Self {
        Self { rules }
    }

    /// Deviation of each nutrient from its target
    pub fn classify(measured: &SoilReading, recommended: &NutrientTargets) -> NutrientCombo {
        NutrientCombo {
            nitrogen: Deviation::from_delta(recommended.n - measured.n),
            phosphorus: Deviation::from_delta(recommended.p - measured.p),
            potassium: Deviation::from_delta(recommended.k - measured.k),
        }
    }

    /// Soil conditions triggered by pH and moisture, pH first
    pub fn soil_conditions(measured: &SoilReading) -> Vec<SoilCondition> {
        let mut conditions = Vec::new();

        if measured.ph < PH_ACIDIC_BELOW {
            conditions.push(SoilCondition::Acidic);
        } else if measured.ph > PH_ALKALINE_ABOVE {
            conditions.push(SoilCondition::Alkaline);
        }

        if measured.moisture < MOISTURE_DRY_BELOW {
            conditions.push(SoilCondition::Dry);
        } else if measured.moisture > MOISTURE_WET_ABOVE {
            conditions.push(SoilCondition::Waterlogged);
        }

        conditions
    }

    /// Ordered advisories: N/P/K advice, then pH, then moisture
    ///
    /// The combined key (e.g. `Nlow_PHigh_Klow`) wins when the table has it.
    /// Otherwise each tag is looked up on its own and missing tags are
    /// skipped. An empty result means nothing needs doing.
    pub fn resolve(&self, measured: &SoilReading, recommended: &NutrientTargets) -> Vec<String> {
        let combo = Self::classify(measured, recommended);
        let mut advisories = Vec::new();

        if !combo.is_balanced() {
            match self.rules.get(&AdvisoryKey::Nutrients(combo)) {
                Some(advice) => {
                    debug!(key = %combo, "combined nutrient rule matched");
                    advisories.push(advice.to_string());
                }
                None => {
                    debug!(key = %combo, "no combined rule, using per-nutrient rules");
                    for tag in combo.tags() {
                        let key = AdvisoryKey::Nutrients(NutrientCombo::single(tag));
                        if let Some(advice) = self.rules.get(&key) {
                            advisories.push(advice.to_string());
                        }
                    }
                }
            }
        }

        for condition in Self::soil_conditions(measured) {
            advisories.push(self.rules.soil_advice(condition).to_string());
        }

        advisories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::nutrient_rules::{Nutrient, NutrientTag};

    fn builtin_resolver() -> NutrientRuleResolver {
        NutrientRuleResolver::new(Arc::new(RuleTable::builtin().unwrap()))
    }

    fn rule(table: &RuleTable, key: &str) -> String {
        table.get(&key.parse().unwrap()).unwrap().to_string()
    }

    fn reading(n: i32, p: i32, k: i32, ph: f64, moisture: f64) -> SoilReading {
        SoilReading {
            n,
            p,
            k,
            ph,
            moisture,
        }
    }

    const TARGETS: NutrientTargets = NutrientTargets { n: 50, p: 40, k: 40 };

    #[test]
    fn test_balanced_soil_needs_nothing() {
        let resolver = builtin_resolver();

        let advice = resolver.resolve(&reading(50, 40, 40, 6.5, 50.0), &TARGETS);
        assert!(advice.is_empty());
    }

    #[test]
    fn test_single_low_nutrient() {
        let table = RuleTable::builtin().unwrap();
        let resolver = builtin_resolver();

        let advice = resolver.resolve(&reading(20, 40, 40, 6.5, 50.0), &TARGETS);
        assert_eq!(advice, vec![rule(&table, "Nlow")]);
    }

    #[test]
    fn test_combined_key_wins_over_individual_tags() {
        let table = RuleTable::builtin().unwrap();
        let resolver = builtin_resolver();

        // N low, P high, K low
        let advice = resolver.resolve(&reading(20, 90, 10, 6.5, 50.0), &TARGETS);
        assert_eq!(advice, vec![rule(&table, "Nlow_PHigh_Klow")]);
    }

    #[test]
    fn test_missing_combination_falls_back_to_tags() {
        let table = RuleTable::from_json(
            r#"{"NHigh": "cut urea", "Klow": "add potash", "Nlow_Klow": "unused here"}"#,
        )
        .unwrap();
        let resolver = NutrientRuleResolver::new(Arc::new(table));

        // NHigh_Plow_Klow is absent; Plow has no entry either and is skipped
        let advice = resolver.resolve(&reading(80, 10, 10, 6.5, 50.0), &TARGETS);
        assert_eq!(advice, vec!["cut urea".to_string(), "add potash".to_string()]);
    }

    #[test]
    fn test_acidic_soil_always_reported() {
        let resolver = builtin_resolver();

        let balanced = resolver.resolve(&reading(50, 40, 40, 4.0, 50.0), &TARGETS);
        assert_eq!(balanced, vec![SoilCondition::Acidic.default_advice().to_string()]);

        let unbalanced = resolver.resolve(&reading(20, 40, 40, 4.0, 50.0), &TARGETS);
        assert_eq!(unbalanced.len(), 2);
        assert_eq!(unbalanced[1], SoilCondition::Acidic.default_advice());
    }

    #[test]
    fn test_advisory_order() {
        let table = RuleTable::builtin().unwrap();
        let resolver = builtin_resolver();

        let advice = resolver.resolve(&reading(50, 40, 90, 8.2, 85.0), &TARGETS);
        assert_eq!(
            advice,
            vec![
                rule(&table, "KHigh"),
                SoilCondition::Alkaline.default_advice().to_string(),
                SoilCondition::Waterlogged.default_advice().to_string(),
            ]
        );
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let resolver = builtin_resolver();

        let at_edges = resolver.resolve(&reading(50, 40, 40, 5.5, 30.0), &TARGETS);
        assert!(at_edges.is_empty());

        let upper_edges = resolver.resolve(&reading(50, 40, 40, 7.5, 70.0), &TARGETS);
        assert!(upper_edges.is_empty());
    }

    #[test]
    fn test_soil_entry_in_table_overrides_default() {
        let table = RuleTable::from_json(r#"{"MoistureLow": "Mulch with straw."}"#).unwrap();
        let resolver = NutrientRuleResolver::new(Arc::new(table));

        let advice = resolver.resolve(&reading(50, 40, 40, 6.5, 12.0), &TARGETS);
        assert_eq!(advice, vec!["Mulch with straw.".to_string()]);
    }

    #[test]
    fn test_classify_tags() {
        let combo = NutrientRuleResolver::classify(&reading(60, 40, 10, 6.5, 50.0), &TARGETS);

        assert_eq!(
            combo.tags(),
            vec![
                NutrientTag {
                    nutrient: Nutrient::Nitrogen,
                    deviation: Deviation::High
                },
                NutrientTag {
                    nutrient: Nutrient::Potassium,
                    deviation: Deviation::Low
                },
            ]
        );
        assert_eq!(combo.to_string(), "NHigh_Klow");
    }
}
