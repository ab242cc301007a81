/// Fertilizer remediation rules
///
/// Typed keys for the remediation table. Key strings such as `Nlow_PHigh`
/// are parsed once at load time; a malformed key fails the load instead of
/// silently never matching.

use crate::error::{AdvisorError, Result};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

const BUILTIN_RULES: &str = include_str!("../../data/fertilizer_rules.json");

/// Macronutrients, in lookup key order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 3] = [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium];

    pub fn symbol(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "N",
            Nutrient::Phosphorus => "P",
            Nutrient::Potassium => "K",
        }
    }
}

/// Direction a measured nutrient is off from its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deviation {
    High,
    Low,
}

impl Deviation {
    /// `target - measured`: negative means too much, positive too little
    pub fn from_delta(delta: i32) -> Option<Self> {
        match delta {
            0 => None,
            d if d < 0 => Some(Deviation::High),
            _ => Some(Deviation::Low),
        }
    }

    // "High" is capitalized but "low" is not; the table keys depend on it
    fn suffix(&self) -> &'static str {
        match self {
            Deviation::High => "High",
            Deviation::Low => "low",
        }
    }
}

/// One nutrient's deviation, e.g. `NHigh` or `Klow`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NutrientTag {
    pub nutrient: Nutrient,
    pub deviation: Deviation,
}

impl fmt::Display for NutrientTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.nutrient.symbol(), self.deviation.suffix())
    }
}

impl FromStr for NutrientTag {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        for nutrient in Nutrient::ALL {
            for deviation in [Deviation::High, Deviation::Low] {
                let tag = NutrientTag { nutrient, deviation };
                if tag.to_string() == s {
                    return Ok(tag);
                }
            }
        }

        Err(AdvisorError::RuleTable(format!("unknown nutrient tag '{}'", s)))
    }
}

/// Deviation of each of N, P and K; `None` means balanced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NutrientCombo {
    pub nitrogen: Option<Deviation>,
    pub phosphorus: Option<Deviation>,
    pub potassium: Option<Deviation>,
}

impl NutrientCombo {
    pub fn single(tag: NutrientTag) -> Self {
        let mut combo = Self::default();
        combo.set(tag);
        combo
    }

    fn set(&mut self, tag: NutrientTag) {
        let slot = match tag.nutrient {
            Nutrient::Nitrogen => &mut self.nitrogen,
            Nutrient::Phosphorus => &mut self.phosphorus,
            Nutrient::Potassium => &mut self.potassium,
        };
        *slot = Some(tag.deviation);
    }

    /// Emitted tags in N, P, K order
    pub fn tags(&self) -> Vec<NutrientTag> {
        let slots = [self.nitrogen, self.phosphorus, self.potassium];

        Nutrient::ALL
            .iter()
            .zip(slots)
            .filter_map(|(nutrient, deviation)| {
                deviation.map(|deviation| NutrientTag {
                    nutrient: *nutrient,
                    deviation,
                })
            })
            .collect()
    }

    pub fn is_balanced(&self) -> bool {
        self.nitrogen.is_none() && self.phosphorus.is_none() && self.potassium.is_none()
    }
}

impl fmt::Display for NutrientCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self
            .tags()
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join("_");
        write!(f, "{}", key)
    }
}

impl FromStr for NutrientCombo {
    type Err = AdvisorError;

    /// Parse `Nlow_PHigh_Klow` style keys; tags must follow N, P, K order
    fn from_str(s: &str) -> Result<Self> {
        let mut combo = NutrientCombo::default();
        let mut last: Option<Nutrient> = None;

        for part in s.split('_') {
            let tag: NutrientTag = part.parse()?;

            if last.is_some_and(|prev| prev >= tag.nutrient) {
                return Err(AdvisorError::RuleTable(format!(
                    "key '{}' repeats a nutrient or is out of N, P, K order",
                    s
                )));
            }

            combo.set(tag);
            last = Some(tag.nutrient);
        }

        Ok(combo)
    }
}

/// Soil conditions checked independently of N/P/K
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoilCondition {
    Acidic,
    Alkaline,
    Dry,
    Waterlogged,
}

impl SoilCondition {
    pub const ALL: [SoilCondition; 4] = [
        SoilCondition::Acidic,
        SoilCondition::Alkaline,
        SoilCondition::Dry,
        SoilCondition::Waterlogged,
    ];

    /// Rule table key for this condition
    pub fn key(&self) -> &'static str {
        match self {
            SoilCondition::Acidic => "pHlow",
            SoilCondition::Alkaline => "pHhigh",
            SoilCondition::Dry => "MoistureLow",
            SoilCondition::Waterlogged => "MoistureHigh",
        }
    }

    /// Advice used when the table has no entry for this condition
    pub fn default_advice(&self) -> &'static str {
        match self {
            SoilCondition::Acidic => "Soil is too acidic. Add lime or dolomite.",
            SoilCondition::Alkaline => "Soil is too alkaline. Add gypsum or sulfur.",
            SoilCondition::Dry => "Soil moisture is low. Use drip irrigation or mulching.",
            SoilCondition::Waterlogged => "Soil is too wet. Improve drainage.",
        }
    }
}

/// Key of a rule table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdvisoryKey {
    Nutrients(NutrientCombo),
    Soil(SoilCondition),
}

impl fmt::Display for AdvisoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryKey::Nutrients(combo) => write!(f, "{}", combo),
            AdvisoryKey::Soil(condition) => write!(f, "{}", condition.key()),
        }
    }
}

impl FromStr for AdvisoryKey {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(condition) = SoilCondition::ALL.iter().find(|c| c.key() == s) {
            return Ok(AdvisoryKey::Soil(*condition));
        }

        s.parse().map(AdvisoryKey::Nutrients)
    }
}

/// Immutable remediation table
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: HashMap<AdvisoryKey, String>,
}

impl RuleTable {
    /// Parse a JSON object of `"key": "advice"` pairs
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;

        let rules = raw
            .into_iter()
            .map(|(key, advice)| Ok((key.parse::<AdvisoryKey>()?, advice)))
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self { rules })
    }

    /// The table compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_RULES)
    }

    pub fn get(&self, key: &AdvisoryKey) -> Option<&str> {
        self.rules.get(key).map(String::as_str)
    }

    /// Advice for a soil condition, falling back to the hardcoded default
    pub fn soil_advice(&self, condition: SoilCondition) -> &str {
        self.get(&AdvisoryKey::Soil(condition))
            .unwrap_or_else(|| condition.default_advice())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
