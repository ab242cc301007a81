// Recommended N/P/K per crop
//
// Reference values the fertilizer advisor compares soil tests against.

use crate::error::{AdvisorError, Result};
use crate::intelligence::NutrientTargets;
use serde::{Deserialize, Serialize};

const BUILTIN_CROPS: &str = include_str!("../../data/crop_nutrients.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropNutrients {
    pub crop: String,
    pub n: i32,
    pub p: i32,
    pub k: i32,
}

impl CropNutrients {
    pub fn targets(&self) -> NutrientTargets {
        NutrientTargets {
            n: self.n,
            p: self.p,
            k: self.k,
        }
    }
}

pub struct CropReference {
    crops: Vec<CropNutrients>,
}

impl CropReference {
    pub fn new(crops: Vec<CropNutrients>) -> Self {
        // names are matched case-insensitively
        let crops = crops
            .into_iter()
            .map(|mut c| {
                c.crop = c.crop.trim().to_lowercase();
                c
            })
            .collect();

        Self { crops }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let crops: Vec<CropNutrients> = serde_json::from_str(json)?;
        Ok(Self::new(crops))
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CROPS)
    }

    pub fn lookup(&self, crop: &str) -> Result<&CropNutrients> {
        let wanted = crop.trim().to_lowercase();

        self.crops
            .iter()
            .find(|c| c.crop == wanted)
            .ok_or_else(|| AdvisorError::UnknownCrop(crop.to_string()))
    }

    pub fn crops(&self) -> &[CropNutrients] {
        &self.crops
    }
}
