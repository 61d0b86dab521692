use serde::{Deserialize, Serialize};

use crate::nutrient_extractor::Macros;

pub const PROTEIN_KCAL_PER_G: f64 = 4.0;
pub const FAT_KCAL_PER_G: f64 = 9.0;

/// Scores divide by at least this many kcal so zero-calorie items stay finite.
pub const KCAL_FLOOR: f64 = 1.0;

/// Scales a per-serving value to 100 g. Unknown or non-positive weights give `None`.
pub fn per_100g(per_serving: f64, serving_size_g: Option<f64>) -> Option<f64> {
    match serving_size_g {
        Some(grams) if grams > 0.0 => Some(per_serving * (100.0 / grams)),
        _ => None,
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Per100g {
    pub kcal: f64,
    pub protein_g: f64,
    pub carb_g: f64,
    pub fat_g: f64,
}

impl Per100g {
    /// All four values exist together or not at all.
    pub fn compute(macros: &Macros, serving_size_g: Option<f64>) -> Option<Self> {
        Some(Per100g {
            kcal: per_100g(macros.kcal, serving_size_g)?,
            protein_g: per_100g(macros.protein_g, serving_size_g)?,
            carb_g: per_100g(macros.carb_g, serving_size_g)?,
            fat_g: per_100g(macros.fat_g, serving_size_g)?,
        })
    }
}

/// Calorie-based quality scores. These never depend on the serving weight.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Scores {
    /// Share of kcal coming from protein, in percent. Higher is denser.
    pub protein_density: f64,
    /// Share of kcal coming from fat, in percent. Lower is leaner.
    pub fat_efficiency: f64,
    pub fiber_per_100kcal: f64,
}

impl Scores {
    pub fn compute(macros: &Macros) -> Self {
        let kcal = macros.kcal.max(KCAL_FLOOR);
        Scores {
            protein_density: (macros.protein_g * PROTEIN_KCAL_PER_G / kcal) * 100.0,
            fat_efficiency: (macros.fat_g * FAT_KCAL_PER_G / kcal) * 100.0,
            fiber_per_100kcal: (macros.fiber_g * 100.0) / kcal,
        }
    }
}
