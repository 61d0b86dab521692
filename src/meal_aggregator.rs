use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::menu_normalizer::MenuItem;

pub const DEFAULT_SERVINGS: f64 = 1.0;

/// Items picked for a meal, keyed by menu item id, with serving multipliers.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct MealSelection {
    pub servings: BTreeMap<String, f64>,
}

impl MealSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item at one serving. Re-selecting keeps the existing quantity.
    pub fn select(&mut self, id: &str) {
        self.servings
            .entry(id.to_string())
            .or_insert(DEFAULT_SERVINGS);
    }

    pub fn deselect(&mut self, id: &str) {
        self.servings.remove(id);
    }

    /// Sets the multiplier for an item, selecting it if needed. Negative and
    /// non-finite quantities are stored as 0.
    pub fn set_servings(&mut self, id: &str, servings: f64) {
        let clean = if servings.is_finite() { servings.max(0.0) } else { 0.0 };
        self.servings.insert(id.to_string(), clean);
    }

    pub fn servings_for(&self, id: &str) -> f64 {
        self.servings.get(id).copied().unwrap_or(DEFAULT_SERVINGS)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.servings.contains_key(id)
    }

    /// Drops selections whose item disappeared from a refreshed menu.
    pub fn retain_available(&mut self, items: &[MenuItem]) {
        self.servings
            .retain(|id, _| items.iter().any(|item| &item.id == id));
    }

    pub fn is_empty(&self) -> bool {
        self.servings.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct MacroTotals {
    pub kcal: f64,
    pub protein_g: f64,
    pub carb_g: f64,
    pub fat_g: f64,
}

impl MacroTotals {
    fn add_scaled(&mut self, item: &MenuItem, servings: f64) {
        self.kcal += item.per_serving_kcal * servings;
        self.protein_g += item.per_serving_protein_g * servings;
        self.carb_g += item.per_serving_carb_g * servings;
        self.fat_g += item.per_serving_fat_g * servings;
    }

    /// Gram split between protein, carbs and fat, in that order.
    /// Fractions are 0 when nothing is selected.
    pub fn distribution(&self) -> Vec<MacroShare> {
        let total = self.protein_g + self.carb_g + self.fat_g;
        [
            ("Protein", self.protein_g),
            ("Carbs", self.carb_g),
            ("Fat", self.fat_g),
        ]
        .into_iter()
        .map(|(label, grams)| MacroShare {
            label: label.to_string(),
            grams,
            fraction: if total > 0.0 { grams / total } else { 0.0 },
        })
        .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MacroShare {
    pub label: String,
    pub grams: f64,
    pub fraction: f64,
}

/// One selected item scaled by its serving multiplier.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MealLine<'a> {
    pub item: &'a MenuItem,
    pub servings: f64,
    pub totals: MacroTotals,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MealSummary<'a> {
    pub lines: Vec<MealLine<'a>>,
    pub totals: MacroTotals,
}

/// Sums the selected items. Selected ids missing from `items` are skipped.
pub fn summarize_meal<'a>(items: &'a [MenuItem], selection: &MealSelection) -> MealSummary<'a> {
    let mut totals = MacroTotals::default();
    let mut lines = Vec::new();

    for (id, &servings) in &selection.servings {
        let Some(item) = items.iter().find(|item| &item.id == id) else {
            continue;
        };
        let mut line_totals = MacroTotals::default();
        line_totals.add_scaled(item, servings);
        totals.add_scaled(item, servings);
        lines.push(MealLine {
            item,
            servings,
            totals: line_totals,
        });
    }

    MealSummary { lines, totals }
}
