use serde::Serialize;
use std::fmt;

use crate::insights::compare::{compare_items, ItemComparison, Side};
use crate::insights::top_protein::{rank, ProteinMetric, ProteinRank, RankingThresholds};
use crate::insights::{badges, filter_items, find_item};
use crate::meal_aggregator::{summarize_meal, MealSelection, MealSummary};
use crate::menu_normalizer::MenuItem;

/// Everything the `menu` command shows for one fetched menu.
#[derive(Debug, Serialize)]
pub struct MenuReport<'a> {
    pub date: String,
    pub meal: String,
    pub station: Option<String>,
    pub items: Vec<&'a MenuItem>,
    pub meal_summary: MealSummary<'a>,
    pub metric: ProteinMetric,
    pub top_protein: Vec<ProteinRank<'a>>,
    pub comparison: Option<ItemComparison<'a>>,
    /// Selection or comparison keys that matched nothing on this menu.
    pub unmatched: Vec<String>,
}

pub struct ReportRequest<'r> {
    pub date: String,
    pub meal: String,
    pub station: Option<&'r str>,
    pub search: &'r str,
    pub selections: &'r [(String, f64)],
    pub metric: ProteinMetric,
    pub compare: Option<(&'r str, &'r str)>,
    pub thresholds: &'r RankingThresholds,
}

pub fn build_report<'a>(items: &'a [MenuItem], request: &ReportRequest<'_>) -> MenuReport<'a> {
    let mut unmatched = Vec::new();
    let mut selection = MealSelection::new();
    for (key, servings) in request.selections {
        match find_item(items, key, request.station) {
            Some(item) => selection.set_servings(&item.id, *servings),
            None => unmatched.push(key.clone()),
        }
    }

    let comparison = request.compare.and_then(|(a_key, b_key)| {
        let a = find_item(items, a_key, request.station);
        let b = find_item(items, b_key, request.station);
        if a.is_none() {
            unmatched.push(a_key.to_string());
        }
        if b.is_none() {
            unmatched.push(b_key.to_string());
        }
        Some(compare_items(a?, b?))
    });

    MenuReport {
        date: request.date.clone(),
        meal: request.meal.clone(),
        station: request.station.map(str::to_string),
        items: filter_items(items, request.station, request.search),
        meal_summary: summarize_meal(items, &selection),
        metric: request.metric,
        top_protein: rank(items, request.station, request.metric, request.thresholds),
        comparison,
        unmatched,
    }
}

impl fmt::Display for MenuReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} · {} · {} items", self.date, self.meal, self.items.len())?;
        if let Some(station) = &self.station {
            writeln!(f, "Station: {}", station)?;
        }

        writeln!(f, "\nMenu")?;
        for item in &self.items {
            let tags: Vec<_> = badges(item).iter().map(|b| b.label()).collect();
            writeln!(
                f,
                "  {} [{}] {} · {} kcal · {}P / {}C / {}F{}",
                item.name,
                item.station,
                item.serving_name,
                item.per_serving_kcal,
                item.per_serving_protein_g,
                item.per_serving_carb_g,
                item.per_serving_fat_g,
                if tags.is_empty() { String::new() } else { format!(" ({})", tags.join(", ")) }
            )?;
        }
        if self.items.is_empty() {
            writeln!(f, "  No items.")?;
        }

        if !self.meal_summary.lines.is_empty() {
            writeln!(f, "\nSelected")?;
            for line in &self.meal_summary.lines {
                writeln!(
                    f,
                    "  {} × {} {} · {} kcal · {:.1}P / {:.1}C / {:.1}F",
                    line.servings,
                    line.item.serving_name,
                    line.item.name,
                    line.totals.kcal.round(),
                    line.totals.protein_g,
                    line.totals.carb_g,
                    line.totals.fat_g
                )?;
            }
            let totals = &self.meal_summary.totals;
            writeln!(
                f,
                "Totals: {} kcal · {:.1} g protein · {:.1} g carbs · {:.1} g fat",
                totals.kcal.round(),
                totals.protein_g,
                totals.carb_g,
                totals.fat_g
            )?;
            for share in totals.distribution() {
                writeln!(f, "  {}: {:.1}g ({:.0}%)", share.label, share.grams, share.fraction * 100.0)?;
            }
        }

        writeln!(f, "\nTop protein")?;
        for (idx, row) in self.top_protein.iter().enumerate() {
            let value = match self.metric {
                ProteinMetric::PerServing => format!("{:.1} g", row.per_serving_g),
                ProteinMetric::Per100Kcal => format!("{:.1} g per 100 kcal", row.grams_per_100kcal),
            };
            writeln!(f, "  {}. {} [{}] {}", idx + 1, row.item.name, row.item.station, value)?;
        }
        if self.top_protein.is_empty() {
            writeln!(f, "  No qualifying items.")?;
        }

        if let Some(comparison) = &self.comparison {
            writeln!(f, "\nCompare: {} vs {}", comparison.a.name, comparison.b.name)?;
            for row in &comparison.rows {
                let marker = |side: Side| if row.better == Some(side) { "*" } else { "" };
                writeln!(
                    f,
                    "  {:<12} {:>12}{:<1} {:>12}{:<1}",
                    row.label,
                    row.a,
                    marker(Side::A),
                    row.b,
                    marker(Side::B)
                )?;
            }
        }

        for key in &self.unmatched {
            writeln!(f, "\nNot on this menu: {}", key)?;
        }
        Ok(())
    }
}
