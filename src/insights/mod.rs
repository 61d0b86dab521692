//! Read-only views over a normalized menu: station lists, search, badges,
//! protein ranking and side-by-side comparison.

pub mod compare;
pub mod top_protein;

use serde::Serialize;
use std::collections::BTreeSet;

use crate::menu_normalizer::MenuItem;

pub const HIGH_PROTEIN_MIN_DENSITY: f64 = 20.0;
pub const LOW_FAT_MAX_EFFICIENCY: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Badge {
    HighProtein,
    LowFat,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::HighProtein => "High Protein",
            Badge::LowFat => "Low Fat",
        }
    }
}

pub fn badges(item: &MenuItem) -> Vec<Badge> {
    let mut out = Vec::new();
    if item.protein_density >= HIGH_PROTEIN_MIN_DENSITY {
        out.push(Badge::HighProtein);
    }
    if item.fat_efficiency <= LOW_FAT_MAX_EFFICIENCY {
        out.push(Badge::LowFat);
    }
    out
}

/// Distinct station names, sorted.
pub fn stations(items: &[MenuItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.station.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Items at `station` (all stations when `None`) whose name or station contains
/// `search`, ignoring case.
pub fn filter_items<'a>(
    items: &'a [MenuItem],
    station: Option<&str>,
    search: &str,
) -> Vec<&'a MenuItem> {
    let needle = search.to_lowercase();
    items
        .iter()
        .filter(|item| station.is_none_or(|wanted| item.station == wanted))
        .filter(|item| {
            item.name.to_lowercase().contains(&needle)
                || item.station.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Looks an item up by id first, then by exact name, preferring `station` when
/// several items share the name.
pub fn find_item<'a>(items: &'a [MenuItem], key: &str, station: Option<&str>) -> Option<&'a MenuItem> {
    if let Some(item) = items.iter().find(|item| item.id == key) {
        return Some(item);
    }
    let mut named = items.iter().filter(|item| item.name == key);
    let first = named.clone().next();
    station
        .and_then(|wanted| named.find(|item| item.station == wanted))
        .or(first)
}
