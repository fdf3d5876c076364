//! Filter criteria for the two parameter datasets.
//!
//! Every active predicate must hold (logical AND). An unset criterion and an
//! empty search term match everything, so default criteria return the full
//! list. Filtering never reorders rows.

use crate::construction_cost::{BuildingCategory, ConstructionCost};
use crate::wear::{MaintenanceState, WearCoefficient};

/// Case-insensitive substring match. An empty (or whitespace-only) term
/// matches everything.
pub fn matches_search(text: &str, term: &str) -> bool {
    let term = term.trim();
    term.is_empty() || text.to_lowercase().contains(&term.to_lowercase())
}

/// Whether any of `texts` matches `term`.
pub fn matches_search_any<'a>(texts: impl IntoIterator<Item = &'a str>, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    texts
        .into_iter()
        .any(|text| text.to_lowercase().contains(&needle))
}

// ---------------------------------------------------------------------------
// Wear coefficients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct WearFilter {
    /// Exact match on `equipment_category`.
    pub category: Option<String>,
    /// Exact match on `maintenance_state`.
    pub state: Option<MaintenanceState>,
    /// Settled search term; matched against category, subcategory and notes.
    pub search: String,
}

impl WearFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.state.is_none() && self.search.trim().is_empty()
    }

    pub fn matches(&self, row: &WearCoefficient) -> bool {
        if let Some(category) = &self.category {
            if &row.equipment_category != category {
                return false;
            }
        }
        if let Some(state) = self.state {
            if row.maintenance_state != state {
                return false;
            }
        }
        let fields = [
            Some(row.equipment_category.as_str()),
            row.equipment_subcategory.as_deref(),
            row.notes.as_deref(),
        ];
        matches_search_any(fields.into_iter().flatten(), &self.search)
    }

    /// Rows satisfying every active criterion, in source order.
    pub fn apply(&self, rows: &[WearCoefficient]) -> Vec<WearCoefficient> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Construction costs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CostFilter {
    /// Exact match on `category`.
    pub category: Option<BuildingCategory>,
    /// Settled search term; matched against type, structure, envelope,
    /// technical lots and security.
    pub search: String,
}

impl CostFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.search.trim().is_empty()
    }

    pub fn matches(&self, row: &ConstructionCost) -> bool {
        if let Some(category) = self.category {
            if row.category != category {
                return false;
            }
        }
        let fields = [
            Some(row.construction_type.as_str()),
            Some(row.structure.as_str()),
            Some(row.envelope.as_str()),
            row.technical_lots.as_deref(),
            row.security.as_deref(),
        ];
        matches_search_any(fields.into_iter().flatten(), &self.search)
    }

    pub fn apply(&self, rows: &[ConstructionCost]) -> Vec<ConstructionCost> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Filter options
// ---------------------------------------------------------------------------

/// Sorted distinct equipment categories, for the category dropdown.
pub fn wear_categories(rows: &[WearCoefficient]) -> Vec<String> {
    let mut categories: Vec<String> = rows.iter().map(|r| r.equipment_category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Building categories present in the data, in declaration order.
pub fn cost_categories(rows: &[ConstructionCost]) -> Vec<BuildingCategory> {
    BuildingCategory::ALL
        .into_iter()
        .filter(|c| rows.iter().any(|r| r.category == *c))
        .collect()
}
