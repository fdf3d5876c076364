//! Construction cost calculator.
//!
//! For each tier: `per_m2 = base + studies + vrd + fees + miscellaneous`
//! and `total = surface * per_m2`. Legacy tier names and the `luxe`
//! fallback are resolved when rows are decoded, see
//! [`RawConstructionCost::normalize`](crate::construction_cost::RawConstructionCost::normalize).

use serde::Serialize;

use crate::construction_cost::{AncillaryCosts, ConstructionCost, Tier, TierValues};
use crate::decimal::parse_decimal;
use crate::error::CoreError;

/// Output of a successful calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub surface: f64,
    pub cost_per_m2: TierValues,
    pub total_cost: TierValues,
    /// Ancillary components per m², for itemized display.
    pub details: AncillaryCosts,
}

impl CalculationResult {
    pub fn per_m2(&self, tier: Tier) -> f64 {
        self.cost_per_m2.get(tier)
    }

    pub fn total(&self, tier: Tier) -> f64 {
        self.total_cost.get(tier)
    }
}

/// Parse a surface typed by the user. Must be a finite number above zero.
pub fn parse_surface(input: &str) -> Result<f64, CoreError> {
    match parse_decimal(input) {
        Some(surface) if surface > 0.0 => Ok(surface),
        _ => Err(CoreError::Validation(
            "Veuillez saisir une surface valide (nombre positif)".into(),
        )),
    }
}

/// Compute per-m² and total costs for every tier.
pub fn calculate(surface: f64, cost: &ConstructionCost) -> CalculationResult {
    let extras = cost.ancillary.total();
    let cost_per_m2 = cost.tiers.map(|base| base + extras);
    let total_cost = cost_per_m2.map(|per_m2| surface * per_m2);

    CalculationResult {
        surface,
        cost_per_m2,
        total_cost,
        details: cost.ancillary,
    }
}

/// Validate the calculator form and compute.
///
/// Fails with [`CoreError::Validation`] when the surface is not a positive
/// number or when no cost row is selected.
pub fn calculate_from_form(
    surface_input: &str,
    selected: Option<&ConstructionCost>,
) -> Result<CalculationResult, CoreError> {
    let surface = parse_surface(surface_input)?;
    let cost = selected.ok_or_else(|| {
        CoreError::Validation(
            "Veuillez sélectionner une combinaison type / structure / enveloppe".into(),
        )
    })?;
    Ok(calculate(surface, cost))
}
