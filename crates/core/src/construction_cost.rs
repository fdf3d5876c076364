//! Construction-cost reference table.
//!
//! The API has served two generations of cost rows: legacy rows price two
//! tiers (`cost_low`, `cost_standard`), current rows price three
//! (`cost_bon`, `cost_haut`, `cost_luxe`). Both are folded into a single
//! [`ConstructionCost`] by [`RawConstructionCost::normalize`] so the
//! calculator never deals with field aliases.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::decimal::lenient_f64;
use crate::error::CoreError;
use crate::types::DbId;

/// Multiplier applied to the `haut` tier when a row has no `luxe` price.
pub const LUXE_FALLBACK_FACTOR: f64 = 1.2;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Building category a cost row applies to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum BuildingCategory {
    #[default]
    #[serde(alias = "residential", alias = "Résidentiel")]
    Residential,
    #[serde(alias = "industrial", alias = "Industriel")]
    Industrial,
}

impl BuildingCategory {
    pub const ALL: [BuildingCategory; 2] = [Self::Residential, Self::Industrial];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Residential => "Residential",
            Self::Industrial => "Industrial",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Residential => "Résidentiel",
            Self::Industrial => "Industriel",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "residential" | "résidentiel" => Some(Self::Residential),
            "industrial" | "industriel" => Some(Self::Industrial),
            _ => None,
        }
    }
}

/// Finish quality level used to present a cost range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Bon,
    Haut,
    Luxe,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Self::Bon, Self::Haut, Self::Luxe];

    pub fn label(self) -> &'static str {
        match self {
            Self::Bon => "Bon standing",
            Self::Haut => "Haut standing",
            Self::Luxe => "Luxe",
        }
    }
}

/// One value per [`Tier`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TierValues {
    pub bon: f64,
    pub haut: f64,
    pub luxe: f64,
}

impl TierValues {
    pub fn get(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Bon => self.bon,
            Tier::Haut => self.haut,
            Tier::Luxe => self.luxe,
        }
    }

    /// Apply `f` to every tier.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            bon: f(self.bon),
            haut: f(self.haut),
            luxe: f(self.luxe),
        }
    }
}

/// Per-m² cost components added on top of the tier base price.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AncillaryCosts {
    pub studies: f64,
    pub vrd: f64,
    pub fees: f64,
    pub miscellaneous: f64,
}

impl AncillaryCosts {
    pub fn total(&self) -> f64 {
        self.studies + self.vrd + self.fees + self.miscellaneous
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A normalized construction-cost row.
///
/// Serializes back to the wire shape with current tier names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawConstructionCost", into = "RawConstructionCost")]
pub struct ConstructionCost {
    pub id: Option<DbId>,
    pub category: BuildingCategory,
    pub construction_type: String,
    pub structure: String,
    pub envelope: String,
    pub technical_lots: Option<String>,
    pub security: Option<String>,
    /// Base price per m² for each finish tier.
    pub tiers: TierValues,
    /// `luxe` price as stored; `None` when `tiers.luxe` is derived from `haut`.
    pub stored_luxe: Option<f64>,
    pub ancillary: AncillaryCosts,
}

impl ConstructionCost {
    /// Whether this row matches the given (category, type, structure,
    /// envelope) tuple.
    pub fn matches(
        &self,
        category: BuildingCategory,
        construction_type: &str,
        structure: &str,
        envelope: &str,
    ) -> bool {
        self.category == category
            && self.construction_type == construction_type
            && self.structure == structure
            && self.envelope == envelope
    }
}

/// Wire shape of a cost row, including legacy tier names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConstructionCost {
    #[serde(default, alias = "cost_id")]
    pub id: Option<DbId>,
    pub category: BuildingCategory,
    #[serde(default)]
    pub construction_type: String,
    #[serde(default)]
    pub structure: String,
    #[serde(default)]
    pub envelope: String,
    #[serde(default)]
    pub technical_lots: Option<String>,
    #[serde(default)]
    pub security: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub cost_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub cost_standard: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_bon: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_haut: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_luxe: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_studies: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_vrd: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_fees: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cost_miscellaneous: Option<f64>,
}

impl RawConstructionCost {
    /// Fold legacy tier names into the current ones and default every
    /// missing amount to zero.
    ///
    /// * `bon`  = `cost_bon`, else `cost_low`
    /// * `haut` = `cost_haut`, else `cost_standard`
    /// * `luxe` = `cost_luxe`, else `haut * 1.2`
    pub fn normalize(self) -> ConstructionCost {
        let bon = self.cost_bon.or(self.cost_low).unwrap_or(0.0);
        let haut = self.cost_haut.or(self.cost_standard).unwrap_or(0.0);
        let luxe = self.cost_luxe.unwrap_or(haut * LUXE_FALLBACK_FACTOR);

        ConstructionCost {
            id: self.id,
            category: self.category,
            construction_type: self.construction_type,
            structure: self.structure,
            envelope: self.envelope,
            technical_lots: self.technical_lots.filter(|s| !s.trim().is_empty()),
            security: self.security.filter(|s| !s.trim().is_empty()),
            tiers: TierValues { bon, haut, luxe },
            stored_luxe: self.cost_luxe,
            ancillary: AncillaryCosts {
                studies: self.cost_studies.unwrap_or(0.0),
                vrd: self.cost_vrd.unwrap_or(0.0),
                fees: self.cost_fees.unwrap_or(0.0),
                miscellaneous: self.cost_miscellaneous.unwrap_or(0.0),
            },
        }
    }
}

impl From<RawConstructionCost> for ConstructionCost {
    fn from(raw: RawConstructionCost) -> Self {
        raw.normalize()
    }
}

impl From<ConstructionCost> for RawConstructionCost {
    fn from(cost: ConstructionCost) -> Self {
        Self {
            id: cost.id,
            category: cost.category,
            construction_type: cost.construction_type,
            structure: cost.structure,
            envelope: cost.envelope,
            technical_lots: cost.technical_lots,
            security: cost.security,
            cost_low: None,
            cost_standard: None,
            cost_bon: Some(cost.tiers.bon),
            cost_haut: Some(cost.tiers.haut),
            cost_luxe: cost.stored_luxe,
            cost_studies: Some(cost.ancillary.studies),
            cost_vrd: Some(cost.ancillary.vrd),
            cost_fees: Some(cost.ancillary.fees),
            cost_miscellaneous: Some(cost.ancillary.miscellaneous),
        }
    }
}

// ---------------------------------------------------------------------------
// Write payload
// ---------------------------------------------------------------------------

/// Body of a create or update request. Always uses the current tier names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ConstructionCostInput {
    pub category: BuildingCategory,
    #[validate(length(min = 1, message = "Le type de construction est obligatoire"))]
    pub construction_type: String,
    #[validate(length(min = 1, message = "La structure est obligatoire"))]
    pub structure: String,
    #[validate(length(min = 1, message = "L'enveloppe est obligatoire"))]
    pub envelope: String,
    pub technical_lots: Option<String>,
    pub security: Option<String>,
    #[validate(range(min = 0.0, message = "Les coûts doivent être positifs"))]
    pub cost_bon: f64,
    #[validate(range(min = 0.0, message = "Les coûts doivent être positifs"))]
    pub cost_haut: f64,
    #[validate(range(min = 0.0, message = "Les coûts doivent être positifs"))]
    pub cost_luxe: Option<f64>,
    #[validate(range(min = 0.0, message = "Les coûts doivent être positifs"))]
    pub cost_studies: f64,
    #[validate(range(min = 0.0, message = "Les coûts doivent être positifs"))]
    pub cost_vrd: f64,
    #[validate(range(min = 0.0, message = "Les coûts doivent être positifs"))]
    pub cost_fees: f64,
    #[validate(range(min = 0.0, message = "Les coûts doivent être positifs"))]
    pub cost_miscellaneous: f64,
}

impl ConstructionCostInput {
    /// Empty form for a new row in `category`.
    pub fn new(category: BuildingCategory) -> Self {
        Self {
            category,
            construction_type: String::new(),
            structure: String::new(),
            envelope: String::new(),
            technical_lots: None,
            security: None,
            cost_bon: 0.0,
            cost_haut: 0.0,
            cost_luxe: None,
            cost_studies: 0.0,
            cost_vrd: 0.0,
            cost_fees: 0.0,
            cost_miscellaneous: 0.0,
        }
    }

    /// Trim text fields and validate.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        self.construction_type = self.construction_type.trim().to_string();
        self.structure = self.structure.trim().to_string();
        self.envelope = self.envelope.trim().to_string();
        self.technical_lots = trimmed(self.technical_lots);
        self.security = trimmed(self.security);
        self.validate()?;
        Ok(self)
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl From<&ConstructionCost> for ConstructionCostInput {
    fn from(row: &ConstructionCost) -> Self {
        Self {
            category: row.category,
            construction_type: row.construction_type.clone(),
            structure: row.structure.clone(),
            envelope: row.envelope.clone(),
            technical_lots: row.technical_lots.clone(),
            security: row.security.clone(),
            cost_bon: row.tiers.bon,
            cost_haut: row.tiers.haut,
            cost_luxe: row.stored_luxe,
            cost_studies: row.ancillary.studies,
            cost_vrd: row.ancillary.vrd,
            cost_fees: row.ancillary.fees,
            cost_miscellaneous: row.ancillary.miscellaneous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    // -- normalization --

    #[test]
    fn current_tier_names_are_used_as_is() {
        let cost: ConstructionCost = serde_json::from_value(json!({
            "id": 3,
            "category": "Residential",
            "construction_type": "Maison individuelle",
            "structure": "Béton armé",
            "envelope": "Maçonnerie",
            "cost_bon": 500,
            "cost_haut": "700.00",
            "cost_luxe": 900,
            "cost_studies": 20,
            "cost_vrd": 10,
            "cost_fees": 5,
            "cost_miscellaneous": 5
        }))
        .unwrap();

        assert_eq!(cost.id, Some(3));
        assert_eq!(cost.tiers, TierValues { bon: 500.0, haut: 700.0, luxe: 900.0 });
        assert!((cost.ancillary.total() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn legacy_tier_names_are_aliased() {
        let cost = RawConstructionCost {
            cost_low: Some(400.0),
            cost_standard: Some(600.0),
            ..Default::default()
        }
        .normalize();

        assert!((cost.tiers.bon - 400.0).abs() < f64::EPSILON);
        assert!((cost.tiers.haut - 600.0).abs() < f64::EPSILON);
        assert!((cost.tiers.luxe - 720.0).abs() < 1e-9);
    }

    #[test]
    fn current_names_win_over_legacy() {
        let cost = RawConstructionCost {
            cost_low: Some(400.0),
            cost_bon: Some(450.0),
            ..Default::default()
        }
        .normalize();
        assert!((cost.tiers.bon - 450.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_or_garbage_amounts_default_to_zero() {
        let cost: ConstructionCost = serde_json::from_value(json!({
            "category": "Industrial",
            "construction_type": "Entrepôt",
            "structure": "Métallique",
            "envelope": "Bardage",
            "cost_haut": 300,
            "cost_studies": "n/a",
            "cost_vrd": null
        }))
        .unwrap();

        assert_eq!(cost.id, None);
        assert_eq!(cost.ancillary, AncillaryCosts::default());
        assert!((cost.tiers.bon - 0.0).abs() < f64::EPSILON);
        assert!((cost.tiers.luxe - 360.0).abs() < 1e-9);
    }

    #[test]
    fn category_aliases_are_accepted() {
        let cost: ConstructionCost = serde_json::from_value(json!({
            "category": "residential",
            "construction_type": "T",
            "structure": "S",
            "envelope": "E"
        }))
        .unwrap();
        assert_eq!(cost.category, BuildingCategory::Residential);
        assert_eq!(BuildingCategory::parse("Industriel"), Some(BuildingCategory::Industrial));
    }

    // -- write payload --

    #[test]
    fn input_serializes_current_names() {
        let row = RawConstructionCost {
            construction_type: "T".into(),
            structure: "S".into(),
            envelope: "E".into(),
            cost_low: Some(100.0),
            ..Default::default()
        }
        .normalize();

        let body = serde_json::to_value(ConstructionCostInput::from(&row)).unwrap();
        assert_eq!(body["cost_bon"], 100.0);
        assert!(body.get("cost_low").is_none());
    }

    // -- serialization --

    #[test]
    fn entity_serializes_to_wire_names() {
        let cost = RawConstructionCost {
            id: Some(10),
            construction_type: "Maison".into(),
            structure: "Béton".into(),
            envelope: "Brique".into(),
            cost_low: Some(500.0),
            cost_standard: Some(700.0),
            cost_studies: Some(40.0),
            ..Default::default()
        }
        .normalize();

        let value = serde_json::to_value(&cost).unwrap();
        assert_eq!(value["cost_bon"], 500.0);
        assert_eq!(value["cost_haut"], 700.0);
        assert!(value["cost_luxe"].is_null());
        assert!(value.get("cost_low").is_none());
        assert!(value.get("tiers").is_none());

        let back: ConstructionCost = serde_json::from_value(value).unwrap();
        assert_eq!(back, cost);
        assert!((back.tiers.luxe - 840.0).abs() < 1e-9);
    }

    #[test]
    fn derived_luxe_is_not_prefilled() {
        let derived = RawConstructionCost {
            cost_haut: Some(700.0),
            ..Default::default()
        }
        .normalize();
        assert!((derived.tiers.luxe - 840.0).abs() < 1e-9);
        assert_eq!(ConstructionCostInput::from(&derived).cost_luxe, None);

        let stored = RawConstructionCost {
            cost_haut: Some(700.0),
            cost_luxe: Some(900.0),
            ..Default::default()
        }
        .normalize();
        assert_eq!(ConstructionCostInput::from(&stored).cost_luxe, Some(900.0));
    }

    #[test]
    fn blank_envelope_is_rejected() {
        let mut input = ConstructionCostInput::new(BuildingCategory::Industrial);
        input.construction_type = "Entrepôt".into();
        input.structure = "Métallique".into();
        input.envelope = "  ".into();
        assert_matches!(input.validated(), Err(CoreError::Validation(msg)) if msg.contains("enveloppe"));
    }

    #[test]
    fn negative_cost_is_rejected() {
        let mut input = ConstructionCostInput::new(BuildingCategory::Industrial);
        input.construction_type = "Entrepôt".into();
        input.structure = "Métallique".into();
        input.envelope = "Bardage".into();
        input.cost_vrd = -1.0;
        assert_matches!(input.validated(), Err(CoreError::Validation(_)));
    }
}
