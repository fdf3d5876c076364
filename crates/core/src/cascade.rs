//! Cascading selection of a construction-cost row.
//!
//! Category narrows the construction types, type narrows structures,
//! structure narrows envelopes. Only combinations present in the source rows
//! can be selected. The selected row itself is never stored: it is
//! re-derived from the current tuple on every call to
//! [`CostSelection::resolve`], so it follows data reloads and becomes `None`
//! as soon as the tuple stops matching.

use crate::construction_cost::{BuildingCategory, ConstructionCost};
use crate::error::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostSelection {
    pub category: Option<BuildingCategory>,
    pub construction_type: Option<String>,
    pub structure: Option<String>,
    pub envelope: Option<String>,
}

/// Distinct values in first-seen order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

impl CostSelection {
    pub fn is_complete(&self) -> bool {
        self.category.is_some()
            && self.construction_type.is_some()
            && self.structure.is_some()
            && self.envelope.is_some()
    }

    // -- available choices --

    /// Construction types present for the selected category.
    pub fn available_types(&self, rows: &[ConstructionCost]) -> Vec<String> {
        let Some(category) = self.category else {
            return Vec::new();
        };
        distinct(
            rows.iter()
                .filter(|r| r.category == category)
                .map(|r| r.construction_type.as_str()),
        )
    }

    /// Structures present for the selected (category, type).
    pub fn available_structures(&self, rows: &[ConstructionCost]) -> Vec<String> {
        distinct(self.type_rows(rows).map(|r| r.structure.as_str()))
    }

    /// Envelopes present for the selected (category, type, structure).
    pub fn available_envelopes(&self, rows: &[ConstructionCost]) -> Vec<String> {
        distinct(self.structure_rows(rows).map(|r| r.envelope.as_str()))
    }

    fn type_rows<'a>(
        &'a self,
        rows: &'a [ConstructionCost],
    ) -> impl Iterator<Item = &'a ConstructionCost> + 'a {
        rows.iter().filter(move |r| {
            Some(r.category) == self.category
                && self.construction_type.as_deref() == Some(r.construction_type.as_str())
        })
    }

    fn structure_rows<'a>(
        &'a self,
        rows: &'a [ConstructionCost],
    ) -> impl Iterator<Item = &'a ConstructionCost> + 'a {
        self.type_rows(rows)
            .filter(move |r| self.structure.as_deref() == Some(r.structure.as_str()))
    }

    // -- transitions --

    /// Select a category; clears every dependent choice.
    pub fn set_category(&mut self, category: Option<BuildingCategory>) {
        self.category = category;
        self.construction_type = None;
        self.structure = None;
        self.envelope = None;
    }

    /// Select a construction type and adopt structure and envelope from the
    /// first row of that type.
    pub fn set_type(
        &mut self,
        rows: &[ConstructionCost],
        construction_type: Option<&str>,
    ) -> Result<(), CoreError> {
        if let Some(value) = construction_type {
            if !self.available_types(rows).iter().any(|t| t == value) {
                return Err(CoreError::Validation(format!(
                    "Type de construction indisponible pour cette catégorie : {value}"
                )));
            }
        }
        self.construction_type = construction_type.map(str::to_string);
        let first = self.type_rows(rows).next().cloned();
        self.structure = first.as_ref().map(|r| r.structure.clone());
        self.envelope = first.map(|r| r.envelope);
        Ok(())
    }

    /// Select a structure and adopt the envelope of the first matching row.
    pub fn set_structure(
        &mut self,
        rows: &[ConstructionCost],
        structure: Option<&str>,
    ) -> Result<(), CoreError> {
        if let Some(value) = structure {
            if !self.available_structures(rows).iter().any(|s| s == value) {
                return Err(CoreError::Validation(format!(
                    "Structure indisponible pour ce type de construction : {value}"
                )));
            }
        }
        self.structure = structure.map(str::to_string);
        let envelope = self.structure_rows(rows).next().map(|r| r.envelope.clone());
        self.envelope = envelope;
        Ok(())
    }

    /// Select an envelope among those available for the current structure.
    pub fn set_envelope(
        &mut self,
        rows: &[ConstructionCost],
        envelope: Option<&str>,
    ) -> Result<(), CoreError> {
        if let Some(value) = envelope {
            if !self.available_envelopes(rows).iter().any(|e| e == value) {
                return Err(CoreError::Validation(format!(
                    "Enveloppe indisponible pour cette structure : {value}"
                )));
            }
        }
        self.envelope = envelope.map(str::to_string);
        Ok(())
    }

    /// The row matching the full (category, type, structure, envelope)
    /// tuple, if any.
    pub fn resolve<'a>(&self, rows: &'a [ConstructionCost]) -> Option<&'a ConstructionCost> {
        let (Some(category), Some(ty), Some(structure), Some(envelope)) = (
            self.category,
            self.construction_type.as_deref(),
            self.structure.as_deref(),
            self.envelope.as_deref(),
        ) else {
            return None;
        };
        rows.iter()
            .find(|r| r.matches(category, ty, structure, envelope))
    }
}
