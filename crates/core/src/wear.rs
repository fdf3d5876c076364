//! Equipment wear-depreciation coefficients.
//!
//! A coefficient applies to one (category, subcategory, maintenance state)
//! bucket and an age range in years. Ranges are meant to partition the age
//! axis but the API does not enforce it; [`find_range_issues`] reports
//! overlaps and gaps and [`lookup_coefficient`] resolves overlaps to the
//! range with the lowest `age_min`.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::decimal::{lenient_f64, lenient_i32};
use crate::error::CoreError;
use crate::types::DbId;

/// Group label for coefficients without a subcategory.
pub const DEFAULT_SUBCATEGORY: &str = "General";

// ---------------------------------------------------------------------------
// Maintenance state
// ---------------------------------------------------------------------------

/// Upkeep condition of the equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceState {
    Bon,
    Moyen,
    Mauvais,
}

impl MaintenanceState {
    /// Display order of state buckets inside a subcategory.
    pub const ORDER: [MaintenanceState; 3] = [Self::Bon, Self::Moyen, Self::Mauvais];

    /// Wire value, as sent to and received from the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bon => "bon",
            Self::Moyen => "moyen",
            Self::Mauvais => "mauvais",
        }
    }

    /// Human-readable label for display in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bon => "Bon état",
            Self::Moyen => "État moyen",
            Self::Mauvais => "Mauvais état",
        }
    }

    /// Parse a wire value. Case-insensitive; surrounding whitespace ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "bon" => Some(Self::Bon),
            "moyen" => Some(Self::Moyen),
            "mauvais" => Some(Self::Mauvais),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A wear coefficient row as returned by the parameters API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawWearCoefficient")]
pub struct WearCoefficient {
    pub wear_id: DbId,
    pub equipment_category: String,
    pub equipment_subcategory: Option<String>,
    pub age_min: i32,
    /// `None` means open-ended.
    pub age_max: Option<i32>,
    pub maintenance_state: MaintenanceState,
    pub coefficient: f64,
    pub useful_life_years: Option<i32>,
    pub annual_wear_rate: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
struct RawWearCoefficient {
    #[serde(alias = "id")]
    wear_id: DbId,
    equipment_category: String,
    #[serde(default)]
    equipment_subcategory: Option<String>,
    #[serde(default, deserialize_with = "lenient_i32")]
    age_min: Option<i32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    age_max: Option<i32>,
    maintenance_state: MaintenanceState,
    #[serde(default, deserialize_with = "lenient_f64")]
    coefficient: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i32")]
    useful_life_years: Option<i32>,
    #[serde(default, deserialize_with = "lenient_f64")]
    annual_wear_rate: Option<f64>,
    #[serde(default)]
    notes: Option<String>,
}

impl From<RawWearCoefficient> for WearCoefficient {
    fn from(raw: RawWearCoefficient) -> Self {
        Self {
            wear_id: raw.wear_id,
            equipment_category: raw.equipment_category,
            equipment_subcategory: non_blank(raw.equipment_subcategory),
            age_min: raw.age_min.unwrap_or(0),
            age_max: raw.age_max,
            maintenance_state: raw.maintenance_state,
            coefficient: raw.coefficient.unwrap_or(0.0),
            useful_life_years: raw.useful_life_years,
            annual_wear_rate: raw.annual_wear_rate,
            notes: non_blank(raw.notes),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl WearCoefficient {
    /// Subcategory used for grouping; absent values fall into
    /// [`DEFAULT_SUBCATEGORY`].
    pub fn subcategory_label(&self) -> &str {
        self.equipment_subcategory
            .as_deref()
            .unwrap_or(DEFAULT_SUBCATEGORY)
    }

    /// The bucket this row belongs to.
    pub fn bucket_key(&self) -> BucketKey {
        BucketKey {
            category: self.equipment_category.clone(),
            subcategory: self.subcategory_label().to_string(),
            state: self.maintenance_state,
        }
    }

    /// Whether `age` falls within `[age_min, age_max]`.
    pub fn covers_age(&self, age: i32) -> bool {
        age >= self.age_min && self.age_max.map_or(true, |max| age <= max)
    }

    /// Human-readable age range, e.g. `"0-5 ans"` or `"10+ ans"`.
    pub fn age_range_label(&self) -> String {
        match self.age_max {
            Some(max) => format!("{}-{} ans", self.age_min, max),
            None => format!("{}+ ans", self.age_min),
        }
    }
}

/// Identifies one (category, subcategory, state) bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub category: String,
    /// Grouping label; [`DEFAULT_SUBCATEGORY`] when the rows have none.
    pub subcategory: String,
    pub state: MaintenanceState,
}

impl BucketKey {
    pub fn new(
        category: impl Into<String>,
        subcategory: Option<&str>,
        state: MaintenanceState,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory: subcategory
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_SUBCATEGORY)
                .to_string(),
            state,
        }
    }

    pub fn contains(&self, row: &WearCoefficient) -> bool {
        row.equipment_category == self.category
            && row.subcategory_label() == self.subcategory
            && row.maintenance_state == self.state
    }
}

// ---------------------------------------------------------------------------
// Write payload
// ---------------------------------------------------------------------------

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_age_bounds"))]
pub struct WearCoefficientInput {
    #[validate(length(min = 1, message = "La catégorie d'équipement est obligatoire"))]
    pub equipment_category: String,
    pub equipment_subcategory: Option<String>,
    #[validate(range(min = 0, message = "L'âge minimum doit être positif"))]
    pub age_min: i32,
    pub age_max: Option<i32>,
    pub maintenance_state: MaintenanceState,
    #[validate(range(min = 0.0, max = 1.0, message = "Le coefficient doit être compris entre 0 et 1"))]
    pub coefficient: f64,
    #[validate(range(min = 0, message = "La durée de vie doit être positive"))]
    pub useful_life_years: Option<i32>,
    #[validate(range(min = 0.0, max = 100.0, message = "Le taux d'usure doit être compris entre 0 et 100 %"))]
    pub annual_wear_rate: Option<f64>,
    pub notes: Option<String>,
}

fn validate_age_bounds(input: &WearCoefficientInput) -> Result<(), ValidationError> {
    match input.age_max {
        Some(max) if max < input.age_min => {
            let mut err = ValidationError::new("age_bounds");
            err.message = Some(Cow::from(
                "L'âge maximum doit être supérieur ou égal à l'âge minimum",
            ));
            Err(err)
        }
        _ => Ok(()),
    }
}

impl WearCoefficientInput {
    /// Empty form for a new row in `key`, with `age_min` suggested from the
    /// existing ranges of that bucket.
    pub fn for_bucket(key: &BucketKey, bucket: &[WearCoefficient]) -> Self {
        let subcategory = (key.subcategory != DEFAULT_SUBCATEGORY).then(|| key.subcategory.clone());
        Self {
            equipment_category: key.category.clone(),
            equipment_subcategory: subcategory,
            age_min: suggested_age_min(bucket).unwrap_or(0),
            age_max: None,
            maintenance_state: key.state,
            coefficient: 1.0,
            useful_life_years: None,
            annual_wear_rate: None,
            notes: None,
        }
    }

    /// Trim text fields and run field and cross-field validation.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        self.equipment_category = self.equipment_category.trim().to_string();
        self.equipment_subcategory = non_blank(self.equipment_subcategory).map(|s| s.trim().to_string());
        self.notes = non_blank(self.notes).map(|s| s.trim().to_string());
        self.validate()?;
        Ok(self)
    }
}

impl Default for WearCoefficientInput {
    fn default() -> Self {
        Self {
            equipment_category: String::new(),
            equipment_subcategory: None,
            age_min: 0,
            age_max: None,
            maintenance_state: MaintenanceState::Bon,
            coefficient: 1.0,
            useful_life_years: None,
            annual_wear_rate: None,
            notes: None,
        }
    }
}

impl From<&WearCoefficient> for WearCoefficientInput {
    fn from(row: &WearCoefficient) -> Self {
        Self {
            equipment_category: row.equipment_category.clone(),
            equipment_subcategory: row.equipment_subcategory.clone(),
            age_min: row.age_min,
            age_max: row.age_max,
            maintenance_state: row.maintenance_state,
            coefficient: row.coefficient,
            useful_life_years: row.useful_life_years,
            annual_wear_rate: row.annual_wear_rate,
            notes: row.notes.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Age ranges
// ---------------------------------------------------------------------------

/// Find the coefficient applicable to an asset of `age` years in `key`.
///
/// Candidate ranges are scanned by ascending `age_min`; when ranges overlap
/// the first one containing `age` wins.
pub fn lookup_coefficient<'a>(
    rows: &'a [WearCoefficient],
    key: &BucketKey,
    age: i32,
) -> Option<&'a WearCoefficient> {
    let mut candidates: Vec<&WearCoefficient> = rows.iter().filter(|r| key.contains(r)).collect();
    candidates.sort_by_key(|r| r.age_min);
    candidates.into_iter().find(|r| r.covers_age(age))
}

/// Inconsistency between two consecutive age ranges of one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeIssue {
    /// `second` starts before `first` ends.
    Overlap { first: DbId, second: DbId },
    /// No range covers ages `from..=to`.
    Gap {
        after: DbId,
        before: DbId,
        from: i32,
        to: i32,
    },
}

/// Report overlaps and gaps between consecutive ranges of a single bucket.
///
/// Informational only; rows are never rejected because of it.
pub fn find_range_issues(bucket: &[WearCoefficient]) -> Vec<RangeIssue> {
    let mut sorted: Vec<&WearCoefficient> = bucket.iter().collect();
    sorted.sort_by_key(|r| r.age_min);

    sorted
        .windows(2)
        .filter_map(|pair| {
            let (prev, next) = (pair[0], pair[1]);
            match prev.age_max {
                None => Some(RangeIssue::Overlap {
                    first: prev.wear_id,
                    second: next.wear_id,
                }),
                Some(max) if next.age_min <= max => Some(RangeIssue::Overlap {
                    first: prev.wear_id,
                    second: next.wear_id,
                }),
                Some(max) if next.age_min > max + 1 => Some(RangeIssue::Gap {
                    after: prev.wear_id,
                    before: next.wear_id,
                    from: max + 1,
                    to: next.age_min - 1,
                }),
                Some(_) => None,
            }
        })
        .collect()
}

/// `age_min` continuing the last bounded range of a bucket.
///
/// Returns `Some(0)` for an empty bucket and `None` when the last range is
/// open-ended.
pub fn suggested_age_min(bucket: &[WearCoefficient]) -> Option<i32> {
    match bucket.iter().max_by_key(|r| r.age_min) {
        None => Some(0),
        Some(last) => last.age_max.map(|max| max + 1),
    }
}
