//! In-progress add/edit form.

use previx_core::construction_cost::ConstructionCostInput;
use previx_core::types::{Dataset, DbId};
use previx_core::wear::{BucketKey, WearCoefficientInput};

/// Row being written: a new one, or an existing one by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    New,
    Existing(DbId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditForm {
    Wear(WearCoefficientInput),
    Cost(ConstructionCostInput),
}

impl EditForm {
    pub fn dataset(&self) -> Dataset {
        match self {
            Self::Wear(_) => Dataset::WearCoefficients,
            Self::Cost(_) => Dataset::ConstructionCosts,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub target: EditTarget,
    pub form: EditForm,
    /// Bucket hosting the add form, when adding a wear coefficient from
    /// inside the grouped view.
    pub bucket: Option<BucketKey>,
}

impl EditSession {
    pub fn is_new(&self) -> bool {
        self.target == EditTarget::New
    }

    /// Bucket to keep visible while this session adds a row there.
    pub fn adding_into(&self) -> Option<&BucketKey> {
        match self.target {
            EditTarget::New => self.bucket.as_ref(),
            EditTarget::Existing(_) => None,
        }
    }
}
