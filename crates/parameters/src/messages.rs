//! User-facing status messages (French UI).

use serde::Serialize;

use previx_client::api::ApiError;
use previx_core::types::Dataset;

/// Shown after a successful calculation.
pub const CALCULATION_DONE: &str = "Calcul effectué avec succès";

/// Shown when an action is attempted while another one is in flight.
pub const OPERATION_IN_PROGRESS: &str = "Une opération est déjà en cours, veuillez patienter";

/// Shown when no bearer token is available.
pub const SESSION_EXPIRED: &str = "Session expirée, veuillez vous reconnecter";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Success,
    Error,
}

/// Feedback displayed above the active tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

/// Remote operation a message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load,
    Create,
    Update,
    Delete,
}

/// Confirmation shown after a successful write.
pub fn success_text(dataset: Dataset, action: Action) -> &'static str {
    match (dataset, action) {
        (Dataset::WearCoefficients, Action::Create) => "Coefficient d'usure ajouté avec succès",
        (Dataset::WearCoefficients, Action::Update) => "Coefficient d'usure mis à jour avec succès",
        (Dataset::WearCoefficients, Action::Delete) => "Coefficient d'usure supprimé avec succès",
        (Dataset::WearCoefficients, Action::Load) => "Coefficients d'usure chargés",
        (Dataset::ConstructionCosts, Action::Create) => "Coût de construction ajouté avec succès",
        (Dataset::ConstructionCosts, Action::Update) => "Coût de construction mis à jour avec succès",
        (Dataset::ConstructionCosts, Action::Delete) => "Coût de construction supprimé avec succès",
        (Dataset::ConstructionCosts, Action::Load) => "Coûts de construction chargés",
    }
}

/// Generic failure text used when the API gives no `detail`.
pub fn fallback_error_text(dataset: Dataset, action: Action) -> &'static str {
    match (dataset, action) {
        (Dataset::WearCoefficients, Action::Load) => {
            "Erreur lors du chargement des coefficients d'usure"
        }
        (Dataset::ConstructionCosts, Action::Load) => {
            "Erreur lors du chargement des coûts de construction"
        }
        (_, Action::Create) => "Erreur lors de l'ajout",
        (_, Action::Update) => "Erreur lors de la mise à jour",
        (_, Action::Delete) => "Erreur lors de la suppression",
    }
}

/// Message for a failed remote call: the API `detail` verbatim when
/// present, otherwise the localized fallback.
pub fn remote_error(dataset: Dataset, action: Action, error: &ApiError) -> StatusMessage {
    let text = match error {
        ApiError::MissingToken => SESSION_EXPIRED,
        other => other
            .detail()
            .unwrap_or_else(|| fallback_error_text(dataset, action)),
    };
    StatusMessage::error(text)
}
