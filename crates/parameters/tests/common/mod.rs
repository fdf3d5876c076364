//! Shared fixtures: an in-memory [`ParametersBackend`] and sample rows.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use previx_client::api::ApiError;
use previx_client::backend::ParametersBackend;
use previx_core::construction_cost::{ConstructionCost, ConstructionCostInput};
use previx_core::types::DbId;
use previx_core::wear::{WearCoefficient, WearCoefficientInput};

/// How the next calls should fail, if at all.
#[derive(Debug, Clone, Default)]
pub enum Failure {
    #[default]
    None,
    /// Non-2xx response with an optional `detail`.
    Api(u16, Option<String>),
    /// No bearer token.
    MissingToken,
}

impl Failure {
    fn to_error(&self) -> Option<ApiError> {
        match self {
            Self::None => None,
            Self::Api(status, detail) => Some(ApiError::Api {
                status: *status,
                detail: detail.clone(),
                body: String::new(),
            }),
            Self::MissingToken => Some(ApiError::MissingToken),
        }
    }
}

#[derive(Default)]
struct State {
    wear: Vec<WearCoefficient>,
    costs: Vec<ConstructionCost>,
    next_id: DbId,
    calls: Vec<String>,
    list_failure: Failure,
    write_failure: Failure,
    stall_writes: bool,
}

/// Backend keeping rows in memory and recording every call as
/// `"METHOD dataset[/id]"`.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new(wear: Vec<WearCoefficient>, costs: Vec<ConstructionCost>) -> Self {
        let next_id = wear
            .iter()
            .map(|r| r.wear_id)
            .chain(costs.iter().filter_map(|r| r.id))
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            state: Mutex::new(State {
                wear,
                costs,
                next_id,
                ..State::default()
            }),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn fail_lists(&self, failure: Failure) {
        self.state.lock().unwrap().list_failure = failure;
    }

    pub fn fail_writes(&self, failure: Failure) {
        self.state.lock().unwrap().write_failure = failure;
    }

    /// Make every later write wait forever once recorded.
    pub fn stall_writes(&self) {
        self.state.lock().unwrap().stall_writes = true;
    }

    /// Change a cost row on the "server" side only.
    pub fn set_cost_bon(&self, id: DbId, value: f64) {
        let mut state = self.state.lock().unwrap();
        if let Some(row) = state.costs.iter_mut().find(|r| r.id == Some(id)) {
            row.tiers.bon = value;
        }
    }

    fn record(&self, call: String, failure: impl Fn(&State) -> &Failure) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match failure(&state).to_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn record_write(&self, call: String) -> Result<(), ApiError> {
        let stall = self.state.lock().unwrap().stall_writes;
        self.record(call, |s| &s.write_failure)?;
        if stall {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

fn not_found() -> ApiError {
    ApiError::Api {
        status: 404,
        detail: Some("Élément introuvable".into()),
        body: String::new(),
    }
}

fn wear_from_input(id: DbId, input: &WearCoefficientInput) -> WearCoefficient {
    let mut value = serde_json::to_value(input).unwrap();
    value["wear_id"] = json!(id);
    serde_json::from_value(value).unwrap()
}

fn cost_from_input(id: DbId, input: &ConstructionCostInput) -> ConstructionCost {
    let mut value = serde_json::to_value(input).unwrap();
    value["id"] = json!(id);
    serde_json::from_value(value).unwrap()
}

#[async_trait]
impl ParametersBackend for FakeBackend {
    async fn list_wear_coefficients(&self) -> Result<Vec<WearCoefficient>, ApiError> {
        self.record("GET wear".into(), |s| &s.list_failure)?;
        Ok(self.state.lock().unwrap().wear.clone())
    }

    async fn create_wear_coefficient(&self, input: &WearCoefficientInput) -> Result<(), ApiError> {
        self.record_write("POST wear".into()).await?;
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.wear.push(wear_from_input(id, input));
        Ok(())
    }

    async fn update_wear_coefficient(
        &self,
        id: DbId,
        input: &WearCoefficientInput,
    ) -> Result<(), ApiError> {
        self.record_write(format!("PUT wear/{id}")).await?;
        let mut state = self.state.lock().unwrap();
        let row = state
            .wear
            .iter_mut()
            .find(|r| r.wear_id == id)
            .ok_or_else(not_found)?;
        *row = wear_from_input(id, input);
        Ok(())
    }

    async fn delete_wear_coefficient(&self, id: DbId) -> Result<(), ApiError> {
        self.record_write(format!("DELETE wear/{id}")).await?;
        self.state.lock().unwrap().wear.retain(|r| r.wear_id != id);
        Ok(())
    }

    async fn list_construction_costs(&self) -> Result<Vec<ConstructionCost>, ApiError> {
        self.record("GET costs".into(), |s| &s.list_failure)?;
        Ok(self.state.lock().unwrap().costs.clone())
    }

    async fn create_construction_cost(
        &self,
        input: &ConstructionCostInput,
    ) -> Result<(), ApiError> {
        self.record_write("POST costs".into()).await?;
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.costs.push(cost_from_input(id, input));
        Ok(())
    }

    async fn update_construction_cost(
        &self,
        id: DbId,
        input: &ConstructionCostInput,
    ) -> Result<(), ApiError> {
        self.record_write(format!("PUT costs/{id}")).await?;
        let mut state = self.state.lock().unwrap();
        let row = state
            .costs
            .iter_mut()
            .find(|r| r.id == Some(id))
            .ok_or_else(not_found)?;
        *row = cost_from_input(id, input);
        Ok(())
    }

    async fn delete_construction_cost(&self, id: DbId) -> Result<(), ApiError> {
        self.record_write(format!("DELETE costs/{id}")).await?;
        self.state.lock().unwrap().costs.retain(|r| r.id != Some(id));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sample rows
// ---------------------------------------------------------------------------

pub fn wear(value: Value) -> WearCoefficient {
    serde_json::from_value(value).unwrap()
}

pub fn cost(value: Value) -> ConstructionCost {
    serde_json::from_value(value).unwrap()
}

/// Heating boiler rows (out of age order), one plumbing row without a
/// subcategory, and one worn boiler row.
pub fn sample_wear() -> Vec<WearCoefficient> {
    vec![
        wear(json!({
            "wear_id": 1, "equipment_category": "Chauffage", "equipment_subcategory": "Chaudière",
            "age_min": 10, "age_max": 20, "maintenance_state": "bon", "coefficient": 0.6,
        })),
        wear(json!({
            "wear_id": 2, "equipment_category": "Chauffage", "equipment_subcategory": "Chaudière",
            "age_min": 0, "age_max": 9, "maintenance_state": "bon", "coefficient": 0.9,
        })),
        wear(json!({
            "wear_id": 3, "equipment_category": "Plomberie", "equipment_subcategory": null,
            "age_min": 0, "age_max": null, "maintenance_state": "moyen", "coefficient": 0.7,
            "notes": "Réseau cuivre",
        })),
        wear(json!({
            "wear_id": 4, "equipment_category": "Chauffage", "equipment_subcategory": "Chaudière",
            "age_min": 0, "age_max": 15, "maintenance_state": "mauvais", "coefficient": "0,4",
        })),
    ]
}

/// Two residential houses and one industrial warehouse stored with legacy
/// tier names.
pub fn sample_costs() -> Vec<ConstructionCost> {
    vec![
        cost(json!({
            "id": 10, "category": "residential", "construction_type": "Maison",
            "structure": "Béton", "envelope": "Brique",
            "cost_bon": 500, "cost_haut": 700, "cost_studies": 40,
        })),
        cost(json!({
            "id": 11, "category": "residential", "construction_type": "Maison",
            "structure": "Bois", "envelope": "Bardage",
            "cost_bon": 450, "cost_haut": 650, "cost_luxe": 900,
        })),
        cost(json!({
            "id": 12, "category": "industrial", "construction_type": "Entrepôt",
            "structure": "Métal", "envelope": "Bac acier",
            "cost_low": "300", "cost_standard": 420, "cost_vrd": 15.5,
        })),
    ]
}
