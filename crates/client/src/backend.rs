//! Abstraction over the parameters API.
//!
//! The page view-model depends on [`ParametersBackend`] rather than on
//! [`ParametersApi`] directly, so it can be driven by an in-memory backend
//! in tests.

use async_trait::async_trait;

use previx_core::construction_cost::{ConstructionCost, ConstructionCostInput};
use previx_core::types::DbId;
use previx_core::wear::{WearCoefficient, WearCoefficientInput};

use crate::api::{ApiError, ParametersApi};

#[async_trait]
pub trait ParametersBackend: Send + Sync {
    async fn list_wear_coefficients(&self) -> Result<Vec<WearCoefficient>, ApiError>;

    async fn create_wear_coefficient(&self, input: &WearCoefficientInput) -> Result<(), ApiError>;

    async fn update_wear_coefficient(
        &self,
        id: DbId,
        input: &WearCoefficientInput,
    ) -> Result<(), ApiError>;

    async fn delete_wear_coefficient(&self, id: DbId) -> Result<(), ApiError>;

    async fn list_construction_costs(&self) -> Result<Vec<ConstructionCost>, ApiError>;

    async fn create_construction_cost(&self, input: &ConstructionCostInput)
        -> Result<(), ApiError>;

    async fn update_construction_cost(
        &self,
        id: DbId,
        input: &ConstructionCostInput,
    ) -> Result<(), ApiError>;

    async fn delete_construction_cost(&self, id: DbId) -> Result<(), ApiError>;
}

#[async_trait]
impl ParametersBackend for ParametersApi {
    async fn list_wear_coefficients(&self) -> Result<Vec<WearCoefficient>, ApiError> {
        ParametersApi::list_wear_coefficients(self).await
    }

    async fn create_wear_coefficient(&self, input: &WearCoefficientInput) -> Result<(), ApiError> {
        ParametersApi::create_wear_coefficient(self, input).await
    }

    async fn update_wear_coefficient(
        &self,
        id: DbId,
        input: &WearCoefficientInput,
    ) -> Result<(), ApiError> {
        ParametersApi::update_wear_coefficient(self, id, input).await
    }

    async fn delete_wear_coefficient(&self, id: DbId) -> Result<(), ApiError> {
        ParametersApi::delete_wear_coefficient(self, id).await
    }

    async fn list_construction_costs(&self) -> Result<Vec<ConstructionCost>, ApiError> {
        ParametersApi::list_construction_costs(self).await
    }

    async fn create_construction_cost(
        &self,
        input: &ConstructionCostInput,
    ) -> Result<(), ApiError> {
        ParametersApi::create_construction_cost(self, input).await
    }

    async fn update_construction_cost(
        &self,
        id: DbId,
        input: &ConstructionCostInput,
    ) -> Result<(), ApiError> {
        ParametersApi::update_construction_cost(self, id, input).await
    }

    async fn delete_construction_cost(&self, id: DbId) -> Result<(), ApiError> {
        ParametersApi::delete_construction_cost(self, id).await
    }
}
