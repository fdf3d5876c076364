//! REST client for the parameters endpoints.
//!
//! Wraps the wear-coefficient and construction-cost collections
//! (`GET`/`POST` on the collection, `PUT`/`DELETE` on `/{id}`) using
//! [`reqwest`]. Every request carries `Authorization: Bearer <token>`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use previx_core::construction_cost::{ConstructionCost, ConstructionCostInput};
use previx_core::types::{Dataset, DbId};
use previx_core::wear::{WearCoefficient, WearCoefficientInput};

use crate::config::ClientConfig;
use crate::session::TokenProvider;

/// Errors from the parameters API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Parameters API error ({status}): {body}")]
    Api {
        status: u16,
        /// Human-readable `detail` field of the error body, if any.
        detail: Option<String>,
        /// Raw response body for debugging.
        body: String,
    },

    /// No bearer token is available; the user must log in again.
    #[error("No session token available")]
    MissingToken,
}

impl ApiError {
    /// The API-provided message, suitable for showing to the user.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::MissingToken => None,
        }
    }
}

/// Extract the `detail` message from an error body.
///
/// Handles `{"detail": "..."}` as well as validation lists
/// `{"detail": [{"msg": "..."}, ...]}`, whose messages are joined with `"; "`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

/// HTTP client for the parameters API.
#[derive(Clone)]
pub struct ParametersApi {
    client: reqwest::Client,
    api_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl ParametersApi {
    /// Create a client from configuration (base URL, timeout, token source).
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(
            client,
            config.api_url.clone(),
            config.token_provider(),
        ))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: String,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Collection URL for a dataset.
    pub fn collection_url(&self, dataset: Dataset) -> String {
        format!("{}{}", self.api_url, dataset.path())
    }

    /// Item URL for a dataset row.
    pub fn item_url(&self, dataset: Dataset, id: DbId) -> String {
        format!("{}/{}", self.collection_url(dataset), id)
    }

    // ---- wear coefficients ----

    /// `GET /parameters/wear-coefficients`
    pub async fn list_wear_coefficients(&self) -> Result<Vec<WearCoefficient>, ApiError> {
        self.list(Dataset::WearCoefficients).await
    }

    /// `POST /parameters/wear-coefficients`
    pub async fn create_wear_coefficient(
        &self,
        input: &WearCoefficientInput,
    ) -> Result<(), ApiError> {
        self.create(Dataset::WearCoefficients, input).await
    }

    /// `PUT /parameters/wear-coefficients/{id}`
    pub async fn update_wear_coefficient(
        &self,
        id: DbId,
        input: &WearCoefficientInput,
    ) -> Result<(), ApiError> {
        self.update(Dataset::WearCoefficients, id, input).await
    }

    /// `DELETE /parameters/wear-coefficients/{id}`
    pub async fn delete_wear_coefficient(&self, id: DbId) -> Result<(), ApiError> {
        self.delete(Dataset::WearCoefficients, id).await
    }

    // ---- construction costs ----

    /// `GET /parameters/construction-costs`
    pub async fn list_construction_costs(&self) -> Result<Vec<ConstructionCost>, ApiError> {
        self.list(Dataset::ConstructionCosts).await
    }

    /// `POST /parameters/construction-costs`
    pub async fn create_construction_cost(
        &self,
        input: &ConstructionCostInput,
    ) -> Result<(), ApiError> {
        self.create(Dataset::ConstructionCosts, input).await
    }

    /// `PUT /parameters/construction-costs/{id}`
    pub async fn update_construction_cost(
        &self,
        id: DbId,
        input: &ConstructionCostInput,
    ) -> Result<(), ApiError> {
        self.update(Dataset::ConstructionCosts, id, input).await
    }

    /// `DELETE /parameters/construction-costs/{id}`
    pub async fn delete_construction_cost(&self, id: DbId) -> Result<(), ApiError> {
        self.delete(Dataset::ConstructionCosts, id).await
    }

    // ---- private helpers ----

    async fn list<T: DeserializeOwned>(&self, dataset: Dataset) -> Result<Vec<T>, ApiError> {
        let request = self.authorized(self.client.get(self.collection_url(dataset)))?;
        let response = request.send().await?;
        Self::parse_response(response).await
    }

    async fn create<B: Serialize + ?Sized>(
        &self,
        dataset: Dataset,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.authorized(self.client.post(self.collection_url(dataset)))?;
        let response = request.json(body).send().await?;
        Self::check_status(response).await
    }

    async fn update<B: Serialize + ?Sized>(
        &self,
        dataset: Dataset,
        id: DbId,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.authorized(self.client.put(self.item_url(dataset, id)))?;
        let response = request.json(body).send().await?;
        Self::check_status(response).await
    }

    async fn delete(&self, dataset: Dataset, id: DbId) -> Result<(), ApiError> {
        let request = self.authorized(self.client.delete(self.item_url(dataset, id)))?;
        let response = request.send().await?;
        Self::check_status(response).await
    }

    /// Attach the bearer token, failing early when there is none.
    fn authorized(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let token = self.tokens.token().ok_or(ApiError::MissingToken)?;
        Ok(builder.bearer_auth(token))
    }

    /// Ensure the response has a success status code. On failure the body
    /// is kept and its `detail` extracted.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let detail = extract_detail(&body);
            tracing::warn!(status = status.as_u16(), detail = ?detail, "Parameters API request failed");
            return Err(ApiError::Api {
                status: status.as_u16(),
                detail,
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
