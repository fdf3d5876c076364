use previx_client::api::ApiError;
use previx_core::error::CoreError;

/// Failure of a page action.
///
/// The page also records a [`StatusMessage`](crate::messages::StatusMessage)
/// for every failure; this type lets callers branch on the cause.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Local validation or lookup failure; no request was issued.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The API rejected the request or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Another request is still in flight.
    #[error("Une opération est déjà en cours")]
    Busy,

    /// The action does not apply to the active tab or current edit state.
    #[error("Action indisponible : {0}")]
    Unavailable(&'static str),
}
