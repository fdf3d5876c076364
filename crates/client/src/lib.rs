//! HTTP client for the Prev-IX parameters API.
//!
//! Provides the `reqwest`-based [`api::ParametersApi`], bearer-token
//! sources, environment configuration, and the [`backend::ParametersBackend`]
//! trait the parameters page is written against.

pub mod api;
pub mod backend;
pub mod config;
pub mod session;
