//! Parameters page of the Prev-IX application.
//!
//! [`page::ParametersPage`] drives the two reference tabs (wear coefficients
//! and construction costs): filtered and grouped views, add/edit/delete over
//! the REST API, and the construction cost calculator.

pub mod edit;
pub mod error;
pub mod messages;
pub mod options;
pub mod page;
pub mod report;
pub mod store;
