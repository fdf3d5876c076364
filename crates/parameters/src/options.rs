//! Options of the `previx-parameters` binary.

use previx_client::config::ConfigError;
use previx_core::construction_cost::BuildingCategory;
use previx_core::types::Dataset;

/// What the binary shows, read from the environment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunOptions {
    /// Tab to open (default: wear coefficients).
    pub tab: Dataset,
    /// Search applied to the opened tab.
    pub search: Option<String>,
    /// Surface for the calculator; the calculator runs only when set.
    pub surface: Option<String>,
    pub cost_category: Option<BuildingCategory>,
    pub cost_type: Option<String>,
    pub cost_structure: Option<String>,
    pub cost_envelope: Option<String>,
}

impl RunOptions {
    /// | Env Var                  | Default |
    /// |--------------------------|---------|
    /// | `PREVIX_TAB`             | `wear`  |
    /// | `PREVIX_SEARCH`          | --      |
    /// | `PREVIX_SURFACE`         | --      |
    /// | `PREVIX_COST_CATEGORY`   | --      |
    /// | `PREVIX_COST_TYPE`       | --      |
    /// | `PREVIX_COST_STRUCTURE`  | --      |
    /// | `PREVIX_COST_ENVELOPE`   | --      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let text = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let tab = match text("PREVIX_TAB") {
            None => Dataset::default(),
            Some(value) => Dataset::parse(&value).ok_or(ConfigError::Invalid {
                name: "PREVIX_TAB",
                expected: "tab (wear | costs)",
                value,
            })?,
        };

        let cost_category = match text("PREVIX_COST_CATEGORY") {
            None => None,
            Some(value) => Some(BuildingCategory::parse(&value).ok_or(ConfigError::Invalid {
                name: "PREVIX_COST_CATEGORY",
                expected: "category (residential | industrial)",
                value,
            })?),
        };

        Ok(Self {
            tab,
            search: text("PREVIX_SEARCH"),
            surface: text("PREVIX_SURFACE"),
            cost_category,
            cost_type: text("PREVIX_COST_TYPE"),
            cost_structure: text("PREVIX_COST_STRUCTURE"),
            cost_envelope: text("PREVIX_COST_ENVELOPE"),
        })
    }
}
