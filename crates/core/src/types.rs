/// Primary keys assigned by the parameters API.
pub type DbId = i64;

/// The two reference datasets managed on the parameters page.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    #[default]
    WearCoefficients,
    ConstructionCosts,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Self::WearCoefficients, Self::ConstructionCosts];

    /// Collection path under the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::WearCoefficients => "/parameters/wear-coefficients",
            Self::ConstructionCosts => "/parameters/construction-costs",
        }
    }

    /// Human-readable label for display in the UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::WearCoefficients => "Coefficients d'usure",
            Self::ConstructionCosts => "Coûts de construction",
        }
    }

    /// Parse a short name as used in configuration (`wear`, `costs`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "wear" | "wear-coefficients" | "wear_coefficients" => Some(Self::WearCoefficients),
            "costs" | "construction-costs" | "construction_costs" => Some(Self::ConstructionCosts),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_paths() {
        assert_eq!(Dataset::WearCoefficients.path(), "/parameters/wear-coefficients");
        assert_eq!(Dataset::ConstructionCosts.path(), "/parameters/construction-costs");
    }

    #[test]
    fn dataset_parse_accepts_short_names() {
        assert_eq!(Dataset::parse("Wear"), Some(Dataset::WearCoefficients));
        assert_eq!(Dataset::parse("costs"), Some(Dataset::ConstructionCosts));
        assert_eq!(Dataset::parse("assets"), None);
    }
}
