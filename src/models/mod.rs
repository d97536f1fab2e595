//! # Data Models
//!
//! SeaORM entities backing the matchmaker service, plus small shared
//! response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod applicant;
pub mod application;
pub mod eligibility_criteria;
pub mod posting;
pub mod recommendation;

pub use applicant::Entity as Applicant;
pub use application::{ApplicationStatus, Entity as Application};
pub use eligibility_criteria::Entity as EligibilityCriteria;
pub use posting::Entity as Posting;
pub use recommendation::Entity as Recommendation;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "matchmaker".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Decode a JSON column holding an array of strings, tolerating legacy shapes.
///
/// Non-string entries are dropped; a non-array value yields an empty list.
pub fn string_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_list_drops_non_strings() {
        let value = json!(["rust", 3, null, "go"]);
        assert_eq!(string_list(&value), vec!["rust", "go"]);
    }

    #[test]
    fn string_list_of_object_is_empty() {
        assert!(string_list(&json!({"skills": ["rust"]})).is_empty());
    }
}
