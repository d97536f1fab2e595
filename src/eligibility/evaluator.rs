//! Eligibility evaluator
//!
//! Pure rule evaluation. Each failed rule adds one human-readable reason; an
//! application is eligible when no rule fails.

use serde::Serialize;
use utoipa::ToSchema;

use super::criteria::{Criteria, skill_overlap};
use super::store::ApplicationView;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub application_id: String,
    pub applicant_id: String,
    pub eligible: bool,
    pub reasons: Vec<String>,
    /// Set only when auto-accept was requested for an eligible application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
}

pub fn evaluate(criteria: &Criteria, application: &ApplicationView) -> EligibilityResult {
    let mut reasons = Vec::new();

    let required = criteria.normalized_required();
    if !required.is_empty() {
        let overlap = skill_overlap(&required, &application.skills);
        if overlap < criteria.effective_min_overlap() {
            reasons.push(format!(
                "Insufficient skill overlap ({}/{})",
                overlap,
                required.len()
            ));
        }
    }

    let allowed = criteria.normalized_domains();
    let email = application.email.as_deref().filter(|e| !e.trim().is_empty());
    if let (false, Some(email)) = (allowed.is_empty(), email) {
        let domain = email_domain(email);
        if !allowed.contains(&domain.to_lowercase()) {
            reasons.push(format!("Email domain {domain} not allowed"));
        }
    }

    EligibilityResult {
        application_id: application.application_id.clone(),
        applicant_id: application.applicant_id.clone(),
        eligible: reasons.is_empty(),
        reasons,
        accepted: None,
    }
}

/// Segment after the last `@`; the whole address when there is none.
pub fn email_domain(email: &str) -> &str {
    let email = email.trim();
    email.rsplit_once('@').map_or(email, |(_, domain)| domain)
}
