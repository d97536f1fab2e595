//! Data-access seam for postings, applications and eligibility criteria

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::criteria::Criteria;
use crate::error::{AcceptanceError, RepositoryError};
use crate::models::{ApplicationStatus, application, posting};

/// An application joined with the applicant fields the evaluator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationView {
    pub application_id: String,
    pub applicant_id: String,
    pub posting_id: String,
    pub status: ApplicationStatus,
    pub name: Option<String>,
    pub email: Option<String>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
}

/// Result of a committed acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostingSlots {
    pub id: String,
    pub remaining_slots: i32,
}

#[derive(Debug, Clone)]
pub struct Acceptance {
    pub application: application::Model,
    pub posting: PostingSlots,
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn find_posting(&self, posting_id: &str)
    -> Result<Option<posting::Model>, RepositoryError>;

    async fn find_application(
        &self,
        application_id: &str,
    ) -> Result<Option<application::Model>, RepositoryError>;

    async fn list_applications(
        &self,
        posting_id: &str,
    ) -> Result<Vec<ApplicationView>, RepositoryError>;

    async fn get_criteria(&self, posting_id: &str) -> Result<Option<Criteria>, RepositoryError>;

    async fn upsert_criteria(
        &self,
        posting_id: &str,
        criteria: &Criteria,
    ) -> Result<Criteria, RepositoryError>;

    /// Postings whose registration date is at or before `now`.
    async fn list_due_postings(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<posting::Model>, RepositoryError>;

    /// Flip a PENDING application to ACCEPTED and take one slot, atomically.
    async fn accept(&self, application_id: &str) -> Result<Acceptance, AcceptanceError>;

    /// Flip a PENDING application to REJECTED. Slots are untouched.
    async fn reject(&self, application_id: &str) -> Result<application::Model, AcceptanceError>;
}
