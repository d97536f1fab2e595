//! Eligibility service
//!
//! Ties criteria storage, evaluation, organizer decisions and analytics to
//! an injected [`ApplicationStore`].

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use utoipa::ToSchema;

use super::analytics::{PostingAnalytics, summarize};
use super::criteria::Criteria;
use super::evaluator::{EligibilityResult, evaluate};
use super::store::{ApplicationStore, PostingSlots};
use crate::error::{AcceptanceError, RepositoryError};
use crate::models::{ApplicationStatus, application, posting};

#[derive(Debug, Error)]
pub enum EligibilityError {
    #[error("posting {0} not found")]
    PostingNotFound(String),
    #[error("application {0} not found")]
    ApplicationNotFound(String),
    #[error("requester does not own posting {0}")]
    Forbidden(String),
    #[error("invalid status {0}")]
    InvalidStatus(String),
    #[error(transparent)]
    Acceptance(#[from] AcceptanceError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One row of the due-posting sweep.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DueResult {
    pub hackathon_id: String,
    pub application_id: String,
    pub applicant_id: String,
    pub eligible: bool,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub application: application::Model,
    /// Present only when the decision consumed a slot
    pub posting: Option<PostingSlots>,
}

pub struct EligibilityService {
    store: Arc<dyn ApplicationStore>,
}

impl EligibilityService {
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }

    async fn require_posting(&self, posting_id: &str) -> Result<posting::Model, EligibilityError> {
        self.store
            .find_posting(posting_id)
            .await?
            .ok_or_else(|| EligibilityError::PostingNotFound(posting_id.to_string()))
    }

    pub async fn get_criteria(&self, posting_id: &str) -> Result<Option<Criteria>, EligibilityError> {
        self.require_posting(posting_id).await?;
        Ok(self.store.get_criteria(posting_id).await?)
    }

    pub async fn save_criteria(
        &self,
        posting_id: &str,
        criteria: &Criteria,
    ) -> Result<Criteria, EligibilityError> {
        self.require_posting(posting_id).await?;
        let saved = self.store.upsert_criteria(posting_id, criteria).await?;
        info!(posting_id, "Saved eligibility criteria");
        Ok(saved)
    }

    /// Evaluate every application of the posting. With `auto_accept`, eligible
    /// PENDING applications are accepted one by one; a failed acceptance is
    /// logged and evaluation continues. Accepting is reserved to the posting
    /// owner, plain evaluation is open to anyone.
    pub async fn verify(
        &self,
        posting_id: &str,
        auto_accept: bool,
        requester: Option<&str>,
    ) -> Result<Vec<EligibilityResult>, EligibilityError> {
        let posting = self.require_posting(posting_id).await?;
        if auto_accept && requester != Some(posting.owner_id.as_str()) {
            return Err(EligibilityError::Forbidden(posting.id));
        }
        let criteria = self.store.get_criteria(posting_id).await?.unwrap_or_default();
        let applications = self.store.list_applications(posting_id).await?;

        let mut results = Vec::with_capacity(applications.len());
        for view in &applications {
            let mut result = evaluate(&criteria, view);

            if auto_accept && result.eligible {
                let accepted = if !view.status.is_terminal() {
                    match self.store.accept(&view.application_id).await {
                        Ok(_) => {
                            counter!("matchmaker_acceptances_total", "source" => "auto").increment(1);
                            true
                        }
                        Err(err) => {
                            warn!(
                                posting_id,
                                application_id = %view.application_id,
                                error = %err,
                                "Auto-accept failed"
                            );
                            false
                        }
                    }
                } else {
                    view.status == ApplicationStatus::Accepted
                };
                result.accepted = Some(accepted);
            }

            results.push(result);
        }

        info!(
            posting_id,
            evaluated = results.len(),
            eligible = results.iter().filter(|r| r.eligible).count(),
            auto_accept,
            "Verified applications"
        );
        Ok(results)
    }

    /// Evaluate every posting whose registration date has passed. Never accepts.
    pub async fn verify_due(&self) -> Result<(usize, Vec<DueResult>), EligibilityError> {
        let postings = self.store.list_due_postings(Utc::now()).await?;
        let mut results = Vec::new();

        for posting in &postings {
            let criteria = self.store.get_criteria(&posting.id).await?.unwrap_or_default();
            for view in self.store.list_applications(&posting.id).await? {
                let result = evaluate(&criteria, &view);
                results.push(DueResult {
                    hackathon_id: posting.id.clone(),
                    application_id: result.application_id,
                    applicant_id: result.applicant_id,
                    eligible: result.eligible,
                    reasons: result.reasons,
                });
            }
        }

        info!(processed = postings.len(), results = results.len(), "Due verification sweep finished");
        Ok((postings.len(), results))
    }

    /// Organizer decision on one application. Only the posting owner may decide.
    pub async fn decide(
        &self,
        application_id: &str,
        requester: &str,
        status: &str,
    ) -> Result<DecisionOutcome, EligibilityError> {
        let status = match status {
            "ACCEPTED" => ApplicationStatus::Accepted,
            "REJECTED" => ApplicationStatus::Rejected,
            other => return Err(EligibilityError::InvalidStatus(other.to_string())),
        };

        let application = self
            .store
            .find_application(application_id)
            .await?
            .ok_or_else(|| EligibilityError::ApplicationNotFound(application_id.to_string()))?;
        let posting = self.require_posting(&application.posting_id).await?;
        if posting.owner_id != requester {
            return Err(EligibilityError::Forbidden(posting.id));
        }

        match status {
            ApplicationStatus::Accepted => match self.store.accept(application_id).await {
                Ok(acceptance) => {
                    counter!("matchmaker_acceptances_total", "source" => "organizer").increment(1);
                    info!(
                        application_id,
                        posting_id = %acceptance.posting.id,
                        remaining_slots = acceptance.posting.remaining_slots,
                        "Application accepted"
                    );
                    Ok(DecisionOutcome {
                        application: acceptance.application,
                        posting: Some(acceptance.posting),
                    })
                }
                Err(AcceptanceError::NoOpenSlots) => {
                    counter!("matchmaker_slot_exhausted_total").increment(1);
                    Err(AcceptanceError::NoOpenSlots.into())
                }
                Err(err) => Err(err.into()),
            },
            _ => {
                let application = self.store.reject(application_id).await?;
                info!(application_id, "Application rejected");
                Ok(DecisionOutcome {
                    application,
                    posting: None,
                })
            }
        }
    }

    pub async fn analytics(&self, posting_id: &str) -> Result<PostingAnalytics, EligibilityError> {
        self.require_posting(posting_id).await?;
        let criteria = self.store.get_criteria(posting_id).await?;
        let applications = self.store.list_applications(posting_id).await?;
        Ok(summarize(criteria.as_ref(), &applications))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration};

    use super::*;
    use crate::eligibility::store::{Acceptance, ApplicationView};

    #[derive(Default)]
    struct MemoryStore {
        postings: Mutex<HashMap<String, posting::Model>>,
        applications: Mutex<Vec<ApplicationView>>,
        criteria: Mutex<HashMap<String, Criteria>>,
    }

    fn posting(id: &str, owner: &str, slots: i32) -> posting::Model {
        let now = Utc::now().fixed_offset();
        posting::Model {
            id: id.to_string(),
            owner_id: owner.to_string(),
            team_name: None,
            hackathon_name: None,
            required_skills: serde_json::json!([]),
            role: None,
            experience: None,
            remaining_slots: slots,
            reg_date: Some((Utc::now() - Duration::days(1)).fixed_offset()),
            created_at: now,
            updated_at: now,
        }
    }

    fn view(id: &str, posting_id: &str, skills: &[&str], email: &str) -> ApplicationView {
        ApplicationView {
            application_id: id.to_string(),
            applicant_id: format!("cand-{id}"),
            posting_id: posting_id.to_string(),
            status: ApplicationStatus::Pending,
            name: None,
            email: Some(email.to_string()),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            resume_url: None,
            linkedin_url: None,
            github_url: None,
        }
    }

    impl MemoryStore {
        fn to_model(view: &ApplicationView) -> application::Model {
            let now = Utc::now().fixed_offset();
            application::Model {
                id: view.application_id.clone(),
                candidate_id: view.applicant_id.clone(),
                posting_id: view.posting_id.clone(),
                status: view.status,
                created_at: now,
                updated_at: now,
            }
        }
    }

    #[async_trait]
    impl ApplicationStore for MemoryStore {
        async fn find_posting(&self, id: &str) -> Result<Option<posting::Model>, RepositoryError> {
            Ok(self.postings.lock().unwrap().get(id).cloned())
        }

        async fn find_application(
            &self,
            id: &str,
        ) -> Result<Option<application::Model>, RepositoryError> {
            let apps = self.applications.lock().unwrap();
            Ok(apps.iter().find(|a| a.application_id == id).map(Self::to_model))
        }

        async fn list_applications(
            &self,
            posting_id: &str,
        ) -> Result<Vec<ApplicationView>, RepositoryError> {
            let apps = self.applications.lock().unwrap();
            Ok(apps.iter().filter(|a| a.posting_id == posting_id).cloned().collect())
        }

        async fn get_criteria(&self, posting_id: &str) -> Result<Option<Criteria>, RepositoryError> {
            Ok(self.criteria.lock().unwrap().get(posting_id).cloned())
        }

        async fn upsert_criteria(
            &self,
            posting_id: &str,
            criteria: &Criteria,
        ) -> Result<Criteria, RepositoryError> {
            self.criteria
                .lock()
                .unwrap()
                .insert(posting_id.to_string(), criteria.clone());
            Ok(criteria.clone())
        }

        async fn list_due_postings(
            &self,
            now: DateTime<Utc>,
        ) -> Result<Vec<posting::Model>, RepositoryError> {
            let postings = self.postings.lock().unwrap();
            Ok(postings
                .values()
                .filter(|p| p.reg_date.is_some_and(|d| d <= now))
                .cloned()
                .collect())
        }

        async fn accept(&self, id: &str) -> Result<Acceptance, AcceptanceError> {
            let mut apps = self.applications.lock().unwrap();
            let app = apps
                .iter_mut()
                .find(|a| a.application_id == id)
                .ok_or_else(|| AcceptanceError::ApplicationNotFound(id.to_string()))?;
            if app.status != ApplicationStatus::Pending {
                return Err(AcceptanceError::AlreadyDecided { status: app.status });
            }
            let mut postings = self.postings.lock().unwrap();
            let posting = postings
                .get_mut(&app.posting_id)
                .ok_or_else(|| AcceptanceError::PostingNotFound(app.posting_id.clone()))?;
            if posting.remaining_slots <= 0 {
                return Err(AcceptanceError::NoOpenSlots);
            }
            posting.remaining_slots -= 1;
            app.status = ApplicationStatus::Accepted;
            Ok(Acceptance {
                application: Self::to_model(app),
                posting: PostingSlots {
                    id: posting.id.clone(),
                    remaining_slots: posting.remaining_slots,
                },
            })
        }

        async fn reject(&self, id: &str) -> Result<application::Model, AcceptanceError> {
            let mut apps = self.applications.lock().unwrap();
            let app = apps
                .iter_mut()
                .find(|a| a.application_id == id)
                .ok_or_else(|| AcceptanceError::ApplicationNotFound(id.to_string()))?;
            if app.status != ApplicationStatus::Pending {
                return Err(AcceptanceError::AlreadyDecided { status: app.status });
            }
            app.status = ApplicationStatus::Rejected;
            Ok(Self::to_model(app))
        }
    }

    fn service_with(store: MemoryStore) -> (Arc<MemoryStore>, EligibilityService) {
        let store = Arc::new(store);
        let service = EligibilityService::new(store.clone());
        (store, service)
    }

    fn seeded(slots: i32) -> MemoryStore {
        let store = MemoryStore::default();
        store
            .postings
            .lock()
            .unwrap()
            .insert("post-1".to_string(), posting("post-1", "owner-1", slots));
        store.applications.lock().unwrap().extend([
            view("a1", "post-1", &["react", "node"], "x@college.edu"),
            view("a2", "post-1", &["react", "node", "go"], "y@college.edu"),
            view("a3", "post-1", &["react"], "z@college.edu"),
        ]);
        store.criteria.lock().unwrap().insert(
            "post-1".to_string(),
            Criteria {
                required_skills: vec!["react".to_string(), "node".to_string()],
                allowed_email_domains: vec![],
                min_overlap: Some(2),
            },
        );
        store
    }

    #[tokio::test]
    async fn verify_reports_each_application() {
        let (_, service) = service_with(seeded(3));
        let results = service.verify("post-1", false, None).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].eligible && results[1].eligible);
        assert_eq!(results[2].reasons, vec!["Insufficient skill overlap (1/2)"]);
        assert!(results.iter().all(|r| r.accepted.is_none()));
    }

    #[tokio::test]
    async fn verify_without_criteria_treats_everyone_as_eligible() {
        let store = seeded(3);
        store.criteria.lock().unwrap().clear();
        let (_, service) = service_with(store);
        let results = service.verify("post-1", false, None).await.unwrap();
        assert!(results.iter().all(|r| r.eligible));
    }

    #[tokio::test]
    async fn auto_accept_stops_taking_slots_when_exhausted() {
        let (store, service) = service_with(seeded(1));
        let results = service.verify("post-1", true, Some("owner-1")).await.unwrap();

        assert_eq!(results[0].accepted, Some(true));
        assert_eq!(results[1].accepted, Some(false));
        assert_eq!(results[2].accepted, None);
        assert_eq!(store.postings.lock().unwrap()["post-1"].remaining_slots, 0);
    }

    #[tokio::test]
    async fn auto_accept_requires_posting_owner() {
        let (store, service) = service_with(seeded(3));

        let err = service.verify("post-1", true, Some("intruder")).await.unwrap_err();
        assert!(matches!(err, EligibilityError::Forbidden(_)));
        let err = service.verify("post-1", true, None).await.unwrap_err();
        assert!(matches!(err, EligibilityError::Forbidden(_)));

        assert_eq!(store.postings.lock().unwrap()["post-1"].remaining_slots, 3);
        assert!(
            store
                .applications
                .lock()
                .unwrap()
                .iter()
                .all(|a| a.status == ApplicationStatus::Pending)
        );

        let results = service.verify("post-1", false, Some("intruder")).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn verify_unknown_posting_is_not_found() {
        let (_, service) = service_with(MemoryStore::default());
        let err = service.verify("missing", false, None).await.unwrap_err();
        assert!(matches!(err, EligibilityError::PostingNotFound(_)));
    }

    #[tokio::test]
    async fn decide_rejects_unknown_status() {
        let (_, service) = service_with(seeded(1));
        let err = service.decide("a1", "owner-1", "PENDING").await.unwrap_err();
        assert!(matches!(err, EligibilityError::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn decide_requires_posting_owner() {
        let (_, service) = service_with(seeded(1));
        let err = service.decide("a1", "intruder", "ACCEPTED").await.unwrap_err();
        assert!(matches!(err, EligibilityError::Forbidden(_)));
    }

    #[tokio::test]
    async fn decide_accept_then_full_posting() {
        let (_, service) = service_with(seeded(1));
        let outcome = service.decide("a1", "owner-1", "ACCEPTED").await.unwrap();
        assert_eq!(outcome.application.status, ApplicationStatus::Accepted);
        assert_eq!(outcome.posting.unwrap().remaining_slots, 0);

        let err = service.decide("a2", "owner-1", "ACCEPTED").await.unwrap_err();
        assert!(matches!(
            err,
            EligibilityError::Acceptance(AcceptanceError::NoOpenSlots)
        ));
    }

    #[tokio::test]
    async fn re_accepting_is_a_distinct_failure() {
        let (_, service) = service_with(seeded(5));
        service.decide("a1", "owner-1", "ACCEPTED").await.unwrap();
        let err = service.decide("a1", "owner-1", "ACCEPTED").await.unwrap_err();
        assert!(matches!(
            err,
            EligibilityError::Acceptance(AcceptanceError::AlreadyDecided {
                status: ApplicationStatus::Accepted
            })
        ));
    }

    #[tokio::test]
    async fn reject_leaves_slots_alone() {
        let (store, service) = service_with(seeded(2));
        let outcome = service.decide("a3", "owner-1", "REJECTED").await.unwrap();
        assert_eq!(outcome.application.status, ApplicationStatus::Rejected);
        assert!(outcome.posting.is_none());
        assert_eq!(store.postings.lock().unwrap()["post-1"].remaining_slots, 2);
    }

    #[tokio::test]
    async fn verify_due_sweeps_past_deadlines_without_accepting() {
        let (store, service) = service_with(seeded(3));
        let (processed, results) = service.verify_due().await.unwrap();
        assert_eq!(processed, 1);
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.hackathon_id == "post-1"));
        assert_eq!(store.postings.lock().unwrap()["post-1"].remaining_slots, 3);
    }
}
