//! # Application Repository
//!
//! SeaORM implementation of [`ApplicationStore`], including the acceptance
//! transaction. The slot decrement is guarded by `remaining_slots > 0` and
//! the status flip by `status = 'PENDING'`, both inside one transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::eligibility::{Acceptance, ApplicationStore, ApplicationView, Criteria, PostingSlots};
use crate::error::{AcceptanceError, RepositoryError};
use crate::models::{
    Applicant, Application, ApplicationStatus, EligibilityCriteria, Posting, application,
    eligibility_criteria, posting,
};

/// Repository for postings, applications and their eligibility criteria
#[derive(Debug, Clone)]
pub struct ApplicationRepository {
    db: Arc<DatabaseConnection>,
}

impl ApplicationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ApplicationStore for ApplicationRepository {
    async fn find_posting(
        &self,
        posting_id: &str,
    ) -> Result<Option<posting::Model>, RepositoryError> {
        Posting::find_by_id(posting_id.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn find_application(
        &self,
        application_id: &str,
    ) -> Result<Option<application::Model>, RepositoryError> {
        Application::find_by_id(application_id.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn list_applications(
        &self,
        posting_id: &str,
    ) -> Result<Vec<ApplicationView>, RepositoryError> {
        let rows = Application::find()
            .filter(application::Column::PostingId.eq(posting_id))
            .find_also_related(Applicant)
            .order_by_asc(application::Column::CreatedAt)
            .order_by_asc(application::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rows
            .into_iter()
            .map(|(application, applicant)| {
                let skills = applicant
                    .as_ref()
                    .map(|a| a.skill_list())
                    .unwrap_or_default();
                let applicant = applicant.map(|a| (a.name, a.email, a.resume_url, a.linkedin_url, a.github_url));
                let (name, email, resume_url, linkedin_url, github_url) =
                    applicant.unwrap_or_default();
                ApplicationView {
                    application_id: application.id,
                    applicant_id: application.candidate_id,
                    posting_id: application.posting_id,
                    status: application.status,
                    name,
                    email,
                    skills,
                    resume_url,
                    linkedin_url,
                    github_url,
                }
            })
            .collect())
    }

    async fn get_criteria(&self, posting_id: &str) -> Result<Option<Criteria>, RepositoryError> {
        let row = EligibilityCriteria::find_by_id(posting_id.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(RepositoryError::database_error)?;

        row.map(|row| {
            serde_json::from_value(row.criteria).map_err(|e| {
                RepositoryError::validation_error(format!(
                    "stored criteria for {posting_id} is malformed: {e}"
                ))
            })
        })
        .transpose()
    }

    async fn upsert_criteria(
        &self,
        posting_id: &str,
        criteria: &Criteria,
    ) -> Result<Criteria, RepositoryError> {
        let now = Utc::now().fixed_offset();
        let value = serde_json::to_value(criteria)
            .map_err(|e| RepositoryError::validation_error(e.to_string()))?;

        let row = eligibility_criteria::ActiveModel {
            posting_id: Set(posting_id.to_string()),
            criteria: Set(value),
            created_at: Set(now),
            updated_at: Set(now),
        };

        EligibilityCriteria::insert(row)
            .on_conflict(
                OnConflict::column(eligibility_criteria::Column::PostingId)
                    .update_columns([
                        eligibility_criteria::Column::Criteria,
                        eligibility_criteria::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(criteria.clone())
    }

    async fn list_due_postings(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<posting::Model>, RepositoryError> {
        Posting::find()
            .filter(posting::Column::RegDate.is_not_null())
            .filter(posting::Column::RegDate.lte(now.fixed_offset()))
            .order_by_asc(posting::Column::RegDate)
            .all(self.db.as_ref())
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn accept(&self, application_id: &str) -> Result<Acceptance, AcceptanceError> {
        let application = Application::find_by_id(application_id.to_string())
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AcceptanceError::ApplicationNotFound(application_id.to_string()))?;
        if application.status.is_terminal() {
            return Err(AcceptanceError::AlreadyDecided {
                status: application.status,
            });
        }

        // The guarded decrement is the first statement: no read snapshot may
        // be held when the write lock is requested.
        let txn = self.db.begin().await?;
        let now = Utc::now().fixed_offset();

        let taken = Posting::update_many()
            .col_expr(
                posting::Column::RemainingSlots,
                Expr::col(posting::Column::RemainingSlots).sub(1),
            )
            .col_expr(posting::Column::UpdatedAt, Expr::value(now))
            .filter(posting::Column::Id.eq(application.posting_id.as_str()))
            .filter(posting::Column::RemainingSlots.gt(0))
            .exec(&txn)
            .await?;
        if taken.rows_affected == 0 {
            let exists = Posting::find_by_id(application.posting_id.clone())
                .one(&txn)
                .await?
                .is_some();
            txn.rollback().await?;
            return Err(if exists {
                AcceptanceError::NoOpenSlots
            } else {
                AcceptanceError::PostingNotFound(application.posting_id)
            });
        }

        let flipped = Application::update_many()
            .col_expr(
                application::Column::Status,
                Expr::value(ApplicationStatus::Accepted.as_str()),
            )
            .col_expr(application::Column::UpdatedAt, Expr::value(now))
            .filter(application::Column::Id.eq(application_id))
            .filter(application::Column::Status.eq(ApplicationStatus::Pending))
            .exec(&txn)
            .await?;
        if flipped.rows_affected == 0 {
            let current = Application::find_by_id(application_id.to_string())
                .one(&txn)
                .await?;
            txn.rollback().await?;
            return Err(match current {
                Some(current) => AcceptanceError::AlreadyDecided {
                    status: current.status,
                },
                None => AcceptanceError::ApplicationNotFound(application_id.to_string()),
            });
        }

        let remaining_slots = Posting::find_by_id(application.posting_id.clone())
            .one(&txn)
            .await?
            .map(|p| p.remaining_slots)
            .ok_or_else(|| AcceptanceError::PostingNotFound(application.posting_id.clone()))?;
        txn.commit().await?;

        Ok(Acceptance {
            posting: PostingSlots {
                id: application.posting_id.clone(),
                remaining_slots,
            },
            application: application::Model {
                status: ApplicationStatus::Accepted,
                updated_at: now,
                ..application
            },
        })
    }

    async fn reject(&self, application_id: &str) -> Result<application::Model, AcceptanceError> {
        let now = Utc::now().fixed_offset();
        let result = Application::update_many()
            .col_expr(
                application::Column::Status,
                Expr::value(ApplicationStatus::Rejected.as_str()),
            )
            .col_expr(application::Column::UpdatedAt, Expr::value(now))
            .filter(application::Column::Id.eq(application_id))
            .filter(application::Column::Status.eq(ApplicationStatus::Pending))
            .exec(self.db.as_ref())
            .await?;

        let current = Application::find_by_id(application_id.to_string())
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| AcceptanceError::ApplicationNotFound(application_id.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AcceptanceError::AlreadyDecided {
                status: current.status,
            });
        }
        Ok(current)
    }
}
