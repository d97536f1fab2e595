//! Shared fixtures for integration tests.
//!
//! Every test gets its own in-memory SQLite database with migrations applied.
//! The pool is pinned to one connection so all handles see the same database.

#![allow(dead_code)]

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, Set};
use serde_json::json;
use uuid::Uuid;

use matchmaker::models::{ApplicationStatus, Posting, applicant, application, posting};

pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// File-backed SQLite with a multi-connection pool, for contention tests.
pub async fn setup_file_db(dir: &Path, max_connections: u32) -> Result<DatabaseConnection> {
    let url = format!("sqlite://{}?mode=rwc", dir.join("matchmaker.db").display());
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(max_connections)
        .min_connections(max_connections)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn insert_applicant(
    db: &DatabaseConnection,
    id: &str,
    email: Option<&str>,
    skills: &[&str],
) -> Result<applicant::Model> {
    let row = applicant::ActiveModel {
        id: Set(id.to_string()),
        name: Set(Some(format!("Applicant {id}"))),
        email: Set(email.map(str::to_string)),
        skills: Set(json!(skills)),
        resume_url: Set(None),
        linkedin_url: Set(None),
        github_url: Set(None),
        created_at: Set(Utc::now().fixed_offset()),
    };
    Ok(row.insert(db).await?)
}

pub async fn insert_posting(
    db: &DatabaseConnection,
    id: &str,
    owner_id: &str,
    remaining_slots: i32,
    reg_date: Option<DateTime<Utc>>,
) -> Result<posting::Model> {
    let now = Utc::now().fixed_offset();
    let row = posting::ActiveModel {
        id: Set(id.to_string()),
        owner_id: Set(owner_id.to_string()),
        team_name: Set(Some(format!("Team {id}"))),
        hackathon_name: Set(None),
        required_skills: Set(json!([])),
        role: Set(None),
        experience: Set(None),
        remaining_slots: Set(remaining_slots),
        reg_date: Set(reg_date.map(|d| d.fixed_offset())),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(row.insert(db).await?)
}

pub async fn insert_application(
    db: &DatabaseConnection,
    candidate_id: &str,
    posting_id: &str,
) -> Result<application::Model> {
    let now = Utc::now().fixed_offset();
    let row = application::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        candidate_id: Set(candidate_id.to_string()),
        posting_id: Set(posting_id.to_string()),
        status: Set(ApplicationStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(row.insert(db).await?)
}

/// Applicant plus a PENDING application against `posting_id`.
pub async fn seed_candidate(
    db: &DatabaseConnection,
    candidate_id: &str,
    posting_id: &str,
    email: Option<&str>,
    skills: &[&str],
) -> Result<application::Model> {
    insert_applicant(db, candidate_id, email, skills).await?;
    insert_application(db, candidate_id, posting_id).await
}

pub async fn remaining_slots(db: &DatabaseConnection, posting_id: &str) -> Result<i32> {
    let posting = Posting::find_by_id(posting_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("posting {posting_id} missing"))?;
    Ok(posting.remaining_slots)
}
