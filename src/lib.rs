//! # Matchmaker
//!
//! Applicant scoring and eligibility engine: profile enrichment, external
//! scoring with a deterministic local fallback, cached recommendations,
//! eligibility evaluation and the slot-guarded acceptance transaction.

pub mod auth;
pub mod config;
pub mod db;
pub mod eligibility;
pub mod enrichment;
pub mod error;
pub mod handlers;
pub mod models;
pub mod recommendations;
pub mod repositories;
pub mod scoring;
pub mod server;
pub mod telemetry;
pub use migration;
