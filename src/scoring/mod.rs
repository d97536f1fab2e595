//! # Applicant Scoring
//!
//! External providers with JSON repair, a deterministic local fallback and
//! the types they share.

pub mod json_repair;
pub mod local;
pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod types;

pub use orchestrator::ScoringOrchestrator;
pub use providers::{ProviderOutcome, ScoringProvider};
pub use types::{
    ApplicantDescriptor, ApplicantScore, EnrichedApplicant, Provenance, TeamRequirement,
};
