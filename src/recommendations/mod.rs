//! # Recommendations
//!
//! Scores a roster against a team, serving stored results when they fully
//! cover the team's applications.

pub mod service;
pub mod store;

pub use service::{RecommendationService, RecommendationSet, RecommendationView};
pub use store::{RecommendationStore, StoredScore};
