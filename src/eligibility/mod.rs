//! # Eligibility
//!
//! Organizer-defined criteria, the rule evaluator, acceptance decisions and
//! per-posting analytics.

pub mod analytics;
pub mod criteria;
pub mod evaluator;
pub mod service;
pub mod store;

pub use analytics::{PostingAnalytics, SkillCount};
pub use criteria::Criteria;
pub use evaluator::{EligibilityResult, evaluate};
pub use service::{DecisionOutcome, DueResult, EligibilityError, EligibilityService};
pub use store::{Acceptance, ApplicationStore, ApplicationView, PostingSlots};
