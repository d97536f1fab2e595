//! # Repository Layer
//!
//! SeaORM implementations of the store traits the services depend on.

pub mod application;
pub mod recommendation;

pub use application::ApplicationRepository;
pub use recommendation::RecommendationRepository;
