//! # Server Configuration
//!
//! Router, shared state and OpenAPI document for the matchmaker API.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::eligibility::{ApplicationStore, EligibilityService};
use crate::enrichment::ProfileEnricher;
use crate::handlers;
use crate::recommendations::{RecommendationService, RecommendationStore};
use crate::repositories::{ApplicationRepository, RecommendationRepository};
use crate::scoring::ScoringOrchestrator;
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub recommendations: Arc<RecommendationService>,
    pub eligibility: Arc<EligibilityService>,
}

impl AppState {
    /// Wire services over SeaORM repositories and one shared HTTP client.
    pub fn new(config: &AppConfig, db: DatabaseConnection) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("matchmaker/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        let orchestrator = Arc::new(ScoringOrchestrator::from_config(
            client.clone(),
            &config.scoring,
        ));
        let enricher = ProfileEnricher::new(client, config.enrichment.clone());
        Ok(Self::with_parts(db, enricher, orchestrator))
    }

    /// Same as [`AppState::new`] with the scoring collaborators supplied.
    pub fn with_parts(
        db: DatabaseConnection,
        enricher: ProfileEnricher,
        orchestrator: Arc<ScoringOrchestrator>,
    ) -> Self {
        let db = Arc::new(db);
        let recommendation_store: Arc<dyn RecommendationStore> =
            Arc::new(RecommendationRepository::new(Arc::clone(&db)));
        let application_store: Arc<dyn ApplicationStore> =
            Arc::new(ApplicationRepository::new(Arc::clone(&db)));

        Self {
            recommendations: Arc::new(RecommendationService::new(
                recommendation_store,
                enricher,
                orchestrator,
            )),
            eligibility: Arc::new(EligibilityService::new(application_store)),
            db,
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::health::healthz))
        .route(
            "/recommendations",
            post(handlers::recommendations::score_recommendations)
                .get(handlers::recommendations::cached_recommendations),
        )
        .route(
            "/hackathons/verify-due",
            post(handlers::eligibility::verify_due),
        )
        .route(
            "/hackathons/{id}/eligibility",
            get(handlers::eligibility::get_criteria).post(handlers::eligibility::save_criteria),
        )
        .route("/hackathons/{id}/verify", post(handlers::eligibility::verify))
        .route(
            "/hackathons/{id}/analytics",
            get(handlers::analytics::posting_analytics),
        )
        .route(
            "/applications/{id}",
            patch(handlers::applications::decide_application),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let profile = config.profile.clone();
    let app = create_app(AppState::new(&config, db)?);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health::healthz,
        crate::handlers::recommendations::score_recommendations,
        crate::handlers::recommendations::cached_recommendations,
        crate::handlers::eligibility::get_criteria,
        crate::handlers::eligibility::save_criteria,
        crate::handlers::eligibility::verify,
        crate::handlers::eligibility::verify_due,
        crate::handlers::analytics::posting_analytics,
        crate::handlers::applications::decide_application,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::scoring::TeamRequirement,
            crate::scoring::ApplicantDescriptor,
            crate::recommendations::RecommendationSet,
            crate::recommendations::RecommendationView,
            crate::eligibility::Criteria,
            crate::eligibility::EligibilityResult,
            crate::eligibility::DueResult,
            crate::eligibility::PostingAnalytics,
            crate::eligibility::SkillCount,
            crate::eligibility::PostingSlots,
            crate::models::ApplicationStatus,
        )
    ),
    tags(
        (name = "root", description = "Service metadata and health"),
        (name = "recommendations", description = "Applicant scoring and cached rankings"),
        (name = "eligibility", description = "Eligibility criteria, verification and analytics"),
        (name = "applications", description = "Organizer decisions on applications"),
    ),
    info(
        title = "Matchmaker API",
        description = "Applicant scoring and eligibility engine",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/",
            "/healthz",
            "/recommendations",
            "/hackathons/{id}/eligibility",
            "/hackathons/{id}/verify",
            "/hackathons/verify-due",
            "/hackathons/{id}/analytics",
            "/applications/{id}",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
