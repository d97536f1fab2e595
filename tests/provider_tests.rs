//! Scoring providers and orchestrator fallback against mocked HTTP APIs.

mod test_utils;

use std::sync::Arc;
use std::time::{Duration, Instant};

use matchmaker::config::{EnrichmentConfig, ScoringConfig};
use matchmaker::enrichment::ProfileEnricher;
use matchmaker::recommendations::RecommendationService;
use matchmaker::repositories::RecommendationRepository;
use matchmaker::scoring::{
    ApplicantDescriptor, EnrichedApplicant, Provenance, ScoringOrchestrator, TeamRequirement,
};
use serde_json::json;
use test_utils::setup_test_db;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";
const OPENAI_PATH: &str = "/v1/chat/completions";

fn config(server: &MockServer, gemini: bool, openai: bool) -> ScoringConfig {
    ScoringConfig {
        gemini_api_key: gemini.then(|| "gemini-key".to_string()),
        gemini_api_base: server.uri(),
        openai_api_key: openai.then(|| "openai-key".to_string()),
        openai_api_base: server.uri(),
        provider_timeout_ms: 2000,
        ..ScoringConfig::default()
    }
}

fn team() -> TeamRequirement {
    TeamRequirement {
        id: Some("team-1".to_string()),
        required_skills: vec!["rust".to_string()],
        ..TeamRequirement::default()
    }
}

fn batch() -> Vec<EnrichedApplicant> {
    ["x", "y"]
        .into_iter()
        .map(|id| {
            EnrichedApplicant::bare(ApplicantDescriptor {
                id: id.to_string(),
                ..ApplicantDescriptor::default()
            })
        })
        .collect()
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

#[tokio::test]
async fn gemini_fenced_reply_is_repaired() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(header("x-goog-api-key", "gemini-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            "Here is the result: ```json\n[{\"applicantId\":\"x\",\"score\":80},{\"applicantId\":\"y\",\"score\":\"55\"}]\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = ScoringOrchestrator::from_config(reqwest::Client::new(), &config(&server, true, false));
    let scores = orchestrator.score(&team(), &batch()).await.unwrap();

    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].applicant_id, "x");
    assert_eq!(scores[0].score, 80.0);
    assert_eq!(scores[1].score, 55.0);
    assert!(scores.iter().all(|s| s.provenance == Provenance::Gemini));
}

#[tokio::test]
async fn openai_is_tried_after_gemini_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .and(header("authorization", "Bearer openai-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "[{\"id\":\"y\",\"score\":91,\"ratedSkills\":{\"rust\":5}}]" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = ScoringOrchestrator::from_config(reqwest::Client::new(), &config(&server, true, true));
    let scores = orchestrator.score(&team(), &batch()).await.unwrap();

    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].applicant_id, "y");
    assert_eq!(scores[0].provenance, Provenance::OpenAi);
    assert_eq!(scores[0].rated_skills.get("rust"), Some(&5.0));
}

#[tokio::test]
async fn unparseable_replies_from_all_providers_yield_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("I cannot help with that.")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "[{\"applicantId\":\"stranger\",\"score\":10}]" } }]
        })))
        .mount(&server)
        .await;

    let orchestrator = ScoringOrchestrator::from_config(reqwest::Client::new(), &config(&server, true, true));
    assert!(orchestrator.score(&team(), &batch()).await.is_none());
}

#[tokio::test]
async fn no_credentials_means_no_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = ScoringOrchestrator::from_config(reqwest::Client::new(), &config(&server, false, false));
    assert!(!orchestrator.has_configured_provider());
    assert!(orchestrator.score(&team(), &batch()).await.is_none());
}

fn impatient_config(server: &MockServer) -> ScoringConfig {
    ScoringConfig {
        provider_timeout_ms: 200,
        ..config(server, true, true)
    }
}

async fn mount_slow_gemini(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply("[{\"applicantId\":\"x\",\"score\":99}]"))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn slow_gemini_times_out_and_openai_answers() {
    let server = MockServer::start().await;
    mount_slow_gemini(&server).await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "[{\"applicantId\":\"x\",\"score\":64}]" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = ScoringOrchestrator::from_config(reqwest::Client::new(), &impatient_config(&server));
    let started = Instant::now();
    let scores = orchestrator.score(&team(), &batch()).await.unwrap();

    assert!(started.elapsed() < Duration::from_millis(1500));
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].score, 64.0);
    assert_eq!(scores[0].provenance, Provenance::OpenAi);
}

#[tokio::test]
async fn every_provider_timing_out_falls_back_to_local_scoring() {
    let server = MockServer::start().await;
    mount_slow_gemini(&server).await;
    Mock::given(method("POST"))
        .and(path(OPENAI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "choices": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let db = setup_test_db().await.unwrap();
    let service = RecommendationService::new(
        Arc::new(RecommendationRepository::new(Arc::new(db))),
        ProfileEnricher::new(reqwest::Client::new(), EnrichmentConfig::default()),
        Arc::new(ScoringOrchestrator::from_config(
            reqwest::Client::new(),
            &impatient_config(&server),
        )),
    );
    let applicants = vec![
        ApplicantDescriptor {
            id: "x".to_string(),
            skills: vec!["Rust".to_string()],
            ..ApplicantDescriptor::default()
        },
        ApplicantDescriptor {
            id: "y".to_string(),
            ..ApplicantDescriptor::default()
        },
    ];

    let started = Instant::now();
    let set = service.score_all(&team(), applicants).await;

    assert!(started.elapsed() < Duration::from_millis(1500));
    assert!(!set.from_cache);
    assert_eq!(set.recommendations.len(), 2);
    assert!(
        set.recommendations
            .iter()
            .all(|r| r.provenance == Some(Provenance::Local))
    );
    assert_eq!(set.top3.first().map(String::as_str), Some("x"));
}
