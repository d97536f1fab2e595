//! Router-level tests driving the full stack over in-memory SQLite.

mod test_utils;

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use matchmaker::config::EnrichmentConfig;
use matchmaker::enrichment::ProfileEnricher;
use matchmaker::scoring::ScoringOrchestrator;
use matchmaker::server::{AppState, create_app};
use serde_json::{Value, json};
use test_utils::{insert_posting, remaining_slots, seed_candidate, setup_test_db};
use tower::ServiceExt;

async fn app() -> (Router, sea_orm::DatabaseConnection) {
    let db = setup_test_db().await.unwrap();
    let state = AppState::with_parts(
        db.clone(),
        ProfileEnricher::new(reqwest::Client::new(), EnrichmentConfig::default()),
        Arc::new(ScoringOrchestrator::new(vec![], 800)),
    );
    (create_app(state), db)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    user: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn root_and_health() {
    let (app, _db) = app().await;

    let (status, body) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "matchmaker");

    let (status, body) = send(&app, "GET", "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn empty_applicants_is_rejected() {
    let (app, _db) = app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/recommendations",
        Some(json!({ "team": { "id": "t", "requiredSkills": ["rust"] }, "applicants": [] })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn missing_team_is_rejected() {
    let (app, _db) = app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/recommendations",
        Some(json!({ "applicants": [{ "id": "a" }] })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recommendations_are_cached_once_coverage_is_complete() {
    let (app, db) = app().await;
    insert_posting(&db, "team-1", "owner", 3, None).await.unwrap();
    seed_candidate(&db, "a", "team-1", None, &["rust"]).await.unwrap();
    seed_candidate(&db, "b", "team-1", None, &["rust", "sql"]).await.unwrap();

    let request = json!({
        "team": { "id": "team-1", "requiredSkills": ["rust", "sql"] },
        "applicants": [
            { "id": "a", "skills": ["rust"] },
            { "id": "b", "skills": ["rust", "sql"] }
        ]
    });

    let (status, first) = send(&app, "POST", "/recommendations", Some(request.clone()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["fromCache"], false);
    assert_eq!(first["showScores"], true);
    assert_eq!(first["top3"], json!(["b", "a"]));
    assert_eq!(first["recommendations"][0]["score"], 80.0);

    let (_, second) = send(&app, "POST", "/recommendations", Some(request), None).await;
    assert_eq!(second["fromCache"], true);
    assert_eq!(second["recommendations"], first["recommendations"]);

    let (status, cached) = send(&app, "GET", "/recommendations?teamId=team-1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cached["found"], true);
    assert_eq!(cached["fromCache"], true);
    assert_eq!(cached["top3"], json!(["b", "a"]));
}

#[tokio::test]
async fn cached_read_reports_incomplete_coverage() {
    let (app, _db) = app().await;

    let (status, body) = send(&app, "GET", "/recommendations?teamId=nobody", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "found": false }));

    let (status, _) = send(&app, "GET", "/recommendations", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn eligibility_criteria_round_trip() {
    let (app, db) = app().await;

    let (status, _) = send(&app, "GET", "/hackathons/missing/eligibility", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    insert_posting(&db, "post-1", "owner", 1, None).await.unwrap();

    let (_, body) = send(&app, "GET", "/hackathons/post-1/eligibility", None, None).await;
    assert_eq!(body, json!({ "criteria": null }));

    let (status, _) = send(&app, "POST", "/hackathons/post-1/eligibility", Some(json!({})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let criteria = json!({ "requiredSkills": ["react", "node"], "allowedEmailDomains": ["college.edu"], "minOverlap": 2 });
    let (status, body) = send(
        &app,
        "POST",
        "/hackathons/post-1/eligibility",
        Some(json!({ "criteria": criteria })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["criteria"], criteria);

    let (_, body) = send(&app, "GET", "/hackathons/post-1/eligibility", None, None).await;
    assert_eq!(body["criteria"], criteria);
}

#[tokio::test]
async fn verify_reports_reasons() {
    let (app, db) = app().await;
    insert_posting(&db, "post-1", "owner", 1, None).await.unwrap();
    seed_candidate(&db, "cand-1", "post-1", Some("a@other.com"), &["react"]).await.unwrap();
    send(
        &app,
        "POST",
        "/hackathons/post-1/eligibility",
        Some(json!({ "criteria": { "requiredSkills": ["react", "node"], "allowedEmailDomains": ["college.edu"], "minOverlap": 2 } })),
        None,
    )
    .await;

    let (status, body) = send(&app, "POST", "/hackathons/post-1/verify", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let result = &body["results"][0];
    assert_eq!(result["applicantId"], "cand-1");
    assert_eq!(result["eligible"], false);
    assert_eq!(
        result["reasons"],
        json!(["Insufficient skill overlap (1/2)", "Email domain other.com not allowed"])
    );
    assert!(result.get("accepted").is_none());
}

#[tokio::test]
async fn auto_accept_verify_is_reserved_to_posting_owner() {
    let (app, db) = app().await;
    insert_posting(&db, "post-1", "owner", 2, None).await.unwrap();
    seed_candidate(&db, "cand-1", "post-1", None, &["react"]).await.unwrap();
    let uri = "/hackathons/post-1/verify";
    let body = json!({ "autoAccept": true });

    let (status, error) = send(&app, "POST", uri, Some(body.clone()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["code"], "FORBIDDEN");

    let (status, _) = send(&app, "POST", uri, Some(body.clone()), Some("intruder")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(remaining_slots(&db, "post-1").await.unwrap(), 2);

    let (status, result) = send(&app, "POST", uri, Some(body), Some("owner")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["results"][0]["accepted"], true);
    assert_eq!(remaining_slots(&db, "post-1").await.unwrap(), 1);
}

#[tokio::test]
async fn decision_endpoint_enforces_ownership_status_and_slots() {
    let (app, db) = app().await;
    insert_posting(&db, "post-1", "owner", 1, None).await.unwrap();
    let first = seed_candidate(&db, "cand-1", "post-1", None, &[]).await.unwrap();
    let second = seed_candidate(&db, "cand-2", "post-1", None, &[]).await.unwrap();
    let uri = |id: &str| format!("/applications/{id}");

    let (status, _) = send(&app, "PATCH", &uri(&first.id), Some(json!({ "status": "ACCEPTED" })), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "PATCH", &uri(&first.id), Some(json!({ "status": "ACCEPTED" })), Some("intruder")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "PATCH", &uri(&first.id), Some(json!({ "status": "MAYBE" })), Some("owner")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PATCH", &uri("missing"), Some(json!({ "status": "ACCEPTED" })), Some("owner")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "PATCH", &uri(&first.id), Some(json!({ "status": "ACCEPTED" })), Some("owner")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["application"]["status"], "ACCEPTED");
    assert_eq!(body["post"]["remainingSlots"], 0);

    let (status, body) = send(&app, "PATCH", &uri(&second.id), Some(json!({ "status": "ACCEPTED" })), Some("owner")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NO_OPEN_SLOTS");
    assert_eq!(body["message"], "No open slots available for this team");
    assert_eq!(remaining_slots(&db, "post-1").await.unwrap(), 0);

    let (status, body) = send(&app, "PATCH", &uri(&second.id), Some(json!({ "status": "REJECTED" })), Some("owner")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["application"]["status"], "REJECTED");
    assert!(body.get("post").is_none());
}

#[tokio::test]
async fn verify_due_sweeps_closed_postings() {
    let (app, db) = app().await;
    insert_posting(&db, "closed", "owner", 1, Some(chrono::Utc::now() - chrono::Duration::days(1)))
        .await
        .unwrap();
    seed_candidate(&db, "cand-1", "closed", None, &[]).await.unwrap();

    let (status, body) = send(&app, "POST", "/hackathons/verify-due", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processedCount"], 1);
    assert_eq!(body["results"][0]["hackathonId"], "closed");
    assert_eq!(body["results"][0]["eligible"], true);
    assert_eq!(remaining_slots(&db, "closed").await.unwrap(), 1);
}

#[tokio::test]
async fn analytics_for_unknown_posting_is_not_found() {
    let (app, _db) = app().await;
    let (status, body) = send(&app, "GET", "/hackathons/missing/analytics", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn responses_carry_trace_id() {
    let (app, _db) = app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header("x-request-id", "trace-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers().get("x-trace-id").unwrap(), "trace-abc");
}
