//! Router-level tests over the mock collaborators.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use credence::{
    JobRegistry, JobState, MemoryObjectStore, MockModelGateway, ObjectStore, Orchestrator,
    RetryPolicy, ScreenshotRef,
};

use crate::api::state::{AppState, GatewayMode};
use crate::api::create_router_with_state;

const SHOTS: &str = "screenshots";
const REPORTS: &str = "reports";

struct TestHarness {
    router: Router,
    store: Arc<MemoryObjectStore>,
    orchestrator: Arc<Orchestrator>,
}

fn harness_with_gateway(gateway: MockModelGateway) -> TestHarness {
    let store = Arc::new(
        MemoryObjectStore::new().with_object(SHOTS, "a.jpg", &vec![0u8; 4096]),
    );
    let orchestrator = Arc::new(Orchestrator::new(
        store.clone(),
        Arc::new(gateway),
        Arc::new(JobRegistry::new()),
        REPORTS,
        RetryPolicy::immediate(3),
    ));
    let state = AppState::new(
        orchestrator.clone(),
        store.clone(),
        SHOTS,
        REPORTS,
        std::env::temp_dir(),
        GatewayMode::Stub,
    );

    TestHarness {
        router: create_router_with_state(state),
        store,
        orchestrator,
    }
}

fn happy_gateway() -> MockModelGateway {
    MockModelGateway::new()
        .respond(
            "Extract all readable text",
            json!({
                "text": "Breaking: dam collapses",
                "image_regions": [
                    {"x": 0, "y": 40, "width": 96, "height": 72, "description": "dam"}
                ]
            }),
        )
        .respond("credibility", json!({"score": 60}))
        .respond("authenticity", json!({"score": 80, "verdict": "AUTHENTIC"}))
        .respond("consistency", json!({"score": 90}))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn wait_for_terminal(harness: &TestHarness, id: uuid::Uuid) -> JobState {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let state = harness.orchestrator.registry().status(id).unwrap();
        if state.is_terminal() {
            return state;
        }
        assert!(tokio::time::Instant::now() < deadline, "job never finished");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn health_returns_ok() {
    let harness = harness_with_gateway(happy_gateway());

    let (status, body) = send(&harness.router, get("/healthz")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn ready_reports_components() {
    let harness = harness_with_gateway(happy_gateway());

    let (status, body) = send(&harness.router, get("/ready")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["http"], "ready");
    assert_eq!(body["components"]["gateway_mode"], "stub");
}

#[tokio::test]
async fn submit_unknown_screenshot_is_404() {
    let harness = harness_with_gateway(happy_gateway());

    let (status, body) = send(
        &harness.router,
        post_json("/v1/analyses", json!({"name": "missing.jpg"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("missing.jpg"));
    // No job was created.
    assert!(harness.orchestrator.registry().is_empty());
}

#[tokio::test]
async fn submit_rejects_unsupported_extension() {
    let harness = harness_with_gateway(happy_gateway());

    let (status, _) = send(
        &harness.router,
        post_json("/v1/analyses", json!({"name": "notes.txt"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_rejects_path_traversal() {
    let harness = harness_with_gateway(happy_gateway());

    for name in ["../a.jpg", "dir/a.jpg", "..\\a.jpg"] {
        let (status, _) = send(
            &harness.router,
            post_json("/v1/analyses", json!({"name": name})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "name: {name}");
    }
}

#[tokio::test]
async fn submit_rejects_undersized_file() {
    let harness = harness_with_gateway(happy_gateway());
    harness
        .store
        .store(SHOTS, "tiny.jpg", &[0u8; 10])
        .await
        .unwrap();

    let (status, body) = send(
        &harness.router,
        post_json("/v1/analyses", json!({"name": "tiny.jpg"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("too small"));
}

#[tokio::test]
async fn submit_accepts_and_completes_job() {
    let harness = harness_with_gateway(happy_gateway());

    let (status, body) = send(
        &harness.router,
        post_json("/v1/analyses", json!({"name": "a.jpg"})),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["state"], "PENDING");
    let id: uuid::Uuid = serde_json::from_value(body["job_id"].clone()).unwrap();

    assert_eq!(wait_for_terminal(&harness, id).await, JobState::Complete);

    // Status endpoint reflects the terminal state.
    let (status, body) = send(&harness.router, get(&format!("/v1/analyses/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "COMPLETE");
    assert_eq!(body["screenshot_name"], "a.jpg");

    // Report endpoint serves the persisted contract.
    let (status, body) = send(
        &harness.router,
        get(&format!("/v1/analyses/{id}/report")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["screenshot_name"], "a.jpg");
    assert_eq!(body["final_score"], 74.5);
    assert_eq!(body["verdict"], "CREDIBLE");
    assert_eq!(body["score_breakdown"]["text_score"], 60.0);
    assert!(body["detailed_analysis"]["image_analysis"]["regions"].is_array());
}

#[tokio::test]
async fn status_unknown_job_is_404() {
    let harness = harness_with_gateway(happy_gateway());

    let id = uuid::Uuid::new_v4();
    let (status, _) = send(&harness.router, get(&format!("/v1/analyses/{id}"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn report_on_pending_job_is_conflict() {
    let harness = harness_with_gateway(happy_gateway());
    // Created directly, never spawned: stays PENDING.
    let id = harness
        .orchestrator
        .registry()
        .create(ScreenshotRef::new("a.jpg", SHOTS));

    let (status, body) = send(
        &harness.router,
        get(&format!("/v1/analyses/{id}/report")),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("PENDING"));
}

#[tokio::test]
async fn report_on_failed_job_surfaces_error_info() {
    let gateway = MockModelGateway::new().fail(
        "Extract all readable text",
        credence::GatewayError::Unavailable("provider down".into()),
    );
    let harness = harness_with_gateway(gateway);

    let (status, body) = send(
        &harness.router,
        post_json("/v1/analyses", json!({"name": "a.jpg"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let id: uuid::Uuid = serde_json::from_value(body["job_id"].clone()).unwrap();

    assert_eq!(wait_for_terminal(&harness, id).await, JobState::Failed);

    let (status, body) = send(
        &harness.router,
        get(&format!("/v1/analyses/{id}/report")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["detail"]["stage"], "extraction");
    assert_eq!(body["detail"]["kind"], "gateway_unavailable");
}

#[tokio::test]
async fn cancel_marks_job_failed() {
    let harness = harness_with_gateway(happy_gateway());
    let id = harness
        .orchestrator
        .registry()
        .create(ScreenshotRef::new("a.jpg", SHOTS));

    let (status, body) = send(&harness.router, delete(&format!("/v1/analyses/{id}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "FAILED");
    assert_eq!(body["error"]["kind"], "cancelled");
}

#[tokio::test]
async fn summary_lists_jobs() {
    let harness = harness_with_gateway(happy_gateway());
    harness
        .orchestrator
        .registry()
        .create(ScreenshotRef::new("a.jpg", SHOTS));

    let (status, body) = send(&harness.router, get("/v1/analyses")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_jobs"], 1);
    assert_eq!(body["status_counts"]["PENDING"], 1);
}

#[tokio::test]
async fn reports_list_is_empty_before_any_job() {
    let harness = harness_with_gateway(happy_gateway());

    let (status, body) = send(&harness.router, get("/v1/reports")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["names"], json!([]));
}

#[tokio::test]
async fn reports_list_shows_persisted_reports() {
    let harness = harness_with_gateway(happy_gateway());

    let (_, body) = send(
        &harness.router,
        post_json("/v1/analyses", json!({"name": "a.jpg"})),
    )
    .await;
    let id: uuid::Uuid = serde_json::from_value(body["job_id"].clone()).unwrap();
    wait_for_terminal(&harness, id).await;

    let (status, body) = send(&harness.router, get("/v1/reports")).await;

    assert_eq!(status, StatusCode::OK);
    let names = body["names"].as_array().unwrap();
    assert_eq!(names.len(), 1);
    assert!(names[0].as_str().unwrap().ends_with("_report.json"));
}

#[tokio::test]
async fn screenshots_list_filters_non_images() {
    let harness = harness_with_gateway(happy_gateway());
    harness
        .store
        .store(SHOTS, "readme.txt", b"not an image")
        .await
        .unwrap();
    harness
        .store
        .store(SHOTS, "b.PNG", &[0u8; 2048])
        .await
        .unwrap();

    let (status, body) = send(&harness.router, get("/v1/screenshots")).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["names"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a.jpg", "b.PNG"]);
}

#[test]
fn name_validation_rules() {
    use crate::api::handler::{has_image_extension, validate_screenshot_name};

    assert!(validate_screenshot_name("a.jpg").is_ok());
    assert!(validate_screenshot_name("shot.WEBP").is_ok());
    assert!(validate_screenshot_name("").is_err());
    assert!(validate_screenshot_name("a.pdf").is_err());
    assert!(validate_screenshot_name("no-extension").is_err());

    assert!(has_image_extension("x.jpeg"));
    assert!(!has_image_extension("x.jpeg.exe"));
}
