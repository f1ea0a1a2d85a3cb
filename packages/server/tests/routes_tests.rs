//! Router tests using in-memory dependencies and `tower::ServiceExt::oneshot`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use common::{date, new_event};
use hackradar_core::kernel::{MemoryEventStore, MockEventSource, TestDependencies};
use hackradar_core::server::{build_app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(deps: &TestDependencies) -> Router {
    build_app(AppState::new(deps.store.clone(), deps.scheduler()))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn list_events_sorted_by_deadline_with_undated_last() {
    let deps = TestDependencies::new().mock_store(
        MemoryEventStore::new()
            .with_event(new_event("Undated", "Org1", None))
            .with_event(new_event("Later", "Org1", Some(date(2030, 9, 1))))
            .with_event(new_event("Sooner", "Org1", Some(date(2030, 3, 1)))),
    );

    let (status, body) = send(app(&deps), Method::GET, "/api/events", None).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Sooner", "Later", "Undated"]);
    assert_eq!(body[0]["hostedBy"], json!("Org1"));
    assert_eq!(body[0]["deadline"], json!("2030-03-01"));
}

#[tokio::test]
async fn create_event_returns_created_row() {
    let deps = TestDependencies::new();

    let (status, body) = send(
        app(&deps),
        Method::POST,
        "/api/events",
        Some(json!({
            "title": "Campus Hack",
            "type": "hackathon",
            "description": "24 hour build",
            "startDate": "2030-07-01",
            "endDate": "Jul 2, 2030",
            "deadline": "2030-06-25T18:30:00Z",
            "hosted_by": "CS Society",
            "verified": "TRUE",
            "redirectURL": "https://campushack.dev"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let row = &body[0];
    assert_eq!(row["title"], json!("Campus Hack"));
    assert_eq!(row["hostedBy"], json!("CS Society"));
    assert_eq!(row["verified"], json!(true));
    assert_eq!(row["endDate"], json!("2030-07-02"));
    assert_eq!(row["deadline"], json!("2030-06-25"));
    assert_eq!(row["tags"], json!([]));
    assert!(row["id"].is_string());
    assert_eq!(deps.store.len(), 1);
}

#[tokio::test]
async fn create_event_rejects_duplicates_and_bad_input() {
    let deps = TestDependencies::new()
        .mock_store(MemoryEventStore::new().with_event(new_event("Campus Hack", "CS Society", None)));

    let (status, body) = send(
        app(&deps),
        Method::POST,
        "/api/events",
        Some(json!({ "title": "Campus Hack", "hostedBy": "CS Society" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let (status, body) = send(
        app(&deps),
        Method::POST,
        "/api/events",
        Some(json!({ "title": "", "hostedBy": "CS Society" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("title is required"));

    let (status, _) = send(
        app(&deps),
        Method::POST,
        "/api/events",
        Some(json!({ "title": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(deps.store.len(), 1);
}

#[tokio::test]
async fn scrape_endpoint_reports_counts() {
    let deps = TestDependencies::new().mock_source(
        MockEventSource::new("mock")
            .with_event("HackX", "Org1")
            .with_event("HackY", "Org1"),
    );

    let (status, body) = send(app(&deps), Method::GET, "/api/events/scrape", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["scraped"], json!(2));
    assert_eq!(body["saved"], json!(2));
    assert_eq!(
        body["message"],
        json!("Scraping completed. Scraped 2 events, saved 2 new events")
    );
}

#[tokio::test]
async fn scrape_endpoint_with_nothing_found() {
    let deps = TestDependencies::new().mock_source(MockEventSource::new("empty"));

    let (status, body) = send(app(&deps), Method::GET, "/api/events/scrape", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("No events found from scraping"));
    assert_eq!(body["scraped"], json!(0));
    assert_eq!(body["saved"], json!(0));
}

#[tokio::test]
async fn scheduler_status_shape() {
    let deps = TestDependencies::new();

    let (status, body) = send(app(&deps), Method::GET, "/api/scheduler/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isRunning"], json!(false));
    assert_eq!(body["isCurrentlyScraping"], json!(false));
    assert_eq!(body["lastRunTime"], Value::Null);
    assert_eq!(body["nextRunTime"], Value::Null);
    assert_eq!(body["schedule"], json!("Every hour at 0 minutes (UTC)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn scheduler_start_stop_conflicts() {
    let deps = TestDependencies::new();
    let app = build_app(AppState::new(deps.store.clone(), deps.scheduler()));

    let (status, body) = send(app.clone(), Method::POST, "/api/scheduler/stop", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));

    let (status, body) = send(app.clone(), Method::POST, "/api/scheduler/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Scheduler started successfully"));

    let (status, _) = send(app.clone(), Method::POST, "/api/scheduler/start", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(app.clone(), Method::GET, "/api/scheduler/status", None).await;
    assert_eq!(body["isRunning"], json!(true));
    assert!(body["nextRunTime"].is_string());

    let (status, body) = send(app, Method::POST, "/api/scheduler/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Scheduler stopped successfully"));
}

#[tokio::test]
async fn trigger_runs_pipeline_and_rejects_overlap() {
    let deps = TestDependencies::new().mock_source(
        MockEventSource::new("slow")
            .with_event("HackX", "Org1")
            .with_delay(Duration::from_millis(300)),
    );
    let scheduler = deps.scheduler();
    let app = build_app(AppState::new(deps.store.clone(), Arc::clone(&scheduler)));

    let first = tokio::spawn(send(app.clone(), Method::POST, "/api/scheduler/trigger", None));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (status, body) = send(app.clone(), Method::POST, "/api/scheduler/trigger", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));

    let (status, _) = send(app, Method::GET, "/api/events/scrape", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["scraped"], json!(1));
    assert_eq!(body["saved"], json!(1));
    assert!(!scheduler.is_currently_scraping());
}

#[tokio::test]
async fn test_and_health_endpoints() {
    let deps = TestDependencies::new();

    let (status, body) = send(app(&deps), Method::GET, "/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Server is working!"));

    let (status, body) = send(app(&deps), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["scheduler"]["isRunning"], json!(false));

    deps.store.fail_health(true);
    let (status, body) = send(app(&deps), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"]["status"], json!("error"));
}

#[tokio::test]
async fn unknown_routes_return_404() {
    let deps = TestDependencies::new();

    let (status, body) = send(app(&deps), Method::GET, "/api/nope?x=1", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Route not found"));
    assert_eq!(body["requestedUrl"], json!("/api/nope?x=1"));
}

#[tokio::test]
async fn list_events_store_failure_is_500() {
    let deps = TestDependencies::new()
        .mock_store(MemoryEventStore::new().with_event(new_event("HackX", "Org1", None)));
    deps.store.fail_lists(true);

    let (status, body) = send(app(&deps), Method::GET, "/api/events", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn manual_runs_finish_after_client_disconnects() {
    for (method, uri) in [
        (Method::POST, "/api/scheduler/trigger"),
        (Method::GET, "/api/events/scrape"),
    ] {
        let deps = TestDependencies::new().mock_source(
            MockEventSource::new("slow")
                .with_event("HackX", "Org1")
                .with_delay(Duration::from_millis(200)),
        );
        let scheduler = deps.scheduler();
        let app = build_app(AppState::new(deps.store.clone(), Arc::clone(&scheduler)));

        // Client gives up while the sources are still being fetched
        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), send(app, method, uri, None)).await;
        assert!(abandoned.is_err());
        assert!(scheduler.is_currently_scraping());

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(deps.store.titles(), vec!["HackX"], "{}", uri);
        assert!(!scheduler.is_currently_scraping());
    }
}
