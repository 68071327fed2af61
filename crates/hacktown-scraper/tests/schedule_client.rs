//! Integration tests for the schedule client, pagination coordinator, and
//! run orchestrator.
//!
//! Uses `wiremock` to stand up a local HTTP server per test so no real
//! network traffic is made. Retry timing is kept fast by building configs
//! with a zero base retry delay; the unconstrained profile's sub-second
//! request jitter still applies.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tokio::sync::Semaphore;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use hacktown_core::{LocationClassifier, RunConfig};
use hacktown_scraper::{fetch_date, run_dates_with_client, ScheduleClient};

/// Unconstrained test profile with no backoff base delay.
fn test_config(max_retries: u32) -> RunConfig {
    RunConfig {
        max_concurrent_requests: 4,
        retry_delay_secs: 0,
        max_retries,
        request_timeout_secs: 5,
        pool_limit: 20,
        pool_limit_per_host: 10,
        constrained: false,
    }
}

fn test_client(server: &MockServer, max_retries: u32) -> ScheduleClient {
    let schedule_url = format!("{}/public/schedules", server.uri());
    ScheduleClient::with_endpoints(test_config(max_retries), &schedule_url, &server.uri())
        .expect("failed to build test ScheduleClient")
}

/// One page body with sequential event ids starting at `first_id`.
fn page_json(last_page: u32, first_id: i64, count: i64) -> Value {
    let data: Vec<Value> = (first_id..first_id + count)
        .map(|id| json!({"id": id, "title": format!("Event {id}"), "place": "INATEL Hall"}))
        .collect();
    json!({
        "data": data,
        "meta": {"last_page": last_page, "current_page": 1}
    })
}

fn event_ids(events: &[hacktown_core::NormalizedEvent]) -> Vec<i64> {
    events
        .iter()
        .map(|e| e.event.extra["id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// fetch_page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_page_returns_parsed_events_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("page", "1"))
        .and(query_param("day[]", "2025-07-30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_json(1, 1, 3)))
        .mount(&server)
        .await;

    let client = test_client(&server, 1);
    let page = client.fetch_page("2025-07-30", 1).await;

    let page = page.expect("expected Some page");
    assert_eq!(page.data.len(), 3);
    assert_eq!(page.last_page(), 1);
}

#[tokio::test]
async fn fetch_page_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 3);
    let page = client.fetch_page("2025-07-30", 1).await;

    assert!(page.is_none(), "404 must not be retried in this profile");
}

#[tokio::test]
async fn fetch_page_retries_malformed_body_then_succeeds() {
    let server = MockServer::start().await;
    // First attempt gets a truncated body, second a valid page.
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\": ["))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_json(1, 1, 2)))
        .mount(&server)
        .await;

    let client = test_client(&server, 2);
    let page = client.fetch_page("2025-07-30", 1).await;

    let page = page.expect("expected success on the second attempt");
    assert_eq!(page.data.len(), 2);
}

#[tokio::test]
async fn fetch_page_gives_up_after_retries_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server, 2);
    let page = client.fetch_page("2025-07-30", 1).await;

    assert!(page.is_none());
}

// ---------------------------------------------------------------------------
// fetch_date
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_date_fails_without_requesting_later_pages_when_page_1_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    // Any page >= 2 request would match this and fail the test.
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_json(3, 1, 1)))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server, 1);
    let classifier = LocationClassifier::new();
    let limiter = Arc::new(Semaphore::new(4));
    let outcome = fetch_date(&client, &classifier, "2025-07-30", limiter).await;

    assert!(!outcome.succeeded);
    assert!(outcome.events.is_empty());
    assert_eq!(outcome.date, "2025-07-30");
}

#[tokio::test]
async fn fetch_date_reassembles_three_pages_in_page_order() {
    let server = MockServer::start().await;
    // 4 + 5 + 7 events across three pages, ids ascending with page number.
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_json(3, 1, 4)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&page_json(3, 5, 5))
                .set_delay(std::time::Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_json(3, 10, 7)))
        .mount(&server)
        .await;

    let client = test_client(&server, 1);
    let classifier = LocationClassifier::new();
    let limiter = Arc::new(Semaphore::new(4));
    let outcome = fetch_date(&client, &classifier, "2025-07-30", limiter).await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.events.len(), 16);
    // Page 2 is artificially slow; order must still follow page number.
    assert_eq!(event_ids(&outcome.events), (1..=16).collect::<Vec<i64>>());
    // Records passed through the classifier on the way out.
    assert_eq!(outcome.events[0].filter_location, "Inatel");
    assert_eq!(outcome.events[0].near_location, "Inatel e Arredores");
}

#[tokio::test]
async fn fetch_date_tolerates_a_missing_middle_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_json(3, 1, 2)))
        .mount(&server)
        .await;
    // Page 2 fails every attempt with a non-retriable server error.
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_json(3, 3, 3)))
        .mount(&server)
        .await;

    let client = test_client(&server, 2);
    let classifier = LocationClassifier::new();
    let limiter = Arc::new(Semaphore::new(4));
    let outcome = fetch_date(&client, &classifier, "2025-07-30", limiter).await;

    assert!(
        outcome.succeeded,
        "a gap in later pages must not fail the date"
    );
    assert_eq!(event_ids(&outcome.events), vec![1, 2, 3, 4, 5]);
}

// ---------------------------------------------------------------------------
// run_dates_with_client
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_preserves_date_order_and_isolates_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("day[]", "2025-07-30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_json(1, 1, 2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("day[]", "2025-07-31"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .and(query_param("day[]", "2025-08-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page_json(1, 10, 3)))
        .mount(&server)
        .await;

    let client = test_client(&server, 1);
    let classifier = LocationClassifier::new();
    let dates = vec![
        "2025-07-30".to_owned(),
        "2025-07-31".to_owned(),
        "2025-08-01".to_owned(),
    ];
    let outcomes = run_dates_with_client(&client, &classifier, &dates).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].date, "2025-07-30");
    assert!(outcomes[0].succeeded);
    assert_eq!(outcomes[0].events.len(), 2);

    assert_eq!(outcomes[1].date, "2025-07-31");
    assert!(!outcomes[1].succeeded, "one failed date must be isolated");
    assert!(outcomes[1].events.is_empty());

    assert_eq!(outcomes[2].date, "2025-08-01");
    assert!(outcomes[2].succeeded);
    assert_eq!(outcomes[2].events.len(), 3);
}

/// Responder that timestamps every arrival before answering with a fixed
/// delay, so tests can check that responses never overlapped.
struct RecordingResponder {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    body: Value,
    delay: Duration,
}

impl Respond for RecordingResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_json(&self.body)
            .set_delay(self.delay)
    }
}

#[tokio::test]
async fn run_never_exceeds_the_global_concurrency_limit() {
    let server = MockServer::start().await;
    let arrivals = Arc::new(Mutex::new(Vec::new()));
    let delay = Duration::from_millis(400);
    // Every page of every date answers after `delay`.
    Mock::given(method("GET"))
        .and(path("/public/schedules"))
        .respond_with(RecordingResponder {
            arrivals: Arc::clone(&arrivals),
            body: page_json(2, 1, 2),
            delay,
        })
        .mount(&server)
        .await;

    let mut config = test_config(1);
    config.max_concurrent_requests = 1;
    let schedule_url = format!("{}/public/schedules", server.uri());
    let client = ScheduleClient::with_endpoints(config, &schedule_url, &server.uri())
        .expect("failed to build test ScheduleClient");
    let classifier = LocationClassifier::new();
    let dates = vec!["2025-07-30".to_owned(), "2025-07-31".to_owned()];
    let outcomes = run_dates_with_client(&client, &classifier, &dates).await;

    assert!(outcomes.iter().all(|o| o.succeeded));

    // Both date coordinators raced for the same single permit, and each
    // permit is held until the response body has been consumed. With a
    // limit of 1 no request may arrive before the previous response
    // finished, so consecutive arrivals must be at least `delay` apart.
    let mut arrivals = arrivals.lock().unwrap().clone();
    assert_eq!(arrivals.len(), 4, "expected two pages for each of two dates");
    arrivals.sort();
    for pair in arrivals.windows(2) {
        let gap = pair[1].duration_since(pair[0]);
        assert!(
            gap >= delay,
            "requests overlapped: {gap:?} gap is shorter than the {delay:?} response time"
        );
    }
}
