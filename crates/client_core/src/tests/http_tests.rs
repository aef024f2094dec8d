use std::sync::Arc;

use super::*;
use crate::test_fixtures::{detail, page};
use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode as HttpStatus,
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::ListingStatus,
    protocol::{DecisionBody, SortDirection, SortField},
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    async fn push(&self, line: String) {
        self.seen.lock().await.push(line);
    }

    async fn lines(&self) -> Vec<String> {
        self.seen.lock().await.clone()
    }
}

async fn handle_list(State(recorder): State<Recorder>, RawQuery(query): RawQuery) -> Json<ListPage> {
    recorder.push(query.unwrap_or_default()).await;
    Json(page(&[1, 2], 12))
}

async fn handle_item(Path(id): Path<i64>) -> Result<Json<AdvertisementDetail>, HttpStatus> {
    if id > 100 {
        return Err(HttpStatus::NOT_FOUND);
    }
    Ok(Json(detail(id, 1)))
}

async fn handle_decision(
    State(recorder): State<Recorder>,
    Path((id, action)): Path<(i64, String)>,
    body: String,
) -> HttpStatus {
    recorder.push(format!("{id} {action} {body}")).await;
    if id == 13 {
        return HttpStatus::INTERNAL_SERVER_ERROR;
    }
    HttpStatus::OK
}

async fn handle_summary(State(recorder): State<Recorder>, RawQuery(query): RawQuery) -> Json<StatsSummary> {
    recorder.push(query.unwrap_or_default()).await;
    Json(StatsSummary {
        total_reviewed: 9,
        average_review_time: 90.0,
        ..Default::default()
    })
}

async fn handle_broken() -> (HttpStatus, &'static str) {
    (HttpStatus::OK, "{not json")
}

async fn handle_failing() -> (HttpStatus, Json<ApiError>) {
    (
        HttpStatus::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(shared::error::ErrorCode::Internal, "database unavailable")),
    )
}

async fn spawn_api() -> anyhow::Result<(String, Recorder)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/api/ads", get(handle_list))
        .route("/api/ads/:id", get(handle_item))
        .route("/api/ads/:id/:action", post(handle_decision))
        .route("/api/stats/summary", get(handle_summary))
        .route("/api/stats/chart/activity", get(handle_broken))
        .route("/api/stats/chart/decisions", get(handle_failing))
        .with_state(recorder.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api"), recorder))
}

#[tokio::test]
async fn fetch_page_sends_query_pairs() {
    let (base, recorder) = spawn_api().await.expect("spawn server");
    let client = HttpModerationClient::new(&base).expect("client");
    let query = ListQuery {
        page: 2,
        limit: 10,
        search: "bike".to_string(),
        category_id: None,
        status: vec![ListingStatus::Pending, ListingStatus::Rejected],
        min_price: 0,
        max_price: 5000,
        sort_by: SortField::Price,
        sort_order: SortDirection::Asc,
    };

    let result = client.fetch_page(&query).await.expect("page");
    assert_eq!(result.ads.len(), 2);
    assert_eq!(result.total_items(), 12);

    let lines = recorder.lines().await;
    let raw = lines.first().expect("request recorded");
    assert!(raw.contains("page=2"), "{raw}");
    assert!(raw.contains("status%5B%5D=pending"), "{raw}");
    assert!(raw.contains("status%5B%5D=rejected"), "{raw}");
    assert!(raw.contains("sortBy=price"), "{raw}");
    assert!(!raw.contains("categoryId"), "{raw}");
}

#[tokio::test]
async fn fetch_item_maps_404_to_absence() {
    let (base, _) = spawn_api().await.expect("spawn server");
    let client = HttpModerationClient::new(&base).expect("client");

    let found = client.fetch_item(AdId(7)).await.expect("read");
    assert_eq!(found.map(|detail| detail.id), Some(AdId(7)));

    let missing = client.fetch_item(AdId(151)).await.expect("read");
    assert!(missing.is_none());
}

#[tokio::test]
async fn decisions_post_to_action_paths() {
    let (base, recorder) = spawn_api().await.expect("spawn server");
    let client = HttpModerationClient::new(&base).expect("client");

    client
        .submit(AdId(3), &DecisionRequest::Approve)
        .await
        .expect("approve");
    client
        .submit(
            AdId(4),
            &DecisionRequest::RequestChanges(DecisionBody {
                reason: "photo_issue".to_string(),
                comment: "blurry".to_string(),
            }),
        )
        .await
        .expect("request changes");

    let lines = recorder.lines().await;
    assert_eq!(lines[0], "3 approve ");
    assert!(lines[1].starts_with("4 request-changes "), "{}", lines[1]);
    assert!(lines[1].contains("\"reason\":\"photo_issue\""), "{}", lines[1]);
    assert!(lines[1].contains("\"comment\":\"blurry\""), "{}", lines[1]);
}

#[tokio::test]
async fn failed_decision_is_a_server_error() {
    let (base, _) = spawn_api().await.expect("spawn server");
    let client = HttpModerationClient::new(&base).expect("client");

    let err = client
        .submit(AdId(13), &DecisionRequest::Approve)
        .await
        .expect_err("server refused");
    assert!(matches!(err, FetchError::Server { status: 500, .. }), "{err:?}");
}

#[tokio::test]
async fn stats_requests_carry_period() {
    let (base, recorder) = spawn_api().await.expect("spawn server");
    let client = HttpModerationClient::new(&base).expect("client");

    let summary = client.summary(StatsPeriod::Month).await.expect("summary");
    assert_eq!(summary.total_reviewed, 9);
    assert_eq!(recorder.lines().await, vec!["period=month".to_string()]);
}

#[tokio::test]
async fn api_error_body_becomes_server_message() {
    let (base, _) = spawn_api().await.expect("spawn server");
    let client = HttpModerationClient::new(&base).expect("client");

    let err = client
        .decisions(StatsPeriod::Week)
        .await
        .expect_err("failing endpoint");
    assert_eq!(
        err,
        FetchError::Server {
            status: 500,
            message: "database unavailable".to_string(),
        }
    );
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (base, _) = spawn_api().await.expect("spawn server");
    let client = HttpModerationClient::new(&base).expect("client");

    let err = client
        .activity(StatsPeriod::Today)
        .await
        .expect_err("broken endpoint");
    assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = HttpModerationClient::new(&format!("http://{addr}/api")).expect("client");
    let err = client.fetch_item(AdId(1)).await.expect_err("nothing listening");
    assert!(err.is_network(), "{err:?}");
}

#[test]
fn base_url_is_validated_and_trimmed() {
    let client = HttpModerationClient::new("http://localhost:3001/api/").expect("client");
    assert_eq!(client.base_url(), "http://localhost:3001/api");
    assert_eq!(client.endpoint("ads/1"), "http://localhost:3001/api/ads/1");

    assert!(matches!(
        HttpModerationClient::new("not a url"),
        Err(ClientBuildError::BaseUrl(_))
    ));
    assert!(matches!(
        HttpModerationClient::new("ftp://example.com/api"),
        Err(ClientBuildError::Scheme(_))
    ));
}
