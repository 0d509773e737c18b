//! In-process mock of the LightX API for integration tests.
//!
//! Serves the upload-URL, pre-signed PUT, job submission and order-status
//! endpoints on a random local port, with scripted poll replies and counters
//! for every request kind.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lightx_client::{ClientConfig, RemoteJobClient, RetryPolicy};

pub const TEST_API_KEY: &str = "test-key";

/// Scripted reply to one order-status request.
#[derive(Debug, Clone)]
pub enum PollReply {
    /// Envelope 2000 with the given status and no output
    Status(&'static str),
    /// Envelope 2000, status `active`, with an output URL
    Output(&'static str),
    /// Bare HTTP error status
    Http(u16),
    /// HTTP 200 with a non-2000 envelope
    Rejected(i64, &'static str),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub upload_url_requests: usize,
    pub put_requests: usize,
    pub submit_requests: usize,
    pub poll_requests: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.upload_url_requests + self.put_requests + self.submit_requests + self.poll_requests
    }
}

#[derive(Debug)]
struct MockState {
    base_url: String,
    upload_rejection: Option<(i64, String)>,
    upload_url_status: u16,
    submit_rejection: Option<(i64, String)>,
    submit_status: u16,
    put_status: u16,
    poll_replies: VecDeque<PollReply>,
    counts: Counts,
    issued_urls: Vec<String>,
    uploaded_bodies: Vec<(String, Vec<u8>)>,
    submissions: Vec<(String, Value)>,
    status_paths: Vec<String>,
    api_keys: Vec<String>,
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockLightx {
    pub base_url: String,
    state: Shared,
}

impl MockLightx {
    pub async fn start() -> Self {
        init_tracing();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock listener address");
        let base_url = format!("http://{addr}");

        let state = Arc::new(Mutex::new(MockState {
            base_url: base_url.clone(),
            upload_rejection: None,
            upload_url_status: 200,
            submit_rejection: None,
            submit_status: 200,
            put_status: 200,
            poll_replies: VecDeque::new(),
            counts: Counts::default(),
            issued_urls: Vec::new(),
            uploaded_bodies: Vec::new(),
            submissions: Vec::new(),
            status_paths: Vec::new(),
            api_keys: Vec::new(),
        }));

        let app = Router::new()
            .route("/v2/uploadImageUrl", post(upload_url))
            .route("/v1/order-status", post(order_status))
            .route("/v2/order-status", post(order_status))
            .route("/v1/{feature}", post(submit))
            .route("/v2/{feature}", post(submit))
            .route("/v1/{feature}/", post(submit))
            .route("/v2/{feature}/", post(submit))
            .route("/upload/{id}", put(put_object))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { base_url, state }
    }

    /// Client pointed at this mock with the given polling budget.
    pub fn client(&self, max_retries: u32, retry_interval: Duration) -> RemoteJobClient {
        self.client_with(|config| config, max_retries, retry_interval)
    }

    pub fn client_with(
        &self,
        customize: impl FnOnce(ClientConfig) -> ClientConfig,
        max_retries: u32,
        retry_interval: Duration,
    ) -> RemoteJobClient {
        let config = ClientConfig::new(TEST_API_KEY)
            .with_base_url(&self.base_url)
            .with_retry_policy(RetryPolicy {
                max_retries,
                retry_interval,
            });
        RemoteJobClient::new(customize(config)).expect("valid test client")
    }

    pub fn script_polls(&self, replies: impl IntoIterator<Item = PollReply>) {
        self.state.lock().unwrap().poll_replies = replies.into_iter().collect();
    }

    pub fn reject_upload_url(&self, status_code: i64, message: &str) {
        self.state.lock().unwrap().upload_rejection = Some((status_code, message.to_string()));
    }

    pub fn fail_upload_url_with(&self, status: u16) {
        self.state.lock().unwrap().upload_url_status = status;
    }

    pub fn reject_submit(&self, status_code: i64, message: &str) {
        self.state.lock().unwrap().submit_rejection = Some((status_code, message.to_string()));
    }

    pub fn fail_submit_with(&self, status: u16) {
        self.state.lock().unwrap().submit_status = status;
    }

    pub fn fail_puts_with(&self, status: u16) {
        self.state.lock().unwrap().put_status = status;
    }

    pub fn counts(&self) -> Counts {
        self.state.lock().unwrap().counts
    }

    /// Public URLs handed out by the upload-URL endpoint, in issue order.
    pub fn issued_urls(&self) -> Vec<String> {
        self.state.lock().unwrap().issued_urls.clone()
    }

    /// `(content-type, body)` of every PUT, in arrival order.
    pub fn uploaded_bodies(&self) -> Vec<(String, Vec<u8>)> {
        self.state.lock().unwrap().uploaded_bodies.clone()
    }

    /// `(path, payload)` of every job submission, in arrival order.
    pub fn submissions(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn status_paths(&self) -> Vec<String> {
        self.state.lock().unwrap().status_paths.clone()
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.state.lock().unwrap().api_keys.clone()
    }
}

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

fn success(body: Value) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "statusCode": 2000, "message": "SUCCESS", "body": body })),
    )
}

fn http_error(status: u16) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "message": "unavailable" })),
    )
}

fn rejected(code: i64, message: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "statusCode": code, "message": message, "body": null })),
    )
}

fn record_api_key(state: &mut MockState, headers: &HeaderMap) {
    let key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.api_keys.push(key);
}

async fn upload_url(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = shared.lock().unwrap();
    state.counts.upload_url_requests += 1;
    record_api_key(&mut state, &headers);

    if state.upload_url_status != 200 {
        return http_error(state.upload_url_status);
    }
    if let Some((code, message)) = state.upload_rejection.clone() {
        return rejected(code, message);
    }

    assert_eq!(body["uploadType"], "imageUrl");

    let n = state.counts.upload_url_requests;
    let public_url = format!("https://cdn.lightx.test/uploads/{n}.jpg");
    state.issued_urls.push(public_url.clone());

    success(json!({
        "uploadImage": format!("{}/upload/{n}", state.base_url),
        "imageUrl": public_url,
        "size": body["size"],
    }))
}

async fn put_object(
    State(shared): State<Shared>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let mut state = shared.lock().unwrap();
    state.counts.put_requests += 1;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.uploaded_bodies.push((content_type, body.to_vec()));

    StatusCode::from_u16(state.put_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn submit(
    State(shared): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = shared.lock().unwrap();
    state.counts.submit_requests += 1;
    record_api_key(&mut state, &headers);
    state.submissions.push((uri.path().to_string(), body));

    if state.submit_status != 200 {
        return http_error(state.submit_status);
    }
    if let Some((code, message)) = state.submit_rejection.clone() {
        return rejected(code, message);
    }

    let order_id = format!("order-{}", state.counts.submit_requests);
    success(json!({
        "orderId": order_id,
        "maxRetriesAllowed": 5,
        "avgResponseTimeInSec": 15,
        "status": "init",
    }))
}

async fn order_status(
    State(shared): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = shared.lock().unwrap();
    state.counts.poll_requests += 1;
    record_api_key(&mut state, &headers);
    state.status_paths.push(uri.path().to_string());

    let order_id = body["orderId"].clone();
    let reply = state
        .poll_replies
        .pop_front()
        .unwrap_or(PollReply::Status("init"));

    match reply {
        PollReply::Status(status) => success(json!({ "orderId": order_id, "status": status })),
        PollReply::Output(url) => {
            success(json!({ "orderId": order_id, "status": "active", "output": url }))
        }
        PollReply::Http(code) => http_error(code),
        PollReply::Rejected(code, message) => rejected(code, message.to_string()),
    }
}
