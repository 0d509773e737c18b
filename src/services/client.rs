//! LightX job client.
//!
//! Every LightX feature runs the same three steps: upload each image through a
//! pre-signed URL, submit a job that references the uploaded URLs, then poll
//! the order-status endpoint until the order is active or failed.
//!
//! Two status checks apply to every JSON call: the HTTP status must be 200 and
//! the envelope `statusCode` must be 2000.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::{ClientConfig, RetryPolicy};
use crate::error::{ClientError, ClientResult};
use crate::models::envelope::Envelope;
use crate::models::feature::{FeatureRequest, V1_ORDER_STATUS_PATH};
use crate::models::job::{Job, JobResult, JobStatus};
use crate::models::upload::{UploadRequest, UploadTarget};
use crate::services::telemetry::{self, Outcome};

pub const API_KEY_HEADER: &str = "x-api-key";
pub const UPLOAD_URL_PATH: &str = "/v2/uploadImageUrl";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderStatusRequest<'a> {
    order_id: &'a str,
}

/// Client for the LightX upload, submit and order-status endpoints.
///
/// Holds no mutable state, so clones can drive independent workflows
/// concurrently.
#[derive(Clone)]
pub struct RemoteJobClient {
    http: Client,
    config: Arc<ClientConfig>,
}

impl fmt::Debug for RemoteJobClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteJobClient")
            .field("base_url", &self.config.base_url)
            .field("max_retries", &self.config.max_retries)
            .field("retry_interval_ms", &self.config.retry_interval_ms)
            .field("max_file_size", &self.config.max_file_size)
            .finish()
    }
}

impl RemoteJobClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Build a client from `LIGHTX_*` environment variables.
    pub fn from_env() -> ClientResult<Self> {
        let config = ClientConfig::from_env().map_err(|e| ClientError::config(e.to_string()))?;
        Self::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.normalized_base_url(), path)
    }

    /// POST a JSON body with the API key and unwrap the response envelope.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.endpoint(path))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::NetworkError {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let envelope: Envelope = serde_json::from_slice(&bytes)?;
        envelope.into_body()
    }

    fn check_asset(&self, bytes: &[u8]) -> ClientResult<()> {
        if bytes.is_empty() {
            return Err(ClientError::invalid_input("image buffer is empty"));
        }
        if bytes.len() > self.config.max_file_size {
            return Err(ClientError::SizeLimitExceeded {
                size: bytes.len(),
                limit: self.config.max_file_size,
            });
        }
        Ok(())
    }

    /// Upload one image and return the URL it can be referenced by.
    ///
    /// Fails without touching the network when the image is over the size
    /// limit. Upload failures are never retried.
    pub async fn upload_asset(&self, bytes: &[u8], content_type: &str) -> ClientResult<String> {
        self.check_asset(bytes)?;

        let target: UploadTarget = self
            .post_json(UPLOAD_URL_PATH, &UploadRequest::new(bytes.len(), content_type))
            .await?;

        debug!(
            size = bytes.len(),
            content_type,
            max_bytes = target.max_bytes,
            "Received pre-signed upload URL"
        );

        let response = self
            .http
            .put(&target.upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::UploadFailed {
                status: status.as_u16(),
            });
        }

        telemetry::record_upload(bytes.len());
        info!(image_url = %target.public_url, size = bytes.len(), "Image uploaded");

        Ok(target.public_url)
    }

    /// Submit a job and return its order id.
    pub async fn submit_job<P>(&self, endpoint_path: &str, payload: &P) -> ClientResult<String>
    where
        P: Serialize + ?Sized,
    {
        Ok(self.submit_job_detailed(endpoint_path, payload).await?.order_id)
    }

    /// Submit a job and return the full order snapshot, including the
    /// server's retry and response-time hints.
    pub async fn submit_job_detailed<P>(&self, endpoint_path: &str, payload: &P) -> ClientResult<Job>
    where
        P: Serialize + ?Sized,
    {
        let job: Job = self.post_json(endpoint_path, payload).await?;
        telemetry::record_submission(endpoint_path);

        info!(
            order_id = %job.order_id,
            endpoint = endpoint_path,
            max_retries_allowed = job.max_retries_allowed,
            avg_response_time_in_sec = job.avg_response_time_in_sec,
            status = %job.status,
            "Order created"
        );

        Ok(job)
    }

    /// Fetch the current snapshot of an order from the v1 order-status endpoint.
    pub async fn poll_status(&self, order_id: &str) -> ClientResult<Job> {
        self.poll_status_at(V1_ORDER_STATUS_PATH, order_id).await
    }

    /// Fetch the current snapshot of an order from a specific status endpoint.
    pub async fn poll_status_at(&self, status_path: &str, order_id: &str) -> ClientResult<Job> {
        telemetry::record_poll();
        self.post_json(status_path, &OrderStatusRequest { order_id })
            .await
    }

    /// Poll the v1 order-status endpoint until the order is active or failed.
    pub async fn await_completion(
        &self,
        order_id: &str,
        policy: RetryPolicy,
    ) -> ClientResult<JobResult> {
        self.await_completion_at(V1_ORDER_STATUS_PATH, order_id, policy)
            .await
    }

    /// Poll `status_path` until the order is active or failed.
    ///
    /// Non-terminal statuses and failed poll requests draw on the same attempt
    /// budget. A `failed` order ends the wait at once.
    pub async fn await_completion_at(
        &self,
        status_path: &str,
        order_id: &str,
        policy: RetryPolicy,
    ) -> ClientResult<JobResult> {
        let started = Instant::now();
        let result = self.poll_until_terminal(status_path, order_id, policy).await;

        let outcome = match &result {
            Ok(_) => Outcome::Active,
            Err(ClientError::ProcessingFailed { .. }) => Outcome::Failed,
            Err(ClientError::MaxRetriesReached { .. }) => Outcome::Exhausted,
            Err(_) => Outcome::Error,
        };
        telemetry::record_completion(outcome, started.elapsed());

        result
    }

    async fn poll_until_terminal(
        &self,
        status_path: &str,
        order_id: &str,
        policy: RetryPolicy,
    ) -> ClientResult<JobResult> {
        let mut attempts: u32 = 0;
        let mut polls: u32 = 0;

        while attempts < policy.max_retries {
            polls += 1;

            match self.poll_status_at(status_path, order_id).await {
                Ok(job) => {
                    debug!(
                        order_id,
                        attempt = attempts + 1,
                        status = %job.status,
                        "Polled order status"
                    );

                    match job.status {
                        JobStatus::Active => {
                            info!(
                                order_id,
                                polls,
                                output = job.output.as_deref().unwrap_or_default(),
                                "Order completed"
                            );
                            return Ok(JobResult::from_job(job, polls));
                        }
                        JobStatus::Failed => {
                            warn!(order_id, polls, "Order failed during processing");
                            return Err(ClientError::ProcessingFailed {
                                order_id: order_id.to_string(),
                            });
                        }
                        JobStatus::Init | JobStatus::Other(_) => {
                            attempts += 1;
                            if attempts < policy.max_retries {
                                sleep(policy.retry_interval).await;
                            }
                        }
                    }
                }
                Err(e) if e.is_transient() => {
                    attempts += 1;
                    if attempts >= policy.max_retries {
                        return Err(e);
                    }
                    warn!(
                        order_id,
                        attempt = attempts,
                        error = %e,
                        "Order status check failed, retrying"
                    );
                    sleep(policy.retry_interval).await;
                }
                Err(e) => return Err(e),
            }
        }

        warn!(order_id, attempts, "Order still processing after retry budget");
        Err(ClientError::MaxRetriesReached {
            order_id: order_id.to_string(),
            attempts,
        })
    }

    /// Upload `assets` in order, submit the payload built from their URLs to
    /// `endpoint_path`, and wait on the v1 order-status endpoint.
    ///
    /// Every asset is size-checked before the first upload, so an oversized
    /// image later in the list costs no network traffic.
    pub async fn run_workflow<A, F, P>(
        &self,
        assets: &[A],
        endpoint_path: &str,
        payload_builder: F,
        content_type: &str,
    ) -> ClientResult<JobResult>
    where
        A: AsRef<[u8]>,
        F: FnOnce(&[String]) -> ClientResult<P>,
        P: Serialize,
    {
        self.execute(
            assets,
            endpoint_path,
            V1_ORDER_STATUS_PATH,
            payload_builder,
            content_type,
        )
        .await
    }

    /// Run one feature end to end using its entry in the feature table.
    pub async fn run_feature<A>(
        &self,
        request: &FeatureRequest,
        assets: &[A],
        content_type: &str,
    ) -> ClientResult<JobResult>
    where
        A: AsRef<[u8]>,
    {
        let feature = request.feature();
        let route = feature.route();

        request.validate()?;
        route.check_asset_count(assets.len())?;

        let span = info_span!("lightx_feature", feature = %feature);
        self.execute(
            assets,
            route.endpoint_path,
            route.status_path,
            |urls| request.payload(urls),
            content_type,
        )
        .instrument(span)
        .await
    }

    async fn execute<A, F, P>(
        &self,
        assets: &[A],
        endpoint_path: &str,
        status_path: &str,
        payload_builder: F,
        content_type: &str,
    ) -> ClientResult<JobResult>
    where
        A: AsRef<[u8]>,
        F: FnOnce(&[String]) -> ClientResult<P>,
        P: Serialize,
    {
        for asset in assets {
            self.check_asset(asset.as_ref())?;
        }

        let mut urls = Vec::with_capacity(assets.len());
        for (index, asset) in assets.iter().enumerate() {
            debug!(index, total = assets.len(), "Uploading image");
            urls.push(self.upload_asset(asset.as_ref(), content_type).await?);
        }

        let payload = payload_builder(&urls)?;
        let order_id = self.submit_job(endpoint_path, &payload).await?;

        self.await_completion_at(status_path, &order_id, self.config.retry_policy())
            .await
    }
}
