use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::ClientResult;
use crate::models::feature::FeatureRequest;
use crate::models::job::JobResult;
use crate::models::upload::ContentType;
use crate::services::client::RemoteJobClient;

/// One independent feature run within a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub request: FeatureRequest,
    pub assets: Vec<Vec<u8>>,
    pub content_type: ContentType,
}

impl BatchItem {
    pub fn new(request: FeatureRequest, assets: Vec<Vec<u8>>) -> Self {
        Self {
            request,
            assets,
            content_type: ContentType::default(),
        }
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }
}

/// Run independent workflows with at most `concurrency` in flight.
///
/// Results come back in input order; a failed item does not stop the others.
pub async fn run_batch(
    client: &RemoteJobClient,
    items: Vec<BatchItem>,
    concurrency: usize,
) -> Vec<ClientResult<JobResult>> {
    let total = items.len();
    info!(total, concurrency, "Starting batch");

    let results: Vec<ClientResult<JobResult>> = stream::iter(items.into_iter().enumerate())
        .map(|(index, item)| async move {
            let result = client
                .run_feature(&item.request, &item.assets, item.content_type.as_str())
                .await;
            if let Err(e) = &result {
                warn!(index, feature = %item.request.feature(), error = %e, "Batch item failed");
            }
            result
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    info!(total, succeeded, failed = total - succeeded, "Batch finished");

    results
}
