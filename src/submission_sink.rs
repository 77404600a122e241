use std::sync::Arc;

use crate::domain::SubmissionPayload;
use crate::fallback_store::{FallbackStore, StoreError};
use crate::webhook_client::{DeliveryError, WebhookClient};

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Where an accepted submission ends up. Each endpoint owns one, chosen from
/// configuration at startup.
pub enum SubmissionSink {
    Webhook(WebhookClient),
    /// Shared so that every endpoint writing the same file goes through one lock.
    Store(Arc<FallbackStore>),
    /// Nothing configured: accept and forget.
    Discard,
}

impl SubmissionSink {
    pub async fn deliver(&self, payload: &SubmissionPayload) -> Result<(), SinkError> {
        match self {
            SubmissionSink::Webhook(client) => client.deliver(payload).await?,
            SubmissionSink::Store(store) => store.append(payload).await?,
            SubmissionSink::Discard => {
                tracing::info!("No delivery target configured, submission was not forwarded");
            }
        }
        Ok(())
    }
}
