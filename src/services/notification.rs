//! Delete-event notifications.
//!
//! Publishing is best-effort: [`DeleteEventPublisher::publish`] reports its
//! outcome, and the delete flow logs a failure and carries on.

use crate::models::delete_event::DeleteEvent;
use async_trait::async_trait;
use aws_sdk_sns::{Client, error::DisplayErrorContext};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to encode delete event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to send to topic `{topic}`: {message}")]
    Send { topic: String, message: String },
}

#[async_trait]
pub trait DeleteEventPublisher: Send + Sync {
    async fn publish(&self, event: &DeleteEvent) -> Result<(), PublishError>;
}

/// Publishes delete events as JSON messages to an SNS topic.
#[derive(Clone, Debug)]
pub struct SnsPublisher {
    client: Client,
    topic_arn: String,
}

impl SnsPublisher {
    pub fn new(client: Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }
}

#[async_trait]
impl DeleteEventPublisher for SnsPublisher {
    async fn publish(&self, event: &DeleteEvent) -> Result<(), PublishError> {
        let message = serde_json::to_string(event)?;

        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|err| PublishError::Send {
                topic: self.topic_arn.clone(),
                message: DisplayErrorContext(err).to_string(),
            })?;

        info!(
            "Delete event sent to SNS. Bucket: '{}'. Key: '{}'.",
            event.bucket, event.key
        );
        Ok(())
    }
}
