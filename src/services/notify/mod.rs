//! Outbound alert delivery

pub mod queue;
pub mod telegram;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::StoreError;
use crate::models::cycle::Cycle;

pub use queue::{NotifyQueue, PushOutcome, DEFAULT_QUEUE_CAPACITY};
pub use telegram::{SubscriberSink, TelegramClient, TelegramTopicSink, TopicMap};

/// One rendered alert waiting for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationJob {
    pub symbol: String,
    pub cycle: Cycle,
    pub message: String,
}

impl NotificationJob {
    pub fn new(symbol: impl Into<String>, cycle: Cycle, message: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            cycle,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("messaging service rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("subscriber lookup failed: {0}")]
    Directory(#[from] StoreError),
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn deliver(&self, job: &NotificationJob) -> Result<(), NotifyError>;
}
