//! Telegram Bot API delivery

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{NotificationJob, NotificationSink, NotifyError};
use crate::db::SubscriptionDirectory;
use crate::models::cycle::Cycle;

pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_thread_id: Option<&'a str>,
    text: &'a str,
}

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub async fn send_message(
        &self,
        chat_id: &str,
        thread_id: Option<&str>,
        text: &str,
    ) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let body = SendMessage {
            chat_id,
            message_thread_id: thread_id.filter(|t| !t.is_empty()),
            text,
        };

        let resp = self.http.post(&url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(chat_id = %chat_id, "TelegramClient: message sent to {}", chat_id);
        Ok(())
    }
}

/// Forum topic ids of the group chat, one per cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicMap {
    pub information: String,
    #[serde(rename = "5m")]
    pub five_minutes: String,
    #[serde(rename = "15m")]
    pub fifteen_minutes: String,
    #[serde(rename = "30m")]
    pub thirty_minutes: String,
    #[serde(rename = "1h")]
    pub one_hour: String,
    #[serde(rename = "4h")]
    pub four_hours: String,
    #[serde(rename = "1d")]
    pub one_day: String,
    #[serde(rename = "1w")]
    pub one_week: String,
    #[serde(rename = "1M")]
    pub one_month: String,
}

impl TopicMap {
    /// Topic for `cycle`; cycles without a configured topic use the information topic.
    pub fn topic_for(&self, cycle: Cycle) -> &str {
        let topic = match cycle {
            Cycle::FiveMinutes => &self.five_minutes,
            Cycle::FifteenMinutes => &self.fifteen_minutes,
            Cycle::ThirtyMinutes => &self.thirty_minutes,
            Cycle::OneHour => &self.one_hour,
            Cycle::FourHours => &self.four_hours,
            Cycle::OneDay => &self.one_day,
            Cycle::OneWeek => &self.one_week,
            Cycle::OneMonth => &self.one_month,
        };
        if topic.is_empty() {
            &self.information
        } else {
            topic
        }
    }
}

/// Posts alerts into the group chat under the topic of their cycle.
pub struct TelegramTopicSink {
    client: TelegramClient,
    group: String,
    topics: TopicMap,
}

impl TelegramTopicSink {
    pub fn new(client: TelegramClient, group: impl Into<String>, topics: TopicMap) -> Self {
        Self {
            client,
            group: group.into(),
            topics,
        }
    }
}

#[async_trait]
impl NotificationSink for TelegramTopicSink {
    fn name(&self) -> &'static str {
        "telegram-topic"
    }

    async fn deliver(&self, job: &NotificationJob) -> Result<(), NotifyError> {
        let topic = self.topics.topic_for(job.cycle);
        self.client
            .send_message(&self.group, Some(topic), &job.message)
            .await
    }
}

/// Sends alerts directly to every recipient subscribed to the symbol and cycle.
pub struct SubscriberSink {
    client: TelegramClient,
    directory: Arc<dyn SubscriptionDirectory>,
}

impl SubscriberSink {
    pub fn new(client: TelegramClient, directory: Arc<dyn SubscriptionDirectory>) -> Self {
        Self { client, directory }
    }
}

#[async_trait]
impl NotificationSink for SubscriberSink {
    fn name(&self) -> &'static str {
        "telegram-subscribers"
    }

    async fn deliver(&self, job: &NotificationJob) -> Result<(), NotifyError> {
        if job.symbol.trim().is_empty() || job.message.is_empty() {
            return Ok(());
        }

        let recipients = self.directory.subscribers(&job.symbol, job.cycle).await?;
        if recipients.is_empty() {
            return Ok(());
        }

        let sends = recipients
            .iter()
            .map(|chat_id| self.client.send_message(chat_id, None, &job.message));
        let results = join_all(sends).await;

        let mut first_error = None;
        for (chat_id, result) in recipients.iter().zip(results) {
            if let Err(e) = result {
                warn!(
                    symbol = %job.symbol,
                    chat_id = %chat_id,
                    error = %e,
                    "SubscriberSink: failed to notify {}",
                    chat_id
                );
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
