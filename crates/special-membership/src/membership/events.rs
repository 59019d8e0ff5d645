//! Outcome announcements for downstream consumers.
//!
//! [`BroadcastEventPublisher`] is an in-process fan-out bus over a
//! `tokio::sync::broadcast` channel. Every decided evaluation produces exactly
//! one [`MembershipOutcomeEvent`] on it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::domain::{ApplicantEmail, MembershipVerdict};

/// Topic name carried by every outcome event.
pub const OUTCOME_TOPIC: &str = "membership.outcome";

/// Record of a verdict, owned by the publisher once handed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipOutcomeEvent {
    pub topic: String,
    pub email: String,
    #[serde(flatten)]
    pub verdict: MembershipVerdict,
    pub decided_at: DateTime<Utc>,
}

impl MembershipOutcomeEvent {
    pub fn new(email: &ApplicantEmail, verdict: MembershipVerdict) -> Self {
        Self {
            topic: OUTCOME_TOPIC.to_string(),
            email: email.to_string(),
            verdict,
            decided_at: Utc::now(),
        }
    }
}

/// Outbound hook for outcome events (event bus, broker, webhook adapters).
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: MembershipOutcomeEvent) -> Result<(), PublishError>;
}

/// Event dispatch error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("no subscribers attached to {0}")]
    NoSubscribers(&'static str),
    #[error("event transport unavailable: {0}")]
    Transport(String),
}

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Broadcast-backed publisher shared via `Arc` across the service.
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<MembershipOutcomeEvent>,
}

impl BroadcastEventPublisher {
    /// When the buffer is full the oldest events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MembershipOutcomeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: MembershipOutcomeEvent) -> Result<(), PublishError> {
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|_| PublishError::NoSubscribers(OUTCOME_TOPIC))
    }
}

/// Subscribe an audit consumer that writes every outcome to the log.
pub fn spawn_outcome_audit(publisher: &BroadcastEventPublisher) -> JoinHandle<()> {
    let mut receiver = publisher.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let payload = serde_json::to_string(&event)
                        .unwrap_or_else(|err| format!("<unserializable event: {err}>"));
                    info!(
                        topic = %event.topic,
                        email = %event.email,
                        verdict = event.verdict.label(),
                        %payload,
                        "membership outcome recorded"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "outcome audit lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
