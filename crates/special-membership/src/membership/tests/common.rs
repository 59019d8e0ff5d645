use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::Barrier;
use tracing::subscriber::DefaultGuard;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::membership::credit_score::{CreditScoreClient, CreditScoreResult, ProviderError};
use crate::membership::domain::ApplicantEmail;
use crate::membership::events::{EventPublisher, MembershipOutcomeEvent, PublishError};
use crate::membership::policy::EligibilityPolicy;
use crate::membership::service::{DecisionSettings, MembershipDecisionService, PublishMode};

pub(super) const TONY_STARK: &str = "tony.stark@example.com";
pub(super) const HAWLEY_GRIFFIN: &str = "hawley.griffin@example.com";

pub(super) fn settings(publish_mode: PublishMode) -> DecisionSettings {
    DecisionSettings {
        policy: EligibilityPolicy::new(700),
        lookup_timeout: Duration::from_millis(500),
        publish_mode,
    }
}

/// Shared ordering log so tests can assert lookup happens before publish.
pub(super) type CallLog = Arc<Mutex<Vec<String>>>;

/// Provider double answering from a fixed table; unknown emails are `NotFound`.
#[derive(Default, Clone)]
pub(super) struct StubScores {
    scores: HashMap<String, CreditScoreResult>,
    lookups: Arc<Mutex<Vec<String>>>,
    log: CallLog,
}

impl StubScores {
    pub(super) fn contract() -> Self {
        Self::default().with(TONY_STARK, CreditScoreResult::Found(850))
    }

    pub(super) fn with(mut self, email: &str, result: CreditScoreResult) -> Self {
        self.scores.insert(email.to_string(), result);
        self
    }

    pub(super) fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub(super) fn lookups(&self) -> Vec<String> {
        self.lookups.lock().expect("lookup mutex poisoned").clone()
    }
}

#[async_trait]
impl CreditScoreClient for StubScores {
    async fn lookup(&self, email: &ApplicantEmail) -> CreditScoreResult {
        self.lookups
            .lock()
            .expect("lookup mutex poisoned")
            .push(email.to_string());
        self.log
            .lock()
            .expect("log mutex poisoned")
            .push(format!("lookup:{email}"));
        self.scores
            .get(email.as_str())
            .cloned()
            .unwrap_or(CreditScoreResult::NotFound)
    }
}

/// Provider double that never answers within any sane timeout.
pub(super) struct HangingScores;

#[async_trait]
impl CreditScoreClient for HangingScores {
    async fn lookup(&self, _email: &ApplicantEmail) -> CreditScoreResult {
        tokio::time::sleep(Duration::from_secs(30)).await;
        CreditScoreResult::ProviderError(ProviderError::Unreachable("unreachable".to_string()))
    }
}

/// Provider double that only answers once every concurrent lookup has arrived.
pub(super) struct RendezvousScores {
    pub(super) barrier: Arc<Barrier>,
}

#[async_trait]
impl CreditScoreClient for RendezvousScores {
    async fn lookup(&self, _email: &ApplicantEmail) -> CreditScoreResult {
        self.barrier.wait().await;
        CreditScoreResult::Found(760)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryEvents {
    events: Arc<Mutex<Vec<MembershipOutcomeEvent>>>,
    log: CallLog,
}

impl MemoryEvents {
    pub(super) fn with_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub(super) fn events(&self) -> Vec<MembershipOutcomeEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }

    /// Poll until `count` events arrived, for detached publication.
    pub(super) async fn wait_for(&self, count: usize) -> Vec<MembershipOutcomeEvent> {
        for _ in 0..100 {
            let events = self.events();
            if events.len() >= count {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.events()
    }
}

#[async_trait]
impl EventPublisher for MemoryEvents {
    async fn publish(&self, event: MembershipOutcomeEvent) -> Result<(), PublishError> {
        self.log
            .lock()
            .expect("log mutex poisoned")
            .push(format!("publish:{}", event.verdict.label()));
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct FailingEvents;

#[async_trait]
impl EventPublisher for FailingEvents {
    async fn publish(&self, _event: MembershipOutcomeEvent) -> Result<(), PublishError> {
        Err(PublishError::Transport("broker offline".to_string()))
    }
}

/// Collects error-level log records as JSON lines.
#[derive(Clone, Default)]
pub(super) struct LogCapture(Arc<Mutex<Vec<u8>>>);

pub(super) struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter(Arc::clone(&self.0))
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    /// Capture this thread's events until the guard drops. Tasks spawned on a
    /// current-thread runtime are covered too.
    pub(super) fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .json()
            .with_max_level(Level::ERROR)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub(super) fn records(&self) -> Vec<Value> {
        let bytes = self.0.lock().expect("capture mutex poisoned").clone();
        String::from_utf8(bytes)
            .expect("utf8 log output")
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).expect("json log line"))
            .collect()
    }

    /// Poll until a record with `message` shows up.
    pub(super) async fn wait_for_message(&self, message: &str) -> Option<Value> {
        for _ in 0..100 {
            let found = self
                .records()
                .into_iter()
                .find(|record| record["fields"]["message"] == message);
            if found.is_some() {
                return found;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }
}

pub(super) fn build_service(
    scores: StubScores,
    publish_mode: PublishMode,
) -> (
    MembershipDecisionService<StubScores, MemoryEvents>,
    Arc<StubScores>,
    Arc<MemoryEvents>,
) {
    let scores = Arc::new(scores);
    let events = Arc::new(MemoryEvents::default());
    let service =
        MembershipDecisionService::new(scores.clone(), events.clone(), settings(publish_mode));
    (service, scores, events)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
