use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::credit_score::{CreditScoreClient, CreditScoreResult, ProviderError};
use super::domain::{ApplicantEmail, ApplicationError, MembershipApplication, MembershipVerdict};
use super::events::{EventPublisher, MembershipOutcomeEvent};
use super::policy::EligibilityPolicy;

/// How outcome events are handed to the publisher relative to the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishMode {
    /// Publish on a spawned task; the verdict returns without waiting.
    #[default]
    Detached,
    /// Await the publisher before returning the verdict.
    Awaited,
}

impl PublishMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "detached" => Some(Self::Detached),
            "awaited" => Some(Self::Awaited),
            _ => None,
        }
    }
}

/// Settings for [`MembershipDecisionService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionSettings {
    pub policy: EligibilityPolicy,
    pub lookup_timeout: Duration,
    pub publish_mode: PublishMode,
}

/// Service composing the credit-score client, eligibility policy, and outcome publisher.
pub struct MembershipDecisionService<C, P> {
    client: Arc<C>,
    publisher: Arc<P>,
    settings: DecisionSettings,
}

impl<C, P> MembershipDecisionService<C, P>
where
    C: CreditScoreClient + 'static,
    P: EventPublisher + 'static,
{
    pub fn new(client: Arc<C>, publisher: Arc<P>, settings: DecisionSettings) -> Self {
        Self {
            client,
            publisher,
            settings,
        }
    }

    /// Decide a membership application.
    ///
    /// Provider failures abort the evaluation without publishing anything.
    /// Once a verdict exists it is final: publication problems are logged
    /// and never change what the caller receives.
    pub async fn evaluate(
        &self,
        application: MembershipApplication,
    ) -> Result<MembershipVerdict, MembershipServiceError> {
        let email = ApplicantEmail::parse(&application.email)?;
        debug!(%email, "membership application received");

        let result = self.lookup(&email).await;
        let evidence = match result.into_evidence() {
            Ok(evidence) => evidence,
            Err(cause) => {
                warn!(%email, error = %cause, "membership evaluation failed");
                return Err(MembershipServiceError::EvaluationFailed(cause));
            }
        };

        let verdict = self.settings.policy.decide(evidence);
        info!(%email, verdict = verdict.label(), "membership decided");

        let event = MembershipOutcomeEvent::new(&email, verdict.clone());
        self.announce(event).await;

        Ok(verdict)
    }

    async fn lookup(&self, email: &ApplicantEmail) -> CreditScoreResult {
        debug!(%email, "credit score lookup in flight");
        let timeout = self.settings.lookup_timeout;
        match tokio::time::timeout(timeout, self.client.lookup(email)).await {
            Ok(result) => result,
            Err(_) => CreditScoreResult::ProviderError(ProviderError::Timeout(timeout)),
        }
    }

    async fn announce(&self, event: MembershipOutcomeEvent) {
        match self.settings.publish_mode {
            PublishMode::Awaited => publish_reporting_failures(self.publisher.as_ref(), event).await,
            PublishMode::Detached => {
                let publisher = Arc::clone(&self.publisher);
                tokio::spawn(async move {
                    publish_reporting_failures(publisher.as_ref(), event).await;
                });
            }
        }
    }
}

async fn publish_reporting_failures<P: EventPublisher + ?Sized>(
    publisher: &P,
    event: MembershipOutcomeEvent,
) {
    let email = event.email.clone();
    let verdict = event.verdict.label();
    if let Err(err) = publisher.publish(event).await {
        error!(%email, verdict, error = %err, "failed to publish membership outcome");
    }
}

/// Error raised by the membership decision service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MembershipServiceError {
    #[error("invalid membership application: {0}")]
    InvalidApplication(#[from] ApplicationError),
    #[error("membership evaluation failed: {0}")]
    EvaluationFailed(#[from] ProviderError),
}
