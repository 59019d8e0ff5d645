//! Special membership eligibility decisions.
//!
//! An application carries only the applicant's email. The decision service
//! resolves a credit score from the external provider, applies a single
//! threshold policy, and announces the verdict on the outcome event bus.

pub mod credit_score;
pub mod domain;
pub mod events;
pub mod policy;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use credit_score::{
    CreditScoreClient, CreditScoreClientError, CreditScoreResult, HttpCreditScoreClient,
    ProviderError, ScoreEvidence,
};
pub use domain::{
    ApplicantEmail, ApplicationError, DenialReason, MembershipApplication, MembershipVerdict,
};
pub use events::{
    spawn_outcome_audit, BroadcastEventPublisher, EventPublisher, MembershipOutcomeEvent,
    PublishError, OUTCOME_TOPIC,
};
pub use policy::EligibilityPolicy;
pub use router::{membership_router, status_for, MembershipResponse, MEMBERSHIP_PATH};
pub use service::{
    DecisionSettings, MembershipDecisionService, MembershipServiceError, PublishMode,
};
