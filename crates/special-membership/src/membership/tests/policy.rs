use crate::membership::credit_score::{CreditScoreResult, ProviderError, ScoreEvidence};
use crate::membership::domain::{DenialReason, MembershipVerdict};
use crate::membership::policy::EligibilityPolicy;

#[test]
fn approves_contract_score() {
    let policy = EligibilityPolicy::new(700);

    assert_eq!(
        policy.decide(ScoreEvidence::Found(850)),
        MembershipVerdict::Approved
    );
}

#[test]
fn threshold_is_inclusive() {
    let policy = EligibilityPolicy::new(700);

    assert!(policy.decide(ScoreEvidence::Found(700)).is_approved());
    match policy.decide(ScoreEvidence::Found(699)) {
        MembershipVerdict::Denied {
            reason: DenialReason::BelowThreshold { minimum, actual },
        } => {
            assert_eq!(minimum, 700);
            assert_eq!(actual, 699);
        }
        other => panic!("expected below threshold denial, got {other:?}"),
    }
}

#[test]
fn denies_applicants_unknown_to_provider() {
    let policy = EligibilityPolicy::new(300);

    assert_eq!(
        policy.decide(ScoreEvidence::NotFound),
        MembershipVerdict::Denied {
            reason: DenialReason::NoCreditHistory
        }
    );
}

#[test]
fn threshold_is_configuration_not_a_constant() {
    let strict = EligibilityPolicy::new(851);
    let lenient = EligibilityPolicy::new(500);

    assert!(!strict.decide(ScoreEvidence::Found(850)).is_approved());
    assert!(lenient.decide(ScoreEvidence::Found(520)).is_approved());
    assert_eq!(strict.minimum_credit_score(), 851);
}

#[test]
fn decide_is_deterministic() {
    let policy = EligibilityPolicy::new(680);

    for evidence in [
        ScoreEvidence::Found(300),
        ScoreEvidence::Found(680),
        ScoreEvidence::Found(850),
        ScoreEvidence::NotFound,
    ] {
        assert_eq!(policy.decide(evidence), policy.decide(evidence));
    }
}

#[test]
fn provider_errors_never_become_evidence() {
    let failure = ProviderError::UnexpectedStatus(503);

    assert_eq!(
        CreditScoreResult::ProviderError(failure.clone()).into_evidence(),
        Err(failure)
    );
    assert_eq!(
        CreditScoreResult::NotFound.into_evidence(),
        Ok(ScoreEvidence::NotFound)
    );
}

#[test]
fn denial_summaries_explain_the_reason() {
    let below = MembershipVerdict::Denied {
        reason: DenialReason::BelowThreshold {
            minimum: 700,
            actual: 640,
        },
    };
    assert!(below.summary().contains("640"));
    assert!(MembershipVerdict::Denied {
        reason: DenialReason::NoCreditHistory
    }
    .summary()
    .contains("no credit history"));
    assert_eq!(MembershipVerdict::Approved.label(), "approved");
}
