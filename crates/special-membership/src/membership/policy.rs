use serde::{Deserialize, Serialize};

use super::credit_score::ScoreEvidence;
use super::domain::{DenialReason, MembershipVerdict};

/// Single-threshold eligibility rule for special membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    minimum_credit_score: u16,
}

impl EligibilityPolicy {
    pub const fn new(minimum_credit_score: u16) -> Self {
        Self {
            minimum_credit_score,
        }
    }

    pub const fn minimum_credit_score(&self) -> u16 {
        self.minimum_credit_score
    }

    /// Applicants unknown to the provider are denied, never approved by default.
    pub fn decide(&self, evidence: ScoreEvidence) -> MembershipVerdict {
        match evidence {
            ScoreEvidence::Found(score) if score >= self.minimum_credit_score => {
                MembershipVerdict::Approved
            }
            ScoreEvidence::Found(score) => MembershipVerdict::Denied {
                reason: DenialReason::BelowThreshold {
                    minimum: self.minimum_credit_score,
                    actual: score,
                },
            },
            ScoreEvidence::NotFound => MembershipVerdict::Denied {
                reason: DenialReason::NoCreditHistory,
            },
        }
    }
}
