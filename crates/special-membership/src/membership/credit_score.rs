//! Credit-score lookups against the third-party provider.
//!
//! The provider answers `GET /credit-scores/{email}` with `{"creditScore": n}`
//! for known applicants and a bare 404 for unknown ones. Everything else is a
//! provider error; the decision service never guesses a score.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use super::domain::ApplicantEmail;

/// Outcome of a single credit-score lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreditScoreResult {
    Found(u16),
    NotFound,
    ProviderError(ProviderError),
}

impl CreditScoreResult {
    /// Split off provider failures so only decidable evidence reaches the policy.
    pub fn into_evidence(self) -> Result<ScoreEvidence, ProviderError> {
        match self {
            CreditScoreResult::Found(score) => Ok(ScoreEvidence::Found(score)),
            CreditScoreResult::NotFound => Ok(ScoreEvidence::NotFound),
            CreditScoreResult::ProviderError(error) => Err(error),
        }
    }
}

/// Lookup results the eligibility policy is able to decide on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEvidence {
    Found(u16),
    NotFound,
}

/// Transport or protocol failure while talking to the provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("credit score provider timed out after {0:?}")]
    Timeout(Duration),
    #[error("credit score provider unreachable: {0}")]
    Unreachable(String),
    #[error("credit score provider answered with unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("credit score provider returned a malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid credit score request: {0}")]
    InvalidRequest(String),
}

/// Lookup abstraction so the decision service can run against the real
/// provider or an in-memory double.
#[async_trait]
pub trait CreditScoreClient: Send + Sync {
    async fn lookup(&self, email: &ApplicantEmail) -> CreditScoreResult;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreditScorePayload {
    credit_score: u16,
}

/// reqwest-backed client for the provider's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpCreditScoreClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpCreditScoreClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CreditScoreClientError> {
        let base_url = Url::parse(base_url).map_err(|error| CreditScoreClientError::BaseUrl {
            value: base_url.to_string(),
            reason: error.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CreditScoreClientError::NotABase(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CreditScoreClientError::Build)?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// `{base}/credit-scores/{email}`, with the email as one path segment.
    pub fn score_url(&self, email: &ApplicantEmail) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidRequest(self.base_url.to_string()))?
            .pop_if_empty()
            .push("credit-scores")
            .push(email.as_str());
        Ok(url)
    }

    fn classify(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else if error.is_decode() {
            ProviderError::MalformedPayload(error.to_string())
        } else {
            ProviderError::Unreachable(error.to_string())
        }
    }
}

#[async_trait]
impl CreditScoreClient for HttpCreditScoreClient {
    async fn lookup(&self, email: &ApplicantEmail) -> CreditScoreResult {
        let url = match self.score_url(email) {
            Ok(url) => url,
            Err(error) => return CreditScoreResult::ProviderError(error),
        };

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(error) => return CreditScoreResult::ProviderError(self.classify(error)),
        };

        match response.status() {
            StatusCode::OK => match response.json::<CreditScorePayload>().await {
                Ok(payload) => CreditScoreResult::Found(payload.credit_score),
                Err(error) => CreditScoreResult::ProviderError(self.classify(error)),
            },
            StatusCode::NOT_FOUND => CreditScoreResult::NotFound,
            other => CreditScoreResult::ProviderError(ProviderError::UnexpectedStatus(
                other.as_u16(),
            )),
        }
    }
}

/// Failure to construct the HTTP client at startup.
#[derive(Debug, thiserror::Error)]
pub enum CreditScoreClientError {
    #[error("invalid credit score base url '{value}': {reason}")]
    BaseUrl { value: String, reason: String },
    #[error("credit score base url '{0}' cannot carry a path")]
    NotABase(String),
    #[error("failed to build credit score http client: {0}")]
    Build(#[source] reqwest::Error),
}

