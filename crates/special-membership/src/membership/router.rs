use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::credit_score::CreditScoreClient;
use super::domain::{MembershipApplication, MembershipVerdict};
use super::events::EventPublisher;
use super::service::{MembershipDecisionService, MembershipServiceError};

/// Path accepting special membership applications.
pub const MEMBERSHIP_PATH: &str = "/special-membership";

/// Router builder exposing the membership gateway.
pub fn membership_router<C, P>(service: Arc<MembershipDecisionService<C, P>>) -> Router
where
    C: CreditScoreClient + 'static,
    P: EventPublisher + 'static,
{
    Router::new()
        .route(MEMBERSHIP_PATH, post(apply_handler::<C, P>))
        .with_state(service)
}

/// Response body echoing the verdict back to the applicant.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipResponse {
    pub email: String,
    #[serde(flatten)]
    pub verdict: MembershipVerdict,
}

/// Map each verdict and service failure to its HTTP status.
pub fn status_for(result: &Result<MembershipVerdict, MembershipServiceError>) -> StatusCode {
    match result {
        Ok(MembershipVerdict::Approved) => StatusCode::OK,
        Ok(MembershipVerdict::Denied { .. }) => StatusCode::FORBIDDEN,
        Err(MembershipServiceError::InvalidApplication(_)) => StatusCode::BAD_REQUEST,
        Err(MembershipServiceError::EvaluationFailed(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) async fn apply_handler<C, P>(
    State(service): State<Arc<MembershipDecisionService<C, P>>>,
    body: Result<axum::Json<MembershipApplication>, JsonRejection>,
) -> Response
where
    C: CreditScoreClient + 'static,
    P: EventPublisher + 'static,
{
    // Bodies without a string email are invalid applications.
    let axum::Json(application) = match body {
        Ok(body) => body,
        Err(rejection) => {
            let payload = json!({
                "error": format!("invalid membership application: {}", rejection.body_text()),
            });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    let email = application.email.trim().to_string();
    let result = service.evaluate(application).await;
    let status = status_for(&result);

    match result {
        Ok(verdict) => (status, axum::Json(MembershipResponse { email, verdict })).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (status, axum::Json(payload)).into_response()
        }
    }
}
