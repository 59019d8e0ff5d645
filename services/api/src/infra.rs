use metrics_exporter_prometheus::PrometheusHandle;
use special_membership::config::AppConfig;
use special_membership::error::AppError;
use special_membership::membership::{
    BroadcastEventPublisher, DecisionSettings, EligibilityPolicy, HttpCreditScoreClient,
    MembershipDecisionService,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type MembershipService =
    MembershipDecisionService<HttpCreditScoreClient, BroadcastEventPublisher>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn decision_settings(config: &AppConfig) -> DecisionSettings {
    DecisionSettings {
        policy: EligibilityPolicy::new(config.membership.minimum_credit_score),
        lookup_timeout: config.credit_score.timeout,
        publish_mode: config.membership.publish_mode,
    }
}

/// Wire the provider client and outcome bus into a decision service.
pub(crate) fn build_membership_service(
    config: &AppConfig,
) -> Result<(Arc<MembershipService>, Arc<BroadcastEventPublisher>), AppError> {
    let client = HttpCreditScoreClient::new(
        &config.credit_score.base_url,
        config.credit_score.timeout,
    )?;
    let publisher = Arc::new(BroadcastEventPublisher::new(
        config.membership.event_bus_capacity,
    ));
    let service = MembershipDecisionService::new(
        Arc::new(client),
        publisher.clone(),
        decision_settings(config),
    );
    Ok((Arc::new(service), publisher))
}
