use crate::cli::ServeArgs;
use crate::infra::{build_membership_service, AppState};
use crate::routes::with_membership_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use special_membership::config::AppConfig;
use special_membership::error::AppError;
use special_membership::membership::spawn_outcome_audit;
use special_membership::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    args.decision.apply(&mut config)?;

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (membership_service, outcome_bus) = build_membership_service(&config)?;
    let _audit = spawn_outcome_audit(&outcome_bus);

    let app = with_membership_routes(membership_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        provider = %config.credit_score.base_url,
        minimum_credit_score = config.membership.minimum_credit_score,
        "special membership service ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
