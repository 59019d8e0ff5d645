use crate::cli::DecisionArgs;
use crate::infra::build_membership_service;
use clap::Args;
use serde_json::json;
use special_membership::config::AppConfig;
use special_membership::error::AppError;
use special_membership::membership::{
    spawn_outcome_audit, status_for, MembershipApplication, MembershipResponse, PublishMode,
};
use special_membership::telemetry;

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Applicant email to evaluate
    #[arg(long)]
    pub(crate) email: String,
    #[command(flatten)]
    pub(crate) decision: DecisionArgs,
}

pub(crate) async fn run(mut args: CheckArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    args.decision.apply(&mut config)?;
    config.membership.publish_mode = PublishMode::Awaited;

    telemetry::init(&config.telemetry, config.environment)?;

    let (service, outcome_bus) = build_membership_service(&config)?;
    let audit = spawn_outcome_audit(&outcome_bus);

    let email = args.email.trim().to_string();
    let result = service.evaluate(MembershipApplication::new(args.email)).await;
    let status = status_for(&result);

    // Closing the bus lets the audit subscriber drain before the process exits.
    drop(service);
    drop(outcome_bus);
    if audit.await.is_err() {
        tracing::warn!("outcome audit task ended abnormally");
    }

    let verdict = result?;
    let rendered = json!({
        "status": status.as_u16(),
        "outcome": MembershipResponse { email, verdict },
    });
    println!("{rendered:#}");
    Ok(())
}
