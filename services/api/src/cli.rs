use crate::check::{self, CheckArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use special_membership::config::{AppConfig, ConfigError};
use special_membership::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Special Membership Service",
    about = "Decide special membership applications from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate a single applicant against the configured provider
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) decision: DecisionArgs,
}

/// Overrides shared by every command that evaluates applications.
#[derive(Args, Debug, Default)]
pub(crate) struct DecisionArgs {
    /// Override the credit score provider base URL
    #[arg(long)]
    pub(crate) credit_score_url: Option<String>,
    /// Override the minimum credit score required for approval
    #[arg(long)]
    pub(crate) minimum_credit_score: Option<u16>,
}

impl DecisionArgs {
    pub(crate) fn apply(&mut self, config: &mut AppConfig) -> Result<(), ConfigError> {
        if let Some(url) = self.credit_score_url.take() {
            config.credit_score.set_base_url(url)?;
        }
        if let Some(minimum) = self.minimum_credit_score.take() {
            config.membership.minimum_credit_score = minimum;
        }
        Ok(())
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Check(args) => check::run(args).await,
    }
}
