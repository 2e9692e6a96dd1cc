//! `sign-webhook` - sign a sample billing webhook for manual testing.
//!
//! Prints the `x-signature` for a payload and a `curl` command that posts it
//! to a webhook endpoint.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use billing_webhook_harness::{cli, Cli, HarnessConfig};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,billing_webhook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();

    let status = cli::execute(
        args,
        HarnessConfig::from_env(),
        std::io::stdin().lock(),
        std::io::stdout().lock(),
        std::io::stderr(),
    )
    .await;

    ExitCode::from(status)
}
