//! Integration tests against DynamoDB Local.
//!
//! # Usage
//!
//! ```bash
//! # Start DynamoDB Local, deploy the test table, run the ignored tests
//! cargo run -p xtask -- integration
//!
//! # Skip container management (DynamoDB Local already running)
//! cargo run -p xtask -- integration --no-docker
//! ```

mod containers;
mod error;

pub use error::IntegrationError;

use std::time::Duration;

use containers::{ContainerRuntime, DYNAMODB_SPEC};
use error::Result;

use crate::prelude::*;

/// Table the integration tests write to.
pub const TEST_TABLE_NAME: &str = "LeaderboardTableTest";

/// Integration test command.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Run the DynamoDB backend tests against DynamoDB Local.

Starts an in-memory DynamoDB Local container, deploys the test table with
`xtask dynamodb deploy`, then runs the leaderboard crate's ignored tests
with the DynamoDB feature enabled. The container is stopped afterward.")]
pub struct IntegrationCommand {
    /// Skip container management (assume DynamoDB Local is already running).
    #[arg(long)]
    pub no_docker: bool,

    /// Keep the container running after tests complete.
    #[arg(long)]
    pub keep_containers: bool,

    /// Timeout in seconds for the container health check.
    #[arg(long, default_value = "30")]
    pub health_timeout: u64,
}

/// Environment shared by the table setup and the test run.
pub fn local_env(endpoint: &str) -> Vec<(&'static str, String)> {
    vec![
        ("AWS_ENDPOINT_URL", endpoint.to_string()),
        ("AWS_REGION", "us-east-1".to_string()),
        ("AWS_ACCESS_KEY_ID", "test".to_string()),
        ("AWS_SECRET_ACCESS_KEY", "test".to_string()),
        ("LEADERBOARD_TABLE_NAME", TEST_TABLE_NAME.to_string()),
    ]
}

/// Arguments for the cargo invocation running the DynamoDB tests.
pub fn cargo_test_args() -> Vec<&'static str> {
    vec![
        "test",
        "-p",
        "leaderboard",
        "--features",
        "dynamodb",
        "--",
        "--ignored",
    ]
}

/// Main entry point for integration command.
pub async fn run(command: IntegrationCommand, global: crate::Global) -> Result<()> {
    let endpoint = containers::endpoint_url(&DYNAMODB_SPEC);

    if !global.is_silent() {
        aprintln!("{}", p_b("Integration Tests"));
        aprintln!("{} {}", p_b("Endpoint:"), endpoint);
        aprintln!();
    }

    let runtime = if command.no_docker {
        if !global.is_silent() {
            aprintln!(
                "{} Skipping container management (--no-docker)",
                p_y("Warning:")
            );
        }
        None
    } else {
        Some(containers::detect_runtime().await?)
    };

    let started = match runtime {
        Some(rt) => start_dynamodb(rt, command.health_timeout, &global).await?,
        None => false,
    };

    let outcome = setup_and_test(&endpoint, &global).await;

    if let Some(rt) = runtime.filter(|_| started) {
        if command.keep_containers {
            if !global.is_silent() {
                aprintln!("{} Container left running (--keep-containers)", p_y("Warning:"));
            }
        } else {
            containers::stop_container(rt, DYNAMODB_SPEC.name).await;
        }
    }

    let passed = outcome?;

    aprintln!();
    if passed {
        aprintln!("{}", p_g("All integration tests passed!"));
        Ok(())
    } else {
        aprintln!("{}", p_r("Some integration tests failed"));
        Err(IntegrationError::TestFailed(
            "DynamoDB test suite failed".to_string(),
        ))
    }
}

/// Starts DynamoDB Local unless it already runs. Returns whether we started it.
async fn start_dynamodb(
    runtime: ContainerRuntime,
    timeout_secs: u64,
    global: &crate::Global,
) -> Result<bool> {
    if containers::is_running(runtime, DYNAMODB_SPEC.name).await? {
        if !global.is_silent() {
            aprintln!("{} DynamoDB Local container already running", p_y("Warning:"));
        }
        return Ok(false);
    }

    if !global.is_silent() {
        aprintln!("{}", p_b("Starting DynamoDB Local container..."));
    }

    containers::start_container(runtime, &DYNAMODB_SPEC).await?;
    containers::wait_for_health(&DYNAMODB_SPEC, Duration::from_secs(timeout_secs)).await?;

    if !global.is_silent() {
        aprintln!("{}", p_g("DynamoDB Local is ready"));
    }

    Ok(true)
}

async fn setup_and_test(endpoint: &str, global: &crate::Global) -> Result<bool> {
    let env = local_env(endpoint);

    if !global.is_silent() {
        aprintln!("{}", p_b("Setting up test table..."));
    }

    let status = tokio::process::Command::new("cargo")
        .args([
            "run",
            "-q",
            "-p",
            "xtask",
            "--",
            "--silent",
            "dynamodb",
            "deploy",
            "--force",
            "--table-name",
            TEST_TABLE_NAME,
        ])
        .envs(env.iter().map(|(k, v)| (*k, v.as_str())))
        .status()
        .await?;

    if !status.success() {
        return Err(IntegrationError::TableSetupFailed(format!(
            "Failed to deploy table '{}'",
            TEST_TABLE_NAME
        )));
    }

    if !global.is_silent() {
        aprintln!("{}", p_b("Running DynamoDB integration tests..."));
    }

    let status = tokio::process::Command::new("cargo")
        .args(cargo_test_args())
        .envs(env.iter().map(|(k, v)| (*k, v.as_str())))
        .status()
        .await?;

    Ok(status.success())
}
