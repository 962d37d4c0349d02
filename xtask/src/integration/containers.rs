//! DynamoDB Local container management.
//!
//! Pure functions build the container arguments; the rest shells out to
//! `docker` or `podman`.

use std::time::Duration;

use tokio::process::Command;

use super::error::{IntegrationError, Result};

/// Container runtime (Docker or Podman).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRuntime {
    Docker,
    Podman,
}

/// Specification for a container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: &'static str,
    pub image: &'static str,
    pub port: u16,
    pub command: &'static str,
    /// Status DynamoDB Local answers a bare GET with once it is up.
    pub healthy_status: u16,
}

/// DynamoDB Local, in memory so every run starts empty.
pub const DYNAMODB_SPEC: ContainerSpec = ContainerSpec {
    name: "leaderboard-dynamodb",
    image: "amazon/dynamodb-local:latest",
    port: 8000,
    command: "-jar DynamoDBLocal.jar -inMemory -sharedDb",
    healthy_status: 400,
};

/// Builds arguments for `docker run` / `podman run`.
pub fn container_run_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--name".to_string(),
        spec.name.to_string(),
        "-d".to_string(),
        "-p".to_string(),
        format!("{}:{}", spec.port, spec.port),
        spec.image.to_string(),
    ];
    args.extend(spec.command.split_whitespace().map(String::from));
    args
}

/// Endpoint the tests talk to.
pub fn endpoint_url(spec: &ContainerSpec) -> String {
    format!("http://localhost:{}", spec.port)
}

/// Returns the command name for the container runtime.
pub fn runtime_command(runtime: ContainerRuntime) -> &'static str {
    match runtime {
        ContainerRuntime::Docker => "docker",
        ContainerRuntime::Podman => "podman",
    }
}

/// Detects which container runtime is available, Docker first.
pub async fn detect_runtime() -> Result<ContainerRuntime> {
    for runtime in [ContainerRuntime::Docker, ContainerRuntime::Podman] {
        let output = Command::new(runtime_command(runtime))
            .arg("--version")
            .output()
            .await;
        if matches!(output, Ok(ref output) if output.status.success()) {
            return Ok(runtime);
        }
    }

    Err(IntegrationError::RuntimeNotFound(
        "Neither docker nor podman found in PATH".to_string(),
    ))
}

/// Whether a container with this name is already running.
pub async fn is_running(runtime: ContainerRuntime, name: &str) -> Result<bool> {
    let output = Command::new(runtime_command(runtime))
        .args(["ps", "-q", "-f", &format!("name={}", name)])
        .output()
        .await?;
    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Stops and removes a container. Errors are ignored since it might not exist.
pub async fn stop_container(runtime: ContainerRuntime, name: &str) {
    let cmd = runtime_command(runtime);
    let _ = Command::new(cmd).args(["stop", name]).output().await;
    let _ = Command::new(cmd).args(["rm", name]).output().await;
}

/// Starts a fresh container with the given specification.
pub async fn start_container(runtime: ContainerRuntime, spec: &ContainerSpec) -> Result<()> {
    stop_container(runtime, spec.name).await;

    let output = Command::new(runtime_command(runtime))
        .args(container_run_args(spec))
        .output()
        .await?;

    if !output.status.success() {
        return Err(IntegrationError::ContainerFailed(format!(
            "Failed to start container '{}': {}",
            spec.name,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(())
}

/// Polls the container's HTTP port until it answers or the timeout passes.
pub async fn wait_for_health(spec: &ContainerSpec, timeout: Duration) -> Result<()> {
    let start = std::time::Instant::now();
    let url = format!("{}/", endpoint_url(spec));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .map_err(|e| IntegrationError::ContainerFailed(e.to_string()))?;

    while start.elapsed() < timeout {
        if let Ok(response) = client.get(&url).send().await {
            if response.status().as_u16() == spec.healthy_status {
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    Err(IntegrationError::ContainerNotHealthy {
        name: spec.name.to_string(),
        timeout_secs: timeout.as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_run_args() {
        let args = container_run_args(&DYNAMODB_SPEC);

        assert_eq!(
            args,
            vec![
                "run",
                "--name",
                "leaderboard-dynamodb",
                "-d",
                "-p",
                "8000:8000",
                "amazon/dynamodb-local:latest",
                "-jar",
                "DynamoDBLocal.jar",
                "-inMemory",
                "-sharedDb",
            ]
        );
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(endpoint_url(&DYNAMODB_SPEC), "http://localhost:8000");
    }
}
