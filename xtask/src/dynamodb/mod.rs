//! DynamoDB infrastructure management commands.

mod client;
mod config;
mod deploy;
mod error;
mod migrate;
mod planning;

use error::{DynamodbError, Result};

use crate::prelude::*;
use dialoguer::Confirm;

/// DynamoDB infrastructure management commands.
#[derive(Debug, clap::Parser)]
pub struct DynamodbCommand {
    #[command(subcommand)]
    pub action: DynamodbAction,
}

/// Available DynamoDB actions.
#[derive(Debug, clap::Subcommand)]
pub enum DynamodbAction {
    /// Deploy or destroy the leaderboard table.
    Deploy(DeployCommand),

    /// Move vote rows onto ISO-week partition keys.
    MigrateVotes(MigrateVotesCommand),
}

/// Deploy or update DynamoDB infrastructure.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Deploy or destroy the leaderboard DynamoDB table.

By default, this command creates the single table holding the weekly vote
ledger and the monthly tallies (pk/sk string keys, on-demand billing) and
enables time-to-live on the `ttl` attribute so stale tallies are purged.

The command shows a plan of changes before applying and asks for confirmation.

Environment variables:
  AWS_ENDPOINT_URL    - Use local DynamoDB (e.g., http://localhost:8000)
  AWS_REGION          - AWS region (defaults to us-east-1)
  AWS_PROFILE         - AWS profile to use for credentials")]
pub struct DeployCommand {
    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,

    /// Destroy the table instead of creating/updating.
    #[arg(long)]
    pub destroy: bool,

    /// Table name to use.
    #[arg(long, env = "LEADERBOARD_TABLE_NAME", default_value = config::DEFAULT_TABLE_NAME)]
    pub table_name: String,
}

/// Rewrite legacy vote partition keys.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Move vote rows onto ISO-week partition keys.

Scans every `vote*` partition and rewrites each row whose partition key does
not match the ISO week of its `votedAt` timestamp. A row whose target slot is
already taken (the voter already has a vote that week) is left in place and
reported.")]
pub struct MigrateVotesCommand {
    /// Only print the plan.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,

    /// Table name to use.
    #[arg(long, env = "LEADERBOARD_TABLE_NAME", default_value = config::DEFAULT_TABLE_NAME)]
    pub table_name: String,
}

/// Main entry point for dynamodb command.
pub async fn run(command: DynamodbCommand, global: crate::Global) -> Result<()> {
    match command.action {
        DynamodbAction::Deploy(deploy_cmd) => run_deploy(deploy_cmd, &global).await,
        DynamodbAction::MigrateVotes(migrate_cmd) => run_migrate(migrate_cmd, &global).await,
    }
}

fn confirm(prompt: &str, default: bool) -> Result<()> {
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| DynamodbError::AwsSdk(e.to_string()))?;

    if confirmed {
        Ok(())
    } else {
        Err(DynamodbError::UserCancelled)
    }
}

async fn run_deploy(cmd: DeployCommand, global: &crate::Global) -> Result<()> {
    let aws_config = client::AwsConfig::default();

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), aws_config.target_display());
        aprintln!();
    }

    let dynamo_client = client::create_client(&aws_config).await;
    let current_state = client::get_table_state(&dynamo_client, &cmd.table_name).await?;

    if cmd.destroy {
        let plan = planning::calculate_destroy_plan(current_state.as_ref(), &cmd.table_name);

        if !global.is_silent() {
            aprintln!("{}", p_y("Destroy Plan:"));
            for line in planning::format_destroy_plan(&plan) {
                aprintln!("  {}", p_r(&line));
            }
            aprintln!();
        }

        if matches!(plan, planning::DestroyPlan::AlreadyGone { .. }) {
            if !global.is_silent() {
                aprintln!("{}", p_g("Nothing to destroy."));
            }
            return Ok(());
        }

        if !cmd.force {
            confirm(
                "Are you sure you want to delete this table? ALL VOTES WILL BE LOST",
                false,
            )?;
        }

        if !global.is_silent() {
            aprintln!("{}", p_b("Deleting table..."));
        }

        deploy::execute_destroy_plan(&dynamo_client, &plan).await?;

        if !global.is_silent() {
            aprintln!("{}", p_g("Table destroyed successfully."));
        }
        return Ok(());
    }

    let table_config = config::leaderboard_table_config().with_table_name(&cmd.table_name);
    let plan = planning::calculate_deploy_plan(current_state.as_ref(), &table_config);

    if !global.is_silent() {
        aprintln!("{}", p_c("Deploy Plan:"));
        print_plan_lines(planning::format_deploy_plan(&plan));
        aprintln!();
    }

    if matches!(plan, planning::DeployPlan::NoChanges { .. }) {
        if !global.is_silent() {
            aprintln!("{}", p_g("Infrastructure is up to date."));
        }
        return Ok(());
    }

    if !cmd.force {
        confirm("Apply these changes?", true)?;
    }

    if !global.is_silent() {
        aprintln!("{}", p_b("Applying changes..."));
    }

    deploy::execute_deploy_plan(&dynamo_client, &plan).await?;

    if !global.is_silent() {
        aprintln!("{}", p_g("Infrastructure deployed successfully."));
    }

    Ok(())
}

async fn run_migrate(cmd: MigrateVotesCommand, global: &crate::Global) -> Result<()> {
    let aws_config = client::AwsConfig::default();

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), aws_config.target_display());
        aprintln!("{} {}", p_b("Table:"), cmd.table_name);
        aprintln!();
    }

    let dynamo_client = client::create_client(&aws_config).await;

    if client::get_table_state(&dynamo_client, &cmd.table_name)
        .await?
        .is_none()
    {
        return Err(DynamodbError::TableNotFound {
            table_name: cmd.table_name,
        });
    }

    let items = migrate::scan_vote_items(&dynamo_client, &cmd.table_name).await?;
    let rows = items
        .iter()
        .map(migrate::row_from_item)
        .filter(|row| {
            row.as_ref()
                .map(|r| migrate::is_vote_partition(&r.pk))
                .unwrap_or(true)
        })
        .collect::<Result<Vec<_>>>()?;

    let plan = migrate::plan_migration(&rows);

    if !global.is_silent() {
        aprintln!("{}", p_c("Migration Plan:"));
        print_plan_lines(migrate::format_migration_plan(&plan));
        aprintln!();
    }

    if cmd.dry_run || plan.relocations.is_empty() {
        if !global.is_silent() {
            aprintln!("{}", p_g("Nothing written."));
        }
        return Ok(());
    }

    if !cmd.force {
        confirm(
            &format!("Move {} vote rows?", plan.relocations.len()),
            true,
        )?;
    }

    let (moved, cancelled) =
        migrate::execute_migration(&dynamo_client, &cmd.table_name, &items, &plan).await?;

    if !global.is_silent() {
        aprintln!("{} {} rows moved.", p_g("Success:"), moved);
        if cancelled > 0 {
            aprintln!(
                "{} {} rows changed during the migration and were left in place.",
                p_y("Warning:"),
                cancelled
            );
        }
    }

    Ok(())
}

fn print_plan_lines(lines: Vec<String>) {
    for line in lines {
        if line.starts_with('+') {
            aprintln!("  {}", p_g(&line));
        } else if line.starts_with('-') || line.starts_with('!') {
            aprintln!("  {}", p_r(&line));
        } else if line.starts_with('~') {
            aprintln!("  {}", p_y(&line));
        } else {
            aprintln!("  {}", line);
        }
    }
}
