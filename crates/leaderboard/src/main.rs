use std::process::ExitCode;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leaderboard::cli::{Cli, Commands, OutputFormat};
use leaderboard::error::CloseError;
use leaderboard::output::{format_output, pretty, report_store_error, PeriodReport};
use leaderboard::{AppState, Config};
use leaderboard_core::period::VotingMonth;
use leaderboard_core::storage::RepositoryError;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    let mut config = Config::from_env();
    cli.apply_to(&mut config);
    tracing::debug!(?config, "Loaded configuration");

    let format = cli.format;
    let now = Utc::now();

    match cli.command {
        Commands::Period { at } => {
            let report = PeriodReport::at(at.unwrap_or(now))?;
            match format {
                OutputFormat::Json => println!("{}", format_output(&report, format)),
                OutputFormat::Pretty => println!("{}", pretty::format_period(&report)),
            }
        }
        Commands::Vote(args) => {
            let state = AppState::from_config(&config).await?;
            let request = args.into_request(now);
            let outcome = match state.cast_vote(&request).await {
                Ok(outcome) => outcome,
                Err(err) => return store_failure(&err),
            };
            match format {
                OutputFormat::Json => println!("{}", format_output(&outcome, format)),
                OutputFormat::Pretty => println!("{}", pretty::format_vote_outcome(&outcome)),
            }
        }
        Commands::Show => {
            let state = AppState::from_config(&config).await?;
            let leaderboard = match state.current_leaderboard().await {
                Ok(leaderboard) => leaderboard,
                Err(err) => return store_failure(&err),
            };
            match format {
                OutputFormat::Json => println!("{}", format_output(&leaderboard, format)),
                OutputFormat::Pretty => {
                    println!("{}", pretty::format_leaderboard_table(&leaderboard))
                }
            }
        }
        Commands::History(args) => {
            let state = AppState::from_config(&config).await?;
            let month = args.month.unwrap_or_else(|| VotingMonth::from_datetime(now));
            let name = args.name.unwrap_or_else(|| args.user.clone());
            let history = match state.vote_history(month, &args.user, &name).await {
                Ok(history) => history,
                Err(err) => return store_failure(&err),
            };
            match format {
                OutputFormat::Json => println!("{}", format_output(&history, format)),
                OutputFormat::Pretty => println!("{}", pretty::format_history(&history)),
            }
        }
        Commands::CloseMonth { at } => {
            let state = AppState::from_config(&config).await?;
            let closed = match state.close_month(at.unwrap_or(now)).await {
                Ok(closed) => closed,
                Err(CloseError::Repository(err)) => return store_failure(&err),
                Err(err) => return Err(err.into()),
            };
            match format {
                OutputFormat::Json => println!("{}", format_output(&closed, format)),
                OutputFormat::Pretty => println!("{}", pretty::format_closed_month(&closed)),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Prints the generic sentence for a store error and fails the process.
fn store_failure(err: &RepositoryError) -> Result<ExitCode> {
    report_store_error(err, &mut std::io::stderr())?;
    Ok(ExitCode::FAILURE)
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "leaderboard=info,leaderboard_core=info".into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
