//! CLI command definitions.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use leaderboard_core::period::VotingMonth;
use leaderboard_core::vote::{VoteRequest, Votee};

use crate::config::{Backend, Config};

/// Weekly votes and a monthly leaderboard for chat bots.
#[derive(Debug, Parser)]
#[command(name = "leaderboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// DynamoDB table name.
    #[arg(long, global = true, env = "LEADERBOARD_TABLE_NAME")]
    pub table_name: Option<String>,

    /// Storage backend.
    #[arg(long, global = true, env = "LEADERBOARD_BACKEND", ignore_case = true)]
    pub backend: Option<Backend>,

    /// Output format.
    #[arg(long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Applies flags on top of the environment configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(table_name) = &self.table_name {
            config.table_name = table_name.clone();
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Cast a vote for the author of a message.
    Vote(VoteArgs),
    /// Show the current leaderboard.
    Show,
    /// Show the messages a user received votes for in a month.
    History(HistoryArgs),
    /// Announce the final leaderboard of the month that just ended.
    CloseMonth {
        /// Instant the job runs at (RFC 3339, defaults to now).
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Print the vote week and tally month of an instant.
    Period {
        /// Instant to inspect (RFC 3339, defaults to now).
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Args)]
pub struct VoteArgs {
    /// Id of the user casting the vote.
    #[arg(long)]
    pub voter: String,
    /// Id of the message author. Omit when the message could not be found.
    #[arg(long)]
    pub votee: Option<String>,
    /// Display name of the message author (defaults to the id).
    #[arg(long)]
    pub name: Option<String>,
    /// Channel of the voted message.
    #[arg(long)]
    pub channel: String,
    /// Id of the voted message.
    #[arg(long)]
    pub message: String,
    /// Instant of the vote (RFC 3339, defaults to now).
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
}

impl VoteArgs {
    pub fn into_request(self, now: DateTime<Utc>) -> VoteRequest {
        let target = self.votee.map(|id| Votee {
            display_name: self.name.unwrap_or_else(|| id.clone()),
            id,
        });

        VoteRequest {
            voter_id: self.voter,
            target,
            channel_id: self.channel,
            message_id: self.message,
            timestamp: self.at.unwrap_or(now),
        }
    }
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Id of the user.
    #[arg(long)]
    pub user: String,
    /// Display name of the user (defaults to the id).
    #[arg(long)]
    pub name: Option<String>,
    /// Month to show, as YYYY-MM (defaults to the current month).
    #[arg(long)]
    pub month: Option<VotingMonth>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("leaderboard").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_vote_args_into_request() {
        let cli = parse(&[
            "vote",
            "--voter",
            "voter456",
            "--votee",
            "votee123",
            "--name",
            "VoteeUser",
            "--channel",
            "chan001",
            "--message",
            "msg789",
            "--at",
            "2025-06-16T10:30:00Z",
        ]);
        let Commands::Vote(args) = cli.command else {
            panic!("expected vote command");
        };

        let request = args.into_request(Utc::now());

        assert_eq!(request.voter_id, "voter456");
        assert_eq!(
            request.target,
            Some(Votee {
                id: "votee123".to_string(),
                display_name: "VoteeUser".to_string()
            })
        );
        assert_eq!(request.timestamp.to_rfc3339(), "2025-06-16T10:30:00+00:00");
    }

    #[test]
    fn test_vote_without_votee_has_no_target() {
        let cli = parse(&["vote", "--voter", "V1", "--channel", "c", "--message", "m"]);
        let Commands::Vote(args) = cli.command else {
            panic!("expected vote command");
        };

        assert_eq!(args.into_request(Utc::now()).target, None);
    }

    #[test]
    fn test_history_month_is_validated() {
        let cli = parse(&["history", "--user", "A", "--month", "2025-06"]);
        let Commands::History(args) = cli.command else {
            panic!("expected history command");
        };
        assert_eq!(args.month, Some(VotingMonth::new(2025, 6).unwrap()));

        let result = Cli::try_parse_from(["leaderboard", "history", "--user", "A", "--month", "June"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_override_config() {
        let cli = parse(&["show", "--backend", "inmemory", "--table-name", "Other"]);
        let mut config = Config::from_lookup(|_| None);

        cli.apply_to(&mut config);

        assert_eq!(config.backend, Backend::Inmemory);
        assert_eq!(config.table_name, "Other");
    }

    #[test]
    fn test_backend_flag_ignores_case() {
        let cli = parse(&["show", "--backend", "DynamoDB"]);
        assert_eq!(cli.backend, Some(Backend::Dynamodb));

        let cli = parse(&["show", "--backend", "INMEMORY"]);
        assert_eq!(cli.backend, Some(Backend::Inmemory));
    }
}
