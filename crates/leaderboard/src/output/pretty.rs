//! Pretty output formatting.

use leaderboard_core::vote::{
    format_leaderboard, messages, vote_count_label, LeaderboardEntry, VoteOutcome,
};

use super::PeriodReport;
use crate::service::{ClosedMonth, VoteHistory};

/// Format a leaderboard for display.
pub fn format_leaderboard_table(entries: &[LeaderboardEntry]) -> String {
    if entries.is_empty() {
        return messages::NO_VOTES_THIS_MONTH.to_string();
    }
    let mut output = format!("LEADERBOARD ({})\n", entries.len());
    output.push_str(&"-".repeat(40));
    for line in format_leaderboard(entries) {
        output.push_str(&format!("\n{}", line));
    }
    output
}

/// Format the reply to a vote.
pub fn format_vote_outcome(outcome: &VoteOutcome) -> String {
    match outcome {
        VoteOutcome::Accepted(receipt) => format!(
            "{}\n\n{}",
            receipt.content,
            format_leaderboard_table(&receipt.leaderboard)
        ),
        VoteOutcome::Rejected { reason } => reason.to_string(),
    }
}

/// Format a user's vote history for display.
pub fn format_history(history: &VoteHistory) -> String {
    if history.groups.is_empty() {
        return messages::no_votes_for(&history.name);
    }
    let mut output = format!(
        "{} ({}, {})\n",
        messages::history_title(&history.name),
        history.month,
        vote_count_label(history.total)
    );
    output.push_str(&"-".repeat(40));
    for group in &history.groups {
        output.push_str(&format!(
            "\n{}\n  Channel: {}\n  Message: {}",
            vote_count_label(group.count),
            group.channel_id,
            group.message_id
        ));
    }
    output
}

/// Format the result of a period close.
pub fn format_closed_month(closed: &ClosedMonth) -> String {
    let mut output = format!("Closed {}\n{}", closed.month, closed.announcement.content);
    for line in format_leaderboard(&closed.announcement.leaderboard) {
        output.push_str(&format!("\n{}", line));
    }
    output
}

/// Format a period report for display.
pub fn format_period(report: &PeriodReport) -> String {
    format!(
        "{}\n  Week: {}\n  Month: {}\n  Tally expires: {}",
        report.at.to_rfc3339(),
        report.week_label,
        report.month,
        report.tally_expires_at.to_rfc3339()
    )
}

#[cfg(test)]
mod tests {
    use leaderboard_core::period::VotingMonth;
    use leaderboard_core::vote::{Announcement, Rejection, VoteMessageGroup};

    use super::*;

    fn entry(name: &str, count: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.to_string(),
            count,
        }
    }

    #[test]
    fn test_empty_leaderboard() {
        assert_eq!(format_leaderboard_table(&[]), "No votes this month.");
    }

    #[test]
    fn test_leaderboard_table() {
        let output = format_leaderboard_table(&[entry("Bob", 5), entry("Amy", 1)]);
        assert!(output.starts_with("LEADERBOARD (2)\n"));
        assert!(output.ends_with("1. Bob: 5\n2. Amy: 1"));
    }

    #[test]
    fn test_rejected_vote() {
        let outcome = VoteOutcome::Rejected {
            reason: Rejection::AlreadyVoted,
        };
        assert_eq!(
            format_vote_outcome(&outcome),
            "You have already voted this week"
        );
    }

    #[test]
    fn test_history_empty() {
        let history = VoteHistory {
            user_id: "A".to_string(),
            name: "Alice".to_string(),
            month: VotingMonth::new(2025, 6).unwrap(),
            total: 0,
            groups: Vec::new(),
        };
        assert_eq!(format_history(&history), "No votes for Alice");
    }

    #[test]
    fn test_history_groups() {
        let history = VoteHistory {
            user_id: "A".to_string(),
            name: "Alice".to_string(),
            month: VotingMonth::new(2025, 6).unwrap(),
            total: 3,
            groups: vec![
                VoteMessageGroup {
                    channel_id: "chan001".to_string(),
                    message_id: "m1".to_string(),
                    count: 2,
                },
                VoteMessageGroup {
                    channel_id: "chan001".to_string(),
                    message_id: "m2".to_string(),
                    count: 1,
                },
            ],
        };

        let output = format_history(&history);

        assert!(output.starts_with("Votes for Alice (2025-06, 3 votes)"));
        assert!(output.contains("2 votes\n  Channel: chan001\n  Message: m1"));
        assert!(output.contains("1 vote\n  Channel: chan001\n  Message: m2"));
    }

    #[test]
    fn test_closed_month() {
        let closed = ClosedMonth {
            month: VotingMonth::new(2025, 6).unwrap(),
            announcement: Announcement {
                content: messages::MONTH_CLOSED.to_string(),
                leaderboard: vec![entry("Alice", 4)],
            },
        };

        assert_eq!(
            format_closed_month(&closed),
            "Closed 2025-06\nThe month has ended! Here are the final results:\n1. Alice: 4"
        );
    }
}
