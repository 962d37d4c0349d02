use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::period::{VotingMonth, YearAndWeek};

/// An immutable vote fact. At most one exists per (voter, week).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedVote {
    pub period: YearAndWeek,
    pub voter_id: String,
    pub votee_id: String,
    /// Channel of the message that triggered the vote.
    pub channel_id: String,
    pub message_id: String,
    /// Informational only, the ledger is keyed by `period`.
    pub voted_at: DateTime<Utc>,
}

/// Running vote count of a votee for one voting month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTally {
    pub user_id: String,
    /// Last known display name, overwritten on every vote.
    pub name: String,
    pub count: u64,
    pub voting_period: VotingMonth,
    pub expires_at: DateTime<Utc>,
}

impl UserTally {
    /// Returns true if this tally belongs to `month`. A tally from any other
    /// month is stale and must be reset rather than incremented.
    pub fn is_current(&self, month: VotingMonth) -> bool {
        self.voting_period == month
    }

    /// Returns true once the store is free to purge this row.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub count: u64,
}

impl From<&UserTally> for LeaderboardEntry {
    fn from(tally: &UserTally) -> Self {
        Self {
            name: tally.name.clone(),
            count: tally.count,
        }
    }
}

/// The user receiving a vote, as resolved by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Votee {
    pub id: String,
    pub display_name: String,
}

/// A vote as submitted by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub voter_id: String,
    /// Author of the voted message; `None` when the platform could not
    /// resolve it.
    pub target: Option<Votee>,
    pub channel_id: String,
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
}

impl VoteRequest {
    /// Week the vote is bucketed into.
    pub fn period(&self) -> YearAndWeek {
        YearAndWeek::from_datetime(self.timestamp)
    }

    /// Checks the rules that need no store access and returns the votee.
    pub fn validate(&self) -> Result<&Votee, Rejection> {
        let votee = self.target.as_ref().ok_or(Rejection::TargetNotFound)?;
        if votee.id == self.voter_id {
            return Err(Rejection::SelfVote);
        }
        Ok(votee)
    }

    /// Builds the ledger fact for this request.
    pub fn to_recorded_vote(&self, votee: &Votee) -> RecordedVote {
        RecordedVote {
            period: self.period(),
            voter_id: self.voter_id.clone(),
            votee_id: votee.id.clone(),
            channel_id: self.channel_id.clone(),
            message_id: self.message_id.clone(),
            voted_at: self.timestamp,
        }
    }
}

/// Why a vote was not counted. These are expected outcomes shown to the
/// voter, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    TargetNotFound,
    SelfVote,
    AlreadyVoted,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::TargetNotFound => "No messages found :(",
            Rejection::SelfVote => "You cannot vote for yourself",
            Rejection::AlreadyVoted => "You have already voted this week",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of a counted vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub content: String,
    pub tally: UserTally,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// What the vote submission trigger gets back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VoteOutcome {
    Accepted(VoteReceipt),
    Rejected { reason: Rejection },
}

impl VoteOutcome {
    /// Text to show the voter.
    pub fn content(&self) -> &str {
        match self {
            VoteOutcome::Accepted(receipt) => &receipt.content,
            VoteOutcome::Rejected { reason } => reason.message(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, VoteOutcome::Accepted(_))
    }
}

/// Message handed to the notification channel when a month closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub content: String,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Votes a user received for the same message, collapsed into one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteMessageGroup {
    pub channel_id: String,
    pub message_id: String,
    pub count: usize,
}
