//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and domain types.
//! These are testable in isolation without DynamoDB access.

use std::collections::HashMap;
use std::str::FromStr;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use leaderboard_core::period::VotingMonth;
use leaderboard_core::storage::RepositoryError;
use leaderboard_core::vote::{RecordedVote, UserTally};

use super::keys;

// ============================================================================
// Attribute names
// ============================================================================

pub const VOTEE_ID: &str = "voteeId";
pub const CHANNEL_ID: &str = "channelId";
pub const MESSAGE_ID: &str = "messageId";
pub const VOTED_AT: &str = "votedAt";

pub const NAME: &str = "name";
pub const COUNT: &str = "count";
pub const VOTING_PERIOD: &str = "votingPeriod";
pub const TTL: &str = "ttl";

// ============================================================================
// Vote conversions
// ============================================================================

/// Convert a RecordedVote to DynamoDB item.
pub fn vote_to_item(vote: &RecordedVote) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();

    // Keys
    item.insert(
        keys::PK.to_string(),
        AttributeValue::S(keys::vote_pk(vote.period)),
    );
    item.insert(
        keys::SK.to_string(),
        AttributeValue::S(keys::vote_sk(&vote.voter_id)),
    );

    // Data
    item.insert(VOTEE_ID.to_string(), AttributeValue::S(vote.votee_id.clone()));
    item.insert(
        CHANNEL_ID.to_string(),
        AttributeValue::S(vote.channel_id.clone()),
    );
    item.insert(
        MESSAGE_ID.to_string(),
        AttributeValue::S(vote.message_id.clone()),
    );
    item.insert(
        VOTED_AT.to_string(),
        AttributeValue::S(vote.voted_at.to_rfc3339()),
    );

    item
}

/// Convert a DynamoDB item to RecordedVote.
///
/// The week and the voter are read back from the keys.
pub fn item_to_vote(item: &HashMap<String, AttributeValue>) -> Result<RecordedVote, RepositoryError> {
    let pk = get_string(item, keys::PK)?;
    let period = keys::period_from_vote_pk(&pk)
        .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid vote partition: {pk}")))?;

    Ok(RecordedVote {
        period,
        voter_id: get_user_id(item)?,
        votee_id: get_string(item, VOTEE_ID)?,
        channel_id: get_string(item, CHANNEL_ID)?,
        message_id: get_string(item, MESSAGE_ID)?,
        voted_at: get_datetime(item, VOTED_AT)?,
    })
}

// ============================================================================
// Tally conversions
// ============================================================================

/// Convert a DynamoDB item to UserTally.
pub fn item_to_tally(item: &HashMap<String, AttributeValue>) -> Result<UserTally, RepositoryError> {
    let voting_period: VotingMonth = get_string(item, VOTING_PERIOD)?
        .parse()
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid {VOTING_PERIOD}: {e}")))?;

    Ok(UserTally {
        user_id: get_user_id(item)?,
        name: get_string(item, NAME)?,
        count: get_number(item, COUNT)?,
        voting_period,
        expires_at: get_epoch(item, TTL)?,
    })
}

/// Like [`item_to_tally`], but a row without `votingPeriod` yields `None`.
///
/// Rows written before tallies carried a period have only `name` and
/// `count`. They belong to no month and are treated as absent.
pub fn tally_from_item(
    item: &HashMap<String, AttributeValue>,
) -> Result<Option<UserTally>, RepositoryError> {
    if !item.contains_key(VOTING_PERIOD) {
        return Ok(None);
    }
    item_to_tally(item).map(Some)
}

/// Converts a page of tally rows, skipping rows that cannot be read.
pub fn tallies_from_items(items: &[HashMap<String, AttributeValue>]) -> Vec<UserTally> {
    items
        .iter()
        .filter_map(|item| match tally_from_item(item) {
            Ok(Some(tally)) => Some(tally),
            Ok(None) => {
                tracing::warn!(
                    sk = item.get(keys::SK).and_then(|v| v.as_s().ok()).map(String::as_str),
                    "Skipping tally row without {VOTING_PERIOD}"
                );
                None
            }
            Err(err) => {
                tracing::warn!(
                    sk = item.get(keys::SK).and_then(|v| v.as_s().ok()).map(String::as_str),
                    error = %err,
                    "Skipping unreadable tally row"
                );
                None
            }
        })
        .collect()
}

/// Epoch seconds attribute for a TTL instant.
pub fn ttl_value(expires_at: DateTime<Utc>) -> AttributeValue {
    AttributeValue::N(expires_at.timestamp().to_string())
}

// ============================================================================
// Helper functions
// ============================================================================

/// Get a required string attribute.
fn get_string(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get a required number attribute.
fn get_number<T: FromStr>(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<T, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get a required datetime attribute (RFC 3339 format).
fn get_datetime(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    let s = get_string(item, key)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid datetime {}: {}", key, e)))
}

/// Get a required epoch seconds attribute.
fn get_epoch(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    let seconds: i64 = get_number(item, key)?;
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid timestamp {}: {}", key, seconds)))
}

/// Get the user id encoded in the sort key.
fn get_user_id(item: &HashMap<String, AttributeValue>) -> Result<String, RepositoryError> {
    let sk = get_string(item, keys::SK)?;
    keys::user_id_from_sk(&sk)
        .map(|id| id.to_string())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid user sort key: {sk}")))
}
