//! DynamoDB repository implementation.
//!
//! Implements the repository traits from `leaderboard_core::storage` using DynamoDB.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};

use leaderboard_core::period::{VotingMonth, YearAndWeek};
use leaderboard_core::storage::{RepositoryError, Result, TallyRepository, VoteRepository};
use leaderboard_core::vote::{RecordedVote, UserTally};

use super::conversions::{
    self, item_to_tally, item_to_vote, tallies_from_items, tally_from_item, ttl_value,
    vote_to_item,
};
use super::error::{
    is_conditional_check_failed, map_get_item_error, map_put_item_error, map_query_error,
    map_timeout_error, map_update_item_error,
};
use super::keys;

/// Rounds of increment-then-reset before `apply_vote` gives up.
const MAX_TALLY_ATTEMPTS: u32 = 3;

/// Increment a tally of the active month.
const INCREMENT_EXPRESSION: &str = "SET #count = #count + :one, #name = :name, #ttl = :ttl";
const INCREMENT_CONDITION: &str = "#period = :current";

/// Start a tally over for the active month.
///
/// A comparison against a missing attribute is false, so rows without a
/// period need their own clause.
const RESET_EXPRESSION: &str =
    "SET #count = :one, #name = :name, #period = :current, #ttl = :ttl";
const RESET_CONDITION: &str =
    "attribute_not_exists(pk) OR attribute_not_exists(#period) OR #period <> :current";

/// DynamoDB-based repository implementation.
///
/// Every call to DynamoDB is bounded by `timeout`.
#[derive(Debug, Clone)]
pub struct DynamoDbRepository {
    client: Client,
    table_name: String,
    timeout: Duration,
}

impl DynamoDbRepository {
    /// Creates a new repository with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            timeout,
        }
    }

    /// Creates a repository using the AWS default credential chain.
    ///
    /// `endpoint_url` points the client at a local DynamoDB.
    pub async fn connect(
        table_name: impl Into<String>,
        region: &str,
        endpoint_url: Option<&str>,
        timeout: Duration,
    ) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()));

        if let Some(endpoint) = endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config), table_name, timeout)
    }

    /// Runs a store call under the configured timeout.
    async fn bounded<T>(&self, operation: &str, call: impl Future<Output = T>) -> Result<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| map_timeout_error(operation, self.timeout))
    }

    /// Queries a whole partition, following `LastEvaluatedKey` until exhausted.
    async fn query_partition(
        &self,
        pk: String,
        filter: Option<(&str, &str, AttributeValue)>,
    ) -> Result<Vec<HashMap<String, AttributeValue>>> {
        let mut items = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let mut request = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("pk = :pk")
                .expression_attribute_values(":pk", AttributeValue::S(pk.clone()))
                .set_exclusive_start_key(start_key.take());

            if let Some((expression, placeholder, value)) = filter.clone() {
                request = request
                    .filter_expression(expression)
                    .expression_attribute_values(placeholder, value);
            }

            let output = self
                .bounded("Query", request.send())
                .await?
                .map_err(map_query_error)?;

            tracing::debug!(
                pk = %pk,
                page_items = output.items().len(),
                "Queried partition page"
            );

            items.extend(output.items.unwrap_or_default());

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }

    /// Tries to increment a tally of the `current` month.
    ///
    /// Returns `None` when the row is missing or belongs to another month.
    async fn increment_tally(
        &self,
        votee_id: &str,
        display_name: &str,
        current: VotingMonth,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<UserTally>> {
        let call = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(keys::PK, AttributeValue::S(keys::tally_pk()))
            .key(keys::SK, AttributeValue::S(keys::tally_sk(votee_id)))
            .update_expression(INCREMENT_EXPRESSION)
            .condition_expression(INCREMENT_CONDITION)
            .expression_attribute_names("#count", conversions::COUNT)
            .expression_attribute_names("#name", conversions::NAME)
            .expression_attribute_names("#ttl", conversions::TTL)
            .expression_attribute_names("#period", conversions::VOTING_PERIOD)
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .expression_attribute_values(":name", AttributeValue::S(display_name.to_string()))
            .expression_attribute_values(":ttl", ttl_value(expires_at))
            .expression_attribute_values(":current", AttributeValue::S(current.to_string()))
            .return_values(ReturnValue::AllNew)
            .send();

        match self.bounded("UpdateItem", call).await? {
            Ok(output) => tally_from_attributes(output.attributes).map(Some),
            Err(err) if is_conditional_check_failed(&err) => Ok(None),
            Err(err) => Err(map_update_item_error(err, "UserTally", votee_id)),
        }
    }

    /// Tries to start a tally over at 1 for the `current` month.
    ///
    /// Returns `None` when a concurrent vote already moved the row into
    /// `current`.
    async fn reset_tally(
        &self,
        votee_id: &str,
        display_name: &str,
        current: VotingMonth,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<UserTally>> {
        let call = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(keys::PK, AttributeValue::S(keys::tally_pk()))
            .key(keys::SK, AttributeValue::S(keys::tally_sk(votee_id)))
            .update_expression(RESET_EXPRESSION)
            .condition_expression(RESET_CONDITION)
            .expression_attribute_names("#count", conversions::COUNT)
            .expression_attribute_names("#name", conversions::NAME)
            .expression_attribute_names("#ttl", conversions::TTL)
            .expression_attribute_names("#period", conversions::VOTING_PERIOD)
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .expression_attribute_values(":name", AttributeValue::S(display_name.to_string()))
            .expression_attribute_values(":ttl", ttl_value(expires_at))
            .expression_attribute_values(":current", AttributeValue::S(current.to_string()))
            .return_values(ReturnValue::AllNew)
            .send();

        match self.bounded("UpdateItem", call).await? {
            Ok(output) => tally_from_attributes(output.attributes).map(Some),
            Err(err) if is_conditional_check_failed(&err) => Ok(None),
            Err(err) => Err(map_update_item_error(err, "UserTally", votee_id)),
        }
    }
}

fn tally_from_attributes(
    attributes: Option<HashMap<String, AttributeValue>>,
) -> Result<UserTally> {
    let item = attributes.ok_or_else(|| {
        RepositoryError::InvalidData("UpdateItem returned no attributes".to_string())
    })?;
    item_to_tally(&item)
}

// ============================================================================
// VoteRepository implementation
// ============================================================================

#[async_trait]
impl VoteRepository for DynamoDbRepository {
    async fn has_voted(&self, voter_id: &str, period: YearAndWeek) -> Result<bool> {
        let call = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(keys::PK, AttributeValue::S(keys::vote_pk(period)))
            .key(keys::SK, AttributeValue::S(keys::vote_sk(voter_id)))
            .consistent_read(true)
            .send();

        let result = self
            .bounded("GetItem", call)
            .await?
            .map_err(map_get_item_error)?;

        Ok(result.item.is_some())
    }

    async fn record_vote(&self, vote: &RecordedVote) -> Result<()> {
        let call = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(vote_to_item(vote)))
            .condition_expression("attribute_not_exists(pk)")
            .send();

        self.bounded("PutItem", call).await?.map_err(|e| {
            map_put_item_error(
                e,
                "RecordedVote",
                format!("{}/{}", vote.period, vote.voter_id),
            )
        })?;

        tracing::debug!(
            period = %vote.period,
            voter_id = %vote.voter_id,
            "Recorded vote"
        );

        Ok(())
    }

    async fn get_votes_for_votee(
        &self,
        period: YearAndWeek,
        votee_id: &str,
    ) -> Result<Vec<RecordedVote>> {
        let filter = (
            "voteeId = :votee",
            ":votee",
            AttributeValue::S(votee_id.to_string()),
        );
        let items = self
            .query_partition(keys::vote_pk(period), Some(filter))
            .await?;

        items.iter().map(item_to_vote).collect()
    }
}

// ============================================================================
// TallyRepository implementation
// ============================================================================

#[async_trait]
impl TallyRepository for DynamoDbRepository {
    async fn get_tally(&self, user_id: &str) -> Result<Option<UserTally>> {
        let call = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(keys::PK, AttributeValue::S(keys::tally_pk()))
            .key(keys::SK, AttributeValue::S(keys::tally_sk(user_id)))
            .send();

        let result = self
            .bounded("GetItem", call)
            .await?
            .map_err(map_get_item_error)?;

        match result.item {
            Some(item) => tally_from_item(&item),
            None => Ok(None),
        }
    }

    async fn apply_vote(
        &self,
        votee_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<UserTally> {
        let current = VotingMonth::from_datetime(now);
        let expires_at = current
            .expires_at()
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;

        for attempt in 1..=MAX_TALLY_ATTEMPTS {
            if let Some(tally) = self
                .increment_tally(votee_id, display_name, current, expires_at)
                .await?
            {
                return Ok(tally);
            }

            if let Some(tally) = self
                .reset_tally(votee_id, display_name, current, expires_at)
                .await?
            {
                return Ok(tally);
            }

            tracing::warn!(votee_id, attempt, "Tally reset lost to a concurrent vote");
        }

        Err(RepositoryError::Conflict {
            entity_type: "UserTally",
            id: votee_id.to_string(),
            attempts: MAX_TALLY_ATTEMPTS,
        })
    }

    async fn list_tallies(&self) -> Result<Vec<UserTally>> {
        let items = self.query_partition(keys::tally_pk(), None).await?;
        Ok(tallies_from_items(&items))
    }
}
