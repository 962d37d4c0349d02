//! Moves vote rows onto ISO-week partition keys.
//!
//! Rows written under the old "days since January 1st / 7" week numbers sit
//! in partitions that disagree with the ISO week of their `votedAt`. Each one
//! is rewritten under `vote{ISO week}` with a delete+put transaction.

use std::collections::{HashMap, HashSet};

use aws_sdk_dynamodb::types::{AttributeValue, Delete, Put, TransactWriteItem};
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use leaderboard_core::period::YearAndWeek;

use super::error::{DynamodbError, Result};

const VOTE_PREFIX: &str = "vote";
const TALLY_PARTITION: &str = "votes";
const SCAN_FILTER: &str = "begins_with(pk, :vote) AND pk <> :votes";

type Item = HashMap<String, AttributeValue>;

/// The parts of a ledger row that decide where it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRow {
    pub pk: String,
    pub sk: String,
    pub voted_at: DateTime<Utc>,
}

impl VoteRow {
    /// Partition key the row should live under.
    pub fn target_pk(&self) -> String {
        format!("{VOTE_PREFIX}{}", YearAndWeek::from_datetime(self.voted_at))
    }
}

/// A row to rewrite under a new partition key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub sk: String,
    pub from_pk: String,
    pub to_pk: String,
}

/// Outcome of planning over every scanned row.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    pub relocations: Vec<Relocation>,
    /// Rows whose target slot is already taken. They stay where they are.
    pub conflicts: Vec<Relocation>,
    pub already_correct: usize,
}

/// Whether a partition key belongs to the vote ledger.
pub fn is_vote_partition(pk: &str) -> bool {
    pk.starts_with(VOTE_PREFIX) && pk != TALLY_PARTITION
}

/// Pure function: decide which rows move.
///
/// A voter can hold one row per ISO week, so a relocation whose target is
/// taken by a correct row or an earlier relocation is a conflict.
pub fn plan_migration(rows: &[VoteRow]) -> MigrationPlan {
    let mut plan = MigrationPlan::default();

    let mut occupied: HashSet<(String, String)> = rows
        .iter()
        .filter(|row| row.pk == row.target_pk())
        .map(|row| (row.pk.clone(), row.sk.clone()))
        .collect();
    plan.already_correct = occupied.len();

    let mut misplaced: Vec<&VoteRow> = rows.iter().filter(|row| row.pk != row.target_pk()).collect();
    misplaced.sort_by(|a, b| a.voted_at.cmp(&b.voted_at).then_with(|| a.sk.cmp(&b.sk)));

    for row in misplaced {
        let relocation = Relocation {
            sk: row.sk.clone(),
            from_pk: row.pk.clone(),
            to_pk: row.target_pk(),
        };
        if occupied.insert((relocation.to_pk.clone(), relocation.sk.clone())) {
            plan.relocations.push(relocation);
        } else {
            plan.conflicts.push(relocation);
        }
    }

    plan
}

/// Pure function: Format a migration plan for display.
pub fn format_migration_plan(plan: &MigrationPlan) -> Vec<String> {
    let mut lines = Vec::new();
    for relocation in &plan.relocations {
        lines.push(format!(
            "~ {}: {} -> {}",
            relocation.sk, relocation.from_pk, relocation.to_pk
        ));
    }
    for conflict in &plan.conflicts {
        lines.push(format!(
            "! {}: {} -> {} (target taken, skipped)",
            conflict.sk, conflict.from_pk, conflict.to_pk
        ));
    }
    lines.push(format!(
        "= {} rows already on ISO-week keys",
        plan.already_correct
    ));
    lines
}

/// Reads the routing fields out of a scanned item.
pub fn row_from_item(item: &Item) -> Result<VoteRow> {
    let string = |name: &str| item.get(name).and_then(|v| v.as_s().ok()).cloned();

    let pk = string("pk").unwrap_or_default();
    let sk = string("sk").unwrap_or_default();

    let invalid = |reason: String| DynamodbError::InvalidVoteRow {
        pk: pk.clone(),
        sk: sk.clone(),
        reason,
    };

    let voted_at = string("votedAt").ok_or_else(|| invalid("missing votedAt".to_string()))?;
    let voted_at = DateTime::parse_from_rfc3339(&voted_at)
        .map_err(|e| invalid(format!("votedAt: {e}")))?
        .with_timezone(&Utc);

    Ok(VoteRow { pk, sk, voted_at })
}

/// Scans every ledger partition.
pub async fn scan_vote_items(client: &Client, table_name: &str) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    let mut start_key: Option<Item> = None;

    loop {
        let output = client
            .scan()
            .table_name(table_name)
            .filter_expression(SCAN_FILTER)
            .expression_attribute_values(":vote", AttributeValue::S(VOTE_PREFIX.to_string()))
            .expression_attribute_values(":votes", AttributeValue::S(TALLY_PARTITION.to_string()))
            .set_exclusive_start_key(start_key.take())
            .send()
            .await
            .map_err(|e| DynamodbError::AwsSdk(e.to_string()))?;

        items.extend(output.items.unwrap_or_default());

        match output.last_evaluated_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => break,
        }
    }

    Ok(items)
}

/// Applies each relocation as a delete+put transaction.
///
/// Returns how many rows moved and how many transactions were cancelled
/// because a row changed under us.
pub async fn execute_migration(
    client: &Client,
    table_name: &str,
    items: &[Item],
    plan: &MigrationPlan,
) -> Result<(usize, usize)> {
    let by_key: HashMap<(String, String), &Item> = items
        .iter()
        .filter_map(|item| {
            let pk = item.get("pk")?.as_s().ok()?.clone();
            let sk = item.get("sk")?.as_s().ok()?.clone();
            Some(((pk, sk), item))
        })
        .collect();

    let mut moved = 0;
    let mut cancelled = 0;

    for relocation in &plan.relocations {
        let Some(item) = by_key.get(&(relocation.from_pk.clone(), relocation.sk.clone())) else {
            continue;
        };

        let mut new_item = (*item).clone();
        new_item.insert("pk".to_string(), AttributeValue::S(relocation.to_pk.clone()));

        let delete = Delete::builder()
            .table_name(table_name)
            .key("pk", AttributeValue::S(relocation.from_pk.clone()))
            .key("sk", AttributeValue::S(relocation.sk.clone()))
            .condition_expression("attribute_exists(pk)")
            .build()
            .map_err(|e| DynamodbError::AwsSdk(e.to_string()))?;

        let put = Put::builder()
            .table_name(table_name)
            .set_item(Some(new_item))
            .condition_expression("attribute_not_exists(pk)")
            .build()
            .map_err(|e| DynamodbError::AwsSdk(e.to_string()))?;

        let result = client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder().delete(delete).build())
            .transact_items(TransactWriteItem::builder().put(put).build())
            .send()
            .await;

        match result {
            Ok(_) => moved += 1,
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_transaction_canceled_exception() {
                    cancelled += 1;
                } else {
                    return Err(DynamodbError::AwsSdk(service_error.to_string()));
                }
            }
        }
    }

    Ok((moved, cancelled))
}
