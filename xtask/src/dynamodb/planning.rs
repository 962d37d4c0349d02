//! Pure functions for calculating deployment plans (Functional Core).

use super::config::TableConfig;

/// Represents the current state of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub status: TableStatus,
    /// Attribute TTL is enabled on, if any.
    pub ttl_attribute: Option<String>,
}

/// Table status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
}

/// Planned changes for deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployPlan {
    /// Table doesn't exist, needs to be created with TTL.
    CreateTable { config: TableConfig },
    /// Table exists without TTL on the expected attribute.
    EnableTtl {
        table_name: String,
        attribute: String,
        /// TTL currently enabled on another attribute.
        replaces: Option<String>,
    },
    /// Table is up to date, no changes needed.
    NoChanges { table_name: String },
}

/// Plan for destroying a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyPlan {
    /// Table exists and will be deleted.
    DeleteTable { table_name: String },
    /// Table doesn't exist, nothing to do.
    AlreadyGone { table_name: String },
}

/// Pure function: Calculate what changes are needed to reach desired state.
pub fn calculate_deploy_plan(current: Option<&TableState>, desired: &TableConfig) -> DeployPlan {
    match current {
        None => DeployPlan::CreateTable {
            config: desired.clone(),
        },
        Some(state) if state.ttl_attribute.as_deref() == Some(desired.ttl_attribute.as_str()) => {
            DeployPlan::NoChanges {
                table_name: desired.table_name.clone(),
            }
        }
        Some(state) => DeployPlan::EnableTtl {
            table_name: desired.table_name.clone(),
            attribute: desired.ttl_attribute.clone(),
            replaces: state.ttl_attribute.clone(),
        },
    }
}

/// Pure function: Calculate destroy plan.
pub fn calculate_destroy_plan(current: Option<&TableState>, table_name: &str) -> DestroyPlan {
    match current {
        Some(_) => DestroyPlan::DeleteTable {
            table_name: table_name.to_string(),
        },
        None => DestroyPlan::AlreadyGone {
            table_name: table_name.to_string(),
        },
    }
}

/// Pure function: Format a deploy plan for display.
pub fn format_deploy_plan(plan: &DeployPlan) -> Vec<String> {
    match plan {
        DeployPlan::CreateTable { config } => vec![
            format!("+ Create table: {}", config.table_name),
            format!("  Partition key: {} (S)", config.partition_key.name),
            format!("  Sort key: {} (S)", config.sort_key.name),
            "  Billing: PAY_PER_REQUEST".to_string(),
            format!("  + TTL on: {}", config.ttl_attribute),
        ],
        DeployPlan::EnableTtl {
            table_name,
            attribute,
            replaces,
        } => {
            let mut lines = vec![format!("~ Update table: {}", table_name)];
            if let Some(old) = replaces {
                lines.push(format!("  - Disable TTL on: {}", old));
            }
            lines.push(format!("  + Enable TTL on: {}", attribute));
            lines
        }
        DeployPlan::NoChanges { table_name } => {
            vec![format!("= Table '{}' is up to date", table_name)]
        }
    }
}

/// Pure function: Format a destroy plan for display.
pub fn format_destroy_plan(plan: &DestroyPlan) -> Vec<String> {
    match plan {
        DestroyPlan::DeleteTable { table_name } => {
            vec![format!(
                "- Delete table: {} (ALL DATA WILL BE LOST)",
                table_name
            )]
        }
        DestroyPlan::AlreadyGone { table_name } => {
            vec![format!("= Table '{}' does not exist", table_name)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::config::leaderboard_table_config;
    use super::*;

    fn state(ttl: Option<&str>) -> TableState {
        TableState {
            status: TableStatus::Active,
            ttl_attribute: ttl.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_table_is_created() {
        let config = leaderboard_table_config();
        let plan = calculate_deploy_plan(None, &config);

        assert_eq!(plan, DeployPlan::CreateTable { config });
    }

    #[test]
    fn test_table_without_ttl_gets_ttl() {
        let plan = calculate_deploy_plan(Some(&state(None)), &leaderboard_table_config());

        assert_eq!(
            plan,
            DeployPlan::EnableTtl {
                table_name: "LeaderboardTable".to_string(),
                attribute: "ttl".to_string(),
                replaces: None,
            }
        );
    }

    #[test]
    fn test_ttl_on_other_attribute_is_replaced() {
        let plan = calculate_deploy_plan(Some(&state(Some("expires"))), &leaderboard_table_config());

        let lines = format_deploy_plan(&plan);
        assert_eq!(
            lines,
            vec![
                "~ Update table: LeaderboardTable",
                "  - Disable TTL on: expires",
                "  + Enable TTL on: ttl",
            ]
        );
    }

    #[test]
    fn test_up_to_date_table() {
        let plan = calculate_deploy_plan(Some(&state(Some("ttl"))), &leaderboard_table_config());

        assert!(matches!(plan, DeployPlan::NoChanges { .. }));
    }

    #[test]
    fn test_destroy_plan() {
        assert_eq!(
            calculate_destroy_plan(None, "T"),
            DestroyPlan::AlreadyGone {
                table_name: "T".to_string()
            }
        );
        assert_eq!(
            format_destroy_plan(&calculate_destroy_plan(Some(&state(None)), "T")),
            vec!["- Delete table: T (ALL DATA WILL BE LOST)"]
        );
    }
}
