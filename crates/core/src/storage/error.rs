use thiserror::Error;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// A conditional write kept losing to concurrent writers.
    #[error("Write conflict on {entity_type} {id} after {attempts} attempts")]
    Conflict {
        entity_type: &'static str,
        id: String,
        attempts: u32,
    },
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::NotFound {
            entity_type: "UserTally",
            id: "votee123".to_string(),
        };
        assert_eq!(error.to_string(), "UserTally not found: votee123");
    }

    #[test]
    fn test_repository_error_already_exists_display() {
        let error = RepositoryError::AlreadyExists {
            entity_type: "RecordedVote",
            id: "2025W25/voter456".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "RecordedVote already exists: 2025W25/voter456"
        );
    }

    #[test]
    fn test_repository_error_connection_failed_display() {
        let error = RepositoryError::ConnectionFailed("timeout after 5s".to_string());
        assert_eq!(error.to_string(), "Connection failed: timeout after 5s");
    }

    #[test]
    fn test_repository_error_query_failed_display() {
        let error = RepositoryError::QueryFailed("invalid partition key".to_string());
        assert_eq!(error.to_string(), "Query failed: invalid partition key");
    }

    #[test]
    fn test_repository_error_serialization_display() {
        let error = RepositoryError::Serialization("missing required field".to_string());
        assert_eq!(
            error.to_string(),
            "Serialization error: missing required field"
        );
    }

    #[test]
    fn test_repository_error_invalid_data_display() {
        let error = RepositoryError::InvalidData("count is not a number".to_string());
        assert_eq!(error.to_string(), "Invalid data: count is not a number");
    }

    #[test]
    fn test_repository_error_conflict_display() {
        let error = RepositoryError::Conflict {
            entity_type: "UserTally",
            id: "votee123".to_string(),
            attempts: 3,
        };
        assert_eq!(
            error.to_string(),
            "Write conflict on UserTally votee123 after 3 attempts"
        );
    }
}
