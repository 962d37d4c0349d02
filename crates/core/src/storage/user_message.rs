//! Pure mapping from repository errors to text safe to show a chat user.

use super::RepositoryError;
use crate::vote::messages::GENERIC_FAILURE;

/// Maps a [`RepositoryError`] to a short sentence for the end user.
///
/// Never includes the error detail, which may carry keys or AWS messages.
///
/// ```
/// use leaderboard_core::storage::{repository_error_to_user_message, RepositoryError};
///
/// let error = RepositoryError::ConnectionFailed("dynamodb.eu-west-1: timeout".to_string());
/// assert!(!repository_error_to_user_message(&error).contains("dynamodb"));
/// ```
pub fn repository_error_to_user_message(error: &RepositoryError) -> &'static str {
    match error {
        RepositoryError::ConnectionFailed(_) | RepositoryError::QueryFailed(_) => {
            "The leaderboard is unavailable right now, please try again later."
        }
        RepositoryError::Conflict { .. } => "Too many votes at once, please try again.",
        RepositoryError::NotFound { .. } => "User not found",
        RepositoryError::AlreadyExists { .. }
        | RepositoryError::Serialization(_)
        | RepositoryError::InvalidData(_) => GENERIC_FAILURE,
    }
}
