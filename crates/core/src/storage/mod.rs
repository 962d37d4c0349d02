mod error;
mod traits;
mod user_message;

pub use error::{RepositoryError, Result};
pub use traits::{TallyRepository, VoteRepository};
pub use user_message::repository_error_to_user_message;
