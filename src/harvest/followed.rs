//! The followed-forums harvest: one retried request for a user's memberships.

use tracing::{debug, info};

use super::model::FollowedForumRecord;
use super::resolver::UserIdentifier;
use super::retry::{RetryOutcome, RetryPolicy};
use crate::constants::FOLLOWED_FORUMS_PAGE_SIZE;
use crate::platform::PlatformClient;

/// Fetch the first page of forums a user follows.
///
/// Only one page is requested, so anything past the first
/// [`FOLLOWED_FORUMS_PAGE_SIZE`] entries is dropped. Exhausted retries yield
/// an empty list.
pub async fn fetch_followed_forums(
    client: &dyn PlatformClient,
    user: &UserIdentifier,
    retry: &RetryPolicy,
) -> Vec<FollowedForumRecord> {
    let outcome = retry
        .run("followed forums", move |_| {
            client.list_followed_forums(user.as_str(), 1, FOLLOWED_FORUMS_PAGE_SIZE)
        })
        .await;

    match outcome {
        RetryOutcome::Success(forums) => {
            info!(user_id = %user, forums = forums.len(), "Followed forums fetched");
            forums.into_iter().map(FollowedForumRecord::from).collect()
        }
        RetryOutcome::Exhausted { attempts, .. } => {
            debug!(user_id = %user, attempts, "Followed forums unavailable");
            Vec::new()
        }
    }
}
