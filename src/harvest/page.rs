//! Fetching and enriching a single page of a user's posts.

use chrono::FixedOffset;
use thiserror::Error;
use tracing::{debug, trace};

use super::model::PostRecord;
use super::resolver::{ForumFilter, UserIdentifier};
use super::retry::{RetryOutcome, RetryPolicy};
use crate::constants::UNKNOWN_FORUM_NAME;
use crate::localtime::{localize_timestamp, TimestampError};
use crate::platform::{PlatformClient, PlatformError};

/// Anything that can go wrong while building one page; every variant is retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
    #[error("post in thread {tid} has no content")]
    MissingContent { tid: u64 },
}

/// One scheduled page of the post listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTask {
    /// 1-based page index.
    pub page: u32,
    pub page_size: u32,
}

/// Plan the pages needed to cover `total_count` posts.
///
/// The plan is fixed up front; it does not shrink when a user has fewer posts.
#[must_use]
pub fn plan_pages(total_count: u32, page_size: u32) -> Vec<PageTask> {
    if page_size == 0 {
        return Vec::new();
    }
    let pages = total_count.div_ceil(page_size);
    (1..=pages).map(|page| PageTask { page, page_size }).collect()
}

/// What a page contributed to the harvest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The listing returned posts; `records` holds those that passed the filter.
    Fetched(Vec<PostRecord>),
    /// The listing had nothing on this page.
    Empty,
    /// Every attempt failed; the page contributes nothing.
    Degraded { attempts: u32 },
}

impl PageOutcome {
    #[must_use]
    pub fn into_records(self) -> Vec<PostRecord> {
        match self {
            Self::Fetched(records) => records,
            Self::Empty | Self::Degraded { .. } => Vec::new(),
        }
    }
}

/// Fetches pages for one resolved harvest target.
pub struct PageFetcher<'a> {
    client: &'a dyn PlatformClient,
    user: &'a UserIdentifier,
    filter: &'a ForumFilter,
    offset: FixedOffset,
    retry: RetryPolicy,
}

impl<'a> PageFetcher<'a> {
    #[must_use]
    pub fn new(
        client: &'a dyn PlatformClient,
        user: &'a UserIdentifier,
        filter: &'a ForumFilter,
        offset: FixedOffset,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            user,
            filter,
            offset,
            retry,
        }
    }

    /// Fetch one page under the retry policy. Never fails.
    pub async fn fetch(&self, task: PageTask) -> PageOutcome {
        let label = format!("page {}", task.page);
        let this = self;
        match self.retry.run(&label, move |_| this.fetch_once(task)).await {
            RetryOutcome::Success(Some(records)) => {
                debug!(page = task.page, records = records.len(), "Page fetched");
                PageOutcome::Fetched(records)
            }
            RetryOutcome::Success(None) => {
                debug!(page = task.page, "Page is empty");
                PageOutcome::Empty
            }
            RetryOutcome::Exhausted { attempts, .. } => PageOutcome::Degraded { attempts },
        }
    }

    /// One attempt: list the page and enrich each surviving post.
    ///
    /// Returns `None` when the listing itself is empty.
    async fn fetch_once(&self, task: PageTask) -> Result<Option<Vec<PostRecord>>, FetchError> {
        let listing = self
            .client
            .list_user_posts(self.user.as_str(), task.page, task.page_size)
            .await?;

        if listing.is_empty() {
            return Ok(None);
        }

        let mut records = Vec::new();
        for post in listing.posts() {
            let forum_name = if self.filter.is_empty() {
                self.lookup_forum_name(post.fid).await?
            } else if let Some(name) = self.filter.name_of(post.fid) {
                name.to_string()
            } else {
                trace!(page = task.page, fid = post.fid, "Post outside forum filter");
                continue;
            };

            let thread_title = self.client.get_thread_title(post.tid).await?;
            let create_time = localize_timestamp(post.create_time, self.offset)?;
            let content = post
                .text()
                .ok_or(FetchError::MissingContent { tid: post.tid })?;

            records.push(PostRecord {
                forum_name,
                content,
                create_time,
                user_name: post.user_name.clone(),
                thread_title,
            });
        }

        Ok(Some(records))
    }

    async fn lookup_forum_name(&self, fid: u64) -> Result<String, PlatformError> {
        Ok(self
            .client
            .get_forum_detail(fid)
            .await?
            .map_or_else(|| UNKNOWN_FORUM_NAME.to_string(), |detail| detail.fname))
    }
}
