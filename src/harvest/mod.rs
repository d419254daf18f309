//! Concurrent, paginated harvesting of a user's posts.
//!
//! A run resolves its target once, plans a fixed set of pages, fetches them
//! through a bounded scheduler and merges the results in page order. Page
//! failures are absorbed as degraded pages; only target resolution can fail
//! the run.

pub mod aggregate;
pub mod followed;
pub mod model;
pub mod page;
pub mod resolver;
pub mod retry;
pub mod scheduler;

use chrono::FixedOffset;
use tracing::{info, warn};

pub use aggregate::{aggregate, HarvestReport};
pub use followed::fetch_followed_forums;
pub use model::{FollowedForumRecord, PostRecord};
pub use page::{plan_pages, FetchError, PageFetcher, PageOutcome, PageTask};
pub use resolver::{
    resolve_forum_filter, resolve_target, resolve_user, ForumFilter, ResolveError, UserIdentifier,
};
pub use retry::{RetryOutcome, RetryPolicy};
pub use scheduler::PageScheduler;

use crate::config::Config;
use crate::localtime::{utc_offset, TimestampError};
use crate::platform::PlatformClient;

/// Parameters of one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestRequest {
    pub user_ref: String,
    pub forum_names: Vec<String>,
    pub total_count: u32,
    pub page_size: u32,
    pub concurrency: usize,
    pub offset: FixedOffset,
    pub retry: RetryPolicy,
}

impl HarvestRequest {
    /// Build a request from configuration with the default retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured UTC offset is out of range.
    pub fn from_config(config: &Config) -> Result<Self, TimestampError> {
        Ok(Self {
            user_ref: config.user_id.clone(),
            forum_names: config.forum_names.clone(),
            total_count: config.total_count,
            page_size: config.page_size,
            concurrency: config.concurrency,
            offset: utc_offset(config.utc_offset_hours)?,
            retry: RetryPolicy::default(),
        })
    }
}

/// Result of a post harvest.
#[derive(Debug, Clone)]
pub struct PostHarvest {
    pub user: UserIdentifier,
    pub filter: ForumFilter,
    pub records: Vec<PostRecord>,
    pub report: HarvestReport,
}

/// Result of a followed-forums harvest.
#[derive(Debug, Clone)]
pub struct FollowedHarvest {
    pub user: UserIdentifier,
    pub forums: Vec<FollowedForumRecord>,
}

/// Harvest a user's posts.
///
/// # Errors
///
/// Returns an error only if the user or a forum name cannot be resolved.
pub async fn harvest_posts(
    client: &dyn PlatformClient,
    request: &HarvestRequest,
) -> Result<PostHarvest, ResolveError> {
    let (user, filter) = resolve_target(client, &request.user_ref, &request.forum_names).await?;

    let tasks = plan_pages(request.total_count, request.page_size);
    let scheduler = PageScheduler::new(request.concurrency);
    info!(
        user_id = %user,
        pages = tasks.len(),
        page_size = request.page_size,
        concurrency = scheduler.concurrency(),
        "Scheduling page fetches"
    );

    let fetcher = PageFetcher::new(client, &user, &filter, request.offset, request.retry);
    let fetcher = &fetcher;
    let outcomes = scheduler.run(tasks, move |task| fetcher.fetch(task)).await;

    let (records, report) = aggregate(outcomes);
    if report.degraded_pages > 0 {
        warn!(
            degraded_pages = report.degraded_pages,
            "Some pages failed after all retries; output is partial"
        );
    }
    info!(
        pages = report.pages_scheduled,
        pages_with_records = report.pages_with_records,
        empty_pages = report.empty_pages,
        records = report.records,
        "Harvest complete"
    );

    Ok(PostHarvest {
        user,
        filter,
        records,
        report,
    })
}

/// Harvest the forums a user follows.
///
/// # Errors
///
/// Returns an error only if the user reference cannot be resolved.
pub async fn harvest_followed(
    client: &dyn PlatformClient,
    request: &HarvestRequest,
) -> Result<FollowedHarvest, ResolveError> {
    let user = resolve_user(client, &request.user_ref).await?;
    let forums = fetch_followed_forums(client, &user, &request.retry).await;
    Ok(FollowedHarvest { user, forums })
}
