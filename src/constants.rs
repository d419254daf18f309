//! Shared constants used across the application.

use std::time::Duration;

/// User agent string sent with every platform request.
pub const HARVESTER_USER_AGENT: &str = "forum-post-harvester/0.1";

/// Default number of posts requested per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Default number of posts to harvest when none is configured.
pub const DEFAULT_TOTAL_COUNT: u32 = 100;

/// Maximum number of page fetches in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Attempts per fetch operation, including the first one.
pub const MAX_FETCH_ATTEMPTS: u32 = 3;

/// Lower bound (inclusive) of the jittered wait between attempts.
pub const RETRY_WAIT_MIN: Duration = Duration::from_secs(3);

/// Upper bound (exclusive) of the jittered wait between attempts.
pub const RETRY_WAIT_MAX: Duration = Duration::from_secs(5);

/// The followed-forums listing is fetched as a single page of this size.
pub const FOLLOWED_FORUMS_PAGE_SIZE: u32 = 50;

/// Forum name used when the platform has no detail for a forum id.
pub const UNKNOWN_FORUM_NAME: &str = "未知";

/// Filename marker used when no forum filter is configured.
pub const ALL_FORUMS_MARKER: &str = "all_forums";

/// Display offset for post timestamps (Asia/Shanghai, no DST).
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;
