//! Platform client capability used by the harvester.
//!
//! The harvest engine only talks to the platform through [`PlatformClient`],
//! so tests can drive it with an in-memory fake while the binary uses the
//! HTTP gateway client in [`http`].

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpPlatformClient;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("platform error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

/// One inline content unit of a post body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    pub text: String,
}

/// A post as returned by the user-post listing.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPost {
    pub fid: u64,
    pub tid: u64,
    #[serde(default)]
    pub user_name: String,
    /// Unix timestamp in seconds.
    pub create_time: i64,
    /// Composite posts (replies with quotes and the like) span several fragments.
    #[serde(default)]
    pub is_comment: bool,
    #[serde(default)]
    pub contents: Vec<Fragment>,
}

impl UserPost {
    /// Displayed text: every fragment for composite posts, the first one otherwise.
    ///
    /// `None` for a plain post that carries no fragment at all.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        if self.is_comment {
            Some(self.contents.iter().map(|f| f.text.as_str()).collect())
        } else {
            self.contents.first().map(|f| f.text.clone())
        }
    }
}

/// Posts of one user grouped under the thread they were made in.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadPosts {
    pub tid: u64,
    #[serde(default)]
    pub posts: Vec<UserPost>,
}

/// One page of a user's post listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPostsPage {
    #[serde(default)]
    pub threads: Vec<ThreadPosts>,
}

impl UserPostsPage {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// All posts on the page in listing order.
    pub fn posts(&self) -> impl Iterator<Item = &UserPost> {
        self.threads.iter().flat_map(|t| t.posts.iter())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForumDetail {
    pub fid: u64,
    pub fname: String,
}

/// A forum membership entry of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowedForum {
    pub fid: u64,
    pub fname: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub exp: u64,
}

/// Operations the harvester needs from the remote platform.
///
/// Implementations must tolerate concurrent calls from several in-flight
/// fetches sharing one instance.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Resolve a numeric user alias to the canonical user id.
    async fn resolve_user(&self, raw_ref: &str) -> Result<String, PlatformError>;

    /// Look up the id of a forum by name.
    async fn resolve_forum_id(&self, fname: &str) -> Result<u64, PlatformError>;

    /// List one page of a user's posts.
    async fn list_user_posts(
        &self,
        user_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<UserPostsPage, PlatformError>;

    /// Fetch forum metadata, `None` when the platform has none for `fid`.
    async fn get_forum_detail(&self, fid: u64) -> Result<Option<ForumDetail>, PlatformError>;

    /// Fetch the title of a thread.
    async fn get_thread_title(&self, tid: u64) -> Result<String, PlatformError>;

    /// List one page of the forums a user follows.
    async fn list_followed_forums(
        &self,
        user_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<FollowedForum>, PlatformError>;
}
