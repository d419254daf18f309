use serde::{Deserialize, Serialize};

use crate::platform::FollowedForum;

/// A harvested post, enriched with its forum name and thread title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub forum_name: String,
    pub content: String,
    /// Creation time rendered in the configured display offset.
    pub create_time: String,
    pub user_name: String,
    pub thread_title: String,
}

/// A forum the user follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowedForumRecord {
    pub fid: u64,
    pub fname: String,
    pub level: u32,
    pub exp: u64,
}

impl From<FollowedForum> for FollowedForumRecord {
    fn from(forum: FollowedForum) -> Self {
        Self {
            fid: forum.fid,
            fname: forum.fname,
            level: forum.level,
            exp: forum.exp,
        }
    }
}
