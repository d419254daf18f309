//! JSON gateway client for the forum platform.

use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use super::{FollowedForum, ForumDetail, PlatformClient, PlatformError, UserPostsPage};
use crate::config::Config;
use crate::constants::HARVESTER_USER_AGENT;

#[derive(Debug, Deserialize)]
struct ResolveUserResponse {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ForumIdResponse {
    fid: u64,
}

#[derive(Debug, Deserialize)]
struct ThreadResponse {
    title: String,
}

#[derive(Debug, Deserialize)]
struct FollowedForumsResponse {
    #[serde(default)]
    forums: Vec<FollowedForum>,
}

/// Platform client backed by a JSON HTTP gateway.
///
/// Cheap to share: all requests go through one pooled `reqwest::Client`.
#[derive(Clone)]
pub struct HttpPlatformClient {
    http: reqwest::Client,
    base_url: Url,
    bduss: String,
}

impl HttpPlatformClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, PlatformError> {
        let base_url = Url::parse(&config.platform_base_url)
            .map_err(|e| PlatformError::InvalidUrl(format!("{}: {e}", config.platform_base_url)))?;

        let http = reqwest::Client::builder()
            .user_agent(HARVESTER_USER_AGENT)
            .timeout(config.platform_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            bduss: config.bduss.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, PlatformError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PlatformError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, PlatformError> {
        let url = self.endpoint(segments)?;
        let endpoint = url.path().to_string();

        let mut request = self.http.get(url).query(query);
        if !self.bduss.is_empty() {
            request = request.header(COOKIE, format!("BDUSS={}", self.bduss));
        }

        trace!(endpoint = %endpoint, "Platform request");
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(endpoint));
        }
        if !status.is_success() {
            return Err(PlatformError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let value: serde_json::Value =
            serde_json::from_slice(&body).map_err(|source| PlatformError::Decode {
                endpoint: endpoint.clone(),
                source,
            })?;

        if let Some(code) = value.get("error_code").and_then(serde_json::Value::as_i64) {
            if code != 0 {
                let message = value
                    .get("error_msg")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                return Err(PlatformError::Api { code, message });
            }
        }

        serde_json::from_value(value).map_err(|source| PlatformError::Decode { endpoint, source })
    }
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn resolve_user(&self, raw_ref: &str) -> Result<String, PlatformError> {
        let resp: ResolveUserResponse = self.get_json(&["users", raw_ref], &[]).await?;
        debug!(raw_ref, user_id = %resp.user_id, "Resolved user");
        Ok(resp.user_id)
    }

    async fn resolve_forum_id(&self, fname: &str) -> Result<u64, PlatformError> {
        let resp: ForumIdResponse = self
            .get_json(&["forums", "fid"], &[("fname", fname.to_string())])
            .await?;
        Ok(resp.fid)
    }

    async fn list_user_posts(
        &self,
        user_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<UserPostsPage, PlatformError> {
        self.get_json(
            &["users", user_id, "posts"],
            &[("pn", page.to_string()), ("rn", page_size.to_string())],
        )
        .await
    }

    async fn get_forum_detail(&self, fid: u64) -> Result<Option<ForumDetail>, PlatformError> {
        match self.get_json(&["forums", &fid.to_string()], &[]).await {
            Ok(detail) => Ok(Some(detail)),
            Err(PlatformError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_thread_title(&self, tid: u64) -> Result<String, PlatformError> {
        let resp: ThreadResponse = self.get_json(&["threads", &tid.to_string()], &[]).await?;
        Ok(resp.title)
    }

    async fn list_followed_forums(
        &self,
        user_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<FollowedForum>, PlatformError> {
        let resp: FollowedForumsResponse = self
            .get_json(
                &["users", user_id, "follows"],
                &[("pn", page.to_string()), ("rn", page_size.to_string())],
            )
            .await?;
        Ok(resp.forums)
    }
}
