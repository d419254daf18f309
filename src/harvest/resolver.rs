//! Resolution of the harvest target before any page is scheduled.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::platform::{PlatformClient, PlatformError};

/// Resolution failures abort the whole run.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to resolve user {raw_ref}: {source}")]
    User {
        raw_ref: String,
        #[source]
        source: PlatformError,
    },
    #[error("failed to resolve forum {name}: {source}")]
    Forum {
        name: String,
        #[source]
        source: PlatformError,
    },
    #[error("forum {0} does not exist")]
    UnknownForum(String),
}

/// Canonical platform user id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserIdentifier(String);

impl UserIdentifier {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Forums a harvest is restricted to, as (name, id) pairs in input order.
///
/// An empty filter restricts nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForumFilter {
    pairs: Vec<(String, u64)>,
}

impl ForumFilter {
    #[must_use]
    pub fn new(pairs: Vec<(String, u64)>) -> Self {
        Self { pairs }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Name of the first filter entry with this forum id.
    #[must_use]
    pub fn name_of(&self, fid: u64) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(_, id)| *id == fid)
            .map(|(name, _)| name.as_str())
    }
}

/// A reference made only of ASCII digits is a numeric alias, not a canonical id.
fn is_numeric_alias(raw_ref: &str) -> bool {
    !raw_ref.is_empty() && raw_ref.bytes().all(|b| b.is_ascii_digit())
}

/// Turn a raw user reference into the canonical id.
///
/// # Errors
///
/// Returns an error if a numeric alias cannot be resolved.
pub async fn resolve_user(
    client: &dyn PlatformClient,
    raw_ref: &str,
) -> Result<UserIdentifier, ResolveError> {
    let raw_ref = raw_ref.trim();
    if !is_numeric_alias(raw_ref) {
        return Ok(UserIdentifier(raw_ref.to_string()));
    }

    let user_id = client
        .resolve_user(raw_ref)
        .await
        .map_err(|source| ResolveError::User {
            raw_ref: raw_ref.to_string(),
            source,
        })?;
    debug!(raw_ref, user_id = %user_id, "Numeric alias resolved");
    Ok(UserIdentifier(user_id))
}

/// Resolve forum names one after another into a filter.
///
/// Repeated names are resolved once. The first name that fails ends the
/// resolution.
///
/// # Errors
///
/// Returns an error if any name cannot be resolved or names no forum.
pub async fn resolve_forum_filter(
    client: &dyn PlatformClient,
    names: &[String],
) -> Result<ForumFilter, ResolveError> {
    let mut pairs: Vec<(String, u64)> = Vec::with_capacity(names.len());

    for name in names {
        if pairs.iter().any(|(known, _)| known == name) {
            continue;
        }
        let fid = client
            .resolve_forum_id(name)
            .await
            .map_err(|source| ResolveError::Forum {
                name: name.clone(),
                source,
            })?;
        if fid == 0 {
            return Err(ResolveError::UnknownForum(name.clone()));
        }
        debug!(forum = %name, fid, "Forum resolved");
        pairs.push((name.clone(), fid));
    }

    Ok(ForumFilter::new(pairs))
}

/// Resolve the harvest target: forum filter first, then the user.
///
/// # Errors
///
/// Returns the first resolution failure.
pub async fn resolve_target(
    client: &dyn PlatformClient,
    raw_ref: &str,
    forum_names: &[String],
) -> Result<(UserIdentifier, ForumFilter), ResolveError> {
    let filter = resolve_forum_filter(client, forum_names).await?;
    let user = resolve_user(client, raw_ref).await?;
    info!(
        user_id = %user,
        forums = filter.pairs.len(),
        "Harvest target resolved"
    );
    Ok((user, filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_alias() {
        assert!(is_numeric_alias("123456"));
        assert!(!is_numeric_alias("tb.1.abc"));
        assert!(!is_numeric_alias("12a"));
        assert!(!is_numeric_alias(""));
        assert!(!is_numeric_alias("-12"));
    }

    #[test]
    fn test_empty_filter_names_nothing() {
        let filter = ForumFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.name_of(1), None);
        assert_eq!(filter.name_of(u64::MAX), None);
    }

    #[test]
    fn test_filter_membership_and_names() {
        let filter = ForumFilter::new(vec![
            ("rust".to_string(), 10),
            ("golang".to_string(), 20),
            ("rustlang".to_string(), 10),
        ]);
        assert!(!filter.is_empty());
        assert_eq!(filter.name_of(10), Some("rust"));
        assert_eq!(filter.name_of(20), Some("golang"));
        assert_eq!(filter.name_of(30), None);
    }
}
