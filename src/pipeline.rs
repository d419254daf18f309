//! End-to-end harvest runs: harvest, then write the result file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::harvest::{harvest_followed, harvest_posts, HarvestRequest};
use crate::output::{output_filename, write_records, OutputKind};
use crate::platform::PlatformClient;

/// Harvest posts and write them to the output directory.
///
/// Returns the written path, or `None` when nothing was harvested.
///
/// # Errors
///
/// Returns an error if the harvest target cannot be resolved or the output
/// cannot be written.
pub async fn run_posts(client: &dyn PlatformClient, config: &Config) -> Result<Option<PathBuf>> {
    let request = HarvestRequest::from_config(config).context("Invalid harvest request")?;
    let harvest = harvest_posts(client, &request)
        .await
        .context("Failed to resolve harvest target")?;

    info!(records = harvest.records.len(), "Posts harvested");

    let filename = output_filename(
        harvest.user.as_str(),
        &config.forum_names,
        OutputKind::Posts,
    );
    write_records(&config.output_dir, &filename, &harvest.records)
        .await
        .context("Failed to write posts")
}

/// Harvest followed forums and write them to the output directory.
///
/// Returns the written path, or `None` when nothing was harvested.
///
/// # Errors
///
/// Returns an error if the user cannot be resolved or the output cannot be
/// written.
pub async fn run_followed(
    client: &dyn PlatformClient,
    config: &Config,
) -> Result<Option<PathBuf>> {
    let request = HarvestRequest::from_config(config).context("Invalid harvest request")?;
    let harvest = harvest_followed(client, &request)
        .await
        .context("Failed to resolve user")?;

    let filename = output_filename(harvest.user.as_str(), &[], OutputKind::FollowedForums);
    write_records(&config.output_dir, &filename, &harvest.forums)
        .await
        .context("Failed to write followed forums")
}
