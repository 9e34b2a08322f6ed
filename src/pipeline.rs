//! One run of the fetch, normalize, merge and write pipeline.

use chrono::Utc;
use tracing::{info, warn};

use crate::accounts::TrackedAccount;
use crate::aggregate::{finalize, merge_with_previous};
use crate::config::Config;
use crate::constants::TIMESTAMP_FORMAT;
use crate::snapshot::{PostRecord, Snapshot, SnapshotError};
use crate::syndication::{extract_entries, normalize_timeline, TimelineSource};
use crate::throttle::Throttle;

/// Posts gathered from upstream during a run.
#[derive(Debug, Default)]
pub struct Collected {
    pub posts: Vec<PostRecord>,
    /// Number of accounts that yielded at least one post.
    pub successful: usize,
}

/// Fetch, extract and normalize one account's timeline.
///
/// Returns an empty list when the account could not be fetched or yielded no
/// usable posts.
pub async fn fetch_account(
    source: &dyn TimelineSource,
    account: &TrackedAccount,
    config: &Config,
) -> Vec<PostRecord> {
    let Some(html) = source.fetch_timeline(&account.handle).await else {
        return Vec::new();
    };

    let entries = extract_entries(&html);
    normalize_timeline(
        &entries,
        account,
        &config.permalink_base_url,
        config.max_posts_per_account,
    )
}

/// Fetch every tracked account in order, pausing between accounts.
pub async fn collect_posts(
    source: &dyn TimelineSource,
    throttle: &dyn Throttle,
    config: &Config,
) -> Collected {
    let mut collected = Collected::default();

    for (i, account) in config.accounts.iter().enumerate() {
        if i > 0 {
            throttle.pause().await;
        }

        info!(handle = %account.handle, "Fetching account");
        let posts = fetch_account(source, account, config).await;

        if posts.is_empty() {
            warn!(handle = %account.handle, "No posts fetched");
        } else {
            info!(handle = %account.handle, posts = posts.len(), "Fetched posts");
            collected.successful += 1;
            collected.posts.extend(posts);
        }
    }

    collected
}

/// Build the next snapshot from the previous one and this run's posts.
#[must_use]
pub fn build_snapshot(
    previous: Snapshot,
    collected: Collected,
    config: &Config,
    updated_at: String,
) -> Snapshot {
    let merged = merge_with_previous(collected.posts, previous.posts);

    Snapshot {
        posts: finalize(merged, config.max_posts),
        updated_at,
        tracked_account_count: config.accounts.len(),
        successful_fetch_count: collected.successful,
    }
}

/// Current UTC time in the snapshot's timestamp format.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Run the whole pipeline: load the previous snapshot, fetch every account,
/// merge and write the new snapshot to `config.output_path`.
///
/// # Errors
///
/// Returns an error only if the new snapshot cannot be written. Upstream
/// failures are absorbed and reflected in `successful_fetch_count`.
pub async fn run(
    config: &Config,
    source: &dyn TimelineSource,
    throttle: &dyn Throttle,
) -> Result<Snapshot, SnapshotError> {
    let previous = Snapshot::load(&config.output_path).await;
    info!(
        path = %config.output_path.display(),
        posts = previous.posts.len(),
        "Loaded previous snapshot"
    );

    let collected = collect_posts(source, throttle, config).await;
    let snapshot = build_snapshot(previous, collected, config, now_timestamp());
    snapshot.save(&config.output_path).await?;

    info!(
        posts = snapshot.posts.len(),
        successful = snapshot.successful_fetch_count,
        accounts = snapshot.tracked_account_count,
        path = %config.output_path.display(),
        "Snapshot saved"
    );

    Ok(snapshot)
}
