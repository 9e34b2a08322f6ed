//! Access to the syndication (embed) timeline endpoint.
//!
//! Each stage returns an empty or absent value on failure, so callers treat a
//! network error, a missing data block and a malformed entry the same way.

mod client;
mod extract;
mod normalize;

pub use client::{SyndicationClient, TimelineSource};
pub use extract::extract_entries;
pub use normalize::{normalize_entry, normalize_timeline, parse_created_at, upgrade_avatar_url};
