//! Shared constants used across the application.

/// User agent string sent to the syndication endpoint.
///
/// The endpoint rejects requests that do not look like they come from a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Accept header sent alongside [`BROWSER_USER_AGENT`].
pub const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Path prefix of the profile timeline page on the syndication host.
pub const TIMELINE_PATH: &str = "/srv/timeline-profile/screen-name/";

/// Maximum length of a post's text, in characters.
pub const MAX_TEXT_CHARS: usize = 500;

/// Maximum number of photo attachments kept per post.
pub const MAX_MEDIA_PER_POST: usize = 2;

/// Posts whose cleaned text is this short or shorter are dropped.
pub const MIN_TEXT_CHARS: usize = 5;

/// Text prefix marking a repost.
pub const REPOST_PREFIX: &str = "RT @";

/// Canonical timestamp format of the snapshot.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
