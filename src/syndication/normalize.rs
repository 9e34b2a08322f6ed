//! Conversion of raw upstream post payloads into [`PostRecord`]s.
//!
//! The payload shape is owned by the upstream service, so every field is read
//! through an optional lookup with an explicit default.

use chrono::{DateTime, Utc, Weekday};
use serde_json::Value;
use tracing::debug;

use crate::accounts::TrackedAccount;
use crate::constants::{
    MAX_MEDIA_PER_POST, MAX_TEXT_CHARS, MIN_TEXT_CHARS, REPOST_PREFIX, TIMESTAMP_FORMAT,
};
use crate::snapshot::{Media, PostRecord};

/// Upstream date format after the leading weekday, e.g. `Jan 24 20:14:18 +0000 2023`.
const UPSTREAM_DATE_FORMAT: &str = "%b %d %H:%M:%S %z %Y";

/// Read a string field, defaulting to `""`.
fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Read a count field, defaulting to 0 for missing, negative or non-integer values.
fn count_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Read an array field, defaulting to an empty slice.
fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Normalize one post payload.
///
/// Returns `None` for reposts, for posts without an id and for posts whose
/// cleaned text is too short. `fallback` supplies the author when the payload
/// carries none.
#[must_use]
pub fn normalize_entry(
    raw: &Value,
    fallback: &TrackedAccount,
    permalink_base: &str,
) -> Option<PostRecord> {
    let id = str_field(raw, "id_str");
    let mut text = match str_field(raw, "full_text") {
        "" => str_field(raw, "text"),
        full => full,
    }
    .to_string();

    if text.starts_with(REPOST_PREFIX) {
        debug!(id = %id, "Skipping repost");
        return None;
    }

    let user = raw.get("user").unwrap_or(&Value::Null);
    let handle = user
        .get("screen_name")
        .and_then(Value::as_str)
        .unwrap_or(fallback.handle.as_str());
    let display_name = user
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(fallback.display_name.as_str());
    let avatar_url = upgrade_avatar_url(str_field(user, "profile_image_url_https"));

    let entities = raw.get("entities").unwrap_or(&Value::Null);
    let media_items = match raw.get("extended_entities").map(|e| array_field(e, "media")) {
        Some(extended) if !extended.is_empty() => extended,
        _ => array_field(entities, "media"),
    };

    let media: Vec<Media> = media_items
        .iter()
        .filter(|m| str_field(m, "type") == "photo")
        .map(|m| str_field(m, "media_url_https"))
        .filter(|url| !url.is_empty())
        .take(MAX_MEDIA_PER_POST)
        .map(Media::photo)
        .collect();

    // Short links pointing at attached media duplicate the attachment itself.
    for item in media_items {
        let short = str_field(item, "url");
        if !short.is_empty() {
            text = text.replace(short, "").trim().to_string();
        }
    }

    for link in array_field(entities, "urls") {
        let short = str_field(link, "url");
        let expanded = match str_field(link, "expanded_url") {
            "" => str_field(link, "display_url"),
            expanded => expanded,
        };
        if !short.is_empty() && !expanded.is_empty() {
            text = text.replace(short, expanded);
        }
    }

    let text = text.trim();
    if id.is_empty() || text.chars().count() <= MIN_TEXT_CHARS {
        debug!(id = %id, "Skipping post with missing id or too little text");
        return None;
    }

    Some(PostRecord {
        id: id.to_string(),
        handle: handle.to_string(),
        display_name: display_name.to_string(),
        avatar_url,
        text: text.chars().take(MAX_TEXT_CHARS).collect(),
        permalink: format!(
            "{}/{handle}/status/{id}",
            permalink_base.trim_end_matches('/')
        ),
        timestamp: parse_created_at(str_field(raw, "created_at")),
        like_count: count_field(raw, "favorite_count"),
        repost_count: count_field(raw, "retweet_count"),
        reply_count: count_field(raw, "reply_count"),
        media,
    })
}

/// Normalize an account's timeline, keeping at most `limit` posts in upstream order.
#[must_use]
pub fn normalize_timeline(
    entries: &[Value],
    account: &TrackedAccount,
    permalink_base: &str,
    limit: usize,
) -> Vec<PostRecord> {
    entries
        .iter()
        .filter_map(|entry| normalize_entry(entry, account, permalink_base))
        .take(limit)
        .collect()
}

/// Swap the low resolution avatar suffix for the 200x200 variant.
#[must_use]
pub fn upgrade_avatar_url(url: &str) -> String {
    url.replace("_normal.", "_200x200.")
}

/// Convert an upstream date into `YYYY-MM-DDTHH:MM:SSZ` in UTC, or `""` if
/// it cannot be parsed.
///
/// The leading token must name a weekday. It is not checked against the date.
#[must_use]
pub fn parse_created_at(raw: &str) -> String {
    let Some((weekday, rest)) = raw.trim().split_once(' ') else {
        return String::new();
    };
    if weekday.parse::<Weekday>().is_err() {
        return String::new();
    }

    DateTime::parse_from_str(rest.trim_start(), UPSTREAM_DATE_FORMAT)
        .map(|dt| dt.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}
