//! Merging freshly fetched posts with the previous snapshot.

use std::collections::HashSet;

use crate::snapshot::PostRecord;

/// Combine new posts with the previous snapshot's posts.
///
/// Old posts from any handle present among the new posts are superseded and
/// dropped. Old posts from other handles (accounts that failed this run) are
/// appended. With no new posts at all, the old posts are returned unchanged.
#[must_use]
pub fn merge_with_previous(new: Vec<PostRecord>, old: Vec<PostRecord>) -> Vec<PostRecord> {
    if new.is_empty() {
        return old;
    }

    let fetched: HashSet<String> = new.iter().map(|p| p.handle.clone()).collect();
    let mut merged = new;
    merged.extend(old.into_iter().filter(|p| !fetched.contains(&p.handle)));
    merged
}

/// Stable sort by timestamp, newest first. Empty timestamps sort last.
pub fn sort_newest_first(posts: &mut [PostRecord]) {
    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Keep the first occurrence of each id.
#[must_use]
pub fn dedupe_by_id(posts: Vec<PostRecord>) -> Vec<PostRecord> {
    let mut seen = HashSet::new();
    posts
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect()
}

/// Sort, dedupe and cap a merged post list.
#[must_use]
pub fn finalize(mut posts: Vec<PostRecord>, max_posts: usize) -> Vec<PostRecord> {
    sort_newest_first(&mut posts);
    let mut posts = dedupe_by_id(posts);
    posts.truncate(max_posts);
    posts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, handle: &str, timestamp: &str) -> PostRecord {
        PostRecord {
            id: id.to_string(),
            handle: handle.to_string(),
            timestamp: timestamp.to_string(),
            ..PostRecord::default()
        }
    }

    fn ids(posts: &[PostRecord]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_refetched_handle_supersedes_old_posts() {
        let old = vec![post("1", "a", "2024-01-01T00:00:00Z")];
        let new = vec![post("2", "a", "2024-01-02T00:00:00Z")];

        let merged = finalize(merge_with_previous(new, old), 150);
        assert_eq!(ids(&merged), vec!["2"]);
    }

    #[test]
    fn test_failed_accounts_keep_old_posts() {
        let old = vec![
            post("a1", "a", "2024-01-01T00:00:00Z"),
            post("b1", "b", "2024-01-01T12:00:00Z"),
            post("b0", "b", "2023-12-31T00:00:00Z"),
        ];
        let new = vec![post("a2", "a", "2024-01-02T00:00:00Z")];

        let merged = finalize(merge_with_previous(new, old.clone()), 150);
        assert_eq!(ids(&merged), vec!["a2", "b1", "b0"]);
        assert_eq!(merged[1], old[1]);
        assert_eq!(merged[2], old[2]);
    }

    #[test]
    fn test_no_new_posts_keeps_old_unchanged() {
        let old = vec![
            post("1", "a", "2024-01-01T00:00:00Z"),
            post("2", "b", "2024-01-02T00:00:00Z"),
        ];
        assert_eq!(merge_with_previous(Vec::new(), old.clone()), old);
    }

    #[test]
    fn test_sort_puts_empty_timestamps_last_and_is_stable() {
        let mut posts = vec![
            post("x", "a", ""),
            post("1", "a", "2024-01-01T00:00:00Z"),
            post("y", "a", ""),
            post("2", "a", "2024-01-02T00:00:00Z"),
            post("3", "b", "2024-01-01T00:00:00Z"),
        ];
        sort_newest_first(&mut posts);
        assert_eq!(ids(&posts), vec!["2", "1", "3", "x", "y"]);
    }

    #[test]
    fn test_dedupe_keeps_first_in_sorted_order() {
        let posts = vec![
            post("1", "a", "2024-01-01T00:00:00Z"),
            post("1", "b", "2024-01-03T00:00:00Z"),
            post("2", "a", "2024-01-02T00:00:00Z"),
        ];

        let result = finalize(posts, 150);
        assert_eq!(ids(&result), vec!["1", "2"]);
        assert_eq!(result[0].handle, "b");
    }

    #[test]
    fn test_finalize_caps_length() {
        let posts: Vec<PostRecord> = (0..200)
            .map(|i| post(&i.to_string(), "a", &format!("2024-01-01T00:{:02}:{:02}Z", i / 60, i % 60)))
            .collect();

        let result = finalize(posts, 150);
        assert_eq!(result.len(), 150);
        assert_eq!(result[0].id, "199");
        assert!(result
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }
}
