use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

static NEXT_DATA_SELECTOR: std::sync::LazyLock<Selector> = std::sync::LazyLock::new(|| {
    Selector::parse(r#"script#__NEXT_DATA__[type="application/json"]"#).unwrap()
});

/// Entry type tag carried by post entries in the timeline.
const POST_ENTRY_TYPE: &str = "tweet";

/// Extract the raw post payloads from a syndication timeline page.
///
/// Looks for the embedded `__NEXT_DATA__` JSON block and walks
/// `props.pageProps.timeline.entries`. Any missing piece yields an empty list.
#[must_use]
pub fn extract_entries(html: &str) -> Vec<Value> {
    let Some(data) = embedded_data(html) else {
        return Vec::new();
    };

    let Some(entries) = data
        .pointer("/props/pageProps/timeline/entries")
        .and_then(Value::as_array)
    else {
        debug!("Embedded data has no timeline entries");
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| entry.get("type").and_then(Value::as_str) == Some(POST_ENTRY_TYPE))
        .filter_map(|entry| entry.pointer("/content/tweet"))
        .filter(|payload| payload.as_object().is_some_and(|obj| !obj.is_empty()))
        .cloned()
        .collect()
}

/// Locate and parse the embedded JSON block.
fn embedded_data(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let Some(script) = document.select(&NEXT_DATA_SELECTOR).next() else {
        debug!("No embedded data block found");
        return None;
    };

    let raw: String = script.text().collect();
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "Embedded data block is not valid JSON");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(json: &str) -> String {
        format!(
            r#"<!DOCTYPE html><html><head></head><body><div id="app"></div><script id="__NEXT_DATA__" type="application/json">{json}</script></body></html>"#
        )
    }

    #[test]
    fn test_extracts_only_post_entries() {
        let html = page(
            r#"{"props":{"pageProps":{"timeline":{"entries":[
                {"type":"tweet","content":{"tweet":{"id_str":"1","full_text":"first post"}}},
                {"type":"cursor","content":{"value":"abc"}},
                {"type":"tweet","content":{"tweet":{}}},
                {"type":"tweet","content":{}},
                {"type":"tweet","content":{"tweet":{"id_str":"2","full_text":"second post"}}}
            ]}}}}"#,
        );

        let entries = extract_entries(&html);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["id_str"], "1");
        assert_eq!(entries[1]["id_str"], "2");
    }

    #[test]
    fn test_missing_block_yields_nothing() {
        assert!(extract_entries("<html><body>rate limited</body></html>").is_empty());
        assert!(extract_entries("").is_empty());
    }

    #[test]
    fn test_wrong_script_type_is_ignored() {
        let html = r#"<script id="__NEXT_DATA__" type="text/javascript">{"props":{}}</script>"#;
        assert!(extract_entries(html).is_empty());
    }

    #[test]
    fn test_invalid_json_yields_nothing() {
        assert!(extract_entries(&page("{not json")).is_empty());
    }

    #[test]
    fn test_missing_path_yields_nothing() {
        assert!(extract_entries(&page(r#"{"props":{"pageProps":{}}}"#)).is_empty());
        assert!(extract_entries(&page(
            r#"{"props":{"pageProps":{"timeline":{"entries":"nope"}}}}"#
        ))
        .is_empty());
    }
}
