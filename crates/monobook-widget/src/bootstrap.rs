//! One-shot payload sources available before the bridge is queried.
//!
//! The page may carry a pre-rendered payload in an inline JSON script
//! (`{ "widget": ..., "payload": ... }`) or in a `payload` query parameter.
//! Both are read synchronously at mount so a pre-rendered widget never shows
//! a loading state.

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde_json::Value;

use crate::coerce::Record;
use crate::extract::Extractor;

pub const BOOTSTRAP_ELEMENT_ID: &str = "monobook-bootstrap";
pub const PAYLOAD_QUERY_PARAM: &str = "payload";

/// Page state captured at mount time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapSources {
    /// Text content of the bootstrap script element, if the page has one.
    pub element_text: Option<String>,
    /// The page's query string, with or without the leading `?`.
    pub query: Option<String>,
}

impl BootstrapSources {
    /// Capture sources from a saved HTML document and its query string.
    #[must_use]
    pub fn from_html(html: &str, query: Option<&str>) -> Self {
        Self {
            element_text: find_bootstrap_element(html),
            query: query.map(str::to_string),
        }
    }

    /// Run `extractor` over the bootstrap element's `payload`, then over the
    /// `payload` query parameter. Returns the first match.
    #[must_use]
    pub fn read(&self, extractor: &Extractor) -> Option<Record> {
        if let Some(found) = self.element_text.as_deref().and_then(|text| {
            let document: Value = serde_json::from_str(text).ok()?;
            let widget = document.get("widget").and_then(Value::as_str);
            tracing::debug!(widget, "read bootstrap element");
            extractor.extract(document.get("payload")?)
        }) {
            tracing::info!(schema = %extractor.schema(), source = "bootstrap_element", "payload resolved at mount");
            return Some(found);
        }

        let raw = self
            .query
            .as_deref()
            .and_then(|q| query_param(q, PAYLOAD_QUERY_PARAM))?;
        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(error) => {
                tracing::debug!(%error, "payload query parameter is not valid JSON");
                return None;
            }
        };
        let found = extractor.extract(&parsed)?;
        tracing::info!(schema = %extractor.schema(), source = "query", "payload resolved at mount");
        Some(found)
    }
}

/// Return the text content of the `<script id="monobook-bootstrap">` element.
#[must_use]
pub fn find_bootstrap_element(html: &str) -> Option<String> {
    let pattern = format!(
        r#"(?is)<script\b[^>]*\bid\s*=\s*["']{BOOTSTRAP_ELEMENT_ID}["'][^>]*>(.*?)</script>"#
    );
    let re = Regex::new(&pattern).expect("valid regex");
    let text = re.captures(html)?.get(1)?.as_str().trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Look up `name` in a URL query string using form-urlencoded rules
/// (`+` is a space, `%XX` escapes are decoded). The first occurrence wins.
#[must_use]
pub fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key) == name).then(|| decode_component(value))
        })
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::PayloadSchema;

    fn rooms() -> Extractor {
        Extractor::new(PayloadSchema::RoomSearch)
    }

    fn encode(value: &Value) -> String {
        percent_encoding::utf8_percent_encode(
            &value.to_string(),
            percent_encoding::NON_ALPHANUMERIC,
        )
        .to_string()
    }

    #[test]
    fn finds_bootstrap_script_text() {
        let html = r#"<html><head>
            <script src="/app.js"></script>
            <script type="application/json" id="monobook-bootstrap">
              {"widget": "rooms", "payload": {"rooms": []}}
            </script></head></html>"#;
        assert_eq!(
            find_bootstrap_element(html).as_deref(),
            Some(r#"{"widget": "rooms", "payload": {"rooms": []}}"#)
        );
    }

    #[test]
    fn missing_or_empty_bootstrap_element_is_none() {
        assert!(find_bootstrap_element("<script id=\"other\">{}</script>").is_none());
        assert!(find_bootstrap_element("<script id='monobook-bootstrap'>  </script>").is_none());
    }

    #[test]
    fn query_param_decodes_plus_and_percent_escapes() {
        assert_eq!(
            query_param("?a=1&payload=%7B%22count%22%3A+2%7D", "payload").as_deref(),
            Some("{\"count\": 2}")
        );
    }

    #[test]
    fn query_param_first_occurrence_wins_and_missing_is_none() {
        assert_eq!(query_param("x=1&x=2", "x").as_deref(), Some("1"));
        assert_eq!(query_param("flag&x=1", "flag").as_deref(), Some(""));
        assert!(query_param("", "payload").is_none());
        assert!(query_param("a=1", "payload").is_none());
    }

    #[test]
    fn element_payload_is_extracted() {
        let sources = BootstrapSources {
            element_text: Some(
                json!({"widget": "rooms", "payload": {"structuredContent": {"rooms": []}}})
                    .to_string(),
            ),
            query: None,
        };
        assert_eq!(
            sources.read(&rooms()).map(Value::Object),
            Some(json!({"rooms": []}))
        );
    }

    #[test]
    fn query_is_used_when_element_has_no_payload() {
        let sources = BootstrapSources {
            element_text: Some(json!({"widget": "rooms"}).to_string()),
            query: Some(format!("?payload={}", encode(&json!({"result": {"count": 3}})))),
        };
        assert_eq!(
            sources.read(&rooms()).map(Value::Object),
            Some(json!({"count": 3}))
        );
    }

    #[test]
    fn element_wins_over_query() {
        let sources = BootstrapSources {
            element_text: Some(json!({"payload": {"rooms": ["element"]}}).to_string()),
            query: Some(format!("payload={}", encode(&json!({"rooms": ["query"]})))),
        };
        assert_eq!(
            sources.read(&rooms()).map(Value::Object),
            Some(json!({"rooms": ["element"]}))
        );
    }

    #[test]
    fn malformed_sources_yield_nothing() {
        let sources = BootstrapSources {
            element_text: Some("{oops".to_string()),
            query: Some("payload=%7Bnope".to_string()),
        };
        assert!(sources.read(&rooms()).is_none());
        assert!(BootstrapSources::default().read(&rooms()).is_none());
    }

    #[test]
    fn from_html_captures_both_sources() {
        let html = r#"<script id="monobook-bootstrap">{"payload": {"booking_id": "BK-1"}}</script>"#;
        let sources = BootstrapSources::from_html(html, Some("?lang=en"));
        assert!(sources.element_text.is_some());
        assert_eq!(sources.query.as_deref(), Some("?lang=en"));
        let booking = Extractor::new(PayloadSchema::Booking);
        assert_eq!(
            sources.read(&booking).map(Value::Object),
            Some(json!({"booking_id": "BK-1"}))
        );
    }
}
