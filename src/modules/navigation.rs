// Pure navigation logic - no Tauri imports allowed.
// Address-bar parsing and the label rules shared by the tab strip, the
// vertical popup and the address bar.

use url::Url;
use crate::settings::{Preferences, SearchEngine};

pub const BLANK_URL: &str = "about:blank";
pub const NEW_TAB_TITLE: &str = "New Tab";

/// Turns address-bar input into the URL a view should load.
///
/// Decided from the text alone, with no lookups. Text that is not already a
/// URL and does not look like a host becomes a query for the configured
/// search engine.
pub fn smart_parse_url(input: &str, preferences: &Preferences) -> String {
    let text = input.trim();
    if text.is_empty() {
        return BLANK_URL.to_string();
    }

    if !text.contains("://") && names_local_host(text) {
        if let Ok(url) = Url::parse(&format!("http://{}", text)) {
            return url.to_string();
        }
    }

    // `Url` reads "example.com:80" as scheme "example.com", so only
    // schemes a view can open count.
    if let Ok(url) = Url::parse(text) {
        if matches!(url.scheme(), "http" | "https" | "file" | "about" | "data") {
            return url.to_string();
        }
    }

    if looks_like_host(text) {
        if let Ok(url) = Url::parse(&format!("https://{}", text)) {
            if url.host().is_some() {
                return url.to_string();
            }
        }
    }

    preferences.search_engine.query_url(text)
}

fn names_local_host(text: &str) -> bool {
    text.starts_with("localhost")
        || text.starts_with("127.0.0.1")
        || text.parse::<std::net::IpAddr>().is_ok()
}

fn looks_like_host(text: &str) -> bool {
    !text.contains(' ') && text.contains('.') && !text.ends_with('.')
}

/// The decoded query when `location` is a results page of a known engine.
pub fn search_query(location: &str) -> Option<String> {
    let url = Url::parse(location).ok()?;
    SearchEngine::ALL
        .iter()
        .find_map(|engine| engine.extract_query(&url))
}

/// Label for a Page tab.
pub fn display_title(location: &str, reported_title: &str) -> String {
    if let Some(query) = search_query(location) {
        return query;
    }
    if reported_title.trim().is_empty() {
        NEW_TAB_TITLE.to_string()
    } else {
        reported_title.to_string()
    }
}

/// Address-bar text for a Page tab.
pub fn display_location(location: &str) -> String {
    search_query(location).unwrap_or_else(|| location.to_string())
}

pub fn is_blank(url: &str) -> bool {
    url.trim().is_empty() || url.trim() == BLANK_URL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Preferences, SearchEngine};
    use rstest::rstest;

    #[rstest]
    // already URLs
    #[case("https://example.com", "https://example.com/")]
    #[case("http://example.com", "http://example.com/")]
    #[case("https://example.com/path?query=1", "https://example.com/path?query=1")]
    // local hosts load over http
    #[case("localhost", "http://localhost/")]
    #[case("localhost:3000", "http://localhost:3000/")]
    #[case("localhost:8080/path", "http://localhost:8080/path")]
    #[case("127.0.0.1", "http://127.0.0.1/")]
    #[case("127.0.0.1:8080", "http://127.0.0.1:8080/")]
    #[case("192.168.1.1", "http://192.168.1.1/")]
    // bare hosts get https
    #[case("google.com", "https://google.com/")]
    #[case("sub.domain.com", "https://sub.domain.com/")]
    #[case("docs.rs/my-crate", "https://docs.rs/my-crate")]
    #[case("about:blank", "about:blank")]
    #[case("file:///Users/test/doc.html", "file:///Users/test/doc.html")]
    // nothing typed
    #[case("", "about:blank")]
    #[case("   ", "about:blank")]
    fn test_smart_url_parsing(#[case] input: &str, #[case] expected: &str) {
        let preferences = Preferences::default();
        assert_eq!(smart_parse_url(input, &preferences), expected);
    }

    #[rstest]
    #[case("hello world", "https://www.google.com/search?q=hello%20world")]
    #[case("rust", "https://www.google.com/search?q=rust")]
    #[case("c++", "https://www.google.com/search?q=c%2B%2B")]
    fn test_search_fallback(#[case] input: &str, #[case] expected: &str) {
        let preferences = Preferences::default();
        assert_eq!(smart_parse_url(input, &preferences), expected);
    }

    #[test]
    fn test_configured_search_engine() {
        let preferences = Preferences {
            search_engine: SearchEngine::Bing,
            ..Preferences::default()
        };
        assert_eq!(
            smart_parse_url("test query", &preferences),
            "https://www.bing.com/search?q=test%20query"
        );
    }

    // --- label derivation tests ---

    #[rstest]
    #[case("https://www.google.com/search?q=hello%20world", "hello world")]
    #[case("http://www.google.com/search?q=hello+world&hl=en", "hello world")]
    #[case("https://www.google.com/search?hl=en&q=caf%C3%A9", "café")]
    #[case("https://duckduckgo.com/?q=tauri", "tauri")]
    #[case("https://search.yahoo.com/search?p=weather", "weather")]
    fn test_search_query_recognized(#[case] location: &str, #[case] expected: &str) {
        assert_eq!(search_query(location).as_deref(), Some(expected));
    }

    #[rstest]
    #[case("https://example.com")]
    #[case("https://www.google.com/maps?q=paris")]
    #[case("https://www.google.com/search?q=")]
    #[case("https://evil.example/search?q=hello")]
    #[case("not a url")]
    fn test_search_query_not_recognized(#[case] location: &str) {
        assert_eq!(search_query(location), None);
    }

    #[test]
    fn test_display_title() {
        assert_eq!(
            display_title("https://www.google.com/search?q=hello%20world", "hello world - Google Search"),
            "hello world"
        );
        assert_eq!(display_title("https://example.com", "Example Domain"), "Example Domain");
        assert_eq!(display_title("https://example.com", ""), NEW_TAB_TITLE);
    }

    #[test]
    fn test_display_location() {
        assert_eq!(
            display_location("https://www.google.com/search?q=hello%20world"),
            "hello world"
        );
        assert_eq!(display_location("https://example.com/"), "https://example.com/");
    }

    #[rstest]
    #[case("", true)]
    #[case("about:blank", true)]
    #[case(" about:blank ", true)]
    #[case("https://example.com", false)]
    fn test_is_blank(#[case] url: &str, #[case] expected: bool) {
        assert_eq!(is_blank(url), expected);
    }
}
