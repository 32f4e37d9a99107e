//! Link extraction from fetched pages
//!
//! Links are found with a tolerant pattern match over the raw document text
//! rather than a structural parse. Anchors the pattern does not recognise
//! (single-quoted or unquoted `href`, attributes split across odd markup) are
//! silently missed; malformed markup never causes an error.

use indexmap::IndexSet;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Matches `<a ... href="...">` and captures the attribute value
fn anchor_href() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<a\s+(?:[^>]*?\s+)?href="([^"]*)""#).expect("anchor pattern is valid")
    })
}

/// Extracts up to `max_count` distinct absolute links from an HTML document
///
/// # Link Rules
///
/// - Fragment-only links (`#section`) are skipped
/// - Links already starting with `http://` or `https://` are kept verbatim
/// - Anything else is resolved against the origin (scheme, host, port) of
///   `base_url`; references that cannot be resolved, or that resolve to a
///   non-HTTP scheme such as `mailto:`, are skipped
/// - Duplicates are dropped by exact string comparison, keeping first-seen order
///
/// Scanning stops as soon as `max_count` distinct links have been collected.
///
/// # Arguments
///
/// * `base_url` - URL of the page the document was fetched from
/// * `html` - The raw document text
/// * `max_count` - Upper bound on the number of links returned
///
/// # Example
///
/// ```
/// use pagebench::harvest::extract_links;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/wiki/Start").unwrap();
/// let html = r##"<a href="/wiki/A">A</a> <a href="#top">top</a> <a href="/wiki/A">again</a>"##;
/// assert_eq!(extract_links(&base, html, 10), vec!["https://example.com/wiki/A"]);
/// ```
pub fn extract_links(base_url: &Url, html: &str, max_count: usize) -> Vec<String> {
    let mut links = IndexSet::new();
    if max_count == 0 {
        return Vec::new();
    }

    for captures in anchor_href().captures_iter(html) {
        let href = &captures[1];
        if href.starts_with('#') {
            continue;
        }

        if let Some(link) = absolutize(base_url, href) {
            links.insert(link);
            if links.len() >= max_count {
                break;
            }
        }
    }

    links.into_iter().collect()
}

/// Turns an `href` value into an absolute http(s) URL string
fn absolutize(base_url: &Url, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }

    let mut origin = base_url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);

    match origin.join(href) {
        Ok(resolved) if resolved.scheme() == "http" || resolved.scheme() == "https" => {
            Some(resolved.to_string())
        }
        Ok(resolved) => {
            tracing::trace!("Skipping {} link: {}", resolved.scheme(), href);
            None
        }
        Err(e) => {
            tracing::trace!("Skipping unresolvable link {}: {}", href, e);
            None
        }
    }
}
