//! Per-line anchor scanning.
//!
//! A heuristic, not an HTML parser. Each line is scanned once, left to
//! right, for the first `<a href="http` and the href value is read up to the
//! next double quote on the same line. Anchors split across lines, single
//! quoted or unquoted hrefs, and relative links are not seen.

use crate::crawl_url::CrawlUrl;
use tracing::debug;

/// Opening of an anchor whose target is an absolute http(s) address.
pub const ANCHOR_MARKER: &str = "<a href=\"http";

/// Bytes of the marker before the href value starts (`<a href="`).
const HREF_OFFSET: usize = "<a href=\"".len();

/// Returns the quoted href value of the first absolute anchor on `line`,
/// without validating it.
///
/// A value with no closing quote before the end of the line is discarded
/// rather than returned truncated.
pub fn extract_candidate(line: &str) -> Option<&str> {
    let start = line.find(ANCHOR_MARKER)? + HREF_OFFSET;
    let rest = &line[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Returns the first absolute link on `line`, if it is a well-formed URL.
pub fn extract_link(line: &str) -> Option<CrawlUrl> {
    let candidate = extract_candidate(line)?;
    match CrawlUrl::parse(candidate) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!("Discarding malformed link: {}", e);
            None
        }
    }
}
