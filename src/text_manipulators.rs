use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.@-]").expect("valid regex"));

/// `/web/<timestamp>[flags]/`, optionally preceded by the mirror's scheme and host.
static ARCHIVE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-zA-Z]+://[^/]+)?/web/\d+[a-z_]*/").expect("valid regex"));

pub fn extract_text(node: ElementRef) -> String {
    node.text().collect::<String>()
}

/// Drops tab and newline characters, leaving everything else alone.
pub fn strip_line_breaks(text: &str) -> String {
    text.chars().filter(|c| *c != '\t' && *c != '\n').collect()
}

/// The archived listings render the region twice back to back ("CACA, ..."),
/// so only the second half of the first comma segment is kept.
pub fn halve_region(location: &str) -> String {
    let (region, rest) = match location.split_once(',') {
        Some((region, rest)) => (region, Some(rest)),
        None => (location, None),
    };
    let region_len = region.chars().count();
    let region: String = region.chars().skip(region_len / 2).collect();
    match rest {
        Some(rest) => format!("{region},{rest}"),
        None => region,
    }
}

/// Escapes backslashes and double quotes for a double-quoted front-matter value.
pub fn escape_quoted(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || c == '"' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Removes every character outside `[A-Za-z0-9_.@-]`.
pub fn sanitize_filename(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "").into_owned()
}

/// File stem for an event document: spaces become underscores, then the
/// result is sanitized.
pub fn document_file_stem(title: &str) -> String {
    let stem = sanitize_filename(&title.replace(' ', "_"));
    if stem.is_empty() || stem == "." || stem == ".." {
        "untitled".to_string()
    } else {
        stem
    }
}

/// Reduces an href found on an archived page to a path on the mirror.
pub fn to_archive_path(archive_base_url: &str, href: &str) -> String {
    let href = href.trim();
    match href.strip_prefix(archive_base_url) {
        Some("") => "/".to_string(),
        Some(path) => path.to_string(),
        None => href.to_string(),
    }
}

/// Recovers the original site url from an archived link such as
/// `/web/20161112004018/http://example.com/`.
pub fn original_site_url(href: &str) -> Option<String> {
    let href = href.trim();
    let unprefixed = ARCHIVE_PREFIX
        .find(href)
        .map_or(href, |prefix| &href[prefix.end()..]);
    let start = unprefixed.find("http")?;
    Some(unprefixed[start..].to_string())
}

/// Reads the `page` query parameter of a listing url, defaulting to the first page.
pub fn page_number(url: &str) -> u32 {
    let Some((_, query)) = url.split_once('?') else {
        return 1;
    };
    let query = query.split('#').next().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.trim().parse::<u32>().ok())
        .unwrap_or(1)
}
