//! URL helper functions for the resolution chain
//!
//! Provides media id extraction, relative link resolution, embedded
//! redirect-parameter decoding, and provider link normalization.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Matches the media id segment of a file-host drive link
static MEDIA_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/drive/([a-zA-Z0-9]+)").expect("valid literal pattern"));

/// Matches the file id segment of a backup provider share link
static BACKUP_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pixeldrain\.[a-z]+/u/([a-zA-Z0-9]+)").expect("valid literal pattern"));

/// Builds the file-host drive page URL for a media id
///
/// The base domain is externally supplied because these hosts rotate
/// domains frequently.
///
/// # Example
/// ```
/// use hubchain_core::url::build_drive_url;
/// let url = build_drive_url("https://hubcloud.ink", "xy12ab");
/// assert_eq!(url, "https://hubcloud.ink/drive/xy12ab");
/// ```
pub fn build_drive_url(base: &str, id: &str) -> String {
    format!("{}/drive/{}", base.trim_end_matches('/'), id)
}

/// Extracts the media id from a drive-style href
///
/// Returns `None` when the href carries no `/drive/{id}` segment.
///
/// # Example
/// ```
/// use hubchain_core::url::extract_media_id;
/// let id = extract_media_id("https://hubcloud.ink/drive/xy12ab");
/// assert_eq!(id, Some("xy12ab".to_string()));
/// ```
pub fn extract_media_id(href: &str) -> Option<String> {
    MEDIA_ID_RE
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Resolves a possibly-relative href against the page it was found on
///
/// Falls back to the raw href when either side fails to parse; the
/// downstream fetch will surface the failure as a transport error.
pub fn resolve_relative(base: &str, href: &str) -> String {
    if let Ok(base_url) = Url::parse(base)
        && let Ok(joined) = base_url.join(href)
    {
        return joined.to_string();
    }
    href.to_string()
}

/// Decodes a terminal URL embedded as a query parameter of a redirect target
///
/// Some redirectors pass the final destination as a URL-encoded query
/// parameter instead of redirecting to it directly. This inspects the
/// common carrier parameters and accepts only an absolute http(s) value
/// that matches one of the known terminal host patterns. Malformed or
/// unexpected input fails closed with `None`.
pub fn decode_embedded_url(location: &str, terminal_hosts: &[String]) -> Option<String> {
    let parsed = Url::parse(location).ok()?;
    for (key, value) in parsed.query_pairs() {
        if !matches!(key.as_ref(), "url" | "link" | "r" | "go") {
            continue;
        }
        let candidate = value.into_owned();
        if (candidate.starts_with("http://") || candidate.starts_with("https://"))
            && terminal_hosts.iter().any(|host| candidate.contains(host))
        {
            return Some(candidate);
        }
    }
    None
}

/// Checks whether a URL points at one of the known terminal media hosts
pub fn is_terminal_url(url: &str, terminal_hosts: &[String]) -> bool {
    terminal_hosts.iter().any(|host| url.contains(host))
}

/// Normalizes a backup provider share link into its direct-access form
///
/// `https://pixeldrain.net/u/{id}` becomes
/// `https://pixeldrain.net/api/file/{id}?download`. Returns `None` when
/// the expected id pattern does not match; the caller keeps the raw link
/// and logs a warning, since the link may still be independently useful.
pub fn normalize_backup_link(href: &str) -> Option<String> {
    let caps = BACKUP_ID_RE.captures(href)?;
    let id = caps.get(1)?.as_str();
    Some(format!("https://pixeldrain.net/api/file/{}?download", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_build_drive_url() {
        assert_eq!(
            build_drive_url("https://hubcloud.ink", "xy12ab"),
            "https://hubcloud.ink/drive/xy12ab"
        );
    }

    #[test]
    fn test_build_drive_url_trailing_slash() {
        assert_eq!(
            build_drive_url("https://hubcloud.ink/", "xy12ab"),
            "https://hubcloud.ink/drive/xy12ab"
        );
    }

    #[test]
    fn test_extract_media_id() {
        assert_eq!(
            extract_media_id("https://hubcloud.ink/drive/p1zc1n0dfqhd0ad"),
            Some("p1zc1n0dfqhd0ad".to_string())
        );
    }

    #[test]
    fn test_extract_media_id_stops_at_non_alnum() {
        assert_eq!(
            extract_media_id("https://hubcloud.ink/drive/xy12ab?ref=top"),
            Some("xy12ab".to_string())
        );
    }

    #[test]
    fn test_extract_media_id_missing_segment() {
        assert_eq!(extract_media_id("https://hubcloud.ink/file/xy12ab"), None);
        assert_eq!(extract_media_id(""), None);
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve_relative("https://hubcloud.ink/drive/xy12ab", "/token/xy12ab"),
            "https://hubcloud.ink/token/xy12ab"
        );
    }

    #[test]
    fn test_resolve_relative_absolute_href_wins() {
        assert_eq!(
            resolve_relative("https://hubdrive.space/file/1", "https://other.example/x"),
            "https://other.example/x"
        );
    }

    #[test]
    fn test_resolve_relative_unparseable_base() {
        assert_eq!(resolve_relative("not a url", "/x"), "/x");
    }

    fn terminal() -> Vec<String> {
        vec!["pixeldrain".to_string(), "r2.dev".to_string()]
    }

    #[test]
    fn test_decode_embedded_url_fast_path() {
        let location = "https://goto.example/jump?url=https%3A%2F%2Ffiles.r2.dev%2Fmovie.mkv";
        assert_eq!(
            decode_embedded_url(location, &terminal()),
            Some("https://files.r2.dev/movie.mkv".to_string())
        );
    }

    #[test]
    fn test_decode_embedded_url_alternate_keys() {
        let location = "https://goto.example/jump?link=https%3A%2F%2Fpixeldrain.net%2Fu%2FAbCd12";
        assert_eq!(
            decode_embedded_url(location, &terminal()),
            Some("https://pixeldrain.net/u/AbCd12".to_string())
        );
    }

    #[test]
    fn test_decode_embedded_url_rejects_non_terminal_target() {
        let location = "https://goto.example/jump?url=https%3A%2F%2Fevil.example%2Fx";
        assert_eq!(decode_embedded_url(location, &terminal()), None);
    }

    #[test]
    fn test_decode_embedded_url_rejects_relative_value() {
        let location = "https://goto.example/jump?url=%2Fr2.dev%2Flocal";
        assert_eq!(decode_embedded_url(location, &terminal()), None);
    }

    #[test]
    fn test_decode_embedded_url_fails_closed_on_garbage() {
        assert_eq!(decode_embedded_url("not a url at all", &terminal()), None);
        assert_eq!(decode_embedded_url("", &terminal()), None);
    }

    #[test]
    fn test_normalize_backup_link() {
        assert_eq!(
            normalize_backup_link("https://pixeldrain.net/u/AbCd123"),
            Some("https://pixeldrain.net/api/file/AbCd123?download".to_string())
        );
    }

    #[test]
    fn test_normalize_backup_link_alternate_tld() {
        assert_eq!(
            normalize_backup_link("https://pixeldrain.com/u/ZZ99"),
            Some("https://pixeldrain.net/api/file/ZZ99?download".to_string())
        );
    }

    #[test]
    fn test_normalize_backup_link_malformed() {
        assert_eq!(normalize_backup_link("https://pixeldrain.net/l/gallery"), None);
        assert_eq!(normalize_backup_link("https://other.example/u/abc"), None);
    }

    proptest! {
        #[test]
        fn prop_decode_embedded_url_never_panics(input in ".{0,200}") {
            let _ = decode_embedded_url(&input, &terminal());
        }

        #[test]
        fn prop_extract_media_id_is_alphanumeric(input in ".{0,200}") {
            if let Some(id) = extract_media_id(&input) {
                prop_assert!(!id.is_empty());
                prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
            }
        }
    }
}
