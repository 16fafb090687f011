//! Ordered-fallback link extraction strategies
//!
//! At each hop the resolver must pick the single "next hop" URL out of
//! many candidates on a page. Each [`Strategy`] is a pure match over a
//! [`PageIndex`]; [`select_next`] evaluates the whole candidate set
//! against the first rule before falling through to the next, so a
//! specific match (exact domain) always beats an incidental one
//! (substring in href).

use std::collections::HashSet;

use regex::Regex;
use url::Url;

use crate::page::{LinkCandidate, PageIndex};

/// One link-matching rule
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Exact host (or subdomain) match against an allow list, rejecting
    /// known-bad lookalike hosts
    Domain {
        hosts: Vec<String>,
        exclude: Vec<String>,
    },
    /// Substring-in-href fallback, with the same lookalike exclusion
    HrefKeyword {
        keywords: Vec<String>,
        exclude: Vec<String>,
    },
    /// Keyword in href OR link text, combined with a required path
    /// segment to reject decoy links
    HostOrText {
        keyword: String,
        path_token: String,
    },
    /// Stable element-identifier match on the anchor's `id` attribute
    AttrId(String),
    /// Regex over candidate hrefs
    HrefRegex(Regex),
    /// Regex over the raw page text; yields a synthetic candidate from
    /// the first capture group (or the whole match)
    ContentScan(Regex),
}

impl Strategy {
    fn matches(&self, candidate: &LinkCandidate) -> bool {
        match self {
            Strategy::Domain { hosts, exclude } => {
                let Some(host) = candidate_host(candidate) else {
                    return false;
                };
                !host_in(&host, exclude) && host_in(&host, hosts)
            }
            Strategy::HrefKeyword { keywords, exclude } => {
                let href = candidate.url.to_lowercase();
                keywords.iter().any(|k| href.contains(&k.to_lowercase()))
                    && !exclude.iter().any(|e| href.contains(&e.to_lowercase()))
            }
            Strategy::HostOrText { keyword, path_token } => {
                let keyword = keyword.to_lowercase();
                let href = candidate.url.to_lowercase();
                let text = candidate.text.to_lowercase();
                (href.contains(&keyword) || text.contains(&keyword))
                    && href.contains(&path_token.to_lowercase())
            }
            Strategy::AttrId(id) => candidate.attr_id.as_deref() == Some(id.as_str()),
            Strategy::HrefRegex(re) => re.is_match(&candidate.url),
            Strategy::ContentScan(_) => false,
        }
    }

    /// Evaluates this rule across the whole candidate set
    fn first_match(&self, index: &PageIndex, candidates: &[LinkCandidate]) -> Option<LinkCandidate> {
        if let Strategy::ContentScan(re) = self {
            let caps = re.captures(index.raw())?;
            let m = caps.get(1).or_else(|| caps.get(0))?;
            return Some(LinkCandidate::bare(m.as_str().to_string()));
        }
        candidates.iter().find(|c| self.matches(c)).cloned()
    }
}

/// Picks the next-hop link out of a page using an ordered rule list
///
/// Candidates with an already-seen URL are discarded before rule
/// evaluation, preserving first-seen order. Rules are tried strictly in
/// order: only when rule N matches zero candidates does rule N+1 run.
pub fn select_next(index: &PageIndex, rules: &[Strategy]) -> Option<LinkCandidate> {
    let candidates = dedup_candidates(index.all_links());
    rules
        .iter()
        .find_map(|rule| rule.first_match(index, &candidates))
}

/// Drops candidates whose URL was already seen, keeping first-seen order
pub fn dedup_candidates(links: &[LinkCandidate]) -> Vec<LinkCandidate> {
    let mut seen = HashSet::new();
    links
        .iter()
        .filter(|c| seen.insert(c.url.clone()))
        .cloned()
        .collect()
}

fn candidate_host(candidate: &LinkCandidate) -> Option<String> {
    Url::parse(&candidate.url)
        .ok()?
        .host_str()
        .map(|h| h.to_lowercase())
}

fn host_in(host: &str, list: &[String]) -> bool {
    list.iter().any(|entry| {
        let entry = entry.to_lowercase();
        host == entry || host.ends_with(&format!(".{}", entry))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(html: &str) -> PageIndex {
        PageIndex::parse(html)
    }

    #[test]
    fn test_domain_rule_exact_and_subdomain() {
        let index = index_of(
            r#"<a href="https://cdn.hubdrive.space/file/1">x</a>"#,
        );
        let rule = Strategy::Domain {
            hosts: vec!["hubdrive.space".to_string()],
            exclude: vec![],
        };
        let found = select_next(&index, &[rule]);
        assert_eq!(found.unwrap().url, "https://cdn.hubdrive.space/file/1");
    }

    #[test]
    fn test_domain_rule_rejects_lookalike() {
        let index = index_of(
            r#"<a href="https://hubdrive.space.evil.example/file/1">x</a>"#,
        );
        let rule = Strategy::Domain {
            hosts: vec!["hubdrive.space".to_string()],
            exclude: vec![],
        };
        assert!(select_next(&index, &[rule]).is_none());
    }

    #[test]
    fn test_domain_rule_exclude_wins_over_allow() {
        let index = index_of(r#"<a href="https://ads.hubdrive.space/promo">x</a>"#);
        let rule = Strategy::Domain {
            hosts: vec!["hubdrive.space".to_string()],
            exclude: vec!["ads.hubdrive.space".to_string()],
        };
        assert!(select_next(&index, &[rule]).is_none());
    }

    #[test]
    fn test_ordered_fallback_specific_rule_first() {
        // The generic keyword rule would match the first anchor, but the
        // domain rule is evaluated across the whole set first.
        let index = index_of(
            r#"
            <a href="https://mirror.example/hubdrive-copy">decoy</a>
            <a href="https://hubdrive.space/file/9">real</a>
            "#,
        );
        let rules = [
            Strategy::Domain {
                hosts: vec!["hubdrive.space".to_string()],
                exclude: vec![],
            },
            Strategy::HrefKeyword {
                keywords: vec!["hubdrive".to_string()],
                exclude: vec![],
            },
        ];
        let found = select_next(&index, &rules).unwrap();
        assert_eq!(found.url, "https://hubdrive.space/file/9");
    }

    #[test]
    fn test_fallback_runs_only_on_zero_matches() {
        let index = index_of(r#"<a href="https://mirror.example/hubdrive-copy">fallback</a>"#);
        let rules = [
            Strategy::Domain {
                hosts: vec!["hubdrive.space".to_string()],
                exclude: vec![],
            },
            Strategy::HrefKeyword {
                keywords: vec!["hubdrive".to_string()],
                exclude: vec![],
            },
        ];
        let found = select_next(&index, &rules).unwrap();
        assert_eq!(found.url, "https://mirror.example/hubdrive-copy");
    }

    #[test]
    fn test_host_or_text_requires_path_token() {
        let index = index_of(
            r#"
            <a href="https://hubcloud.ink/home">HubCloud</a>
            <a href="https://hubcloud.ink/drive/xy12ab">Download</a>
            "#,
        );
        let rule = Strategy::HostOrText {
            keyword: "hubcloud".to_string(),
            path_token: "/drive/".to_string(),
        };
        let found = select_next(&index, &[rule]).unwrap();
        assert_eq!(found.url, "https://hubcloud.ink/drive/xy12ab");
    }

    #[test]
    fn test_host_or_text_matches_by_link_text() {
        let index = index_of(r#"<a href="https://mirror.example/drive/ab12">HubCloud</a>"#);
        let rule = Strategy::HostOrText {
            keyword: "hubcloud".to_string(),
            path_token: "/drive/".to_string(),
        };
        assert!(select_next(&index, &[rule]).is_some());
    }

    #[test]
    fn test_attr_id_rule() {
        let index = index_of(
            r#"
            <a href="/other">other</a>
            <a id="download" href="/token/xy12ab">Generate</a>
            "#,
        );
        let found = select_next(&index, &[Strategy::AttrId("download".to_string())]).unwrap();
        assert_eq!(found.url, "/token/xy12ab");
    }

    #[test]
    fn test_href_regex_rule() {
        let index = index_of(r#"<a href="https://files.r2.dev/a.mkv">dl</a>"#);
        let rule = Strategy::HrefRegex(Regex::new(r"r2\.dev").unwrap());
        assert!(select_next(&index, &[rule]).is_some());
    }

    #[test]
    fn test_content_scan_rule() {
        let index = index_of(
            r#"<script>window.location.href = "https://files.r2.dev/a.mkv";</script>"#,
        );
        let rule = Strategy::ContentScan(
            Regex::new(r#"(https?://[^"'\s<>]*r2\.dev[^"'\s<>]*)"#).unwrap(),
        );
        let found = select_next(&index, &[rule]).unwrap();
        assert_eq!(found.url, "https://files.r2.dev/a.mkv");
    }

    #[test]
    fn test_dedup_keeps_first_seen() {
        let index = index_of(
            r#"
            <a href="https://hubdrive.space/file/9">first button</a>
            <a href="https://hubdrive.space/file/9">second button</a>
            "#,
        );
        let deduped = dedup_candidates(index.all_links());
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].text, "first button");
    }

    #[test]
    fn test_no_rules_no_match() {
        let index = index_of(r#"<a href="https://x.example/">x</a>"#);
        assert!(select_next(&index, &[]).is_none());
    }
}
