//! Chain orchestration: source page → redirector → file host → token
//! page → final media hosts
//!
//! Drives the fixed multi-site hop sequence, combining the fetcher, the
//! page index, the extraction strategies, and the redirect chaser. Every
//! missing link or failed fetch aborts only its own task's chain with a
//! descriptive event; only the initial fetch of a source or drive page
//! is an error at the operation boundary.

use std::sync::Arc;

use regex::Regex;

use crate::client::{ChainClient, ClientConfig};
use crate::error::{ChainError, Result};
use crate::events::EventLog;
use crate::extract::{dedup_candidates, select_next, Strategy};
use crate::page::PageIndex;
use crate::pool::{self, DEFAULT_CONCURRENCY};
use crate::redirect::chase;
use crate::types::{
    MediaReport, Quality, ResolutionOutcome, ResolutionTask, SourceReport, SourceResult,
};
use crate::url::{build_drive_url, extract_media_id, normalize_backup_link, resolve_relative};

/// Site knowledge for the resolution chain
///
/// The intermediary hosts rotate domains and markup frequently, so every
/// matching rule is data rather than code. The value is immutable once
/// the resolver is constructed; concurrent tasks read it through a
/// shared reference and never mutate it.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Href substrings that identify redirector links on a source page
    pub redirector_keywords: Vec<String>,
    /// Anchor texts (compared uppercased) that identify redirector links
    pub redirector_texts: Vec<String>,
    /// Exact file-host domains, tried before the keyword fallback
    pub file_host_domains: Vec<String>,
    /// Href substring fallback for the file-host link
    pub file_host_keywords: Vec<String>,
    /// Known-bad lookalike hosts, never accepted
    pub file_host_decoys: Vec<String>,
    /// Keyword identifying the drive host in a href or link text
    pub drive_keyword: String,
    /// Path segment a genuine drive link must carry
    pub drive_path_token: String,
    /// Base URL of the drive host; supplied externally because these
    /// domains rotate
    pub drive_base_url: String,
    /// Element id of the "generate token" action on a drive page
    pub generate_attr_id: String,
    /// Href substring fallback for the generate action
    pub generate_keywords: Vec<String>,
    /// Element id of the secondary redirector on a token page
    pub secondary_attr_id: String,
    /// Href substring fallback for the secondary redirector
    pub secondary_keywords: Vec<String>,
    /// Host patterns of the primary provider's final media URLs
    pub primary_hosts: Vec<String>,
    /// Host pattern of the backup provider's share links
    pub backup_host: String,
    /// Redirect chase hop bound
    pub max_redirect_hops: usize,
    /// Worker pool width for source-page resolution
    pub concurrency: usize,
    pub client: ClientConfig,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            redirector_keywords: vec!["gyanigurus".into(), "gurl".into()],
            redirector_texts: vec!["DOWNLOAD".into(), "G-DRIVE".into()],
            file_host_domains: vec!["hubdrive.space".into(), "drivehub.cfd".into()],
            file_host_keywords: vec!["hubdrive".into()],
            file_host_decoys: vec!["hubdrive.sbs".into()],
            drive_keyword: "hubcloud".into(),
            drive_path_token: "/drive/".into(),
            drive_base_url: "https://hubcloud.ink".into(),
            generate_attr_id: "download".into(),
            generate_keywords: vec!["hubcloud.php".into()],
            secondary_attr_id: "vd".into(),
            secondary_keywords: vec!["goto".into(), "redirect".into(), "router".into()],
            primary_hosts: vec!["r2.dev".into(), "workers.dev".into()],
            backup_host: "pixeldrain".into(),
            max_redirect_hops: 6,
            concurrency: DEFAULT_CONCURRENCY,
            client: ClientConfig::default(),
        }
    }
}

/// High-level chain resolver
///
/// Exposes the two boundary operations:
/// [`resolve_source_page`](Self::resolve_source_page) and
/// [`resolve_media_id`](Self::resolve_media_id).
pub struct ChainResolver {
    config: Arc<ChainConfig>,
    /// Precompiled rules matching the primary provider's media URLs,
    /// applied to hrefs first and raw page text second
    primary_rules: Vec<Strategy>,
}

impl ChainResolver {
    /// Create a resolver with default site knowledge
    pub fn new() -> Result<Self> {
        Self::with_config(ChainConfig::default())
    }

    /// Create a resolver with custom site knowledge
    ///
    /// # Errors
    /// Returns `InvalidPattern` if the terminal-host scan pattern cannot
    /// be compiled from the configured hosts.
    pub fn with_config(config: ChainConfig) -> Result<Self> {
        let scan = terminal_scan_regex(&config.primary_hosts)?;
        let primary_rules = vec![
            Strategy::HrefRegex(scan.clone()),
            Strategy::ContentScan(scan),
        ];
        Ok(Self {
            config: Arc::new(config),
            primary_rules,
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Resolve a source page into one entry per discovered quality chain
    ///
    /// Fetches the source page, discovers redirector links (deduplicated
    /// by href, quality classified from the preceding label), and fans
    /// the chains out on a bounded worker pool. Per-task failures
    /// degrade the result set; only a failure to fetch the source page
    /// itself is an error.
    ///
    /// The returned events are the merged task logs in completion
    /// order, not submission order.
    pub async fn resolve_source_page(&self, source_url: &str) -> Result<SourceReport> {
        let mut log = EventLog::new();
        log.info(format!("Resolution started on {source_url}"));

        let client = ChainClient::with_config(&self.config.client)?;
        let fetched = client.fetch(source_url, None).await;
        if !fetched.is_success() {
            return Err(ChainError::SourceUnreachable {
                url: source_url.to_string(),
                reason: fetched.describe(),
            });
        }

        let index = PageIndex::parse(&fetched.body.unwrap_or_default());
        let tasks = discover_tasks(&index, &self.config);
        log.info(format!("Found {} potential chain(s)", tasks.len()));

        let config = Arc::clone(&self.config);
        let outcomes = pool::run_all(tasks, self.config.concurrency, move |task| {
            process_chain(Arc::clone(&config), task)
        })
        .await;

        let mut results = Vec::new();
        for outcome in outcomes {
            log.extend(outcome.events);
            if let (Some(media_id), Some(host_link)) = (outcome.media_id, outcome.host_link) {
                results.push(SourceResult {
                    quality: outcome.label,
                    media_id,
                    host_link,
                });
            }
        }
        log.info(format!(
            "Resolution completed; {} media id(s) found",
            results.len()
        ));

        Ok(SourceReport {
            results,
            events: log.into_events(),
        })
    }

    /// Resolve a media id into direct provider links
    ///
    /// Fetches the drive page for the id, follows the generate-token
    /// action, and scans the token page for the primary provider link
    /// (directly first, then through the redirect chaser) and,
    /// independently, the backup provider link. Extraction misses after
    /// the initial fetch degrade the report instead of failing the call.
    pub async fn resolve_media_id(&self, media_id: &str) -> Result<MediaReport> {
        let media_id = media_id.trim();
        if media_id.is_empty() || !media_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ChainError::InvalidId(media_id.to_string()));
        }

        let mut log = EventLog::new();
        let client = ChainClient::with_config(&self.config.client)?;

        let drive_url = build_drive_url(&self.config.drive_base_url, media_id);
        log.info(format!("Resolving media id {media_id} via {drive_url}"));

        let fetched = client.fetch(&drive_url, None).await;
        if !fetched.is_success() {
            return Err(ChainError::FileHostUnreachable {
                url: drive_url,
                reason: fetched.describe(),
            });
        }
        let drive_final_url = fetched.final_url.clone();
        let index = PageIndex::parse(&fetched.body.unwrap_or_default());

        let generate_rules = [
            Strategy::AttrId(self.config.generate_attr_id.clone()),
            Strategy::HrefKeyword {
                keywords: self.config.generate_keywords.clone(),
                exclude: Vec::new(),
            },
        ];
        let Some(generate) = select_next(&index, &generate_rules) else {
            log.error("Generate action link not found on drive page");
            return Ok(MediaReport {
                primary: None,
                backup: None,
                events: log.into_events(),
            });
        };
        let token_url = resolve_relative(&drive_final_url, &generate.url);
        log.success(format!("Generate action found: {token_url}"));

        let fetched = client.fetch(&token_url, Some(&drive_url)).await;
        if !fetched.is_success() {
            log.error(format!(
                "Failed to fetch token page ({})",
                fetched.describe()
            ));
            return Ok(MediaReport {
                primary: None,
                backup: None,
                events: log.into_events(),
            });
        }
        let token_final_url = fetched.final_url.clone();
        let token_index = PageIndex::parse(&fetched.body.unwrap_or_default());

        let primary = self
            .extract_primary(&client, &token_index, &token_final_url, &mut log)
            .await;
        let backup = self.extract_backup(&token_index, &mut log);

        Ok(MediaReport {
            primary,
            backup,
            events: log.into_events(),
        })
    }

    /// Primary provider: direct page scan first, redirect chase second
    async fn extract_primary(
        &self,
        client: &ChainClient,
        token_index: &PageIndex,
        token_url: &str,
        log: &mut EventLog,
    ) -> Option<String> {
        if let Some(found) = select_next(token_index, &self.primary_rules) {
            log.success(format!("Primary link found on token page: {}", found.url));
            return Some(found.url);
        }

        let secondary_rules = [
            Strategy::AttrId(self.config.secondary_attr_id.clone()),
            Strategy::HrefKeyword {
                keywords: self.config.secondary_keywords.clone(),
                exclude: Vec::new(),
            },
        ];
        let Some(secondary) = select_next(token_index, &secondary_rules) else {
            log.error("Primary provider link not found by any strategy");
            return None;
        };

        let start = resolve_relative(token_url, &secondary.url);
        log.info(format!("Following secondary redirector: {start}"));
        chase(
            client,
            &start,
            Some(token_url),
            self.config.max_redirect_hops,
            &self.config.primary_hosts,
            &self.primary_rules,
            log,
        )
        .await
    }

    /// Backup provider: independent scan of the same token page
    fn extract_backup(&self, token_index: &PageIndex, log: &mut EventLog) -> Option<String> {
        let backup_rule = [Strategy::HrefKeyword {
            keywords: vec![self.config.backup_host.clone()],
            exclude: Vec::new(),
        }];
        let found = select_next(token_index, &backup_rule)?;

        match normalize_backup_link(&found.url) {
            Some(direct) => {
                log.success(format!("Backup link normalized: {direct}"));
                Some(direct)
            }
            None => {
                // The id pattern not matching is a warning, not an
                // error: the raw link may still be usable.
                log.warning(format!(
                    "Backup link id pattern did not match; keeping raw link {}",
                    found.url
                ));
                Some(found.url)
            }
        }
    }
}

/// Discovers one resolution task per redirector link on a source page
///
/// Candidates are deduplicated by href before matching, so several
/// buttons pointing at the same chain produce a single task. Quality is
/// classified from the nearest preceding label element.
fn discover_tasks(index: &PageIndex, config: &ChainConfig) -> Vec<ResolutionTask> {
    let mut tasks = Vec::new();
    for candidate in dedup_candidates(index.all_links()) {
        let href = candidate.url.to_lowercase();
        if !config
            .redirector_keywords
            .iter()
            .any(|k| href.contains(&k.to_lowercase()))
        {
            continue;
        }
        let text = candidate.text.to_uppercase();
        if !config.redirector_texts.iter().any(|t| text.contains(t)) {
            continue;
        }

        let label = index
            .preceding_label(&candidate)
            .map(Quality::classify)
            .unwrap_or(Quality::Unknown);
        tasks.push(ResolutionTask {
            label,
            source_url: candidate.url,
        });
    }
    tasks
}

/// Runs one quality chain to its terminal hop
///
/// Owns its task, its event log, and its own HTTP client identity, so
/// nothing here is shared with sibling chains.
async fn process_chain(config: Arc<ChainConfig>, task: ResolutionTask) -> ResolutionOutcome {
    let mut log = EventLog::new();
    let label = task.label;
    log.info(format!("[{label}] Chain started"));

    let client = match ChainClient::with_config(&config.client) {
        Ok(client) => client,
        Err(e) => {
            log.error(format!("[{label}] HTTP client setup failed: {e}"));
            return aborted(label, log);
        }
    };

    // Hop 1: redirector page, look for the file-host link
    let fetched = client.fetch(&task.source_url, None).await;
    if !fetched.is_success() {
        log.error(format!(
            "[{label}] Failed to fetch redirector page ({})",
            fetched.describe()
        ));
        return aborted(label, log);
    }
    let redirector_url = fetched.final_url.clone();
    let index = PageIndex::parse(&fetched.body.unwrap_or_default());

    let file_host_rules = [
        Strategy::Domain {
            hosts: config.file_host_domains.clone(),
            exclude: config.file_host_decoys.clone(),
        },
        Strategy::HrefKeyword {
            keywords: config.file_host_keywords.clone(),
            exclude: config.file_host_decoys.clone(),
        },
    ];
    let Some(file_host) = select_next(&index, &file_host_rules) else {
        log.error(format!(
            "[{label}] File host link not found on redirector page"
        ));
        return aborted(label, log);
    };
    let file_host_url = resolve_relative(&redirector_url, &file_host.url);
    log.success(format!("[{label}] File host link found: {file_host_url}"));

    // Hop 2: file-host page, look for the drive link
    let fetched = client.fetch(&file_host_url, Some(&task.source_url)).await;
    if !fetched.is_success() {
        log.error(format!(
            "[{label}] Failed to fetch file host page ({})",
            fetched.describe()
        ));
        return aborted(label, log);
    }
    let file_host_final_url = fetched.final_url.clone();
    let index = PageIndex::parse(&fetched.body.unwrap_or_default());

    let drive_rules = [Strategy::HostOrText {
        keyword: config.drive_keyword.clone(),
        path_token: config.drive_path_token.clone(),
    }];
    let Some(drive) = select_next(&index, &drive_rules) else {
        log.error(format!(
            "[{label}] Drive link not found on file host page"
        ));
        return aborted(label, log);
    };
    let drive_url = resolve_relative(&file_host_final_url, &drive.url);
    log.success(format!("[{label}] Drive link found: {drive_url}"));

    match extract_media_id(&drive_url) {
        Some(media_id) => {
            log.success(format!("[{label}] Media id extracted: {media_id}"));
            ResolutionOutcome {
                label,
                media_id: Some(media_id),
                host_link: Some(drive_url),
                events: log.into_events(),
            }
        }
        None => {
            log.warning(format!(
                "[{label}] Drive link found but the id pattern did not match"
            ));
            ResolutionOutcome {
                label,
                media_id: None,
                host_link: Some(drive_url),
                events: log.into_events(),
            }
        }
    }
}

fn aborted(label: Quality, log: EventLog) -> ResolutionOutcome {
    ResolutionOutcome {
        label,
        media_id: None,
        host_link: None,
        events: log.into_events(),
    }
}

/// Builds the regex matching a full URL on one of the given hosts
fn terminal_scan_regex(hosts: &[String]) -> Result<Regex> {
    let alternation = hosts
        .iter()
        .map(|h| regex::escape(h))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r#"(https?://[^"'\s<>]*(?:{alternation})[^"'\s<>]*)"#);
    Regex::new(&pattern).map_err(|e| ChainError::InvalidPattern(e.to_string()))
}
