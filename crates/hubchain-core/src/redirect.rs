//! Bounded redirect chase with an embedded-parameter fast path
//!
//! Follows a chain of HTTP redirects up to a fixed hop count. Each hop
//! has three observable outcomes: another redirect (possibly carrying
//! the final destination as an embedded query parameter — the fast
//! path), a terminal HTML page (scanned for the final link and never
//! followed further), or a failure, which ends the chase empty-handed.
//!
//! When more than one extraction path could succeed, the earlier hop
//! always wins: the fast path is checked before the location-host test,
//! and a terminal page is only scanned when the hop offered no redirect.

use crate::client::{ChainClient, HopResponse};
use crate::events::EventLog;
use crate::extract::{select_next, Strategy};
use crate::page::PageIndex;
use crate::url::{decode_embedded_url, is_terminal_url, resolve_relative};

/// Mutable state of one chase, owned by a single task
#[derive(Debug, Clone)]
pub struct ChainState {
    pub current_url: String,
    pub referer_url: Option<String>,
    pub hops_taken: usize,
}

/// Follows redirects from `start_url` until a terminal media URL is found
///
/// `terminal_hosts` are the substring patterns that identify final media
/// hosts; `scan_rules` are the strategies applied to a terminal page
/// body. The same referer is forwarded on every hop. Performs at most
/// `max_hops` HTTP requests, which guarantees termination against
/// redirect loops.
pub async fn chase(
    client: &ChainClient,
    start_url: &str,
    referer: Option<&str>,
    max_hops: usize,
    terminal_hosts: &[String],
    scan_rules: &[Strategy],
    log: &mut EventLog,
) -> Option<String> {
    let mut state = ChainState {
        current_url: start_url.to_string(),
        referer_url: referer.map(str::to_string),
        hops_taken: 0,
    };

    while state.hops_taken < max_hops {
        let response = client
            .fetch_once(&state.current_url, state.referer_url.as_deref())
            .await;
        state.hops_taken += 1;

        match response {
            HopResponse::Redirect { location } => {
                let target = resolve_relative(&state.current_url, &location);

                // Fast path: the redirect target embeds the final URL
                if let Some(embedded) = decode_embedded_url(&target, terminal_hosts) {
                    log.success(format!(
                        "Redirect parameter decoded to final link after {} hop(s)",
                        state.hops_taken
                    ));
                    return Some(embedded);
                }

                if is_terminal_url(&target, terminal_hosts) {
                    log.success(format!(
                        "Redirect landed on media host after {} hop(s)",
                        state.hops_taken
                    ));
                    return Some(target);
                }

                log.info(format!("Hop {}: redirect to {}", state.hops_taken, target));
                state.current_url = target;
            }
            HopResponse::Page { body } => {
                // A terminal page ends the chase whether or not it
                // contains the link.
                let index = PageIndex::parse(&body);
                return match select_next(&index, scan_rules) {
                    Some(found) => {
                        log.success(format!(
                            "Final link found on landing page after {} hop(s)",
                            state.hops_taken
                        ));
                        Some(found.url)
                    }
                    None => {
                        log.warning(format!(
                            "Landing page at {} has no recognizable media link",
                            state.current_url
                        ));
                        None
                    }
                };
            }
            HopResponse::Failed { detail } => {
                log.error(format!(
                    "Redirect chase failed at {} ({})",
                    state.current_url, detail
                ));
                return None;
            }
        }
    }

    log.warning(format!(
        "Redirect chase stopped after {} hops without reaching a media host",
        max_hops
    ));
    None
}
