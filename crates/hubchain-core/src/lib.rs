//! Hubchain Resolver Core Library
//!
//! Resolves a single source web page describing a media item into direct,
//! playable media URLs by walking a fixed but fragile chain of
//! redirector and file-host pages.
//!
//! # Overview
//!
//! This crate provides:
//! - A browser-identity HTTP client with bounded retry and per-call referer
//! - An HTML page index for link discovery and quality classification
//! - Ordered-fallback extraction strategies for picking the next hop
//! - A bounded redirect chase with an embedded-parameter fast path
//! - A task pool running independent chains concurrently
//!
//! # Example
//!
//! ```no_run
//! use hubchain_core::{ChainResolver, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let resolver = ChainResolver::new()?;
//!
//!     // Discover and resolve every quality chain on a source page
//!     let report = resolver
//!         .resolve_source_page("https://desiremovies.example/some-movie/")
//!         .await?;
//!     for entry in &report.results {
//!         println!("{}: {} ({})", entry.quality, entry.media_id, entry.host_link);
//!     }
//!
//!     // Resolve one media id into direct provider links
//!     if let Some(entry) = report.results.first() {
//!         let media = resolver.resolve_media_id(&entry.media_id).await?;
//!         println!("primary: {:?}, backup: {:?}", media.primary, media.backup);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Best effort
//!
//! The intermediary sites rotate domains and markup; every hop is
//! heuristic and may stop matching at any time. A chain that cannot
//! complete degrades the result set and leaves a descriptive event
//! trail — only an unreachable source or drive page is an error.

mod client;
mod error;
mod events;
pub mod extract;
mod page;
pub mod pool;
mod redirect;
mod resolver;
mod types;
pub mod url;

// Re-export client types
pub use client::{ChainClient, ClientConfig, FetchResult, FetchStatus, HopResponse};

// Re-export error types
pub use error::{ChainError, Result};

// Re-export event types
pub use events::{EventLog, LogEvent, Severity};

// Re-export page index types
pub use page::{LinkCandidate, PageIndex};

// Re-export redirect chase
pub use redirect::{chase, ChainState};

// Re-export main resolver API
pub use resolver::{ChainConfig, ChainResolver};

// Re-export data types
pub use types::{
    MediaReport, Quality, ResolutionOutcome, ResolutionTask, SourceReport, SourceResult,
};
