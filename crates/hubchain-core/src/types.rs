//! Core data types for the hubchain resolver
//!
//! Contains the task, outcome, and report structures exchanged between
//! the resolver, the task pool, and the boundary layer.

use serde::{Deserialize, Serialize};

use crate::events::LogEvent;

/// Coarse quality label inferred from text near a discovered link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "4K")]
    FourK,
    Unknown,
}

impl Quality {
    /// Classifies freeform label text into a quality bucket
    ///
    /// Fixed case-insensitive keyword map; first match wins; anything
    /// without a recognized keyword is `Unknown`. Never fails.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("480p") {
            Quality::P480
        } else if lower.contains("720p") {
            Quality::P720
        } else if lower.contains("1080p") {
            Quality::P1080
        } else if lower.contains("4k") || lower.contains("2160p") {
            Quality::FourK
        } else {
            Quality::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
            Quality::FourK => "4K",
            Quality::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One chain entry discovered on a source page
///
/// Immutable; consumed exactly once by the task pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionTask {
    /// Quality label inferred from the surrounding page context
    pub label: Quality,
    /// Redirector URL the chain starts from
    pub source_url: String,
}

/// Terminal value produced by one resolution chain
///
/// `media_id` and `host_link` are present only when the corresponding
/// extraction actually matched; absence means "not found", never
/// "found but empty".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOutcome {
    pub label: Quality,
    pub media_id: Option<String>,
    pub host_link: Option<String>,
    /// Chronologically ordered events for this task only
    pub events: Vec<LogEvent>,
}

/// One fully resolved entry in a [`SourceReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceResult {
    pub quality: Quality,
    pub media_id: String,
    pub host_link: String,
}

/// Aggregate result of resolving a source page
///
/// `events` is the merged log across all tasks in completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub results: Vec<SourceResult>,
    pub events: Vec<LogEvent>,
}

/// Result of resolving a single media id into direct provider links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaReport {
    /// Primary provider direct link, when its extraction matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    /// Backup provider direct link, when its extraction matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
    pub events: Vec<LogEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_qualities() {
        assert_eq!(Quality::classify("480p x264"), Quality::P480);
        assert_eq!(Quality::classify("720p HEVC"), Quality::P720);
        assert_eq!(Quality::classify("Movie 1080p BluRay"), Quality::P1080);
        assert_eq!(Quality::classify("4k HDR"), Quality::FourK);
        assert_eq!(Quality::classify("2160p remux"), Quality::FourK);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(Quality::classify("720P HEVC"), Quality::P720);
        assert_eq!(Quality::classify("4K"), Quality::FourK);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(Quality::classify(""), Quality::Unknown);
        assert_eq!(Quality::classify("HDCAM"), Quality::Unknown);
    }

    #[test]
    fn test_classify_first_match_wins() {
        // 480p is checked first, so a mixed label picks it
        assert_eq!(Quality::classify("480p + 1080p pack"), Quality::P480);
    }

    #[test]
    fn test_quality_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Quality::P1080).unwrap(), "\"1080p\"");
        assert_eq!(serde_json::to_string(&Quality::FourK).unwrap(), "\"4K\"");
        assert_eq!(
            serde_json::to_string(&Quality::Unknown).unwrap(),
            "\"Unknown\""
        );
    }

    #[test]
    fn test_media_report_absent_keys_are_skipped() {
        let report = MediaReport {
            primary: None,
            backup: None,
            events: Vec::new(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("primary"));
        assert!(!json.contains("backup"));
    }

    #[test]
    fn test_source_report_round_trip() {
        let report = SourceReport {
            results: vec![SourceResult {
                quality: Quality::P720,
                media_id: "xy12ab".to_string(),
                host_link: "https://hubcloud.ink/drive/xy12ab".to_string(),
            }],
            events: Vec::new(),
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: SourceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.results, report.results);
    }
}
