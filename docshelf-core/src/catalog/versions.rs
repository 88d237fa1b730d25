//! Version selection over artifact lists
//!
//! Pure, side-effect-free functions. Version matching is deliberately
//! loose: an unanchored, case-insensitive substring match with an optional
//! leading `v`. That means `"1.5"` matches `"EventPlanning-v1.50"` as well
//! as `"v1.5"`; callers have shared links relying on that forgiveness, so
//! it must not be tightened.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::store::Artifact;

/// Sentinel used in human-readable messages when no version-like
/// substring exists in any artifact name.
pub const NONE_DETECTED: &str = "none detected";

/// First run of digits and dots, optionally preceded by `v`/`V`.
static VERSION_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)v?[0-9.]+").expect("version token pattern is a valid regex"));

/// Pick the artifact with the maximum creation timestamp.
///
/// Ties are broken by first-seen order, so the result is stable for a
/// given input list. `None` means "no artifacts available" and is a
/// normal outcome, not an error.
pub fn select_latest(artifacts: &[Artifact]) -> Option<&Artifact> {
    let mut latest: Option<&Artifact> = None;
    for artifact in artifacts {
        match latest {
            Some(current) if artifact.created_at <= current.created_at => {}
            _ => latest = Some(artifact),
        }
    }
    latest
}

/// Find the first artifact whose name contains the requested version.
///
/// The matcher escapes regex metacharacters in `version` (so `.` stays a
/// literal dot) and allows an optional leading `v`/`V`, case-insensitive.
/// `None` means "version not found", a normal outcome.
pub fn select_by_version<'a>(artifacts: &'a [Artifact], version: &str) -> Option<&'a Artifact> {
    let pattern = format!("(?i)v?{}", regex::escape(version.trim()));
    let matcher = Regex::new(&pattern).ok()?;
    artifacts.iter().find(|a| matcher.is_match(&a.name))
}

/// Extract the version-like token from each artifact name, in input
/// order. Duplicates are kept; artifacts without a token are skipped.
pub fn detected_versions(artifacts: &[Artifact]) -> Vec<String> {
    artifacts
        .iter()
        .filter_map(|a| VERSION_TOKEN.find(&a.name))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Human-readable list of detected versions for error messages, with the
/// [`NONE_DETECTED`] sentinel when nothing version-like exists. Never used
/// for matching logic.
pub fn describe_versions(artifacts: &[Artifact]) -> String {
    let versions = detected_versions(artifacts);
    if versions.is_empty() {
        NONE_DETECTED.to_string()
    } else {
        versions.join(", ")
    }
}

#[cfg(test)]
mod version_tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn artifact(name: &str, ts: i64) -> Artifact {
        Artifact::new(
            name,
            Utc.timestamp_opt(ts, 0).unwrap(),
            format!("locator://{name}"),
        )
    }

    #[test]
    fn test_select_latest_returns_max_created() {
        let artifacts = vec![
            artifact("T-v1.0", 100),
            artifact("T-v3.0", 300),
            artifact("T-v2.0", 200),
        ];
        assert_eq!(select_latest(&artifacts).unwrap().name, "T-v3.0");
    }

    #[test]
    fn test_select_latest_tie_keeps_first_seen() {
        let artifacts = vec![
            artifact("first", 100),
            artifact("second", 100),
            artifact("older", 50),
        ];
        assert_eq!(select_latest(&artifacts).unwrap().name, "first");
    }

    #[test]
    fn test_select_latest_empty_is_none() {
        assert!(select_latest(&[]).is_none());
    }

    #[test]
    fn test_select_by_version_case_insensitive_optional_v() {
        let artifacts = vec![artifact("T-v1.0", 100), artifact("T-v2.0", 200)];
        assert_eq!(
            select_by_version(&artifacts, "2.0").unwrap().name,
            "T-v2.0"
        );
        assert_eq!(
            select_by_version(&artifacts, "V2.0").unwrap().name,
            "T-v2.0"
        );
        assert_eq!(
            select_by_version(&artifacts, "v1.0").unwrap().name,
            "T-v1.0"
        );
    }

    #[test]
    fn test_select_by_version_miss_is_none() {
        let artifacts = vec![artifact("T-v1.0", 100)];
        assert!(select_by_version(&artifacts, "9.9").is_none());
    }

    #[test]
    fn test_select_by_version_dot_is_literal() {
        // "1.5" must not behave as "1 followed by any char followed by 5"
        let artifacts = vec![artifact("T-v1x5", 100), artifact("T-v1.5", 200)];
        assert_eq!(
            select_by_version(&artifacts, "1.5").unwrap().name,
            "T-v1.5"
        );
    }

    #[test]
    fn test_select_by_version_is_unanchored() {
        // Loose matching kept on purpose: "1.5" also matches "v1.50".
        let artifacts = vec![artifact("EventPlanning-v1.50", 100)];
        assert_eq!(
            select_by_version(&artifacts, "1.5").unwrap().name,
            "EventPlanning-v1.50"
        );
    }

    #[test]
    fn test_select_by_version_first_match_in_input_order() {
        let artifacts = vec![artifact("A-v1.50", 100), artifact("B-v1.5", 200)];
        assert_eq!(
            select_by_version(&artifacts, "1.5").unwrap().name,
            "A-v1.50"
        );
    }

    #[test]
    fn test_detected_versions_in_input_order() {
        let artifacts = vec![
            artifact("T-v2.0", 200),
            artifact("T-v1.0", 100),
            artifact("notes", 50),
        ];
        assert_eq!(detected_versions(&artifacts), vec!["v2.0", "v1.0"]);
    }

    #[test]
    fn test_describe_versions_sentinel() {
        let artifacts = vec![artifact("README", 100), artifact("notes", 200)];
        assert_eq!(describe_versions(&artifacts), NONE_DETECTED);
        assert_eq!(describe_versions(&[]), NONE_DETECTED);
    }
}
