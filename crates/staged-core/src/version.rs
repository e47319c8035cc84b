//! Semantic-version validity and precedence.
//!
//! Rollout lists are kept newest-first, which needs a comparator that
//! follows semver precedence (pre-release tags below releases, build
//! metadata ignored).

use std::cmp::Ordering;

use semver::Version;
use tracing::warn;

/// Longest version string accepted, matching the npm `semver` package
/// that produced existing rollout documents.
const MAX_LENGTH: usize = 256;

/// Validity check and ordering for version strings.
pub trait VersionComparator {
    fn is_valid(&self, version: &str) -> bool;
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// [`VersionComparator`] backed by the `semver` crate.
///
/// Input is trimmed and may carry a single leading `v` (`v1.2.3`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverComparator;

impl SemverComparator {
    /// Parse a version string, or `None` if it is not valid semver.
    pub fn parse(version: &str) -> Option<Version> {
        if version.len() > MAX_LENGTH {
            return None;
        }
        let trimmed = version.trim();
        let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
        Version::parse(bare).ok()
    }
}

impl VersionComparator for SemverComparator {
    fn is_valid(&self, version: &str) -> bool {
        Self::parse(version).is_some()
    }

    /// Invalid versions sort below every valid one and tie with each other.
    fn compare(&self, a: &str, b: &str) -> Ordering {
        let (pa, pb) = (Self::parse(a), Self::parse(b));
        for (version, parsed) in [(a, &pa), (b, &pb)] {
            if parsed.is_none() {
                warn!(version, "unparseable rollout version sorted last");
            }
        }
        match (pa, pb) {
            (Some(a), Some(b)) => a.cmp_precedence(&b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }
}
