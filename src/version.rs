//! Schema version helpers

use regex::Regex;
use semver::Version;
use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::error::{ComplianceError, Result};

fn version_format() -> &'static Regex {
    static FORMAT: OnceLock<Regex> = OnceLock::new();
    FORMAT.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("static regex"))
}

/// Whether `version` has the `major.minor.patch` shape
pub fn is_valid_format(version: &str) -> bool {
    version_format().is_match(version)
}

/// Parse a version string, accepting a leading `v`
pub fn parse(version: &str) -> Result<Version> {
    let trimmed = version.strip_prefix('v').unwrap_or(version);
    Version::parse(trimmed).map_err(|_| ComplianceError::InvalidVersion(version.to_string()))
}

/// Compare two version strings.
///
/// Uses semver ordering when both parse, otherwise compares the numeric
/// dot-separated components (missing or non-numeric parts count as 0).
pub fn compare(a: &str, b: &str) -> Ordering {
    match (parse(a), parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => {
            let parts = |v: &str| -> Vec<u64> {
                v.trim_start_matches('v')
                    .split('.')
                    .map(|p| p.parse().unwrap_or(0))
                    .collect()
            };
            let (pa, pb) = (parts(a), parts(b));
            let len = pa.len().max(pb.len());
            for i in 0..len {
                let x = pa.get(i).copied().unwrap_or(0);
                let y = pb.get(i).copied().unwrap_or(0);
                match x.cmp(&y) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            Ordering::Equal
        }
    }
}

/// Whether `source` is strictly newer than `target`
pub fn is_newer(source: &str, target: &str) -> bool {
    compare(source, target) == Ordering::Greater
}
