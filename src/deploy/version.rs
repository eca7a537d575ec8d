// ABOUTME: Decides whether a deployed application needs a fresh push.
// ABOUTME: Compares the live VERSION variable with the one the appstack carries.

use semver::Version;

/// Whether an application at `live` must be pushed to reach `wanted`.
///
/// An unknown live version always needs a push. An empty wanted version is
/// the lowest possible one, so a live application never needs a push for it.
pub fn push_needed(live: Option<&str>, wanted: &str) -> bool {
    let Some(live) = live else {
        return true;
    };
    if wanted.is_empty() {
        return false;
    }

    match (parse(live), parse(wanted)) {
        (Some(live), Some(wanted)) => live < wanted,
        _ => {
            tracing::debug!(live, wanted, "versions are not comparable, pushing");
            true
        }
    }
}

fn parse(version: &str) -> Option<Version> {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    Version::parse(version).ok()
}
