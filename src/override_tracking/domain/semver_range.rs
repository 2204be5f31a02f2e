//! Semantic-range comparison between declared dependency ranges and
//! override pins.
//!
//! npm range grammar is looser than the semver crate's requirement grammar,
//! so parsing is defensive throughout: anything that cannot be interpreted
//! conservatively counts as "the override changes resolution", keeping the
//! corresponding appendix entry alive.

use semver::{Version, VersionReq};

/// Coerces a declared dependency range to its concrete floor version.
///
/// `^4.17.0` -> `4.17.0`, `>=1.2 <2` -> `1.2.0`, `4.x` -> `4.0.0`. Only the
/// first `||` branch is considered. Returns `None` for ranges with no
/// version-shaped content at all.
pub fn coerce_version(range: &str) -> Option<Version> {
    let branch = range.split("||").next()?.trim();
    let token = branch.split_whitespace().next()?;
    let stripped = token
        .trim_start_matches(['^', '~', '=', '>', '<'])
        .trim_start_matches('v');
    if stripped.is_empty() {
        return None;
    }

    if let Ok(version) = Version::parse(stripped) {
        return Some(version);
    }

    // Partial or wildcard version: keep numeric leading components, zero the
    // rest, pad to three.
    let mut parts: Vec<String> = stripped
        .split('.')
        .take(3)
        .map(|part| {
            let numeric = part.split(['-', '+']).next().unwrap_or("");
            if !numeric.is_empty() && numeric.chars().all(|c| c.is_ascii_digit()) {
                numeric.to_string()
            } else {
                "0".to_string()
            }
        })
        .collect();
    while parts.len() < 3 {
        parts.push("0".to_string());
    }
    Version::parse(&parts.join(".")).ok()
}

/// Parses an override pin into matchable requirements, one per `||` branch.
///
/// A bare version pins exactly (`4.17.21` -> `=4.17.21`); ranged pins
/// (`^4.0.1`, `>=2 <3`) keep their own semantics. Returns `None` when no
/// branch parses.
pub fn pin_requirements(pin: &str) -> Option<Vec<VersionReq>> {
    if Version::parse(pin.trim()).is_ok() {
        return VersionReq::parse(&format!("={}", pin.trim()))
            .ok()
            .map(|req| vec![req]);
    }

    let reqs: Vec<VersionReq> = pin
        .split("||")
        .filter_map(|branch| {
            // npm separates AND-comparators with whitespace; the semver
            // crate wants commas.
            let normalized = branch.split_whitespace().collect::<Vec<_>>().join(", ");
            VersionReq::parse(&normalized).ok()
        })
        .collect();
    if reqs.is_empty() {
        None
    } else {
        Some(reqs)
    }
}

/// Whether an override pin truly changes what the declared range would
/// resolve to.
///
/// The declared range is coerced to its floor version and tested against the
/// pin treated as a requirement; when the floor does not satisfy the pin the
/// override is doing real work. Unparseable input counts as changing
/// resolution.
pub fn changes_resolution(declared: &str, pinned: &str) -> bool {
    let Some(floor) = coerce_version(declared) else {
        return true;
    };
    let Some(reqs) = pin_requirements(pinned) else {
        return true;
    };
    !reqs.iter().any(|req| req.matches(&floor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_caret_range() {
        assert_eq!(coerce_version("^4.17.0").unwrap().to_string(), "4.17.0");
    }

    #[test]
    fn test_coerce_tilde_range() {
        assert_eq!(coerce_version("~1.2.3").unwrap().to_string(), "1.2.3");
    }

    #[test]
    fn test_coerce_partial_versions() {
        assert_eq!(coerce_version("4").unwrap().to_string(), "4.0.0");
        assert_eq!(coerce_version("4.17").unwrap().to_string(), "4.17.0");
        assert_eq!(coerce_version("4.x").unwrap().to_string(), "4.0.0");
    }

    #[test]
    fn test_coerce_compound_range_uses_floor() {
        assert_eq!(
            coerce_version(">=1.2.0 <2.0.0").unwrap().to_string(),
            "1.2.0"
        );
    }

    #[test]
    fn test_coerce_or_range_uses_first_branch() {
        assert_eq!(
            coerce_version("^2.0.0 || ^3.0.0").unwrap().to_string(),
            "2.0.0"
        );
    }

    #[test]
    fn test_coerce_prerelease() {
        assert_eq!(
            coerce_version("^1.0.0-beta.1").unwrap().to_string(),
            "1.0.0-beta.1"
        );
    }

    #[test]
    fn test_coerce_garbage_returns_none() {
        assert!(coerce_version("").is_none());
        assert!(coerce_version("   ").is_none());
    }

    #[test]
    fn test_pin_exact_version() {
        let reqs = pin_requirements("4.17.21").unwrap();
        assert_eq!(reqs.len(), 1);
        assert!(reqs[0].matches(&Version::parse("4.17.21").unwrap()));
        assert!(!reqs[0].matches(&Version::parse("4.17.20").unwrap()));
    }

    #[test]
    fn test_pin_caret_range() {
        let reqs = pin_requirements("^4.0.1").unwrap();
        assert!(reqs[0].matches(&Version::parse("4.2.0").unwrap()));
        assert!(!reqs[0].matches(&Version::parse("4.0.0").unwrap()));
    }

    #[test]
    fn test_changes_resolution_when_floor_below_pin() {
        // ^4.17.0 floors at 4.17.0, which is not exactly 4.17.21.
        assert!(changes_resolution("^4.17.0", "4.17.21"));
    }

    #[test]
    fn test_no_change_when_range_is_the_pin() {
        assert!(!changes_resolution("4.17.21", "4.17.21"));
    }

    #[test]
    fn test_no_change_when_floor_satisfies_ranged_pin() {
        assert!(!changes_resolution("^4.1.0", "^4.0.1"));
    }

    #[test]
    fn test_changes_resolution_when_floor_misses_ranged_pin() {
        assert!(changes_resolution("^4.0.0", "^4.0.1"));
    }

    #[test]
    fn test_unparseable_counts_as_change() {
        assert!(changes_resolution("workspace:*", "4.17.21"));
        assert!(changes_resolution("^1.0.0", "file:../local"));
    }

    #[test]
    fn test_or_pin_any_branch_matches() {
        assert!(!changes_resolution("^3.1.0", "^2.0.0 || ^3.0.0"));
        assert!(changes_resolution("^1.0.0", "^2.0.0 || ^3.0.0"));
    }
}
