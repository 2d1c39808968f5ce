use crate::manifest::CacheIdentifier;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which cache stores a newly activated controller deletes.
///
/// The storage namespace is shared with anything else running on the same
/// origin, so evicting every foreign name can take out stores the game never
/// created. [`OwnedPrefix`](Self::OwnedPrefix) restricts eviction to names
/// carrying the game's cache prefix.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionPolicy {
    /// Delete every store not named exactly after the current identifier.
    #[default]
    #[display("all-foreign")]
    AllForeign,
    /// Delete only older `flag-game-*` stores.
    #[display("owned-prefix")]
    OwnedPrefix,
}
impl EvictionPolicy {
    pub fn is_stale(&self, name: &str, current: &CacheIdentifier) -> bool {
        if name == current.as_str() {
            return false;
        }
        match self {
            Self::AllForeign => true,
            Self::OwnedPrefix => CacheIdentifier::is_owned(name),
        }
    }
}
impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all-foreign" | "all" => Ok(Self::AllForeign),
            "owned-prefix" | "owned" => Ok(Self::OwnedPrefix),
            other => Err(format!("unknown eviction policy `{other}` (expected `all-foreign` or `owned-prefix`)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EvictionPolicy::AllForeign, "flag-game-2.0.0", false)]
    #[case(EvictionPolicy::AllForeign, "flag-game-1.0.0", true)]
    #[case(EvictionPolicy::AllForeign, "someone-elses-cache", true)]
    #[case(EvictionPolicy::OwnedPrefix, "flag-game-2.0.0", false)]
    #[case(EvictionPolicy::OwnedPrefix, "flag-game-1.0.0", true)]
    #[case(EvictionPolicy::OwnedPrefix, "someone-elses-cache", false)]
    fn test_is_stale(#[case] policy: EvictionPolicy, #[case] name: &str, #[case] stale: bool) {
        let current = CacheIdentifier::for_version("2.0.0");
        assert_eq!(policy.is_stale(name, &current), stale);
    }

    #[rstest]
    #[case("all-foreign", EvictionPolicy::AllForeign)]
    #[case("Owned-Prefix", EvictionPolicy::OwnedPrefix)]
    #[case("owned", EvictionPolicy::OwnedPrefix)]
    fn test_from_str(#[case] input: &str, #[case] expected: EvictionPolicy) {
        assert_eq!(input.parse::<EvictionPolicy>().unwrap(), expected);
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("everything".parse::<EvictionPolicy>().is_err());
    }
}
