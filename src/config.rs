//! Policy configuration.
//!
//! A [`PolicyConfig`] names a preset and optionally overrides its settings.
//! It can be deserialized from any serde format or read from the environment:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `HASHGUARD_POLICY` | `trusted` or `untrusted` |
//! | `HASHGUARD_HASH_COLLISION_RESISTANT` | `true`/`false` (also `1`/`0`) |
//! | `HASHGUARD_MAX_OBJECT_GRAPH_DEPTH` | non-negative integer |

use crate::error::{PolicyError, PolicyResult};
use crate::policy::SecurityPolicy;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Environment variable selecting the preset.
pub const ENV_POLICY: &str = "HASHGUARD_POLICY";
/// Environment variable overriding the collision-resistance flag.
pub const ENV_HASH_COLLISION_RESISTANT: &str = "HASHGUARD_HASH_COLLISION_RESISTANT";
/// Environment variable overriding the depth limit.
pub const ENV_MAX_OBJECT_GRAPH_DEPTH: &str = "HASHGUARD_MAX_OBJECT_GRAPH_DEPTH";

/// Named policy preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyPreset {
    /// [`SecurityPolicy::trusted`].
    #[default]
    Trusted,
    /// [`SecurityPolicy::untrusted`].
    Untrusted,
}

impl PolicyPreset {
    /// Returns the shared preset policy.
    #[must_use]
    pub fn policy(self) -> Arc<SecurityPolicy> {
        match self {
            Self::Trusted => SecurityPolicy::trusted(),
            Self::Untrusted => SecurityPolicy::untrusted(),
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trusted => "trusted",
            Self::Untrusted => "untrusted",
        }
    }
}

impl FromStr for PolicyPreset {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("trusted") {
            Ok(Self::Trusted)
        } else if name.eq_ignore_ascii_case("untrusted") {
            Ok(Self::Untrusted)
        } else {
            Err(PolicyError::invalid_argument(
                "preset",
                format!("unknown policy preset `{name}`"),
            ))
        }
    }
}

/// Declarative policy settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Starting preset; trusted when absent.
    pub preset: Option<PolicyPreset>,
    /// Overrides the preset's collision-resistance flag.
    pub hash_collision_resistant: Option<bool>,
    /// Overrides the preset's depth limit.
    pub max_object_graph_depth: Option<usize>,
}

impl PolicyConfig {
    /// Builds the configured policy.
    ///
    /// With no overrides this is the shared preset instance itself.
    #[must_use]
    pub fn build(&self) -> Arc<SecurityPolicy> {
        let mut policy = self.preset.unwrap_or_default().policy();
        if let Some(flag) = self.hash_collision_resistant {
            policy = policy.with_hash_collision_resistant(flag);
        }
        if let Some(depth) = self.max_object_graph_depth {
            policy = policy.with_max_object_graph_depth(depth);
        }
        policy
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> PolicyResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value. Unset and empty variables are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PolicyResult<Self> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let preset = read(ENV_POLICY)
            .map(|value| value.parse::<PolicyPreset>())
            .transpose()?;
        let hash_collision_resistant = read(ENV_HASH_COLLISION_RESISTANT)
            .map(|value| parse_bool(ENV_HASH_COLLISION_RESISTANT, &value))
            .transpose()?;
        let max_object_graph_depth = read(ENV_MAX_OBJECT_GRAPH_DEPTH)
            .map(|value| {
                value.trim().parse::<usize>().map_err(|err| {
                    PolicyError::invalid_argument(ENV_MAX_OBJECT_GRAPH_DEPTH, err.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            preset,
            hash_collision_resistant,
            max_object_graph_depth,
        })
    }
}

fn parse_bool(argument: &'static str, value: &str) -> PolicyResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(PolicyError::invalid_argument(
            argument,
            format!("expected a boolean, got `{other}`"),
        )),
    }
}
