//! Replay policy strings of the form `last:N`.
//!
//! `N = -1` replays everything, `N = 0` replays nothing, `N > 0` replays the
//! last N events.

use std::fmt;
use std::str::FromStr;

use crate::entities::LocationType;
use crate::error::DomainError;

const PREFIX: &str = "last:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayPolicy(i32);

impl ReplayPolicy {
    pub const UNLIMITED: Self = Self(-1);
    pub const NONE: Self = Self(0);

    pub fn last(count: i32) -> Self {
        Self(count)
    }

    #[inline]
    pub fn count(&self) -> i32 {
        self.0
    }

    pub fn is_unlimited(&self) -> bool {
        self.0 == -1
    }

    /// Scenes replay their whole history; everything else replays nothing.
    pub fn default_for(location_type: LocationType) -> Self {
        match location_type {
            LocationType::Scene => Self::UNLIMITED,
            LocationType::Persistent | LocationType::Instance => Self::NONE,
        }
    }
}

impl fmt::Display for ReplayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PREFIX, self.0)
    }
}

impl FromStr for ReplayPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| DomainError::parse(format!("replay policy missing prefix: {:?}", s)))?;
        raw.parse::<i32>()
            .map(Self)
            .map_err(|e| DomainError::parse(format!("replay policy count {:?}: {}", raw, e)))
    }
}

/// Lenient parse used when reading stored policies: malformed input means
/// "no replay" rather than an error.
pub fn parse_replay_policy(policy: &str) -> i32 {
    policy
        .parse::<ReplayPolicy>()
        .map(|p| p.count())
        .unwrap_or(ReplayPolicy::NONE.count())
}

pub fn default_replay_policy(location_type: LocationType) -> String {
    ReplayPolicy::default_for(location_type).to_string()
}
