//! Cache keys for generation requests

use crate::hash::{ContentHash, HashError};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Deterministic key identifying equivalent generation requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(ContentHash);

impl CacheKey {
    /// Derive a key from any serializable identity value
    ///
    /// # Errors
    /// Returns error if the value cannot be serialized
    pub fn derive<T>(identity: &T) -> Result<Self, HashError>
    where
        T: Serialize + ?Sized,
    {
        ContentHash::compute_serializable(identity).map(Self)
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for CacheKey {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_stable() {
        let a = CacheKey::derive(&("p1", true)).unwrap();
        let b = CacheKey::derive(&("p1", true)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, CacheKey::derive(&("p2", true)).unwrap());
    }

    #[test]
    fn key_round_trips_through_string() {
        let key = CacheKey::derive("project").unwrap();
        assert_eq!(key.to_string().parse::<CacheKey>().unwrap(), key);
    }
}
