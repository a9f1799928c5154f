//! OAuth scope handling for the Lightbox API.
//!
//! This module provides the [`AuthScope`] type for managing the permission
//! flags attached to an access token, including parsing, composition, and
//! the deterministic string encoding sent to the provider.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A set of permission flags for Lightbox API access.
///
/// Scope sets compose: union via [`union`](Self::union) (or the `+`
/// operator) is idempotent, and difference via [`subtract`](Self::subtract)
/// (or the `-` operator) ignores flags that are not present. A subtraction
/// that would leave the set empty is rejected — "no scope" is only ever
/// represented explicitly, via [`AuthScope::none`].
///
/// # Encoding
///
/// The string encoding is deterministic: flags sorted and joined with `+`,
/// which is the form the provider's `scope` query parameter expects. Flags
/// are validated to lowercase alphanumerics and underscores, so the encoded
/// value is URL-safe as-is.
///
/// # Serialization
///
/// `AuthScope` serializes to and deserializes from its string encoding:
///
/// ```rust
/// use lightbox_api::AuthScope;
///
/// let scope: AuthScope = "write_photos+read_galleries".parse().unwrap();
/// let json = serde_json::to_string(&scope).unwrap();
/// assert_eq!(json, r#""read_galleries+write_photos""#);
/// ```
///
/// # Example
///
/// ```rust
/// use lightbox_api::AuthScope;
///
/// let read: AuthScope = "read_photos".parse().unwrap();
/// let write: AuthScope = "write_photos".parse().unwrap();
///
/// let both = read.clone() + write;
/// assert_eq!(both.to_string(), "read_photos+write_photos");
///
/// // Union is idempotent
/// assert_eq!(both.clone() + read, both);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScope {
    flags: BTreeSet<String>,
}

impl AuthScope {
    /// The explicit "no scope" set.
    ///
    /// This is the only way to represent an empty scope; composition
    /// operations never produce one.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a scope set holding a single flag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidScope`] if the flag is empty or holds
    /// characters outside lowercase alphanumerics and underscores.
    pub fn single(flag: impl AsRef<str>) -> Result<Self, ConfigError> {
        let mut flags = BTreeSet::new();
        flags.insert(Self::validate_flag(flag.as_ref())?);
        Ok(Self { flags })
    }

    /// Returns `true` if the set holds no flags.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.flags.is_empty()
    }

    /// Returns `true` if the set contains the given flag.
    #[must_use]
    pub fn contains(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Returns an iterator over the flags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    /// Returns the union of two scope sets.
    ///
    /// Duplicate flags are idempotent: `s.union(&s) == s`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let flags = self.flags.union(&other.flags).cloned().collect();
        Self { flags }
    }

    /// Returns this scope set with the flags of `other` removed.
    ///
    /// Flags in `other` that are not present here are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyScopeResult`] if the subtraction would
    /// remove every flag from a non-empty set.
    pub fn subtract(&self, other: &Self) -> Result<Self, ConfigError> {
        let flags: BTreeSet<String> = self.flags.difference(&other.flags).cloned().collect();

        if flags.is_empty() && !self.flags.is_empty() {
            return Err(ConfigError::EmptyScopeResult {
                from: self.to_string(),
                removed: other.to_string(),
            });
        }

        Ok(Self { flags })
    }

    fn validate_flag(flag: &str) -> Result<String, ConfigError> {
        if flag.is_empty() {
            return Err(ConfigError::InvalidScope {
                reason: "scope flag is empty".to_string(),
            });
        }
        if !flag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ConfigError::InvalidScope {
                reason: format!("invalid characters in scope flag '{flag}'"),
            });
        }
        Ok(flag.to_string())
    }
}

impl FromStr for AuthScope {
    type Err = ConfigError;

    /// Parses a `+`-joined scope string. An empty string parses to
    /// [`AuthScope::none`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = BTreeSet::new();

        for flag in s.split('+') {
            let flag = flag.trim();
            if flag.is_empty() {
                continue;
            }
            flags.insert(Self::validate_flag(flag)?);
        }

        Ok(Self { flags })
    }
}

impl From<AuthScope> for Vec<String> {
    fn from(scope: AuthScope) -> Self {
        scope.flags.into_iter().collect()
    }
}

impl fmt::Display for AuthScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // BTreeSet iterates in sorted order, so the encoding is stable
        let mut first = true;
        for flag in &self.flags {
            if !first {
                f.write_str("+")?;
            }
            f.write_str(flag)?;
            first = false;
        }
        Ok(())
    }
}

impl Add for AuthScope {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.union(&rhs)
    }
}

impl Sub for AuthScope {
    type Output = Result<Self, ConfigError>;

    fn sub(self, rhs: Self) -> Result<Self, ConfigError> {
        self.subtract(&rhs)
    }
}

impl Serialize for AuthScope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AuthScope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
