//! Sibling ordering key.
//!
//! # Responsibility
//! - Order items inside one placement without renumbering siblings.
//! - Generate a fresh key strictly between two neighbors.
//!
//! # Invariants
//! - Ranks are non-empty strings over `[0-9A-Za-z]` compared byte-wise.
//! - Generated ranks never end in `0`, which keeps a free slot between any two
//!   generated neighbors.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static RANK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z]+$").expect("valid rank regex"));

// Byte order of this alphabet matches its digit order.
const RANK_DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Lexicographically ordered rank string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemRank(String);

impl ItemRank {
    /// Validates and wraps a rank string.
    pub fn parse(value: &str) -> Option<Self> {
        if RANK_RE.is_match(value) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    /// Rank for the first item of an empty parent.
    pub fn initial() -> Self {
        Self::between(None, None).unwrap_or_else(|| Self("V".to_string()))
    }

    /// Returns a rank strictly between `before` and `after`.
    ///
    /// `None` on either side means "open end". Returns `None` when no such rank
    /// exists under the alphabet rules (`before >= after`, or `after` is `before`
    /// followed only by `0`s).
    pub fn between(before: Option<&ItemRank>, after: Option<&ItemRank>) -> Option<Self> {
        if let (Some(lower), Some(upper)) = (before, after) {
            if lower >= upper {
                return None;
            }
        }

        let lower = before.map(|rank| to_digits(&rank.0)).unwrap_or_default();
        let upper = after.map(|rank| to_digits(&rank.0));
        let digits = midpoint(&lower, upper.as_deref())?;
        let candidate = Self(from_digits(&digits));

        let above_lower = before.map_or(true, |lower| *lower < candidate);
        let below_upper = after.map_or(true, |upper| candidate < *upper);
        if above_lower && below_upper {
            Some(candidate)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn to_digits(value: &str) -> Vec<usize> {
    value
        .bytes()
        .map(|byte| {
            RANK_DIGITS
                .iter()
                .position(|digit| *digit == byte)
                .unwrap_or(0)
        })
        .collect()
}

fn from_digits(digits: &[usize]) -> String {
    digits
        .iter()
        .map(|digit| RANK_DIGITS[*digit] as char)
        .collect()
}

fn midpoint(lower: &[usize], upper: Option<&[usize]>) -> Option<Vec<usize>> {
    if let Some(upper) = upper {
        let mut shared = 0;
        while shared < upper.len() && lower.get(shared).copied().unwrap_or(0) == upper[shared] {
            shared += 1;
        }
        if shared > 0 {
            if shared == upper.len() {
                return None;
            }
            let rest_lower = &lower[shared.min(lower.len())..];
            let mut result = upper[..shared].to_vec();
            result.extend(midpoint(rest_lower, Some(&upper[shared..]))?);
            return Some(result);
        }
    }

    let digit_lower = lower.first().copied().unwrap_or(0);
    let digit_upper = match upper {
        Some(upper) => upper.first().copied().unwrap_or(0),
        None => RANK_DIGITS.len(),
    };

    if digit_upper > digit_lower + 1 {
        return Some(vec![(digit_lower + digit_upper + 1) / 2]);
    }

    match upper {
        Some(upper) if upper.len() > 1 => Some(upper[..1].to_vec()),
        _ => {
            let rest = if lower.is_empty() { lower } else { &lower[1..] };
            let mut result = vec![digit_lower];
            result.extend(midpoint(rest, None)?);
            Some(result)
        }
    }
}

impl Display for ItemRank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned by [`ItemRank::from_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidItemRank(pub String);

impl Display for InvalidItemRank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid rank `{}`; expected [0-9A-Za-z]+", self.0)
    }
}

impl std::error::Error for InvalidItemRank {}

impl FromStr for ItemRank {
    type Err = InvalidItemRank;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidItemRank(s.to_string()))
    }
}

impl Serialize for ItemRank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ItemRank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
