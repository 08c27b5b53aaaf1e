//! Issue range selection.
//!
//! The `issues` list of the source project restricts which issues are
//! migrated. Each entry is either a single display number (`"5"`) or an
//! inclusive range (`"8-10"`).

use std::fmt;
use thiserror::Error;

/// Separator between the two bounds of a range token.
const RANGE_SEPARATOR: char = '-';

/// Errors raised while parsing issue range tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// A token could not be turned into a range.
    #[error("invalid issue range '{token}': {reason}")]
    InvalidFormat { token: String, reason: String },
}

impl RangeError {
    fn invalid(token: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

/// A closed interval of issue display numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueRange {
    from: u64,
    to: u64,
}

impl IssueRange {
    /// Creates a range, rejecting reversed bounds.
    pub fn new(from: u64, to: u64) -> Result<Self, RangeError> {
        if from > to {
            return Err(RangeError::invalid(
                &format!("{from}{RANGE_SEPARATOR}{to}"),
                "reverse range not allowed",
            ));
        }
        Ok(Self { from, to })
    }

    /// Creates a range holding a single value.
    #[must_use]
    pub fn single(value: u64) -> Self {
        Self {
            from: value,
            to: value,
        }
    }

    /// Lower bound (inclusive).
    #[must_use]
    pub fn from(&self) -> u64 {
        self.from
    }

    /// Upper bound (inclusive).
    #[must_use]
    pub fn to(&self) -> u64 {
        self.to
    }

    /// Returns true if `value` lies within the range.
    #[must_use]
    pub fn contains(&self, value: u64) -> bool {
        value >= self.from && value <= self.to
    }

    fn parse(token: &str) -> Result<Self, RangeError> {
        let parts: Vec<&str> = token.split(RANGE_SEPARATOR).collect();
        match parts.as_slice() {
            [single] => Ok(Self::single(parse_bound(token, single)?)),
            [from, to] => {
                let from = parse_bound(token, from)?;
                let to = parse_bound(token, to)?;
                if from > to {
                    return Err(RangeError::invalid(token, "reverse range not allowed"));
                }
                Ok(Self { from, to })
            }
            _ => Err(RangeError::invalid(
                token,
                "only one range separator allowed",
            )),
        }
    }
}

impl fmt::Display for IssueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}{RANGE_SEPARATOR}{}", self.from, self.to)
        }
    }
}

fn parse_bound(token: &str, bound: &str) -> Result<u64, RangeError> {
    bound
        .trim()
        .parse::<u64>()
        .map_err(|_| RangeError::invalid(token, format!("expects an integer, not '{bound}'")))
}

/// The set of issue ranges a migration is scoped to.
///
/// An empty set matches every issue. Ranges are kept in input order and may
/// overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueRanges {
    ranges: Vec<IssueRange>,
}

impl IssueRanges {
    /// Parses a list of range tokens.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::InvalidFormat`] for the first malformed token;
    /// no partial result is kept.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, RangeError> {
        let ranges = tokens
            .iter()
            .map(|token| IssueRange::parse(token.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { ranges })
    }

    /// Returns true if `value` is selected by this set.
    #[must_use]
    pub fn matches(&self, value: u64) -> bool {
        self.ranges.is_empty() || self.ranges.iter().any(|range| range.contains(value))
    }

    /// Returns the parsed ranges in input order.
    #[must_use]
    pub fn ranges(&self) -> &[IssueRange] {
        &self.ranges
    }

    /// Returns true when no range was configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl From<Vec<IssueRange>> for IssueRanges {
    fn from(ranges: Vec<IssueRange>) -> Self {
        Self { ranges }
    }
}
