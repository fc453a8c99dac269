//! Closed, 1-based genomic ranges and the sub-feature blocks hung off them.
//!
//! The boundary conventions here are load-bearing for GFF assembly and range
//! expansion: `intersects` is strict and does *not* report two intervals that
//! only touch at a single shared coordinate, while `intersects_or_abuts`
//! additionally accepts adjacent intervals.

mod block;

pub use block::{Block, BlockError};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while constructing intervals or parsing regions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntervalError {
    /// Start lies after end.
    #[error("reversed interval: start {start} > end {end}")]
    Reversed {
        /// Requested start.
        start: i64,
        /// Requested end.
        end: i64,
    },

    /// Region string could not be parsed.
    #[error("malformed region '{0}' (expected chrom, chrom:start or chrom:start-end)")]
    BadRegion(String),
}

/// Closed genomic interval `[start, end]` in 1-based coordinates.
///
/// The default constructor does not check `start <= end`; use
/// [`Interval::try_new`] where a reversed interval must be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    start: i64,
    end: i64,
}

impl Interval {
    /// Largest end coordinate used for open-ended regions.
    pub const MAX_END: i64 = i32::MAX as i64;

    /// Construct an interval without validating the bounds.
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Construct an interval, rejecting `start > end`.
    pub fn try_new(start: i64, end: i64) -> Result<Self, IntervalError> {
        if start > end {
            return Err(IntervalError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// First base (inclusive).
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Last base (inclusive).
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Number of bases covered, `end - start + 1`.
    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }

    /// Strict intersection: `start < other.end && other.start < end`.
    ///
    /// Intervals sharing only a boundary base, such as `(1,10)` and `(10,20)`,
    /// do not intersect under this rule.
    pub fn intersects(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersection with one base of slack on each side, so that adjacent
    /// intervals like `(1,10)` and `(11,20)` are accepted.
    pub fn intersects_or_abuts(&self, other: &Interval) -> bool {
        self.start.saturating_sub(1) < other.end.saturating_add(1)
            && other.start.saturating_sub(1) < self.end.saturating_add(1)
    }

    /// Union of two intersecting-or-abutting intervals.
    ///
    /// When the intervals are disjoint and not adjacent this returns `self`
    /// unchanged and the extent of `other` is discarded. Callers that need a
    /// spanning interval must check [`Interval::intersects_or_abuts`] first.
    pub fn merge(&self, other: &Interval) -> Interval {
        if self.intersects_or_abuts(other) {
            Interval::new(self.start.min(other.start), self.end.max(other.end))
        } else {
            *self
        }
    }

    /// Whether `other` lies entirely within this interval.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Closed-interval overlap: at least one base in common, boundaries
    /// included. Distinct from [`Interval::intersects`].
    pub fn shares_base(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A reference sequence name paired with an interval on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    /// Chromosome / contig name.
    pub reference: String,
    /// Requested range on `reference`.
    pub interval: Interval,
}

impl Region {
    /// Construct a region.
    pub fn new(reference: impl Into<String>, interval: Interval) -> Self {
        Self {
            reference: reference.into(),
            interval,
        }
    }

    /// Same reference, different range.
    pub fn with_interval(&self, interval: Interval) -> Self {
        Self {
            reference: self.reference.clone(),
            interval,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.reference, self.interval)
    }
}

impl FromStr for Region {
    type Err = IntervalError;

    /// Parses `chrom`, `chrom:start` or `chrom:start-end`. Thousands
    /// separators in coordinates are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || IntervalError::BadRegion(s.to_string());
        let s = s.trim();
        let (reference, range) = match s.rsplit_once(':') {
            Some((reference, range)) => (reference, Some(range)),
            None => (s, None),
        };
        if reference.is_empty() {
            return Err(bad());
        }

        let parse_coord = |text: &str| -> Result<i64, IntervalError> {
            text.replace(',', "").trim().parse::<i64>().map_err(|_| bad())
        };

        let interval = match range {
            None => Interval::new(1, Interval::MAX_END),
            Some(range) => match range.split_once('-') {
                Some((start, end)) => Interval::try_new(parse_coord(start)?, parse_coord(end)?)?,
                None => {
                    let start = parse_coord(range)?;
                    Interval::new(start, Interval::MAX_END)
                }
            },
        };

        Ok(Region::new(reference, interval))
    }
}
