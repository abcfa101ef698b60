//! Placement selectors for index queries.
//!
//! # Invariants
//! - `DateRange` satisfies `from <= to`.
//! - `NumericRange` satisfies `1 <= from <= to`.
//! - Constructors panic on violation; [`PlacementRange::parse`] is the
//!   fallible path for untrusted text.
//! - Variant fields are public, so struct literals skip these checks. Readers
//!   treat a zero numeric start as `1` and an inverted range as empty.

use crate::model::day::CalendarDay;
use crate::model::placement::{
    PathSegment, Placement, PlacementHead, ValidationCode, ValidationError,
};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const RANGE_SEPARATOR: &str = "..";

/// One of the three supported query shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementRange {
    /// Exactly one placement.
    Single(Placement),
    /// Every date shelf in `from..=to`.
    DateRange { from: CalendarDay, to: CalendarDay },
    /// Siblings `parent.section + [n]` for `n` in `from..=to`.
    NumericRange { parent: Placement, from: u32, to: u32 },
}

impl PlacementRange {
    pub fn single(placement: Placement) -> Self {
        Self::Single(placement)
    }

    /// # Panics
    /// Panics when `from > to`.
    pub fn date_range(from: CalendarDay, to: CalendarDay) -> Self {
        assert!(from <= to, "date range start {from} is after end {to}");
        Self::DateRange { from, to }
    }

    /// # Panics
    /// Panics when `from` is zero or `from > to`.
    pub fn numeric_range(parent: Placement, from: u32, to: u32) -> Self {
        assert!(from >= 1, "numeric range start must be >= 1, got {from}");
        assert!(from <= to, "numeric range start {from} is after end {to}");
        Self::NumericRange { parent, from, to }
    }

    /// Parses untrusted range text.
    ///
    /// - `<day>..<day>` is a date range.
    /// - `<placement>/<a>..<b>` is a numeric range under `<placement>`.
    /// - anything else is a single placement.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let Some((left, right)) = trimmed.split_once(RANGE_SEPARATOR) else {
            return Placement::parse(trimmed).map(Self::Single);
        };

        if right.contains('/') {
            return parse_date_range(left, right);
        }

        match left.rsplit_once('/') {
            Some((parent_text, from_text)) if CalendarDay::parse(left.trim()).is_none() => {
                parse_numeric_range(parent_text, from_text, right)
            }
            _ => parse_date_range(left, right),
        }
    }

    /// Placement whose child sections decorate this range's partitions.
    pub fn anchor(&self) -> Option<&Placement> {
        match self {
            Self::Single(placement) => Some(placement),
            Self::NumericRange { parent, .. } => Some(parent),
            Self::DateRange { .. } => None,
        }
    }

    /// Terminal placements covered by this range, in query order.
    pub fn placements(&self) -> Vec<Placement> {
        match self {
            Self::Single(placement) => vec![placement.clone()],
            Self::DateRange { from, to } => from
                .iter_through(*to)
                .map(|day| Placement::date(day, Vec::new()))
                .collect(),
            Self::NumericRange { parent, from, to } => {
                ((*from).max(1)..=*to).map(|n| parent.child(n)).collect()
            }
        }
    }

    /// Short shape name used in log events.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Single(_) => "single",
            Self::DateRange { .. } => "date_range",
            Self::NumericRange { .. } => "numeric_range",
        }
    }
}

fn parse_date_range(left: &str, right: &str) -> Result<PlacementRange, ValidationError> {
    let from = parse_range_day(left, "from")?;
    let to = parse_range_day(right, "to")?;
    if from > to {
        return Err(ValidationError::single(
            vec![PathSegment::Key("to")],
            ValidationCode::Format,
            format!("date range end {to} is before start {from}"),
        ));
    }
    Ok(PlacementRange::DateRange { from, to })
}

fn parse_range_day(text: &str, key: &'static str) -> Result<CalendarDay, ValidationError> {
    let placement = Placement::parse(text).map_err(|err| err.nested(&[PathSegment::Key(key)]))?;
    match (placement.head(), placement.is_root()) {
        (PlacementHead::Date(day), true) => Ok(*day),
        _ => Err(ValidationError::single(
            vec![PathSegment::Key(key)],
            ValidationCode::Type,
            format!("date range endpoint must be a bare YYYY-MM-DD date, got `{}`", text.trim()),
        )),
    }
}

fn parse_numeric_range(
    parent_text: &str,
    from_text: &str,
    to_text: &str,
) -> Result<PlacementRange, ValidationError> {
    let parent =
        Placement::parse(parent_text).map_err(|err| err.nested(&[PathSegment::Key("parent")]))?;
    let from = parse_bound(from_text, "from")?;
    let to = parse_bound(to_text, "to")?;
    if from > to {
        return Err(ValidationError::single(
            vec![PathSegment::Key("to")],
            ValidationCode::Format,
            format!("numeric range end {to} is before start {from}"),
        ));
    }
    Ok(PlacementRange::NumericRange { parent, from, to })
}

fn parse_bound(text: &str, key: &'static str) -> Result<u32, ValidationError> {
    let trimmed = text.trim();
    match trimmed.parse::<u32>() {
        Ok(value) if value >= 1 && !trimmed.starts_with('+') => Ok(value),
        _ => Err(ValidationError::single(
            vec![PathSegment::Key(key)],
            if trimmed.is_empty() {
                ValidationCode::Empty
            } else {
                ValidationCode::Format
            },
            format!("numeric range bound must be a positive integer, got `{trimmed}`"),
        )),
    }
}

impl Display for PlacementRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(placement) => write!(f, "{placement}"),
            Self::DateRange { from, to } => write!(f, "{from}{RANGE_SEPARATOR}{to}"),
            Self::NumericRange { parent, from, to } => {
                write!(f, "{parent}/{from}{RANGE_SEPARATOR}{to}")
            }
        }
    }
}

impl FromStr for PlacementRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
