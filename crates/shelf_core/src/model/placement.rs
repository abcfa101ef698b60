//! Placement address grammar.
//!
//! # Responsibility
//! - Define the local address of an item: a head plus a numeric section path.
//! - Parse untrusted placement text into typed values with explicit issues.
//!
//! # Invariants
//! - Every section entry is `>= 1`.
//! - `Display` output re-parses to an equal value.
//! - Trusted constructors panic on invalid sections; untrusted input must go
//!   through [`Placement::parse`].
//!
//! A placement names only its direct parent. Recovering the full ancestor
//! chain of an item-headed placement requires walking the item records.

use crate::model::day::CalendarDay;
use crate::model::item_id::ItemId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Literal head token of the permanent root.
pub const PERMANENT_HEAD: &str = "permanent";

/// Direct parent named by a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementHead {
    /// Date shelf.
    Date(CalendarDay),
    /// Parent item.
    Item(ItemId),
    /// Permanent root.
    Permanent,
}

impl PlacementHead {
    /// Item identity that owns the index subtree for this head, if any.
    ///
    /// The permanent root resolves to [`ItemId::PERMANENT_ROOT`].
    pub fn owner_id(&self) -> Option<ItemId> {
        match self {
            Self::Date(_) => None,
            Self::Item(id) => Some(*id),
            Self::Permanent => Some(ItemId::PERMANENT_ROOT),
        }
    }
}

impl Display for PlacementHead {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date(day) => write!(f, "{day}"),
            Self::Item(id) => write!(f, "{id}"),
            Self::Permanent => f.write_str(PERMANENT_HEAD),
        }
    }
}

/// Local address: head plus nested numeric section path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placement {
    head: PlacementHead,
    section: Vec<u32>,
}

impl Placement {
    /// Trusted constructor.
    ///
    /// An item head naming [`ItemId::PERMANENT_ROOT`] is stored as
    /// [`PlacementHead::Permanent`], so both spellings are one placement.
    ///
    /// # Panics
    /// Panics when any section entry is zero.
    pub fn new(head: PlacementHead, section: impl Into<Vec<u32>>) -> Self {
        let section = section.into();
        if let Some(index) = section.iter().position(|value| *value == 0) {
            panic!("placement section entry {index} must be >= 1, got 0");
        }
        Self {
            head: canonical_head(head),
            section,
        }
    }

    /// Date-headed placement. Panics on a zero section entry.
    pub fn date(day: CalendarDay, section: impl Into<Vec<u32>>) -> Self {
        Self::new(PlacementHead::Date(day), section)
    }

    /// Item-headed placement. Panics on a zero section entry.
    pub fn item(id: ItemId, section: impl Into<Vec<u32>>) -> Self {
        Self::new(PlacementHead::Item(id), section)
    }

    /// Permanent-root placement. Panics on a zero section entry.
    pub fn permanent(section: impl Into<Vec<u32>>) -> Self {
        Self::new(PlacementHead::Permanent, section)
    }

    /// Parses untrusted placement text.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::single(
                vec![],
                ValidationCode::Empty,
                "placement must not be empty",
            ));
        }
        if trimmed.starts_with('/') {
            return Err(ValidationError::single(
                vec![],
                ValidationCode::Format,
                format!("placement must not start with `/`, got `{trimmed}`"),
            ));
        }

        let mut tokens = trimmed.split('/').filter(|token| !token.is_empty());
        let head_token = tokens.next().unwrap_or_default();
        let head = parse_head(head_token).ok_or_else(|| {
            ValidationError::single(
                vec![PathSegment::Key("head")],
                ValidationCode::Format,
                format!(
                    "placement head must be `{PERMANENT_HEAD}`, a YYYY-MM-DD date or an item id, got `{head_token}`"
                ),
            )
        })?;

        let mut section = Vec::new();
        for (index, token) in tokens.enumerate() {
            match token.parse::<u32>() {
                Ok(value) if value >= 1 && !token.starts_with('+') => section.push(value),
                _ => {
                    return Err(ValidationError::single(
                        vec![PathSegment::Key("section"), PathSegment::Index(index)],
                        ValidationCode::Format,
                        format!("section segment {index} must be a positive integer, got `{token}`"),
                    ));
                }
            }
        }

        Ok(Self { head, section })
    }

    pub fn head(&self) -> &PlacementHead {
        &self.head
    }

    pub fn section(&self) -> &[u32] {
        &self.section
    }

    /// Last section element, if any.
    pub fn last_section(&self) -> Option<u32> {
        self.section.last().copied()
    }

    /// Whether this placement addresses the head itself (empty section).
    pub fn is_root(&self) -> bool {
        self.section.is_empty()
    }

    /// Placement with the last section element stripped; `None` at the head.
    pub fn parent(&self) -> Option<Self> {
        if self.section.is_empty() {
            return None;
        }
        Some(Self {
            head: self.head,
            section: self.section[..self.section.len() - 1].to_vec(),
        })
    }

    /// Placement one level deeper.
    ///
    /// # Panics
    /// Panics when `n` is zero.
    pub fn child(&self, n: u32) -> Self {
        assert!(n >= 1, "placement child section must be >= 1, got 0");
        let mut section = self.section.clone();
        section.push(n);
        Self {
            head: self.head,
            section,
        }
    }

    /// Whether `self` is `ancestor` or nested under it (same head, section prefix).
    pub fn is_within(&self, ancestor: &Placement) -> bool {
        self.head == ancestor.head && self.section.starts_with(&ancestor.section)
    }
}

fn parse_head(token: &str) -> Option<PlacementHead> {
    if token == PERMANENT_HEAD {
        return Some(PlacementHead::Permanent);
    }
    if let Some(day) = CalendarDay::parse(token) {
        return Some(PlacementHead::Date(day));
    }
    ItemId::parse(token).map(|id| canonical_head(PlacementHead::Item(id)))
}

fn canonical_head(head: PlacementHead) -> PlacementHead {
    match head {
        PlacementHead::Item(id) if id.is_permanent_root() => PlacementHead::Permanent,
        other => other,
    }
}

impl Display for Placement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.head)?;
        for value in &self.section {
            write!(f, "/{value}")?;
        }
        Ok(())
    }
}

impl FromStr for Placement {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Placement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Placement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Input accepted by [`parse_placement`]: raw text or an already-valid placement.
pub trait PlacementSource {
    fn into_placement(self) -> Result<Placement, ValidationError>;
}

impl PlacementSource for &str {
    fn into_placement(self) -> Result<Placement, ValidationError> {
        Placement::parse(self)
    }
}

impl PlacementSource for String {
    fn into_placement(self) -> Result<Placement, ValidationError> {
        Placement::parse(&self)
    }
}

impl PlacementSource for &String {
    fn into_placement(self) -> Result<Placement, ValidationError> {
        Placement::parse(self)
    }
}

impl PlacementSource for Placement {
    fn into_placement(self) -> Result<Placement, ValidationError> {
        Ok(self)
    }
}

impl PlacementSource for &Placement {
    fn into_placement(self) -> Result<Placement, ValidationError> {
        Ok(self.clone())
    }
}

/// Parses placement text, passing already-valid placements through unchanged.
pub fn parse_placement(input: impl PlacementSource) -> Result<Placement, ValidationError> {
    input.into_placement()
}

/// Issue code carried by [`ValidationIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    /// Input is present but does not follow the grammar.
    Format,
    /// Input is blank.
    Empty,
    /// Input parsed, but to the wrong kind of value.
    Type,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Empty => "empty",
            Self::Type => "type",
        }
    }
}

/// One step of an issue path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(&'static str),
    Index(usize),
}

/// One validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: Vec<PathSegment>,
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationIssue {
    /// Dotted rendering of `path`, e.g. `section[2]`; empty for the whole input.
    pub fn path_string(&self) -> String {
        let mut rendered = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => {
                    if !rendered.is_empty() {
                        rendered.push('.');
                    }
                    rendered.push_str(key);
                }
                PathSegment::Index(index) => rendered.push_str(&format!("[{index}]")),
            }
        }
        rendered
    }
}

/// Malformed placement or range input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub(crate) fn single(
        path: Vec<PathSegment>,
        code: ValidationCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            issues: vec![ValidationIssue {
                path,
                code,
                message: message.into(),
            }],
        }
    }

    /// Prefixes every issue path with `segments`.
    pub(crate) fn nested(mut self, segments: &[PathSegment]) -> Self {
        for issue in &mut self.issues {
            let mut path = segments.to_vec();
            path.append(&mut issue.path);
            issue.path = path;
        }
        self
    }

    pub fn first(&self) -> Option<&ValidationIssue> {
        self.issues.first()
    }

    /// Code of the first issue.
    pub fn code(&self) -> Option<ValidationCode> {
        self.first().map(|issue| issue.code)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.first() {
            None => write!(f, "invalid placement"),
            Some(issue) => {
                let path = issue.path_string();
                if path.is_empty() {
                    write!(f, "{} ({})", issue.message, issue.code.as_str())
                } else {
                    write!(f, "{path}: {} ({})", issue.message, issue.code.as_str())
                }
            }
        }
    }
}

impl Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::{Placement, PlacementHead};
    use crate::model::day::CalendarDay;
    use crate::model::item_id::ItemId;

    #[test]
    fn parse_drops_empty_segments() {
        let placement = Placement::parse("2025-11-15//1/3/").unwrap();
        assert_eq!(placement.section(), &[1, 3]);
        assert_eq!(placement.to_string(), "2025-11-15/1/3");
    }

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let placement = Placement::parse("  permanent/2 ").unwrap();
        assert_eq!(placement.head(), &PlacementHead::Permanent);
        assert_eq!(placement.section(), &[2]);
    }

    #[test]
    fn parse_rejects_signed_segments() {
        assert!(Placement::parse("permanent/+1").is_err());
        assert!(Placement::parse("permanent/-1").is_err());
    }

    #[test]
    #[should_panic(expected = "must be >= 1")]
    fn trusted_constructor_panics_on_zero() {
        let _ = Placement::permanent(vec![1, 0]);
    }

    #[test]
    fn permanent_root_id_head_is_the_permanent_placement() {
        let text = format!("{}/1", ItemId::PERMANENT_ROOT);
        let parsed = Placement::parse(&text).unwrap();
        assert_eq!(parsed, Placement::permanent(vec![1]));
        assert_eq!(parsed.to_string(), "permanent/1");
        assert_eq!(
            Placement::item(ItemId::PERMANENT_ROOT, Vec::new()).head(),
            &PlacementHead::Permanent
        );
        assert_eq!(
            parsed.head().owner_id(),
            Some(ItemId::PERMANENT_ROOT)
        );
    }

    #[test]
    fn is_within_checks_head_and_prefix() {
        let id = ItemId::generate();
        let base = Placement::item(id, vec![1]);
        assert!(Placement::item(id, vec![1, 4]).is_within(&base));
        assert!(!Placement::item(id, vec![2]).is_within(&base));
        let day = CalendarDay::parse("2025-01-01").unwrap();
        assert!(!Placement::date(day, vec![1]).is_within(&base));
    }
}
