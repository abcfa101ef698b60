//! Item record as consumed from the item repository.
//!
//! # Responsibility
//! - Carry the fields the placement core reads: identity, kind, status,
//!   placement and rank.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `placement` is the authoritative location; index edges only mirror it.
//! - `status` is meaningful only when `kind == ItemKind::Task`.

use crate::model::item_id::ItemId;
use crate::model::placement::{Placement, PlacementHead};
use crate::model::rank::ItemRank;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Free-form note.
    Note,
    /// Actionable task with status metadata.
    Task,
    /// Dated event.
    Event,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Task => "task",
            Self::Event => "event",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "note" => Some(Self::Note),
            "task" => Some(Self::Task),
            "event" => Some(Self::Event),
            _ => None,
        }
    }
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(Self::Todo),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the task still needs attention.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Todo | Self::InProgress)
    }
}

/// Item record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub title: String,
    pub status: Option<TaskStatus>,
    pub placement: Placement,
    pub rank: ItemRank,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Item {
    /// Creates an item with a generated identifier.
    ///
    /// Tasks start as `TaskStatus::Todo`; other kinds carry no status.
    pub fn new(
        kind: ItemKind,
        title: impl Into<String>,
        placement: Placement,
        rank: ItemRank,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: ItemId::generate(),
            kind,
            title: title.into(),
            status: (kind == ItemKind::Task).then_some(TaskStatus::Todo),
            placement,
            rank,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validates record-level invariants the placement core relies on.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id.is_permanent_root() {
            return Err(ItemValidationError::ReservedId(self.id));
        }
        if self.title.trim().is_empty() {
            return Err(ItemValidationError::BlankTitle(self.id));
        }
        if self.status.is_some() && self.kind != ItemKind::Task {
            return Err(ItemValidationError::StatusOnNonTask(self.id));
        }
        if self.placement.head() == &PlacementHead::Item(self.id) {
            return Err(ItemValidationError::SelfParented(self.id));
        }
        Ok(())
    }
}

/// Record-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// Id is reserved for the permanent root.
    ReservedId(ItemId),
    BlankTitle(ItemId),
    StatusOnNonTask(ItemId),
    /// Item placement names the item itself as parent.
    SelfParented(ItemId),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReservedId(id) => write!(f, "item id {id} is reserved for the permanent root"),
            Self::BlankTitle(id) => write!(f, "item {id} title must not be blank"),
            Self::StatusOnNonTask(id) => write!(f, "item {id} has a status but is not a task"),
            Self::SelfParented(id) => write!(f, "item {id} cannot be placed under itself"),
        }
    }
}

impl Error for ItemValidationError {}
