//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Load/save/delete item records.
//! - Resolve placement ranges through the graph index instead of scanning rows.
//! - Maintain exactly one edge per item, at the item's current placement.
//!
//! # Invariants
//! - `save` writes the row first, then moves the edge; an edge failure is
//!   reported and the next successful `save` repairs it.
//! - `list_by_placement` never returns an item whose row disagrees with the
//!   edge that led to it.

use crate::db::migrations::latest_version;
use crate::db::schema_version;
use crate::db::DbError;
use crate::index::{Edge, GraphIndex, IndexError};
use crate::model::item::{Item, ItemKind, ItemValidationError, TaskStatus};
use crate::model::item_id::ItemId;
use crate::model::placement::Placement;
use crate::model::range::PlacementRange;
use crate::model::rank::ItemRank;
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    kind,
    title,
    status,
    placement,
    rank,
    created_at,
    updated_at
FROM items";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and placement lookups.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    Index(IndexError),
    NotFound(ItemId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Index(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "item repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Index(err) => Some(err),
            Self::NotFound(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<IndexError> for RepoError {
    fn from(value: IndexError) -> Self {
        Self::Index(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Item capability consumed by the placement core.
pub trait ItemRepository {
    fn load(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Inserts or replaces an item and moves its edge to the current placement.
    fn save(&self, item: &Item) -> RepoResult<()>;
    /// Deletes an item row and its edge.
    fn delete(&self, id: ItemId) -> RepoResult<()>;
    /// Items whose current placement falls inside `range`, in index order.
    fn list_by_placement(&self, range: &PlacementRange) -> RepoResult<Vec<Item>>;
}

/// SQLite-backed item repository writing through to a graph index.
pub struct SqliteItemRepository<'a> {
    conn: &'a Connection,
    index: &'a GraphIndex,
}

impl<'a> SqliteItemRepository<'a> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'a Connection, index: &'a GraphIndex) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = schema_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn, index })
    }

    pub fn index(&self) -> &GraphIndex {
        self.index
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn load(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let row = self
            .conn
            .query_row(
                &format!("{ITEM_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_item_row(row)),
            )
            .optional()?;
        row.transpose()
    }

    fn save(&self, item: &Item) -> RepoResult<()> {
        item.validate()?;
        let previous = self.load(item.id)?;

        self.conn.execute(
            "INSERT INTO items (
                id,
                kind,
                title,
                status,
                placement,
                rank,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                title = excluded.title,
                status = excluded.status,
                placement = excluded.placement,
                rank = excluded.rank,
                updated_at = excluded.updated_at;",
            params![
                item.id.to_string(),
                item.kind.as_str(),
                item.title.as_str(),
                item.status.map(|status| status.as_str()),
                item.placement.to_string(),
                item.rank.as_str(),
                item.created_at,
                item.updated_at,
            ],
        )?;

        let moved = previous
            .as_ref()
            .is_some_and(|previous| previous.placement != item.placement);
        if let Some(previous) = previous.filter(|_| moved) {
            self.index.remove_edge(&previous.placement, item.id)?;
        }
        let edge = Edge::for_item(item.id, &item.placement, item.rank.clone());
        self.index.write_edge(&item.placement, item.id, &edge)?;

        info!(
            "event=item_save module=repo status=ok kind={} moved={}",
            item.kind.as_str(),
            moved
        );
        Ok(())
    }

    fn delete(&self, id: ItemId) -> RepoResult<()> {
        let item = self.load(id)?.ok_or(RepoError::NotFound(id))?;
        self.conn
            .execute("DELETE FROM items WHERE id = ?1;", [id.to_string()])?;
        self.index.remove_edge(&item.placement, id)?;
        info!(
            "event=item_delete module=repo status=ok kind={}",
            item.kind.as_str()
        );
        Ok(())
    }

    fn list_by_placement(&self, range: &PlacementRange) -> RepoResult<Vec<Item>> {
        let references = self.index.query_edge_references(range)?;
        let mut items = Vec::with_capacity(references.len());
        for reference in references {
            match self.load(reference.item_id)? {
                None => warn!(
                    "event=item_resolve module=repo status=error error_code=dangling_edge placement={}",
                    reference.placement
                ),
                Some(item) if item.placement != reference.placement => warn!(
                    "event=item_resolve module=repo status=error error_code=stale_edge placement={}",
                    reference.placement
                ),
                Some(item) => items.push(item),
            }
        }
        Ok(items)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id_text: String = row.get("id")?;
    let id = ItemId::parse(&id_text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid item id `{id_text}` in items.id")))?;

    let kind_text: String = row.get("kind")?;
    let kind = ItemKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid item kind `{kind_text}` in items.kind"))
    })?;

    let status = match row.get::<_, Option<String>>("status")? {
        Some(value) => Some(TaskStatus::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid task status `{value}` in items.status"))
        })?),
        None => None,
    };

    let placement_text: String = row.get("placement")?;
    let placement = Placement::parse(&placement_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid placement `{placement_text}` in items.placement: {err}"
        ))
    })?;

    let rank_text: String = row.get("rank")?;
    let rank = ItemRank::parse(&rank_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid rank `{rank_text}` in items.rank"))
    })?;

    let item = Item {
        id,
        kind,
        title: row.get("title")?,
        status,
        placement,
        rank,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    item.validate()?;
    Ok(item)
}
