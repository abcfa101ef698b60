//! Graph index reader and edge writer.
//!
//! # Responsibility
//! - Map placements to index directories.
//! - Resolve the three range shapes into edge references.
//! - Create/remove edge files on behalf of repository write paths.
//!
//! # Invariants
//! - A missing directory reads as "no items", never as an error.
//! - Malformed `.json` edge files are reported, never skipped.
//! - Results follow range order; inside one directory, item id order.

use crate::index::edge::{Edge, EdgeReference, EDGE_FILE_EXTENSION};
use crate::index::{IndexError, IndexOperation, IndexResult, IndexScope};
use crate::model::item_id::ItemId;
use crate::model::placement::{Placement, PlacementHead};
use crate::model::range::PlacementRange;
use log::{debug, error, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

const DATES_DIR: &str = "dates";
const ITEMS_DIR: &str = "items";
const TEMP_SUFFIX: &str = "tmp";

/// Directory-shaped secondary index rooted at one workspace path.
#[derive(Debug, Clone)]
pub struct GraphIndex {
    root: PathBuf,
}

impl GraphIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Terminal directory of `placement`.
    pub(crate) fn placement_dir(&self, placement: &Placement) -> PathBuf {
        let mut dir = self.head_dir(placement.head());
        for value in placement.section() {
            dir.push(value.to_string());
        }
        dir
    }

    fn head_dir(&self, head: &PlacementHead) -> PathBuf {
        match head.owner_id() {
            Some(owner) => self.root.join(ITEMS_DIR).join(owner.to_string()),
            // Date heads render as their day.
            None => self.root.join(DATES_DIR).join(head.to_string()),
        }
    }

    /// Resolves `range` into edge references.
    ///
    /// - `Single`: one reference per edge file in the terminal directory.
    /// - `DateRange`: per-date reads in ascending date order.
    /// - `NumericRange`: per-sibling reads in ascending section order.
    pub fn query_edge_references(
        &self,
        range: &PlacementRange,
    ) -> IndexResult<Vec<EdgeReference>> {
        let started_at = Instant::now();
        let mut references = Vec::new();
        for placement in range.placements() {
            match self.read_edges(&placement) {
                Ok(found) => references.extend(found),
                Err(err) => {
                    error!(
                        "event=index_query module=index status=error shape={} duration_ms={} error={}",
                        range.shape(),
                        started_at.elapsed().as_millis(),
                        err
                    );
                    return Err(err);
                }
            }
        }
        debug!(
            "event=index_query module=index status=ok shape={} refs={} duration_ms={}",
            range.shape(),
            references.len(),
            started_at.elapsed().as_millis()
        );
        Ok(references)
    }

    /// Reads the edge files directly inside `placement`'s directory.
    pub(crate) fn read_edges(&self, placement: &Placement) -> IndexResult<Vec<EdgeReference>> {
        let scope = scope_of(placement.head());
        let dir = self.placement_dir(placement);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(io_error(
                    scope,
                    IndexOperation::ListDirectory,
                    placement.to_string(),
                    err,
                ))
            }
        };

        let mut references = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| {
                io_error(
                    scope,
                    IndexOperation::ListDirectory,
                    placement.to_string(),
                    err,
                )
            })?;
            let path = entry.path();
            if !is_edge_file_name(&path) {
                continue;
            }
            let file_type = entry.file_type().map_err(|err| {
                io_error(scope, IndexOperation::ReadEdge, placement.to_string(), err)
            })?;
            if !file_type.is_file() {
                continue;
            }

            let stem = path
                .file_stem()
                .and_then(|value| value.to_str())
                .unwrap_or_default();
            let identifier = format!("{placement}/{stem}");
            let item_id = ItemId::parse(stem).ok_or_else(|| IndexError::InvalidEdge {
                scope,
                identifier: identifier.clone(),
                message: "edge file name is not an item id".to_string(),
            })?;

            let bytes = fs::read(&path).map_err(|err| {
                io_error(scope, IndexOperation::ReadEdge, identifier.clone(), err)
            })?;
            let edge = Edge::decode(&bytes).map_err(|message| IndexError::InvalidEdge {
                scope,
                identifier: identifier.clone(),
                message,
            })?;
            if let Some(source) = edge.source {
                if source != item_id {
                    return Err(IndexError::InvalidEdge {
                        scope,
                        identifier,
                        message: format!("edge source {source} does not match file name"),
                    });
                }
            }

            references.push(EdgeReference {
                item_id,
                rank: edge.rank,
                placement: placement.clone(),
            });
        }

        references.sort_by(|left, right| left.item_id.cmp(&right.item_id));
        Ok(references)
    }

    /// Writes (or replaces) the edge for `item_id` at `placement`.
    ///
    /// The body lands in a temp file first and is renamed into place, so
    /// readers never observe a half-written edge.
    pub fn write_edge(
        &self,
        placement: &Placement,
        item_id: ItemId,
        edge: &Edge,
    ) -> IndexResult<()> {
        let scope = scope_of(placement.head());
        let identifier = format!("{placement}/{item_id}");
        let dir = self.placement_dir(placement);
        fs::create_dir_all(&dir).map_err(|err| {
            io_error(scope, IndexOperation::WriteEdge, identifier.clone(), err)
        })?;

        let body = edge.encode().map_err(|err| IndexError::InvalidEdge {
            scope,
            identifier: identifier.clone(),
            message: err.to_string(),
        })?;
        let final_path = dir.join(edge_file_name(item_id));
        let temp_path = dir.join(format!(".{}.{TEMP_SUFFIX}", edge_file_name(item_id)));
        fs::write(&temp_path, body)
            .and_then(|()| fs::rename(&temp_path, &final_path))
            .map_err(|err| {
                let _ = fs::remove_file(&temp_path);
                io_error(scope, IndexOperation::WriteEdge, identifier.clone(), err)
            })?;

        debug!(
            "event=edge_write module=index status=ok scope={} placement={}",
            scope.as_str(),
            placement
        );
        Ok(())
    }

    /// Removes the edge for `item_id` at `placement`.
    ///
    /// Returns `false` when no edge existed. Numeric directories left empty
    /// are pruned up to, but excluding, the head directory.
    pub fn remove_edge(&self, placement: &Placement, item_id: ItemId) -> IndexResult<bool> {
        let scope = scope_of(placement.head());
        let dir = self.placement_dir(placement);
        match fs::remove_file(dir.join(edge_file_name(item_id))) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
            Err(err) => {
                return Err(io_error(
                    scope,
                    IndexOperation::RemoveEdge,
                    format!("{placement}/{item_id}"),
                    err,
                ))
            }
        }

        let mut current = dir;
        for _ in 0..placement.section().len() {
            match is_empty_dir(&current) {
                Ok(true) => {
                    if let Err(err) = fs::remove_dir(&current) {
                        warn!(
                            "event=edge_prune module=index status=error scope={} placement={} error={}",
                            scope.as_str(),
                            placement,
                            err
                        );
                        break;
                    }
                }
                Ok(false) => break,
                Err(err) => {
                    warn!(
                        "event=edge_prune module=index status=error scope={} placement={} error={}",
                        scope.as_str(),
                        placement,
                        err
                    );
                    break;
                }
            }
            current.pop();
        }

        debug!(
            "event=edge_remove module=index status=ok scope={} placement={}",
            scope.as_str(),
            placement
        );
        Ok(true)
    }

    /// Whether an edge file exists for `item_id` at `placement`.
    pub fn edge_exists(&self, placement: &Placement, item_id: ItemId) -> bool {
        self.placement_dir(placement)
            .join(edge_file_name(item_id))
            .is_file()
    }
}

pub(crate) fn scope_of(head: &PlacementHead) -> IndexScope {
    match head {
        PlacementHead::Date(_) => IndexScope::Dates,
        PlacementHead::Item(_) | PlacementHead::Permanent => IndexScope::Items,
    }
}

pub(crate) fn io_error(
    scope: IndexScope,
    operation: IndexOperation,
    identifier: String,
    source: std::io::Error,
) -> IndexError {
    IndexError::Io {
        scope,
        operation,
        identifier,
        source,
    }
}

pub(crate) fn is_edge_file_name(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|value| value.to_str())
        .is_some_and(|name| name.starts_with('.'));
    !hidden && path.extension().and_then(|value| value.to_str()) == Some(EDGE_FILE_EXTENSION)
}

/// Parses a canonical section directory name: digits only, no leading zero.
pub(crate) fn parse_section_dir_name(name: &str) -> Option<u32> {
    if name.is_empty() || name.starts_with('0') || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

fn edge_file_name(item_id: ItemId) -> String {
    format!("{item_id}.{EDGE_FILE_EXTENSION}")
}

fn is_empty_dir(dir: &Path) -> std::io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}
