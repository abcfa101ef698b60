//! Child-section aggregation from index directory shape.
//!
//! # Invariants
//! - Only canonical numeric directory names count as sections.
//! - Summaries with zero items and zero sections are never returned.
//! - Output is strictly ascending by section number.
//! - Emptiness is judged one level deep: a child directory counts toward
//!   `section_count` even if its own subtree holds no edges.

use crate::index::graph::{io_error, is_edge_file_name, parse_section_dir_name, scope_of};
use crate::index::{GraphIndex, IndexOperation, IndexResult, IndexScope};
use crate::model::placement::Placement;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Aggregate for one immediate child section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSummary {
    pub placement: Placement,
    /// Edge files directly inside the section.
    pub item_count: usize,
    /// Immediate numeric subdirectories of the section.
    pub section_count: usize,
}

impl SectionSummary {
    pub fn is_empty(&self) -> bool {
        self.item_count == 0 && self.section_count == 0
    }
}

/// Lists child sections of a placement.
pub struct SectionQueryService<'a> {
    index: &'a GraphIndex,
}

impl<'a> SectionQueryService<'a> {
    pub fn new(index: &'a GraphIndex) -> Self {
        Self { index }
    }

    /// Returns non-empty immediate child sections of `placement`.
    ///
    /// A missing base directory yields an empty list.
    pub fn list_sections(&self, placement: &Placement) -> IndexResult<Vec<SectionSummary>> {
        let scope = scope_of(placement.head());
        let base = self.index.placement_dir(placement);
        let children = match numeric_children(&base) {
            Ok(children) => children,
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

        let mut summaries = Vec::with_capacity(children.len());
        for (value, dir) in children {
            let child = placement.child(value);
            let summary = summarize(scope, &child, &dir)?;
            if !summary.is_empty() {
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }
}

fn summarize(scope: IndexScope, placement: &Placement, dir: &Path) -> IndexResult<SectionSummary> {
    let entries = fs::read_dir(dir).map_err(|err| {
        io_error(
            scope,
            IndexOperation::ListDirectory,
            placement.to_string(),
            err,
        )
    })?;

    let mut item_count = 0;
    let mut section_count = 0;
    for entry in entries {
        let entry = entry.map_err(|err| {
            io_error(
                scope,
                IndexOperation::ListDirectory,
                placement.to_string(),
                err,
            )
        })?;
        let file_type = entry.file_type().map_err(|err| {
            io_error(
                scope,
                IndexOperation::ListDirectory,
                placement.to_string(),
                err,
            )
        })?;
        let path = entry.path();
        if file_type.is_file() && is_edge_file_name(&path) {
            item_count += 1;
        } else if file_type.is_dir()
            && entry
                .file_name()
                .to_str()
                .and_then(parse_section_dir_name)
                .is_some()
        {
            section_count += 1;
        }
    }

    Ok(SectionSummary {
        placement: placement.clone(),
        item_count,
        section_count,
    })
}

/// Numeric child directories of `dir`, ascending by value.
fn numeric_children(dir: &Path) -> std::io::Result<Vec<(u32, PathBuf)>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(value) = entry.file_name().to_str().and_then(parse_section_dir_name) {
            children.push((value, entry.path()));
        }
    }
    children.sort_by_key(|(value, _)| *value);
    Ok(children)
}
