//! Filesystem-backed secondary index over item placements.
//!
//! # Responsibility
//! - Answer "which items sit at placement P" from directory shape alone.
//! - Aggregate child-section counts without loading item records.
//!
//! # Invariants
//! - The index is a mirror: item records stay authoritative for placement.
//! - Read paths never mutate the tree; only repository write paths call the
//!   edge writer.
//! - Single-writer assumption: no locks or leases guard the tree. Several
//!   processes sharing one workspace can observe an index entry whose item has
//!   since moved (read-then-load window). Deployments with concurrent writers
//!   must add their own file locking.
//!
//! # Layout
//! ```text
//! <root>/dates/<YYYY-MM-DD>/<n>/.../<item-id>.json
//! <root>/items/<parent-item-id>/<n>/.../<item-id>.json
//! ```
//! Permanent-headed placements live under the permanent root's reserved id.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod edge;
pub mod graph;
pub mod sections;

pub use edge::{Edge, EdgeReference, EDGE_SCHEMA};
pub use graph::GraphIndex;
pub use sections::{SectionQueryService, SectionSummary};

pub type IndexResult<T> = Result<T, IndexError>;

/// Index namespace touched by a failing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexScope {
    /// Date-keyed subtree.
    Dates,
    /// Item-keyed subtree (item and permanent heads).
    Items,
}

impl IndexScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dates => "dates",
            Self::Items => "items",
        }
    }
}

/// Index operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOperation {
    ListDirectory,
    ReadEdge,
    WriteEdge,
    RemoveEdge,
}

impl IndexOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListDirectory => "list_directory",
            Self::ReadEdge => "read_edge",
            Self::WriteEdge => "write_edge",
            Self::RemoveEdge => "remove_edge",
        }
    }
}

/// Index I/O failure or structurally invalid edge file.
///
/// `identifier` is the placement (plus edge file stem where relevant), never a
/// filesystem path.
#[derive(Debug)]
pub enum IndexError {
    Io {
        scope: IndexScope,
        operation: IndexOperation,
        identifier: String,
        source: std::io::Error,
    },
    InvalidEdge {
        scope: IndexScope,
        identifier: String,
        message: String,
    },
}

impl IndexError {
    pub fn scope(&self) -> IndexScope {
        match self {
            Self::Io { scope, .. } | Self::InvalidEdge { scope, .. } => *scope,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Self::Io { identifier, .. } | Self::InvalidEdge { identifier, .. } => identifier,
        }
    }
}

impl Display for IndexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io {
                scope,
                operation,
                identifier,
                source,
            } => write!(
                f,
                "index {} failed in {} scope for `{identifier}`: {source}",
                operation.as_str(),
                scope.as_str()
            ),
            Self::InvalidEdge {
                scope,
                identifier,
                message,
            } => write!(
                f,
                "invalid edge `{identifier}` in {} scope: {message}",
                scope.as_str()
            ),
        }
    }
}

impl Error for IndexError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidEdge { .. } => None,
        }
    }
}
