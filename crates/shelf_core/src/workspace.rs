//! Workspace handle: configuration, item store and graph index under one root.
//!
//! # Invariants
//! - The item store is migrated before any repository is handed out.
//! - Configured relative paths resolve against the workspace root.

use crate::config::{ConfigError, WorkspaceConfig};
use crate::db::{open_db, DbError};
use crate::index::GraphIndex;
use crate::repo::item_repo::{RepoResult, SqliteItemRepository};
use crate::service::placement_service::PlacementService;
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum WorkspaceError {
    Config(ConfigError),
    Db(DbError),
}

impl Display for WorkspaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkspaceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<ConfigError> for WorkspaceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for WorkspaceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

pub struct Workspace {
    root: PathBuf,
    config: WorkspaceConfig,
    conn: Connection,
    index: GraphIndex,
}

impl Workspace {
    /// Loads `shelf.toml` (if any), opens the item store and binds the index.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, WorkspaceError> {
        let root = root.as_ref().to_path_buf();
        let config = WorkspaceConfig::load(&root)?;
        let conn = open_db(root.join(&config.database_file))?;
        let index = GraphIndex::new(root.join(&config.index_dir));
        info!(
            "event=workspace_open module=workspace status=ok date_limit={} section_limit={}",
            config.date_limit, config.section_limit
        );
        Ok(Self {
            root,
            config,
            conn,
            index,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn index(&self) -> &GraphIndex {
        &self.index
    }

    pub fn items(&self) -> RepoResult<SqliteItemRepository<'_>> {
        SqliteItemRepository::try_new(&self.conn, &self.index)
    }

    pub fn placements(&self) -> RepoResult<PlacementService<'_, SqliteItemRepository<'_>>> {
        Ok(PlacementService::new(self.items()?, &self.index))
    }
}
