//! Placement core for a shelf of notes, tasks and events.
//!
//! Items live on date shelves, under other items, or on the permanent shelf,
//! optionally nested in numbered sections. A directory-shaped graph index
//! answers placement queries; listings are grouped into partitions at query
//! time.

pub mod config;
pub mod db;
pub mod index;
pub mod logging;
pub mod model;
pub mod partition;
pub mod repo;
pub mod service;
pub mod workspace;

pub use config::{ConfigError, WorkspaceConfig};
pub use index::{
    Edge, EdgeReference, GraphIndex, IndexError, SectionQueryService, SectionSummary,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::day::CalendarDay;
pub use model::item::{Item, ItemKind, ItemValidationError, TaskStatus};
pub use model::item_id::ItemId;
pub use model::placement::{
    parse_placement, Placement, PlacementHead, ValidationCode, ValidationError,
};
pub use model::range::PlacementRange;
pub use model::rank::ItemRank;
pub use partition::{
    format_warning, FormatOptions, Partition, PartitionBuilder, PartitionHeader,
    PartitionOptions, PartitionSet, PartitionWarning, SectionStub, StubExpander, StubQueries,
};
pub use repo::item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
pub use service::placement_service::{PlacementService, ServiceError};
pub use workspace::{Workspace, WorkspaceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
