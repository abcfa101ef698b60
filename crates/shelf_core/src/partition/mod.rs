//! Query-time grouping and rendering of placement listings.
//!
//! # Responsibility
//! - Turn a range plus resolved items into ordered partitions and warnings.
//! - Expand section stubs into depth-bounded text lines.
//!
//! # Invariants
//! - Partitions are rebuilt per query and never persisted.

pub mod builder;
pub mod stub;

pub use builder::{
    format_warning, Partition, PartitionBuilder, PartitionHeader, PartitionOptions, PartitionSet,
    PartitionWarning,
};
pub use stub::{FormatOptions, SectionStub, StubExpander, StubQueries};
