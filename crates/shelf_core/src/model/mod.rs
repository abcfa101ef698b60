//! Domain value types for the placement core.
//!
//! # Responsibility
//! - One small immutable type per concept: day, item id, rank, placement, range.
//! - Keep parse/serialize/compare on the types themselves.
//!
//! # Invariants
//! - Every wire form re-parses to an equal value.

pub mod day;
pub mod item;
pub mod item_id;
pub mod placement;
pub mod range;
pub mod rank;
