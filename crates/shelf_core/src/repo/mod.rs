//! Item repository contract and reference implementation.
//!
//! # Responsibility
//! - Define the item capability the placement core consumes.
//! - Keep index edges in step with item records on every write.
//!
//! # Invariants
//! - Item rows are authoritative; edges mirror `Item::placement`.
//! - Write paths validate items before persistence.

pub mod item_repo;
