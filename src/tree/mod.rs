//! Weighted file tree: flat arena storage plus aggregation helpers.
//!
//! The tree is produced by an external scanning subsystem; this crate only
//! reads it. Before layout, callers must run [`aggregate::aggregate_sizes`]
//! and [`aggregate::sort_children_by_size`] so that directory sizes equal
//! their children's sums and siblings are ordered by descending size.

pub mod aggregate;
pub mod arena;
