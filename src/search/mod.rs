//! Generic search primitives

pub mod best_first;

pub use best_first::{bounded_best_first, SearchPolicy, SearchResult};
