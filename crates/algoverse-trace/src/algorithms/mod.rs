//! The algorithm library.
//!
//! Every generator is a direct transcription of the textbook algorithm with
//! trace points at each comparison, each mutation and each structural
//! decision. Edge cases (empty input, target absent, disconnected graph,
//! negative cycle, unsatisfiable board) end in a descriptive terminal
//! outcome rather than an error.

pub mod backtracking;
pub mod divide;
pub mod dynamic;
pub mod graph;
pub mod greedy;
pub mod searching;
pub mod sorting;
pub mod string;

use crate::catalog::Catalog;

/// Registers every generator in the library.
pub fn register_all(catalog: &mut Catalog) {
    searching::register(catalog);
    sorting::register(catalog);
    graph::register(catalog);
    string::register(catalog);
    dynamic::register(catalog);
    greedy::register(catalog);
    backtracking::register(catalog);
    divide::register(catalog);
}

/// Indices `lo..=hi` as a highlight set; empty when `lo > hi`.
pub(crate) fn span(lo: usize, hi: usize) -> impl Iterator<Item = usize> {
    lo..hi.saturating_add(1)
}
