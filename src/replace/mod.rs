pub mod belady;
pub mod fifo;
pub mod lfu;
pub mod lru;

use std::iter;

use crate::cache::Block;

/// Per-set bookkeeping built once per set when a policy is created.
pub trait MakeS {
    fn new(n_ways: usize) -> Self;
}

fn make_sets<S: MakeS>(n_sets: usize, n_ways: usize) -> Vec<S> {
    iter::repeat_with(|| S::new(n_ways)).take(n_sets).collect()
}

/// Block replacement policy of a [`Cache`](crate::cache::Cache).
///
/// The cache always fills an invalid way before asking for a victim, so
/// `choose_victim` only ever sees full sets.
pub trait Replace: Send {
    /// Picks the way to evict from the full set `set`. `blocks` is the set's
    /// current content and `now` the trace position of the missing access.
    fn choose_victim(&mut self, set: usize, blocks: &[Block], now: usize) -> usize;

    /// A hit on `way`.
    fn on_access(&mut self, set: usize, way: usize);

    /// A new tag now lives in `way`.
    fn on_insert(&mut self, set: usize, way: usize);

    fn reset(&mut self);
}
