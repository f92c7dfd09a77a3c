use std::{ops::Range, sync::Arc};

use tracing::trace;

use crate::{
    config::{Geometry, Policy},
    error::ConfigError,
    replace::Replace,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addr {
    pub set: usize,
    pub tag: u64,
}

/// Splits byte addresses into set index and tag. The offset inside a block
/// is dropped: every access is treated as block aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    block_size: u64,
    n_sets: u64,
}

impl Decoder {
    pub fn new(block_size: u64, n_sets: u64) -> Self {
        assert!(block_size > 0 && n_sets > 0);
        Decoder { block_size, n_sets }
    }

    pub fn split_addr(&self, addr: u64) -> Addr {
        let block = addr / self.block_size;
        Addr {
            set: (block % self.n_sets) as usize,
            tag: block / self.n_sets,
        }
    }

    /// First byte address of the block named by `addr`.
    pub fn join(&self, addr: Addr) -> u64 {
        (addr.tag * self.n_sets + addr.set as u64) * self.block_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    Hit,
    Miss,
}

impl AccessResult {
    pub fn is_hit(self) -> bool {
        self == AccessResult::Hit
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub valid: bool,
    pub tag: u64,
}

impl Block {
    fn apply(&mut self, addr: Addr) {
        self.valid = true;
        self.tag = addr.tag;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
}

pub struct Cache {
    geometry: Geometry,
    decoder: Decoder,
    policy: Policy,
    blocks: Vec<Block>,
    repl: Box<dyn Replace>,
    stats: CacheStats,
}

impl Cache {
    /// `trace` must be the sequence that will be replayed through
    /// [`Cache::access`]; Belady looks ahead in it.
    ///
    /// Fails with [`ConfigError::TooLarge`] when the block array cannot be
    /// allocated.
    pub fn new(
        geometry: Geometry,
        policy: Policy,
        trace: Arc<[u64]>,
    ) -> Result<Self, ConfigError> {
        let too_large = || ConfigError::TooLarge {
            blocks: geometry.n_sets * geometry.ways,
        };
        let n_blocks = usize::try_from(geometry.n_sets * geometry.ways).map_err(|_| too_large())?;
        let mut blocks = Vec::new();
        blocks.try_reserve_exact(n_blocks).map_err(|_| too_large())?;
        blocks.resize(n_blocks, Block::default());

        Ok(Cache {
            geometry,
            decoder: geometry.decoder(),
            policy,
            blocks,
            repl: policy.make_repl(&geometry, trace),
            stats: CacheStats::default(),
        })
    }

    /// Replays one access. `now` is the position of `addr` in the trace.
    pub fn access(&mut self, addr: u64, now: usize) -> AccessResult {
        self.stats.accesses += 1;
        let addr = self.decoder.split_addr(addr);
        let set_range = self.get_set(addr.set);
        let set_slice = &mut self.blocks[set_range];

        if let Some(way) = set_slice.iter().position(|b| b.valid && b.tag == addr.tag) {
            self.stats.hits += 1;
            self.repl.on_access(addr.set, way);
            return AccessResult::Hit;
        }

        self.stats.misses += 1;
        let way = match set_slice.iter().position(|b| !b.valid) {
            Some(vacant) => vacant,
            None => {
                let victim = self.repl.choose_victim(addr.set, set_slice, now);
                assert!(
                    victim < set_slice.len(),
                    "{} chose way {victim} in a {}-way set",
                    self.policy,
                    set_slice.len()
                );
                trace!(
                    set = addr.set,
                    way = victim,
                    evicted = set_slice[victim].tag,
                    tag = addr.tag,
                    "evict"
                );
                victim
            }
        };
        set_slice[way].apply(addr);
        self.repl.on_insert(addr.set, way);
        AccessResult::Miss
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Zeroes the counters but keeps the cache contents.
    pub fn clear_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Back to the freshly configured state.
    pub fn reset(&mut self) {
        self.blocks.fill(Block::default());
        self.repl.reset();
        self.clear_stats();
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn sets(&self) -> impl Iterator<Item = &[Block]> + '_ {
        self.blocks.chunks(self.geometry.ways as usize)
    }

    fn get_set(&self, set: usize) -> Range<usize> {
        let n_ways = self.geometry.ways as usize;
        set * n_ways..(set + 1) * n_ways
    }
}
