use std::sync::Arc;

use crate::cache::{Addr, Block, Decoder};

use super::Replace;

/// Optimal offline replacement: evicts the block whose next use lies
/// farthest ahead in the trace.
///
/// Unlike the other policies it keeps no per-set state. Each eviction scans
/// the rest of the trace once per resident block.
pub struct Belady {
    decoder: Decoder,
    trace: Arc<[u64]>,
}

impl Belady {
    pub fn new(decoder: Decoder, trace: Arc<[u64]>) -> Self {
        Belady { decoder, trace }
    }

    /// Trace position of the first reference to `addr` after `now`.
    fn next_use(&self, addr: Addr, now: usize) -> Option<usize> {
        self.trace
            .iter()
            .enumerate()
            .skip(now + 1)
            .find(|&(_idx, &future)| self.decoder.split_addr(future) == addr)
            .map(|(idx, _future)| idx)
    }
}

impl Replace for Belady {
    fn choose_victim(&mut self, set: usize, blocks: &[Block], now: usize) -> usize {
        let mut victim = 0;
        let mut farthest = 0;
        for (way, block) in blocks.iter().enumerate() {
            match self.next_use(Addr { set, tag: block.tag }, now) {
                // never used again, nothing beats that
                None => return way,
                Some(next) if next > farthest => {
                    farthest = next;
                    victim = way;
                }
                Some(_) => {}
            }
        }
        victim
    }

    fn on_access(&mut self, _set: usize, _way: usize) {}

    fn on_insert(&mut self, _set: usize, _way: usize) {}

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resident(tags: &[u64]) -> Vec<Block> {
        tags.iter().map(|&tag| Block { valid: true, tag }).collect()
    }

    // 16 byte blocks, 2 sets: address = (tag * 2 + set) * 16
    fn belady(trace: &[u64]) -> Belady {
        Belady::new(Decoder::new(16, 2), trace.into())
    }

    #[test]
    fn evicts_farthest_next_use() {
        // set 0 tags:     0   1   2   1   0
        let mut b = belady(&[0, 32, 64, 32, 0]);
        assert_eq!(b.choose_victim(0, &resident(&[0, 1]), 2), 0);
    }

    #[test]
    fn never_reused_goes_first() {
        let mut b = belady(&[0, 32, 64, 96, 0, 32]);
        // tag 3 is never referenced after position 3
        assert_eq!(b.choose_victim(0, &resident(&[0, 3, 1]), 3), 1);
    }

    #[test]
    fn first_never_reused_way_wins() {
        let mut b = belady(&[0, 32, 64, 96]);
        assert_eq!(b.choose_victim(0, &resident(&[0, 1, 2]), 3), 0);
    }

    #[test]
    fn lookahead_starts_after_now() {
        // tag 1 is referenced at position 3 itself, which must not count
        let mut b = belady(&[0, 32, 0, 32, 0]);
        assert_eq!(b.choose_victim(0, &resident(&[0, 1]), 3), 1);
    }

    #[test]
    fn other_sets_do_not_count_as_reuse() {
        // address 16 is set 1 tag 0, not set 0 tag 0
        let mut b = belady(&[0, 32, 64, 16, 32]);
        assert_eq!(b.choose_victim(0, &resident(&[0, 1]), 2), 0);
    }
}
