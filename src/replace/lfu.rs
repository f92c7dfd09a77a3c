use crate::cache::Block;

use super::{make_sets, MakeS, Replace};

pub struct Lfu {
    set_data: Vec<LfuSetData>,
}

impl Lfu {
    pub fn new(n_sets: usize, n_ways: usize) -> Self {
        Lfu {
            set_data: make_sets(n_sets, n_ways),
        }
    }
}

impl Replace for Lfu {
    /// Lowest count wins; ties go to the lowest way.
    fn choose_victim(&mut self, set: usize, _blocks: &[Block], _now: usize) -> usize {
        self.set_data[set]
            .counts
            .iter()
            .enumerate()
            .min_by_key(|&(_way, count)| *count)
            .map(|(way, _count)| way)
            .expect("set has at least one way")
    }

    fn on_access(&mut self, set: usize, way: usize) {
        self.set_data[set].counts[way] += 1;
    }

    fn on_insert(&mut self, set: usize, way: usize) {
        self.set_data[set].counts[way] = 1;
    }

    fn reset(&mut self) {
        self.set_data.iter_mut().for_each(|s| s.counts.fill(0));
    }
}

#[derive(Debug, Default)]
pub struct LfuSetData {
    counts: Vec<u64>,
}

impl MakeS for LfuSetData {
    fn new(n_ways: usize) -> Self {
        LfuSetData {
            counts: vec![0; n_ways],
        }
    }
}
