use std::collections::VecDeque;

use crate::cache::Block;

use super::{make_sets, MakeS, Replace};

pub struct Lru {
    set_data: Vec<LruSetData>,
}

impl Lru {
    pub fn new(n_sets: usize, n_ways: usize) -> Self {
        Lru {
            set_data: make_sets(n_sets, n_ways),
        }
    }
}

impl Replace for Lru {
    fn choose_victim(&mut self, set: usize, _blocks: &[Block], _now: usize) -> usize {
        self.set_data[set]
            .ru_order
            .pop_front()
            .expect("full set has a recency order")
    }

    fn on_access(&mut self, set: usize, way: usize) {
        let ru_order = &mut self.set_data[set].ru_order;
        if let Some(idx) = ru_order.iter().position(|&w| w == way) {
            ru_order.remove(idx);
        }
        ru_order.push_back(way);
    }

    fn on_insert(&mut self, set: usize, way: usize) {
        self.on_access(set, way);
    }

    fn reset(&mut self) {
        self.set_data.iter_mut().for_each(|s| s.ru_order.clear());
    }
}

/// Least recently used way at the front.
#[derive(Debug, Default)]
pub struct LruSetData {
    ru_order: VecDeque<usize>,
}

impl MakeS for LruSetData {
    fn new(n_ways: usize) -> Self {
        LruSetData {
            ru_order: VecDeque::with_capacity(n_ways),
        }
    }
}
