use std::collections::VecDeque;

use crate::cache::Block;

use super::{make_sets, MakeS, Replace};

pub struct Fifo {
    set_data: Vec<FifoSetData>,
}

impl Fifo {
    pub fn new(n_sets: usize, n_ways: usize) -> Self {
        Fifo {
            set_data: make_sets(n_sets, n_ways),
        }
    }
}

impl Replace for Fifo {
    fn choose_victim(&mut self, set: usize, _blocks: &[Block], _now: usize) -> usize {
        self.set_data[set]
            .arrival
            .pop_front()
            .expect("full set has an arrival order")
    }

    fn on_access(&mut self, _set: usize, _way: usize) {}

    fn on_insert(&mut self, set: usize, way: usize) {
        self.set_data[set].arrival.push_back(way);
    }

    fn reset(&mut self) {
        self.set_data.iter_mut().for_each(|s| s.arrival.clear());
    }
}

#[derive(Debug, Default)]
pub struct FifoSetData {
    arrival: VecDeque<usize>,
}

impl MakeS for FifoSetData {
    fn new(n_ways: usize) -> Self {
        FifoSetData {
            arrival: VecDeque::with_capacity(n_ways),
        }
    }
}
