use std::sync::Arc;

use cachesim::{
    cache::{AccessResult, Cache},
    config::{Config, Geometry, Policy},
    sim::Simulator,
};

fn config(cache_size: u64, block_size: u64, associativity: u64, policy: Policy) -> Config {
    Config {
        cache_size,
        block_size,
        associativity,
        policy,
        miss_penalty: 100.0,
    }
}

fn random_trace(
    rng: &mut fastrand::Rng,
    len: usize,
    distinct_blocks: u64,
    block_size: u64,
) -> Arc<[u64]> {
    (0..len)
        .map(|_| rng.u64(0..distinct_blocks) * block_size + rng.u64(0..block_size))
        .collect()
}

fn misses(config: &Config, trace: &Arc<[u64]>) -> u64 {
    Simulator::new(config, Arc::clone(trace)).unwrap().run().misses
}

#[test]
fn belady_never_loses() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let shapes = [(64, 16, 1), (64, 16, 2), (128, 16, 4), (256, 32, 8), (96, 16, 3)];
    for round in 0..40 {
        let (cache_size, block_size, ways) = shapes[round % shapes.len()];
        let trace = random_trace(&mut rng, 400, 24, block_size);
        let optimal = misses(&config(cache_size, block_size, ways, Policy::Belady), &trace);
        for policy in [Policy::Fifo, Policy::Lru, Policy::Lfu] {
            let other = misses(&config(cache_size, block_size, ways, policy), &trace);
            assert!(
                optimal <= other,
                "round {round}: BELADY missed {optimal} times, {policy} {other}"
            );
        }
    }
}

#[test]
fn fifo_evicts_first_arrival_despite_hits() {
    // one set, two ways: fill 0 and 1, hit 0, then bring in 2
    let trace: Arc<[u64]> = [0, 16, 0, 32, 0].into();
    let geometry = Geometry::new(32, 16, 2).unwrap();
    let mut cache = Cache::new(geometry, Policy::Fifo, trace.clone()).unwrap();
    let results: Vec<_> = trace
        .iter()
        .enumerate()
        .map(|(now, &addr)| cache.access(addr, now))
        .collect();
    // block 0 arrived first, so it went out even though it was just hit
    assert_eq!(results.last(), Some(&AccessResult::Miss));
}

#[test]
fn lru_keeps_recently_hit_block() {
    let trace: Arc<[u64]> = [0, 16, 0, 32, 0].into();
    let geometry = Geometry::new(32, 16, 2).unwrap();
    let mut cache = Cache::new(geometry, Policy::Lru, trace.clone()).unwrap();
    let results: Vec<_> = trace
        .iter()
        .enumerate()
        .map(|(now, &addr)| cache.access(addr, now))
        .collect();
    assert_eq!(results.last(), Some(&AccessResult::Hit));
}

#[test]
fn lfu_keeps_frequent_block() {
    // block 0 hit twice, block 1 once; block 2 must replace block 1
    let trace: Arc<[u64]> = [0, 16, 0, 0, 16, 32, 0, 16].into();
    let mut sim = Simulator::new(&config(32, 16, 2, Policy::Lfu), trace).unwrap();
    let mut results = Vec::new();
    sim.run_with(|rec, _| results.push(rec.result.is_hit()));
    assert_eq!(results, [false, false, true, true, true, false, true, false]);
}

#[test]
fn belady_beats_lru_on_cyclic_trace() {
    // three blocks cycling through a two-way set defeat LRU completely
    let trace: Arc<[u64]> = [0u64, 16, 32].repeat(4).into();
    let lru = misses(&config(32, 16, 2, Policy::Lru), &trace);
    let opt = misses(&config(32, 16, 2, Policy::Belady), &trace);
    assert_eq!(lru, 12);
    assert!(opt < lru);
}

#[test]
fn reset_is_idempotent_on_random_traces() {
    let mut rng = fastrand::Rng::with_seed(7);
    for policy in Policy::ALL {
        let trace = random_trace(&mut rng, 300, 20, 16);
        let mut sim = Simulator::new(&config(128, 16, 2, policy), trace).unwrap();
        let first = sim.run();
        sim.reset();
        sim.reset();
        assert_eq!(sim.run(), first, "{policy}");
    }
}
