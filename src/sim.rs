use std::{panic, sync::Arc};

use serde::Serialize;
use tracing::debug;

use crate::{
    cache::{AccessResult, Cache},
    config::{Config, Policy},
    error::ConfigError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRecord {
    pub index: usize,
    pub addr: u64,
    pub result: AccessResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimStats {
    pub policy: Policy,
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub amat: f64,
}

/// Replays one trace through one cache.
pub struct Simulator {
    cache: Cache,
    trace: Arc<[u64]>,
    miss_penalty: f64,
    warmup: usize,
}

impl Simulator {
    pub fn new(config: &Config, trace: Arc<[u64]>) -> Result<Self, ConfigError> {
        let geometry = config.geometry()?;
        Ok(Simulator {
            cache: Cache::new(geometry, config.policy, Arc::clone(&trace))?,
            trace,
            miss_penalty: config.miss_penalty,
            warmup: 0,
        })
    }

    /// Statistics only cover accesses after the first `n`.
    pub fn with_warmup(mut self, n: usize) -> Self {
        self.warmup = n;
        self
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn run(&mut self) -> SimStats {
        self.run_with(|_, _| {})
    }

    /// Like [`Simulator::run`], calling `observe` after every access.
    pub fn run_with(&mut self, mut observe: impl FnMut(&AccessRecord, &Cache)) -> SimStats {
        let geometry = self.cache.geometry();
        debug!(
            policy = %self.cache.policy(),
            sets = geometry.n_sets,
            ways = geometry.ways,
            block_size = geometry.block_size,
            accesses = self.trace.len(),
            "starting simulation"
        );

        for (index, &addr) in self.trace.iter().enumerate() {
            let result = self.cache.access(addr, index);
            observe(
                &AccessRecord {
                    index,
                    addr,
                    result,
                },
                &self.cache,
            );
            if index < self.warmup {
                self.cache.clear_stats();
            }
        }

        let stats = self.stats();
        debug!(hits = stats.hits, misses = stats.misses, "finished simulation");
        stats
    }

    pub fn stats(&self) -> SimStats {
        let counts = self.cache.stats();
        let miss_rate = counts.misses as f64 / counts.accesses.max(1) as f64;
        SimStats {
            policy: self.cache.policy(),
            accesses: counts.accesses,
            hits: counts.hits,
            misses: counts.misses,
            hit_rate: 1.0 - miss_rate,
            miss_rate,
            amat: 1.0 + miss_rate * self.miss_penalty,
        }
    }

    pub fn reset(&mut self) {
        self.cache.reset();
    }
}

/// Runs `trace` under every policy in `policies` at once, one thread and one
/// cache per policy. Results come back in the order of `policies`.
pub fn compare(
    config: &Config,
    trace: Arc<[u64]>,
    policies: &[Policy],
    warmup: usize,
) -> Result<Vec<SimStats>, ConfigError> {
    let mut sims = policies
        .iter()
        .map(|&policy| {
            Simulator::new(&config.with_policy(policy), Arc::clone(&trace))
                .map(|sim| sim.with_warmup(warmup))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let stats = crossbeam::scope(|s| {
        let handles: Vec<_> = sims
            .iter_mut()
            .map(|sim| s.spawn(move |_| sim.run()))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect()
    })
    .unwrap_or_else(|e| panic::resume_unwind(e));
    Ok(stats)
}
