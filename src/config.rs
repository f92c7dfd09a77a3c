use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    cache::Decoder,
    error::ConfigError,
    replace::{belady::Belady, fifo::Fifo, lfu::Lfu, lru::Lru, Replace},
};

pub const DEFAULT_MISS_PENALTY: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Policy {
    Fifo,
    Lru,
    Lfu,
    Belady,
}

impl Policy {
    pub const ALL: [Policy; 4] = [Policy::Fifo, Policy::Lru, Policy::Lfu, Policy::Belady];

    pub fn name(self) -> &'static str {
        match self {
            Policy::Fifo => "FIFO",
            Policy::Lru => "LRU",
            Policy::Lfu => "LFU",
            Policy::Belady => "BELADY",
        }
    }

    /// Builds the replacement state for a cache of the given shape. Only
    /// Belady keeps the trace; the others drop it.
    pub fn make_repl(self, geometry: &Geometry, trace: Arc<[u64]>) -> Box<dyn Replace> {
        let n_sets = geometry.n_sets as usize;
        let n_ways = geometry.ways as usize;
        match self {
            Policy::Fifo => Box::new(Fifo::new(n_sets, n_ways)),
            Policy::Lru => Box::new(Lru::new(n_sets, n_ways)),
            Policy::Lfu => Box::new(Lfu::new(n_sets, n_ways)),
            Policy::Belady => Box::new(Belady::new(geometry.decoder(), trace)),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Policy::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownPolicy(s.to_owned()))
    }
}

impl TryFrom<String> for Policy {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Validated cache shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub cache_size: u64,
    pub block_size: u64,
    pub ways: u64,
    pub n_sets: u64,
}

impl Geometry {
    pub fn new(cache_size: u64, block_size: u64, ways: u64) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("cache size", cache_size),
            ("block size", block_size),
            ("associativity", ways),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }
        let uneven = || ConfigError::Uneven {
            cache_size,
            block_size,
            ways,
        };
        let set_bytes = block_size.checked_mul(ways).ok_or_else(uneven)?;
        if cache_size % set_bytes != 0 {
            return Err(uneven());
        }
        Ok(Geometry {
            cache_size,
            block_size,
            ways,
            n_sets: cache_size / set_bytes,
        })
    }

    pub fn decoder(&self) -> Decoder {
        Decoder::new(self.block_size, self.n_sets)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub cache_size: u64,
    pub block_size: u64,
    pub associativity: u64,
    pub policy: Policy,
    pub miss_penalty: f64,
}

impl Config {
    pub fn geometry(&self) -> Result<Geometry, ConfigError> {
        Geometry::new(self.cache_size, self.block_size, self.associativity)
    }

    pub fn with_policy(self, policy: Policy) -> Self {
        Config { policy, ..self }
    }
}

/// One source of settings: the trace header, a json config or the command
/// line. Later layers win in [`PartialConfig::merge`].
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    pub cache_size: Option<u64>,
    pub block_size: Option<u64>,
    pub associativity: Option<u64>,
    pub policy: Option<Policy>,
    pub miss_penalty: Option<f64>,
}

impl PartialConfig {
    pub fn merge(self, over: PartialConfig) -> PartialConfig {
        PartialConfig {
            cache_size: over.cache_size.or(self.cache_size),
            block_size: over.block_size.or(self.block_size),
            associativity: over.associativity.or(self.associativity),
            policy: over.policy.or(self.policy),
            miss_penalty: over.miss_penalty.or(self.miss_penalty),
        }
    }

    pub fn finish(self) -> Result<Config, ConfigError> {
        Ok(Config {
            cache_size: self.cache_size.ok_or(ConfigError::Missing("CACHE_SIZE"))?,
            block_size: self.block_size.ok_or(ConfigError::Missing("BLOCK_SIZE"))?,
            associativity: self
                .associativity
                .ok_or(ConfigError::Missing("ASSOCIATIVITY"))?,
            policy: self.policy.ok_or(ConfigError::Missing("POLICY"))?,
            miss_penalty: self.miss_penalty.unwrap_or(DEFAULT_MISS_PENALTY),
        })
    }
}
