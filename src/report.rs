//! Console rendering of a simulation: one line per access, the cache
//! contents and the closing summary.

use std::fmt;

use crate::{cache::Cache, sim::{AccessRecord, SimStats}};

impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.result.is_hit() { "HIT" } else { "MISS" };
        write!(
            f,
            "Access {:>2} | Addr: {:>6} | {}",
            self.index + 1,
            self.addr,
            outcome
        )
    }
}

/// Every set on its own line, `[T<tag>]` for valid ways and `[ ]` for free ones.
pub struct CacheState<'a>(pub &'a Cache);

impl fmt::Display for CacheState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, blocks) in self.0.sets().enumerate() {
            write!(f, "Set {set:>2}: ")?;
            for block in blocks {
                if block.valid {
                    write!(f, "[T{}] ", block.tag)?;
                } else {
                    f.write_str("[ ] ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Accesses: {} | Hits: {} | Misses: {}",
            self.accesses, self.hits, self.misses
        )?;
        writeln!(
            f,
            "Hit Rate: {:.2}%  Miss Rate: {:.2}%",
            self.hit_rate * 100.0,
            self.miss_rate * 100.0
        )?;
        write!(f, "Average Memory Access Time (AMAT): {:.2} cycles", self.amat)
    }
}
