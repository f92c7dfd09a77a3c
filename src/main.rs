use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use cachesim::{
    config::{Config, PartialConfig, Policy},
    report::CacheState,
    sim::{self, SimStats, Simulator},
    trace::TraceFile,
};

const USAGE: &str = "\
usage: cachesim -t <trace> [options]

  -t <path>             trace file (.xz is decompressed)
  --config <json>       json config layered over the trace header
  -p <path>             json config read from a file
  --policy <name>       FIFO, LRU, LFU or BELADY
  --cache-size <bytes>
  --block-size <bytes>
  --assoc <ways>
  --penalty <cycles>    miss penalty used for AMAT (default 100)
  -w <n>                warmup accesses left out of the statistics
  --dump                print the cache state after every access
  -q                    no per-access lines
  --compare             run every policy in parallel (no --dump or -q)
  --json <path>         write statistics as json";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = pico_args::Arguments::from_env();
    if args.contains("--help") {
        println!("{USAGE}");
        return Ok(());
    }

    let trace_path: PathBuf = args
        .opt_value_from_str("-t")?
        .context("must provide a trace with -t")?;
    let json_config: Option<String> = match args.opt_value_from_str("--config")? {
        Some(json) => Some(json),
        None => match args.opt_value_from_str::<_, PathBuf>("-p")? {
            Some(path) => Some(
                fs::read_to_string(&path)
                    .with_context(|| format!("could not read config {}", path.display()))?,
            ),
            None => None,
        },
    };
    let cli = PartialConfig {
        cache_size: args.opt_value_from_str("--cache-size")?,
        block_size: args.opt_value_from_str("--block-size")?,
        associativity: args.opt_value_from_str("--assoc")?,
        policy: args.opt_value_from_str::<_, Policy>("--policy")?,
        miss_penalty: args.opt_value_from_str("--penalty")?,
    };
    let warmup: usize = args.opt_value_from_str("-w")?.unwrap_or(0);
    let dump = args.contains("--dump");
    let quiet = args.contains("-q");
    let compare = args.contains("--compare");
    let stats_path: Option<PathBuf> = args.opt_value_from_str("--json")?;

    let leftover = args.finish();
    if !leftover.is_empty() {
        bail!("unexpected arguments: {leftover:?}\n\n{USAGE}");
    }
    check_output_flags(compare, dump, quiet)?;

    let trace = TraceFile::read(&trace_path)?;
    let mut layered = trace.header;
    if let Some(json) = json_config {
        let from_json: PartialConfig =
            serde_json::from_str(&json).context("invalid json config")?;
        layered = layered.merge(from_json);
    }
    let mut layered = layered.merge(cli);
    if compare && layered.policy.is_none() {
        // every policy runs anyway
        layered.policy = Some(Policy::Lru);
    }
    let config = layered.finish()?;

    let stats = if compare {
        run_compare(&config, trace.accesses, warmup)?
    } else {
        vec![run_single(&config, trace.accesses, warmup, dump, quiet)?]
    };

    if let Some(path) = stats_path {
        let stats_file = fs::File::create(&path)
            .with_context(|| format!("cannot open output file {}", path.display()))?;
        serde_json::to_writer_pretty(stats_file, &stats)?;
    }
    Ok(())
}

fn check_output_flags(compare: bool, dump: bool, quiet: bool) -> anyhow::Result<()> {
    if compare && (dump || quiet) {
        bail!("--dump and -q only apply to a single run, not --compare");
    }
    Ok(())
}

fn print_config(config: &Config, policy: &str) {
    println!("\nCACHE CONFIGURATION:");
    println!(
        "Cache Size: {}B, Block: {}B, Assoc: {}-way, Policy: {}\n",
        config.cache_size, config.block_size, config.associativity, policy
    );
}

fn run_single(
    config: &Config,
    trace: Arc<[u64]>,
    warmup: usize,
    dump: bool,
    quiet: bool,
) -> anyhow::Result<SimStats> {
    let mut sim = Simulator::new(config, trace)?.with_warmup(warmup);
    print_config(config, config.policy.name());

    let stats = sim.run_with(|rec, cache| {
        if !quiet {
            println!("{rec}");
        }
        if dump {
            print!("{}", CacheState(cache));
            println!("---------------------------------------------");
        }
    });

    println!("\n{stats}");
    println!("\nSimulation Complete.");
    Ok(stats)
}

fn run_compare(
    config: &Config,
    trace: Arc<[u64]>,
    warmup: usize,
) -> anyhow::Result<Vec<SimStats>> {
    print_config(config, "all");
    let stats = sim::compare(config, trace, &Policy::ALL, warmup)?;
    for s in &stats {
        println!("== {}\n{s}\n", s.policy);
    }
    Ok(stats)
}
