//! drift-rng - sample the simulator's shared kernel RNG from the shell
//!
//! Useful for eyeballing distributions, pinning regression fixtures, and
//! checking that a machine's toolchain can build the shim at all. Run with
//! `RUST_LOG=info` to see the compile step.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use drift_simulator_rng_rs::{KernelRng, RngConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "drift-rng",
    version,
    about = "Sample the drift simulator's seeded kernel RNG"
)]
struct Cli {
    /// Seed the native generator before drawing; omitted = fresh random seed
    #[arg(long)]
    seed: Option<i32>,

    /// Number of draws
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Cache directory for the compiled shim (default: $DRIFT_CACHE_DIR,
    /// else the system temp dir)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Emit one JSON document instead of one draw per line
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    distribution: Distribution,
}

#[derive(Subcommand, Clone, Copy)]
enum Distribution {
    /// Uniform floats in [0, 1)
    Random,

    /// Uniform floats in [low, high)
    Uniform {
        #[arg(long)]
        low: f32,
        #[arg(long)]
        high: f32,
    },

    /// Integers in [low, high], both ends inclusive
    Randint {
        #[arg(long)]
        low: i32,
        #[arg(long)]
        high: i32,
    },

    /// Normal draws with mean `loc` and standard deviation `scale`
    Normal {
        #[arg(long, default_value_t = 0.0)]
        loc: f32,
        #[arg(long, default_value_t = 1.0)]
        scale: f32,
    },

    /// Exponential draws with rate `lambda`
    Expo {
        #[arg(long, default_value_t = 1.0)]
        lambda: f32,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = RngConfig {
        cache_dir: cli.cache_dir.clone(),
        ..RngConfig::default()
    };
    let rng = KernelRng::with_config(config);

    if let Some(seed) = cli.seed {
        rng.reseed(seed, true)
            .context("failed to seed the native generator")?;
    }

    let mut draws = Vec::with_capacity(cli.count);
    for _ in 0..cli.count {
        let value = match cli.distribution {
            Distribution::Random => serde_json::json!(rng.random().context("draw failed")?),
            Distribution::Uniform { low, high } => {
                serde_json::json!(rng.uniform(low, high).context("draw failed")?)
            }
            Distribution::Randint { low, high } => {
                serde_json::json!(rng.randint(low, high).context("draw failed")?)
            }
            Distribution::Normal { loc, scale } => {
                serde_json::json!(rng.normalvariate(loc, scale).context("draw failed")?)
            }
            Distribution::Expo { lambda } => {
                serde_json::json!(rng.expovariate(lambda).context("draw failed")?)
            }
        };
        draws.push(value);
    }

    let (seed, seeded) = rng.get_seed();
    if cli.json {
        let doc = serde_json::json!({
            "seed": seed,
            "seeded_natively": seeded,
            "draws": draws,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        for value in &draws {
            println!("{value}");
        }
    }
    Ok(())
}
