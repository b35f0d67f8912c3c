use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use oregen_types::{OreTypeId, WorldId};

#[derive(Parser)]
#[command(
    name = "oregen",
    about = "Ore generation ledger tooling",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Plugin data directory holding the ledger database
    #[arg(long, global = true, default_value = ".")]
    pub data_dir: PathBuf,

    /// Engine config file [default: <data-dir>/oregen.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.data_dir.join("oregen.toml"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the ledger database and tables
    Init,
    /// Show the configured generation rules
    Rules,
    /// List chunks recorded for an ore type
    List(ListArgs),
    /// Show whether a chunk is recorded
    Check(ChunkArgs),
    /// Record a chunk as generated without scanning it
    Mark(ChunkArgs),
    /// Seed legacy-table rows for the grandfathered ore type
    LegacyImport(LegacyImportArgs),
}

#[derive(Args)]
pub struct ListArgs {
    pub ore_type: OreTypeId,
    /// Only show chunks in this world
    #[arg(long)]
    pub world: Option<WorldId>,
}

#[derive(Args)]
pub struct ChunkArgs {
    pub ore_type: OreTypeId,
    pub world: WorldId,
    #[arg(allow_negative_numbers = true)]
    pub chunk_x: i32,
    #[arg(allow_negative_numbers = true)]
    pub chunk_z: i32,
}

#[derive(Args)]
pub struct LegacyImportArgs {
    pub world: WorldId,
    /// Chunk coordinates as `x,z`
    #[arg(required = true, allow_hyphen_values = true, value_parser = parse_coords)]
    pub chunks: Vec<(i32, i32)>,
}

fn parse_coords(s: &str) -> Result<(i32, i32), String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,z but got {s:?}"))?;
    let x = x.trim().parse().map_err(|e| format!("bad chunk x {x:?}: {e}"))?;
    let z = z.trim().parse().map_err(|e| format!("bad chunk z {z:?}: {e}"))?;
    Ok((x, z))
}
