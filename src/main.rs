use anyhow::{Context, Result, ensure};
use clap::Parser;
use pim_bfs::config::{Algorithm, DEFAULT_HEAP_BYTES, RunConfig, UNIT_GRANULE};
use pim_bfs::data::layout::DEFAULT_BLOCK_WORDS;
use pim_bfs::io::{LevelWriter, read_graph_file};
use pim_bfs::partitioning::Topology;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pim-bfs", version)]
/// Breadth-first search from node 0 over a graph partitioned across a fleet
/// of independent compute units.
struct Cli {
    /// Adjacency-list file: a `NUM_NODES NUM_EDGES` header, then one
    /// `ROW COL` pair per line.
    input: PathBuf,

    #[arg(short = 'n', long, default_value_t = UNIT_GRANULE, value_parser = unit_count_parser)]
    /// Number of compute units (a positive multiple of 8).
    units: u32,

    #[arg(short, long, default_value_t = Algorithm::TopDown)]
    /// Frontier expansion: top | bot | edge.
    algorithm: Algorithm,

    #[arg(short, long)]
    /// Partitioning: row | col | 2d. Defaults to row for top, col for bot
    /// and 2d for edge.
    partitioning: Option<Topology>,

    #[arg(short, long)]
    /// Write the `node<TAB>level` table here.
    output: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_BLOCK_WORDS)]
    /// Buffer lengths are rounded up to this many words.
    block_words: u32,

    #[arg(long, default_value_t = DEFAULT_HEAP_BYTES)]
    /// Heap bytes per unit.
    heap_bytes: u32,

    #[arg(long, default_value = "bin")]
    /// Directory holding the unit programs.
    program_dir: PathBuf,
}

/// Parses a unit count, rejecting anything but positive multiples of 8.
fn unit_count_parser(arg: &str) -> Result<u32> {
    let units = arg.parse::<u32>()?;
    ensure!(
        units > 0 && units % UNIT_GRANULE == 0,
        "the number of units must be a positive multiple of {UNIT_GRANULE}"
    );
    Ok(units)
}

pub fn init_envlogger() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init()?;
    Ok(())
}

pub fn main() -> Result<()> {
    init_envlogger()?;
    let cli = Cli::parse();
    let cfg = RunConfig {
        units: cli.units,
        algorithm: cli.algorithm,
        topology: cli.partitioning,
        block_words: cli.block_words,
        heap_bytes: cli.heap_bytes,
        program_dir: cli.program_dir,
    };
    cfg.validate()?;

    let graph = read_graph_file(&cli.input)
        .with_context(|| format!("Could not load {}", cli.input.display()))?;
    let report = pim_bfs::algs::run_simulated(graph, &cfg)?;
    log::info!(
        "{} nodes reached, deepest level {}",
        report.levels.reached().count(),
        report.levels.max_level()
    );

    if let Some(path) = &cli.output {
        let mut out = LevelWriter::create(path)
            .with_context(|| format!("Could not create {}", path.display()))?;
        out.write(&report.levels)?;
        out.finish()?.flush()?;
        log::info!("levels written to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn unit_counts_must_be_positive_multiples_of_eight() {
        assert_eq!(unit_count_parser("8").unwrap(), 8);
        assert_eq!(unit_count_parser("64").unwrap(), 64);
        for bad in ["0", "12", "-8", "eight", ""] {
            assert!(unit_count_parser(bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn cli_parses_and_rejects_unit_counts() {
        Cli::command().debug_assert();
        let cli = Cli::try_parse_from(["pim-bfs", "g.txt", "-n", "16", "-a", "edge", "-p", "row"])
            .unwrap();
        assert_eq!(cli.units, 16);
        assert_eq!(cli.algorithm, Algorithm::EdgeCentric);
        assert_eq!(cli.partitioning, Some(Topology::Row));
        assert!(Cli::try_parse_from(["pim-bfs", "g.txt", "-n", "12"]).is_err());
    }
}
