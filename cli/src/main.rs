use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use dupflag::{run, RunOpts, RunStatus};

/// Partition a position-sorted alignment stream into nonduplicated reads,
/// PCR duplicates and optical duplicates.
#[derive(Parser, Debug)]
#[command(name = "dupflag", version, about)]
struct Args {
    /// Position-sorted SAM input (plain, gzip or zstd).
    input: PathBuf,

    /// Maximum per-axis surface distance (inclusive) at which two reads
    /// count as one physical cluster.
    #[arg(long, default_value_t = dupflag::dedup::DEFAULT_PIXEL_DISTANCE)]
    pixel_distance: u32,

    /// Directory receiving the report files.
    #[arg(long, default_value = ".")]
    outdir: PathBuf,
}

/// Exit status signalling that the input contained no duplicate candidates.
const NO_DUPLICATES_EXIT: u8 = 2;

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let opts = RunOpts {
        input: args.input,
        outdir: args.outdir,
        pixel_distance: args.pixel_distance,
    };
    match run(&opts)? {
        RunStatus::Classified(_) => Ok(ExitCode::SUCCESS),
        RunStatus::NoDuplicates => Ok(ExitCode::from(NO_DUPLICATES_EXIT)),
    }
}
