//! Classifies aligned reads that share a genomic start coordinate into
//! unique reads, PCR duplicates and optical duplicates.
//!
//! Input is a position-sorted, tab-delimited alignment stream. One run
//! materialises the whole input, partitions it, and writes the listing and
//! count-table reports; classification needs global knowledge of group
//! membership, so there is no streaming pipeline.

pub mod dedup;
pub mod io;
pub mod qc;
pub mod record;
pub mod report;

use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Result;
use human_format::Formatter;
use log::{info, warn};

use dedup::{classify, ClassifyOpts, ClassifyOutcome, DEFAULT_PIXEL_DISTANCE};
use qc::RunStat;
use record::ScannedInput;

/// Options for one classification run.
#[derive(Debug, Clone)]
pub struct RunOpts {
    pub input: PathBuf,
    /// Directory receiving the report files.
    pub outdir: PathBuf,
    /// Maximum per-axis surface distance (inclusive) at which two reads
    /// count as one physical cluster.
    pub pixel_distance: u32,
}

impl RunOpts {
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            outdir: PathBuf::from("."),
            pixel_distance: DEFAULT_PIXEL_DISTANCE,
        }
    }
}

/// How a run ended. Both variants are successful terminations.
#[derive(Debug)]
pub enum RunStatus {
    Classified(RunStat),
    /// No start coordinate occurred more than once; only the nonduplicates
    /// listing is produced and it equals the full input.
    NoDuplicates,
}

/// Scan the input, classify it, and write the reports into `opts.outdir`.
pub fn run(opts: &RunOpts) -> Result<RunStatus> {
    info!("reading {}", opts.input.display());
    let reader = BufReader::new(io::open_file_for_read(&opts.input)?);
    let ScannedInput {
        header,
        records,
        skipped,
    } = record::scan(reader)?;
    info!(
        "found {} records in {}",
        Formatter::new().with_decimals(1).format(records.len() as f64),
        opts.input.display()
    );

    let outcome = classify(
        records,
        &ClassifyOpts {
            pixel_distance: opts.pixel_distance,
        },
    );
    let stat = RunStat::new(&outcome, skipped);

    match outcome {
        ClassifyOutcome::NoDuplicates { non_duplicates } => {
            report::write_listing(
                io::create_file(opts.outdir.join(report::NON_DUPLICATES_FILE))?,
                &header,
                &non_duplicates,
            )?;
            warn!("no duplicated records found");
            Ok(RunStatus::NoDuplicates)
        }
        ClassifyOutcome::Classified(result) => {
            report::export(&opts.outdir, &header, &result)?;
            stat.log_summary();
            Ok(RunStatus::Classified(stat))
        }
    }
}
