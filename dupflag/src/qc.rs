use std::fmt::Display;

use human_format::Formatter;
use log::{info, warn};

use crate::dedup::{ClassificationResult, ClassifyOutcome};

/// Counters describing one classification run.
#[derive(Debug, Default, Clone)]
pub struct RunStat {
    /// Syntactically valid records accepted by the scan.
    pub total: u64,
    /// Malformed data lines skipped during the scan.
    pub skipped: u64,
    pub non_duplicates: u64,
    /// Retained PCR representatives plus spatially resolved PCR reads.
    pub pcr_duplicates: u64,
    /// Same-sample copies suppressed behind a representative.
    pub pcr_copies: u64,
    pub optical_duplicates: u64,
    pub unresolved: u64,
}

impl RunStat {
    pub fn new(outcome: &ClassifyOutcome, skipped: u64) -> Self {
        let mut stat = match outcome {
            ClassifyOutcome::NoDuplicates { non_duplicates } => Self {
                non_duplicates: non_duplicates.len() as u64,
                ..Self::default()
            },
            ClassifyOutcome::Classified(result) => Self::from_result(result),
        };
        stat.total = stat.accounted();
        stat.skipped = skipped;
        stat
    }

    fn from_result(result: &ClassificationResult) -> Self {
        Self {
            non_duplicates: result.non_duplicates.len() as u64,
            pcr_duplicates: result.pcr_duplicates.len() as u64,
            pcr_copies: result.suppressed,
            optical_duplicates: result.optical_duplicates.len() as u64,
            unresolved: result.unresolved.len() as u64,
            ..Self::default()
        }
    }

    /// Each accepted record lands in exactly one of these counters.
    pub fn accounted(&self) -> u64 {
        self.non_duplicates
            + self.pcr_duplicates
            + self.pcr_copies
            + self.optical_duplicates
            + self.unresolved
    }

    pub fn log_summary(&self) {
        info!(
            "classified {} records: {} nonduplicated, {} PCR duplicates ({} copies suppressed), {} optical duplicates",
            Formatter::new().with_decimals(1).format(self.total as f64),
            self.non_duplicates,
            self.pcr_duplicates,
            self.pcr_copies,
            self.optical_duplicates,
        );
        if self.unresolved > 0 {
            warn!("{} reads left unresolved by the spatial scan", self.unresolved);
        }
        if self.skipped > 0 {
            warn!("{} malformed lines skipped", self.skipped);
        }
    }
}

impl Display for RunStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "records\t{}", self.total)?;
        writeln!(f, "skipped_lines\t{}", self.skipped)?;
        writeln!(f, "non_duplicates\t{}", self.non_duplicates)?;
        writeln!(f, "pcr_duplicates\t{}", self.pcr_duplicates)?;
        writeln!(f, "pcr_copies_suppressed\t{}", self.pcr_copies)?;
        writeln!(f, "optical_duplicates\t{}", self.optical_duplicates)?;
        writeln!(f, "unresolved\t{}", self.unresolved)?;
        Ok(())
    }
}
