use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use itertools::Itertools;

use crate::dedup::{ClassificationResult, GroupCount};
use crate::io::create_file;
use crate::record::AlignmentRecord;

/// Standard report file names.
pub const NON_DUPLICATES_FILE: &str = "nonduplicates.txt";
pub const PCR_DUPLICATES_FILE: &str = "pcr_duplicates.txt";
pub const OPTICAL_DUPLICATES_FILE: &str = "optical_duplicates.txt";
pub const COUNT_TABLE_FILE: &str = "count_table.txt";

/// Write header lines followed by records, reproducing input lines verbatim.
pub fn write_listing<W: Write>(
    mut w: W,
    header: &[String],
    records: &[AlignmentRecord],
) -> Result<()> {
    for line in header {
        writeln!(w, "{line}")?;
    }
    for rec in records {
        writeln!(w, "{}", rec.raw())?;
    }
    w.flush()?;
    Ok(())
}

/// Write the cross-tabulation of per-sample record counts, CSV, keyed by
/// (reference, start, tile_cigar), with `All` margins on both axes.
pub fn write_count_table<W: Write>(mut w: W, groups: &[GroupCount]) -> Result<()> {
    let samples: Vec<&str> = groups
        .iter()
        .flat_map(|g| g.by_sample.keys().map(String::as_str))
        .sorted()
        .dedup()
        .collect();

    writeln!(
        w,
        "reference,start,tile_cigar,{},All",
        samples.iter().join(",")
    )?;

    let mut rows: Vec<&GroupCount> = groups.iter().collect();
    rows.sort_by(|a, b| {
        a.signature
            .reference
            .cmp(&b.signature.reference)
            .then_with(|| a.signature.start.cmp(&b.signature.start))
            .then_with(|| a.signature.tile_cigar().cmp(&b.signature.tile_cigar()))
    });

    let mut column_totals: BTreeMap<&str, u64> = BTreeMap::new();
    let mut grand_total = 0u64;
    for group in rows {
        write!(
            w,
            "{},{},{}",
            group.signature.reference,
            group.signature.start,
            group.signature.tile_cigar()
        )?;
        let mut row_total = 0u64;
        for sample in &samples {
            let n = group.by_sample.get(*sample).copied().unwrap_or(0);
            write!(w, ",{n}")?;
            *column_totals.entry(sample).or_insert(0) += n;
            row_total += n;
        }
        writeln!(w, ",{row_total}")?;
        grand_total += row_total;
    }

    write!(w, "All,,")?;
    for sample in &samples {
        write!(w, ",{}", column_totals.get(*sample).copied().unwrap_or(0))?;
    }
    writeln!(w, ",{grand_total}")?;
    w.flush()?;
    Ok(())
}

/// Write the standard report set into `dir`: the three listings and the
/// per-sample count table.
pub fn export<P: AsRef<Path>>(
    dir: P,
    header: &[String],
    result: &ClassificationResult,
) -> Result<()> {
    let dir = dir.as_ref();
    write_listing(
        create_file(dir.join(NON_DUPLICATES_FILE))?,
        header,
        &result.non_duplicates,
    )?;
    write_listing(
        create_file(dir.join(PCR_DUPLICATES_FILE))?,
        &[],
        &result.pcr_duplicates,
    )?;
    write_listing(
        create_file(dir.join(OPTICAL_DUPLICATES_FILE))?,
        &[],
        &result.optical_duplicates,
    )?;
    write_count_table(
        create_file(dir.join(COUNT_TABLE_FILE))?,
        &result.group_counts,
    )?;
    Ok(())
}
