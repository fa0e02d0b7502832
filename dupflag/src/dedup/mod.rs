// Illumina duplicates come in two flavours. PCR duplicates are amplification
// artifacts: reads from distinct clusters that share a start coordinate
// because they derive from the same template molecule. Optical duplicates are
// sensor artifacts: one physical cluster read out as several adjacent spots
// on the flow cell. Reads that agree on start, tile, cigar and reference are
// candidates; a bin whose reads all carry one sample needs no spatial
// evidence, while a mixed bin is settled by comparing cluster coordinates.

mod spatial;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use itertools::Itertools;
use smallvec::SmallVec;

use crate::record::AlignmentRecord;

/// Default per-axis surface distance (inclusive) below which two reads are
/// treated as the same physical cluster.
pub const DEFAULT_PIXEL_DISTANCE: u32 = 100;

/// Options for one classification pass.
#[derive(Debug, Clone)]
pub struct ClassifyOpts {
    pub pixel_distance: u32,
}

impl Default for ClassifyOpts {
    fn default() -> Self {
        Self {
            pixel_distance: DEFAULT_PIXEL_DISTANCE,
        }
    }
}

/// Grouping key for duplicate candidates. Two reads fall in the same bin iff
/// they agree exactly on reference, start, tile and cigar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub reference: String,
    pub start: u64,
    pub tile: String,
    pub cigar: String,
}

impl Signature {
    fn of(rec: &AlignmentRecord) -> Self {
        Self {
            reference: rec.reference.clone(),
            start: rec.start,
            tile: rec.tile.clone(),
            cigar: rec.cigar.clone(),
        }
    }

    /// The combined tile+cigar component used as a row key in reports.
    pub fn tile_cigar(&self) -> String {
        format!("{}_{}", self.tile, self.cigar)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadClass {
    Unique,
    Pcr,
    /// Same-sample copy behind a retained PCR representative; counted in the
    /// tallies but never emitted in a listing.
    PcrCopy,
    Optical,
    /// Left over from an odd-sized spatial scan; surfaced, never dropped.
    Unresolved,
}

/// Per-bin sample tally, the stable tabular interface handed to reporting.
#[derive(Debug, Clone)]
pub struct GroupCount {
    pub signature: Signature,
    pub by_sample: BTreeMap<String, u64>,
}

/// The final partition of one input. The three listing sets are disjoint and
/// hold records in original input order; suppressed copies and unresolved
/// records are carried separately so that every syntactically valid record
/// is accounted for exactly once.
#[derive(Debug)]
pub struct ClassificationResult {
    pub non_duplicates: Vec<AlignmentRecord>,
    pub pcr_duplicates: Vec<AlignmentRecord>,
    pub optical_duplicates: Vec<AlignmentRecord>,
    pub unresolved: Vec<AlignmentRecord>,
    /// Same-sample copies dropped behind their bin's representative.
    pub suppressed: u64,
    pub group_counts: Vec<GroupCount>,
}

/// Terminal outcome of one classification pass. Both variants are normal
/// terminations; an input without duplicates is not an error.
#[derive(Debug)]
pub enum ClassifyOutcome {
    /// Every start coordinate occurred exactly once.
    NoDuplicates {
        non_duplicates: Vec<AlignmentRecord>,
    },
    Classified(ClassificationResult),
}

/// Partition `records` into unique reads, PCR duplicates and optical
/// duplicates. Consumes the whole input: the start-coordinate multiplicity
/// and the bin membership must be known globally before any per-read
/// decision is final.
pub fn classify(records: Vec<AlignmentRecord>, opts: &ClassifyOpts) -> ClassifyOutcome {
    // Multiplicity is keyed on the start coordinate alone; reads on
    // different references sharing a start are still candidates and are
    // separated afterwards by the signature bins.
    let multiplicity = records.iter().map(|rec| rec.start).counts();

    if multiplicity.values().all(|&n| n == 1) {
        return ClassifyOutcome::NoDuplicates {
            non_duplicates: records,
        };
    }

    // Records are visited in input order, so each bin holds its members in
    // input order and the first member is the "first occurrence".
    let mut classes = vec![ReadClass::Unique; records.len()];
    let mut bins: IndexMap<Signature, Vec<usize>> = IndexMap::new();
    for (idx, rec) in records.iter().enumerate() {
        if multiplicity[&rec.start] > 1 {
            bins.entry(Signature::of(rec)).or_default().push(idx);
        }
    }

    let group_counts = bins
        .iter()
        .map(|(signature, members)| {
            let mut by_sample: BTreeMap<String, u64> = BTreeMap::new();
            for &idx in members {
                *by_sample.entry(records[idx].sample_id.clone()).or_insert(0) += 1;
            }
            GroupCount {
                signature: signature.clone(),
                by_sample,
            }
        })
        .collect();

    let mut suppressed = 0u64;
    for members in bins.values() {
        let mut samples: SmallVec<[&str; 4]> = SmallVec::new();
        for &idx in members {
            let sample = records[idx].sample_id.as_str();
            if !samples.contains(&sample) {
                samples.push(sample);
            }
        }
        if samples.len() == 1 {
            // Pure PCR duplicates: retain the first occurrence, drop the rest.
            classes[members[0]] = ReadClass::Pcr;
            for &idx in &members[1..] {
                classes[idx] = ReadClass::PcrCopy;
                suppressed += 1;
            }
        } else {
            spatial::resolve_bin(&records, members, opts.pixel_distance, &mut classes);
        }
    }

    let mut result = ClassificationResult {
        non_duplicates: Vec::new(),
        pcr_duplicates: Vec::new(),
        optical_duplicates: Vec::new(),
        unresolved: Vec::new(),
        suppressed,
        group_counts,
    };
    for (rec, class) in records.into_iter().zip(classes) {
        match class {
            ReadClass::Unique => result.non_duplicates.push(rec),
            ReadClass::Pcr => result.pcr_duplicates.push(rec),
            ReadClass::PcrCopy => {}
            ReadClass::Optical => result.optical_duplicates.push(rec),
            ReadClass::Unresolved => result.unresolved.push(rec),
        }
    }
    ClassifyOutcome::Classified(result)
}
