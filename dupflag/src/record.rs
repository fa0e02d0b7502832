use std::io::BufRead;

use anyhow::Result;
use log::warn;
use thiserror::Error;

/// Whitespace-delimited fields consulted in a data line: the read name,
/// the reference (field 2), the start coordinate (field 3) and the cigar
/// string (field 5).
const MIN_FIELDS: usize = 6;

/// Colon-delimited read-name components consulted: the sample identifier
/// (component 0), the tile (4) and the surface coordinates (5, 6).
const MIN_NAME_PARTS: usize = 7;

/// Reasons a data line is rejected by the extractor.
#[derive(Debug, Error)]
pub enum MalformedRecord {
    #[error("expected at least 6 whitespace-delimited fields, found {0}")]
    TooFewFields(usize),
    #[error("read name has {0} colon-delimited components, expected at least 7")]
    TruncatedReadName(usize),
    #[error("invalid start coordinate '{0}'")]
    InvalidStart(String),
    #[error("invalid surface coordinate '{0}'")]
    InvalidCoordinate(String),
}

/// One parsed alignment line. Immutable once constructed; the original line
/// is retained verbatim so the listings can reproduce the input exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord {
    pub sample_id: String,
    pub tile: String,
    pub cigar: String,
    pub reference: String,
    pub start: u64,
    pub x: i64,
    pub y: i64,
    raw: String,
    serial: usize,
}

impl AlignmentRecord {
    /// Parse one data line. `serial` fixes the record's position in the
    /// original input order; it is the tie-breaker whenever "first
    /// occurrence" matters downstream.
    pub fn parse(line: &str, serial: usize) -> Result<Self, MalformedRecord> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(MalformedRecord::TooFewFields(fields.len()));
        }
        let name_parts: Vec<&str> = fields[0].split(':').collect();
        if name_parts.len() < MIN_NAME_PARTS {
            return Err(MalformedRecord::TruncatedReadName(name_parts.len()));
        }
        let start = lexical::parse(fields[3])
            .map_err(|_| MalformedRecord::InvalidStart(fields[3].to_string()))?;
        let x = lexical::parse(name_parts[5])
            .map_err(|_| MalformedRecord::InvalidCoordinate(name_parts[5].to_string()))?;
        let y = lexical::parse(name_parts[6])
            .map_err(|_| MalformedRecord::InvalidCoordinate(name_parts[6].to_string()))?;
        Ok(Self {
            sample_id: name_parts[0].to_string(),
            tile: name_parts[4].to_string(),
            cigar: fields[5].to_string(),
            reference: fields[2].to_string(),
            start,
            x,
            y,
            raw: line.to_string(),
            serial,
        })
    }

    /// The original input line, exactly as read.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn serial(&self) -> usize {
        self.serial
    }
}

/// The materialised content of one input stream: header lines and every
/// syntactically valid record, both in input order, plus the number of data
/// lines that were skipped.
#[derive(Debug, Default)]
pub struct ScannedInput {
    pub header: Vec<String>,
    pub records: Vec<AlignmentRecord>,
    pub skipped: u64,
}

/// Read an alignment stream to completion. Lines starting with `@` are
/// header metadata, kept aside for the nonduplicates listing. Malformed data
/// lines are skipped with a warning; they never terminate the scan.
pub fn scan<R: BufRead>(reader: R) -> Result<ScannedInput> {
    let mut header = Vec::new();
    let mut records: Vec<AlignmentRecord> = Vec::new();
    let mut skipped = 0u64;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with('@') {
            header.push(line);
            continue;
        }
        match AlignmentRecord::parse(&line, records.len()) {
            Ok(rec) => records.push(rec),
            Err(err) => {
                warn!("skipping malformed record at line {}: {}", lineno + 1, err);
                skipped += 1;
            }
        }
    }
    Ok(ScannedInput {
        header,
        records,
        skipped,
    })
}
