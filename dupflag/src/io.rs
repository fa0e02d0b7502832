use std::{
    fs::File,
    io::{BufWriter, Read},
    path::Path,
};

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy)]
enum Compression {
    Gzip,
    Zstd,
}

/// Open an input file, possibly compressed. Supports gzip and zstd.
pub fn open_file_for_read<P: AsRef<Path>>(file: P) -> Result<Box<dyn Read>> {
    let path = file.as_ref();
    let open = || File::open(path).with_context(|| format!("cannot open file: {}", path.display()));
    let reader: Box<dyn Read> = match detect_compression(path)? {
        Some(Compression::Gzip) => Box::new(flate2::read::MultiGzDecoder::new(open()?)),
        Some(Compression::Zstd) => Box::new(zstd::stream::read::Decoder::new(open()?)?),
        None => Box::new(open()?),
    };
    Ok(reader)
}

/// Determine the input compression. Gzip is detected from content, zstd from
/// the file extension.
fn detect_compression(path: &Path) -> Result<Option<Compression>> {
    let probe = File::open(path).with_context(|| format!("cannot open file: {}", path.display()))?;
    if flate2::read::MultiGzDecoder::new(probe).header().is_some() {
        Ok(Some(Compression::Gzip))
    } else if path.extension().is_some_and(|ext| ext == "zst") {
        Ok(Some(Compression::Zstd))
    } else {
        Ok(None)
    }
}

/// Create a buffered plain-text output file.
pub fn create_file<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("cannot create file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}
