//! Opening trace inputs.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Open a trace for line reading.
///
/// `-` reads standard input; a `.zst` extension is decompressed on the fly.
///
/// # Errors
///
/// Returns errors from opening the file or initializing the decoder.
pub fn open_trace(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(std::io::stdin().lock()));
    }

    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "zst") {
        let decoder = zstd::stream::read::Decoder::new(file)?;
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
