//! Minimal extended-M3U line scanning.
//!
//! The playlist-creation endpoints answer with bare URI lines wrapped in the
//! usual `#EXT` headers. All that is ever needed from them is the first
//! payload line (a manifest URI) or every payload line in order (a
//! chunklist), so the scanner classifies lines one at a time and never
//! buffers the whole input.

use std::io::BufRead;

use crate::error::Error;

/// First non-blank, non-comment line of the input.
pub fn get_uri<R: BufRead>(input: R) -> Result<String, Error> {
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            return Ok(trimmed.to_owned());
        }
    }
    Err(Error::NoPlaylistUri)
}

/// Every non-blank, non-comment line in file order.
///
/// Chunk order is playback order. An empty result is an error, never a valid
/// chunklist; a silently empty list would mask upstream format drift.
pub fn get_chunklist<R: BufRead>(input: R) -> Result<Vec<String>, Error> {
    let mut chunks = Vec::new();
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            chunks.push(trimmed.to_owned());
        }
    }
    if chunks.is_empty() {
        return Err(Error::EmptyChunklist);
    }
    Ok(chunks)
}
