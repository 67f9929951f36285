//! Raw DEFLATE (RFC 1951) compression at maximum ratio.
//!
//! Streams carry no zlib/gzip framing: the on-chain inflater consumes bare
//! DEFLATE blocks and is told the uncompressed size out of band.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::error::{PackError, PackResult};

/// Deflated data together with the size of the blob before compression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Compressed {
    pub data: Vec<u8>,
    pub uncompressed_size: usize,
}

/// Deflate a blob of data.
pub fn deflate(data: &[u8]) -> PackResult<Compressed> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(data)
        .map_err(|e| PackError::CompressionFailed(e.to_string()))?;
    let out = encoder
        .finish()
        .map_err(|e| PackError::CompressionFailed(e.to_string()))?;

    Ok(Compressed {
        data: out,
        uncompressed_size: data.len(),
    })
}

/// Inflate a raw DEFLATE stream.
pub fn inflate(data: &[u8]) -> PackResult<Vec<u8>> {
    let mut out = Vec::new();
    DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| PackError::DecompressionFailed(e.to_string()))?;
    Ok(out)
}

/// Deflate and check that the result inflates back to the input.
pub fn deflate_verified(data: &[u8]) -> PackResult<Compressed> {
    let compressed = deflate(data)?;
    let restored = inflate(&compressed.data)?;
    if restored != data {
        return Err(PackError::RoundTripMismatch {
            original: data.len(),
            restored: restored.len(),
        });
    }
    Ok(compressed)
}
