use solidify_types::Field;

use crate::bucket::Bucket;
use crate::deflate::deflate;
use crate::error::{PackError, PackResult};

/// Bucket of variable-length fields, accessed through an offset header.
///
/// The offset of the start of each field in the blob is stored as a
/// big-endian `u16` in the index header, in field order. Offsets are absolute,
/// i.e. they count the header itself.
///
/// ```text
/// | offset 0 (2 bytes) | ... | offset n-1 | blob 0 | ... | blob n-1 |
///                                         ^ offset 0 = 2n
/// ```
#[derive(Clone, Debug, Default)]
pub struct IndexedBucket {
    payload: Vec<u8>,
    field_sizes: Vec<usize>,
}

impl IndexedBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `field` and append it. No size bound is enforced here.
    pub fn add_field<F: Field + ?Sized>(&mut self, field: &F) -> PackResult<()> {
        let encoded = field.encode().map_err(|source| PackError::Encoding {
            index: self.field_sizes.len(),
            source,
        })?;

        self.field_sizes.push(encoded.len());
        self.payload.extend_from_slice(&encoded);
        Ok(())
    }

    /// Encoded length of every field, in insertion order.
    pub fn field_sizes(&self) -> &[usize] {
        &self.field_sizes
    }

    /// Offset header followed by the concatenated field blobs, uncompressed.
    pub fn raw_data(&self) -> PackResult<Vec<u8>> {
        let header_len = self.field_sizes.len() * 2;
        let mut buf = Vec::with_capacity(header_len + self.payload.len());

        let mut offset = header_len;
        for size in &self.field_sizes {
            let encoded =
                u16::try_from(offset).map_err(|_| PackError::IndexOverflow { offset })?;
            buf.extend_from_slice(&encoded.to_be_bytes());
            offset += size;
        }

        buf.extend_from_slice(&self.payload);
        Ok(buf)
    }
}

impl Bucket for IndexedBucket {
    fn data(&self) -> PackResult<Vec<u8>> {
        Ok(deflate(&self.raw_data()?)?.data)
    }

    fn uncompressed_size(&self) -> usize {
        self.payload.len() + self.field_sizes.len() * 2
    }

    fn num_fields(&self) -> usize {
        self.field_sizes.len()
    }
}
