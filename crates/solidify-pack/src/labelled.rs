use solidify_types::LabelledField;

use crate::bucket::Bucket;
use crate::deflate::deflate;
use crate::error::{PackError, PackResult};

/// Bucket of equally sized fields, each prefixed with its big-endian `u16`
/// label so the contract can search for a field by label.
///
/// ```text
/// | label 0 (2 bytes) | blob 0 (N bytes) | label 1 (2 bytes) | blob 1 (N bytes) | ...
/// ```
#[derive(Clone, Debug, Default)]
pub struct LabelledBucket {
    raw: Vec<u8>,
    labels: Vec<u16>,
    field_size: Option<usize>,
}

impl LabelledBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `field` and append it under its label.
    ///
    /// The first field fixes the blob size `N`; any later field of a different
    /// encoded length is rejected and leaves the bucket untouched.
    pub fn add_field<F: LabelledField + ?Sized>(&mut self, field: &F) -> PackResult<()> {
        let encoded = field.encode().map_err(|source| PackError::Encoding {
            index: self.labels.len(),
            source,
        })?;

        match self.field_size {
            Some(want) if want != encoded.len() => {
                return Err(PackError::FieldSizeMismatch {
                    got: encoded.len(),
                    want,
                });
            }
            Some(_) => {}
            None => self.field_size = Some(encoded.len()),
        }

        let label = field.label();
        self.labels.push(label);
        self.raw.extend_from_slice(&label.to_be_bytes());
        self.raw.extend_from_slice(&encoded);
        Ok(())
    }

    /// Labels of all fields, in insertion order.
    pub fn labels(&self) -> Vec<u16> {
        self.labels.clone()
    }

    /// Label of the most recently added field.
    pub fn last_label(&self) -> Option<u16> {
        self.labels.last().copied()
    }

    /// The fixed blob size `N`, once a field has been added.
    pub fn field_size(&self) -> Option<usize> {
        self.field_size
    }

    /// The label/blob stream, uncompressed.
    pub fn raw_data(&self) -> &[u8] {
        &self.raw
    }
}

impl Bucket for LabelledBucket {
    fn data(&self) -> PackResult<Vec<u8>> {
        Ok(deflate(&self.raw)?.data)
    }

    fn uncompressed_size(&self) -> usize {
        self.raw.len()
    }

    fn num_fields(&self) -> usize {
        self.labels.len()
    }
}
