use crate::error::PackResult;
use crate::indexed::IndexedBucket;
use crate::labelled::LabelledBucket;

/// A group of fields sharing one compressed payload, together with the
/// metadata needed to locate each field in it.
pub trait Bucket {
    /// The encoded and compressed data blob of the bucket.
    fn data(&self) -> PackResult<Vec<u8>>;

    /// Size of the encoded data before compression, index/labels included.
    fn uncompressed_size(&self) -> usize;

    fn num_fields(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.num_fields() == 0
    }
}

/// Either bucket variant, for storages mixing access schemes.
#[derive(Clone, Debug)]
pub enum AnyBucket {
    Indexed(IndexedBucket),
    Labelled(LabelledBucket),
}

impl AnyBucket {
    pub fn as_labelled(&self) -> Option<&LabelledBucket> {
        match self {
            Self::Labelled(b) => Some(b),
            Self::Indexed(_) => None,
        }
    }

    pub fn as_indexed(&self) -> Option<&IndexedBucket> {
        match self {
            Self::Indexed(b) => Some(b),
            Self::Labelled(_) => None,
        }
    }
}

impl Bucket for AnyBucket {
    fn data(&self) -> PackResult<Vec<u8>> {
        match self {
            Self::Indexed(b) => b.data(),
            Self::Labelled(b) => b.data(),
        }
    }

    fn uncompressed_size(&self) -> usize {
        match self {
            Self::Indexed(b) => b.uncompressed_size(),
            Self::Labelled(b) => b.uncompressed_size(),
        }
    }

    fn num_fields(&self) -> usize {
        match self {
            Self::Indexed(b) => b.num_fields(),
            Self::Labelled(b) => b.num_fields(),
        }
    }
}

impl From<IndexedBucket> for AnyBucket {
    fn from(b: IndexedBucket) -> Self {
        Self::Indexed(b)
    }
}

impl From<LabelledBucket> for AnyBucket {
    fn from(b: LabelledBucket) -> Self {
        Self::Labelled(b)
    }
}
