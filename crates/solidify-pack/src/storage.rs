use crate::bucket::{AnyBucket, Bucket};
use crate::error::PackResult;
use crate::labelled::LabelledBucket;

/// A named list of buckets that is deployed as a single storage contract.
#[derive(Clone, Debug)]
pub struct BucketStorage<B> {
    name: String,
    buckets: Vec<B>,
}

impl<B: Bucket> BucketStorage<B> {
    /// Create an empty storage with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buckets: Vec::new(),
        }
    }

    pub(crate) fn with_buckets(name: String, buckets: Vec<B>) -> Self {
        Self { name, buckets }
    }

    /// Append a bucket to the storage.
    pub fn add_bucket(&mut self, bucket: B) {
        self.buckets.push(bucket);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buckets(&self) -> &[B] {
        &self.buckets
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of fields across all buckets.
    pub fn num_fields(&self) -> usize {
        self.buckets.iter().map(Bucket::num_fields).sum()
    }

    /// Field count of every bucket, in order.
    pub fn num_fields_per_bucket(&self) -> Vec<usize> {
        self.buckets.iter().map(Bucket::num_fields).collect()
    }

    /// Total size of the compressed buckets in the storage.
    pub fn size(&self) -> PackResult<usize> {
        let mut total = 0;
        for bucket in &self.buckets {
            total += bucket.data()?.len();
        }
        Ok(total)
    }
}

impl BucketStorage<LabelledBucket> {
    /// Label of the last field in the last bucket; the upper bound of the
    /// labels this storage serves when labels are ascending.
    pub fn last_label(&self) -> Option<u16> {
        self.buckets.last().and_then(LabelledBucket::last_label)
    }
}

impl BucketStorage<AnyBucket> {
    /// Label of the last field in the last bucket, if that bucket is labelled.
    pub fn last_label(&self) -> Option<u16> {
        self.buckets
            .last()
            .and_then(AnyBucket::as_labelled)
            .and_then(LabelledBucket::last_label)
    }
}
