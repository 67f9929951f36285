//! Greedy, order-preserving bin packing of fields into buckets and of buckets
//! into storages.
//!
//! Both passes walk their input once, in order, and close the current group
//! right after the element that pushed it over its bound. The result is fully
//! determined by the input order and the bounds; downstream artifacts (storage
//! mappings, proof indices) rely on that.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use solidify_types::{Field, LabelledField};

use crate::bucket::Bucket;
use crate::error::{PackError, PackResult};
use crate::indexed::IndexedBucket;
use crate::labelled::LabelledBucket;
use crate::storage::BucketStorage;

/// Limits that close a storage during [`group_into_storages`]. `None`
/// disables a limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBounds {
    /// Maximum total compressed size; a storage is closed once it exceeds it.
    pub max_size: Option<usize>,
    /// Number of buckets at which a storage is closed.
    pub max_buckets: Option<usize>,
}

impl StorageBounds {
    pub fn new(max_size: Option<usize>, max_buckets: Option<usize>) -> Self {
        Self {
            max_size,
            max_buckets,
        }
    }

    /// Bounds from signed limits, where a negative value disables the limit.
    pub fn from_signed(max_size: i64, max_buckets: i64) -> Self {
        Self {
            max_size: usize::try_from(max_size).ok(),
            max_buckets: usize::try_from(max_buckets).ok(),
        }
    }

    fn reached(&self, size: usize, num_buckets: usize) -> bool {
        self.max_size.is_some_and(|max| size > max)
            || self.max_buckets.is_some_and(|max| num_buckets >= max)
    }
}

/// Group fields into [`IndexedBucket`]s, closing a bucket as soon as its
/// uncompressed size exceeds `max_bucket_size`.
///
/// A field that alone exceeds the bound ends up in its own oversized bucket.
pub fn group_into_indexed_buckets<F: Field>(
    fields: &[F],
    max_bucket_size: usize,
) -> PackResult<Vec<IndexedBucket>> {
    let mut buckets = Vec::new();
    let mut current = IndexedBucket::new();

    for (index, field) in fields.iter().enumerate() {
        current
            .add_field(field)
            .map_err(|e| with_field_index(e, index))?;

        if current.uncompressed_size() > max_bucket_size {
            tracing::debug!(
                bucket = buckets.len(),
                fields = current.num_fields(),
                size = current.uncompressed_size(),
                "closed indexed bucket"
            );
            buckets.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        buckets.push(current);
    }

    Ok(buckets)
}

/// Group labelled fields into [`LabelledBucket`]s, closing a bucket as soon
/// as its uncompressed size exceeds `max_bucket_size`.
///
/// Fails on the first field whose encoded size differs from the first field
/// of its bucket.
pub fn group_into_labelled_buckets<F: LabelledField>(
    fields: &[F],
    max_bucket_size: usize,
) -> PackResult<Vec<LabelledBucket>> {
    let mut buckets = Vec::new();
    let mut current = LabelledBucket::new();

    for (index, field) in fields.iter().enumerate() {
        current
            .add_field(field)
            .map_err(|e| with_field_index(e, index))?;

        if current.uncompressed_size() > max_bucket_size {
            tracing::debug!(
                bucket = buckets.len(),
                fields = current.num_fields(),
                last_label = ?current.last_label(),
                "closed labelled bucket"
            );
            buckets.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        buckets.push(current);
    }

    Ok(buckets)
}

/// One [`IndexedBucket`] per group, holding the group's fields in order.
///
/// Groups are neither split nor merged, so bucket `i` belongs to group `i`
/// whatever its size and an empty group yields an empty bucket. Encoding
/// errors carry the field's position across all groups.
pub fn group_into_bucket_per_group<F: Field, G: AsRef<[F]>>(
    groups: &[G],
) -> PackResult<Vec<IndexedBucket>> {
    let mut index = 0;
    let mut buckets = Vec::with_capacity(groups.len());

    for group in groups {
        let mut bucket = IndexedBucket::new();
        for field in group.as_ref() {
            bucket
                .add_field(field)
                .map_err(|e| with_field_index(e, index))?;
            index += 1;
        }
        tracing::debug!(
            bucket = buckets.len(),
            fields = bucket.num_fields(),
            size = bucket.uncompressed_size(),
            "closed group bucket"
        );
        buckets.push(bucket);
    }

    Ok(buckets)
}

/// Group buckets into storages named `{base_name}BucketStorage{n}`.
///
/// After each bucket is added, the storage is closed if its total compressed
/// size exceeds `bounds.max_size` or its bucket count reaches
/// `bounds.max_buckets`. Compressed sizes are computed up front in parallel.
pub fn group_into_storages<B: Bucket + Sync>(
    buckets: Vec<B>,
    bounds: StorageBounds,
    base_name: &str,
) -> PackResult<Vec<BucketStorage<B>>> {
    let sizes = buckets
        .par_iter()
        .map(|b| b.data().map(|d| d.len()))
        .collect::<PackResult<Vec<_>>>()?;

    let mut stores = Vec::new();
    let mut current = Vec::new();
    let mut current_size = 0;

    for (bucket, size) in buckets.into_iter().zip(sizes) {
        current.push(bucket);
        current_size += size;

        if bounds.reached(current_size, current.len()) {
            push_storage(&mut stores, std::mem::take(&mut current), base_name, current_size);
            current_size = 0;
        }
    }

    if !current.is_empty() {
        push_storage(&mut stores, current, base_name, current_size);
    }

    tracing::info!(base_name, storages = stores.len(), "grouped buckets into storages");
    Ok(stores)
}

fn push_storage<B: Bucket>(
    stores: &mut Vec<BucketStorage<B>>,
    buckets: Vec<B>,
    base_name: &str,
    size: usize,
) {
    let name = format!("{base_name}BucketStorage{}", stores.len());
    tracing::debug!(storage = %name, buckets = buckets.len(), size, "closed storage");
    stores.push(BucketStorage::with_buckets(name, buckets));
}

fn with_field_index(err: PackError, index: usize) -> PackError {
    match err {
        PackError::Encoding { source, .. } => PackError::Encoding { index, source },
        other => other,
    }
}
