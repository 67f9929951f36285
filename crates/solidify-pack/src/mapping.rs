//! Locating groups of fields inside packed storages.
//!
//! Groups are laid out back to back over the buckets of a storage run, in
//! storage, bucket and field order. A group may start in the middle of a
//! bucket and spill over into the next buckets or storages:
//!
//! ```text
//! storage 0: | bucket 0: A A | bucket 1: A B C |   storage 1: | bucket 0: C C C |
//! ```

use serde::{Deserialize, Serialize};
use solidify_types::FieldsGroup;

use crate::bucket::Bucket;
use crate::error::{PackError, PackResult};
use crate::storage::BucketStorage;

/// A run of consecutive fields of a group within one bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpan {
    /// Index of the storage in the run.
    pub storage: usize,
    /// Index of the bucket within its storage.
    pub bucket: usize,
    /// Index within the bucket of the span's first field.
    pub first_field: usize,
    pub num_fields: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMapping {
    pub name: String,
    pub num_fields: usize,
    /// Where the group's fields live, in field order.
    pub spans: Vec<FieldSpan>,
}

/// Storage names and the location of every group's fields in them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageMapping {
    pub storages: Vec<String>,
    pub groups: Vec<GroupMapping>,
}

impl StorageMapping {
    pub fn group(&self, name: &str) -> Option<&GroupMapping> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Write the mapping as pretty-printed JSON.
    pub fn write_json<W: std::io::Write>(&self, writer: W) -> PackResult<()> {
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| PackError::Serialization(e.to_string()))
    }
}

/// Map `groups`, in order, onto the fields stored in `storages`.
///
/// The groups must account for every stored field exactly.
pub fn sequential_mapping<G: FieldsGroup, B: Bucket>(
    groups: &[G],
    storages: &[BucketStorage<B>],
) -> PackResult<StorageMapping> {
    let wanted: usize = groups.iter().map(FieldsGroup::num_fields).sum();
    let stored: usize = storages.iter().map(BucketStorage::num_fields).sum();
    if wanted != stored {
        return Err(PackError::MappingMismatch {
            groups: wanted,
            stored,
        });
    }

    let mut slots = storages.iter().enumerate().flat_map(|(s, storage)| {
        storage
            .buckets()
            .iter()
            .enumerate()
            .map(move |(b, bucket)| (s, b, bucket.num_fields()))
    });
    let mut current = (0, 0, 0);
    let mut used = 0;

    let mut mapped = Vec::with_capacity(groups.len());
    for group in groups {
        let mut left = group.num_fields();
        let mut spans = Vec::new();

        while left > 0 {
            let (storage, bucket, size) = current;
            if used == size {
                current = slots.next().ok_or(PackError::MappingMismatch {
                    groups: wanted,
                    stored,
                })?;
                used = 0;
                continue;
            }

            let take = left.min(size - used);
            spans.push(FieldSpan {
                storage,
                bucket,
                first_field: used,
                num_fields: take,
            });
            used += take;
            left -= take;
        }

        mapped.push(GroupMapping {
            name: group.name().to_string(),
            num_fields: group.num_fields(),
            spans,
        });
    }

    tracing::debug!(groups = mapped.len(), fields = stored, "mapped groups onto storages");
    Ok(StorageMapping {
        storages: storages.iter().map(|s| s.name().to_string()).collect(),
        groups: mapped,
    })
}
