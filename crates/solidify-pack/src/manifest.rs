use serde::{Deserialize, Serialize};

use crate::bucket::Bucket;
use crate::error::{PackError, PackResult};
use crate::labelled::LabelledBucket;
use crate::storage::BucketStorage;

/// Summary of one compressed bucket as consumed by artifact generators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketManifest {
    pub num_fields: usize,
    pub uncompressed_size: usize,
    pub compressed_size: usize,
    /// `0x`-prefixed hex of the compressed bucket data.
    pub data: String,
}

/// Summary of one storage: its name, buckets and totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageManifest {
    pub name: String,
    pub num_fields: usize,
    pub total_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_label: Option<u16>,
    pub buckets: Vec<BucketManifest>,
}

impl StorageManifest {
    pub fn from_storage<B: Bucket>(storage: &BucketStorage<B>) -> PackResult<Self> {
        let mut buckets = Vec::with_capacity(storage.num_buckets());
        for bucket in storage.buckets() {
            let data = bucket.data()?;
            buckets.push(BucketManifest {
                num_fields: bucket.num_fields(),
                uncompressed_size: bucket.uncompressed_size(),
                compressed_size: data.len(),
                data: format!("0x{}", hex::encode(&data)),
            });
        }

        Ok(Self {
            name: storage.name().to_string(),
            num_fields: storage.num_fields(),
            total_size: buckets.iter().map(|b| b.compressed_size).sum(),
            last_label: None,
            buckets,
        })
    }

    /// Manifests for a run of storages, in order.
    pub fn from_storages<B: Bucket>(storages: &[BucketStorage<B>]) -> PackResult<Vec<Self>> {
        storages.iter().map(Self::from_storage).collect()
    }

    /// Manifests for labelled storages, recording each storage's last label.
    pub fn from_labelled_storages(
        storages: &[BucketStorage<LabelledBucket>],
    ) -> PackResult<Vec<Self>> {
        storages
            .iter()
            .map(|s| {
                let mut m = Self::from_storage(s)?;
                m.last_label = s.last_label();
                Ok(m)
            })
            .collect()
    }
}

/// Write manifests as pretty-printed JSON.
pub fn write_manifests<W: std::io::Write>(
    manifests: &[StorageManifest],
    writer: W,
) -> PackResult<()> {
    serde_json::to_writer_pretty(writer, manifests)
        .map_err(|e| PackError::Serialization(e.to_string()))
}
