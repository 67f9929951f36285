use serde::{Deserialize, Serialize};

use crate::packer::StorageBounds;

/// Bounds for one packing run: fields into buckets, buckets into storages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Uncompressed size at which a bucket is closed.
    pub max_bucket_size: usize,
    /// Compressed size at which a storage is closed. `None` disables the limit.
    pub max_storage_size: Option<usize>,
    /// Bucket count at which a storage is closed. `None` disables the limit.
    pub max_buckets_per_storage: Option<usize>,
    /// Prefix of the generated storage names.
    pub base_name: String,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            max_bucket_size: 4000,
            max_storage_size: Some(18000),
            max_buckets_per_storage: Some(100),
            base_name: "Layer".into(),
        }
    }
}

impl PackConfig {
    /// Defaults for labelled token features: 7 features per token, 200 tokens
    /// per bucket, storages bounded by size only.
    pub fn features() -> Self {
        Self {
            max_bucket_size: 7 * 200,
            max_storage_size: Some(20000),
            max_buckets_per_storage: None,
            base_name: "Features".into(),
        }
    }

    /// Defaults for trait value strings: every trait type gets its own
    /// bucket, all in one unbounded storage. `max_bucket_size` only flags
    /// oversized trait buckets.
    pub fn traits() -> Self {
        Self {
            max_bucket_size: 4000,
            max_storage_size: None,
            max_buckets_per_storage: None,
            base_name: "Trait".into(),
        }
    }

    pub fn storage_bounds(&self) -> StorageBounds {
        StorageBounds::new(self.max_storage_size, self.max_buckets_per_storage)
    }
}

/// Partial settings layered over a preset [`PackConfig`].
///
/// Unset fields keep the preset's value. Storage limits are signed: a
/// negative value disables the limit, which a TOML file cannot otherwise
/// express.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackOverrides {
    pub max_bucket_size: Option<usize>,
    pub max_storage_size: Option<i64>,
    pub max_buckets_per_storage: Option<i64>,
    pub base_name: Option<String>,
}

impl PackOverrides {
    pub fn apply(&self, config: &mut PackConfig) {
        if let Some(size) = self.max_bucket_size {
            config.max_bucket_size = size;
        }
        if let Some(size) = self.max_storage_size {
            config.max_storage_size = usize::try_from(size).ok();
        }
        if let Some(count) = self.max_buckets_per_storage {
            config.max_buckets_per_storage = usize::try_from(count).ok();
        }
        if let Some(name) = &self.base_name {
            config.base_name = name.clone();
        }
    }

    /// `preset` with these overrides applied.
    pub fn over(&self, mut preset: PackConfig) -> PackConfig {
        self.apply(&mut preset);
        preset
    }
}
