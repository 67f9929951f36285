//! Bucket and storage packing for solidify.
//!
//! Turns encoded [`Field`](solidify_types::Field)s into DEFLATE-compressed
//! buckets and groups the buckets into storages, each of which becomes one
//! read-only storage contract.
//!
//! # Architecture
//!
//! - **IndexedBucket**: variable-length fields behind a `u16` offset header
//! - **LabelledBucket**: fixed-length fields, each prefixed by a `u16` label
//! - **BucketStorage**: a named, ordered list of buckets
//! - **packer**: greedy, deterministic fields→buckets and buckets→storages passes
//! - **deflate**: raw DEFLATE at maximum compression
//! - **StorageManifest**: serializable summary consumed by artifact generators
//! - **StorageMapping**: where each group of fields landed, for groups packed
//!   back to back

pub mod bucket;
pub mod config;
pub mod deflate;
pub mod error;
pub mod indexed;
pub mod labelled;
pub mod manifest;
pub mod mapping;
pub mod packer;
pub mod storage;

pub use bucket::{AnyBucket, Bucket};
pub use config::{PackConfig, PackOverrides};
pub use deflate::{deflate, deflate_verified, inflate, Compressed};
pub use error::{PackError, PackResult};
pub use indexed::IndexedBucket;
pub use labelled::LabelledBucket;
pub use manifest::{write_manifests, BucketManifest, StorageManifest};
pub use mapping::{sequential_mapping, FieldSpan, GroupMapping, StorageMapping};
pub use packer::{
    group_into_bucket_per_group, group_into_indexed_buckets, group_into_labelled_buckets,
    group_into_storages, StorageBounds,
};
pub use storage::BucketStorage;
