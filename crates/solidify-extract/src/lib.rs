//! Feature extraction for solidify.
//!
//! Turns collection metadata (a JSON array of `{type: value}` objects) into
//! enumerated feature groups and tokens. Tokens feed the Merkle commitment
//! and the labelled feature storages; the groups define what each code means.

pub mod error;
pub mod extract;
pub mod group;
pub mod manifest;

pub use error::{ExtractError, ExtractResult};
pub use extract::{
    encode_features, extract_feature_groups, load_features_json, parse_features_json,
    tokens_from_features, FeaturesMap,
};
pub use group::{FeatureGroup, DEFAULT_ZERO_VALUE, MAX_GROUP_VALUES};
pub use manifest::write_features_json;
