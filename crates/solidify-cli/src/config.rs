use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use solidify_pack::{PackConfig, PackOverrides};

use crate::cli::{FeaturesArgs, TraitsArgs};

/// Contents of `solidify.toml`.
///
/// Each table is layered over its preset ([`PackConfig::features`],
/// [`PackConfig::traits`]), so a table only names what it changes. Negative
/// storage limits disable the limit.
///
/// ```toml
/// write_proofs = true
///
/// [features]
/// max_bucket_size = 1400
/// max_storage_size = 20000
///
/// [traits]
/// base_name = "Trait"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "ConfigFile")]
pub struct SolidifyConfig {
    pub features: PackConfig,
    pub traits: PackConfig,
    pub write_proofs: bool,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    features: PackOverrides,
    traits: PackOverrides,
    write_proofs: bool,
}

impl From<ConfigFile> for SolidifyConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            features: file.features.over(PackConfig::features()),
            traits: file.traits.over(PackConfig::traits()),
            write_proofs: file.write_proofs,
        }
    }
}

impl Default for SolidifyConfig {
    fn default() -> Self {
        ConfigFile::default().into()
    }
}

impl SolidifyConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config from `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn apply_features_args(&mut self, args: &FeaturesArgs) {
        PackOverrides {
            max_bucket_size: args.max_bucket_size,
            max_storage_size: args.max_storage_size,
            max_buckets_per_storage: args.max_buckets,
            base_name: args.base_name.clone(),
        }
        .apply(&mut self.features);
        self.write_proofs |= args.write_proofs;
    }

    pub fn apply_traits_args(&mut self, args: &TraitsArgs) {
        PackOverrides {
            max_bucket_size: None,
            max_storage_size: args.max_storage_size,
            max_buckets_per_storage: args.max_buckets,
            base_name: args.base_name.clone(),
        }
        .apply(&mut self.traits);
    }
}
