use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use solidify_crypto::{verify_proof, MerkleTree};
use solidify_extract::{
    encode_features, extract_feature_groups, load_features_json, tokens_from_features,
    write_features_json, FeatureGroup,
};
use solidify_pack::{
    group_into_bucket_per_group, group_into_labelled_buckets, group_into_storages,
    sequential_mapping, write_manifests, Bucket, PackConfig, StorageManifest, StorageMapping,
};
use solidify_types::{Hash256, StringField};

use crate::cli::*;
use crate::config::SolidifyConfig;

pub const STORAGES_FILE: &str = "storages.json";
pub const FEATURES_FILE: &str = "features.json";
pub const PROOFS_FILE: &str = "proofs.json";
pub const TRAIT_STORAGES_FILE: &str = "trait-storages.json";
pub const TRAIT_MAPPING_FILE: &str = "trait-mapping.json";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Features(args) => {
            let mut config = SolidifyConfig::load_or_default(cli.config.as_deref())?;
            config.apply_features_args(&args);
            let report = cmd_features(&args.input, &args.out_dir, &config)?;
            print_report(&report);
            Ok(())
        }
        Command::Traits(args) => {
            let mut config = SolidifyConfig::load_or_default(cli.config.as_deref())?;
            config.apply_traits_args(&args);
            let report = cmd_traits(&args.input, &args.out_dir, &config.traits)?;
            print_traits_report(&report);
            Ok(())
        }
        Command::Verify(args) => cmd_verify(args),
    }
}

/// What a `features` run produced.
pub struct FeaturesReport {
    pub root: Hash256,
    pub num_tokens: usize,
    pub num_groups: usize,
    pub storages: Vec<StorageManifest>,
    pub written: Vec<PathBuf>,
}

pub fn cmd_features(
    input: &Path,
    out_dir: &Path,
    config: &SolidifyConfig,
) -> anyhow::Result<FeaturesReport> {
    let maps = load_features_json(input)
        .with_context(|| format!("loading features from {}", input.display()))?;
    let groups = extract_feature_groups(&maps);
    let codes = encode_features(&maps, &groups).context("encoding features")?;
    let tokens = tokens_from_features(codes).context("assigning token ids")?;
    tracing::info!(tokens = tokens.len(), groups = groups.len(), "extracted features");

    let tree = MerkleTree::build(&tokens).context("building merkle tree")?;
    tracing::info!(root = %tree.root(), depth = tree.depth(), "committed tokens");

    let pack = &config.features;
    let buckets = group_into_labelled_buckets(&tokens, pack.max_bucket_size)
        .context("grouping tokens into buckets")?;
    let storages = group_into_storages(buckets, pack.storage_bounds(), &pack.base_name)
        .context("grouping buckets into storages")?;
    let manifests =
        StorageManifest::from_labelled_storages(&storages).context("summarizing storages")?;

    let mut outputs = Vec::new();
    let mut buf = Vec::new();
    write_manifests(&manifests, &mut buf).context("serializing storages")?;
    outputs.push((STORAGES_FILE, buf));

    let mut buf = Vec::new();
    write_features_json(&groups, &tokens, &mut buf).context("serializing features")?;
    outputs.push((FEATURES_FILE, buf));

    if config.write_proofs {
        let buf = serde_json::to_vec_pretty(&tree.proofs_hex()).context("serializing proofs")?;
        outputs.push((PROOFS_FILE, buf));
    }

    let written = write_outputs(out_dir, outputs)?;

    Ok(FeaturesReport {
        root: tree.root(),
        num_tokens: tokens.len(),
        num_groups: groups.len(),
        storages: manifests,
        written,
    })
}

/// What a `traits` run produced.
pub struct TraitsReport {
    pub num_groups: usize,
    pub num_values: usize,
    pub storages: Vec<StorageManifest>,
    pub mapping: StorageMapping,
    pub written: Vec<PathBuf>,
}

/// Pack every trait type's value strings into its own indexed bucket.
///
/// Types are taken in name order, and so are their values; value `i` of a
/// type is stored at index `i - 1` of its bucket since code 0 (the zero
/// value) is not stored.
pub fn cmd_traits(
    input: &Path,
    out_dir: &Path,
    pack: &PackConfig,
) -> anyhow::Result<TraitsReport> {
    let maps = load_features_json(input)
        .with_context(|| format!("loading features from {}", input.display()))?;
    let groups = extract_feature_groups(&maps);
    let values: Vec<Vec<StringField>> = groups.iter().map(FeatureGroup::value_fields).collect();
    let num_values = values.iter().map(Vec::len).sum();
    tracing::info!(groups = groups.len(), values = num_values, "extracted trait values");

    let buckets = group_into_bucket_per_group(&values).context("grouping trait values")?;
    for (group, bucket) in groups.iter().zip(&buckets) {
        if bucket.uncompressed_size() > pack.max_bucket_size {
            tracing::warn!(
                group = group.name(),
                size = bucket.uncompressed_size(),
                max = pack.max_bucket_size,
                "trait bucket exceeds max bucket size"
            );
        }
    }

    let storages = group_into_storages(buckets, pack.storage_bounds(), &pack.base_name)
        .context("grouping trait buckets into storages")?;
    let manifests = StorageManifest::from_storages(&storages).context("summarizing storages")?;
    let mapping = sequential_mapping(&groups, &storages).context("mapping traits")?;

    let mut storages_buf = Vec::new();
    write_manifests(&manifests, &mut storages_buf).context("serializing trait storages")?;
    let mut mapping_buf = Vec::new();
    mapping
        .write_json(&mut mapping_buf)
        .context("serializing trait mapping")?;
    let written = write_outputs(
        out_dir,
        vec![
            (TRAIT_STORAGES_FILE, storages_buf),
            (TRAIT_MAPPING_FILE, mapping_buf),
        ],
    )?;

    Ok(TraitsReport {
        num_groups: groups.len(),
        num_values,
        storages: manifests,
        mapping,
        written,
    })
}

/// Write every output or none of them.
///
/// Contents are staged as hidden files in `out_dir` and only renamed into
/// place once all of them were written; a failed stage removes the others.
fn write_outputs(
    out_dir: &Path,
    outputs: Vec<(&str, Vec<u8>)>,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(outputs.len());
    for (name, bytes) in outputs {
        let tmp = out_dir.join(format!(".{name}.tmp"));
        if let Err(err) = fs::write(&tmp, bytes) {
            for (t, _) in &staged {
                let _ = fs::remove_file(t);
            }
            return Err(err).with_context(|| format!("writing {}", tmp.display()));
        }
        staged.push((tmp, out_dir.join(name)));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        fs::rename(&tmp, &path).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote output");
        written.push(path);
    }
    Ok(written)
}

fn print_report(report: &FeaturesReport) {
    println!(
        "{} Encoded {} tokens over {} feature types",
        "✓".green().bold(),
        report.num_tokens.to_string().bold(),
        report.num_groups.to_string().bold()
    );
    println!("  Root: {}", report.root.to_hex().cyan());

    let mut total = 0;
    for s in &report.storages {
        println!("  {}: {} B", s.name.yellow(), s.total_size);
        total += s.total_size;
    }
    println!("  Total size: {} B", total.to_string().bold());

    for path in &report.written {
        println!("  {} {}", "wrote".green(), path.display());
    }
}

fn print_traits_report(report: &TraitsReport) {
    println!(
        "{} Packed {} values of {} trait types",
        "✓".green().bold(),
        report.num_values.to_string().bold(),
        report.num_groups.to_string().bold()
    );
    for s in &report.storages {
        println!("  {}: {} buckets, {} B", s.name.yellow(), s.buckets.len(), s.total_size);
    }
    for path in &report.written {
        println!("  {} {}", "wrote".green(), path.display());
    }
}

fn cmd_verify(args: VerifyArgs) -> anyhow::Result<()> {
    let root = Hash256::from_hex(&args.root).context("parsing --root")?;
    let leaf = Hash256::from_hex(&args.leaf).context("parsing --leaf")?;
    let proof = args
        .proof
        .iter()
        .map(|h| Hash256::from_hex(h).with_context(|| format!("parsing proof element {h}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    if !verify_proof(&proof, &root, &leaf) {
        anyhow::bail!("proof does not lead to root {}", root);
    }
    println!("{} Proof verified against {}", "✓".green().bold(), root.to_hex().cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use solidify_crypto::leaf_hash;
    use solidify_pack::inflate;
    use solidify_types::Token;

    const TRAITS: &str = r#"[
        {"Body": "Robot", "Eyes": "Red"},
        {"Body": "Alien", "Eyes": "Blue"},
        {"Body": "Robot"},
        {"Body": "Alien", "Eyes": "None"}
    ]"#;

    fn setup() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("traits.json");
        fs::write(&input, TRAITS).unwrap();
        (dir, input)
    }

    fn config(max_bucket_size: usize, max_buckets: Option<usize>) -> SolidifyConfig {
        let mut c = SolidifyConfig::default();
        c.features.max_bucket_size = max_bucket_size;
        c.features.max_storage_size = None;
        c.features.max_buckets_per_storage = max_buckets;
        c
    }

    #[test]
    fn features_writes_manifests() {
        let (dir, input) = setup();
        let out = dir.path().join("gen");

        let report = cmd_features(&input, &out, &config(6, Some(1))).unwrap();
        assert_eq!(report.num_tokens, 4);
        assert_eq!(report.num_groups, 2);
        assert_eq!(report.written.len(), 2);
        assert!(!out.join(PROOFS_FILE).exists());

        // Each token is 2 label bytes + 2 codes; two tokens close a bucket.
        let names: Vec<_> = report.storages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["FeaturesBucketStorage0", "FeaturesBucketStorage1"]);
        assert_eq!(report.storages[0].last_label, Some(1));
        assert_eq!(report.storages[1].last_label, Some(3));

        let stored: serde_json::Value =
            serde_json::from_reader(File::open(out.join(STORAGES_FILE)).unwrap()).unwrap();
        assert_eq!(stored.as_array().unwrap().len(), 2);

        let hex_data = stored[0]["buckets"][0]["data"].as_str().unwrap();
        let raw = inflate(&hex::decode(&hex_data[2..]).unwrap()).unwrap();
        // Body: [None, Alien, Robot]; Eyes: [None, Blue, Red].
        assert_eq!(raw, vec![0, 0, 2, 2, 0, 1, 1, 1]);

        let features: serde_json::Value =
            serde_json::from_reader(File::open(out.join(FEATURES_FILE)).unwrap()).unwrap();
        assert_eq!(features["features"][2], serde_json::json!({"Body": 2, "Eyes": 0}));
    }

    #[test]
    fn features_writes_verifiable_proofs() {
        let (dir, input) = setup();
        let out = dir.path().join("gen");
        let mut c = config(1400, None);
        c.write_proofs = true;

        let report = cmd_features(&input, &out, &c).unwrap();
        assert_eq!(report.storages.len(), 1);

        let proofs: Vec<Vec<String>> =
            serde_json::from_reader(File::open(out.join(PROOFS_FILE)).unwrap()).unwrap();
        assert_eq!(proofs.len(), 4);

        let leaf = leaf_hash(&Token::new(1, vec![1, 1])).unwrap();
        cmd_verify(VerifyArgs {
            root: report.root.to_hex(),
            leaf: leaf.to_hex(),
            proof: proofs[1].clone(),
        })
        .unwrap();

        let wrong = leaf_hash(&Token::new(1, vec![2, 1])).unwrap();
        assert!(cmd_verify(VerifyArgs {
            root: report.root.to_hex(),
            leaf: wrong.to_hex(),
            proof: proofs[1].clone(),
        })
        .is_err());
    }

    #[test]
    fn features_rejects_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_features(
            &dir.path().join("nope.json"),
            &dir.path().join("gen"),
            &SolidifyConfig::default(),
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("loading features"));
    }

    #[test]
    fn failed_write_leaves_no_outputs() {
        let (dir, input) = setup();
        let out = dir.path().join("gen");
        // A directory where the features file is staged makes that write fail
        // after the storages file was staged.
        fs::create_dir_all(out.join(format!(".{FEATURES_FILE}.tmp"))).unwrap();

        let err = cmd_features(&input, &out, &config(1400, None)).err().unwrap();
        assert!(err.to_string().contains("writing"));
        assert!(!out.join(STORAGES_FILE).exists());
        assert!(!out.join(format!(".{STORAGES_FILE}.tmp")).exists());
        assert!(!out.join(FEATURES_FILE).exists());
    }

    #[test]
    fn encoding_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("traits.json");
        let many: Vec<String> = (0..300).map(|i| format!("{{\"Hat\": \"h{i}\"}}")).collect();
        fs::write(&input, format!("[{}]", many.join(","))).unwrap();
        let out = dir.path().join("gen");

        let err = cmd_features(&input, &out, &SolidifyConfig::default()).err().unwrap();
        assert!(err.to_string().contains("encoding features"));
        assert!(!out.exists());
    }

    #[test]
    fn traits_pack_one_bucket_per_type() {
        let (dir, input) = setup();
        let out = dir.path().join("gen");

        let report = cmd_traits(&input, &out, &PackConfig::traits()).unwrap();
        assert_eq!(report.num_groups, 2);
        assert_eq!(report.num_values, 4);
        assert_eq!(report.storages.len(), 1);
        assert_eq!(report.storages[0].name, "TraitBucketStorage0");
        assert_eq!(report.storages[0].buckets.len(), 2);
        assert_eq!(report.written.len(), 2);

        let stored: Vec<StorageManifest> =
            serde_json::from_reader(File::open(out.join(TRAIT_STORAGES_FILE)).unwrap()).unwrap();
        let hex_data = &stored[0].buckets[1].data;
        let raw = inflate(&hex::decode(&hex_data[2..]).unwrap()).unwrap();
        // Eyes: Blue, Red behind a two-entry offset header.
        assert_eq!(raw, b"\x00\x04\x00\x08BlueRed".to_vec());

        let mapping: StorageMapping =
            serde_json::from_reader(File::open(out.join(TRAIT_MAPPING_FILE)).unwrap()).unwrap();
        assert_eq!(mapping, report.mapping);
        assert_eq!(mapping.storages, vec!["TraitBucketStorage0"]);
        let eyes = mapping.group("Eyes").unwrap();
        assert_eq!(eyes.num_fields, 2);
        assert_eq!(eyes.spans.len(), 1);
        assert_eq!((eyes.spans[0].bucket, eyes.spans[0].first_field), (1, 0));
    }

    #[test]
    fn traits_respect_bucket_count_bound() {
        let (dir, input) = setup();
        let mut pack = PackConfig::traits();
        pack.max_buckets_per_storage = Some(1);

        let report = cmd_traits(&input, &dir.path().join("gen"), &pack).unwrap();
        let names: Vec<_> = report.mapping.storages.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["TraitBucketStorage0", "TraitBucketStorage1"]);
        assert_eq!(report.mapping.group("Eyes").unwrap().spans[0].storage, 1);
    }

    #[test]
    fn verify_rejects_bad_hex() {
        let err = cmd_verify(VerifyArgs {
            root: "0xzz".into(),
            leaf: Hash256::zero().to_hex(),
            proof: vec![],
        })
        .unwrap_err();
        assert!(err.to_string().contains("--root"));
    }
}
