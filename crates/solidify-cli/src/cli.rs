use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "solidify",
    about = "Pack collection art and traits into on-chain storage blobs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML file with packing bounds; flags take precedence.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Encode token traits, commit to them and pack them into storages
    Features(FeaturesArgs),
    /// Pack the trait value strings, one bucket per trait type
    Traits(TraitsArgs),
    /// Check a Merkle proof against a root
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct FeaturesArgs {
    /// Metadata JSON: an array of {type: value} objects, one per token.
    #[arg(short, long)]
    pub input: PathBuf,
    #[arg(short, long, default_value = "gen")]
    pub out_dir: PathBuf,
    #[arg(long)]
    pub base_name: Option<String>,
    #[arg(long)]
    pub max_bucket_size: Option<usize>,
    /// Compressed bytes per storage; negative disables the limit.
    #[arg(long, allow_negative_numbers = true)]
    pub max_storage_size: Option<i64>,
    /// Buckets per storage; negative disables the limit.
    #[arg(long, allow_negative_numbers = true)]
    pub max_buckets: Option<i64>,
    #[arg(long)]
    pub write_proofs: bool,
}

#[derive(Args)]
pub struct TraitsArgs {
    /// Metadata JSON: an array of {type: value} objects, one per token.
    #[arg(short, long)]
    pub input: PathBuf,
    #[arg(short, long, default_value = "gen")]
    pub out_dir: PathBuf,
    #[arg(long)]
    pub base_name: Option<String>,
    /// Compressed bytes per storage; negative disables the limit.
    #[arg(long, allow_negative_numbers = true)]
    pub max_storage_size: Option<i64>,
    /// Buckets per storage; negative disables the limit.
    #[arg(long, allow_negative_numbers = true)]
    pub max_buckets: Option<i64>,
}

#[derive(Args)]
pub struct VerifyArgs {
    #[arg(long)]
    pub root: String,
    #[arg(long)]
    pub leaf: String,
    /// Sibling hashes from leaf to root, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub proof: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_features() {
        let cli = Cli::try_parse_from(["solidify", "features", "-i", "traits.json"]).unwrap();
        if let Command::Features(args) = cli.command {
            assert_eq!(args.input, PathBuf::from("traits.json"));
            assert_eq!(args.out_dir, PathBuf::from("gen"));
            assert!(!args.write_proofs);
            assert_eq!(args.max_bucket_size, None);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_features_bounds() {
        let cli = Cli::try_parse_from([
            "solidify",
            "features",
            "--input",
            "t.json",
            "--max-storage-size",
            "-1",
            "--max-buckets",
            "2",
            "--base-name",
            "Traits",
            "--write-proofs",
        ])
        .unwrap();
        if let Command::Features(args) = cli.command {
            assert_eq!(args.max_storage_size, Some(-1));
            assert_eq!(args.max_buckets, Some(2));
            assert_eq!(args.base_name.as_deref(), Some("Traits"));
            assert!(args.write_proofs);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_features_requires_input() {
        assert!(Cli::try_parse_from(["solidify", "features"]).is_err());
    }

    #[test]
    fn parse_traits() {
        let cli = Cli::try_parse_from([
            "solidify",
            "traits",
            "-i",
            "t.json",
            "-o",
            "out",
            "--max-buckets",
            "-1",
        ])
        .unwrap();
        if let Command::Traits(args) = cli.command {
            assert_eq!(args.input, PathBuf::from("t.json"));
            assert_eq!(args.out_dir, PathBuf::from("out"));
            assert_eq!(args.max_buckets, Some(-1));
            assert_eq!(args.base_name, None);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from([
            "solidify", "verify", "--root", "0xaa", "--leaf", "0xbb", "--proof", "0x01,0x02",
        ])
        .unwrap();
        if let Command::Verify(args) = cli.command {
            assert_eq!(args.root, "0xaa");
            assert_eq!(args.proof, vec!["0x01", "0x02"]);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verify_empty_proof() {
        let cli =
            Cli::try_parse_from(["solidify", "verify", "--root", "0xaa", "--leaf", "0xaa"]).unwrap();
        if let Command::Verify(args) = cli.command {
            assert!(args.proof.is_empty());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "solidify",
            "--verbose",
            "--config",
            "solidify.toml",
            "features",
            "-i",
            "t.json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("solidify.toml")));
    }
}
