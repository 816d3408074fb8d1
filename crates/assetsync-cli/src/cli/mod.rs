//! CLI for assetsync.

mod commands;

use anyhow::{bail, Context, Result};
use assetsync_core::config::{self, AssetSyncConfig};
use assetsync_core::layout::{self, StoreLayout};
use assetsync_core::manifest::{IndexDescriptor, VersionDescriptor};
use assetsync_core::HashAlgorithm;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_checksum, run_launch, run_sync, run_verify};

/// Top-level CLI for assetsync.
#[derive(Debug, Parser)]
#[command(name = "assetsync", version)]
#[command(about = "assetsync: verified content-addressed asset store sync", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where the store lives and where objects come from. Unset flags fall back to config.toml.
#[derive(Debug, Clone, Default, Args)]
pub struct StoreArgs {
    /// Store root holding `objects/` and `indexes/`.
    #[arg(long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Base URL objects are fetched from (`<base><hash[0:2]>/<hash>`).
    #[arg(long, value_name = "URL")]
    pub assets_repo: Option<String>,

    /// Digest algorithm for index and object hashes (sha1 or sha256).
    #[arg(long, value_name = "ALGO")]
    pub hash_algorithm: Option<HashAlgorithm>,
}

impl StoreArgs {
    /// Absolute store layout.
    pub fn layout(&self, cfg: &AssetSyncConfig) -> Result<StoreLayout> {
        let root = match &self.assets {
            Some(dir) => dir.clone(),
            None => cfg.assets_dir()?,
        };
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(root)
        };
        Ok(StoreLayout::new(root))
    }

    /// Repository base URL with a trailing slash.
    pub fn repo(&self, cfg: &AssetSyncConfig) -> Result<String> {
        let base = self.assets_repo.as_deref().unwrap_or(&cfg.assets_repo);
        layout::normalize_base_url(base).with_context(|| format!("invalid assets repo {}", base))
    }

    pub fn algorithm(&self, cfg: &AssetSyncConfig) -> HashAlgorithm {
        self.hash_algorithm.unwrap_or(cfg.hash_algorithm)
    }
}

/// Which asset index to use: a version descriptor or explicit fields.
#[derive(Debug, Clone, Default, Args)]
pub struct IndexArgs {
    /// Version JSON whose `assetIndex` names the index.
    #[arg(long, value_name = "PATH", conflicts_with = "index_id")]
    pub version_json: Option<PathBuf>,

    /// Index id; also names the cached copy `indexes/<id>.json`.
    #[arg(long, value_name = "ID", requires_all = ["index_url", "index_size", "index_hash"])]
    pub index_id: Option<String>,

    #[arg(long, value_name = "URL", requires = "index_id")]
    pub index_url: Option<String>,

    /// Expected index size in bytes.
    #[arg(long, value_name = "BYTES", requires = "index_id")]
    pub index_size: Option<u64>,

    /// Expected index digest (hex).
    #[arg(long, value_name = "HEX", requires = "index_id")]
    pub index_hash: Option<String>,
}

impl IndexArgs {
    pub fn descriptor(&self) -> Result<IndexDescriptor> {
        if let Some(path) = &self.version_json {
            let version = VersionDescriptor::read(path)?;
            return Ok(version.asset_index.descriptor());
        }
        match (&self.index_id, &self.index_url, self.index_size, &self.index_hash) {
            (Some(id), Some(url), Some(size), Some(hash)) => Ok(IndexDescriptor {
                id: id.clone(),
                url: url.clone(),
                size,
                hash: hash.to_ascii_lowercase(),
            }),
            _ => bail!("either --version-json or --index-id/--index-url/--index-size/--index-hash is required"),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Bring the local asset store in line with an asset index.
    Sync {
        #[command(flatten)]
        index: IndexArgs,

        #[command(flatten)]
        store: StoreArgs,

        /// Re-hash existing objects instead of trusting a matching size.
        #[arg(long)]
        verify_existing: bool,
    },

    /// Extract the version descriptor from a metadata archive, sync assets, then run an entry point.
    Launch {
        /// Metadata zip containing `minecraft/version.json`.
        #[arg(long, value_name = "ZIP")]
        metadata: PathBuf,

        /// Cache directory; the descriptor is extracted to `<cache>/metadata/`.
        #[arg(long, value_name = "DIR")]
        cache: PathBuf,

        /// Entry point to invoke with the forwarded arguments.
        #[arg(long, value_name = "ENTRY")]
        main: String,

        #[command(flatten)]
        store: StoreArgs,

        /// Re-hash existing objects instead of trusting a matching size.
        #[arg(long)]
        verify_existing: bool,

        /// Arguments after `--`; `{asset_index}` and `{assets_root}` are substituted.
        #[arg(last = true, value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Re-hash every object named by a cached asset index. Nothing is fetched.
    Verify {
        #[command(flatten)]
        index: IndexArgs,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Print the digest of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,

        #[arg(long, default_value_t = HashAlgorithm::Sha1, value_name = "ALGO")]
        algorithm: HashAlgorithm,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Sync {
                index,
                store,
                verify_existing,
            } => {
                let descriptor = index.descriptor()?;
                run_sync(&cfg, &store, &descriptor, verify_existing)?;
            }
            CliCommand::Launch {
                metadata,
                cache,
                main,
                store,
                verify_existing,
                args,
            } => run_launch(&cfg, &metadata, &cache, &main, &store, verify_existing, args)?,
            CliCommand::Verify { index, store } => run_verify(&cfg, &store, &index.descriptor()?)?,
            CliCommand::Checksum { path, algorithm } => run_checksum(&path, algorithm)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
