//! `assetsync launch` – prepare assets for a downstream program and run it.

use anyhow::{Context, Result};
use assetsync_core::config::AssetSyncConfig;
use assetsync_core::launch::{self, EntryRegistry, VERSION_JSON_ENTRY};
use assetsync_core::manifest::VersionDescriptor;
use std::path::Path;

use super::sync::sync_assets;
use crate::cli::StoreArgs;

pub fn run_launch(
    cfg: &AssetSyncConfig,
    metadata: &Path,
    cache: &Path,
    main: &str,
    store: &StoreArgs,
    verify_existing: bool,
    mut args: Vec<String>,
) -> Result<()> {
    let version_json = launch::extract_entry(metadata, VERSION_JSON_ENTRY, cache)?;
    let version = VersionDescriptor::read(&version_json)?;
    if let Some(id) = &version.id {
        tracing::info!(version = %id, "launching");
    }
    let descriptor = version.asset_index.descriptor();

    let (layout, manifest) = sync_assets(cfg, store, &descriptor, verify_existing)?;

    launch::substitute_placeholders(&mut args, manifest.id(), layout.root());

    let entry = EntryRegistry::new().resolve(main);
    tracing::info!(entry = entry.name(), args = args.len(), "invoking entry point");
    entry
        .invoke(&args)
        .with_context(|| format!("entry point {} failed", main))
}
