//! `assetsync verify` – offline audit of the store against a cached index.

use anyhow::{bail, Result};
use assetsync_core::config::AssetSyncConfig;
use assetsync_core::manifest::{IndexDescriptor, Manifest};
use assetsync_core::verify::audit_store;

use crate::cli::StoreArgs;

pub fn run_verify(
    cfg: &AssetSyncConfig,
    store: &StoreArgs,
    descriptor: &IndexDescriptor,
) -> Result<()> {
    let layout = store.layout(cfg)?;
    let algorithm = store.algorithm(cfg);
    let index_path = layout.index_path(&descriptor.id)?;
    if !index_path.exists() {
        bail!(
            "asset index {} is not cached at {}; run `assetsync sync` first",
            descriptor.id,
            index_path.display()
        );
    }

    let manifest = Manifest::read(descriptor, &index_path, algorithm)?;
    let report = audit_store(&layout, &manifest, algorithm)?;

    if report.is_clean() {
        println!("{} assets verified, no problems found", report.checked);
        return Ok(());
    }

    println!("{:<10} {:<42} {}", "HASH", "PROBLEM", "NAME");
    for finding in &report.findings {
        println!(
            "{:<10} {:<42} {}",
            &finding.hash[..finding.hash.len().min(8)],
            finding.problem.to_string(),
            finding.name
        );
    }
    bail!(
        "{} of {} assets failed verification",
        report.findings.len(),
        report.checked
    )
}
