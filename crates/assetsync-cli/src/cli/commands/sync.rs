//! `assetsync sync` – load the asset index and bring the store up to date.

use anyhow::Result;
use assetsync_core::config::AssetSyncConfig;
use assetsync_core::fetch::CurlFetcher;
use assetsync_core::layout::StoreLayout;
use assetsync_core::loader::ManifestLoader;
use assetsync_core::manifest::{IndexDescriptor, Manifest};
use assetsync_core::sync::{AssetSynchronizer, TrustPolicy};
use std::time::Instant;

use super::progress::ConsoleObserver;
use crate::cli::StoreArgs;

pub fn run_sync(
    cfg: &AssetSyncConfig,
    store: &StoreArgs,
    descriptor: &IndexDescriptor,
    verify_existing: bool,
) -> Result<()> {
    sync_assets(cfg, store, descriptor, verify_existing)?;
    Ok(())
}

/// Shared by `sync` and `launch`: prints the banner, runs the loader and the
/// synchronizer, and reports timing. Returns the store and the loaded index.
pub(super) fn sync_assets(
    cfg: &AssetSyncConfig,
    store: &StoreArgs,
    descriptor: &IndexDescriptor,
    verify_existing: bool,
) -> Result<(StoreLayout, Manifest)> {
    let started = Instant::now();
    println!("assetsync {}", env!("CARGO_PKG_VERSION"));

    let layout = store.layout(cfg)?;
    let repo = store.repo(cfg)?;
    let algorithm = store.algorithm(cfg);
    let trust = if verify_existing {
        TrustPolicy::FullHash
    } else {
        cfg.trust_policy
    };
    tracing::info!(
        root = %layout.root().display(),
        repo = %repo,
        index = %descriptor.id,
        %algorithm,
        %trust,
        "starting asset sync"
    );

    let fetcher = CurlFetcher::new(cfg.transfer.curl_options());
    let mut observer = ConsoleObserver::default();

    let (manifest, source) =
        ManifestLoader::new(&layout, &fetcher, algorithm).load(descriptor, &mut observer)?;
    tracing::debug!(?source, assets = manifest.len(), "asset index ready");

    let report = AssetSynchronizer::new(&fetcher)
        .with_algorithm(algorithm)
        .with_trust_policy(trust)
        .synchronize(&repo, &layout, &manifest, &mut observer)?;

    let elapsed_ms = started.elapsed().as_millis();
    if observer.fetched_any() {
        println!(
            "finished setting up assets in {} ms ({} downloaded, {:.1} MiB)",
            elapsed_ms,
            report.fetched,
            report.bytes_fetched as f64 / 1_048_576.0
        );
    } else {
        println!("assets are up-to-date ({} ms)", elapsed_ms);
    }
    tracing::info!(
        total = report.total,
        cached = report.cached,
        fetched = report.fetched,
        bytes = report.bytes_fetched,
        elapsed_ms = elapsed_ms as u64,
        "asset sync finished"
    );

    Ok((layout, manifest))
}
