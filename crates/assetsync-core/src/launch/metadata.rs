//! Extract a single entry from a metadata zip into the cache directory.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Entry holding the version descriptor inside a metadata archive.
pub const VERSION_JSON_ENTRY: &str = "minecraft/version.json";

/// Extract `entry` from the zip at `archive` into `<cache>/metadata/<entry>`,
/// overwriting any previous copy. Returns the extracted path.
pub fn extract_entry(archive: &Path, entry: &str, cache: &Path) -> Result<PathBuf> {
    let file = File::open(archive).with_context(|| format!("open {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("invalid zip archive {}", archive.display()))?;

    let mut zipped = match zip.by_name(entry) {
        Ok(z) => z,
        Err(zip::result::ZipError::FileNotFound) => {
            bail!("missing {} in {}", entry, archive.display())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("read {} in {}", entry, archive.display()))
        }
    };
    let Some(relative) = zipped.enclosed_name().map(Path::to_path_buf) else {
        bail!("refusing to extract unsafe entry name {}", entry);
    };

    let output = cache.join("metadata").join(relative);
    if let Some(dir) = output.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory: {}", dir.display()))?;
    }
    let mut out =
        File::create(&output).with_context(|| format!("create {}", output.display()))?;
    std::io::copy(&mut zipped, &mut out)
        .with_context(|| format!("extract {} to {}", entry, output.display()))?;

    tracing::debug!(entry, path = %output.display(), "extracted metadata entry");
    Ok(output)
}
