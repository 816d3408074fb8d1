//! Launcher boundary: the steps around a sync run when assets are prepared
//! for a downstream program.
//!
//! Pull the version descriptor out of a metadata archive, sync, rewrite the
//! forwarded arguments, then hand them to an entry point.

mod entry;
mod metadata;

pub use entry::{EntryFn, EntryPoint, EntryRegistry, ProgramEntryPoint, RegisteredEntry};
pub use metadata::{extract_entry, VERSION_JSON_ENTRY};

use std::path::Path;

pub const ASSET_INDEX_PLACEHOLDER: &str = "{asset_index}";
pub const ASSETS_ROOT_PLACEHOLDER: &str = "{assets_root}";

/// Replace `{asset_index}` and `{assets_root}` in every forwarded argument.
pub fn substitute_placeholders(args: &mut [String], asset_index: &str, assets_root: &Path) {
    let root = assets_root.display().to_string();
    for arg in args.iter_mut() {
        if arg.contains('{') {
            *arg = arg
                .replace(ASSET_INDEX_PLACEHOLDER, asset_index)
                .replace(ASSETS_ROOT_PLACEHOLDER, &root);
        }
    }
}
