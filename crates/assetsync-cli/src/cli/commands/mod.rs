//! CLI command handlers. Each command is in its own file.

mod checksum;
mod launch;
mod progress;
mod sync;
mod verify;

pub use checksum::run_checksum;
pub use launch::run_launch;
pub use sync::run_sync;
pub use verify::run_verify;
