//! Disk I/O and file lifecycle for fetched objects.
//!
//! Downloads land in a `.part` file next to their destination and are
//! renamed over it once the transfer completes, so a half-written body never
//! occupies a canonical store path.

mod writer;

pub use writer::StorageWriter;

use std::io;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the final rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `ab/abcd…` → `ab/abcd….part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Create `dir` and its parents. A directory that already exists (including
/// one created concurrently by another process) counts as success.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    match std::fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

/// Delete `path`, treating a file that is already gone as success.
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Size of the regular file at `path`, or `None` if nothing usable is there.
pub fn file_len(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("file.iso"));
        assert_eq!(p.to_string_lossy(), "file.iso.part");
        let p2 = temp_path(Path::new("/tmp/objects/ab/abcd"));
        assert_eq!(p2.to_string_lossy(), "/tmp/objects/ab/abcd.part");
    }

    #[test]
    fn append_sync_finalize_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("output.bin");
        std::fs::write(&final_path, b"stale content that is longer").unwrap();
        let tp = temp_path(&final_path);

        let mut writer = StorageWriter::create(&tp).unwrap();
        writer.append(b"hello ").unwrap();
        writer.append(b"world").unwrap();
        assert_eq!(writer.written(), 11);
        writer.sync().unwrap();
        writer.finalize(&final_path).unwrap();

        assert!(!tp.exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"hello world");
    }

    #[test]
    fn discard_removes_temp_and_keeps_destination() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("output.bin");
        std::fs::write(&final_path, b"old").unwrap();
        let tp = temp_path(&final_path);

        let mut writer = StorageWriter::create(&tp).unwrap();
        writer.append(b"partial").unwrap();
        writer.discard();

        assert!(!tp.exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"old");
    }

    #[test]
    fn ensure_dir_tolerates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn ensure_dir_fails_when_a_file_is_in_the_way() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("objects");
        std::fs::write(&blocker, b"not a dir").unwrap();
        assert!(ensure_dir(&blocker).is_err());
    }

    #[test]
    fn remove_and_len_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("x");
        assert_eq!(file_len(&p), None);
        std::fs::write(&p, b"1234").unwrap();
        assert_eq!(file_len(&p), Some(4));
        remove_if_exists(&p).unwrap();
        remove_if_exists(&p).unwrap();
        assert_eq!(file_len(dir.path()), None);
    }
}
