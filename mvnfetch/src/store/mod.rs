//! Atomic installation of downloaded files.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write `bytes` to `target`, replacing any existing file.
///
/// The bytes go to a `<target>.tmp` sibling first and are renamed over the
/// target, so a crash mid-write can leave a stale `.tmp` file but never a
/// truncated artifact at the final path. Parent directories are created as
/// needed.
///
/// On POSIX the rename is an atomic replace. On platforms where rename
/// over an existing file is not atomic this degrades to a best-effort
/// replace.
pub fn write_replace(target: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(target);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, target)
}

/// The sibling temp path for a target: the full file name plus `.tmp`.
fn tmp_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
