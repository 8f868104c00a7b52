use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Mode given to installed binaries
#[cfg(unix)]
const EXECUTABLE_MODE: u32 = 0o755;

/// Atomically write a file only if it does not already exist. Returns true
/// if written. The final link refuses to replace an existing file.
pub fn write_if_missing(path: &Path, data: &[u8]) -> io::Result<bool> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = NamedTempFile::new_in(parent_or_cwd(path))?;
    tmp.write_all(data)?;
    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error),
    }
}

/// Copy `src` over `dst` through a tempfile next to `dst`, marking it
/// executable before the rename so `dst` is never half-written.
pub fn copy_executable_atomic(src: &Path, dst: &Path) -> io::Result<()> {
    let mut source = fs::File::open(src)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".sb-tmp-")
        .tempfile_in(parent_or_cwd(dst))?;
    io::copy(&mut source, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    set_executable(tmp.path())?;
    tmp.persist(dst).map_err(|e| e.error)?;
    Ok(())
}

/// Give `path` mode 0755. No-op off Unix.
pub fn set_executable(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(EXECUTABLE_MODE))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// True when both paths exist and name the same file after symlinks are resolved.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn parent_or_cwd(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
