//! Filesystem access for project vaults.
//!
//! The vault never touches `std::fs` directly; it goes through [`Filesystem`]
//! and passes the file modes from [`Permissions`] explicitly.

use getrandom::fill;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Project directory mode (`rwxr-xr-x`).
pub const DIRECTORY_MODE: u32 = 0o755;
/// Encrypted artifact mode (`rw-r--r--`).
pub const ARTIFACT_MODE: u32 = 0o644;
/// Decrypted output mode (`rw-------`).
pub const PLAINTEXT_MODE: u32 = 0o600;

/// File modes applied when the vault creates directories and files.
///
/// Modes are Unix permission bits; they are ignored on other platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub directory: u32,
    pub artifact: u32,
    pub plaintext: u32,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            directory: DIRECTORY_MODE,
            artifact: ARTIFACT_MODE,
            plaintext: PLAINTEXT_MODE,
        }
    }
}

/// The filesystem operations a vault needs.
pub trait Filesystem {
    /// Reads the whole file into memory.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Creates `path` and any missing parents with the given mode.
    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Replaces the content of `path` with `data`.
    ///
    /// Either the old or the new content is observable afterwards, never a
    /// partial write. The parent directory must already exist.
    fn write_atomic(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()>;

    fn is_file(&self, path: &Path) -> bool;
}

/// [`Filesystem`] backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        builder.create(path)
    }

    /// Writes through a temporary sibling file.
    ///
    /// 1. Writes data to a temporary file with a random name
    /// 2. Syncs the temporary file to disk
    /// 3. Atomically replaces the target with it
    /// 4. Syncs the parent directory so the rename is persisted
    ///
    /// The temporary file is removed if any of steps 1-3 fails. Once the
    /// replace succeeded the new content is in place, so a failed directory
    /// sync is not reported as an error.
    ///
    /// If `path` is a symlink, the file it points to is replaced and the link
    /// is kept.
    fn write_atomic(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
        let target = resolve_symlink(path);
        let path = target.as_path();
        let tmp_path = random_tmp_path(path)?;

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        // fails if the temp name is taken or the parent is missing
        let mut tmp_file = options.open(&tmp_path)?;

        let written = tmp_file
            .write_all(data)
            .and_then(|()| tmp_file.sync_all());
        drop(tmp_file);

        if let Err(e) = written.and_then(|()| atomic_replace(&tmp_path, path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        #[cfg(unix)]
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let _ = File::open(parent).and_then(|dir| dir.sync_all());
        }

        Ok(())
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Follows `path` to the file it finally points to.
///
/// Returns `path` unchanged if it is not a symlink or cannot be resolved
/// (e.g. a dangling link, which the rename then replaces).
fn resolve_symlink(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Generates a unique temporary path next to `path`.
///
/// Format: `filename.tmp.<randomhex>`
fn random_tmp_path(path: &Path) -> io::Result<PathBuf> {
    let mut buf = [0u8; 8]; // 64 bit entropy
    fill(&mut buf)
        .map_err(|e| io::Error::other(format!("OS random generator unavailable: {e}")))?;

    let rand_string = buf.iter().map(|b| format!("{b:02x}")).collect::<String>();

    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
        .to_string_lossy();

    Ok(path.with_file_name(format!("{file_name}.tmp.{rand_string}")))
}

/// Atomically replaces `target` with `tmp_path`.
///
/// Uses `ReplaceFileW` with `REPLACEFILE_WRITE_THROUGH` when the target
/// exists; `ReplaceFileW` refuses to create a missing target, so a plain
/// rename is used for new files.
#[cfg(target_os = "windows")]
fn atomic_replace(tmp_path: &Path, target: &Path) -> io::Result<()> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

    fn to_wide(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    if !target.exists() {
        return fs::rename(tmp_path, target);
    }

    let target_w = to_wide(target.as_os_str());
    let tmp_w = to_wide(tmp_path.as_os_str());

    // SAFETY:
    // - Strings are valid UTF-16 and null-terminated
    // - Pointers remain valid during the call
    // - Windows does not retain the pointers after return
    let result = unsafe {
        ReplaceFileW(
            target_w.as_ptr(),
            tmp_w.as_ptr(),
            std::ptr::null(),
            REPLACEFILE_WRITE_THROUGH,
            std::ptr::null(),
            std::ptr::null(),
        )
    };

    if result == 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

/// On Unix, `rename()` is atomic when both paths are on the same filesystem.
#[cfg(not(target_os = "windows"))]
fn atomic_replace(tmp_path: &Path, target: &Path) -> io::Result<()> {
    fs::rename(tmp_path, target)
}

#[cfg(test)]
pub(crate) mod memory {
    use super::Filesystem;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::io;
    use std::path::{Path, PathBuf};

    /// In-memory [`Filesystem`] for exercising vault logic without disk access.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryFilesystem {
        files: RefCell<HashMap<PathBuf, (Vec<u8>, u32)>>,
        dirs: RefCell<HashMap<PathBuf, u32>>,
        read_only: RefCell<HashSet<PathBuf>>,
    }

    impl MemoryFilesystem {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn insert_file(&self, path: impl Into<PathBuf>, data: &[u8]) {
            let path = path.into();
            if let Some(parent) = path.parent() {
                self.dirs.borrow_mut().insert(parent.to_path_buf(), 0o755);
            }
            self.files.borrow_mut().insert(path, (data.to_vec(), 0o644));
        }

        /// Makes every path under `dir` refuse directory creation and writes.
        pub(crate) fn deny_writes(&self, dir: impl Into<PathBuf>) {
            self.read_only.borrow_mut().insert(dir.into());
        }

        pub(crate) fn file(&self, path: &Path) -> Option<(Vec<u8>, u32)> {
            self.files.borrow().get(path).cloned()
        }

        pub(crate) fn dir_mode(&self, path: &Path) -> Option<u32> {
            self.dirs.borrow().get(path).copied()
        }

        pub(crate) fn file_count(&self) -> usize {
            self.files.borrow().len()
        }

        fn check_writable(&self, path: &Path) -> io::Result<()> {
            if self
                .read_only
                .borrow()
                .iter()
                .any(|denied| path.starts_with(denied))
            {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "permission denied",
                ));
            }
            Ok(())
        }
    }

    impl Filesystem for MemoryFilesystem {
        fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
            self.files
                .borrow()
                .get(path)
                .map(|(data, _)| data.clone())
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }

        fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
            let mut dirs = self.dirs.borrow_mut();
            for ancestor in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
                if dirs.contains_key(ancestor) {
                    continue;
                }
                self.check_writable(ancestor)?;
                dirs.insert(ancestor.to_path_buf(), mode);
            }
            Ok(())
        }

        fn write_atomic(&self, path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
            self.check_writable(path)?;

            let parent = path.parent().unwrap_or_else(|| Path::new(""));
            if !parent.as_os_str().is_empty() && !self.dirs.borrow().contains_key(parent) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"));
            }

            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), (data.to_vec(), mode));
            Ok(())
        }

        fn is_file(&self, path: &Path) -> bool {
            self.files.borrow().contains_key(path)
        }
    }
}
