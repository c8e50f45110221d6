//! Temporary project directories with controllable modification times.

use std::fs::{self, File, OpenOptions};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Default build-file name looked up by the binary.
pub const BUILD_FILE: &str = "Tsumikifile";

/// Set the modification time of `path` to `secs.nanos` after the Unix epoch.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or its time updated.
pub fn set_mtime(path: &Utf8Path, secs: u64, nanos: u32) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .with_context(|| format!("open {path} to set its mtime"))?;
    file.set_modified(UNIX_EPOCH + Duration::new(secs, nanos))
        .with_context(|| format!("set mtime of {path}"))
}

/// A temporary workspace removed when dropped.
#[derive(Debug)]
pub struct Project {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    /// Create an empty project directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its path is not
    /// valid UTF-8.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create project dir")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("non-UTF-8 temp dir {}", path.display()))?;
        Ok(Self { _dir: dir, root })
    }

    /// Project directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of `name` inside the project.
    #[must_use]
    pub fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Write `text` as the project's `Tsumikifile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_build_file(&self, text: &str) -> Result<Utf8PathBuf> {
        self.write(BUILD_FILE, text)
    }

    /// Write `contents` to `name`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, name: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Create `name` if needed and set its modification time.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or its time updated.
    pub fn touch_at(&self, name: &str, secs: u64, nanos: u32) -> Result<Utf8PathBuf> {
        let path = self.path(name);
        if !path.exists() {
            File::create(&path).with_context(|| format!("create {path}"))?;
        }
        set_mtime(&path, secs, nanos)?;
        Ok(path)
    }

    /// Whether `name` exists in the project.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Modification time of `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file's metadata cannot be read.
    pub fn modified(&self, name: &str) -> Result<SystemTime> {
        let path = self.path(name);
        fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .with_context(|| format!("read mtime of {path}"))
    }
}
