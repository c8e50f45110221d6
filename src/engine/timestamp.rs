//! Filesystem timestamps and the workspace they are read from.

use std::fmt;
use std::io;
use std::time::SystemTime;

use camino::{Utf8Path, Utf8PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::BuildError;

/// Modification time with nanosecond precision.
///
/// Ordering compares seconds first and nanoseconds second, so two files
/// written within the same second still order correctly on filesystems that
/// record sub-second times.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    /// Build a timestamp from seconds and nanoseconds since the Unix epoch.
    ///
    /// Nanoseconds beyond one second are carried into `secs`.
    #[must_use]
    pub const fn new(secs: i64, nanos: u32) -> Self {
        let carry = nanos.div_euclid(1_000_000_000);
        Self {
            secs: secs.saturating_add(carry as i64),
            nanos: nanos.rem_euclid(1_000_000_000),
        }
    }

    /// Whole seconds since the Unix epoch.
    #[must_use]
    pub const fn secs(self) -> i64 {
        self.secs
    }

    /// Sub-second part in nanoseconds.
    #[must_use]
    pub const fn nanos(self) -> u32 {
        self.nanos
    }
}

impl From<SystemTime> for Timestamp {
    fn from(value: SystemTime) -> Self {
        let moment = OffsetDateTime::from(value);
        Self {
            secs: moment.unix_timestamp(),
            nanos: moment.nanosecond(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let moment = OffsetDateTime::from_unix_timestamp(self.secs)
            .ok()
            .and_then(|base| base.replace_nanosecond(self.nanos).ok())
            .and_then(|full| full.format(&Rfc3339).ok());
        match moment {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}.{:09}", self.secs, self.nanos),
        }
    }
}

/// Directory that target names are resolved against.
#[derive(Clone, Debug)]
pub struct Workspace {
    root: Utf8PathBuf,
}

impl Workspace {
    /// Resolve names relative to `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of the file a node named `name` refers to.
    #[must_use]
    pub fn path_of(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Modification time of the file named `name`, or `None` when it is
    /// absent.
    ///
    /// Symbolic links are followed.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Stat`] when the metadata cannot be read for a
    /// reason other than the file being absent.
    pub fn modified(&self, name: &str) -> Result<Option<Timestamp>, BuildError> {
        let path = self.path_of(name);
        match path.metadata().and_then(|meta| meta.modified()) {
            Ok(time) => Ok(Some(Timestamp::from(time))),
            Err(err) if is_absent(&err) => Ok(None),
            Err(source) => Err(BuildError::Stat { path, source }),
        }
    }
}

fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
