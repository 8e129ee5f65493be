use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use filetime::FileTime;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use tracing::trace;

/// 2001-01-01T00:00:00Z as a Unix timestamp.
pub const DEVICE_EPOCH_UNIX_SECS: i64 = 978_307_200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampOutcome {
    Updated,
    Unchanged,
    ReadOnly,
}

impl fmt::Display for TimestampOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampOutcome::Updated => write!(f, "updated"),
            TimestampOutcome::Unchanged => write!(f, "unchanged"),
            TimestampOutcome::ReadOnly => write!(f, "read-only"),
        }
    }
}

/// Convert device seconds-since-2001 to an absolute UTC time.
pub fn device_time(epoch_seconds: f64) -> Option<DateTime<Utc>> {
    if !epoch_seconds.is_finite() {
        return None;
    }
    let whole = epoch_seconds.floor();
    let nanos = ((epoch_seconds - whole) * 1e9).round() as i64;
    let secs = DEVICE_EPOCH_UNIX_SECS.checked_add(whole as i64)?;
    let base = DateTime::<Utc>::from_timestamp(secs, 0)?;
    base.checked_add_signed(Duration::nanoseconds(nanos))
}

/// Set the modified time of `path` to the device creation time.
///
/// Read-only files and files already carrying the target time are left
/// untouched, so repeated calls converge.
pub fn adjust(path: &Path, epoch_seconds: f64) -> Result<TimestampOutcome> {
    let when = device_time(epoch_seconds).ok_or_else(|| Error::Timestamp {
        path: path.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("creation time {} is out of range", epoch_seconds),
        ),
    })?;
    let target = FileTime::from_unix_time(when.timestamp(), when.timestamp_subsec_nanos());

    let metadata = fs::metadata(path).map_err(|source| Error::Timestamp {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.permissions().readonly() {
        trace!("{} is read-only, leaving modified time", path.display());
        return Ok(TimestampOutcome::ReadOnly);
    }

    if FileTime::from_last_modification_time(&metadata) == target {
        return Ok(TimestampOutcome::Unchanged);
    }

    filetime::set_file_mtime(path, target).map_err(|source| Error::Timestamp {
        path: path.to_path_buf(),
        source,
    })?;
    trace!("Set modified time of {} to {}", path.display(), when.to_rfc3339());
    Ok(TimestampOutcome::Updated)
}
