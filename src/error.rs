use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("No Photos_*.sqlite snapshot found in {}", .0.display())]
    SnapshotNotFound(PathBuf),

    #[error("Catalog read error: {0}")]
    CatalogRead(#[from] rusqlite::Error),

    #[error("Malformed catalog entry: {0}")]
    MalformedCatalog(String),

    #[error("Device connection error: {0}")]
    Connection(String),

    #[error("Transfer of {remote} failed: {source}")]
    Transfer {
        remote: String,
        #[source]
        source: io::Error,
    },

    #[error("{} disappeared before it could be moved to {}", .from.display(), .to.display())]
    ConcurrentModification { from: PathBuf, to: PathBuf },

    #[error("Could not update album '{album}' entry {}: {source}", .path.display())]
    Link {
        album: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not set modified time of {}: {source}", .path.display())]
    Timestamp {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Link and timestamp failures are recorded per item; everything else
    /// stops the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Link { .. } | Error::Timestamp { .. })
    }

    /// Process exit status for a run terminated by this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Io(_) | Error::Link { .. } | Error::Timestamp { .. } => 1,
            Error::Config(_) => 2,
            Error::SnapshotNotFound(_) => 3,
            Error::CatalogRead(_) | Error::MalformedCatalog(_) => 4,
            Error::Connection(_) => 5,
            Error::Transfer { .. } => 6,
            Error::ConcurrentModification { .. } => 7,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_for_fatal_kinds() {
        let fatal = [
            Error::Io(io::Error::other("x")),
            Error::SnapshotNotFound(PathBuf::from("/lib")),
            Error::MalformedCatalog("x".into()),
            Error::Connection("x".into()),
            Error::Transfer {
                remote: "DCIM/100APPLE/IMG_0001.JPG".into(),
                source: io::Error::other("x"),
            },
            Error::ConcurrentModification {
                from: PathBuf::from("a"),
                to: PathBuf::from("b"),
            },
        ];
        let mut codes: Vec<i32> = fatal.iter().map(Error::exit_code).collect();
        assert!(fatal.iter().all(Error::is_fatal));
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), fatal.len());
        assert!(codes.iter().all(|c| *c != 0));
    }

    #[test]
    fn test_link_and_timestamp_are_recoverable() {
        let link = Error::Link {
            album: "Trip".into(),
            path: PathBuf::from("Albums/Trip/IMG_0001.JPG"),
            source: io::Error::other("cross-device link"),
        };
        let ts = Error::Timestamp {
            path: PathBuf::from("DCIM/IMG_0001.JPG"),
            source: io::Error::other("denied"),
        };
        assert!(!link.is_fatal());
        assert!(!ts.is_fatal());
    }
}
