use super::models::{AssetRecord, AssetTime, CatalogRow};
use super::reader::group_rows;
use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use glob::Pattern;
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SNAPSHOT_PATTERN: &str = "Photos_*.sqlite";

/// Name of the album membership join table and its two foreign key columns.
/// The numeric parts (`Z_28ASSETS`, `Z_3ASSETS`, ...) change between device
/// OS releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumJoin {
    pub table: String,
    pub album_column: String,
    pub asset_column: String,
}

/// Read-only handle on a `Photos.sqlite` snapshot.
pub struct Snapshot {
    conn: Connection,
    path: PathBuf,
}

impl Snapshot {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::MalformedCatalog(format!(
                "snapshot {} does not exist",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!("Opened snapshot {}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Locate the album membership table by shape rather than by name.
    pub fn album_join(&self) -> Result<AlbumJoin> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name GLOB 'Z_[0-9]*ASSETS' \
             ORDER BY name",
        )?;
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        for table in tables {
            let mut info = self
                .conn
                .prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
            let columns: Vec<String> = info
                .query_map([], |row| row.get::<_, String>(1))?
                .collect::<rusqlite::Result<_>>()?;

            let album_column = columns.iter().find(|c| is_numbered(c, "ALBUMS"));
            let asset_column = columns.iter().find(|c| is_numbered(c, "ASSETS"));
            if let (Some(album), Some(asset)) = (album_column, asset_column) {
                debug!("Album join table {} ({}, {})", table, album, asset);
                return Ok(AlbumJoin {
                    table,
                    album_column: album.clone(),
                    asset_column: asset.clone(),
                });
            }
        }

        Err(Error::MalformedCatalog(format!(
            "no album membership table in {}",
            self.path.display()
        )))
    }

    /// One row per asset–album pair, ordered by filename.
    pub fn rows(&self) -> Result<Vec<Result<CatalogRow>>> {
        let join = self.album_join()?;
        let sql = format!(
            "SELECT a.ZDIRECTORY, a.ZFILENAME, a.ZDATECREATED, g.ZTITLE, a.ZTRASHEDSTATE \
             FROM ZASSET a \
             LEFT JOIN \"{table}\" m ON a.Z_PK = m.\"{asset}\" \
             LEFT JOIN ZGENERICALBUM g ON m.\"{album}\" = g.Z_PK \
             ORDER BY a.ZFILENAME",
            table = join.table,
            asset = join.asset_column,
            album = join.album_column,
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows: Vec<Result<CatalogRow>> = stmt
            .query_map([], |row| {
                Ok(CatalogRow {
                    folder: row.get(0)?,
                    filename: row.get(1)?,
                    created_at: row.get(2)?,
                    album_title: row.get(3)?,
                    trashed: row.get::<_, i64>(4)? != 0,
                })
            })?
            .map(|row| row.map_err(Error::from))
            .collect();
        Ok(rows)
    }

    /// Filename and creation time of every asset, ordered by filename.
    /// Only `ZASSET` is read, so album tables may be missing or unknown.
    pub fn asset_times(&self) -> Result<Vec<AssetTime>> {
        let mut stmt = self.conn.prepare(
            "SELECT ZFILENAME, ZDATECREATED FROM ZASSET ORDER BY ZFILENAME",
        )?;
        let times = stmt
            .query_map([], |row| {
                Ok(AssetTime {
                    filename: row.get(0)?,
                    created_at: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        debug!(
            "Loaded {} creation times from {}",
            times.len(),
            self.path.display()
        );
        Ok(times)
    }

    /// Every asset in the snapshot with its album memberships merged.
    pub fn assets(&self) -> Result<Vec<AssetRecord>> {
        let records = group_rows(self.rows()?)?;
        debug!(
            "Loaded {} assets from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// `Z_<digits><suffix>`
fn is_numbered(column: &str, suffix: &str) -> bool {
    column
        .strip_prefix("Z_")
        .and_then(|rest| rest.strip_suffix(suffix))
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// Open the snapshot at `path` and return its grouped assets.
pub fn load_catalog(path: &Path) -> Result<Vec<AssetRecord>> {
    Snapshot::open(path)?.assets()
}

/// Open the snapshot at `path` and return the creation time of every asset.
pub fn load_asset_times(path: &Path) -> Result<Vec<AssetTime>> {
    Snapshot::open(path)?.asset_times()
}

/// `Photos_<yyyyMMddHHmmss>.sqlite`
pub fn snapshot_file_name(at: DateTime<Local>) -> String {
    format!("Photos_{}.sqlite", at.format("%Y%m%d%H%M%S"))
}

/// The lexicographically greatest `Photos_*.sqlite` directly inside `library`.
pub fn find_newest_snapshot(library: &Path) -> Result<PathBuf> {
    let pattern = Pattern::new(SNAPSHOT_PATTERN)
        .map_err(|e| Error::MalformedCatalog(e.to_string()))?;

    let mut newest: Option<PathBuf> = None;
    let entries = match fs::read_dir(library) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::SnapshotNotFound(library.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !pattern.matches(name) {
            continue;
        }
        let path = entry.path();
        if newest.as_ref().map_or(true, |current| path > *current) {
            newest = Some(path);
        }
    }

    match newest {
        Some(path) => {
            debug!("Newest local snapshot is {}", path.display());
            Ok(path)
        }
        None => Err(Error::SnapshotNotFound(library.to_path_buf())),
    }
}
