#![allow(dead_code)]

use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};

/// An asset as it appears on the fake device and in the fake snapshot.
pub struct Asset {
    pub folder: &'static str,
    pub filename: &'static str,
    pub created_at: f64,
    pub trashed: bool,
    pub albums: Vec<&'static str>,
}

impl Asset {
    pub fn new(folder: &'static str, filename: &'static str) -> Self {
        Self {
            folder,
            filename,
            created_at: 694_224_000.0,
            trashed: false,
            albums: Vec::new(),
        }
    }

    pub fn trashed(mut self, trashed: bool) -> Self {
        self.trashed = trashed;
        self
    }

    pub fn in_albums(mut self, albums: &[&'static str]) -> Self {
        self.albums = albums.to_vec();
        self
    }
}

/// Write a snapshot database with the device's catalog table layout.
/// `join` picks the numbered membership table, e.g. `(28, 3)` for
/// `Z_28ASSETS(Z_28ALBUMS, Z_3ASSETS)`.
pub fn write_snapshot(path: &Path, assets: &[Asset], join: (u32, u32)) {
    let _ = fs::remove_file(path);
    let conn = Connection::open(path).unwrap();
    let table = format!("Z_{}ASSETS", join.0);
    let album_col = format!("Z_{}ALBUMS", join.0);
    let asset_col = format!("Z_{}ASSETS", join.1);
    conn.execute_batch(&format!(
        "CREATE TABLE ZASSET (
             Z_PK INTEGER PRIMARY KEY,
             ZDIRECTORY VARCHAR,
             ZFILENAME VARCHAR,
             ZDATECREATED TIMESTAMP,
             ZTRASHEDSTATE INTEGER
         );
         CREATE TABLE ZGENERICALBUM (
             Z_PK INTEGER PRIMARY KEY,
             ZTITLE VARCHAR
         );
         CREATE TABLE {table} (
             {album_col} INTEGER,
             {asset_col} INTEGER,
             PRIMARY KEY ({album_col}, {asset_col})
         );"
    ))
    .unwrap();

    let mut titles: Vec<&str> = assets.iter().flat_map(|a| a.albums.iter().copied()).collect();
    titles.sort();
    titles.dedup();
    for (i, title) in titles.iter().enumerate() {
        conn.execute(
            "INSERT INTO ZGENERICALBUM (Z_PK, ZTITLE) VALUES (?1, ?2)",
            params![i as i64 + 1, title],
        )
        .unwrap();
    }

    for (i, asset) in assets.iter().enumerate() {
        let pk = i as i64 + 1;
        conn.execute(
            "INSERT INTO ZASSET (Z_PK, ZDIRECTORY, ZFILENAME, ZDATECREATED, ZTRASHEDSTATE) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![pk, asset.folder, asset.filename, asset.created_at, asset.trashed as i64],
        )
        .unwrap();
        for album in &asset.albums {
            let album_pk = titles.iter().position(|t| t == album).unwrap() as i64 + 1;
            conn.execute(
                &format!("INSERT INTO {table} ({album_col}, {asset_col}) VALUES (?1, ?2)"),
                params![album_pk, pk],
            )
            .unwrap();
        }
    }
}

/// Lay out the assets' bytes under a fake device mount point.
pub fn populate_device(root: &Path, assets: &[Asset]) {
    fs::create_dir_all(root.join("DCIM")).unwrap();
    for asset in assets {
        let dir = root.join(asset.folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(asset.filename), content_of(asset.filename)).unwrap();
    }
}

pub fn content_of(filename: &str) -> Vec<u8> {
    format!("bytes of {}", filename).into_bytes()
}

/// Every regular file under `root`, relative to it, sorted.
pub fn tree(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}
