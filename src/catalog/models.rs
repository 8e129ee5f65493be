use std::collections::BTreeSet;

/// One row of the snapshot query: an asset paired with at most one album.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub folder: String,
    pub filename: String,
    pub created_at: f64,
    pub album_title: Option<String>,
    pub trashed: bool,
}

/// A photo or video with all of its album memberships merged.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    /// Device-relative directory, forward-slash separated.
    pub folder: String,
    pub filename: String,
    /// Seconds since 2001-01-01T00:00:00Z.
    pub created_at: f64,
    pub trashed: bool,
    pub albums: BTreeSet<String>,
}

impl AssetRecord {
    pub fn remote_path(&self) -> String {
        format!("{}/{}", self.folder.trim_end_matches('/'), self.filename)
    }
}

/// Creation time of one asset, all the date pass needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetTime {
    pub filename: String,
    /// Seconds since 2001-01-01T00:00:00Z.
    pub created_at: f64,
}
