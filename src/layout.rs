use std::path::{Path, PathBuf};

pub const ACTIVE_ROOT: &str = "DCIM";
pub const DELETED_ROOT: &str = "DCIM_deleted";
pub const ALBUMS_ROOT: &str = "Albums";

/// Paths of the local mirror rooted at the library directory.
#[derive(Debug, Clone)]
pub struct LibraryLayout {
    root: PathBuf,
}

impl LibraryLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn active_root(&self) -> PathBuf {
        self.root.join(ACTIVE_ROOT)
    }

    pub fn deleted_root(&self) -> PathBuf {
        self.root.join(DELETED_ROOT)
    }

    pub fn albums_root(&self) -> PathBuf {
        self.root.join(ALBUMS_ROOT)
    }

    /// `<library>/<folder>/<filename>`
    pub fn active_path(&self, folder: &str, filename: &str) -> PathBuf {
        let mut path = self.root.clone();
        for segment in folder_segments(folder) {
            path.push(segment);
        }
        path.push(filename);
        path
    }

    /// Same as the active path with the top-level `DCIM` segment swapped for
    /// `DCIM_deleted`. Folders outside `DCIM` are nested under `DCIM_deleted`
    /// so the two trees never overlap.
    pub fn deleted_path(&self, folder: &str, filename: &str) -> PathBuf {
        let mut path = self.root.join(DELETED_ROOT);
        let mut segments = folder_segments(folder).peekable();
        if segments.peek() == Some(&ACTIVE_ROOT) {
            segments.next();
        }
        for segment in segments {
            path.push(segment);
        }
        path.push(filename);
        path
    }

    /// `<library>/Albums/<album>/<filename>`
    pub fn album_path(&self, album: &str, filename: &str) -> PathBuf {
        self.albums_root().join(album).join(filename)
    }
}

/// Device folders are forward-slash separated; empty segments are ignored.
pub fn folder_segments(folder: &str) -> impl Iterator<Item = &str> {
    folder.split('/').filter(|s| !s.is_empty())
}
