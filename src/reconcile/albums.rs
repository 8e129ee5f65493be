use crate::error::{Error, Result};
use crate::layout::LibraryLayout;
use crate::staging;
use filetime::FileTime;
use glob::Pattern;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// How album entries are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    HardLink,
    Copy,
}

impl LinkMode {
    pub fn from_hard_links(hard_links: bool) -> Self {
        if hard_links {
            LinkMode::HardLink
        } else {
            LinkMode::Copy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumChange {
    Added { album: String, path: PathBuf },
    Removed { album: String, path: PathBuf },
}

impl fmt::Display for AlbumChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlbumChange::Added { album, path } => {
                write!(f, "added to album '{}' ({})", album, path.display())
            }
            AlbumChange::Removed { album, path } => {
                write!(f, "removed from album '{}' ({})", album, path.display())
            }
        }
    }
}

/// Changes applied for one asset plus the per-album failures.
#[derive(Debug, Default)]
pub struct AlbumOutcome {
    pub changes: Vec<AlbumChange>,
    pub failures: Vec<Error>,
}

/// Sole writer of the `Albums` tree.
///
/// Current membership is discovered by filename from one walk of the album
/// tree at startup; the index is then kept in step with every change made
/// through this linker.
pub struct AlbumLinker<'a> {
    layout: &'a LibraryLayout,
    mode: LinkMode,
    entries: HashMap<String, Vec<PathBuf>>,
}

impl<'a> AlbumLinker<'a> {
    pub fn open(layout: &'a LibraryLayout, mode: LinkMode, ignore: &[Pattern]) -> Result<Self> {
        let entries = index_files(&layout.albums_root(), ignore)?;
        debug!(
            "Indexed {} distinct file names under {}",
            entries.len(),
            layout.albums_root().display()
        );
        Ok(Self {
            layout,
            mode,
            entries,
        })
    }

    /// Albums currently holding `filename`, keyed by album directory name.
    pub fn current_albums(&self, filename: &str) -> BTreeMap<String, Vec<PathBuf>> {
        let mut albums: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for path in self.entries.get(filename).into_iter().flatten() {
            if let Some(album) = album_of(path) {
                albums.entry(album).or_default().push(path.clone());
            }
        }
        albums
    }

    /// Make the set of albums containing `filename` equal `desired`.
    /// Additions run before removals; a failure for one album never stops
    /// the others.
    pub fn reconcile(
        &mut self,
        filename: &str,
        desired: &BTreeSet<String>,
        source: &Path,
    ) -> AlbumOutcome {
        let current = self.current_albums(filename);
        let mut outcome = AlbumOutcome::default();

        for album in desired.iter().filter(|a| !current.contains_key(*a)) {
            match self.add(album, filename, source) {
                Ok(Some(path)) => outcome.changes.push(AlbumChange::Added {
                    album: album.clone(),
                    path,
                }),
                Ok(None) => {}
                Err(e) => {
                    warn!("{}", e);
                    outcome.failures.push(e);
                }
            }
        }

        for (album, paths) in current.into_iter().filter(|(a, _)| !desired.contains(a)) {
            for path in paths {
                match self.remove(&album, filename, &path) {
                    Ok(()) => outcome.changes.push(AlbumChange::Removed {
                        album: album.clone(),
                        path,
                    }),
                    Err(e) => {
                        warn!("{}", e);
                        outcome.failures.push(e);
                    }
                }
            }
        }

        outcome
    }

    /// Returns the new entry's path, or `None` if one was already there.
    fn add(&mut self, album: &str, filename: &str, source: &Path) -> Result<Option<PathBuf>> {
        let target = self.layout.album_path(album, filename);
        let link_error = |path: &Path, source: io::Error| Error::Link {
            album: album.to_string(),
            path: path.to_path_buf(),
            source,
        };

        if !is_plain_name(album) {
            return Err(link_error(
                &target,
                io::Error::new(io::ErrorKind::InvalidInput, "album title is not a valid directory name"),
            ));
        }

        if target.symlink_metadata().is_ok() {
            self.track(filename, target);
            return Ok(None);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| link_error(parent, e))?;
        }

        let created = match self.mode {
            LinkMode::HardLink => fs::hard_link(source, &target),
            LinkMode::Copy => copy_preserving_mtime(source, &target),
        };
        created.map_err(|e| link_error(&target, e))?;

        self.track(filename, target.clone());
        Ok(Some(target))
    }

    fn remove(&mut self, album: &str, filename: &str, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::Link {
                    album: album.to_string(),
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        }
        if let Some(paths) = self.entries.get_mut(filename) {
            paths.retain(|p| p != path);
        }
        Ok(())
    }

    fn track(&mut self, filename: &str, path: PathBuf) {
        let paths = self.entries.entry(filename.to_string()).or_default();
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
}

/// Walk `root` and group every regular file by its file name.
/// A missing root yields an empty index.
pub fn index_files(root: &Path, ignore: &[Pattern]) -> Result<HashMap<String, Vec<PathBuf>>> {
    let mut entries: HashMap<String, Vec<PathBuf>> = HashMap::new();
    if !root.is_dir() {
        return Ok(entries);
    }

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                if e.io_error().map(io::Error::kind) == Some(io::ErrorKind::PermissionDenied) {
                    warn!("Access denied while walking {}: {}", root.display(), e);
                    continue;
                }
                return Err(Error::Io(io::Error::other(e)));
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if ignore.iter().any(|p| p.matches_path(entry.path())) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            entries
                .entry(name.to_string())
                .or_default()
                .push(entry.into_path());
        }
    }

    Ok(entries)
}

fn album_of(path: &Path) -> Option<String> {
    path.parent()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
}

/// Copy through a staged file so an interrupted copy is never mistaken for an
/// existing album entry.
fn copy_preserving_mtime(source: &Path, target: &Path) -> io::Result<()> {
    let staged = staging::stage_next_to(target)?;
    fs::copy(source, staged.path())?;
    let metadata = fs::metadata(source)?;
    filetime::set_file_mtime(staged.path(), FileTime::from_last_modification_time(&metadata))?;
    staged.persist(target)?;
    Ok(())
}
