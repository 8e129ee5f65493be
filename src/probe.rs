use crate::layout::LibraryLayout;
use std::fmt;
use tracing::warn;

/// Where an asset currently lives in the local mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalPlacement {
    Absent,
    ActiveTree,
    DeletedTree,
}

impl fmt::Display for LocalPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalPlacement::Absent => write!(f, "absent"),
            LocalPlacement::ActiveTree => write!(f, "active"),
            LocalPlacement::DeletedTree => write!(f, "deleted"),
        }
    }
}

/// Check the filesystem (uncached) for the asset's active and deleted paths.
/// A file present in both trees counts as active.
pub fn probe(layout: &LibraryLayout, folder: &str, filename: &str) -> LocalPlacement {
    let active = layout.active_path(folder, filename);
    let deleted = layout.deleted_path(folder, filename);

    match (active.is_file(), deleted.is_file()) {
        (true, true) => {
            warn!(
                "{} exists in both {} and {}, treating as active",
                filename,
                active.display(),
                deleted.display()
            );
            LocalPlacement::ActiveTree
        }
        (true, false) => LocalPlacement::ActiveTree,
        (false, true) => LocalPlacement::DeletedTree,
        (false, false) => LocalPlacement::Absent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn place(path: &std::path::Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_probe_reports_each_state() {
        let dir = tempdir().unwrap();
        let layout = LibraryLayout::new(dir.path());

        assert_eq!(probe(&layout, "DCIM/100APPLE", "A.JPG"), LocalPlacement::Absent);

        place(&layout.active_path("DCIM/100APPLE", "A.JPG"));
        assert_eq!(probe(&layout, "DCIM/100APPLE", "A.JPG"), LocalPlacement::ActiveTree);

        place(&layout.deleted_path("DCIM/100APPLE", "B.JPG"));
        assert_eq!(probe(&layout, "DCIM/100APPLE", "B.JPG"), LocalPlacement::DeletedTree);
    }

    #[test]
    fn test_both_trees_prefer_active() {
        let dir = tempdir().unwrap();
        let layout = LibraryLayout::new(dir.path());
        place(&layout.active_path("DCIM/100APPLE", "C.JPG"));
        place(&layout.deleted_path("DCIM/100APPLE", "C.JPG"));

        assert_eq!(probe(&layout, "DCIM/100APPLE", "C.JPG"), LocalPlacement::ActiveTree);
    }

    #[test]
    fn test_directory_with_asset_name_is_not_a_placement() {
        let dir = tempdir().unwrap();
        let layout = LibraryLayout::new(dir.path());
        fs::create_dir_all(layout.active_path("DCIM/100APPLE", "D.JPG")).unwrap();

        assert_eq!(probe(&layout, "DCIM/100APPLE", "D.JPG"), LocalPlacement::Absent);
    }
}
