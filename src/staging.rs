use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// Suffix of in-flight files. A run that dies mid-write leaves only these
/// behind, never a truncated file under the final name.
pub const STAGING_SUFFIX: &str = ".part";

/// Open a hidden temporary file next to `target` so it can be renamed into
/// place on the same filesystem.
pub fn stage_next_to(target: &Path) -> io::Result<NamedTempFile> {
    let parent = target
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    fs::create_dir_all(parent)?;
    let prefix = match target.file_name() {
        Some(name) => format!(".{}.", name.to_string_lossy()),
        None => ".".to_string(),
    };
    Builder::new()
        .prefix(&prefix)
        .suffix(STAGING_SUFFIX)
        .tempfile_in(parent)
}

/// Write `bytes` to `target` through a staged file; `target` only ever
/// appears complete.
pub fn write_staged(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut staged = stage_next_to(target)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged.persist(target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(STAGING_SUFFIX))
            .collect()
    }

    #[test]
    fn test_write_creates_parents_and_leaves_no_part_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("DCIM/100APPLE/IMG_0001.JPG");

        write_staged(&target, b"jpeg bytes").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"jpeg bytes");
        assert!(leftovers(target.parent().unwrap()).is_empty());
    }

    #[test]
    fn test_failed_persist_leaves_target_untouched() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("IMG_0002.JPG");
        // A directory under the final name makes the rename fail.
        fs::create_dir(&target).unwrap();

        assert!(write_staged(&target, b"jpeg bytes").is_err());
        assert!(target.is_dir());
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn test_staged_name_is_hidden_and_distinct() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("IMG_0003.MOV");
        let staged = stage_next_to(&target).unwrap();

        let name = staged.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".IMG_0003.MOV."));
        assert!(name.ends_with(STAGING_SUFFIX));
        assert_eq!(staged.path().parent(), target.parent());
    }
}
