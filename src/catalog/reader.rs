use super::models::{AssetRecord, CatalogRow};
use crate::error::{Error, Result};
use crate::layout::{folder_segments, ALBUMS_ROOT, DELETED_ROOT};
use std::collections::BTreeSet;
use std::iter::Peekable;
use std::path::{Component, Path};

/// Merges consecutive rows sharing a filename into one [`AssetRecord`].
///
/// Rows must arrive ordered by filename. Folder, timestamp and trashed flag
/// come from the first row of each run; album titles are unioned.
pub struct GroupedAssets<I: Iterator<Item = Result<CatalogRow>>> {
    rows: Peekable<I>,
}

impl<I: Iterator<Item = Result<CatalogRow>>> GroupedAssets<I> {
    pub fn new(rows: I) -> Self {
        Self {
            rows: rows.peekable(),
        }
    }
}

impl<I: Iterator<Item = Result<CatalogRow>>> Iterator for GroupedAssets<I> {
    type Item = Result<AssetRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.rows.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e)),
        };
        if let Err(e) = validate_row(&first) {
            return Some(Err(e));
        }

        let mut albums = BTreeSet::new();
        add_album(&mut albums, first.album_title);

        while let Some(Ok(next)) = self.rows.peek() {
            if next.filename != first.filename {
                break;
            }
            if let Some(Ok(row)) = self.rows.next() {
                add_album(&mut albums, row.album_title);
            }
        }

        Some(Ok(AssetRecord {
            folder: first.folder,
            filename: first.filename,
            created_at: first.created_at,
            trashed: first.trashed,
            albums,
        }))
    }
}

/// Group already-sorted rows; stops at the first error.
pub fn group_rows<I>(rows: I) -> Result<Vec<AssetRecord>>
where
    I: IntoIterator<Item = Result<CatalogRow>>,
{
    GroupedAssets::new(rows.into_iter()).collect()
}

fn add_album(albums: &mut BTreeSet<String>, title: Option<String>) {
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        albums.insert(title);
    }
}

/// Rejects rows whose folder or filename would resolve outside the library.
fn validate_row(row: &CatalogRow) -> Result<()> {
    let filename = Path::new(&row.filename);
    let mut components = filename.components();
    let single_name = matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none();
    if !single_name {
        return Err(Error::MalformedCatalog(format!(
            "filename '{}' is not a plain file name",
            row.filename
        )));
    }

    if row.folder.starts_with('/') || row.folder.contains('\\') {
        return Err(Error::MalformedCatalog(format!(
            "folder '{}' of {} is not device-relative",
            row.folder, row.filename
        )));
    }
    if row
        .folder
        .split('/')
        .any(|segment| segment == ".." || segment == ".")
    {
        return Err(Error::MalformedCatalog(format!(
            "folder '{}' of {} escapes the library",
            row.folder, row.filename
        )));
    }
    if matches!(
        folder_segments(&row.folder).next(),
        Some(DELETED_ROOT) | Some(ALBUMS_ROOT)
    ) {
        return Err(Error::MalformedCatalog(format!(
            "folder '{}' of {} would land in a tree the mirror manages",
            row.folder, row.filename
        )));
    }
    Ok(())
}
