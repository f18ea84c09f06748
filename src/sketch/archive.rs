//! Thin adapter over the `zip` crate.
//!
//! Returns entry names and their raw bytes; callers decide which entries to
//! decode. Bitmaps under `images/` and `previews/` are never decoded.

use std::io::{Cursor, Read, Seek};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::sketch::error::{SketchError, SketchResult};

/// A file entry of a Sketch archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry path inside the archive (e.g. `pages/ABC.json`).
    pub name: String,
    /// Entry contents, undecoded.
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    /// The contents decoded as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::ArchiveFormat`] if the contents are not UTF-8.
    pub fn text(&self) -> SketchResult<&str> {
        std::str::from_utf8(&self.data).map_err(|e| {
            SketchError::archive_format(format!("{} is not UTF-8 text: {e}", self.name))
        })
    }
}

/// Reads every file entry from an in-memory archive, in listing order.
///
/// # Errors
///
/// Returns [`SketchError::ArchiveFormat`] if the bytes are not a valid archive.
pub fn read(bytes: &[u8]) -> SketchResult<Vec<ArchiveEntry>> {
    read_from(Cursor::new(bytes))
}

/// Reads every file entry from a seekable source, in listing order.
///
/// Directory entries are skipped.
///
/// # Errors
///
/// Returns [`SketchError::ArchiveFormat`] if the source is not a valid archive
/// or an entry cannot be decompressed.
pub fn read_from<R: Read + Seek>(reader: R) -> SketchResult<Vec<ArchiveEntry>> {
    let mut archive = open(reader)?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| SketchError::archive_format(e.to_string()))?;

        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| SketchError::archive_format(format!("cannot read {name}: {e}")))?;

        entries.push(ArchiveEntry { name, data });
    }

    Ok(entries)
}

/// Reads a single named entry from an in-memory archive.
///
/// # Errors
///
/// Returns [`SketchError::EntryNotFound`] if the entry is absent, or
/// [`SketchError::ArchiveFormat`] if the archive is unreadable.
pub fn read_one(bytes: &[u8], name: &str) -> SketchResult<String> {
    let mut archive = open(Cursor::new(bytes))?;
    let mut file = archive.by_name(name).map_err(|e| match e {
        ZipError::FileNotFound => SketchError::entry_not_found(name),
        other => SketchError::archive_format(other.to_string()),
    })?;

    let mut text = String::new();
    file.read_to_string(&mut text)
        .map_err(|e| SketchError::archive_format(format!("cannot read {name}: {e}")))?;
    Ok(text)
}

fn open<R: Read + Seek>(reader: R) -> SketchResult<ZipArchive<R>> {
    ZipArchive::new(reader).map_err(|e| SketchError::archive_format(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;

    fn build(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, text) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(text.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn reads_entries_in_listing_order() {
        let bytes = build(&[("document.json", "{}"), ("pages/a.json", "[1]")]);
        let entries = read(&bytes).unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["document.json", "pages/a.json"]);
        assert_eq!(entries[1].text().unwrap(), "[1]");
    }

    #[test]
    fn binary_entries_are_kept_undecoded() {
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("previews/preview.png", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(&png).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let entries = read(&bytes).unwrap();
        assert_eq!(entries[0].data, png);
        assert!(matches!(
            entries[0].text().unwrap_err(),
            SketchError::ArchiveFormat { .. }
        ));
    }

    #[test]
    fn skips_directory_entries() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .add_directory("pages/", SimpleFileOptions::default())
            .unwrap();
        writer
            .start_file("pages/p.json", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"{}").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let entries = read(&bytes).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "pages/p.json");
    }

    #[test]
    fn rejects_non_archive_bytes() {
        let err = read(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, SketchError::ArchiveFormat { .. }));
    }

    #[test]
    fn read_one_returns_text_verbatim() {
        let bytes = build(&[("meta.json", "{ \"app\": \"sketch\" }")]);
        assert_eq!(
            read_one(&bytes, "meta.json").unwrap(),
            "{ \"app\": \"sketch\" }"
        );
    }

    #[test]
    fn read_one_reports_missing_entry() {
        let bytes = build(&[("meta.json", "{}")]);
        let err = read_one(&bytes, "document.json").unwrap_err();
        assert!(matches!(err, SketchError::EntryNotFound { ref name } if name == "document.json"));
    }
}
