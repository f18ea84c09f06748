//! Builds a [`SketchDocument`] from archive bytes.
//!
//! The bytes are staged in a temporary `.sketch` file for the duration of one
//! call. The file is owned by a [`NamedTempFile`] guard and removed when the
//! call returns, whether it succeeds or fails.

use std::io::Write;
use std::path::PathBuf;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::sketch::archive::{self, ArchiveEntry};
use crate::sketch::error::{SketchError, SketchResult};
use crate::sketch::{SketchDocument, DOCUMENT_ENTRY, META_ENTRY, PAGES_PREFIX};

/// Outcome of [`Assembler::assemble`].
#[derive(Debug, Clone, PartialEq)]
pub enum Assembled {
    /// The whole document, when no node was requested.
    Document(SketchDocument),
    /// The requested node, unwrapped.
    Node(Value),
}

/// Turns `.sketch` bytes into a document model.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    /// Directory for staged archives; the system temp dir when `None`.
    staging_dir: Option<PathBuf>,
}

impl Assembler {
    /// Creates an assembler that stages into the system temp dir.
    #[must_use]
    pub const fn new() -> Self {
        Self { staging_dir: None }
    }

    /// Stages archives into `dir` instead of the system temp dir.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Parses `bytes` and returns either the document or the node with
    /// identifier `node_id`.
    ///
    /// Node lookup searches `document.json` first, then each page in archive
    /// order, and returns the first match.
    ///
    /// # Errors
    ///
    /// - [`SketchError::Staging`] if the temporary file cannot be written
    /// - [`SketchError::ArchiveFormat`] if the bytes are not an archive
    /// - [`SketchError::InvalidDocument`] if `document.json` is missing
    /// - [`SketchError::InvalidJson`] if a part is not valid JSON
    /// - [`SketchError::NodeNotFound`] if `node_id` matches nothing
    pub fn assemble(&self, bytes: &[u8], node_id: Option<&str>) -> SketchResult<Assembled> {
        let document = self.assemble_document(bytes)?;

        match node_id {
            Some(id) => document
                .find_node(id)
                .cloned()
                .map(Assembled::Node)
                .ok_or_else(|| SketchError::node_not_found(id)),
            None => Ok(Assembled::Document(document)),
        }
    }

    /// Parses `bytes` into the full document model.
    ///
    /// # Errors
    ///
    /// Same as [`Assembler::assemble`], minus node lookup.
    pub fn assemble_document(&self, bytes: &[u8]) -> SketchResult<SketchDocument> {
        let staged = self.stage(bytes)?;
        let file = staged
            .reopen()
            .map_err(|source| SketchError::Staging { source })?;
        let entries = archive::read_from(file)?;

        let document = build_document(&entries)?;

        tracing::debug!(
            entries = entries.len(),
            pages = document.pages.len(),
            "Assembled Sketch document"
        );

        Ok(document)
    }

    fn stage(&self, bytes: &[u8]) -> SketchResult<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("sketch-").suffix(".sketch");

        let mut staged = match &self.staging_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|source| SketchError::Staging { source })?;

        staged
            .write_all(bytes)
            .and_then(|()| staged.flush())
            .map_err(|source| SketchError::Staging { source })?;

        Ok(staged)
    }
}

/// Assembles with a default [`Assembler`].
///
/// # Errors
///
/// See [`Assembler::assemble`].
pub fn assemble(bytes: &[u8], node_id: Option<&str>) -> SketchResult<Assembled> {
    Assembler::new().assemble(bytes, node_id)
}

fn build_document(entries: &[ArchiveEntry]) -> SketchResult<SketchDocument> {
    let document_entry = entries
        .iter()
        .find(|e| e.name == DOCUMENT_ENTRY)
        .ok_or_else(|| SketchError::invalid_document("document.json not found"))?;
    let document = parse_entry(document_entry)?;

    let meta = entries
        .iter()
        .find(|e| e.name == META_ENTRY)
        .map_or_else(|| Ok(Value::Object(Map::new())), parse_entry)?;

    let pages = entries
        .iter()
        .filter(|e| e.name.starts_with(PAGES_PREFIX))
        .map(parse_entry)
        .collect::<SketchResult<Vec<_>>>()?;

    Ok(SketchDocument {
        document,
        meta,
        pages,
    })
}

fn parse_entry(entry: &ArchiveEntry) -> SketchResult<Value> {
    serde_json::from_str(entry.text()?).map_err(|source| SketchError::InvalidJson {
        entry: entry.name.clone(),
        source,
    })
}
