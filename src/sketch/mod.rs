//! Sketch file format handling.
//!
//! A `.sketch` file is a ZIP archive of JSON parts:
//!
//! ```text
//! document.json        # Document root (required)
//! meta.json            # App/version metadata (optional)
//! pages/<id>.json      # One file per page
//! images/...           # Bitmaps (ignored)
//! previews/...         # Thumbnails (ignored)
//! ```
//!
//! - [`archive`] opens the container and returns entry text verbatim
//! - [`assembler`] turns entries into a [`SketchDocument`]
//! - [`query`] answers structural questions about any part of the tree

pub mod archive;
pub mod assembler;
pub mod error;
pub mod query;

pub use assembler::{assemble, Assembled, Assembler};
pub use error::{SketchError, SketchResult};
pub use query::{enrich, find_components, find_node_by_id, Component, EnrichedNode, Node};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the required document root entry.
pub const DOCUMENT_ENTRY: &str = "document.json";

/// Name of the optional metadata entry.
pub const META_ENTRY: &str = "meta.json";

/// Prefix shared by all page entries.
pub const PAGES_PREFIX: &str = "pages/";

/// A parsed Sketch file.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchDocument {
    /// Contents of `document.json`.
    pub document: Value,
    /// Contents of `meta.json`, or `{}` when absent.
    pub meta: Value,
    /// Contents of each `pages/*` entry, in archive order.
    pub pages: Vec<Value>,
}

impl SketchDocument {
    /// Finds a node by identifier, searching the document root first and then
    /// each page in order.
    #[must_use]
    pub fn find_node(&self, id: &str) -> Option<&Value> {
        self.roots().find_map(|root| find_node_by_id(root, id))
    }

    /// Lists every symbol master in the document root and then in each page.
    #[must_use]
    pub fn components(&self) -> Vec<Component> {
        self.roots().flat_map(find_components).collect()
    }

    fn roots(&self) -> impl Iterator<Item = &Value> {
        std::iter::once(&self.document).chain(&self.pages)
    }
}
