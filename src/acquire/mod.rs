//! Acquisition of Sketch documents from the cloud or the local filesystem.
//!
//! A location string is classified once:
//!
//! - contains `sketch.cloud` → [`Location::Cloud`], fetched through [`CloudClient`]
//! - anything else → [`Location::Local`], read from disk
//!
//! The resulting bytes go through the [`Assembler`] on the blocking thread
//! pool, since staging and decompression are synchronous file work. When a
//! node is requested the found node is returned [`enrich`]ed.

pub mod cloud;
pub mod local;

pub use cloud::{CloudClient, CLOUD_HOST_MARKER, DEFAULT_API_BASE_URL};

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::sketch::{
    enrich, Assembled, Assembler, EnrichedNode, SketchDocument, SketchError, SketchResult,
};

/// Where a document comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location<'a> {
    /// A Sketch Cloud share link.
    Cloud(&'a str),
    /// A filesystem path, or a placeholder for the configured default file.
    Local(&'a str),
}

impl<'a> Location<'a> {
    /// Classifies a location string.
    #[must_use]
    pub fn classify(location: &'a str) -> Self {
        if location.contains(CLOUD_HOST_MARKER) {
            Self::Cloud(location)
        } else {
            Self::Local(location)
        }
    }
}

/// Result of [`Acquirer::acquire`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Acquired {
    /// The whole document.
    Document(SketchDocument),
    /// A single requested node with its metadata.
    Node(EnrichedNode),
}

/// Settings for [`Acquirer`].
#[derive(Debug, Clone)]
pub struct AcquireSettings {
    /// Sketch Cloud API key.
    pub api_key: Option<String>,
    /// Sketch Cloud API root.
    pub api_base_url: String,
    /// File used for locations that are not absolute paths.
    pub local_file: Option<PathBuf>,
    /// Per-request timeout for cloud calls.
    pub timeout: Option<Duration>,
}

impl Default for AcquireSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            local_file: None,
            timeout: None,
        }
    }
}

/// Fetches and assembles Sketch documents.
#[derive(Debug, Clone)]
pub struct Acquirer {
    cloud: CloudClient,
    local_file: Option<PathBuf>,
    assembler: Assembler,
}

impl Acquirer {
    /// Creates an acquirer from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: AcquireSettings) -> SketchResult<Self> {
        Ok(Self {
            cloud: CloudClient::new(settings.api_base_url, settings.api_key, settings.timeout)?,
            local_file: settings.local_file,
            assembler: Assembler::new(),
        })
    }

    /// Replaces the assembler (e.g. to stage archives elsewhere).
    #[must_use]
    pub fn with_assembler(mut self, assembler: Assembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// Acquires the document at `location`, or one node of it.
    ///
    /// # Errors
    ///
    /// Propagates every acquisition, parsing and lookup failure unchanged.
    pub async fn acquire(&self, location: &str, node_id: Option<&str>) -> SketchResult<Acquired> {
        let bytes = self.load(location).await?;
        let node_id = node_id.map(str::to_owned);

        let assembled = self
            .off_thread(move |assembler| assembler.assemble(&bytes, node_id.as_deref()))
            .await?;
        match assembled {
            Assembled::Document(document) => Ok(Acquired::Document(document)),
            Assembled::Node(node) => enrich(Some(&node)).map(Acquired::Node),
        }
    }

    /// Acquires the whole document at `location`.
    ///
    /// # Errors
    ///
    /// Propagates every acquisition and parsing failure unchanged.
    pub async fn acquire_document(&self, location: &str) -> SketchResult<SketchDocument> {
        let bytes = self.load(location).await?;
        self.off_thread(move |assembler| assembler.assemble_document(&bytes))
            .await
    }

    async fn off_thread<T, F>(&self, work: F) -> SketchResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Assembler) -> SketchResult<T> + Send + 'static,
    {
        let assembler = self.assembler.clone();
        tokio::task::spawn_blocking(move || work(&assembler))
            .await
            .map_err(|source| SketchError::AssemblyTask { source })?
    }

    async fn load(&self, location: &str) -> SketchResult<Vec<u8>> {
        match Location::classify(location) {
            Location::Cloud(url) => {
                tracing::info!(url, "Acquiring Sketch Cloud document");
                self.cloud.fetch_archive(url).await
            }
            Location::Local(path) => {
                tracing::info!(location = path, "Acquiring local Sketch file");
                local::read(path, self.local_file.as_deref()).await
            }
        }
    }
}
