//! Sketch Cloud API client.
//!
//! Fetching a shared document is a two-step exchange:
//!
//! 1. `GET {api}/documents/{id}` with `Authorization: Bearer <key>` returns
//!    metadata whose `shortcut.downloadUrl` is a short-lived, pre-signed link
//! 2. `GET <downloadUrl>` (no credentials) returns the `.sketch` archive

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;

use crate::sketch::error::{SketchError, SketchResult};

/// Substring identifying Sketch Cloud locations.
pub const CLOUD_HOST_MARKER: &str = "sketch.cloud";

/// Default Sketch Cloud API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.sketch.cloud/v1";

/// Shape of a share link: `https://www.sketch.cloud/s/<id>`.
const SHARE_URL_PATTERN: &str = r"sketch\.cloud/s/([a-zA-Z0-9]+)";

fn share_url_regex() -> &'static Regex {
    static SHARE_URL: OnceLock<Regex> = OnceLock::new();
    SHARE_URL.get_or_init(|| Regex::new(SHARE_URL_PATTERN).expect("share URL pattern is valid"))
}

/// Extracts the document identifier from a share link.
#[must_use]
pub fn extract_document_id(url: &str) -> Option<&str> {
    share_url_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Client for the Sketch Cloud document API.
#[derive(Debug, Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    api_base_url: String,
    api_key: Option<String>,
}

impl CloudClient {
    /// Creates a client against `api_base_url`.
    ///
    /// `timeout` bounds each request; `None` waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> SketchResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Whether an API key is configured.
    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Downloads the archive behind a share link.
    ///
    /// # Errors
    ///
    /// - [`SketchError::InvalidUrl`] if no document id can be extracted
    /// - [`SketchError::MissingCredential`] if no API key is configured
    ///   (checked before any request is sent)
    /// - [`SketchError::RemoteFetch`] / [`SketchError::RemoteDownload`] on
    ///   non-success statuses
    /// - [`SketchError::MalformedMetadata`] if the metadata has no download URL
    pub async fn fetch_archive(&self, url: &str) -> SketchResult<Vec<u8>> {
        let document_id = extract_document_id(url).ok_or_else(|| SketchError::InvalidUrl {
            url: url.to_string(),
        })?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SketchError::MissingCredential)?;

        let download_url = self.fetch_download_url(document_id, api_key).await?;

        tracing::debug!(document_id, "Downloading Sketch Cloud archive");

        let response = self.http.get(&download_url).send().await?;
        if !response.status().is_success() {
            return Err(SketchError::RemoteDownload {
                status: status_text(response.status()),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn fetch_download_url(&self, document_id: &str, api_key: &str) -> SketchResult<String> {
        let endpoint = format!("{}/documents/{document_id}", self.api_base_url);

        tracing::debug!(document_id, "Fetching Sketch Cloud document metadata");

        let response = self
            .http
            .get(&endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SketchError::RemoteFetch {
                status: status_text(response.status()),
            });
        }

        let metadata: Value = response.json().await?;
        metadata
            .pointer("/shortcut/downloadUrl")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SketchError::MalformedMetadata {
                message: "missing shortcut.downloadUrl".to_string(),
            })
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), str::to_string)
}
