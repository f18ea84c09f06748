//! sketch-context-mcp: MCP server exposing Sketch design files to AI assistants
//!
//! A `.sketch` file is a ZIP archive of JSON entries. This library reads the
//! archive, assembles it into one document model, and answers structural
//! queries over the layer tree.
//!
//! # Architecture
//!
//! - **Acquisition**: fetch archive bytes from Sketch Cloud or the local disk
//! - **Assembly**: stage the bytes, read `document.json`, `meta.json` and
//!   every `pages/*` entry into a [`sketch::SketchDocument`]
//! - **Queries**: node lookup by id, symbol master listing, node enrichment
//! - **Transports**: HTTP/SSE and a newline-delimited stdio protocol
//!
//! # Modules
//!
//! - [`acquire`] — Cloud and local document acquisition
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Configuration and dispatch error types
//! - [`mcp`] — Message protocol, tool dispatch and transports
//! - [`sketch`] — Archive reading, document assembly and tree queries

pub mod acquire;
pub mod config;
pub mod error;
pub mod mcp;
pub mod sketch;
