//! Tool catalog and dispatch.
//!
//! The dispatcher maps tool names to document acquisition and tree queries.
//! It knows nothing about the transport that invoked it and performs no error
//! recovery: failures are returned as-is for the transport to wrap.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::acquire::{Acquired, Acquirer};
use crate::error::DispatchError;
use crate::sketch::{enrich, Component, EnrichedNode, SketchError};

/// Tool: fetch a document or one node of it.
pub const GET_FILE: &str = "get_file";

/// Tool: list symbol masters.
pub const LIST_COMPONENTS: &str = "list_components";

/// Tool: resolve a set of selected layer ids.
pub const GET_SELECTION: &str = "get_selection";

/// A tool definition for the `get_tools` response.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub parameters: Value,
}

/// Returns the fixed tool catalog.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: GET_FILE.to_string(),
            description: "Get the contents of a Sketch file".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "URL to a Sketch file or Sketch Cloud document"
                    },
                    "nodeId": {
                        "type": "string",
                        "description": "Optional. ID of a specific node within the document to retrieve"
                    }
                },
                "required": ["url"]
            }),
        },
        ToolDefinition {
            name: LIST_COMPONENTS.to_string(),
            description: "List all components in a Sketch file".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "URL to a Sketch file or Sketch Cloud document"
                    }
                },
                "required": ["url"]
            }),
        },
        ToolDefinition {
            name: GET_SELECTION.to_string(),
            description: "Get information about selected elements in a Sketch document"
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "URL to the Sketch document"
                    },
                    "selectionIds": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Array of selected element IDs"
                    }
                },
                "required": ["url", "selectionIds"]
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetFileParams {
    url: String,
    #[serde(default)]
    node_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListComponentsParams {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetSelectionParams {
    url: String,
    selection_ids: Vec<String>,
}

/// Result of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    /// `get_file`: the document, or the enriched node.
    File(Acquired),
    /// `list_components`: every symbol master.
    Components(Vec<Component>),
    /// `get_selection`: one enriched node per requested id.
    Selection(Vec<EnrichedNode>),
}

/// Transport-independent tool dispatcher.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    acquirer: Acquirer,
}

impl ToolDispatcher {
    /// Creates a dispatcher over `acquirer`.
    #[must_use]
    pub const fn new(acquirer: Acquirer) -> Self {
        Self { acquirer }
    }

    /// Whether `name` is in the catalog.
    #[must_use]
    pub fn is_known(name: &str) -> bool {
        [GET_FILE, LIST_COMPONENTS, GET_SELECTION].contains(&name)
    }

    /// Executes `tool` with `params`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownTool`] before anything is acquired
    /// - [`DispatchError::InvalidParams`] if `params` do not fit the tool
    /// - [`DispatchError::Sketch`] for acquisition and query failures
    pub async fn execute(&self, tool: &str, params: &Value) -> Result<ToolOutput, DispatchError> {
        tracing::debug!(tool, "Executing tool");

        match tool {
            GET_FILE => {
                let p: GetFileParams = parse_params(tool, params)?;
                self.get_file(&p.url, p.node_id.as_deref())
                    .await
                    .map(ToolOutput::File)
            }
            LIST_COMPONENTS => {
                let p: ListComponentsParams = parse_params(tool, params)?;
                self.list_components(&p.url)
                    .await
                    .map(ToolOutput::Components)
            }
            GET_SELECTION => {
                let p: GetSelectionParams = parse_params(tool, params)?;
                self.get_selection(&p.url, &p.selection_ids)
                    .await
                    .map(ToolOutput::Selection)
            }
            _ => Err(DispatchError::UnknownTool {
                name: tool.to_string(),
            }),
        }
    }

    /// Returns the whole document, or the enriched node `node_id`.
    ///
    /// # Errors
    ///
    /// Propagates acquisition and lookup failures.
    pub async fn get_file(
        &self,
        url: &str,
        node_id: Option<&str>,
    ) -> Result<Acquired, DispatchError> {
        Ok(self.acquirer.acquire(url, node_id).await?)
    }

    /// Lists the symbol masters of the document root and every page.
    ///
    /// # Errors
    ///
    /// Propagates acquisition failures.
    pub async fn list_components(&self, url: &str) -> Result<Vec<Component>, DispatchError> {
        let document = self.acquirer.acquire_document(url).await?;
        let components = document.components();

        tracing::info!(count = components.len(), "Listed components");
        Ok(components)
    }

    /// Resolves every id in `selection_ids` against one acquisition of the
    /// document, preserving request order.
    ///
    /// # Errors
    ///
    /// Fails with [`SketchError::NodeNotFound`] on the first id that matches
    /// nothing.
    pub async fn get_selection(
        &self,
        url: &str,
        selection_ids: &[String],
    ) -> Result<Vec<EnrichedNode>, DispatchError> {
        let document = self.acquirer.acquire_document(url).await?;

        let selection = selection_ids
            .iter()
            .map(|id| {
                let node = document
                    .find_node(id)
                    .ok_or_else(|| SketchError::node_not_found(id))?;
                enrich(Some(node))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(selection)
    }
}

fn parse_params<T: DeserializeOwned>(tool: &str, params: &Value) -> Result<T, DispatchError> {
    T::deserialize(params).map_err(|e| DispatchError::InvalidParams {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}
