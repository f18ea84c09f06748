//! Integration tests for tool dispatch against local Sketch files.

mod common;

use serde_json::{json, Value};
use sketch_context_mcp::acquire::{AcquireSettings, Acquirer};
use sketch_context_mcp::error::DispatchError;
use sketch_context_mcp::mcp::tools::{ToolDispatcher, GET_FILE, GET_SELECTION, LIST_COMPONENTS};
use sketch_context_mcp::sketch::SketchError;

use common::{document_json, page_json, sample_archive, write_file};

fn dispatcher(local_file: Option<std::path::PathBuf>) -> ToolDispatcher {
    let settings = AcquireSettings {
        local_file,
        ..AcquireSettings::default()
    };
    ToolDispatcher::new(Acquirer::new(settings).unwrap())
}

async fn run(dispatcher: &ToolDispatcher, tool: &str, params: Value) -> Value {
    let output = dispatcher.execute(tool, &params).await.unwrap();
    serde_json::to_value(output).unwrap()
}

// =============================================================================
// get_file
// =============================================================================

#[tokio::test]
async fn test_get_file_returns_whole_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "design.sketch", &sample_archive());
    let url = path.to_string_lossy();

    let result = run(&dispatcher(None), GET_FILE, json!({ "url": url })).await;

    assert_eq!(
        result,
        json!({
            "document": document_json(),
            "meta": {},
            "pages": [page_json()]
        })
    );
}

#[tokio::test]
async fn test_get_file_with_node_returns_enriched_node() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "design.sketch", &sample_archive());

    let result = run(
        &dispatcher(None),
        GET_FILE,
        json!({ "url": path.to_string_lossy(), "nodeId": "S1" }),
    )
    .await;

    assert_eq!(result["type"], "symbolMaster");
    assert_eq!(
        result["metadata"],
        json!({ "id": "S1", "name": "Btn", "class": "symbolMaster" })
    );
    assert_eq!(result["node"]["frame"]["width"], 10);
}

#[tokio::test]
async fn test_relative_location_uses_default_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "default.sketch", &sample_archive());

    let result = run(
        &dispatcher(Some(path)),
        GET_FILE,
        json!({ "url": "whatever", "nodeId": "P1" }),
    )
    .await;

    assert_eq!(result["metadata"]["id"], "P1");
}

#[tokio::test]
async fn test_missing_absolute_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.sketch");

    let err = dispatcher(None)
        .execute(GET_FILE, &json!({ "url": missing.to_string_lossy() }))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DispatchError::Sketch(SketchError::FileNotFound { .. })
    ));
    assert_eq!(err.code(), "FILE_NOT_FOUND");
}

// =============================================================================
// list_components
// =============================================================================

#[tokio::test]
async fn test_list_components() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "design.sketch", &sample_archive());

    let result = run(
        &dispatcher(None),
        LIST_COMPONENTS,
        json!({ "url": path.to_string_lossy() }),
    )
    .await;

    assert_eq!(
        result,
        json!([{
            "id": "S1",
            "name": "Btn",
            "type": "component",
            "frame": { "x": 0, "y": 0, "width": 10, "height": 10 }
        }])
    );
}

// =============================================================================
// get_selection
// =============================================================================

#[tokio::test]
async fn test_get_selection_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "design.sketch", &sample_archive());

    let result = run(
        &dispatcher(None),
        GET_SELECTION,
        json!({ "url": path.to_string_lossy(), "selectionIds": ["S1", "D1", "P1"] }),
    )
    .await;

    let ids: Vec<_> = result
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["metadata"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["S1", "D1", "P1"]);
}

#[tokio::test]
async fn test_get_selection_fails_on_missing_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "design.sketch", &sample_archive());

    let err = dispatcher(None)
        .execute(
            GET_SELECTION,
            &json!({ "url": path.to_string_lossy(), "selectionIds": ["S1", "nope"] }),
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Node with ID nope not found in the document");
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_empty_selection_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "design.sketch", &sample_archive());

    let result = run(
        &dispatcher(None),
        GET_SELECTION,
        json!({ "url": path.to_string_lossy(), "selectionIds": [] }),
    )
    .await;
    assert_eq!(result, json!([]));
}

// =============================================================================
// Unknown tools
// =============================================================================

#[tokio::test]
async fn test_unknown_tool_touches_nothing() {
    // A default file that does not exist: any acquisition attempt would
    // surface as FileNotFound instead of UnknownTool.
    let dispatcher = dispatcher(Some("/nonexistent/never.sketch".into()));

    let err = dispatcher
        .execute("rename_layer", &json!({ "url": "x" }))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Unknown tool: rename_layer");
    assert!(err.is_client_error());
}
