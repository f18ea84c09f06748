//! HTTP endpoints.
//!
//! - `GET /` a short page naming the endpoints
//! - `GET /sse` the event stream of a newly registered client
//! - `POST /messages` one JSON message in, one JSON reply out

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use tower_http::cors::CorsLayer;

use crate::mcp::clients::ClientRegistry;
use crate::mcp::protocol::{parse_message, OutgoingMessage, SERVER_NAME};
use crate::mcp::server::handle_message;
use crate::mcp::tools::ToolDispatcher;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Tool dispatcher.
    pub dispatcher: Arc<ToolDispatcher>,
    /// Connected SSE clients.
    pub clients: ClientRegistry,
    /// Port the server is bound to, shown on the index page.
    pub port: u16,
}

/// Builds the router with permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/sse", get(sse))
        .route("/messages", post(messages))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let port = state.port;
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{SERVER_NAME}</title></head>\n<body>\n\
         <h1>{SERVER_NAME} {version}</h1>\n\
         <p>MCP server for Sketch design files.</p>\n<ul>\n\
         <li><code>GET http://localhost:{port}/sse</code> event stream</li>\n\
         <li><code>POST http://localhost:{port}/messages</code> ping, get_tools, execute_tool</li>\n\
         </ul>\n</body>\n</html>\n",
        version = env!("CARGO_PKG_VERSION"),
    ))
}

async fn sse(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = state
        .clients
        .subscribe()
        .map(|json| Ok(Event::default().data(json)));

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

async fn messages(State(state): State<AppState>, body: String) -> Response {
    let result = match parse_message(&body) {
        Ok(message) => handle_message(&state.dispatcher, message).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            let status = if e.is_client_error() {
                tracing::warn!(code = e.code(), error = %e, "Rejected request");
                StatusCode::BAD_REQUEST
            } else {
                tracing::error!(code = e.code(), error = %e, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(OutgoingMessage::error_message(&e))).into_response()
        }
    }
}
