//! Message server exposing Sketch documents to AI assistants.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          McpServer                           │
//! │                                                              │
//! │   ┌──────────────┐                                           │
//! │   │ HTTP (axum)  │──┐                                        │
//! │   │ / /sse       │  │   ┌────────────────┐   ┌────────────┐  │
//! │   │ /messages    │  ├──▶│ handle_message │──▶│ Dispatcher │  │
//! │   └──────────────┘  │   └────────────────┘   └────────────┘  │
//! │   ┌──────────────┐  │           │                            │
//! │   │ stdio lines  │──┘           ▼                            │
//! │   └──────────────┘   ┌────────────────────┐                  │
//! │                      │ ClientRegistry     │ SSE broadcast    │
//! │                      └────────────────────┘                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod clients;
pub mod http;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use clients::{ClientRegistry, Subscription};
pub use protocol::{parse_message, IncomingMessage, OutgoingMessage, SERVER_NAME};
pub use server::{handle_message, McpServer};
pub use tools::{ToolDispatcher, ToolOutput};
pub use transport::StdioTransport;
