//! sketch-context-mcp: MCP server exposing Sketch design files to AI assistants
//!
//! Serves HTTP/SSE on a port and, with `--stdio`, also reads newline-delimited
//! JSON messages from stdin.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use sketch_context_mcp::acquire::Acquirer;
use sketch_context_mcp::config::{self, Overrides};
use sketch_context_mcp::mcp::server::McpServer;
use sketch_context_mcp::mcp::tools::ToolDispatcher;

/// MCP server for Sketch design files.
///
/// Exposes documents, symbol masters and selected layers from local `.sketch`
/// files or Sketch Cloud shares to AI assistants.
#[derive(Parser, Debug)]
#[command(name = "sketch-context-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Sketch Cloud API access token
    #[arg(long, env = "SKETCH_API_KEY", hide_env_values = true)]
    sketch_api_key: Option<String>,

    /// Port for the HTTP/SSE server
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Also read messages from stdin and write replies to stdout
    #[arg(long)]
    stdio: bool,

    /// Sketch file used when a location is not an absolute path
    #[arg(long, env = "LOCAL_SKETCH_PATH", value_name = "FILE")]
    local_file: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            sketch_api_key: self.sketch_api_key.clone(),
            port: self.port,
            local_file: self.local_file.clone(),
            stdio: self.stdio,
        }
    }
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries the line protocol.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the sketch-context-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let mut cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    cfg.apply(args.overrides());
    if let Err(e) = cfg.validate() {
        eprintln!("Configuration error: {e}");
        return ExitCode::FAILURE;
    }

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting sketch-context-mcp server"
    );
    info!(
        port = cfg.port,
        stdio = cfg.stdio,
        local_file = ?cfg.local_file,
        cloud = cfg.sketch_api_key.is_some(),
        "Configuration loaded"
    );

    let acquirer = match Acquirer::new(cfg.acquire_settings()) {
        Ok(acquirer) => acquirer,
        Err(e) => {
            error!(error = %e, "Failed to initialise document acquisition");
            return ExitCode::FAILURE;
        }
    };
    let server = McpServer::new(ToolDispatcher::new(acquirer), cfg.port, cfg.stdio);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
