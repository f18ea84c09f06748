//! stdio transport for the line protocol.
//!
//! - Messages are UTF-8 encoded JSON objects
//! - Messages are delimited by newlines
//! - Messages must not contain embedded newlines
//! - stdin: receives messages from the client
//! - stdout: sends replies to the client
//! - stderr: logging only

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};

use crate::mcp::protocol::OutgoingMessage;

/// A line transport, over stdin/stdout unless built with [`StdioTransport::with_io`].
pub struct StdioTransport<R = tokio::io::Stdin, W = tokio::io::Stdout> {
    /// Line reader over the input.
    lines: Lines<BufReader<R>>,
    /// Output handle.
    writer: W,
}

impl StdioTransport {
    /// Creates a new stdio transport.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a transport over arbitrary byte streams.
    #[must_use]
    pub fn with_io(reader: R, writer: W) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    /// Reads the next message line, without its `\n` or `\r\n` terminator.
    ///
    /// Returns `None` if the input is closed (EOF). Cancellation safe: a
    /// line interrupted mid-read is completed by the next call.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the line is not UTF-8.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }

    /// Writes a reply as one newline-terminated line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_message(&mut self, message: &OutgoingMessage) -> io::Result<()> {
        let json = encode_line(message)?;
        self.write_raw(&json).await
    }

    async fn write_raw(&mut self, json: &str) -> io::Result<()> {
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_line(message: &OutgoingMessage) -> io::Result<String> {
    serde_json::to_string(message).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;

    #[test]
    fn transport_default() {
        let _transport: StdioTransport = StdioTransport::default();
    }

    #[tokio::test]
    async fn reads_lines_without_terminators() {
        let input: &[u8] = b"first\r\nsecond\nlast";
        let mut transport = StdioTransport::with_io(input, tokio::io::sink());

        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(transport.read_line().await.unwrap().as_deref(), Some("last"));
        assert_eq!(transport.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn writes_one_line_per_message() {
        let (output, mut peer) = tokio::io::duplex(1024);
        let mut transport = StdioTransport::with_io(tokio::io::empty(), output);
        transport.write_message(&OutgoingMessage::Pong).await.unwrap();
        drop(transport);

        let mut written = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut peer, &mut written)
            .await
            .unwrap();
        assert_eq!(written, "{\"type\":\"pong\"}\n");
    }

    #[test]
    fn encoded_tools_have_no_newlines() {
        let message = OutgoingMessage::Tools {
            tools: crate::mcp::tools::tool_definitions(),
        };
        let json = encode_line(&message).unwrap();
        assert!(!json.contains('\n'), "Serialised JSON should not contain newlines");
    }

    #[test]
    fn encoded_error_has_no_newlines() {
        let error = DispatchError::InvalidMessage {
            message: "line one\nline two".to_string(),
        };
        let json = encode_line(&OutgoingMessage::error_envelope(&error)).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains(r"line one\nline two"));
    }
}
