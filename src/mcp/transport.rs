// Line-delimited JSON over stdin/stdout. One message per line; stdout
// carries nothing but JSON-RPC, all logging goes to stderr.

use anyhow::{bail, Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::io::BufReader;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::debug;

use super::types::{RpcMessage, RpcResponse};

pub struct StdioTransport {
    reader: FramedRead<BufReader<tokio::io::Stdin>, LinesCodec>,
    writer: FramedWrite<tokio::io::Stdout, LinesCodec>,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            reader: FramedRead::new(BufReader::new(tokio::io::stdin()), LinesCodec::new()),
            writer: FramedWrite::new(tokio::io::stdout(), LinesCodec::new()),
        }
    }

    /// Reads the next message. `Ok(None)` means the client closed stdin.
    pub async fn read_message(&mut self) -> Result<Option<RpcMessage>> {
        let line = match self.reader.next().await {
            Some(line) => line.context("error reading from stdin")?,
            None => {
                debug!("EOF on stdin");
                return Ok(None);
            }
        };

        debug!("Received: {}", line);

        let value: serde_json::Value =
            serde_json::from_str(&line).context("invalid JSON on stdin")?;
        if !value.is_object() {
            bail!("JSON-RPC message must be an object");
        }

        // Requests carry an id, notifications do not.
        let message = if value.get("id").is_some() {
            RpcMessage::Request(
                serde_json::from_value(value).context("invalid JSON-RPC request")?,
            )
        } else {
            RpcMessage::Notification(
                serde_json::from_value(value).context("invalid JSON-RPC notification")?,
            )
        };

        Ok(Some(message))
    }

    pub async fn write_response(&mut self, response: RpcResponse) -> Result<()> {
        let json = serde_json::to_string(&response)?;
        debug!("Sending: {}", json);
        self.writer.send(json).await?;
        Ok(())
    }
}
