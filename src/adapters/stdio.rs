//! Line-oriented stand-in for the presentation surface.
//!
//! Outbound messages become JSON lines. Inbound lines are surface commands,
//! except `{"visible": bool}` which toggles the surface's visibility.

use std::sync::Arc;

use anyhow::{Context, Result};
use search_view::adapters::ChannelSurface;
use search_view::OutboundMessage;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceInput {
    Visibility(bool),
    Message(Value),
}

impl SurfaceInput {
    /// `None` for blank lines.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(line).context("surface input is not JSON")?;
        let visibility = match &value {
            Value::Object(map) if map.len() == 1 => map.get("visible").and_then(Value::as_bool),
            _ => None,
        };
        Ok(Some(match visibility {
            Some(visible) => SurfaceInput::Visibility(visible),
            None => SurfaceInput::Message(value),
        }))
    }
}

/// Feeds surface input lines to the view until `reader` reaches EOF.
///
/// Visibility is applied to `surface` before the change is announced, so the
/// view already sees the new state when it handles the notification.
pub async fn read_surface_input<R>(
    reader: R,
    surface: Arc<ChannelSurface>,
    inbound: mpsc::Sender<Value>,
    visibility: mpsc::Sender<bool>,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;
    while let Some(line) = lines.next_line().await? {
        let input = match SurfaceInput::parse(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(err) => {
                warn!(%err, "skipping surface input line");
                continue;
            }
        };
        let delivered = match input {
            SurfaceInput::Visibility(visible) => {
                surface.set_visible(visible);
                visibility.send(visible).await.is_ok()
            }
            SurfaceInput::Message(message) => inbound.send(message).await.is_ok(),
        };
        if !delivered {
            debug!("view stopped, no longer reading surface input");
            break;
        }
        forwarded += 1;
    }
    Ok(forwarded)
}

/// Writes every outbound message as one JSON line until all senders are gone.
pub async fn pump_messages<W>(
    mut messages: mpsc::UnboundedReceiver<OutboundMessage>,
    mut writer: W,
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(message) = messages.recv().await {
        let mut line = serde_json::to_vec(&message)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
        written += 1;
    }
    Ok(written)
}
