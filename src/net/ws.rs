//! WebSocket transport through the rendezvous relay
//!
//! Bridges a relay WebSocket onto the [`Channel`] seam: game frames ride
//! inside [`RelayMsg::Frame`], everything else is connection setup. The
//! session never sees any of this.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use uuid::Uuid;

use super::protocol::RelayMsg;
use super::transport::{Channel, TransportError};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(relay_url: &str) -> Result<(Ws, Uuid), TransportError> {
    let (mut ws, _) = connect_async(relay_url)
        .await
        .map_err(|e| TransportError::WebSocket(e.to_string()))?;

    // The relay speaks first: it assigns our dialable id.
    match next_relay_msg(&mut ws).await? {
        RelayMsg::Assigned { peer_id } => Ok((ws, peer_id)),
        other => Err(TransportError::Protocol(format!(
            "expected assignment, got {other:?}"
        ))),
    }
}

async fn next_relay_msg(ws: &mut Ws) -> Result<RelayMsg, TransportError> {
    loop {
        let msg = ws
            .next()
            .await
            .ok_or(TransportError::Closed)?
            .map_err(|e| TransportError::WebSocket(e.to_string()))?;
        match msg {
            Message::Text(text) => {
                return RelayMsg::from_text(&text)
                    .map_err(|e| TransportError::Protocol(e.to_string()))
            }
            Message::Close(_) => return Err(TransportError::Closed),
            // Transport-level pings are handled by tungstenite itself.
            _ => continue,
        }
    }
}

/// A host registered with the relay, waiting for its peer.
pub struct HostListener {
    ws: Ws,
    peer_id: Uuid,
}

impl HostListener {
    /// The id to put in the invitation link.
    pub fn peer_id(&self) -> Uuid {
        self.peer_id
    }

    /// Wait for a joiner to attach, then hand back the live channel.
    pub async fn accept(mut self) -> Result<Channel, TransportError> {
        loop {
            match next_relay_msg(&mut self.ws).await? {
                RelayMsg::PeerJoined => return Ok(spawn_pumps(self.ws)),
                other => debug!(msg = ?other, "ignoring relay message while waiting for peer"),
            }
        }
    }
}

/// Register with the relay as a host and wait for an inbound peer.
pub async fn open_host(relay_url: &str) -> Result<HostListener, TransportError> {
    let (ws, peer_id) = connect(relay_url).await?;
    Ok(HostListener { ws, peer_id })
}

/// Dial a host through the relay (outbound, non-authoritative path).
pub async fn open_join(relay_url: &str, host_id: Uuid) -> Result<Channel, TransportError> {
    let (mut ws, _peer_id) = connect(relay_url).await?;

    let attach = RelayMsg::Attach { host_id }
        .to_text()
        .map_err(|e| TransportError::Protocol(e.to_string()))?;
    ws.send(Message::Text(attach))
        .await
        .map_err(|e| TransportError::WebSocket(e.to_string()))?;

    match next_relay_msg(&mut ws).await? {
        RelayMsg::Attached => Ok(spawn_pumps(ws)),
        RelayMsg::Busy => Err(TransportError::Rejected("host already paired")),
        RelayMsg::NotFound => Err(TransportError::Rejected("no such host")),
        other => Err(TransportError::Protocol(format!(
            "expected attach result, got {other:?}"
        ))),
    }
}

/// Bridge the paired WebSocket onto a [`Channel`] with two pump tasks.
fn spawn_pumps(ws: Ws) -> Channel {
    let (mut ws_sink, mut ws_stream) = ws.split();
    let (in_tx, in_rx) = mpsc::channel::<String>(64);
    let (out_tx, mut out_rx) = mpsc::channel::<String>(64);

    // Outbound: local frames -> relay.
    tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            let text = match (RelayMsg::Frame { payload: frame }).to_text() {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "failed to encode relay frame");
                    continue;
                }
            };
            if let Err(e) = ws_sink.send(Message::Text(text)).await {
                debug!(error = %e, "relay send failed, closing outbound pump");
                break;
            }
        }
        let _ = ws_sink.send(Message::Close(None)).await;
    });

    // Inbound: relay -> local frames. Dropping `in_tx` is the close
    // signal the session observes.
    tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => match RelayMsg::from_text(&text) {
                    Ok(RelayMsg::Frame { payload }) => {
                        if in_tx.send(payload).await.is_err() {
                            break;
                        }
                    }
                    Ok(RelayMsg::PeerLeft) => {
                        debug!("peer left the relay");
                        break;
                    }
                    Ok(other) => debug!(msg = ?other, "ignoring relay message mid-session"),
                    Err(e) => warn!(error = %e, "malformed relay message dropped"),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!(error = %e, "relay receive failed");
                    break;
                }
            }
        }
    });

    Channel::new(out_tx, in_rx)
}
