//! Rendezvous relay
//!
//! The opaque transport dependency made concrete: assigns every
//! connecting peer an id, pairs a joiner with a host, and forwards
//! opaque frames between exactly two peers. It never parses game
//! payloads and never arbitrates outcomes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::net::protocol::RelayMsg;
use crate::util::rate_limit::{create_limiter, RELAY_FRAME_RATE_LIMIT};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Registry of connected peers and active pairings.
#[derive(Default)]
pub struct RelayState {
    /// Outbound sender per connected peer.
    peers: DashMap<Uuid, mpsc::Sender<RelayMsg>>,
    /// Symmetric pairing table: both directions are present while a
    /// session is live.
    pairs: DashMap<Uuid, Uuid>,
}

impl RelayState {
    fn partner_of(&self, id: Uuid) -> Option<Uuid> {
        self.pairs.get(&id).map(|p| *p.value())
    }

    async fn send_to(&self, id: Uuid, msg: RelayMsg) {
        if let Some(tx) = self.peers.get(&id).map(|t| t.value().clone()) {
            if tx.send(msg).await.is_err() {
                debug!(peer_id = %id, "peer outbound queue gone");
            }
        }
    }
}

/// Run the relay until the process is stopped.
pub async fn run(addr: SocketAddr) -> Result<(), RelayError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| RelayError::Bind { addr, source })?;
    serve(listener).await
}

/// Serve an already-bound listener (lets tests bind port 0).
pub async fn serve(listener: TcpListener) -> Result<(), RelayError> {
    let state = Arc::new(RelayState::default());

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "relay listening");
    }
    axum::serve(listener, router).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    "ok"
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<RelayState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One connected peer: assign an id, pump frames until it goes away.
async fn handle_socket(socket: WebSocket, state: Arc<RelayState>) {
    let peer_id = Uuid::new_v4();
    let (mut ws_sink, mut ws_stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<RelayMsg>(64);

    state.peers.insert(peer_id, tx);
    info!(peer_id = %peer_id, "peer connected");

    // Writer task: queued relay messages -> WebSocket.
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match msg.to_text() {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "failed to encode relay message");
                    continue;
                }
            };
            if ws_sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    state
        .send_to(peer_id, RelayMsg::Assigned { peer_id })
        .await;

    let frame_limiter = create_limiter(RELAY_FRAME_RATE_LIMIT);

    // Reader loop.
    while let Some(result) = ws_stream.next().await {
        let msg = match result {
            Ok(Message::Text(text)) => match RelayMsg::from_text(&text) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!(peer_id = %peer_id, error = %e, "malformed relay message dropped");
                    continue;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(peer_id = %peer_id, error = %e, "websocket error");
                break;
            }
        };

        match msg {
            RelayMsg::Attach { host_id } => {
                if state.partner_of(peer_id).is_some() {
                    warn!(peer_id = %peer_id, "attach while already paired, ignoring");
                    continue;
                }
                if !state.peers.contains_key(&host_id) {
                    state.send_to(peer_id, RelayMsg::NotFound).await;
                    break;
                }
                if state.partner_of(host_id).is_some() {
                    // The active session is not disturbed; the intruder
                    // is turned away and closed.
                    state.send_to(peer_id, RelayMsg::Busy).await;
                    break;
                }

                state.pairs.insert(peer_id, host_id);
                state.pairs.insert(host_id, peer_id);
                state.send_to(peer_id, RelayMsg::Attached).await;
                state.send_to(host_id, RelayMsg::PeerJoined).await;
                info!(joiner = %peer_id, host = %host_id, "peers paired");
            }

            RelayMsg::Frame { payload } => {
                if frame_limiter.check().is_err() {
                    warn!(peer_id = %peer_id, "frame rate limit exceeded, dropping");
                    continue;
                }
                match state.partner_of(peer_id) {
                    Some(partner) => {
                        state.send_to(partner, RelayMsg::Frame { payload }).await;
                    }
                    None => {
                        warn!(peer_id = %peer_id, "frame from unpaired peer dropped");
                    }
                }
            }

            other => {
                warn!(peer_id = %peer_id, msg = ?other, "unexpected relay message");
            }
        }
    }

    // Cleanup: unpair, tell the survivor, forget the peer. Dropping the
    // last sender ends the writer once its queue drains, so rejection
    // notices queued just before the break still reach the socket.
    state.peers.remove(&peer_id);
    if let Some((_, partner)) = state.pairs.remove(&peer_id) {
        state.pairs.remove(&partner);
        state.send_to(partner, RelayMsg::PeerLeft).await;
    }
    let _ = writer.await;
    info!(peer_id = %peer_id, "peer disconnected");
}
