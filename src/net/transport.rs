//! Peer channel abstraction
//!
//! The session only sees this seam: an ordered, reliable, exclusive-send
//! text-frame channel that can close underneath it. The in-memory pair
//! backs tests and `demo` mode; [`crate::net::ws`] bridges the same
//! shape onto a WebSocket through the relay.

use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("channel closed")]
    Closed,

    #[error("relay rejected the connection: {0}")]
    Rejected(&'static str),

    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("malformed relay message: {0}")]
    Protocol(String),
}

/// One end of a duplex frame channel.
pub struct Channel {
    tx: mpsc::Sender<String>,
    rx: mpsc::Receiver<String>,
}

impl Channel {
    pub fn new(tx: mpsc::Sender<String>, rx: mpsc::Receiver<String>) -> Self {
        Self { tx, rx }
    }

    /// An in-process duplex pair. Frames sent on one end arrive, in
    /// order, on the other.
    pub fn memory_pair(capacity: usize) -> (Channel, Channel) {
        let (a_tx, b_rx) = mpsc::channel(capacity);
        let (b_tx, a_rx) = mpsc::channel(capacity);
        (Channel::new(a_tx, a_rx), Channel::new(b_tx, b_rx))
    }

    /// Split into the outbound sender and inbound receiver halves, so a
    /// session can hold one while its event loop selects on the other.
    pub fn split(self) -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
        (self.tx, self.rx)
    }

    /// Send one frame. Fails once the remote end is gone.
    pub async fn send(&self, frame: String) -> Result<(), TransportError> {
        self.tx.send(frame).await.map_err(|_| TransportError::Closed)
    }

    /// Receive the next frame; `None` means the channel closed.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Non-blocking receive, used by synchronous test drivers.
    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_pair_delivers_in_order() {
        tokio_test::block_on(async {
            let (a, mut b) = Channel::memory_pair(8);
            a.send("one".into()).await.unwrap();
            a.send("two".into()).await.unwrap();
            assert_eq!(b.recv().await.as_deref(), Some("one"));
            assert_eq!(b.recv().await.as_deref(), Some("two"));
        });
    }

    #[test]
    fn dropping_one_end_closes_the_other() {
        tokio_test::block_on(async {
            let (a, mut b) = Channel::memory_pair(8);
            drop(a);
            assert!(b.recv().await.is_none());

            let (a, b) = Channel::memory_pair(8);
            drop(b);
            assert!(matches!(
                a.send("late".into()).await,
                Err(TransportError::Closed)
            ));
        });
    }
}
