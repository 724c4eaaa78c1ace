//! Fan-out of server messages to the peers of one room.

use heptago_protocol::{PeerId, ServerMessage};
use tokio::sync::mpsc;

/// Channel sender for delivering outbound messages to one peer.
///
/// The receiving end is drained by that peer's connection writer task; a
/// send fails only once that task is gone.
pub type PeerSender = mpsc::UnboundedSender<ServerMessage>;

/// Delivers messages to every registered peer.
///
/// Sending never waits: each peer has an unbounded queue. A peer whose
/// queue is closed is dropped after the fan-out completes and reported
/// back to the caller, who removes it from the room.
#[derive(Debug, Default)]
pub struct Broadcaster {
    /// Join order, so every peer sees deliveries in the same sequence.
    peers: Vec<(PeerId, PeerSender)>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `peer`, replacing any previous sender it had.
    pub fn register(&mut self, peer: PeerId, sender: PeerSender) {
        match self.peers.iter_mut().find(|(p, _)| *p == peer) {
            Some(entry) => entry.1 = sender,
            None => self.peers.push((peer, sender)),
        }
    }

    /// Removes `peer`. Returns whether it was registered.
    pub fn unregister(&mut self, peer: PeerId) -> bool {
        let before = self.peers.len();
        self.peers.retain(|(p, _)| *p != peer);
        self.peers.len() != before
    }

    /// Sends `msg` to every peer and returns those whose send failed.
    ///
    /// Failed peers are already unregistered when this returns.
    pub fn broadcast(&mut self, msg: &ServerMessage) -> Vec<PeerId> {
        let mut failed = Vec::new();
        for (peer, sender) in &self.peers {
            if sender.send(msg.clone()).is_err() {
                failed.push(*peer);
            }
        }
        if !failed.is_empty() {
            self.peers.retain(|(p, _)| !failed.contains(p));
        }
        failed
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
