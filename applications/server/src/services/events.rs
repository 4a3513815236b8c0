//! Real-time wallet events
//!
//! Balance changes are published on a tokio broadcast channel; each WebSocket
//! connection holds its own receiver and filters by principal.

use remotejob_core::{Amount, UserId};
use serde::Serialize;
use tokio::sync::broadcast;

/// Event name clients listen for
pub const WALLET_UPDATE: &str = "walletUpdate";

/// A user's balance changed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletEvent {
    pub user_id: UserId,
    pub new_balance: Amount,
}

/// Frame written to the socket
#[derive(Debug, Serialize)]
pub struct EventFrame<'a> {
    pub event: &'static str,
    pub payload: &'a WalletEvent,
}

impl WalletEvent {
    pub fn frame(&self) -> EventFrame<'_> {
        EventFrame {
            event: WALLET_UPDATE,
            payload: self,
        }
    }
}

/// Publisher for wallet events
#[derive(Debug, Clone)]
pub struct WalletEvents {
    sender: broadcast::Sender<WalletEvent>,
}

impl WalletEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a balance change; a no-op when nobody is listening
    pub fn publish(&self, user_id: UserId, new_balance: Amount) {
        let event = WalletEvent {
            user_id,
            new_balance,
        };
        match self.sender.send(event) {
            Ok(receivers) => tracing::debug!(receivers, "Published walletUpdate"),
            Err(_) => tracing::trace!("No walletUpdate subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
