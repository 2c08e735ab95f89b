//! Typed event bus for store-change notification.
//!
//! Uses tokio broadcast channels so the partner store and the Get Help flow
//! are observable outside a reactive UI context: any number of subscribers
//! can independently consume change events without the services knowing who
//! is listening.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::message::ComposeResult;

/// Application-level events emitted by the services.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A trust partner was added to the list.
    PartnerAdded {
        id: Uuid,
        name: String,
    },
    /// A trust partner was removed from the list.
    PartnerRemoved {
        id: Uuid,
        was_primary: bool,
    },
    /// The whole partner list was cleared.
    PartnersCleared,
    /// The primary designation moved to another partner.
    PrimaryChanged {
        id: Uuid,
    },
    /// The Get Help flow was triggered for the primary partner.
    HelpRequested {
        partner_id: Uuid,
    },
    /// The outgoing message body was computed.
    MessagePrepared {
        includes_location: bool,
    },
    /// The message composer reported its outcome.
    ComposeFinished {
        result: ComposeResult,
    },
}

/// Application-wide event bus backed by a tokio broadcast channel.
///
/// Fan-out delivery: every subscriber gets every event. Slow subscribers
/// that fall behind receive a `Lagged` error and may miss events, which is
/// acceptable for UI-driven consumers.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<AppEvent>>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to receive application events.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: AppEvent) {
        let label = event_label(&event);
        match self.sender.send(event) {
            Ok(count) => {
                debug!("event_bus: emitted {label} to {count} subscriber(s)");
            }
            Err(_) => {
                debug!("event_bus: no subscribers for {label}");
            }
        }
    }

    /// Get the current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Human-readable label for an event (for logging).
fn event_label(event: &AppEvent) -> &'static str {
    match event {
        AppEvent::PartnerAdded { .. } => "PartnerAdded",
        AppEvent::PartnerRemoved { .. } => "PartnerRemoved",
        AppEvent::PartnersCleared => "PartnersCleared",
        AppEvent::PrimaryChanged { .. } => "PrimaryChanged",
        AppEvent::HelpRequested { .. } => "HelpRequested",
        AppEvent::MessagePrepared { .. } => "MessagePrepared",
        AppEvent::ComposeFinished { .. } => "ComposeFinished",
    }
}
