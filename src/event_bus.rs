//! # Event Bus Module
//!
//! Publish/subscribe channel shared by the viewer shell, the presentation mode
//! controller and the gamepad side. Built on `tokio::sync::broadcast`, so every
//! subscriber sees every event dispatched after it subscribed.

use tokio::sync::broadcast;
use tracing::trace;

use crate::presentation::PresentationState;

/// Default number of undelivered events kept per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

/// Who caused an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    FullscreenButton,
    PresentationMode,
    Keyboard,
    Gamepad,
    Startup,
}

/// Events carried on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    /// Request to enter presentation mode.
    PresentationMode { source: EventSource },
    /// The presentation mode state changed.
    PresentationModeChanged {
        source: EventSource,
        state: PresentationState,
    },
    /// Page views were created for a freshly loaded document.
    PagesInit,
    /// The current page changed.
    PageChanging {
        source: EventSource,
        previous: u32,
        page_number: u32,
    },
}

/// Cloneable handle to the shared bus.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BusEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes `event` to all current subscribers.
    ///
    /// Having no subscribers is not an error.
    pub fn dispatch(&self, event: BusEvent) {
        trace!("dispatch {:?}", event);
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }
}
