//! # Headless Host Module
//!
//! [`FullscreenHost`] for running without a browser window.
//!
//! Fullscreen requests always succeed; the resulting fullscreen-change is
//! delivered back as a [`WindowEvent`] on the channel returned by
//! [`HeadlessHost::new`], just like a browser fires `fullscreenchange` after the
//! request promise resolves. Visual changes are only logged.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::error::{PresenterError, Result};
use crate::input::WindowEvent;
use crate::presentation::host::{FullscreenHost, ListenerSet};

/// Window-less host that echoes fullscreen changes as window events.
#[derive(Debug)]
pub struct HeadlessHost {
    events: mpsc::UnboundedSender<WindowEvent>,
    fullscreen: bool,
    installed: HashSet<ListenerSet>,
    alerts: Vec<String>,
}

impl HeadlessHost {
    /// Creates the host and the receiver for its window events.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WindowEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let host = Self {
            events,
            fullscreen: false,
            installed: HashSet::new(),
            alerts: Vec::new(),
        };
        (host, rx)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_installed(&self, set: ListenerSet) -> bool {
        self.installed.contains(&set)
    }

    /// Alerts shown so far.
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()> {
        self.events
            .send(WindowEvent::FullscreenChange(fullscreen))
            .map_err(|_| PresenterError::FullscreenRejected("window event loop closed".to_string()))?;
        self.fullscreen = fullscreen;
        Ok(())
    }
}

#[async_trait]
impl FullscreenHost for HeadlessHost {
    fn fullscreen_enabled(&self) -> bool {
        true
    }

    async fn request_fullscreen(&mut self) -> Result<()> {
        if self.fullscreen {
            return Ok(());
        }
        debug!("Entering headless fullscreen");
        self.set_fullscreen(true)
    }

    async fn exit_fullscreen(&mut self) -> Result<()> {
        if !self.fullscreen {
            debug!("Exit requested while not fullscreen");
            return Ok(());
        }
        debug!("Leaving headless fullscreen");
        self.set_fullscreen(false)
    }

    fn install_listeners(&mut self, set: ListenerSet) {
        trace!("Installing {:?} listeners", set);
        self.installed.insert(set);
    }

    fn uninstall_listeners(&mut self, set: ListenerSet) {
        trace!("Removing {:?} listeners", set);
        self.installed.remove(&set);
    }

    fn set_presentation_active(&mut self, active: bool) {
        info!("Presentation view {}", if active { "shown" } else { "closed" });
    }

    fn set_controls_visible(&mut self, visible: bool) {
        debug!("Controls {}", if visible { "visible" } else { "hidden" });
    }

    fn clear_selection(&mut self) {
        trace!("Selection cleared");
    }

    fn alert(&mut self, message: &str) {
        warn!("{}", message);
        self.alerts.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_echoes_fullscreen_change() {
        let (mut host, mut rx) = HeadlessHost::new();

        host.request_fullscreen().await.unwrap();
        assert!(host.is_fullscreen());
        assert_eq!(rx.try_recv().unwrap(), WindowEvent::FullscreenChange(true));

        host.exit_fullscreen().await.unwrap();
        assert!(!host.is_fullscreen());
        assert_eq!(rx.try_recv().unwrap(), WindowEvent::FullscreenChange(false));
    }

    #[tokio::test]
    async fn test_repeated_requests_are_idempotent() {
        let (mut host, mut rx) = HeadlessHost::new();

        host.exit_fullscreen().await.unwrap();
        host.request_fullscreen().await.unwrap();
        host.request_fullscreen().await.unwrap();

        assert_eq!(rx.try_recv().unwrap(), WindowEvent::FullscreenChange(true));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_request_fails_when_loop_is_gone() {
        let (mut host, rx) = HeadlessHost::new();
        drop(rx);

        let result = host.request_fullscreen().await;
        assert!(matches!(result, Err(PresenterError::FullscreenRejected(_))));
        assert!(!host.is_fullscreen(), "Failed request must not mark fullscreen");

        let retry = host.request_fullscreen().await;
        assert!(retry.is_err(), "Retry is attempted again, not short-circuited");
    }

    #[test]
    fn test_listener_bookkeeping_and_alerts() {
        let (mut host, _rx) = HeadlessHost::new();

        host.install_listeners(ListenerSet::Activity);
        assert!(host.is_installed(ListenerSet::Activity));
        host.uninstall_listeners(ListenerSet::Activity);
        assert!(!host.is_installed(ListenerSet::Activity));

        host.alert("no fullscreen");
        assert_eq!(host.alerts(), &["no fullscreen".to_string()]);
    }
}
