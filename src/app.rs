//! # Application Module
//!
//! Glue between the viewer, presentation mode and the event bus.
//!
//! [`Presenter`] owns the viewer and the [`PresentationMode`] controller and is
//! driven by three inputs: bus events, window events from the host and gamepad
//! actions (through [`ActionSink`]).

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::Result;
use crate::event_bus::{BusEvent, EventBus, EventSource};
use crate::gamepad::{ActionSink, ButtonAction};
use crate::input::{EventResponse, Key, WindowEvent};
use crate::presentation::host::FullscreenHost;
use crate::presentation::{PageTurn, PresentationMode, PresentationOptions};
use crate::viewer::{PageViewer, ScaleValue};

/// Viewer application with presentation mode attached.
#[derive(Debug)]
pub struct Presenter<V, H> {
    viewer: V,
    presentation: PresentationMode<H>,
    bus: EventBus,
}

impl<V: PageViewer + Send, H: FullscreenHost> Presenter<V, H> {
    pub fn new(viewer: V, host: H, bus: EventBus, options: PresentationOptions) -> Self {
        Self {
            viewer,
            presentation: PresentationMode::new(host, bus.clone(), options),
            bus,
        }
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut V {
        &mut self.viewer
    }

    pub fn presentation(&self) -> &PresentationMode<H> {
        &self.presentation
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// When the controls should next be checked for hiding.
    pub fn controls_deadline(&self) -> Option<Instant> {
        self.presentation.controls_deadline()
    }

    pub fn tick(&mut self, now: Instant) {
        self.presentation.tick(now);
    }

    /// Enters presentation mode, alerting the user if that is impossible.
    ///
    /// Returns true if fullscreen was requested.
    pub async fn request_presentation_mode(&mut self) -> bool {
        match self.presentation.request(&mut self.viewer).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Cannot enter presentation mode: {}", e);
                let message = format!("Presentation mode is not supported on this device: {}", e);
                self.presentation.host_mut().alert(&message);
                false
            }
        }
    }

    pub async fn handle_bus_event(&mut self, event: &BusEvent) {
        match event {
            BusEvent::PresentationMode { source } => {
                debug!("Presentation mode requested by {:?}", source);
                self.request_presentation_mode().await;
            }
            BusEvent::PresentationModeChanged { state, .. } => {
                self.viewer.set_presentation_mode_state(*state);
            }
            BusEvent::PagesInit => {
                self.viewer.set_current_scale_value(ScaleValue::PageWidth);
            }
            BusEvent::PageChanging { .. } => {}
        }
    }

    pub async fn handle_window_event(&mut self, event: WindowEvent, now: Instant) -> EventResponse {
        let previous = self.viewer.current_page_number();

        let response = match &event {
            WindowEvent::FullscreenChange(is_fullscreen) => {
                self.presentation
                    .on_fullscreen_change(&mut self.viewer, *is_fullscreen, now)
                    .await;
                EventResponse::IGNORED
            }
            WindowEvent::Resize => {
                self.viewer.update_layout();
                let scale = self.viewer.current_scale_value();
                self.viewer.set_current_scale_value(scale);
                EventResponse::IGNORED
            }
            _ => self.presentation.handle_event(&mut self.viewer, &event, now),
        };
        // Clicks, swipes and view restores
        self.publish_page_change(previous, EventSource::PresentationMode);

        if let WindowEvent::KeyDown(key) = event {
            let turn = match key {
                Key::ArrowLeft | Key::ArrowUp => Some(PageTurn::Previous),
                Key::ArrowRight | Key::ArrowDown => Some(PageTurn::Next),
                Key::Other => None,
            };
            if let Some(turn) = turn {
                self.turn_page(turn, EventSource::Keyboard);
            }
        }

        response
    }

    /// Turns a page and publishes the change. Returns false at the document edge.
    pub fn turn_page(&mut self, turn: PageTurn, source: EventSource) -> bool {
        let previous = self.viewer.current_page_number();
        let moved = turn.apply(&mut self.viewer);
        self.publish_page_change(previous, source);
        moved
    }

    fn publish_page_change(&self, previous: u32, source: EventSource) {
        let page_number = self.viewer.current_page_number();
        if page_number != previous {
            self.bus.dispatch(BusEvent::PageChanging {
                source,
                previous,
                page_number,
            });
        }
    }
}

#[async_trait]
impl<V: PageViewer + Send, H: FullscreenHost> ActionSink for Presenter<V, H> {
    async fn perform(&mut self, action: ButtonAction) -> Result<()> {
        match action {
            ButtonAction::NextPage => {
                self.turn_page(PageTurn::Next, EventSource::Gamepad);
                Ok(())
            }
            ButtonAction::PreviousPage => {
                self.turn_page(PageTurn::Previous, EventSource::Gamepad);
                Ok(())
            }
            ButtonAction::ExitFullscreen => self.presentation.request_exit().await,
        }
    }
}
