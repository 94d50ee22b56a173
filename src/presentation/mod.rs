//! # Presentation Mode Module
//!
//! Fullscreen slideshow mode for the PDF viewer.
//!
//! This module handles:
//! - Entering and leaving fullscreen through a [`FullscreenHost`]
//! - Saving the view (page, zoom, scroll and spread mode) on entry and
//!   restoring it on exit
//! - Auto-hiding the on-screen controls after mouse inactivity
//! - Paging by mouse click, shift-click and touch swipe while active
//!
//! ## State Machine
//!
//! ```text
//! UNKNOWN --request()--> CHANGING --fullscreenchange(true)--> FULLSCREEN
//!                           |                                     |
//!                     request rejected               fullscreenchange(false)
//!                           v                                     v
//!                         NORMAL <--------------------------------+
//! ```
//!
//! Entering FULLSCREEN is driven by the host's fullscreen-change event, never
//! by `request()` itself.

pub mod controls;
pub mod host;
pub mod swipe;

use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::PresentationConfig;
use crate::error::{PresenterError, Result};
use crate::event_bus::{BusEvent, EventBus, EventSource};
use crate::input::{EventResponse, MouseButton, MouseDown, TouchPoint, WindowEvent};
use crate::viewer::{PageViewer, ScaleValue, ScrollMode, SpreadMode};

use controls::ControlsTimer;
use host::{FullscreenHost, ListenerSet};
use swipe::{SwipeThresholds, TouchSwipeState};

/// Presentation mode state, as published on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationState {
    /// Presentation mode was never used.
    #[default]
    Unknown,
    Normal,
    /// Fullscreen was requested but not entered yet.
    Changing,
    Fullscreen,
}

/// Direction of a page turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTurn {
    Next,
    Previous,
}

impl PageTurn {
    /// Applies the turn to `viewer`. Returns false if already at the edge.
    pub fn apply<V: PageViewer + ?Sized>(self, viewer: &mut V) -> bool {
        match self {
            PageTurn::Next => viewer.next_page(),
            PageTurn::Previous => viewer.previous_page(),
        }
    }
}

/// View settings captured when presentation mode is requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedViewArgs {
    pub page_number: u32,
    pub scale_value: ScaleValue,
    pub scroll_mode: ScrollMode,
    /// Spread mode to restore on exit. Only kept when the document may have
    /// varying page sizes, in which case spreads are switched off while
    /// presenting.
    pub spread_mode: Option<SpreadMode>,
}

/// Tunables for the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresentationOptions {
    pub controls_hide_delay: Duration,
    pub swipe: SwipeThresholds,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            controls_hide_delay: controls::DELAY_BEFORE_HIDING_CONTROLS,
            swipe: SwipeThresholds::default(),
        }
    }
}

impl From<&PresentationConfig> for PresentationOptions {
    fn from(config: &PresentationConfig) -> Self {
        Self {
            controls_hide_delay: Duration::from_millis(config.controls_hide_delay_ms),
            swipe: SwipeThresholds::from_degrees(
                config.swipe_min_distance_px,
                config.swipe_angle_threshold_deg,
            ),
        }
    }
}

/// Mouse-wheel paging accumulator. Only ever reset in this build.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct MouseScrollState {
    time_stamp: Option<Instant>,
    delta: f64,
}

impl MouseScrollState {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_reset(&self) -> bool {
        self.time_stamp.is_none() && self.delta == 0.0
    }
}

/// Which listener sets are currently installed on the host.
#[derive(Debug, Clone, Copy, Default)]
struct InstalledListeners {
    fullscreen_change: bool,
    activity: bool,
}

/// Presentation mode controller.
///
/// Owns the host handle and all presentation state. The viewer is passed in
/// by the caller on every operation that needs it.
///
/// # Examples
///
/// ```
/// use pdf_presenter::event_bus::EventBus;
/// use pdf_presenter::headless::HeadlessHost;
/// use pdf_presenter::presentation::{PresentationMode, PresentationOptions, PresentationState};
/// use pdf_presenter::viewer::deck::PageDeck;
///
/// # tokio_test::block_on(async {
/// let (host, _fullscreen_events) = HeadlessHost::new();
/// let mut mode = PresentationMode::new(host, EventBus::default(), PresentationOptions::default());
/// let mut deck = PageDeck::new(10);
///
/// mode.request(&mut deck).await?;
/// assert_eq!(mode.state(), PresentationState::Changing);
/// assert!(mode.active());
/// # Ok::<(), pdf_presenter::error::PresenterError>(())
/// # });
/// ```
#[derive(Debug)]
pub struct PresentationMode<H> {
    host: H,
    bus: EventBus,
    options: PresentationOptions,
    state: PresentationState,
    args: Option<SavedViewArgs>,
    controls: ControlsTimer,
    touch_swipe: Option<TouchSwipeState>,
    context_menu_open: bool,
    mouse_scroll: MouseScrollState,
    listeners: InstalledListeners,
}

impl<H: FullscreenHost> PresentationMode<H> {
    pub fn new(host: H, bus: EventBus, options: PresentationOptions) -> Self {
        Self {
            host,
            bus,
            options,
            state: PresentationState::Unknown,
            args: None,
            controls: ControlsTimer::new(options.controls_hide_delay),
            touch_swipe: None,
            context_menu_open: false,
            mouse_scroll: MouseScrollState::default(),
            listeners: InstalledListeners::default(),
        }
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    /// True while fullscreen is being entered or is active.
    pub fn active(&self) -> bool {
        matches!(
            self.state,
            PresentationState::Changing | PresentationState::Fullscreen
        )
    }

    pub fn saved_view_args(&self) -> Option<&SavedViewArgs> {
        self.args.as_ref()
    }

    pub fn touch_swipe(&self) -> Option<&TouchSwipeState> {
        self.touch_swipe.as_ref()
    }

    pub fn context_menu_open(&self) -> bool {
        self.context_menu_open
    }

    pub fn controls_visible(&self) -> bool {
        self.controls.visible()
    }

    /// When the controls will hide unless there is more activity.
    pub fn controls_deadline(&self) -> Option<Instant> {
        self.controls.deadline()
    }

    pub fn mouse_scroll_reset(&self) -> bool {
        self.mouse_scroll.is_reset()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Requests the host to enter fullscreen.
    ///
    /// # Errors
    ///
    /// - `AlreadyActive` if presentation mode is entering or active
    /// - `NoPages` if the viewer has nothing to show
    /// - `FullscreenUnsupported` if the host cannot go fullscreen
    /// - `FullscreenRejected` if the host refused; the state rolls back to
    ///   NORMAL and the listeners are removed
    ///
    /// None of the precondition failures change any state.
    pub async fn request<V: PageViewer + ?Sized>(&mut self, viewer: &mut V) -> Result<()> {
        if self.active() {
            return Err(PresenterError::AlreadyActive);
        }
        if viewer.pages_count() == 0 {
            return Err(PresenterError::NoPages);
        }
        if !self.host.fullscreen_enabled() {
            return Err(PresenterError::FullscreenUnsupported);
        }

        self.add_fullscreen_change_listeners();
        self.notify_state_change(PresentationState::Changing);

        let spread_mode = viewer.spread_mode();
        let keep_spread = spread_mode != SpreadMode::None
            && !(viewer.page_views_ready() && viewer.has_equal_page_sizes());
        if keep_spread {
            warn!(
                "Ignoring spread mode {:?} in presentation mode, the document may contain varying page sizes",
                spread_mode
            );
        }

        self.args = Some(SavedViewArgs {
            page_number: viewer.current_page_number(),
            scale_value: viewer.current_scale_value(),
            scroll_mode: viewer.scroll_mode(),
            spread_mode: keep_spread.then_some(spread_mode),
        });

        match self.host.request_fullscreen().await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Fullscreen request failed: {}", e);
                self.remove_fullscreen_change_listeners();
                self.notify_state_change(PresentationState::Normal);
                self.args = None;
                Err(match e {
                    PresenterError::FullscreenRejected(_) => e,
                    other => PresenterError::FullscreenRejected(other.to_string()),
                })
            }
        }
    }

    /// Asks the host to leave fullscreen. A no-op outside of fullscreen.
    pub async fn request_exit(&mut self) -> Result<()> {
        if self.state != PresentationState::Fullscreen {
            debug!("Exit requested while not fullscreen ({:?})", self.state);
            return Ok(());
        }
        self.host.exit_fullscreen().await
    }

    /// Reacts to the host's fullscreen-change event.
    ///
    /// Ignored unless the fullscreen-change listeners are installed.
    pub async fn on_fullscreen_change<V: PageViewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        is_fullscreen: bool,
        now: Instant,
    ) {
        if !self.listeners.fullscreen_change {
            return;
        }
        if is_fullscreen {
            self.enter(viewer, now).await;
        } else {
            self.exit(viewer).await;
        }
    }

    /// Handles an activity event while presentation mode listens for them.
    ///
    /// Resize and fullscreen-change events are not activity and are ignored here.
    pub fn handle_event<V: PageViewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        event: &WindowEvent,
        now: Instant,
    ) -> EventResponse {
        if !self.listeners.activity {
            return EventResponse::IGNORED;
        }

        match event {
            WindowEvent::MouseMove => {
                self.show_controls(now);
                EventResponse::IGNORED
            }
            WindowEvent::MouseDown(mouse) => self.mouse_down(viewer, mouse),
            WindowEvent::KeyDown(_) => {
                self.mouse_scroll.reset();
                EventResponse::IGNORED
            }
            WindowEvent::ContextMenu => {
                self.context_menu_open = true;
                EventResponse::IGNORED
            }
            WindowEvent::TouchStart(touches)
            | WindowEvent::TouchMove(touches)
            | WindowEvent::TouchEnd(touches) => self.handle_touch(viewer, event, touches),
            WindowEvent::Resize | WindowEvent::FullscreenChange(_) => EventResponse::IGNORED,
        }
    }

    /// Hides the controls once their deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.controls.expire(now) {
            self.host.set_controls_visible(false);
        }
    }

    fn notify_state_change(&mut self, state: PresentationState) {
        debug!("Presentation mode {:?} -> {:?}", self.state, state);
        self.state = state;
        self.bus.dispatch(BusEvent::PresentationModeChanged {
            source: EventSource::PresentationMode,
            state,
        });
    }

    async fn enter<V: PageViewer + ?Sized>(&mut self, viewer: &mut V, now: Instant) {
        self.notify_state_change(PresentationState::Fullscreen);
        self.host.set_presentation_active(true);

        self.add_window_listeners();
        self.show_controls(now);
        self.context_menu_open = false;

        // Text selection is impossible while presenting, so drop any leftover one
        self.host.clear_selection();

        // Let the fullscreen layout settle before scrolling the page into view
        tokio::task::yield_now().await;

        let args = self.args;
        viewer.set_scroll_mode(ScrollMode::Page);
        if args.and_then(|a| a.spread_mode).is_some() {
            viewer.set_spread_mode(SpreadMode::None);
        }
        viewer.set_current_page_number(args.map_or(1, |a| a.page_number));
        viewer.set_current_scale_value(ScaleValue::PageFit);

        info!("Entered presentation mode at page {}", viewer.current_page_number());
    }

    async fn exit<V: PageViewer + ?Sized>(&mut self, viewer: &mut V) {
        let page_number = viewer.current_page_number();
        self.host.set_presentation_active(false);

        self.remove_window_listeners();
        self.hide_controls();
        self.mouse_scroll.reset();
        self.touch_swipe = None;
        self.context_menu_open = false;

        self.notify_state_change(PresentationState::Normal);
        self.remove_fullscreen_change_listeners();

        // Restore once the normal layout is back
        tokio::task::yield_now().await;

        match self.args.take() {
            Some(args) => {
                viewer.set_scroll_mode(args.scroll_mode);
                if let Some(spread_mode) = args.spread_mode {
                    viewer.set_spread_mode(spread_mode);
                }
                viewer.set_current_scale_value(args.scale_value);
            }
            None => viewer.set_current_scale_value(ScaleValue::PageWidth),
        }
        viewer.set_current_page_number(page_number);

        info!("Left presentation mode at page {}", page_number);
    }

    fn mouse_down<V: PageViewer + ?Sized>(&mut self, viewer: &mut V, mouse: &MouseDown) -> EventResponse {
        if self.context_menu_open {
            self.context_menu_open = false;
            return EventResponse::PREVENT_DEFAULT;
        }
        if mouse.button != MouseButton::Primary || mouse.on_internal_link {
            // Internal links keep working in presentation mode
            return EventResponse::IGNORED;
        }

        let turn = if mouse.shift_key {
            PageTurn::Previous
        } else {
            PageTurn::Next
        };
        turn.apply(viewer);
        EventResponse::PREVENT_DEFAULT
    }

    fn handle_touch<V: PageViewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        event: &WindowEvent,
        touches: &[TouchPoint],
    ) -> EventResponse {
        if !self.active() {
            return EventResponse::IGNORED;
        }
        if touches.len() > 1 {
            // A second finger cancels the swipe
            self.touch_swipe = None;
            return EventResponse::IGNORED;
        }

        match event {
            WindowEvent::TouchStart(_) => {
                self.touch_swipe = touches.first().copied().map(TouchSwipeState::begin);
                EventResponse::IGNORED
            }
            WindowEvent::TouchMove(_) => {
                let (Some(swipe), Some(point)) = (self.touch_swipe.as_mut(), touches.first()) else {
                    return EventResponse::IGNORED;
                };
                swipe.update(*point);
                // Keep the browser from running its own fullscreen swipe gestures
                EventResponse::PREVENT_DEFAULT
            }
            WindowEvent::TouchEnd(_) => {
                if let Some(turn) = self
                    .touch_swipe
                    .take()
                    .and_then(|swipe| swipe.classify(&self.options.swipe))
                {
                    debug!("Swipe page turn: {:?}", turn);
                    turn.apply(viewer);
                }
                EventResponse::IGNORED
            }
            _ => EventResponse::IGNORED,
        }
    }

    fn show_controls(&mut self, now: Instant) {
        if self.controls.show(now) {
            self.host.set_controls_visible(true);
        }
    }

    fn hide_controls(&mut self) {
        if self.controls.hide() {
            self.host.set_controls_visible(false);
        }
    }

    fn add_window_listeners(&mut self) {
        if !self.listeners.activity {
            self.host.install_listeners(ListenerSet::Activity);
            self.listeners.activity = true;
        }
    }

    fn remove_window_listeners(&mut self) {
        if self.listeners.activity {
            self.host.uninstall_listeners(ListenerSet::Activity);
            self.listeners.activity = false;
        }
    }

    fn add_fullscreen_change_listeners(&mut self) {
        if !self.listeners.fullscreen_change {
            self.host.install_listeners(ListenerSet::FullscreenChange);
            self.listeners.fullscreen_change = true;
        }
    }

    fn remove_fullscreen_change_listeners(&mut self) {
        if self.listeners.fullscreen_change {
            self.host.uninstall_listeners(ListenerSet::FullscreenChange);
            self.listeners.fullscreen_change = false;
        }
    }
}
