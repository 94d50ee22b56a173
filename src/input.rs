//! # Input Module
//!
//! Typed window events delivered by the host (browser shell or headless
//! driver) to the presenter.

/// Mouse button, numbered as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Auxiliary,
    Secondary,
}

/// Keys the presenter reacts to. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Other,
}

/// One touch point in page coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Mouse-down details needed for click paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseDown {
    pub button: MouseButton,
    pub shift_key: bool,
    /// The click landed on a link to another location in the same document.
    pub on_internal_link: bool,
}

impl MouseDown {
    /// Plain primary-button click on page content.
    pub fn primary() -> Self {
        Self {
            button: MouseButton::Primary,
            shift_key: false,
            on_internal_link: false,
        }
    }
}

/// Window-level event.
///
/// Touch variants carry the touch points still on the surface, so a
/// `TouchEnd` after a single-finger drag has an empty list.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    MouseMove,
    MouseDown(MouseDown),
    KeyDown(Key),
    ContextMenu,
    TouchStart(Vec<TouchPoint>),
    TouchMove(Vec<TouchPoint>),
    TouchEnd(Vec<TouchPoint>),
    Resize,
    /// The fullscreen element changed; `true` if something is now fullscreen.
    FullscreenChange(bool),
}

/// What the host should do with the native event after handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    pub prevent_default: bool,
}

impl EventResponse {
    pub const IGNORED: EventResponse = EventResponse {
        prevent_default: false,
    };

    pub const PREVENT_DEFAULT: EventResponse = EventResponse {
        prevent_default: true,
    };
}
