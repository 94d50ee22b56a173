//! Trait abstraction for the window/fullscreen host to enable testing

use async_trait::async_trait;

use crate::error::Result;

/// Groups of window listeners the controller installs and removes together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerSet {
    /// `fullscreenchange` and its vendor-prefixed twin.
    FullscreenChange,
    /// Mouse move/down, key down, context menu and touch events.
    Activity,
}

/// Window, fullscreen and presentation-marker operations of the host.
///
/// Events for a [`ListenerSet`] only need to be delivered while it is installed.
#[async_trait]
pub trait FullscreenHost: Send {
    /// Whether the platform can make the container fullscreen at all.
    fn fullscreen_enabled(&self) -> bool;

    /// Asks for fullscreen. Completion is reported separately as a
    /// fullscreen-change event.
    async fn request_fullscreen(&mut self) -> Result<()>;

    async fn exit_fullscreen(&mut self) -> Result<()>;

    fn install_listeners(&mut self, set: ListenerSet);

    fn uninstall_listeners(&mut self, set: ListenerSet);

    /// Marks the container as being in presentation mode.
    fn set_presentation_active(&mut self, active: bool);

    fn set_controls_visible(&mut self, visible: bool);

    fn clear_selection(&mut self);

    /// Blocking user-facing message.
    fn alert(&mut self, message: &str);
}
