//! # Gamepad Module
//!
//! Gamepad page turning.
//!
//! This module handles:
//! - Identifying controllers (Joy-Con left/right or anything else) by device id
//! - Per-device button-to-action maps with a default fallback
//! - Polling connected pads once per display refresh
//! - Firing actions on button press edges only
//! - Reading pads through Linux evdev

pub mod dispatcher;
pub mod evdev_source;
pub mod profile;
pub mod registry;

/// Device identifier string as reported by the platform.
pub type GamepadId = String;

pub use dispatcher::{
    ActionSender, ActionSink, GamepadDispatcher, GamepadEvent, GamepadSnapshot, GamepadSource,
    LastButtonStates,
};
pub use profile::{ButtonAction, ButtonLayout, ButtonMap, ControllerProfile};
pub use registry::GamepadRegistry;
