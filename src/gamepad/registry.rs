//! Registry of button maps for connected gamepads, keyed by device id.

use std::collections::HashMap;
use tracing::{debug, info};

use super::profile::{ButtonLayout, ButtonMap, ControllerProfile};
use super::GamepadId;

/// Button maps of connected gamepads.
///
/// Devices without an entry use the default map for the platform layout.
///
/// # Examples
///
/// ```
/// use pdf_presenter::gamepad::{ButtonAction, ButtonLayout, ControllerProfile, GamepadRegistry};
///
/// let mut registry = GamepadRegistry::new(ButtonLayout::Standard);
/// let profile = registry.connect("Joy-Con (R) Gamepad");
/// assert_eq!(profile, ControllerProfile::JoyConRight);
/// assert_eq!(registry.map_for("Joy-Con (R) Gamepad").action(0), Some(ButtonAction::NextPage));
/// ```
#[derive(Debug, Clone)]
pub struct GamepadRegistry {
    default_map: ButtonMap,
    layout: ButtonLayout,
    maps: HashMap<GamepadId, ButtonMap>,
}

impl GamepadRegistry {
    pub fn new(layout: ButtonLayout) -> Self {
        Self {
            default_map: ControllerProfile::Standard.button_map(layout),
            layout,
            maps: HashMap::new(),
        }
    }

    /// Registers the map for a newly connected device and returns its profile.
    pub fn connect(&mut self, id: &str) -> ControllerProfile {
        let profile = ControllerProfile::identify(id);
        if profile == ControllerProfile::Standard {
            debug!("Unknown controller '{}', using default layout", id);
        }
        info!("Gamepad connected: '{}' ({:?})", id, profile);
        self.maps.insert(id.to_string(), profile.button_map(self.layout));
        profile
    }

    /// Drops the map of a disconnected device. Returns false if none was registered.
    pub fn disconnect(&mut self, id: &str) -> bool {
        let removed = self.maps.remove(id).is_some();
        info!("Gamepad disconnected: '{}'", id);
        removed
    }

    /// Registered map for `id`, if any.
    pub fn get(&self, id: &str) -> Option<&ButtonMap> {
        self.maps.get(id)
    }

    /// Map to dispatch with: the registered one or the default.
    pub fn map_for(&self, id: &str) -> &ButtonMap {
        self.maps.get(id).unwrap_or(&self.default_map)
    }

    pub fn default_map(&self) -> &ButtonMap {
        &self.default_map
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
