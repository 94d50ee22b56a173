//! # Controller Profile Module
//!
//! Button-to-action tables for the supported controller families.
//!
//! Button indices follow the W3C "standard" gamepad layout, which is also
//! what the evdev backend reports for every device:
//!
//! | Index | Standard button | Nintendo label |
//! |-------|-----------------|----------------|
//! | 0 | Bottom face | B |
//! | 1 | Right face | A |
//! | 2 | Left face | Y |
//! | 3 | Top face | X |
//! | 4 / 5 | Left / right shoulder | L / R |
//! | 6 / 7 | Left / right trigger | ZL / ZR |
//! | 8 / 9 | Select / start | Minus / plus |
//! | 12 / 13 | D-pad up / down | |
//! | 14 / 15 | D-pad left / right | |
//! | 16 | Home | Home |
//! | 17 | Capture | Capture |
//!
//! Browsers report a single Joy-Con held sideways in its own compact layout,
//! so the browser Joy-Con tables remap the rotated buttons. Under evdev the
//! Joy-Con buttons keep the indices above, so the [`ButtonLayout::Evdev`]
//! tables use those instead.

use serde::Deserialize;

/// Number of button slots in a [`ButtonMap`].
pub const BUTTON_SLOTS: usize = 18;

/// What a gamepad button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    NextPage,
    PreviousPage,
    ExitFullscreen,
}

/// How the gamepad source numbers its buttons.
///
/// Safari (WebKit) reports the A and Y face buttons at indices 0 and 3
/// instead of 1 and 2. Evdev numbers all pads, Joy-Cons included, by the
/// standard table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonLayout {
    /// Browser Gamepad API, standard mapping.
    #[default]
    Standard,
    /// Browser Gamepad API in WebKit.
    Safari,
    /// Linux evdev.
    Evdev,
}

impl ButtonLayout {
    /// Index of the A face button.
    pub fn a_index(self) -> usize {
        match self {
            ButtonLayout::Standard | ButtonLayout::Evdev => 1,
            ButtonLayout::Safari => 0,
        }
    }

    /// Index of the Y face button.
    pub fn y_index(self) -> usize {
        match self {
            ButtonLayout::Standard | ButtonLayout::Evdev => 2,
            ButtonLayout::Safari => 3,
        }
    }
}

/// Fixed table from button index to action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonMap {
    actions: [Option<ButtonAction>; BUTTON_SLOTS],
}

impl ButtonMap {
    /// A map with no buttons assigned.
    pub const fn empty() -> Self {
        Self {
            actions: [None; BUTTON_SLOTS],
        }
    }

    /// Assigns `action` to `index`. Indices past the table are ignored.
    #[must_use]
    pub fn with(mut self, index: usize, action: ButtonAction) -> Self {
        if let Some(slot) = self.actions.get_mut(index) {
            *slot = Some(action);
        }
        self
    }

    pub fn action(&self, index: usize) -> Option<ButtonAction> {
        self.actions.get(index).copied().flatten()
    }

    /// Assigned buttons in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ButtonAction)> + '_ {
        self.actions
            .iter()
            .enumerate()
            .filter_map(|(index, action)| action.map(|a| (index, a)))
    }
}

/// Controller families with their own button map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerProfile {
    /// Any controller not listed in [`KNOWN_CONTROLLERS`].
    Standard,
    JoyConLeft,
    JoyConRight,
}

/// Device id fragments of known controllers, checked in order.
///
/// Browsers report Joy-Cons as e.g. `"Joy-Con (L) (STANDARD GAMEPAD Vendor: 057e
/// Product: 2006)"` or `"57e-2006-Joy-Con (L)"`; the Linux driver names them
/// `"Nintendo Switch Left Joy-Con"`.
pub const KNOWN_CONTROLLERS: &[(&str, ControllerProfile)] = &[
    ("Joy-Con (L)", ControllerProfile::JoyConLeft),
    ("57e-2006", ControllerProfile::JoyConLeft),
    ("Vendor: 057e Product: 2006", ControllerProfile::JoyConLeft),
    ("Left Joy-Con", ControllerProfile::JoyConLeft),
    ("Joy-Con (R)", ControllerProfile::JoyConRight),
    ("57e-2007", ControllerProfile::JoyConRight),
    ("Vendor: 057e Product: 2007", ControllerProfile::JoyConRight),
    ("Right Joy-Con", ControllerProfile::JoyConRight),
];

impl ControllerProfile {
    /// Matches a device id against [`KNOWN_CONTROLLERS`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_presenter::gamepad::profile::ControllerProfile;
    ///
    /// assert_eq!(
    ///     ControllerProfile::identify("57e-2007-Joy-Con (R)"),
    ///     ControllerProfile::JoyConRight
    /// );
    /// assert_eq!(
    ///     ControllerProfile::identify("Xbox Wireless Controller"),
    ///     ControllerProfile::Standard
    /// );
    /// ```
    pub fn identify(id: &str) -> Self {
        KNOWN_CONTROLLERS
            .iter()
            .find(|(fragment, _)| id.contains(fragment))
            .map(|&(_, profile)| profile)
            .unwrap_or(ControllerProfile::Standard)
    }

    pub fn button_map(self, layout: ButtonLayout) -> ButtonMap {
        match (self, layout) {
            (ControllerProfile::Standard, _) => default_map(layout),
            (ControllerProfile::JoyConLeft, ButtonLayout::Evdev) => evdev_joycon_left_map(),
            (ControllerProfile::JoyConRight, ButtonLayout::Evdev) => evdev_joycon_right_map(),
            (ControllerProfile::JoyConLeft, _) => joycon_left_map(),
            (ControllerProfile::JoyConRight, _) => joycon_right_map(),
        }
    }
}

/// Full controllers: A / L / R / right forward, Y / ZL / ZR / left back,
/// Home and Capture leave fullscreen.
pub fn default_map(layout: ButtonLayout) -> ButtonMap {
    use ButtonAction::*;

    ButtonMap::empty()
        .with(layout.a_index(), NextPage)
        .with(layout.y_index(), PreviousPage)
        .with(4, NextPage) // L
        .with(5, NextPage) // R
        .with(6, PreviousPage) // ZL
        .with(7, PreviousPage) // ZR
        .with(14, PreviousPage) // D-pad left
        .with(15, NextPage) // D-pad right
        .with(16, ExitFullscreen) // Home
        .with(17, ExitFullscreen) // Capture
}

/// Left Joy-Con held sideways, browser numbering.
pub fn joycon_left_map() -> ButtonMap {
    use ButtonAction::*;

    ButtonMap::empty()
        .with(0, PreviousPage) // Left arrow
        .with(3, NextPage) // Right arrow
        .with(4, PreviousPage) // SL
        .with(5, NextPage) // SR
        .with(6, PreviousPage) // ZL
        .with(8, NextPage) // L
        .with(16, ExitFullscreen) // Capture
}

/// Right Joy-Con held sideways, browser numbering.
pub fn joycon_right_map() -> ButtonMap {
    use ButtonAction::*;

    ButtonMap::empty()
        .with(0, NextPage) // A
        .with(3, PreviousPage) // Y
        .with(4, NextPage) // SL
        .with(5, PreviousPage) // SR
        .with(7, PreviousPage) // ZR
        .with(8, NextPage) // R
        .with(16, ExitFullscreen) // Home
}

/// Left Joy-Con under evdev: arrows on the D-pad, Capture leaves fullscreen.
pub fn evdev_joycon_left_map() -> ButtonMap {
    use ButtonAction::*;

    ButtonMap::empty()
        .with(4, PreviousPage) // L
        .with(6, PreviousPage) // ZL
        .with(12, PreviousPage) // Up arrow
        .with(13, NextPage) // Down arrow
        .with(14, PreviousPage) // Left arrow
        .with(15, NextPage) // Right arrow
        .with(17, ExitFullscreen) // Capture
}

/// Right Joy-Con under evdev: face buttons page, Home leaves fullscreen.
pub fn evdev_joycon_right_map() -> ButtonMap {
    use ButtonAction::*;

    ButtonMap::empty()
        .with(0, NextPage) // B
        .with(1, NextPage) // A
        .with(2, PreviousPage) // Y
        .with(3, PreviousPage) // X
        .with(5, NextPage) // R
        .with(7, NextPage) // ZR
        .with(16, ExitFullscreen) // Home
}
