//! # Evdev Gamepad Module
//!
//! Reads gamepads through the Linux evdev interface.
//!
//! ## Detection
//!
//! Every `/dev/input/event*` node advertising any of the standard gamepad
//! buttons counts as a gamepad. A single Joy-Con has no `BTN_SOUTH`, so
//! the whole table is checked rather than one face button.
//! Nodes are rescanned periodically to pick up hot-plugged pads; a pad whose
//! state can no longer be read is reported as disconnected.
//!
//! ## Device Ids
//!
//! Ids are built as `"<name> (Vendor: vvvv Product: pppp)"`, e.g.
//! `"Nintendo Switch Right Joy-Con (Vendor: 057e Product: 2007)"`, so the
//! known-controller table matches them the same way as browser ids.
//!
//! ## Button Indices
//!
//! | Index | evdev Code | | Index | evdev Code |
//! |-------|------------|-|-------|------------|
//! | 0 | BTN_SOUTH | | 9 | BTN_START |
//! | 1 | BTN_EAST | | 10 | BTN_THUMBL |
//! | 2 | BTN_WEST | | 11 | BTN_THUMBR |
//! | 3 | BTN_NORTH | | 12 | BTN_DPAD_UP / ABS_HAT0Y < 0 |
//! | 4 | BTN_TL | | 13 | BTN_DPAD_DOWN / ABS_HAT0Y > 0 |
//! | 5 | BTN_TR | | 14 | BTN_DPAD_LEFT / ABS_HAT0X < 0 |
//! | 6 | BTN_TL2 | | 15 | BTN_DPAD_RIGHT / ABS_HAT0X > 0 |
//! | 7 | BTN_TR2 | | 16 | BTN_MODE |
//! | 8 | BTN_SELECT | | 17 | BTN_Z (capture) |

use async_trait::async_trait;
use evdev::{AbsoluteAxisType, AttributeSetRef, Device, Key};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info, warn};

use super::dispatcher::{GamepadEvent, GamepadSnapshot, GamepadSource};
use super::profile::{ButtonLayout, BUTTON_SLOTS};
use super::GamepadId;
use crate::error::{PresenterError, Result};

/// evdev key for each standard button index.
const STANDARD_BUTTONS: [Key; BUTTON_SLOTS] = [
    Key::BTN_SOUTH,
    Key::BTN_EAST,
    Key::BTN_WEST,
    Key::BTN_NORTH,
    Key::BTN_TL,
    Key::BTN_TR,
    Key::BTN_TL2,
    Key::BTN_TR2,
    Key::BTN_SELECT,
    Key::BTN_START,
    Key::BTN_THUMBL,
    Key::BTN_THUMBR,
    Key::BTN_DPAD_UP,
    Key::BTN_DPAD_DOWN,
    Key::BTN_DPAD_LEFT,
    Key::BTN_DPAD_RIGHT,
    Key::BTN_MODE,
    Key::BTN_Z,
];

const DPAD_UP: usize = 12;
const DPAD_DOWN: usize = 13;
const DPAD_LEFT: usize = 14;
const DPAD_RIGHT: usize = 15;

struct OpenPad {
    path: PathBuf,
    id: GamepadId,
    device: Device,
}

/// Gamepads found under an input directory.
pub struct EvdevGamepads {
    input_dir: PathBuf,
    rescan_interval: Duration,
    slots: Vec<Option<OpenPad>>,
    ignored: HashSet<PathBuf>,
    pending: VecDeque<GamepadEvent>,
    last_scan: Option<Instant>,
}

impl std::fmt::Debug for EvdevGamepads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.slots.iter().flatten().map(|pad| pad.id.as_str()).collect();
        f.debug_struct("EvdevGamepads")
            .field("input_dir", &self.input_dir)
            .field("pads", &ids)
            .finish_non_exhaustive()
    }
}

impl EvdevGamepads {
    /// Creates a source over `input_dir` (normally `/dev/input`).
    ///
    /// Nothing is opened until the first scan.
    pub fn new(input_dir: impl Into<PathBuf>, rescan_interval: Duration) -> Self {
        Self {
            input_dir: input_dir.into(),
            rescan_interval,
            slots: Vec::new(),
            ignored: HashSet::new(),
            pending: VecDeque::new(),
            last_scan: None,
        }
    }

    /// Number of pads currently open.
    pub fn connected(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Opens new gamepads and drops vanished ones, queueing hot-plug events.
    ///
    /// Returns the number of newly connected pads.
    ///
    /// # Errors
    ///
    /// Returns `Gamepad` error if the input directory cannot be read.
    pub fn scan(&mut self) -> Result<usize> {
        self.last_scan = Some(Instant::now());

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.input_dir)
            .map_err(|e| {
                PresenterError::Gamepad(format!("Failed to read {}: {}", self.input_dir.display(), e))
            })?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_event_node(path))
            .collect();

        // Sort for stable slot assignment when several pads are present
        paths.sort();

        for index in 0..self.slots.len() {
            let vanished = matches!(&self.slots[index], Some(pad) if !paths.contains(&pad.path));
            if vanished {
                self.release(index);
            }
        }
        self.ignored.retain(|path| paths.contains(path));

        let mut connected = 0;
        for path in paths {
            if self.ignored.contains(&path) || self.slots.iter().flatten().any(|pad| pad.path == path) {
                continue;
            }

            match Device::open(&path) {
                Ok(device) if is_gamepad(&device) => {
                    let id = device_id(&device);
                    let index = self.free_slot();
                    info!("Found gamepad '{}' at {}", id, path.display());
                    self.pending.push_back(GamepadEvent::Connected {
                        index,
                        id: id.clone(),
                    });
                    self.slots[index] = Some(OpenPad { path, id, device });
                    connected += 1;
                }
                Ok(_) => {
                    debug!("Skipping non-gamepad input device {}", path.display());
                    self.ignored.insert(path);
                }
                Err(e) => {
                    // Permission denied or not an evdev node - retry next scan
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Ok(connected)
    }

    fn rescan_if_due(&mut self) {
        let due = !self
            .last_scan
            .is_some_and(|at| at.elapsed() < self.rescan_interval);
        if due {
            if let Err(e) = self.scan() {
                debug!("Gamepad scan failed: {}", e);
            }
        }
    }

    fn free_slot(&mut self) -> usize {
        match self.slots.iter().position(Option::is_none) {
            Some(index) => index,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) {
        if let Some(pad) = self.slots.get_mut(index).and_then(Option::take) {
            info!("Gamepad '{}' at {} disconnected", pad.id, pad.path.display());
            self.pending.push_back(GamepadEvent::Disconnected { index, id: pad.id });
        }
    }
}

#[async_trait]
impl GamepadSource for EvdevGamepads {
    fn gamepads(&mut self) -> Vec<GamepadSnapshot> {
        self.rescan_if_due();

        let mut pads = Vec::new();
        let mut lost = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(pad) = slot else { continue };
            match read_buttons(&pad.device) {
                Ok(buttons) => pads.push(GamepadSnapshot {
                    index,
                    id: pad.id.clone(),
                    buttons,
                }),
                Err(e) => {
                    warn!("Lost gamepad '{}': {}", pad.id, e);
                    lost.push(index);
                }
            }
        }

        for index in lost {
            self.release(index);
        }
        pads
    }

    fn poll_event(&mut self) -> Option<GamepadEvent> {
        self.rescan_if_due();
        self.pending.pop_front()
    }

    async fn next_event(&mut self) -> Option<GamepadEvent> {
        loop {
            if self.pending.is_empty() {
                if let Err(e) = self.scan() {
                    debug!("Gamepad scan failed: {}", e);
                }
            }
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            sleep(self.rescan_interval).await;
        }
    }

    fn button_layout(&self) -> Option<ButtonLayout> {
        Some(ButtonLayout::Evdev)
    }
}

fn is_event_node(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with("event"))
}

fn is_gamepad(device: &Device) -> bool {
    device.supported_keys().is_some_and(has_gamepad_buttons)
}

fn has_gamepad_buttons(keys: &AttributeSetRef<Key>) -> bool {
    STANDARD_BUTTONS.iter().any(|&key| keys.contains(key))
}

fn device_id(device: &Device) -> GamepadId {
    let input_id = device.input_id();
    format!(
        "{} (Vendor: {:04x} Product: {:04x})",
        device.name().unwrap_or("Unknown Gamepad"),
        input_id.vendor(),
        input_id.product()
    )
}

fn read_buttons(device: &Device) -> io::Result<Vec<bool>> {
    let keys = device.get_key_state()?;
    let mut buttons: Vec<bool> = STANDARD_BUTTONS.iter().map(|&key| keys.contains(key)).collect();

    let has_hat = device
        .supported_absolute_axes()
        .is_some_and(|axes| axes.contains(AbsoluteAxisType::ABS_HAT0X));
    if has_hat {
        let axes = device.get_abs_state()?;
        let hat_x = axes[AbsoluteAxisType::ABS_HAT0X.0 as usize].value;
        let hat_y = axes[AbsoluteAxisType::ABS_HAT0Y.0 as usize].value;
        apply_hat(&mut buttons, hat_x, hat_y);
    }

    Ok(buttons)
}

/// Folds a hat-switch d-pad into the d-pad button slots.
fn apply_hat(buttons: &mut [bool], hat_x: i32, hat_y: i32) {
    buttons[DPAD_UP] |= hat_y < 0;
    buttons[DPAD_DOWN] |= hat_y > 0;
    buttons[DPAD_LEFT] |= hat_x < 0;
    buttons[DPAD_RIGHT] |= hat_x > 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::AttributeSet;

    #[test]
    fn test_standard_button_table() {
        assert_eq!(STANDARD_BUTTONS.len(), BUTTON_SLOTS);
        assert_eq!(STANDARD_BUTTONS[1], Key::BTN_EAST, "A (right face) is index 1");
        assert_eq!(STANDARD_BUTTONS[DPAD_LEFT], Key::BTN_DPAD_LEFT);
        assert_eq!(STANDARD_BUTTONS[16], Key::BTN_MODE);
    }

    #[test]
    fn test_apply_hat() {
        let mut buttons = vec![false; BUTTON_SLOTS];
        apply_hat(&mut buttons, -1, 0);
        assert!(buttons[DPAD_LEFT]);
        assert!(!buttons[DPAD_RIGHT]);
        assert!(!buttons[DPAD_UP] && !buttons[DPAD_DOWN]);

        let mut buttons = vec![false; BUTTON_SLOTS];
        apply_hat(&mut buttons, 1, 1);
        assert!(buttons[DPAD_RIGHT] && buttons[DPAD_DOWN]);
    }

    #[test]
    fn test_apply_hat_keeps_pressed_dpad_buttons() {
        let mut buttons = vec![false; BUTTON_SLOTS];
        buttons[DPAD_UP] = true;
        apply_hat(&mut buttons, 0, 0);
        assert!(buttons[DPAD_UP]);
    }

    #[test]
    fn test_gamepad_detection_without_south_button() {
        let mut left_joycon = AttributeSet::<Key>::new();
        for key in [Key::BTN_TL, Key::BTN_TL2, Key::BTN_DPAD_LEFT, Key::BTN_DPAD_RIGHT, Key::BTN_Z] {
            left_joycon.insert(key);
        }
        assert!(has_gamepad_buttons(&left_joycon));

        let mut mouse = AttributeSet::<Key>::new();
        mouse.insert(Key::BTN_LEFT);
        mouse.insert(Key::BTN_RIGHT);
        assert!(!has_gamepad_buttons(&mouse));

        let mut keyboard = AttributeSet::<Key>::new();
        keyboard.insert(Key::KEY_A);
        keyboard.insert(Key::KEY_SPACE);
        assert!(!has_gamepad_buttons(&keyboard));
    }

    #[test]
    fn test_source_reports_evdev_numbering() {
        let source = EvdevGamepads::new("/dev/input", Duration::from_secs(1));
        assert_eq!(source.button_layout(), Some(ButtonLayout::Evdev));
    }

    #[test]
    fn test_event_node_filter() {
        assert!(is_event_node(Path::new("/dev/input/event3")));
        assert!(!is_event_node(Path::new("/dev/input/js0")));
        assert!(!is_event_node(Path::new("/dev/input/mice")));
    }

    #[test]
    fn test_scan_missing_directory() {
        let mut source = EvdevGamepads::new("/nonexistent/input", Duration::from_secs(1));
        match source.scan() {
            Err(PresenterError::Gamepad(msg)) => assert!(msg.contains("/nonexistent/input")),
            other => panic!("Expected Gamepad error, got: {:?}", other),
        }
        assert!(source.gamepads().is_empty());
        assert!(source.poll_event().is_none());
    }

    #[test]
    fn test_scan_skips_non_device_nodes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("event0"), b"not a device").unwrap();
        fs::write(dir.path().join("mouse0"), b"").unwrap();

        let mut source = EvdevGamepads::new(dir.path(), Duration::from_secs(1));

        assert_eq!(source.scan().unwrap(), 0);
        assert_eq!(source.connected(), 0);
        assert!(source.poll_event().is_none());
    }

    // Integration test - only runs with real hardware
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_detect_real_gamepad() {
        let mut source = EvdevGamepads::new("/dev/input", Duration::from_millis(200));

        match source.next_event().await {
            Some(GamepadEvent::Connected { id, .. }) => {
                println!("Found gamepad: {}", id);
                assert_eq!(source.gamepads().len(), source.connected());
            }
            other => panic!("Expected a connected gamepad, got: {:?}", other),
        }
    }
}
