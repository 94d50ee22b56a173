//! # Gamepad Dispatcher Module
//!
//! Polls connected gamepads once per display refresh and runs the mapped
//! action for every button that went from released to pressed.
//!
//! ## Ordering
//!
//! Pads are handled in enumeration order and buttons in index order. Each
//! action is awaited before the next one starts, so a slow action delays
//! the remaining edges of the same cycle.
//!
//! ## Usage
//!
//! ```no_run
//! use pdf_presenter::gamepad::evdev_source::EvdevGamepads;
//! use pdf_presenter::gamepad::{ActionSender, ButtonLayout, GamepadDispatcher};
//! use tokio::sync::mpsc;
//! use tokio::time::Duration;
//!
//! # async fn example() {
//! let (tx, mut actions) = mpsc::unbounded_channel();
//! let source = EvdevGamepads::new("/dev/input", Duration::from_secs(1));
//! let mut dispatcher = GamepadDispatcher::new(source, ButtonLayout::Standard, 60);
//!
//! tokio::spawn(async move { dispatcher.run(&mut ActionSender::new(tx)).await });
//! while let Some(action) = actions.recv().await {
//!     println!("{:?}", action);
//! }
//! # }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use super::profile::{ButtonAction, ButtonLayout};
use super::registry::GamepadRegistry;
use super::GamepadId;
use crate::error::{PresenterError, Result};

/// Button state of one connected pad at one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamepadSnapshot {
    /// Slot the platform assigned to the pad.
    pub index: usize,
    pub id: GamepadId,
    /// Pressed flag per button index.
    pub buttons: Vec<bool>,
}

/// Hot-plug notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamepadEvent {
    Connected { index: usize, id: GamepadId },
    Disconnected { index: usize, id: GamepadId },
}

/// Where the dispatcher reads pads from.
#[async_trait]
pub trait GamepadSource: Send {
    /// Currently connected pads in enumeration order.
    fn gamepads(&mut self) -> Vec<GamepadSnapshot>;

    /// Next already-queued hot-plug event, without waiting.
    fn poll_event(&mut self) -> Option<GamepadEvent>;

    /// Waits for the next hot-plug event. `None` means no more can arrive.
    async fn next_event(&mut self) -> Option<GamepadEvent>;

    /// Button numbering this source always uses, if fixed.
    fn button_layout(&self) -> Option<ButtonLayout> {
        None
    }
}

/// Performs gamepad actions.
#[async_trait]
pub trait ActionSink: Send {
    async fn perform(&mut self, action: ButtonAction) -> Result<()>;
}

/// [`ActionSink`] forwarding actions to the task that owns the presenter.
#[derive(Debug, Clone)]
pub struct ActionSender {
    tx: mpsc::UnboundedSender<ButtonAction>,
}

impl ActionSender {
    pub fn new(tx: mpsc::UnboundedSender<ButtonAction>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl ActionSink for ActionSender {
    async fn perform(&mut self, action: ButtonAction) -> Result<()> {
        self.tx
            .send(action)
            .map_err(|e| PresenterError::Gamepad(format!("Action receiver closed, dropped {:?}", e.0)))
    }
}

/// Previous poll's button states per pad slot.
///
/// A slot without history counts as all released.
#[derive(Debug, Default, Clone)]
pub struct LastButtonStates {
    states: HashMap<usize, Vec<bool>>,
}

impl LastButtonStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices pressed in `current` but not in the stored state of `slot`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_presenter::gamepad::LastButtonStates;
    ///
    /// let mut states = LastButtonStates::new();
    /// assert_eq!(states.rising_edges(0, &[true, false]), vec![0]);
    ///
    /// states.store(0, vec![true, false]);
    /// assert_eq!(states.rising_edges(0, &[true, true]), vec![1]);
    /// ```
    pub fn rising_edges(&self, slot: usize, current: &[bool]) -> Vec<usize> {
        let previous = self.states.get(&slot);
        current
            .iter()
            .enumerate()
            .filter(|&(index, &pressed)| {
                let was_pressed = previous
                    .and_then(|states| states.get(index).copied())
                    .unwrap_or(false);
                pressed && !was_pressed
            })
            .map(|(index, _)| index)
            .collect()
    }

    pub fn store(&mut self, slot: usize, buttons: Vec<bool>) {
        self.states.insert(slot, buttons);
    }

    pub fn forget(&mut self, slot: usize) {
        self.states.remove(&slot);
    }

    pub fn get(&self, slot: usize) -> Option<&[bool]> {
        self.states.get(&slot).map(Vec::as_slice)
    }
}

/// Edge-triggered gamepad poller.
#[derive(Debug)]
pub struct GamepadDispatcher<S> {
    source: S,
    registry: GamepadRegistry,
    last_states: LastButtonStates,
    frame_period: Duration,
}

impl<S: GamepadSource> GamepadDispatcher<S> {
    /// Creates a dispatcher polling at `refresh_rate_hz`.
    ///
    /// A source with its own button numbering overrides `layout`.
    pub fn new(source: S, layout: ButtonLayout, refresh_rate_hz: u32) -> Self {
        let period_us = 1_000_000 / u64::from(refresh_rate_hz.max(1));
        let layout = match source.button_layout() {
            Some(fixed) if fixed != layout => {
                debug!("Source numbers buttons as {:?}, ignoring {:?}", fixed, layout);
                fixed
            }
            _ => layout,
        };
        Self {
            source,
            registry: GamepadRegistry::new(layout),
            last_states: LastButtonStates::new(),
            frame_period: Duration::from_micros(period_us),
        }
    }

    pub fn registry(&self) -> &GamepadRegistry {
        &self.registry
    }

    pub fn last_states(&self) -> &LastButtonStates {
        &self.last_states
    }

    pub fn frame_period(&self) -> Duration {
        self.frame_period
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Updates the registry for a hot-plug event.
    pub fn apply_event(&mut self, event: GamepadEvent) {
        match event {
            GamepadEvent::Connected { id, .. } => {
                self.registry.connect(&id);
            }
            GamepadEvent::Disconnected { index, id } => {
                self.registry.disconnect(&id);
                // A pad reusing this slot starts from all released
                self.last_states.forget(index);
            }
        }
    }

    /// Runs one poll cycle over `pads`. Returns the number of actions run.
    ///
    /// Failed actions are logged and do not stop the cycle.
    pub async fn poll_cycle<A: ActionSink + ?Sized>(
        &mut self,
        pads: &[GamepadSnapshot],
        sink: &mut A,
    ) -> usize {
        let mut performed = 0;

        for pad in pads {
            let map = *self.registry.map_for(&pad.id);

            for index in self.last_states.rising_edges(pad.index, &pad.buttons) {
                let Some(action) = map.action(index) else {
                    trace!("Unmapped button {} on '{}'", index, pad.id);
                    continue;
                };
                debug!("Button {} on '{}' -> {:?}", index, pad.id, action);
                if let Err(e) = sink.perform(action).await {
                    warn!("Gamepad action {:?} failed: {}", action, e);
                }
                performed += 1;
            }

            self.last_states.store(pad.index, pad.buttons.clone());
        }

        performed
    }

    /// Polls until the source reports that no more pads can connect.
    ///
    /// While no pad is connected the loop sleeps until the next hot-plug event.
    pub async fn run<A: ActionSink + ?Sized>(&mut self, sink: &mut A) {
        let mut frame = interval(self.frame_period);
        frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Gamepad polling started ({:.0}Hz)",
            1.0 / self.frame_period.as_secs_f64()
        );

        loop {
            while let Some(event) = self.source.poll_event() {
                self.apply_event(event);
            }

            let pads = self.source.gamepads();
            if pads.is_empty() {
                debug!("Waiting for gamepad connection");
                match self.source.next_event().await {
                    Some(event) => self.apply_event(event),
                    None => break,
                }
                continue;
            }

            frame.tick().await;
            self.poll_cycle(&pads, sink).await;
        }

        info!("Gamepad source closed, polling stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Source replaying one pad list per poll
    struct ScriptedSource {
        frames: VecDeque<Vec<GamepadSnapshot>>,
        pending: VecDeque<GamepadEvent>,
        on_wait: VecDeque<GamepadEvent>,
        waits: usize,
        layout: Option<ButtonLayout>,
    }

    impl ScriptedSource {
        fn new(frames: Vec<Vec<GamepadSnapshot>>) -> Self {
            Self {
                frames: frames.into(),
                pending: VecDeque::new(),
                on_wait: VecDeque::new(),
                waits: 0,
                layout: None,
            }
        }
    }

    #[async_trait]
    impl GamepadSource for ScriptedSource {
        fn gamepads(&mut self) -> Vec<GamepadSnapshot> {
            self.frames.pop_front().unwrap_or_default()
        }

        fn poll_event(&mut self) -> Option<GamepadEvent> {
            self.pending.pop_front()
        }

        async fn next_event(&mut self) -> Option<GamepadEvent> {
            self.waits += 1;
            self.on_wait.pop_front()
        }

        fn button_layout(&self) -> Option<ButtonLayout> {
            self.layout
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        actions: Vec<ButtonAction>,
        fail_on: Option<ButtonAction>,
    }

    #[async_trait]
    impl ActionSink for RecordingSink {
        async fn perform(&mut self, action: ButtonAction) -> Result<()> {
            // Yield so the action really is asynchronous
            tokio::task::yield_now().await;
            self.actions.push(action);
            if self.fail_on == Some(action) {
                return Err(PresenterError::Gamepad("boom".to_string()));
            }
            Ok(())
        }
    }

    fn pad(index: usize, id: &str, pressed: &[usize]) -> GamepadSnapshot {
        let mut buttons = vec![false; 18];
        for &button in pressed {
            buttons[button] = true;
        }
        GamepadSnapshot {
            index,
            id: id.to_string(),
            buttons,
        }
    }

    fn dispatcher(frames: Vec<Vec<GamepadSnapshot>>) -> GamepadDispatcher<ScriptedSource> {
        GamepadDispatcher::new(ScriptedSource::new(frames), ButtonLayout::Standard, 1000)
    }

    const RIGHT: &str = "Joy-Con (R) Gamepad";
    const PAD: &str = "Xbox Wireless Controller";

    #[tokio::test]
    async fn test_held_button_fires_once() {
        let mut dispatcher = dispatcher(vec![]);
        let mut sink = RecordingSink::default();

        for _ in 0..5 {
            dispatcher.poll_cycle(&[pad(0, PAD, &[1])], &mut sink).await;
        }

        assert_eq!(sink.actions, vec![ButtonAction::NextPage]);
    }

    #[tokio::test]
    async fn test_release_then_press_fires_again() {
        let mut dispatcher = dispatcher(vec![]);
        let mut sink = RecordingSink::default();

        dispatcher.poll_cycle(&[pad(0, PAD, &[15])], &mut sink).await;
        dispatcher.poll_cycle(&[pad(0, PAD, &[])], &mut sink).await;
        dispatcher.poll_cycle(&[pad(0, PAD, &[15])], &mut sink).await;

        assert_eq!(sink.actions, vec![ButtonAction::NextPage, ButtonAction::NextPage]);
    }

    #[tokio::test]
    async fn test_buttons_fire_in_index_order() {
        let mut dispatcher = dispatcher(vec![]);
        let mut sink = RecordingSink::default();

        let performed = dispatcher
            .poll_cycle(&[pad(0, PAD, &[16, 2, 5, 3])], &mut sink)
            .await;

        assert_eq!(performed, 3, "Button 3 is unmapped on the standard layout");
        assert_eq!(
            sink.actions,
            vec![
                ButtonAction::PreviousPage,
                ButtonAction::NextPage,
                ButtonAction::ExitFullscreen
            ]
        );
    }

    #[tokio::test]
    async fn test_pads_use_their_registered_map() {
        let mut dispatcher = dispatcher(vec![]);
        dispatcher.apply_event(GamepadEvent::Connected {
            index: 0,
            id: RIGHT.to_string(),
        });
        let mut sink = RecordingSink::default();

        // Button 0 is A on a sideways right Joy-Con, unmapped on a full pad
        dispatcher
            .poll_cycle(&[pad(0, RIGHT, &[0]), pad(1, PAD, &[0])], &mut sink)
            .await;

        assert_eq!(sink.actions, vec![ButtonAction::NextPage]);
    }

    #[tokio::test]
    async fn test_unregistered_pad_uses_default_map() {
        let mut dispatcher = dispatcher(vec![]);
        let mut sink = RecordingSink::default();

        dispatcher.poll_cycle(&[pad(3, RIGHT, &[0, 2])], &mut sink).await;

        assert_eq!(sink.actions, vec![ButtonAction::PreviousPage]);
    }

    #[tokio::test]
    async fn test_slots_are_tracked_separately() {
        let mut dispatcher = dispatcher(vec![]);
        let mut sink = RecordingSink::default();

        dispatcher
            .poll_cycle(&[pad(0, PAD, &[4]), pad(1, PAD, &[])], &mut sink)
            .await;
        dispatcher
            .poll_cycle(&[pad(0, PAD, &[4]), pad(1, PAD, &[4])], &mut sink)
            .await;

        assert_eq!(sink.actions, vec![ButtonAction::NextPage, ButtonAction::NextPage]);
        assert_eq!(dispatcher.last_states().get(1).map(|s| s[4]), Some(true));
    }

    #[tokio::test]
    async fn test_failed_action_does_not_stop_cycle() {
        let mut dispatcher = dispatcher(vec![]);
        let mut sink = RecordingSink {
            fail_on: Some(ButtonAction::ExitFullscreen),
            ..Default::default()
        };

        let performed = dispatcher
            .poll_cycle(&[pad(0, PAD, &[16, 17])], &mut sink)
            .await;

        assert_eq!(performed, 2);
        assert_eq!(sink.actions.len(), 2);
    }

    #[tokio::test]
    async fn test_linux_joycon_uses_evdev_numbering() {
        const LINUX_LEFT: &str = "Nintendo Switch Left Joy-Con (Vendor: 057e Product: 2006)";

        let mut source = ScriptedSource::new(vec![]);
        source.layout = Some(ButtonLayout::Evdev);
        // Configured layout is overridden by the source
        let mut dispatcher = GamepadDispatcher::new(source, ButtonLayout::Safari, 1000);
        dispatcher.apply_event(GamepadEvent::Connected {
            index: 0,
            id: LINUX_LEFT.to_string(),
        });
        let mut sink = RecordingSink::default();

        let frames: [&[usize]; 7] = [&[14], &[], &[15], &[], &[17], &[], &[8]];
        for pressed in frames {
            dispatcher
                .poll_cycle(&[pad(0, LINUX_LEFT, pressed)], &mut sink)
                .await;
        }

        assert_eq!(
            sink.actions,
            vec![
                ButtonAction::PreviousPage,
                ButtonAction::NextPage,
                ButtonAction::ExitFullscreen,
            ]
        );
    }

    #[tokio::test]
    async fn test_disconnect_forgets_slot_and_map() {
        let mut dispatcher = dispatcher(vec![]);
        let mut sink = RecordingSink::default();
        dispatcher.apply_event(GamepadEvent::Connected {
            index: 0,
            id: RIGHT.to_string(),
        });
        dispatcher.poll_cycle(&[pad(0, RIGHT, &[0])], &mut sink).await;

        dispatcher.apply_event(GamepadEvent::Disconnected {
            index: 0,
            id: RIGHT.to_string(),
        });

        assert!(dispatcher.registry().get(RIGHT).is_none());
        assert!(dispatcher.last_states().get(0).is_none());
    }

    #[tokio::test]
    async fn test_run_waits_for_connection_then_polls() {
        let frames = vec![
            vec![],
            vec![pad(0, RIGHT, &[0])],
            vec![pad(0, RIGHT, &[0])],
            vec![pad(0, RIGHT, &[])],
            vec![pad(0, RIGHT, &[3])],
        ];
        let mut source = ScriptedSource::new(frames);
        source.on_wait.push_back(GamepadEvent::Connected {
            index: 0,
            id: RIGHT.to_string(),
        });
        let mut dispatcher = GamepadDispatcher::new(source, ButtonLayout::Standard, 1000);
        let mut sink = RecordingSink::default();

        dispatcher.run(&mut sink).await;

        assert_eq!(
            sink.actions,
            vec![ButtonAction::NextPage, ButtonAction::PreviousPage]
        );
        // One wait before the pad showed up, one after the script ran out
        assert_eq!(dispatcher.source_mut().waits, 2);
    }

    #[tokio::test]
    async fn test_run_applies_queued_events_before_polling() {
        let mut source = ScriptedSource::new(vec![vec![pad(0, RIGHT, &[0])]]);
        source.pending.push_back(GamepadEvent::Connected {
            index: 0,
            id: RIGHT.to_string(),
        });
        let mut dispatcher = GamepadDispatcher::new(source, ButtonLayout::Standard, 1000);
        let mut sink = RecordingSink::default();

        dispatcher.run(&mut sink).await;

        assert_eq!(sink.actions, vec![ButtonAction::NextPage]);
        assert_eq!(dispatcher.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_action_sender_forwards() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sender = ActionSender::new(tx);

        sender.perform(ButtonAction::PreviousPage).await.unwrap();
        assert_eq!(rx.recv().await, Some(ButtonAction::PreviousPage));

        drop(rx);
        assert!(matches!(
            sender.perform(ButtonAction::NextPage).await,
            Err(PresenterError::Gamepad(_))
        ));
    }

    #[test]
    fn test_frame_period_from_refresh_rate() {
        let dispatcher = GamepadDispatcher::new(ScriptedSource::new(vec![]), ButtonLayout::Standard, 60);
        assert_eq!(dispatcher.frame_period(), Duration::from_micros(16_666));
    }
}
