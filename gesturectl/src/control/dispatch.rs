//! Mode-dependent action dispatch.
//!
//! Rate-gated modes (media, window, presentation) fire at most one discrete
//! effect per cooldown window.  Mouse mode is continuous: cursor motion on
//! every eligible frame, with edge-triggered clicks and drag.

use anyhow::Result;
use tracing::{debug, info, warn};

use super::action::{self, Effect, MouseAction};
use super::mode::Mode;
use super::sink::{ActionSink, VolumeControl};
use crate::gesture::Gesture;

/// Scroll notches per pixel of vertical palm travel.
const SCROLL_GAIN: f64 = 2.0;

/// Scroll requests at or below this magnitude are dropped as jitter.
const SCROLL_DEADZONE: u32 = 5;

// ── Config ─────────────────────────────────────────────────

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Target screen size in pixels.
    pub screen_width: u32,
    pub screen_height: u32,
    /// Camera frame size the palm coordinates refer to.
    pub reference_width: u32,
    pub reference_height: u32,
    /// Weight kept on the current cursor position when moving (0 = jump).
    pub mouse_smoothing: f64,
    /// How volume effects reach the host.
    pub volume: VolumeControl,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            screen_width: 1920,
            screen_height: 1080,
            reference_width: 640,
            reference_height: 480,
            mouse_smoothing: 0.3,
            volume: VolumeControl::default(),
        }
    }
}

// ── State ──────────────────────────────────────────────────

/// Which mouse button a held click gesture has already fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickLatch {
    Left,
    Right,
}

/// Mutable dispatch state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchState {
    /// Time of the last successful rate-gated effect, shared by all
    /// rate-gated modes.
    pub last_action_s: Option<f64>,
    /// Set while a click gesture is held after firing.
    pub click_latch: Option<ClickLatch>,
    /// Set between mouse-down and mouse-up of a thumbs-up drag.
    pub is_dragging: bool,
}

/// Palm position handed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PalmPosition {
    pub x: i32,
    pub y: i32,
    /// The classifier's vertical baseline, used as the scroll anchor.
    pub baseline_y: Option<i32>,
}

// ── Dispatcher ─────────────────────────────────────────────

/// Maps `(mode, gesture)` to effects and applies timing rules.
#[derive(Debug, Clone, Default)]
pub struct ModeActionDispatcher {
    pub config: DispatchConfig,
    state: DispatchState,
}

impl ModeActionDispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            state: DispatchState::default(),
        }
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    /// Dispatch an actionable gesture.  Returns whether an action was taken.
    ///
    /// Sink failures are logged and reported as `false`; they never consume
    /// the cooldown.
    pub fn dispatch(
        &mut self,
        mode: Mode,
        gesture: Gesture,
        palm: PalmPosition,
        now_s: f64,
        cooldown_s: f64,
        sink: &mut dyn ActionSink,
    ) -> bool {
        if mode.is_rate_gated() {
            self.dispatch_rate_gated(mode, gesture, now_s, cooldown_s, sink)
        } else {
            self.dispatch_mouse(gesture, palm, sink)
        }
    }

    fn dispatch_rate_gated(
        &mut self,
        mode: Mode,
        gesture: Gesture,
        now_s: f64,
        cooldown_s: f64,
        sink: &mut dyn ActionSink,
    ) -> bool {
        if let Some(last) = self.state.last_action_s {
            if now_s - last < cooldown_s {
                return false;
            }
        }

        let Some(binding) = action::lookup(mode, gesture) else {
            return false;
        };

        match self.apply_effect(binding.effect, sink) {
            Ok(()) => {
                info!(mode = mode.as_str(), gesture = gesture.as_str(), "{}", binding.label);
                self.state.last_action_s = Some(now_s);
                true
            }
            Err(e) => {
                warn!(mode = mode.as_str(), gesture = gesture.as_str(), "{} failed: {:#}", binding.label, e);
                false
            }
        }
    }

    fn apply_effect(&self, effect: Effect, sink: &mut dyn ActionSink) -> Result<()> {
        match effect {
            Effect::Key(key) => sink.press_key(key),
            Effect::Hotkey(keys) => sink.hotkey(keys),
            Effect::Volume(delta) => self.config.volume.adjust(sink, delta),
        }
    }

    fn dispatch_mouse(
        &mut self,
        gesture: Gesture,
        palm: PalmPosition,
        sink: &mut dyn ActionSink,
    ) -> bool {
        let action = action::mouse_action(gesture);

        let mut taken = match action {
            Some(MouseAction::MoveCursor) => self.move_cursor(palm, sink),
            Some(MouseAction::LeftClick) => self.latched_click(ClickLatch::Left, sink),
            Some(MouseAction::RightClick) => self.latched_click(ClickLatch::Right, sink),
            Some(MouseAction::Scroll) => self.scroll(palm, sink),
            Some(MouseAction::Drag) => self.begin_drag(sink),
            None => false,
        };

        if !matches!(action, Some(MouseAction::LeftClick | MouseAction::RightClick)) {
            self.state.click_latch = None;
        }
        if action != Some(MouseAction::Drag) && self.state.is_dragging {
            taken |= self.end_drag(sink);
        }

        taken
    }

    /// Move the cursor part of the way toward the palm's screen position.
    fn move_cursor(&self, palm: PalmPosition, sink: &mut dyn ActionSink) -> bool {
        let c = &self.config;
        let target_x = (palm.x as f64 * c.screen_width as f64 / c.reference_width as f64) as i32;
        let target_y = (palm.y as f64 * c.screen_height as f64 / c.reference_height as f64) as i32;

        let result = sink.cursor_position().and_then(|(cur_x, cur_y)| {
            let follow = 1.0 - c.mouse_smoothing;
            let x = cur_x.saturating_add(((target_x as f64 - cur_x as f64) * follow) as i32);
            let y = cur_y.saturating_add(((target_y as f64 - cur_y as f64) * follow) as i32);
            sink.move_cursor_to(x, y)
        });

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Cursor move failed: {:#}", e);
                false
            }
        }
    }

    /// Fire a click once per held gesture.  The latch remembers which button
    /// fired, so switching directly between pinch and peace clicks the other
    /// button instead of being suppressed.
    fn latched_click(&mut self, button: ClickLatch, sink: &mut dyn ActionSink) -> bool {
        if self.state.click_latch == Some(button) {
            return true;
        }

        let result = match button {
            ClickLatch::Left => sink.click(),
            ClickLatch::Right => sink.right_click(),
        };

        match result {
            Ok(()) => {
                info!("{}", if button == ClickLatch::Left { "click" } else { "right click" });
                self.state.click_latch = Some(button);
                true
            }
            Err(e) => {
                warn!("Click failed: {:#}", e);
                self.state.click_latch = None;
                false
            }
        }
    }

    fn scroll(&self, palm: PalmPosition, sink: &mut dyn ActionSink) -> bool {
        let Some(anchor) = palm.baseline_y else {
            return false;
        };
        let amount = ((i64::from(palm.y) - i64::from(anchor)) as f64 * SCROLL_GAIN) as i32;
        if amount.unsigned_abs() <= SCROLL_DEADZONE {
            return false;
        }

        match sink.scroll(amount) {
            Ok(()) => {
                debug!("Scroll {}", amount);
                true
            }
            Err(e) => {
                warn!("Scroll failed: {:#}", e);
                false
            }
        }
    }

    fn begin_drag(&mut self, sink: &mut dyn ActionSink) -> bool {
        if self.state.is_dragging {
            return true;
        }
        match sink.mouse_down() {
            Ok(()) => {
                info!("drag start");
                self.state.is_dragging = true;
                true
            }
            Err(e) => {
                warn!("Drag start failed: {:#}", e);
                false
            }
        }
    }

    /// Release an active drag.  On failure the drag stays active so the next
    /// frame retries the release.
    fn end_drag(&mut self, sink: &mut dyn ActionSink) -> bool {
        match sink.mouse_up() {
            Ok(()) => {
                info!("drag end");
                self.state.is_dragging = false;
                true
            }
            Err(e) => {
                warn!("Drag release failed: {:#}", e);
                false
            }
        }
    }

    /// Clear per-gesture dispatch state, releasing a held drag first.  The
    /// cooldown clock survives so a mode switch cannot fire twice in a row.
    pub fn reset(&mut self, sink: &mut dyn ActionSink) {
        if self.state.is_dragging {
            if let Err(e) = sink.mouse_up() {
                warn!("Drag release on reset failed: {:#}", e);
            }
        }
        self.state = DispatchState {
            last_action_s: self.state.last_action_s,
            ..DispatchState::default()
        };
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self, now_s: f64) -> String {
        let since = self
            .state
            .last_action_s
            .map(|t| format!("{:.2}", now_s - t))
            .unwrap_or_else(|| "nil".to_string());
        let latch = match self.state.click_latch {
            Some(ClickLatch::Left) => ":left",
            Some(ClickLatch::Right) => ":right",
            None => "nil",
        };
        format!(
            "(:since-action-s {} :click-latch {} :dragging {})",
            since,
            latch,
            if self.state.is_dragging { "t" } else { "nil" },
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
