//! Effector interface — the host implements `ActionSink` to actually press
//! keys, move the pointer, or change the volume.
//!
//! The dispatcher only ever talks to this trait.  Volume changes go through
//! a `VolumeControl` strategy chosen when the controller is built.

use anyhow::{anyhow, bail, Result};
use tracing::{debug, warn};

/// Host effectors.  Every call may fail; failures are reported back to the
/// dispatcher, which logs them and treats the cycle as "no action".
pub trait ActionSink {
    fn press_key(&mut self, key: &str) -> Result<()>;

    /// Press a chord, modifiers first (e.g. `["alt", "tab"]`).
    fn hotkey(&mut self, keys: &[&str]) -> Result<()>;

    /// Current pointer position in screen pixels.
    fn cursor_position(&mut self) -> Result<(i32, i32)>;

    fn move_cursor_to(&mut self, x: i32, y: i32) -> Result<()>;

    fn click(&mut self) -> Result<()>;

    fn right_click(&mut self) -> Result<()>;

    /// Scroll by `amount` notches; positive scrolls up.
    fn scroll(&mut self, amount: i32) -> Result<()>;

    fn mouse_down(&mut self) -> Result<()>;

    fn mouse_up(&mut self) -> Result<()>;

    /// Master volume in [0, 1].  Hosts without a mixer API leave the default.
    fn volume(&mut self) -> Result<f64> {
        Err(anyhow!("volume level not available"))
    }

    fn set_volume(&mut self, _level: f64) -> Result<()> {
        Err(anyhow!("volume level not available"))
    }
}

// ── Volume strategy ────────────────────────────────────────

/// Key presses per unit of volume change for the key-press strategy.
const PRESSES_PER_UNIT: f64 = 20.0;

/// How volume adjustments reach the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VolumeControl {
    /// Read and write the master volume level directly.  Falls back to key
    /// presses when the sink has no mixer.
    Mixer,
    /// Press volume-up / volume-down keys.
    #[default]
    KeyPress,
}

impl VolumeControl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mixer => "mixer",
            Self::KeyPress => "keys",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mixer" => Some(Self::Mixer),
            "keys" => Some(Self::KeyPress),
            _ => None,
        }
    }

    /// Apply a signed volume change of `delta` (fraction of full scale).
    pub fn adjust(&self, sink: &mut dyn ActionSink, delta: f64) -> Result<()> {
        if *self == Self::Mixer {
            match sink.volume() {
                Ok(current) => return sink.set_volume((current + delta).clamp(0.0, 1.0)),
                Err(e) => debug!("Mixer unavailable ({}), using volume keys", e),
            }
        }
        press_volume_keys(sink, delta)
    }
}

/// A press that fails after others already went through still counts as a
/// volume change; only a change with no presses at all is an error.
fn press_volume_keys(sink: &mut dyn ActionSink, delta: f64) -> Result<()> {
    let key = if delta > 0.0 { "volumeup" } else { "volumedown" };
    let presses = (delta.abs() * PRESSES_PER_UNIT).round() as u32;
    for done in 0..presses {
        if let Err(e) = sink.press_key(key) {
            if done == 0 {
                return Err(e);
            }
            warn!("{} stopped after {}/{} presses: {:#}", key, done, presses, e);
            return Ok(());
        }
    }
    Ok(())
}

// ── Recording sink ─────────────────────────────────────────

/// One call made against a `RecordingSink`.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    PressKey(String),
    Hotkey(Vec<String>),
    MoveCursor(i32, i32),
    Click,
    RightClick,
    Scroll(i32),
    MouseDown,
    MouseUp,
    SetVolume(f64),
}

/// In-memory sink that records every effect.  Useful for hosts that want
/// to inspect decisions before executing them, and for tests.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
    pub cursor: (i32, i32),
    /// Master volume; `None` simulates a host without a mixer.
    pub volume: Option<f64>,
    /// When set, every effect fails without being recorded.
    pub fail: bool,
    /// When set, effects fail once this many calls have been recorded.
    pub fail_after: Option<usize>,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            cursor: (0, 0),
            volume: None,
            fail: false,
            fail_after: None,
        }
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink with a working mixer at the given level.
    pub fn with_mixer(level: f64) -> Self {
        Self {
            volume: Some(level),
            ..Self::default()
        }
    }

    /// Number of recorded calls matching `call`.
    pub fn count(&self, call: &SinkCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: SinkCall) -> Result<()> {
        if self.fail || self.fail_after.is_some_and(|n| self.calls.len() >= n) {
            bail!("sink failure injected");
        }
        self.calls.push(call);
        Ok(())
    }
}

impl ActionSink for RecordingSink {
    fn press_key(&mut self, key: &str) -> Result<()> {
        self.record(SinkCall::PressKey(key.to_string()))
    }

    fn hotkey(&mut self, keys: &[&str]) -> Result<()> {
        self.record(SinkCall::Hotkey(keys.iter().map(|k| k.to_string()).collect()))
    }

    fn cursor_position(&mut self) -> Result<(i32, i32)> {
        Ok(self.cursor)
    }

    fn move_cursor_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.record(SinkCall::MoveCursor(x, y))?;
        self.cursor = (x, y);
        Ok(())
    }

    fn click(&mut self) -> Result<()> {
        self.record(SinkCall::Click)
    }

    fn right_click(&mut self) -> Result<()> {
        self.record(SinkCall::RightClick)
    }

    fn scroll(&mut self, amount: i32) -> Result<()> {
        self.record(SinkCall::Scroll(amount))
    }

    fn mouse_down(&mut self) -> Result<()> {
        self.record(SinkCall::MouseDown)
    }

    fn mouse_up(&mut self) -> Result<()> {
        self.record(SinkCall::MouseUp)
    }

    fn volume(&mut self) -> Result<f64> {
        self.volume.ok_or_else(|| anyhow!("no mixer"))
    }

    fn set_volume(&mut self, level: f64) -> Result<()> {
        if self.volume.is_none() {
            bail!("no mixer");
        }
        self.record(SinkCall::SetVolume(level))?;
        self.volume = Some(level);
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────
