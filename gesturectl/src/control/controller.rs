//! Controller — classify, debounce, dispatch.
//!
//! One `process_frame` call per camera tick.  The controller owns the
//! classifier, the hold-time gate, the dispatcher and the host sink, and is
//! the only place mode and sensitivity changes enter.

use tracing::{debug, info};

use super::action;
use super::dispatch::{ModeActionDispatcher, PalmPosition};
use super::mode::Mode;
use super::sink::ActionSink;
use crate::config::ControllerConfig;
use crate::gesture::{ClassifierState, Gesture, GestureClassifier, HoldTimeGate, SensitivityProfile};
use crate::ipc::sexp::sexp_bool;
use crate::tracking::HandFrame;

/// Result of one processed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub gesture: Gesture,
    pub action_taken: bool,
}

/// Gesture controller driving a host sink.
#[derive(Debug)]
pub struct Controller<S: ActionSink> {
    mode: Mode,
    enabled: bool,
    hold_s: f64,
    mouse_hold_s: f64,
    sensitivity: SensitivityProfile,
    classifier: GestureClassifier,
    gate: HoldTimeGate,
    dispatcher: ModeActionDispatcher,
    sink: S,
    last_frame_s: Option<f64>,
}

impl<S: ActionSink> Controller<S> {
    pub fn new(config: &ControllerConfig, sink: S) -> Self {
        info!(
            "Controller: mode={} sensitivity={:.1} volume={}",
            config.mode.as_str(),
            config.sensitivity,
            config.dispatch.volume.as_str()
        );
        Self {
            mode: config.mode,
            enabled: config.enabled,
            hold_s: config.hold_s(),
            mouse_hold_s: config.mouse_hold_s(),
            sensitivity: SensitivityProfile::new(config.sensitivity),
            classifier: GestureClassifier::new(),
            gate: HoldTimeGate::new(),
            dispatcher: ModeActionDispatcher::new(config.dispatch.clone()),
            sink,
            last_frame_s: None,
        }
    }

    /// Classify one frame and dispatch it if the gesture has been held long
    /// enough.  A disabled controller ignores the frame entirely.
    pub fn process_frame(&mut self, frame: &HandFrame, now_s: f64) -> FrameOutcome {
        if !self.enabled {
            return FrameOutcome::default();
        }
        self.last_frame_s = Some(now_s);

        let thresholds = self.sensitivity.thresholds();
        let gesture = self.classifier.classify(frame, &thresholds);

        if !self.gate.observe(gesture, now_s, self.hold_time()) {
            return FrameOutcome {
                gesture,
                action_taken: false,
            };
        }

        let palm = PalmPosition {
            x: frame.palm_x,
            y: frame.palm_y,
            baseline_y: self.classifier.state().last_palm_y,
        };
        let action_taken = self.dispatcher.dispatch(
            self.mode,
            gesture,
            palm,
            now_s,
            thresholds.cooldown_s,
            &mut self.sink,
        );

        FrameOutcome {
            gesture,
            action_taken,
        }
    }

    /// Hold time for the current mode.
    pub fn hold_time(&self) -> f64 {
        match self.mode {
            Mode::Mouse => self.mouse_hold_s,
            _ => self.hold_s,
        }
    }

    // ── Mode ───────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch mode and start from clean state: baselines, hold timer,
    /// cooldown, click latch.  A held drag is released first.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.reset();
        info!("Mode: {}", mode.title());
    }

    pub fn cycle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.next());
        self.mode
    }

    pub fn mode_help(&self) -> Vec<String> {
        self.mode.help()
    }

    // ── Sensitivity ────────────────────────────────────────

    pub fn sensitivity(&self) -> &SensitivityProfile {
        &self.sensitivity
    }

    /// Set sensitivity, clamped.  Returns the applied value.
    pub fn set_sensitivity(&mut self, value: f64) -> f64 {
        self.sensitivity.set(value)
    }

    /// Step sensitivity up or down by one increment.
    pub fn step_sensitivity(&mut self, up: bool) -> f64 {
        if up {
            self.sensitivity.step_up()
        } else {
            self.sensitivity.step_down()
        }
    }

    // ── Enable / reset ─────────────────────────────────────

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!("Gesture control {}", if enabled { "enabled" } else { "paused" });
        }
        self.enabled = enabled;
    }

    pub fn toggle_enabled(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Clear classifier, hold gate and dispatch state.
    pub fn reset(&mut self) {
        self.classifier.reset();
        self.gate.reset();
        self.dispatcher.reset(&mut self.sink);
        debug!("Controller state cleared");
    }

    // ── Accessors ──────────────────────────────────────────

    pub fn classifier_state(&self) -> &ClassifierState {
        self.classifier.state()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        let now = self.last_frame_s.unwrap_or(0.0);
        format!(
            "(:mode :{} :enabled {} :hold-s {:.2} :gesture :{} :held-s {:.2} \
             :bindings {} :sensitivity {} :classifier {} :dispatch {})",
            self.mode.as_str(),
            sexp_bool(self.enabled),
            self.hold_time(),
            self.gate.last_gesture().as_str(),
            self.gate.held_for(now),
            action::bindings_sexp(self.mode),
            self.sensitivity.status_sexp(),
            self.classifier.status_sexp(),
            self.dispatcher.status_sexp(now),
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
