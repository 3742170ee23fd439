//! Gesture recognition from per-frame hand features.
//!
//! Detects static hand shapes (pinch, point, peace, thumbs up, fist, open
//! hand) and motion gestures (push/pull, rotate, swipe).  Motion gestures are
//! measured against baselines carried over from the previous frame only.

use tracing::debug;

use super::sensitivity::Thresholds;
use crate::tracking::hand::{HandFrame, HandLandmark};

// ── Gesture types ──────────────────────────────────────────

/// Recognized gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gesture {
    #[default]
    None,
    /// All fingers curled.
    Fist,
    /// All fingers spread.
    OpenHand,
    /// Index and middle extended.
    Peace,
    /// Index extended only.
    Pointing,
    /// Thumb extended only.
    ThumbsUp,
    /// Thumb and index tips touching.
    Pinch,
    RotateLeft,
    RotateRight,
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    /// Hand moving toward the camera.
    PalmPush,
    /// Hand moving away from the camera.
    PalmPull,
}

/// All gestures, for iteration.
pub const ALL_GESTURES: [Gesture; 15] = [
    Gesture::None,
    Gesture::Fist,
    Gesture::OpenHand,
    Gesture::Peace,
    Gesture::Pointing,
    Gesture::ThumbsUp,
    Gesture::Pinch,
    Gesture::RotateLeft,
    Gesture::RotateRight,
    Gesture::SwipeLeft,
    Gesture::SwipeRight,
    Gesture::SwipeUp,
    Gesture::SwipeDown,
    Gesture::PalmPush,
    Gesture::PalmPull,
];

impl Gesture {
    /// String representation for IPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fist => "fist",
            Self::OpenHand => "open-hand",
            Self::Peace => "peace",
            Self::Pointing => "pointing",
            Self::ThumbsUp => "thumbs-up",
            Self::Pinch => "pinch",
            Self::RotateLeft => "rotate-left",
            Self::RotateRight => "rotate-right",
            Self::SwipeLeft => "swipe-left",
            Self::SwipeRight => "swipe-right",
            Self::SwipeUp => "swipe-up",
            Self::SwipeDown => "swipe-down",
            Self::PalmPush => "palm-push",
            Self::PalmPull => "palm-pull",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        ALL_GESTURES.iter().copied().find(|g| g.as_str() == s)
    }

    pub fn is_swipe(&self) -> bool {
        matches!(
            self,
            Self::SwipeLeft | Self::SwipeRight | Self::SwipeUp | Self::SwipeDown
        )
    }
}

// ── Classifier state ───────────────────────────────────────

/// Max normalized thumb-to-index tip distance for a pinch.
const PINCH_DISTANCE: f64 = 0.05;

/// Openness below which an unmatched shape is a fist.
const FIST_OPENNESS: f64 = 25.0;

/// Openness above which an unmatched shape is an open hand.
const OPEN_OPENNESS: f64 = 75.0;

/// Position baselines only follow the palm while it moves less than this
/// many pixels per frame.
const BASELINE_DRIFT_PX: u32 = 10;

/// Baselines carried from one frame to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierState {
    pub last_palm_x: Option<i32>,
    pub last_palm_y: Option<i32>,
    pub last_palm_z: Option<f64>,
    pub last_rotation: Option<f64>,
    /// Signed rotation accumulated since the last rotate gesture.
    pub rotation_accumulator: f64,
}

/// Stateful per-frame gesture classifier.
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    state: ClassifierState,
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    /// Classify one frame.
    ///
    /// Rules run in a fixed order and each later rule that fires replaces
    /// the earlier result: shape, then depth, then rotation, then swipe.
    /// Invalid frames return `Gesture::None` and leave every baseline alone.
    pub fn classify(&mut self, frame: &HandFrame, thresholds: &Thresholds) -> Gesture {
        if !frame.is_valid() {
            return Gesture::None;
        }

        let mut gesture = classify_shape(frame);

        if let Some(depth) = self.detect_depth(frame, thresholds) {
            gesture = depth;
        }

        if let Some(rotation) = self.detect_rotation(frame, thresholds) {
            gesture = rotation;
        }

        if let Some(swipe) = self.detect_swipe(frame, thresholds) {
            gesture = swipe;
        }

        if !gesture.is_swipe() {
            self.follow_palm(frame);
        }
        self.state.last_rotation = Some(frame.rotation_deg);
        self.state.last_palm_z = Some(frame.palm_z);

        gesture
    }

    /// Push/pull from the per-frame change in palm depth.
    fn detect_depth(&self, frame: &HandFrame, thresholds: &Thresholds) -> Option<Gesture> {
        let last_z = self.state.last_palm_z?;
        let z_diff = frame.palm_z - last_z;
        if z_diff < -thresholds.depth {
            Some(Gesture::PalmPush)
        } else if z_diff > thresholds.depth {
            Some(Gesture::PalmPull)
        } else {
            None
        }
    }

    /// Accumulate signed rotation; fire and reset once past the threshold.
    fn detect_rotation(&mut self, frame: &HandFrame, thresholds: &Thresholds) -> Option<Gesture> {
        let last = self.state.last_rotation?;
        self.state.rotation_accumulator += circular_delta(frame.rotation_deg, last);

        let acc = self.state.rotation_accumulator;
        if acc.abs() <= thresholds.rotation_deg {
            return None;
        }

        self.state.rotation_accumulator = 0.0;
        let gesture = if acc > 0.0 {
            Gesture::RotateRight
        } else {
            Gesture::RotateLeft
        };
        debug!("Rotation detected: {:?} ({:.1} deg)", gesture, acc);
        Some(gesture)
    }

    /// Swipe from displacement against the position baselines.  A swipe
    /// advances the baseline on its own axis so it fires once.
    fn detect_swipe(&mut self, frame: &HandFrame, thresholds: &Thresholds) -> Option<Gesture> {
        let (last_x, last_y) = match (self.state.last_palm_x, self.state.last_palm_y) {
            (Some(x), Some(y)) => (x, y),
            _ => return None,
        };

        // Widened so extreme coordinates cannot overflow
        let dx = i64::from(frame.palm_x) - i64::from(last_x);
        let dy = i64::from(frame.palm_y) - i64::from(last_y);
        let (adx, ady) = (dx.abs(), dy.abs());

        let gesture = if adx as f64 > thresholds.swipe_px && adx > ady {
            self.state.last_palm_x = Some(frame.palm_x);
            if dx > 0 {
                Gesture::SwipeRight
            } else {
                Gesture::SwipeLeft
            }
        } else if ady as f64 > thresholds.swipe_px && ady > adx {
            self.state.last_palm_y = Some(frame.palm_y);
            // Pixel y grows downward
            if dy < 0 {
                Gesture::SwipeUp
            } else {
                Gesture::SwipeDown
            }
        } else {
            return None;
        };

        debug!("Swipe detected: {:?} (dx={}, dy={})", gesture, dx, dy);
        Some(gesture)
    }

    /// Sticky baselines: follow the palm only while it barely moves, so slow
    /// drift cannot build up into a swipe.
    fn follow_palm(&mut self, frame: &HandFrame) {
        let sticky = |last: Option<i32>, now: i32| match last {
            Some(l) if now.abs_diff(l) >= BASELINE_DRIFT_PX => Some(l),
            _ => Some(now),
        };
        self.state.last_palm_x = sticky(self.state.last_palm_x, frame.palm_x);
        self.state.last_palm_y = sticky(self.state.last_palm_y, frame.palm_y);
    }

    /// Clear all baselines and the rotation accumulator.
    pub fn reset(&mut self) {
        self.state = ClassifierState::default();
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        let opt_i = |v: Option<i32>| v.map(|n| n.to_string()).unwrap_or_else(|| "nil".into());
        let opt_f = |v: Option<f64>| v.map(|n| format!("{:.3}", n)).unwrap_or_else(|| "nil".into());
        format!(
            "(:palm-x {} :palm-y {} :palm-z {} :rotation {} :rotation-acc {:.1})",
            opt_i(self.state.last_palm_x),
            opt_i(self.state.last_palm_y),
            opt_f(self.state.last_palm_z),
            opt_f(self.state.last_rotation),
            self.state.rotation_accumulator,
        )
    }
}

/// Static shape from finger extension and openness.  First match wins.
fn classify_shape(frame: &HandFrame) -> Gesture {
    let fingers = frame.fingers();

    if pinch_distance(frame) < PINCH_DISTANCE {
        Gesture::Pinch
    } else if fingers.index() && !fingers.middle() && !fingers.ring() && !fingers.pinky() {
        Gesture::Pointing
    } else if fingers.index() && fingers.middle() && !fingers.ring() && !fingers.pinky() {
        Gesture::Peace
    } else if fingers.thumb() && fingers.count() == 1 {
        Gesture::ThumbsUp
    } else if frame.openness < FIST_OPENNESS {
        Gesture::Fist
    } else if frame.openness > OPEN_OPENNESS {
        Gesture::OpenHand
    } else {
        Gesture::None
    }
}

/// Normalized 2D distance between the thumb and index tips.
fn pinch_distance(frame: &HandFrame) -> f64 {
    let thumb = frame.landmark(HandLandmark::ThumbTip);
    let index = frame.landmark(HandLandmark::IndexTip);
    (thumb[0] - index[0]).hypot(thumb[1] - index[1])
}

/// Signed difference `current - previous` on the circle, in (-180, 180].
pub fn circular_delta(current: f64, previous: f64) -> f64 {
    let mut d = (current - previous) % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

// ── Test helpers ───────────────────────────────────────────

/// A valid frame whose landmarks match no finger combination: all fingers
/// curled, thumb and index tips far apart.
#[cfg(test)]
pub(crate) fn make_frame(openness: f64, palm_x: i32, palm_y: i32) -> HandFrame {
    use crate::tracking::hand::{curled_landmarks, set_landmark};

    let mut landmarks = curled_landmarks();
    set_landmark(&mut landmarks, HandLandmark::ThumbTip, 0.52, 0.6);
    set_landmark(&mut landmarks, HandLandmark::ThumbMcp, 0.52, 0.6);
    set_landmark(&mut landmarks, HandLandmark::IndexTip, 0.5, 0.5);
    HandFrame {
        openness,
        rotation_deg: 90.0,
        palm_x,
        palm_y,
        palm_z: 0.0,
        landmarks,
        tracking_active: true,
    }
}

/// Frame for a given static shape.
#[cfg(test)]
pub(crate) fn make_shape_frame(shape: Gesture, palm_x: i32, palm_y: i32) -> HandFrame {
    use crate::tracking::hand::set_landmark;

    let mut frame = make_frame(50.0, palm_x, palm_y);
    let lm = &mut frame.landmarks;
    match shape {
        Gesture::Pinch => {
            set_landmark(lm, HandLandmark::ThumbTip, 0.5, 0.5);
            set_landmark(lm, HandLandmark::IndexTip, 0.51, 0.5);
        }
        Gesture::Pointing => set_landmark(lm, HandLandmark::IndexTip, 0.5, 0.3),
        Gesture::Peace => {
            set_landmark(lm, HandLandmark::IndexTip, 0.5, 0.3);
            set_landmark(lm, HandLandmark::MiddleTip, 0.55, 0.3);
        }
        Gesture::ThumbsUp => set_landmark(lm, HandLandmark::ThumbTip, 0.62, 0.6),
        Gesture::Fist => frame.openness = 10.0,
        Gesture::OpenHand => frame.openness = 90.0,
        _ => {}
    }
    frame
}

// ── Tests ──────────────────────────────────────────────────
