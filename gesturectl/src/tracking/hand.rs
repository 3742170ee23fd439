//! Hand landmark definitions and per-frame hand data.
//!
//! Models the 21-point hand landmark layout produced by camera-based hand
//! trackers (wrist, four joints per finger).  Coordinates are normalized to
//! the camera image: x/y in [0,1] with y growing downward, z relative depth.

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in tracker output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for IPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// Fingertip landmarks, thumb first.
    pub fn fingertips() -> [HandLandmark; 5] {
        [
            Self::ThumbTip,
            Self::IndexTip,
            Self::MiddleTip,
            Self::RingTip,
            Self::PinkyTip,
        ]
    }

    /// Reference joint each fingertip is compared against for extension.
    pub fn extension_bases() -> [HandLandmark; 5] {
        [
            Self::ThumbMcp,
            Self::IndexPip,
            Self::MiddlePip,
            Self::RingPip,
            Self::PinkyPip,
        ]
    }
}

// ── Finger extension ───────────────────────────────────────

/// Minimum horizontal tip-to-base distance for the thumb to count as extended.
const THUMB_EXTENSION: f64 = 0.04;

/// Minimum height of a fingertip above its base joint to count as extended.
const FINGER_EXTENSION: f64 = 0.03;

/// Which fingers are extended: [thumb, index, middle, ring, pinky].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerExtension(pub [bool; 5]);

impl FingerExtension {
    /// Derive finger extension from a full landmark set.
    ///
    /// The thumb folds sideways, so it is judged on horizontal distance.  The
    /// other fingers are extended when the tip sits above the base joint.
    pub fn from_landmarks(landmarks: &[[f64; 3]]) -> Self {
        if landmarks.len() < LANDMARK_COUNT {
            return Self::default();
        }

        let mut fingers = [false; 5];
        let tips = HandLandmark::fingertips();
        let bases = HandLandmark::extension_bases();

        let thumb_tip = landmarks[tips[0].index()];
        let thumb_base = landmarks[bases[0].index()];
        fingers[0] = (thumb_tip[0] - thumb_base[0]).abs() > THUMB_EXTENSION;

        for i in 1..5 {
            let tip = landmarks[tips[i].index()];
            let base = landmarks[bases[i].index()];
            fingers[i] = tip[1] < base[1] - FINGER_EXTENSION;
        }

        Self(fingers)
    }

    pub fn thumb(&self) -> bool {
        self.0[0]
    }

    pub fn index(&self) -> bool {
        self.0[1]
    }

    pub fn middle(&self) -> bool {
        self.0[2]
    }

    pub fn ring(&self) -> bool {
        self.0[3]
    }

    pub fn pinky(&self) -> bool {
        self.0[4]
    }

    /// Number of extended fingers.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|f| **f).count()
    }
}

// ── Hand frame ─────────────────────────────────────────────

/// Per-tick hand measurements handed to the gesture classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    /// Finger openness heuristic, 0 (fist) to 100 (fully open).
    pub openness: f64,
    /// Palm rotation in degrees, [0, 360).
    pub rotation_deg: f64,
    /// Palm center in camera pixels.
    pub palm_x: i32,
    pub palm_y: i32,
    /// Normalized palm depth (smaller is closer to the camera).
    pub palm_z: f64,
    /// 21 normalized landmarks indexed by `HandLandmark`.
    pub landmarks: Vec<[f64; 3]>,
    /// Whether a hand was detected this tick.
    pub tracking_active: bool,
}

impl HandFrame {
    /// Frame for a tick where no hand was detected.
    pub fn no_hand() -> Self {
        Self {
            openness: 0.0,
            rotation_deg: 0.0,
            palm_x: 0,
            palm_y: 0,
            palm_z: 0.0,
            landmarks: Vec::new(),
            tracking_active: false,
        }
    }

    /// Whether the frame carries usable geometry.
    pub fn is_valid(&self) -> bool {
        self.tracking_active && self.landmarks.len() >= LANDMARK_COUNT
    }

    /// Position of a landmark.  Callers must check `is_valid` first.
    pub fn landmark(&self, landmark: HandLandmark) -> [f64; 3] {
        self.landmarks[landmark.index()]
    }

    /// Finger extension for this frame.
    pub fn fingers(&self) -> FingerExtension {
        FingerExtension::from_landmarks(&self.landmarks)
    }
}

/// A landmark set with every finger curled: tips level with their bases
/// and the thumb tucked against its base.
#[cfg(test)]
pub(crate) fn curled_landmarks() -> Vec<[f64; 3]> {
    vec![[0.5, 0.5, 0.0]; LANDMARK_COUNT]
}

#[cfg(test)]
pub(crate) fn set_landmark(landmarks: &mut [[f64; 3]], landmark: HandLandmark, x: f64, y: f64) {
    landmarks[landmark.index()] = [x, y, 0.0];
}

// ── Tests ──────────────────────────────────────────────────
