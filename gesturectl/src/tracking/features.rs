//! Feature extraction from raw hand landmarks.
//!
//! Turns a 21-point landmark set into the scalar features the gesture
//! classifier consumes: palm center, palm rotation, openness and depth.
//! Each feature is run through an exponential smoother to damp tracker jitter.

use tracing::debug;

use super::hand::{HandFrame, HandLandmark, LANDMARK_COUNT};

// ── Smoothing ──────────────────────────────────────────────

/// Exponential smoother.  `alpha` is the weight of the newest sample.
#[derive(Debug, Clone)]
pub struct Smoother {
    pub alpha: f64,
    value: Option<f64>,
}

impl Smoother {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: None,
        }
    }

    /// Feed a sample and return the smoothed value.  The first sample
    /// passes through unchanged.
    pub fn update(&mut self, sample: f64) -> f64 {
        let next = match self.value {
            Some(prev) => lerp(prev, sample, self.alpha),
            None => sample,
        };
        self.value = Some(next);
        next
    }

    /// Smooth an angle in degrees along the shortest arc, result in [0, 360).
    pub fn update_angle(&mut self, sample_deg: f64) -> f64 {
        let next = match self.value {
            Some(prev) => {
                let mut delta = (sample_deg - prev) % 360.0;
                if delta > 180.0 {
                    delta -= 360.0;
                } else if delta <= -180.0 {
                    delta += 360.0;
                }
                (prev + delta * self.alpha).rem_euclid(360.0)
            }
            None => sample_deg.rem_euclid(360.0),
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

// ── Raw feature functions ──────────────────────────────────

/// Palm rotation: angle of the wrist → middle-finger-base vector, [0, 360).
pub fn palm_rotation_deg(landmarks: &[[f64; 3]]) -> f64 {
    let w = landmarks[HandLandmark::Wrist.index()];
    let m = landmarks[HandLandmark::MiddleMcp.index()];
    (m[1] - w[1]).atan2(m[0] - w[0]).to_degrees().rem_euclid(360.0)
}

/// Palm center in pixels: midpoint of wrist and middle-finger base.
pub fn palm_center_px(landmarks: &[[f64; 3]], width: u32, height: u32) -> (i32, i32) {
    let (wx, wy) = to_pixel(landmarks[HandLandmark::Wrist.index()], width, height);
    let (mx, my) = to_pixel(landmarks[HandLandmark::MiddleMcp.index()], width, height);
    ((wx + mx).div_euclid(2), (wy + my).div_euclid(2))
}

/// Openness 0-100 from the mean fingertip distance to the palm center.
///
/// The distance is scaled between a "closed" and an "open" reference that
/// depend on the image size, so the value is resolution independent.
pub fn openness(landmarks: &[[f64; 3]], palm: (f64, f64), width: u32, height: u32) -> f64 {
    let tips = HandLandmark::fingertips();
    let mean_dist = tips
        .iter()
        .map(|t| {
            let (tx, ty) = to_pixel(landmarks[t.index()], width, height);
            (tx as f64 - palm.0).hypot(ty as f64 - palm.1)
        })
        .sum::<f64>()
        / tips.len() as f64;

    let short_side = width.min(height) as f64;
    let closed_ref = (short_side * 0.04).clamp(12.0, 40.0);
    let open_ref = (short_side * 0.55).max(60.0);
    ((mean_dist - closed_ref) / (open_ref - closed_ref) * 100.0).clamp(0.0, 100.0)
}

/// Palm depth: z of the middle-finger base.
pub fn palm_depth(landmarks: &[[f64; 3]]) -> f64 {
    landmarks[HandLandmark::MiddleMcp.index()][2]
}

fn to_pixel(point: [f64; 3], width: u32, height: u32) -> (i32, i32) {
    ((point[0] * width as f64) as i32, (point[1] * height as f64) as i32)
}

// ── Extractor ──────────────────────────────────────────────

/// Smoothing weights for each feature.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub palm_alpha: f64,
    pub rotation_alpha: f64,
    pub openness_alpha: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            palm_alpha: 0.6,
            rotation_alpha: 0.6,
            openness_alpha: 0.4,
        }
    }
}

/// Stateful landmark → `HandFrame` converter.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    palm_x: Smoother,
    palm_y: Smoother,
    rotation: Smoother,
    openness: Smoother,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            palm_x: Smoother::new(config.palm_alpha),
            palm_y: Smoother::new(config.palm_alpha),
            rotation: Smoother::new(config.rotation_alpha),
            openness: Smoother::new(config.openness_alpha),
        }
    }

    /// Build a frame from landmarks of a `width`×`height` image.
    ///
    /// A short landmark set yields `HandFrame::no_hand()` and leaves the
    /// smoothers untouched.
    pub fn extract(&mut self, landmarks: &[[f64; 3]], width: u32, height: u32) -> HandFrame {
        if landmarks.len() < LANDMARK_COUNT || width == 0 || height == 0 {
            debug!(
                "Feature extraction: expected {} landmarks, got {}",
                LANDMARK_COUNT,
                landmarks.len(),
            );
            return HandFrame::no_hand();
        }

        let (raw_x, raw_y) = palm_center_px(landmarks, width, height);
        let palm_x = self.palm_x.update(raw_x as f64);
        let palm_y = self.palm_y.update(raw_y as f64);

        let rotation_deg = self.rotation.update_angle(palm_rotation_deg(landmarks));
        // Openness is measured against the smoothed palm, truncated to pixels
        let palm = (palm_x.trunc(), palm_y.trunc());
        let openness = self.openness.update(openness(landmarks, palm, width, height));

        HandFrame {
            openness,
            rotation_deg,
            palm_x: palm_x as i32,
            palm_y: palm_y as i32,
            palm_z: palm_depth(landmarks),
            landmarks: landmarks.to_vec(),
            tracking_active: true,
        }
    }

    /// Forget smoothing history (hand lost or controller reset).
    pub fn reset(&mut self) {
        self.palm_x.reset();
        self.palm_y.reset();
        self.rotation.reset();
        self.openness.reset();
    }
}

/// Linear interpolation helper.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

// ── Tests ──────────────────────────────────────────────────
