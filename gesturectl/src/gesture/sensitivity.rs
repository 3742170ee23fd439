//! Sensitivity profile — one scalar that drives every recognition threshold.
//!
//! Higher sensitivity shortens the cooldown and lowers the rotation, swipe
//! and depth thresholds.  Thresholds are derived together into a single
//! `Thresholds` value so readers never see a mix of old and new values.

use tracing::info;

/// Lowest accepted sensitivity.
pub const MIN_SENSITIVITY: f64 = 0.3;
/// Highest accepted sensitivity.
pub const MAX_SENSITIVITY: f64 = 3.0;
/// Increment used by `step_up` / `step_down`.
pub const SENSITIVITY_STEP: f64 = 0.2;

/// Thresholds derived from a sensitivity value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum seconds between effects in rate-gated modes.
    pub cooldown_s: f64,
    /// Accumulated rotation (degrees) that emits a rotate gesture.
    pub rotation_deg: f64,
    /// Palm displacement (pixels) that emits a swipe.
    pub swipe_px: f64,
    /// Per-frame depth change that emits push/pull.
    pub depth: f64,
}

impl Thresholds {
    /// Derive thresholds for an already-clamped sensitivity.
    pub fn for_sensitivity(s: f64) -> Self {
        Self {
            cooldown_s: (0.8 / s).max(0.3),
            rotation_deg: (25.0 / s).max(15.0),
            swipe_px: (100.0 / s).max(60.0),
            depth: 0.08 / s,
        }
    }
}

/// Sensitivity scalar plus the thresholds derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityProfile {
    sensitivity: f64,
    thresholds: Thresholds,
}

impl Default for SensitivityProfile {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SensitivityProfile {
    /// Create a profile; out-of-range values are clamped, NaN becomes 1.0.
    pub fn new(sensitivity: f64) -> Self {
        let s = if sensitivity.is_nan() {
            1.0
        } else {
            sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
        };
        Self {
            sensitivity: s,
            thresholds: Thresholds::for_sensitivity(s),
        }
    }

    pub fn value(&self) -> f64 {
        self.sensitivity
    }

    /// Snapshot of the current thresholds.
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Set sensitivity, clamped.  Returns the value actually applied.
    /// NaN is ignored.
    pub fn set(&mut self, value: f64) -> f64 {
        if value.is_nan() {
            return self.sensitivity;
        }
        *self = Self::new(value);
        info!("Sensitivity: {:.1}x", self.sensitivity);
        self.sensitivity
    }

    pub fn step_up(&mut self) -> f64 {
        self.set(self.sensitivity + SENSITIVITY_STEP)
    }

    pub fn step_down(&mut self) -> f64 {
        self.set(self.sensitivity - SENSITIVITY_STEP)
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:sensitivity {:.2} :cooldown-s {:.2} :rotation-deg {:.1} :swipe-px {:.1} :depth {:.3})",
            self.sensitivity,
            self.thresholds.cooldown_s,
            self.thresholds.rotation_deg,
            self.thresholds.swipe_px,
            self.thresholds.depth,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_thresholds() {
        let p = SensitivityProfile::default();
        let t = p.thresholds();
        assert!(approx(p.value(), 1.0));
        assert!(approx(t.cooldown_s, 0.8));
        assert!(approx(t.rotation_deg, 25.0));
        assert!(approx(t.swipe_px, 100.0));
        assert!(approx(t.depth, 0.08));
    }

    #[test]
    fn test_max_sensitivity_floors() {
        let t = SensitivityProfile::new(3.0).thresholds();
        assert!(approx(t.cooldown_s, 0.3));
        assert!(approx(t.rotation_deg, 15.0));
        assert!(approx(t.swipe_px, 60.0));
        // Depth has no floor
        assert!(approx(t.depth, 0.08 / 3.0));
    }

    #[test]
    fn test_clamp() {
        let mut p = SensitivityProfile::default();
        assert!(approx(p.set(10.0), MAX_SENSITIVITY));
        assert!(approx(p.set(0.0), MIN_SENSITIVITY));
        assert!(approx(p.set(-4.0), MIN_SENSITIVITY));
        assert!(approx(SensitivityProfile::new(0.1).value(), MIN_SENSITIVITY));
    }

    #[test]
    fn test_nan_ignored() {
        let mut p = SensitivityProfile::new(2.0);
        assert!(approx(p.set(f64::NAN), 2.0));
        assert!(approx(p.thresholds().cooldown_s, 0.4));
        assert!(approx(SensitivityProfile::new(f64::NAN).value(), 1.0));
    }

    #[test]
    fn test_set_recomputes_all_thresholds() {
        let mut p = SensitivityProfile::default();
        p.set(0.5);
        assert_eq!(p.thresholds(), Thresholds::for_sensitivity(0.5));
        let t = p.thresholds();
        assert!(approx(t.cooldown_s, 1.6));
        assert!(approx(t.rotation_deg, 50.0));
        assert!(approx(t.swipe_px, 200.0));
        assert!(approx(t.depth, 0.16));
    }

    #[test]
    fn test_thresholds_monotonic() {
        let mut prev = Thresholds::for_sensitivity(MIN_SENSITIVITY);
        let mut s = MIN_SENSITIVITY;
        while s <= MAX_SENSITIVITY {
            let t = SensitivityProfile::new(s).thresholds();
            assert!(t.cooldown_s <= prev.cooldown_s, "cooldown rose at {}", s);
            assert!(t.rotation_deg <= prev.rotation_deg, "rotation rose at {}", s);
            assert!(t.swipe_px <= prev.swipe_px, "swipe rose at {}", s);
            assert!(t.depth <= prev.depth, "depth rose at {}", s);
            prev = t;
            s += 0.05;
        }
    }

    #[test]
    fn test_steps() {
        let mut p = SensitivityProfile::default();
        assert!(approx(p.step_up(), 1.2));
        assert!(approx(p.step_down(), 1.0));

        let mut top = SensitivityProfile::new(2.9);
        assert!(approx(top.step_up(), MAX_SENSITIVITY));
        let mut bottom = SensitivityProfile::new(0.4);
        assert!(approx(bottom.step_down(), MIN_SENSITIVITY));
    }

    #[test]
    fn test_status_sexp() {
        let sexp = SensitivityProfile::default().status_sexp();
        assert!(sexp.contains(":sensitivity 1.00"));
        assert!(sexp.contains(":cooldown-s 0.80"));
        assert!(sexp.contains(":swipe-px 100.0"));
    }
}
