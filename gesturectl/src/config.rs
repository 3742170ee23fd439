//! Controller configuration, loadable from an s-expression plist file.
//!
//! ```text
//! (:mode :media :sensitivity 1.0 :hold-ms 300 :mouse-hold-ms 200
//!  :screen-width 1920 :screen-height 1080 :volume :keys :enabled t)
//! ```

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use lexpr::Value;
use tracing::debug;

use crate::control::{DispatchConfig, Mode, VolumeControl};
use crate::gesture::sensitivity::{MAX_SENSITIVITY, MIN_SENSITIVITY};
use crate::ipc::sexp::{get_bool, get_float, get_keyword, get_value, sexp_bool};

/// Everything needed to build a `Controller`.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Mode at startup.
    pub mode: Mode,
    /// Initial sensitivity, clamped on use.
    pub sensitivity: f64,
    /// Hold time before a gesture is actionable in rate-gated modes.
    pub hold_ms: u64,
    /// Hold time in mouse mode.
    pub mouse_hold_ms: u64,
    /// Whether frames are processed at startup.
    pub enabled: bool,
    pub dispatch: DispatchConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Media,
            sensitivity: 1.0,
            hold_ms: 300,
            mouse_hold_ms: 200,
            enabled: true,
            dispatch: DispatchConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Load from a plist file.  Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let value = lexpr::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        let config = Self::from_sexp(&value)
            .with_context(|| format!("invalid config {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Build from a parsed plist.  Unknown keys are ignored.
    pub fn from_sexp(value: &Value) -> Result<Self> {
        let mut config = Self::default();

        if let Some(mode) = get_keyword(value, "mode") {
            config.mode =
                Mode::from_str(&mode).ok_or_else(|| anyhow!("unknown mode: {}", mode))?;
        }
        if let Some(s) = number(value, "sensitivity")? {
            if !(MIN_SENSITIVITY..=MAX_SENSITIVITY).contains(&s) {
                bail!(
                    "sensitivity {} outside [{}, {}]",
                    s,
                    MIN_SENSITIVITY,
                    MAX_SENSITIVITY
                );
            }
            config.sensitivity = s;
        }
        if let Some(ms) = whole(value, "hold-ms")? {
            config.hold_ms = ms;
        }
        if let Some(ms) = whole(value, "mouse-hold-ms")? {
            config.mouse_hold_ms = ms;
        }
        if let Some(enabled) = get_bool(value, "enabled") {
            config.enabled = enabled;
        }

        let d = &mut config.dispatch;
        if let Some(w) = pixels(value, "screen-width")? {
            d.screen_width = w;
        }
        if let Some(h) = pixels(value, "screen-height")? {
            d.screen_height = h;
        }
        if let Some(w) = pixels(value, "reference-width")? {
            d.reference_width = w;
        }
        if let Some(h) = pixels(value, "reference-height")? {
            d.reference_height = h;
        }
        if let Some(s) = number(value, "mouse-smoothing")? {
            if !(0.0..1.0).contains(&s) {
                bail!(":mouse-smoothing must be in [0, 1), got {}", s);
            }
            d.mouse_smoothing = s;
        }
        if let Some(v) = get_keyword(value, "volume") {
            d.volume = VolumeControl::from_str(&v)
                .ok_or_else(|| anyhow!("unknown volume control: {} (expected mixer or keys)", v))?;
        }

        Ok(config)
    }

    pub fn hold_s(&self) -> f64 {
        self.hold_ms as f64 / 1000.0
    }

    pub fn mouse_hold_s(&self) -> f64 {
        self.mouse_hold_ms as f64 / 1000.0
    }

    /// Generate s-expression for the active configuration.
    pub fn config_sexp(&self) -> String {
        let d = &self.dispatch;
        format!(
            "(:mode :{} :sensitivity {:.2} :hold-ms {} :mouse-hold-ms {} \
             :screen-width {} :screen-height {} :reference-width {} :reference-height {} \
             :mouse-smoothing {:.2} :volume :{} :enabled {})",
            self.mode.as_str(),
            self.sensitivity,
            self.hold_ms,
            self.mouse_hold_ms,
            d.screen_width,
            d.screen_height,
            d.reference_width,
            d.reference_height,
            d.mouse_smoothing,
            d.volume.as_str(),
            sexp_bool(self.enabled),
        )
    }
}

/// Optional finite number under `key`.
fn number(value: &Value, key: &str) -> Result<Option<f64>> {
    if get_value(value, key).is_none() {
        return Ok(None);
    }
    match get_float(value, key) {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => bail!(":{} must be a number", key),
    }
}

/// Optional non-negative integer under `key`.
fn whole(value: &Value, key: &str) -> Result<Option<u64>> {
    match number(value, key)? {
        None => Ok(None),
        Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(Some(n as u64)),
        Some(n) => bail!(":{} must be a non-negative integer, got {}", key, n),
    }
}

/// Optional positive pixel dimension under `key`.
fn pixels(value: &Value, key: &str) -> Result<Option<u32>> {
    match whole(value, key)? {
        None => Ok(None),
        Some(0) => bail!(":{} must be positive", key),
        Some(n) => u32::try_from(n)
            .map(Some)
            .with_context(|| format!(":{} out of range", key)),
    }
}
