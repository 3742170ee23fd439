//! Frame protocol — parse one s-expression message per line and route it to
//! the controller.
//!
//! Frames arrive either pre-extracted (`:frame`, carrying openness, rotation
//! and palm position) or as raw landmarks (`:raw`) that go through the
//! `FeatureExtractor` first.

use anyhow::{anyhow, bail, Context, Result};
use lexpr::Value;
use tracing::{debug, warn};

use super::sexp::{
    as_number, error_response, get_float, get_int, get_keyword, get_value, list_items,
    ok_response, quote, sexp_bool,
};
use crate::control::{ActionSink, Controller, Mode};
use crate::tracking::{FeatureExtractor, HandFrame, LANDMARK_COUNT};

/// A decoded protocol message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Pre-extracted hand features.
    Frame { t: f64, frame: HandFrame },
    /// Normalized landmarks from a `width` x `height` camera image.
    Raw {
        t: f64,
        width: u32,
        height: u32,
        landmarks: Vec<[f64; 3]>,
    },
    /// Tick with no detected hand.
    NoHand { t: f64 },
    SetMode(Mode),
    CycleMode,
    SetSensitivity(f64),
    SensitivityUp,
    SensitivityDown,
    Reset,
    Toggle,
    Status,
}

impl Message {
    /// Decode a parsed plist.
    pub fn from_sexp(value: &Value) -> Result<Self> {
        let msg_type = get_keyword(value, "type").ok_or_else(|| anyhow!("missing :type"))?;

        Ok(match msg_type.as_str() {
            "frame" => Message::Frame {
                t: timestamp(value)?,
                frame: parse_frame(value)?,
            },
            "raw" => Message::Raw {
                t: timestamp(value)?,
                width: dimension(value, "width")?,
                height: dimension(value, "height")?,
                landmarks: parse_landmarks(value)?.unwrap_or_default(),
            },
            "no-hand" => Message::NoHand {
                t: timestamp(value)?,
            },
            "set-mode" => {
                let name = get_keyword(value, "mode").ok_or_else(|| anyhow!("missing :mode"))?;
                Message::SetMode(
                    Mode::from_str(&name).ok_or_else(|| anyhow!("unknown mode: {}", name))?,
                )
            }
            "cycle-mode" => Message::CycleMode,
            "set-sensitivity" => {
                let v = get_float(value, "value").ok_or_else(|| anyhow!("missing :value"))?;
                Message::SetSensitivity(v)
            }
            "sensitivity-up" => Message::SensitivityUp,
            "sensitivity-down" => Message::SensitivityDown,
            "reset" => Message::Reset,
            "toggle" => Message::Toggle,
            "status" => Message::Status,
            other => bail!("unknown message type: {}", other),
        })
    }
}

fn timestamp(value: &Value) -> Result<f64> {
    match get_float(value, "t") {
        Some(t) if t.is_finite() => Ok(t),
        Some(_) => bail!(":t must be finite"),
        None => bail!("missing :t"),
    }
}

fn dimension(value: &Value, key: &str) -> Result<u32> {
    let n = get_int(value, key).ok_or_else(|| anyhow!("missing :{}", key))?;
    u32::try_from(n).with_context(|| format!(":{} out of range", key))
}

/// Largest palm coordinate accepted, in pixels.
const MAX_PALM_PX: f64 = 1e6;

/// Decode a `:frame` message.  A missing or short landmark list gives an
/// untracked frame rather than an error.  A tracked frame must carry its
/// palm, openness and rotation.
fn parse_frame(value: &Value) -> Result<HandFrame> {
    let landmarks = parse_landmarks(value)?.unwrap_or_default();
    let tracking_active = landmarks.len() >= LANDMARK_COUNT;
    if !tracking_active && !landmarks.is_empty() {
        debug!("Frame has {} landmarks, treating as untracked", landmarks.len());
    }

    let palm = get_value(value, "palm").map(parse_palm).transpose()?;
    let openness = finite_float(value, "openness")?;
    let rotation_deg = finite_float(value, "rotation")?;

    if tracking_active {
        if palm.is_none() {
            bail!("tracked frame missing :palm");
        }
        if openness.is_none() {
            bail!("tracked frame missing :openness");
        }
        if rotation_deg.is_none() {
            bail!("tracked frame missing :rotation");
        }
    }
    let (palm_x, palm_y, palm_z) = palm.unwrap_or((0, 0, 0.0));

    Ok(HandFrame {
        openness: openness.unwrap_or(0.0),
        rotation_deg: rotation_deg.unwrap_or(0.0),
        palm_x,
        palm_y,
        palm_z,
        landmarks,
        tracking_active,
    })
}

fn finite_float(value: &Value, key: &str) -> Result<Option<f64>> {
    match get_value(value, key) {
        None => Ok(None),
        Some(v) => match as_number(v) {
            Some(n) if n.is_finite() => Ok(Some(n)),
            _ => bail!(":{} must be a finite number", key),
        },
    }
}

/// `(x y z)` with pixel x/y and normalized depth z.
fn parse_palm(palm: &Value) -> Result<(i32, i32, f64)> {
    let items = list_items(palm).ok_or_else(|| anyhow!(":palm must be a list"))?;
    let nums = items
        .iter()
        .map(|v| as_number(v))
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| anyhow!(":palm must contain numbers"))?;
    let (x, y, z) = match nums.as_slice() {
        [x, y] => (*x, *y, 0.0),
        [x, y, z] => (*x, *y, *z),
        _ => bail!(":palm must be (x y) or (x y z)"),
    };
    for px in [x, y] {
        if !px.is_finite() || px.abs() > MAX_PALM_PX {
            bail!(":palm coordinate {} out of range", px);
        }
    }
    if !z.is_finite() {
        bail!(":palm depth must be finite");
    }
    Ok((x as i32, y as i32, z))
}

/// `((x y z) ...)` normalized landmark coordinates.  `None` when the key
/// is absent.
fn parse_landmarks(value: &Value) -> Result<Option<Vec<[f64; 3]>>> {
    let Some(list) = get_value(value, "landmarks") else {
        return Ok(None);
    };
    let points = list_items(list).ok_or_else(|| anyhow!(":landmarks must be a list"))?;

    let mut landmarks = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        let coords = list_items(point)
            .and_then(|c| c.iter().map(|v| as_number(v)).collect::<Option<Vec<f64>>>())
            .ok_or_else(|| anyhow!("landmark {} is not a list of numbers", i))?;
        let p = match coords.as_slice() {
            [x, y] => [*x, *y, 0.0],
            [x, y, z] => [*x, *y, *z],
            _ => bail!("landmark {} must have 2 or 3 coordinates", i),
        };
        landmarks.push(p);
    }
    Ok(Some(landmarks))
}

// ── Session ────────────────────────────────────────────────

/// Protocol endpoint: a controller plus the feature extractor for raw frames.
#[derive(Debug)]
pub struct Session<S: ActionSink> {
    controller: Controller<S>,
    extractor: FeatureExtractor,
    frames: u64,
}

impl<S: ActionSink> Session<S> {
    pub fn new(controller: Controller<S>) -> Self {
        Self {
            controller,
            extractor: FeatureExtractor::default(),
            frames: 0,
        }
    }

    pub fn controller(&self) -> &Controller<S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<S> {
        &mut self.controller
    }

    /// Frames processed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Parse one line and dispatch it.  Returns the response line.
    pub fn handle_message(&mut self, raw: &str) -> Option<String> {
        let value = match lexpr::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!("malformed s-expression: {}", e);
                return Some(error_response(0, &format!("malformed s-expression: {e}")));
            }
        };
        let msg_id = get_int(&value, "id").unwrap_or(0);

        match Message::from_sexp(&value) {
            Ok(msg) => Some(self.handle(msg_id, msg)),
            Err(e) => {
                warn!("rejected message: {:#}", e);
                Some(error_response(msg_id, &format!("{:#}", e)))
            }
        }
    }

    /// Apply a decoded message.
    pub fn handle(&mut self, msg_id: i64, msg: Message) -> String {
        match msg {
            Message::Frame { t, frame } => self.frame_result(msg_id, t, &frame),
            Message::Raw {
                t,
                width,
                height,
                landmarks,
            } => {
                let frame = self.extractor.extract(&landmarks, width, height);
                self.frame_result(msg_id, t, &frame)
            }
            Message::NoHand { t } => self.frame_result(msg_id, t, &HandFrame::no_hand()),
            Message::SetMode(mode) => {
                self.controller.set_mode(mode);
                self.mode_response(msg_id)
            }
            Message::CycleMode => {
                self.controller.cycle_mode();
                self.mode_response(msg_id)
            }
            Message::SetSensitivity(v) => {
                let applied = self.controller.set_sensitivity(v);
                sensitivity_response(msg_id, applied)
            }
            Message::SensitivityUp => {
                let applied = self.controller.step_sensitivity(true);
                sensitivity_response(msg_id, applied)
            }
            Message::SensitivityDown => {
                let applied = self.controller.step_sensitivity(false);
                sensitivity_response(msg_id, applied)
            }
            Message::Reset => {
                self.controller.reset();
                self.extractor.reset();
                ok_response(msg_id)
            }
            Message::Toggle => {
                let enabled = self.controller.toggle_enabled();
                format!(
                    "(:type :response :id {} :status :ok :enabled {})",
                    msg_id,
                    sexp_bool(enabled)
                )
            }
            Message::Status => format!(
                "(:type :response :id {} :status :ok :frames {} :controller {})",
                msg_id,
                self.frames,
                self.controller.status_sexp()
            ),
        }
    }

    fn frame_result(&mut self, msg_id: i64, t: f64, frame: &HandFrame) -> String {
        self.frames += 1;
        let outcome = self.controller.process_frame(frame, t);
        format!(
            "(:type :frame-result :id {} :t {:.3} :gesture :{} :action {})",
            msg_id,
            t,
            outcome.gesture.as_str(),
            sexp_bool(outcome.action_taken)
        )
    }

    fn mode_response(&self, msg_id: i64) -> String {
        let help = self
            .controller
            .mode_help()
            .iter()
            .map(|l| quote(l))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "(:type :response :id {} :status :ok :mode :{} :help ({}))",
            msg_id,
            self.controller.mode().as_str(),
            help
        )
    }

    /// Release anything still held (a drag) before the session ends.
    pub fn finish(&mut self) {
        self.controller.reset();
    }
}

fn sensitivity_response(msg_id: i64, applied: f64) -> String {
    format!(
        "(:type :response :id {} :status :ok :sensitivity {:.2})",
        msg_id, applied
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::control::{RecordingSink, SinkCall};

    fn session(mode: Mode) -> Session<RecordingSink> {
        let config = ControllerConfig {
            mode,
            ..ControllerConfig::default()
        };
        Session::new(Controller::new(&config, RecordingSink::new()))
    }

    /// 21 landmarks curled at the image center, with `overrides` applied as
    /// `(index, x, y)`.
    fn landmark_list_with(overrides: &[(usize, f64, f64)]) -> String {
        let mut points = vec![(0.5, 0.5); LANDMARK_COUNT];
        for &(i, x, y) in overrides {
            points[i] = (x, y);
        }
        let body = points
            .iter()
            .map(|(x, y)| format!("({} {} 0.0)", x, y))
            .collect::<Vec<_>>()
            .join(" ");
        format!("({})", body)
    }

    /// Curled hand with the thumb tucked away from the index tip.
    fn landmark_list() -> String {
        landmark_list_with(&[(2, 0.52, 0.6), (4, 0.52, 0.6)])
    }

    /// Only the thumb sticks out sideways.
    fn thumbs_up_line(t: f64) -> String {
        format!(
            "(:type :frame :t {} :openness 50 :rotation 90 :palm (320 240 0.0) :landmarks {})",
            t,
            landmark_list_with(&[(2, 0.52, 0.6), (4, 0.62, 0.6)])
        )
    }

    fn fist_line(t: f64) -> String {
        format!(
            "(:type :frame :t {} :openness 10 :rotation 90 :palm (320 240 0.0) :landmarks {})",
            t,
            landmark_list()
        )
    }

    #[test]
    fn test_parse_frame_message() {
        let v = lexpr::from_str(&fist_line(0.5)).unwrap();
        match Message::from_sexp(&v).unwrap() {
            Message::Frame { t, frame } => {
                assert_eq!(t, 0.5);
                assert_eq!(frame.openness, 10.0);
                assert_eq!((frame.palm_x, frame.palm_y), (320, 240));
                assert!(frame.is_valid());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_frame_without_landmarks_is_untracked() {
        let v = lexpr::from_str("(:type :frame :t 0.1 :openness 10 :palm (1 2))").unwrap();
        match Message::from_sexp(&v).unwrap() {
            Message::Frame { frame, .. } => {
                assert!(!frame.tracking_active);
                assert_eq!(frame.palm_z, 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_palm_out_of_range_rejected() {
        let mut s = session(Mode::Mouse);
        let line = format!(
            "(:type :frame :t 0 :id 3 :openness 10 :rotation 90 :palm (3000000000 240 0.0) :landmarks {})",
            landmark_list()
        );
        let r = s.handle_message(&line).unwrap();
        assert!(r.starts_with("(:type :response :id 3 :status :error"), "got {}", r);
        assert!(r.contains("out of range"));
        assert_eq!(s.frames(), 0);

        let v = lexpr::from_str("(:type :frame :t 0 :palm (-1000001 2))").unwrap();
        assert!(Message::from_sexp(&v).is_err());
    }

    #[test]
    fn test_palm_range_limits_do_not_overflow() {
        let mut s = session(Mode::Mouse);
        for (i, (x, y)) in [(-1000000, -1000000), (1000000, 1000000), (-1000000, 1000000)]
            .iter()
            .enumerate()
        {
            let line = format!(
                "(:type :frame :t {} :openness 10 :rotation 90 :palm ({} {} 0.0) :landmarks {})",
                i as f64 * 0.25,
                x,
                y,
                landmark_list()
            );
            let r = s.handle_message(&line).unwrap();
            assert!(r.starts_with("(:type :frame-result"), "got {}", r);
        }
        assert_eq!(s.frames(), 3);
    }

    #[test]
    fn test_tracked_frame_requires_features() {
        let mut s = session(Mode::Media);
        let no_palm = format!(
            "(:type :frame :t 0 :openness 10 :rotation 90 :landmarks {})",
            landmark_list()
        );
        let r = s.handle_message(&no_palm).unwrap();
        assert!(r.contains(":status :error"));
        assert!(r.contains("missing :palm"), "got {}", r);
        assert_eq!(s.controller().classifier_state().last_palm_x, None);

        let no_rotation = format!(
            "(:type :frame :t 0 :openness 10 :palm (320 240) :landmarks {})",
            landmark_list()
        );
        let r = s.handle_message(&no_rotation).unwrap();
        assert!(r.contains("missing :rotation"), "got {}", r);

        let no_openness = format!(
            "(:type :frame :t 0 :rotation 90 :palm (320 240) :landmarks {})",
            landmark_list()
        );
        let r = s.handle_message(&no_openness).unwrap();
        assert!(r.contains("missing :openness"), "got {}", r);
        assert!(s.controller().sink().calls.is_empty());
    }

    #[test]
    fn test_extra_landmarks_still_tracked() {
        let mut list = landmark_list();
        list.insert_str(list.len() - 1, " (0.5 0.5 0.0)");
        let line = format!(
            "(:type :frame :t 0 :openness 10 :rotation 90 :palm (320 240) :landmarks {})",
            list
        );
        let v = lexpr::from_str(&line).unwrap();
        match Message::from_sexp(&v).unwrap() {
            Message::Frame { frame, .. } => {
                assert_eq!(frame.landmarks.len(), LANDMARK_COUNT + 1);
                assert!(frame.tracking_active);
                assert!(frame.is_valid());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_commands() {
        let parse = |s: &str| Message::from_sexp(&lexpr::from_str(s).unwrap());
        assert_eq!(parse("(:type :set-mode :mode :window)").unwrap(), Message::SetMode(Mode::Window));
        assert_eq!(parse("(:type :set-sensitivity :value 1.4)").unwrap(), Message::SetSensitivity(1.4));
        assert_eq!(parse("(:type :cycle-mode)").unwrap(), Message::CycleMode);
        assert_eq!(parse("(:type :no-hand :t 2)").unwrap(), Message::NoHand { t: 2.0 });
        assert!(parse("(:type :set-mode :mode :gaming)").is_err());
        assert!(parse("(:type :dance)").is_err());
        assert!(parse("(:type :frame)").is_err());
        assert!(parse("(:mode :media)").is_err());
    }

    #[test]
    fn test_bad_landmark_rejected() {
        let v = lexpr::from_str("(:type :frame :t 0 :landmarks ((0.1) (0.2 0.3)))").unwrap();
        let err = Message::from_sexp(&v).unwrap_err();
        assert!(err.to_string().contains("landmark 0"));
    }

    #[test]
    fn test_fist_frames_fire_once() {
        let mut s = session(Mode::Media);
        let r0 = s.handle_message(&fist_line(0.0)).unwrap();
        assert!(r0.contains(":gesture :fist :action nil"));
        s.handle_message(&fist_line(0.1));
        let r = s.handle_message(&fist_line(0.35)).unwrap();
        assert!(r.contains(":action t"), "got {}", r);
        assert_eq!(s.frames(), 3);
        assert_eq!(
            s.controller().sink().calls,
            vec![SinkCall::PressKey("playpause".into())]
        );
    }

    #[test]
    fn test_raw_frame_goes_through_extractor() {
        let mut s = session(Mode::Media);
        let line = format!(
            "(:type :raw :t 0 :width 640 :height 480 :landmarks {})",
            landmark_list()
        );
        let r = s.handle_message(&line).unwrap();
        // Fingertips bunched on the palm center read as fully closed
        assert!(r.contains(":gesture :fist"), "got {}", r);
        assert_eq!(s.controller().classifier_state().last_palm_x, Some(320));
    }

    #[test]
    fn test_no_hand_message() {
        let mut s = session(Mode::Media);
        let r = s.handle_message("(:type :no-hand :t 0.2 :id 9)").unwrap();
        assert_eq!(r, "(:type :frame-result :id 9 :t 0.200 :gesture :none :action nil)");
    }

    #[test]
    fn test_mode_commands() {
        let mut s = session(Mode::Media);
        let r = s.handle_message("(:type :set-mode :mode :presentation)").unwrap();
        assert!(r.contains(":mode :presentation"));
        assert!(r.contains("\"fist - black screen\""));
        let r = s.handle_message("(:type :cycle-mode)").unwrap();
        assert!(r.contains(":mode :media"));
    }

    #[test]
    fn test_sensitivity_commands() {
        let mut s = session(Mode::Media);
        let r = s.handle_message("(:type :set-sensitivity :value 9)").unwrap();
        assert!(r.ends_with(":sensitivity 3.00)"));
        let r = s.handle_message("(:type :sensitivity-down)").unwrap();
        assert!(r.ends_with(":sensitivity 2.80)"));
        s.handle_message("(:type :sensitivity-up)");
        assert_eq!(s.controller().sensitivity().value(), 3.0);
    }

    #[test]
    fn test_toggle_and_status() {
        let mut s = session(Mode::Window);
        let r = s.handle_message("(:type :toggle)").unwrap();
        assert!(r.contains(":enabled nil"));
        let r = s.handle_message("(:type :status :id 4)").unwrap();
        assert!(r.starts_with("(:type :response :id 4 :status :ok :frames 0"));
        assert!(r.contains(":mode :window :enabled nil"));
    }

    #[test]
    fn test_malformed_line() {
        let mut s = session(Mode::Media);
        let r = s.handle_message("(:type :frame").unwrap();
        assert!(r.contains(":status :error"));
        assert!(r.contains("malformed"));
    }

    #[test]
    fn test_finish_releases_drag() {
        let mut s = session(Mode::Mouse);
        s.handle_message(&thumbs_up_line(0.0));
        let r = s.handle_message(&thumbs_up_line(0.25)).unwrap();
        assert!(r.contains(":gesture :thumbs-up :action t"), "got {}", r);

        s.controller_mut().sink_mut().clear();
        s.finish();
        assert_eq!(s.controller().sink().calls, vec![SinkCall::MouseUp]);
    }
}
