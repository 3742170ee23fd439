//! Gesture → effect tables for each control mode.
//!
//! Tables are plain data so the dispatcher can be tested without touching
//! any effector, and so help text is generated from the same source.

use super::mode::Mode;
use crate::gesture::Gesture;
use crate::ipc::sexp::quote;

// ── Effects ────────────────────────────────────────────────

/// A discrete host effect requested by a rate-gated mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Press and release a single named key.
    Key(&'static str),
    /// Press a key chord, modifiers first.
    Hotkey(&'static [&'static str]),
    /// Change output volume by a signed fraction of full scale.
    Volume(f64),
}

/// Continuous pointer behaviours used in mouse mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    MoveCursor,
    LeftClick,
    RightClick,
    Scroll,
    Drag,
}

/// One row of a mode's gesture table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    pub gesture: Gesture,
    pub effect: Effect,
    pub label: &'static str,
}

const fn bind(gesture: Gesture, effect: Effect, label: &'static str) -> Binding {
    Binding {
        gesture,
        effect,
        label,
    }
}

// ── Tables ─────────────────────────────────────────────────

const MEDIA: &[Binding] = &[
    bind(Gesture::Fist, Effect::Key("playpause"), "pause/play"),
    bind(Gesture::OpenHand, Effect::Key("playpause"), "play/pause"),
    bind(Gesture::RotateLeft, Effect::Volume(-0.05), "volume down"),
    bind(Gesture::RotateRight, Effect::Volume(0.05), "volume up"),
    bind(Gesture::SwipeLeft, Effect::Key("prevtrack"), "previous track"),
    bind(Gesture::SwipeRight, Effect::Key("nexttrack"), "next track"),
    bind(Gesture::SwipeUp, Effect::Volume(0.10), "volume up (fast)"),
    bind(Gesture::SwipeDown, Effect::Volume(-0.10), "volume down (fast)"),
    bind(Gesture::Peace, Effect::Key("space"), "space (play/pause)"),
    bind(Gesture::ThumbsUp, Effect::Hotkey(&["ctrl", "up"]), "increase speed"),
];

const WINDOW: &[Binding] = &[
    bind(Gesture::SwipeLeft, Effect::Hotkey(&["win", "left"]), "snap left"),
    bind(Gesture::SwipeRight, Effect::Hotkey(&["win", "right"]), "snap right"),
    bind(Gesture::SwipeUp, Effect::Hotkey(&["win", "up"]), "maximize"),
    bind(Gesture::SwipeDown, Effect::Hotkey(&["win", "down"]), "minimize/restore"),
    bind(Gesture::Fist, Effect::Hotkey(&["alt", "f4"]), "close window"),
    bind(Gesture::Peace, Effect::Hotkey(&["alt", "tab"]), "switch window"),
    bind(Gesture::OpenHand, Effect::Hotkey(&["win", "d"]), "show desktop"),
    bind(Gesture::ThumbsUp, Effect::Hotkey(&["win", "tab"]), "task view"),
];

const PRESENTATION: &[Binding] = &[
    bind(Gesture::SwipeRight, Effect::Key("right"), "next slide"),
    bind(Gesture::Pointing, Effect::Key("right"), "next slide"),
    bind(Gesture::SwipeLeft, Effect::Key("left"), "previous slide"),
    bind(Gesture::Fist, Effect::Key("b"), "black screen"),
    bind(Gesture::OpenHand, Effect::Key("w"), "white screen"),
    bind(Gesture::Peace, Effect::Key("home"), "first slide"),
    bind(Gesture::ThumbsUp, Effect::Key("end"), "last slide"),
];

const MOUSE: &[(Gesture, MouseAction, &str)] = &[
    (Gesture::OpenHand, MouseAction::MoveCursor, "move cursor"),
    (Gesture::Pointing, MouseAction::MoveCursor, "move cursor"),
    (Gesture::Pinch, MouseAction::LeftClick, "click"),
    (Gesture::Peace, MouseAction::RightClick, "right click"),
    (Gesture::Fist, MouseAction::Scroll, "scroll (move hand up/down)"),
    (Gesture::ThumbsUp, MouseAction::Drag, "drag (hold to drag)"),
];

// ── Lookup ─────────────────────────────────────────────────

/// Discrete bindings for a mode.  Mouse mode has none.
pub fn bindings(mode: Mode) -> &'static [Binding] {
    match mode {
        Mode::Media => MEDIA,
        Mode::Window => WINDOW,
        Mode::Presentation => PRESENTATION,
        Mode::Mouse => &[],
    }
}

/// Effect bound to `gesture` in `mode`, if any.
pub fn lookup(mode: Mode, gesture: Gesture) -> Option<&'static Binding> {
    bindings(mode).iter().find(|b| b.gesture == gesture)
}

/// Pointer behaviour bound to `gesture` in mouse mode.
pub fn mouse_action(gesture: Gesture) -> Option<MouseAction> {
    MOUSE
        .iter()
        .find(|(g, _, _)| *g == gesture)
        .map(|(_, action, _)| *action)
}

/// Help lines for a mode, one per binding, e.g. "fist - pause/play".
pub fn help_lines(mode: Mode) -> Vec<String> {
    match mode {
        Mode::Mouse => MOUSE
            .iter()
            .map(|(g, _, label)| format!("{} - {}", g.as_str(), label))
            .collect(),
        _ => bindings(mode)
            .iter()
            .map(|b| format!("{} - {}", b.gesture.as_str(), b.label))
            .collect(),
    }
}

/// Generate s-expression listing a mode's bindings.
pub fn bindings_sexp(mode: Mode) -> String {
    let lines = help_lines(mode);
    if lines.is_empty() {
        return "nil".to_string();
    }
    let mut s = String::from("(");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        s.push_str(&quote(line));
    }
    s.push(')');
    s
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_table() {
        assert_eq!(
            lookup(Mode::Media, Gesture::Fist).map(|b| b.effect),
            Some(Effect::Key("playpause"))
        );
        assert_eq!(
            lookup(Mode::Media, Gesture::RotateLeft).map(|b| b.effect),
            Some(Effect::Volume(-0.05))
        );
        assert_eq!(
            lookup(Mode::Media, Gesture::SwipeUp).map(|b| b.effect),
            Some(Effect::Volume(0.10))
        );
        assert_eq!(
            lookup(Mode::Media, Gesture::ThumbsUp).map(|b| b.effect),
            Some(Effect::Hotkey(&["ctrl", "up"]))
        );
        assert!(lookup(Mode::Media, Gesture::Pinch).is_none());
        assert!(lookup(Mode::Media, Gesture::PalmPush).is_none());
    }

    #[test]
    fn test_window_table() {
        assert_eq!(
            lookup(Mode::Window, Gesture::Fist).map(|b| b.effect),
            Some(Effect::Hotkey(&["alt", "f4"]))
        );
        assert_eq!(
            lookup(Mode::Window, Gesture::SwipeDown).map(|b| b.label),
            Some("minimize/restore")
        );
        assert!(lookup(Mode::Window, Gesture::Pointing).is_none());
    }

    #[test]
    fn test_presentation_table() {
        let next = lookup(Mode::Presentation, Gesture::SwipeRight).map(|b| b.effect);
        assert_eq!(next, Some(Effect::Key("right")));
        assert_eq!(
            lookup(Mode::Presentation, Gesture::Pointing).map(|b| b.effect),
            next
        );
        assert_eq!(
            lookup(Mode::Presentation, Gesture::ThumbsUp).map(|b| b.effect),
            Some(Effect::Key("end"))
        );
    }

    #[test]
    fn test_mouse_has_no_discrete_bindings() {
        assert!(bindings(Mode::Mouse).is_empty());
        assert_eq!(mouse_action(Gesture::Pinch), Some(MouseAction::LeftClick));
        assert_eq!(mouse_action(Gesture::Pointing), Some(MouseAction::MoveCursor));
        assert_eq!(mouse_action(Gesture::SwipeLeft), None);
    }

    #[test]
    fn test_tables_have_unique_gestures() {
        for mode in Mode::ALL {
            let table = bindings(mode);
            for (i, b) in table.iter().enumerate() {
                assert!(
                    table[i + 1..].iter().all(|o| o.gesture != b.gesture),
                    "{:?} bound twice in {:?}",
                    b.gesture,
                    mode
                );
            }
        }
    }

    #[test]
    fn test_help_lines() {
        let media = help_lines(Mode::Media);
        assert_eq!(media.len(), 10);
        assert!(media.contains(&"fist - pause/play".to_string()));
        let mouse = help_lines(Mode::Mouse);
        assert!(mouse.contains(&"pinch - click".to_string()));
    }

    #[test]
    fn test_bindings_sexp() {
        let sexp = bindings_sexp(Mode::Presentation);
        assert!(sexp.starts_with("(\""));
        assert!(sexp.contains("\"fist - black screen\""));
    }
}
