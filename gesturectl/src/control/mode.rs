//! Control modes — each selects a different gesture → effect table.

/// Active control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Media,
    Mouse,
    Window,
    Presentation,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Media, Mode::Mouse, Mode::Window, Mode::Presentation];

    /// String representation for IPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::Mouse => "mouse",
            Self::Window => "window",
            Self::Presentation => "presentation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "media" => Some(Self::Media),
            "mouse" => Some(Self::Mouse),
            "window" => Some(Self::Window),
            "presentation" => Some(Self::Presentation),
            _ => None,
        }
    }

    /// Human-readable name.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Media => "Media Control",
            Self::Mouse => "Mouse Control",
            Self::Window => "Window Management",
            Self::Presentation => "Presentation",
        }
    }

    /// Next mode in cycling order, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            Self::Media => Self::Mouse,
            Self::Mouse => Self::Window,
            Self::Window => Self::Presentation,
            Self::Presentation => Self::Media,
        }
    }

    /// Help lines for this mode's gestures.
    pub fn help(&self) -> Vec<String> {
        super::action::help_lines(*self)
    }

    /// Mouse mode is continuous control; the others are cooldown-gated.
    pub fn is_rate_gated(&self) -> bool {
        !matches!(self, Self::Mouse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_visits_all_modes() {
        let mut m = Mode::Media;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(m);
            m = m.next();
        }
        assert_eq!(m, Mode::Media);
        assert_eq!(seen, Mode::ALL.to_vec());
    }

    #[test]
    fn test_from_str() {
        for m in Mode::ALL {
            assert_eq!(Mode::from_str(m.as_str()), Some(m));
        }
        assert_eq!(Mode::from_str("gaming"), None);
    }

    #[test]
    fn test_rate_gated() {
        assert!(Mode::Media.is_rate_gated());
        assert!(!Mode::Mouse.is_rate_gated());
        assert!(Mode::Presentation.is_rate_gated());
    }

    #[test]
    fn test_help_per_mode() {
        assert!(Mode::Window.help().contains(&"fist - close window".to_string()));
        assert!(Mode::Mouse.help().contains(&"thumbs-up - drag (hold to drag)".to_string()));
    }
}
