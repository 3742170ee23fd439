//! `ActionSink` that reports effects as s-expression events on a writer.
//!
//! The pointer and master volume are virtual: the sink tracks them itself so
//! a consumer on the other end of the stream can apply effects however it
//! likes.

use std::io::Write;

use anyhow::{Context, Result};

use super::sexp::{format_event, quote};
use crate::control::ActionSink;

/// Writes one event line per effect.
#[derive(Debug)]
pub struct SexpSink<W: Write> {
    writer: W,
    cursor: (i32, i32),
    volume: f64,
}

impl<W: Write> SexpSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            cursor: (0, 0),
            volume: 0.5,
        }
    }

    /// Start with the virtual pointer at `(x, y)`.
    pub fn with_cursor(mut self, x: i32, y: i32) -> Self {
        self.cursor = (x, y);
        self
    }

    /// Start with the virtual master volume at `level`.
    pub fn with_volume(mut self, level: f64) -> Self {
        self.volume = level.clamp(0.0, 1.0);
        self
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, event: &str, fields: &[(&str, &str)]) -> Result<()> {
        let line = format_event(event, fields);
        writeln!(self.writer, "{}", line).context("writing event")?;
        self.writer.flush().context("flushing events")
    }
}

impl<W: Write> ActionSink for SexpSink<W> {
    fn press_key(&mut self, key: &str) -> Result<()> {
        self.emit("key-press", &[("key", &quote(key))])
    }

    fn hotkey(&mut self, keys: &[&str]) -> Result<()> {
        let list = keys.iter().map(|k| quote(k)).collect::<Vec<_>>().join(" ");
        self.emit("hotkey", &[("keys", &format!("({})", list))])
    }

    fn cursor_position(&mut self) -> Result<(i32, i32)> {
        Ok(self.cursor)
    }

    fn move_cursor_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.emit("cursor-move", &[("x", &x.to_string()), ("y", &y.to_string())])?;
        self.cursor = (x, y);
        Ok(())
    }

    fn click(&mut self) -> Result<()> {
        self.emit("click", &[("button", ":left")])
    }

    fn right_click(&mut self) -> Result<()> {
        self.emit("click", &[("button", ":right")])
    }

    fn scroll(&mut self, amount: i32) -> Result<()> {
        self.emit("scroll", &[("amount", &amount.to_string())])
    }

    fn mouse_down(&mut self) -> Result<()> {
        self.emit("mouse-down", &[("button", ":left")])
    }

    fn mouse_up(&mut self) -> Result<()> {
        self.emit("mouse-up", &[("button", ":left")])
    }

    fn volume(&mut self) -> Result<f64> {
        Ok(self.volume)
    }

    fn set_volume(&mut self, level: f64) -> Result<()> {
        let level = level.clamp(0.0, 1.0);
        self.emit("volume", &[("level", &format!("{:.2}", level))])?;
        self.volume = level;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::VolumeControl;

    fn output(sink: SexpSink<Vec<u8>>) -> Vec<String> {
        String::from_utf8(sink.into_inner())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_key_events() {
        let mut sink = SexpSink::new(Vec::new());
        sink.press_key("playpause").unwrap();
        sink.hotkey(&["alt", "f4"]).unwrap();
        assert_eq!(
            output(sink),
            vec![
                "(:type :event :event :key-press :key \"playpause\")",
                "(:type :event :event :hotkey :keys (\"alt\" \"f4\"))",
            ]
        );
    }

    #[test]
    fn test_virtual_cursor() {
        let mut sink = SexpSink::new(Vec::new()).with_cursor(10, 20);
        assert_eq!(sink.cursor_position().unwrap(), (10, 20));
        sink.move_cursor_to(300, 400).unwrap();
        assert_eq!(sink.cursor(), (300, 400));
        assert_eq!(
            output(sink),
            vec!["(:type :event :event :cursor-move :x 300 :y 400)"]
        );
    }

    #[test]
    fn test_mouse_events() {
        let mut sink = SexpSink::new(Vec::new());
        sink.click().unwrap();
        sink.right_click().unwrap();
        sink.scroll(-40).unwrap();
        sink.mouse_down().unwrap();
        sink.mouse_up().unwrap();
        let lines = output(sink);
        assert_eq!(lines.len(), 5);
        assert!(lines[1].ends_with(":click :button :right)"));
        assert!(lines[2].ends_with(":scroll :amount -40)"));
        assert!(lines[4].contains(":mouse-up"));
    }

    #[test]
    fn test_virtual_mixer() {
        let mut sink = SexpSink::new(Vec::new()).with_volume(0.5);
        VolumeControl::Mixer.adjust(&mut sink, 0.10).unwrap();
        assert!((sink.volume().unwrap() - 0.6).abs() < 1e-9);
        assert_eq!(output(sink), vec!["(:type :event :event :volume :level 0.60)"]);
    }

    #[test]
    fn test_key_names_escaped() {
        let mut sink = SexpSink::new(Vec::new());
        sink.press_key("\"").unwrap();
        assert_eq!(output(sink), vec!["(:type :event :event :key-press :key \"\\\"\")"]);
    }
}
