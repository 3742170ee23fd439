//! gesturectl - hand-gesture recognition driving media, pointer, window and
//! presentation controls.
//!
//! Landmarks come from an external hand detector.  The crate turns them into
//! gestures and gestures into host effects through an `ActionSink`.

pub mod config;
pub mod control;
pub mod gesture;
pub mod ipc;
pub mod tracking;

pub use config::ControllerConfig;
pub use control::{ActionSink, Controller, FrameOutcome, Mode};
pub use gesture::Gesture;
pub use tracking::HandFrame;
