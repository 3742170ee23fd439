//! Host control — modes, effect tables, the dispatcher that applies them
//! through an `ActionSink`, and the controller tying recognition to dispatch.

pub mod action;
pub mod controller;
pub mod dispatch;
pub mod mode;
pub mod sink;

pub use action::{Effect, MouseAction};
pub use controller::{Controller, FrameOutcome};
pub use dispatch::{ClickLatch, DispatchConfig, DispatchState, ModeActionDispatcher, PalmPosition};
pub use mode::Mode;
pub use sink::{ActionSink, RecordingSink, SinkCall, VolumeControl};
