//! Gesture recognition — sensitivity-derived thresholds, the per-frame
//! classifier, and the hold-time gate that debounces its output.

pub mod classifier;
pub mod hold;
pub mod sensitivity;

pub use classifier::{ClassifierState, Gesture, GestureClassifier};
pub use hold::HoldTimeGate;
pub use sensitivity::{SensitivityProfile, Thresholds};
