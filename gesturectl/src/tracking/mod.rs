//! Hand tracking input — landmark layout, per-frame hand data, and
//! feature extraction from raw landmarks.
//!
//! Landmark detection itself happens outside this crate; these types
//! describe what the detector hands us.

pub mod features;
pub mod hand;

pub use features::{FeatureConfig, FeatureExtractor, Smoother};
pub use hand::{FingerExtension, HandFrame, HandLandmark, LANDMARK_COUNT};
