//! The overlay controller and the session state it owns.

pub mod config;
pub mod controller;
pub mod state;

pub use config::OverlayConfig;
pub use controller::{OverlayController, Trigger, aspect_ratio_diverges};
pub use state::{DiffStatus, OverlayPhase, OverlayState};
