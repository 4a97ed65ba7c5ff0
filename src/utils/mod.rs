//! General-purpose utility modules.

pub mod clock;
pub mod debounce;
pub mod error;

// Re-export commonly used items
pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::Debounced;
pub use error::{DiffError, Result};
