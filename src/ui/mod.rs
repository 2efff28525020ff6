//! Terminal status line
//!
//! A single indicatif spinner showing the detected tempo, tap and beat
//! counters and whether the scheduler is armed.

mod inspector;
mod progress;

pub use inspector::{format_status, run_status_display};
pub use progress::create_status_spinner;
