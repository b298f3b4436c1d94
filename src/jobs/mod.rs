//! Top-level jobs the binary can run

pub mod series_check;

pub use series_check::{run_series_check, CheckOutcome, CheckStats};
