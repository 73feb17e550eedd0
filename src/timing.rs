//! Phase timing.

use std::time::{Duration, Instant};
use tracing::info;

/// Measures how long one action takes.
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Log the elapsed time with the outcome and return it.
    pub fn finish(self, succeeded: bool) -> Duration {
        let elapsed = self.start.elapsed();
        let outcome = if succeeded { "done" } else { "failed" };
        info!("{} {} after {}", self.name, outcome, format_elapsed(elapsed));
        elapsed
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}
