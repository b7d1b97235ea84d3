use std::time::Instant;

/// Monotonic millisecond counter, the host side of `to_ms_since_boot`.
///
/// The value wraps after ~49.7 days; consumers compare timestamps with
/// `wrapping_sub` so the wrap is harmless.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    start: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}
