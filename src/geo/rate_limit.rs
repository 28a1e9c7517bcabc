use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Fixed-window counter limiting outbound calls to the remote geolocation
/// service.
///
/// One limiter is shared by all requests, so concurrent aggregations
/// cannot collectively exceed the external service's budget. The
/// increment-and-check runs under a single mutex; the critical section is
/// a few instructions, so contention is negligible.
///
/// When the window is exhausted the caller degrades immediately instead of
/// queuing — geolocation freshness is best-effort.
pub struct FixedWindow {
    max_calls: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

struct WindowState {
    started: Instant,
    used: u32,
}

impl FixedWindow {
    pub fn new(max_calls: u32, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            state: Mutex::new(WindowState {
                started: Instant::now(),
                used: 0,
            }),
        }
    }

    /// Claim one call from the current window. Returns `false` when the
    /// budget is spent; the window resets once its duration has elapsed.
    pub fn try_acquire(&self) -> bool {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            // A poisoned lock means another thread panicked mid-update;
            // fail closed rather than risk exceeding the remote budget.
            Err(_) => return false,
        };

        let now = Instant::now();
        if now.duration_since(state.started) >= self.window {
            state.started = now;
            state.used = 0;
        }

        if state.used >= self.max_calls {
            return false;
        }
        state.used += 1;
        true
    }
}
