use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_HIDE_CONTROLS_DELAY: Duration = Duration::from_millis(1_500);

/// Monotonic time source measured from an arbitrary epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let delta = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Single-shot countdown. Arming replaces the previous deadline, so only the
/// most recently armed countdown can ever fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InactivityTimer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl InactivityTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn arm(&mut self, now: Duration) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the deadline has passed, then disarms.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for InactivityTimer {
    fn default() -> Self {
        Self::new(DEFAULT_HIDE_CONTROLS_DELAY)
    }
}
