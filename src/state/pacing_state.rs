use std::time::{Duration, Instant};

/// Tracks the politeness pacing of one limiter scope
///
/// This structure remembers when a permit was last released and the gap drawn
/// at that release (base delay plus jitter). The next acquisition in the scope
/// may not start before `last_release + gap`.
#[derive(Debug, Clone, Default)]
pub struct PacingState {
    /// Number of permits handed out in this scope
    pub request_count: u64,

    /// Timestamp of the last permit release in this scope
    pub last_release: Option<Instant>,

    /// Gap that must elapse after `last_release`
    pub gap: Duration,
}

impl PacingState {
    /// Creates a new PacingState with no history
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a request can start now
    pub fn can_request(&self, now: Instant) -> bool {
        self.time_until_next_request(now).is_none()
    }

    /// Calculates the time until the next request can start
    ///
    /// Returns None if a request can start now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_release?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.gap {
            Some(self.gap - elapsed)
        } else {
            None
        }
    }

    /// Records that a request started in this scope
    pub fn record_request(&mut self) {
        self.request_count += 1;
    }

    /// Records that a permit was released, with the gap to keep before the next start
    ///
    /// Releases are not ordered with respect to each other, so a release never moves
    /// the ready time earlier than an already pending one.
    pub fn record_release(&mut self, now: Instant, gap: Duration) {
        let pending = self.last_release.map(|last| last + self.gap);
        if pending.is_some_and(|ready| ready > now + gap) {
            return;
        }
        self.last_release = Some(now);
        self.gap = gap;
    }
}
