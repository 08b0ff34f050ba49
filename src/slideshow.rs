use std::time::{Duration, Instant};

pub const DEFAULT_INTERVAL_MS: u64 = 5000;

/// Auto-advance timer driven from the event loop's `WaitUntil` deadline.
#[derive(Debug, Clone)]
pub struct Slideshow {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl Slideshow {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    pub fn start(&mut self, now: Instant) {
        self.next_tick = Some(now + self.interval);
        log::info!("Slideshow started ({} ms)", self.interval.as_millis());
    }

    pub fn stop(&mut self) {
        if self.next_tick.take().is_some() {
            log::info!("Slideshow stopped");
        }
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.is_running() {
            self.stop();
        } else {
            self.start(now);
        }
    }

    /// True once per elapsed interval; rearms the timer when it fires.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(when) if now >= when => {
                self.next_tick = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

impl Default for Slideshow {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_INTERVAL_MS))
    }
}
