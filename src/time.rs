//! Wall-clock access and the cooldown timer built on it.
//!
//! Game code never reads the browser clock directly: it goes through
//! [`Clock`], so tests can drive time by hand with `ManualClock`.

/// Milliseconds since an arbitrary origin. Only differences are meaningful.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// `performance.now()`, falling back to `Date.now()` when the
/// Performance API is unavailable.
pub struct PerformanceClock;

impl Clock for PerformanceClock {
    fn now_ms(&self) -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }
}

/// Hand-driven clock for tests. Clones share the same time.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct ManualClock(std::rc::Rc<std::cell::Cell<f64>>);

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: f64) {
        self.0.set(self.0.get() + ms);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

/// Window during which a rate-limited service is left alone.
#[derive(Debug, Clone)]
pub struct Cooldown {
    duration_ms: f64,
    /// End of the active window, None if never tripped.
    until_ms: Option<f64>,
}

impl Cooldown {
    pub fn new(duration_ms: f64) -> Self {
        Self { duration_ms, until_ms: None }
    }

    /// Start (or restart) the window at `now_ms`.
    pub fn trip(&mut self, now_ms: f64) {
        self.until_ms = Some(now_ms + self.duration_ms);
    }

    pub fn is_active(&self, now_ms: f64) -> bool {
        self.until_ms.is_some_and(|until| now_ms < until)
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        self.until_ms.map_or(0.0, |until| (until - now_ms).max(0.0))
    }
}
