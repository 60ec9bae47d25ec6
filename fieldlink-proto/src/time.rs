/// Monotonic millisecond clock.
///
/// Node timestamps and gateway window/age arithmetic are all based on this;
/// wall-clock time only appears at the gateway's forwarding edge.
pub trait TimeProvider {
    fn uptime_ms(&self) -> u64;
}

#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemTimeProvider {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemTimeProvider {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl TimeProvider for SystemTimeProvider {
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

#[cfg(feature = "std")]
impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}
