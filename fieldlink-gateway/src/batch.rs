/// Bounded, time-boxed accumulator for validated readings.
///
/// Exactly one batch is open at any time. A flush hands the whole batch out
/// by value and leaves a fresh empty one behind, so no record can straddle
/// the flush boundary.
#[derive(Debug)]
pub struct Batcher<T> {
    records: Vec<T>,
    capacity: usize,
    timeout_ms: u64,
    opened_at_ms: Option<u64>,
}

impl<T> Batcher<T> {
    pub fn new(capacity: usize, timeout_ms: u64) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
            timeout_ms,
            opened_at_ms: None,
        }
    }

    /// Appends a record; returns the full batch when this append filled it.
    pub fn add(&mut self, record: T, now_ms: u64) -> Option<Vec<T>> {
        if self.records.is_empty() {
            self.opened_at_ms = Some(now_ms);
        }
        self.records.push(record);

        if self.records.len() >= self.capacity {
            return Some(self.take());
        }
        None
    }

    /// Flushes a non-empty batch whose age passed the timeout. Called
    /// periodically so low traffic still reaches the backend in bounded time.
    pub fn check_timeout(&mut self, now_ms: u64) -> Option<Vec<T>> {
        match self.opened_at_ms {
            Some(opened) if now_ms.saturating_sub(opened) >= self.timeout_ms => Some(self.take()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn take(&mut self) -> Vec<T> {
        self.opened_at_ms = None;
        std::mem::replace(&mut self.records, Vec::with_capacity(self.capacity))
    }
}
