/// Outcome of asking the table about one (node, timestamp) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting; the message should flow onward.
    Fresh,
    /// A retransmission of something already admitted; drop it.
    Duplicate,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    node_id: u8,
    timestamp: u32,
    /// Arrival time of the admission this entry records. Duplicates do not
    /// refresh it, so a burst of retransmissions ages out together.
    admitted_at_ms: u64,
}

/// Bounded last-seen table guarding against node retransmissions being
/// double-counted as independent readings.
///
/// One slot per node; when a new node arrives and the table is full, the
/// least-recently-updated slot is evicted.
#[derive(Debug, Clone)]
pub struct DedupTable {
    entries: Vec<Entry>,
    capacity: usize,
    window_ms: u64,
}

impl DedupTable {
    pub fn new(capacity: usize, window_ms: u64) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            window_ms,
        }
    }

    /// Checks one message against the table and records it if fresh.
    pub fn admit(&mut self, node_id: u8, timestamp: u32, now_ms: u64) -> Admission {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.node_id == node_id) {
            let age = now_ms.saturating_sub(entry.admitted_at_ms);
            if entry.timestamp == timestamp && age < self.window_ms {
                return Admission::Duplicate;
            }
            entry.timestamp = timestamp;
            entry.admitted_at_ms = now_ms;
            return Admission::Fresh;
        }

        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.push(Entry {
            node_id,
            timestamp,
            admitted_at_ms: now_ms,
        });
        Admission::Fresh
    }

    /// Number of nodes currently tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.admitted_at_ms)
            .map(|(i, _)| i)
        {
            self.entries.swap_remove(oldest);
        }
    }
}
