use crate::sensor::Reading;

/// Last readings that actually made it onto the air.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SentState {
    humidity_percent: f32,
    distance_cm: f32,
}

/// Adaptive transmission suppression.
///
/// Compares the current reading against the last *sent* state, not the last
/// read one, so that a slow drift below the per-cycle threshold still gets
/// reported once it accumulates.
#[derive(Debug, Clone)]
pub struct AdaptivePolicy {
    enabled: bool,
    humidity_threshold: f32,
    distance_threshold: f32,
    forced_cadence: u32,
    previous: Option<SentState>,
}

impl AdaptivePolicy {
    pub fn new(
        enabled: bool,
        humidity_threshold: f32,
        distance_threshold: f32,
        forced_cadence: u32,
    ) -> Self {
        Self {
            enabled,
            humidity_threshold,
            distance_threshold,
            forced_cadence,
            previous: None,
        }
    }

    /// Decides whether `reading` is worth transmitting on cycle `cycle_index`
    /// (1-based).
    pub fn should_send(&self, reading: &Reading, cycle_index: u32) -> bool {
        if !self.enabled {
            return true;
        }
        if cycle_index == 1 {
            return true;
        }
        if self.forced_cadence != 0 && cycle_index % self.forced_cadence == 0 {
            return true;
        }

        match &self.previous {
            None => true,
            Some(prev) => {
                libm::fabsf(reading.humidity_percent - prev.humidity_percent)
                    > self.humidity_threshold
                    || libm::fabsf(reading.distance_cm - prev.distance_cm)
                        > self.distance_threshold
            }
        }
    }

    /// Records a successful transmission; future decisions compare against
    /// these values.
    pub fn record_sent(&mut self, reading: &Reading) {
        self.previous = Some(SentState {
            humidity_percent: reading.humidity_percent,
            distance_cm: reading.distance_cm,
        });
    }
}
