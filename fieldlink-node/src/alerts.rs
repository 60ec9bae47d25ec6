use alloc::vec::Vec;

use fieldlink_proto::codec::{encode_humidity, encode_temperature};
use fieldlink_proto::{Alert, AlertCode, Severity};

use crate::sensor::Reading;

/// Per-metric alert thresholds. `None` disables the check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    pub temperature_high_c: Option<f32>,
    pub temperature_low_c: Option<f32>,
    pub humidity_high_percent: Option<f32>,
    pub humidity_low_percent: Option<f32>,
    /// An object closer than this counts as presence.
    pub distance_low_cm: Option<f32>,
    pub distance_high_cm: Option<f32>,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            temperature_high_c: None,
            temperature_low_c: None,
            humidity_high_percent: Some(80.0),
            humidity_low_percent: None,
            distance_low_cm: Some(100.0),
            distance_high_cm: None,
        }
    }
}

impl AlertThresholds {
    /// Checks one reading against every configured threshold.
    ///
    /// The alert value carries the metric in its wire scaling (×100 for
    /// temperature and humidity, plain centimeters for distance).
    pub fn evaluate(&self, reading: &Reading, node_id: u8, timestamp: u32) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if let Some(limit) = self.temperature_high_c {
            if reading.temperature_c > limit {
                alerts.push(Alert::new(
                    node_id,
                    timestamp,
                    AlertCode::TemperatureHigh,
                    encode_temperature(reading.temperature_c),
                    grade(reading.temperature_c, limit),
                ));
            }
        }
        if let Some(limit) = self.temperature_low_c {
            if reading.temperature_c < limit {
                alerts.push(Alert::new(
                    node_id,
                    timestamp,
                    AlertCode::TemperatureLow,
                    encode_temperature(reading.temperature_c),
                    grade(reading.temperature_c, limit),
                ));
            }
        }
        if let Some(limit) = self.humidity_high_percent {
            if reading.humidity_percent > limit {
                alerts.push(Alert::new(
                    node_id,
                    timestamp,
                    AlertCode::HumidityHigh,
                    encode_humidity(reading.humidity_percent) as i16,
                    grade(reading.humidity_percent, limit),
                ));
            }
        }
        if let Some(limit) = self.humidity_low_percent {
            if reading.humidity_percent < limit {
                alerts.push(Alert::new(
                    node_id,
                    timestamp,
                    AlertCode::HumidityLow,
                    encode_humidity(reading.humidity_percent) as i16,
                    grade(reading.humidity_percent, limit),
                ));
            }
        }
        if let Some(limit) = self.distance_low_cm {
            if reading.distance_cm < limit {
                alerts.push(Alert::new(
                    node_id,
                    timestamp,
                    AlertCode::DistanceLow,
                    reading.distance_cm as i16,
                    grade(reading.distance_cm, limit),
                ));
            }
        }
        if let Some(limit) = self.distance_high_cm {
            if reading.distance_cm > limit {
                alerts.push(Alert::new(
                    node_id,
                    timestamp,
                    AlertCode::DistanceHigh,
                    reading.distance_cm as i16,
                    grade(reading.distance_cm, limit),
                ));
            }
        }

        alerts
    }
}

/// Severity graded by how far the reading overshoots the threshold:
/// within 10% of the threshold's magnitude is low, within 25% medium,
/// beyond that high.
fn grade(value: f32, limit: f32) -> Severity {
    let scale = libm::fabsf(limit).max(1.0);
    let margin = libm::fabsf(value - limit) / scale;

    if margin <= 0.10 {
        Severity::Low
    } else if margin <= 0.25 {
        Severity::Medium
    } else {
        Severity::High
    }
}
