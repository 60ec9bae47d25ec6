use fieldlink_proto::RadioParams;

use crate::alerts::AlertThresholds;

/// Node-side configuration, constructed once at startup and passed down.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Node identifier (1-255).
    pub node_id: u8,
    /// Skip transmissions when readings have not changed meaningfully.
    pub adaptive_tx: bool,
    /// Humidity change (percent points) that forces a send.
    pub humidity_threshold: f32,
    /// Distance change (cm) that forces a send.
    pub distance_threshold: f32,
    /// Every Nth cycle sends regardless of change detection.
    pub forced_cadence: u32,
    /// Total transmission tries per message, including the first.
    pub max_attempts: u8,
    /// Fixed delay between tries.
    pub retry_delay_ms: u32,
    /// Send a heartbeat every N suppressed cycles, if set.
    pub heartbeat_cadence: Option<u32>,
    /// Battery percentage below which heartbeats flag low battery.
    pub low_battery_percent: u8,
    /// Alert thresholds, if alerting is enabled.
    pub alerts: Option<AlertThresholds>,
    /// Physical link parameters; must match the gateway's.
    pub radio: RadioParams,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: 1,
            adaptive_tx: true,
            humidity_threshold: 2.0,
            distance_threshold: 10.0,
            forced_cadence: 10,
            max_attempts: 3,
            retry_delay_ms: 100,
            heartbeat_cadence: Some(10),
            low_battery_percent: 20,
            alerts: None,
            radio: RadioParams::default(),
        }
    }
}
