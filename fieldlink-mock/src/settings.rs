use std::error::Error;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSettings {
    pub id: u8,
    pub cycle_interval_ms: u64,
    pub adaptive_tx: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub tx_failure_rate: f32,
    pub loss_rate: f32,
    pub duplicate_rate: f32,
    pub corrupt_rate: f32,
    pub rssi_min: f32,
    pub rssi_max: f32,
    pub snr_min: f32,
    pub snr_max: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimSettings {
    pub humidity_base: f32,
    pub humidity_variation: f32,
    pub distance_base: f32,
    pub distance_variation: f32,
    pub day_cycles: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardSettings {
    /// POST to the configured backend instead of logging batches.
    pub http: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub node: NodeSettings,
    pub channel: ChannelSettings,
    pub sim: SimSettings,
    pub forward: ForwardSettings,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let settings: Settings = toml::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/configs/default.toml"
        )))?;

        Ok(settings)
    }
}
