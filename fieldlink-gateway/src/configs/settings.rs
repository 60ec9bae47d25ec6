use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use fieldlink_proto::RadioParams;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Gateway identifier reported to the backend.
    pub id: u8,
    /// Distance below which a reading counts as presence.
    pub presence_threshold_cm: u16,
    /// Radio poll pacing of the control loop.
    pub poll_interval_ms: u64,
}

/// Physical link parameters. Must match every node's configuration or no
/// frames will be exchanged at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioSettings {
    pub frequency_mhz: f32,
    pub bandwidth_khz: f32,
    pub spreading_factor: u8,
    pub coding_rate: u8,
    pub sync_word: u8,
    pub tx_power_dbm: i8,
    pub preamble_length: u16,
}

impl RadioSettings {
    pub fn to_params(&self) -> RadioParams {
        RadioParams {
            frequency_mhz: self.frequency_mhz,
            bandwidth_khz: self.bandwidth_khz,
            spreading_factor: self.spreading_factor,
            coding_rate: self.coding_rate,
            sync_word: self.sync_word,
            tx_power_dbm: self.tx_power_dbm,
            preamble_length: self.preamble_length,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupSettings {
    /// Number of nodes tracked at once.
    pub capacity: usize,
    /// Age within which a repeated (node, timestamp) is a retransmission.
    pub window_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    pub size: usize,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwarderSettings {
    pub base_url: String,
    pub data_path: String,
    pub stats_path: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSettings {
    pub report_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub gateway: GatewaySettings,
    pub radio: RadioSettings,
    pub dedup: DedupSettings,
    pub batch: BatchSettings,
    pub forwarder: ForwarderSettings,
    pub stats: StatsSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("_"))
            .build()?
            .try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        let radio = RadioParams::default();

        Self {
            logger: Logger {
                level: "info".into(),
            },
            gateway: GatewaySettings {
                id: 23,
                presence_threshold_cm: 100,
                poll_interval_ms: 10,
            },
            radio: RadioSettings {
                frequency_mhz: radio.frequency_mhz,
                bandwidth_khz: radio.bandwidth_khz,
                spreading_factor: radio.spreading_factor,
                coding_rate: radio.coding_rate,
                sync_word: radio.sync_word,
                tx_power_dbm: radio.tx_power_dbm,
                preamble_length: radio.preamble_length,
            },
            dedup: DedupSettings {
                capacity: 16,
                window_ms: 60_000,
            },
            batch: BatchSettings {
                size: 5,
                timeout_ms: 30_000,
            },
            forwarder: ForwarderSettings {
                base_url: "http://127.0.0.1:8080".into(),
                data_path: "/api/sensor-data".into(),
                stats_path: "/api/gateway-stats".into(),
                timeout_ms: 5000,
            },
            stats: StatsSettings {
                report_interval_ms: 60_000,
            },
        }
    }
}
