use serde::Serialize;
use time::OffsetDateTime;

use fieldlink_proto::SensorData;

/// One validated reading, decoded to physical units and ready for the
/// backend. Serializes to the JSON shape the backend API expects.
#[derive(Debug, Clone, Serialize)]
pub struct SensorRecord {
    pub node_id: String,
    pub gateway_id: u8,
    /// Gateway wall-clock time at receipt.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Node-local milliseconds since boot.
    pub client_timestamp: u32,
    pub sensors: SensorValues,
    pub battery_percent: u8,
    pub radio: RadioQuality,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorValues {
    pub temperature_celsius: f32,
    pub humidity_percent: f32,
    pub distance_cm: u16,
    pub luminosity_lux: u16,
    pub presence_detected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RadioQuality {
    pub rssi_dbm: f32,
    pub snr_db: f32,
}

impl SensorRecord {
    pub fn new(
        data: &SensorData,
        rssi: f32,
        snr: f32,
        gateway_id: u8,
        presence_threshold_cm: u16,
        received_at: OffsetDateTime,
    ) -> Self {
        Self {
            node_id: format!("node-{}", data.node_id),
            gateway_id,
            timestamp: received_at,
            client_timestamp: data.timestamp,
            sensors: SensorValues {
                temperature_celsius: data.temperature_c(),
                humidity_percent: data.humidity_percent(),
                distance_cm: data.distance_cm,
                luminosity_lux: data.luminosity_lux,
                presence_detected: data.distance_cm < presence_threshold_cm,
            },
            battery_percent: data.battery,
            radio: RadioQuality {
                rssi_dbm: rssi,
                snr_db: snr,
            },
        }
    }
}
