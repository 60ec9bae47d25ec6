use crate::codec::{encode_humidity, encode_temperature};

/// Node health flags carried by heartbeat messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStatus(u8);

impl NodeStatus {
    const LOW_BATTERY: u8 = 0b0000_0001;
    const SENSOR_ERROR: u8 = 0b0000_0010;
    const RADIO_ERROR: u8 = 0b0000_0100;

    /// All systems normal.
    pub fn ok() -> Self {
        Self(0)
    }

    pub fn with_low_battery(mut self) -> Self {
        self.0 |= Self::LOW_BATTERY;
        self
    }

    pub fn with_sensor_error(mut self) -> Self {
        self.0 |= Self::SENSOR_ERROR;
        self
    }

    pub fn with_radio_error(mut self) -> Self {
        self.0 |= Self::RADIO_ERROR;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.0 == 0
    }

    pub fn has_low_battery(&self) -> bool {
        (self.0 & Self::LOW_BATTERY) != 0
    }

    pub fn has_sensor_error(&self) -> bool {
        (self.0 & Self::SENSOR_ERROR) != 0
    }

    pub fn has_radio_error(&self) -> bool {
        (self.0 & Self::RADIO_ERROR) != 0
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn from_u8(value: u8) -> Self {
        Self(value)
    }
}

impl Default for NodeStatus {
    fn default() -> Self {
        Self::ok()
    }
}

/// Alert condition identifiers.
///
/// The high nibble groups the metric (0x1x temperature, 0x2x humidity,
/// 0x3x distance), the low nibble distinguishes high/low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlertCode {
    TemperatureHigh = 0x10,
    TemperatureLow = 0x11,
    HumidityHigh = 0x20,
    HumidityLow = 0x21,
    DistanceLow = 0x30,
    DistanceHigh = 0x31,
}

impl AlertCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x10 => Some(Self::TemperatureHigh),
            0x11 => Some(Self::TemperatureLow),
            0x20 => Some(Self::HumidityHigh),
            0x21 => Some(Self::HumidityLow),
            0x30 => Some(Self::DistanceLow),
            0x31 => Some(Self::DistanceHigh),
            _ => None,
        }
    }
}

/// Alert severity, 1 (low) through 3 (high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Severity {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            _ => None,
        }
    }
}

/// Periodic telemetry reading.
///
/// Temperature and humidity are stored in their wire encoding (value × 100)
/// so that decode(encode(m)) round-trips exactly; use the accessors for
/// physical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorData {
    /// Node identifier (1-255).
    pub node_id: u8,
    /// Milliseconds since node boot.
    pub timestamp: u32,
    /// Temperature × 100 (°C).
    pub temperature: i16,
    /// Relative humidity × 100 (%).
    pub humidity: u16,
    /// Distance in centimeters.
    pub distance_cm: u16,
    /// Battery level (0-100 %).
    pub battery: u8,
    /// Luminosity in lux.
    pub luminosity_lux: u16,
}

impl SensorData {
    /// Builds a reading from physical values, applying the wire scaling.
    pub fn from_physical(
        node_id: u8,
        timestamp: u32,
        temperature_c: f32,
        humidity_percent: f32,
        distance_cm: u16,
        battery: u8,
        luminosity_lux: u16,
    ) -> Self {
        Self {
            node_id,
            timestamp,
            temperature: encode_temperature(temperature_c),
            humidity: encode_humidity(humidity_percent),
            distance_cm,
            battery,
            luminosity_lux,
        }
    }

    pub fn temperature_c(&self) -> f32 {
        self.temperature as f32 / 100.0
    }

    pub fn humidity_percent(&self) -> f32 {
        self.humidity as f32 / 100.0
    }
}

/// Keep-alive with node health flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    pub node_id: u8,
    /// Milliseconds since node boot.
    pub timestamp: u32,
    pub status: NodeStatus,
}

/// Threshold-crossing notification.
///
/// Code and severity are stored as raw wire bytes; a peer may send values
/// this firmware revision does not know, and decode must stay total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub node_id: u8,
    /// Milliseconds since node boot.
    pub timestamp: u32,
    pub code: u8,
    /// The scaled value that triggered the alert.
    pub value: i16,
    pub severity: u8,
}

impl Alert {
    pub fn new(node_id: u8, timestamp: u32, code: AlertCode, value: i16, severity: Severity) -> Self {
        Self {
            node_id,
            timestamp,
            code: code as u8,
            value,
            severity: severity as u8,
        }
    }

    pub fn code(&self) -> Option<AlertCode> {
        AlertCode::from_u8(self.code)
    }

    pub fn severity(&self) -> Option<Severity> {
        Severity::from_u8(self.severity)
    }
}

/// One radio frame's worth of telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    SensorData(SensorData),
    Heartbeat(Heartbeat),
    Alert(Alert),
}

impl Message {
    /// Sending node identifier, regardless of variant.
    pub fn node_id(&self) -> u8 {
        match self {
            Self::SensorData(m) => m.node_id,
            Self::Heartbeat(m) => m.node_id,
            Self::Alert(m) => m.node_id,
        }
    }

    /// Node-local timestamp, regardless of variant.
    pub fn timestamp(&self) -> u32 {
        match self {
            Self::SensorData(m) => m.timestamp,
            Self::Heartbeat(m) => m.timestamp,
            Self::Alert(m) => m.timestamp,
        }
    }
}
