//! Fixed-layout binary codec for the radio wire format.
//!
//! Every frame is a little-endian packed layout with a 1-byte discriminant up
//! front and an XOR checksum of all preceding bytes at the end. Field order,
//! widths and the checksum algorithm are the bit-exact contract between node
//! and gateway; nothing here relies on language struct layout.

use alloc::vec::Vec;

use crate::checksum::{verify_frame, xor_checksum};
use crate::error::DecodeError;
use crate::message::{Alert, Heartbeat, Message, NodeStatus, SensorData};

pub const MSG_TYPE_SENSOR_DATA: u8 = 0x01;
pub const MSG_TYPE_HEARTBEAT: u8 = 0x02;
pub const MSG_TYPE_ALERT: u8 = 0x03;

/// Wire size of a sensor data frame.
pub const SENSOR_DATA_LEN: usize = 17;
/// Wire size of a heartbeat frame.
pub const HEARTBEAT_LEN: usize = 8;
/// Wire size of an alert frame.
pub const ALERT_LEN: usize = 12;

/// Smallest conceivable frame: discriminant + checksum.
pub const MIN_FRAME_LEN: usize = 2;

/// Scales a temperature in °C to its wire encoding (× 100, saturating).
pub fn encode_temperature(celsius: f32) -> i16 {
    libm::roundf(celsius * 100.0) as i16
}

/// Recovers a temperature in °C from its wire encoding.
pub fn decode_temperature(scaled: i16) -> f32 {
    scaled as f32 / 100.0
}

/// Scales a relative humidity in % to its wire encoding (× 100, saturating).
pub fn encode_humidity(percent: f32) -> u16 {
    libm::roundf(percent * 100.0) as u16
}

/// Recovers a relative humidity in % from its wire encoding.
pub fn decode_humidity(scaled: u16) -> f32 {
    scaled as f32 / 100.0
}

impl Message {
    /// Wire size of this message's variant.
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::SensorData(_) => SENSOR_DATA_LEN,
            Self::Heartbeat(_) => HEARTBEAT_LEN,
            Self::Alert(_) => ALERT_LEN,
        }
    }

    /// Encodes the message to its fixed-size frame, checksum included.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.encoded_len());

        match self {
            Self::SensorData(m) => {
                frame.push(MSG_TYPE_SENSOR_DATA);
                frame.push(m.node_id);
                frame.extend_from_slice(&m.timestamp.to_le_bytes());
                frame.extend_from_slice(&m.temperature.to_le_bytes());
                frame.extend_from_slice(&m.humidity.to_le_bytes());
                frame.extend_from_slice(&m.distance_cm.to_le_bytes());
                frame.push(m.battery);
                frame.extend_from_slice(&m.luminosity_lux.to_le_bytes());
                frame.push(0); // reserved
            }
            Self::Heartbeat(m) => {
                frame.push(MSG_TYPE_HEARTBEAT);
                frame.push(m.node_id);
                frame.extend_from_slice(&m.timestamp.to_le_bytes());
                frame.push(m.status.as_u8());
            }
            Self::Alert(m) => {
                frame.push(MSG_TYPE_ALERT);
                frame.push(m.node_id);
                frame.extend_from_slice(&m.timestamp.to_le_bytes());
                frame.push(m.code);
                frame.extend_from_slice(&m.value.to_le_bytes());
                frame.push(m.severity);
                frame.push(0); // reserved
            }
        }

        frame.push(xor_checksum(&frame));
        frame
    }

    /// Decodes one frame.
    ///
    /// Fails with `TooShort` below the minimum frame size, `UnknownType` for
    /// an unrecognized discriminant, `LengthMismatch` when the length does
    /// not equal the variant's fixed size, and `ChecksumMismatch` when the
    /// trailing byte disagrees with the frame contents. Never panics on
    /// arbitrary input.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < MIN_FRAME_LEN {
            return Err(DecodeError::TooShort);
        }

        let expected = match data[0] {
            MSG_TYPE_SENSOR_DATA => SENSOR_DATA_LEN,
            MSG_TYPE_HEARTBEAT => HEARTBEAT_LEN,
            MSG_TYPE_ALERT => ALERT_LEN,
            unknown => return Err(DecodeError::UnknownType(unknown)),
        };

        if data.len() != expected {
            return Err(DecodeError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        if !verify_frame(data) {
            return Err(DecodeError::ChecksumMismatch);
        }

        let timestamp = u32::from_le_bytes([data[2], data[3], data[4], data[5]]);

        let message = match data[0] {
            MSG_TYPE_SENSOR_DATA => Self::SensorData(SensorData {
                node_id: data[1],
                timestamp,
                temperature: i16::from_le_bytes([data[6], data[7]]),
                humidity: u16::from_le_bytes([data[8], data[9]]),
                distance_cm: u16::from_le_bytes([data[10], data[11]]),
                battery: data[12],
                luminosity_lux: u16::from_le_bytes([data[13], data[14]]),
            }),
            MSG_TYPE_HEARTBEAT => Self::Heartbeat(Heartbeat {
                node_id: data[1],
                timestamp,
                status: NodeStatus::from_u8(data[6]),
            }),
            MSG_TYPE_ALERT => Self::Alert(Alert {
                node_id: data[1],
                timestamp,
                code: data[6],
                value: i16::from_le_bytes([data[7], data[8]]),
                severity: data[9],
            }),
            _ => unreachable!("discriminant validated above"),
        };

        Ok(message)
    }
}
