#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod checksum;
pub mod codec;
pub mod error;
pub mod link;
pub mod message;
pub mod time;

pub use error::{DecodeError, RadioError};
pub use link::{RadioLink, RadioParams, ReceivedFrame};
pub use message::{Alert, AlertCode, Heartbeat, Message, NodeStatus, SensorData, Severity};
#[cfg(feature = "std")]
pub use time::SystemTimeProvider;
pub use time::TimeProvider;
