#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod alerts;
pub mod config;
pub mod node;
pub mod policy;
pub mod sensor;
pub mod stats;

pub use alerts::AlertThresholds;
pub use config::NodeConfig;
pub use node::{CycleOutcome, Node};
pub use policy::AdaptivePolicy;
pub use sensor::{Reading, SensorSource};
pub use stats::NodeStats;
