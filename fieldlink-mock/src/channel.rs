use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rand::Rng;

use fieldlink_proto::{RadioError, RadioLink, ReceivedFrame};

use crate::settings::ChannelSettings;

/// A lossy, duplicate-prone, occasionally corrupting radio channel between
/// one node and the gateway.
///
/// Impairments are applied on the node side of the channel: a transmit can be
/// rejected outright (the node's retry path), vanish in flight, arrive twice,
/// or arrive with a flipped bit. The gateway side synthesizes RSSI/SNR for
/// every delivered frame.
#[derive(Clone)]
pub struct SimulatedChannel {
    in_flight: Arc<Mutex<VecDeque<Vec<u8>>>>,
    settings: ChannelSettings,
}

impl SimulatedChannel {
    pub fn new(settings: ChannelSettings) -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(VecDeque::new())),
            settings,
        }
    }

    pub fn node_end(&self) -> NodeEnd {
        NodeEnd(self.clone())
    }

    pub fn gateway_end(&self) -> GatewayEnd {
        GatewayEnd(self.clone())
    }

    fn deliver(&self, frame: &[u8]) {
        let mut rng = rand::rng();

        if rng.random::<f32>() < self.settings.loss_rate {
            tracing::trace!("channel: frame lost");
            return;
        }

        let mut delivered = frame.to_vec();
        if !delivered.is_empty() && rng.random::<f32>() < self.settings.corrupt_rate {
            let byte = rng.random_range(0..delivered.len());
            let bit = rng.random_range(0..8);
            delivered[byte] ^= 1 << bit;
            tracing::trace!("channel: frame corrupted");
        }

        let duplicate = rng.random::<f32>() < self.settings.duplicate_rate;
        let mut in_flight = self.in_flight.lock().unwrap();
        in_flight.push_back(delivered.clone());
        if duplicate {
            tracing::trace!("channel: frame duplicated");
            in_flight.push_back(delivered);
        }
    }
}

/// The node's radio: transmits into the channel, never hears anything back.
pub struct NodeEnd(SimulatedChannel);

impl RadioLink for NodeEnd {
    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        if rand::rng().random::<f32>() < self.0.settings.tx_failure_rate {
            return Err(RadioError::Transmit);
        }
        self.0.deliver(frame);
        Ok(())
    }

    fn receive(&mut self) -> Option<ReceivedFrame> {
        None
    }
}

/// The gateway's radio: receive-only.
pub struct GatewayEnd(SimulatedChannel);

impl RadioLink for GatewayEnd {
    fn transmit(&mut self, _frame: &[u8]) -> Result<(), RadioError> {
        Ok(())
    }

    fn receive(&mut self) -> Option<ReceivedFrame> {
        let bytes = self.0.in_flight.lock().unwrap().pop_front()?;
        let mut rng = rand::rng();
        let settings = &self.0.settings;

        Some(ReceivedFrame {
            bytes,
            rssi: rng.random_range(settings.rssi_min..settings.rssi_max),
            snr: rng.random_range(settings.snr_min..settings.snr_max),
        })
    }
}
