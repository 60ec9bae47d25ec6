//! Shared fixtures: an in-memory radio channel wiring a node to the gateway,
//! a scripted sensor, a manual clock and a collecting forwarder.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use embedded_hal::delay::DelayNs;

use fieldlink_gateway::forward::{ForwardError, Forwarder};
use fieldlink_gateway::record::SensorRecord;
use fieldlink_gateway::stats::StatsReport;
use fieldlink_node::{Reading, SensorSource};
use fieldlink_proto::{RadioError, RadioLink, ReceivedFrame, TimeProvider};

/// Frames in flight between the node and the gateway. Perfect delivery;
/// tests inject duplicates by hand when they want a misbehaving channel.
#[derive(Clone, Default)]
pub struct SharedAir {
    frames: Rc<RefCell<VecDeque<Vec<u8>>>>,
}

impl SharedAir {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-queues a copy of the most recently transmitted frame, as a radio
    /// retransmission would.
    pub fn duplicate_last(&self) {
        let mut frames = self.frames.borrow_mut();
        if let Some(last) = frames.back().cloned() {
            frames.push_back(last);
        }
    }
}

/// Node-side end of the channel.
pub struct NodeRadio(pub SharedAir);

impl RadioLink for NodeRadio {
    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        self.0.frames.borrow_mut().push_back(frame.to_vec());
        Ok(())
    }

    fn receive(&mut self) -> Option<ReceivedFrame> {
        None
    }
}

/// Gateway-side end of the channel.
pub struct GatewayRadio(pub SharedAir);

impl RadioLink for GatewayRadio {
    fn transmit(&mut self, _frame: &[u8]) -> Result<(), RadioError> {
        Ok(())
    }

    fn receive(&mut self) -> Option<ReceivedFrame> {
        self.0.frames.borrow_mut().pop_front().map(|bytes| ReceivedFrame {
            bytes,
            rssi: -80.0,
            snr: 8.0,
        })
    }
}

/// Plays back a fixed sequence of readings, repeating the last one forever.
pub struct ScriptedSensor {
    readings: VecDeque<Reading>,
    last: Reading,
}

impl ScriptedSensor {
    pub fn new(readings: Vec<Reading>) -> Self {
        let last = *readings.last().expect("at least one reading");
        Self {
            readings: readings.into_iter().collect(),
            last,
        }
    }
}

impl SensorSource for ScriptedSensor {
    type Error = ();

    fn read(&mut self) -> Result<Reading, ()> {
        if let Some(reading) = self.readings.pop_front() {
            self.last = reading;
        }
        Ok(self.last)
    }
}

#[derive(Clone)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(0)))
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl TimeProvider for ManualClock {
    fn uptime_ms(&self) -> u64 {
        self.0.get()
    }
}

pub struct NoopDelay;

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

#[derive(Default)]
pub struct CollectingForwarder {
    pub batches: Vec<Vec<SensorRecord>>,
    pub reports: Vec<StatsReport>,
}

#[async_trait]
impl Forwarder for CollectingForwarder {
    async fn forward_batch(&mut self, records: &[SensorRecord]) -> Result<(), ForwardError> {
        self.batches.push(records.to_vec());
        Ok(())
    }

    async fn forward_stats(&mut self, report: &StatsReport) -> Result<(), ForwardError> {
        self.reports.push(report.clone());
        Ok(())
    }
}
