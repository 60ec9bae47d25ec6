use embedded_hal::delay::DelayNs;

use fieldlink_proto::{Heartbeat, Message, NodeStatus, RadioError, RadioLink, SensorData, TimeProvider};

use crate::config::NodeConfig;
use crate::policy::AdaptivePolicy;
use crate::sensor::{Reading, SensorSource};
use crate::stats::NodeStats;

/// What one node cycle amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Sensor data made it onto the air.
    Sent,
    /// The adaptive policy decided the reading was not worth sending.
    Suppressed,
    /// All transmission tries were exhausted.
    Failed,
    /// The sensor source could not produce a reading.
    SensorError,
}

/// One field sensor node.
///
/// Owns its radio, sensor source, clock and delay explicitly; the control
/// loop calls [`Node::run_cycle`] once per wake-up and sleeps in between
/// (sleeping itself is the platform's business, not ours).
pub struct Node<R, S, C, D> {
    radio: R,
    sensors: S,
    clock: C,
    delay: D,
    config: NodeConfig,
    policy: AdaptivePolicy,
    stats: NodeStats,
    cycle: u32,
    suppressed_since_tx: u32,
    last_battery: Option<u8>,
    sensor_error: bool,
    radio_error: bool,
}

impl<R, S, C, D> Node<R, S, C, D>
where
    R: RadioLink,
    S: SensorSource,
    C: TimeProvider,
    D: DelayNs,
{
    pub fn new(radio: R, sensors: S, clock: C, delay: D, config: NodeConfig) -> Self {
        let policy = AdaptivePolicy::new(
            config.adaptive_tx,
            config.humidity_threshold,
            config.distance_threshold,
            config.forced_cadence,
        );

        Self {
            radio,
            sensors,
            clock,
            delay,
            config,
            policy,
            stats: NodeStats::new(),
            cycle: 0,
            suppressed_since_tx: 0,
            last_battery: None,
            sensor_error: false,
            radio_error: false,
        }
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// 1-based index of the current cycle.
    pub fn cycle_index(&self) -> u32 {
        self.cycle
    }

    /// Health flags as of the last cycle.
    pub fn status(&self) -> NodeStatus {
        let mut status = NodeStatus::ok();
        if let Some(battery) = self.last_battery {
            if battery < self.config.low_battery_percent {
                status = status.with_low_battery();
            }
        }
        if self.sensor_error {
            status = status.with_sensor_error();
        }
        if self.radio_error {
            status = status.with_radio_error();
        }
        status
    }

    /// Runs one read/decide/transmit cycle.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        self.cycle = self.cycle.wrapping_add(1);

        let reading = match self.sensors.read() {
            Ok(reading) => reading,
            Err(_) => {
                log::warn!("node {}: sensor read failed", self.config.node_id);
                self.sensor_error = true;
                // Tell the gateway we are alive but blind.
                let _ = self.send_heartbeat();
                return CycleOutcome::SensorError;
            }
        };
        self.sensor_error = false;
        self.last_battery = Some(reading.battery_percent);

        log::debug!(
            "node {}: H={:.1}%, D={:.0}cm, T={:.1}C, L={}lx, B={}%",
            self.config.node_id,
            reading.humidity_percent,
            reading.distance_cm,
            reading.temperature_c,
            reading.luminosity_lux,
            reading.battery_percent
        );

        if let Some(thresholds) = self.config.alerts {
            let timestamp = self.clock.uptime_ms() as u32;
            for alert in thresholds.evaluate(&reading, self.config.node_id, timestamp) {
                if self.send_with_retry(&Message::Alert(alert)).is_err() {
                    log::warn!("node {}: alert transmission failed", self.config.node_id);
                }
            }
        }

        if !self.policy.should_send(&reading, self.cycle) {
            log::debug!("node {}: suppressed (no change)", self.config.node_id);
            self.stats.record_skipped();
            self.suppressed_since_tx += 1;

            if let Some(cadence) = self.config.heartbeat_cadence {
                if self.suppressed_since_tx >= cadence {
                    let _ = self.send_heartbeat();
                    self.suppressed_since_tx = 0;
                }
            }
            return CycleOutcome::Suppressed;
        }

        let message = Message::SensorData(SensorData::from_physical(
            self.config.node_id,
            self.clock.uptime_ms() as u32,
            reading.temperature_c,
            reading.humidity_percent,
            reading.distance_cm as u16,
            reading.battery_percent,
            reading.luminosity_lux,
        ));

        match self.send_with_retry(&message) {
            Ok(()) => {
                // Suppression must compare against the last sent state, so
                // only a successful transmission advances it.
                self.policy.record_sent(&reading);
                self.suppressed_since_tx = 0;
                CycleOutcome::Sent
            }
            Err(_) => CycleOutcome::Failed,
        }
    }

    /// Sends a heartbeat carrying the current health flags.
    pub fn send_heartbeat(&mut self) -> Result<(), RadioError> {
        let heartbeat = Message::Heartbeat(Heartbeat {
            node_id: self.config.node_id,
            timestamp: self.clock.uptime_ms() as u32,
            status: self.status(),
        });
        self.send_with_retry(&heartbeat)
    }

    /// Encodes once and tries up to `max_attempts` transmissions with a fixed
    /// delay in between. Exhaustion is recorded in stats and reported to the
    /// caller; it is never fatal.
    pub fn send_with_retry(&mut self, message: &Message) -> Result<(), RadioError> {
        let frame = message.encode();
        self.stats.record_attempt();

        for attempt in 1..=self.config.max_attempts {
            match self.radio.transmit(&frame) {
                Ok(()) => {
                    log::debug!("node {}: tx ok", self.config.node_id);
                    self.stats.record_success();
                    self.radio_error = false;
                    return Ok(());
                }
                Err(_) => {
                    log::debug!(
                        "node {}: tx attempt {}/{} failed",
                        self.config.node_id,
                        attempt,
                        self.config.max_attempts
                    );
                    if attempt < self.config.max_attempts {
                        self.delay.delay_ms(self.config.retry_delay_ms);
                    }
                }
            }
        }

        log::warn!("node {}: tx failed after all tries", self.config.node_id);
        self.stats.record_failure();
        self.radio_error = true;
        Err(RadioError::Transmit)
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::VecDeque;
    use alloc::vec::Vec;

    use fieldlink_proto::ReceivedFrame;

    use super::*;

    /// Radio that follows a script of accept/reject answers and records
    /// every frame the node handed over, accepted or not.
    struct ScriptedRadio {
        script: VecDeque<bool>,
        sent: Vec<Vec<u8>>,
        attempts: u32,
    }

    impl ScriptedRadio {
        fn accepting() -> Self {
            Self {
                script: VecDeque::new(),
                sent: Vec::new(),
                attempts: 0,
            }
        }

        fn scripted(script: &[bool]) -> Self {
            Self {
                script: script.iter().copied().collect(),
                sent: Vec::new(),
                attempts: 0,
            }
        }
    }

    impl RadioLink for ScriptedRadio {
        fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
            self.attempts += 1;
            let accepted = self.script.pop_front().unwrap_or(true);
            if accepted {
                self.sent.push(frame.to_vec());
                Ok(())
            } else {
                Err(RadioError::Transmit)
            }
        }

        fn receive(&mut self) -> Option<ReceivedFrame> {
            None
        }
    }

    struct FixedSensor {
        reading: Reading,
        fail: bool,
    }

    impl SensorSource for FixedSensor {
        type Error = ();

        fn read(&mut self) -> Result<Reading, ()> {
            if self.fail { Err(()) } else { Ok(self.reading) }
        }
    }

    struct FixedClock(u64);

    impl TimeProvider for FixedClock {
        fn uptime_ms(&self) -> u64 {
            self.0
        }
    }

    struct NoopDelay;

    impl DelayNs for NoopDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn reading(humidity_percent: f32, distance_cm: f32) -> Reading {
        Reading {
            temperature_c: 25.30,
            humidity_percent,
            distance_cm,
            luminosity_lux: 500,
            battery_percent: 100,
        }
    }

    fn node_with(
        radio: ScriptedRadio,
        sensor_reading: Reading,
        config: NodeConfig,
    ) -> Node<ScriptedRadio, FixedSensor, FixedClock, NoopDelay> {
        Node::new(
            radio,
            FixedSensor {
                reading: sensor_reading,
                fail: false,
            },
            FixedClock(1000),
            NoopDelay,
            config,
        )
    }

    #[test]
    fn test_first_cycle_sends_sensor_data() {
        let mut node = node_with(ScriptedRadio::accepting(), reading(55.0, 150.0), NodeConfig::default());

        assert_eq!(node.run_cycle(), CycleOutcome::Sent);
        assert_eq!(node.stats().tx_succeeded, 1);

        let sent = &node.radio.sent;
        assert_eq!(sent.len(), 1);
        match Message::decode(&sent[0]).unwrap() {
            Message::SensorData(data) => {
                assert_eq!(data.node_id, 1);
                assert_eq!(data.temperature, 2530);
                assert_eq!(data.humidity, 5500);
                assert_eq!(data.distance_cm, 150);
                assert_eq!(data.battery, 100);
                assert_eq!(data.luminosity_lux, 500);
            }
            other => panic!("expected sensor data, got {:?}", other),
        }
    }

    #[test]
    fn test_unchanged_reading_suppressed_after_first_send() {
        let mut node = node_with(ScriptedRadio::accepting(), reading(55.0, 150.0), NodeConfig::default());

        assert_eq!(node.run_cycle(), CycleOutcome::Sent);
        assert_eq!(node.run_cycle(), CycleOutcome::Suppressed);
        assert_eq!(node.run_cycle(), CycleOutcome::Suppressed);
        assert_eq!(node.stats().tx_skipped, 2);
        assert_eq!(node.stats().tx_succeeded, 1);
    }

    #[test]
    fn test_forced_cadence_resends() {
        let mut node = node_with(ScriptedRadio::accepting(), reading(55.0, 150.0), NodeConfig::default());

        let mut outcomes = Vec::new();
        for _ in 0..10 {
            outcomes.push(node.run_cycle());
        }

        assert_eq!(outcomes[0], CycleOutcome::Sent);
        assert!(outcomes[1..9].iter().all(|o| *o == CycleOutcome::Suppressed));
        assert_eq!(outcomes[9], CycleOutcome::Sent);
    }

    #[test]
    fn test_retry_until_accepted() {
        let radio = ScriptedRadio::scripted(&[false, true]);
        let mut node = node_with(radio, reading(55.0, 150.0), NodeConfig::default());

        assert_eq!(node.run_cycle(), CycleOutcome::Sent);
        assert_eq!(node.radio.attempts, 2);
        assert_eq!(node.stats().tx_succeeded, 1);
        assert_eq!(node.stats().tx_failed, 0);
    }

    #[test]
    fn test_retry_exhaustion_is_nonfatal() {
        let radio = ScriptedRadio::scripted(&[false, false, false]);
        let mut node = node_with(radio, reading(55.0, 150.0), NodeConfig::default());

        assert_eq!(node.run_cycle(), CycleOutcome::Failed);
        // Exactly max_attempts tries, no more
        assert_eq!(node.radio.attempts, 3);
        assert_eq!(node.stats().tx_failed, 1);
        assert!(node.status().has_radio_error());

        // The node keeps cycling afterwards
        assert_eq!(node.run_cycle(), CycleOutcome::Sent);
        assert!(!node.status().has_radio_error());
    }

    #[test]
    fn test_failed_send_does_not_advance_sent_state() {
        let radio = ScriptedRadio::scripted(&[false, false, false]);
        let mut node = node_with(radio, reading(55.0, 150.0), NodeConfig::default());

        assert_eq!(node.run_cycle(), CycleOutcome::Failed);
        // The baseline was never established, so the next cycle still sends
        // even though the reading is identical.
        assert_eq!(node.run_cycle(), CycleOutcome::Sent);
    }

    #[test]
    fn test_sensor_failure_sends_heartbeat() {
        let mut node = node_with(ScriptedRadio::accepting(), reading(55.0, 150.0), NodeConfig::default());
        node.sensors.fail = true;

        assert_eq!(node.run_cycle(), CycleOutcome::SensorError);

        let sent = &node.radio.sent;
        assert_eq!(sent.len(), 1);
        match Message::decode(&sent[0]).unwrap() {
            Message::Heartbeat(heartbeat) => {
                assert!(heartbeat.status.has_sensor_error());
            }
            other => panic!("expected heartbeat, got {:?}", other),
        }
    }

    #[test]
    fn test_low_battery_reflected_in_status() {
        let mut low_battery = reading(55.0, 150.0);
        low_battery.battery_percent = 10;
        let mut node = node_with(ScriptedRadio::accepting(), low_battery, NodeConfig::default());

        node.run_cycle();
        assert!(node.status().has_low_battery());
    }

    #[test]
    fn test_heartbeat_during_long_suppression() {
        let config = NodeConfig {
            heartbeat_cadence: Some(3),
            forced_cadence: 0,
            ..NodeConfig::default()
        };
        let mut node = node_with(ScriptedRadio::accepting(), reading(55.0, 150.0), config);

        assert_eq!(node.run_cycle(), CycleOutcome::Sent);
        for _ in 0..3 {
            assert_eq!(node.run_cycle(), CycleOutcome::Suppressed);
        }

        let sent = &node.radio.sent;
        assert_eq!(sent.len(), 2);
        assert!(matches!(
            Message::decode(&sent[1]).unwrap(),
            Message::Heartbeat(_)
        ));
    }

    #[test]
    fn test_alert_emitted_alongside_data() {
        let config = NodeConfig {
            alerts: Some(crate::alerts::AlertThresholds::default()),
            ..NodeConfig::default()
        };
        // 80cm is inside the default 100cm presence threshold
        let mut node = node_with(ScriptedRadio::accepting(), reading(55.0, 80.0), config);

        assert_eq!(node.run_cycle(), CycleOutcome::Sent);

        let sent = &node.radio.sent;
        assert_eq!(sent.len(), 2);
        assert!(matches!(Message::decode(&sent[0]).unwrap(), Message::Alert(_)));
        assert!(matches!(
            Message::decode(&sent[1]).unwrap(),
            Message::SensorData(_)
        ));
    }
}
