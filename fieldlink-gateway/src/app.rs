use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use fieldlink_proto::{Message, RadioLink, ReceivedFrame, TimeProvider};

use crate::batch::Batcher;
use crate::configs::Settings;
use crate::dedup::{Admission, DedupTable};
use crate::forward::Forwarder;
use crate::receiver::{self, RxError};
use crate::record::SensorRecord;
use crate::stats::GatewayStats;

/// The gateway process: one struct owning the radio, the dedup table, the
/// open batch and the stats, mutated only by its own control loop.
pub struct Gateway<R, F, C> {
    radio: R,
    forwarder: F,
    clock: C,
    dedup: DedupTable,
    batch: Batcher<SensorRecord>,
    stats: GatewayStats,
    gateway_id: u8,
    presence_threshold_cm: u16,
    poll_interval_ms: u64,
    stats_interval_ms: u64,
}

impl<R, F, C> Gateway<R, F, C>
where
    R: RadioLink,
    F: Forwarder,
    C: TimeProvider,
{
    pub fn new(radio: R, forwarder: F, clock: C, settings: &Settings) -> Self {
        Self {
            radio,
            forwarder,
            clock,
            dedup: DedupTable::new(settings.dedup.capacity, settings.dedup.window_ms),
            batch: Batcher::new(settings.batch.size, settings.batch.timeout_ms),
            stats: GatewayStats::new(),
            gateway_id: settings.gateway.id,
            presence_threshold_cm: settings.gateway.presence_threshold_cm,
            poll_interval_ms: settings.gateway.poll_interval_ms,
            stats_interval_ms: settings.stats.report_interval_ms,
        }
    }

    pub fn stats(&self) -> &GatewayStats {
        &self.stats
    }

    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    pub fn forwarder_mut(&mut self) -> &mut F {
        &mut self.forwarder
    }

    /// Drains every pending frame from the radio. Returns how many frames
    /// were pulled off the air.
    pub async fn poll(&mut self) -> usize {
        let mut processed = 0;
        while let Some(frame) = self.radio.receive() {
            self.process_frame(frame).await;
            processed += 1;
        }
        processed
    }

    /// Frames are strictly sequential: validate, deduplicate, batch, and
    /// possibly forward before the next frame is looked at.
    async fn process_frame(&mut self, frame: ReceivedFrame) {
        self.stats.record_frame();

        debug!(
            "rx {} bytes, RSSI={:.0}dBm, SNR={:.1}dB",
            frame.bytes.len(),
            frame.rssi,
            frame.snr
        );

        let validated = match receiver::validate(&frame.bytes, frame.rssi, frame.snr) {
            Ok(validated) => validated,
            Err(RxError::ChecksumError) => {
                warn!("rx checksum error, frame discarded");
                self.stats.record_checksum_error();
                return;
            }
            Err(RxError::Invalid(error)) => {
                warn!("rx invalid frame: {}", error);
                self.stats.record_invalid();
                return;
            }
        };

        match validated.message {
            Message::SensorData(data) => {
                let now = self.clock.uptime_ms();
                match self.dedup.admit(data.node_id, data.timestamp, now) {
                    Admission::Duplicate => {
                        debug!("rx duplicate from node {}, ignored", data.node_id);
                        self.stats.record_duplicate();
                    }
                    Admission::Fresh => {
                        self.stats.record_valid();
                        info!(
                            "node {}: T={:.1}C, H={:.1}%, D={}cm, L={}lx, B={}%",
                            data.node_id,
                            data.temperature_c(),
                            data.humidity_percent(),
                            data.distance_cm,
                            data.luminosity_lux,
                            data.battery
                        );

                        let record = SensorRecord::new(
                            &data,
                            validated.rssi,
                            validated.snr,
                            self.gateway_id,
                            self.presence_threshold_cm,
                            OffsetDateTime::now_utc(),
                        );
                        if let Some(batch) = self.batch.add(record, now) {
                            self.flush(batch).await;
                        }
                    }
                }
            }
            Message::Heartbeat(heartbeat) => {
                self.stats.record_valid();
                info!(
                    "heartbeat from node {} (status: 0x{:02X})",
                    heartbeat.node_id,
                    heartbeat.status.as_u8()
                );
            }
            Message::Alert(alert) => {
                self.stats.record_valid();
                warn!(
                    "ALERT from node {}: code=0x{:02X}, value={}, severity={}",
                    alert.node_id, alert.code, alert.value, alert.severity
                );
            }
        }
    }

    /// Flushes the open batch if it has aged past the timeout.
    pub async fn check_batch_timeout(&mut self) {
        if let Some(batch) = self.batch.check_timeout(self.clock.uptime_ms()) {
            debug!("batch timeout, flushing {} records", batch.len());
            self.flush(batch).await;
        }
    }

    /// Hands one batch to the forwarder. A failed batch is dropped, not
    /// re-queued: delivery to the backend is at most once.
    async fn flush(&mut self, batch: Vec<SensorRecord>) {
        let started = self.clock.uptime_ms();
        let result = self.forwarder.forward_batch(&batch).await;
        let latency = self.clock.uptime_ms().saturating_sub(started);

        match result {
            Ok(()) => {
                info!("forwarded {} records in {}ms", batch.len(), latency);
                self.stats.record_forwarded(true, Some(latency));
            }
            Err(error) => {
                warn!("forward failed, {} records lost: {}", batch.len(), error);
                let latency = match error {
                    crate::forward::ForwardError::Status(_) => Some(latency),
                    _ => None,
                };
                self.stats.record_forwarded(false, latency);
            }
        }
    }

    /// Logs the stats summary and pushes it to the backend.
    pub async fn report_stats(&mut self) {
        let uptime_seconds = self.clock.uptime_ms() / 1000;
        let report = self.stats.report(self.gateway_id, uptime_seconds);

        info!(
            "stats: rx {}/{} valid ({:.1}% loss), forwarded {}/{}, latency avg {:.0}ms",
            report.lora_stats.rx_valid,
            report.lora_stats.rx_total,
            report.lora_stats.packet_loss_percent,
            report.server_stats.tx_success,
            report.server_stats.tx_total,
            report.latency.avg_ms
        );

        if let Err(error) = self.forwarder.forward_stats(&report).await {
            warn!("stats report failed: {}", error);
        }
    }

    /// Control loop: poll the radio, keep the batch timeout honest, report
    /// stats on a fixed cadence. Never returns under normal operation.
    pub async fn run(&mut self) {
        let mut poll_tick = tokio::time::interval(Duration::from_millis(self.poll_interval_ms));
        let mut stats_tick = tokio::time::interval(Duration::from_millis(self.stats_interval_ms));
        // The first tick of an interval fires immediately; skip the initial
        // stats report so the log does not open with a row of zeros.
        stats_tick.tick().await;

        info!("gateway {} ready", self.gateway_id);

        loop {
            tokio::select! {
                _ = poll_tick.tick() => {
                    self.poll().await;
                    self.check_batch_timeout().await;
                }
                _ = stats_tick.tick() => {
                    self.report_stats().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use async_trait::async_trait;

    use fieldlink_proto::{Heartbeat, NodeStatus, SensorData};

    use crate::forward::ForwardError;
    use crate::stats::StatsReport;

    use super::*;

    struct QueueRadio {
        frames: VecDeque<ReceivedFrame>,
    }

    impl QueueRadio {
        fn with_frames(frames: Vec<Vec<u8>>) -> Self {
            Self {
                frames: frames
                    .into_iter()
                    .map(|bytes| ReceivedFrame {
                        bytes,
                        rssi: -80.0,
                        snr: 8.0,
                    })
                    .collect(),
            }
        }
    }

    impl RadioLink for QueueRadio {
        fn transmit(&mut self, _frame: &[u8]) -> Result<(), fieldlink_proto::RadioError> {
            Ok(())
        }

        fn receive(&mut self) -> Option<ReceivedFrame> {
            self.frames.pop_front()
        }
    }

    #[derive(Default)]
    struct CollectingForwarder {
        batches: Vec<Vec<SensorRecord>>,
        reports: Vec<StatsReport>,
        fail: bool,
    }

    #[async_trait]
    impl Forwarder for CollectingForwarder {
        async fn forward_batch(&mut self, records: &[SensorRecord]) -> Result<(), ForwardError> {
            if self.fail {
                return Err(ForwardError::Timeout);
            }
            self.batches.push(records.to_vec());
            Ok(())
        }

        async fn forward_stats(&mut self, report: &StatsReport) -> Result<(), ForwardError> {
            self.reports.push(report.clone());
            Ok(())
        }
    }

    #[derive(Clone)]
    struct ManualClock(Rc<Cell<u64>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Rc::new(Cell::new(0)))
        }

        fn advance(&self, ms: u64) {
            self.0.set(self.0.get() + ms);
        }
    }

    impl TimeProvider for ManualClock {
        fn uptime_ms(&self) -> u64 {
            self.0.get()
        }
    }

    fn sensor_frame(node_id: u8, timestamp: u32) -> Vec<u8> {
        Message::SensorData(SensorData::from_physical(
            node_id, timestamp, 25.30, 55.00, 150, 100, 500,
        ))
        .encode()
    }

    fn gateway_with_frames(
        frames: Vec<Vec<u8>>,
    ) -> (
        Gateway<QueueRadio, CollectingForwarder, ManualClock>,
        ManualClock,
    ) {
        let clock = ManualClock::new();
        let gateway = Gateway::new(
            QueueRadio::with_frames(frames),
            CollectingForwarder::default(),
            clock.clone(),
            &Settings::default(),
        );
        (gateway, clock)
    }

    #[tokio::test]
    async fn test_five_readings_flush_one_batch_in_order() {
        let frames = (0..5).map(|i| sensor_frame(1, 1000 + i * 30_000)).collect();
        let (mut gateway, _clock) = gateway_with_frames(frames);

        assert_eq!(gateway.poll().await, 5);

        let batches = &gateway.forwarder.batches;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 5);
        for (i, record) in batches[0].iter().enumerate() {
            assert_eq!(record.client_timestamp, 1000 + i as u32 * 30_000);
        }
        assert_eq!(gateway.stats().rx_valid, 5);
        assert_eq!(gateway.stats().forwarded_success, 1);
    }

    #[tokio::test]
    async fn test_duplicates_are_not_batched() {
        let frame = sensor_frame(1, 1000);
        let (mut gateway, _clock) = gateway_with_frames(vec![frame.clone(), frame.clone(), frame]);

        gateway.poll().await;

        assert_eq!(gateway.stats().rx_valid, 1);
        assert_eq!(gateway.stats().rx_duplicates, 2);
        assert_eq!(gateway.batch.len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_flushes_partial_batch() {
        let (mut gateway, clock) = gateway_with_frames(vec![sensor_frame(1, 1000)]);

        gateway.poll().await;
        assert!(gateway.forwarder.batches.is_empty());

        clock.advance(29_999);
        gateway.check_batch_timeout().await;
        assert!(gateway.forwarder.batches.is_empty());

        clock.advance(1);
        gateway.check_batch_timeout().await;
        assert_eq!(gateway.forwarder.batches.len(), 1);
        assert_eq!(gateway.forwarder.batches[0].len(), 1);
    }

    #[tokio::test]
    async fn test_garbage_does_not_stop_the_loop() {
        let mut corrupted = sensor_frame(1, 1000);
        corrupted[6] ^= 0x01;

        let frames = vec![
            vec![],
            vec![0x55, 0x00, 0x00],
            corrupted,
            sensor_frame(1, 2000),
        ];
        let (mut gateway, _clock) = gateway_with_frames(frames);

        assert_eq!(gateway.poll().await, 4);

        assert_eq!(gateway.stats().rx_total, 4);
        assert_eq!(gateway.stats().rx_invalid, 3);
        assert_eq!(gateway.stats().rx_checksum_errors, 1);
        assert_eq!(gateway.stats().rx_valid, 1);
        assert_eq!(gateway.batch.len(), 1);
    }

    #[tokio::test]
    async fn test_heartbeats_and_alerts_counted_but_not_batched() {
        let heartbeat = Message::Heartbeat(Heartbeat {
            node_id: 1,
            timestamp: 1000,
            status: NodeStatus::ok().with_low_battery(),
        })
        .encode();
        let alert = Message::Alert(fieldlink_proto::Alert::new(
            1,
            2000,
            fieldlink_proto::AlertCode::DistanceLow,
            80,
            fieldlink_proto::Severity::High,
        ))
        .encode();

        let (mut gateway, _clock) = gateway_with_frames(vec![heartbeat, alert]);
        gateway.poll().await;

        assert_eq!(gateway.stats().rx_valid, 2);
        assert!(gateway.batch.is_empty());
    }

    #[tokio::test]
    async fn test_failed_forward_drops_batch() {
        let frames = (0..5).map(|i| sensor_frame(1, 1000 + i * 30_000)).collect();
        let (mut gateway, _clock) = gateway_with_frames(frames);
        gateway.forwarder.fail = true;

        gateway.poll().await;

        assert_eq!(gateway.stats().forwarded_failed, 1);
        assert!(gateway.forwarder.batches.is_empty());
        // The failed batch is gone for good; the next batch starts empty.
        assert!(gateway.batch.is_empty());
    }

    #[tokio::test]
    async fn test_stats_report_reaches_forwarder() {
        let (mut gateway, clock) = gateway_with_frames(vec![sensor_frame(1, 1000)]);
        gateway.poll().await;
        clock.advance(90_000);

        gateway.report_stats().await;

        let reports = &gateway.forwarder.reports;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].uptime_seconds, 90);
        assert_eq!(reports[0].lora_stats.rx_valid, 1);
    }
}
