use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use embedded_hal::delay::DelayNs;
use tokio::time;
use tracing::{debug, info, warn};

use fieldlink_gateway::{ForwardError, Forwarder, Gateway, HttpForwarder, SensorRecord, StatsReport};
use fieldlink_node::{AlertThresholds, Node, NodeConfig};
use fieldlink_proto::SystemTimeProvider;

use crate::channel::SimulatedChannel;
use crate::settings::Settings;
use crate::simulate::FieldSensor;

pub mod channel;
pub mod settings;
pub mod simulate;

/// Blocking delay for the node's retry loop; a retry stalls the whole node,
/// just like it would on the real single-core device.
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }
}

/// Stand-in backend: logs whatever the gateway would have POSTed.
#[derive(Default)]
pub struct LoggingForwarder;

#[async_trait]
impl Forwarder for LoggingForwarder {
    async fn forward_batch(&mut self, records: &[SensorRecord]) -> Result<(), ForwardError> {
        info!("backend <- batch of {} records", records.len());
        for record in records {
            debug!(
                "  {} @{}: {:.1}C, {:.1}%, {}cm",
                record.node_id,
                record.client_timestamp,
                record.sensors.temperature_celsius,
                record.sensors.humidity_percent,
                record.sensors.distance_cm
            );
        }
        Ok(())
    }

    async fn forward_stats(&mut self, report: &StatsReport) -> Result<(), ForwardError> {
        info!(
            "backend <- stats: rx {}/{}, forwarded {}/{}",
            report.lora_stats.rx_valid,
            report.lora_stats.rx_total,
            report.server_stats.tx_success,
            report.server_stats.tx_total
        );
        Ok(())
    }
}

pub async fn run(settings: &Arc<Settings>) {
    let gateway_settings = fieldlink_gateway::Settings::new().unwrap_or_else(|error| {
        info!("no gateway config found ({error}), using defaults");
        fieldlink_gateway::Settings::default()
    });

    if settings.forward.http {
        let forwarder = HttpForwarder::new(&gateway_settings.forwarder)
            .expect("Failed to build HTTP forwarder.");
        drive(settings, &gateway_settings, forwarder).await;
    } else {
        drive(settings, &gateway_settings, LoggingForwarder).await;
    }
}

/// Runs the two simulated devices: the gateway's own control loop in one
/// task, the node's wake/read/transmit/sleep cycle in another. Each device
/// is internally strictly sequential, just like the hardware it stands for.
async fn drive<F>(
    settings: &Arc<Settings>,
    gateway_settings: &fieldlink_gateway::Settings,
    forwarder: F,
) where
    F: Forwarder + Send + 'static,
{
    let node_config = NodeConfig {
        node_id: settings.node.id,
        adaptive_tx: settings.node.adaptive_tx,
        alerts: Some(AlertThresholds::default()),
        ..NodeConfig::default()
    };
    if !node_config.radio.compatible_with(&gateway_settings.radio.to_params()) {
        warn!("node and gateway radio parameters disagree, nothing will arrive");
    }

    let air = SimulatedChannel::new(settings.channel);
    let mut node = Node::new(
        air.node_end(),
        FieldSensor::new(settings.sim),
        SystemTimeProvider::new(),
        StdDelay,
        node_config,
    );
    let mut gateway = Gateway::new(
        air.gateway_end(),
        forwarder,
        SystemTimeProvider::new(),
        gateway_settings,
    );

    tokio::spawn(async move { gateway.run().await });

    let mut node_tick = time::interval(Duration::from_millis(settings.node.cycle_interval_ms));
    let mut node_stats_tick = time::interval(Duration::from_millis(
        gateway_settings.stats.report_interval_ms,
    ));
    node_stats_tick.tick().await;

    info!(
        "simulation up: node {} every {}ms over a lossy channel",
        settings.node.id, settings.node.cycle_interval_ms
    );

    loop {
        tokio::select! {
            _ = node_tick.tick() => {
                let outcome = node.run_cycle();
                debug!("node cycle {}: {:?}", node.cycle_index(), outcome);
            }
            _ = node_stats_tick.tick() => {
                let stats = node.stats();
                info!(
                    "node stats: {} attempted, {} ok, {} failed, {} skipped ({:.0}%)",
                    stats.tx_attempted,
                    stats.tx_succeeded,
                    stats.tx_failed,
                    stats.tx_skipped,
                    stats.success_rate_percent()
                );
            }
        }
    }
}
