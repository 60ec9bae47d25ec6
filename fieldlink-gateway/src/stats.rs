use serde::Serialize;

/// Forward-call latency summary. Min stays unset until the first sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyStats {
    min_ms: Option<u64>,
    max_ms: u64,
    sum_ms: u64,
    count: u32,
    last_ms: u64,
}

impl LatencyStats {
    pub fn record(&mut self, latency_ms: u64) {
        self.last_ms = latency_ms;
        self.sum_ms = self.sum_ms.saturating_add(latency_ms);
        self.count = self.count.saturating_add(1);
        self.min_ms = Some(match self.min_ms {
            Some(min) => min.min(latency_ms),
            None => latency_ms,
        });
        self.max_ms = self.max_ms.max(latency_ms);
    }

    pub fn min_ms(&self) -> Option<u64> {
        self.min_ms
    }

    pub fn max_ms(&self) -> u64 {
        self.max_ms
    }

    pub fn samples(&self) -> u32 {
        self.count
    }

    pub fn last_ms(&self) -> u64 {
        self.last_ms
    }

    /// Average computed on demand; 0 with no samples.
    pub fn avg_ms(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum_ms as f32 / self.count as f32
    }
}

/// Gateway-side rolling counters. Monotonic, saturating, reset only on
/// restart; counters never reject updates.
#[derive(Debug, Clone, Default)]
pub struct GatewayStats {
    pub rx_total: u32,
    pub rx_valid: u32,
    pub rx_invalid: u32,
    pub rx_checksum_errors: u32,
    pub rx_duplicates: u32,
    pub forwarded_total: u32,
    pub forwarded_success: u32,
    pub forwarded_failed: u32,
    latency: LatencyStats,
}

impl GatewayStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame arrived, whatever becomes of it.
    pub fn record_frame(&mut self) {
        self.rx_total = self.rx_total.saturating_add(1);
    }

    pub fn record_valid(&mut self) {
        self.rx_valid = self.rx_valid.saturating_add(1);
    }

    pub fn record_invalid(&mut self) {
        self.rx_invalid = self.rx_invalid.saturating_add(1);
    }

    /// Checksum failures also count as invalid; the dedicated counter tells
    /// channel corruption apart from malformed traffic.
    pub fn record_checksum_error(&mut self) {
        self.rx_checksum_errors = self.rx_checksum_errors.saturating_add(1);
        self.record_invalid();
    }

    pub fn record_duplicate(&mut self) {
        self.rx_duplicates = self.rx_duplicates.saturating_add(1);
    }

    /// Outcome of one forward call. Latency is only meaningful when the
    /// backend actually answered; transport failures pass `None`.
    pub fn record_forwarded(&mut self, success: bool, latency_ms: Option<u64>) {
        self.forwarded_total = self.forwarded_total.saturating_add(1);
        if success {
            self.forwarded_success = self.forwarded_success.saturating_add(1);
        } else {
            self.forwarded_failed = self.forwarded_failed.saturating_add(1);
        }
        if let Some(latency_ms) = latency_ms {
            self.latency.record(latency_ms);
        }
    }

    pub fn latency(&self) -> &LatencyStats {
        &self.latency
    }

    pub fn packet_loss_percent(&self) -> f32 {
        if self.rx_total == 0 {
            return 0.0;
        }
        self.rx_invalid as f32 / self.rx_total as f32 * 100.0
    }

    pub fn forward_success_percent(&self) -> f32 {
        if self.forwarded_total == 0 {
            return 0.0;
        }
        self.forwarded_success as f32 / self.forwarded_total as f32 * 100.0
    }

    /// Snapshot for the periodic report to the backend.
    pub fn report(&self, gateway_id: u8, uptime_seconds: u64) -> StatsReport {
        StatsReport {
            kind: "gateway_stats",
            gateway_id,
            uptime_seconds,
            lora_stats: LoraStatsReport {
                rx_total: self.rx_total,
                rx_valid: self.rx_valid,
                rx_invalid: self.rx_invalid,
                rx_checksum_error: self.rx_checksum_errors,
                rx_duplicate: self.rx_duplicates,
                packet_loss_percent: self.packet_loss_percent(),
            },
            server_stats: ServerStatsReport {
                tx_total: self.forwarded_total,
                tx_success: self.forwarded_success,
                tx_failed: self.forwarded_failed,
                success_rate_percent: self.forward_success_percent(),
            },
            latency: LatencyReport {
                avg_ms: self.latency.avg_ms(),
                min_ms: self.latency.min_ms().unwrap_or(0),
                max_ms: self.latency.max_ms(),
                last_ms: self.latency.last_ms(),
                samples: self.latency.samples(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub gateway_id: u8,
    pub uptime_seconds: u64,
    pub lora_stats: LoraStatsReport,
    pub server_stats: ServerStatsReport,
    pub latency: LatencyReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoraStatsReport {
    pub rx_total: u32,
    pub rx_valid: u32,
    pub rx_invalid: u32,
    pub rx_checksum_error: u32,
    pub rx_duplicate: u32,
    pub packet_loss_percent: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerStatsReport {
    pub tx_total: u32,
    pub tx_success: u32,
    pub tx_failed: u32,
    pub success_rate_percent: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyReport {
    pub avg_ms: f32,
    pub min_ms: u64,
    pub max_ms: u64,
    pub last_ms: u64,
    pub samples: u32,
}
