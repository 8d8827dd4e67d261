//! Server configuration.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

/// EduTrack server command line arguments.
#[derive(Debug, Parser)]
#[command(name = "edutrack-server")]
#[command(about = "Student analytics API with live updates")]
pub struct Args {
    /// Address to listen on for HTTP and WebSocket requests.
    #[arg(short, long, env = "EDUTRACK_LISTEN", default_value = "0.0.0.0:8000")]
    pub listen: String,

    /// Interval (ms) between live-update snapshots.
    #[arg(long, env = "EDUTRACK_BROADCAST_PERIOD_MS", default_value_t = 5_000)]
    pub broadcast_period_ms: u64,

    /// Upper bound (ms) on delivering one snapshot to one subscriber.
    #[arg(long, env = "EDUTRACK_SEND_TIMEOUT_MS", default_value_t = 1_000)]
    pub send_timeout_ms: u64,

    /// Snapshots queued per subscriber before sends start waiting.
    #[arg(long, env = "EDUTRACK_SUBSCRIBER_BUFFER", default_value_t = 8)]
    pub subscriber_buffer: usize,
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("broadcast period must be greater than zero")]
    ZeroPeriod,

    #[error("send timeout must be greater than zero")]
    ZeroSendTimeout,

    #[error("subscriber buffer must hold at least one snapshot")]
    ZeroBuffer,
}

/// Live-update broadcaster settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Time between ticks.
    pub period: Duration,
    /// Bound on a single transmission attempt.
    pub send_timeout: Duration,
    /// Per-subscriber queue capacity.
    pub subscriber_buffer: usize,
}

impl BroadcastConfig {
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub fn with_subscriber_buffer(mut self, subscriber_buffer: usize) -> Self {
        self.subscriber_buffer = subscriber_buffer;
        self
    }

    /// Longest a connection may take to flush its queue and send Close after
    /// shutdown: one bounded write per queued snapshot plus the Close frame.
    pub fn drain_timeout(&self) -> Duration {
        let writes = u32::try_from(self.subscriber_buffer)
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        self.send_timeout.saturating_mul(writes)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.send_timeout.is_zero() {
            return Err(ConfigError::ZeroSendTimeout);
        }
        if self.subscriber_buffer == 0 {
            return Err(ConfigError::ZeroBuffer);
        }
        Ok(())
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(5),
            send_timeout: Duration::from_secs(1),
            subscriber_buffer: 8,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub listen_addr: String,
    /// Broadcaster settings.
    pub broadcast: BroadcastConfig,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.broadcast.validate()
    }
}

impl From<&Args> for ServerConfig {
    fn from(args: &Args) -> Self {
        Self {
            listen_addr: args.listen.clone(),
            broadcast: BroadcastConfig {
                period: Duration::from_millis(args.broadcast_period_ms),
                send_timeout: Duration::from_millis(args.send_timeout_ms),
                subscriber_buffer: args.subscriber_buffer,
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            broadcast: BroadcastConfig::default(),
        }
    }
}
