//! Broker configuration and validation.
//!
//! Embedders hand the broker a fully validated [`BrokerConfig`];
//! [`crate::broker::Broker::spawn`] refuses to start on an invalid one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CAPACITY: usize = 1024;
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 100;

/// RFC 8289 reference constants.
pub const DEFAULT_CODEL_TARGET_MS: u64 = 5;
pub const DEFAULT_CODEL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("sweep interval must be at least 1 ms")]
    ZeroInterval,
    #[error("{side} queue: capacity must be at least 1")]
    ZeroCapacity { side: &'static str },
    #[error("{side} queue: timeout must be at least 1 ms")]
    ZeroTimeout { side: &'static str },
    #[error("{side} queue: codel target and interval must be at least 1 ms")]
    ZeroCodelWindow { side: &'static str },
    #[error("{side} queue: timeout ({after_ms} ms) must exceed codel target ({target_ms} ms)")]
    TimeoutNotAboveTarget {
        side: &'static str,
        after_ms: u64,
        target_ms: u64,
    },
}

/// Queue discipline selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AqmSpec {
    /// No drops beyond capacity eviction.
    Naive,
    /// Drop items whose sojourn reached `after_ms`.
    Timeout { after_ms: u64 },
    /// CoDel controller over sojourn time.
    Codel { target_ms: u64, interval_ms: u64 },
    /// CoDel that additionally guarantees the `timeout` drop count.
    CodelTimeout {
        target_ms: u64,
        interval_ms: u64,
        after_ms: u64,
    },
}

impl Default for AqmSpec {
    fn default() -> Self {
        AqmSpec::Naive
    }
}

/// End the queue serves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutMode {
    #[default]
    Fifo,
    Lifo,
}

/// End the queue evicts from when over capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DropMode {
    #[default]
    Head,
    Tail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSpec {
    #[serde(default)]
    pub algorithm: AqmSpec,
    #[serde(default)]
    pub out_mode: OutMode,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub drop_mode: DropMode,
}

impl Default for QueueSpec {
    fn default() -> Self {
        Self {
            algorithm: AqmSpec::Naive,
            out_mode: OutMode::Fifo,
            capacity: DEFAULT_CAPACITY,
            drop_mode: DropMode::Head,
        }
    }
}

impl QueueSpec {
    fn validate(&self, side: &'static str) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity { side });
        }
        match self.algorithm {
            AqmSpec::Naive => Ok(()),
            AqmSpec::Timeout { after_ms } => {
                if after_ms == 0 {
                    return Err(ConfigError::ZeroTimeout { side });
                }
                Ok(())
            }
            AqmSpec::Codel {
                target_ms,
                interval_ms,
            } => {
                if target_ms == 0 || interval_ms == 0 {
                    return Err(ConfigError::ZeroCodelWindow { side });
                }
                Ok(())
            }
            AqmSpec::CodelTimeout {
                target_ms,
                interval_ms,
                after_ms,
            } => {
                if target_ms == 0 || interval_ms == 0 {
                    return Err(ConfigError::ZeroCodelWindow { side });
                }
                if after_ms == 0 {
                    return Err(ConfigError::ZeroTimeout { side });
                }
                if after_ms <= target_ms {
                    return Err(ConfigError::TimeoutNotAboveTarget {
                        side,
                        after_ms,
                        target_ms,
                    });
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default)]
    pub ask: QueueSpec,
    #[serde(default)]
    pub ask_r: QueueSpec,
    /// Period of the AQM sweep that runs even without traffic.
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            ask: QueueSpec::default(),
            ask_r: QueueSpec::default(),
            interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }
}

impl BrokerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        self.ask.validate("ask")?;
        self.ask_r.validate("ask_r")?;
        Ok(())
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_interval() -> u64 {
    DEFAULT_SWEEP_INTERVAL_MS
}
