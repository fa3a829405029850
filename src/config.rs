//! Configuration Module
//!
//! This module defines all configuration structures for the node.
//! Configuration is loaded from TOML files and parsed using serde.

use ethers::types::Address;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
///
/// Contains all configuration sections for the node.
/// Loaded from a TOML file (e.g., config/default.toml).
///
/// # Example TOML
/// ```toml
/// [node]
/// dev_mode = false
/// l2_mode = true
///
/// [l2]
/// chain_id = 42069
/// l1_chain_id = 1
///
/// [batch]
/// max_batch_size = 100
/// timeout_interval_ms = 5000
/// channel_capacity = 100
/// flush_on_stop = false
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub l2: L2Config,
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Process-level flags
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub dev_mode: bool,
    pub l2_mode: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            l2_mode: true,
        }
    }
}

/// L2 chain parameters
///
/// # Fields
/// - `chain_id`: L2 chain identifier used by the execution engine
/// - `l1_chain_id`: chain the bridge settles against
/// - `bridge_address`: L1 bridge contract
/// - `sequencer_address`: account that signs batches
/// - `enable_zk`: attach placeholder proofs to executed batches
/// - `enable_confidential`: accept private transactions (not wired yet)
/// - `deposit_poll_interval_ms`: how often the bridge is polled for deposits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct L2Config {
    pub chain_id: u64,
    pub l1_chain_id: u64,
    pub bridge_address: Address,
    pub sequencer_address: Address,
    pub enable_zk: bool,
    pub enable_confidential: bool,
    pub deposit_poll_interval_ms: u64,
}

impl Default for L2Config {
    fn default() -> Self {
        Self {
            chain_id: 42069,
            l1_chain_id: 1,
            bridge_address: Address::zero(),
            sequencer_address: Address::zero(),
            enable_zk: false,
            enable_confidential: false,
            deposit_poll_interval_ms: 12_000,
        }
    }
}

/// Batch creation configuration
///
/// Controls when batches are sealed and how they are handed off.
///
/// # Fields
/// - `max_batch_size`: Pending transaction count that seals a batch immediately
/// - `timeout_interval_ms`: Timer period; a non-empty buffer is sealed on every tick
/// - `channel_capacity`: Sealed batches that may wait for a consumer before new ones are dropped
/// - `flush_on_stop`: Seal whatever is pending when the batcher stops instead of dropping it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub max_batch_size: usize,
    pub timeout_interval_ms: u64,
    pub channel_capacity: usize,
    pub flush_on_stop: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 100,
            timeout_interval_ms: 5_000,
            channel_capacity: 100,
            flush_on_stop: false,
        }
    }
}

impl BatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_interval_ms)
    }

    /// Reject values the batcher cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.timeout_interval_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ZeroChannelCapacity);
        }
        Ok(())
    }
}

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("batch.max_batch_size must be greater than zero")]
    ZeroBatchSize,
    #[error("batch.timeout_interval_ms must be greater than zero")]
    ZeroTimeout,
    #[error("batch.channel_capacity must be greater than zero")]
    ZeroChannelCapacity,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded, parsed and validated
    /// * `Err` if the file couldn't be read, the TOML is invalid or a value is out of range
    ///
    /// # Example
    /// ```no_run
    /// let config = kaizen::Config::load("config/default.toml")?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.batch.validate()?;
        Ok(config)
    }

    /// Ephemeral developer configuration: small batches, short timeout
    pub fn dev() -> Self {
        Self {
            node: NodeConfig {
                dev_mode: true,
                l2_mode: true,
            },
            l2: L2Config {
                deposit_poll_interval_ms: 1_000,
                ..L2Config::default()
            },
            batch: BatchConfig {
                max_batch_size: 10,
                timeout_interval_ms: 1_000,
                ..BatchConfig::default()
            },
        }
    }
}
