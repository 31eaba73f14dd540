//! Configuration system for the cache simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! a run. It provides:
//! 1. **Defaults:** Baseline geometry and timing constants.
//! 2. **Structures:** Hierarchical config for general, processor, memory, and cache settings.
//! 3. **Enums:** Memory controller and cache variant types.
//! 4. **Validation:** Geometry checks that mirror the cache's construction preconditions.
//!
//! Configuration is supplied as JSON (every field is optional) or via `Config::default()`.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::ConfigError;

/// Default configuration constants for the simulator.
mod defaults {
    /// Processor physical address width in bits.
    pub const ADDR_BITS: u32 = 32;

    /// Memory line size in bytes.
    ///
    /// Every fill and writeback moves exactly one line.
    pub const LINE_BYTES: usize = 64;

    /// Fixed memory latency in ticks for the simple controller.
    pub const MEM_LATENCY: u64 = 100;

    /// CAS (Column Access Strobe) latency in ticks.
    pub const T_CAS: u64 = 14;

    /// RAS (Row Access Strobe) latency in ticks.
    pub const T_RAS: u64 = 14;

    /// Precharge latency in ticks.
    pub const T_PRE: u64 = 14;

    /// Total cache capacity in bytes (1 KiB).
    pub const CACHE_SIZE: usize = 1 << 10;

    /// Cache associativity.
    pub const CACHE_WAYS: usize = 4;

    /// Number of miss-status-holding registers.
    pub const CACHE_MSHRS: usize = 2;

    /// Seed for the random eviction policy.
    pub const EVICTION_SEED: u64 = 123456789;

    /// Upper bound on simulated ticks before a run is declared hung.
    pub const MAX_TICKS: u64 = 10_000_000;
}

/// Memory controller implementation types.
///
/// Selects how the memory model computes the latency of a line fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum MemoryController {
    /// Every fill takes `memory.latency` ticks.
    #[default]
    Simple,
    /// DRAM controller with row buffer modeling.
    ///
    /// Fills that hit the open row return sooner than fills that miss it, so replies
    /// can arrive out of issue order.
    #[serde(alias = "DRAM")]
    Dram,
}

/// Cache variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CacheKind {
    /// One outstanding miss at a time; the cache is blocked until it completes.
    #[serde(alias = "blocking")]
    Blocking,
    /// Up to `cache.mshrs` outstanding misses.
    #[default]
    #[serde(alias = "non-blocking")]
    NonBlocking,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use csim_core::config::{CacheKind, Config};
///
/// let json = r#"{ "cache": { "kind": "Blocking", "ways": 2 } }"#;
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.cache.kind, CacheKind::Blocking);
/// assert_eq!(config.cache.ways, 2);
/// assert_eq!(config.memory.line_bytes, 64);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Processor parameters
    #[serde(default)]
    pub processor: ProcessorConfig,
    /// Backing memory parameters
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Cache geometry and variant
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks every constraint the cache constructor asserts.
    ///
    /// A configuration that passes can be turned into a cache without panicking.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let addr_bits = self.processor.addr_bits;
        if addr_bits == 0 || addr_bits > 64 {
            return Err(ConfigError::invalid(
                "processor.addr_bits",
                format!("{addr_bits} is outside 1..=64"),
            ));
        }

        let line = self.memory.line_bytes;
        if line == 0 || !line.is_power_of_two() {
            return Err(ConfigError::invalid(
                "memory.line_bytes",
                format!("{line} is not a power of two"),
            ));
        }

        let cache = &self.cache;
        if cache.ways == 0 {
            return Err(ConfigError::invalid("cache.ways", "must be positive"));
        }
        if cache.kind == CacheKind::NonBlocking && cache.mshrs == 0 {
            return Err(ConfigError::invalid("cache.mshrs", "must be positive"));
        }
        if cache.size_bytes == 0 || cache.size_bytes % line != 0 {
            return Err(ConfigError::invalid(
                "cache.size_bytes",
                format!("{} is not a positive multiple of the {line}-byte line", cache.size_bytes),
            ));
        }

        let lines = cache.size_bytes / line;
        if lines % cache.ways != 0 {
            return Err(ConfigError::invalid(
                "cache.ways",
                format!("{} ways do not evenly divide {lines} lines", cache.ways),
            ));
        }
        let sets = lines / cache.ways;
        if !sets.is_power_of_two() {
            return Err(ConfigError::invalid(
                "cache.size_bytes",
                format!("{sets} sets is not a power of two"),
            ));
        }

        let offset_and_index = line.trailing_zeros() + sets.trailing_zeros();
        if offset_and_index > addr_bits {
            return Err(ConfigError::invalid(
                "processor.addr_bits",
                format!("{addr_bits} bits cannot hold {offset_and_index} offset and index bits"),
            ));
        }
        Ok(())
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Check every load against the processor's shadow memory.
    #[serde(default = "GeneralConfig::default_verify")]
    pub verify: bool,

    /// Abort the run after this many ticks.
    #[serde(default = "GeneralConfig::default_max_ticks")]
    pub max_ticks: u64,
}

impl GeneralConfig {
    fn default_verify() -> bool {
        true
    }

    fn default_max_ticks() -> u64 {
        defaults::MAX_TICKS
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verify: Self::default_verify(),
            max_ticks: defaults::MAX_TICKS,
        }
    }
}

/// Processor parameters visible to the cache.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorConfig {
    /// Physical address width in bits; every request address must fit in it.
    #[serde(default = "ProcessorConfig::default_addr_bits")]
    pub addr_bits: u32,
}

impl ProcessorConfig {
    fn default_addr_bits() -> u32 {
        defaults::ADDR_BITS
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            addr_bits: defaults::ADDR_BITS,
        }
    }
}

/// Backing memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Line size in bytes (power of two).
    #[serde(default = "MemoryConfig::default_line_bytes")]
    pub line_bytes: usize,

    /// Latency model for fills
    #[serde(default)]
    pub controller: MemoryController,

    /// Fill latency in ticks (simple controller)
    #[serde(default = "MemoryConfig::default_latency")]
    pub latency: u64,

    /// CAS latency in ticks (DRAM controller)
    #[serde(default = "MemoryConfig::default_t_cas")]
    pub t_cas: u64,

    /// RAS latency in ticks (DRAM controller)
    #[serde(default = "MemoryConfig::default_t_ras")]
    pub t_ras: u64,

    /// Precharge latency in ticks (DRAM controller)
    #[serde(default = "MemoryConfig::default_t_pre")]
    pub t_pre: u64,
}

impl MemoryConfig {
    fn default_line_bytes() -> usize {
        defaults::LINE_BYTES
    }

    fn default_latency() -> u64 {
        defaults::MEM_LATENCY
    }

    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    fn default_t_ras() -> u64 {
        defaults::T_RAS
    }

    fn default_t_pre() -> u64 {
        defaults::T_PRE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            line_bytes: defaults::LINE_BYTES,
            controller: MemoryController::default(),
            latency: defaults::MEM_LATENCY,
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Blocking or non-blocking controller
    #[serde(default)]
    pub kind: CacheKind,

    /// Total cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Associativity (number of ways); 1 gives a direct-mapped cache
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Number of MSHRs (ignored by the blocking variant, which always has one)
    #[serde(default = "CacheConfig::default_mshrs")]
    pub mshrs: usize,

    /// Seed for the random eviction policy
    #[serde(default = "CacheConfig::default_seed")]
    pub seed: u64,
}

impl CacheConfig {
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    fn default_mshrs() -> usize {
        defaults::CACHE_MSHRS
    }

    fn default_seed() -> u64 {
        defaults::EVICTION_SEED
    }

    /// Returns the MSHR capacity the controller will be built with.
    pub const fn mshr_capacity(&self) -> usize {
        match self.kind {
            CacheKind::Blocking => 1,
            CacheKind::NonBlocking => self.mshrs,
        }
    }
}

impl Default for CacheConfig {
    /// 1 KiB, 4-way, non-blocking with two MSHRs.
    fn default() -> Self {
        Self {
            kind: CacheKind::default(),
            size_bytes: defaults::CACHE_SIZE,
            ways: defaults::CACHE_WAYS,
            mshrs: defaults::CACHE_MSHRS,
            seed: defaults::EVICTION_SEED,
        }
    }
}
