//! config.rs
//! Process-level knobs for the bridge.
//!
//! Created once at the runtime boundary (defaults, or JSON handed over by the
//! Python layer) and passed by reference to the few operations that need it.
//! The raw call surfaces themselves are configuration-free.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_GROWTH_FACTOR, DEFAULT_LEVEL, DEFAULT_MAX_OUTPUT_LEN, DEFAULT_POOL_CAPACITY,
    MAX_LEVEL, MIN_LEVEL,
};
use crate::format::Format;
use crate::types::{BridgeError, Result};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Level used when a caller does not name one.
    pub default_level: i32,

    /// Framing used when a caller does not name one.
    pub default_format: Format,

    /// Upper bound on a single heap-view staging copy. `None` = unlimited.
    pub staging_budget: Option<usize>,

    /// Idle handles kept per compression level by `HandlePool`.
    pub pool_capacity: usize,

    /// First destination guess for growing decompression, as a multiple of
    /// the compressed size.
    pub initial_growth_factor: usize,

    /// Growing decompression gives up past this many output bytes.
    pub max_output_len: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_LEVEL,
            default_format: Format::Gzip,
            staging_budget: None,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            initial_growth_factor: DEFAULT_GROWTH_FACTOR,
            max_output_len: DEFAULT_MAX_OUTPUT_LEN,
        }
    }
}

impl BridgeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BridgeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&self.default_level) {
            return Err(BridgeError::InvalidLevel { level: self.default_level });
        }
        if self.pool_capacity == 0 {
            return Err(BridgeError::Config("pool_capacity must be at least 1".into()));
        }
        if self.initial_growth_factor == 0 {
            return Err(BridgeError::Config("initial_growth_factor must be at least 1".into()));
        }
        if self.max_output_len == 0 {
            return Err(BridgeError::Config("max_output_len must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BridgeConfig::from_json(r#"{"default_level": 9, "default_format": "zlib"}"#)
            .unwrap();
        assert_eq!(config.default_level, 9);
        assert_eq!(config.default_format, Format::Zlib);
        assert_eq!(config.pool_capacity, DEFAULT_POOL_CAPACITY);
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        assert_eq!(
            BridgeConfig::from_json(r#"{"default_level": 13}"#),
            Err(BridgeError::InvalidLevel { level: 13 })
        );
    }

    #[test]
    fn unknown_format_name_is_a_config_error() {
        assert!(matches!(
            BridgeConfig::from_json(r#"{"default_format": "brotli"}"#),
            Err(BridgeError::Config(_))
        ));
    }

    #[test]
    fn json_roundtrip_preserves_fields() {
        let config = BridgeConfig { staging_budget: Some(4096), ..Default::default() };
        let back = BridgeConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
