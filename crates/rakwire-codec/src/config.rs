//! Codec configuration.

use rakwire_bitstream::StreamConfig;
use serde::{Deserialize, Serialize};

/// Configuration for a [`BitCodec`](crate::BitCodec).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Settings for the streams the codec encodes into.
    pub stream: StreamConfig,

    /// Fail a decode that leaves one or more whole bytes unread. Bits of
    /// padding in the last byte are always allowed.
    pub reject_trailing: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            reject_trailing: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rakwire_bitstream::GrowthPolicy;

    #[test]
    fn test_codec_config_default() {
        let config = CodecConfig::default();
        assert!(config.reject_trailing);
        assert_eq!(config.stream, StreamConfig::default());
    }

    #[test]
    fn test_codec_config_from_nested_json() {
        let json = r#"{
            "reject_trailing": false,
            "stream": { "initial_capacity": 1400, "growth": "exact" }
        }"#;
        let config: CodecConfig = serde_json::from_str(json).unwrap();
        assert!(!config.reject_trailing);
        assert_eq!(config.stream.initial_capacity, 1400);
        assert_eq!(config.stream.growth, GrowthPolicy::Exact);
    }

    #[test]
    fn test_codec_config_empty_json_is_default() {
        let config: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());
    }
}
