//! Codec configuration.

use serde::{Deserialize, Serialize};

/// Default limit on nested arrays/tuples, both when parsing type names and
/// when decoding untrusted buffers.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Tunables shared by the type parser and the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Maximum nesting of arrays/tuples
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, CodecConfig::default());
        assert_eq!(cfg.max_depth, 32);
    }
}
