//! # abicodec-registry
//!
//! Schema loading for abicodec.
//!
//! ## Sources
//! 1. **ABI JSON**: standard Solidity compiler output, whole contract or one item
//! 2. **Compact signatures**: `transfer(address,uint256)` and the named
//!    human-readable form with `indexed`, `anonymous` and `returns (...)`
//! 3. **Topic lists**: the console's `;`-separated event signatures
//!
//! Loaded signatures can be kept in a [`MemoryRegistry`] and handed to the
//! EVM matcher as candidates.

pub mod abi_json;
pub mod compact;
pub mod memory;

pub use abi_json::AbiJsonParser;
pub use compact::SignatureParser;
pub use memory::MemoryRegistry;

use abicodec_core::{CodecError, Signature, SignatureKind};

/// Load one signature from either a JSON ABI item (`{...}`) or compact text.
pub fn load_from_description(raw: &str) -> Result<Signature, CodecError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        AbiJsonParser::parse_item(trimmed)
    } else {
        SignatureParser::parse(trimmed)
    }
}

/// Load every signature from a contract ABI JSON array.
pub fn load_abi_json(json: &str) -> Result<Vec<Signature>, CodecError> {
    AbiJsonParser::parse_abi(json)
}

/// Parse a console event topic list, e.g.
/// `"SetEvent(string,string);TransferEvent(address,uint256)"`.
///
/// Entries are events whether or not they carry the `event` keyword; empty
/// entries are ignored.
pub fn parse_topic_list(text: &str) -> Result<Vec<Signature>, CodecError> {
    text.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let sig = SignatureParser::parse_as(entry, SignatureKind::Event)?;
            if sig.kind != SignatureKind::Event {
                return Err(CodecError::SchemaError {
                    reason: format!("'{entry}' in topic list is not an event"),
                });
            }
            Ok(sig)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_auto_detects_format() {
        let json = load_from_description(
            r#" {"type":"function","name":"approve","inputs":[{"name":"s","type":"address"},{"name":"v","type":"uint256"}]}"#,
        )
        .unwrap();
        let text = load_from_description("approve(address,uint256)").unwrap();
        assert_eq!(json.canonical(), text.canonical());
        assert_eq!(hex::encode(text.selector().unwrap()), "095ea7b3");
    }

    #[test]
    fn topic_list() {
        let events =
            parse_topic_list("SetEvent(string,string); TransferEvent(address,uint256);;").unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind == SignatureKind::Event));
        assert_eq!(events[1].canonical(), "TransferEvent(address,uint256)");
        assert!(parse_topic_list("function f(uint8)").is_err());
        assert!(parse_topic_list("").unwrap().is_empty());
    }
}
