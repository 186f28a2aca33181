//! In-memory signature registry.
//!
//! Owns loaded signatures and indexes them by selector, topic0 and name.
//! Lookups take `&self`, so a populated registry can be shared behind an
//! `Arc` across threads.

use abicodec_core::{RegistryError, Signature, SignatureKind, B256};
use std::{collections::HashMap, path::Path};

use crate::abi_json::AbiJsonParser;

#[derive(Debug, Default, Clone)]
pub struct MemoryRegistry {
    /// Events in insertion order (matcher candidates)
    events: Vec<Signature>,
    /// Functions and constructors in insertion order
    functions: Vec<Signature>,
    /// Selector → indices into `functions`
    by_selector: HashMap<[u8; 4], Vec<usize>>,
    /// topic0 → indices into `events`
    by_topic: HashMap<B256, Vec<usize>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signature. An exact duplicate (same kind, names, types and
    /// flags) is rejected; overloads and colliding topics are kept.
    pub fn add(&mut self, signature: Signature) -> Result<(), RegistryError> {
        if self.contains(&signature) {
            return Err(RegistryError::AlreadyExists {
                signature: signature.to_string(),
            });
        }
        tracing::trace!(signature = %signature, "registering");
        match signature.kind {
            SignatureKind::Event => {
                if let Some(topic) = signature.topic0() {
                    self.by_topic.entry(topic).or_default().push(self.events.len());
                }
                self.events.push(signature);
            }
            SignatureKind::Function | SignatureKind::Constructor => {
                if let Some(selector) = signature.selector() {
                    self.by_selector
                        .entry(selector)
                        .or_default()
                        .push(self.functions.len());
                }
                self.functions.push(signature);
            }
        }
        Ok(())
    }

    /// Add every signature from a contract ABI JSON string, or none of them
    /// if any is already registered. Returns the count added.
    pub fn load_abi_json(&mut self, json: &str) -> Result<usize, RegistryError> {
        let signatures = AbiJsonParser::parse_abi(json)?;
        for (i, sig) in signatures.iter().enumerate() {
            if self.contains(sig) || signatures[..i].contains(sig) {
                return Err(RegistryError::AlreadyExists {
                    signature: sig.to_string(),
                });
            }
        }
        let count = signatures.len();
        for sig in signatures {
            self.add(sig)?;
        }
        Ok(count)
    }

    /// Load a contract ABI JSON file. Returns the count added.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        let count = self.load_abi_json(&content)?;
        tracing::debug!(path = %path.display(), signatures = count, "loaded ABI file");
        Ok(count)
    }

    fn contains(&self, signature: &Signature) -> bool {
        let pool = match signature.kind {
            SignatureKind::Event => &self.events,
            _ => &self.functions,
        };
        pool.iter().any(|s| s == signature)
    }

    /// All events, usable as matcher candidates.
    pub fn events(&self) -> &[Signature] {
        &self.events
    }

    /// All functions and constructors.
    pub fn functions(&self) -> &[Signature] {
        &self.functions
    }

    pub fn constructor(&self) -> Option<&Signature> {
        self.functions
            .iter()
            .find(|s| s.kind == SignatureKind::Constructor)
    }

    /// Functions whose selector is `selector` (several only on a collision).
    pub fn by_selector(&self, selector: [u8; 4]) -> Vec<&Signature> {
        self.by_selector
            .get(&selector)
            .map(|idx| idx.iter().map(|&i| &self.functions[i]).collect())
            .unwrap_or_default()
    }

    /// Events whose topic0 is `topic`.
    pub fn by_topic(&self, topic: &B256) -> Vec<&Signature> {
        self.by_topic
            .get(topic)
            .map(|idx| idx.iter().map(|&i| &self.events[i]).collect())
            .unwrap_or_default()
    }

    /// Every function or event called `name` (overloads included).
    pub fn by_name(&self, name: &str) -> Vec<&Signature> {
        self.functions
            .iter()
            .chain(self.events.iter())
            .filter(|s| s.name == name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len() + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::SignatureParser;

    fn registry() -> MemoryRegistry {
        let mut reg = MemoryRegistry::new();
        for text in [
            "function transfer(address to, uint256 amount) returns (bool)",
            "function balanceOf(address owner) view returns (uint256)",
            "event Transfer(address indexed from, address indexed to, uint256 value)",
            "event Transfer(address indexed from, address indexed to, uint256 indexed tokenId)",
            "constructor(string name)",
        ] {
            reg.add(SignatureParser::parse(text).unwrap()).unwrap();
        }
        reg
    }

    #[test]
    fn lookups() {
        let reg = registry();
        assert_eq!(reg.len(), 5);
        assert_eq!(reg.by_selector([0xa9, 0x05, 0x9c, 0xbb])[0].name, "transfer");
        assert!(reg.by_selector([0, 0, 0, 0]).is_empty());
        let topic = reg.events()[0].topic0().unwrap();
        // ERC-20 and ERC-721 Transfer share topic0
        assert_eq!(reg.by_topic(&topic).len(), 2);
        assert_eq!(reg.by_name("Transfer").len(), 2);
        assert!(reg.constructor().is_some());
    }

    #[test]
    fn exact_duplicate_rejected() {
        let mut reg = registry();
        let dup = SignatureParser::parse("function transfer(address to, uint256 amount) returns (bool)")
            .unwrap();
        assert!(matches!(
            reg.add(dup),
            Err(RegistryError::AlreadyExists { .. })
        ));
        // same canonical form, different parameter names: kept
        let renamed = SignatureParser::parse("function transfer(address dst, uint256 wad) returns (bool)")
            .unwrap();
        assert!(reg.add(renamed).is_ok());
    }

    #[test]
    fn failed_load_adds_nothing() {
        let mut reg = registry();
        let before = reg.len();
        let abi = r#"[
            {"type":"function","name":"approve","inputs":[{"name":"s","type":"address"},{"name":"v","type":"uint256"}]},
            {"type":"function","name":"transfer","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
             "outputs":[{"name":"","type":"bool"}]}
        ]"#;
        assert!(matches!(
            reg.load_abi_json(abi),
            Err(RegistryError::AlreadyExists { .. })
        ));
        assert_eq!(reg.len(), before);
        assert!(reg.by_name("approve").is_empty());

        // duplicates within one ABI are caught the same way
        let twice = r#"[{"type":"event","name":"E","inputs":[]},{"type":"event","name":"E","inputs":[]}]"#;
        assert!(MemoryRegistry::new().load_abi_json(twice).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut reg = MemoryRegistry::new();
        assert!(matches!(
            reg.load_file(Path::new("/nonexistent/abi.json")),
            Err(RegistryError::Io(_))
        ));
    }
}
