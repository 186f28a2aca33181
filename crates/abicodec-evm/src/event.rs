//! Event log matching and decoding.
//!
//! ## Log layout
//! - `topics[0]` → keccak256 of the canonical event signature (absent for anonymous events)
//! - `topics[1..]` → indexed parameters, one word each, in declaration order
//! - `data` → non-indexed parameters, ABI-encoded as one tuple
//!
//! Indexed `string`, `bytes`, arrays and tuples are stored as the keccak256 of
//! their encoding. The original value cannot be recovered, so they surface as
//! [`LogValue::Hashed`].

use abicodec_core::{
    AbiValue, CodecConfig, CodecError, Keccak256, Signature, SignatureHasher, SignatureKind, B256,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decoder::AbiDecoder;

/// A log as returned by a node: topic words plus the data payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    pub topics: Vec<B256>,
    #[serde(with = "hex_data")]
    pub data: Vec<u8>,
}

impl RawLog {
    pub fn new(topics: Vec<B256>, data: Vec<u8>) -> Self {
        Self { topics, data }
    }

    /// Build from `0x`-prefixed (or bare) hex strings.
    pub fn from_hex<S: AsRef<str>>(topics: &[S], data: &str) -> Result<Self, CodecError> {
        let topics = topics
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let bytes = decode_hex(t.as_ref())?;
                if bytes.len() != 32 {
                    return Err(CodecError::ParseError {
                        position: 0,
                        reason: format!("topic {i} must be 32 bytes, got {}", bytes.len()),
                    });
                }
                Ok(B256::from_slice(&bytes))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            topics,
            data: decode_hex(data)?,
        })
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>, CodecError> {
    let text = text.trim();
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| CodecError::ParseError {
        position: 0,
        reason: format!("invalid hex: {e}"),
    })
}

/// A decoded event parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LogValue {
    Value(AbiValue),
    /// Indexed reference type: only the topic digest is available
    Hashed(B256),
}

impl LogValue {
    pub fn as_value(&self) -> Option<&AbiValue> {
        match self {
            LogValue::Value(v) => Some(v),
            LogValue::Hashed(_) => None,
        }
    }
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Value(v) => write!(f, "{v}"),
            LogValue::Hashed(h) => write!(f, "hash({h})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedParam {
    pub name: String,
    pub indexed: bool,
    pub value: LogValue,
}

/// A fully decoded log, parameters in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedLog {
    /// Event name, e.g. `"Transfer"`
    pub event: String,
    /// Canonical signature, e.g. `"Transfer(address,address,uint256)"`
    pub signature: String,
    pub params: Vec<DecodedParam>,
}

impl DecodedLog {
    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&LogValue> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

/// Matches raw logs against candidate event signatures and decodes them.
///
/// Generic over the topic hash so tests and alternative chains can plug in
/// their own digest.
#[derive(Debug, Clone)]
pub struct EventMatcher<H = Keccak256> {
    hasher: H,
    decoder: AbiDecoder,
}

impl Default for EventMatcher<Keccak256> {
    fn default() -> Self {
        Self::new()
    }
}

impl EventMatcher<Keccak256> {
    pub fn new() -> Self {
        Self::with_hasher(Keccak256)
    }
}

impl<H: SignatureHasher> EventMatcher<H> {
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            hasher,
            decoder: AbiDecoder::new(),
        }
    }

    /// Apply the configured depth limit to data decoding.
    pub fn with_config(mut self, config: &CodecConfig) -> Self {
        self.decoder = AbiDecoder::with_config(config);
        self
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Identify which candidate produced `log` and decode it.
    pub fn match_log<'s>(
        &self,
        candidates: &'s [Signature],
        log: &RawLog,
    ) -> Result<(&'s Signature, DecodedLog), CodecError> {
        self.match_topics(candidates, &log.topics, &log.data)
    }

    /// Like [`match_log`](Self::match_log) over borrowed topic/data slices.
    pub fn match_topics<'s>(
        &self,
        candidates: &'s [Signature],
        topics: &[B256],
        data: &[u8],
    ) -> Result<(&'s Signature, DecodedLog), CodecError> {
        let topic0 = topics.first().ok_or_else(|| CodecError::NoMatchingSignature {
            fingerprint: "<no topics>".into(),
        })?;

        let matching: Vec<&Signature> = candidates
            .iter()
            .filter(|s| s.topic0_with(&self.hasher).as_ref() == Some(topic0))
            .collect();
        tracing::debug!(
            topic0 = %topic0,
            candidates = candidates.len(),
            matching = matching.len(),
            "matching log"
        );

        let signature = match matching.as_slice() {
            [] => {
                return Err(CodecError::NoMatchingSignature {
                    fingerprint: topic0.to_string(),
                })
            }
            [only] => *only,
            _ => select_by_arity(&matching, topics.len(), topic0)?,
        };

        let decoded = self.decode_parts(signature, topics, data)?;
        Ok((signature, decoded))
    }

    /// Decode `log` with a known signature. Anonymous events read their
    /// indexed parameters from `topics[0]` onwards.
    pub fn decode_log(&self, signature: &Signature, log: &RawLog) -> Result<DecodedLog, CodecError> {
        self.decode_parts(signature, &log.topics, &log.data)
    }

    fn decode_parts(
        &self,
        signature: &Signature,
        topics: &[B256],
        data: &[u8],
    ) -> Result<DecodedLog, CodecError> {
        if signature.kind != SignatureKind::Event {
            return Err(CodecError::SchemaError {
                reason: format!("'{}' is not an event", signature.name),
            });
        }

        let indexed_topics = match signature.topic0_with(&self.hasher) {
            Some(expected) => {
                let first = topics.first().ok_or(CodecError::ArityMismatch {
                    expected: 1 + signature.indexed_inputs().count(),
                    got: 0,
                })?;
                if *first != expected {
                    return Err(CodecError::NoMatchingSignature {
                        fingerprint: first.to_string(),
                    });
                }
                &topics[1..]
            }
            None => topics,
        };

        let indexed_count = signature.indexed_inputs().count();
        if indexed_topics.len() != indexed_count {
            let skipped = topics.len() - indexed_topics.len();
            return Err(CodecError::ArityMismatch {
                expected: indexed_count + skipped,
                got: topics.len(),
            });
        }

        let data_types: Vec<_> = signature.data_inputs().map(|p| p.ty.clone()).collect();
        let mut data_values = self.decoder.decode(&data_types, data)?.into_iter();
        let mut topic_iter = indexed_topics.iter();

        let mut params = Vec::with_capacity(signature.inputs.len());
        for (i, input) in signature.inputs.iter().enumerate() {
            let value = if input.indexed {
                let topic = topic_iter.next().ok_or(CodecError::ArityMismatch {
                    expected: indexed_count,
                    got: indexed_topics.len(),
                })?;
                if input.ty.is_elementary() {
                    LogValue::Value(self.decoder.decode_word(&input.ty, &topic.0)?)
                } else {
                    LogValue::Hashed(*topic)
                }
            } else {
                let value = data_values.next().ok_or(CodecError::ArityMismatch {
                    expected: data_types.len(),
                    got: i,
                })?;
                LogValue::Value(value)
            };
            params.push(DecodedParam {
                name: input.label("arg", i),
                indexed: input.indexed,
                value,
            });
        }

        tracing::trace!(event = %signature.name, params = params.len(), "decoded log");
        Ok(DecodedLog {
            event: signature.name.clone(),
            signature: signature.canonical(),
            params,
        })
    }
}

/// Same topic0 on several candidates (e.g. ERC-20 and ERC-721 `Transfer`):
/// keep the ones whose indexed layout fits the observed topic count.
fn select_by_arity<'s>(
    matching: &[&'s Signature],
    topic_count: usize,
    topic0: &B256,
) -> Result<&'s Signature, CodecError> {
    let mut fitting: Vec<&'s Signature> = matching
        .iter()
        .copied()
        .filter(|s| s.indexed_inputs().count() + 1 == topic_count)
        .collect();
    // The same ABI loaded twice is not an ambiguity.
    fitting.dedup();

    match fitting.as_slice() {
        [only] => Ok(*only),
        _ => {
            let pool = if fitting.is_empty() { matching } else { &fitting[..] };
            Err(CodecError::AmbiguousSignature {
                fingerprint: topic0.to_string(),
                candidates: pool.iter().map(|s| describe(s)).collect(),
            })
        }
    }
}

/// Canonical form with `indexed` markers, to tell colliding candidates apart.
fn describe(signature: &Signature) -> String {
    let params: Vec<String> = signature
        .inputs
        .iter()
        .map(|p| {
            if p.indexed {
                format!("{} indexed", p.ty)
            } else {
                p.ty.to_string()
            }
        })
        .collect();
    format!("{}({})", signature.name, params.join(","))
}

/// Match and decode with the default keccak256 matcher.
pub fn match_log<'s>(
    candidates: &'s [Signature],
    topics: &[B256],
    data: &[u8],
) -> Result<(&'s Signature, DecodedLog), CodecError> {
    EventMatcher::new().match_topics(candidates, topics, data)
}

mod hex_data {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}
