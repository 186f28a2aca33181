//! ABI encoder: typed values → head/tail byte layout.
//!
//! Static values are written inline in the head region. Dynamic values put a
//! 32-byte offset in the head (relative to the start of that head region) and
//! their contents in a tail appended after all heads, in value order.
//!
//! # Usage
//! ```ignore
//! let call = encode_call(&transfer_sig, &[to.into(), amount.into()])?;
//! let calldata = call.to_bytes(); // selector ++ payload
//! ```

use abicodec_core::{
    hasher::keccak256, AbiValue, CodecError, ParamType, Signature, SignatureKind, B256,
    DEFAULT_MAX_DEPTH, WORD,
};
use serde::{Deserialize, Serialize};

/// An encoded call: optional 4-byte selector plus the argument payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedCall {
    /// Present for function calls, absent for constructor arguments
    pub selector: Option<[u8; 4]>,
    pub payload: Vec<u8>,
}

impl EncodedCall {
    /// `selector ++ payload`, ready for a transaction's data field.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.payload.len());
        if let Some(selector) = self.selector {
            out.extend_from_slice(&selector);
        }
        out.extend_from_slice(&self.payload);
        out
    }

    /// `0x`-prefixed hex of [`to_bytes`](Self::to_bytes).
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    pub fn len(&self) -> usize {
        self.payload.len() + if self.selector.is_some() { 4 } else { 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Encode a function call: selector followed by the encoded inputs.
pub fn encode_call(signature: &Signature, values: &[AbiValue]) -> Result<EncodedCall, CodecError> {
    let selector = signature.selector().ok_or_else(|| CodecError::SchemaError {
        reason: format!(
            "cannot encode a call for {} '{}'",
            signature.kind, signature.name
        ),
    })?;
    let payload = encode_values(&signature.input_types(), values)?;
    tracing::trace!(
        signature = %signature.canonical(),
        bytes = payload.len() + 4,
        "encoded call"
    );
    Ok(EncodedCall {
        selector: Some(selector),
        payload,
    })
}

/// Encode constructor arguments (appended to deployment bytecode, no selector).
pub fn encode_constructor(
    signature: &Signature,
    values: &[AbiValue],
) -> Result<EncodedCall, CodecError> {
    if signature.kind != SignatureKind::Constructor {
        return Err(CodecError::SchemaError {
            reason: format!("'{}' is not a constructor", signature.name),
        });
    }
    let payload = encode_values(&signature.input_types(), values)?;
    Ok(EncodedCall {
        selector: None,
        payload,
    })
}

/// Encode an ordered list of values as one tuple.
pub fn encode_values(types: &[ParamType], values: &[AbiValue]) -> Result<Vec<u8>, CodecError> {
    if types.len() != values.len() {
        return Err(CodecError::ArityMismatch {
            expected: types.len(),
            got: values.len(),
        });
    }
    let pairs: Vec<(&ParamType, &AbiValue)> = types.iter().zip(values).collect();
    encode_sequence(&pairs, 0)
}

/// Encode a value the way it is stored as an indexed event topic.
///
/// Elementary types occupy the topic directly. `bytes`/`string` are hashed
/// over their raw contents; arrays and tuples over their padded in-place
/// encoding (no offsets, no length prefixes).
pub fn encode_topic(ty: &ParamType, value: &AbiValue) -> Result<B256, CodecError> {
    match (ty, value) {
        (ParamType::Bytes, AbiValue::Bytes(b)) => Ok(keccak256(b)),
        (ParamType::String, AbiValue::String(s)) => Ok(keccak256(s.as_bytes())),
        (ty, value) if ty.is_elementary() => {
            let word = encode_value(ty, value, 0)?;
            Ok(B256::from_slice(&word))
        }
        (ty, value) => {
            let mut out = Vec::new();
            encode_in_place(ty, value, &mut out, 0)?;
            Ok(keccak256(out))
        }
    }
}

fn encode_in_place(
    ty: &ParamType,
    value: &AbiValue,
    out: &mut Vec<u8>,
    depth: usize,
) -> Result<(), CodecError> {
    match (ty, value) {
        (ParamType::Bytes, AbiValue::Bytes(b)) => out.extend(pad_right(b)),
        (ParamType::String, AbiValue::String(s)) => out.extend(pad_right(s.as_bytes())),
        (ParamType::Array(elem), AbiValue::Array(items)) => {
            for item in items {
                encode_in_place(elem, item, out, enter(depth)?)?;
            }
        }
        (ParamType::FixedArray { elem, len }, AbiValue::Array(items)) => {
            if items.len() != *len {
                return Err(CodecError::ArityMismatch {
                    expected: *len,
                    got: items.len(),
                });
            }
            for item in items {
                encode_in_place(elem, item, out, enter(depth)?)?;
            }
        }
        (ParamType::Tuple(members), AbiValue::Tuple(items)) => {
            if items.len() != members.len() {
                return Err(CodecError::ArityMismatch {
                    expected: members.len(),
                    got: items.len(),
                });
            }
            for ((_, member), item) in members.iter().zip(items) {
                encode_in_place(member, item, out, enter(depth)?)?;
            }
        }
        (ty, value) => out.extend(encode_value(ty, value, depth)?),
    }
    Ok(())
}

/// Heads first, then tails. Offsets are relative to the start of this sequence.
fn encode_sequence(pairs: &[(&ParamType, &AbiValue)], depth: usize) -> Result<Vec<u8>, CodecError> {
    let head_len: usize = pairs.iter().map(|(ty, _)| ty.head_size()).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (ty, value) in pairs {
        let encoded = encode_value(ty, value, depth)?;
        if ty.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }

    head.extend(tail);
    Ok(head)
}

fn encode_value(ty: &ParamType, value: &AbiValue, depth: usize) -> Result<Vec<u8>, CodecError> {
    match (ty, value) {
        (ParamType::Uint(bits), AbiValue::Uint(v)) => {
            if v.bit_len() > usize::from(*bits) {
                return Err(out_of_range(ty, value));
            }
            Ok(v.to_be_bytes::<32>().to_vec())
        }
        (ParamType::Int(bits), AbiValue::Int(v)) => {
            let raw = v.into_raw();
            // Significant bits excluding the sign: |v| for positives, |v|-1 for negatives.
            let magnitude = if v.is_negative() { !raw } else { raw };
            if magnitude.bit_len() >= usize::from(*bits) {
                return Err(out_of_range(ty, value));
            }
            Ok(raw.to_be_bytes::<32>().to_vec())
        }
        (ParamType::Bool, AbiValue::Bool(b)) => {
            let mut word = [0u8; WORD];
            word[WORD - 1] = u8::from(*b);
            Ok(word.to_vec())
        }
        (ParamType::Address, AbiValue::Address(a)) => {
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(a.as_slice());
            Ok(word.to_vec())
        }
        (ParamType::FixedBytes(n), AbiValue::FixedBytes(b)) => {
            if b.len() != usize::from(*n) {
                return Err(CodecError::TypeMismatch {
                    expected: ty.to_string(),
                    got: format!("{} bytes", b.len()),
                });
            }
            let mut word = [0u8; WORD];
            word[..b.len()].copy_from_slice(b);
            Ok(word.to_vec())
        }
        (ParamType::Bytes, AbiValue::Bytes(b)) => Ok(length_prefixed(b)),
        (ParamType::String, AbiValue::String(s)) => Ok(length_prefixed(s.as_bytes())),
        (ParamType::FixedArray { elem, len }, AbiValue::Array(items)) => {
            if items.len() != *len {
                return Err(CodecError::ArityMismatch {
                    expected: *len,
                    got: items.len(),
                });
            }
            let pairs: Vec<_> = items.iter().map(|item| (elem.as_ref(), item)).collect();
            encode_sequence(&pairs, enter(depth)?)
        }
        (ParamType::Array(elem), AbiValue::Array(items)) => {
            let pairs: Vec<_> = items.iter().map(|item| (elem.as_ref(), item)).collect();
            let mut out = usize_word(items.len()).to_vec();
            out.extend(encode_sequence(&pairs, enter(depth)?)?);
            Ok(out)
        }
        (ParamType::Tuple(members), AbiValue::Tuple(items)) => {
            if items.len() != members.len() {
                return Err(CodecError::ArityMismatch {
                    expected: members.len(),
                    got: items.len(),
                });
            }
            let pairs: Vec<_> = members.iter().map(|(_, t)| t).zip(items).collect();
            encode_sequence(&pairs, enter(depth)?)
        }
        (ty, value) => Err(CodecError::TypeMismatch {
            expected: ty.to_string(),
            got: value.kind().to_string(),
        }),
    }
}

/// One level deeper into an array or tuple.
fn enter(depth: usize) -> Result<usize, CodecError> {
    if depth >= DEFAULT_MAX_DEPTH {
        return Err(CodecError::DepthExceeded {
            limit: DEFAULT_MAX_DEPTH,
        });
    }
    Ok(depth + 1)
}

fn out_of_range(ty: &ParamType, value: &AbiValue) -> CodecError {
    CodecError::TypeMismatch {
        expected: ty.to_string(),
        got: format!("out-of-range value {value}"),
    }
}

/// Length word followed by the contents, right-padded to a word boundary.
fn length_prefixed(bytes: &[u8]) -> Vec<u8> {
    let mut out = usize_word(bytes.len()).to_vec();
    out.extend(pad_right(bytes));
    out
}

pub(crate) fn usize_word(n: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(n as u64).to_be_bytes());
    word
}

fn pad_right(bytes: &[u8]) -> Vec<u8> {
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(padded);
    out.extend_from_slice(bytes);
    out.resize(padded, 0);
    out
}
