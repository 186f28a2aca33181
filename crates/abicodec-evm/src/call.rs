//! Function-call, return-value and constructor decoding.
//!
//! - Calldata = 4-byte selector ++ ABI-encoded inputs tuple
//! - Return data = ABI-encoded outputs tuple, no prefix
//! - Constructor arguments = ABI-encoded inputs tuple appended to the bytecode

use abicodec_core::{AbiValue, CodecError, Param, Signature, SignatureKind};
use serde::{Deserialize, Serialize};

use crate::decoder::AbiDecoder;

/// A decoded function call or constructor invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCall {
    /// Function name, empty for constructors
    pub function: String,
    /// `None` for constructor arguments
    pub selector: Option<[u8; 4]>,
    /// Decoded values in declaration order, unnamed ones labelled `arg{i}`
    pub inputs: Vec<(String, AbiValue)>,
}

impl DecodedCall {
    /// Selector as `0xaabbccdd`.
    pub fn selector_hex(&self) -> Option<String> {
        self.selector.map(|s| format!("0x{}", hex::encode(s)))
    }

    /// Look up a decoded input by name.
    pub fn input(&self, name: &str) -> Option<&AbiValue> {
        self.inputs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Pick the function whose selector prefixes `calldata` and decode its inputs.
pub fn decode_call<'s>(
    candidates: &'s [Signature],
    calldata: &[u8],
) -> Result<(&'s Signature, DecodedCall), CodecError> {
    decode_call_with(&AbiDecoder::new(), candidates, calldata)
}

pub fn decode_call_with<'s>(
    decoder: &AbiDecoder,
    candidates: &'s [Signature],
    calldata: &[u8],
) -> Result<(&'s Signature, DecodedCall), CodecError> {
    let (prefix, args) = split_selector(calldata)?;

    let mut matching: Vec<&'s Signature> = candidates
        .iter()
        .filter(|s| s.selector() == Some(prefix))
        .collect();
    // The same ABI loaded twice is not a collision.
    matching.dedup();
    let function = match matching.as_slice() {
        [] => {
            return Err(CodecError::NoMatchingSignature {
                fingerprint: format!("0x{}", hex::encode(prefix)),
            })
        }
        [only] => *only,
        colliding => {
            return Err(CodecError::AmbiguousSignature {
                fingerprint: format!("0x{}", hex::encode(prefix)),
                candidates: colliding.iter().map(|s| s.canonical()).collect(),
            })
        }
    };
    tracing::debug!(function = %function.canonical(), bytes = args.len(), "decoding call");

    let values = decoder.decode(&function.input_types(), args)?;
    Ok((
        function,
        DecodedCall {
            function: function.name.clone(),
            selector: Some(prefix),
            inputs: label(&function.inputs, "arg", values),
        },
    ))
}

/// Decode a function's return data into labelled values (`out{i}` when unnamed).
pub fn decode_output(
    signature: &Signature,
    data: &[u8],
) -> Result<Vec<(String, AbiValue)>, CodecError> {
    decode_output_with(&AbiDecoder::new(), signature, data)
}

pub fn decode_output_with(
    decoder: &AbiDecoder,
    signature: &Signature,
    data: &[u8],
) -> Result<Vec<(String, AbiValue)>, CodecError> {
    if signature.kind != SignatureKind::Function {
        return Err(CodecError::SchemaError {
            reason: format!("'{}' has no return values", signature.name),
        });
    }
    let values = decoder.decode(&signature.output_types(), data)?;
    Ok(label(&signature.outputs, "out", values))
}

/// Decode constructor arguments (no selector prefix).
pub fn decode_constructor(signature: &Signature, data: &[u8]) -> Result<DecodedCall, CodecError> {
    if signature.kind != SignatureKind::Constructor {
        return Err(CodecError::SchemaError {
            reason: format!("'{}' is not a constructor", signature.name),
        });
    }
    let values = AbiDecoder::new().decode(&signature.input_types(), data)?;
    Ok(DecodedCall {
        function: String::new(),
        selector: None,
        inputs: label(&signature.inputs, "arg", values),
    })
}

fn split_selector(calldata: &[u8]) -> Result<([u8; 4], &[u8]), CodecError> {
    match calldata {
        [a, b, c, d, rest @ ..] => Ok(([*a, *b, *c, *d], rest)),
        _ => Err(CodecError::TruncatedData {
            offset: 0,
            needed: 4,
            available: calldata.len(),
        }),
    }
}

fn label(params: &[Param], prefix: &str, values: Vec<AbiValue>) -> Vec<(String, AbiValue)> {
    params
        .iter()
        .enumerate()
        .zip(values)
        .map(|((i, p), v)| (p.label(prefix, i), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode_call, encode_constructor, encode_values};
    use abicodec_core::{Address, ParamType, U256};

    fn erc20() -> Vec<Signature> {
        vec![
            Signature::function(
                "balanceOf",
                vec![Param::new("owner", ParamType::Address)],
                vec![Param::new("", ParamType::Uint(256))],
            )
            .unwrap(),
            Signature::function(
                "transfer",
                vec![
                    Param::new("to", ParamType::Address),
                    Param::new("", ParamType::Uint(256)),
                ],
                vec![Param::new("", ParamType::Bool)],
            )
            .unwrap(),
        ]
    }

    #[test]
    fn selects_by_selector() {
        let abi = erc20();
        let to = Address::repeat_byte(0x11);
        let calldata = encode_call(&abi[1], &[to.into(), U256::from(5u64).into()])
            .unwrap()
            .to_bytes();
        let (sig, call) = decode_call(&abi, &calldata).unwrap();
        assert_eq!(sig.name, "transfer");
        assert_eq!(call.selector_hex().as_deref(), Some("0xa9059cbb"));
        assert_eq!(call.input("to"), Some(&AbiValue::Address(to)));
        assert_eq!(call.input("arg1"), Some(&AbiValue::Uint(U256::from(5u64))));
    }

    #[test]
    fn short_and_unknown_calldata() {
        let abi = erc20();
        assert_eq!(
            decode_call(&abi, &[0xa9, 0x05]).unwrap_err(),
            CodecError::TruncatedData {
                offset: 0,
                needed: 4,
                available: 2
            }
        );
        assert!(matches!(
            decode_call(&abi, &[0xde, 0xad, 0xbe, 0xef]).unwrap_err(),
            CodecError::NoMatchingSignature { fingerprint } if fingerprint == "0xdeadbeef"
        ));
    }

    #[test]
    fn selector_collision_is_ambiguous() {
        // two well-known functions sharing selector 0x42966c68
        let burn = Signature::function(
            "burn",
            vec![Param::new("amount", ParamType::Uint(256))],
            vec![],
        )
        .unwrap();
        let collide = Signature::function(
            "collate_propagate_storage",
            vec![Param::new("", ParamType::FixedBytes(16))],
            vec![],
        )
        .unwrap();
        assert_eq!(burn.selector(), collide.selector());

        let calldata = encode_call(&burn, &[U256::from(1u64).into()]).unwrap().to_bytes();
        let candidates = vec![burn.clone(), collide];
        match decode_call(&candidates, &calldata).unwrap_err() {
            CodecError::AmbiguousSignature { fingerprint, candidates } => {
                assert_eq!(fingerprint, "0x42966c68");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }

        // an identical duplicate is not a collision
        let twice = [burn.clone(), burn];
        let (sig, _) = decode_call(&twice, &calldata).unwrap();
        assert_eq!(sig.name, "burn");
    }

    #[test]
    fn truncated_arguments() {
        let abi = erc20();
        let err = decode_call(&abi, &[0x70, 0xa0, 0x82, 0x31, 0x00]).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedData { .. }));
    }

    #[test]
    fn output_labels() {
        let abi = erc20();
        let data = encode_values(&[ParamType::Bool], &[AbiValue::Bool(true)]).unwrap();
        let out = decode_output(&abi[1], &data).unwrap();
        assert_eq!(out, vec![("out0".to_string(), AbiValue::Bool(true))]);
    }

    #[test]
    fn constructor_args() {
        let ctor = Signature::constructor(vec![
            Param::new("name", ParamType::String),
            Param::new("decimals", ParamType::Uint(8)),
        ])
        .unwrap();
        let values = vec![AbiValue::from("Token"), AbiValue::Uint(U256::from(18u64))];
        let encoded = encode_constructor(&ctor, &values).unwrap();
        let decoded = decode_constructor(&ctor, &encoded.payload).unwrap();
        assert_eq!(decoded.selector, None);
        assert_eq!(decoded.input("name"), Some(&AbiValue::from("Token")));
        assert!(decode_constructor(&erc20()[0], &encoded.payload).is_err());
    }
}
