//! Standard Solidity ABI JSON.
//!
//! Accepts either a whole contract ABI (`[{...}, {...}]`) or a single item.
//! `tuple` parameters are built from their `components`; array suffixes on
//! tuples (`tuple[2][]`) are applied afterwards. `fallback`, `receive` and
//! `error` items carry no callable signature and are skipped.

use abicodec_core::{
    parse_array_suffix, parse_type_name, CodecError, Param, ParamType, Signature,
};
use serde::Deserialize;

// ─── Raw ABI JSON serde types ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AbiItemRaw {
    /// Solidity omits `type` for functions in some older outputs
    #[serde(rename = "type", default = "default_item_type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParamRaw>,
    #[serde(default)]
    outputs: Vec<AbiParamRaw>,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Debug, Deserialize)]
struct AbiParamRaw {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<AbiParamRaw>,
    #[serde(default)]
    indexed: bool,
}

fn default_item_type() -> String {
    "function".into()
}

// ─── Parser ───────────────────────────────────────────────────────────────────

pub struct AbiJsonParser;

impl AbiJsonParser {
    /// Parse a whole contract ABI. Items without a signature are skipped.
    pub fn parse_abi(json: &str) -> Result<Vec<Signature>, CodecError> {
        let items: Vec<AbiItemRaw> = serde_json::from_str(json).map_err(schema_err)?;
        let mut signatures = Vec::with_capacity(items.len());
        for item in items {
            if let Some(sig) = Self::convert_item(item)? {
                signatures.push(sig);
            }
        }
        tracing::debug!(signatures = signatures.len(), "loaded ABI JSON");
        Ok(signatures)
    }

    /// Parse one ABI item object.
    pub fn parse_item(json: &str) -> Result<Signature, CodecError> {
        let item: AbiItemRaw = serde_json::from_str(json).map_err(schema_err)?;
        let kind = item.kind.clone();
        Self::convert_item(item)?.ok_or_else(|| CodecError::SchemaError {
            reason: format!("'{kind}' items have no signature"),
        })
    }

    fn convert_item(item: AbiItemRaw) -> Result<Option<Signature>, CodecError> {
        let sig = match item.kind.as_str() {
            "function" => Signature::function(
                item.name,
                convert_params(&item.inputs)?,
                convert_params(&item.outputs)?,
            )?,
            "event" => Signature::event(item.name, convert_params(&item.inputs)?, item.anonymous)?,
            "constructor" => Signature::constructor(convert_params(&item.inputs)?)?,
            "fallback" | "receive" | "error" => {
                tracing::debug!(kind = %item.kind, name = %item.name, "skipping ABI item");
                return Ok(None);
            }
            other => {
                return Err(CodecError::SchemaError {
                    reason: format!("unknown ABI item type '{other}'"),
                })
            }
        };
        Ok(Some(sig))
    }
}

fn convert_params(raw: &[AbiParamRaw]) -> Result<Vec<Param>, CodecError> {
    raw.iter()
        .map(|p| {
            Ok(Param {
                name: p.name.clone(),
                ty: convert_type(p)?,
                indexed: p.indexed,
            })
        })
        .collect()
}

fn convert_type(raw: &AbiParamRaw) -> Result<ParamType, CodecError> {
    match raw.ty.strip_prefix("tuple") {
        Some(suffix) => {
            let members = raw
                .components
                .iter()
                .map(|c| Ok((c.name.clone(), convert_type(c)?)))
                .collect::<Result<Vec<_>, CodecError>>()?;
            parse_array_suffix(ParamType::Tuple(members), suffix)
        }
        None if !raw.components.is_empty() => Err(CodecError::SchemaError {
            reason: format!("'{}' has components but is not a tuple", raw.ty),
        }),
        None => parse_type_name(&raw.ty),
    }
}

fn schema_err(e: serde_json::Error) -> CodecError {
    CodecError::SchemaError {
        reason: format!("invalid ABI JSON: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abicodec_core::SignatureKind;

    #[test]
    fn parse_function_item() {
        let sig = AbiJsonParser::parse_item(
            r#"{"type":"function","name":"transfer","stateMutability":"nonpayable",
                "inputs":[{"name":"to","type":"address","internalType":"address"},
                          {"name":"amount","type":"uint256"}],
                "outputs":[{"name":"","type":"bool"}]}"#,
        )
        .unwrap();
        assert_eq!(sig.kind, SignatureKind::Function);
        assert_eq!(sig.canonical(), "transfer(address,uint256)");
        assert_eq!(sig.outputs.len(), 1);
    }

    #[test]
    fn tuple_components_and_suffix() {
        let sig = AbiJsonParser::parse_item(
            r#"{"type":"function","name":"submit","inputs":[
                {"name":"orders","type":"tuple[]","components":[
                    {"name":"maker","type":"address"},
                    {"name":"legs","type":"tuple[2]","components":[
                        {"name":"amount","type":"uint128"},{"name":"memo","type":"string"}]}]}]}"#,
        )
        .unwrap();
        assert_eq!(sig.canonical(), "submit((address,(uint128,string)[2])[])");
        match &sig.inputs[0].ty {
            ParamType::Array(inner) => match inner.as_ref() {
                ParamType::Tuple(members) => assert_eq!(members[0].0, "maker"),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn event_indexed_and_anonymous() {
        let sig = AbiJsonParser::parse_item(
            r#"{"type":"event","name":"Ping","anonymous":true,
                "inputs":[{"name":"who","type":"address","indexed":true}]}"#,
        )
        .unwrap();
        assert!(sig.anonymous);
        assert!(sig.inputs[0].indexed);
        assert_eq!(sig.topic0(), None);
    }

    #[test]
    fn skipped_items() {
        let sigs = AbiJsonParser::parse_abi(
            r#"[{"type":"fallback"},{"type":"receive","stateMutability":"payable"},
                {"type":"error","name":"Nope","inputs":[]},
                {"type":"constructor","inputs":[{"name":"x","type":"uint8"}]}]"#,
        )
        .unwrap();
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].kind, SignatureKind::Constructor);
        assert!(AbiJsonParser::parse_item(r#"{"type":"fallback"}"#).is_err());
    }

    #[test]
    fn errors() {
        assert!(matches!(
            AbiJsonParser::parse_item("{not json"),
            Err(CodecError::SchemaError { .. })
        ));
        assert!(matches!(
            AbiJsonParser::parse_item(r#"{"type":"function","name":"f","inputs":[{"type":"uint7"}]}"#),
            Err(CodecError::InvalidTypeSyntax { .. })
        ));
        assert!(matches!(
            AbiJsonParser::parse_item(
                r#"{"type":"function","name":"f","inputs":[{"name":"a","type":"bool"},{"name":"a","type":"bool"}]}"#
            ),
            Err(CodecError::SchemaError { .. })
        ));
        assert!(matches!(
            AbiJsonParser::parse_item(r#"{"type":"function","name":"","inputs":[]}"#),
            Err(CodecError::SchemaError { .. })
        ));
        assert!(matches!(
            AbiJsonParser::parse_item(r#"{"type":"modifier","name":"m"}"#),
            Err(CodecError::SchemaError { .. })
        ));
    }
}
