//! `abicodec encode`: text arguments → calldata.

use abicodec_core::{parse_parameter_text, AbiValue, CodecError, SignatureKind};
use abicodec_evm::{encode_call, encode_constructor};
use abicodec_registry::load_from_description;
use anyhow::{bail, Context, Result};

pub fn run(sig_text: &str, args: &[String], as_json: bool) -> Result<()> {
    let sig = load_from_description(sig_text)
        .with_context(|| format!("parse signature '{sig_text}'"))?;
    if args.len() != sig.inputs.len() {
        return Err(CodecError::ArityMismatch {
            expected: sig.inputs.len(),
            got: args.len(),
        })
        .with_context(|| format!("{} takes {} arguments", sig.canonical(), sig.inputs.len()));
    }

    let mut values: Vec<AbiValue> = Vec::with_capacity(args.len());
    for (i, (param, text)) in sig.inputs.iter().zip(args).enumerate() {
        let value = parse_parameter_text(text, &param.ty).map_err(|e| {
            show_position(text, &e);
            e
        });
        values.push(value.with_context(|| {
            format!("argument '{}' ({})", param.label("arg", i), param.ty)
        })?);
    }

    let encoded = match sig.kind {
        SignatureKind::Function => encode_call(&sig, &values)?,
        SignatureKind::Constructor => encode_constructor(&sig, &values)?,
        SignatureKind::Event => bail!("'{}' is an event; only calls can be encoded", sig.name),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&encoded)?);
    } else {
        println!("{}", encoded.to_hex());
    }
    Ok(())
}

/// Point at the offending character of a rejected argument.
fn show_position(text: &str, err: &CodecError) {
    if let Some(position) = err.position() {
        eprintln!("  {text}");
        eprintln!("  {}^", " ".repeat(position));
    }
}
