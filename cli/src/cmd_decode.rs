//! `abicodec decode`, `decode-log` and `decode-call`.

use abicodec_core::{parse_type_name_with_depth, AbiValue, ParamType};
use abicodec_evm::{decode_call_with, decode_output_with, AbiDecoder, EventMatcher, RawLog};
use abicodec_registry::{load_from_description, MemoryRegistry};
use anyhow::{Context, Result};

use crate::config::CliConfig;
use crate::hex_arg;

pub fn run_decode(
    config: &CliConfig,
    types: Option<&str>,
    sig: Option<&str>,
    data: &str,
    as_json: bool,
) -> Result<()> {
    let bytes = hex_arg("data", data)?;
    let decoder = AbiDecoder::with_config(&config.codec);

    let labelled: Vec<(String, AbiValue)> = match (types, sig) {
        (_, Some(text)) => {
            let sig = load_from_description(text)
                .with_context(|| format!("parse signature '{text}'"))?;
            decode_output_with(&decoder, &sig, &bytes)?
        }
        (Some(text), None) => {
            let types = type_list(text, config.codec.max_depth)
                .with_context(|| format!("parse type list '{text}'"))?;
            let values = decoder.decode(&types, &bytes)?;
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (format!("out{i}"), v))
                .collect()
        }
        (None, None) => anyhow::bail!("pass --types or --sig"),
    };

    if as_json {
        let mut map = serde_json::Map::new();
        for (name, value) in &labelled {
            map.insert(name.clone(), serde_json::to_value(value)?);
        }
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    println!("✓ Decoded {} value(s)", labelled.len());
    for (name, value) in &labelled {
        println!("  {name}: {value}");
    }
    Ok(())
}

/// `(a,b)` decodes as the list `a, b`; any other type as a single value.
fn type_list(text: &str, max_depth: usize) -> Result<Vec<ParamType>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(match parse_type_name_with_depth(&compact, max_depth)? {
        ParamType::Tuple(members) => members.into_iter().map(|(_, ty)| ty).collect(),
        single => vec![single],
    })
}

pub fn run_decode_log(
    config: &CliConfig,
    registry: &MemoryRegistry,
    topics: &[String],
    data: &str,
    as_json: bool,
) -> Result<()> {
    let log = RawLog::from_hex(topics, data).context("invalid log")?;
    let matcher = EventMatcher::new().with_config(&config.codec);
    let (sig, decoded) = matcher.match_log(registry.events(), &log)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
        return Ok(());
    }

    println!("✓ Event:     {}", decoded.event);
    println!("  Signature: {}", sig.canonical());
    if let Some(topic) = sig.topic0() {
        println!("  Topic0:    {topic}");
    }
    println!("  Fields:");
    for param in &decoded.params {
        let marker = if param.indexed { " [indexed]" } else { "" };
        println!("    {}{}: {}", param.name, marker, param.value);
    }
    Ok(())
}

pub fn run_decode_call(
    config: &CliConfig,
    registry: &MemoryRegistry,
    calldata: &str,
    as_json: bool,
) -> Result<()> {
    let bytes = hex_arg("calldata", calldata)?;
    let decoder = AbiDecoder::with_config(&config.codec);
    let (sig, call) = decode_call_with(&decoder, registry.functions(), &bytes)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&call)?);
        return Ok(());
    }

    println!("✓ Function:  {}", call.function);
    println!("  Signature: {}", sig.canonical());
    if let Some(selector) = call.selector_hex() {
        println!("  Selector:  {selector}");
    }
    println!("  Inputs:");
    for (name, value) in &call.inputs {
        println!("    {name}: {value}");
    }
    Ok(())
}
