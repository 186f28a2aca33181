//! `abicodec signature`: canonical forms, selectors and topics.

use abicodec_core::{Signature, SignatureKind};
use abicodec_registry::MemoryRegistry;
use anyhow::Result;

pub fn run(registry: &MemoryRegistry, as_json: bool) -> Result<()> {
    let all: Vec<&Signature> = registry
        .functions()
        .iter()
        .chain(registry.events())
        .collect();

    if as_json {
        let entries: Vec<_> = all
            .iter()
            .map(|sig| {
                serde_json::json!({
                    "kind": sig.kind,
                    "canonical": sig.canonical(),
                    "selector": sig.selector().map(|s| format!("0x{}", hex::encode(s))),
                    "topic0": sig.topic0().map(|t| t.to_string()),
                    "signature": sig,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for sig in all {
        println!("✓ {sig}");
        match sig.kind {
            SignatureKind::Function => {
                if let Some(selector) = sig.selector() {
                    println!("  Selector:  0x{}", hex::encode(selector));
                }
            }
            SignatureKind::Event => match sig.topic0() {
                Some(topic) => println!("  Topic0:    {topic}"),
                None => println!("  Topic0:    (anonymous)"),
            },
            SignatureKind::Constructor => {}
        }
        for (i, param) in sig.inputs.iter().enumerate() {
            let indexed = if param.indexed { " [indexed]" } else { "" };
            println!("    - {}: {}{}", param.label("arg", i), param.ty, indexed);
        }
        if !sig.outputs.is_empty() {
            println!("  Returns:");
            for (i, param) in sig.outputs.iter().enumerate() {
                println!("    - {}: {}", param.label("out", i), param.ty);
            }
        }
    }
    Ok(())
}
