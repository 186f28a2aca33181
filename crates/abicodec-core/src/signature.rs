//! Function, event and constructor signatures.

use crate::error::CodecError;
use crate::hasher::{Keccak256, SignatureHasher};
use crate::types::ParamType;
use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// What a signature describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    Function,
    Event,
    Constructor,
}

impl fmt::Display for SignatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignatureKind::Function => "function",
            SignatureKind::Event => "event",
            SignatureKind::Constructor => "constructor",
        };
        write!(f, "{s}")
    }
}

/// One named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// May be empty
    pub name: String,
    pub ty: ParamType,
    /// Events only: stored in a topic instead of the data payload
    #[serde(default)]
    pub indexed: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: false,
        }
    }

    pub fn indexed(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: true,
        }
    }

    /// The parameter name, or `{prefix}{position}` when it is unnamed.
    pub fn label(&self, prefix: &str, position: usize) -> String {
        if self.name.is_empty() {
            format!("{prefix}{position}")
        } else {
            self.name.clone()
        }
    }
}

/// A validated, immutable signature.
///
/// Build with [`Signature::function`], [`Signature::event`] or
/// [`Signature::constructor`]; they reject duplicate parameter names, missing
/// function names and malformed types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub kind: SignatureKind,
    pub inputs: Vec<Param>,
    /// Return values (functions only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Param>,
    /// Anonymous events carry no topic0
    #[serde(default)]
    pub anonymous: bool,
}

impl Signature {
    pub fn function(
        name: impl Into<String>,
        inputs: Vec<Param>,
        outputs: Vec<Param>,
    ) -> Result<Self, CodecError> {
        let sig = Self {
            name: name.into(),
            kind: SignatureKind::Function,
            inputs,
            outputs,
            anonymous: false,
        };
        sig.validate()?;
        Ok(sig)
    }

    pub fn event(
        name: impl Into<String>,
        inputs: Vec<Param>,
        anonymous: bool,
    ) -> Result<Self, CodecError> {
        let sig = Self {
            name: name.into(),
            kind: SignatureKind::Event,
            inputs,
            outputs: Vec::new(),
            anonymous,
        };
        sig.validate()?;
        Ok(sig)
    }

    pub fn constructor(inputs: Vec<Param>) -> Result<Self, CodecError> {
        let sig = Self {
            name: String::new(),
            kind: SignatureKind::Constructor,
            inputs,
            outputs: Vec::new(),
            anonymous: false,
        };
        sig.validate()?;
        Ok(sig)
    }

    /// Check naming, uniqueness, `indexed` placement and every parameter type.
    pub fn validate(&self) -> Result<(), CodecError> {
        match self.kind {
            SignatureKind::Function => {
                if self.name.is_empty() {
                    return Err(CodecError::schema("function name must not be empty"));
                }
            }
            SignatureKind::Constructor => {
                if !self.outputs.is_empty() {
                    return Err(CodecError::schema("constructors have no outputs"));
                }
            }
            SignatureKind::Event => {
                if !self.outputs.is_empty() {
                    return Err(CodecError::schema("events have no outputs"));
                }
            }
        }
        if !self.name.is_empty() && !is_identifier(&self.name) {
            return Err(CodecError::schema(format!(
                "'{}' is not a valid identifier",
                self.name
            )));
        }
        if self.anonymous && self.kind != SignatureKind::Event {
            return Err(CodecError::schema("only events can be anonymous"));
        }

        check_params(&self.inputs, "input")?;
        check_params(&self.outputs, "output")?;

        let indexed = self.inputs.iter().filter(|p| p.indexed).count();
        if indexed > 0 && self.kind != SignatureKind::Event {
            return Err(CodecError::schema(format!(
                "{} '{}' declares indexed parameters",
                self.kind, self.name
            )));
        }
        let limit = if self.anonymous { 4 } else { 3 };
        if indexed > limit {
            return Err(CodecError::schema(format!(
                "event '{}' has {indexed} indexed parameters, at most {limit} allowed",
                self.name
            )));
        }
        Ok(())
    }

    /// `name(type1,type2,...)` with no parameter names: the hashing input.
    pub fn canonical(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(|p| p.ty.canonical_name()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// Input types in declaration order.
    pub fn input_types(&self) -> Vec<ParamType> {
        self.inputs.iter().map(|p| p.ty.clone()).collect()
    }

    /// Output types in declaration order.
    pub fn output_types(&self) -> Vec<ParamType> {
        self.outputs.iter().map(|p| p.ty.clone()).collect()
    }

    /// Indexed inputs (event topics[1..]).
    pub fn indexed_inputs(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|p| p.indexed)
    }

    /// Non-indexed inputs (event data payload).
    pub fn data_inputs(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|p| !p.indexed)
    }

    /// keccak-256 of the canonical form.
    pub fn hash(&self) -> B256 {
        self.hash_with(&Keccak256)
    }

    pub fn hash_with(&self, hasher: &dyn SignatureHasher) -> B256 {
        hasher.digest(self.canonical().as_bytes())
    }

    /// First four bytes of the hash; `None` unless this is a function.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.selector_with(&Keccak256)
    }

    pub fn selector_with(&self, hasher: &dyn SignatureHasher) -> Option<[u8; 4]> {
        if self.kind != SignatureKind::Function {
            return None;
        }
        let hash = self.hash_with(hasher);
        let mut out = [0u8; 4];
        out.copy_from_slice(&hash[..4]);
        Some(out)
    }

    /// The full hash; `None` unless this is a non-anonymous event.
    pub fn topic0(&self) -> Option<B256> {
        self.topic0_with(&Keccak256)
    }

    pub fn topic0_with(&self, hasher: &dyn SignatureHasher) -> Option<B256> {
        if self.kind != SignatureKind::Event || self.anonymous {
            return None;
        }
        Some(self.hash_with(hasher))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.canonical())
    }
}

fn check_params(params: &[Param], what: &str) -> Result<(), CodecError> {
    let mut seen = HashSet::new();
    for param in params {
        if !param.name.is_empty() {
            if !is_identifier(&param.name) {
                return Err(CodecError::schema(format!(
                    "{what} name '{}' is not a valid identifier",
                    param.name
                )));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(CodecError::schema(format!(
                    "duplicate {what} name '{}'",
                    param.name
                )));
            }
        }
        param.ty.validate()?;
    }
    Ok(())
}

/// `[A-Za-z_$][A-Za-z0-9_$]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
