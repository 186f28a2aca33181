//! The ABI type system.
//!
//! [`ParamType`] is an owned tree: arrays box their element type and tuples
//! own their members, so every type is acyclic and trivially droppable.
//! [`parse_type_name`] and [`ParamType::canonical_name`] are inverses on every
//! type the parser can produce; the canonical rendering is the hashing input
//! for selectors and topics.

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Size of one ABI word.
pub const WORD: usize = 32;

/// A Solidity ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// Unsigned integer, width in bits (8..=256, multiple of 8)
    Uint(u16),
    /// Signed integer, width in bits (8..=256, multiple of 8)
    Int(u16),
    Bool,
    /// 20-byte account address
    Address,
    /// `bytes1` .. `bytes32`, length in bytes
    FixedBytes(u8),
    /// Variable-length byte array
    Bytes,
    /// UTF-8 string
    String,
    /// `T[N]`
    FixedArray { elem: Box<ParamType>, len: usize },
    /// `T[]`
    Array(Box<ParamType>),
    /// Tuple / struct; member names are informational only
    Tuple(Vec<(String, ParamType)>),
}

impl ParamType {
    /// Whether values of this type are encoded out-of-line (head holds an offset).
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray { elem, .. } => elem.is_dynamic(),
            ParamType::Tuple(members) => members.iter().any(|(_, t)| t.is_dynamic()),
            _ => false,
        }
    }

    /// Value types that fit in a single word and can be stored directly in a topic.
    pub fn is_elementary(&self) -> bool {
        matches!(
            self,
            ParamType::Uint(_)
                | ParamType::Int(_)
                | ParamType::Bool
                | ParamType::Address
                | ParamType::FixedBytes(_)
        )
    }

    /// Bytes this type occupies in the head region of an enclosing tuple.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD;
        }
        match self {
            ParamType::FixedArray { elem, len } => elem.head_size().saturating_mul(*len),
            ParamType::Tuple(members) => members
                .iter()
                .fold(0usize, |acc, (_, t)| acc.saturating_add(t.head_size())),
            _ => WORD,
        }
    }

    /// Nesting depth: 0 for elementary and byte/string types.
    pub fn depth(&self) -> usize {
        match self {
            ParamType::FixedArray { elem, .. } | ParamType::Array(elem) => 1 + elem.depth(),
            ParamType::Tuple(members) => {
                1 + members.iter().map(|(_, t)| t.depth()).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// The canonical name used as hashing input, e.g. `(uint256,address)[]`.
    pub fn canonical_name(&self) -> String {
        self.to_string()
    }

    /// Check the width/length invariants of a hand-built type.
    pub fn validate(&self) -> Result<(), CodecError> {
        let invalid = |reason: String| CodecError::InvalidTypeSyntax {
            input: self.to_string(),
            reason,
        };
        match self {
            ParamType::Uint(bits) | ParamType::Int(bits) => {
                if *bits == 0 || *bits > 256 || bits % 8 != 0 {
                    return Err(invalid(format!("unsupported integer width {bits}")));
                }
            }
            ParamType::FixedBytes(n) => {
                if *n == 0 || *n > 32 {
                    return Err(invalid(format!("unsupported fixed bytes length {n}")));
                }
            }
            ParamType::FixedArray { elem, len } => {
                if *len == 0 {
                    return Err(invalid("fixed array length must be at least 1".into()));
                }
                elem.validate()?;
            }
            ParamType::Array(elem) => elem.validate()?,
            ParamType::Tuple(members) => {
                for (_, ty) in members {
                    ty.validate()?;
                }
            }
            ParamType::Bool | ParamType::Address | ParamType::Bytes | ParamType::String => {}
        }
        if self.depth() > DEFAULT_MAX_DEPTH {
            return Err(CodecError::DepthExceeded {
                limit: DEFAULT_MAX_DEPTH,
            });
        }
        Ok(())
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Address => write!(f, "address"),
            ParamType::FixedBytes(n) => write!(f, "bytes{n}"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::String => write!(f, "string"),
            ParamType::FixedArray { elem, len } => write!(f, "{elem}[{len}]"),
            ParamType::Array(elem) => write!(f, "{elem}[]"),
            ParamType::Tuple(members) => {
                write!(f, "(")?;
                for (i, (_, ty)) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for ParamType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type_name(s)
    }
}

/// Parse a type name such as `uint256`, `bytes32[2]` or `(address,string)[]`.
pub fn parse_type_name(text: &str) -> Result<ParamType, CodecError> {
    parse_type_name_with_depth(text, DEFAULT_MAX_DEPTH)
}

/// [`parse_type_name`] with an explicit nesting limit.
pub fn parse_type_name_with_depth(text: &str, max_depth: usize) -> Result<ParamType, CodecError> {
    let mut parser = TypeParser::new(text, max_depth);
    let ty = parser.parse_type(0)?;
    parser.expect_end()?;
    Ok(ty)
}

/// Apply array suffixes like `[2][]` to an already built type.
///
/// JSON ABI descriptions spell tuple types as `tuple[2][]` with separate
/// `components`; the loader builds the tuple and hands the suffix here.
pub fn parse_array_suffix(base: ParamType, suffix: &str) -> Result<ParamType, CodecError> {
    let depth = base.depth();
    let mut parser = TypeParser::new(suffix, DEFAULT_MAX_DEPTH);
    let ty = parser.parse_array_suffixes(base, depth)?;
    parser.expect_end()?;
    Ok(ty)
}

/// Recursive-descent scanner over a type name.
struct TypeParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    max_depth: usize,
}

impl<'a> TypeParser<'a> {
    fn new(input: &'a str, max_depth: usize) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            max_depth,
        }
    }

    fn error(&self, reason: impl fmt::Display) -> CodecError {
        CodecError::InvalidTypeSyntax {
            input: self.input.to_string(),
            reason: format!("{reason} at position {}", self.pos),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect_end(&self) -> Result<(), CodecError> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing characters"))
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), CodecError> {
        if depth > self.max_depth {
            Err(CodecError::DepthExceeded {
                limit: self.max_depth,
            })
        } else {
            Ok(())
        }
    }

    fn parse_type(&mut self, depth: usize) -> Result<ParamType, CodecError> {
        self.check_depth(depth)?;
        let base = match self.peek() {
            Some(b'(') => self.parse_tuple(depth)?,
            Some(_) => self.parse_elementary()?,
            None => return Err(self.error("expected a type")),
        };
        self.parse_array_suffixes(base, depth)
    }

    fn parse_tuple(&mut self, depth: usize) -> Result<ParamType, CodecError> {
        self.pos += 1; // '('
        let mut members = Vec::new();
        if self.peek() == Some(b')') {
            self.pos += 1;
            return Ok(ParamType::Tuple(members));
        }
        loop {
            let ty = self.parse_type(depth + 1)?;
            members.push((String::new(), ty));
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    return Ok(ParamType::Tuple(members));
                }
                Some(_) => return Err(self.error("expected ',' or ')' in tuple")),
                None => return Err(self.error("unclosed '('")),
            }
        }
    }

    fn parse_elementary(&mut self) -> Result<ParamType, CodecError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let word = &self.input[start..self.pos];
        if word.is_empty() {
            return Err(self.error("expected a type name"));
        }
        elementary(word).map_err(|reason| CodecError::InvalidTypeSyntax {
            input: self.input.to_string(),
            reason,
        })
    }

    fn parse_array_suffixes(
        &mut self,
        mut ty: ParamType,
        depth: usize,
    ) -> Result<ParamType, CodecError> {
        let mut dims = 0;
        while self.peek() == Some(b'[') {
            self.pos += 1;
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
            let digits = &self.input[start..self.pos];
            if self.peek() != Some(b']') {
                return Err(self.error("malformed array brackets"));
            }
            self.pos += 1;

            ty = if digits.is_empty() {
                ParamType::Array(Box::new(ty))
            } else {
                if digits.len() > 1 && digits.starts_with('0') {
                    return Err(self.error("array length has a leading zero"));
                }
                let len: usize = digits
                    .parse()
                    .map_err(|_| self.error("array length out of range"))?;
                if len == 0 {
                    return Err(self.error("fixed array length must be at least 1"));
                }
                ParamType::FixedArray {
                    elem: Box::new(ty),
                    len,
                }
            };
            dims += 1;
            self.check_depth(depth + dims)?;
        }
        Ok(ty)
    }
}

fn elementary(word: &str) -> Result<ParamType, String> {
    match word {
        "address" => return Ok(ParamType::Address),
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "bytes" => return Ok(ParamType::Bytes),
        "uint" => return Ok(ParamType::Uint(256)),
        "int" => return Ok(ParamType::Int(256)),
        _ => {}
    }
    if let Some(rest) = word.strip_prefix("uint") {
        return integer_width(rest).map(ParamType::Uint);
    }
    if let Some(rest) = word.strip_prefix("int") {
        return integer_width(rest).map(ParamType::Int);
    }
    if let Some(rest) = word.strip_prefix("bytes") {
        let n = decimal(rest).ok_or_else(|| format!("unknown type '{word}'"))?;
        if !(1..=32).contains(&n) {
            return Err(format!("unsupported fixed bytes length {n}"));
        }
        return Ok(ParamType::FixedBytes(n as u8));
    }
    Err(format!("unknown type '{word}'"))
}

fn integer_width(digits: &str) -> Result<u16, String> {
    let bits = decimal(digits).ok_or_else(|| format!("invalid integer width '{digits}'"))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(format!("unsupported integer width {bits}"));
    }
    Ok(bits as u16)
}

/// Plain decimal without sign or leading zeros.
fn decimal(digits: &str) -> Option<u32> {
    if digits.is_empty()
        || !digits.bytes().all(|c| c.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(text: &str) {
        let ty = parse_type_name(text).unwrap();
        assert_eq!(ty.canonical_name(), text);
        assert_eq!(parse_type_name(&ty.canonical_name()).unwrap(), ty);
    }

    #[test]
    fn elementary_types() {
        assert_eq!(parse_type_name("uint256").unwrap(), ParamType::Uint(256));
        assert_eq!(parse_type_name("int8").unwrap(), ParamType::Int(8));
        assert_eq!(parse_type_name("bytes32").unwrap(), ParamType::FixedBytes(32));
        assert_eq!(parse_type_name("bytes").unwrap(), ParamType::Bytes);
        assert_eq!(parse_type_name("address").unwrap(), ParamType::Address);
    }

    #[test]
    fn integer_aliases_render_canonically() {
        assert_eq!(parse_type_name("uint").unwrap().canonical_name(), "uint256");
        assert_eq!(parse_type_name("int[]").unwrap().canonical_name(), "int256[]");
    }

    #[test]
    fn canonical_name_roundtrip() {
        for text in [
            "uint8",
            "int256",
            "bool",
            "bytes1",
            "string[]",
            "address[3]",
            "uint256[2][]",
            "(uint256,string)",
            "(address,(bool,bytes)[])[4]",
            "()",
        ] {
            roundtrip(text);
        }
    }

    #[test]
    fn array_suffix_nesting_order() {
        // uint8[2][] is a dynamic array of 2-element arrays
        let ty = parse_type_name("uint8[2][]").unwrap();
        assert_eq!(
            ty,
            ParamType::Array(Box::new(ParamType::FixedArray {
                elem: Box::new(ParamType::Uint(8)),
                len: 2,
            }))
        );
    }

    #[test]
    fn rejects_bad_widths() {
        for text in ["uint7", "int264", "uint0", "bytes0", "bytes33", "uint08"] {
            assert!(
                matches!(parse_type_name(text), Err(CodecError::InvalidTypeSyntax { .. })),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_malformed_brackets() {
        for text in ["uint256[", "uint256[2", "uint256]", "uint256[0]", "uint256[a]", "(uint8", "(uint8,)", "uint256 "] {
            assert!(
                matches!(parse_type_name(text), Err(CodecError::InvalidTypeSyntax { .. })),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_unknown_tokens() {
        let err = parse_type_name("uint256x").unwrap_err();
        assert!(matches!(err, CodecError::InvalidTypeSyntax { .. }));
        assert!(parse_type_name("fixed128x18").is_err());
        assert!(parse_type_name("").is_err());
    }

    #[test]
    fn depth_limit() {
        let deep = format!("uint8{}", "[]".repeat(40));
        assert_eq!(
            parse_type_name(&deep).unwrap_err(),
            CodecError::DepthExceeded { limit: 32 }
        );
        let nested = format!("{}uint8{}", "(".repeat(40), ")".repeat(40));
        assert!(matches!(
            parse_type_name(&nested),
            Err(CodecError::DepthExceeded { .. })
        ));
    }

    #[test]
    fn dynamic_classification() {
        assert!(!parse_type_name("uint256").unwrap().is_dynamic());
        assert!(!parse_type_name("bytes32[4]").unwrap().is_dynamic());
        assert!(!parse_type_name("(uint8,address)").unwrap().is_dynamic());
        assert!(parse_type_name("bytes").unwrap().is_dynamic());
        assert!(parse_type_name("string").unwrap().is_dynamic());
        assert!(parse_type_name("uint8[]").unwrap().is_dynamic());
        assert!(parse_type_name("string[2]").unwrap().is_dynamic());
        assert!(parse_type_name("(uint8,(bool,bytes))").unwrap().is_dynamic());
    }

    #[test]
    fn head_sizes() {
        assert_eq!(parse_type_name("uint8").unwrap().head_size(), 32);
        assert_eq!(parse_type_name("uint8[3]").unwrap().head_size(), 96);
        assert_eq!(parse_type_name("(uint8,bytes32[2])").unwrap().head_size(), 96);
        assert_eq!(parse_type_name("string[3]").unwrap().head_size(), 32);
    }

    #[test]
    fn suffix_on_prebuilt_tuple() {
        let tuple = ParamType::Tuple(vec![
            ("a".into(), ParamType::Uint(256)),
            ("b".into(), ParamType::Address),
        ]);
        let ty = parse_array_suffix(tuple, "[2][]").unwrap();
        assert_eq!(ty.canonical_name(), "(uint256,address)[2][]");
        assert!(parse_array_suffix(ParamType::Bool, "[").is_err());
    }

    #[test]
    fn validate_hand_built() {
        assert!(ParamType::Uint(12).validate().is_err());
        assert!(ParamType::FixedBytes(40).validate().is_err());
        assert!(ParamType::FixedArray {
            elem: Box::new(ParamType::Bool),
            len: 0
        }
        .validate()
        .is_err());
        assert!(ParamType::Array(Box::new(ParamType::Int(64))).validate().is_ok());
    }
}
