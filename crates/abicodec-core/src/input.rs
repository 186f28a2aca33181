//! Parameter text parsing.
//!
//! Turns what a user typed into a form field into an [`AbiValue`] for a
//! declared [`ParamType`]. Array input looks like `[100,101]` or
//! `["aaa\"bbb","ccc"]`: comma separated, non-numeric elements in double
//! quotes, `\"` for an embedded quote and `\\` for a backslash.
//!
//! Every failure carries the character offset of the offending input so the
//! form can highlight it.

use crate::error::CodecError;
use crate::types::ParamType;
use crate::value::AbiValue;
use alloy_primitives::{Address, I256, U256};

/// Parse user-supplied text for one parameter of type `ty`.
pub fn parse_parameter_text(text: &str, ty: &ParamType) -> Result<AbiValue, CodecError> {
    ty.validate()?;
    match ty {
        ParamType::Array(elem) => {
            let items = parse_array(text, elem)?;
            Ok(AbiValue::Array(items))
        }
        ParamType::FixedArray { elem, len } => {
            let items = parse_array(text, elem)?;
            if items.len() != *len {
                return Err(CodecError::ArityMismatch {
                    expected: *len,
                    got: items.len(),
                });
            }
            Ok(AbiValue::Array(items))
        }
        ParamType::Tuple(_) => Err(CodecError::parse(
            0,
            "tuple parameters cannot be entered as text",
        )),
        ParamType::String => Ok(AbiValue::String(text.trim().to_string())),
        scalar => parse_scalar(text, scalar, 0),
    }
}

/// Parse an address with or without the `0x` prefix.
pub fn parse_address(text: &str) -> Result<Address, CodecError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let invalid = |reason: String| CodecError::InvalidAddress {
        input: text.to_string(),
        reason,
    };
    if digits.chars().count() != 40 {
        return Err(invalid(format!(
            "expected 40 hex digits, got {}",
            digits.chars().count()
        )));
    }
    let bytes = hex::decode(digits).map_err(|e| invalid(e.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

/// Parse one scalar; `base` is the character offset of `raw` in the original input.
fn parse_scalar(raw: &str, ty: &ParamType, base: usize) -> Result<AbiValue, CodecError> {
    let trimmed_start = raw.trim_start();
    let start = base + (raw.chars().count() - trimmed_start.chars().count());
    let text = trimmed_start.trim_end();

    match ty {
        ParamType::Bool => {
            if text.eq_ignore_ascii_case("true") {
                Ok(AbiValue::Bool(true))
            } else if text.eq_ignore_ascii_case("false") {
                Ok(AbiValue::Bool(false))
            } else {
                Err(CodecError::parse(start, "expected 'true' or 'false'"))
            }
        }
        ParamType::Uint(bits) => {
            let (negative, magnitude) = parse_integer(text, start)?;
            if negative && !magnitude.is_zero() {
                return Err(CodecError::parse(
                    start,
                    format!("negative value for unsigned type uint{bits}"),
                ));
            }
            if magnitude.bit_len() > usize::from(*bits) {
                return Err(CodecError::parse(
                    start,
                    format!("value out of range for uint{bits}"),
                ));
            }
            Ok(AbiValue::Uint(magnitude))
        }
        ParamType::Int(bits) => {
            let (negative, magnitude) = parse_integer(text, start)?;
            let limit = U256::from(1u8) << (usize::from(*bits) - 1);
            let in_range = if negative {
                magnitude <= limit
            } else {
                magnitude < limit
            };
            if !in_range {
                return Err(CodecError::parse(
                    start,
                    format!("value out of range for int{bits}"),
                ));
            }
            let raw = if negative {
                magnitude.wrapping_neg()
            } else {
                magnitude
            };
            Ok(AbiValue::Int(I256::from_raw(raw)))
        }
        ParamType::Address => parse_address(text).map(AbiValue::Address),
        ParamType::Bytes => parse_hex_bytes(text, start).map(AbiValue::Bytes),
        ParamType::FixedBytes(n) => {
            let bytes = parse_hex_bytes(text, start)?;
            if bytes.len() != usize::from(*n) {
                return Err(CodecError::parse(
                    start,
                    format!("expected {n} bytes for bytes{n}, got {}", bytes.len()),
                ));
            }
            Ok(AbiValue::FixedBytes(bytes))
        }
        ParamType::String => Ok(AbiValue::String(text.to_string())),
        ParamType::Array(_) | ParamType::FixedArray { .. } => Err(CodecError::parse(
            start,
            "nested arrays are not supported in text input",
        )),
        ParamType::Tuple(_) => Err(CodecError::parse(
            start,
            "tuples are not supported in text input",
        )),
    }
}

/// Optional sign, then decimal or `0x` hex digits. Returns (negative, magnitude).
fn parse_integer(text: &str, start: usize) -> Result<(bool, U256), CodecError> {
    let (negative, unsigned, sign_len) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..], 1),
        Some(b'+') => (false, &text[1..], 1),
        _ => (false, text, 0),
    };
    let (radix, digits, prefix_len) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (16u32, hex, 2),
        None => (10u32, unsigned, 0),
    };
    let digits_start = start + sign_len + prefix_len;
    if digits.is_empty() {
        return Err(CodecError::parse(digits_start, "missing digits"));
    }
    if let Some(i) = digits.chars().position(|c| !c.is_digit(radix)) {
        let what = if radix == 16 { "hex" } else { "decimal" };
        return Err(CodecError::parse(
            digits_start + i,
            format!("invalid {what} digit"),
        ));
    }
    let magnitude = U256::from_str_radix(digits, u64::from(radix))
        .map_err(|_| CodecError::parse(start, "integer does not fit in 256 bits"))?;
    Ok((negative, magnitude))
}

fn parse_hex_bytes(text: &str, start: usize) -> Result<Vec<u8>, CodecError> {
    let (digits, prefix_len) = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(rest) => (rest, 2),
        None => (text, 0),
    };
    if let Some(i) = digits.chars().position(|c| !c.is_ascii_hexdigit()) {
        return Err(CodecError::parse(start + prefix_len + i, "invalid hex digit"));
    }
    if digits.len() % 2 != 0 {
        return Err(CodecError::parse(
            start + prefix_len + digits.len(),
            "odd number of hex digits",
        ));
    }
    hex::decode(digits).map_err(|e| CodecError::parse(start, e.to_string()))
}

/// One array element as scanned from the text.
enum Element {
    /// Unescaped contents of a `"..."` span; `start` is the opening quote
    Quoted { text: String, start: usize },
    /// Raw text between separators; `start` is its first character
    Bare { text: String, start: usize },
}

fn parse_array(text: &str, elem: &ParamType) -> Result<Vec<AbiValue>, CodecError> {
    let elements = ArrayScanner::new(text).scan()?;
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        let value = match (element, elem) {
            (Element::Quoted { start, .. }, ParamType::Array(_) | ParamType::FixedArray { .. }) => {
                return Err(CodecError::parse(
                    start,
                    "nested arrays are not supported in text input",
                ))
            }
            (Element::Quoted { text, .. }, ParamType::String) => AbiValue::String(text),
            (Element::Bare { text, .. }, ParamType::String) => AbiValue::String(text),
            // Quoted numbers and booleans are tolerated; positions skip the quote.
            (Element::Quoted { text, start }, ty) => parse_scalar(&text, ty, start + 1)?,
            (Element::Bare { text, start }, ty) => parse_scalar(&text, ty, start)?,
        };
        values.push(value);
    }
    Ok(values)
}

/// Single-pass scanner over `[ ... ]` that never splits inside a quoted span.
struct ArrayScanner {
    chars: Vec<char>,
    pos: usize,
}

impl ArrayScanner {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn scan(mut self) -> Result<Vec<Element>, CodecError> {
        self.skip_whitespace();
        if self.peek() != Some('[') {
            return Err(CodecError::parse(self.pos, "expected '[' to open the array"));
        }
        self.pos += 1;

        let mut elements = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.pos += 1;
        } else {
            loop {
                self.skip_whitespace();
                let element = match self.peek() {
                    None => return Err(CodecError::parse(self.pos, "unterminated array")),
                    Some('"') => self.quoted()?,
                    Some('[') => {
                        return Err(CodecError::parse(
                            self.pos,
                            "nested arrays are not supported in text input",
                        ))
                    }
                    Some(',') | Some(']') => {
                        return Err(CodecError::parse(self.pos, "empty array element"))
                    }
                    Some(_) => self.bare()?,
                };
                elements.push(element);

                self.skip_whitespace();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some(']') => {
                        self.pos += 1;
                        break;
                    }
                    Some(c) => {
                        return Err(CodecError::parse(
                            self.pos,
                            format!("expected ',' or ']', found '{c}'"),
                        ))
                    }
                    None => return Err(CodecError::parse(self.pos, "unterminated array")),
                }
            }
        }

        self.skip_whitespace();
        if self.pos < self.chars.len() {
            return Err(CodecError::parse(
                self.pos,
                "unexpected characters after closing ']'",
            ));
        }
        Ok(elements)
    }

    fn quoted(&mut self) -> Result<Element, CodecError> {
        let start = self.pos;
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(CodecError::parse(start, "unterminated quoted string")),
                Some('\\') => match self.chars.get(self.pos + 1).copied() {
                    Some(c @ ('"' | '\\')) => {
                        text.push(c);
                        self.pos += 2;
                    }
                    // Unknown escapes are kept as written.
                    Some(c) => {
                        text.push('\\');
                        text.push(c);
                        self.pos += 2;
                    }
                    None => return Err(CodecError::parse(self.pos, "dangling escape")),
                },
                Some('"') => {
                    self.pos += 1;
                    return Ok(Element::Quoted { text, start });
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn bare(&mut self) -> Result<Element, CodecError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            match c {
                ',' | ']' => break,
                '"' | '[' => {
                    return Err(CodecError::parse(
                        self.pos,
                        format!("unexpected '{c}' inside unquoted element"),
                    ))
                }
                _ => self.pos += 1,
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        Ok(Element::Bare {
            text: text.trim_end().to_string(),
            start,
        })
    }
}
