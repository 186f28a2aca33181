//! Compact textual signatures.
//!
//! ```text
//! transfer(address,uint256)
//! function balanceOf(address owner) view returns (uint256)
//! event Transfer(address indexed from, address indexed to, uint256 value)
//! event Log(bytes32 indexed topic) anonymous
//! constructor(string name, uint8 decimals)
//! ```
//!
//! Without a leading keyword the text is read as the caller's default kind
//! (a function for ABI descriptions, an event for console topic lists).
//! Tuple types may be written `(a,b)` or `tuple(a,b)`. Data locations and
//! state-mutability/visibility words are accepted and ignored.

use abicodec_core::{parse_type_name, CodecError, Param, Signature, SignatureKind};

/// Words that may follow a parameter type or the parameter list but carry
/// no ABI meaning.
const IGNORED_PARAM_WORDS: &[&str] = &["memory", "calldata", "storage"];
const IGNORED_TRAILING_WORDS: &[&str] = &[
    "external", "public", "view", "pure", "payable", "nonpayable",
];

pub struct SignatureParser;

impl SignatureParser {
    /// Parse a compact signature; an unprefixed one is a function.
    pub fn parse(text: &str) -> Result<Signature, CodecError> {
        Self::parse_as(text, SignatureKind::Function)
    }

    /// Parse a compact signature, reading unprefixed text as `default_kind`.
    pub fn parse_as(text: &str, default_kind: SignatureKind) -> Result<Signature, CodecError> {
        let mut s = Scanner::new(text);
        s.skip_ws();

        let kind = match s.peek_word() {
            "function" => Some(SignatureKind::Function),
            "event" => Some(SignatureKind::Event),
            "constructor" => Some(SignatureKind::Constructor),
            _ => None,
        };
        let kind = match kind {
            Some(kind) => {
                s.word();
                s.skip_ws();
                kind
            }
            None => default_kind,
        };

        let name = if kind == SignatureKind::Constructor {
            String::new()
        } else {
            s.word().to_string()
        };
        s.skip_ws();
        let inputs = s.param_list()?;

        let mut anonymous = false;
        let mut outputs = Vec::new();
        loop {
            s.skip_ws();
            if s.at_end() {
                break;
            }
            let word = s.word();
            match word {
                "anonymous" if kind == SignatureKind::Event => anonymous = true,
                "returns" if kind == SignatureKind::Function => {
                    s.skip_ws();
                    outputs = s.param_list()?;
                }
                w if kind == SignatureKind::Function && IGNORED_TRAILING_WORDS.contains(&w) => {}
                "" => return Err(s.error("unexpected character")),
                w => return Err(s.error(format!("unexpected '{w}'"))),
            }
        }

        match kind {
            SignatureKind::Function => Signature::function(name, inputs, outputs),
            SignatureKind::Event => Signature::event(name, inputs, anonymous),
            SignatureKind::Constructor => Signature::constructor(inputs),
        }
    }
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn error(&self, reason: impl std::fmt::Display) -> CodecError {
        CodecError::SchemaError {
            reason: format!("{reason} at position {} in '{}'", self.pos, self.text),
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek_word(&self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        &rest[..end]
    }

    fn word(&mut self) -> &'a str {
        let word = self.peek_word();
        self.pos += word.len();
        word
    }

    /// `( param, param, ... )`
    fn param_list(&mut self) -> Result<Vec<Param>, CodecError> {
        if !self.eat('(') {
            return Err(self.error("expected '('"));
        }
        let mut params = Vec::new();
        self.skip_ws();
        if self.eat(')') {
            return Ok(params);
        }
        loop {
            self.skip_ws();
            params.push(self.param()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(')') {
                return Ok(params);
            }
            return Err(self.error("expected ',' or ')'"));
        }
    }

    /// `type [indexed] [location] [name]`
    fn param(&mut self) -> Result<Param, CodecError> {
        let ty_text = self.type_text()?;
        let ty = parse_type_name(&normalize_type(ty_text))?;
        let mut param = Param::new("", ty);
        loop {
            self.skip_ws();
            match self.peek() {
                Some(',') | Some(')') | None => return Ok(param),
                _ => {}
            }
            match self.word() {
                "" => return Err(self.error("unexpected character in parameter")),
                "indexed" => param.indexed = true,
                w if IGNORED_PARAM_WORDS.contains(&w) => {}
                w if param.name.is_empty() => param.name = w.to_string(),
                w => return Err(self.error(format!("unexpected '{w}' after parameter name"))),
            }
        }
    }

    /// The raw text of one type: up to a top-level separator, including any
    /// parenthesized tuple body and array suffixes.
    fn type_text(&mut self) -> Result<&'a str, CodecError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '(' => depth += 1,
                ')' if depth == 0 => break,
                ')' => depth -= 1,
                ',' if depth == 0 => break,
                c if c.is_whitespace() && depth == 0 => break,
                _ => {}
            }
            self.pos += c.len_utf8();
        }
        if depth != 0 {
            return Err(self.error("unclosed '(' in type"));
        }
        let text = &self.text[start..self.pos];
        if text.is_empty() {
            return Err(self.error("expected a type"));
        }
        Ok(text)
    }
}

/// Drop whitespace inside tuple bodies and the `tuple` keyword.
fn normalize_type(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact.replace("tuple(", "(")
}
