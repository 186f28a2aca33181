//! ABI decoder: head/tail bytes → typed values.
//!
//! The decoder is strict. Every read is bounds-checked against the buffer
//! (`TruncatedData`), words must be in their canonical form
//! (`InvalidEncoding`), and nesting is capped by the configured depth
//! (`DepthExceeded`). The input is never mutated and returned values own
//! their data.
//!
//! Offsets may legally point anywhere, so several heads can alias one tail.
//! Each decoded word is charged against a budget of `data.len()` bytes,
//! which keeps the decoded tree proportional to the input.

use abicodec_core::{
    AbiValue, Address, CodecConfig, CodecError, ParamType, DEFAULT_MAX_DEPTH, I256, U256, WORD,
};
use std::cell::Cell;

/// Decode `data` as a tuple of `types` with the default depth limit.
pub fn decode_values(types: &[ParamType], data: &[u8]) -> Result<Vec<AbiValue>, CodecError> {
    AbiDecoder::new().decode(types, data)
}

/// Reusable decoder carrying the nesting limit.
#[derive(Debug, Clone, Copy)]
pub struct AbiDecoder {
    max_depth: usize,
}

impl Default for AbiDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AbiDecoder {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_config(config: &CodecConfig) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decode `data` as one tuple of `types`.
    ///
    /// Bytes past the last tail are ignored, matching what nodes return for
    /// padded return data.
    pub fn decode(&self, types: &[ParamType], data: &[u8]) -> Result<Vec<AbiValue>, CodecError> {
        let reader = Reader::new(data, self.max_depth);
        reader.sequence(types.iter(), 0, 0)
    }

    /// Decode a single elementary value stored in one 32-byte word, as found
    /// in an indexed event topic.
    pub fn decode_word(&self, ty: &ParamType, word: &[u8; WORD]) -> Result<AbiValue, CodecError> {
        if !ty.is_elementary() {
            return Err(CodecError::TypeMismatch {
                expected: "an elementary type".into(),
                got: ty.to_string(),
            });
        }
        let reader = Reader::new(word, self.max_depth);
        reader.value(ty, 0, 0)
    }
}

struct Reader<'a> {
    data: &'a [u8],
    max_depth: usize,
    /// Bytes that may still be decoded
    budget: Cell<usize>,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], max_depth: usize) -> Self {
        Self {
            data,
            max_depth,
            budget: Cell::new(data.len()),
        }
    }

    /// Decode consecutive heads starting at `base`; dynamic members follow
    /// offsets relative to `base`.
    fn sequence<'t, I>(&self, types: I, base: usize, depth: usize) -> Result<Vec<AbiValue>, CodecError>
    where
        I: Iterator<Item = &'t ParamType> + Clone,
    {
        // Reject impossible head regions before allocating anything.
        let head_len = types
            .clone()
            .fold(0usize, |acc, t| acc.saturating_add(t.head_size()));
        self.slice(base, head_len)?;

        let mut out = Vec::with_capacity(types.size_hint().0.min(self.budget.get()));
        let mut head = base;
        for ty in types {
            if ty.is_dynamic() {
                let rel = self.read_usize(head)?;
                self.charge(head, WORD)?;
                let start = base.checked_add(rel).ok_or_else(|| self.truncated(head, rel))?;
                out.push(self.value(ty, start, depth)?);
                head += WORD;
            } else {
                out.push(self.value(ty, head, depth)?);
                head += ty.head_size();
            }
        }
        Ok(out)
    }

    fn value(&self, ty: &ParamType, at: usize, depth: usize) -> Result<AbiValue, CodecError> {
        match ty {
            ParamType::Uint(bits) => {
                let v = U256::from_be_bytes(*self.word(at)?);
                self.charge(at, WORD)?;
                if v.bit_len() > usize::from(*bits) {
                    return Err(invalid(at, format!("value exceeds uint{bits}")));
                }
                Ok(AbiValue::Uint(v))
            }
            ParamType::Int(bits) => {
                let raw = U256::from_be_bytes(*self.word(at)?);
                self.charge(at, WORD)?;
                let v = I256::from_raw(raw);
                let magnitude = if v.is_negative() { !raw } else { raw };
                if magnitude.bit_len() >= usize::from(*bits) {
                    return Err(invalid(at, format!("int{bits} is not sign-extended")));
                }
                Ok(AbiValue::Int(v))
            }
            ParamType::Bool => {
                let word = self.word(at)?;
                self.charge(at, WORD)?;
                match (is_zero(&word[..WORD - 1]), word[WORD - 1]) {
                    (true, 0) => Ok(AbiValue::Bool(false)),
                    (true, 1) => Ok(AbiValue::Bool(true)),
                    _ => Err(invalid(at, "bool must be 0 or 1".into())),
                }
            }
            ParamType::Address => {
                let word = self.word(at)?;
                self.charge(at, WORD)?;
                if !is_zero(&word[..12]) {
                    return Err(invalid(at, "address has dirty high bytes".into()));
                }
                Ok(AbiValue::Address(Address::from_slice(&word[12..])))
            }
            ParamType::FixedBytes(n) => {
                let word = self.word(at)?;
                self.charge(at, WORD)?;
                let n = usize::from(*n);
                if !is_zero(&word[n..]) {
                    return Err(invalid(at, format!("bytes{n} has dirty padding")));
                }
                Ok(AbiValue::FixedBytes(word[..n].to_vec()))
            }
            ParamType::Bytes => Ok(AbiValue::Bytes(self.length_prefixed(at)?.to_vec())),
            ParamType::String => {
                let raw = self.length_prefixed(at)?;
                let s = std::str::from_utf8(raw)
                    .map_err(|e| invalid(at + WORD, format!("string is not UTF-8: {e}")))?;
                Ok(AbiValue::String(s.to_string()))
            }
            ParamType::FixedArray { elem, len } => {
                let depth = self.enter(depth)?;
                let items = self.sequence(std::iter::repeat(elem.as_ref()).take(*len), at, depth)?;
                Ok(AbiValue::Array(items))
            }
            ParamType::Array(elem) => {
                let depth = self.enter(depth)?;
                let count = self.read_usize(at)?;
                self.charge(at, WORD)?;
                let start = at + WORD;
                // Empty-tuple elements are charged one byte so the count stays
                // bounded by the buffer.
                let needed = count.saturating_mul(elem.head_size().max(1));
                self.slice(start, needed)?;
                let items = self.sequence(std::iter::repeat(elem.as_ref()).take(count), start, depth)?;
                Ok(AbiValue::Array(items))
            }
            ParamType::Tuple(members) => {
                let depth = self.enter(depth)?;
                if members.is_empty() {
                    // Occupies no bytes; charged one so repeats stay bounded.
                    self.charge(at, 1)?;
                }
                let items = self.sequence(members.iter().map(|(_, t)| t), at, depth)?;
                Ok(AbiValue::Tuple(items))
            }
        }
    }

    fn enter(&self, depth: usize) -> Result<usize, CodecError> {
        if depth >= self.max_depth {
            return Err(CodecError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        Ok(depth + 1)
    }

    /// Length word at `at`, then that many bytes. Trailing padding is not required.
    fn length_prefixed(&self, at: usize) -> Result<&'a [u8], CodecError> {
        let len = self.read_usize(at)?;
        let body = self.slice(at + WORD, len)?;
        self.charge(at, WORD + len)?;
        Ok(body)
    }

    /// Spend `bytes` of the decode budget. Runs out only when offsets alias
    /// or zero-size elements repeat.
    fn charge(&self, at: usize, bytes: usize) -> Result<(), CodecError> {
        let left = self.budget.get();
        if bytes > left {
            return Err(invalid(
                at,
                format!("decoded size exceeds the {}-byte input", self.data.len()),
            ));
        }
        self.budget.set(left - bytes);
        Ok(())
    }

    fn slice(&self, at: usize, len: usize) -> Result<&'a [u8], CodecError> {
        let end = at.checked_add(len).ok_or_else(|| self.truncated(at, len))?;
        self.data.get(at..end).ok_or_else(|| self.truncated(at, len))
    }

    fn word(&self, at: usize) -> Result<&'a [u8; WORD], CodecError> {
        let bytes = self.slice(at, WORD)?;
        bytes.try_into().map_err(|_| self.truncated(at, WORD))
    }

    /// An offset, length or count word. Values that cannot address memory
    /// are reported as truncation since no buffer could satisfy them.
    fn read_usize(&self, at: usize) -> Result<usize, CodecError> {
        let word = self.word(at)?;
        if !is_zero(&word[..WORD - 8]) {
            return Err(self.truncated(at, usize::MAX));
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&word[WORD - 8..]);
        usize::try_from(u64::from_be_bytes(low)).map_err(|_| self.truncated(at, usize::MAX))
    }

    fn truncated(&self, offset: usize, needed: usize) -> CodecError {
        CodecError::TruncatedData {
            offset,
            needed,
            available: self.data.len().saturating_sub(offset),
        }
    }
}

fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

fn invalid(offset: usize, reason: String) -> CodecError {
    CodecError::InvalidEncoding { offset, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_values;
    use abicodec_core::parse_type_name;

    fn types(names: &[&str]) -> Vec<ParamType> {
        names.iter().map(|n| parse_type_name(n).unwrap()).collect()
    }

    fn word(hex_digits: &str) -> Vec<u8> {
        hex::decode(format!("{hex_digits:0>64}")).unwrap()
    }

    #[test]
    fn round_trip_mixed() {
        let tys = types(&["uint256", "string", "int64", "bytes", "(address,bool)[]"]);
        let addr: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        let values = vec![
            AbiValue::Uint(U256::from(42u64)),
            AbiValue::String("hello world".into()),
            AbiValue::Int(I256::try_from(-7i64).unwrap()),
            AbiValue::Bytes(vec![1, 2, 3]),
            AbiValue::Array(vec![
                AbiValue::Tuple(vec![AbiValue::Address(addr), AbiValue::Bool(true)]),
                AbiValue::Tuple(vec![AbiValue::Address(addr), AbiValue::Bool(false)]),
            ]),
        ];
        let encoded = encode_values(&tys, &values).unwrap();
        assert_eq!(decode_values(&tys, &encoded).unwrap(), values);
    }

    #[test]
    fn round_trip_nested_dynamic() {
        let tys = types(&["string[2]", "uint8[][]"]);
        let values = vec![
            AbiValue::Array(vec!["a".into(), "bc".into()]),
            AbiValue::Array(vec![
                AbiValue::Array(vec![AbiValue::Uint(U256::from(1u64))]),
                AbiValue::Array(vec![]),
            ]),
        ];
        let encoded = encode_values(&tys, &values).unwrap();
        assert_eq!(decode_values(&tys, &encoded).unwrap(), values);
    }

    #[test]
    fn truncated_offset_fails() {
        // string whose offset points past the buffer
        let data = word("40");
        let err = decode_values(&types(&["string"]), &data).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedData { offset: 64, .. }), "{err:?}");
    }

    #[test]
    fn truncated_length_fails() {
        let mut data = word("20");
        data.extend(word("ff")); // claims 255 bytes
        data.extend(word("00"));
        let err = decode_values(&types(&["bytes"]), &data).unwrap_err();
        assert!(matches!(
            err,
            CodecError::TruncatedData { offset: 64, needed: 255, available: 32 }
        ));
    }

    #[test]
    fn huge_array_count_is_rejected_before_allocation() {
        let mut data = word("20");
        data.extend(word("ffffffffffffffff"));
        let err = decode_values(&types(&["uint256[]"]), &data).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedData { .. }));
    }

    #[test]
    fn short_static_head() {
        let err = decode_values(&types(&["uint256", "uint256"]), &word("1")).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedData { offset: 0, needed: 64, available: 32 }));
    }

    #[test]
    fn non_canonical_words() {
        assert!(matches!(
            decode_values(&types(&["uint8"]), &word("100")),
            Err(CodecError::InvalidEncoding { offset: 0, .. })
        ));
        assert!(matches!(
            decode_values(&types(&["bool"]), &word("2")),
            Err(CodecError::InvalidEncoding { .. })
        ));
        assert!(matches!(
            decode_values(&types(&["address"]), &word("1000000000000000000000000000000000000000000")),
            Err(CodecError::InvalidEncoding { .. })
        ));
        let mut dirty = vec![0x61, 0x62, 0x63];
        dirty.resize(32, 0);
        dirty[31] = 1;
        assert!(matches!(
            decode_values(&types(&["bytes3"]), &dirty),
            Err(CodecError::InvalidEncoding { .. })
        ));
        // 0x80 in int8 position without sign extension
        assert!(matches!(
            decode_values(&types(&["int8"]), &word("80")),
            Err(CodecError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn signed_decoding_uses_sign_extension() {
        let decoded = decode_values(&types(&["int8"]), &[0xff; 32]).unwrap();
        assert_eq!(decoded, vec![AbiValue::Int(I256::try_from(-1i64).unwrap())]);
        let decoded = decode_values(&types(&["int8"]), &word("7f")).unwrap();
        assert_eq!(decoded, vec![AbiValue::Int(I256::try_from(127i64).unwrap())]);
    }

    #[test]
    fn invalid_utf8_string() {
        let mut data = word("20");
        data.extend(word("2"));
        let mut body = vec![0xff, 0xfe];
        body.resize(32, 0);
        data.extend(body);
        assert!(matches!(
            decode_values(&types(&["string"]), &data),
            Err(CodecError::InvalidEncoding { offset: 64, .. })
        ));
    }

    #[test]
    fn depth_limit_from_config() {
        let tys = types(&["uint8[][]"]);
        let values = vec![AbiValue::Array(vec![AbiValue::Array(vec![])])];
        let encoded = encode_values(&tys, &values).unwrap();

        let shallow = AbiDecoder::with_config(&CodecConfig { max_depth: 1 });
        assert_eq!(
            shallow.decode(&tys, &encoded).unwrap_err(),
            CodecError::DepthExceeded { limit: 1 }
        );
        let deep = AbiDecoder::with_config(&CodecConfig { max_depth: 2 });
        assert_eq!(deep.decode(&tys, &encoded).unwrap(), values);
    }

    #[test]
    fn aliased_offsets_cannot_inflate_output() {
        // uint8[][][] where every element offset points at the same child,
        // so a naive decode re-reads each child n times per level.
        let n = 8usize;
        let mut data = word("20");
        for _ in 0..2 {
            data.extend(word(&format!("{n:x}")));
            for _ in 0..n {
                data.extend(word(&format!("{:x}", n * WORD)));
            }
        }
        data.extend(word(&format!("{n:x}")));
        for _ in 0..n {
            data.extend(word("1"));
        }
        assert_eq!(data.len(), 4 * WORD + 3 * n * WORD);

        let err = decode_values(&types(&["uint8[][][]"]), &data).unwrap_err();
        assert!(matches!(err, CodecError::InvalidEncoding { .. }), "{err:?}");

        // The same shape without aliasing decodes.
        let inner = AbiValue::Array(vec![AbiValue::Uint(U256::from(1u64)); n]);
        let middle = AbiValue::Array(vec![inner; n]);
        let values = vec![AbiValue::Array(vec![middle; n])];
        let encoded = encode_values(&types(&["uint8[][][]"]), &values).unwrap();
        assert!(encoded.len() > data.len());
        assert_eq!(decode_values(&types(&["uint8[][][]"]), &encoded).unwrap(), values);
    }

    #[test]
    fn empty_tuples_are_charged() {
        // `()[]` claiming 64 elements in a 128-byte buffer: within the
        // count bound, but each element still costs budget.
        let mut data = word("20");
        data.extend(word("40"));
        data.extend(vec![0u8; 64]);
        let tys = types(&["()[]"]);
        let decoded = decode_values(&tys, &data).unwrap();
        assert_eq!(decoded, vec![AbiValue::Array(vec![AbiValue::Tuple(vec![]); 64])]);
    }

    #[test]
    fn decode_word_rejects_reference_types() {
        let decoder = AbiDecoder::new();
        let mut w = [0u8; WORD];
        w[WORD - 1] = 1;
        assert_eq!(decoder.decode_word(&ParamType::Bool, &w).unwrap(), AbiValue::Bool(true));
        assert!(decoder.decode_word(&ParamType::String, &w).is_err());
    }
}
