//! Signature hashing.
//!
//! Selectors and event topics are derived from the keccak-256 digest of a
//! canonical signature string, e.g.:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! The digest is behind [`SignatureHasher`] so callers can link a different
//! implementation (or a test double) without touching the codec.

use alloy_primitives::B256;
use tiny_keccak::{Hasher, Keccak};

/// A 32-byte digest over canonical signature bytes.
pub trait SignatureHasher: Send + Sync {
    fn digest(&self, input: &[u8]) -> B256;
}

/// keccak-256, the digest used by EVM-compatible chains.
#[derive(Debug, Default, Clone, Copy)]
pub struct Keccak256;

impl SignatureHasher for Keccak256 {
    fn digest(&self, input: &[u8]) -> B256 {
        keccak256(input)
    }
}

/// Blanket impl so closures can be used as hashers.
impl<F: Fn(&[u8]) -> B256 + Send + Sync> SignatureHasher for F {
    fn digest(&self, input: &[u8]) -> B256 {
        self(input)
    }
}

/// keccak-256 of arbitrary bytes.
pub fn keccak256(input: impl AsRef<[u8]>) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(input.as_ref());
    hasher.finalize(&mut output);
    B256::from(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_digest() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn erc20_transfer_topic() {
        let digest = Keccak256.digest(b"Transfer(address,address,uint256)");
        assert_eq!(
            hex::encode(digest),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn closure_hasher() {
        let fixed = |_: &[u8]| B256::repeat_byte(0xab);
        assert_eq!(fixed.digest(b"anything"), B256::repeat_byte(0xab));
    }
}
