//! Error types for the abicodec pipeline.

use thiserror::Error;

/// Errors raised while parsing, encoding, decoding or matching ABI data.
///
/// Every variant is a local, recoverable failure. The fields carry enough
/// context (offending position, expected vs. actual shape) for a caller to
/// render a precise message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Invalid type syntax '{input}': {reason}")]
    InvalidTypeSyntax { input: String, reason: String },

    #[error("Schema error: {reason}")]
    SchemaError { reason: String },

    #[error("Parse error at position {position}: {reason}")]
    ParseError { position: usize, reason: String },

    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Arity mismatch: expected {expected} values, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("Truncated data: need {needed} bytes at offset {offset}, {available} available")]
    TruncatedData {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Invalid encoding at offset {offset}: {reason}")]
    InvalidEncoding { offset: usize, reason: String },

    #[error("No signature matches {fingerprint}")]
    NoMatchingSignature { fingerprint: String },

    #[error("Ambiguous signature {fingerprint}: candidates {candidates:?}")]
    AmbiguousSignature {
        fingerprint: String,
        candidates: Vec<String>,
    },

    #[error("Nesting depth exceeded: limit is {limit}")]
    DepthExceeded { limit: usize },
}

impl CodecError {
    pub(crate) fn parse(position: usize, reason: impl Into<String>) -> Self {
        CodecError::ParseError {
            position,
            reason: reason.into(),
        }
    }

    pub(crate) fn schema(reason: impl Into<String>) -> Self {
        CodecError::SchemaError {
            reason: reason.into(),
        }
    }

    /// Character offset into the user's input, for errors that have one.
    pub fn position(&self) -> Option<usize> {
        match self {
            CodecError::ParseError { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// Errors from the signature registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Signature '{signature}' is already registered")]
    AlreadyExists { signature: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_exposes_position() {
        let err = CodecError::parse(7, "unexpected ','");
        assert_eq!(err.position(), Some(7));
        assert_eq!(
            err.to_string(),
            "Parse error at position 7: unexpected ','"
        );
    }

    #[test]
    fn other_errors_have_no_position() {
        let err = CodecError::ArityMismatch {
            expected: 2,
            got: 3,
        };
        assert_eq!(err.position(), None);
    }
}
