//! # abicodec-core
//!
//! Core types shared by every abicodec crate: the ABI type system, typed
//! values, function/event signatures with selector and topic hashing, the
//! parameter-text parser, and the error taxonomy.
//!
//! Everything here is pure and `Send + Sync`; nothing performs I/O.

pub mod config;
pub mod error;
pub mod hasher;
pub mod input;
pub mod signature;
pub mod types;
pub mod value;

pub use config::{CodecConfig, DEFAULT_MAX_DEPTH};
pub use error::{CodecError, RegistryError};
pub use hasher::{keccak256, Keccak256, SignatureHasher};
pub use input::{parse_address, parse_parameter_text};
pub use signature::{Param, Signature, SignatureKind};
pub use types::{parse_array_suffix, parse_type_name, parse_type_name_with_depth, ParamType, WORD};
pub use value::AbiValue;

/// Re-exported primitives used in the public API.
pub use alloy_primitives::{Address, B256, I256, U256};
