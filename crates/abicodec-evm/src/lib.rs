//! # abicodec-evm
//!
//! EVM ABI encoding and decoding over the `abicodec-core` type system.
//!
//! ## Implementation notes
//! - Head/tail layout: static values inline, dynamic values behind offsets
//!   relative to the start of the enclosing head region
//! - Calldata → 4-byte selector ++ encoded inputs
//! - Topics[0] → event signature hash; topics[1..] → indexed parameters
//! - `data` → non-indexed parameters (ABI-encoded tuple)

pub mod batch;
pub mod call;
pub mod decoder;
pub mod encoder;
pub mod event;

pub use batch::parallel_decode;
pub use call::{
    decode_call, decode_call_with, decode_constructor, decode_output, decode_output_with,
    DecodedCall,
};
pub use decoder::{decode_values, AbiDecoder};
pub use encoder::{encode_call, encode_constructor, encode_topic, encode_values, EncodedCall};
pub use event::{match_log, DecodedLog, DecodedParam, EventMatcher, LogValue, RawLog};
