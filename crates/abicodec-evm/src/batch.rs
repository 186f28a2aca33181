//! Rayon-powered batch decoding of event-search results.

use abicodec_core::{CodecError, SignatureHasher, Signature};
use rayon::prelude::*;

use crate::event::{DecodedLog, EventMatcher, RawLog};

/// Decode `logs` in parallel against `candidates`.
/// Returns `(successes, errors)`, each tagged with the log's index in `logs`.
pub fn parallel_decode<H: SignatureHasher>(
    matcher: &EventMatcher<H>,
    candidates: &[Signature],
    logs: &[RawLog],
) -> (Vec<(usize, DecodedLog)>, Vec<(usize, CodecError)>) {
    tracing::debug!(logs = logs.len(), candidates = candidates.len(), "batch decode");

    let results: Vec<(usize, Result<DecodedLog, CodecError>)> = logs
        .par_iter()
        .enumerate()
        .map(|(idx, log)| {
            let decoded = matcher
                .match_log(candidates, log)
                .map(|(_, decoded)| decoded);
            (idx, decoded)
        })
        .collect();

    let mut decoded = Vec::new();
    let mut errors = Vec::new();
    for (idx, r) in results {
        match r {
            Ok(log) => decoded.push((idx, log)),
            Err(e) => errors.push((idx, e)),
        }
    }
    if !errors.is_empty() {
        tracing::debug!(failed = errors.len(), "batch decode finished with errors");
    }
    (decoded, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_values;
    use abicodec_core::{AbiValue, Param, ParamType, B256, U256};

    #[test]
    fn keeps_indices_and_errors() {
        let sig = Signature::event(
            "Stored",
            vec![Param::new("value", ParamType::Uint(256))],
            false,
        )
        .unwrap();
        let topic0 = sig.topic0().unwrap();
        let logs: Vec<RawLog> = (0..50u64)
            .map(|i| {
                if i % 10 == 3 {
                    RawLog::new(vec![B256::ZERO], vec![])
                } else {
                    let data =
                        encode_values(&[ParamType::Uint(256)], &[AbiValue::Uint(U256::from(i))])
                            .unwrap();
                    RawLog::new(vec![topic0], data)
                }
            })
            .collect();

        let (ok, failed) = parallel_decode(&EventMatcher::new(), &[sig], &logs);
        assert_eq!(ok.len(), 45);
        assert_eq!(failed.len(), 5);
        assert!(failed.iter().all(|(i, _)| i % 10 == 3));
        let (idx, log) = &ok[10];
        assert_eq!(
            log.param("value").and_then(|v| v.as_value()),
            Some(&AbiValue::Uint(U256::from(*idx as u64)))
        );
    }
}
