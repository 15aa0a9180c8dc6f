//! Optional thread-parallel fan-out over independent blocks.
//!
//! This is the "documented-but-optional concurrency opportunity" spec §5
//! describes: the core ([`crate::codec`]) is single-threaded and
//! synchronous by design, and nothing here subdivides a single block's
//! decode across workers. It only runs independent blocks concurrently,
//! each on a worker thread borrowing from the caller's slices via
//! `std::thread::scope` — no unsafe, no async runtime, matching this
//! crate's synchronous core.

#![forbid(unsafe_code)]

use crate::codec::{decode_block, encode_block, CodecError, DecodeStatus};
use crate::{E, K};

/// Encodes every block in `blocks` concurrently across up to `workers`
/// threads, preserving input order in the result.
///
/// # Errors
/// The first [`CodecError`] encountered, by block index (lowest index
/// wins on a tie across threads). Every block is still attempted; a
/// later block's success does not suppress an earlier failure.
pub fn encode_blocks(
    blocks: &[[u8; K]],
    workers: usize,
) -> Result<Vec<([u8; E], u8)>, CodecError> {
    let workers = workers.max(1);
    let mut out: Vec<Option<([u8; E], u8)>> = vec![None; blocks.len()];
    let mut first_err: Option<(usize, CodecError)> = None;

    std::thread::scope(|scope| {
        let chunk_size = blocks.len().div_ceil(workers).max(1);
        let mut handles = Vec::new();
        for (chunk_idx, chunk) in blocks.chunks(chunk_size).enumerate() {
            let base = chunk_idx * chunk_size;
            handles.push(scope.spawn(move || {
                let mut results = Vec::with_capacity(chunk.len());
                for block in chunk {
                    results.push(encode_block(block));
                }
                (base, results)
            }));
        }
        for handle in handles {
            let (base, results) = handle.join().expect("encode worker thread panicked");
            for (offset, result) in results.into_iter().enumerate() {
                match result {
                    Ok(ok) => out[base + offset] = Some(ok),
                    Err(e) => {
                        let idx = base + offset;
                        let replace = match &first_err {
                            None => true,
                            Some((prev, _)) => idx < *prev,
                        };
                        if replace {
                            first_err = Some((idx, e));
                        }
                    }
                }
            }
        }
    });

    if let Some((_, e)) = first_err {
        return Err(e);
    }
    Ok(out.into_iter().map(|o| o.expect("every block was attempted")).collect())
}

/// One block's input to [`decode_blocks`].
pub struct DecodeInput<'a> {
    /// Possibly-corrupted data side.
    pub data: &'a [u8; K],
    /// Trusted parity side.
    pub parity: &'a [u8; E],
    /// Received integrity tag.
    pub tag: u8,
}

/// Decodes every block in `inputs` concurrently across up to `workers`
/// threads, preserving input order in the result. There is no failure
/// mode here beyond [`DecodeStatus::Uncorrectable`], which is returned
/// per block rather than aborting the batch — one bad block never
/// prevents its siblings from decoding.
pub fn decode_blocks(
    inputs: &[DecodeInput<'_>],
    parity_trusted: bool,
    workers: usize,
) -> Vec<([u8; K], DecodeStatus)> {
    let workers = workers.max(1);
    let mut out: Vec<Option<([u8; K], DecodeStatus)>> = vec![None; inputs.len()];

    std::thread::scope(|scope| {
        let chunk_size = inputs.len().div_ceil(workers).max(1);
        let mut handles = Vec::new();
        for (chunk_idx, chunk) in inputs.chunks(chunk_size).enumerate() {
            let base = chunk_idx * chunk_size;
            handles.push(scope.spawn(move || {
                let mut results = Vec::with_capacity(chunk.len());
                for input in chunk {
                    results.push(decode_block(input.data, input.parity, input.tag, parity_trusted));
                }
                (base, results)
            }));
        }
        for handle in handles {
            let (base, results) = handle.join().expect("decode worker thread panicked");
            for (offset, result) in results.into_iter().enumerate() {
                out[base + offset] = Some(result);
            }
        }
    });

    out.into_iter().map(|o| o.expect("every block was attempted")).collect()
}
