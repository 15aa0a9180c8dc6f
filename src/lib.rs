//! Crate root: build-time parameters and the core module map.
//!
//! This crate implements a Reed-Solomon-style block error-correction codec
//! over the small prime field `Z/PZ`. A `K`-byte data block is protected
//! by `E` parity symbols plus one integrity tag byte, intended to be
//! stored on a separate, more reliable medium than the data itself (the
//! *parity side*). The decoder locates and corrects up to `E - 1`
//! arbitrary-position errors on the data side via combinatorial Lagrange
//! re-interpolation, guided by the integrity tag.
//!
//! ## Invariants
//!
//! - **Field.** `P` must be prime and greater than `255`, so every byte
//!   value is a field element unchanged. `(P - 1)^2` must fit in
//!   [`field::FieldElem`].
//! - **Block shape.** `N = K + E` evaluation points per block; abscissae
//!   are always `x[i] = i`. Indices `0..K` are the *data side*; `K..N`
//!   are the *parity side*.
//! - **Single-threaded core.** Every operation in [`field`], [`poly`],
//!   [`interpolate`], [`tag`] and [`codec`] is synchronous and CPU-bound
//!   with bounded running time (the combinatorial search in [`codec`] is
//!   exponential in `E`, not in `K`). The only process-wide state is the
//!   compile-time-constant inverse table in [`field`], safe to share
//!   across threads without synchronization. [`batch`] offers optional,
//!   not required, thread-level parallelism across independent blocks.
//! - **No internal `exit()`.** Build-time-invariant violations (degree
//!   overflow, position-parity overflow) are surfaced as typed errors,
//!   never a process exit, per this crate's error-handling policy (see
//!   [`codec::CodecError`]). File-level I/O failures surface as
//!   `std::io::Error` from [`io`].
//!
//! This crate is parameterised at build time, not per call: `P`, `K`,
//! `E` are compile-time constants. It is not a general-purpose
//! Reed-Solomon library — the combinatorial decoder does not target
//! large parity lengths.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

/// Prime modulus. Must be `> 255` so every byte is a field element
/// unchanged, and `(P - 1)^2` must fit in [`field::FieldElem`].
pub const P: u32 = 257;

/// Number of data symbols per block.
pub const K: usize = 10;

/// Number of errors the decoder is designed to fix in one block.
pub const NUM_FIXABLE_ERRORS: usize = 2;

/// Number of parity symbols per block (`NUM_FIXABLE_ERRORS + 1`). The
/// decoder can detect up to `E` errors and correct up to `E - 1`.
pub const E: usize = NUM_FIXABLE_ERRORS + 1;

/// Total evaluation points per block (`K + E`).
pub const N: usize = K + E;

/// Default policy for `parity_trusted` parameters throughout this
/// crate: whether the parity side and tag are assumed uncorrupted. See
/// spec §9 — this used to be a single global build flag; it is now an
/// explicit per-call parameter, defaulting to `true` here.
pub const PARITY_TRUSTED: bool = true;

/// Field arithmetic over `Z/PZ` and the precomputed inverse table.
pub mod field;
/// Dense, fixed-capacity polynomials over [`field`].
pub mod poly;
/// Lagrange interpolation through `K` distinct abscissae.
pub mod interpolate;
/// The one-byte integrity tag (position parity + CRC-16 nibble).
pub mod tag;
/// Encoder and combinatorial decoder: the heart of this crate.
pub mod codec;
/// File-level chunking I/O, tying the core to encode/decode passes over files.
pub mod io;
/// Optional thread-parallel batch API over independent blocks.
pub mod batch;

pub use codec::{decode_block, decode_block_exhaustive, encode_block, CodecError, DecodeStatus};
pub use field::{FieldElem, FieldError};
