//! Encoder and combinatorial decoder.
//!
//! This is the orchestration layer: it drives [`crate::interpolate`] and
//! [`crate::tag`] to turn a data block into parity-plus-tag, and to locate
//! and correct up to `E - 1` arbitrary-position errors on the data side of
//! a received block, given a trusted parity side and tag.

#![forbid(unsafe_code)]

use crate::field::FieldElem;
use crate::interpolate::lagrange_interpolate;
use crate::poly::PolyError;
use crate::tag::{self, TagError};
use crate::{E, K, N, P};

/// Errors from the two build-time-invariant violations this codec can
/// detect. Both are unreachable at the crate's default parameters
/// (`P = 257, K = 10, E = 3`); they exist so a misparameterised build
/// fails loudly with a diagnostic instead of corrupting data, per this
/// crate's policy of never calling `std::process::exit` from the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("encoder polynomial degree overflow: {0}")]
    DegreeOverflow(#[from] PolyError),
    #[error("integrity tag overflow: {0}")]
    TagOverflow(#[from] TagError),
}

/// Outcome of [`decode_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// No disagreement was found; the returned data is the input data,
    /// unchanged.
    WithoutErrors,
    /// Disagreements were found, corrected, and the fix was verified
    /// against the integrity tag.
    Fixed,
    /// No tag-verified reconstruction was found.
    Uncorrectable,
}

/// Turns `K` data bytes into `E` parity bytes plus one integrity tag byte.
///
/// Pure function of its input (testable property 4). Total except for
/// the two build-time-invariant violations in [`CodecError`], which are
/// unreachable at this crate's default parameters.
pub fn encode_block(data: &[u8; K]) -> Result<([u8; E], u8), CodecError> {
    let x: Vec<FieldElem> = (0..K as u32).collect();
    let y: Vec<FieldElem> = data.iter().map(|&b| b as FieldElem).collect();

    let l = lagrange_interpolate(&x, &y).expect("abscissae 0..K are distinct and P >= N");

    let full_x: Vec<FieldElem> = (0..N as u32).collect();
    let full_y: Vec<FieldElem> = full_x.iter().map(|&xi| l.evaluate(xi)).collect();

    let tag_byte = tag::compute(&full_x, &full_y)?;

    let mut parity = [0u8; E];
    for i in 0..E {
        parity[i] = (full_y[K + i] % 256) as u8;
    }
    Ok((parity, tag_byte))
}

/// Locates and corrects up to `E - 1` arbitrary-position errors in `data`,
/// given the parity side and tag produced by [`encode_block`].
///
/// `parity_trusted` controls the recovery strategy (see module docs and
/// spec §9): when `true` (the crate's default policy), the parity side
/// and tag are assumed uncorrupted, which both shrinks the search space
/// from `C(N, K)` to `C(K, K-E)` and unlocks the tag-guided fast path.
pub fn decode_block(
    data: &[u8; K],
    parity: &[u8; E],
    received_tag: u8,
    parity_trusted: bool,
) -> ([u8; K], DecodeStatus) {
    let x: [FieldElem; N] = core::array::from_fn(|i| i as FieldElem);
    let mut y = [0 as FieldElem; N];
    for i in 0..K {
        y[i] = data[i] as FieldElem;
    }
    for i in 0..E {
        y[K + i] = parity[i] as FieldElem;
    }

    let (final_y, status) = decode_with_truncation_recovery(&x, y, received_tag, parity_trusted, Commit::First);

    let mut out = [0u8; K];
    for i in 0..K {
        out[i] = (final_y[i] % 256) as u8;
    }
    (out, status)
}

/// Like [`decode_block`], but resolves the §9 open question the other
/// way: instead of committing to the first tag-verified subset, it
/// exhausts the full search space and only returns `Fixed` if every
/// tag-verified reconstruction agrees. Slower; strictly stronger for
/// `E >= 3` where multiple contradictory tag-verified subsets are
/// possible in principle (spec §9, Scenario C).
pub fn decode_block_exhaustive(
    data: &[u8; K],
    parity: &[u8; E],
    received_tag: u8,
    parity_trusted: bool,
) -> ([u8; K], DecodeStatus) {
    let x: [FieldElem; N] = core::array::from_fn(|i| i as FieldElem);
    let mut y = [0 as FieldElem; N];
    for i in 0..K {
        y[i] = data[i] as FieldElem;
    }
    for i in 0..E {
        y[K + i] = parity[i] as FieldElem;
    }

    let (final_y, status) =
        decode_with_truncation_recovery(&x, y, received_tag, parity_trusted, Commit::OnlyIfUnanimous);

    let mut out = [0u8; K];
    for i in 0..K {
        out[i] = (final_y[i] % 256) as u8;
    }
    (out, status)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Commit {
    /// Return as soon as one tag-verified subset is found (fast path,
    /// matches the original `doCombinations`'s early return).
    First,
    /// Exhaust every candidate subset; only commit if all tag-verified
    /// reconstructions agree.
    OnlyIfUnanimous,
}

/// Step 5 (byte-truncation recovery): when `P > 256`, a parity byte whose
/// true field value was `>= 256` was truncated to `value - 256` on the
/// wire. If the plain search is `Uncorrectable`, this retries it with
/// every combination of truncation-candidate parity positions bumped by
/// `256` — bounded to `2^E` attempts, since at most one wraparound is
/// possible per position when `P = 257`.
fn decode_with_truncation_recovery(
    x: &[FieldElem; N],
    y: [FieldElem; N],
    tag_byte: u8,
    parity_trusted: bool,
    commit: Commit,
) -> ([FieldElem; N], DecodeStatus) {
    let (fixed, status) = decode_core(x, y, tag_byte, parity_trusted, commit);
    if status != DecodeStatus::Uncorrectable || P <= 256 {
        return (fixed, status);
    }

    let candidates: Vec<usize> = (K..N).filter(|&i| y[i] + 256 < P).collect();
    for mask in 1u32..(1u32 << candidates.len()) {
        let mut y2 = y;
        for (bit, &pos) in candidates.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                y2[pos] += 256;
            }
        }
        let (fixed2, status2) = decode_core(x, y2, tag_byte, parity_trusted, commit);
        if status2 != DecodeStatus::Uncorrectable {
            return (fixed2, status2);
        }
    }
    (fixed, DecodeStatus::Uncorrectable)
}

/// Accumulates tag-verified candidates across every `search` call a single
/// [`decode_core`] invocation makes, so [`Commit::OnlyIfUnanimous`] can
/// require agreement across the *whole* search (tag-guided sub-searches
/// 1a and 1b together, not just whichever one happens to run first).
#[derive(Default)]
struct Accumulator {
    unanimous: Option<[FieldElem; N]>,
    disagreement: bool,
}

impl Accumulator {
    fn offer(&mut self, candidate: [FieldElem; N]) {
        match self.unanimous {
            None => self.unanimous = Some(candidate),
            Some(prev) if prev == candidate => {}
            Some(_) => self.disagreement = true,
        }
    }

    fn resolve(&self, y: &[FieldElem; N]) -> ([FieldElem; N], DecodeStatus) {
        match (self.unanimous, self.disagreement) {
            (Some(candidate), false) => (candidate, DecodeStatus::Fixed),
            _ => (*y, DecodeStatus::Uncorrectable),
        }
    }
}

/// Steps 1-4: tag-guided single-error attempt, falling back to the full
/// combinatorial search.
///
/// Under [`Commit::OnlyIfUnanimous`], every sub-search this function runs
/// (1a, 1b, and the full fallback) offers its candidates into one shared
/// [`Accumulator`] before any of them is allowed to conclude `Fixed` —
/// otherwise a unanimous-but-wrong result from 1a could hide a
/// contradictory tag-verified reconstruction that only 1b would find.
fn decode_core(
    x: &[FieldElem; N],
    y: [FieldElem; N],
    tag_byte: u8,
    parity_trusted: bool,
    commit: Commit,
) -> ([FieldElem; N], DecodeStatus) {
    let mut acc = Accumulator::default();

    if parity_trusted {
        let h = tag::position_parity(x, &y) ^ tag::position_nibble(tag_byte);
        if (h as usize) < K {
            let h = h as usize;
            let without_h: Vec<usize> = (0..K).filter(|&i| i != h).collect();
            let forced: Vec<usize> = (K..N).collect();

            if let Some(result) = search(
                x,
                &y,
                tag_byte,
                parity_trusted,
                &without_h,
                K - E,
                &forced,
                commit,
                &mut acc,
            ) {
                if result.1 != DecodeStatus::Uncorrectable {
                    return result;
                }
            }

            // "Multi-error with Hamming-masked position": restrict to subsets
            // that include h instead of excluding it. `h` does not need to
            // sort ahead of `forced` here — subset order is irrelevant to
            // both interpolation (a sum) and membership testing below.
            let mut forced_with_h = vec![h];
            forced_with_h.extend_from_slice(&forced);
            if let Some(result) = search(
                x,
                &y,
                tag_byte,
                parity_trusted,
                &without_h,
                K - E - 1,
                &forced_with_h,
                commit,
                &mut acc,
            ) {
                return result;
            }

            // Only reachable under `Commit::OnlyIfUnanimous`: both 1a and 1b
            // ran to completion against the shared accumulator without
            // either concluding outright (e.g. a `WithoutErrors` hit), so
            // resolve now. 1a and 1b together already partition the entire
            // `PARITY_TRUSTED` search space for this `h` (subsets that
            // exclude it, subsets that include it), so there is nothing left
            // for the full fallback search below to add.
            return acc.resolve(&y);
        }
        // h >= K: the parity nibble claims an error on the (trusted) parity
        // side, which is forbidden. Fall through to the full search below
        // without the Hamming restriction.
    }

    if parity_trusted {
        let pool: Vec<usize> = (0..K).collect();
        let forced: Vec<usize> = (K..N).collect();
        match search(x, &y, tag_byte, parity_trusted, &pool, K - E, &forced, commit, &mut acc) {
            Some(result) => result,
            None => acc.resolve(&y),
        }
    } else {
        let pool: Vec<usize> = (0..N).collect();
        match search(x, &y, tag_byte, parity_trusted, &pool, K, &[], commit, &mut acc) {
            Some(result) => result,
            None => acc.resolve(&y),
        }
    }
}

/// Runs the subset search over every `r`-combination of `pool`, each
/// combination unioned with `forced` (subset order doesn't matter: both
/// interpolation and membership testing are order-independent).
///
/// Returns `Some` for a conclusive result: always under [`Commit::First`]
/// (the first tag-verified subset found, or `Uncorrectable` once the pool
/// is exhausted), or under [`Commit::OnlyIfUnanimous`] only for an
/// immediate `WithoutErrors` hit (which is definitive regardless of
/// exhaustiveness policy). Otherwise — `OnlyIfUnanimous` with no
/// `WithoutErrors` hit — every tag-verified candidate is offered into
/// `acc` and this returns `None`, leaving the caller to run further
/// sub-searches into the same accumulator before resolving.
fn search(
    x: &[FieldElem; N],
    y: &[FieldElem; N],
    tag_byte: u8,
    parity_trusted: bool,
    pool: &[usize],
    r: usize,
    forced: &[usize],
    commit: Commit,
    acc: &mut Accumulator,
) -> Option<([FieldElem; N], DecodeStatus)> {
    let mut combos = Combinations::new(pool.len(), r);

    while let Some(chosen) = combos.next() {
        let mut subset: Vec<usize> = chosen.iter().map(|&i| pool[i]).collect();
        subset.extend_from_slice(forced);

        match check_subset(x, y, tag_byte, parity_trusted, &subset) {
            Some(Verdict::WithoutErrors) => return Some((*y, DecodeStatus::WithoutErrors)),
            Some(Verdict::Fixed(candidate)) => match commit {
                Commit::First => return Some((candidate, DecodeStatus::Fixed)),
                Commit::OnlyIfUnanimous => acc.offer(candidate),
            },
            None => {}
        }
    }

    match commit {
        Commit::First => Some((*y, DecodeStatus::Uncorrectable)),
        Commit::OnlyIfUnanimous => None,
    }
}

enum Verdict {
    WithoutErrors,
    Fixed([FieldElem; N]),
}

/// Interpolates through `subset` (length `K`), compares against every
/// other position, and — if between `1` and `E - 1` positions disagree —
/// tentatively commits the re-evaluated block and checks it against the
/// received tag. Returns `None` to mean "reject this candidate, keep
/// searching", matching spec §7's propagation policy (a rejected subset
/// is not a fatal error).
fn check_subset(
    x: &[FieldElem; N],
    y: &[FieldElem; N],
    tag_byte: u8,
    parity_trusted: bool,
    subset: &[usize],
) -> Option<Verdict> {
    debug_assert_eq!(subset.len(), K);

    let xs: Vec<FieldElem> = subset.iter().map(|&i| x[i]).collect();
    let ys: Vec<FieldElem> = subset.iter().map(|&i| y[i]).collect();
    let l = lagrange_interpolate(&xs, &ys).ok()?;

    let mut in_subset = [false; N];
    for &i in subset {
        in_subset[i] = true;
    }

    let mut mismatches = 0usize;
    for i in 0..N {
        if in_subset[i] {
            continue;
        }
        let evaluated = l.evaluate(x[i]);
        if evaluated != y[i] {
            if parity_trusted && i >= K {
                // Parity side is ground truth under this policy; a subset
                // that disagrees with it is simply wrong.
                return None;
            }
            mismatches += 1;
        }
    }

    if mismatches == 0 {
        return Some(Verdict::WithoutErrors);
    }
    if mismatches >= E {
        return None;
    }

    let mut candidate = *y;
    for i in 0..N {
        candidate[i] = l.evaluate(x[i]);
    }

    // Tag verification before commit (spec §4.5 step 2d) only applies when
    // the parity side — and therefore the tag riding along with it — is
    // trusted. With an untrusted parity side the tag itself is suspect and
    // must not be used as a decision oracle (spec §9), matching the
    // original `checkPoints`'s `if(EEPROM_NOT_CORRUPTED)` gating of its
    // Hamming/CRC double-check.
    if parity_trusted {
        let recomputed_x: Vec<FieldElem> = (0..N as u32).collect();
        let recomputed_tag = tag::compute(&recomputed_x, &candidate).ok()?;
        if recomputed_tag != tag_byte {
            return None;
        }
    }
    Some(Verdict::Fixed(candidate))
}

/// Iterative lexicographic `r`-combination enumerator over `0..n`, with
/// explicit `(indices, position)` state — re-architected from the
/// original's recursive subset walk (spec §9) so the search has bounded
/// stack depth and a trivially inspectable/cancellable state.
struct Combinations {
    n: usize,
    r: usize,
    indices: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl Combinations {
    fn new(n: usize, r: usize) -> Self {
        Combinations {
            n,
            r,
            indices: (0..r).collect(),
            started: false,
            exhausted: r > n,
        }
    }

    /// Advances to the next combination, returning the current indices
    /// (into the `0..n` universe this was constructed with) in ascending
    /// order, or `None` once every combination has been produced.
    fn next(&mut self) -> Option<&[usize]> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(&self.indices);
        }
        if self.r == 0 {
            self.exhausted = true;
            return None;
        }

        // Find the rightmost position that can still be advanced.
        let mut position = self.r;
        loop {
            if position == 0 {
                self.exhausted = true;
                return None;
            }
            position -= 1;
            if self.indices[position] < position + self.n - self.r {
                break;
            }
        }
        self.indices[position] += 1;
        for j in (position + 1)..self.r {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const SAMPLE: [u8; K] = [0x9A, 0x48, 0x3E, 0x35, 0x27, 0xA8, 0x78, 0xE9, 0x64, 0x91];

    #[test]
    fn combinations_enumerate_all_subsets_in_order() {
        let mut c = Combinations::new(5, 2);
        let mut all = Vec::new();
        while let Some(idx) = c.next() {
            all.push(idx.to_vec());
        }
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![0, 4],
                vec![1, 2],
                vec![1, 3],
                vec![1, 4],
                vec![2, 3],
                vec![2, 4],
                vec![3, 4],
            ]
        );
    }

    // Testable property 1: clean round trip.
    #[test]
    fn scenario_a_clean_round_trip() {
        let (parity, tag) = encode_block(&SAMPLE).unwrap();
        let (out, status) = decode_block(&SAMPLE, &parity, tag, true);
        assert_eq!(status, DecodeStatus::WithoutErrors);
        assert_eq!(out, SAMPLE);
    }

    // Testable property 2 / Scenario B: two-error correction (E - 1 = 2).
    #[test]
    fn scenario_b_two_error_correction() {
        let (parity, tag) = encode_block(&SAMPLE).unwrap();
        let mut corrupted = SAMPLE;
        corrupted[4] = 0xE9;
        corrupted[8] = 0xF3;
        let (out, status) = decode_block(&corrupted, &parity, tag, true);
        assert_eq!(status, DecodeStatus::Fixed);
        assert_eq!(out, SAMPLE);
    }

    // Scenario C: three-error corruption must never silently mis-correct.
    #[test]
    fn scenario_c_three_errors_never_silently_wrong() {
        let (parity, tag) = encode_block(&SAMPLE).unwrap();
        let mut corrupted = SAMPLE;
        corrupted[2] = corrupted[2].wrapping_add(1);
        corrupted[5] = corrupted[5].wrapping_add(1);
        corrupted[8] = corrupted[8].wrapping_add(1);
        let (out, status) = decode_block(&corrupted, &parity, tag, true);
        assert!(status == DecodeStatus::Uncorrectable || out == SAMPLE);
    }

    // Scenario D: zero-error large corpus.
    #[test]
    fn scenario_d_zero_error_corpus() {
        let mut rng = rand::thread_rng();
        for _ in 0..2000 {
            let mut data = [0u8; K];
            rng.fill(&mut data);
            let (parity, tag) = encode_block(&data).unwrap();
            let (out, status) = decode_block(&data, &parity, tag, true);
            assert_eq!(status, DecodeStatus::WithoutErrors);
            assert_eq!(out, data);
        }
    }

    // Scenario E: single-error sweep over every position and replacement byte.
    #[test]
    fn scenario_e_single_error_sweep() {
        let (parity, tag) = encode_block(&SAMPLE).unwrap();
        for i in 0..K {
            for v in 0u16..256 {
                let v = v as u8;
                if v == SAMPLE[i] {
                    continue;
                }
                let mut corrupted = SAMPLE;
                corrupted[i] = v;
                let (out, status) = decode_block(&corrupted, &parity, tag, true);
                assert_eq!(status, DecodeStatus::Fixed, "i={i}, v={v}");
                assert_eq!(out, SAMPLE, "i={i}, v={v}");
            }
        }
    }

    // Scenario F: byte-truncation recovery (a parity ordinate that
    // evaluates to the field value 256, which collides with 0 as a byte).
    #[test]
    fn scenario_f_byte_truncation_recovery() {
        // Search a small space of inputs for one whose Lagrange polynomial
        // evaluates to 256 at some parity abscissa, to exercise step 5.
        let mut found = false;
        for trial in 0u32..20_000 {
            let mut data = [0u8; K];
            for (i, b) in data.iter_mut().enumerate() {
                *b = ((trial as usize * 131 + i * 17) % 256) as u8;
            }
            let x: Vec<FieldElem> = (0..K as u32).collect();
            let y: Vec<FieldElem> = data.iter().map(|&b| b as FieldElem).collect();
            let l = lagrange_interpolate(&x, &y).unwrap();
            let hits_256 = (K..N).any(|i| l.evaluate(i as u32) == 256);
            if !hits_256 {
                continue;
            }
            found = true;
            let (parity, tag) = encode_block(&data).unwrap();
            assert!(parity.iter().any(|&b| b == 0));
            let (out, status) = decode_block(&data, &parity, tag, true);
            assert_eq!(status, DecodeStatus::WithoutErrors);
            assert_eq!(out, data);
            break;
        }
        assert!(found, "no input in the search space hit field value 256");
    }

    #[test]
    fn encode_is_deterministic() {
        let a = encode_block(&SAMPLE).unwrap();
        let b = encode_block(&SAMPLE).unwrap();
        assert_eq!(a, b);
    }

    // §9: with an untrusted parity side the tag is suspect and must not be
    // used as a decision oracle (spec §9; original `checkPoints` gates its
    // Hamming/CRC check behind `EEPROM_NOT_CORRUPTED`). A garbage tag byte
    // must not block an otherwise-fixable correction when `parity_trusted`
    // is `false`.
    #[test]
    fn untrusted_parity_does_not_gate_on_a_bad_tag() {
        let (parity, tag) = encode_block(&SAMPLE).unwrap();
        let mut corrupted = SAMPLE;
        corrupted[3] = corrupted[3].wrapping_add(1);
        let bogus_tag = !tag;
        let (out, status) = decode_block(&corrupted, &parity, bogus_tag, false);
        assert_eq!(status, DecodeStatus::Fixed);
        assert_eq!(out, SAMPLE);
    }

    #[test]
    fn exhaustive_variant_agrees_with_first_match_on_clean_and_fixable_inputs() {
        let (parity, tag) = encode_block(&SAMPLE).unwrap();
        let (out, status) = decode_block_exhaustive(&SAMPLE, &parity, tag, true);
        assert_eq!(status, DecodeStatus::WithoutErrors);
        assert_eq!(out, SAMPLE);

        let mut corrupted = SAMPLE;
        corrupted[1] = corrupted[1].wrapping_add(5);
        let (out, status) = decode_block_exhaustive(&corrupted, &parity, tag, true);
        assert_eq!(status, DecodeStatus::Fixed);
        assert_eq!(out, SAMPLE);
    }

}
