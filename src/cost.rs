//! Pure bit-cost functions used by the optimal parser and the reducer.
//!
//! Every function here returns an exact bit count, never an estimate:
//! the parser's shortest-path search is only "optimal" if these match
//! the emitter bit-for-bit.

use crate::bits::BitWriter;
use crate::config::MAX_OFFSET;

/// Penalty added on a literal-after-match transition (the hook spec'd
/// as "mode-switch penalty"). Wired to zero; kept as a named constant
/// rather than inlined so a future cost model can change it without
/// touching the parser's control flow.
pub const MODE_SWITCH_PENALTY: u32 = 0;

/// Cost of one literal byte. For the first byte of a run (`prev_len ==
/// 0`) this is the full literals-run header (token bit + `gamma(1)`)
/// plus the raw byte's 8 bits; for every later byte it's just the
/// incremental cost of the run-length gamma as the run grows from
/// `prev_len` to `prev_len + 1`, plus the raw byte's 8 bits.
pub fn literal_byte_cost(prev_len: u32) -> u32 {
    if prev_len == 0 {
        8 + literals_header_cost(1)
    } else {
        8 + (BitWriter::gamma_size(prev_len + 1) - BitWriter::gamma_size(prev_len))
    }
}

/// Cost of a literals-run header: one token bit plus the gamma size of
/// the run count (counts start at 1).
pub fn literals_header_cost(num_literals: u32) -> u32 {
    debug_assert!(num_literals >= 1);
    1 + BitWriter::gamma_size(num_literals)
}

/// Cost of a non-rep match length field: `gamma_size(length - 1)`.
pub fn match_length_cost_norep(length: u32) -> u32 {
    debug_assert!(length >= 2);
    BitWriter::gamma_size(length - 1)
}

/// Cost of a rep-match length field: `gamma_size(length)`.
pub fn match_length_cost_rep(length: u32) -> u32 {
    debug_assert!(length >= 1);
    BitWriter::gamma_size(length)
}

/// Cost of encoding an offset: one byte if it fits in the low 7 bits
/// (`offset <= 128`), otherwise 7 bits for the inline low part plus the
/// gamma size of the high part.
pub fn offset_cost(offset: u32) -> u32 {
    debug_assert!(offset >= 1 && offset <= MAX_OFFSET);
    if offset <= 128 {
        8
    } else {
        7 + BitWriter::gamma_size(((offset - 1) >> 7) + 1)
    }
}

/// Cost of the 1-bit command-class token (literals-follow / match-follows).
pub const COMMAND_TOKEN_COST: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_cost_matches_format_boundary() {
        assert_eq!(offset_cost(1), 8);
        assert_eq!(offset_cost(128), 8);
        assert_eq!(offset_cost(129), 7 + BitWriter::gamma_size(1));
        assert_eq!(offset_cost(256), 7 + BitWriter::gamma_size(1));
    }

    #[test]
    fn literal_byte_cost_charges_the_run_header_once() {
        assert_eq!(literal_byte_cost(0), 8 + literals_header_cost(1));
        assert_eq!(literal_byte_cost(1), 8 + (BitWriter::gamma_size(2) - BitWriter::gamma_size(1)));
    }

    #[test]
    fn literal_run_cost_matches_incremental_sum() {
        for n in 1u32..8 {
            let incremental: u32 = (0..n).map(literal_byte_cost).sum();
            let direct = literals_header_cost(n) + n * 8;
            assert_eq!(incremental, direct, "mismatch at run length {n}");
        }
    }

    #[test]
    fn match_length_costs_differ_by_rep_status() {
        assert_eq!(match_length_cost_norep(2), BitWriter::gamma_size(1));
        assert_eq!(match_length_cost_rep(2), BitWriter::gamma_size(2));
    }
}
