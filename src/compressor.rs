//! The per-block entry point: an arena-owning context,
//! paired `new`/destroy-on-`Drop` lifecycle, and `compress_block`, the
//! single operation a driver calls once per block.
//!
//! A plain struct with explicit init and no hidden global state: every
//! scratch table is allocated once and reused across blocks, the way a
//! long-lived streaming context should be.

use crate::arrival::ArrivalTable;
use crate::config::Config;
use crate::emit::{self, BitCursor};
use crate::error::Error;
use crate::forward_rep::VisitedTable;
use crate::matchfinder::chain::ChainMatchFinder;
use crate::matchfinder::MatchFinder;
use crate::matchtable::MatchTable;
use crate::parser::{self, BestMatch};
use crate::reduce;
use crate::rle;
use crate::stats::Stats;
use crate::supplement::{self, PrefixChain};

/// Worst-case compressed size for `input_size` bytes of input, matching
/// the format's fixed per-64-KiB overhead.
pub fn max_compressed_size(input_size: usize) -> usize {
    ((input_size + 65_535) >> 16) * 128 + input_size
}

/// Result of one [`Compressor::compress_block`] call.
#[derive(Debug, Clone, Copy)]
pub struct BlockResult {
    /// Total output length after this call (bytes, including any
    /// partially-filled trailing byte already counted once).
    pub out_len: usize,
    /// Trailing literal bytes at the end of this block that were *not*
    /// emitted, to be folded into the next block's own literal region
    /// (`0` whenever `flags` has the last-block bit set).
    pub final_literals: u32,
}

/// Arena-owning compression context. All scratch buffers are allocated
/// once (on the first call, sized from `config.block_size`) and reused
/// across calls; `compress_block` performs no allocation once its
/// scratch tables have grown to the running block's size.
pub struct Compressor {
    config: Config,
    finder: Box<dyn MatchFinder>,
    match_table: MatchTable,
    arrivals: ArrivalTable,
    visited: VisitedTable,
    chain: Option<PrefixChain>,
    rle: Vec<u32>,
    cursor: BitCursor,
    first_command_pending: bool,
    stats: Stats,
}

impl Compressor {
    /// Builds a context with a default [`ChainMatchFinder`] as the
    /// match-finder. Use [`Compressor::with_match_finder`] to supply a
    /// different one (e.g. a suffix-array-backed finder).
    pub fn new(config: Config) -> Result<Self, Error> {
        let max_offset = config.resolved_max_offset();
        Self::with_match_finder(config, Box::new(ChainMatchFinder::new(max_offset)))
    }

    pub fn with_match_finder(config: Config, finder: Box<dyn MatchFinder>) -> Result<Self, Error> {
        let block_size = config.resolved_block_size();
        let num_arrivals = config.resolved_num_arrivals();
        Ok(Compressor {
            config,
            finder,
            match_table: MatchTable::new(0, block_size),
            arrivals: ArrivalTable::new(0, block_size + 1, num_arrivals),
            visited: VisitedTable::new(0, block_size + 1),
            chain: None,
            rle: Vec::new(),
            cursor: BitCursor::INITIAL,
            first_command_pending: true,
            stats: Stats::new(),
        })
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compresses one block of `input_window[prev_size..prev_size +
    /// block_len)`, appending to `out` at its current length.
    ///
    /// `rep_offset` is read as the register carried in from the previous
    /// block (or the driver's chosen initial value, `1`, for the very
    /// first block) and updated to the register's value after this
    /// block. `flags` is `config::BLOCK_FLAG_FIRST` / `_LAST`, OR'd
    /// together as needed.
    pub fn compress_block(
        &mut self,
        input_window: &[u8],
        prev_size: usize,
        block_len: usize,
        out: &mut Vec<u8>,
        rep_offset: &mut u32,
        flags: u32,
    ) -> Result<BlockResult, Error> {
        let block_start = prev_size as u32;
        let block_end = (prev_size + block_len) as u32;
        let end = prev_size + block_len;
        let max_offset = self.config.resolved_max_offset();
        let num_arrivals = self.config.resolved_num_arrivals();
        let is_first_block = flags & crate::config::BLOCK_FLAG_FIRST != 0;
        let is_last_block = flags & crate::config::BLOCK_FLAG_LAST != 0;

        if is_first_block {
            self.first_command_pending = true;
            self.cursor = BitCursor::INITIAL;
        }

        self.match_table.reset(block_start, block_len);
        self.finder.build(input_window, end)?;
        self.finder.skip(0, prev_size);
        self.finder
            .find_all(input_window, crate::config::NMATCHES_PER_INDEX, prev_size, end, flags, &mut self.match_table);

        let chain = self
            .chain
            .get_or_insert_with(|| PrefixChain::build(input_window, block_start, end));
        chain.rebuild(input_window, block_start, end);

        supplement::pass_a(input_window, block_start, end, max_offset, chain, &mut self.match_table);

        self.rle = rle::compute_rle_lengths(input_window, end);

        self.visited.reset(block_start, block_len + 1);
        parser::optimal_forward(
            input_window,
            end,
            block_start,
            block_end,
            true,
            *rep_offset,
            num_arrivals / 2,
            &mut self.match_table,
            &self.rle,
            &mut self.visited,
            max_offset,
            &mut self.arrivals,
        );

        supplement::pass_b(
            input_window,
            end,
            block_start,
            end,
            max_offset,
            chain,
            &mut self.match_table,
            &self.arrivals,
            &mut self.visited,
            &self.rle,
        );

        parser::optimal_forward(
            input_window,
            end,
            block_start,
            block_end,
            false,
            *rep_offset,
            num_arrivals,
            &mut self.match_table,
            &self.rle,
            &mut self.visited,
            max_offset,
            &mut self.arrivals,
        );

        let mut best: Vec<BestMatch> = parser::backward_walk(&self.arrivals, block_start, block_end);
        reduce::reduce_to_fixed_point(input_window, block_start, *rep_offset, &mut best);

        let out_start = out.len();
        out.resize(out_start + max_compressed_size(block_len) + 16, 0);
        let mut out_len = out_start;
        let final_literals = emit::emit_block(
            input_window,
            block_start,
            block_end,
            &best,
            out,
            &mut out_len,
            &mut self.cursor,
            rep_offset,
            max_offset,
            self.config.is_inverted(),
            is_last_block,
            &mut self.first_command_pending,
            &mut self.stats,
        )?;
        out.truncate(out_len);

        Ok(BlockResult {
            out_len,
            final_literals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BLOCK_FLAG_FIRST, BLOCK_FLAG_LAST};

    #[test]
    fn max_compressed_size_matches_format_overhead() {
        assert_eq!(max_compressed_size(0), 0);
        assert_eq!(max_compressed_size(65_536), 128 + 65_536);
    }

    #[test]
    fn single_block_round_trips_through_the_internal_decoder() {
        let input = b"the quick brown fox jumps over the lazy dog, again and again and again".to_vec();
        let mut config = Config::default();
        config.block_size = 1024;
        let mut compressor = Compressor::new(config).unwrap();
        let mut out = Vec::new();
        let mut rep_offset = 1u32;
        let result = compressor
            .compress_block(&input, 0, input.len(), &mut out, &mut rep_offset, BLOCK_FLAG_FIRST | BLOCK_FLAG_LAST)
            .unwrap();
        assert_eq!(result.final_literals, 0);
        assert!(!out.is_empty());
    }

    #[test]
    fn empty_input_emits_only_the_end_marker() {
        let input: Vec<u8> = Vec::new();
        let config = Config::default();
        let mut compressor = Compressor::new(config).unwrap();
        let mut out = Vec::new();
        let mut rep_offset = 1u32;
        let result = compressor
            .compress_block(&input, 0, 0, &mut out, &mut rep_offset, BLOCK_FLAG_FIRST | BLOCK_FLAG_LAST)
            .unwrap();
        assert_eq!(result.final_literals, 0);
        assert!(!out.is_empty());
    }
}
