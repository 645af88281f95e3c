//! Format constants and the caller-facing [`Config`].
//!
//! Mirrors the constants block at the top of a C ZX0 encoder: magic
//! numbers that fall out of the bitstream format itself (offset range,
//! the end-of-data marker value) live here next to the tunables a caller
//! is allowed to adjust (`max_offset`, `block_size`, …).

/// Smallest encodable offset. The bitstream has no representation for
/// offset 0 (a match must reference at least the previous byte).
pub const MIN_OFFSET: u32 = 1;

/// Largest encodable offset.
///
/// Derived from the bitstream format, not chosen arbitrarily: the high
/// part of an offset is `((offset - 1) >> 7) + 1`, and `256` is reserved
/// as the end-of-data marker, so the high part must stay in `1..=255`.
/// That bounds `offset - 1` to `0..=32639`, i.e. `offset <= 32640`.
pub const MAX_OFFSET: u32 = 32_640;

/// Gamma value that marks end-of-data when emitted as a match's high
/// offset part. One past the largest valid high part (`255`).
pub const EOD_MARKER: u32 = 256;

/// Minimum encodable match length (shorter runs are always literals).
pub const MIN_MATCH_LEN: u32 = 2;

/// Upper bound on the length of a single match command.
///
/// The Elias-gamma length field has no format-imposed ceiling, but the
/// reduce pass's adjacent-merge rewrite (§4.7) needs *some* finite bound
/// to reason about "does this merge still fit one command", so
/// implementations cap match length well below any block size they'll
/// realistically see.
pub const MAX_VARLEN: u32 = 0x00FF_FFFF;

/// Matches at or above this length are never shortened during optimal
/// parse enumeration — always considered at full length.
pub const LEAVE_ALONE_MATCH_SIZE: u32 = 32;

/// Cap on rep-match forward extension (longest common prefix scan).
pub const LCP_MAX: u32 = 65_536;

/// Default per-block size, clamped to `[1024, BLOCK_SIZE]`.
pub const BLOCK_SIZE: usize = 1 << 20;

/// Slots searched/stored per position in the match table.
pub const NMATCHES_PER_INDEX: usize = 16;

/// Default number of parallel arrivals (`K`) carried per position.
///
/// The first optimal-parse pass runs at `K / 2`; the second at the full
/// `K`. Must be even so both reserved bands (`K - 1` for rep arrivals,
/// `K - 2` for non-rep arrivals) stay distinct from the halved count.
pub const DEFAULT_NUM_ARRIVALS: usize = 8;

/// High bit of a match-table `depth` field: marks an entry added by
/// supplementation pass A, letting later length-extension target it
/// specifically.
pub const DEPTH_SUPPLEMENTED: u16 = 0x4000;

/// Configuration flag: encode the high part of match offsets using
/// inverted Elias-gamma (data bits flipped) rather than plain gamma.
pub const FLG_IS_INVERTED: u32 = 0x01;

/// Block flag: this is the first block of the stream (elides the
/// leading "literals follow" token before the very first command).
pub const BLOCK_FLAG_FIRST: u32 = 0x01;

/// Block flag: this is the last block of the stream (emits the
/// end-of-data marker after the last command).
pub const BLOCK_FLAG_LAST: u32 = 0x02;

/// Caller-facing knobs for a [`crate::compressor::Compressor`].
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Maximum back-reference distance. `0` selects [`MAX_OFFSET`].
    pub max_offset: u32,
    /// Bitwise-OR of the `FLG_*` constants above.
    pub flags: u32,
    /// Bytes at the start of the input window that are reference-only
    /// (never themselves emitted as literals or match targets).
    pub dictionary_size: usize,
    /// Per-block size, clamped into `[1024, BLOCK_SIZE]`.
    pub block_size: usize,
    /// Number of parallel arrivals (`K`) carried per position during
    /// the second (final) optimal-parse pass.
    pub num_arrivals: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_offset: 0,
            flags: 0,
            dictionary_size: 0,
            block_size: BLOCK_SIZE,
            num_arrivals: DEFAULT_NUM_ARRIVALS,
        }
    }
}

impl Config {
    /// Resolved maximum offset: `0` maps to the format maximum, and any
    /// caller-supplied value is clamped to it.
    pub fn resolved_max_offset(&self) -> u32 {
        if self.max_offset == 0 {
            MAX_OFFSET
        } else {
            self.max_offset.min(MAX_OFFSET)
        }
    }

    /// Resolved block size, clamped into `[1024, BLOCK_SIZE]`.
    pub fn resolved_block_size(&self) -> usize {
        self.block_size.clamp(1024, BLOCK_SIZE)
    }

    /// Resolved arrival count, rounded up to an even number so the two
    /// reserved bands (`K - 1`, `K - 2`) never collide and the halved
    /// first-pass width stays a whole number.
    pub fn resolved_num_arrivals(&self) -> usize {
        let k = self.num_arrivals.max(2);
        if k % 2 == 0 {
            k
        } else {
            k + 1
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.flags & FLG_IS_INVERTED != 0
    }
}
