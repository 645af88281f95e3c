// zx0 — optimal-parsing LZ77 compressor core

pub mod arrival;
pub mod bits;
pub mod compressor;
pub mod config;
pub mod cost;
pub mod emit;
pub mod error;
pub mod forward_rep;
pub mod matchfinder;
pub mod matchtable;
pub mod parser;
pub mod reduce;
pub mod rle;
pub mod stats;
pub mod supplement;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level convenience re-exports for the most common API entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// Arena-owning per-block compressor context; the crate's one stateful
/// entry point.
pub use compressor::Compressor;
/// Result of a single [`Compressor::compress_block`] call.
pub use compressor::BlockResult;
/// Worst-case compressed size for a given input length.
pub use compressor::max_compressed_size;

/// Caller-facing tunables (`max_offset`, `flags`, `block_size`, ...).
pub use config::Config;

/// The crate's error type.
pub use error::{Error, FormatViolation, InitFailure};

/// Returned compression statistics.
pub use stats::{RunStat, Stats};

/// The match-finder contract and the bundled concrete implementation.
pub use matchfinder::chain::ChainMatchFinder;
pub use matchfinder::MatchFinder;

/// Format constants a caller may need when sizing buffers or choosing a
/// `Config` (offset bounds, block-flag bits, ...).
pub use config::{
    BLOCK_FLAG_FIRST, BLOCK_FLAG_LAST, BLOCK_SIZE, EOD_MARKER, FLG_IS_INVERTED, MAX_OFFSET,
    MIN_MATCH_LEN, MIN_OFFSET,
};
