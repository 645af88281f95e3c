//! Error type for the block compressor core.

/// Why compressor/arena initialisation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitFailure {
    /// The arrival table could not be sized for the requested
    /// `(block_size, num_arrivals)` pair.
    ArrivalArena,
    /// The match or match-depth table could not be sized for the
    /// requested `(block_size, NMATCHES_PER_INDEX)` pair.
    MatchArena,
    /// A supplementation chain table (`first_offset_for_byte`,
    /// `next_offset_for_pos`, or the pass-B offset cache) could not be
    /// allocated.
    SupplementArena,
    /// The match-finder's own `build` call failed.
    MatchFinder,
}

/// Why a block was rejected as a format constraint violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatViolation {
    /// A candidate match offset fell outside `[MIN_OFFSET,
    /// min(max_offset, MAX_OFFSET)]`.
    OffsetOutOfRange,
    /// The first command of the first block was not a literal run.
    FirstCommandNotLiteral,
}

/// Errors returned by the compressor core.
///
/// A plain, `Copy` error enum rather than a boxed or dynamic error
/// type: callers match on a small closed set of failure kinds and
/// there is no I/O layer beneath this crate that would need
/// `std::error::Error` source chaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Arena or match-finder initialisation failed before any block was
    /// processed. All partially-allocated arenas have already been
    /// freed by the time this is returned.
    Init(InitFailure),
    /// A bit or byte write would have exceeded the supplied output
    /// capacity. The block is incompressible under the current budget;
    /// no partial output should be trusted.
    Overflow,
    /// The block violates a hard format constraint.
    FormatViolation(FormatViolation),
}
