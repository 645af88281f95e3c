//! The match-finder contract: the one polymorphism boundary in this
//! crate. Everything downstream of it (supplementation, the optimal
//! parser, the reducer, the emitter) only ever sees entries already
//! written into a [`crate::matchtable::MatchTable`].

pub mod chain;

use crate::error::Error;
use crate::matchtable::MatchTable;

/// Narrow capability set a match-finder must provide. `build`/`skip`
/// establish the search index over an input window; `find_all` writes
/// candidate matches for every position in a range.
pub trait MatchFinder {
    /// Builds whatever index this finder needs over `input[0..end)`.
    fn build(&mut self, input: &[u8], end: usize) -> Result<(), Error>;

    /// Advances the finder past `[0, dict_end)` dictionary bytes
    /// without emitting candidates for them.
    fn skip(&mut self, start: usize, dict_end: usize);

    /// Writes up to `max_per_position` entries per position in
    /// `[block_start, block_end)` into `table`, sorted by offset
    /// ascending. `block_flags` carries the first/last bits from
    /// [`crate::config::BLOCK_FLAG_FIRST`] / `_LAST`, available to
    /// finders that special-case block edges.
    fn find_all(
        &mut self,
        input: &[u8],
        max_per_position: usize,
        block_start: usize,
        block_end: usize,
        block_flags: u32,
        table: &mut MatchTable,
    );

    /// Releases any resources the finder owns. Idempotent.
    fn destroy(&mut self);
}
