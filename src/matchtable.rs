//! The match table: up to [`NMATCHES_PER_INDEX`] candidate matches per
//! input position, written by the match-finder and supplementation
//! passes, read by the optimal parser.

use crate::config::NMATCHES_PER_INDEX;

/// One candidate match at a position.
///
/// `length == 0` terminates the list for that position, and the full
/// 16 bits of `length` are significant (a match-finder is free to
/// report the entire `0..=65535` range, e.g. a 65535-byte run of one
/// repeated byte). The low 14 bits of `depth` count consecutive
/// shorter-offset synonyms sharing this entry's length; bit 14
/// ([`crate::config::DEPTH_SUPPLEMENTED`]) marks a
/// supplementation-pass-A insertion. `approximate` is carried as its
/// own field rather than stolen from a `length` bit, since a match
/// length needs every bit of the `u16` to represent the format's full
/// range.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEntry {
    pub offset: u32,
    pub length: u16,
    pub depth: u16,
    /// Set by a match-finder that reports an approximate/supplemented
    /// length, for the parser's scoring penalty.
    pub approximate: bool,
}

impl MatchEntry {
    pub const EMPTY: MatchEntry = MatchEntry {
        offset: 0,
        length: 0,
        depth: 0,
        approximate: false,
    };

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn raw_length(&self) -> u32 {
        self.length as u32
    }

    pub fn is_approximate(&self) -> bool {
        self.approximate
    }

    pub fn is_supplemented(&self) -> bool {
        self.depth & crate::config::DEPTH_SUPPLEMENTED != 0
    }
}

/// Arena + index storage for the match table: `position * stride +
/// slot`, one flat `Vec`, no per-position heap allocation.
pub struct MatchTable {
    start: u32,
    stride: usize,
    data: Vec<MatchEntry>,
}

impl MatchTable {
    pub fn new(start: u32, num_positions: usize) -> Self {
        MatchTable {
            start,
            stride: NMATCHES_PER_INDEX,
            data: vec![MatchEntry::EMPTY; num_positions * NMATCHES_PER_INDEX],
        }
    }

    /// Re-bases this table onto a new `(start, num_positions)` pair,
    /// reusing the backing `Vec`'s allocation when possible (see
    /// [`crate::arrival::ArrivalTable::reset`]).
    pub fn reset(&mut self, start: u32, num_positions: usize) {
        self.start = start;
        let needed = num_positions * self.stride;
        if self.data.len() < needed {
            self.data.resize(needed, MatchEntry::EMPTY);
        } else {
            for m in self.data[..needed].iter_mut() {
                *m = MatchEntry::EMPTY;
            }
        }
    }

    fn base(&self, pos: u32) -> usize {
        (pos - self.start) as usize * self.stride
    }

    pub fn row(&self, pos: u32) -> &[MatchEntry] {
        let b = self.base(pos);
        &self.data[b..b + self.stride]
    }

    pub fn row_mut(&mut self, pos: u32) -> &mut [MatchEntry] {
        let b = self.base(pos);
        &mut self.data[b..b + self.stride]
    }

    pub fn len(&self, pos: u32) -> usize {
        self.row(pos).iter().take_while(|m| !m.is_empty()).count()
    }
}
