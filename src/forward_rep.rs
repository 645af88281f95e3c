//! Forward-rep injection: while parsing, proactively
//! project a considered match's offset forward to every position
//! reachable from it via a rep-match, so the optimal parser can later
//! *see* that saving as a concrete match-table entry rather than only
//! being able to reason about one rep-offset at a time.

use crate::arrival::ArrivalTable;
use crate::matchtable::{MatchEntry, MatchTable};

/// Default recursion budget for injection triggered from within the
/// optimal parser's own sweep.
pub const DEFAULT_DEPTH: u32 = 9;

/// Recursion budget for injection triggered from supplementation pass
/// B, one shallower than the parser's own budget.
pub const SUPPLEMENT_DEPTH: u32 = 8;

/// Per-position memoisation of "offsets already projected through
/// here", so the same `(position, offset)` pair is never re-explored.
/// `outer` is the offset of the top-level call that reached this
/// position; `inner` is the offset carried by a nested recursive call.
/// Both default to `0`, an offset value the format never uses.
#[derive(Default, Clone, Copy)]
struct VisitedEntry {
    outer: u32,
    inner: u32,
}

pub struct VisitedTable {
    start: u32,
    entries: Vec<VisitedEntry>,
}

impl VisitedTable {
    pub fn new(start: u32, num_positions: usize) -> Self {
        VisitedTable {
            start,
            entries: vec![VisitedEntry::default(); num_positions],
        }
    }

    pub fn clear(&mut self) {
        for e in self.entries.iter_mut() {
            *e = VisitedEntry::default();
        }
    }

    /// Re-bases this table onto a new `(start, num_positions)` pair,
    /// reusing the backing `Vec`'s allocation when possible (see
    /// [`crate::arrival::ArrivalTable::reset`]).
    pub fn reset(&mut self, start: u32, num_positions: usize) {
        self.start = start;
        if self.entries.len() < num_positions {
            self.entries.resize(num_positions, VisitedEntry::default());
        } else {
            for e in self.entries[..num_positions].iter_mut() {
                *e = VisitedEntry::default();
            }
        }
    }

    fn idx(&self, pos: u32) -> usize {
        (pos - self.start) as usize
    }

    fn already_visited(&self, pos: u32, offset: u32, top_level: bool) -> bool {
        let e = self.entries[self.idx(pos)];
        if top_level {
            e.outer == offset
        } else {
            e.inner == offset
        }
    }

    fn mark(&mut self, pos: u32, offset: u32, top_level: bool) {
        let e = &mut self.entries[self.idx(pos)];
        if top_level {
            e.outer = offset;
        } else {
            e.inner = offset;
        }
    }
}

fn forward_extend(input: &[u8], rep_pos: usize, offset: usize, end: usize, rle: &[u32]) -> usize {
    if rep_pos < offset {
        return 0;
    }
    let cap = (end - rep_pos).min(rle[rep_pos] as usize);
    let mut n = 0usize;
    while n + 8 <= cap && input[rep_pos + n..rep_pos + n + 8] == input[rep_pos + n - offset..rep_pos + n - offset + 8] {
        n += 8;
    }
    while n + 4 <= cap && input[rep_pos + n..rep_pos + n + 4] == input[rep_pos + n - offset..rep_pos + n - offset + 4] {
        n += 4;
    }
    while n < cap && input[rep_pos + n] == input[rep_pos + n - offset] {
        n += 1;
    }
    n
}

fn insert_match(table: &mut MatchTable, pos: u32, offset: u32, length: u32) -> bool {
    let row = table.row_mut(pos);
    let mut empty_slot = None;
    for (i, m) in row.iter().enumerate() {
        if m.offset == offset && !m.is_empty() {
            return length > m.raw_length() && m.depth == 0;
        }
        if m.is_empty() && empty_slot.is_none() {
            empty_slot = Some(i);
        }
    }
    if let Some(i) = empty_slot {
        row[i] = MatchEntry {
            offset,
            length: length.min(u16::MAX as u32) as u16,
            depth: 0,
            approximate: false,
        };
        true
    } else {
        false
    }
}

fn upgrade_match(table: &mut MatchTable, pos: u32, offset: u32, length: u32) {
    let row = table.row_mut(pos);
    for m in row.iter_mut() {
        if m.offset == offset {
            m.length = length.min(u16::MAX as u32) as u16;
            return;
        }
    }
}

/// Projects `offset` forward from position `at` to every position
/// reachable as a future rep-match, inserting synthesised match-table
/// entries and recursing up to `depth_budget` levels.
///
/// `at` is the position where `offset` is being *considered* as a
/// match candidate; the entries this inserts land at earlier positions
/// (each arrival's `rep_pos`), to be picked up by the *next* full
/// optimal-parse sweep over the block, not the sweep currently in
/// progress at `at`.
#[allow(clippy::too_many_arguments)]
pub fn insert_forward_match(
    input: &[u8],
    block_start: u32,
    end: usize,
    arrivals: &ArrivalTable,
    table: &mut MatchTable,
    visited: &mut VisitedTable,
    rle: &[u32],
    at: u32,
    offset: u32,
    depth_budget: u32,
) {
    project(
        input, block_start, end, arrivals, table, visited, rle, at, offset, depth_budget, true,
    );
}

#[allow(clippy::too_many_arguments)]
fn project(
    input: &[u8],
    block_start: u32,
    end: usize,
    arrivals: &ArrivalTable,
    table: &mut MatchTable,
    visited: &mut VisitedTable,
    rle: &[u32],
    at: u32,
    offset: u32,
    depth_budget: u32,
    top_level: bool,
) {
    if depth_budget == 0 {
        return;
    }
    let rep_positions: Vec<u32> = arrivals
        .row(at)
        .iter()
        .take_while(|a| !a.is_empty())
        .filter(|a| a.rep_offset != 0 && a.rep_offset != offset)
        .map(|a| a.rep_pos)
        .collect();

    for rep_pos in rep_positions {
        if rep_pos < block_start || rep_pos + 1 >= end as u32 || rep_pos < offset {
            continue;
        }
        if visited.already_visited(rep_pos, offset, top_level) {
            continue;
        }
        let src = rep_pos as usize;
        if input[src] != input[src - offset as usize] {
            continue;
        }
        let len = forward_extend(input, src, offset as usize, end, rle);
        if len < 2 {
            continue;
        }
        visited.mark(rep_pos, offset, top_level);
        let inserted = insert_match(table, rep_pos, offset, len as u32);
        if inserted {
            upgrade_match(table, rep_pos, offset, len as u32);
            project(
                input,
                block_start,
                end,
                arrivals,
                table,
                visited,
                rle,
                rep_pos,
                offset,
                depth_budget - 1,
                false,
            );
        }
    }
}
