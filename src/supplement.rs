//! Match supplementation: two passes that add short matches
//! the match-finder's own search missed, using a 65 536-bucket
//! two-byte-prefix hash plus an intrusive per-position chain — the
//! classic "linked list over indices, not heap nodes" shape called out
//! in the crate's design notes.

use crate::arrival::ArrivalTable;
use crate::config::DEPTH_SUPPLEMENTED;
use crate::forward_rep::{self, VisitedTable};
use crate::matchtable::{MatchEntry, MatchTable};

const PREFIX_TABLE_SIZE: usize = 65_536;
const PASS_A_MAX_LIST_LEN: usize = 15;
const PASS_A_INSERT_CAP: usize = 15;
const PASS_B_MIN_EXISTING_LEN: u32 = 8;
const PASS_B_CACHE_SIZE: usize = 2048;
const PASS_B_INSERT_CAP: usize = 9;
const PASS_A_LENGTH_CAP: u32 = 128;

/// `first_offset_for_byte[b0 * 256 + b1]` is the most recent position
/// whose first two bytes are `(b0, b1)`; `next_offset_for_pos[i]` is
/// the previous position with the same two-byte prefix as `i`.
pub struct PrefixChain {
    start: u32,
    first_offset_for_byte: Vec<i64>,
    next_offset_for_pos: Vec<i64>,
}

impl PrefixChain {
    pub fn build(input: &[u8], start: u32, end: usize) -> Self {
        let mut chain = PrefixChain {
            start,
            first_offset_for_byte: vec![-1i64; PREFIX_TABLE_SIZE],
            next_offset_for_pos: Vec::new(),
        };
        chain.rebuild(input, start, end);
        chain
    }

    /// Rebuilds the chain over a new `[start, end)` window, reusing the
    /// backing allocations (see [`crate::arrival::ArrivalTable::reset`]).
    pub fn rebuild(&mut self, input: &[u8], start: u32, end: usize) {
        self.start = start;
        for h in self.first_offset_for_byte.iter_mut() {
            *h = -1;
        }
        let needed = end - start as usize;
        if self.next_offset_for_pos.len() < needed {
            self.next_offset_for_pos.resize(needed, -1);
        }
        for slot in self.next_offset_for_pos[..needed].iter_mut() {
            *slot = -1;
        }
        for i in (start as usize)..end.saturating_sub(1) {
            let key = (input[i] as usize) << 8 | input[i + 1] as usize;
            let rel = i - start as usize;
            self.next_offset_for_pos[rel] = self.first_offset_for_byte[key];
            self.first_offset_for_byte[key] = i as i64;
        }
    }

    fn next(&self, pos: usize) -> i64 {
        self.next_offset_for_pos[pos - self.start as usize]
    }
}

fn match_len_capped(input: &[u8], a: usize, b: usize, end: usize, cap: u32) -> u32 {
    let max = (end - b).min(cap as usize);
    let mut n = 0usize;
    while n + 4 <= max && input[a + n..a + n + 4] == input[b + n..b + n + 4] {
        n += 4;
    }
    while n < max && input[a + n] == input[b + n] {
        n += 1;
    }
    n as u32
}

fn contains_offset(row: &[MatchEntry], offset: u32) -> bool {
    row.iter()
        .take_while(|m| !m.is_empty())
        .any(|m| m.offset <= offset && offset <= m.offset + (m.depth & !DEPTH_SUPPLEMENTED) as u32)
}

fn first_empty(row: &[MatchEntry]) -> Option<usize> {
    row.iter().position(|m| m.is_empty())
}

/// Pass A: for every position whose match list has fewer than 15
/// entries, walk its two-byte chain and insert up to 15 additional
/// short matches tagged [`DEPTH_SUPPLEMENTED`].
pub fn pass_a(
    input: &[u8],
    block_start: u32,
    block_end: usize,
    max_offset: u32,
    chain: &PrefixChain,
    table: &mut MatchTable,
) {
    for i in (block_start as usize)..block_end {
        let existing_len = table.len(i as u32);
        if existing_len >= PASS_A_MAX_LIST_LEN {
            continue;
        }
        let mut inserted = 0usize;
        let mut cand = chain.next(i);
        while cand >= 0 && inserted < PASS_A_INSERT_CAP {
            let c = cand as usize;
            let offset = (i - c) as u32;
            cand = chain.next(c);
            if offset == 0 || offset > max_offset {
                continue;
            }
            let row = table.row(i as u32);
            if contains_offset(row, offset) {
                continue;
            }
            let len = match_len_capped(input, c, i, block_end, PASS_A_LENGTH_CAP);
            if len < 2 {
                continue;
            }
            let row = table.row_mut(i as u32);
            if let Some(slot) = first_empty(row) {
                row[slot] = MatchEntry {
                    offset,
                    length: len.min(u16::MAX as u32) as u16,
                    depth: DEPTH_SUPPLEMENTED,
                    approximate: false,
                };
                inserted += 1;
            } else {
                break;
            }
        }
    }
}

/// Pass B: for positions whose best existing match is shorter than 8,
/// either extend a cached pass-A hit or verify+insert a fresh candidate
/// and immediately project it forward via [`forward_rep::insert_forward_match`].
#[allow(clippy::too_many_arguments)]
pub fn pass_b(
    input: &[u8],
    end: usize,
    block_start: u32,
    block_end: usize,
    max_offset: u32,
    chain: &PrefixChain,
    table: &mut MatchTable,
    arrivals: &ArrivalTable,
    visited: &mut VisitedTable,
    rle: &[u32],
) {
    let mut offset_cache = vec![0u32; PASS_B_CACHE_SIZE];
    for i in (block_start as usize)..block_end {
        let row = table.row(i as u32);
        let best_len = row.first().map(|m| m.raw_length()).unwrap_or(0);
        if best_len >= PASS_B_MIN_EXISTING_LEN {
            continue;
        }
        for m in row.iter().take_while(|m| !m.is_empty()) {
            offset_cache[(i + m.offset as usize) % PASS_B_CACHE_SIZE] = m.offset;
        }

        let mut inserted = 0usize;
        let mut cand = chain.next(i);
        while cand >= 0 && inserted < PASS_B_INSERT_CAP {
            let c = cand as usize;
            let offset = (i - c) as u32;
            cand = chain.next(c);
            if offset == 0 || offset > max_offset {
                continue;
            }
            if table.len(i as u32) >= crate::config::NMATCHES_PER_INDEX {
                break;
            }
            let cache_slot = (i + offset as usize) % PASS_B_CACHE_SIZE;
            if offset_cache[cache_slot] == offset {
                // Already known at this position; try to extend a
                // pass-A insertion in place rather than re-verify it.
                let row = table.row_mut(i as u32);
                if let Some(m) = row.iter_mut().find(|m| m.offset == offset && m.is_supplemented()) {
                    let len = match_len_capped(input, c, i, block_end, PASS_A_LENGTH_CAP);
                    if len > m.length as u32 {
                        m.length = len.min(u16::MAX as u32) as u16;
                    }
                }
                continue;
            }
            // Verify a short forward extension actually matches before
            // paying for the full length scan.
            let probe_end = (i + 5).min(block_end);
            let probe_start = i + 2;
            if probe_start >= probe_end || c + (probe_end - i) > end {
                continue;
            }
            let verified = (probe_start..probe_end).any(|p| input[p] == input[p - offset as usize]);
            if !verified {
                continue;
            }
            let len = match_len_capped(input, c, i, block_end, PASS_A_LENGTH_CAP);
            if len < 2 {
                continue;
            }
            let row = table.row_mut(i as u32);
            if let Some(slot) = first_empty(row) {
                row[slot] = MatchEntry {
                    offset,
                    length: len.min(u16::MAX as u32) as u16,
                    depth: 0,
                    approximate: false,
                };
                inserted += 1;
                forward_rep::insert_forward_match(
                    input,
                    block_start,
                    end,
                    arrivals,
                    table,
                    visited,
                    rle,
                    i as u32,
                    offset,
                    forward_rep::SUPPLEMENT_DEPTH,
                );
            } else {
                break;
            }
        }
    }
}
