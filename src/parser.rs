//! The optimal forward parser: a single left-to-right sweep
//! maintaining `K` arrivals per position, exploring literal, non-rep
//! match, and rep-match transitions.

use crate::arrival::{Arrival, ArrivalTable};
use crate::config::{LCP_MAX, LEAVE_ALONE_MATCH_SIZE, MIN_MATCH_LEN};
use crate::cost;
use crate::forward_rep::{self, VisitedTable};
use crate::matchtable::MatchTable;

/// Chosen parse at one block position: `length == 0` is a literal,
/// `length < 0` marks a position absorbed into the preceding match
/// (written only by the reducer), `length > 0` is a match/rep-match of
/// that length at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestMatch {
    pub offset: u32,
    pub length: i32,
}

impl BestMatch {
    pub const LITERAL: BestMatch = BestMatch { offset: 0, length: 0 };
    pub const ABSORBED: BestMatch = BestMatch { offset: 0, length: -1 };
}

fn rep_extend(input: &[u8], pos: u32, rep_offset: u32, end: usize, rle: &[u32]) -> u32 {
    let p = pos as usize;
    let o = rep_offset as usize;
    if p < o || input[p] != input[p - o] {
        return 0;
    }
    // Both positions start a run of the same byte (confirmed above), so
    // the shorter of the two runs is matched length for free. `rle` is
    // indexed absolutely over the whole input window (see
    // `rle::compute_rle_lengths`), same as `pos`/`pos - rep_offset`.
    let skip = if p - o < rle.len() && p < rle.len() {
        rle[p - o].min(rle[p])
    } else {
        1
    } as usize;
    let cap = (end - p).min(LCP_MAX as usize);
    let mut n = skip.min(cap);
    while n < cap && input[p + n] == input[p - o + n] {
        n += 1;
    }
    n as u32
}

/// Runs one full sweep over `[block_start, block_end)`, returning the
/// populated arrival table. When `insert_forward_reps` is set, every
/// non-rep match transition considered also triggers
/// [`forward_rep::insert_forward_match`], annotating the match table
/// for the *next* sweep rather than this one.
#[allow(clippy::too_many_arguments)]
pub fn optimal_forward(
    input: &[u8],
    end: usize,
    block_start: u32,
    block_end: u32,
    insert_forward_reps: bool,
    rep_offset_in: u32,
    num_arrivals: usize,
    match_table: &mut MatchTable,
    rle: &[u32],
    visited: &mut VisitedTable,
    max_offset: u32,
    arrivals: &mut ArrivalTable,
) {
    let stride = num_arrivals;
    let num_positions = (block_end - block_start) as usize + 1;
    arrivals.reset(block_start, num_positions, stride);
    arrivals.reset_start(block_start, rep_offset_in);
    if insert_forward_reps {
        visited.clear();
    }

    for i in block_start..block_end {
        let row: Vec<Arrival> = arrivals
            .row(i)
            .iter()
            .copied()
            .take_while(|a| !a.is_empty())
            .collect();
        if row.is_empty() {
            continue;
        }

        // Literal transition: every live arrival carries forward by one byte.
        for (slot, a) in row.iter().enumerate() {
            let penalty = if a.num_literals == 0 { cost::MODE_SWITCH_PENALTY } else { 0 };
            let succ = Arrival {
                cost: a.cost + cost::literal_byte_cost(a.num_literals) + penalty,
                from_pos: i,
                from_slot: slot as i32 + 1,
                match_len: 0,
                num_literals: a.num_literals + 1,
                rep_offset: a.rep_offset,
                rep_pos: a.rep_pos,
                score: a.score,
            };
            arrivals.try_insert(i + 1, stride, succ);
        }

        // Non-rep match transitions, including cheap depth-synonym coverage.
        let matches: Vec<(u32, u32, bool)> = {
            let mrow = match_table.row(i);
            let mut out = Vec::new();
            for m in mrow.iter().take_while(|m| !m.is_empty()) {
                let len = m.raw_length();
                if len < MIN_MATCH_LEN {
                    continue;
                }
                let approx = m.is_approximate();
                out.push((m.offset, len, approx));
                let synonyms = m.depth & 0x3FFF;
                if synonyms > 0 && m.offset > synonyms as u32 {
                    out.push((m.offset - synonyms as u32, len, approx));
                }
            }
            out
        };

        for (offset, length, approx) in matches {
            if offset == 0 || offset > max_offset {
                continue;
            }
            let k_start = if length >= LEAVE_ALONE_MATCH_SIZE { length } else { MIN_MATCH_LEN };
            for k in k_start..=length {
                if i + k > block_end {
                    continue;
                }
                let mut best: Option<(usize, &Arrival)> = None;
                for (slot, a) in row.iter().enumerate() {
                    if a.rep_offset == offset && a.num_literals != 0 {
                        continue;
                    }
                    match best {
                        Some((_, b)) if b.cost <= a.cost => {}
                        _ => best = Some((slot, a)),
                    }
                }
                let Some((slot, a)) = best else { continue };
                let approx_penalty = if approx { 1 } else { 0 };
                let succ = Arrival {
                    cost: a.cost + cost::COMMAND_TOKEN_COST + cost::offset_cost(offset) + cost::match_length_cost_norep(k),
                    from_pos: i,
                    from_slot: slot as i32 + 1,
                    match_len: k,
                    num_literals: 0,
                    rep_offset: offset,
                    rep_pos: i,
                    score: a.score + 3 + approx_penalty,
                };
                arrivals.try_insert(i + k, stride - 2, succ);
            }

            if insert_forward_reps {
                forward_rep::insert_forward_match(
                    input,
                    block_start,
                    end,
                    &*arrivals,
                    match_table,
                    visited,
                    rle,
                    i,
                    offset,
                    forward_rep::DEFAULT_DEPTH,
                );
            }
        }

        // Rep-match transitions.
        let rep_candidates: Vec<(usize, u32, u32)> = row
            .iter()
            .enumerate()
            .filter_map(|(slot, a)| {
                if a.rep_offset == 0 {
                    return None;
                }
                let len = rep_extend(input, i, a.rep_offset, end, rle);
                if len >= MIN_MATCH_LEN {
                    Some((slot, a.rep_offset, len))
                } else {
                    None
                }
            })
            .collect();

        if !rep_candidates.is_empty() {
            let max_len = rep_candidates.iter().map(|&(_, _, l)| l).max().unwrap();
            // Every integer landing length gets its own arrival, not just
            // the lengths at which the gamma length-field cost grows: a
            // later literal or match can depart from any of them, and
            // skipping one would make the forward sweep miss a reachable,
            // possibly cheaper, parse state.
            for k in MIN_MATCH_LEN..=max_len {
                if i + k > block_end {
                    continue;
                }
                let mut best: Option<(usize, u32)> = None;
                for &(slot, _, len) in &rep_candidates {
                    if len < k {
                        continue;
                    }
                    let a = &row[slot];
                    match best {
                        Some((bslot, _)) if row[bslot].cost <= a.cost => {}
                        _ => best = Some((slot, a.cost)),
                    }
                }
                let Some((slot, _)) = best else { continue };
                let a = &row[slot];
                let succ = Arrival {
                    cost: a.cost + cost::COMMAND_TOKEN_COST + cost::match_length_cost_rep(k),
                    from_pos: i,
                    from_slot: slot as i32 + 1,
                    match_len: k,
                    num_literals: 0,
                    rep_offset: a.rep_offset,
                    rep_pos: a.rep_pos,
                    score: a.score + 2,
                };
                arrivals.try_insert(i + k, stride - 1, succ);
            }
        }
    }
}

/// Backward walk from the block-end slot-0 arrival to block start,
/// populating the best-match array. Only meaningful on the final pass
/// (`insert_forward_reps == false`).
pub fn backward_walk(arrivals: &ArrivalTable, block_start: u32, block_end: u32) -> Vec<BestMatch> {
    let len = (block_end - block_start) as usize;
    let mut best = vec![BestMatch::LITERAL; len];
    let mut pos = block_end;
    let mut slot: i32 = 0;
    loop {
        let a = arrivals.get(pos, slot as usize);
        if a.from_slot == -1 {
            break;
        }
        let from_pos = a.from_pos;
        let from_slot = a.from_slot - 1;
        if a.match_len > 0 {
            best[(from_pos - block_start) as usize] = BestMatch {
                offset: a.rep_offset,
                length: a.match_len as i32,
            };
            for p in (from_pos + 1)..pos {
                best[(p - block_start) as usize] = BestMatch::ABSORBED;
            }
        } else {
            best[(from_pos - block_start) as usize] = BestMatch::LITERAL;
        }
        pos = from_pos;
        slot = from_slot;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchtable::{MatchEntry, MatchTable};
    use crate::rle;

    /// Every command length, literal or match, walked from `best` sums
    /// back up to the block length with no gaps or overlaps.
    fn coverage(best: &[BestMatch]) -> usize {
        let mut covered = 0usize;
        let mut i = 0usize;
        while i < best.len() {
            match best[i].length {
                0 => {
                    covered += 1;
                    i += 1;
                }
                n if n > 0 => {
                    covered += n as usize;
                    i += n as usize;
                }
                _ => panic!("sweep landed on an absorbed slot at {i}"),
            }
        }
        covered
    }

    #[test]
    fn incompressible_input_parses_as_all_literals() {
        let input: Vec<u8> = (0..32u32).map(|i| (i * 37 + 11) as u8).collect();
        let end = input.len();
        let rle = rle::compute_rle_lengths(&input, end);
        let mut table = MatchTable::new(0, end);
        let mut visited = VisitedTable::new(0, end + 1);
        let mut arrivals = ArrivalTable::new(0, end + 1, 4);
        optimal_forward(&input, end, 0, end as u32, false, 0, 4, &mut table, &rle, &mut visited, crate::config::MAX_OFFSET, &mut arrivals);
        let best = backward_walk(&arrivals, 0, end as u32);
        assert!(best.iter().all(|b| b.length == 0));
        assert_eq!(coverage(&best), end);
    }

    #[test]
    fn repeated_byte_run_parses_with_full_coverage() {
        let input = vec![b'a'; 64];
        let end = input.len();
        let rle = rle::compute_rle_lengths(&input, end);
        let mut table = MatchTable::new(0, end);
        for i in 1..end {
            let len = ((end - i).min(u16::MAX as usize)) as u32;
            table.row_mut(i as u32)[0] = MatchEntry {
                offset: 1,
                length: len as u16,
                depth: 0,
                approximate: false,
            };
        }
        let mut visited = VisitedTable::new(0, end + 1);
        let mut arrivals = ArrivalTable::new(0, end + 1, 8);
        optimal_forward(&input, end, 0, end as u32, true, 0, 4, &mut table, &rle, &mut visited, crate::config::MAX_OFFSET, &mut arrivals);
        optimal_forward(&input, end, 0, end as u32, false, 0, 8, &mut table, &rle, &mut visited, crate::config::MAX_OFFSET, &mut arrivals);
        let best = backward_walk(&arrivals, 0, end as u32);
        assert_eq!(best[0].length, 0, "nothing precedes position 0, so it must be a literal");
        assert_eq!(coverage(&best), end);
        assert!(best.iter().any(|b| b.length > 0), "a 64-byte run of one byte must use at least one match");
    }

    #[test]
    fn rep_extend_stops_at_first_mismatch() {
        let input = b"abcabcabX".to_vec();
        let end = input.len();
        let rle = rle::compute_rle_lengths(&input, end);
        // offset 3 at position 6 matches "abc" vs "abc" for 2 bytes, then 'X' != 'c'.
        let len = rep_extend(&input, 6, 3, end, &rle);
        assert_eq!(len, 2);
    }
}
