//! The post-parse reduce pass: idempotent local rewrites over the
//! chosen parse, run to a fixed point. Implements four local rewrites
//! plus a length-1 special case.

use crate::config::{LEAVE_ALONE_MATCH_SIZE, MAX_VARLEN, MIN_MATCH_LEN};
use crate::cost;
use crate::parser::BestMatch;

const MAX_PASSES: u32 = 20;

fn command_cost(offset: u32, length: u32, rep_offset: u32) -> u32 {
    if rep_offset != 0 && offset == rep_offset {
        cost::COMMAND_TOKEN_COST + cost::match_length_cost_rep(length)
    } else {
        cost::COMMAND_TOKEN_COST + cost::offset_cost(offset) + cost::match_length_cost_norep(length)
    }
}

fn bytes_equal(input: &[u8], a: usize, b: usize, n: usize) -> bool {
    input[a..a + n] == input[b..b + n]
}

/// One left-to-right pass over `best`, applying whichever local
/// rewrites strictly (or, for ties, per the documented rule) shorten
/// the eventual bitstream. Returns whether anything changed.
pub fn pass(input: &[u8], block_start: u32, rep_offset_in: u32, best: &mut [BestMatch]) -> bool {
    let block_start = block_start as usize;
    let len = best.len();
    let mut did_reduce = false;
    let mut num_literals: u32 = 0;
    let mut rep_offset = rep_offset_in;
    let mut follows_literal = false;
    let mut i = 0usize;

    while i < len {
        // Rule 1: grow-1 -- a literal immediately preceding a match that
        // would itself extend under the match's offset folds into it
        // when the extra length-gamma bit cost is within the 8 bits the
        // literal's own byte would otherwise cost.
        if follows_literal
            && best[i].length == 0
            && i + 1 < len
            && best[i + 1].length >= MIN_MATCH_LEN as i32
            && (best[i + 1].length as u32) < MAX_VARLEN
            && best[i + 1].offset != 0
        {
            let off = best[i + 1].offset as usize;
            let l = best[i + 1].length as u32;
            if i >= off && block_start + i + l as usize + 1 <= block_start + len {
                let a = block_start + i - off;
                let b = block_start + i;
                if bytes_equal(input, a, b, l as usize + 1) {
                    let next_offset = best[i + 1].offset;
                    let is_rep = rep_offset != 0 && next_offset == rep_offset;
                    let cur_len_size = if is_rep { cost::match_length_cost_rep(l) } else { cost::match_length_cost_norep(l) };
                    let reduced_len_size = if is_rep {
                        cost::match_length_cost_rep(l + 1)
                    } else {
                        cost::match_length_cost_norep(l + 1)
                    };
                    if reduced_len_size.saturating_sub(cur_len_size) <= 8 {
                        best[i].length = l as i32 + 1;
                        best[i].offset = next_offset;
                        best[i + 1] = BestMatch::LITERAL;
                        did_reduce = true;
                        follows_literal = false;
                        continue;
                    }
                }
            }
        }

        if best[i].length >= MIN_MATCH_LEN as i32 {
            let mut m_offset = best[i].offset;
            let m_length = best[i].length as u32;

            // Rule 2: if the active rep-offset reaches the same bytes,
            // adopt it -- a rep-match is always at least as cheap.
            if m_offset != rep_offset
                && rep_offset != 0
                && i >= rep_offset as usize
                && i >= m_offset as usize
                && i + m_length as usize <= len
                && bytes_equal(
                    input,
                    block_start + i - rep_offset as usize,
                    block_start + i - m_offset as usize,
                    m_length as usize,
                )
            {
                best[i].offset = rep_offset;
                m_offset = rep_offset;
                did_reduce = true;
            }

            // Locate the command following this one, skipping literals,
            // needed by both the short-match-to-literals rewrite and the
            // forward offset adoption below.
            let next_index_if_match = i + m_length as usize;
            let mut next_index = next_index_if_match;
            let mut next_literals = 0u32;
            while next_index < len && best[next_index].length == 0 {
                next_literals += 1;
                next_index += 1;
            }
            let next_is_match = next_index < len && best[next_index].length >= MIN_MATCH_LEN as i32;

            // Rule 2, forward half: a following match may use an offset
            // that also reaches backward into this match's bytes; taking
            // it here can turn the following command into a rep-match.
            if next_is_match && follows_literal && next_index_if_match < len {
                let next_offset = best[next_index].offset;
                if next_offset != m_offset
                    && next_offset != rep_offset
                    && i >= next_offset as usize
                    && next_index_if_match >= next_offset as usize
                {
                    let max_len = {
                        let mut n = 0usize;
                        while n < m_length as usize
                            && input[block_start + i - next_offset as usize + n]
                                == input[block_start + i - m_offset as usize + n]
                        {
                            n += 1;
                        }
                        n
                    };
                    if max_len >= m_length as usize {
                        best[i].offset = next_offset;
                        did_reduce = true;
                    } else if max_len >= 2 {
                        let before = command_cost(m_offset, m_length, rep_offset)
                            + cost::literals_header_cost(next_literals.max(1))
                            + next_literals * 8;
                        let shortfall = m_length as usize - max_len;
                        let after = command_cost(next_offset, max_len as u32, rep_offset)
                            + cost::literals_header_cost((next_literals as usize + shortfall).max(1) as u32)
                            + (next_literals as usize + shortfall) as u32 * 8;
                        if after < before {
                            for j in max_len..m_length as usize {
                                best[i + j] = BestMatch::LITERAL;
                            }
                            best[i].offset = next_offset;
                            best[i].length = max_len as i32;
                            did_reduce = true;
                        }
                    }
                }
            }

            let m_offset = best[i].offset;
            let m_length = best[i].length as u32;

            // Rule 3: a short match may cost more than re-coding its
            // bytes as literals plus whatever command follows it.
            if m_length < 9 && follows_literal && next_is_match {
                let cur_cmd = (if num_literals != 0 {
                    cost::literals_header_cost(num_literals) + num_literals * 8
                } else {
                    0
                }) + command_cost(m_offset, m_length, rep_offset);

                let next_offset = best[next_index].offset;
                let next_length = best[next_index].length as u32;
                let next_cmd = (if next_literals != 0 {
                    cost::literals_header_cost(next_literals) + next_literals * 8
                } else {
                    0
                }) + command_cost(next_offset, next_length, m_offset);

                let original = cur_cmd + next_cmd;

                let total_literals = num_literals + m_length + next_literals;
                let reduced = m_length * 8
                    + cost::literals_header_cost(total_literals.max(1))
                    + (num_literals + next_literals) * 8
                    + command_cost(next_offset, next_length, rep_offset);

                if original >= reduced {
                    for j in 0..m_length as usize {
                        best[i + j] = BestMatch::LITERAL;
                    }
                    did_reduce = true;
                    follows_literal = false;
                    continue;
                }
            }

            // Rule 4: two adjacent matches whose combined bytes line up
            // may merge into a single, longer match.
            if next_index_if_match < len
                && best[next_index_if_match].offset > 0
                && best[next_index_if_match].length >= MIN_MATCH_LEN as i32
                && m_offset > 0
            {
                let next_offset = best[next_index_if_match].offset;
                let next_length = best[next_index_if_match].length as u32;
                let combined = m_length + next_length;
                if combined >= LEAVE_ALONE_MATCH_SIZE
                    && combined <= MAX_VARLEN
                    && next_index_if_match > m_offset as usize
                    && next_index_if_match > next_offset as usize
                    && next_index_if_match + next_length as usize <= len
                {
                    let a = block_start + next_index_if_match - m_offset as usize;
                    let b = block_start + next_index_if_match - next_offset as usize;
                    if bytes_equal(input, a, b, next_length as usize) {
                        let merged = command_cost(m_offset, combined, rep_offset);
                        let split = command_cost(m_offset, m_length, rep_offset) + command_cost(next_offset, next_length, m_offset);
                        if merged <= split {
                            best[i].length = combined as i32;
                            best[next_index_if_match] = BestMatch::ABSORBED;
                            did_reduce = true;
                            follows_literal = false;
                            continue;
                        }
                    }
                }
            }

            rep_offset = best[i].offset;
            i += best[i].length as usize;
            num_literals = 0;
            follows_literal = false;
        } else if best[i].length == 1 {
            // A length-1 "match" interior to a literal run never pays
            // for itself once its rep-match token and length gamma are
            // counted against just treating the byte as a literal.
            if num_literals > 0 {
                let mut next_index = i + 1;
                let mut next_literals = 0u32;
                while next_index < len && best[next_index].length == 0 {
                    next_literals += 1;
                    next_index += 1;
                }
                if next_literals > 0 {
                    let cur = cost::literals_header_cost(num_literals)
                        + cost::COMMAND_TOKEN_COST
                        + cost::match_length_cost_rep(1)
                        + cost::literals_header_cost(next_literals);
                    let reduced = cost::literals_header_cost(num_literals + 1 + next_literals) + 8;
                    if cur >= reduced {
                        best[i] = BestMatch::LITERAL;
                        did_reduce = true;
                        num_literals = 0;
                        follows_literal = false;
                        i += 1;
                        continue;
                    }
                }
            }
            num_literals = 0;
            follows_literal = false;
            i += 1;
        } else {
            follows_literal = true;
            num_literals += 1;
            i += 1;
        }
    }

    did_reduce
}

/// Runs [`pass`] to a fixed point, capped at [`MAX_PASSES`] iterations
/// as a safety net against an oscillating rewrite (none are expected to
/// oscillate; convergence in practice happens within a handful of
/// passes).
pub fn reduce_to_fixed_point(input: &[u8], block_start: u32, rep_offset_in: u32, best: &mut [BestMatch]) {
    let mut iterations = 0u32;
    while iterations < MAX_PASSES {
        if !pass(input, block_start, rep_offset_in, best) {
            break;
        }
        iterations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_length_one_match_folds_into_literal_run() {
        // Position 3 repeats the byte at position 2 (rep-match of offset 1,
        // length 1) with literals on both sides; folding is cheaper.
        let input = vec![5u8, 9, 3, 3, 9, 9];
        let mut best = vec![
            BestMatch::LITERAL,
            BestMatch::LITERAL,
            BestMatch::LITERAL,
            BestMatch { offset: 1, length: 1 },
            BestMatch::LITERAL,
            BestMatch::LITERAL,
        ];
        let changed = pass(&input, 0, 0, &mut best);
        assert!(changed);
        assert_eq!(best[3].length, 0);
    }

    #[test]
    fn grow_one_folds_trailing_literal_into_following_match() {
        // "Z" followed by eleven 'a's: the literal at index 2 reads the
        // same byte an offset-1 match at index 3 would, and the second
        // literal in the run is the one eligible to fold forward.
        let input = b"Zaaaaaaaaaaa".to_vec();
        assert_eq!(input.len(), 12);
        let mut best = vec![BestMatch::LITERAL; input.len()];
        best[3] = BestMatch { offset: 1, length: 9 };
        for slot in best.iter_mut().skip(4).take(8) {
            *slot = BestMatch::ABSORBED;
        }
        let changed = pass(&input, 0, 0, &mut best);
        assert!(changed);
        assert_eq!(best[2].offset, 1);
        assert_eq!(best[2].length, 10);
        assert_eq!(best[3].length, 0);
    }

    #[test]
    fn already_optimal_parse_is_a_fixed_point() {
        let input = (0..16u32).map(|i| (i * 13 + 1) as u8).collect::<Vec<_>>();
        let mut best = vec![BestMatch::LITERAL; input.len()];
        let changed = pass(&input, 0, 0, &mut best);
        assert!(!changed);
    }
}
