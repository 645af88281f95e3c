//! Concrete [`MatchFinder`]: three-byte hash buckets plus an intrusive
//! per-position chain, walked from the most recent same-hash position
//! backward. Suffix-array/LCP-interval construction is the textbook
//! alternative for this role, but a hash-chain finder is a simpler,
//! always-available implementation of the trait and needs no external
//! build step.

use super::MatchFinder;
use crate::config::NMATCHES_PER_INDEX;
use crate::error::Error;
use crate::matchtable::{MatchEntry, MatchTable};

const HASH_LOG: u32 = 17;
const HASH_SIZE: usize = 1 << HASH_LOG;

/// How many same-hash predecessors to walk before giving up on a
/// position. Bounds worst-case search cost on pathological (highly
/// repetitive) input.
const MAX_CHAIN_DEPTH: usize = 256;

#[inline]
fn hash3(a: u8, b: u8, c: u8) -> u32 {
    let v = (a as u32) | ((b as u32) << 8) | ((c as u32) << 16);
    (v.wrapping_mul(2_654_435_761)) >> (32 - HASH_LOG)
}

/// Hash-chain based [`MatchFinder`].
///
/// `head[h]` holds the most recent position whose 3-byte prefix hashes
/// to `h`, or `-1`. `prev[i]` holds the previous position sharing `i`'s
/// hash bucket, or `-1`. Both are built once, eagerly, over the whole
/// input window: because `prev[i]` only ever references positions
/// `< i`, a single left-to-right pass computes the same structure an
/// incremental insert-as-you-go builder would, so `skip` has nothing
/// left to do once `build` has run.
pub struct ChainMatchFinder {
    max_offset: u32,
    head: Vec<i64>,
    prev: Vec<i64>,
}

impl ChainMatchFinder {
    pub fn new(max_offset: u32) -> Self {
        ChainMatchFinder {
            max_offset,
            head: Vec::new(),
            prev: Vec::new(),
        }
    }

    fn match_len(input: &[u8], a: usize, b: usize, end: usize) -> usize {
        let max = (end - b).min(crate::config::LCP_MAX as usize);
        let mut n = 0;
        while n < max && input[a + n] == input[b + n] {
            n += 1;
        }
        n
    }
}

impl MatchFinder for ChainMatchFinder {
    fn build(&mut self, input: &[u8], end: usize) -> Result<(), Error> {
        self.head = vec![-1i64; HASH_SIZE];
        self.prev = vec![-1i64; end];
        if end < 3 {
            return Ok(());
        }
        for i in 0..end - 2 {
            let h = hash3(input[i], input[i + 1], input[i + 2]) as usize;
            self.prev[i] = self.head[h];
            self.head[h] = i as i64;
        }
        Ok(())
    }

    fn skip(&mut self, _start: usize, _dict_end: usize) {
        // `build` already indexes the whole window, dictionary prefix
        // included; nothing to defer.
    }

    fn find_all(
        &mut self,
        input: &[u8],
        max_per_position: usize,
        block_start: usize,
        block_end: usize,
        _block_flags: u32,
        table: &mut MatchTable,
    ) {
        let max_per_position = max_per_position.min(NMATCHES_PER_INDEX);
        for i in block_start..block_end {
            let row = table.row_mut(i as u32);
            for slot in row.iter_mut() {
                *slot = MatchEntry::EMPTY;
            }
            if block_end - i < 2 || i >= self.prev.len() {
                continue;
            }
            let mut found: Vec<(u32, u32)> = Vec::new();
            let mut cand = self.prev[i];
            let mut depth = 0;
            while cand >= 0 && depth < MAX_CHAIN_DEPTH {
                let c = cand as usize;
                let offset = (i - c) as u32;
                if offset > self.max_offset {
                    break;
                }
                let len = Self::match_len(input, c, i, block_end);
                if len >= 2 {
                    found.push((offset, len as u32));
                }
                cand = self.prev[c];
                depth += 1;
            }
            found.sort_by_key(|&(offset, _)| offset);
            found.dedup_by_key(|&mut (offset, _)| offset);
            found.truncate(max_per_position);
            for (slot, (offset, len)) in row.iter_mut().zip(found.into_iter()) {
                *slot = MatchEntry {
                    offset,
                    length: len.min(u16::MAX as u32) as u16,
                    depth: 0,
                    approximate: false,
                };
            }
        }
    }

    fn destroy(&mut self) {
        self.head.clear();
        self.prev.clear();
    }
}
