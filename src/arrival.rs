//! The optimal parser's arrival table: an arena-backed 2-D grid indexed
//! by `(position, slot)`, never a pointer graph (see crate-level design
//! notes on arena + index vs. pointer-chasing back-chains).

/// A candidate parse-state at one input position.
///
/// `from_slot` doubles as an "is this arrival populated" flag: `0`
/// means empty, `-1` is the sentinel used only by the block-start
/// arrival (no predecessor), and any other value is `1 +` the real
/// predecessor slot index so that `0` stays free for "empty".
#[derive(Debug, Clone, Copy)]
pub struct Arrival {
    pub cost: u32,
    pub from_pos: u32,
    pub from_slot: i32,
    pub match_len: u32,
    pub num_literals: u32,
    pub rep_offset: u32,
    pub rep_pos: u32,
    pub score: u32,
}

impl Arrival {
    pub const EMPTY: Arrival = Arrival {
        cost: 0,
        from_pos: 0,
        from_slot: 0,
        match_len: 0,
        num_literals: 0,
        rep_offset: 0,
        rep_pos: 0,
        score: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.from_slot == 0
    }
}

/// Flat `position * stride + slot` arena for [`Arrival`]s, covering
/// positions `[start, start + len]` inclusive (the `+1` is the
/// block-end position the backward walk starts from).
pub struct ArrivalTable {
    start: u32,
    stride: usize,
    data: Vec<Arrival>,
}

impl ArrivalTable {
    pub fn new(start: u32, num_positions: usize, stride: usize) -> Self {
        ArrivalTable {
            start,
            stride,
            data: vec![Arrival::EMPTY; num_positions * stride],
        }
    }

    /// Re-bases this table onto a new `(start, num_positions, stride)`
    /// triple, reusing the backing `Vec`'s allocation when it is already
    /// large enough instead of allocating a fresh arena: arenas are sized
    /// once and reused across blocks.
    pub fn reset(&mut self, start: u32, num_positions: usize, stride: usize) {
        self.start = start;
        self.stride = stride;
        let needed = num_positions * stride;
        if self.data.len() < needed {
            self.data.resize(needed, Arrival::EMPTY);
        } else {
            for a in self.data[..needed].iter_mut() {
                *a = Arrival::EMPTY;
            }
        }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    fn base(&self, pos: u32) -> usize {
        (pos - self.start) as usize * self.stride
    }

    pub fn row(&self, pos: u32) -> &[Arrival] {
        let b = self.base(pos);
        &self.data[b..b + self.stride]
    }

    pub fn row_mut(&mut self, pos: u32) -> &mut [Arrival] {
        let b = self.base(pos);
        &mut self.data[b..b + self.stride]
    }

    pub fn get(&self, pos: u32, slot: usize) -> &Arrival {
        &self.row(pos)[slot]
    }

    pub fn reset_start(&mut self, pos: u32, rep_offset: u32) {
        let row = self.row_mut(pos);
        for a in row.iter_mut() {
            *a = Arrival::EMPTY;
        }
        row[0] = Arrival {
            from_slot: -1,
            rep_offset,
            ..Arrival::EMPTY
        };
    }

    /// Inserts `candidate` into position `dest`'s sorted-by-`(cost,
    /// score)` slot array, honoring a reserved band of `usable_slots`
    /// (the caller passes `stride - 1` for rep successors and
    /// `stride - 2` for non-rep successors, to keep at
    /// least one rep-eligible arrival alive through the sweep).
    ///
    /// An existing arrival with the same `rep_offset` and cost `<=`
    /// the candidate's dominates it and the candidate is dropped.
    ///
    /// The shift that makes room for `candidate` stops at the nearest
    /// later slot sharing its `rep_offset` (or the end of the usable
    /// band), rather than always running to the end: that slot is the
    /// one actually displaced, so a same-`rep_offset` arrival collapses
    /// into the new one instead of a distinct-`rep_offset` arrival
    /// sitting further down getting evicted off the end.
    pub fn try_insert(&mut self, dest: u32, usable_slots: usize, candidate: Arrival) {
        let row = self.row_mut(dest);
        let usable = usable_slots.min(row.len());
        for existing in row[..usable].iter() {
            if existing.is_empty() {
                break;
            }
            if existing.rep_offset == candidate.rep_offset && existing.cost <= candidate.cost {
                return;
            }
        }
        let mut insert_at = usable;
        for (i, existing) in row[..usable].iter().enumerate() {
            if existing.is_empty()
                || (candidate.cost, candidate.score) < (existing.cost, existing.score)
            {
                insert_at = i;
                break;
            }
        }
        if insert_at >= usable {
            return;
        }
        let mut z = insert_at;
        while z < usable - 1 && !row[z].is_empty() {
            if row[z].rep_offset == candidate.rep_offset {
                break;
            }
            z += 1;
        }
        for i in (insert_at + 1..=z).rev() {
            row[i] = row[i - 1];
        }
        row[insert_at] = candidate;
    }
}
