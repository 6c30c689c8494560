//! Budgeted hyperslab iteration for chunked array writes.
//!
//! Given an array shape, the element size and a byte budget, `BlockIter`
//! picks the slowest axis whose trailing sub-array no longer fits the budget
//! and yields `(start, count)` hyperslabs holding as many complete rows of
//! that axis as fit. Axes to the left are stepped one index at a time by an
//! [`Odometer`]; the last block along the split axis may be a short leftover.

use crate::invariants::ensure_positive_budget;
use crate::odometer::Odometer;

/// One hyperslab: `start[i] .. start[i] + count[i]` on every axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub start: Vec<usize>,
    pub count: Vec<usize>,
}

impl Block {
    /// Number of elements in the block.
    pub fn len(&self) -> usize {
        self.count.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug)]
pub struct BlockIter {
    dims: Vec<usize>,
    /// Axis split into row groups.
    split: usize,
    /// Rows of `split` per full block.
    rows: usize,
    /// Steps axes `[0, split)`; absent when `split == 0`.
    outer: Option<Odometer>,
    /// Next start index along `split`.
    row: usize,
    done: bool,
}

impl BlockIter {
    /// # Panics
    /// If `budget` is zero.
    pub fn new(dims: &[usize], value_size: usize, budget: usize) -> Self {
        ensure_positive_budget(budget);
        let rank = dims.len();
        let empty = dims.contains(&0);

        let mut prod = value_size.max(1);
        let mut i = rank;
        while i > 0 && prod.saturating_mul(dims[i - 1]) <= budget {
            prod *= dims[i - 1];
            i -= 1;
        }
        let (split, rows) = if i == 0 {
            (0, dims.first().copied().unwrap_or(1))
        } else {
            (i - 1, (budget / prod).max(1))
        };

        let outer = (split > 0 && !empty).then(|| Odometer::new(&dims[..split], None, None));
        Self {
            dims: dims.to_vec(),
            split,
            rows,
            outer,
            row: 0,
            done: empty,
        }
    }

    /// Rows of the split axis buffered per full block.
    pub fn rows(&self) -> usize {
        self.rows
    }
}

impl Iterator for BlockIter {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        if self.done {
            return None;
        }
        let rank = self.dims.len();
        if rank == 0 {
            self.done = true;
            return Some(Block {
                start: Vec::new(),
                count: Vec::new(),
            });
        }

        let mut start = vec![0; rank];
        let mut count = self.dims.clone();
        if let Some(outer) = &self.outer {
            for axis in 0..self.split {
                start[axis] = outer.index(axis);
                count[axis] = 1;
            }
        }
        let extent = self.dims[self.split];
        let n = self.rows.min(extent - self.row);
        start[self.split] = self.row;
        count[self.split] = n;

        self.row += n;
        if self.row >= extent {
            self.row = 0;
            match &mut self.outer {
                Some(outer) => {
                    outer.incr();
                    if !outer.more() {
                        self.done = true;
                    }
                }
                None => self.done = true,
            }
        }
        Some(Block { start, count })
    }
}
