//! Mixed-radix multi-dimensional index generator.
//!
//! An `Odometer` owns one `{declsize, start, count, index}` record per axis.
//! Sub-odometers are `SubOdometer` views naming an axis range `[from, to)` of
//! that arena. Stepping a view mutates the shared axes, so the parent sees
//! every index a nested walk produced.

use crate::invariants::ensure_extent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Axis {
    declsize: usize,
    start: usize,
    count: usize,
    index: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Odometer {
    axes: Vec<Axis>,
}

/// View over the axes `[from, to)` of an [`Odometer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubOdometer {
    from: usize,
    to: usize,
}

impl Odometer {
    /// Build an odometer over `declsizes`.
    ///
    /// `start` defaults to all zeros and `count` to the full declared size.
    ///
    /// # Panics
    /// If `declsizes` is empty or any axis has `start + count > declsize`.
    pub fn new(declsizes: &[usize], start: Option<&[usize]>, count: Option<&[usize]>) -> Self {
        assert!(!declsizes.is_empty(), "odometer needs at least one axis");
        let axes = declsizes
            .iter()
            .enumerate()
            .map(|(i, &declsize)| {
                let start = start.map_or(0, |s| s[i]);
                let count = count.map_or(declsize - start.min(declsize), |c| c[i]);
                ensure_extent(i, start, count, declsize);
                Axis {
                    declsize,
                    start,
                    count,
                    index: start,
                }
            })
            .collect();
        Self { axes }
    }

    pub fn rank(&self) -> usize {
        self.axes.len()
    }

    /// View over every axis.
    pub fn whole(&self) -> SubOdometer {
        SubOdometer {
            from: 0,
            to: self.rank(),
        }
    }

    /// View over axes `[from, to)`, sharing this odometer's state.
    pub fn sub(&self, from: usize, to: usize) -> SubOdometer {
        assert!(
            from < to && to <= self.rank(),
            "sub-odometer range {from}..{to} outside rank {}",
            self.rank()
        );
        SubOdometer { from, to }
    }

    pub fn more(&mut self) -> bool {
        self.whole().more(self)
    }

    pub fn incr(&mut self) -> usize {
        self.whole().incr(self)
    }

    pub fn offset(&self) -> usize {
        self.whole().offset(self)
    }

    pub fn index(&self, axis: usize) -> usize {
        self.axes[axis].index
    }

    pub fn indices(&self) -> Vec<usize> {
        self.axes.iter().map(|a| a.index).collect()
    }

    pub fn start(&self, axis: usize) -> usize {
        self.axes[axis].start
    }

    pub fn count(&self, axis: usize) -> usize {
        self.axes[axis].count
    }

    pub fn declsize(&self, axis: usize) -> usize {
        self.axes[axis].declsize
    }

    /// Restrict `axis` to `[start, start + count)` and rewind it.
    pub fn set_extent(&mut self, axis: usize, start: usize, count: usize) {
        let a = &mut self.axes[axis];
        ensure_extent(axis, start, count, a.declsize);
        a.start = start;
        a.count = count;
        a.index = start;
    }
}

impl SubOdometer {
    pub fn rank(self) -> usize {
        self.to - self.from
    }

    /// True while the view's first axis is inside its extent.
    ///
    /// On exhaustion the first axis is rewound to `start`, so the view is
    /// fresh the next time a parent walk reaches it.
    pub fn more(self, odom: &mut Odometer) -> bool {
        let axis = &mut odom.axes[self.from];
        if axis.index < axis.start + axis.count {
            return true;
        }
        axis.index = axis.start;
        false
    }

    /// Step the last axis, carrying toward `from`.
    ///
    /// Returns the most significant axis that changed. The first axis is never
    /// rewound here; `more` does that.
    pub fn incr(self, odom: &mut Odometer) -> usize {
        let mut i = self.to - 1;
        loop {
            let axis = &mut odom.axes[i];
            axis.index += 1;
            if axis.index < axis.start + axis.count || i == self.from {
                return i;
            }
            axis.index = axis.start;
            i -= 1;
        }
    }

    /// Row-major offset of the current position within the view.
    ///
    /// Every axis but the first uses its `declsize` as radix.
    pub fn offset(self, odom: &Odometer) -> usize {
        odom.axes[self.from..self.to]
            .iter()
            .fold(0, |acc, axis| acc * axis.declsize + axis.index)
    }
}
