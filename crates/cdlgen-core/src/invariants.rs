//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

pub(crate) fn ensure_extent(axis: usize, start: usize, count: usize, declsize: usize) {
    if start + count > declsize {
        panic!(
            "odometer axis {axis}: start {start} + count {count} exceeds declared size {declsize}"
        );
    }
}

pub(crate) fn ensure_positive_budget(budget: usize) {
    if budget == 0 {
        panic!("block iterator needs a non-zero byte budget");
    }
}
