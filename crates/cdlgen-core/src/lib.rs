#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for cdlgen.
//!
//! Everything here is independent of the symbol table:
//! - **Type codes** (`NcType`): the netCDF primitive and user type classes
//! - **Scalars** (`Scalar`): primitive values and C-style conversion between them
//! - **Fill values**: the fixed per-type default sentinels
//! - **Layout**: native sizes and probed struct alignments
//! - **Iteration**: the `Odometer` and the budgeted `BlockIter` used for chunked writes

pub mod blockiter;
pub mod fill;
pub mod layout;
pub mod nctype;
pub mod odometer;
pub mod scalar;

mod invariants;

#[cfg(test)]
mod layout_tests;
#[cfg(test)]
mod scalar_tests;

pub use blockiter::{Block, BlockIter};
pub use nctype::NcType;
pub use odometer::{Odometer, SubOdometer};
pub use scalar::{ConvertError, Scalar};

/// Declared size of an unlimited dimension.
pub const UNLIMITED: usize = 0;
