//! Literal data: constants, datalists and the cursor that walks them.

mod constant;
mod datalist;
mod datasrc;

#[cfg(test)]
mod datasrc_tests;

pub use constant::{Constant, Value};
pub use datalist::{Datalist, DatalistId};
pub use datasrc::Datasrc;
