//! Configuration loader and schema types.
//!
//! The genre table, artist rules, normalizer location and output naming are
//! all settings rather than constants, so a run can be pointed at any folder
//! layout.

mod load;
mod schema;

pub use schema::*;
