//! Combination and array expansion
//!
//! Two independent algorithms that share cell normalization: full
//! cartesian-product generation over parameter columns, and `[]`-marked
//! column fan-out into array elements.

pub mod cartesian;
pub mod expand;

pub use cartesian::combine;
pub use expand::expand_into;
