//! Various helper traits/functions/macros used throughout the crate's code.

pub mod env;
pub mod error;
#[doc(hidden)]
pub mod macros;
