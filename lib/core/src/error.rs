//! Error handling foundation for habitual.
//!
//! Only the `Result` alias lives here. Each crate defines its own
//! domain error enums in its `error` module and wraps them in a
//! rootcause [`Report`] when they cross a layer boundary.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
