//! # Weft Expression
//!
//! Parses directive attribute values into keypaths and filter chains.
//!
//! The grammar is small: a dotted keypath whose segments may be quoted
//! (so keys containing spaces or dots stay addressable), followed by an
//! optional pipe-separated filter chain where each filter takes literal
//! or keypath arguments:
//!
//! ```text
//! person.'full name' | uppercase | limit 3
//! ```
//!
//! Resolution against a data view (and the filter registry) lives in the
//! engine; this crate only produces the parsed form.

pub mod error;
pub mod expression;
pub mod tokenizer;

pub use error::{ExprError, ExprResult};
pub use expression::{Arg, Expression, FilterCall};
