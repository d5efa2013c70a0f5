//! Tree walking evaluator
//!
//! Statements run in source order against a stack of call frames (see `Variables`) and a global
//! function table. Every `দেখাও` is written to the sink as it happens and recorded as an effect.

#[allow(clippy::module_inception)]
mod eval;
mod value;

pub use eval::{run, stack_size, Eval, Outcome, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
pub use value::Value;
