//! Interpreter for a small imperative language with Bengali keywords.
//!
//! ```text
//! ফাংশন যোগ(x, y) {
//!     রিটার্ন(x + y)
//! }
//! z = যোগ(10, 20)
//! দেখাও(z)
//! ```
//!
//! `lang::parse::parse` turns source text into a `Program`, `lang::eval::run` executes one from
//! a clean environment. `lang::runtime::Runtime` does both against a persistent environment.

pub mod input;
pub mod lang;
