//! Earley–Scott recogniser and forest builder.
//!
//! The pieces, leaves first: a chunked [`StateArena`] for short-lived
//! parser states, the [`sppf`](self) node store with per-column
//! dictionary, hash-indexed [`Column`]s, and the [`Parser`] main loop
//! tying them together.

mod arena;
mod column;
mod error;
mod parser;
mod sppf;
mod stats;
mod trace;

#[cfg(test)]
mod column_tests;

pub use arena::{State, StateArena, StateId};
pub use column::{Column, SENTINEL_TOKEN};
pub use error::ParseError;
pub use parser::{IdentityMatcher, Parser, TokenMatcher};
pub use sppf::{Family, Label, NodeDict, SppfNode, num_combinations};
pub use stats::{AllocSnapshot, ParseStats, alloc_snapshot};
pub use trace::{NoopTracer, PrintTracer, Tracer};
