#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! The skogur parsing engine.
//!
//! An Earley–Scott parser over the [`skogur_core`] grammar model:
//! cubic worst-case recognition of arbitrary (including highly
//! ambiguous) context-free grammars, producing a shared packed parse
//! forest that represents every derivation of the input compactly.

pub mod dump;
pub mod earley;


// Re-export commonly used items at crate root
pub use dump::dump_forest;
pub use earley::{
    AllocSnapshot, Column, Family, IdentityMatcher, Label, NodeDict, NoopTracer, ParseError,
    ParseStats, Parser, PrintTracer, SENTINEL_TOKEN, SppfNode, State, StateArena, StateId,
    TokenMatcher, Tracer, alloc_snapshot, num_combinations,
};
