#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core grammar model for the skogur parser.
//!
//! A grammar is a dense table of nonterminals (negative ids) owning ordered
//! production lists over terminals (positive ids). Grammars are produced by
//! an external compiler and shipped as a compact binary file; this crate
//! owns the in-memory model and the binary format.

pub mod grammar;

// Re-export commonly used items at crate root
pub use grammar::{
    Grammar, GrammarBuilder, GrammarError, MAX_PRODUCTION_LEN, Nonterminal, ProdId, Production,
    SIGNATURE, SIGNATURE_LEN, Symbol,
};
