//! Parse tracing hooks.
//!
//! The tracer is a generic parameter at every call site, so `NoopTracer`
//! compiles away entirely while `PrintTracer` narrates the parse.

use super::column::SENTINEL_TOKEN;

/// Hooks invoked by the parser as it works through the columns.
#[allow(unused_variables)]
pub trait Tracer {
    /// A column is about to be processed.
    fn trace_column(&mut self, index: u32, token: u32) {}
    /// A nonterminal is predicted for the first time in this column.
    fn trace_predict(&mut self, nt: i32) {}
    /// A production of `nt` completed over `start..end`.
    fn trace_complete(&mut self, nt: i32, start: u32, end: u32) {}
    /// The scanner advanced `count` states over `token`.
    fn trace_scan(&mut self, token: u32, count: usize) {}
    /// The parse cannot continue at `index`.
    fn trace_error(&mut self, index: u32) {}
}

/// Tracer that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// Tracer that narrates to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintTracer;

impl Tracer for PrintTracer {
    fn trace_column(&mut self, index: u32, token: u32) {
        if token == SENTINEL_TOKEN {
            eprintln!("column {index}: <sentinel>");
        } else {
            eprintln!("column {index}: token {token}");
        }
    }

    fn trace_predict(&mut self, nt: i32) {
        eprintln!("  predict {nt}");
    }

    fn trace_complete(&mut self, nt: i32, start: u32, end: u32) {
        eprintln!("  complete {nt} over {start}..{end}");
    }

    fn trace_scan(&mut self, token: u32, count: usize) {
        eprintln!("  scan {token}: {count} advanced");
    }

    fn trace_error(&mut self, index: u32) {
        eprintln!("  stalled at {index}");
    }
}
