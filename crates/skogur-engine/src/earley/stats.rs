//! Run statistics and live-object accounting.

use std::cell::Cell;
use std::thread::LocalKey;

/// Counters for a single parse, reset when the parse starts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    /// States taken from the arena, including ones discarded later.
    pub states_allocated: u64,
    /// Candidate states rejected as column duplicates or scanner
    /// mismatches.
    pub states_discarded: u64,
    /// Host matcher invocations (match-cache misses).
    pub matcher_calls: u64,
    /// Node dictionary lookups.
    pub dict_lookups: u64,
    /// Forest nodes created.
    pub nodes_created: u64,
    /// Nullable completions recorded in the H set.
    pub h_recorded: u64,
    /// Columns built (input length plus the sentinel).
    pub columns: u64,
}

/// Live counts for the five parse-owned allocation classes.
///
/// Every count returns to zero once a parse has ended and the host has
/// dropped the returned forest root.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocSnapshot {
    pub nodes: usize,
    pub states: usize,
    pub columns: usize,
    pub chunks: usize,
    pub h_entries: usize,
}

impl AllocSnapshot {
    pub fn is_balanced(&self) -> bool {
        *self == Self::default()
    }
}

// A parse is single-threaded by contract, so plain thread-local cells
// are enough for balance accounting.
thread_local! {
    static LIVE_NODES: Cell<usize> = const { Cell::new(0) };
    static LIVE_STATES: Cell<usize> = const { Cell::new(0) };
    static LIVE_COLUMNS: Cell<usize> = const { Cell::new(0) };
    static LIVE_CHUNKS: Cell<usize> = const { Cell::new(0) };
    static LIVE_H_ENTRIES: Cell<usize> = const { Cell::new(0) };
}

fn bump(key: &'static LocalKey<Cell<usize>>, delta: isize) {
    key.with(|c| c.set(c.get().wrapping_add_signed(delta)));
}

pub(crate) fn adjust_nodes(delta: isize) {
    bump(&LIVE_NODES, delta);
}

pub(crate) fn adjust_states(delta: isize) {
    bump(&LIVE_STATES, delta);
}

pub(crate) fn adjust_columns(delta: isize) {
    bump(&LIVE_COLUMNS, delta);
}

pub(crate) fn adjust_chunks(delta: isize) {
    bump(&LIVE_CHUNKS, delta);
}

pub(crate) fn adjust_h_entries(delta: isize) {
    bump(&LIVE_H_ENTRIES, delta);
}

/// Snapshot of this thread's live parse allocations.
pub fn alloc_snapshot() -> AllocSnapshot {
    AllocSnapshot {
        nodes: LIVE_NODES.with(Cell::get),
        states: LIVE_STATES.with(Cell::get),
        columns: LIVE_COLUMNS.with(Cell::get),
        chunks: LIVE_CHUNKS.with(Cell::get),
        h_entries: LIVE_H_ENTRIES.with(Cell::get),
    }
}
