//! Earley sets: one column per input position.
//!
//! A column holds the states active at its position in a hash table with
//! per-bucket enumeration cursors, a per-nonterminal chain for the
//! completer, a predictor seen-flag per nonterminal, a tri-state
//! token/terminal match cache and the pending-scanner list feeding the
//! next column.

use std::rc::Rc;

use skogur_core::Grammar;

use super::arena::{State, StateArena, StateId};
use super::parser::TokenMatcher;
use super::stats;

/// Fixed prime bucket count for the per-column state table.
pub(crate) const NUM_BUCKETS: usize = 997;

/// Token id of the sentinel column; never matches any terminal.
pub const SENTINEL_TOKEN: u32 = u32::MAX;

// Match-cache cell encoding.
const CACHE_KNOWN: u8 = 0b01;
const CACHE_MATCHED: u8 = 0b10;

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    head: Option<StateId>,
    tail: Option<StateId>,
    /// Next state to hand out during enumeration; `None` once the chain
    /// is drained (re-armed when a state is appended).
    cursor: Option<StateId>,
}

pub struct Column {
    index: u32,
    token: u32,
    buckets: Vec<Bucket>,
    num_states: u32,
    nt_heads: Vec<Option<StateId>>,
    predicted: Vec<bool>,
    /// One byte per terminal (slot 0 unused); present only while the
    /// parser is working on this column or the one before it.
    cache: Option<Vec<u8>>,
    matcher_calls: u64,
    scan_head: Option<StateId>,
    enum_bucket: usize,
}

impl Column {
    pub fn new(index: u32, token: u32, num_nonterminals: u32) -> Self {
        stats::adjust_columns(1);
        Self {
            index,
            token,
            buckets: vec![Bucket::default(); NUM_BUCKETS],
            num_states: 0,
            nt_heads: vec![None; num_nonterminals as usize],
            predicted: vec![false; num_nonterminals as usize],
            cache: None,
            matcher_calls: 0,
            scan_head: None,
            enum_bucket: 0,
        }
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn token(&self) -> u32 {
        self.token
    }

    pub fn num_states(&self) -> u32 {
        self.num_states
    }

    pub fn is_empty(&self) -> bool {
        self.num_states == 0
    }

    /// Acquire the match cache. Idempotent: the previous column's scanner
    /// pass may already have acquired it.
    pub fn start_parse(&mut self, num_terminals: u32) {
        if self.cache.is_none() {
            self.cache = Some(vec![0; num_terminals as usize + 1]);
        }
    }

    /// Release the match cache.
    pub fn stop_parse(&mut self) {
        self.cache = None;
    }

    fn nt_index(&self, nt: i32) -> usize {
        (-(nt as i64) - 1) as usize
    }

    /// Predictor gate: true exactly once per nonterminal per column.
    pub fn mark_seen(&mut self, nt: i32) -> bool {
        let idx = self.nt_index(nt);
        let first = !self.predicted[idx];
        self.predicted[idx] = true;
        first
    }

    /// Head of the chain of states whose dot symbol is `nt`.
    pub fn nt_head(&self, nt: i32) -> Option<StateId> {
        self.nt_heads[self.nt_index(nt)]
    }

    /// Insert a state unless an equal item is already present. On
    /// success, a state whose dot symbol is a nonterminal is prepended to
    /// that nonterminal's chain.
    pub fn add_state(&mut self, sid: StateId, arena: &mut StateArena, grammar: &Grammar) -> bool {
        let (hash, dot_symbol) = {
            let s = arena.get(sid);
            (item_hash(s), grammar.production(s.prod).symbol_at(s.dot))
        };
        let b = hash % NUM_BUCKETS;

        let mut cur = self.buckets[b].head;
        while let Some(other) = cur {
            let o = arena.get(other);
            if o.same_item(arena.get(sid)) {
                return false;
            }
            cur = o.next;
        }

        arena.get_mut(sid).next = None;
        match self.buckets[b].tail {
            Some(tail) => arena.get_mut(tail).next = Some(sid),
            None => self.buckets[b].head = Some(sid),
        }
        self.buckets[b].tail = Some(sid);
        if self.buckets[b].cursor.is_none() {
            self.buckets[b].cursor = Some(sid);
        }
        self.num_states += 1;

        if dot_symbol < 0 {
            let idx = self.nt_index(dot_symbol);
            arena.get_mut(sid).nt_next = self.nt_heads[idx];
            self.nt_heads[idx] = Some(sid);
        }
        true
    }

    /// Next not-yet-processed state: round-robin over the buckets
    /// resuming at the last bucket consulted, insertion order within a
    /// bucket. States added mid-scan are seen in the same pass; a full
    /// idle cycle ends the enumeration.
    pub fn next_state(&mut self, arena: &StateArena) -> Option<StateId> {
        for k in 0..NUM_BUCKETS {
            let b = (self.enum_bucket + k) % NUM_BUCKETS;
            if let Some(sid) = self.buckets[b].cursor {
                self.buckets[b].cursor = arena.get(sid).next;
                self.enum_bucket = b;
                return Some(sid);
            }
        }
        None
    }

    /// Restart enumeration from the beginning (used to extract final
    /// states once the main loop is done).
    pub fn reset_enum(&mut self) {
        for b in &mut self.buckets {
            b.cursor = b.head;
        }
        self.enum_bucket = 0;
    }

    /// Does `terminal` match this column's token? Cached so the host
    /// matcher runs at most once per (column, terminal) pair. The
    /// sentinel column never matches and never calls the matcher.
    pub fn matches<M: TokenMatcher>(&mut self, matcher: &M, handle: u64, terminal: u32) -> bool {
        if self.token == SENTINEL_TOKEN {
            return false;
        }
        let cache = self
            .cache
            .as_mut()
            .expect("match cache queried outside start_parse/stop_parse");
        let Some(cell) = cache.get_mut(terminal as usize) else {
            // terminal id outside the grammar's declared range
            return false;
        };
        if *cell & CACHE_KNOWN == 0 {
            self.matcher_calls += 1;
            let matched = matcher.matches(handle, self.token, terminal);
            *cell = CACHE_KNOWN | if matched { CACHE_MATCHED } else { 0 };
        }
        *cell & CACHE_MATCHED != 0
    }

    pub fn matcher_calls(&self) -> u64 {
        self.matcher_calls
    }

    /// Thread a matched state onto the pending-scanner list.
    pub fn queue_scan(&mut self, sid: StateId, arena: &mut StateArena) {
        arena.get_mut(sid).next = self.scan_head;
        self.scan_head = Some(sid);
    }

    pub fn has_scan(&self) -> bool {
        self.scan_head.is_some()
    }

    /// Pop the head of the pending-scanner list.
    pub fn take_scan(&mut self, arena: &StateArena) -> Option<StateId> {
        let sid = self.scan_head?;
        self.scan_head = arena.get(sid).next;
        Some(sid)
    }
}

impl Drop for Column {
    fn drop(&mut self) {
        stats::adjust_columns(-1);
    }
}

/// Hash over the five-tuple that defines state identity.
fn item_hash(s: &State) -> usize {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    h = mix(h, s.nt as u32 as u64);
    h = mix(h, s.prod as u64);
    h = mix(h, s.dot as u64);
    h = mix(h, s.start as u64);
    h = mix(
        h,
        s.node.as_ref().map_or(0, |n| Rc::as_ptr(n) as usize as u64),
    );
    h as usize
}

fn mix(h: u64, v: u64) -> u64 {
    (h ^ v).wrapping_mul(0x0000_0100_0000_01b3)
}
