//! Chunked allocation arena for parser states.
//!
//! States are numerous and short-lived: they are bump-allocated in
//! fixed-size chunks and freed in one sweep when the parse ends. The most
//! recent allocation can be taken back in O(1), which is the common case
//! when a candidate state turns out to be a column duplicate.

use std::rc::Rc;

use skogur_core::ProdId;

use super::sppf::SppfNode;
use super::stats;

/// States per chunk.
pub(crate) const STATE_CHUNK: usize = 2048;

/// Index of a state in its arena.
pub type StateId = u32;

/// An Earley item `(nt, production, dot, start)` plus the forest node
/// carrying the derivation of the consumed prefix.
#[derive(Debug, Clone)]
pub struct State {
    pub nt: i32,
    pub prod: ProdId,
    pub dot: u32,
    pub start: u32,
    pub node: Option<Rc<SppfNode>>,
    /// Next state in the same hash bucket, or in the pending-scanner
    /// list; a state is never on both.
    pub next: Option<StateId>,
    /// Next state waiting on the same nonterminal (completer chain).
    pub nt_next: Option<StateId>,
}

impl State {
    pub fn new(nt: i32, prod: ProdId, dot: u32, start: u32, node: Option<Rc<SppfNode>>) -> Self {
        Self {
            nt,
            prod,
            dot,
            start,
            node,
            next: None,
            nt_next: None,
        }
    }

    /// Two states are the same item iff nonterminal, production, dot,
    /// start and node identity all coincide.
    pub fn same_item(&self, other: &State) -> bool {
        self.nt == other.nt
            && self.prod == other.prod
            && self.dot == other.dot
            && self.start == other.start
            && match (&self.node, &other.node) {
                (None, None) => true,
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                _ => false,
            }
    }
}

/// Bump allocator over a list of fixed-size chunks.
#[derive(Debug, Default)]
pub struct StateArena {
    chunks: Vec<Vec<State>>,
    allocated: u64,
    discarded: u64,
}

impl StateArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live states (allocated minus reclaimed).
    pub fn len(&self) -> usize {
        match self.chunks.split_last() {
            Some((last, rest)) => rest.len() * STATE_CHUNK + last.len(),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Total allocations over the arena's lifetime.
    pub fn allocated(&self) -> u64 {
        self.allocated
    }

    /// Candidates handed to [`discard`](Self::discard).
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn alloc(&mut self, state: State) -> StateId {
        if self.chunks.last().is_none_or(|c| c.len() == STATE_CHUNK) {
            self.chunks.push(Vec::with_capacity(STATE_CHUNK));
            stats::adjust_chunks(1);
        }
        let id = self.len() as StateId;
        self.chunks
            .last_mut()
            .expect("chunk list cannot be empty here")
            .push(state);
        self.allocated += 1;
        stats::adjust_states(1);
        id
    }

    #[inline]
    pub fn get(&self, id: StateId) -> &State {
        &self.chunks[id as usize / STATE_CHUNK][id as usize % STATE_CHUNK]
    }

    #[inline]
    pub fn get_mut(&mut self, id: StateId) -> &mut State {
        &mut self.chunks[id as usize / STATE_CHUNK][id as usize % STATE_CHUNK]
    }

    /// Discard a rejected candidate. The slot is reclaimed immediately
    /// when `id` is the most recent allocation; older states are only
    /// counted and swept with the arena.
    pub fn discard(&mut self, id: StateId) {
        self.discarded += 1;
        if id as usize + 1 != self.len() {
            return;
        }
        let last = self
            .chunks
            .last_mut()
            .expect("discard on an empty arena");
        last.pop();
        stats::adjust_states(-1);
        if last.is_empty() {
            self.chunks.pop();
            stats::adjust_chunks(-1);
        }
    }
}

impl Drop for StateArena {
    fn drop(&mut self) {
        stats::adjust_states(-(self.len() as isize));
        stats::adjust_chunks(-(self.chunks.len() as isize));
    }
}
