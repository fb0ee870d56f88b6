//! The Earley–Scott parser.
//!
//! Recognises arbitrary context-free grammars in cubic worst-case time
//! and builds a shared packed parse forest over every derivation. The
//! main loop follows Scott's SPPF-building formulation of Earley's
//! algorithm: a predictor/completer pass per column, nullable
//! completions carried in a per-column H set, and scanned states
//! advanced in place into the next column.

use std::rc::Rc;

use skogur_core::{Grammar, ProdId};

use super::arena::{State, StateArena, StateId};
use super::column::{Column, SENTINEL_TOKEN};
use super::error::ParseError;
use super::sppf::{Label, NodeDict, SppfNode};
use super::stats::{self, ParseStats};
use super::trace::{NoopTracer, Tracer};

/// Token/terminal matching callback.
///
/// `handle` is an opaque host value identifying the call context. The
/// matcher must be pure in its three arguments for the duration of a
/// parse; the per-column cache guarantees at most one invocation per
/// (column, terminal) pair.
pub trait TokenMatcher {
    fn matches(&self, handle: u64, token: u32, terminal: u32) -> bool;
}

/// Matches a token against the terminal with the same id.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityMatcher;

impl TokenMatcher for IdentityMatcher {
    fn matches(&self, _handle: u64, token: u32, terminal: u32) -> bool {
        token == terminal
    }
}

impl<F> TokenMatcher for F
where
    F: Fn(u64, u32, u32) -> bool,
{
    fn matches(&self, handle: u64, token: u32, terminal: u32) -> bool {
        self(handle, token, terminal)
    }
}

/// Nullable completions recorded while a column is processed: pairs of a
/// completed nonterminal and its derivation node.
#[derive(Debug, Default)]
struct HSet {
    entries: Vec<(i32, Rc<SppfNode>)>,
}

impl HSet {
    fn push(&mut self, nt: i32, node: Rc<SppfNode>) {
        stats::adjust_h_entries(1);
        self.entries.push((nt, node));
    }

    /// Nodes recorded for `nt`, cloned so the caller can push states
    /// while the set keeps growing.
    fn matching(&self, nt: i32) -> Vec<Rc<SppfNode>> {
        self.entries
            .iter()
            .filter(|(h, _)| *h == nt)
            .map(|(_, node)| Rc::clone(node))
            .collect()
    }

    fn clear(&mut self) {
        stats::adjust_h_entries(-(self.entries.len() as isize));
        self.entries.clear();
    }
}

impl Drop for HSet {
    fn drop(&mut self) {
        stats::adjust_h_entries(-(self.entries.len() as isize));
    }
}

/// A parser bound to a grammar and a matcher.
///
/// Single-threaded: one parse runs at a time per instance. The grammar
/// is immutable, so several parsers may share it read-only.
pub struct Parser<'g, M> {
    grammar: &'g Grammar,
    matcher: M,
    stats: ParseStats,
}

impl<'g, M: TokenMatcher> Parser<'g, M> {
    pub fn new(grammar: &'g Grammar, matcher: M) -> Self {
        Self {
            grammar,
            matcher,
            stats: ParseStats::default(),
        }
    }

    /// Counters from the most recent parse.
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Parse `tokens` from nonterminal `start`, returning the forest
    /// root. The root holds the only external reference to the forest;
    /// dropping it tears the whole DAG down.
    pub fn parse(
        &mut self,
        handle: u64,
        start: i32,
        tokens: &[u32],
    ) -> Result<Rc<SppfNode>, ParseError> {
        self.parse_with(handle, start, tokens, &mut NoopTracer)
    }

    /// Like [`parse`](Self::parse), with tracing hooks.
    pub fn parse_with<T: Tracer>(
        &mut self,
        handle: u64,
        start: i32,
        tokens: &[u32],
        tracer: &mut T,
    ) -> Result<Rc<SppfNode>, ParseError> {
        self.stats = ParseStats::default();
        if tokens.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        if start >= 0 || self.grammar.nonterminal(start).is_none() {
            return Err(ParseError::InvalidStart(start));
        }

        let mut run = Run {
            grammar: self.grammar,
            matcher: &self.matcher,
            handle,
            columns: Vec::new(),
            arena: StateArena::new(),
            dict: NodeDict::new(),
            h: HSet::default(),
            stats: ParseStats::default(),
            tracer,
        };
        let result = run.execute(start, tokens);
        run.finish_stats();
        self.stats = run.stats;
        result
    }
}

/// All state owned by one parse: the columns, the state arena, the
/// per-column node dictionary and the H set. Dropped as a unit when the
/// parse returns; only the forest root survives.
struct Run<'g, 'm, 't, M, T> {
    grammar: &'g Grammar,
    matcher: &'m M,
    handle: u64,
    columns: Vec<Column>,
    arena: StateArena,
    dict: NodeDict,
    h: HSet,
    stats: ParseStats,
    tracer: &'t mut T,
}

impl<M: TokenMatcher, T: Tracer> Run<'_, '_, '_, M, T> {
    fn execute(&mut self, start: i32, tokens: &[u32]) -> Result<Rc<SppfNode>, ParseError> {
        let n = tokens.len();
        let num_nts = self.grammar.num_nonterminals();
        self.columns = (0..=n)
            .map(|i| {
                let token = if i < n { tokens[i] } else { SENTINEL_TOKEN };
                Column::new(i as u32, token, num_nts)
            })
            .collect();
        self.stats.columns = (n + 1) as u64;

        self.columns[0].start_parse(self.grammar.num_terminals());
        let initial: Vec<ProdId> = self
            .grammar
            .productions_of(start)
            .map(|(pid, _)| pid)
            .collect();
        for pid in initial {
            self.push_state(0, start, pid, 0, 0, None);
        }

        for i in 0..=n {
            self.columns[i].start_parse(self.grammar.num_terminals());
            self.tracer
                .trace_column(self.columns[i].index(), self.columns[i].token());

            if self.columns[i].is_empty() && !self.columns[i].has_scan() {
                self.tracer.trace_error(i as u32);
                return Err(ParseError::Stalled(i as u32));
            }

            self.process_column(i);

            // per-column transients end here
            self.h.clear();
            self.dict.clear();

            if self.columns[i].has_scan() {
                // never true for the sentinel, so i + 1 is in range
                self.advance_scanned(i);
            }
            self.columns[i].stop_parse();
        }

        self.extract(start, n)
    }

    /// Drain the column, dispatching on the symbol at each state's dot.
    /// Terminal-dot states never enter the table, so only the predictor
    /// and the completer appear here.
    fn process_column(&mut self, i: usize) {
        while let Some(sid) = self.columns[i].next_state(&self.arena) {
            let (nt, prod, dot, start, node) = {
                let s = self.arena.get(sid);
                (s.nt, s.prod, s.dot, s.start, s.node.clone())
            };
            let sym = self.grammar.production(prod).symbol_at(dot);
            if sym < 0 {
                self.predict(i, sym, nt, prod, dot, start, node);
            } else if sym == 0 {
                self.complete(i, nt, prod, start, node);
            } else {
                unreachable!("terminal at dot inside a column table");
            }
        }
    }

    /// Predictor. The first sight of a nonterminal pushes all of its
    /// productions. The H set is consulted on every sight, not just the
    /// first: nullable completions recorded earlier in this column must
    /// reach states that arrive after them.
    #[allow(clippy::too_many_arguments)]
    fn predict(
        &mut self,
        i: usize,
        c: i32,
        nt: i32,
        prod: ProdId,
        dot: u32,
        start: u32,
        node: Option<Rc<SppfNode>>,
    ) {
        if self.columns[i].mark_seen(c) {
            self.tracer.trace_predict(c);
            let prods: Vec<ProdId> = self
                .grammar
                .productions_of(c)
                .map(|(pid, _)| pid)
                .collect();
            for pid in prods {
                self.push_state(i, c, pid, 0, i as u32, None);
            }
        }
        for v in self.h.matching(c) {
            let y = self.make_node(nt, dot + 1, prod, start, i as u32, node.clone(), v);
            self.push_state(i, nt, prod, dot + 1, start, Some(y));
        }
    }

    /// Completer: a production of `nt` finished over `start..i`.
    fn complete(
        &mut self,
        i: usize,
        nt: i32,
        prod: ProdId,
        start: u32,
        node: Option<Rc<SppfNode>>,
    ) {
        let w = match node {
            Some(w) => w,
            None => {
                // an epsilon completion gets its own zero-width node
                let w = self.dict.lookup_or_add(Label {
                    symbol: nt,
                    dot: 0,
                    prod: None,
                    start: i as u32,
                    end: i as u32,
                });
                w.add_family(prod, None, None);
                w
            }
        };
        self.tracer.trace_complete(nt, start, i as u32);

        if start == i as u32 {
            self.h.push(nt, Rc::clone(&w));
            self.stats.h_recorded += 1;
        }

        let mut cur = self.columns[start as usize].nt_head(nt);
        while let Some(ps) = cur {
            let (ps_nt, ps_prod, ps_dot, ps_start, ps_node, ps_next) = {
                let s = self.arena.get(ps);
                (s.nt, s.prod, s.dot, s.start, s.node.clone(), s.nt_next)
            };
            cur = ps_next;
            let y = self.make_node(
                ps_nt,
                ps_dot + 1,
                ps_prod,
                ps_start,
                i as u32,
                ps_node,
                Rc::clone(&w),
            );
            self.push_state(i, ps_nt, ps_prod, ps_dot + 1, ps_start, Some(y));
        }
    }

    /// Advance the queued scanner states over this column's token into
    /// the next column, all sharing a single terminal node. The state
    /// object is incremented in place rather than reallocated, which is
    /// sound because a queued state sits in no column chain and no
    /// family references it.
    fn advance_scanned(&mut self, i: usize) {
        let token = self.columns[i].token();
        let next = i + 1;
        self.columns[next].start_parse(self.grammar.num_terminals());

        let term = SppfNode::new(Label {
            symbol: token as i32,
            dot: 0,
            prod: None,
            start: i as u32,
            end: next as u32,
        });
        self.stats.nodes_created += 1;

        let mut count = 0usize;
        while let Some(sid) = self.columns[i].take_scan(&self.arena) {
            let (nt, prod, dot, start, node) = {
                let s = self.arena.get(sid);
                (s.nt, s.prod, s.dot, s.start, s.node.clone())
            };
            let y = self.make_node(nt, dot + 1, prod, start, next as u32, node, Rc::clone(&term));
            let s = self.arena.get_mut(sid);
            s.dot += 1;
            s.node = Some(y);
            s.next = None;
            s.nt_next = None;
            self.route_state(next, sid);
            count += 1;
        }
        self.tracer.trace_scan(token, count);
        // the transient terminal reference dies here
    }

    /// Allocate a candidate state and route it into `col`.
    fn push_state(
        &mut self,
        col: usize,
        nt: i32,
        prod: ProdId,
        dot: u32,
        start: u32,
        node: Option<Rc<SppfNode>>,
    ) {
        let sid = self.arena.alloc(State::new(nt, prod, dot, start, node));
        self.route_state(col, sid);
    }

    /// Route a state into a column. Nonterminal-or-end dot symbols go
    /// into the column table (duplicates back to the arena); a terminal
    /// dot symbol goes through the column's match cache onto its
    /// pending-scanner list, or back to the arena on mismatch.
    /// Terminal-dot states never enter the table, which is what keeps
    /// the in-place scanner increment sound.
    fn route_state(&mut self, col: usize, sid: StateId) {
        let sym = {
            let s = self.arena.get(sid);
            self.grammar.production(s.prod).symbol_at(s.dot)
        };
        if sym > 0 {
            if self.columns[col].matches(self.matcher, self.handle, sym as u32) {
                self.columns[col].queue_scan(sid, &mut self.arena);
            } else {
                self.arena.discard(sid);
            }
        } else if !self.columns[col].add_state(sid, &mut self.arena, self.grammar) {
            self.arena.discard(sid);
        }
    }

    /// Scott's node constructor: wrap an advanced item's derivation,
    /// sharing via the per-column dictionary. A state that has just
    /// consumed the first of two or more symbols passes its child
    /// through unwrapped.
    #[allow(clippy::too_many_arguments)]
    fn make_node(
        &mut self,
        nt: i32,
        dot_after: u32,
        prod: ProdId,
        start: u32,
        j: u32,
        w: Option<Rc<SppfNode>>,
        v: Rc<SppfNode>,
    ) -> Rc<SppfNode> {
        let len = self.grammar.production(prod).len() as u32;
        if dot_after == 1 && len >= 2 {
            return v;
        }
        let label = if dot_after >= len {
            Label {
                symbol: nt,
                dot: 0,
                prod: None,
                start,
                end: j,
            }
        } else {
            Label {
                symbol: nt,
                dot: dot_after,
                prod: Some(prod),
                start,
                end: j,
            }
        };
        let node = self.dict.lookup_or_add(label);
        node.add_family(prod, w, Some(v));
        node
    }

    /// Find a complete start-symbol state spanning the whole input in
    /// the sentinel column and take its node as the root.
    fn extract(&mut self, start: i32, n: usize) -> Result<Rc<SppfNode>, ParseError> {
        let col = &mut self.columns[n];
        col.reset_enum();
        while let Some(sid) = col.next_state(&self.arena) {
            let s = self.arena.get(sid);
            if s.start == 0
                && s.nt == start
                && self.grammar.production(s.prod).symbol_at(s.dot) == 0
                && let Some(node) = &s.node
            {
                return Ok(Rc::clone(node));
            }
        }
        Err(ParseError::NoParse(n as u32))
    }

    fn finish_stats(&mut self) {
        self.stats.states_allocated = self.arena.allocated();
        self.stats.states_discarded = self.arena.discarded();
        self.stats.dict_lookups = self.dict.lookups();
        self.stats.nodes_created += self.dict.created();
        self.stats.matcher_calls = self.columns.iter().map(Column::matcher_calls).sum();
    }
}
