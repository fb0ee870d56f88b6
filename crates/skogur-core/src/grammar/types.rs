//! Grammar type definitions.

use serde::{Deserialize, Serialize};

/// Symbol reference within a production.
///
/// Negative values are nonterminal ids, positive values are terminal ids,
/// and 0 marks the end of a production (the "dot at end" sentinel).
pub type Symbol = i32;

/// Index into a grammar's flat production table.
pub type ProdId = u32;

/// Largest right-hand side the binary format accepts.
pub const MAX_PRODUCTION_LEN: usize = 256;

/// A single production (right-hand side) of a nonterminal.
///
/// The symbol array is immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    id: u32,
    priority: u32,
    rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(id: u32, priority: u32, rhs: Vec<Symbol>) -> Self {
        Self { id, priority, rhs }
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Priority is carried for downstream tree reduction; the parser
    /// itself never consults it.
    #[inline]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    /// An epsilon production has no symbols.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    #[inline]
    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    /// Symbol at `dot`, or 0 once the dot has moved past the end.
    #[inline]
    pub fn symbol_at(&self, dot: u32) -> Symbol {
        self.rhs.get(dot as usize).copied().unwrap_or(0)
    }
}

/// A nonterminal and its production list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nonterminal {
    /// Display name, when the host supplied one (the binary format
    /// carries no names).
    name: Option<String>,
    /// Production indices, most recently added first.
    productions: Vec<ProdId>,
}

impl Nonterminal {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Production indices in stored order (reverse of insertion).
    pub fn production_ids(&self) -> &[ProdId] {
        &self.productions
    }
}

/// A complete grammar: fixed terminal/nonterminal cardinalities, a flat
/// production table, and an optional root nonterminal.
///
/// Immutable after loading apart from display names, so it can be shared
/// read-only across parses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grammar {
    num_terminals: u32,
    root: Option<i32>,
    nonterminals: Vec<Nonterminal>,
    productions: Vec<Production>,
}

impl Grammar {
    /// A grammar with no nonterminals, no terminals and no root.
    pub fn empty() -> Self {
        Self {
            num_terminals: 0,
            root: None,
            nonterminals: Vec::new(),
            productions: Vec::new(),
        }
    }

    #[inline]
    pub fn num_terminals(&self) -> u32 {
        self.num_terminals
    }

    #[inline]
    pub fn num_nonterminals(&self) -> u32 {
        self.nonterminals.len() as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nonterminals.is_empty()
    }

    /// Root nonterminal id, when the grammar declares one.
    #[inline]
    pub fn root(&self) -> Option<i32> {
        self.root
    }

    pub fn num_productions(&self) -> u32 {
        self.productions.len() as u32
    }

    fn index_of(&self, id: i32) -> Option<usize> {
        if id >= 0 {
            return None;
        }
        let idx = (-(id as i64) - 1) as usize;
        (idx < self.nonterminals.len()).then_some(idx)
    }

    /// Nonterminal by negative id, or `None` for out-of-range ids.
    pub fn nonterminal(&self, id: i32) -> Option<&Nonterminal> {
        self.index_of(id).map(|idx| &self.nonterminals[idx])
    }

    /// Resolve a production index back to the production.
    ///
    /// # Panics
    /// Panics if the index was not issued by this grammar.
    #[inline]
    pub fn production(&self, pid: ProdId) -> &Production {
        &self.productions[pid as usize]
    }

    /// Productions of a nonterminal in stored order. Unknown ids yield an
    /// empty iterator.
    pub fn productions_of(&self, id: i32) -> impl Iterator<Item = (ProdId, &Production)> {
        self.nonterminal(id)
            .map(|nt| nt.productions.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&pid| (pid, &self.productions[pid as usize]))
    }

    /// Attach a display name to a nonterminal. Returns false for unknown ids.
    pub fn set_name(&mut self, id: i32, name: impl Into<String>) -> bool {
        match self.index_of(id) {
            Some(idx) => {
                self.nonterminals[idx].name = Some(name.into());
                true
            }
            None => false,
        }
    }

    /// Display name for a nonterminal id, falling back to a generated form.
    pub fn name_of(&self, id: i32) -> String {
        match self.nonterminal(id).and_then(Nonterminal::name) {
            Some(name) => name.to_owned(),
            None => format!("NT{id}"),
        }
    }

    pub(crate) fn from_parts(
        num_terminals: u32,
        root: Option<i32>,
        nonterminals: Vec<Nonterminal>,
        productions: Vec<Production>,
    ) -> Self {
        Self {
            num_terminals,
            root,
            nonterminals,
            productions,
        }
    }
}

/// Incremental grammar construction, used by the binary loader and by
/// hosts that assemble grammars programmatically.
#[derive(Debug)]
pub struct GrammarBuilder {
    num_terminals: u32,
    root: Option<i32>,
    nonterminals: Vec<Nonterminal>,
    productions: Vec<Production>,
}

impl GrammarBuilder {
    /// Start a grammar with `num_nonterminals` empty nonterminals
    /// (ids −1 down to −num_nonterminals).
    pub fn new(num_terminals: u32, num_nonterminals: u32) -> Self {
        Self {
            num_terminals,
            root: None,
            nonterminals: vec![Nonterminal::default(); num_nonterminals as usize],
            productions: Vec::new(),
        }
    }

    pub fn set_root(&mut self, id: i32) {
        self.root = Some(id);
    }

    /// Add a production to nonterminal `nt`, prepending it to the
    /// nonterminal's list (so stored order is the reverse of insertion
    /// order, matching the binary loader's contract).
    ///
    /// # Panics
    /// Panics if `nt` is not one of the builder's nonterminal ids.
    pub fn push_production(&mut self, nt: i32, id: u32, priority: u32, rhs: Vec<Symbol>) -> ProdId {
        assert!(
            nt < 0 && (-(nt as i64) as usize) <= self.nonterminals.len(),
            "unknown nonterminal id {nt}"
        );
        let idx = (-(nt as i64) - 1) as usize;
        let pid = self.productions.len() as ProdId;
        self.productions.push(Production::new(id, priority, rhs));
        self.nonterminals[idx].productions.insert(0, pid);
        pid
    }

    pub fn finish(self) -> Grammar {
        Grammar::from_parts(
            self.num_terminals,
            self.root,
            self.nonterminals,
            self.productions,
        )
    }
}
