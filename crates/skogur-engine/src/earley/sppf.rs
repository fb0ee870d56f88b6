//! Shared packed parse forest.
//!
//! Nodes are labelled `(symbol, dot, production, span)` and carry a list
//! of families, each a packed derivation `(production, left, right)`. The
//! per-column dictionary guarantees a single node per label, which is
//! what makes the forest shared; families make it packed.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use skogur_core::ProdId;

use super::stats;

/// Node label. `symbol` is a nonterminal id (negative) or a token id
/// (positive); `dot` and `prod` are set on intermediate nodes only; the
/// span is `start..end` in token positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    pub symbol: i32,
    pub dot: u32,
    pub prod: Option<ProdId>,
    pub start: u32,
    pub end: u32,
}

/// One packed derivation of a node. `left` is absent when the production
/// had consumed nothing before this step; both children are absent for an
/// epsilon derivation.
#[derive(Debug, Clone)]
pub struct Family {
    pub prod: ProdId,
    pub left: Option<Rc<SppfNode>>,
    pub right: Option<Rc<SppfNode>>,
}

/// A forest node. Terminal leaves have no families.
#[derive(Debug)]
pub struct SppfNode {
    label: Label,
    families: RefCell<Vec<Family>>,
}

impl SppfNode {
    pub fn new(label: Label) -> Rc<Self> {
        stats::adjust_nodes(1);
        Rc::new(Self {
            label,
            families: RefCell::new(Vec::new()),
        })
    }

    #[inline]
    pub fn label(&self) -> Label {
        self.label
    }

    pub fn families(&self) -> Ref<'_, [Family]> {
        Ref::map(self.families.borrow(), Vec::as_slice)
    }

    pub fn num_families(&self) -> usize {
        self.families.borrow().len()
    }

    /// Attach a family unless an equal one (same production, both
    /// children pointer-identical) is already present.
    pub fn add_family(
        &self,
        prod: ProdId,
        left: Option<Rc<SppfNode>>,
        right: Option<Rc<SppfNode>>,
    ) {
        let mut families = self.families.borrow_mut();
        let duplicate = families
            .iter()
            .any(|f| f.prod == prod && opt_ptr_eq(&f.left, &left) && opt_ptr_eq(&f.right, &right));
        if !duplicate {
            families.push(Family { prod, left, right });
        }
    }
}

impl Drop for SppfNode {
    fn drop(&mut self) {
        stats::adjust_nodes(-1);
    }
}

fn opt_ptr_eq(a: &Option<Rc<SppfNode>>, b: &Option<Rc<SppfNode>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// Number of distinct derivations below a node: 1 for leaves, otherwise
/// the sum over families of the product of the children's counts.
/// Saturates instead of overflowing on massively ambiguous forests.
pub fn num_combinations(node: &Rc<SppfNode>) -> u64 {
    fn walk(node: &Rc<SppfNode>, memo: &mut HashMap<*const SppfNode, u64>) -> u64 {
        let key = Rc::as_ptr(node);
        if let Some(&count) = memo.get(&key) {
            return count;
        }
        let families = node.families();
        let count = if families.is_empty() {
            1
        } else {
            families.iter().fold(0u64, |acc, f| {
                let left = f.left.as_ref().map_or(1, |c| walk(c, memo));
                let right = f.right.as_ref().map_or(1, |c| walk(c, memo));
                acc.saturating_add(left.saturating_mul(right))
            })
        };
        drop(families);
        memo.insert(key, count);
        count
    }
    walk(node, &mut HashMap::new())
}

/// Per-column dictionary mapping labels to nodes, so equal labels within
/// one column resolve to one node. Reset between columns; the lookup and
/// creation counters are cumulative over the parse.
#[derive(Debug, Default)]
pub struct NodeDict {
    map: HashMap<Label, Rc<SppfNode>>,
    lookups: u64,
    created: u64,
}

impl NodeDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing node for `label`, or a freshly created one.
    pub fn lookup_or_add(&mut self, label: Label) -> Rc<SppfNode> {
        self.lookups += 1;
        if let Some(node) = self.map.get(&label) {
            return Rc::clone(node);
        }
        let node = SppfNode::new(label);
        self.created += 1;
        self.map.insert(label, Rc::clone(&node));
        node
    }

    /// Drop the column's entries; counters survive.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn lookups(&self) -> u64 {
        self.lookups
    }

    pub fn created(&self) -> u64 {
        self.created
    }
}
