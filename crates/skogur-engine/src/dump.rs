//! Human-readable forest dump for diagnostics.

use std::fmt::Write as _;
use std::rc::Rc;

use indexmap::IndexMap;
use skogur_core::Grammar;

use crate::earley::{SppfNode, num_combinations};

/// Render the forest below `root`, one block per node, in first-visit
/// depth-first order. Numbering is deterministic for a given forest
/// shape, so the output can be asserted directly in tests.
///
/// Nonterminal nodes print their display name; intermediate nodes add
/// the production id and dot; terminal leaves print the token id.
pub fn dump_forest(root: &Rc<SppfNode>, grammar: &Grammar) -> String {
    let mut order: IndexMap<usize, Rc<SppfNode>> = IndexMap::new();
    collect(root, &mut order);

    let mut out = String::new();
    writeln!(
        out,
        "forest: {} nodes, {} combinations",
        order.len(),
        num_combinations(root)
    )
    .unwrap();

    for (idx, node) in order.values().enumerate() {
        let label = node.label();
        let sym = if label.symbol < 0 {
            grammar.name_of(label.symbol)
        } else {
            format!("t{}", label.symbol)
        };
        match label.prod {
            Some(pid) => {
                let prod = grammar.production(pid);
                writeln!(
                    out,
                    "#{idx} {sym} p{}\u{b7}{} [{}..{}]",
                    prod.id(),
                    label.dot,
                    label.start,
                    label.end
                )
                .unwrap();
            }
            None => {
                writeln!(out, "#{idx} {sym} [{}..{}]", label.start, label.end).unwrap();
            }
        }
        for f in node.families().iter() {
            let left = child_ref(&order, &f.left);
            let right = child_ref(&order, &f.right);
            writeln!(out, "  = p{}({left} {right})", grammar.production(f.prod).id()).unwrap();
        }
    }
    out
}

fn child_ref(order: &IndexMap<usize, Rc<SppfNode>>, child: &Option<Rc<SppfNode>>) -> String {
    match child {
        Some(node) => {
            let key = Rc::as_ptr(node) as usize;
            match order.get_index_of(&key) {
                Some(idx) => format!("#{idx}"),
                None => "#?".to_owned(),
            }
        }
        None => "_".to_owned(),
    }
}

fn collect(node: &Rc<SppfNode>, order: &mut IndexMap<usize, Rc<SppfNode>>) {
    let key = Rc::as_ptr(node) as usize;
    if order.contains_key(&key) {
        return;
    }
    order.insert(key, Rc::clone(node));
    for f in node.families().iter() {
        if let Some(left) = &f.left {
            collect(left, order);
        }
        if let Some(right) = &f.right {
            collect(right, order);
        }
    }
}
