//! Tests for the grammar model.

use super::types::{Grammar, GrammarBuilder, Production};

fn tiny_grammar() -> Grammar {
    // -1: S -> 1 -2 | epsilon,  -2: A -> 2
    let mut b = GrammarBuilder::new(2, 2);
    b.set_root(-1);
    b.push_production(-1, 0, 0, vec![1, -2]);
    b.push_production(-1, 1, 0, vec![]);
    b.push_production(-2, 2, 0, vec![2]);
    b.finish()
}

#[test]
fn symbol_past_end_is_zero() {
    let p = Production::new(7, 0, vec![1, -1]);
    assert_eq!(p.symbol_at(0), 1);
    assert_eq!(p.symbol_at(1), -1);
    assert_eq!(p.symbol_at(2), 0);
    assert_eq!(p.symbol_at(100), 0);
}

#[test]
fn epsilon_production() {
    let p = Production::new(0, 0, vec![]);
    assert!(p.is_empty());
    assert_eq!(p.len(), 0);
    assert_eq!(p.symbol_at(0), 0);
}

#[test]
fn builder_prepends_productions() {
    let g = tiny_grammar();
    let rhs: Vec<_> = g.productions_of(-1).map(|(_, p)| p.rhs().to_vec()).collect();
    // Last pushed comes first.
    assert_eq!(rhs, vec![vec![], vec![1, -2]]);
}

#[test]
fn lookup_by_negative_id() {
    let g = tiny_grammar();
    assert!(g.nonterminal(-1).is_some());
    assert!(g.nonterminal(-2).is_some());
    assert!(g.nonterminal(-3).is_none());
    assert!(g.nonterminal(0).is_none());
    assert!(g.nonterminal(1).is_none());
    assert_eq!(g.productions_of(-3).count(), 0);
}

#[test]
fn cardinalities() {
    let g = tiny_grammar();
    assert_eq!(g.num_terminals(), 2);
    assert_eq!(g.num_nonterminals(), 2);
    assert_eq!(g.num_productions(), 3);
    assert_eq!(g.root(), Some(-1));
    assert!(!g.is_empty());
}

#[test]
fn names_fall_back_to_generated_form() {
    let mut g = tiny_grammar();
    assert_eq!(g.name_of(-1), "NT-1");
    assert!(g.set_name(-1, "S"));
    assert_eq!(g.name_of(-1), "S");
    assert_eq!(g.name_of(-2), "NT-2");
    assert!(!g.set_name(-9, "bogus"));
}

#[test]
fn empty_grammar() {
    let g = Grammar::empty();
    assert!(g.is_empty());
    assert_eq!(g.num_terminals(), 0);
    assert_eq!(g.num_nonterminals(), 0);
    assert_eq!(g.root(), None);
}

#[test]
fn priority_is_stored() {
    let mut b = GrammarBuilder::new(1, 1);
    b.set_root(-1);
    let pid = b.push_production(-1, 0, 42, vec![1]);
    let g = b.finish();
    assert_eq!(g.production(pid).priority(), 42);
}
