//! Tests for Earley columns.

use std::cell::RefCell;
use std::rc::Rc;

use skogur_core::{Grammar, GrammarBuilder};

use super::arena::{State, StateArena, StateId};
use super::column::{Column, SENTINEL_TOKEN};
use super::sppf::{Label, SppfNode};

fn grammar() -> Grammar {
    let mut b = GrammarBuilder::new(4, 2);
    b.set_root(-1);
    b.push_production(-1, 0, 0, vec![-2, 1]);
    b.push_production(-1, 1, 0, vec![1, 2]);
    b.push_production(-2, 2, 0, vec![2]);
    b.push_production(-2, 3, 0, vec![]);
    b.finish()
}

fn node(symbol: i32) -> Rc<SppfNode> {
    SppfNode::new(Label {
        symbol,
        dot: 0,
        prod: None,
        start: 0,
        end: 0,
    })
}

fn drain(col: &mut Column, arena: &StateArena) -> Vec<StateId> {
    let mut seen = Vec::new();
    while let Some(sid) = col.next_state(arena) {
        seen.push(sid);
    }
    seen
}

#[test]
fn rejects_duplicate_items() {
    let g = grammar();
    let mut arena = StateArena::new();
    let mut col = Column::new(0, 1, g.num_nonterminals());

    let a = arena.alloc(State::new(-1, 0, 0, 0, None));
    assert!(col.add_state(a, &mut arena, &g));
    let b = arena.alloc(State::new(-1, 0, 0, 0, None));
    assert!(!col.add_state(b, &mut arena, &g));
    assert_eq!(col.num_states(), 1);

    // any field difference makes a distinct item
    let c = arena.alloc(State::new(-1, 0, 0, 3, None));
    assert!(col.add_state(c, &mut arena, &g));
    assert_eq!(col.num_states(), 2);
}

#[test]
fn node_identity_is_part_of_the_item() {
    let g = grammar();
    let mut arena = StateArena::new();
    let mut col = Column::new(0, 1, g.num_nonterminals());
    let w = node(-1);

    let a = arena.alloc(State::new(-1, 0, 0, 0, None));
    let b = arena.alloc(State::new(-1, 0, 0, 0, Some(Rc::clone(&w))));
    assert!(col.add_state(a, &mut arena, &g));
    assert!(col.add_state(b, &mut arena, &g));

    let dup = arena.alloc(State::new(-1, 0, 0, 0, Some(Rc::clone(&w))));
    assert!(!col.add_state(dup, &mut arena, &g));

    let other = arena.alloc(State::new(-1, 0, 0, 0, Some(node(-1))));
    assert!(col.add_state(other, &mut arena, &g));
    assert_eq!(col.num_states(), 3);
}

#[test]
fn enumeration_sees_states_added_mid_scan() {
    let g = grammar();
    let mut arena = StateArena::new();
    let mut col = Column::new(0, 1, g.num_nonterminals());

    let a = arena.alloc(State::new(-1, 0, 0, 0, None));
    col.add_state(a, &mut arena, &g);
    assert_eq!(col.next_state(&arena), Some(a));
    assert_eq!(col.next_state(&arena), None);

    // a state arriving after the pass went idle is still picked up
    let b = arena.alloc(State::new(-1, 0, 0, 1, None));
    col.add_state(b, &mut arena, &g);
    assert_eq!(col.next_state(&arena), Some(b));
    assert_eq!(col.next_state(&arena), None);
}

#[test]
fn enumeration_covers_everything_exactly_once() {
    let g = grammar();
    let mut arena = StateArena::new();
    let mut col = Column::new(0, 1, g.num_nonterminals());

    let mut added = Vec::new();
    for start in 0..50 {
        let sid = arena.alloc(State::new(-1, 0, 0, start, None));
        assert!(col.add_state(sid, &mut arena, &g));
        added.push(sid);
    }
    let mut seen = drain(&mut col, &arena);
    seen.sort_unstable();
    added.sort_unstable();
    assert_eq!(seen, added);
}

#[test]
fn reset_enum_restarts_from_the_top() {
    let g = grammar();
    let mut arena = StateArena::new();
    let mut col = Column::new(0, 1, g.num_nonterminals());

    for start in 0..5 {
        let sid = arena.alloc(State::new(-1, 0, 0, start, None));
        col.add_state(sid, &mut arena, &g);
    }
    assert_eq!(drain(&mut col, &arena).len(), 5);
    assert_eq!(col.next_state(&arena), None);

    col.reset_enum();
    assert_eq!(drain(&mut col, &arena).len(), 5);
}

#[test]
fn nonterminal_chain_is_prepended() {
    let g = grammar();
    let mut arena = StateArena::new();
    let mut col = Column::new(0, 1, g.num_nonterminals());

    // both states have their dot at nonterminal -2
    let first = arena.alloc(State::new(-1, 0, 0, 0, None));
    let second = arena.alloc(State::new(-1, 0, 0, 1, None));
    col.add_state(first, &mut arena, &g);
    col.add_state(second, &mut arena, &g);

    assert_eq!(col.nt_head(-2), Some(second));
    assert_eq!(arena.get(second).nt_next, Some(first));
    assert_eq!(arena.get(first).nt_next, None);
    assert_eq!(col.nt_head(-1), None);
}

#[test]
fn mark_seen_fires_once_per_nonterminal() {
    let g = grammar();
    let mut col = Column::new(0, 1, g.num_nonterminals());
    assert!(col.mark_seen(-1));
    assert!(!col.mark_seen(-1));
    assert!(col.mark_seen(-2));
    assert!(!col.mark_seen(-2));
}

#[test]
fn match_cache_calls_the_matcher_once() {
    let g = grammar();
    let mut col = Column::new(0, 2, g.num_nonterminals());
    col.start_parse(g.num_terminals());

    let calls = RefCell::new(0u32);
    let matcher = |_h: u64, token: u32, terminal: u32| {
        *calls.borrow_mut() += 1;
        token == terminal
    };

    assert!(col.matches(&matcher, 0, 2));
    assert!(col.matches(&matcher, 0, 2));
    assert_eq!(*calls.borrow(), 1);

    // a negative verdict is cached too
    assert!(!col.matches(&matcher, 0, 1));
    assert!(!col.matches(&matcher, 0, 1));
    assert_eq!(*calls.borrow(), 2);
    assert_eq!(col.matcher_calls(), 2);
}

#[test]
fn out_of_range_terminal_never_matches() {
    let g = grammar();
    let mut col = Column::new(0, 2, g.num_nonterminals());
    col.start_parse(g.num_terminals());

    let calls = RefCell::new(0u32);
    let matcher = |_h: u64, _token: u32, _terminal: u32| {
        *calls.borrow_mut() += 1;
        true
    };
    assert!(!col.matches(&matcher, 0, 99));
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn sentinel_column_matches_nothing() {
    let g = grammar();
    let mut col = Column::new(9, SENTINEL_TOKEN, g.num_nonterminals());
    col.start_parse(g.num_terminals());

    let calls = RefCell::new(0u32);
    let matcher = |_h: u64, _token: u32, _terminal: u32| {
        *calls.borrow_mut() += 1;
        true
    };
    assert!(!col.matches(&matcher, 0, 1));
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn scan_queue_is_lifo() {
    let g = grammar();
    let mut arena = StateArena::new();
    let mut col = Column::new(0, 1, g.num_nonterminals());

    assert!(!col.has_scan());
    let a = arena.alloc(State::new(-1, 1, 0, 0, None));
    let b = arena.alloc(State::new(-1, 1, 1, 0, None));
    col.queue_scan(a, &mut arena);
    col.queue_scan(b, &mut arena);
    assert!(col.has_scan());

    assert_eq!(col.take_scan(&arena), Some(b));
    assert_eq!(col.take_scan(&arena), Some(a));
    assert_eq!(col.take_scan(&arena), None);
    assert!(!col.has_scan());
}
