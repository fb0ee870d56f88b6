//! Tests for the binary grammar format.

use std::io::Write as _;

use super::binary::{GrammarError, SIGNATURE_LEN};
use super::types::{Grammar, GrammarBuilder};

fn sig() -> Vec<u8> {
    let mut v = b"Reynir ".to_vec();
    v.resize(SIGNATURE_LEN, 0);
    v
}

fn push_u32(v: &mut Vec<u8>, x: u32) {
    v.extend_from_slice(&x.to_le_bytes());
}

fn push_i32(v: &mut Vec<u8>, x: i32) {
    v.extend_from_slice(&x.to_le_bytes());
}

/// S -> 1 A | epsilon,  A -> 2, written in file order.
fn sample_bytes() -> Vec<u8> {
    let mut v = sig();
    push_u32(&mut v, 2); // terminals
    push_u32(&mut v, 2); // nonterminals
    push_i32(&mut v, -1); // root
    // nonterminal -1: two productions
    push_u32(&mut v, 2);
    push_u32(&mut v, 0); // id
    push_u32(&mut v, 0); // priority
    push_u32(&mut v, 2); // length
    push_i32(&mut v, 1);
    push_i32(&mut v, -2);
    push_u32(&mut v, 1); // id
    push_u32(&mut v, 0);
    push_u32(&mut v, 0); // epsilon
    // nonterminal -2: one production
    push_u32(&mut v, 1);
    push_u32(&mut v, 2);
    push_u32(&mut v, 0);
    push_u32(&mut v, 1);
    push_i32(&mut v, 2);
    v
}

fn assert_same(a: &Grammar, b: &Grammar) {
    assert_eq!(a.num_terminals(), b.num_terminals());
    assert_eq!(a.num_nonterminals(), b.num_nonterminals());
    assert_eq!(a.root(), b.root());
    for k in 1..=a.num_nonterminals() {
        let nt = -(k as i32);
        let pa: Vec<_> = a.productions_of(nt).map(|(_, p)| p.clone()).collect();
        let pb: Vec<_> = b.productions_of(nt).map(|(_, p)| p.clone()).collect();
        assert_eq!(pa, pb, "productions of {nt} differ");
    }
}

#[test]
fn decodes_sample() {
    let g = Grammar::from_bytes(&sample_bytes()).unwrap();
    assert_eq!(g.num_terminals(), 2);
    assert_eq!(g.num_nonterminals(), 2);
    assert_eq!(g.root(), Some(-1));
    // Productions are prepended while reading: epsilon first.
    let rhs: Vec<_> = g.productions_of(-1).map(|(_, p)| p.rhs().to_vec()).collect();
    assert_eq!(rhs, vec![vec![], vec![1, -2]]);
    let rhs: Vec<_> = g.productions_of(-2).map(|(_, p)| p.rhs().to_vec()).collect();
    assert_eq!(rhs, vec![vec![2]]);
}

#[test]
fn round_trips() {
    let g = Grammar::from_bytes(&sample_bytes()).unwrap();
    let bytes = g.to_bytes();
    assert_eq!(bytes, sample_bytes());
    let g2 = Grammar::from_bytes(&bytes).unwrap();
    assert_same(&g, &g2);
}

#[test]
fn round_trips_builder_grammar() {
    let mut b = GrammarBuilder::new(3, 1);
    b.set_root(-1);
    b.push_production(-1, 0, 7, vec![1, 2, 3]);
    b.push_production(-1, 1, 0, vec![1]);
    let g = b.finish();
    let g2 = Grammar::from_bytes(&g.to_bytes()).unwrap();
    assert_same(&g, &g2);
}

#[test]
fn rejects_wrong_signature() {
    let mut v = sample_bytes();
    v[0] = b'X';
    v[1] = b'y';
    v[2] = b'z';
    let err = Grammar::from_bytes(&v).unwrap_err();
    assert!(matches!(err, GrammarError::InvalidSignature), "{err}");
}

#[test]
fn signature_tail_is_ignored() {
    let mut v = sample_bytes();
    v[7] = 0xff;
    v[15] = 0x7f;
    assert!(Grammar::from_bytes(&v).is_ok());
}

#[test]
fn rejects_truncation_everywhere() {
    let full = sample_bytes();
    for len in 0..full.len() {
        let err = Grammar::from_bytes(&full[..len]).unwrap_err();
        assert!(
            matches!(err, GrammarError::Truncated(_)),
            "prefix of {len} bytes gave {err}"
        );
    }
}

#[test]
fn rejects_oversized_production() {
    let mut v = sig();
    push_u32(&mut v, 1);
    push_u32(&mut v, 1);
    push_i32(&mut v, -1);
    push_u32(&mut v, 1);
    push_u32(&mut v, 9); // id
    push_u32(&mut v, 0);
    push_u32(&mut v, 257); // over the limit
    let err = Grammar::from_bytes(&v).unwrap_err();
    assert!(
        matches!(err, GrammarError::OversizedProduction { id: 9, len: 257 }),
        "{err}"
    );
}

#[test]
fn rejects_bad_root() {
    for root in [1, 0, -3] {
        let mut v = sig();
        push_u32(&mut v, 1);
        push_u32(&mut v, 2);
        push_i32(&mut v, root);
        let err = Grammar::from_bytes(&v).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidRoot(r) if r == root), "{err}");
    }
}

#[test]
fn accepts_empty_grammar() {
    let mut v = sig();
    push_u32(&mut v, 5);
    push_u32(&mut v, 0);
    let g = Grammar::from_bytes(&v).unwrap();
    assert!(g.is_empty());
    assert_eq!(g.num_terminals(), 5);
    assert_eq!(g.root(), None);
}

#[test]
fn loads_from_file() {
    let g = Grammar::from_bytes(&sample_bytes()).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&g.to_bytes()).unwrap();
    file.flush().unwrap();
    let loaded = Grammar::from_path(file.path()).unwrap();
    assert_same(&g, &loaded);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Grammar::from_path(dir.path().join("nope.bin")).unwrap_err();
    assert!(matches!(err, GrammarError::Io(_)), "{err}");
}
