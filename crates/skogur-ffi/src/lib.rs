#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! C ABI surface over the skogur grammar model and parser.
//!
//! Every entry point works on opaque handles and reports failure as a
//! null pointer (plus an error-token offset on parse), never as a panic
//! across the boundary. Ownership is explicit: grammars and parsers are
//! freed by their `_free` functions, the forest by releasing the root
//! reference returned from [`skogur_parse`].

use std::cell::Cell;
use std::ffi::{CStr, c_char};
use std::rc::Rc;

use skogur_core::Grammar;
use skogur_engine::{ParseStats, Parser, SppfNode, alloc_snapshot, dump_forest, num_combinations};

/// Host matching callback: `(handle, token, terminal) -> matched`.
///
/// Must be pure in its three arguments for the duration of a parse; the
/// engine caches verdicts per (column, terminal) pair.
pub type MatchFn = extern "C" fn(handle: u64, token: u32, terminal: u32) -> bool;

/// Opaque parser handle: a grammar binding plus the host matcher. The
/// grammar must outlive the parser.
pub struct SkogurParser {
    grammar: *const Grammar,
    matcher: CMatcher,
    stats: ParseStats,
}

/// The host callback, or identity matching when none was given.
#[derive(Clone, Copy)]
struct CMatcher(Option<MatchFn>);

// Live-handle accounting for the allocation report.
thread_local! {
    static LIVE_GRAMMARS: Cell<usize> = const { Cell::new(0) };
    static LIVE_NONTERMINALS: Cell<usize> = const { Cell::new(0) };
    static LIVE_PRODUCTIONS: Cell<usize> = const { Cell::new(0) };
}

/// Load a grammar from a binary grammar file.
///
/// Returns null on any load failure (bad path, bad signature, truncated
/// or malformed file); no grammar exists afterwards.
///
/// # Safety
/// `path` must be null or a valid NUL-terminated C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn skogur_grammar_load(path: *const c_char) -> *mut Grammar {
    if path.is_null() {
        return std::ptr::null_mut();
    }
    let Ok(path) = unsafe { CStr::from_ptr(path) }.to_str() else {
        return std::ptr::null_mut();
    };
    match Grammar::from_path(path) {
        Ok(grammar) => {
            LIVE_GRAMMARS.with(|c| c.set(c.get() + 1));
            LIVE_NONTERMINALS.with(|c| c.set(c.get() + grammar.num_nonterminals() as usize));
            LIVE_PRODUCTIONS.with(|c| c.set(c.get() + grammar.num_productions() as usize));
            Box::into_raw(Box::new(grammar))
        }
        Err(_) => std::ptr::null_mut(),
    }
}

/// Destroy a grammar. Null is a no-op. Any parser still bound to the
/// grammar must not be used afterwards.
///
/// # Safety
/// `grammar` must be null or a pointer from [`skogur_grammar_load`],
/// freed at most once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn skogur_grammar_free(grammar: *mut Grammar) {
    if grammar.is_null() {
        return;
    }
    let grammar = unsafe { Box::from_raw(grammar) };
    LIVE_GRAMMARS.with(|c| c.set(c.get() - 1));
    LIVE_NONTERMINALS.with(|c| c.set(c.get() - grammar.num_nonterminals() as usize));
    LIVE_PRODUCTIONS.with(|c| c.set(c.get() - grammar.num_productions() as usize));
}

/// Create a parser bound to `grammar` and `matcher`. A null matcher
/// selects identity matching (token id == terminal id). Returns null if
/// `grammar` is null.
///
/// # Safety
/// `grammar` must be null or a live pointer from
/// [`skogur_grammar_load`] that outlives the parser.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn skogur_parser_new(
    grammar: *const Grammar,
    matcher: Option<MatchFn>,
) -> *mut SkogurParser {
    if grammar.is_null() {
        return std::ptr::null_mut();
    }
    Box::into_raw(Box::new(SkogurParser {
        grammar,
        matcher: CMatcher(matcher),
        stats: ParseStats::default(),
    }))
}

/// Destroy a parser. Null is a no-op.
///
/// # Safety
/// `parser` must be null or a pointer from [`skogur_parser_new`], freed
/// at most once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn skogur_parser_free(parser: *mut SkogurParser) {
    if parser.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(parser) });
}

/// Parse `n_tokens` tokens from nonterminal `start`.
///
/// A null `tokens` pointer substitutes the identity sequence
/// `0..n_tokens`; `start` must be a negative nonterminal id.
/// On success the returned root holds one reference the caller must
/// release with [`skogur_forest_release`], and `*error_token` is 0. On
/// failure the result is null and `*error_token` is 0 for invalid
/// arguments, the stalled column index, or `n_tokens` when no
/// derivation spans the input.
///
/// # Safety
/// `parser` must be a live pointer from [`skogur_parser_new`] whose
/// grammar is still alive; `tokens` must be null or point at `n_tokens`
/// readable u32 values; `error_token` must be null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn skogur_parse(
    parser: *mut SkogurParser,
    n_tokens: u32,
    tokens: *const u32,
    start: i32,
    handle: u64,
    error_token: *mut u32,
) -> *const SppfNode {
    if !error_token.is_null() {
        unsafe { *error_token = 0 };
    }
    if parser.is_null() || n_tokens == 0 {
        return std::ptr::null();
    }
    let parser = unsafe { &mut *parser };
    let grammar = unsafe { &*parser.grammar };

    let tokens: Vec<u32> = if tokens.is_null() {
        (0..n_tokens).collect()
    } else {
        unsafe { std::slice::from_raw_parts(tokens, n_tokens as usize) }.to_vec()
    };

    let matcher = parser.matcher;
    let mut engine = Parser::new(
        grammar,
        move |handle: u64, token: u32, terminal: u32| match matcher.0 {
            Some(f) => f(handle, token, terminal),
            None => token == terminal,
        },
    );
    let result = engine.parse(handle, start, &tokens);
    parser.stats = *engine.stats();

    match result {
        Ok(root) => Rc::into_raw(root),
        Err(err) => {
            if !error_token.is_null() {
                unsafe { *error_token = err.error_token() };
            }
            std::ptr::null()
        }
    }
}

/// Release the caller's reference on a forest root, tearing down the
/// node DAG. Null is a no-op.
///
/// # Safety
/// `root` must be null or a pointer from [`skogur_parse`], released at
/// most once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn skogur_forest_release(root: *const SppfNode) {
    if root.is_null() {
        return;
    }
    drop(unsafe { Rc::from_raw(root) });
}

/// Number of distinct derivations in the forest (saturating). Null
/// yields 0.
///
/// # Safety
/// `root` must be null or a live pointer from [`skogur_parse`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn skogur_forest_combinations(root: *const SppfNode) -> u64 {
    if root.is_null() {
        return 0;
    }
    let root = unsafe { Rc::from_raw(root) };
    let count = num_combinations(&root);
    // the caller keeps its reference
    let _ = Rc::into_raw(root);
    count
}

/// Print a diagnostic dump of the forest to stdout, resolving
/// nonterminal names through `grammar`.
///
/// # Safety
/// `root` must be null or a live pointer from [`skogur_parse`];
/// `grammar` must be the live grammar the forest was parsed with.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn skogur_forest_dump(root: *const SppfNode, grammar: *const Grammar) {
    if root.is_null() || grammar.is_null() {
        return;
    }
    let root = unsafe { Rc::from_raw(root) };
    let grammar = unsafe { &*grammar };
    print!("{}", dump_forest(&root, grammar));
    let _ = Rc::into_raw(root);
}

/// Print the allocation balance report to stdout: live grammar handles,
/// live parse-owned objects, and (when `parser` is non-null) the
/// counters of its most recent parse.
///
/// # Safety
/// `parser` must be null or a live pointer from [`skogur_parser_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn skogur_alloc_report(parser: *const SkogurParser) {
    let live = alloc_snapshot();
    println!("allocation report:");
    println!("  grammars:     {}", LIVE_GRAMMARS.with(Cell::get));
    println!("  nonterminals: {}", LIVE_NONTERMINALS.with(Cell::get));
    println!("  productions:  {}", LIVE_PRODUCTIONS.with(Cell::get));
    println!("  nodes:        {}", live.nodes);
    println!("  states:       {}", live.states);
    println!("  chunks:       {}", live.chunks);
    println!("  columns:      {}", live.columns);
    println!("  h-entries:    {}", live.h_entries);
    if !parser.is_null() {
        let stats = unsafe { &(*parser).stats };
        println!(
            "  last parse:   {} states allocated, {} discarded, {} matcher calls, {} dict lookups",
            stats.states_allocated, stats.states_discarded, stats.matcher_calls, stats.dict_lookups
        );
    }
}
