//! Binary grammar format.
//!
//! Layout, little-endian throughout:
//! - 16-byte signature block; the first 7 bytes are `"Reynir "`, the rest
//!   is reserved (written as zero, ignored on read)
//! - u32 terminal count T
//! - u32 nonterminal count N; when N is 0 the file ends here
//! - i32 root nonterminal id (negative)
//! - for each nonterminal −1, −2, …, −N: u32 production count, then per
//!   production u32 id, u32 priority, u32 length L (≤ 256), L × i32 symbols
//!
//! Productions are prepended to their nonterminal as they are read, so the
//! in-memory order is the reverse of file order.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use thiserror::Error;

use super::types::{Grammar, GrammarBuilder, MAX_PRODUCTION_LEN};

/// Leading bytes of every grammar file.
pub const SIGNATURE: &[u8; 7] = b"Reynir ";

/// Size of the signature block, including the reserved tail.
pub const SIGNATURE_LEN: usize = 16;

/// Error while loading a binary grammar. No partially-built grammar
/// escapes a failed load.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar file truncated at byte {0}")]
    Truncated(usize),
    #[error("invalid signature: expected \"Reynir \"")]
    InvalidSignature,
    #[error("production {id} has {len} symbols, limit is {}", MAX_PRODUCTION_LEN)]
    OversizedProduction { id: u32, len: u32 },
    #[error("root nonterminal id {0} is out of range")]
    InvalidRoot(i32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], GrammarError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(GrammarError::Truncated(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, GrammarError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i32(&mut self) -> Result<i32, GrammarError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

impl Grammar {
    /// Decode a grammar from the binary format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GrammarError> {
        let mut r = Reader::new(bytes);

        let sig = r.take(SIGNATURE_LEN)?;
        if &sig[..SIGNATURE.len()] != SIGNATURE {
            return Err(GrammarError::InvalidSignature);
        }

        let num_terminals = r.read_u32()?;
        let num_nonterminals = r.read_u32()?;
        if num_nonterminals == 0 {
            return Ok(GrammarBuilder::new(num_terminals, 0).finish());
        }

        let root = r.read_i32()?;
        if root >= 0 || -(root as i64) > num_nonterminals as i64 {
            return Err(GrammarError::InvalidRoot(root));
        }

        let mut builder = GrammarBuilder::new(num_terminals, num_nonterminals);
        builder.set_root(root);

        for k in 1..=num_nonterminals {
            let nt = -(k as i64) as i32;
            let num_productions = r.read_u32()?;
            for _ in 0..num_productions {
                let id = r.read_u32()?;
                let priority = r.read_u32()?;
                let len = r.read_u32()?;
                if len as usize > MAX_PRODUCTION_LEN {
                    return Err(GrammarError::OversizedProduction { id, len });
                }
                let mut rhs = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    rhs.push(r.read_i32()?);
                }
                builder.push_production(nt, id, priority, rhs);
            }
        }

        Ok(builder.finish())
    }

    /// Load a grammar from a binary file via a read-only memory map.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
        let file = File::open(path)?;
        // The mapping is read-only and private to this call.
        let map = unsafe { Mmap::map(&file)? };
        Self::from_bytes(&map)
    }

    /// Re-emit the binary format. Productions are written in file order,
    /// the reverse of stored order, so a decode of the output reproduces
    /// this grammar exactly. A grammar without an explicit root serialises
    /// with root −1.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(SIGNATURE);
        out.resize(SIGNATURE_LEN, 0);

        out.extend_from_slice(&self.num_terminals().to_le_bytes());
        out.extend_from_slice(&self.num_nonterminals().to_le_bytes());
        if self.is_empty() {
            return out;
        }

        out.extend_from_slice(&self.root().unwrap_or(-1).to_le_bytes());
        for k in 1..=self.num_nonterminals() {
            let nt = -(k as i64) as i32;
            let ids = self
                .nonterminal(nt)
                .map(|n| n.production_ids())
                .unwrap_or(&[]);
            out.extend_from_slice(&(ids.len() as u32).to_le_bytes());
            for &pid in ids.iter().rev() {
                let prod = self.production(pid);
                out.extend_from_slice(&prod.id().to_le_bytes());
                out.extend_from_slice(&prod.priority().to_le_bytes());
                out.extend_from_slice(&(prod.len() as u32).to_le_bytes());
                for &sym in prod.rhs() {
                    out.extend_from_slice(&sym.to_le_bytes());
                }
            }
        }
        out
    }
}
