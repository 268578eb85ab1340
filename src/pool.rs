//! Code/literal classification map.
//!
//! Disassembling Thumb code requires telling inline literal pools apart from
//! instructions: a `ldr r0, [pc, #imm]` proves that its target holds data,
//! and a branch proves that its target holds code. The map records those
//! facts as an ordered sequence of `(address, kind)` markers; a query
//! returns the kind of the last marker at or before the address, so each
//! marker classifies the region up to the next one.

use serde::{Deserialize, Serialize};

/// Classification of an address region.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolKind {
    /// Either ARM or Thumb instructions.
    Code,
    /// Inline literal pool (constant data).
    Literal,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct PoolEntry {
    address: u32,
    kind: PoolKind,
}

/// Ordered map of address-region classifications.
///
/// Kept sorted by address with at most one entry per address; the first
/// write to an address wins, so a `Literal` marker discovered from a
/// PC-relative load is not overridden when the same address is later
/// entered as a code region.
#[derive(Debug, Default)]
pub(crate) struct CodeMap {
    entries: Vec<PoolEntry>,
}

impl CodeMap {
    /// Records `kind` at `address`; a no-op if the address is already marked.
    pub(crate) fn mark(&mut self, address: u32, kind: PoolKind) {
        let pos = self.entries.partition_point(|entry| entry.address < address);
        if self.entries.get(pos).is_none_or(|entry| entry.address != address) {
            self.entries.insert(pos, PoolEntry { address, kind });
        }
    }

    /// The classification in effect at `address`: the kind of the last
    /// marker at or before it. Addresses preceding every marker are code.
    pub(crate) fn lookup(&self, address: u32) -> PoolKind {
        let pos = self.entries.partition_point(|entry| entry.address <= address);
        if pos == 0 { PoolKind::Code } else { self.entries[pos - 1].kind }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookup_defaults_to_code() {
        let map = CodeMap::default();
        assert_eq!(map.lookup(0), PoolKind::Code);
        assert_eq!(map.lookup(0xffff_ffff), PoolKind::Code);
    }

    #[test]
    fn lookup_takes_last_marker_at_or_before() {
        let mut map = CodeMap::default();
        map.mark(0x100, PoolKind::Code);
        map.mark(0x120, PoolKind::Literal);
        map.mark(0x130, PoolKind::Code);

        assert_eq!(map.lookup(0x0ff), PoolKind::Code);
        assert_eq!(map.lookup(0x100), PoolKind::Code);
        assert_eq!(map.lookup(0x11f), PoolKind::Code);
        assert_eq!(map.lookup(0x120), PoolKind::Literal);
        assert_eq!(map.lookup(0x12c), PoolKind::Literal);
        assert_eq!(map.lookup(0x130), PoolKind::Code);
        assert_eq!(map.lookup(0x1000), PoolKind::Code);
    }

    #[test]
    fn first_write_wins() {
        let mut map = CodeMap::default();
        map.mark(0x200, PoolKind::Literal);
        map.mark(0x200, PoolKind::Code);
        assert_eq!(map.lookup(0x200), PoolKind::Literal);
    }

    #[test]
    fn unordered_insertion_stays_sorted() {
        let mut map = CodeMap::default();
        map.mark(0x300, PoolKind::Literal);
        map.mark(0x100, PoolKind::Code);
        map.mark(0x200, PoolKind::Code);
        assert_eq!(map.lookup(0x150), PoolKind::Code);
        assert_eq!(map.lookup(0x310), PoolKind::Literal);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut map = CodeMap::default();
        map.mark(0x100, PoolKind::Literal);
        map.clear();
        assert_eq!(map.lookup(0x100), PoolKind::Code);
    }
}
