// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The B-tree collaborator contract (spec §6).
//!
//! Everything in this module is a trait: the ordered key/value store that
//! actually holds inodes, extents, xattrs, and dirents is out of scope for
//! this crate (spec §1). C5, C6, and C7 are written entirely against this
//! contract, so a caller wires in its own storage engine by implementing
//! [`Btree`].

use crate::result::Result;

/// A position in the shared ordered keyspace: `(inum, offset)`. Inode keys
/// always have `offset == 0` (invariant 1).
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct Key {
    pub inum: u64,
    pub offset: u64,
}

impl Key {
    pub const fn new(inum: u64, offset: u64) -> Self {
        Key { inum, offset }
    }

    /// The key of the inode itself: `(inum, 0)`.
    pub const fn inode(inum: u64) -> Self {
        Key::new(inum, 0)
    }
}

/// The ordinal type tag of a value in the inodes keyspace. Holes surface
/// as a synthetic entry whose type sorts below every real value, which is
/// the property the allocator (C5) relies on to recognize a free slot.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum KeyType {
    /// A synthetic marker for an unoccupied position, produced only by a
    /// holes-iterating cursor.
    Hole = 0,
    InodeBlockdev = 1,
    InodeFs = 2,
}

/// Which of the four related keyspaces an operation targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TreeId {
    Inodes,
    Extents,
    Xattrs,
    Dirents,
}

/// The largest on-disk value this subsystem ever reads or writes, sized to
/// hold either a packed [`crate::packed::PackedValue`] or a
/// [`crate::blockdev::BlockdevValue`] without borrowing from the
/// collaborator's storage.
pub const MAX_VALUE_LEN: usize = crate::packed::MAX_VALUE_LEN;

/// A key/value pair as read back from a cursor peek, before any
/// inode-specific interpretation. The value is copied out rather than
/// borrowed, since every value this subsystem handles is small and fixed
/// in maximum size (spec explicitly excludes bulk I/O).
#[derive(Clone, Copy)]
pub struct RawEntry {
    pub key: Key,
    pub key_type: KeyType,
    value: [u8; MAX_VALUE_LEN],
    value_len: usize,
}

impl RawEntry {
    pub fn new(key: Key, key_type: KeyType, value: &[u8]) -> RawEntry {
        assert!(value.len() <= MAX_VALUE_LEN);
        let mut buf = [0u8; MAX_VALUE_LEN];
        buf[..value.len()].copy_from_slice(value);
        RawEntry { key, key_type, value: buf, value_len: value.len() }
    }

    pub fn value(&self) -> &[u8] {
        &self.value[..self.value_len]
    }
}

/// Outcome of an attempted atomic insert: the one internal recovery path
/// this subsystem has (spec §7). A losing racer sees `Retry` and re-peeks
/// at the same position; it never escapes as an error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InsertOutcome {
    Inserted,
    Retry,
}

/// The ordered key/value store this subsystem is layered on top of.
///
/// A cursor carries whatever intent lock the implementation needs to make
/// "observed free" and "inserted" atomic across a single
/// [`Btree::insert_atomic`] call; nothing in this crate holds state across
/// a retry beyond the cursor itself (spec §5).
pub trait Btree {
    type Cursor<'c>
    where
        Self: 'c;

    /// Opens a cursor at `pos` that surfaces unoccupied positions as
    /// synthetic [`KeyType::Hole`] entries instead of skipping them.
    fn iter_init_with_holes<'c>(
        &'c self,
        tree: TreeId,
        pos: Key,
    ) -> Self::Cursor<'c>;

    /// Opens a cursor at `pos` that only surfaces real entries.
    fn iter_init<'c>(&'c self, tree: TreeId, pos: Key) -> Self::Cursor<'c>;

    /// Returns the entry at the cursor's current position without
    /// advancing it.
    fn iter_peek(&self, cursor: &Self::Cursor<'_>) -> Result<RawEntry>;

    /// Advances the cursor to the next key.
    fn iter_advance(&self, cursor: &mut Self::Cursor<'_>);

    /// Commits `(key, value)` iff the cursor's last-peeked position is
    /// still live; otherwise returns `InsertOutcome::Retry` without
    /// committing anything.
    fn insert_atomic(
        &self,
        cursor: &mut Self::Cursor<'_>,
        key: Key,
        value: &[u8],
    ) -> Result<InsertOutcome>;

    /// Deletes every key in `[lo, hi)` from `tree`.
    fn range_delete(&self, tree: TreeId, lo: Key, hi: Key) -> Result<()>;

    /// Inserts `(key, value)` into `tree`. Infallible at the transaction
    /// layer: used only where the caller has already invalidated
    /// cross-tree references to `key` and cannot tolerate silently losing
    /// the write.
    fn point_insert_nofail(&self, tree: TreeId, key: Key, value: &[u8]);

    /// Releases the cursor's intent lock.
    fn iter_unlock(&self, cursor: Self::Cursor<'_>) -> Result<()>;

    /// A cooperative yield point for long-running scans (C7's blockdev
    /// UUID lookup). No-op for collaborators that don't need it.
    fn cond_resched(&self, cursor: &mut Self::Cursor<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inode_key_has_zero_offset() {
        let k = Key::inode(42);
        assert_eq!(k.offset, 0);
        assert_eq!(k.inum, 42);
    }

    #[test]
    fn hole_sorts_below_real_types() {
        assert!(KeyType::Hole < KeyType::InodeBlockdev);
        assert!(KeyType::Hole < KeyType::InodeFs);
        assert!(KeyType::InodeBlockdev < KeyType::InodeFs);
    }

    #[test]
    fn raw_entry_roundtrips_value_bytes() {
        let entry = RawEntry::new(Key::inode(1), KeyType::InodeFs, &[1, 2, 3]);
        assert_eq!(entry.value(), &[1, 2, 3]);
    }
}
