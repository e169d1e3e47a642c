// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C3: validating a raw keyspace entry before it's trusted, and rendering
//! a decoded inode for diagnostics.
//!
//! Every path returns a `&'static str`, never panics, and never allocates —
//! this runs on untrusted on-disk bytes, so it has to be total.

use core::fmt::{self, Write};

use crate::blockdev::{BlockdevValue, BLOCKDEV_INODE_MAX, BLOCKDEV_VALUE_LEN};
use crate::btree::{Key, KeyType, RawEntry};
use crate::packed::{self, FLAGS_OFF};
use crate::unpacked::{Unpacked, STR_HASH_NR};

/// Checks a single keyspace entry for the invariants C5/C6/C7 depend on.
/// Returns `None` if the entry is well-formed, or the specific static
/// message describing why it isn't.
///
/// Mirrors the original's `bch2_inode_invalid`, including its checked
/// order: the offset check applies to every type before the per-type
/// checks run.
pub fn invalid(entry: &RawEntry) -> Option<&'static str> {
    if entry.key.offset != 0 {
        return Some("nonzero offset");
    }

    match entry.key_type {
        KeyType::Hole => None,
        KeyType::InodeFs => invalid_fs(entry.key, entry.value()),
        KeyType::InodeBlockdev => invalid_blockdev(entry.key, entry.value()),
    }
}

fn invalid_fs(key: Key, value: &[u8]) -> Option<&'static str> {
    if value.len() < packed::HEADER_LEN {
        return Some("incorrect value size");
    }
    if key.inum < BLOCKDEV_INODE_MAX {
        return Some("fs inode in blockdev range");
    }

    let str_hash = extract_str_hash(value);
    if str_hash >= STR_HASH_NR {
        return Some("invalid str hash type");
    }

    if packed::unpack(value).is_err() {
        return Some("invalid variable length fields");
    }

    None
}

fn invalid_blockdev(key: Key, value: &[u8]) -> Option<&'static str> {
    if value.len() != BLOCKDEV_VALUE_LEN {
        return Some("incorrect value size");
    }
    if key.inum >= BLOCKDEV_INODE_MAX {
        return Some("blockdev inode in fs range");
    }

    None
}

/// Reads the `str_hash` sub-field straight out of the packed `i_flags`
/// bytes, without a full unpack — this check has to run before unpack is
/// known to succeed.
fn extract_str_hash(value: &[u8]) -> u8 {
    let flags = u32::from_le_bytes(value[FLAGS_OFF..FLAGS_OFF + 4].try_into().unwrap());
    ((flags >> crate::unpacked::STR_HASH_OFFSET) & 0xf) as u8
}

/// Formats a decoded inode for diagnostics, writing into `out`. Replaces
/// the original's `scnprintf` into a caller-owned buffer with
/// [`core::fmt::Write`], the idiomatic `no_std` equivalent.
pub fn to_text(out: &mut dyn Write, u: &Unpacked) -> fmt::Result {
    write!(out, "i_size {}", u.i_size())
}

/// Formats an entry that failed to unpack, for diagnostics.
pub fn unpack_error_text(out: &mut dyn Write) -> fmt::Result {
    write!(out, "(unpack error)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unpacked::Flags;

    fn fs_entry(inum: u64, value: &[u8]) -> RawEntry {
        RawEntry::new(Key::inode(inum), KeyType::InodeFs, value)
    }

    #[test]
    fn nonzero_offset_is_rejected_for_any_type() {
        let entry = RawEntry::new(Key::new(5, 1), KeyType::InodeFs, &[0u8; 20]);
        assert_eq!(invalid(&entry), Some("nonzero offset"));
    }

    #[test]
    fn hole_is_always_valid() {
        let entry = RawEntry::new(Key::new(5, 0), KeyType::Hole, &[]);
        assert_eq!(invalid(&entry), None);
    }

    #[test]
    fn fs_inode_below_blockdev_range_is_rejected() {
        let u = Unpacked::default();
        let packed = packed::pack(&u);
        let entry = fs_entry(100, packed.as_bytes());
        assert_eq!(invalid(&entry), Some("fs inode in blockdev range"));
    }

    #[test]
    fn fs_inode_too_short_is_rejected() {
        let entry = fs_entry(BLOCKDEV_INODE_MAX, &[0u8; 4]);
        assert_eq!(invalid(&entry), Some("incorrect value size"));
    }

    #[test]
    fn fs_inode_bad_str_hash_is_rejected() {
        let mut u = Unpacked::default();
        u.i_flags = Flags::empty().with_str_hash(STR_HASH_NR).bits();
        let packed = packed::pack(&u);
        let entry = fs_entry(BLOCKDEV_INODE_MAX, packed.as_bytes());
        assert_eq!(invalid(&entry), Some("invalid str hash type"));
    }

    #[test]
    fn s4_truncated_tail_reports_invalid_variable_length_fields() {
        let mut value = [0u8; 20];
        value[14] = 1; // NR_FIELDS claims one field
        value[15] = 0x01; // marker byte for a 13-byte field, only 5 bytes follow
        let entry = fs_entry(BLOCKDEV_INODE_MAX, &value);
        assert_eq!(invalid(&entry), Some("invalid variable length fields"));
    }

    #[test]
    fn well_formed_fs_inode_is_valid() {
        let u = Unpacked::default();
        let packed = packed::pack(&u);
        let entry = fs_entry(BLOCKDEV_INODE_MAX, packed.as_bytes());
        assert_eq!(invalid(&entry), None);
    }

    #[test]
    fn blockdev_inode_in_fs_range_is_rejected() {
        let value = BlockdevValue {
            flags: Default::default(),
            uuid: uuid::Uuid::nil(),
            i_hash_seed: 0,
        }
        .to_bytes();
        let entry = RawEntry::new(Key::inode(BLOCKDEV_INODE_MAX), KeyType::InodeBlockdev, &value);
        assert_eq!(invalid(&entry), Some("blockdev inode in fs range"));
    }

    #[test]
    fn blockdev_inode_wrong_size_is_rejected() {
        let entry = RawEntry::new(Key::inode(1), KeyType::InodeBlockdev, &[0u8; 10]);
        assert_eq!(invalid(&entry), Some("incorrect value size"));
    }

    #[test]
    fn well_formed_blockdev_inode_is_valid() {
        let value = BlockdevValue {
            flags: Default::default(),
            uuid: uuid::Uuid::nil(),
            i_hash_seed: 0,
        }
        .to_bytes();
        let entry = RawEntry::new(Key::inode(1), KeyType::InodeBlockdev, &value);
        assert_eq!(invalid(&entry), None);
    }
}
