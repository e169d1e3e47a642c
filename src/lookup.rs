// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C7: the two lookup paths — an fs inode by number, and a cached block
//! device by UUID.

use uuid::Uuid;

use crate::blockdev::{BlockdevValue, BLOCKDEV_INODE_MAX, BLOCKDEV_VALUE_LEN};
use crate::btree::{Btree, Key, KeyType, TreeId};
use crate::packed;
use crate::result::{Error, Result};
use crate::unpacked::Unpacked;

/// Looks up the fs inode numbered `inum`. Returns `Ok(None)` if the
/// position is a hole, a tombstone, or holds a blockdev inode instead —
/// any of those read as "not found" from the fs inode's point of view.
pub fn find_by_inum<B: Btree>(btree: &B, inum: u64) -> Result<Option<Unpacked>> {
    let cursor = btree.iter_init_with_holes(TreeId::Inodes, Key::inode(inum));
    let peeked = btree.iter_peek(&cursor);
    btree.iter_unlock(cursor)?;
    let entry = peeked?;

    match entry.key_type {
        KeyType::InodeFs => {
            let mut u = packed::unpack(entry.value())?;
            u.inum = inum;
            Ok(Some(u))
        }
        KeyType::Hole | KeyType::InodeBlockdev => Ok(None),
    }
}

/// Scans the reserved blockdev range for the cached device whose UUID is
/// `uuid`, yielding cooperatively between keys.
///
/// Bounded to `[0, BLOCKDEV_INODE_MAX)`: any key at or past that belongs
/// to the fs keyspace, and the original stops the scan there rather than
/// reading past it.
pub fn find_blockdev_by_uuid<B: Btree>(btree: &B, uuid: &Uuid) -> Result<Option<(u64, BlockdevValue)>> {
    let mut cursor = btree.iter_init(TreeId::Inodes, Key::inode(0));

    loop {
        let entry = match btree.iter_peek(&cursor) {
            Ok(entry) => entry,
            Err(Error::NotFound) => break,
            Err(e) => {
                let _ = btree.iter_unlock(cursor);
                return Err(e);
            }
        };
        if entry.key.inum >= BLOCKDEV_INODE_MAX {
            break;
        }

        if entry.key_type == KeyType::InodeBlockdev && entry.value().len() == BLOCKDEV_VALUE_LEN {
            let buf: [u8; BLOCKDEV_VALUE_LEN] = entry.value().try_into().unwrap();
            let value = BlockdevValue::from_bytes(&buf);
            if value.is_cached_dev() && value.uuid == *uuid {
                let inum = entry.key.inum;
                btree.iter_unlock(cursor)?;
                return Ok(Some((inum, value)));
            }
        }

        btree.cond_resched(&mut cursor);
        btree.iter_advance(&mut cursor);
    }

    btree.iter_unlock(cursor)?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::MemBtree;

    #[test]
    fn finds_a_seeded_fs_inode() {
        let btree = MemBtree::new();
        let u = Unpacked::default();
        btree.seed_fs_inode(42, &packed::pack(&u));

        let found = find_by_inum(&btree, 42).unwrap().unwrap();
        assert_eq!(found.inum, 42);
    }

    #[test]
    fn hole_is_not_found() {
        let btree = MemBtree::new();
        assert_eq!(find_by_inum(&btree, 99).unwrap(), None);
    }

    #[test]
    fn blockdev_entry_is_not_found_as_fs_inode() {
        let btree = MemBtree::new();
        let value = BlockdevValue {
            flags: Default::default(),
            uuid: Uuid::nil(),
            i_hash_seed: 0,
        };
        btree.seed_blockdev_inode(5, &value.to_bytes());
        assert_eq!(find_by_inum(&btree, 5).unwrap(), None);
    }

    #[test]
    fn finds_cached_dev_by_uuid() {
        let btree = MemBtree::new();
        let target = Uuid::from_bytes([9u8; 16]);
        let value = BlockdevValue {
            flags: crate::blockdev::BlockdevFlags::CACHED_DEV,
            uuid: target,
            i_hash_seed: 0,
        };
        btree.seed_blockdev_inode(3, &value.to_bytes());

        let (inum, found) = find_blockdev_by_uuid(&btree, &target).unwrap().unwrap();
        assert_eq!(inum, 3);
        assert_eq!(found.uuid, target);
    }

    #[test]
    fn does_not_match_a_non_cached_dev_with_the_same_uuid() {
        let btree = MemBtree::new();
        let target = Uuid::from_bytes([9u8; 16]);
        let value = BlockdevValue { flags: Default::default(), uuid: target, i_hash_seed: 0 };
        btree.seed_blockdev_inode(3, &value.to_bytes());

        assert_eq!(find_blockdev_by_uuid(&btree, &target).unwrap(), None);
    }

    #[test]
    fn uuid_not_present_returns_none() {
        let btree = MemBtree::new();
        assert_eq!(find_blockdev_by_uuid(&btree, &Uuid::nil()).unwrap(), None);
    }
}
