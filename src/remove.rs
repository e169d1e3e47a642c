// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C6: tearing an inode down — its extents, xattrs, dirents, and finally
//! the inode key itself.

use crate::btree::{Btree, Key, TreeId};
use crate::result::Result;

/// Discards every extent of `inum` at or past `new_size`. Used both as
/// the truncate primitive and, with `new_size == 0`, as the first step of
/// [`remove`].
pub fn truncate<B: Btree>(btree: &B, inum: u64, new_size: u64) -> Result<()> {
    btree.range_delete(TreeId::Extents, Key::new(inum, new_size), Key::new(inum + 1, 0))
}

/// Removes `inum` entirely: discards its extents, deletes its xattrs and
/// dirents, then tombstones the inode key itself.
///
/// The dirent delete is unconditional over the whole `[inum, inum+1)`
/// range even though only hash-collision whiteouts should remain once a
/// directory's real entries are gone — the original leaves this cleanup
/// coarse rather than selective, and this keeps the same tradeoff.
///
/// The final tombstone uses [`Btree::point_insert_nofail`]: by this point
/// every tree that could still reference `inum` has already been
/// invalidated, so there's nothing left to reconcile if the insert were
/// to silently fail.
pub fn remove<B: Btree>(btree: &B, inum: u64) -> Result<()> {
    truncate(btree, inum, 0)?;

    btree.range_delete(TreeId::Xattrs, Key::new(inum, 0), Key::new(inum + 1, 0))?;
    btree.range_delete(TreeId::Dirents, Key::new(inum, 0), Key::new(inum + 1, 0))?;

    btree.point_insert_nofail(TreeId::Inodes, Key::inode(inum), &[]);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::MemBtree;
    use crate::lookup;
    use crate::packed;
    use crate::unpacked::Unpacked;

    #[test]
    fn s6_remove_clears_extents_xattrs_dirents_and_inode() {
        let btree = MemBtree::new();
        let inum = 50;
        btree.seed_fs_inode(inum, &packed::pack(&Unpacked::default()));
        btree.seed(TreeId::Extents, Key::new(inum, 0));
        btree.seed(TreeId::Extents, Key::new(inum, 8));
        btree.seed(TreeId::Xattrs, Key::new(inum, 0));
        btree.seed(TreeId::Dirents, Key::new(inum, 0));

        remove(&btree, inum).unwrap();

        assert!(btree.range_is_empty(TreeId::Extents, Key::new(inum, 0), Key::new(inum + 1, 0)));
        assert!(btree.range_is_empty(TreeId::Xattrs, Key::new(inum, 0), Key::new(inum + 1, 0)));
        assert!(btree.range_is_empty(TreeId::Dirents, Key::new(inum, 0), Key::new(inum + 1, 0)));
        assert_eq!(lookup::find_by_inum(&btree, inum).unwrap(), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let btree = MemBtree::new();
        let inum = 7;
        btree.seed_fs_inode(inum, &packed::pack(&Unpacked::default()));

        remove(&btree, inum).unwrap();
        remove(&btree, inum).unwrap();

        assert_eq!(lookup::find_by_inum(&btree, inum).unwrap(), None);
    }

    #[test]
    fn truncate_only_discards_extents_past_new_size() {
        let btree = MemBtree::new();
        let inum = 9;
        btree.seed(TreeId::Extents, Key::new(inum, 0));
        btree.seed(TreeId::Extents, Key::new(inum, 100));

        truncate(&btree, inum, 50).unwrap();

        assert!(btree.contains(TreeId::Extents, Key::new(inum, 0)));
        assert!(!btree.contains(TreeId::Extents, Key::new(inum, 100)));
    }
}
