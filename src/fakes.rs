// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An in-memory [`Btree`] fake, used only by this crate's own tests to
//! exercise C5/C6/C7 without a real storage engine.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::btree::{Btree, InsertOutcome, Key, KeyType, RawEntry, TreeId};
use crate::packed::PackedValue;
use crate::result::{Error, Result};

fn tree_index(tree: TreeId) -> usize {
    match tree {
        TreeId::Inodes => 0,
        TreeId::Extents => 1,
        TreeId::Xattrs => 2,
        TreeId::Dirents => 3,
    }
}

type TreeMap = BTreeMap<Key, (KeyType, Vec<u8>)>;

pub(crate) struct MemBtree {
    trees: RefCell<[TreeMap; 4]>,
}

impl MemBtree {
    pub(crate) fn new() -> Self {
        MemBtree { trees: RefCell::new([TreeMap::new(), TreeMap::new(), TreeMap::new(), TreeMap::new()]) }
    }

    pub(crate) fn seed_fs_inode(&self, inum: u64, value: &PackedValue) {
        self.trees.borrow_mut()[tree_index(TreeId::Inodes)]
            .insert(Key::inode(inum), (KeyType::InodeFs, value.as_bytes().to_vec()));
    }

    pub(crate) fn seed_blockdev_inode(&self, inum: u64, value: &[u8]) {
        self.trees.borrow_mut()[tree_index(TreeId::Inodes)]
            .insert(Key::inode(inum), (KeyType::InodeBlockdev, value.to_vec()));
    }

    pub(crate) fn seed(&self, tree: TreeId, key: Key) {
        self.trees.borrow_mut()[tree_index(tree)].insert(key, (KeyType::InodeFs, Vec::new()));
    }

    pub(crate) fn contains(&self, tree: TreeId, key: Key) -> bool {
        self.trees.borrow()[tree_index(tree)].contains_key(&key)
    }

    pub(crate) fn range_is_empty(&self, tree: TreeId, lo: Key, hi: Key) -> bool {
        self.trees.borrow()[tree_index(tree)].range(lo..hi).next().is_none()
    }

    pub(crate) fn inode_entry(&self, inum: u64) -> Option<(KeyType, Vec<u8>)> {
        self.trees.borrow()[tree_index(TreeId::Inodes)].get(&Key::inode(inum)).cloned()
    }
}

pub(crate) struct MemCursor<'c> {
    tree: TreeId,
    pos: Cell<Key>,
    holes: bool,
    _marker: PhantomData<&'c MemBtree>,
}

impl Btree for MemBtree {
    type Cursor<'c> = MemCursor<'c>;

    fn iter_init_with_holes<'c>(&'c self, tree: TreeId, pos: Key) -> Self::Cursor<'c> {
        MemCursor { tree, pos: Cell::new(pos), holes: true, _marker: PhantomData }
    }

    fn iter_init<'c>(&'c self, tree: TreeId, pos: Key) -> Self::Cursor<'c> {
        MemCursor { tree, pos: Cell::new(pos), holes: false, _marker: PhantomData }
    }

    fn iter_peek(&self, cursor: &Self::Cursor<'_>) -> Result<RawEntry> {
        let trees = self.trees.borrow();
        let map = &trees[tree_index(cursor.tree)];

        if cursor.holes {
            let pos = cursor.pos.get();
            return Ok(match map.get(&pos) {
                Some((key_type, value)) => RawEntry::new(pos, *key_type, value),
                None => RawEntry::new(pos, KeyType::Hole, &[]),
            });
        }

        let start = cursor.pos.get();
        for (key, (key_type, value)) in map.range(start..) {
            if *key_type != KeyType::Hole {
                cursor.pos.set(*key);
                return Ok(RawEntry::new(*key, *key_type, value));
            }
        }
        Err(Error::NotFound)
    }

    fn iter_advance(&self, cursor: &mut Self::Cursor<'_>) {
        let pos = cursor.pos.get();
        cursor.pos.set(Key::new(pos.inum + 1, pos.offset));
    }

    fn insert_atomic(
        &self,
        cursor: &mut Self::Cursor<'_>,
        key: Key,
        value: &[u8],
    ) -> Result<InsertOutcome> {
        let mut trees = self.trees.borrow_mut();
        let map = &mut trees[tree_index(cursor.tree)];
        let free = match map.get(&key) {
            None => true,
            Some((key_type, _)) => *key_type < KeyType::InodeFs,
        };
        if !free {
            return Ok(InsertOutcome::Retry);
        }
        map.insert(key, (KeyType::InodeFs, value.to_vec()));
        Ok(InsertOutcome::Inserted)
    }

    fn range_delete(&self, tree: TreeId, lo: Key, hi: Key) -> Result<()> {
        let mut trees = self.trees.borrow_mut();
        trees[tree_index(tree)].retain(|k, _| *k < lo || *k >= hi);
        Ok(())
    }

    fn point_insert_nofail(&self, tree: TreeId, key: Key, value: &[u8]) {
        self.trees.borrow_mut()[tree_index(tree)].insert(key, (KeyType::Hole, value.to_vec()));
    }

    fn iter_unlock(&self, _cursor: Self::Cursor<'_>) -> Result<()> {
        Ok(())
    }

    fn cond_resched(&self, _cursor: &mut Self::Cursor<'_>) {}
}
