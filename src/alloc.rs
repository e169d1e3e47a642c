// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C5: finding a free inode number and inserting the new inode atomically.

use crate::btree::{Btree, InsertOutcome, Key, KeyType, TreeId};
use crate::packed::{self, PackedValue};
use crate::result::{Error, Result};
use crate::unpacked::Unpacked;

/// Mount-time behavior that affects allocation. Modeled as a small struct
/// rather than scattered booleans, the way the teacher's loader options
/// are grouped.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Clamp every allocation to the 32-bit inode number range, for
    /// compatibility with tooling that can't represent a wider one.
    pub inodes_32bit: bool,
}

/// Allocates the next free inode number in `[min, max)`, starting the
/// search at `*hint`, and inserts `u` (packed) at that position.
///
/// On success, updates `*hint` to one past the inode number used, so the
/// next call continues from there instead of rescanning from the start.
/// Searches forward from the hint; if the range is exhausted, wraps back
/// to `min` exactly once before giving up with [`Error::NoSpace`].
///
/// A cursor position that's raced by a concurrent insert surfaces as
/// [`InsertOutcome::Retry`]; this function re-peeks the same position and
/// tries again rather than treating it as failure.
pub fn create<B: Btree>(
    btree: &B,
    opts: &Options,
    min: u64,
    max: u64,
    hint: &mut u64,
    u: &Unpacked,
) -> Result<u64> {
    let mut max = if max == 0 { u64::MAX } else { max };
    if opts.inodes_32bit {
        max = max.min(u32::MAX as u64);
    }

    if *hint >= max || *hint < min {
        *hint = min;
    }

    let mut searched_from_start = *hint == min;
    let mut packed = packed::pack(u);

    loop {
        if let Some(inum) = search_from(btree, &mut packed, *hint, max)? {
            *hint = inum + 1;
            return Ok(inum);
        }

        if searched_from_start {
            return Err(Error::NoSpace);
        }
        *hint = min;
        searched_from_start = true;
    }
}

/// Scans `[start, max)` for the first unoccupied position and inserts
/// there, retrying on a losing race. Returns `None` if the range is
/// exhausted without finding one.
fn search_from<B: Btree>(
    btree: &B,
    packed: &mut PackedValue,
    start: u64,
    max: u64,
) -> Result<Option<u64>> {
    let mut cursor = btree.iter_init_with_holes(TreeId::Inodes, Key::inode(start));

    loop {
        let entry = match btree.iter_peek(&cursor) {
            Ok(entry) => entry,
            Err(e) => {
                let _ = btree.iter_unlock(cursor);
                return Err(e);
            }
        };

        if entry.key_type < KeyType::InodeFs {
            loop {
                let outcome = match btree.insert_atomic(&mut cursor, entry.key, packed.as_bytes()) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        let _ = btree.iter_unlock(cursor);
                        return Err(e);
                    }
                };
                match outcome {
                    InsertOutcome::Inserted => {
                        btree.iter_unlock(cursor)?;
                        return Ok(Some(entry.key.inum));
                    }
                    InsertOutcome::Retry => {
                        let reentry = match btree.iter_peek(&cursor) {
                            Ok(reentry) => reentry,
                            Err(e) => {
                                let _ = btree.iter_unlock(cursor);
                                return Err(e);
                            }
                        };
                        if reentry.key_type >= KeyType::InodeFs {
                            break;
                        }
                        continue;
                    }
                }
            }
        }

        if cursor_exhausted(&entry, max) {
            btree.iter_unlock(cursor)?;
            return Ok(None);
        }
        btree.iter_advance(&mut cursor);
    }
}

fn cursor_exhausted(entry: &crate::btree::RawEntry, max: u64) -> bool {
    entry.key.inum + 1 >= max
}
