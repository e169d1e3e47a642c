// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The blockdev inode variant: a fixed-size value living in a reserved,
//! low range of the shared inode keyspace, identifying a cached block
//! device by UUID rather than a file by its packed fields.

use bitflags::bitflags;
use static_assertions::const_assert_eq;
use uuid::Uuid;

/// Inode numbers below this belong to the blockdev keyspace; `BCH_INODE_FS`
/// entries may never use them (C3, "fs inode in blockdev range"), and
/// `BCH_INODE_BLOCKDEV` entries may never stray above it (C3, "blockdev
/// inode in fs range").
pub const BLOCKDEV_INODE_MAX: u64 = 1 << 16;

bitflags! {
    /// Independent boolean flags on a blockdev inode. Only one bit is
    /// defined today; the rest are reserved.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct BlockdevFlags: u64 {
        /// This blockdev inode describes a cached device (as opposed to a
        /// cache device); its UUID is meaningful for
        /// [`crate::lookup::find_blockdev_by_uuid`].
        const CACHED_DEV = 1 << 0;
    }
}

/// The on-disk value size of a blockdev inode. C3 rejects any value whose
/// length differs from this ("incorrect value size") — unlike the fs
/// variant, there is no variable-length tail to make minimal.
pub const BLOCKDEV_VALUE_LEN: usize = 8 + 16 + 8;
const_assert_eq!(BLOCKDEV_VALUE_LEN, 32);

/// A blockdev inode's value: fixed size, no packed tail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockdevValue {
    pub flags: BlockdevFlags,
    pub uuid: Uuid,
    pub i_hash_seed: u64,
}

impl BlockdevValue {
    pub fn to_bytes(&self) -> [u8; BLOCKDEV_VALUE_LEN] {
        let mut buf = [0u8; BLOCKDEV_VALUE_LEN];
        buf[0..8].copy_from_slice(&self.flags.bits().to_le_bytes());
        buf[8..24].copy_from_slice(self.uuid.as_bytes());
        buf[24..32].copy_from_slice(&self.i_hash_seed.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; BLOCKDEV_VALUE_LEN]) -> Self {
        let flags = BlockdevFlags::from_bits_truncate(u64::from_le_bytes(
            buf[0..8].try_into().unwrap(),
        ));
        let uuid = Uuid::from_bytes(buf[8..24].try_into().unwrap());
        let i_hash_seed = u64::from_le_bytes(buf[24..32].try_into().unwrap());
        BlockdevValue { flags, uuid, i_hash_seed }
    }

    pub fn is_cached_dev(&self) -> bool {
        self.flags.contains(BlockdevFlags::CACHED_DEV)
    }
}
