// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The in-memory, fully expanded representation of an inode (C4, and the
//! unpacked half of C2).

use crate::clock::Clock;
use crate::rng::HashSeedRng;
use bitstruct::bitstruct;

/// Bit offset of the string-hash type selector within `i_flags`.
pub const STR_HASH_OFFSET: u32 = 20;

/// Number of string-hash types the selector can name. A decoded selector
/// `>= STR_HASH_NR` fails validation (spec C3, "invalid str hash type").
pub const STR_HASH_NR: u8 = 4;

bitstruct! {
    /// `i_flags`, with the string-hash type broken out as a sub-field.
    /// All other bits are reserved for future flags and pass through
    /// pack/unpack untouched.
    #[derive(Clone, Copy, Debug)]
    pub struct Flags(u32) {
        pub str_hash: u8 = 20..=23;
    }
}

impl Flags {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

/// The unpacked, flat representation of an inode.
///
/// `inum` and the fixed header (`i_hash_seed`, `i_flags`, `i_mode`) are
/// always present; the remaining fields mirror [`crate::schema::FIELDS`]
/// in the same order, stored uniformly as `u64` regardless of their
/// declared bit width (the width is enforced at pack/unpack time, not by
/// the type system, matching the original's `BCH_INODE_FIELDS()` macro
/// expansion over differently-typed C struct members).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Unpacked {
    pub inum: u64,
    pub i_hash_seed: u64,
    pub i_flags: u32,
    pub i_mode: u16,
    pub fields: [u64; crate::schema::NR_FIELDS],
}

impl Unpacked {
    pub fn flags(&self) -> Flags {
        Flags::from_bits(self.i_flags)
    }

    pub fn i_size(&self) -> u64 {
        self.fields[crate::schema::idx::I_SIZE]
    }
    pub fn i_sectors(&self) -> u64 {
        self.fields[crate::schema::idx::I_SECTORS]
    }
    pub fn i_uid(&self) -> u64 {
        self.fields[crate::schema::idx::I_UID]
    }
    pub fn i_gid(&self) -> u64 {
        self.fields[crate::schema::idx::I_GID]
    }
    pub fn i_nlink(&self) -> u64 {
        self.fields[crate::schema::idx::I_NLINK]
    }
    pub fn i_generation(&self) -> u64 {
        self.fields[crate::schema::idx::I_GENERATION]
    }
    pub fn i_dev(&self) -> u64 {
        self.fields[crate::schema::idx::I_DEV]
    }
    pub fn i_atime(&self) -> u64 {
        self.fields[crate::schema::idx::I_ATIME]
    }
    pub fn i_mtime(&self) -> u64 {
        self.fields[crate::schema::idx::I_MTIME]
    }
    pub fn i_ctime(&self) -> u64 {
        self.fields[crate::schema::idx::I_CTIME]
    }
    pub fn i_otime(&self) -> u64 {
        self.fields[crate::schema::idx::I_OTIME]
    }
}

/// Creates a new, zeroed inode record with mode/uid/gid/rdev set from the
/// caller, all four timestamps set to the current time, the filesystem's
/// configured string-hash type folded into `i_flags`, and a fresh
/// unpredictable hash seed (C4).
///
/// `inum` is left `0`; the allocator (C5) assigns the real number on
/// insertion.
pub fn init(
    clock: &dyn Clock,
    rng: &mut dyn HashSeedRng,
    str_hash_type: u8,
    mode: u16,
    uid: u32,
    gid: u32,
    rdev: u32,
) -> Unpacked {
    let mut u = Unpacked::default();

    u.i_flags = Flags::empty().with_str_hash(str_hash_type).bits();
    u.i_hash_seed = rng.next_seed();
    u.i_mode = mode;

    let now = clock.now();
    u.fields[crate::schema::idx::I_UID] = uid as u64;
    u.fields[crate::schema::idx::I_GID] = gid as u64;
    u.fields[crate::schema::idx::I_DEV] = rdev as u64;
    u.fields[crate::schema::idx::I_ATIME] = now;
    u.fields[crate::schema::idx::I_MTIME] = now;
    u.fields[crate::schema::idx::I_CTIME] = now;
    u.fields[crate::schema::idx::I_OTIME] = now;

    u
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::rng::FixedRng;

    #[test]
    fn init_sets_timestamps_mode_and_seed() {
        let clock = FixedClock(1_700_000_000);
        let mut rng = FixedRng(0xdead_beef_cafe_babe);
        let u = init(&clock, &mut rng, 2, 0o755, 1000, 1000, 0);

        assert_eq!(u.i_mode, 0o755);
        assert_eq!(u.i_uid(), 1000);
        assert_eq!(u.i_gid(), 1000);
        assert_eq!(u.i_dev(), 0);
        assert_eq!(u.i_atime(), 1_700_000_000);
        assert_eq!(u.i_mtime(), 1_700_000_000);
        assert_eq!(u.i_ctime(), 1_700_000_000);
        assert_eq!(u.i_otime(), 1_700_000_000);
        assert_eq!(u.i_hash_seed, 0xdead_beef_cafe_babe);
        assert_eq!(u.flags().str_hash(), 2);
    }

    #[test]
    fn init_leaves_inum_and_size_zero() {
        let clock = FixedClock(0);
        let mut rng = FixedRng(0);
        let u = init(&clock, &mut rng, 0, 0, 0, 0, 0);
        assert_eq!(u.inum, 0);
        assert_eq!(u.i_size(), 0);
        assert_eq!(u.i_sectors(), 0);
    }
}
