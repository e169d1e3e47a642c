// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The random source backing `i_hash_seed`.
//!
//! The seed must be unpredictable to filesystem users (it feeds directory
//! hashing) but need not be secret, and need not be the filesystem's only
//! consumer of randomness. Rather than reach for a concrete RNG, the
//! initializer takes this trait as a parameter, so tests can hand it a
//! fixed byte stream instead of real entropy.

use rand_core::RngCore;

/// A source of bytes suitable for seeding directory hashing.
pub trait HashSeedRng {
    /// Returns a fresh 64-bit seed.
    fn next_seed(&mut self) -> u64;
}

impl<R: RngCore> HashSeedRng for R {
    fn next_seed(&mut self) -> u64 {
        self.next_u64()
    }
}

#[cfg(test)]
pub(crate) struct FixedRng(pub u64);

#[cfg(test)]
impl HashSeedRng for FixedRng {
    fn next_seed(&mut self) -> u64 {
        self.0
    }
}
