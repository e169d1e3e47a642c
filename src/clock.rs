// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The wall-clock source used to stamp timestamps on newly initialized
//! inodes.
//!
//! Like [`crate::rng`]'s `HashSeedRng`, this is an injected dependency
//! rather than a direct call to a platform clock: the filesystem's epoch
//! and tick rate are mount-time properties the caller owns, and tests want
//! a fixed value rather than real time.

/// Returns the current time, in the filesystem's epoch and units.
pub trait Clock {
    /// The current time, in whatever integer unit the filesystem's four
    /// inode timestamps are stored in (e.g. seconds or nanoseconds since
    /// the filesystem's epoch).
    fn now(&self) -> u64;
}

#[cfg(test)]
pub(crate) struct FixedClock(pub u64);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}
