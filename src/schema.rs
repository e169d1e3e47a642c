// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The persistent, ordered list of variable-length inode fields.
//!
//! The original implementation expands a macro list
//! (`BCH_INODE_FIELDS()`) into the body of the pack/unpack/debug-check
//! routines. Here the schema is a static table instead: one array, walked
//! by [`crate::packed`] in both directions. Reordering, removing, or
//! narrowing a row breaks on-disk compatibility; appending one does not.

/// A single schema row: a field's name (for diagnostics only) and its
/// declared bit width. Declared width must be `<= 64`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub bits: u8,
}

macro_rules! field {
    ($name:literal, $bits:literal) => {
        Field { name: $name, bits: $bits }
    };
}

/// The canonical field schema, in persistent on-disk order.
pub const FIELDS: &[Field] = &[
    field!("i_size", 64),
    field!("i_sectors", 64),
    field!("i_uid", 32),
    field!("i_gid", 32),
    field!("i_nlink", 32),
    field!("i_generation", 32),
    field!("i_dev", 32),
    field!("i_atime", 64),
    field!("i_mtime", 64),
    field!("i_ctime", 64),
    field!("i_otime", 64),
];

/// Index of each schema row, named for readability at call sites.
pub mod idx {
    pub const I_SIZE: usize = 0;
    pub const I_SECTORS: usize = 1;
    pub const I_UID: usize = 2;
    pub const I_GID: usize = 3;
    pub const I_NLINK: usize = 4;
    pub const I_GENERATION: usize = 5;
    pub const I_DEV: usize = 6;
    pub const I_ATIME: usize = 7;
    pub const I_MTIME: usize = 8;
    pub const I_CTIME: usize = 9;
    pub const I_OTIME: usize = 10;
}

pub const NR_FIELDS: usize = FIELDS.len();
