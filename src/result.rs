// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt;

/// Errors raised by the codec and lifecycle operations in this crate.
///
/// Validation failures (see [`crate::validate`]) are deliberately not
/// represented here: the validator reports a static string, not an `Error`
/// a caller recovers from.
#[derive(Clone, Copy, Eq, PartialEq)]
pub enum Error {
    /// The field codec ran out of input before decoding a complete field.
    FieldTruncated,
    /// The field codec's first byte was zero; there is no such length marker.
    FieldEmptyMarker,
    /// A decoded field's bit width exceeds the schema's declared width.
    FieldTooWide,
    /// No unused inode number exists in `[min, max)`.
    NoSpace,
    /// No inode exists at the requested number.
    NotFound,
    /// The B-tree collaborator reported an error of its own.
    Btree(&'static str),
}

impl Error {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FieldTruncated => "inode field codec: truncated input",
            Self::FieldEmptyMarker => {
                "inode field codec: zero first byte is not a valid length marker"
            }
            Self::FieldTooWide => {
                "inode field codec: decoded value wider than declared field"
            }
            Self::NoSpace => "inode allocator: no unused inode number in range",
            Self::NotFound => "inode lookup: no such inode",
            Self::Btree(s) => s,
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type Result<T> = core::result::Result<T, Error>;
