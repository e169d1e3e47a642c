// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C2: packing an [`Unpacked`](crate::unpacked::Unpacked) inode into a
//! fixed-key B-tree value, and reversing it.

use crate::field;
use crate::result::{Error, Result};
use crate::schema;
use crate::unpacked::Unpacked;
use bitstruct::bitstruct;
use static_assertions::const_assert;

/// The B-tree value's alignment unit; the packed tail is always zero-padded
/// up to a multiple of this.
pub const ALIGN: usize = 8;

const fn round_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}

/// Byte offsets of the fixed header's members within a packed value.
const HASH_SEED_OFF: usize = 0;
pub(crate) const FLAGS_OFF: usize = 8;
const MODE_OFF: usize = 12;
const NR_FIELDS_OFF: usize = 14;

/// Size of the fixed header: `i_hash_seed`, `i_flags`, `i_mode`, and the
/// `NR_FIELDS` bitfield byte.
pub const HEADER_LEN: usize = NR_FIELDS_OFF + 1;

/// The widest possible tail: every schema field encoded at its maximum
/// length.
const MAX_TAIL_LEN: usize = schema::NR_FIELDS * field::MAX_FIELD_BYTES;

/// The largest a packed value can ever be, aligned up to [`ALIGN`].
pub const MAX_VALUE_LEN: usize = round_up(HEADER_LEN + MAX_TAIL_LEN, ALIGN);

const_assert!(MAX_VALUE_LEN >= HEADER_LEN);

bitstruct! {
    /// The `NR_FIELDS` bitfield header: the count of variable-length
    /// fields actually stored in the tail. Seven bits give headroom for a
    /// schema much larger than the current eleven fields; the top bit is
    /// reserved.
    #[derive(Clone, Copy, Debug)]
    struct FieldCountHeader(u8) {
        nr_fields: u8 = 0..=6;
    }
}

/// A packed inode value: the fixed header plus a minimal, alignment-padded
/// tail of encoded fields. Does not include `inum` — that lives in the
/// B-tree key, not the value.
#[derive(Clone, Copy)]
pub struct PackedValue {
    buf: [u8; MAX_VALUE_LEN],
    len: usize,
}

impl PackedValue {
    /// The on-disk bytes of this value, including alignment padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    fn nr_fields(&self) -> usize {
        FieldCountHeader(self.buf[NR_FIELDS_OFF]).nr_fields() as usize
    }
}

/// Packs `u` into its fixed-key B-tree value (C2).
///
/// In debug builds, immediately unpacks the result and asserts that every
/// field round-trips bit-exact — the same self-check the original gates
/// behind its debug Kconfig option.
pub fn pack(u: &Unpacked) -> PackedValue {
    let mut buf = [0u8; MAX_VALUE_LEN];
    buf[HASH_SEED_OFF..HASH_SEED_OFF + 8].copy_from_slice(&u.i_hash_seed.to_le_bytes());
    buf[FLAGS_OFF..FLAGS_OFF + 4].copy_from_slice(&u.i_flags.to_le_bytes());
    buf[MODE_OFF..MODE_OFF + 2].copy_from_slice(&u.i_mode.to_le_bytes());

    let mut cursor = HEADER_LEN;
    let mut last_nonzero_end = HEADER_LEN;
    let mut last_nonzero_count = 0usize;

    for (i, _field) in schema::FIELDS.iter().enumerate() {
        let v = u.fields[i];
        let n = field::encode(&mut buf[cursor..cursor + field::MAX_FIELD_BYTES], 0, v);
        cursor += n;
        if v != 0 {
            last_nonzero_end = cursor;
            last_nonzero_count = i + 1;
        }
    }

    let used_len = last_nonzero_end;
    let len = round_up(used_len, ALIGN).max(round_up(HEADER_LEN, ALIGN));
    buf[used_len..len].fill(0);

    buf[NR_FIELDS_OFF] =
        FieldCountHeader(0).with_nr_fields(last_nonzero_count as u8).0;

    let packed = PackedValue { buf, len };

    #[cfg(debug_assertions)]
    {
        let unpacked = unpack(packed.as_bytes()).expect("just-packed value unpacks");
        debug_assert_eq!(unpacked.i_hash_seed, u.i_hash_seed);
        debug_assert_eq!(unpacked.i_flags, u.i_flags);
        debug_assert_eq!(unpacked.i_mode, u.i_mode);
        debug_assert_eq!(unpacked.fields, u.fields);
    }

    packed
}

/// Unpacks a raw B-tree value back into an [`Unpacked`] record (minus
/// `inum`, which the caller supplies from the key).
///
/// Schema fields beyond the stored `NR_FIELDS` default to zero (invariant
/// 3). Bytes beyond the last decoded field, up to the value's length, are
/// ignored — this is the forward-compatibility path for schemas that have
/// grown new trailing fields since the value was written.
pub fn unpack(value: &[u8]) -> Result<Unpacked> {
    if value.len() < HEADER_LEN {
        return Err(Error::FieldTruncated);
    }

    let mut u = Unpacked {
        i_hash_seed: u64::from_le_bytes(value[HASH_SEED_OFF..HASH_SEED_OFF + 8].try_into().unwrap()),
        i_flags: u32::from_le_bytes(value[FLAGS_OFF..FLAGS_OFF + 4].try_into().unwrap()),
        i_mode: u16::from_le_bytes(value[MODE_OFF..MODE_OFF + 2].try_into().unwrap()),
        ..Default::default()
    };

    let nr_fields = FieldCountHeader(value[NR_FIELDS_OFF]).nr_fields() as usize;
    let mut input = &value[HEADER_LEN..];

    for (i, field) in schema::FIELDS.iter().enumerate() {
        if i >= nr_fields {
            break;
        }
        let (decoded, consumed) = field::decode(input)?;
        if decoded.bits > field.bits as u32 {
            return Err(Error::FieldTooWide);
        }
        u.fields[i] = decoded.lo;
        input = &input[consumed..];
    }

    Ok(u)
}
