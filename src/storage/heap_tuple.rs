//! Heap tuple header decoder (HeapTupleHeaderData, 23 bytes)
//!
//! Carries the MVCC metadata of one row version: creating and deleting
//! transaction ids, the ctid chain pointer, and the two infomask words.
//! User data is surfaced as a raw slice; attribute decoding against a
//! catalog schema is out of scope.

use crate::storage::bytes;
use crate::storage::flags;
use crate::storage::item_id::ItemId;
use crate::storage::page_constants::{HEAP_TUPLE_HEADER_SIZE, INVALID_XID};

/// Two-bit xmin commit status projected from t_infomask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XminStatus {
    /// Neither status bit set
    Unknown,
    /// 0x0100: inserter known committed
    Committed,
    /// 0x0200: inserter known aborted or crashed
    Invalid,
    /// 0x0300: both bits - tuple frozen
    Frozen,
}

impl XminStatus {
    fn name(self) -> Option<&'static str> {
        match self {
            XminStatus::Unknown => None,
            XminStatus::Committed => Some("XMIN_COMMITTED"),
            XminStatus::Invalid => Some("XMIN_INVALID"),
            XminStatus::Frozen => Some("XMIN_FROZEN"),
        }
    }
}

/// Decoded HeapTupleHeaderData
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapTupleHeader {
    /// Inserting transaction id
    pub xmin: u32,
    /// Deleting or locking transaction id, zero when none
    pub xmax: u32,
    /// Command id or combo command id, depending on t_infomask
    pub field3: u32,
    /// Current TID of this or the newer row version: block number
    pub ctid_block: u32,
    /// Current TID: offset number
    pub ctid_offset: u16,
    /// Attribute count plus flag bits
    pub infomask2: u16,
    /// MVCC and storage flag bits
    pub infomask: u16,
    /// Offset from tuple start to user data (header + null bitmap, padded)
    pub hoff: u8,
}

impl HeapTupleHeader {
    /// Decode a heap tuple header at `offset` within the page buffer.
    ///
    /// Returns `None` when fewer than 23 bytes remain at the offset.
    pub fn parse(page: &[u8], offset: usize) -> Option<Self> {
        let d = bytes::slice(page, offset, HEAP_TUPLE_HEADER_SIZE)?;
        // ctid block number is stored as two u16 halves, high first
        let bi_hi = bytes::read_u16(d, 12)?;
        let bi_lo = bytes::read_u16(d, 14)?;
        Some(Self {
            xmin: bytes::read_u32(d, 0)?,
            xmax: bytes::read_u32(d, 4)?,
            field3: bytes::read_u32(d, 8)?,
            ctid_block: u32::from(bi_hi) << 16 | u32::from(bi_lo),
            ctid_offset: bytes::read_u16(d, 16)?,
            infomask2: bytes::read_u16(d, 18)?,
            infomask: bytes::read_u16(d, 20)?,
            hoff: bytes::read_u8(d, 22)?,
        })
    }

    /// Attribute count (low 11 bits of t_infomask2).
    pub fn natts(&self) -> u16 {
        self.infomask2 & 0x07FF
    }

    /// Whether xmax holds no valid deleter.
    pub fn xmax_invalid(&self) -> bool {
        self.xmax == INVALID_XID
    }

    /// Whether a null bitmap follows the fixed header.
    pub fn has_nulls(&self) -> bool {
        self.infomask & 0x0001 != 0
    }

    /// Two-bit xmin commit status (t_infomask & 0x0300).
    pub fn xmin_status(&self) -> XminStatus {
        match self.infomask & 0x0300 {
            0x0100 => XminStatus::Committed,
            0x0200 => XminStatus::Invalid,
            0x0300 => XminStatus::Frozen,
            _ => XminStatus::Unknown,
        }
    }

    /// Named t_infomask bits, in stable order; the xmin status field is
    /// projected to at most one name between the low and high groups.
    pub fn infomask_flags(&self) -> Vec<&'static str> {
        let mut names = flags::collect_names(self.infomask, flags::HEAP_INFOMASK_LOW);
        if let Some(xmin) = self.xmin_status().name() {
            names.push(xmin);
        }
        names.extend(flags::collect_names(self.infomask, flags::HEAP_INFOMASK_HIGH));
        names
    }

    /// Named t_infomask2 flag bits, in stable order.
    pub fn infomask2_flags(&self) -> Vec<&'static str> {
        flags::collect_names(self.infomask2, flags::HEAP_INFOMASK2)
    }

    /// Width of the null bitmap in bytes, when present.
    pub fn null_bitmap_len(&self) -> usize {
        if self.has_nulls() {
            (usize::from(self.natts()) + 7) / 8
        } else {
            0
        }
    }

    /// The null bitmap bytes between the fixed header and `hoff`,
    /// clamped to the page. Empty when the tuple has no nulls.
    pub fn null_bitmap<'a>(&self, page: &'a [u8], item: ItemId) -> &'a [u8] {
        let start = usize::from(item.offset()) + HEAP_TUPLE_HEADER_SIZE;
        bytes::slice_clamped(page, start, start + self.null_bitmap_len())
    }

    /// The user-data slice `[offset + hoff, offset + length)`, clamped
    /// to the page bounds.
    pub fn user_data<'a>(&self, page: &'a [u8], item: ItemId) -> &'a [u8] {
        let start = usize::from(item.offset()) + usize::from(self.hoff);
        let end = usize::from(item.offset()) + usize::from(item.length());
        bytes::slice_clamped(page, start, end)
    }
}
