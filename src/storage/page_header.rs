//! Page header decoder - the fixed 24-byte prefix shared by every page
//!
//! Layout (all little-endian):
//! `pd_lsn` (two u32 halves), `pd_checksum`, `pd_flags`, `pd_lower`,
//! `pd_upper`, `pd_special`, `pd_pagesize_version`, `pd_prune_xid`.

use crate::storage::bytes;
use crate::storage::flags;
use crate::storage::page_constants::{ITEM_ID_SIZE, PAGE_HEADER_SIZE, PAGE_SIZE};

/// Decoded PageHeaderData
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Write-ahead-log position of the last change to this page
    pub lsn: u64,
    /// Page checksum as stored (not verified by this tool)
    pub checksum: u16,
    /// pd_flags bitfield
    pub flags: u16,
    /// Byte offset of the end of the line-pointer array
    pub lower: u16,
    /// Byte offset of the start of the tuple area
    pub upper: u16,
    /// Byte offset of the start of the special region
    pub special: u16,
    /// Page size (high byte mask) and layout version (low byte)
    pub pagesize_version: u16,
    /// Oldest unpruned xmax on the page, or zero
    pub prune_xid: u32,
}

impl PageHeader {
    /// Decode the header from the first 24 bytes of a page buffer.
    ///
    /// Returns `None` when the buffer is shorter than the fixed header.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < PAGE_HEADER_SIZE {
            return None;
        }
        // pd_lsn is stored as {xlogid, xrecoff}: high half first
        let xlogid = bytes::read_u32(buf, 0)?;
        let xrecoff = bytes::read_u32(buf, 4)?;
        Some(Self {
            lsn: u64::from(xlogid) << 32 | u64::from(xrecoff),
            checksum: bytes::read_u16(buf, 8)?,
            flags: bytes::read_u16(buf, 10)?,
            lower: bytes::read_u16(buf, 12)?,
            upper: bytes::read_u16(buf, 14)?,
            special: bytes::read_u16(buf, 16)?,
            pagesize_version: bytes::read_u16(buf, 18)?,
            prune_xid: bytes::read_u32(buf, 20)?,
        })
    }

    /// Page size as declared in the header (high byte mask), raw.
    pub fn raw_page_size(&self) -> u16 {
        self.pagesize_version & 0xFF00
    }

    /// Page layout version (low byte).
    #[allow(clippy::cast_possible_truncation)]
    pub fn layout_version(&self) -> u8 {
        (self.pagesize_version & 0x00FF) as u8
    }

    /// Effective page size: the declared size, or 8192 when the header
    /// declares none. The decoder always addresses 8192 bytes either way.
    pub fn page_size(&self) -> usize {
        let declared = usize::from(self.raw_page_size());
        if declared == 0 {
            PAGE_SIZE
        } else {
            declared
        }
    }

    /// Number of line pointers derived from `pd_lower`.
    pub fn item_count(&self) -> usize {
        let lower = usize::from(self.lower);
        if lower > PAGE_HEADER_SIZE {
            (lower - PAGE_HEADER_SIZE) / ITEM_ID_SIZE
        } else {
            0
        }
    }

    /// Free space between the line-pointer array and the tuple area.
    pub fn free_space(&self) -> usize {
        usize::from(self.upper).saturating_sub(usize::from(self.lower))
    }

    /// Size of the special region at the end of the page.
    pub fn special_size(&self) -> usize {
        self.page_size().saturating_sub(usize::from(self.special))
    }

    /// Whether `24 <= lower <= upper <= special <= page_size` holds.
    ///
    /// A violation marks the page as malformed but never aborts decoding;
    /// each downstream step re-checks its own slice.
    pub fn has_valid_layout(&self) -> bool {
        let (lower, upper, special) = (
            usize::from(self.lower),
            usize::from(self.upper),
            usize::from(self.special),
        );
        PAGE_HEADER_SIZE <= lower
            && lower <= upper
            && upper <= special
            && special <= self.page_size()
    }

    /// Canonical log-position rendering: `HIGH/LOWLOWLO`.
    pub fn lsn_string(&self) -> String {
        format!("{:X}/{:08X}", self.lsn >> 32, self.lsn & 0xFFFF_FFFF)
    }

    /// pd_flags rendered as named bits, `none` when empty.
    pub fn flags_string(&self) -> String {
        flags::page_flags_string(self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes() -> [u8; PAGE_HEADER_SIZE] {
        let mut buf = [0u8; PAGE_HEADER_SIZE];
        buf[0..4].copy_from_slice(&0x0000_0001u32.to_le_bytes()); // xlogid
        buf[4..8].copy_from_slice(&0x09A1_BC40u32.to_le_bytes()); // xrecoff
        buf[8..10].copy_from_slice(&0x1234u16.to_le_bytes()); // checksum
        buf[10..12].copy_from_slice(&0x0001u16.to_le_bytes()); // flags
        buf[12..14].copy_from_slice(&40u16.to_le_bytes()); // lower
        buf[14..16].copy_from_slice(&8000u16.to_le_bytes()); // upper
        buf[16..18].copy_from_slice(&8176u16.to_le_bytes()); // special
        buf[18..20].copy_from_slice(&0x2004u16.to_le_bytes()); // size | version
        buf[20..24].copy_from_slice(&731u32.to_le_bytes()); // prune_xid
        buf
    }

    #[test]
    fn test_parse_fields() {
        let h = PageHeader::parse(&header_bytes()).unwrap();
        assert_eq!(h.lsn, 0x0000_0001_09A1_BC40);
        assert_eq!(h.checksum, 0x1234);
        assert_eq!(h.flags, 0x0001);
        assert_eq!(h.lower, 40);
        assert_eq!(h.upper, 8000);
        assert_eq!(h.special, 8176);
        assert_eq!(h.prune_xid, 731);
    }

    #[test]
    fn test_parse_short_buffer() {
        assert!(PageHeader::parse(&[0u8; 23]).is_none());
    }

    #[test]
    fn test_page_size_and_version() {
        let h = PageHeader::parse(&header_bytes()).unwrap();
        assert_eq!(h.raw_page_size(), 0x2000);
        assert_eq!(h.page_size(), 8192);
        assert_eq!(h.layout_version(), 4);

        // Zeroed page declares no size; decoder falls back to 8192
        let zero = PageHeader::parse(&[0u8; PAGE_HEADER_SIZE]).unwrap();
        assert_eq!(zero.page_size(), PAGE_SIZE);
    }

    #[test]
    fn test_derived_counts() {
        let h = PageHeader::parse(&header_bytes()).unwrap();
        assert_eq!(h.item_count(), 4); // (40 - 24) / 4
        assert_eq!(h.free_space(), 7960);
        assert_eq!(h.special_size(), 16);
        assert!(h.has_valid_layout());
    }

    #[test]
    fn test_invalid_layout_detected() {
        let mut h = PageHeader::parse(&header_bytes()).unwrap();
        h.lower = 9000;
        assert!(!h.has_valid_layout());
        // Derived values stay total functions
        assert_eq!(h.free_space(), 0);

        h = PageHeader::parse(&header_bytes()).unwrap();
        h.special = 12;
        assert!(!h.has_valid_layout());
    }

    #[test]
    fn test_lsn_rendering() {
        let h = PageHeader::parse(&header_bytes()).unwrap();
        assert_eq!(h.lsn_string(), "1/09A1BC40");
    }

    #[test]
    fn test_item_count_lower_below_header() {
        let mut h = PageHeader::parse(&header_bytes()).unwrap();
        h.lower = 10;
        assert_eq!(h.item_count(), 0);
    }
}
