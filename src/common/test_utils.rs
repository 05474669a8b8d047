//! Test utilities for pagescope
//!
//! Builders that assemble synthetic 8 KiB page images byte-by-byte, so
//! tests can exercise the decoders without shipping binary fixtures.

use crate::storage::item_id::ItemStatus;
use crate::storage::page_constants::{
    HEAP_TUPLE_HEADER_SIZE, ITEM_ID_SIZE, PAGE_HEADER_SIZE, PAGE_SIZE,
};
use std::sync::Once;

static TEST_LOGGER_INIT: Once = Once::new();

/// Initialize logging for tests
pub fn init_test_logging() {
    TEST_LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

/// Assembles a synthetic page image with a well-formed header
///
/// Defaults describe an empty heap page: `lower` = 24 (or past the last
/// pushed item), `upper` = `special` = 8192, layout version 4. Every
/// field can be overridden to produce malformed pages.
pub struct PageBuilder {
    buf: [u8; PAGE_SIZE],
    items: Vec<u32>,
    lsn: u64,
    checksum: u16,
    flags: u16,
    explicit_lower: Option<u16>,
    upper: u16,
    special: u16,
    pagesize_version: u16,
    prune_xid: u32,
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PageBuilder {
    /// Start from an empty heap page.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new() -> Self {
        Self {
            buf: [0u8; PAGE_SIZE],
            items: Vec::new(),
            lsn: 0,
            checksum: 0,
            flags: 0,
            explicit_lower: None,
            upper: PAGE_SIZE as u16,
            special: PAGE_SIZE as u16,
            pagesize_version: 0x2004,
            prune_xid: 0,
        }
    }

    /// Set pd_lsn from its two halves.
    pub fn lsn(mut self, high: u32, low: u32) -> Self {
        self.lsn = u64::from(high) << 32 | u64::from(low);
        self
    }

    /// Set pd_flags.
    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    /// Override pd_lower (otherwise derived from pushed items).
    pub fn lower(mut self, lower: u16) -> Self {
        self.explicit_lower = Some(lower);
        self
    }

    /// Set pd_upper.
    pub fn upper(mut self, upper: u16) -> Self {
        self.upper = upper;
        self
    }

    /// Set pd_special.
    pub fn special(mut self, special: u16) -> Self {
        self.special = special;
        self
    }

    /// Set pd_pagesize_version.
    pub fn pagesize_version(mut self, value: u16) -> Self {
        self.pagesize_version = value;
        self
    }

    /// Set pd_prune_xid.
    pub fn prune_xid(mut self, xid: u32) -> Self {
        self.prune_xid = xid;
        self
    }

    /// Push a line pointer composed from its three fields.
    pub fn item(self, status: ItemStatus, offset: u16, length: u16) -> Self {
        let raw =
            u32::from(status as u8) << 15 | u32::from(offset) | u32::from(length) << 17;
        self.raw_item(raw)
    }

    /// Push a raw line-pointer word.
    pub fn raw_item(mut self, raw: u32) -> Self {
        self.items.push(raw);
        self
    }

    /// Splice raw bytes into the page at `offset`.
    ///
    /// # Panics
    ///
    /// Panics when the bytes do not fit in the page (test bug).
    pub fn write_bytes(mut self, offset: usize, data: &[u8]) -> Self {
        self.buf[offset..offset + data.len()].copy_from_slice(data);
        self
    }

    /// Serialize the header and item array and return the page image.
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(mut self) -> [u8; PAGE_SIZE] {
        let derived_lower = (PAGE_HEADER_SIZE + self.items.len() * ITEM_ID_SIZE) as u16;
        let lower = self.explicit_lower.unwrap_or(derived_lower);

        let xlogid = (self.lsn >> 32) as u32;
        let xrecoff = (self.lsn & 0xFFFF_FFFF) as u32;
        self.buf[0..4].copy_from_slice(&xlogid.to_le_bytes());
        self.buf[4..8].copy_from_slice(&xrecoff.to_le_bytes());
        self.buf[8..10].copy_from_slice(&self.checksum.to_le_bytes());
        self.buf[10..12].copy_from_slice(&self.flags.to_le_bytes());
        self.buf[12..14].copy_from_slice(&lower.to_le_bytes());
        self.buf[14..16].copy_from_slice(&self.upper.to_le_bytes());
        self.buf[16..18].copy_from_slice(&self.special.to_le_bytes());
        self.buf[18..20].copy_from_slice(&self.pagesize_version.to_le_bytes());
        self.buf[20..24].copy_from_slice(&self.prune_xid.to_le_bytes());

        for (i, raw) in self.items.iter().enumerate() {
            let off = PAGE_HEADER_SIZE + i * ITEM_ID_SIZE;
            self.buf[off..off + ITEM_ID_SIZE].copy_from_slice(&raw.to_le_bytes());
        }

        self.buf
    }
}

/// Serialize a heap tuple: 23-byte header, optional null bitmap bytes,
/// zero padding up to `hoff`, then the user data.
#[allow(clippy::too_many_arguments)]
pub fn heap_tuple_bytes(
    xmin: u32,
    xmax: u32,
    ctid: (u32, u16),
    infomask2: u16,
    infomask: u16,
    hoff: u8,
    null_bitmap: &[u8],
    user_data: &[u8],
) -> Vec<u8> {
    let mut d = vec![0u8; HEAP_TUPLE_HEADER_SIZE];
    d[0..4].copy_from_slice(&xmin.to_le_bytes());
    d[4..8].copy_from_slice(&xmax.to_le_bytes());
    d[8..12].copy_from_slice(&0u32.to_le_bytes());
    d[12..14].copy_from_slice(&((ctid.0 >> 16) as u16).to_le_bytes());
    d[14..16].copy_from_slice(&((ctid.0 & 0xFFFF) as u16).to_le_bytes());
    d[16..18].copy_from_slice(&ctid.1.to_le_bytes());
    d[18..20].copy_from_slice(&infomask2.to_le_bytes());
    d[20..22].copy_from_slice(&infomask.to_le_bytes());
    d[22] = hoff;
    d.extend_from_slice(null_bitmap);
    d.resize(usize::from(hoff), 0);
    d.extend_from_slice(user_data);
    d
}

/// Serialize an index tuple: 8-byte header then key bytes.
pub fn index_tuple_bytes(tid: (u32, u16), info: u16, key: &[u8]) -> Vec<u8> {
    let mut d = vec![0u8; 8];
    d[0..2].copy_from_slice(&((tid.0 >> 16) as u16).to_le_bytes());
    d[2..4].copy_from_slice(&((tid.0 & 0xFFFF) as u16).to_le_bytes());
    d[4..6].copy_from_slice(&tid.1.to_le_bytes());
    d[6..8].copy_from_slice(&info.to_le_bytes());
    d.extend_from_slice(key);
    d
}

/// Serialize a 16-byte B-tree special region.
pub fn btree_special_bytes(prev: u32, next: u32, level: u32, flags: u16, cycle_id: u16) -> [u8; 16] {
    let mut d = [0u8; 16];
    d[0..4].copy_from_slice(&prev.to_le_bytes());
    d[4..8].copy_from_slice(&next.to_le_bytes());
    d[8..12].copy_from_slice(&level.to_le_bytes());
    d[12..14].copy_from_slice(&flags.to_le_bytes());
    d[14..16].copy_from_slice(&cycle_id.to_le_bytes());
    d
}

/// Serialize a 16-byte hash special region.
pub fn hash_special_bytes(prev: u32, next: u32, bucket: u32, flag: u16, page_id: u16) -> [u8; 16] {
    let mut d = [0u8; 16];
    d[0..4].copy_from_slice(&prev.to_le_bytes());
    d[4..8].copy_from_slice(&next.to_le_bytes());
    d[8..12].copy_from_slice(&bucket.to_le_bytes());
    d[12..14].copy_from_slice(&flag.to_le_bytes());
    d[14..16].copy_from_slice(&page_id.to_le_bytes());
    d
}

/// Serialize a 16-byte GiST special region.
pub fn gist_special_bytes(nsn: u64, rightlink: u32, flags: u16, page_id: u16) -> [u8; 16] {
    let mut d = [0u8; 16];
    d[0..4].copy_from_slice(&((nsn >> 32) as u32).to_le_bytes());
    d[4..8].copy_from_slice(&((nsn & 0xFFFF_FFFF) as u32).to_le_bytes());
    d[8..12].copy_from_slice(&rightlink.to_le_bytes());
    d[12..14].copy_from_slice(&flags.to_le_bytes());
    d[14..16].copy_from_slice(&page_id.to_le_bytes());
    d
}

/// Serialize an 8-byte GIN special region.
pub fn gin_special_bytes(rightlink: u32, maxoff: u16, flags: u16) -> [u8; 8] {
    let mut d = [0u8; 8];
    d[0..4].copy_from_slice(&rightlink.to_le_bytes());
    d[4..6].copy_from_slice(&maxoff.to_le_bytes());
    d[6..8].copy_from_slice(&flags.to_le_bytes());
    d
}

/// Serialize an 8-byte SP-GiST special region.
pub fn spgist_special_bytes(flags: u16, n_redirection: u16, n_placeholder: u16, page_id: u16) -> [u8; 8] {
    let mut d = [0u8; 8];
    d[0..2].copy_from_slice(&flags.to_le_bytes());
    d[2..4].copy_from_slice(&n_redirection.to_le_bytes());
    d[4..6].copy_from_slice(&n_placeholder.to_le_bytes());
    d[6..8].copy_from_slice(&page_id.to_le_bytes());
    d
}

/// Serialize an 8-byte BRIN special region.
pub fn brin_special_bytes(flags: u16, page_type: u16) -> [u8; 8] {
    let mut d = [0u8; 8];
    d[4..6].copy_from_slice(&flags.to_le_bytes());
    d[6..8].copy_from_slice(&page_type.to_le_bytes());
    d
}
