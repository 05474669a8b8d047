//! Meta-page decoders
//!
//! The first page of a btree, hash, GIN, or BRIN index stores an
//! access-method-wide record in the content area, starting at the
//! MAXALIGNed header boundary (offset 24). The record shapes overlap too
//! little to share an interface; dispatch is a single conditional after
//! the special region identifies a meta page.

use crate::storage::bytes;
use crate::storage::page_constants::{
    BRIN_META_MAGIC, BTREE_META_MAGIC, HASH_META_MAGIC, META_CONTENT_OFFSET,
};

/// BTMetaPageData (24 decoded bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreeMeta {
    /// Must equal 0x00053162
    pub magic: u32,
    /// Meta-page format version
    pub version: u32,
    /// Current root block, or NONE
    pub root: u32,
    /// Level of the root
    pub level: u32,
    /// Shortcut root for single-page trees, or NONE
    pub fast_root: u32,
    /// Level of the fast root
    pub fast_level: u32,
}

impl BTreeMeta {
    /// Decode from a full page buffer.
    pub fn parse(page: &[u8]) -> Option<Self> {
        let d = bytes::slice(page, META_CONTENT_OFFSET, 24)?;
        Some(Self {
            magic: bytes::read_u32(d, 0)?,
            version: bytes::read_u32(d, 4)?,
            root: bytes::read_u32(d, 8)?,
            level: bytes::read_u32(d, 12)?,
            fast_root: bytes::read_u32(d, 16)?,
            fast_level: bytes::read_u32(d, 20)?,
        })
    }

    /// Whether the magic word matches.
    pub fn is_valid(&self) -> bool {
        self.magic == BTREE_META_MAGIC
    }
}

/// HashMetaPageData (48 decoded bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashMeta {
    /// Must equal 0x06440640
    pub magic: u32,
    /// Meta-page format version
    pub version: u32,
    /// Estimated tuple count, stored as an IEEE-754 double
    pub ntuples: f64,
    /// Target tuples per bucket
    pub ffactor: u16,
    /// Index page size available for tuples
    pub bsize: u16,
    /// Bitmap array size in bytes
    pub bmsize: u16,
    /// log2 of bitmap array size in bits
    pub bmshift: u16,
    /// Highest bucket in use
    pub maxbucket: u32,
    /// Mask for bucket number modulo computation
    pub highmask: u32,
    /// Mask for the previous power of two
    pub lowmask: u32,
    /// Split point of the highest bucket
    pub ovflpoint: u32,
    /// First free overflow page bit
    pub firstfree: u32,
    /// Number of bitmap pages
    pub nmaps: u32,
}

impl HashMeta {
    /// Decode from a full page buffer.
    pub fn parse(page: &[u8]) -> Option<Self> {
        let d = bytes::slice(page, META_CONTENT_OFFSET, 48)?;
        Some(Self {
            magic: bytes::read_u32(d, 0)?,
            version: bytes::read_u32(d, 4)?,
            ntuples: f64::from_bits(bytes::read_u64(d, 8)?),
            ffactor: bytes::read_u16(d, 16)?,
            bsize: bytes::read_u16(d, 18)?,
            bmsize: bytes::read_u16(d, 20)?,
            bmshift: bytes::read_u16(d, 22)?,
            maxbucket: bytes::read_u32(d, 24)?,
            highmask: bytes::read_u32(d, 28)?,
            lowmask: bytes::read_u32(d, 32)?,
            ovflpoint: bytes::read_u32(d, 36)?,
            firstfree: bytes::read_u32(d, 40)?,
            nmaps: bytes::read_u32(d, 44)?,
        })
    }

    /// Whether the magic word matches.
    pub fn is_valid(&self) -> bool {
        self.magic == HASH_META_MAGIC
    }
}

/// GinMetaPageData (48 decoded bytes)
///
/// The on-disk struct aligns its 64-bit fields to 8 bytes, which leaves
/// 4 bytes of padding between `n_data_pages` and `n_entries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GinMeta {
    /// Head of the pending-entries list, or NONE
    pub head: u32,
    /// Tail of the pending-entries list, or NONE
    pub tail: u32,
    /// Free space on the tail page
    pub tail_free_size: u32,
    /// Number of pages in the pending list
    pub n_pending_pages: u32,
    /// Number of heap tuples in the pending list
    pub n_pending_heap_tuples: i64,
    /// Total index pages
    pub n_total_pages: u32,
    /// Entry-tree pages
    pub n_entry_pages: u32,
    /// Data-tree pages
    pub n_data_pages: u32,
    /// Number of entries in the entry tree
    pub n_entries: i64,
}

impl GinMeta {
    /// Decode from a full page buffer.
    #[allow(clippy::cast_possible_wrap)]
    pub fn parse(page: &[u8]) -> Option<Self> {
        let d = bytes::slice(page, META_CONTENT_OFFSET, 48)?;
        Some(Self {
            head: bytes::read_u32(d, 0)?,
            tail: bytes::read_u32(d, 4)?,
            tail_free_size: bytes::read_u32(d, 8)?,
            n_pending_pages: bytes::read_u32(d, 12)?,
            n_pending_heap_tuples: bytes::read_u64(d, 16)? as i64,
            n_total_pages: bytes::read_u32(d, 24)?,
            n_entry_pages: bytes::read_u32(d, 28)?,
            n_data_pages: bytes::read_u32(d, 32)?,
            // 4 bytes of alignment padding at 36..40
            n_entries: bytes::read_u64(d, 40)? as i64,
        })
    }
}

/// BrinMetaPageData (16 decoded bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrinMeta {
    /// Must equal 0xA8109CFA
    pub magic: u32,
    /// Meta-page format version
    pub version: u32,
    /// Heap blocks summarized per range
    pub pages_per_range: u32,
    /// Last range-map page
    pub last_revmap_page: u32,
}

impl BrinMeta {
    /// Decode from a full page buffer.
    pub fn parse(page: &[u8]) -> Option<Self> {
        let d = bytes::slice(page, META_CONTENT_OFFSET, 16)?;
        Some(Self {
            magic: bytes::read_u32(d, 0)?,
            version: bytes::read_u32(d, 4)?,
            pages_per_range: bytes::read_u32(d, 8)?,
            last_revmap_page: bytes::read_u32(d, 12)?,
        })
    }

    /// Whether the magic word matches.
    pub fn is_valid(&self) -> bool {
        self.magic == BRIN_META_MAGIC
    }
}
