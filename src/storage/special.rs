//! Special-region decoders, one per access method
//!
//! Each index kind stores a fixed-size opaque record at the end of its
//! pages. The shapes share almost nothing, so they are a tagged variant
//! with exhaustive matching at every presentation site - a misclassified
//! page can then never render the wrong schema.

use crate::storage::bytes;
use crate::storage::flags;
use crate::storage::page_constants::{
    BRIN_PAGETYPE_META, BRIN_PAGETYPE_REGULAR, BRIN_PAGETYPE_REVMAP, BRIN_SPECIAL_SIZE,
    BTREE_SPECIAL_SIZE, GIN_SPECIAL_SIZE, GIST_SPECIAL_SIZE, HASH_SPECIAL_SIZE,
    SPGIST_SPECIAL_SIZE,
};
use crate::storage::page_type::PageType;

/// BTPageOpaqueData (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreeSpecial {
    /// Left sibling block, or NONE
    pub prev_block: u32,
    /// Right sibling block, or NONE
    pub next_block: u32,
    /// Tree level; zero means leaf
    pub level: u32,
    /// btpo_flags
    pub flags: u16,
    /// Vacuum cycle id
    pub cycle_id: u16,
}

impl BTreeSpecial {
    fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < BTREE_SPECIAL_SIZE {
            return None;
        }
        Some(Self {
            prev_block: bytes::read_u32(data, 0)?,
            next_block: bytes::read_u32(data, 4)?,
            level: bytes::read_u32(data, 8)?,
            flags: bytes::read_u16(data, 12)?,
            cycle_id: bytes::read_u16(data, 14)?,
        })
    }

    /// Whether this is a leaf-level page.
    pub fn is_leaf(&self) -> bool {
        self.level == 0
    }

    /// Whether BTP_META is set, making page content a meta record.
    pub fn is_meta(&self) -> bool {
        self.flags & 0x0008 != 0
    }

    /// Named btpo_flags bits, in stable order.
    pub fn flag_names(&self) -> Vec<&'static str> {
        flags::collect_names(self.flags, flags::BTREE_FLAGS)
    }
}

/// HashPageOpaqueData (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashSpecial {
    /// Previous overflow/bucket block, or NONE
    pub prev_block: u32,
    /// Next overflow block, or NONE
    pub next_block: u32,
    /// Bucket number this page belongs to
    pub bucket: u32,
    /// Page kind (low nibble) and lifecycle bits
    pub flag: u16,
    /// Must equal 0xFF80
    pub page_id: u16,
}

impl HashSpecial {
    fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < HASH_SPECIAL_SIZE {
            return None;
        }
        Some(Self {
            prev_block: bytes::read_u32(data, 0)?,
            next_block: bytes::read_u32(data, 4)?,
            bucket: bytes::read_u32(data, 8)?,
            flag: bytes::read_u16(data, 12)?,
            page_id: bytes::read_u16(data, 14)?,
        })
    }

    /// Page kind selected by the low nibble of hasho_flag.
    pub fn page_kind_name(&self) -> Option<&'static str> {
        match self.flag & 0x000F {
            0x0001 => Some("LH_OVERFLOW_PAGE"),
            0x0002 => Some("LH_BUCKET_PAGE"),
            0x0004 => Some("LH_BITMAP_PAGE"),
            0x0008 => Some("LH_META_PAGE"),
            0x0000 => Some("LH_UNUSED_PAGE"),
            _ => None,
        }
    }

    /// Whether the low nibble marks this as the hash meta page.
    pub fn is_meta(&self) -> bool {
        self.flag & 0x0008 != 0
    }

    /// Page kind followed by lifecycle bits, in stable order.
    pub fn flag_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if let Some(kind) = self.page_kind_name() {
            names.push(kind);
        }
        names.extend(flags::collect_names(self.flag, flags::HASH_FLAGS_HIGH));
        names
    }
}

/// GISTPageOpaqueData (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GistSpecial {
    /// Node sequence number used to detect concurrent splits
    pub nsn: u64,
    /// Right sibling block, or NONE
    pub rightlink: u32,
    /// GiST flags
    pub flags: u16,
    /// Must equal 0xFF81
    pub page_id: u16,
}

impl GistSpecial {
    fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < GIST_SPECIAL_SIZE {
            return None;
        }
        // nsn words compose first-word-high; preserved from the wire format
        let w0 = bytes::read_u32(data, 0)?;
        let w1 = bytes::read_u32(data, 4)?;
        Some(Self {
            nsn: u64::from(w0) << 32 | u64::from(w1),
            rightlink: bytes::read_u32(data, 8)?,
            flags: bytes::read_u16(data, 12)?,
            page_id: bytes::read_u16(data, 14)?,
        })
    }

    /// Log-position rendering of the nsn: `HIGH/LOWLOWLO`.
    pub fn nsn_string(&self) -> String {
        format!("{:X}/{:08X}", self.nsn >> 32, self.nsn & 0xFFFF_FFFF)
    }

    /// Named GiST flags, in stable order.
    pub fn flag_names(&self) -> Vec<&'static str> {
        flags::collect_names(self.flags, flags::GIST_FLAGS)
    }
}

/// GinPageOpaqueData (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GinSpecial {
    /// Right sibling block, or NONE
    pub rightlink: u32,
    /// Number of used offsets on a data page
    pub maxoff: u16,
    /// GIN flags
    pub flags: u16,
}

impl GinSpecial {
    fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < GIN_SPECIAL_SIZE {
            return None;
        }
        Some(Self {
            rightlink: bytes::read_u32(data, 0)?,
            maxoff: bytes::read_u16(data, 4)?,
            flags: bytes::read_u16(data, 6)?,
        })
    }

    /// Whether GIN_META is set.
    pub fn is_meta(&self) -> bool {
        self.flags & 0x0008 != 0
    }

    /// Named GIN flags, in stable order.
    pub fn flag_names(&self) -> Vec<&'static str> {
        flags::collect_names(self.flags, flags::GIN_FLAGS)
    }
}

/// SpGistPageOpaqueData (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpGistSpecial {
    /// SP-GiST flags
    pub flags: u16,
    /// Number of redirection tuples on the page
    pub n_redirection: u16,
    /// Number of placeholder tuples on the page
    pub n_placeholder: u16,
    /// Must equal 0xFF82
    pub page_id: u16,
}

impl SpGistSpecial {
    fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < SPGIST_SPECIAL_SIZE {
            return None;
        }
        Some(Self {
            flags: bytes::read_u16(data, 0)?,
            n_redirection: bytes::read_u16(data, 2)?,
            n_placeholder: bytes::read_u16(data, 4)?,
            page_id: bytes::read_u16(data, 6)?,
        })
    }

    /// Whether SPGIST_META is set.
    pub fn is_meta(&self) -> bool {
        self.flags & 0x0001 != 0
    }

    /// Named SP-GiST flags, in stable order.
    pub fn flag_names(&self) -> Vec<&'static str> {
        flags::collect_names(self.flags, flags::SPGIST_FLAGS)
    }
}

/// BrinSpecialSpace (8 bytes: two reserved words, flags, page type)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrinSpecial {
    /// BRIN flags
    pub flags: u16,
    /// One of the three BRIN page-type magic words
    pub page_type: u16,
}

impl BrinSpecial {
    fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < BRIN_SPECIAL_SIZE {
            return None;
        }
        Some(Self {
            flags: bytes::read_u16(data, 4)?,
            page_type: bytes::read_u16(data, 6)?,
        })
    }

    /// Whether the page type marks this as the BRIN meta page.
    pub fn is_meta(&self) -> bool {
        self.page_type == BRIN_PAGETYPE_META
    }

    /// Name of the page-type magic word, when recognized.
    pub fn page_type_name(&self) -> Option<&'static str> {
        match self.page_type {
            BRIN_PAGETYPE_META => Some("BRIN_PAGETYPE_META"),
            BRIN_PAGETYPE_REVMAP => Some("BRIN_PAGETYPE_REVMAP"),
            BRIN_PAGETYPE_REGULAR => Some("BRIN_PAGETYPE_REGULAR"),
            _ => None,
        }
    }

    /// Named BRIN flags, in stable order.
    pub fn flag_names(&self) -> Vec<&'static str> {
        flags::collect_names(self.flags, flags::BRIN_FLAGS)
    }
}

/// Decoded special region, tagged by access method
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecialRegion {
    /// Heap pages have no special region
    Heap,
    /// B-tree opaque data
    BTree(BTreeSpecial),
    /// Hash opaque data
    Hash(HashSpecial),
    /// GiST opaque data
    Gist(GistSpecial),
    /// GIN opaque data
    Gin(GinSpecial),
    /// SP-GiST opaque data
    SpGist(SpGistSpecial),
    /// BRIN special space
    Brin(BrinSpecial),
    /// Unclassified; raw bytes are surfaced by the caller
    Unknown,
}

impl SpecialRegion {
    /// Decode the special region for an already-classified page.
    ///
    /// Returns `None` when the region is too short for its access
    /// method's record - a structural anomaly the caller reports while
    /// continuing with the rest of the page.
    pub fn decode(page_type: PageType, special: &[u8]) -> Option<SpecialRegion> {
        match page_type {
            PageType::Heap => Some(SpecialRegion::Heap),
            PageType::BTree => BTreeSpecial::parse(special).map(SpecialRegion::BTree),
            PageType::Hash => HashSpecial::parse(special).map(SpecialRegion::Hash),
            PageType::Gist => GistSpecial::parse(special).map(SpecialRegion::Gist),
            PageType::Gin => GinSpecial::parse(special).map(SpecialRegion::Gin),
            PageType::SpGist => SpGistSpecial::parse(special).map(SpecialRegion::SpGist),
            PageType::Brin => BrinSpecial::parse(special).map(SpecialRegion::Brin),
            PageType::Unknown => Some(SpecialRegion::Unknown),
        }
    }

    /// Whether the page carries its access method's meta record in the
    /// content area. GiST has no meta page; SP-GiST flags one but stores
    /// no decodable record.
    pub fn is_meta_page(&self) -> bool {
        match self {
            SpecialRegion::BTree(s) => s.is_meta(),
            SpecialRegion::Hash(s) => s.is_meta(),
            SpecialRegion::Gin(s) => s.is_meta(),
            SpecialRegion::SpGist(s) => s.is_meta(),
            SpecialRegion::Brin(s) => s.is_meta(),
            SpecialRegion::Heap | SpecialRegion::Gist(_) | SpecialRegion::Unknown => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_btree_special() {
        let mut d = [0u8; 16];
        d[0..4].copy_from_slice(&0u32.to_le_bytes());
        d[4..8].copy_from_slice(&0u32.to_le_bytes());
        d[8..12].copy_from_slice(&0u32.to_le_bytes());
        d[12..14].copy_from_slice(&0x0003u16.to_le_bytes());
        d[14..16].copy_from_slice(&0u16.to_le_bytes());

        let s = BTreeSpecial::parse(&d).unwrap();
        assert!(s.is_leaf());
        assert!(!s.is_meta());
        assert_eq!(s.flag_names(), vec!["BTP_LEAF", "BTP_ROOT"]);
    }

    #[test]
    fn test_btree_meta_flag() {
        let mut d = [0u8; 16];
        d[12..14].copy_from_slice(&0x0008u16.to_le_bytes());
        let s = BTreeSpecial::parse(&d).unwrap();
        assert!(s.is_meta());
        assert_eq!(s.flag_names(), vec!["BTP_META"]);
    }

    #[test]
    fn test_hash_page_kinds() {
        let special = |flag: u16| {
            let mut d = [0u8; 16];
            d[12..14].copy_from_slice(&flag.to_le_bytes());
            d[14..16].copy_from_slice(&0xFF80u16.to_le_bytes());
            HashSpecial::parse(&d).unwrap()
        };
        assert_eq!(special(0x0002).page_kind_name(), Some("LH_BUCKET_PAGE"));
        assert_eq!(special(0x0008).page_kind_name(), Some("LH_META_PAGE"));
        assert_eq!(special(0x0000).page_kind_name(), Some("LH_UNUSED_PAGE"));
        assert_eq!(special(0x0003).page_kind_name(), None);
        assert!(special(0x0008).is_meta());
        assert_eq!(
            special(0x0082).flag_names(),
            vec!["LH_BUCKET_PAGE", "LH_PAGE_HAS_DEAD_TUPLES"]
        );
    }

    #[test]
    fn test_gist_nsn_word_order() {
        let mut d = [0u8; 16];
        d[0..4].copy_from_slice(&0x0000_0001u32.to_le_bytes());
        d[4..8].copy_from_slice(&0x00AB_CDEFu32.to_le_bytes());
        d[14..16].copy_from_slice(&0xFF81u16.to_le_bytes());
        let s = GistSpecial::parse(&d).unwrap();
        assert_eq!(s.nsn, 0x0000_0001_00AB_CDEF);
        assert_eq!(s.nsn_string(), "1/00ABCDEF");
    }

    #[test]
    fn test_gin_special() {
        let mut d = [0u8; 8];
        d[0..4].copy_from_slice(&7u32.to_le_bytes());
        d[4..6].copy_from_slice(&120u16.to_le_bytes());
        d[6..8].copy_from_slice(&0x0083u16.to_le_bytes());
        let s = GinSpecial::parse(&d).unwrap();
        assert_eq!(s.rightlink, 7);
        assert_eq!(s.maxoff, 120);
        assert!(!s.is_meta());
        assert_eq!(s.flag_names(), vec!["GIN_DATA", "GIN_LEAF", "GIN_COMPRESSED"]);
    }

    #[test]
    fn test_spgist_special() {
        let mut d = [0u8; 8];
        d[0..2].copy_from_slice(&0x0005u16.to_le_bytes());
        d[2..4].copy_from_slice(&3u16.to_le_bytes());
        d[4..6].copy_from_slice(&9u16.to_le_bytes());
        d[6..8].copy_from_slice(&0xFF82u16.to_le_bytes());
        let s = SpGistSpecial::parse(&d).unwrap();
        assert!(s.is_meta());
        assert_eq!(s.n_redirection, 3);
        assert_eq!(s.n_placeholder, 9);
        assert_eq!(s.flag_names(), vec!["SPGIST_META", "SPGIST_LEAF"]);
    }

    #[test]
    fn test_brin_special() {
        let mut d = [0u8; 8];
        d[4..6].copy_from_slice(&0x0001u16.to_le_bytes());
        d[6..8].copy_from_slice(&0xF092u16.to_le_bytes());
        let s = BrinSpecial::parse(&d).unwrap();
        assert!(!s.is_meta());
        assert_eq!(s.page_type_name(), Some("BRIN_PAGETYPE_REVMAP"));
        assert_eq!(s.flag_names(), vec!["BRIN_EVACUATE_PAGE"]);
    }

    #[test]
    fn test_too_short_region() {
        assert!(BTreeSpecial::parse(&[0u8; 15]).is_none());
        assert!(GinSpecial::parse(&[0u8; 7]).is_none());
        assert!(SpecialRegion::decode(PageType::BTree, &[0u8; 8]).is_none());
    }

    #[test]
    fn test_decode_heap_and_unknown() {
        assert_eq!(
            SpecialRegion::decode(PageType::Heap, &[]),
            Some(SpecialRegion::Heap)
        );
        assert_eq!(
            SpecialRegion::decode(PageType::Unknown, &[0u8; 4]),
            Some(SpecialRegion::Unknown)
        );
    }
}
