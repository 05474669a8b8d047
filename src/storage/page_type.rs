//! Page type classification from the special region
//!
//! The access method leaves no explicit tag on a page; the classifier
//! infers one from the special-region size and a handful of magic
//! values. BRIN is tested before SP-GiST and GIN in the 8-byte case
//! because BRIN carries explicit magic constants; the GIN fallthrough
//! accepts only flag words confined to the low byte and anything else
//! surfaces as unknown rather than a guess.

use crate::storage::bytes;
use crate::storage::page_constants::{
    BRIN_PAGETYPE_META, BRIN_PAGETYPE_REGULAR, BRIN_PAGETYPE_REVMAP, GIST_PAGE_ID, HASH_PAGE_ID,
    PAGE_HEADER_SIZE, SPGIST_PAGE_ID,
};
use crate::storage::page_header::PageHeader;

/// Access method a page belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Heap (table) page: empty special region
    Heap,
    /// B-tree index page
    BTree,
    /// Hash index page
    Hash,
    /// GiST index page
    Gist,
    /// GIN index page
    Gin,
    /// SP-GiST index page
    SpGist,
    /// BRIN index page
    Brin,
    /// Unclassifiable page
    Unknown,
}

impl PageType {
    /// Classify a page from its header and raw bytes.
    ///
    /// Pure function of the inputs; decoding the same buffer twice
    /// yields the same type.
    pub fn detect(header: &PageHeader, data: &[u8]) -> PageType {
        let page_size = header.page_size();
        let special = usize::from(header.special);

        if special == page_size {
            return PageType::Heap;
        }
        if special >= page_size || special < PAGE_HEADER_SIZE {
            return PageType::Unknown;
        }
        let special_size = page_size - special;

        match special_size {
            // BRIN, SP-GiST, or GIN: disambiguate on the final word
            8 => {
                let Some(last_word) = bytes::read_u16(data, special + 6) else {
                    return PageType::Unknown;
                };
                match last_word {
                    BRIN_PAGETYPE_META | BRIN_PAGETYPE_REVMAP | BRIN_PAGETYPE_REGULAR => {
                        PageType::Brin
                    }
                    SPGIST_PAGE_ID => PageType::SpGist,
                    w if w & 0xFF00 == 0 => PageType::Gin,
                    _ => PageType::Unknown,
                }
            }
            // B-tree, hash, or GiST
            16 => {
                let Some(page_id) = bytes::read_u16(data, special + 14) else {
                    return PageType::Unknown;
                };
                match page_id {
                    HASH_PAGE_ID => PageType::Hash,
                    GIST_PAGE_ID => PageType::Gist,
                    _ => match bytes::read_u16(data, special + 12) {
                        // btpo_flags uses only bits 0-8
                        Some(bt_flags) if bt_flags & 0xFE00 == 0 => PageType::BTree,
                        _ => PageType::Unknown,
                    },
                }
            }
            _ => PageType::Unknown,
        }
    }

    /// Whether tuples on this page are index tuples.
    pub fn is_index(self) -> bool {
        !matches!(self, PageType::Heap | PageType::Unknown)
    }
}

impl std::fmt::Display for PageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PageType::Heap => "heap",
            PageType::BTree => "btree",
            PageType::Hash => "hash",
            PageType::Gist => "gist",
            PageType::Gin => "gin",
            PageType::SpGist => "spgist",
            PageType::Brin => "brin",
            PageType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::page_constants::PAGE_SIZE;

    fn header_with_special(special: u16) -> PageHeader {
        PageHeader {
            lsn: 0,
            checksum: 0,
            flags: 0,
            lower: 24,
            upper: special,
            special,
            pagesize_version: 0x2004,
            prune_xid: 0,
        }
    }

    #[test]
    fn test_heap_when_no_special() {
        let h = header_with_special(PAGE_SIZE as u16);
        let data = vec![0u8; PAGE_SIZE];
        assert_eq!(PageType::detect(&h, &data), PageType::Heap);
    }

    #[test]
    fn test_special_below_header_is_unknown() {
        let h = header_with_special(12);
        let data = vec![0u8; PAGE_SIZE];
        assert_eq!(PageType::detect(&h, &data), PageType::Unknown);
    }

    #[test]
    fn test_odd_special_size_is_unknown() {
        let h = header_with_special((PAGE_SIZE - 12) as u16);
        let data = vec![0u8; PAGE_SIZE];
        assert_eq!(PageType::detect(&h, &data), PageType::Unknown);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(PageType::Heap.to_string(), "heap");
        assert_eq!(PageType::BTree.to_string(), "btree");
        assert_eq!(PageType::SpGist.to_string(), "spgist");
        assert_eq!(PageType::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_is_index() {
        assert!(!PageType::Heap.is_index());
        assert!(!PageType::Unknown.is_index());
        assert!(PageType::BTree.is_index());
        assert!(PageType::Brin.is_index());
    }
}
