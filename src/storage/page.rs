//! Page - an 8 KiB buffer plus the views decoded from it
//!
//! Pages are ephemeral, single-reader values: materialized from a file
//! read, decoded once, rendered, dropped. Nothing is mutated after
//! parsing; every derived structure is a function of the initial bytes.

use crate::storage::bytes;
use crate::storage::heap_tuple::HeapTupleHeader;
use crate::storage::index_tuple::IndexTupleHeader;
use crate::storage::item_id::ItemId;
use crate::storage::page_constants::{ITEM_ID_SIZE, PAGE_HEADER_SIZE, PAGE_SIZE};
use crate::storage::page_header::PageHeader;
use crate::storage::page_type::PageType;
use crate::storage::special::SpecialRegion;

/// A fully decoded page
#[derive(Debug)]
pub struct Page {
    data: [u8; PAGE_SIZE],
    header: PageHeader,
    items: Vec<ItemId>,
    page_type: PageType,
    page_num: usize,
}

impl Page {
    /// Decode a raw page buffer.
    ///
    /// `page_num` is the page's 0-based position in its relation file;
    /// it is informational only and never feeds the decoding.
    pub fn parse(data: [u8; PAGE_SIZE], page_num: usize) -> Self {
        let header = PageHeader::parse(&data).unwrap_or_default();

        // The line-pointer array runs from the header to pd_lower; a
        // malformed pd_lower may claim more entries than the page holds,
        // so the walk stops at the buffer end.
        let items: Vec<ItemId> = (0..header.item_count())
            .map_while(|i| {
                bytes::read_u32(&data, PAGE_HEADER_SIZE + i * ITEM_ID_SIZE).map(ItemId::new)
            })
            .collect();

        let page_type = PageType::detect(&header, &data);

        Self {
            data,
            header,
            items,
            page_type,
            page_num,
        }
    }

    /// Raw page bytes.
    pub fn raw(&self) -> &[u8] {
        &self.data
    }

    /// Parsed page header.
    pub fn header(&self) -> &PageHeader {
        &self.header
    }

    /// Decoded line pointers, in slot order.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Detected access method.
    pub fn page_type(&self) -> PageType {
        self.page_type
    }

    /// 0-based page number within the relation file.
    pub fn page_num(&self) -> usize {
        self.page_num
    }

    /// The special region bytes, empty for heap pages and for headers
    /// whose special offset lies outside the page.
    pub fn special_data(&self) -> &[u8] {
        bytes::slice_clamped(
            &self.data,
            usize::from(self.header.special),
            self.header.page_size(),
        )
    }

    /// Decode the special region for the detected access method.
    ///
    /// `None` means the region is too short for its record.
    pub fn special_region(&self) -> Option<SpecialRegion> {
        SpecialRegion::decode(self.page_type, self.special_data())
    }

    /// Whether this page carries its access method's meta record.
    pub fn is_meta_page(&self) -> bool {
        self.special_region()
            .is_some_and(|region| region.is_meta_page())
    }

    /// Whether an item's declared storage lies within the page.
    pub fn item_in_bounds(&self, item: ItemId) -> bool {
        usize::from(item.offset()) + usize::from(item.length()) <= PAGE_SIZE
    }

    /// Decode the heap tuple header an item points at.
    ///
    /// Returns `None` for items without storage, items extending past
    /// the page, or storage too short for the fixed header.
    pub fn heap_tuple(&self, item: ItemId) -> Option<HeapTupleHeader> {
        if !item.has_storage() || !self.item_in_bounds(item) {
            return None;
        }
        HeapTupleHeader::parse(&self.data, usize::from(item.offset()))
    }

    /// Decode the index tuple header an item points at.
    ///
    /// Returns `None` for items without storage, items extending past
    /// the page, or storage too short for the fixed header.
    pub fn index_tuple(&self, item: ItemId) -> Option<IndexTupleHeader> {
        if !item.has_storage() || !self.item_in_bounds(item) {
            return None;
        }
        IndexTupleHeader::parse(&self.data, usize::from(item.offset()))
    }
}
