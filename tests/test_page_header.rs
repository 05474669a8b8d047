//! Header invariants over decoded pages

use pagescope::common::test_utils::PageBuilder;
use pagescope::storage::item_id::ItemStatus;
use pagescope::storage::page::Page;
use pagescope::storage::page_constants::{PAGE_HEADER_SIZE, PAGE_SIZE};

#[test]
fn test_valid_page_satisfies_offset_invariants() {
    let data = PageBuilder::new()
        .item(ItemStatus::Normal, 8100, 92)
        .item(ItemStatus::Normal, 8000, 100)
        .upper(8000)
        .build();
    let page = Page::parse(data, 0);
    let h = page.header();

    assert!(h.has_valid_layout());
    assert!(PAGE_HEADER_SIZE <= usize::from(h.lower));
    assert!(h.lower <= h.upper);
    assert!(h.upper <= h.special);
    assert!(usize::from(h.special) <= PAGE_SIZE);
}

#[test]
fn test_item_count_derivation() {
    for n in [0usize, 1, 2, 17, 100] {
        let mut builder = PageBuilder::new();
        for _ in 0..n {
            builder = builder.item(ItemStatus::Unused, 0, 0);
        }
        let page = Page::parse(builder.build(), 0);
        let h = page.header();
        assert_eq!(
            h.item_count(),
            (usize::from(h.lower) - PAGE_HEADER_SIZE) / 4,
        );
        assert_eq!(h.item_count(), n);
        assert_eq!(page.items().len(), n);
    }
}

#[test]
fn test_free_space_equals_upper_minus_lower() {
    let data = PageBuilder::new()
        .item(ItemStatus::Normal, 8100, 92)
        .upper(8100)
        .build();
    let page = Page::parse(data, 0);
    let h = page.header();
    assert_eq!(h.free_space(), usize::from(h.upper) - usize::from(h.lower));
    assert_eq!(h.free_space(), 8100 - 28);
}

#[test]
fn test_lsn_halves_round_trip() {
    let data = PageBuilder::new().lsn(0x16, 0x4F2A_8C10).build();
    let page = Page::parse(data, 0);
    assert_eq!(page.header().lsn, 0x0000_0016_4F2A_8C10);
    assert_eq!(page.header().lsn_string(), "16/4F2A8C10");
}

#[test]
fn test_zeroed_page_decodes_without_panic() {
    let page = Page::parse([0u8; PAGE_SIZE], 0);
    let h = page.header();
    assert_eq!(h.item_count(), 0);
    assert_eq!(h.free_space(), 0);
    assert!(!h.has_valid_layout());
    // Declared size zero falls back to the compiled-in page size
    assert_eq!(h.page_size(), PAGE_SIZE);
}

#[test]
fn test_prune_xid_surfaced() {
    let page = Page::parse(PageBuilder::new().prune_xid(900_001).build(), 0);
    assert_eq!(page.header().prune_xid, 900_001);
}
