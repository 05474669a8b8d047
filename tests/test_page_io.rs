//! Relation file reading

use pagescope::common::test_utils::{init_test_logging, PageBuilder};
use pagescope::storage::item_id::ItemStatus;
use pagescope::storage::page_io::RelationFile;
use pagescope::storage::page_type::PageType;
use pagescope::Result;
use std::io::Write;
use tempfile::NamedTempFile;

fn relation_with_pages(pages: &[[u8; 8192]]) -> Result<NamedTempFile> {
    let mut temp = NamedTempFile::new()?;
    for page in pages {
        temp.write_all(page)?;
    }
    temp.flush()?;
    Ok(temp)
}

#[test]
fn test_open_reports_page_count() -> Result<()> {
    let temp = relation_with_pages(&[PageBuilder::new().build(), PageBuilder::new().build()])?;
    let rel = RelationFile::open(temp.path())?;
    assert_eq!(rel.page_count(), 2);
    assert_eq!(rel.size(), 2 * 8192);
    Ok(())
}

#[test]
fn test_missing_file_fails_open() {
    assert!(RelationFile::open("/no/such/relation").is_err());
}

#[test]
fn test_page_numbers_assigned_in_file_order() -> Result<()> {
    let temp = relation_with_pages(&[
        PageBuilder::new().build(),
        PageBuilder::new().build(),
        PageBuilder::new().build(),
    ])?;
    let mut rel = RelationFile::open(temp.path())?;
    for n in 0..3 {
        assert_eq!(rel.read_page(n)?.page_num(), n);
    }
    Ok(())
}

#[test]
fn test_out_of_range_page_is_rejected() -> Result<()> {
    let temp = relation_with_pages(&[PageBuilder::new().build()])?;
    let mut rel = RelationFile::open(temp.path())?;
    let err = rel.read_page(5).unwrap_err();
    assert!(err.to_string().contains("page 5"));
    Ok(())
}

#[test]
fn test_partial_trailing_page_never_read() -> Result<()> {
    init_test_logging();
    let mut temp = NamedTempFile::new()?;
    temp.write_all(&PageBuilder::new().build())?;
    temp.write_all(&[0xAA; 4000])?;
    temp.flush()?;

    let mut rel = RelationFile::open(temp.path())?;
    assert_eq!(rel.page_count(), 1);
    assert!(rel.read_page(1).is_err());
    Ok(())
}

#[test]
fn test_scan_decodes_every_page() -> Result<()> {
    let heap = PageBuilder::new()
        .item(ItemStatus::Normal, 8100, 92)
        .upper(8100)
        .build();
    let empty = PageBuilder::new().build();
    let temp = relation_with_pages(&[heap, empty])?;

    let rel = RelationFile::open(temp.path())?;
    let pages: Vec<_> = rel.scan()?.collect();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].page_type(), PageType::Heap);
    assert_eq!(pages[0].items().len(), 1);
    assert_eq!(pages[1].items().len(), 0);
    assert_eq!(pages[1].page_num(), 1);
    Ok(())
}

#[test]
fn test_scan_and_read_agree() -> Result<()> {
    let pages = [
        PageBuilder::new().prune_xid(1).build(),
        PageBuilder::new().prune_xid(2).build(),
        PageBuilder::new().prune_xid(3).build(),
    ];
    let temp = relation_with_pages(&pages)?;
    let mut rel = RelationFile::open(temp.path())?;

    let scanned: Vec<u32> = rel.scan()?.map(|p| p.header().prune_xid).collect();
    let mut read = Vec::new();
    for n in 0..rel.page_count() {
        read.push(rel.read_page(n)?.header().prune_xid);
    }
    assert_eq!(scanned, read);
    Ok(())
}
