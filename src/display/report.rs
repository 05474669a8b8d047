//! Header, special-region, and tuple reports
//!
//! Field names and layouts follow the conventions PostgreSQL debuggers
//! already know (pd_*, t_*, btpo_*, hasho_*), so output can be compared
//! against pageinspect and friends.

use crate::common::Result;
use crate::display::hexdump::hex_block;
use crate::display::{block_string, printable_strings};
use crate::storage::flags;
use crate::storage::item_id::{ItemId, ItemStatus};
use crate::storage::meta::{BTreeMeta, BrinMeta, GinMeta, HashMeta};
use crate::storage::page::Page;
use crate::storage::page_constants::{
    BRIN_PAGETYPE_META, GIST_PAGE_ID, HASH_PAGE_ID, INDEX_TUPLE_HEADER_SIZE, INVALID_XID,
    SPGIST_PAGE_ID,
};
use crate::storage::special::SpecialRegion;
use std::fmt::Write;

/// One-line page summary for the `pages` command.
pub fn page_summary(page: &Page) -> String {
    format!(
        "  Page {:3}: type={:<7} items={:<4} free={:<5} special={:<4}",
        page.page_num(),
        page.page_type().to_string(),
        page.header().item_count(),
        page.header().free_space(),
        page.header().special_size()
    )
}

/// Render the `info` view: header fields, derived counts, and the
/// decoded special region (plus meta record when applicable).
///
/// # Errors
///
/// Propagates formatting failures.
pub fn page_info(page: &Page) -> Result<String> {
    let h = page.header();
    let mut out = String::new();

    writeln!(out)?;
    writeln!(out, "=== Page Header (detected type: {}) ===", page.page_type())?;
    writeln!(out, "  pd_lsn             : {}", h.lsn_string())?;
    writeln!(out, "  pd_checksum        : 0x{0:04X} ({0})", h.checksum)?;
    writeln!(out, "  pd_flags           : 0x{:04X} [{}]", h.flags, h.flags_string())?;
    writeln!(out, "  pd_lower           : {0} (0x{0:04X})", h.lower)?;
    writeln!(out, "  pd_upper           : {0} (0x{0:04X})", h.upper)?;
    writeln!(out, "  pd_special         : {0} (0x{0:04X})", h.special)?;
    writeln!(
        out,
        "  pd_pagesize_version: 0x{:04X} (size: {}, version: {})",
        h.pagesize_version,
        h.page_size(),
        h.layout_version()
    )?;
    writeln!(out, "  pd_prune_xid       : {}", h.prune_xid)?;
    if !h.has_valid_layout() {
        writeln!(
            out,
            "  [WARNING: offsets violate 24 <= lower <= upper <= special <= page size]"
        )?;
    }

    writeln!(out)?;
    writeln!(out, "=== Derived Info ===")?;
    writeln!(out, "  Line pointers      : {}", h.item_count())?;
    writeln!(out, "  Free space         : {} bytes", h.free_space())?;
    writeln!(out, "  Special space size : {} bytes", h.special_size())?;

    writeln!(out)?;
    writeln!(out, "=== Special Region ===")?;
    write_special(&mut out, page)?;
    writeln!(out)?;
    Ok(out)
}

fn write_special(out: &mut String, page: &Page) -> Result<()> {
    let special = page.special_data();
    if special.is_empty() {
        writeln!(out, "  (empty - heap/table page)")?;
        return Ok(());
    }

    writeln!(
        out,
        "  Size: {} bytes at offset {}",
        page.header().special_size(),
        page.header().special
    )?;
    writeln!(out)?;

    let Some(region) = page.special_region() else {
        writeln!(out, "  [{} special region too short]", page.page_type())?;
        out.push_str(&hex_block(special, usize::from(page.header().special), "    ")?);
        return Ok(());
    };

    match region {
        SpecialRegion::Heap => writeln!(out, "  (empty - heap/table page)")?,
        SpecialRegion::BTree(s) => {
            writeln!(out, "  B-tree Page Opaque Data (BTPageOpaqueData):")?;
            writeln!(out, "    btpo_prev    : {}", block_string(s.prev_block))?;
            writeln!(out, "    btpo_next    : {}", block_string(s.next_block))?;
            write!(out, "    btpo_level   : {}", s.level)?;
            if s.is_leaf() {
                write!(out, " (leaf)")?;
            }
            writeln!(out)?;
            write_flag_word(out, "    btpo_flags   ", s.flags, &s.flag_names())?;
            writeln!(out, "    btpo_cycleid : {}", s.cycle_id)?;
            if s.is_meta() {
                write_btree_meta(out, page)?;
            }
        }
        SpecialRegion::Hash(s) => {
            writeln!(out, "  Hash Page Opaque Data (HashPageOpaqueData):")?;
            writeln!(out, "    hasho_prevblkno : {}", block_string(s.prev_block))?;
            writeln!(out, "    hasho_nextblkno : {}", block_string(s.next_block))?;
            writeln!(out, "    hasho_bucket    : {}", s.bucket)?;
            write_flag_word(out, "    hasho_flag      ", s.flag, &s.flag_names())?;
            write!(out, "    hasho_page_id   : 0x{:04X}", s.page_id)?;
            if s.page_id == HASH_PAGE_ID {
                write!(out, " (HASHO_PAGE_ID)")?;
            }
            writeln!(out)?;
            if s.is_meta() {
                write_hash_meta(out, page)?;
            }
        }
        SpecialRegion::Gist(s) => {
            writeln!(out, "  GiST Page Opaque Data (GISTPageOpaqueData):")?;
            writeln!(out, "    nsn          : {}", s.nsn_string())?;
            writeln!(out, "    rightlink    : {}", block_string(s.rightlink))?;
            write_flag_word(out, "    flags        ", s.flags, &s.flag_names())?;
            write!(out, "    gist_page_id : 0x{:04X}", s.page_id)?;
            if s.page_id == GIST_PAGE_ID {
                write!(out, " (GIST_PAGE_ID)")?;
            }
            writeln!(out)?;
        }
        SpecialRegion::Gin(s) => {
            writeln!(out, "  GIN Page Opaque Data (GinPageOpaqueData):")?;
            writeln!(out, "    rightlink    : {}", block_string(s.rightlink))?;
            writeln!(out, "    maxoff       : {}", s.maxoff)?;
            write_flag_word(out, "    flags        ", s.flags, &s.flag_names())?;
            if s.is_meta() {
                write_gin_meta(out, page)?;
            }
        }
        SpecialRegion::SpGist(s) => {
            writeln!(out, "  SP-GiST Page Opaque Data (SpGistPageOpaqueData):")?;
            write_flag_word(out, "    flags          ", s.flags, &s.flag_names())?;
            writeln!(out, "    nRedirection   : {}", s.n_redirection)?;
            writeln!(out, "    nPlaceholder   : {}", s.n_placeholder)?;
            write!(out, "    spgist_page_id : 0x{:04X}", s.page_id)?;
            if s.page_id == SPGIST_PAGE_ID {
                write!(out, " (SPGIST_PAGE_ID)")?;
            }
            writeln!(out)?;
        }
        SpecialRegion::Brin(s) => {
            writeln!(out, "  BRIN Special Space (BrinSpecialSpace):")?;
            write_flag_word(out, "    flags     ", s.flags, &s.flag_names())?;
            write!(out, "    page_type : 0x{:04X}", s.page_type)?;
            if let Some(name) = s.page_type_name() {
                write!(out, " ({name})")?;
            }
            writeln!(out)?;
            if s.page_type == BRIN_PAGETYPE_META {
                write_brin_meta(out, page)?;
            }
        }
        SpecialRegion::Unknown => {
            writeln!(out, "  Raw bytes:")?;
            out.push_str(&hex_block(special, usize::from(page.header().special), "    ")?);
        }
    }
    Ok(())
}

fn write_flag_word(out: &mut String, label: &str, word: u16, names: &[&str]) -> Result<()> {
    write!(out, "{label}: 0x{word:04X}")?;
    if !names.is_empty() {
        write!(out, " [{}]", flags::join(names))?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_btree_meta(out: &mut String, page: &Page) -> Result<()> {
    let Some(m) = BTreeMeta::parse(page.raw()) else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "  B-tree Meta Page Data (BTMetaPageData):")?;
    write!(out, "    btm_magic          : 0x{:06X}", m.magic)?;
    writeln!(out, "{}", validity(m.is_valid()))?;
    writeln!(out, "    btm_version        : {}", m.version)?;
    writeln!(out, "    btm_root           : {}", block_string(m.root))?;
    writeln!(out, "    btm_level          : {}", m.level)?;
    writeln!(out, "    btm_fastroot       : {}", block_string(m.fast_root))?;
    writeln!(out, "    btm_fastlevel      : {}", m.fast_level)?;
    Ok(())
}

fn write_hash_meta(out: &mut String, page: &Page) -> Result<()> {
    let Some(m) = HashMeta::parse(page.raw()) else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "  Hash Meta Page Data (HashMetaPageData):")?;
    write!(out, "    hashm_magic      : 0x{:07X}", m.magic)?;
    writeln!(out, "{}", validity(m.is_valid()))?;
    writeln!(out, "    hashm_version    : {}", m.version)?;
    writeln!(out, "    hashm_ntuples    : {:.6}", m.ntuples)?;
    writeln!(out, "    hashm_ffactor    : {}", m.ffactor)?;
    writeln!(out, "    hashm_bsize      : {}", m.bsize)?;
    writeln!(out, "    hashm_bmsize     : {}", m.bmsize)?;
    writeln!(out, "    hashm_bmshift    : {}", m.bmshift)?;
    writeln!(out, "    hashm_maxbucket  : {}", m.maxbucket)?;
    writeln!(out, "    hashm_highmask   : 0x{:08X}", m.highmask)?;
    writeln!(out, "    hashm_lowmask    : 0x{:08X}", m.lowmask)?;
    writeln!(out, "    hashm_ovflpoint  : {}", m.ovflpoint)?;
    writeln!(out, "    hashm_firstfree  : {}", m.firstfree)?;
    writeln!(out, "    hashm_nmaps      : {}", m.nmaps)?;
    Ok(())
}

fn write_gin_meta(out: &mut String, page: &Page) -> Result<()> {
    let Some(m) = GinMeta::parse(page.raw()) else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "  GIN Meta Page Data (GinMetaPageData):")?;
    writeln!(out, "    head                : {}", block_string(m.head))?;
    writeln!(out, "    tail                : {}", block_string(m.tail))?;
    writeln!(out, "    tailFreeSize        : {}", m.tail_free_size)?;
    writeln!(out, "    nPendingPages       : {}", m.n_pending_pages)?;
    writeln!(out, "    nPendingHeapTuples  : {}", m.n_pending_heap_tuples)?;
    writeln!(out, "    nTotalPages         : {}", m.n_total_pages)?;
    writeln!(out, "    nEntryPages         : {}", m.n_entry_pages)?;
    writeln!(out, "    nDataPages          : {}", m.n_data_pages)?;
    writeln!(out, "    nEntries            : {}", m.n_entries)?;
    Ok(())
}

fn write_brin_meta(out: &mut String, page: &Page) -> Result<()> {
    let Some(m) = BrinMeta::parse(page.raw()) else {
        return Ok(());
    };
    writeln!(out)?;
    writeln!(out, "  BRIN Meta Page Data (BrinMetaPageData):")?;
    write!(out, "    brinMagic        : 0x{:08X}", m.magic)?;
    writeln!(out, "{}", validity(m.is_valid()))?;
    writeln!(out, "    brinVersion      : {}", m.version)?;
    writeln!(out, "    pagesPerRange    : {}", m.pages_per_range)?;
    writeln!(out, "    lastRevmapPage   : {}", m.last_revmap_page)?;
    Ok(())
}

fn validity(valid: bool) -> &'static str {
    if valid {
        " (valid)"
    } else {
        " (INVALID!)"
    }
}

/// Render the `data` view: the line-pointer table, per-item tuple
/// decoding, and a status histogram.
///
/// # Errors
///
/// Propagates formatting failures.
pub fn page_data(page: &Page) -> Result<String> {
    let mut out = String::new();

    writeln!(out)?;
    writeln!(
        out,
        "=== Line Pointers (Item IDs) [page type: {}] ===",
        page.page_type()
    )?;
    writeln!(
        out,
        "  {:<6} {:<8} {:<10} {:<8} {:<8}",
        "Index", "Status", "Offset", "Length", "Raw"
    )?;
    writeln!(
        out,
        "  {:<6} {:<8} {:<10} {:<8} {:<8}",
        "-----", "--------", "----------", "--------", "--------"
    )?;
    for (i, item) in page.items().iter().enumerate() {
        writeln!(
            out,
            "  {:<6} {:<8} {:<10} {:<8} 0x{:08X}",
            i + 1,
            item.status().name(),
            item.offset(),
            item.length(),
            item.raw
        )?;
    }

    if page.page_type().is_index() {
        write_index_tuples(&mut out, page)?;
    } else {
        write_heap_tuples(&mut out, page)?;
    }

    writeln!(out)?;
    writeln!(out, "=== Summary ===")?;
    let mut counts = [0usize; 4];
    for item in page.items() {
        counts[item.status() as usize] += 1;
    }
    writeln!(out, "  Total line pointers: {}", page.items().len())?;
    writeln!(
        out,
        "  NORMAL: {}, DEAD: {}, UNUSED: {}, REDIRECT: {}",
        counts[ItemStatus::Normal as usize],
        counts[ItemStatus::Dead as usize],
        counts[ItemStatus::Unused as usize],
        counts[ItemStatus::Redirect as usize]
    )?;
    writeln!(out, "  Free space: {} bytes", page.header().free_space())?;
    writeln!(out)?;
    Ok(out)
}

/// Report a non-NORMAL status; returns whether the item's storage
/// should still be decoded (DEAD items may keep their tuple).
fn write_item_status(out: &mut String, item: ItemId) -> Result<bool> {
    match item.status() {
        ItemStatus::Unused => {
            writeln!(out, "  [UNUSED - no data]")?;
            Ok(false)
        }
        ItemStatus::Redirect => {
            writeln!(out, "  [REDIRECT -> line pointer {}]", item.offset())?;
            Ok(false)
        }
        ItemStatus::Dead => {
            if item.length() == 0 {
                writeln!(out, "  [DEAD - no storage]")?;
                Ok(false)
            } else {
                writeln!(out, "  [DEAD - has storage]")?;
                Ok(true)
            }
        }
        ItemStatus::Normal => Ok(true),
    }
}

fn write_heap_tuples(out: &mut String, page: &Page) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "=== Heap Tuples ===")?;

    for (i, &item) in page.items().iter().enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "--- Tuple {} (offset {}, length {}) ---",
            i + 1,
            item.offset(),
            item.length()
        )?;

        if !write_item_status(out, item)? {
            continue;
        }
        if !item.has_storage() {
            writeln!(out, "  [no storage]")?;
            continue;
        }
        if !page.item_in_bounds(item) {
            writeln!(out, "  [ERROR: tuple extends beyond page]")?;
            continue;
        }
        let Some(t) = page.heap_tuple(item) else {
            writeln!(out, "  [too short for HeapTupleHeaderData: {} bytes]", item.length())?;
            continue;
        };

        writeln!(out, "  Tuple Header (HeapTupleHeaderData):")?;
        writeln!(out, "    t_xmin       : {}", t.xmin)?;
        write!(out, "    t_xmax       : {}", t.xmax)?;
        if t.xmax == INVALID_XID {
            write!(out, " (INVALID)")?;
        }
        writeln!(out)?;
        writeln!(out, "    t_cid        : {}", t.field3)?;
        writeln!(out, "    t_ctid       : ({}, {})", t.ctid_block, t.ctid_offset)?;
        write!(out, "    t_infomask2  : 0x{:04X} (natts: {}", t.infomask2, t.natts())?;
        let mask2 = t.infomask2_flags();
        if !mask2.is_empty() {
            write!(out, ", {}", flags::join(&mask2))?;
        }
        writeln!(out, ")")?;
        write_flag_word(out, "    t_infomask   ", t.infomask, &t.infomask_flags())?;
        writeln!(out, "    t_hoff       : {}", t.hoff)?;

        if t.has_nulls() {
            write!(out, "    null bitmap  : ")?;
            for b in t.null_bitmap(page.raw(), item) {
                write!(out, "{b:08b} ")?;
            }
            writeln!(out)?;
        }

        let data = t.user_data(page.raw(), item);
        if !data.is_empty() {
            let start = usize::from(item.offset()) + usize::from(t.hoff);
            writeln!(out, "    User data ({} bytes at offset {start}):", data.len())?;
            out.push_str(&hex_block(data, start, "      ")?);
            write_printable(out, data)?;
        }
    }
    Ok(())
}

fn write_index_tuples(out: &mut String, page: &Page) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "=== Index Tuples ({}) ===", page.page_type())?;

    // Meta pages store their record in the content area; the item data
    // there is not standard index tuples
    if page.is_meta_page() {
        writeln!(out, "  (meta page - content is metadata, not standard index tuples)")?;
        writeln!(out, "  Use 'info' command to see decoded metadata.")?;
        return Ok(());
    }

    for (i, &item) in page.items().iter().enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "--- Item {} (offset {}, length {}) ---",
            i + 1,
            item.offset(),
            item.length()
        )?;

        if !write_item_status(out, item)? {
            continue;
        }
        if !item.has_storage() {
            writeln!(out, "  [no storage]")?;
            continue;
        }
        if !page.item_in_bounds(item) {
            writeln!(out, "  [ERROR: extends beyond page]")?;
            continue;
        }
        if usize::from(item.length()) < INDEX_TUPLE_HEADER_SIZE {
            writeln!(out, "  [too short for IndexTupleData: {} bytes]", item.length())?;
            let offset = usize::from(item.offset());
            let raw = &page.raw()[offset..offset + usize::from(item.length())];
            out.push_str(&hex_block(raw, offset, "    ")?);
            continue;
        }
        let Some(it) = page.index_tuple(item) else {
            writeln!(out, "  [too short for IndexTupleData: {} bytes]", item.length())?;
            continue;
        };

        writeln!(out, "  Index Tuple Header (IndexTupleData):")?;
        writeln!(
            out,
            "    t_tid        : ({}, {})  -> heap ctid",
            it.tid_block, it.tid_offset
        )?;
        write!(out, "    t_info       : 0x{:04X} (size: {}", it.info, it.size())?;
        let info_flags = it.info_flags();
        if !info_flags.is_empty() {
            write!(out, ", {}", flags::join(&info_flags))?;
        }
        writeln!(out, ")")?;

        if it.has_nulls() {
            // Bitmap width depends on the index column count, which the
            // page alone cannot reveal
            writeln!(out, "    (has null bitmap before key data)")?;
        }

        let key = it.key_data(page.raw(), item);
        if !key.is_empty() {
            let start = usize::from(item.offset()) + INDEX_TUPLE_HEADER_SIZE;
            writeln!(out, "    Key data ({} bytes):", key.len())?;
            out.push_str(&hex_block(key, start, "      ")?);
            write_printable(out, key)?;
        }
    }
    Ok(())
}

fn write_printable(out: &mut String, data: &[u8]) -> Result<()> {
    let strings = printable_strings(data);
    if !strings.is_empty() {
        writeln!(out, "    Printable strings:")?;
        for s in strings {
            writeln!(out, "      \"{s}\"")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::{
        btree_special_bytes, heap_tuple_bytes, PageBuilder,
    };
    use crate::storage::item_id::ItemStatus;
    use crate::storage::page_constants::{BTREE_META_MAGIC, PAGE_SIZE};

    #[test]
    fn test_page_summary_line() {
        let page = Page::parse(PageBuilder::new().build(), 7);
        let line = page_summary(&page);
        assert!(line.contains("Page   7"));
        assert!(line.contains("type=heap"));
        assert!(line.contains("items=0"));
    }

    #[test]
    fn test_info_heap_page() {
        let page = Page::parse(PageBuilder::new().flags(0x0001).build(), 0);
        let out = page_info(&page).unwrap();
        assert!(out.contains("detected type: heap"));
        assert!(out.contains("pd_flags           : 0x0001 [HAS_FREE_LINES]"));
        assert!(out.contains("(empty - heap/table page)"));
        assert!(!out.contains("WARNING"));
    }

    #[test]
    fn test_info_flags_invalid_layout_warning() {
        let page = Page::parse(PageBuilder::new().lower(20).build(), 0);
        let out = page_info(&page).unwrap();
        assert!(out.contains("WARNING"));
    }

    #[test]
    fn test_info_btree_meta_rendering() {
        let special_at = (PAGE_SIZE - 16) as u16;
        let mut meta = [0u8; 24];
        meta[0..4].copy_from_slice(&BTREE_META_MAGIC.to_le_bytes());
        meta[4..8].copy_from_slice(&4u32.to_le_bytes());
        meta[8..12].copy_from_slice(&1u32.to_le_bytes());
        let data = PageBuilder::new()
            .upper(special_at)
            .special(special_at)
            .write_bytes(24, &meta)
            .write_bytes(
                usize::from(special_at),
                &btree_special_bytes(0xFFFF_FFFF, 0xFFFF_FFFF, 0, 0x0008, 0),
            )
            .build();
        let page = Page::parse(data, 0);
        let out = page_info(&page).unwrap();
        assert!(out.contains("btpo_flags   : 0x0008 [BTP_META]"));
        assert!(out.contains("btm_magic          : 0x053162 (valid)"));
        assert!(out.contains("btm_root           : 1"));
        assert!(out.contains("btpo_prev    : NONE"));
    }

    #[test]
    fn test_data_heap_tuple_rendering() {
        let tuple = heap_tuple_bytes(969, 0, (0, 1), 3, 0x0902, 24, &[], b"\x01\x00\x00\x00\x13PENELOPE");
        #[allow(clippy::cast_possible_truncation)]
        let offset = (PAGE_SIZE - tuple.len()) as u16;
        #[allow(clippy::cast_possible_truncation)]
        let len = tuple.len() as u16;
        let data = PageBuilder::new()
            .item(ItemStatus::Normal, offset, len)
            .upper(offset)
            .write_bytes(usize::from(offset), &tuple)
            .build();
        let page = Page::parse(data, 0);
        let out = page_data(&page).unwrap();
        assert!(out.contains("t_xmin       : 969"));
        assert!(out.contains("t_xmax       : 0 (INVALID)"));
        assert!(out.contains("natts: 3"));
        assert!(out.contains("HAS_VARWIDTH"));
        assert!(out.contains("XMAX_INVALID"));
        assert!(out.contains("\"PENELOPE\""));
        assert!(out.contains("NORMAL: 1, DEAD: 0, UNUSED: 0, REDIRECT: 0"));
    }

    #[test]
    fn test_data_redirect_and_dead_items() {
        let data = PageBuilder::new()
            .item(ItemStatus::Redirect, 2, 0)
            .item(ItemStatus::Dead, 0, 0)
            .build();
        let page = Page::parse(data, 0);
        let out = page_data(&page).unwrap();
        assert!(out.contains("[REDIRECT -> line pointer 2]"));
        assert!(out.contains("[DEAD - no storage]"));
        assert!(out.contains("NORMAL: 0, DEAD: 1, UNUSED: 0, REDIRECT: 1"));
    }

    #[test]
    fn test_data_corrupt_item_not_dereferenced() {
        let data = PageBuilder::new()
            .item(ItemStatus::Normal, 8100, 200)
            .build();
        let page = Page::parse(data, 0);
        let out = page_data(&page).unwrap();
        assert!(out.contains("[ERROR: tuple extends beyond page]"));
    }
}
