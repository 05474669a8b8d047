//! Page layout rendering: region table and proportional bar

use crate::common::Result;
use crate::storage::page::Page;
use crate::storage::page_constants::PAGE_HEADER_SIZE;
use crate::storage::page_type::PageType;
use std::fmt::Write;

const BOX_WIDTH: usize = 64;
const BAR_COLUMNS: usize = 60;

/// One of the five byte ranges a page divides into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Human-readable region label
    pub label: String,
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
}

impl Region {
    /// Region size in bytes; zero when the offsets are inverted.
    pub fn size(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Split a page into its five regions, in page order: header, line
/// pointers, free space, tuple area, special space. Empty regions are
/// included (size 0); renderers skip them.
pub fn regions(page: &Page) -> Vec<Region> {
    let h = page.header();
    let page_size = h.page_size();
    let lower = usize::from(h.lower);
    let upper = usize::from(h.upper);
    let special = usize::from(h.special);

    let tuple_label = match page.page_type() {
        PageType::Heap => "Heap Tuples".to_string(),
        t if t.is_index() => format!("Index Tuples ({t})"),
        _ => "Tuples".to_string(),
    };

    vec![
        Region {
            label: "Page Header (PageHeaderData)".to_string(),
            start: 0,
            end: PAGE_HEADER_SIZE,
        },
        Region {
            label: format!("Line Pointers ({} items)", h.item_count()),
            start: PAGE_HEADER_SIZE,
            end: lower.max(PAGE_HEADER_SIZE),
        },
        Region {
            label: "Free Space".to_string(),
            start: lower,
            end: upper.max(lower),
        },
        Region {
            label: tuple_label,
            start: upper,
            end: special.max(upper),
        },
        Region {
            label: format!("Special Space ({})", page.page_type()),
            start: special,
            end: page_size.max(special),
        },
    ]
}

/// Render the boxed layout table plus the proportional bar.
///
/// # Errors
///
/// Propagates formatting failures.
pub fn page_layout(page: &Page) -> Result<String> {
    let h = page.header();
    let page_size = h.page_size();
    let regions = regions(page);
    let bar = format!("+{}+", "-".repeat(BOX_WIDTH - 2));

    let mut out = String::new();
    writeln!(out)?;
    writeln!(
        out,
        "  Page Layout (page size: {page_size}, type: {})",
        page.page_type()
    )?;
    writeln!(out, "  Offset 0x{:04x} - 0x{:04x}", 0, page_size - 1)?;
    writeln!(out)?;

    for region in &regions {
        if region.size() == 0 {
            continue;
        }
        let content = format!(
            " {:<30} [{:5} - {:5}] {:5} bytes ",
            region.label,
            region.start,
            region.end - 1,
            region.size()
        );
        let pad = BOX_WIDTH.saturating_sub(2 + content.len());
        writeln!(out, "{bar}")?;
        writeln!(out, "|{content}{}|", " ".repeat(pad))?;
    }
    writeln!(out, "{bar}")?;

    writeln!(out)?;
    writeln!(out, "  Proportional view:")?;
    writeln!(out, "  [{}]", proportional_bar(&regions))?;
    writeln!(out, "   H=Header  L=LinePointers  .=Free  T=Tuples  S=Special")?;
    writeln!(out)?;
    Ok(out)
}

/// Scale the five regions onto a fixed-width character bar. Every
/// nonempty region keeps at least one column.
fn proportional_bar(regions: &[Region]) -> String {
    const CHARS: [char; 5] = ['H', 'L', '.', 'T', 'S'];

    let sizes: Vec<usize> = regions.iter().map(Region::size).collect();
    let total_size: usize = sizes.iter().sum();

    let mut cols = vec![0usize; sizes.len()];
    let mut remaining = BAR_COLUMNS;
    for (col, &size) in cols.iter_mut().zip(&sizes) {
        if size > 0 {
            *col = 1;
            remaining -= 1;
        }
    }
    if total_size > 0 && remaining > 0 {
        for (col, &size) in cols.iter_mut().zip(&sizes) {
            if size > 0 {
                *col += size * remaining / total_size;
            }
        }
        // Integer division leaves a few columns over; hand them out in
        // page order until the bar is full
        let mut used: usize = cols.iter().sum();
        for (col, &size) in cols.iter_mut().zip(&sizes) {
            if used >= BAR_COLUMNS {
                break;
            }
            if size > 0 {
                *col += 1;
                used += 1;
            }
        }
    }

    cols.iter()
        .zip(CHARS.iter())
        .map(|(&n, &c)| c.to_string().repeat(n))
        .collect()
}
