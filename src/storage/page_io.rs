//! Relation file access
//!
//! A relation file is a pure sequence of 8 KiB pages; page `n` lives at
//! byte offset `n * 8192`. Single pages are read with seek + read_exact;
//! the whole-file scan behind the `pages` command maps the file once
//! instead of issuing one seek per page.

use crate::common::error::{Error, Result};
use crate::storage::page::Page;
use crate::storage::page_constants::PAGE_SIZE;
use memmap2::Mmap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Calculate the byte offset for a given page number
pub fn calculate_page_offset(page_num: usize) -> u64 {
    page_num as u64 * PAGE_SIZE as u64
}

/// An open relation file
#[derive(Debug)]
pub struct RelationFile {
    file: File,
    path: PathBuf,
    size: u64,
    page_count: usize,
}

impl RelationFile {
    /// Open a relation file and compute its page count.
    ///
    /// A file size that is not a multiple of the page size logs a
    /// warning; the trailing partial page is never read.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::not_found(format!("{}: {e}", path.display()))
            } else {
                Error::io(format!("{}: {e}", path.display()))
            }
        })?;
        let size = file.metadata()?.len();

        if size % PAGE_SIZE as u64 != 0 {
            crate::pagescope_warn!(
                "file size {} is not a multiple of {}; trailing bytes ignored",
                size,
                PAGE_SIZE
            );
        }

        #[allow(clippy::cast_possible_truncation)]
        let page_count = (size / PAGE_SIZE as u64) as usize;

        Ok(Self {
            file,
            path,
            size,
            page_count,
        })
    }

    /// File path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of whole pages in the file.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Read and decode one page.
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range page numbers and for seek or
    /// read failures; the error names the page.
    pub fn read_page(&mut self, page_num: usize) -> Result<Page> {
        if page_num >= self.page_count {
            return Err(Error::invalid_input(format!(
                "page {page_num} out of range (file has {} pages)",
                self.page_count
            )));
        }

        self.file
            .seek(SeekFrom::Start(calculate_page_offset(page_num)))
            .map_err(|e| Error::io(format!("seek to page {page_num}: {e}")))?;

        let mut data = [0u8; PAGE_SIZE];
        self.file
            .read_exact(&mut data)
            .map_err(|e| Error::io(format!("read page {page_num}: {e}")))?;

        Ok(Page::parse(data, page_num))
    }

    /// Decode every page in the file through one memory mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the mapping cannot be created.
    pub fn scan(&self) -> Result<PageScan> {
        let mmap = if self.page_count == 0 {
            None
        } else {
            // SAFETY: the mapping is read-only and pages are copied out
            // before decoding; a concurrent writer can only produce torn
            // page images, which the decoder treats as malformed input.
            Some(unsafe { Mmap::map(&self.file)? })
        };
        Ok(PageScan {
            mmap,
            next: 0,
            count: self.page_count,
        })
    }
}

/// Iterator over every page of a relation file
pub struct PageScan {
    mmap: Option<Mmap>,
    next: usize,
    count: usize,
}

impl Iterator for PageScan {
    type Item = Page;

    fn next(&mut self) -> Option<Page> {
        if self.next >= self.count {
            return None;
        }
        let mmap = self.mmap.as_ref()?;
        let start = self.next * PAGE_SIZE;
        let mut data = [0u8; PAGE_SIZE];
        data.copy_from_slice(mmap.get(start..start + PAGE_SIZE)?);

        let page = Page::parse(data, self.next);
        self.next += 1;
        Some(page)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}
