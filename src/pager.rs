//! Page store: fixed-size pages allocated on first touch.
//!
//! A row index maps to a page number and a byte offset inside that page.
//! Rows never span pages; bytes past the last whole row of a page are never
//! read or written.

use log::debug;

use crate::error::{CodecError, TableError, TableResult};
use crate::{PAGE_SIZE, ROW_SIZE, TABLE_MAX_PAGES};

/// One zero-initialised page buffer.
pub struct Page<const SIZE: usize = PAGE_SIZE> {
    data: Box<[u8; SIZE]>,
}

impl<const SIZE: usize> Page<SIZE> {
    fn zeroed() -> Self {
        Self {
            data: Box::new([0u8; SIZE]),
        }
    }

    pub fn as_bytes(&self) -> &[u8; SIZE] {
        &self.data
    }
}

/// A position in the page array.
pub enum PageSlot<const SIZE: usize = PAGE_SIZE> {
    Absent,
    Allocated(Page<SIZE>),
}

impl<const SIZE: usize> PageSlot<SIZE> {
    pub fn is_allocated(&self) -> bool {
        matches!(self, PageSlot::Allocated(_))
    }

    pub fn page(&self) -> Option<&Page<SIZE>> {
        match self {
            PageSlot::Absent => None,
            PageSlot::Allocated(page) => Some(page),
        }
    }

    fn get_or_allocate(&mut self, page_number: usize) -> &mut Page<SIZE> {
        if let PageSlot::Absent = self {
            debug!("allocating page {page_number}");
            *self = PageSlot::Allocated(Page::zeroed());
        }
        match self {
            PageSlot::Allocated(page) => page,
            PageSlot::Absent => unreachable!("slot allocated above"),
        }
    }
}

/// Where a row lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLocation {
    pub page_number: usize,
    pub byte_offset: usize,
}

pub struct Pager<const SIZE: usize = PAGE_SIZE, const MAX_PAGES: usize = TABLE_MAX_PAGES> {
    slots: [PageSlot<SIZE>; MAX_PAGES],
}

impl<const SIZE: usize, const MAX_PAGES: usize> Pager<SIZE, MAX_PAGES> {
    pub const ROWS_PER_PAGE: usize = {
        assert!(SIZE >= ROW_SIZE, "a page must hold at least one row");
        SIZE / ROW_SIZE
    };
    pub const MAX_ROWS: usize = Self::ROWS_PER_PAGE * MAX_PAGES;

    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| PageSlot::Absent),
        }
    }

    pub fn locate(&self, row_index: usize) -> TableResult<RowLocation> {
        if row_index >= Self::MAX_ROWS {
            return Err(TableError::RowOutOfRange {
                index: row_index,
                max_rows: Self::MAX_ROWS,
            });
        }

        Ok(RowLocation {
            page_number: row_index / Self::ROWS_PER_PAGE,
            byte_offset: (row_index % Self::ROWS_PER_PAGE) * ROW_SIZE,
        })
    }

    /// Mutable window for `row_index`, allocating its page if needed.
    pub fn address_of(&mut self, row_index: usize) -> TableResult<&mut [u8; ROW_SIZE]> {
        let RowLocation {
            page_number,
            byte_offset,
        } = self.locate(row_index)?;

        let page = self.slots[page_number].get_or_allocate(page_number);
        let window = &mut page.data[byte_offset..byte_offset + ROW_SIZE];
        let found = window.len();
        let window = <&mut [u8; ROW_SIZE]>::try_from(window).map_err(|_| CodecError::BlockLength {
            expected: ROW_SIZE,
            found,
        })?;
        Ok(window)
    }

    /// Read-only window for `row_index`; `None` if its page was never written.
    pub fn row(&self, row_index: usize) -> Option<&[u8; ROW_SIZE]> {
        let RowLocation {
            page_number,
            byte_offset,
        } = self.locate(row_index).ok()?;

        let page = self.slots[page_number].page()?;
        <&[u8; ROW_SIZE]>::try_from(&page.data[byte_offset..byte_offset + ROW_SIZE]).ok()
    }

    pub fn slot(&self, page_number: usize) -> Option<&PageSlot<SIZE>> {
        self.slots.get(page_number)
    }

    pub fn is_allocated(&self, page_number: usize) -> bool {
        self.slot(page_number).is_some_and(PageSlot::is_allocated)
    }

    pub fn allocated_pages(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_allocated()).count()
    }
}

impl<const SIZE: usize, const MAX_PAGES: usize> Default for Pager<SIZE, MAX_PAGES> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ROWS_PER_PAGE, TABLE_MAX_ROWS};

    type SmallPager = Pager<{ 4 * ROW_SIZE + 10 }, 3>;

    #[test]
    fn default_geometry_matches_constants() {
        assert_eq!(Pager::<PAGE_SIZE, TABLE_MAX_PAGES>::ROWS_PER_PAGE, ROWS_PER_PAGE);
        assert_eq!(Pager::<PAGE_SIZE, TABLE_MAX_PAGES>::MAX_ROWS, TABLE_MAX_ROWS);
        assert_eq!(ROWS_PER_PAGE, 14);
    }

    #[test]
    fn it_maps_row_index_to_page_and_offset() {
        let pager = SmallPager::new();
        assert_eq!(SmallPager::ROWS_PER_PAGE, 4);

        assert_eq!(
            pager.locate(0).unwrap(),
            RowLocation {
                page_number: 0,
                byte_offset: 0
            }
        );
        assert_eq!(
            pager.locate(3).unwrap(),
            RowLocation {
                page_number: 0,
                byte_offset: 3 * ROW_SIZE
            }
        );
        assert_eq!(
            pager.locate(9).unwrap(),
            RowLocation {
                page_number: 2,
                byte_offset: ROW_SIZE
            }
        );
    }

    #[test]
    fn it_allocates_pages_lazily() {
        let mut pager = SmallPager::new();
        assert_eq!(pager.allocated_pages(), 0);
        assert!(pager.row(0).is_none());

        pager.address_of(5).unwrap();
        assert!(!pager.is_allocated(0));
        assert!(pager.is_allocated(1));
        assert_eq!(pager.allocated_pages(), 1);

        pager.address_of(4).unwrap();
        pager.address_of(7).unwrap();
        assert_eq!(pager.allocated_pages(), 1);
    }

    #[test]
    fn it_returns_the_same_page_on_repeat_access() {
        let mut pager = SmallPager::new();
        pager.address_of(1).unwrap()[0] = 0xAB;

        assert_eq!(pager.address_of(1).unwrap()[0], 0xAB);
        assert_eq!(pager.row(1).unwrap()[0], 0xAB);
        let page = pager.slot(0).and_then(PageSlot::page).unwrap();
        assert_eq!(page.as_bytes()[ROW_SIZE], 0xAB);
    }

    #[test]
    fn it_rejects_rows_past_capacity() {
        let mut pager = SmallPager::new();
        let err = pager.address_of(SmallPager::MAX_ROWS).unwrap_err();

        assert_eq!(
            err,
            TableError::RowOutOfRange {
                index: 12,
                max_rows: 12
            }
        );
        assert_eq!(pager.allocated_pages(), 0);
        assert!(pager.row(SmallPager::MAX_ROWS).is_none());
    }
}
