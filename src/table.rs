//! Append-only table on top of the page store.

use log::{debug, warn};

use crate::error::{TableError, TableResult};
use crate::pager::Pager;
use crate::row::Row;
use crate::{PAGE_SIZE, TABLE_MAX_PAGES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Accepting,
    /// Terminal for appends; scans still work.
    Full,
}

pub struct Table<const SIZE: usize = PAGE_SIZE, const MAX_PAGES: usize = TABLE_MAX_PAGES> {
    num_rows: usize,
    pager: Pager<SIZE, MAX_PAGES>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<const SIZE: usize, const MAX_PAGES: usize> Table<SIZE, MAX_PAGES> {
    pub const ROWS_PER_PAGE: usize = Pager::<SIZE, MAX_PAGES>::ROWS_PER_PAGE;
    pub const MAX_ROWS: usize = Pager::<SIZE, MAX_PAGES>::MAX_ROWS;

    /// Stores `row` at the next index and returns that index.
    pub fn append(&mut self, row: &Row) -> TableResult<usize> {
        if self.num_rows >= Self::MAX_ROWS {
            warn!("append rejected, table holds {} rows", self.num_rows);
            return Err(TableError::CapacityExceeded {
                max_rows: Self::MAX_ROWS,
            });
        }

        let index = self.num_rows;
        row.serialize_into(self.pager.address_of(index)?);
        self.num_rows += 1;
        debug!("appended row {index} (id {})", row.id);
        Ok(index)
    }

    /// Rows in insertion order. Every call starts again from index 0.
    pub fn scan(&self) -> Cursor<'_, SIZE, MAX_PAGES> {
        Cursor::start(self)
    }

    pub fn state(&self) -> TableState {
        if self.num_rows >= Self::MAX_ROWS {
            TableState::Full
        } else {
            TableState::Accepting
        }
    }

    pub fn len(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn pager(&self) -> &Pager<SIZE, MAX_PAGES> {
        &self.pager
    }
}

impl<const SIZE: usize, const MAX_PAGES: usize> Default for Table<SIZE, MAX_PAGES> {
    fn default() -> Self {
        Self {
            num_rows: 0,
            pager: Pager::new(),
        }
    }
}

/// Position in a table during a scan.
pub struct Cursor<'a, const SIZE: usize = PAGE_SIZE, const MAX_PAGES: usize = TABLE_MAX_PAGES> {
    table: &'a Table<SIZE, MAX_PAGES>,
    row_num: usize,
}

impl<'a, const SIZE: usize, const MAX_PAGES: usize> Cursor<'a, SIZE, MAX_PAGES> {
    pub fn start(table: &'a Table<SIZE, MAX_PAGES>) -> Self {
        Self { table, row_num: 0 }
    }

    pub fn end(table: &'a Table<SIZE, MAX_PAGES>) -> Self {
        Self {
            table,
            row_num: table.num_rows,
        }
    }

    pub fn row_num(&self) -> usize {
        self.row_num
    }

    pub fn end_of_table(&self) -> bool {
        self.row_num >= self.table.num_rows
    }

    /// Row under the cursor without advancing.
    pub fn value(&self) -> Option<Row> {
        if self.end_of_table() {
            return None;
        }
        let block = self.table.pager.row(self.row_num);
        debug_assert!(block.is_some(), "row {} below num_rows has no page", self.row_num);
        block.map(Row::deserialize)
    }

    pub fn advance(&mut self) {
        if !self.end_of_table() {
            self.row_num += 1;
        }
    }
}

impl<const SIZE: usize, const MAX_PAGES: usize> Iterator for Cursor<'_, SIZE, MAX_PAGES> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        let row = self.value()?;
        self.advance();
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.table.num_rows.saturating_sub(self.row_num);
        (0, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ROW_SIZE, ROWS_PER_PAGE, TABLE_MAX_ROWS};

    /// Four rows per page, three pages.
    type SmallTable = Table<{ 4 * ROW_SIZE }, 3>;

    fn user(id: i32) -> Row {
        Row::new(id, &format!("user{id}"), &format!("person{id}@example.com"))
    }

    #[test]
    fn new_table_is_empty() {
        let table = Table::new();

        assert!(table.is_empty());
        assert_eq!(table.state(), TableState::Accepting);
        assert_eq!(table.pager().allocated_pages(), 0);
        assert_eq!(table.scan().count(), 0);
    }

    #[test]
    fn it_scans_rows_in_append_order() {
        let mut table = Table::new();
        for id in 1..=3 {
            assert_eq!(table.append(&user(id)).unwrap(), (id - 1) as usize);
        }

        let rows: Vec<Row> = table.scan().collect();
        assert_eq!(rows, vec![user(1), user(2), user(3)]);
    }

    #[test]
    fn scan_is_idempotent() {
        let mut table = Table::new();
        table.append(&user(1)).unwrap();
        table.append(&user(2)).unwrap();

        let first: Vec<Row> = table.scan().collect();
        let second: Vec<Row> = table.scan().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn it_allocates_a_second_page_after_one_full_page() {
        let mut table = Table::new();
        for id in 0..ROWS_PER_PAGE as i32 {
            table.append(&user(id)).unwrap();
        }
        assert_eq!(table.pager().allocated_pages(), 1);

        table.append(&user(99)).unwrap();
        assert_eq!(table.pager().allocated_pages(), 2);
    }

    #[test]
    fn ten_rows_over_four_row_pages() {
        let mut table = SmallTable::default();
        for id in 1..=10 {
            table.append(&user(id)).unwrap();
        }

        let ids: Vec<i32> = table.scan().map(|row| row.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert_eq!(table.len(), 10);

        let pager = table.pager();
        assert_eq!(pager.allocated_pages(), 3);
        for (index, id) in (1..=10).enumerate() {
            let location = pager.locate(index).unwrap();
            assert_eq!(location.page_number, (id as usize - 1) / 4);
            assert_eq!(Row::deserialize(pager.row(index).unwrap()).id, id);
        }
    }

    #[test]
    fn it_rejects_appends_past_capacity() {
        let mut table = SmallTable::default();
        for id in 0..SmallTable::MAX_ROWS as i32 {
            table.append(&user(id)).unwrap();
        }
        assert_eq!(table.state(), TableState::Full);
        let before: Vec<Row> = table.scan().collect();

        let err = table.append(&user(1000)).unwrap_err();
        assert_eq!(err, TableError::CapacityExceeded { max_rows: 12 });
        assert_eq!(table.len(), 12);
        assert_eq!(table.state(), TableState::Full);
        assert_eq!(table.scan().collect::<Vec<_>>(), before);
    }

    #[test]
    fn default_table_holds_table_max_rows() {
        let mut table = Table::new();
        for i in 0..TABLE_MAX_ROWS {
            table.append(&user(i as i32)).unwrap();
        }

        assert!(table.append(&user(-1)).is_err());
        assert_eq!(table.pager().allocated_pages(), crate::TABLE_MAX_PAGES);
        assert_eq!(table.scan().last(), Some(user(TABLE_MAX_ROWS as i32 - 1)));
    }

    #[test]
    fn cursor_walks_to_end_of_table() {
        let mut table = SmallTable::default();
        table.append(&user(1)).unwrap();

        let mut cursor = Cursor::start(&table);
        assert!(!cursor.end_of_table());
        assert_eq!(cursor.value(), Some(user(1)));
        cursor.advance();
        assert!(cursor.end_of_table());
        assert_eq!(cursor.value(), None);
        assert_eq!(Cursor::end(&table).row_num(), 1);
    }
}
