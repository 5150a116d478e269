//! Tabular store adapter
//!
//! The whole datastore is a set of named tables ("sheets"), each with a fixed
//! header row followed by data rows of text cells. [`TabularStore`] is the
//! four-operation contract every backend implements: read all rows, append a
//! row, overwrite a contiguous cell range, delete a row. Tables are created
//! lazily with their declared header on first access.
//!
//! Two backends are provided: [`SqliteStore`], which keeps each sheet as a
//! SQLite table of text columns ordered by rowid, and [`MemoryStore`], an
//! in-memory map used by tests and embedded callers.
//!
//! Row indices are 1-based with the header occupying row 1, so data row *n*
//! (0-based position *n - 1* in `read_all`) sits at physical index *n + 1*.
//! Failures are surfaced to the caller and abort the enclosing operation;
//! there is no retry policy at this layer.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SalonOpsError};

/// Handle to a table, carrying the header actually present in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    /// Table name
    pub name: String,
    /// Column names in store order
    pub header: Vec<String>,
}

impl TableHandle {
    /// 1-based column index of `field`, if the header contains it.
    #[must_use]
    pub fn col(&self, field: &str) -> Option<usize> {
        self.header.iter().position(|h| h == field).map(|i| i + 1)
    }
}

/// A contiguous block of cells within a single row (all indices 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// Physical row index; the header is row 1, so data starts at row 2
    pub row: usize,
    /// First column of the span
    pub start_col: usize,
    /// Last column of the span, inclusive
    pub end_col: usize,
}

impl CellRange {
    /// Span over a single cell.
    #[must_use]
    pub const fn single(row: usize, col: usize) -> Self {
        Self { row, start_col: col, end_col: col }
    }

    /// Span over columns `start_col..=end_col` of one row.
    #[must_use]
    pub const fn span(row: usize, start_col: usize, end_col: usize) -> Self {
        Self { row, start_col, end_col }
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }
}

fn col_letter(mut col: usize) -> String {
    let mut letters = String::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters
}

impl fmt::Display for CellRange {
    /// A1 notation, e.g. `B5:H5`, used for logs and error messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_col == self.end_col {
            write!(f, "{}{}", col_letter(self.start_col), self.row)
        } else {
            write!(
                f,
                "{}{}:{}{}",
                col_letter(self.start_col),
                self.row,
                col_letter(self.end_col),
                self.row
            )
        }
    }
}

/// One data row as a field-name to cell-value mapping.
///
/// Cells are text; the typed getters parse leniently and return `None` on
/// anything unparseable, since spreadsheet-style data carries no types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row(BTreeMap<String, String>);

impl Row {
    /// Build a row by zipping a header with positional values.
    #[must_use]
    pub fn from_pairs(header: &[String], values: &[String]) -> Self {
        Self(
            header
                .iter()
                .zip(values.iter())
                .map(|(h, v)| (h.clone(), v.clone()))
                .collect(),
        )
    }

    /// Raw cell value, if the field exists.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Cell value as owned text, empty when absent.
    #[must_use]
    pub fn text(&self, field: &str) -> String {
        self.get(field).unwrap_or_default().to_string()
    }

    /// Cell value as an optional string, treating blank cells as absent.
    #[must_use]
    pub fn opt_text(&self, field: &str) -> Option<String> {
        match self.get(field).map(str::trim) {
            Some("") | None => None,
            Some(value) => Some(value.to_string()),
        }
    }

    /// Cell parsed as an integer; tolerates float-formatted cells like `5.0`.
    #[must_use]
    pub fn int(&self, field: &str) -> Option<i64> {
        let raw = self.get(field)?.trim();
        if let Ok(value) = raw.parse::<i64>() {
            return Some(value);
        }
        raw.parse::<f64>().ok().map(|v| v as i64)
    }

    /// Cell parsed as a float.
    #[must_use]
    pub fn float(&self, field: &str) -> Option<f64> {
        self.get(field)?.trim().parse::<f64>().ok()
    }
}

/// The four-operation contract over a set of named tables.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Return the table, creating it with `header` as row 1 when absent.
    ///
    /// A pre-existing table keeps whatever header it already has; there is
    /// no migration.
    async fn get_or_create_table(&self, name: &str, header: &[&str]) -> Result<TableHandle>;

    /// Every data row (header excluded), in the store's native order.
    async fn read_all(&self, table: &TableHandle) -> Result<Vec<Row>>;

    /// Append one row, values positional against the header. Short rows are
    /// padded with empty cells; over-long rows are rejected. No uniqueness
    /// check is performed here; callers guarantee unique ids.
    async fn append(&self, table: &TableHandle, values: &[String]) -> Result<()>;

    /// Overwrite the cells covered by `range` with `values` (one value per
    /// cell, left to right).
    async fn update_range(&self, table: &TableHandle, range: &CellRange, values: &[String])
        -> Result<()>;

    /// Remove one physical row. `row_index` is 1-based with the header as
    /// row 1; deleting the header is not allowed.
    async fn delete_row(&self, table: &TableHandle, row_index: usize) -> Result<()>;
}

fn check_range(table: &TableHandle, range: &CellRange, values: &[String]) -> Result<()> {
    if range.row < 2 {
        return Err(SalonOpsError::InvalidRange(format!(
            "{range} in {}: data rows start at row 2",
            table.name
        )));
    }
    if range.start_col < 1 || range.start_col > range.end_col || range.end_col > table.header.len()
    {
        return Err(SalonOpsError::InvalidRange(format!(
            "{range} does not fit the {}-column table {}",
            table.header.len(),
            table.name
        )));
    }
    if values.len() != range.width() {
        return Err(SalonOpsError::InvalidRange(format!(
            "{range} covers {} cells but {} values were given",
            range.width(),
            values.len()
        )));
    }
    Ok(())
}

fn pad_values(table: &TableHandle, values: &[String]) -> Result<Vec<String>> {
    if values.len() > table.header.len() {
        return Err(SalonOpsError::InvalidRange(format!(
            "appending {} values to the {}-column table {}",
            values.len(),
            table.header.len(),
            table.name
        )));
    }
    let mut row = values.to_vec();
    row.resize(table.header.len(), String::new());
    Ok(row)
}

/// Durable store backend keeping each sheet as a SQLite table of text
/// columns, rows ordered by rowid.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Open (or create) the database file backing the store.
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().build(manager)?;
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Column names of an existing table, in creation order; `None` when the
    /// table does not exist.
    fn existing_header(conn: &Connection, name: &str) -> Result<Option<Vec<String>>> {
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map(params![name], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(if columns.is_empty() { None } else { Some(columns) })
    }

    /// Rowid of the data row at 0-based `offset`, in rowid order.
    fn rowid_at(conn: &Connection, name: &str, offset: usize) -> Result<Option<i64>> {
        let sql = format!("SELECT rowid FROM \"{name}\" ORDER BY rowid LIMIT 1 OFFSET ?1");
        Ok(conn
            .query_row(&sql, params![offset as i64], |row| row.get(0))
            .optional()?)
    }
}

#[async_trait]
impl TabularStore for SqliteStore {
    async fn get_or_create_table(&self, name: &str, header: &[&str]) -> Result<TableHandle> {
        let conn = self.conn()?;
        if let Some(existing) = Self::existing_header(&conn, name)? {
            return Ok(TableHandle { name: name.to_string(), header: existing });
        }
        let columns = header
            .iter()
            .map(|h| format!("\"{h}\" TEXT"))
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute(&format!("CREATE TABLE IF NOT EXISTS \"{name}\" ({columns})"), [])?;
        debug!(table = name, "created table");
        Ok(TableHandle {
            name: name.to_string(),
            header: header.iter().map(ToString::to_string).collect(),
        })
    }

    async fn read_all(&self, table: &TableHandle) -> Result<Vec<Row>> {
        let conn = self.conn()?;
        let columns = table
            .header
            .iter()
            .map(|h| format!("\"{h}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {columns} FROM \"{}\" ORDER BY rowid", table.name);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                let mut values = Vec::with_capacity(table.header.len());
                for i in 0..table.header.len() {
                    values.push(row.get::<_, Option<String>>(i)?.unwrap_or_default());
                }
                Ok(values)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows
            .into_iter()
            .map(|values| Row::from_pairs(&table.header, &values))
            .collect())
    }

    async fn append(&self, table: &TableHandle, values: &[String]) -> Result<()> {
        let row = pad_values(table, values)?;
        let conn = self.conn()?;
        let columns = table
            .header
            .iter()
            .map(|h| format!("\"{h}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=row.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("INSERT INTO \"{}\" ({columns}) VALUES ({placeholders})", table.name);
        conn.execute(&sql, rusqlite::params_from_iter(row.iter()))?;
        Ok(())
    }

    async fn update_range(
        &self,
        table: &TableHandle,
        range: &CellRange,
        values: &[String],
    ) -> Result<()> {
        check_range(table, range, values)?;
        let conn = self.conn()?;
        let rowid = Self::rowid_at(&conn, &table.name, range.row - 2)?.ok_or_else(|| {
            SalonOpsError::InvalidRange(format!("{range}: row beyond table {}", table.name))
        })?;
        let assignments = (range.start_col..=range.end_col)
            .enumerate()
            .map(|(i, col)| format!("\"{}\" = ?{}", table.header[col - 1], i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE \"{}\" SET {assignments} WHERE rowid = ?{}",
            table.name,
            values.len() + 1
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = values
            .iter()
            .map(|v| Box::new(v.clone()) as Box<dyn rusqlite::ToSql>)
            .collect();
        params.push(Box::new(rowid));
        conn.execute(&sql, rusqlite::params_from_iter(params.iter()))?;
        debug!(table = %table.name, range = %range, "updated range");
        Ok(())
    }

    async fn delete_row(&self, table: &TableHandle, row_index: usize) -> Result<()> {
        if row_index < 2 {
            return Err(SalonOpsError::InvalidRange(format!(
                "row {row_index} in {}: the header row cannot be deleted",
                table.name
            )));
        }
        let conn = self.conn()?;
        let rowid = Self::rowid_at(&conn, &table.name, row_index - 2)?.ok_or_else(|| {
            SalonOpsError::InvalidRange(format!("row {row_index} beyond table {}", table.name))
        })?;
        conn.execute(
            &format!("DELETE FROM \"{}\" WHERE rowid = ?1", table.name),
            params![rowid],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// In-memory store backend for tests and embedded use.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, MemTable>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, MemTable>>> {
        self.tables
            .lock()
            .map_err(|_| SalonOpsError::Store("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TabularStore for MemoryStore {
    async fn get_or_create_table(&self, name: &str, header: &[&str]) -> Result<TableHandle> {
        let mut tables = self.lock()?;
        let table = tables.entry(name.to_string()).or_insert_with(|| MemTable {
            header: header.iter().map(ToString::to_string).collect(),
            rows: Vec::new(),
        });
        Ok(TableHandle { name: name.to_string(), header: table.header.clone() })
    }

    async fn read_all(&self, table: &TableHandle) -> Result<Vec<Row>> {
        let tables = self.lock()?;
        let mem = tables
            .get(&table.name)
            .ok_or_else(|| SalonOpsError::MissingTable(table.name.clone()))?;
        Ok(mem
            .rows
            .iter()
            .map(|values| Row::from_pairs(&mem.header, values))
            .collect())
    }

    async fn append(&self, table: &TableHandle, values: &[String]) -> Result<()> {
        let row = pad_values(table, values)?;
        let mut tables = self.lock()?;
        let mem = tables
            .get_mut(&table.name)
            .ok_or_else(|| SalonOpsError::MissingTable(table.name.clone()))?;
        mem.rows.push(row);
        Ok(())
    }

    async fn update_range(
        &self,
        table: &TableHandle,
        range: &CellRange,
        values: &[String],
    ) -> Result<()> {
        check_range(table, range, values)?;
        let mut tables = self.lock()?;
        let mem = tables
            .get_mut(&table.name)
            .ok_or_else(|| SalonOpsError::MissingTable(table.name.clone()))?;
        let row = mem.rows.get_mut(range.row - 2).ok_or_else(|| {
            SalonOpsError::InvalidRange(format!("{range}: row beyond table {}", table.name))
        })?;
        for (value, col) in values.iter().zip(range.start_col..=range.end_col) {
            row[col - 1] = value.clone();
        }
        Ok(())
    }

    async fn delete_row(&self, table: &TableHandle, row_index: usize) -> Result<()> {
        if row_index < 2 {
            return Err(SalonOpsError::InvalidRange(format!(
                "row {row_index} in {}: the header row cannot be deleted",
                table.name
            )));
        }
        let mut tables = self.lock()?;
        let mem = tables
            .get_mut(&table.name)
            .ok_or_else(|| SalonOpsError::MissingTable(table.name.clone()))?;
        if row_index - 2 >= mem.rows.len() {
            return Err(SalonOpsError::InvalidRange(format!(
                "row {row_index} beyond table {}",
                table.name
            )));
        }
        mem.rows.remove(row_index - 2);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_range_a1_display() {
        assert_eq!(CellRange::span(5, 2, 8).to_string(), "B5:H5");
        assert_eq!(CellRange::single(3, 7).to_string(), "G3");
        assert_eq!(CellRange::single(2, 27).to_string(), "AA2");
    }

    #[test]
    fn test_row_lenient_parsing() {
        let header = vec!["id".to_string(), "precio".to_string(), "nombre".to_string()];
        let row = Row::from_pairs(&header, &["7.0".into(), "45.5".into(), " Ana ".into()]);
        assert_eq!(row.int("id"), Some(7));
        assert_eq!(row.float("precio"), Some(45.5));
        assert_eq!(row.opt_text("nombre").as_deref(), Some("Ana"));
        assert_eq!(row.int("missing"), None);
    }
}
