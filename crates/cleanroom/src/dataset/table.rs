//! In-memory dataset of customer records.

use std::collections::{HashMap, HashSet};

use crate::audit::CellChange;

use super::cell::Cell;

/// An ordered sequence of records sharing one schema.
///
/// Rows are addressed by position; every row holds exactly one cell per
/// column.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    delimiter: u8,
}

impl Dataset {
    /// Create a dataset, padding short rows with nulls and truncating long
    /// ones.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Null);
                row
            })
            .collect();

        Self {
            columns,
            rows,
            delimiter: b',',
        }
    }

    /// Create a dataset from raw string fields, interpreting each with
    /// [`Cell::parse`].
    pub fn from_raw<S: AsRef<str>>(columns: &[S], rows: &[Vec<S>]) -> Self {
        Self::new(
            columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| Cell::parse(v.as_ref())).collect())
                .collect(),
        )
    }

    /// Set the delimiter used when the dataset is written back out.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get a cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// All cells of a column by position.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// All cells of a named column.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&Cell>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Rewrite every cell of a column and return the cells that changed.
    ///
    /// Returns an empty list when the column does not exist.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Vec<CellChange>
    where
        F: FnMut(&Cell) -> Cell,
    {
        let Some(index) = self.column_index(name) else {
            return Vec::new();
        };

        let mut changes = Vec::new();
        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            let new = f(&row[index]);
            if new != row[index] {
                let old = std::mem::replace(&mut row[index], new.clone());
                changes.push(CellChange {
                    row: row_idx,
                    old,
                    new,
                });
            }
        }
        changes
    }

    /// Replace the contents of a column, appending it when absent.
    ///
    /// `values` is padded with nulls or truncated to the row count.
    pub fn set_column(&mut self, name: &str, mut values: Vec<Cell>) {
        values.resize(self.rows.len(), Cell::Null);
        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[index] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Remove a column. Returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(index);
        for row in &mut self.rows {
            row.remove(index);
        }
        true
    }

    /// Identity key of a row over every column except `exclude`.
    fn row_key(&self, row: usize, exclude: Option<usize>) -> Vec<String> {
        self.rows[row]
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != exclude)
            .map(|(_, cell)| cell.identity_key())
            .collect()
    }

    /// Mark every row that has at least one identical twin elsewhere in the
    /// dataset, comparing all columns except `exclude`.
    pub fn duplicate_mask(&self, exclude: Option<&str>) -> Vec<bool> {
        let exclude = exclude.and_then(|name| self.column_index(name));
        let mut counts: HashMap<Vec<String>, usize> = HashMap::new();
        let keys: Vec<Vec<String>> = (0..self.rows.len())
            .map(|i| self.row_key(i, exclude))
            .collect();

        for key in &keys {
            *counts.entry(key.clone()).or_insert(0) += 1;
        }

        keys.iter().map(|key| counts[key] > 1).collect()
    }

    /// Drop all but the first occurrence of each identical row, comparing
    /// all columns except `exclude`. Returns the original indices of the
    /// removed rows.
    pub fn dedup_rows(&mut self, exclude: Option<&str>) -> Vec<usize> {
        let exclude = exclude.and_then(|name| self.column_index(name));
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        let mut removed = Vec::new();

        let keep: Vec<bool> = (0..self.rows.len())
            .map(|i| {
                let fresh = seen.insert(self.row_key(i, exclude));
                if !fresh {
                    removed.push(i);
                }
                fresh
            })
            .collect();

        if !removed.is_empty() {
            let mut flags = keep.into_iter();
            self.rows.retain(|_| flags.next().unwrap_or(true));
        }
        removed
    }

    /// Whether any cell outside `exclude` is null or a missing-like sentinel.
    pub fn has_missing_like(&self, exclude: Option<&str>) -> bool {
        let exclude = exclude.and_then(|name| self.column_index(name));
        self.rows.iter().any(|row| {
            row.iter()
                .enumerate()
                .any(|(i, cell)| Some(i) != exclude && cell.is_missing_like())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_dataset(columns: Vec<&str>, rows: Vec<Vec<&str>>) -> Dataset {
        Dataset::from_raw(&columns, &rows)
    }

    #[test]
    fn test_rows_are_padded_and_truncated() {
        let ds = Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Cell::Number(1.0)], vec![Cell::Null, Cell::Null, Cell::Null]],
        );
        assert_eq!(ds.row(0).unwrap().len(), 2);
        assert_eq!(ds.row(1).unwrap().len(), 2);
    }

    #[test]
    fn test_map_column_reports_changes() {
        let mut ds = make_dataset(vec!["gender"], vec![vec!["Male"], vec!["m"]]);
        let changes = ds.map_column("gender", |c| match c.as_text() {
            Some("m") => Cell::text("Male"),
            _ => c.clone(),
        });

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].row, 1);
        assert_eq!(ds.get(1, "gender"), Some(&Cell::text("Male")));
    }

    #[test]
    fn test_map_missing_column_is_noop() {
        let mut ds = make_dataset(vec!["a"], vec![vec!["1"]]);
        assert!(ds.map_column("b", |_| Cell::Null).is_empty());
    }

    #[test]
    fn test_duplicate_mask_is_symmetric() {
        let ds = make_dataset(
            vec!["name", "age"],
            vec![vec!["Bob", "30"], vec!["Ann", "25"], vec!["Bob", "30"]],
        );
        assert_eq!(ds.duplicate_mask(None), vec![true, false, true]);
    }

    #[test]
    fn test_duplicate_mask_excludes_column() {
        let ds = make_dataset(
            vec!["name", "issues"],
            vec![vec!["Bob", "Duplicate"], vec!["Bob", ""]],
        );
        assert_eq!(ds.duplicate_mask(Some("issues")), vec![true, true]);
        assert_eq!(ds.duplicate_mask(None), vec![false, false]);
    }

    #[test]
    fn test_dedup_keeps_first() {
        let mut ds = make_dataset(
            vec!["name"],
            vec![vec!["Bob"], vec!["Ann"], vec!["Bob"], vec!["Ann"], vec!["Cy"]],
        );
        let removed = ds.dedup_rows(None);

        assert_eq!(removed, vec![2, 3]);
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.get(2, "name"), Some(&Cell::text("Cy")));
    }

    #[test]
    fn test_set_and_drop_column() {
        let mut ds = make_dataset(vec!["a"], vec![vec!["1"], vec!["2"]]);
        ds.set_column("issues", vec![Cell::text(""), Cell::text("Duplicate")]);
        assert_eq!(ds.columns(), &["a".to_string(), "issues".to_string()]);

        assert!(ds.drop_column("issues"));
        assert!(!ds.drop_column("issues"));
        assert_eq!(ds.column_count(), 1);
    }

    #[test]
    fn test_has_missing_like() {
        let ds = make_dataset(
            vec!["city", "issues"],
            vec![vec!["Gotham", ""], vec!["Metropolis", ""]],
        );
        assert!(!ds.has_missing_like(Some("issues")));
        assert!(ds.has_missing_like(None));
    }
}
