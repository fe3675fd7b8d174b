// crates/provstat-core/src/table.rs

//! A small column-named table.
//!
//! Every source file is read into a [`Table`] of [`Cell`]s first; joins,
//! renames and coercions all happen at this level and produce new tables.
//! Typed records are only projected out at the very end.

use crate::error::{Result, StatError};
use crate::text::standardize_number;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;

/// One cell of a [`Table`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Raw CSV field → cell. Blank fields are missing.
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            Cell::Missing
        } else {
            Cell::Text(raw.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric view. Text cells are parsed with [`standardize_number`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Missing => None,
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => standardize_number(s),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Join key of this cell. Missing cells never match anything.
    fn join_key(&self) -> Option<String> {
        match self {
            Cell::Missing => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Missing, Cell::Number)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Row-major table with named columns.
///
/// Rows always have exactly `columns().len()` cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding with missing cells or truncating to fit.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Missing);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
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

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Iterates the cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Renames a column. Returns `false` if `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Applies every `(from, to)` rename whose source column exists.
    pub fn rename_columns(&mut self, pairs: &[(&str, &str)]) {
        for (from, to) in pairs {
            self.rename_column(from, to);
        }
    }

    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }

    /// Projects the listed columns that exist, in the given order.
    pub fn select(&self, names: &[&str]) -> Table {
        let picked: Vec<(usize, &str)> = names
            .iter()
            .filter_map(|n| self.column_index(n).map(|i| (i, *n)))
            .collect();
        Table {
            columns: picked.iter().map(|(_, n)| n.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| picked.iter().map(|(i, _)| r[*i].clone()).collect())
                .collect(),
        }
    }

    /// Rewrites every cell of a column in place.
    pub fn map_column(&mut self, name: &str, mut f: impl FnMut(&Cell) -> Cell) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        true
    }

    /// Adds (or replaces) a column. `values` is padded with missing cells.
    pub fn set_column(&mut self, name: &str, mut values: Vec<Cell>) {
        values.resize(self.rows.len(), Cell::Missing);
        match self.column_index(name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
    }

    pub fn retain_rows(&mut self, mut keep: impl FnMut(&[Cell]) -> bool) {
        self.rows.retain(|r| keep(r));
    }

    /// Drops rows whose `key` cell is missing.
    pub fn drop_missing_key(&mut self, key: &str) {
        if let Some(idx) = self.column_index(key) {
            self.rows.retain(|r| !r[idx].is_missing());
        }
    }

    /// Full outer join on `key`.
    ///
    /// - Columns: all of `self`, then the non-key columns of `other`.
    ///   Clashing non-key names are suffixed `_x` (left) and `_y` (right).
    /// - A key present on one side only yields a row padded with missing
    ///   cells on the other side.
    /// - Missing keys never match.
    /// - Rows are ordered by key, missing keys last.
    pub fn outer_join(&self, other: &Table, key: &str) -> Result<Table> {
        let lk = self
            .column_index(key)
            .ok_or_else(|| StatError::unknown("column", key))?;
        let rk = other
            .column_index(key)
            .ok_or_else(|| StatError::unknown("column", key))?;

        let right_cols: Vec<usize> = (0..other.columns.len()).filter(|&i| i != rk).collect();

        let mut columns = self.columns.clone();
        let mut right_names = Vec::with_capacity(right_cols.len());
        for &i in &right_cols {
            let name = &other.columns[i];
            match columns.iter().position(|c| c == name) {
                Some(pos) if pos != lk => {
                    columns[pos] = format!("{name}_x");
                    right_names.push(format!("{name}_y"));
                }
                _ => right_names.push(name.clone()),
            }
        }
        columns.extend(right_names);

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, row) in other.rows.iter().enumerate() {
            if let Some(k) = row[rk].join_key() {
                index.entry(k).or_default().push(i);
            }
        }

        let mut matched = vec![false; other.rows.len()];
        let mut rows = Vec::with_capacity(self.rows.len().max(other.rows.len()));

        for left in &self.rows {
            let hits = left[lk].join_key().and_then(|k| index.get(&k));
            match hits {
                Some(hits) => {
                    for &h in hits {
                        matched[h] = true;
                        let mut row = left.clone();
                        row.extend(right_cols.iter().map(|&i| other.rows[h][i].clone()));
                        rows.push(row);
                    }
                }
                None => {
                    let mut row = left.clone();
                    row.extend(std::iter::repeat(Cell::Missing).take(right_cols.len()));
                    rows.push(row);
                }
            }
        }

        for (h, right) in other.rows.iter().enumerate() {
            if matched[h] {
                continue;
            }
            let mut row = vec![Cell::Missing; self.columns.len()];
            row[lk] = right[rk].clone();
            row.extend(right_cols.iter().map(|&i| right[i].clone()));
            rows.push(row);
        }

        rows.sort_by(|a, b| match (a[lk].join_key(), b[lk].join_key()) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        Ok(Table { columns, rows })
    }

    /// Converts every column whose non-missing cells all parse as numbers.
    ///
    /// Columns with at least one non-numeric cell are left untouched, so
    /// name and label columns survive. Returns the number of converted
    /// columns.
    pub fn coerce_numeric(&mut self) -> usize {
        let mut converted = 0;
        for idx in 0..self.columns.len() {
            let mut any = false;
            let all_numeric = self.rows.iter().all(|r| match &r[idx] {
                Cell::Missing => true,
                cell => {
                    any = true;
                    cell.as_f64().is_some()
                }
            });
            if any && all_numeric {
                for row in &mut self.rows {
                    row[idx] = row[idx].as_f64().into();
                }
                converted += 1;
            }
        }
        converted
    }

    /// Forces a column to numbers; unparseable cells become missing.
    ///
    /// Returns how many non-missing cells were lost.
    pub fn force_numeric(&mut self, name: &str) -> usize {
        let mut lost = 0;
        self.map_column(name, |cell| {
            let v = cell.as_f64();
            if v.is_none() && !cell.is_missing() {
                lost += 1;
            }
            v.into()
        });
        lost
    }

    /// Writes the table as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut w = csv::Writer::from_writer(writer);
        w.write_record(&self.columns)?;
        for row in &self.rows {
            w.write_record(row.iter().map(|c| c.to_string()))?;
        }
        w.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(columns.iter().copied());
        for r in rows {
            t.push_row(r.iter().map(|s| Cell::from_raw(s)).collect());
        }
        t
    }

    #[test]
    fn outer_join_keeps_unmatched_rows_from_both_sides() {
        let left = table(&["Provinsi", "2012"], &[&["ACEH", "1"], &["BALI", "2"]]);
        let right = table(&["Provinsi", "2015"], &[&["BALI", "3"], &["PAPUA", "4"]]);

        let joined = left.outer_join(&right, "Provinsi").unwrap();

        assert_eq!(joined.columns(), &["Provinsi", "2012", "2015"]);
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.cell(0, "Provinsi"), Some(&Cell::from("ACEH")));
        assert!(joined.cell(0, "2015").unwrap().is_missing());
        assert_eq!(joined.cell(1, "2015"), Some(&Cell::from("3")));
        assert_eq!(joined.cell(2, "Provinsi"), Some(&Cell::from("PAPUA")));
        assert!(joined.cell(2, "2012").unwrap().is_missing());
    }

    #[test]
    fn outer_join_suffixes_clashing_columns() {
        let left = table(&["Provinsi", "2023"], &[&["ACEH", "1"]]);
        let right = table(&["Provinsi", "2023"], &[&["ACEH", "0.3"]]);

        let joined = left.outer_join(&right, "Provinsi").unwrap();

        assert_eq!(joined.columns(), &["Provinsi", "2023_x", "2023_y"]);
    }

    #[test]
    fn outer_join_requires_key_on_both_sides() {
        let left = table(&["Provinsi"], &[]);
        let right = table(&["Negara"], &[]);
        assert!(matches!(
            left.outer_join(&right, "Provinsi"),
            Err(StatError::Unknown { kind: "column", .. })
        ));
    }

    #[test]
    fn outer_join_never_matches_missing_keys() {
        let left = table(&["Provinsi", "a"], &[&["", "1"]]);
        let right = table(&["Provinsi", "b"], &[&["", "2"]]);

        let joined = left.outer_join(&right, "Provinsi").unwrap();

        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn coerce_numeric_is_lenient_per_column() {
        let mut t = table(
            &["Provinsi", "value", "mixed"],
            &[&["ACEH", "1,5", "3"], &["BALI", "", "n/a"]],
        );

        assert_eq!(t.coerce_numeric(), 1);
        assert_eq!(t.cell(0, "value"), Some(&Cell::Number(1.5)));
        assert_eq!(t.cell(0, "mixed"), Some(&Cell::from("3")));
        assert_eq!(t.cell(0, "Provinsi"), Some(&Cell::from("ACEH")));
    }

    #[test]
    fn force_numeric_drops_unparseable_cells() {
        let mut t = table(&["v"], &[&["12"], &["-"], &[""]]);

        assert_eq!(t.force_numeric("v"), 1);
        assert_eq!(t.cell(0, "v"), Some(&Cell::Number(12.0)));
        assert!(t.cell(1, "v").unwrap().is_missing());
    }

    #[test]
    fn select_skips_absent_columns() {
        let t = table(&["a", "b", "c"], &[&["1", "2", "3"]]);
        let s = t.select(&["c", "zz", "a"]);
        assert_eq!(s.columns(), &["c", "a"]);
        assert_eq!(s.rows()[0], vec![Cell::from("3"), Cell::from("1")]);
    }

    #[test]
    fn write_csv_renders_missing_as_empty() {
        let mut t = Table::new(["Provinsi", "v"]);
        t.push_row(vec![Cell::from("ACEH"), Cell::Missing]);
        t.push_row(vec![Cell::from("BALI"), Cell::Number(2.5)]);

        let mut out = Vec::new();
        t.write_csv(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Provinsi,v\nACEH,\nBALI,2.5\n");
    }
}
