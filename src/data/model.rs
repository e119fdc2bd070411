use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Cell – a single value in a displayed table column
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell, used by the generic table filter and sort.
/// `Ord` is total so cells can be sorted and put into `BTreeSet`s.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        use Cell::*;
        fn discriminant(v: &Cell) -> u8 {
            match v {
                Null => 0,
                Integer(_) | Float(_) => 1,
                Text(_) => 2,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Text(a), Text(b)) => a.cmp(b),
            // Numbers compare by value regardless of integer/float storage.
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v:.4e}"),
            Cell::Null => write!(f, ""),
        }
    }
}

impl Cell {
    /// Numeric view of the cell, used by comparison filters.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Null => None,
        }
    }

    /// Text searched by substring filters: numbers as typed, not rounded.
    pub fn search_text(&self) -> String {
        match self {
            Cell::Float(v) => v.to_string(),
            other => other.to_string(),
        }
    }

    fn from_opt(v: Option<f64>) -> Self {
        v.map(Cell::Float).unwrap_or(Cell::Null)
    }
}

/// Rows that can be shown in a filterable, sortable table.
pub trait Tabular {
    /// Column keys in display order.
    const COLUMNS: &'static [&'static str];

    /// Value of `column` for this row; unknown columns are `Null`.
    fn cell(&self, column: &str) -> Cell;
}

// ---------------------------------------------------------------------------
// Dataset index rows (`.list` files)
// ---------------------------------------------------------------------------

/// One experimental dataset listed in a cross-section or residual index file.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub filename: String,
    pub author: String,
    pub entry: String,
    pub year: String,
    pub points: u32,
    /// Lowest incident energy in eV.
    pub emin: f64,
    /// Highest incident energy in eV.
    pub emax: f64,
}

impl Tabular for IndexEntry {
    const COLUMNS: &'static [&'static str] = &["author", "year", "entry", "points", "emin", "emax"];

    fn cell(&self, column: &str) -> Cell {
        match column {
            "author" => Cell::Text(self.author.clone()),
            "year" => Cell::Text(self.year.clone()),
            "entry" => Cell::Text(self.entry.clone()),
            "points" => Cell::Integer(self.points as i64),
            "emin" => Cell::Float(self.emin),
            "emax" => Cell::Float(self.emax),
            _ => Cell::Null,
        }
    }
}

/// One experimental fission-yield dataset listed in a FY index file.
#[derive(Debug, Clone, PartialEq)]
pub struct FyIndexEntry {
    pub filename: String,
    pub author: String,
    pub entry: String,
    pub year: String,
    pub points: u32,
    /// Incident energy in eV.
    pub einc: f64,
    /// Incident energy spread in eV.
    pub de: f64,
}

impl Tabular for FyIndexEntry {
    const COLUMNS: &'static [&'static str] = &["author", "year", "entry", "points", "einc"];

    fn cell(&self, column: &str) -> Cell {
        match column {
            "author" => Cell::Text(self.author.clone()),
            "year" => Cell::Text(self.year.clone()),
            "entry" => Cell::Text(self.entry.clone()),
            "points" => Cell::Integer(self.points as i64),
            "einc" => Cell::Float(self.einc),
            _ => Cell::Null,
        }
    }
}

// ---------------------------------------------------------------------------
// Data points
// ---------------------------------------------------------------------------

/// A measured cross section point (EXFOR), energies in eV and values in barn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExforPoint {
    pub author: String,
    pub year: String,
    pub entry: String,
    #[serde(rename = "Energy")]
    pub energy: f64,
    #[serde(rename = "dE")]
    pub de: Option<f64>,
    #[serde(rename = "XS")]
    pub xs: f64,
    #[serde(rename = "dXS")]
    pub dxs: Option<f64>,
}

impl Tabular for ExforPoint {
    const COLUMNS: &'static [&'static str] = &["author", "year", "entry", "Energy", "dE", "XS", "dXS"];

    fn cell(&self, column: &str) -> Cell {
        match column {
            "author" => Cell::Text(self.author.clone()),
            "year" => Cell::Text(self.year.clone()),
            "entry" => Cell::Text(self.entry.clone()),
            "Energy" => Cell::Float(self.energy),
            "dE" => Cell::from_opt(self.de),
            "XS" => Cell::Float(self.xs),
            "dXS" => Cell::from_opt(self.dxs),
            _ => Cell::Null,
        }
    }
}

/// A point of an evaluated-library cross section table.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryPoint {
    pub lib: String,
    pub energy: f64,
    pub xs: f64,
}

/// A library cross section point with its uncertainty band, as used when
/// several reactions and libraries are compared on one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryBandPoint {
    pub lib: String,
    pub mt: String,
    pub isomeric: String,
    pub energy: f64,
    pub xs: f64,
    pub xs_low: Option<f64>,
    pub xs_upp: Option<f64>,
}

/// A measured fission product yield (EXFOR).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FissionYieldPoint {
    pub author: String,
    pub year: String,
    pub entry: String,
    #[serde(rename = "Einc")]
    pub einc: f64,
    #[serde(rename = "dEinc")]
    pub deinc: f64,
    #[serde(rename = "Z")]
    pub z: u32,
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "Iso")]
    pub iso: u32,
    #[serde(rename = "FPY")]
    pub fpy: f64,
    #[serde(rename = "dFPY")]
    pub dfpy: Option<f64>,
}

impl Tabular for FissionYieldPoint {
    const COLUMNS: &'static [&'static str] = &[
        "author", "year", "entry", "Einc", "dEinc", "Z", "A", "Iso", "FPY", "dFPY",
    ];

    fn cell(&self, column: &str) -> Cell {
        match column {
            "author" => Cell::Text(self.author.clone()),
            "year" => Cell::Text(self.year.clone()),
            "entry" => Cell::Text(self.entry.clone()),
            "Einc" => Cell::Float(self.einc),
            "dEinc" => Cell::Float(self.deinc),
            "Z" => Cell::Integer(self.z as i64),
            "A" => Cell::Integer(self.a as i64),
            "Iso" => Cell::Integer(self.iso as i64),
            "FPY" => Cell::Float(self.fpy),
            "dFPY" => Cell::from_opt(self.dfpy),
            _ => Cell::Null,
        }
    }
}

/// A fission product yield from an evaluated library.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryYieldPoint {
    pub lib: String,
    /// Incident energy in eV.
    pub einc: f64,
    pub z: u32,
    pub a: u32,
    pub m: u32,
    pub fpy: f64,
    pub dfpy: Option<f64>,
}

// ---------------------------------------------------------------------------
// Lookup – result of one file-discovery + parse pass
// ---------------------------------------------------------------------------

/// Parsed records together with the files they were read from.
#[derive(Debug, Clone)]
pub struct Lookup<T> {
    pub files: Vec<PathBuf>,
    pub rows: Vec<T>,
}

impl<T> Default for Lookup<T> {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl<T> Lookup<T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Unique values of `key` in first-seen order, like `Series.unique()`.
pub fn unique_in_order<T, K, F>(rows: &[T], key: F) -> Vec<K>
where
    K: PartialEq + Clone,
    F: Fn(&T) -> &K,
{
    let mut out: Vec<K> = Vec::new();
    for row in rows {
        let k = key(row);
        if !out.contains(k) {
            out.push(k.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_sort_numbers_before_text_and_compare_by_value() {
        let mut cells = vec![
            Cell::Text("b".into()),
            Cell::Float(2.5),
            Cell::Null,
            Cell::Integer(3),
            Cell::Integer(1),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                Cell::Null,
                Cell::Integer(1),
                Cell::Float(2.5),
                Cell::Integer(3),
                Cell::Text("b".into()),
            ]
        );
    }

    #[test]
    fn search_text_keeps_full_precision() {
        assert_eq!(Cell::Float(0.5).to_string(), "5.0000e-1");
        assert_eq!(Cell::Float(0.5).search_text(), "0.5");
        assert_eq!(Cell::Integer(132).search_text(), "132");
        assert_eq!(Cell::Null.search_text(), "");
    }

    #[test]
    fn unique_in_order_keeps_first_occurrence() {
        let rows = vec![("b", 1), ("a", 2), ("b", 3)];
        let keys = unique_in_order(&rows, |r| &r.0);
        assert_eq!(keys, vec!["b", "a"]);
    }
}
