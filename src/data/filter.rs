use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::model::{Cell, Tabular};

// ---------------------------------------------------------------------------
// Column filter expressions, as typed into a table header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// A parsed filter expression.
///
/// `>2000`, `<= 1e6`, `=Smith`, `!=0` compare; anything else is a
/// case-insensitive substring match.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    Compare { op: CompareOp, operand: String },
    Contains(String),
}

impl ColumnFilter {
    /// Parse user text; blank text means "no filter".
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        // Two-character operators first.
        const OPS: [(&str, CompareOp); 6] = [
            (">=", CompareOp::Ge),
            ("<=", CompareOp::Le),
            ("!=", CompareOp::Ne),
            (">", CompareOp::Gt),
            ("<", CompareOp::Lt),
            ("=", CompareOp::Eq),
        ];
        for (prefix, op) in OPS {
            if let Some(rest) = text.strip_prefix(prefix) {
                return Some(ColumnFilter::Compare {
                    op,
                    operand: rest.trim().to_string(),
                });
            }
        }
        Some(ColumnFilter::Contains(text.to_lowercase()))
    }

    pub fn matches(&self, cell: &Cell) -> bool {
        match self {
            ColumnFilter::Contains(needle) => cell.search_text().to_lowercase().contains(needle),
            ColumnFilter::Compare { op, operand } => {
                let ordering = match (cell.as_f64(), operand.parse::<f64>()) {
                    (Some(value), Ok(rhs)) => value.partial_cmp(&rhs),
                    _ => Some(cell.to_string().as_str().cmp(operand.as_str())),
                };
                let Some(ordering) = ordering else {
                    return false;
                };
                match op {
                    CompareOp::Lt => ordering == Ordering::Less,
                    CompareOp::Le => ordering != Ordering::Greater,
                    CompareOp::Gt => ordering == Ordering::Greater,
                    CompareOp::Ge => ordering != Ordering::Less,
                    CompareOp::Eq => ordering == Ordering::Equal,
                    CompareOp::Ne => ordering != Ordering::Equal,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Filter / sort state of one table
// ---------------------------------------------------------------------------

/// Per-column filter text: column key → what the user typed.
pub type FilterState = BTreeMap<String, String>;

/// Return indices of rows that pass all non-blank column filters.
pub fn filtered_indices<T: Tabular>(rows: &[T], filters: &FilterState) -> Vec<usize> {
    let active: Vec<(&str, ColumnFilter)> = filters
        .iter()
        .filter_map(|(col, text)| ColumnFilter::parse(text).map(|f| (col.as_str(), f)))
        .collect();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| active.iter().all(|(col, f)| f.matches(&row.cell(col))))
        .map(|(i, _)| i)
        .collect()
}

/// Sort column and direction of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub column: String,
    pub ascending: bool,
}

impl SortState {
    /// Clicking a header sorts by it, clicking it again flips the direction.
    pub fn toggle(current: Option<&SortState>, column: &str) -> SortState {
        match current {
            Some(s) if s.column == column => SortState {
                column: column.to_string(),
                ascending: !s.ascending,
            },
            _ => SortState {
                column: column.to_string(),
                ascending: true,
            },
        }
    }
}

/// Reorder `indices` by one column (stable).
pub fn sort_indices<T: Tabular>(rows: &[T], indices: &mut [usize], sort: &SortState) {
    indices.sort_by(|&a, &b| {
        let ord = rows[a].cell(&sort.column).cmp(&rows[b].cell(&sort.column));
        if sort.ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::IndexEntry;

    fn entry(author: &str, year: &str, points: u32) -> IndexEntry {
        IndexEntry {
            filename: format!("n-Fe056-MT102-{author}-1.{year}"),
            author: author.to_string(),
            entry: "1".to_string(),
            year: year.to_string(),
            points,
            emin: 1.0,
            emax: 2.0e6,
        }
    }

    #[test]
    fn parses_operators_and_plain_text() {
        assert_eq!(
            ColumnFilter::parse(">2000"),
            Some(ColumnFilter::Compare {
                op: CompareOp::Gt,
                operand: "2000".into()
            })
        );
        assert_eq!(
            ColumnFilter::parse(" <= 1e6 "),
            Some(ColumnFilter::Compare {
                op: CompareOp::Le,
                operand: "1e6".into()
            })
        );
        assert_eq!(ColumnFilter::parse("Smi"), Some(ColumnFilter::Contains("smi".into())));
        assert_eq!(ColumnFilter::parse("   "), None);
    }

    #[test]
    fn numeric_and_text_comparisons() {
        let gt = ColumnFilter::parse(">2000").unwrap();
        assert!(gt.matches(&Cell::Text("2005".into())));
        assert!(!gt.matches(&Cell::Text("1999".into())));
        assert!(!gt.matches(&Cell::Null));

        let eq = ColumnFilter::parse("=Smith").unwrap();
        assert!(eq.matches(&Cell::Text("Smith".into())));
        assert!(!eq.matches(&Cell::Text("Smithson".into())));

        let ne = ColumnFilter::parse("!=0").unwrap();
        assert!(ne.matches(&Cell::Float(0.5)));
        assert!(!ne.matches(&Cell::Integer(0)));

        let small = ColumnFilter::parse("<0.1").unwrap();
        assert!(small.matches(&Cell::Float(0.0253)));
    }

    #[test]
    fn substring_filters_see_typed_numbers() {
        let half = ColumnFilter::parse("0.5").unwrap();
        assert!(half.matches(&Cell::Float(0.5)));
        assert!(half.matches(&Cell::Float(0.55)));
        assert!(!half.matches(&Cell::Float(0.25)));
        assert!(ColumnFilter::parse("13").unwrap().matches(&Cell::Integer(132)));
    }

    #[test]
    fn filters_and_sorts_rows() {
        let rows = vec![
            entry("Smith", "1975", 12),
            entry("Jones", "2005", 300),
            entry("Smithers", "2010", 40),
        ];
        let mut filters = FilterState::new();
        filters.insert("author".into(), "smith".into());
        filters.insert("year".into(), ">2000".into());
        filters.insert("entry".into(), "".into());
        assert_eq!(filtered_indices(&rows, &filters), vec![2]);

        let mut all: Vec<usize> = (0..rows.len()).collect();
        let sort = SortState::toggle(None, "points");
        sort_indices(&rows, &mut all, &sort);
        assert_eq!(all, vec![0, 2, 1]);

        let sort = SortState::toggle(Some(&sort), "points");
        assert!(!sort.ascending);
        sort_indices(&rows, &mut all, &sort);
        assert_eq!(all, vec![1, 2, 0]);
    }
}
