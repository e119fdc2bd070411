use std::path::Path;

use super::error::DataError;
use super::layout::DatasetName;
use super::model::{FyIndexEntry, IndexEntry};
use super::reaction::{strip_comment, EnergyBand};

/// At most this many datasets are selected when an index is first shown.
pub const MAX_DEFAULT_DATASETS: usize = 10;
/// Datasets with more points than this are not selected by default.
pub const MAX_DEFAULT_POINTS: u32 = 200;

/// Energies in `.list` and data files are in MeV.
pub const MEV_TO_EV: f64 = 1.0e6;

/// Read an index file; `None` when it does not exist.
fn read_optional(path: &Path) -> Result<Option<String>, DataError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DataError::io(path, e)),
    }
}

/// Whitespace separated columns of every data line, with line numbers.
pub(crate) fn data_lines(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(i, raw)| {
        let fields: Vec<&str> = strip_comment(raw).split_whitespace().collect();
        if fields.is_empty() {
            None
        } else {
            Some((i + 1, fields))
        }
    })
}

struct RawRow<'a> {
    filename: &'a str,
    points: u32,
    first: f64,
    second: f64,
}

fn parse_row<'a>(fields: &[&'a str]) -> Option<RawRow<'a>> {
    if fields.len() < 4 {
        return None;
    }
    Some(RawRow {
        filename: fields[0],
        points: fields[1].parse().ok()?,
        first: fields[2].parse().ok()?,
        second: fields[3].parse().ok()?,
    })
}

// ---------------------------------------------------------------------------
// Cross section / residual production index
// ---------------------------------------------------------------------------

/// Read a `filename points emin emax` index, newest datasets first.
///
/// A missing file is an empty index; malformed rows are skipped.
pub fn read_index(path: &Path) -> Result<Vec<IndexEntry>, DataError> {
    let Some(text) = read_optional(path)? else {
        log::debug!("no index at {}", path.display());
        return Ok(Vec::new());
    };

    let mut entries = Vec::new();
    for (line_no, fields) in data_lines(&text) {
        let parsed = parse_row(&fields)
            .and_then(|row| DatasetName::parse(row.filename).map(|name| (row, name)));
        let Some((row, name)) = parsed else {
            log::warn!("{}:{line_no}: skipping malformed index row", path.display());
            continue;
        };
        entries.push(IndexEntry {
            filename: row.filename.to_string(),
            author: name.author,
            entry: name.entry,
            year: name.year,
            points: row.points,
            emin: row.first * MEV_TO_EV,
            emax: row.second * MEV_TO_EV,
        });
    }

    // Stable, so datasets of the same year keep file order.
    entries.sort_by(|a, b| b.year.cmp(&a.year));
    log::info!("{}: {} dataset(s)", path.display(), entries.len());
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Fission yield index
// ---------------------------------------------------------------------------

/// Read a `filename points einc de` FY index restricted to `band`, ordered by
/// incident energy.
pub fn read_fy_index(path: &Path, band: EnergyBand) -> Result<Vec<FyIndexEntry>, DataError> {
    let Some(text) = read_optional(path)? else {
        log::debug!("no FY index at {}", path.display());
        return Ok(Vec::new());
    };

    let mut entries = Vec::new();
    for (line_no, fields) in data_lines(&text) {
        let parsed = parse_row(&fields)
            .and_then(|row| DatasetName::parse_fission_yield(row.filename).map(|name| (row, name)));
        let Some((row, name)) = parsed else {
            log::warn!("{}:{line_no}: skipping malformed FY index row", path.display());
            continue;
        };
        let einc = row.first * MEV_TO_EV;
        if !band.contains(einc) {
            continue;
        }
        entries.push(FyIndexEntry {
            filename: row.filename.to_string(),
            author: name.author,
            entry: name.entry,
            year: name.year,
            points: row.points,
            einc,
            de: row.second * MEV_TO_EV,
        });
    }

    entries.sort_by(|a, b| a.einc.total_cmp(&b.einc).then_with(|| a.year.cmp(&b.year)));
    log::info!("{}: {} FY dataset(s) in {band}", path.display(), entries.len());
    Ok(entries)
}

/// Rows selected when an index is first shown: the first
/// [`MAX_DEFAULT_DATASETS`] datasets with at most [`MAX_DEFAULT_POINTS`]
/// points.
pub fn default_selection<I>(points: I) -> Vec<usize>
where
    I: IntoIterator<Item = u32>,
{
    points
        .into_iter()
        .enumerate()
        .filter(|(_, p)| *p <= MAX_DEFAULT_POINTS)
        .map(|(i, _)| i)
        .take(MAX_DEFAULT_DATASETS)
        .collect()
}
