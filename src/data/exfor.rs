use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::error::DataError;
use super::index::{data_lines, MEV_TO_EV};
use super::layout::{compile_pattern, fy_dataset_pattern, is_index_file, list_dir, DatasetName};
use super::model::{ExforPoint, FissionYieldPoint, Lookup};

/// Cross sections in EXFOR tables are in millibarn.
pub const MB_TO_B: f64 = 1.0e-3;

/// Z column value of broken rows in some yield tables.
const BROKEN_Z: &str = "0****";

fn read_text(path: &Path) -> Result<String, DataError> {
    std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))
}

fn parse_f64(field: &str, path: &Path, line: usize, column: &str) -> Result<f64, DataError> {
    field
        .parse()
        .map_err(|_| DataError::malformed(path, line, format!("{column} '{field}' is not a number")))
}

// ---------------------------------------------------------------------------
// Cross sections (reaction and residual production)
// ---------------------------------------------------------------------------

/// Read the datasets of `dir` whose EXFOR entry is in `entries`.
///
/// Columns: Energy XS dXS dE in MeV / mb, converted to eV / barn. Missing
/// uncertainty columns are left empty. A dataset that fails to parse is
/// skipped with a warning.
pub fn read_cross_sections(dir: &Path, entries: &BTreeSet<String>) -> Result<Lookup<ExforPoint>, DataError> {
    let mut lookup = Lookup::default();
    if entries.is_empty() {
        return Ok(lookup);
    }

    for filename in list_dir(dir)? {
        if is_index_file(&filename) {
            continue;
        }
        let Some(name) = DatasetName::parse(&filename) else {
            log::warn!("{}: unexpected file name {filename}", dir.display());
            continue;
        };
        if !entries.contains(&name.entry) {
            continue;
        }
        let path = dir.join(&filename);
        match parse_cross_section_file(&path, &name) {
            Ok(rows) => {
                lookup.rows.extend(rows);
                lookup.files.push(path);
            }
            Err(e) => log::warn!("skipping dataset: {e}"),
        }
    }

    log::info!(
        "{}: {} point(s) from {} dataset(s)",
        dir.display(),
        lookup.rows.len(),
        lookup.files.len()
    );
    Ok(lookup)
}

fn parse_cross_section_file(path: &Path, name: &DatasetName) -> Result<Vec<ExforPoint>, DataError> {
    let text = read_text(path)?;
    let mut rows = Vec::new();
    for (line, fields) in data_lines(&text) {
        if fields.len() < 2 {
            return Err(DataError::malformed(path, line, "expected at least Energy and XS"));
        }
        let energy = parse_f64(fields[0], path, line, "Energy")?;
        let xs = parse_f64(fields[1], path, line, "XS")?;
        let dxs = fields.get(2).and_then(|f| f.parse::<f64>().ok());
        let de = fields.get(3).and_then(|f| f.parse::<f64>().ok());
        rows.push(ExforPoint {
            author: name.author.clone(),
            year: name.year.clone(),
            entry: name.entry.clone(),
            energy: energy * MEV_TO_EV,
            de: de.map(|v| v * MEV_TO_EV),
            xs: xs * MB_TO_B,
            dxs: dxs.map(|v| v * MB_TO_B),
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Fission yields
// ---------------------------------------------------------------------------

/// One selected FY dataset: EXFOR entry and incident energy in eV.
#[derive(Debug, Clone, PartialEq)]
pub struct FySelection {
    pub entry: String,
    pub einc: f64,
}

/// Find and read the FY datasets of `dir` matching each selection.
pub fn read_fission_yields(
    dir: &Path,
    mt: &str,
    selections: &[FySelection],
) -> Result<Lookup<FissionYieldPoint>, DataError> {
    let mut lookup = Lookup::default();
    if selections.is_empty() {
        return Ok(lookup);
    }

    let names = list_dir(dir)?;
    let mut matched: Vec<String> = Vec::new();
    for sel in selections {
        let matcher = compile_pattern(&fy_dataset_pattern(mt, &sel.entry, sel.einc))?;
        for name in names.iter().filter(|n| !is_index_file(n)) {
            if matcher.is_match(name) && !matched.contains(name) {
                matched.push(name.clone());
            }
        }
    }

    for filename in matched {
        let path: PathBuf = dir.join(&filename);
        let Some(name) = DatasetName::parse_fission_yield(&filename) else {
            log::warn!("{}: unexpected file name {filename}", dir.display());
            continue;
        };
        match parse_fission_yield_file(&path, &name) {
            Ok(rows) => {
                lookup.rows.extend(rows);
                lookup.files.push(path);
            }
            Err(e) => log::warn!("skipping dataset: {e}"),
        }
    }

    log::info!(
        "{}: {} yield(s) from {} dataset(s)",
        dir.display(),
        lookup.rows.len(),
        lookup.files.len()
    );
    Ok(lookup)
}

/// Incident energy and its spread (MeV) from a `# E-inc` header line.
///
/// The values are the 4th and 7th whitespace separated tokens, e.g.
/// `# E-inc (MeV)= 1.40000E+01 dE-inc (MeV)= 1.00000E-01`.
fn parse_einc_header(line: &str) -> Option<(f64, f64)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let einc = tokens.get(3)?.parse().ok()?;
    let deinc = tokens.get(6)?.parse().ok()?;
    Some((einc, deinc))
}

fn parse_fission_yield_file(path: &Path, name: &DatasetName) -> Result<Vec<FissionYieldPoint>, DataError> {
    let text = read_text(path)?;

    let (einc, deinc) = text
        .lines()
        .filter(|l| l.contains("# E-inc"))
        .filter_map(parse_einc_header)
        .last()
        .ok_or_else(|| DataError::malformed(path, 0, "missing '# E-inc' header"))?;

    let mut rows = Vec::new();
    for (line, fields) in data_lines(&text) {
        if fields[0] == BROKEN_Z {
            continue;
        }
        if fields.len() < 4 {
            return Err(DataError::malformed(path, line, "expected Z A Iso FPY [dFPY]"));
        }
        let int = |i: usize, column: &str| -> Result<u32, DataError> {
            fields[i].parse().map_err(|_| {
                DataError::malformed(path, line, format!("{column} '{}' is not an integer", fields[i]))
            })
        };
        rows.push(FissionYieldPoint {
            author: name.author.clone(),
            year: name.year.clone(),
            entry: name.entry.clone(),
            einc: einc * MEV_TO_EV,
            deinc: deinc * MEV_TO_EV,
            z: int(0, "Z")?,
            a: int(1, "A")?,
            iso: int(2, "Iso")?,
            fpy: parse_f64(fields[3], path, line, "FPY")?,
            dfpy: fields.get(4).and_then(|f| f.parse::<f64>().ok()),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entries(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reads_selected_cross_section_datasets_only() {
        let dir = TempDir::new().expect("tempdir should be created");
        fs::write(dir.path().join("n-Au197-MT102.list"), "ignored").unwrap();
        fs::write(
            dir.path().join("n-Au197-MT102-Smith-12345002.1975"),
            "# E(MeV) XS(mb) dXS dE\n1.0E-02 500.0 25.0 1.0E-04\n2.0E-02 400.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("n-Au197-MT102-Jones-54321002.1980"),
            "1.0 100.0 1.0 0.01\n",
        )
        .unwrap();

        let lookup = read_cross_sections(dir.path(), &entries(&["12345002"])).unwrap();
        assert_eq!(lookup.files.len(), 1);
        assert_eq!(lookup.rows.len(), 2);

        let first = &lookup.rows[0];
        assert_eq!(first.author, "Smith");
        assert_eq!(first.year, "1975");
        assert!((first.energy - 1.0e4).abs() < 1e-6);
        assert!((first.xs - 0.5).abs() < 1e-12);
        assert!((first.dxs.unwrap() - 0.025).abs() < 1e-12);
        assert!((first.de.unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(lookup.rows[1].dxs, None);
        assert_eq!(lookup.rows[1].de, None);
    }

    #[test]
    fn malformed_dataset_is_skipped() {
        let dir = TempDir::new().expect("tempdir should be created");
        fs::write(dir.path().join("n-Fe056-MT016-Bad-11111002.1999"), "abc def\n").unwrap();
        fs::write(dir.path().join("n-Fe056-MT016-Good-22222002.2001"), "14.0 500.0\n").unwrap();

        let lookup =
            read_cross_sections(dir.path(), &entries(&["11111002", "22222002"])).unwrap();
        assert_eq!(lookup.files.len(), 1);
        assert_eq!(lookup.rows[0].author, "Good");
    }

    #[test]
    fn no_selection_or_missing_directory_is_empty() {
        let dir = TempDir::new().expect("tempdir should be created");
        assert!(read_cross_sections(dir.path(), &BTreeSet::new()).unwrap().is_empty());
        let missing = dir.path().join("nope");
        assert!(read_cross_sections(&missing, &entries(&["1"])).unwrap().is_empty());
    }

    #[test]
    fn reads_fission_yields_by_entry_and_energy() {
        let dir = TempDir::new().expect("tempdir should be created");
        fs::write(
            dir.path().join("n-Pu239-MT454-Wahl-12345002-E2.53E-08.1988"),
            "# Pu239 independent yields\n\
             # E-inc (MeV)= 2.53000E-08 dE-inc (MeV)= 0.00000E+00\n\
             #  Z   A  Iso   FPY        dFPY\n\
             54 132 0 1.5E-02 1.0E-03\n\
             0**** 0 0 0.0 0.0\n\
             55 132 0 2.0E-03\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("n-Pu239-MT454-Wahl-12345002-E0014.000.1990"),
            "# E-inc (MeV)= 1.40000E+01 dE-inc (MeV)= 1.00000E-01\n54 132 0 1.0E-02 1.0E-03\n",
        )
        .unwrap();

        let selections = vec![FySelection {
            entry: "12345002".into(),
            einc: 0.0253,
        }];
        let lookup = read_fission_yields(dir.path(), "454", &selections).unwrap();
        assert_eq!(lookup.files.len(), 1);
        assert_eq!(lookup.rows.len(), 2);
        let row = &lookup.rows[0];
        assert_eq!((row.z, row.a, row.iso), (54, 132, 0));
        assert_eq!(row.year, "1988");
        assert!((row.einc - 0.0253).abs() < 1e-9);
        assert_eq!(lookup.rows[1].dfpy, None);

        let fast = vec![FySelection {
            entry: "12345002".into(),
            einc: 1.4e7,
        }];
        let lookup = read_fission_yields(dir.path(), "454", &fast).unwrap();
        assert_eq!(lookup.rows.len(), 1);
        assert!((lookup.rows[0].deinc - 1.0e5).abs() < 1e-6);
    }

    #[test]
    fn einc_header_tokens() {
        assert_eq!(
            parse_einc_header("# E-inc (MeV)= 1.4E+01 dE-inc (MeV)= 1.0E-01"),
            Some((14.0, 0.1))
        );
        assert_eq!(parse_einc_header("# E-inc"), None);
    }
}
