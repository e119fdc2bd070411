use std::collections::BTreeMap;
use std::path::Path;

use super::error::DataError;
use super::exfor::MB_TO_B;
use super::index::{data_lines, MEV_TO_EV};
use super::model::{LibraryBandPoint, LibraryPoint, LibraryYieldPoint};
use super::reaction::EnergyBand;

// ---------------------------------------------------------------------------
// Library lists per page
// ---------------------------------------------------------------------------

/// Libraries searched on the cross section page, in plotting order.
pub const LIB_LIST_XS: [&str; 7] = [
    "endfb8.0",
    "jendl5.0",
    "jeff3.3",
    "iaea.pd",
    "irdff2.0",
    "cendl3.2",
    "tendl.2021",
];

/// Libraries offered on the library comparison page (reverse sorted).
pub const LIB_LIST_COMPARE: [&str; 8] = [
    "tendl.2021",
    "jendl5.0",
    "jeff3.3",
    "irdff2.0",
    "iaea.pd",
    "iaea.2019",
    "endfb8.0",
    "cendl3.2",
];

/// Libraries searched on the residual production page.
pub const LIB_LIST_RESIDUAL: [&str; 6] = [
    "tendl.2021",
    "iaea.2019",
    "iaea.pd",
    "endfb8.0",
    "jendl5.0",
    "irdff2.0",
];

/// Libraries carrying fission product yields.
pub const LIB_LIST_FY: [&str; 3] = ["endfb8.0", "jeff3.3", "jendl5.0"];

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Read a library table; `None` when the file does not exist.
fn read_optional(path: &Path) -> Result<Option<String>, DataError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DataError::io(path, e)),
    }
}

fn column(fields: &[&str], i: usize, path: &Path, line: usize) -> Result<f64, DataError> {
    let raw = fields
        .get(i)
        .ok_or_else(|| DataError::malformed(path, line, format!("missing column {}", i + 1)))?;
    raw.parse()
        .map_err(|_| DataError::malformed(path, line, format!("'{raw}' is not a number")))
}

/// Read an `Energy XS` table (MeV, mb) into eV and barn.
///
/// Returns `None` for a missing file and `Some(empty)` when every cross
/// section is zero (reactions a library tabulates as null).
pub fn read_cross_section_table(path: &Path, lib: &str) -> Result<Option<Vec<LibraryPoint>>, DataError> {
    let Some(text) = read_optional(path)? else {
        return Ok(None);
    };
    let mut points = Vec::new();
    for (line, fields) in data_lines(&text) {
        points.push(LibraryPoint {
            lib: lib.to_string(),
            energy: column(&fields, 0, path, line)? * MEV_TO_EV,
            xs: column(&fields, 1, path, line)? * MB_TO_B,
        });
    }
    if points.iter().all(|p| p.xs == 0.0) {
        log::debug!("{}: all cross sections are zero", path.display());
        points.clear();
    }
    Ok(Some(points))
}

/// Read an `Energy XS xslow xsupp` table with its uncertainty band.
///
/// Uncertainty columns that are all zero (or absent) are dropped.
pub fn read_band_table(
    path: &Path,
    lib: &str,
    mt: &str,
    isomeric: &str,
) -> Result<Option<Vec<LibraryBandPoint>>, DataError> {
    let Some(text) = read_optional(path)? else {
        return Ok(None);
    };
    let mut points = Vec::new();
    for (line, fields) in data_lines(&text) {
        let optional = |i: usize| fields.get(i).and_then(|f| f.parse::<f64>().ok());
        points.push(LibraryBandPoint {
            lib: lib.to_string(),
            mt: mt.to_string(),
            isomeric: isomeric.to_string(),
            energy: column(&fields, 0, path, line)? * MEV_TO_EV,
            xs: column(&fields, 1, path, line)? * MB_TO_B,
            xs_low: optional(2).map(|v| v * MB_TO_B),
            xs_upp: optional(3).map(|v| v * MB_TO_B),
        });
    }

    if points.iter().all(|p| p.xs == 0.0) {
        points.clear();
    }
    if points.iter().all(|p| p.xs_low.unwrap_or(0.0) == 0.0) {
        points.iter_mut().for_each(|p| p.xs_low = None);
    }
    if points.iter().all(|p| p.xs_upp.unwrap_or(0.0) == 0.0) {
        points.iter_mut().for_each(|p| p.xs_upp = None);
    }
    Ok(Some(points))
}

/// Read an `Einc Z A M FPY dFPY` yield table, keeping the first incident
/// energy that falls inside `band`.
pub fn read_yield_table(
    path: &Path,
    lib: &str,
    band: EnergyBand,
) -> Result<Option<Vec<LibraryYieldPoint>>, DataError> {
    let Some(text) = read_optional(path)? else {
        return Ok(None);
    };
    let mut chosen: Option<f64> = None;
    let mut points = Vec::new();
    for (line, fields) in data_lines(&text) {
        let einc = column(&fields, 0, path, line)? * MEV_TO_EV;
        if !band.contains(einc) {
            continue;
        }
        match chosen {
            None => chosen = Some(einc),
            Some(e) if e != einc => continue,
            Some(_) => {}
        }
        let int = |i: usize| -> Result<u32, DataError> {
            column(&fields, i, path, line).map(|v| v as u32)
        };
        points.push(LibraryYieldPoint {
            lib: lib.to_string(),
            einc,
            z: int(1)?,
            a: int(2)?,
            m: int(3)?,
            fpy: column(&fields, 4, path, line)?,
            dfpy: fields.get(5).and_then(|f| f.parse::<f64>().ok()),
        });
    }
    Ok(Some(points))
}

/// Mass chain yields Y(A): independent yields summed over Z and isomer.
///
/// Result is ordered by library (first-seen) then mass number. Z is reported
/// as 0 and uncertainties are combined in quadrature.
pub fn mass_chain_yields(points: &[LibraryYieldPoint]) -> Vec<LibraryYieldPoint> {
    let mut libs: Vec<&str> = Vec::new();
    let mut sums: BTreeMap<(usize, u32), (f64, f64, f64, bool)> = BTreeMap::new();
    for p in points {
        let lib_idx = match libs.iter().position(|l| *l == p.lib) {
            Some(i) => i,
            None => {
                libs.push(&p.lib);
                libs.len() - 1
            }
        };
        let acc = sums.entry((lib_idx, p.a)).or_insert((p.einc, 0.0, 0.0, false));
        acc.1 += p.fpy;
        if let Some(d) = p.dfpy {
            acc.2 += d * d;
            acc.3 = true;
        }
    }
    sums.into_iter()
        .map(|((lib_idx, a), (einc, fpy, var, has_unc))| LibraryYieldPoint {
            lib: libs[lib_idx].to_string(),
            einc,
            z: 0,
            a,
            m: 0,
            fpy,
            dfpy: has_unc.then(|| var.sqrt()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn cross_section_table_converts_units() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = dir.path().join("n-Au197-MT102.endfb8.0.dat");
        fs::write(&path, "# header\n1.0E-08 98650.0\n1.0 100.0\n").unwrap();

        let points = read_cross_section_table(&path, "endfb8.0").unwrap().unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[0].energy - 0.01).abs() < 1e-12);
        assert!((points[0].xs - 98.65).abs() < 1e-9);
        assert_eq!(points[1].lib, "endfb8.0");
    }

    #[test]
    fn zero_tables_are_emptied_and_missing_tables_are_none() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = dir.path().join("g-S033-MT107.tendl.2021.dat");
        fs::write(&path, "1.0 0.0\n2.0 0.0\n").unwrap();
        assert_eq!(read_cross_section_table(&path, "tendl.2021").unwrap(), Some(vec![]));
        assert_eq!(
            read_cross_section_table(&dir.path().join("missing.dat"), "tendl.2021").unwrap(),
            None
        );
    }

    #[test]
    fn band_table_drops_all_zero_uncertainties() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = dir.path().join("t.dat");
        fs::write(&path, "10.0 100.0 0.0 120.0\n12.0 150.0 0.0 170.0\n").unwrap();
        let points = read_band_table(&path, "iaea.pd", "016", "").unwrap().unwrap();
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.xs_low.is_none()));
        assert!((points[1].xs_upp.unwrap() - 0.17).abs() < 1e-12);
        assert_eq!(points[0].mt, "016");
    }

    #[test]
    fn yield_table_keeps_first_energy_in_band() {
        let dir = TempDir::new().expect("tempdir should be created");
        let path = dir.path().join("n-Pu239-MT454.jeff3.3.dat");
        fs::write(
            &path,
            "# Einc Z A M FPY dFPY\n\
             2.53E-08 54 132 0 1.0E-02 1.0E-04\n\
             2.53E-08 55 132 0 2.0E-03 1.0E-04\n\
             2.53E-08 54 133 1 3.0E-03\n\
             5.0E-01 54 132 0 9.0E-03 1.0E-04\n\
             1.4E+01 54 132 0 8.0E-03 1.0E-04\n",
        )
        .unwrap();

        let thermal = read_yield_table(&path, "jeff3.3", EnergyBand::Ev).unwrap().unwrap();
        assert_eq!(thermal.len(), 3);
        assert_eq!(thermal[2].m, 1);
        assert_eq!(thermal[2].dfpy, None);

        let fast = read_yield_table(&path, "jeff3.3", EnergyBand::Mev).unwrap().unwrap();
        assert_eq!(fast.len(), 1);
        assert!((fast[0].fpy - 8.0e-3).abs() < 1e-12);

        let chains = mass_chain_yields(&thermal);
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].a, 132);
        assert!((chains[0].fpy - 1.2e-2).abs() < 1e-12);
        assert!((chains[0].dfpy.unwrap() - (2.0e-8f64).sqrt()).abs() < 1e-12);
        assert_eq!(chains[1].a, 133);
        assert_eq!(chains[1].dfpy, None);
    }
}
