//! Directory and filename conventions of the LIBRARIES data tree.
//!
//! ```text
//!  <root>/libraries/{inc}/{nuc}/{lib}/tables/xs/{inc}-{nuc}-MT{mt}{iso}[-G1102].{lib}.dat
//!  <root>/libraries/{inc}/{nuc}/{lib}/tables/residual/{inc}-{nuc}-rp{ZZZAAA}.{lib}.dat
//!  <root>/libraries/{inc}/{nuc}/exfor/xs/{mt}/{inc}-{nuc}-MT{mt}-{author}-{entry}.{year}
//!  <root>/libraries/{inc}/{nuc}/exfor/residual/{ZZZAAA}/{inc}-{nuc}-rp{ZZZAAA}-{author}-{entry}.{year}
//!  <root>/libraries/FY/{inc}/{nuc}/{lib}/tables/{inc}-{nuc}-MT{mt}.{lib}.dat
//!  <root>/libraries/FY/{inc}/{nuc}/exfor/{mt}/{inc}-{nuc}-MT{mt}-{author}-{entry}-E{energy}.{year}
//! ```

use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};

use super::error::DataError;

/// Library that provides the residual product listing.
pub const RESIDUAL_LISTING_LIBRARY: &str = "tendl.2021";

/// Suffix of 1102-group neutron tables.
pub const GROUPWISE_SUFFIX: &str = "-G1102";

/// Which EXFOR table family a dataset file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExforKind {
    CrossSection,
    Residual,
    FissionYield,
}

/// Root folders of one data installation.
#[derive(Debug, Clone)]
pub struct DataLayout {
    pub data_root: PathBuf,
    pub lib_root: PathBuf,
    pub exp_root: PathBuf,
    pub fy_root: PathBuf,
}

impl DataLayout {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        let data_root = data_root.into();
        let lib_root = data_root.join("libraries");
        Self {
            exp_root: lib_root.clone(),
            fy_root: lib_root.join("FY"),
            lib_root,
            data_root,
        }
    }

    // -- evaluated libraries --

    pub fn library_xs_file(
        &self,
        inc: &str,
        nuclide: &str,
        lib: &str,
        mt: &str,
        isomer: &str,
        groupwise: bool,
    ) -> PathBuf {
        let suffix = if groupwise { GROUPWISE_SUFFIX } else { "" };
        self.lib_root
            .join(inc)
            .join(nuclide)
            .join(lib)
            .join("tables")
            .join("xs")
            .join(format!("{inc}-{nuclide}-MT{mt}{isomer}{suffix}.{lib}.dat"))
    }

    pub fn library_residual_dir(&self, inc: &str, nuclide: &str, lib: &str) -> PathBuf {
        self.lib_root
            .join(inc)
            .join(nuclide)
            .join(lib)
            .join("tables")
            .join("residual")
    }

    pub fn library_residual_file(&self, inc: &str, nuclide: &str, lib: &str, rp_code: &str) -> PathBuf {
        self.library_residual_dir(inc, nuclide, lib)
            .join(format!("{inc}-{nuclide}-rp{rp_code}.{lib}.dat"))
    }

    /// Directory whose file names enumerate the known residual products.
    pub fn residual_listing_dir(&self, inc: &str, nuclide: &str) -> PathBuf {
        self.library_residual_dir(inc, nuclide, RESIDUAL_LISTING_LIBRARY)
    }

    pub fn library_fy_file(&self, inc: &str, nuclide: &str, lib: &str, mt: &str) -> PathBuf {
        self.fy_root
            .join(inc)
            .join(nuclide)
            .join(lib)
            .join("tables")
            .join(format!("{inc}-{nuclide}-MT{mt}.{lib}.dat"))
    }

    // -- EXFOR tables --

    pub fn exfor_xs_dir(&self, inc: &str, nuclide: &str, mt: &str) -> PathBuf {
        self.exp_root
            .join(inc)
            .join(nuclide)
            .join("exfor")
            .join("xs")
            .join(mt)
    }

    pub fn exfor_xs_index(&self, inc: &str, nuclide: &str, mt: &str) -> PathBuf {
        self.exfor_xs_dir(inc, nuclide, mt)
            .join(format!("{inc}-{nuclide}-MT{mt}.list"))
    }

    pub fn exfor_residual_dir(&self, inc: &str, nuclide: &str, rp_code: &str) -> PathBuf {
        self.exp_root
            .join(inc)
            .join(nuclide)
            .join("exfor")
            .join("residual")
            .join(rp_code)
    }

    pub fn exfor_residual_index(&self, inc: &str, nuclide: &str, rp_code: &str) -> PathBuf {
        self.exfor_residual_dir(inc, nuclide, rp_code)
            .join(format!("{inc}-{nuclide}-rp{rp_code}.list"))
    }

    pub fn exfor_fy_dir(&self, inc: &str, nuclide: &str, mt: &str) -> PathBuf {
        self.fy_root.join(inc).join(nuclide).join("exfor").join(mt)
    }

    /// Y(A) index when `mass_chain` is set, Y(Z,A) index otherwise.
    pub fn exfor_fy_index(&self, inc: &str, nuclide: &str, mt: &str, mass_chain: bool) -> PathBuf {
        let suffix = if mass_chain { "-YA" } else { "" };
        self.exfor_fy_dir(inc, nuclide, mt)
            .join(format!("{inc}-{nuclide}-MT{mt}{suffix}.list"))
    }

    /// Rebuild the location of an EXFOR dataset file from its name alone.
    ///
    /// Index files and names that do not follow the convention give `None`.
    pub fn exfor_file_location(&self, kind: ExforKind, filename: &str) -> Option<PathBuf> {
        if is_index_file(filename) {
            return None;
        }
        let fields: Vec<&str> = filename.split(['-', '.']).collect();
        if fields.len() < 3 {
            return None;
        }
        let (inc, nuclide, code) = (fields[0], fields[1], fields[2]);
        let path = match kind {
            ExforKind::CrossSection => {
                self.exfor_xs_dir(inc, nuclide, code.strip_prefix("MT")?)
            }
            ExforKind::Residual => {
                self.exfor_residual_dir(inc, nuclide, code.strip_prefix("rp")?)
            }
            ExforKind::FissionYield => {
                self.exfor_fy_dir(inc, nuclide, code.strip_prefix("MT")?)
            }
        };
        Some(path.join(filename))
    }

    /// Path shown to the user for a file below the data root.
    pub fn relative_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.data_root).unwrap_or(path)
    }
}

pub fn is_index_file(filename: &str) -> bool {
    filename.contains(".list")
}

// ---------------------------------------------------------------------------
// Dataset names
// ---------------------------------------------------------------------------

/// Fields encoded in an EXFOR dataset filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetName {
    pub inc: String,
    pub target: String,
    /// "MT102" or "rp079196".
    pub code: String,
    pub author: String,
    pub entry: String,
    pub year: String,
}

impl DatasetName {
    /// Split `n-Au197-MT102-Smith-12345002.1975` on `-` and `.`.
    pub fn parse(filename: &str) -> Option<Self> {
        let fields: Vec<&str> = filename.split(['-', '.']).collect();
        if fields.len() < 6 {
            return None;
        }
        Some(Self {
            inc: fields[0].to_string(),
            target: fields[1].to_string(),
            code: fields[2].to_string(),
            author: fields[3].to_string(),
            entry: fields[4].to_string(),
            year: fields[5].to_string(),
        })
    }

    /// Split `n-U235-MT454-Wahl-12345002-E0014.000.1975`: at most five `-`
    /// splits, the year is the last `.` field of the remainder.
    pub fn parse_fission_yield(filename: &str) -> Option<Self> {
        let fields: Vec<&str> = filename.splitn(6, '-').collect();
        if fields.len() < 6 {
            return None;
        }
        let year = fields[5].rsplit('.').next().unwrap_or("");
        Some(Self {
            inc: fields[0].to_string(),
            target: fields[1].to_string(),
            code: fields[2].to_string(),
            author: fields[3].to_string(),
            entry: fields[4].to_string(),
            year: year.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Fission yield dataset matching
// ---------------------------------------------------------------------------

/// Energy field of a FY dataset filename, from an energy in MeV.
///
/// Above 0.1 MeV: `%08.3F` ("0014.000"); otherwise `%8.2E` ("2.53E-08").
pub fn fy_energy_field(energy_mev: f64) -> String {
    if energy_mev > 0.1 {
        format!("{energy_mev:08.3}")
    } else {
        format!("{:>8}", scientific(energy_mev, 2))
    }
}

/// C-style scientific notation: mantissa, `E`, sign and at least two
/// exponent digits.
pub fn scientific(value: f64, precision: usize) -> String {
    let formatted = format!("{value:.precision$E}");
    match formatted.split_once('E') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        None => formatted,
    }
}

/// Glob selecting the dataset files of one (entry, incident energy) pair.
pub fn fy_dataset_pattern(mt: &str, entry: &str, einc_ev: f64) -> String {
    let field = fy_energy_field(einc_ev / 1.0e6);
    format!("*-MT{mt}*{entry}-E{field}*")
}

pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher, DataError> {
    Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|source| DataError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Sorted file names of a directory; a missing directory is empty.
pub fn list_dir(dir: &Path) -> Result<Vec<String>, DataError> {
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("{} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(DataError::io(dir, e)),
    };
    let mut names = Vec::new();
    for item in read {
        let item = item.map_err(|e| DataError::io(dir, e))?;
        if let Some(name) = item.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
