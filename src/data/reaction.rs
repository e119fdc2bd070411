use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::DataError;

// ---------------------------------------------------------------------------
// Incident particles
// ---------------------------------------------------------------------------

/// Projectiles offered for cross section and residual production lookups.
pub const PARTICLES: [&str; 7] = ["n", "p", "d", "t", "a", "h", "g"];

/// Projectiles offered for fission yields; "0" is spontaneous fission.
pub const PARTICLES_FY: [&str; 8] = ["n", "0", "g", "p", "d", "t", "a", "h"];

/// Target isomeric flags probed when comparing library tables.
pub const ISOMERIC: [&str; 4] = ["", "g", "m", "m2"];

/// Incident particle of a reaction code such as "n,g".
pub fn incident_particle(reaction: &str) -> &str {
    reaction.split(',').next().unwrap_or("").trim()
}

// ---------------------------------------------------------------------------
// MT table
// ---------------------------------------------------------------------------

/// MT table shipped with the application.
pub const BUILTIN_MT_TABLE: &str = include_str!("../../assets/MT.dat");

/// One row of the MT reaction table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtEntry {
    /// Three digit MT number, e.g. "102".
    pub mt: String,
    /// Reaction without parentheses, e.g. "n,g".
    pub reaction: String,
    pub exfor_sf3: String,
    pub comment: String,
}

/// Mapping between reaction codes and MT numbers.
#[derive(Debug, Clone, Default)]
pub struct MtTable {
    entries: Vec<MtEntry>,
}

impl MtTable {
    /// Parse whitespace separated `MT Reaction exforSF3 comment` rows.
    ///
    /// The first non-comment line is the header. Rows without a numeric MT
    /// are reported as malformed.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, DataError> {
        let mut entries = Vec::new();
        let mut header_seen = false;

        for (line_no, raw) in text.lines().enumerate() {
            let line = strip_comment(raw);
            if line.trim().is_empty() {
                continue;
            }
            if !header_seen {
                header_seen = true;
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(mt), Some(reaction)) = (fields.next(), fields.next()) else {
                return Err(DataError::malformed(origin, line_no + 1, "expected MT and reaction"));
            };
            let mt_num: u32 = mt.parse().map_err(|_| {
                DataError::malformed(origin, line_no + 1, format!("MT '{mt}' is not a number"))
            })?;
            let exfor_sf3 = fields.next().unwrap_or("").to_string();
            let comment = fields.collect::<Vec<_>>().join(" ");
            entries.push(MtEntry {
                mt: format!("{mt_num:03}"),
                reaction: reaction.replace(['(', ')'], ""),
                exfor_sf3,
                comment,
            });
        }

        Ok(Self { entries })
    }

    /// Load the table from disk; a missing file gives an empty table.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("MT table {} not found, reaction list is empty", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(DataError::io(path, e)),
        }
    }

    pub fn builtin() -> Self {
        // The bundled table is checked by the tests below.
        Self::parse(BUILTIN_MT_TABLE, Path::new("assets/MT.dat")).unwrap_or_default()
    }

    pub fn entries(&self) -> &[MtEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reactions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.reaction.as_str())
    }

    /// MT number of the first row matching `reaction`.
    pub fn mt_for(&self, reaction: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.reaction == reaction)
            .map(|e| e.mt.as_str())
    }

    /// Rows for several reactions, in the order asked for; unknown
    /// reactions are left out.
    pub fn select(&self, reactions: &[String]) -> Vec<MtEntry> {
        reactions
            .iter()
            .filter_map(|r| self.entries.iter().find(|e| e.reaction == *r))
            .cloned()
            .collect()
    }
}

/// Drop everything from the first `#` on.
pub(crate) fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
}

// ---------------------------------------------------------------------------
// Groupwise tables
// ---------------------------------------------------------------------------

/// MT numbers for which 1102-group tables are produced.
pub const GROUPWISE_MTS: [&str; 4] = ["001", "002", "018", "102"];

/// Whether the 1102-group variant of a neutron table should be used.
pub fn uses_groupwise(groupwise: bool, mt: &str, natural_target: bool, incident: &str) -> bool {
    groupwise && GROUPWISE_MTS.contains(&mt) && !natural_target && incident == "n"
}

// ---------------------------------------------------------------------------
// Fission yields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YieldType {
    Primary,
    Independent,
    Cumulative,
}

impl YieldType {
    pub const ALL: [YieldType; 3] = [YieldType::Primary, YieldType::Independent, YieldType::Cumulative];

    pub fn mt(self) -> &'static str {
        match self {
            YieldType::Primary => "460",
            YieldType::Independent => "454",
            YieldType::Cumulative => "459",
        }
    }
}

impl fmt::Display for YieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            YieldType::Primary => "Primary",
            YieldType::Independent => "Independent",
            YieldType::Cumulative => "Cumulative",
        };
        f.write_str(name)
    }
}

/// Incident energy window for fission yield lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyBand {
    /// Thermal to 1 keV.
    Ev,
    Kev,
    Mev,
    /// Spontaneous fission, incident energy zero.
    Spontaneous,
}

impl EnergyBand {
    pub const ALL: [EnergyBand; 4] = [EnergyBand::Ev, EnergyBand::Kev, EnergyBand::Mev, EnergyBand::Spontaneous];

    /// Open interval bounds in eV.
    pub fn range(self) -> (f64, f64) {
        match self {
            EnergyBand::Ev => (1.0e-10, 1.0e3),
            EnergyBand::Kev => (1.0e3, 1.0e6),
            EnergyBand::Mev => (1.0e6, 1.0e8),
            EnergyBand::Spontaneous => (0.0, 1.0e-20),
        }
    }

    pub fn contains(self, einc: f64) -> bool {
        let (min, max) = self.range();
        match self {
            EnergyBand::Spontaneous => (min..=max).contains(&einc),
            _ => einc > min && einc < max,
        }
    }
}

impl fmt::Display for EnergyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnergyBand::Ev => "eV",
            EnergyBand::Kev => "keV",
            EnergyBand::Mev => "MeV",
            EnergyBand::Spontaneous => "0",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# MT table
MT  Reaction exforSF3 comment
1   (n,tot)  SIG      total
2   (n,el)   SIG
102 (n,g)    SIG      radiative capture
5   (g,xn)   SIG
";

    #[test]
    fn parses_mt_table_and_strips_parentheses() {
        let table = MtTable::parse(SAMPLE, Path::new("MT.dat")).unwrap();
        assert_eq!(table.entries().len(), 4);
        assert_eq!(table.mt_for("n,g"), Some("102"));
        assert_eq!(table.mt_for("n,tot"), Some("001"));
        assert_eq!(table.entries()[0].comment, "total");
        assert_eq!(table.entries()[2].comment, "radiative capture");
        assert_eq!(table.mt_for("n,xyz"), None);
    }

    #[test]
    fn rejects_non_numeric_mt() {
        let err = MtTable::parse("MT Reaction\nabc (n,g)\n", Path::new("MT.dat")).unwrap_err();
        assert!(matches!(err, DataError::Malformed { line: 2, .. }));
    }

    #[test]
    fn missing_table_is_empty() {
        let table = MtTable::load(Path::new("/nonexistent/MT.dat")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn builtin_table_parses() {
        let table = MtTable::parse(BUILTIN_MT_TABLE, Path::new("assets/MT.dat")).unwrap();
        assert_eq!(table.mt_for("n,g"), Some("102"));
        assert_eq!(table.mt_for("g,xn"), Some("201"));
    }

    #[test]
    fn select_keeps_requested_order() {
        let table = MtTable::parse(SAMPLE, Path::new("MT.dat")).unwrap();
        let picked = table.select(&["n,g".to_string(), "x,y".to_string(), "n,tot".to_string()]);
        let mts: Vec<_> = picked.iter().map(|e| e.mt.as_str()).collect();
        assert_eq!(mts, vec!["102", "001"]);
    }

    #[test]
    fn groupwise_only_for_neutron_isotopes_and_listed_mts() {
        assert!(uses_groupwise(true, "102", false, "n"));
        assert!(!uses_groupwise(false, "102", false, "n"));
        assert!(!uses_groupwise(true, "016", false, "n"));
        assert!(!uses_groupwise(true, "102", true, "n"));
        assert!(!uses_groupwise(true, "102", false, "p"));
    }

    #[test]
    fn energy_bands_are_exclusive_except_spontaneous() {
        assert!(EnergyBand::Ev.contains(0.0253));
        assert!(!EnergyBand::Ev.contains(1.0e3));
        assert!(EnergyBand::Kev.contains(5.0e5));
        assert!(EnergyBand::Mev.contains(1.4e7));
        assert!(EnergyBand::Spontaneous.contains(0.0));
        assert!(!EnergyBand::Spontaneous.contains(0.0253));
    }

    #[test]
    fn incident_particle_is_first_reaction_field() {
        assert_eq!(incident_particle("n,g"), "n");
        assert_eq!(incident_particle("g,xn"), "g");
        assert_eq!(YieldType::Independent.mt(), "454");
    }
}
