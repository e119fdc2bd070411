use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::error::InputError;

// ---------------------------------------------------------------------------
// Element table
// ---------------------------------------------------------------------------

/// Element symbols indexed by `Z - 1`.
pub const ELEMENTS: [&str; 100] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm",
];

/// Symbol for a charge number; `0` is the neutron.
pub fn z_to_symbol(z: u32) -> Option<&'static str> {
    if z == 0 {
        return Some("n");
    }
    ELEMENTS.get(z as usize - 1).copied()
}

/// Charge number for an element symbol (exact case).
pub fn symbol_to_z(symbol: &str) -> Option<u32> {
    ELEMENTS
        .iter()
        .position(|e| *e == symbol)
        .map(|i| i as u32 + 1)
}

/// Zero-padded three digit charge number used in residual filenames.
pub fn z_code(symbol: &str) -> Option<String> {
    symbol_to_z(symbol).map(|z| format!("{z:03}"))
}

/// "pd", "PD", " Pd " → "Pd".
pub fn capitalize_element(input: &str) -> String {
    let trimmed = input.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

static MASS_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*([A-Za-z]\d?)?\s*$").expect("valid mass regex"));

/// Split a mass field like "242m" into (242, "m").
///
/// The isomer flag is lowercased; "0" denotes the natural element.
pub fn parse_mass(input: &str) -> Result<(u16, String), InputError> {
    let caps = MASS_INPUT
        .captures(input)
        .ok_or_else(|| InputError::MissingMass(input.to_string()))?;
    let mass: u16 = caps[1]
        .parse()
        .map_err(|_| InputError::MassOutOfRange(input.to_string()))?;
    if mass > 999 {
        return Err(InputError::MassOutOfRange(input.to_string()));
    }
    let isomer = caps
        .get(2)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default();
    Ok((mass, isomer))
}

// ---------------------------------------------------------------------------
// Nuclide
// ---------------------------------------------------------------------------

/// A target nuclide as it appears in directory and file names (`Au197`,
/// `Am242m`, `C000`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nuclide {
    pub element: String,
    pub mass: u16,
    pub isomer: String,
}

impl Nuclide {
    /// Normalise free-form element and mass inputs.
    pub fn parse(element: &str, mass: &str) -> Result<Self, InputError> {
        let element = capitalize_element(element);
        if symbol_to_z(&element).is_none() {
            return Err(InputError::UnknownElement(element));
        }
        let (mass, isomer) = parse_mass(mass)?;
        Ok(Self {
            element,
            mass,
            isomer,
        })
    }

    pub fn z(&self) -> u32 {
        symbol_to_z(&self.element).unwrap_or(0)
    }

    /// Natural element targets carry mass `000`.
    pub fn is_natural(&self) -> bool {
        self.mass == 0
    }

    /// Mass field as used in paths: "197", "056", "242m".
    pub fn mass_code(&self) -> String {
        format!("{:03}{}", self.mass, self.isomer)
    }
}

impl fmt::Display for Nuclide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.element, self.mass_code())
    }
}

// ---------------------------------------------------------------------------
// Residual product
// ---------------------------------------------------------------------------

/// A residual nucleus of a reaction, encoded in filenames as `ZZZAAA[iso]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidualProduct {
    pub z: u32,
    pub mass: u16,
    pub isomer: String,
}

impl ResidualProduct {
    pub fn from_input(element: &str, mass: &str) -> Result<Self, InputError> {
        let nuclide = Nuclide::parse(element, mass)?;
        Ok(Self {
            z: nuclide.z(),
            mass: nuclide.mass,
            isomer: nuclide.isomer,
        })
    }

    /// Decode "079196m" (or "079196").
    pub fn parse_code(code: &str) -> Result<Self, InputError> {
        let bad = || InputError::BadResidualCode(code.to_string());
        if code.len() < 6 || !code.is_char_boundary(6) {
            return Err(bad());
        }
        let (digits, isomer) = code.split_at(6);
        let z: u32 = digits[..3].parse().map_err(|_| bad())?;
        let mass: u16 = digits[3..].parse().map_err(|_| bad())?;
        if z_to_symbol(z).is_none() {
            return Err(bad());
        }
        Ok(Self {
            z,
            mass,
            isomer: isomer.to_ascii_lowercase(),
        })
    }

    pub fn element(&self) -> &'static str {
        z_to_symbol(self.z).unwrap_or("")
    }

    /// Mass field with the isomer flag, e.g. "099m".
    pub fn mass_code(&self) -> String {
        format!("{:03}{}", self.mass, self.isomer)
    }

    /// Filename form, e.g. "079196m". The neutron has no element entry and
    /// keeps "000".
    pub fn code(&self) -> String {
        let z = z_code(self.element()).unwrap_or_else(|| "000".to_string());
        format!("{z}{}", self.mass_code())
    }

    /// Human form, e.g. "Au-196m".
    pub fn label(&self) -> String {
        format!("{}-{}", self.element(), self.mass_code())
    }
}

impl fmt::Display for ResidualProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_lookup_round_trips_through_charge_number() {
        assert_eq!(symbol_to_z("H"), Some(1));
        assert_eq!(symbol_to_z("Au"), Some(79));
        assert_eq!(symbol_to_z("Fm"), Some(100));
        assert_eq!(z_to_symbol(0), Some("n"));
        assert_eq!(z_to_symbol(92), Some("U"));
        assert_eq!(z_to_symbol(101), None);
        assert_eq!(z_code("Fe").as_deref(), Some("026"));
        assert_eq!(z_code("Xx"), None);
    }

    #[test]
    fn element_input_is_capitalized() {
        assert_eq!(capitalize_element("pd"), "Pd");
        assert_eq!(capitalize_element("PD"), "Pd");
        assert_eq!(capitalize_element(" c "), "C");
        assert_eq!(capitalize_element(""), "");
    }

    #[test]
    fn nuclide_parse_pads_mass_and_lowercases_isomer() {
        let n = Nuclide::parse("au", "197").unwrap();
        assert_eq!(n.to_string(), "Au197");

        let n = Nuclide::parse("FE", "56").unwrap();
        assert_eq!(n.to_string(), "Fe056");

        let n = Nuclide::parse("Am", "242M").unwrap();
        assert_eq!(n.to_string(), "Am242m");
        assert_eq!(n.isomer, "m");

        let n = Nuclide::parse("c", "0").unwrap();
        assert_eq!(n.to_string(), "C000");
        assert!(n.is_natural());

        let n = Nuclide::parse("Hf", "178m2").unwrap();
        assert_eq!(n.mass_code(), "178m2");
    }

    #[test]
    fn nuclide_parse_rejects_bad_input() {
        assert_eq!(
            Nuclide::parse("Xx", "12"),
            Err(InputError::UnknownElement("Xx".into()))
        );
        assert_eq!(
            Nuclide::parse("Fe", "m"),
            Err(InputError::MissingMass("m".into()))
        );
        assert!(matches!(
            Nuclide::parse("Fe", "1000"),
            Err(InputError::MassOutOfRange(_))
        ));
    }

    #[test]
    fn residual_codes_decode_to_labels() {
        let rp = ResidualProduct::parse_code("079196m").unwrap();
        assert_eq!(rp.z, 79);
        assert_eq!(rp.mass, 196);
        assert_eq!(rp.label(), "Au-196m");
        assert_eq!(rp.code(), "079196m");

        let rp = ResidualProduct::parse_code("043099").unwrap();
        assert_eq!(rp.label(), "Tc-099");

        assert!(ResidualProduct::parse_code("79196").is_err());
        assert!(ResidualProduct::parse_code("999001").is_err());
    }

    #[test]
    fn residual_from_input_matches_filename_code() {
        let rp = ResidualProduct::from_input("tc", "99m").unwrap();
        assert_eq!(rp.code(), "043099m");
        assert_eq!(rp.mass_code(), "099m");

        let neutron = ResidualProduct::parse_code("000001").unwrap();
        assert_eq!(neutron.code(), "000001");
        assert_eq!(neutron.label(), "n-001");
    }
}
