use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::error::DataError;
use super::layout::list_dir;
use super::nuclide::ResidualProduct;

static RESIDUAL_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rp([0-9]{1,6}\w)\.").expect("valid residual regex"));

/// Residual products tabulated in `dir`, heaviest mass first.
///
/// File names carry the product as `rpZZZAAA[m]`; names without a
/// decodable product are ignored.
pub fn list_residual_products(dir: &Path) -> Result<Vec<ResidualProduct>, DataError> {
    let mut products: Vec<ResidualProduct> = list_dir(dir)?
        .iter()
        .filter_map(|name| {
            let code = RESIDUAL_FILE.captures(name)?.get(1)?.as_str();
            ResidualProduct::parse_code(code).ok()
        })
        .collect();

    products.sort_by(|a, b| b.mass.cmp(&a.mass));
    products.dedup();
    log::debug!("{}: {} residual product(s)", dir.display(), products.len());
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn lists_products_by_descending_mass() {
        let dir = TempDir::new().expect("tempdir should be created");
        for name in [
            "p-Mo100-rp042099.tendl.2021.dat",
            "p-Mo100-rp043100.tendl.2021.dat",
            "p-Mo100-rp043099m.tendl.2021.dat",
            "p-Mo100-rp041097.tendl.2021.dat",
            "README",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let labels: Vec<String> = list_residual_products(dir.path())
            .unwrap()
            .iter()
            .map(|rp| rp.label())
            .collect();
        assert_eq!(labels, vec!["Tc-100", "Mo-099", "Tc-099m", "Nb-097"]);
    }

    #[test]
    fn missing_listing_is_empty() {
        assert!(list_residual_products(Path::new("/nonexistent")).unwrap().is_empty());
    }
}
