use std::collections::BTreeSet;

use super::error::DataError;
use super::exfor::{read_cross_sections, read_fission_yields, FySelection};
use super::index::{read_fy_index, read_index};
use super::layout::DataLayout;
use super::library::{
    mass_chain_yields, read_band_table, read_cross_section_table, read_yield_table, LIB_LIST_FY,
    LIB_LIST_RESIDUAL, LIB_LIST_XS,
};
use super::model::{
    ExforPoint, FissionYieldPoint, FyIndexEntry, IndexEntry, LibraryBandPoint, LibraryPoint,
    LibraryYieldPoint, Lookup,
};
use super::nuclide::{Nuclide, ResidualProduct};
use super::reaction::{uses_groupwise, EnergyBand, MtEntry, MtTable, ISOMERIC};
use super::residual::list_residual_products;

/// Library yields of one fission yield lookup.
#[derive(Debug, Clone, Default)]
pub struct LibraryYields {
    pub files: Vec<std::path::PathBuf>,
    /// Independent/cumulative yields per (Z, A, M).
    pub za: Vec<LibraryYieldPoint>,
    /// Mass chain yields per A.
    pub a: Vec<LibraryYieldPoint>,
}

/// Experimental indexes of one fission yield lookup.
#[derive(Debug, Clone, Default)]
pub struct FyIndexes {
    /// Y(A) datasets.
    pub mass_chain: Vec<FyIndexEntry>,
    /// Y(Z,A) datasets.
    pub za: Vec<FyIndexEntry>,
}

/// Entry point for every data lookup the pages perform.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub layout: DataLayout,
    pub mt_table: MtTable,
}

impl Catalog {
    pub fn new(layout: DataLayout, mt_table: MtTable) -> Self {
        Self { layout, mt_table }
    }

    // -- cross sections --

    /// Library tables for one reaction, in [`LIB_LIST_XS`] order.
    pub fn cross_section_libraries(
        &self,
        nuclide: &Nuclide,
        inc: &str,
        mt: &str,
        groupwise: bool,
    ) -> Result<Lookup<LibraryPoint>, DataError> {
        let nuc = nuclide.to_string();
        let groupwise = uses_groupwise(groupwise, mt, nuclide.is_natural(), inc);
        let mut lookup = Lookup::default();
        for lib in LIB_LIST_XS {
            let path = self.layout.library_xs_file(inc, &nuc, lib, mt, "", groupwise);
            match read_cross_section_table(&path, lib) {
                Ok(Some(points)) if !points.is_empty() => {
                    lookup.rows.extend(points);
                    lookup.files.push(path);
                }
                Ok(_) => {}
                Err(e) => log::warn!("skipping library table: {e}"),
            }
        }
        log::info!("{nuc} MT{mt}: {} library table(s)", lookup.files.len());
        Ok(lookup)
    }

    pub fn cross_section_index(&self, nuclide: &Nuclide, inc: &str, mt: &str) -> Result<Vec<IndexEntry>, DataError> {
        read_index(&self.layout.exfor_xs_index(inc, &nuclide.to_string(), mt))
    }

    pub fn cross_section_exfor(
        &self,
        nuclide: &Nuclide,
        inc: &str,
        mt: &str,
        entries: &BTreeSet<String>,
    ) -> Result<Lookup<ExforPoint>, DataError> {
        read_cross_sections(&self.layout.exfor_xs_dir(inc, &nuclide.to_string(), mt), entries)
    }

    /// Tables of several reactions and libraries, probing each target
    /// isomeric flag.
    pub fn library_comparison(
        &self,
        nuclide: &Nuclide,
        reactions: &[MtEntry],
        libs: &[String],
        groupwise: bool,
    ) -> Result<Lookup<LibraryBandPoint>, DataError> {
        let nuc = nuclide.to_string();
        let mut lookup = Lookup::default();
        for reaction in reactions {
            let inc = super::reaction::incident_particle(&reaction.reaction);
            let gw = uses_groupwise(groupwise, &reaction.mt, nuclide.is_natural(), inc);
            for lib in libs {
                for iso in ISOMERIC {
                    let path = self.layout.library_xs_file(inc, &nuc, lib, &reaction.mt, iso, gw);
                    match read_band_table(&path, lib, &reaction.mt, iso) {
                        Ok(Some(points)) if !points.is_empty() => {
                            lookup.rows.extend(points);
                            lookup.files.push(path);
                        }
                        Ok(_) => {}
                        Err(e) => log::warn!("skipping library table: {e}"),
                    }
                }
            }
        }
        log::info!("{nuc}: {} table(s) for comparison", lookup.files.len());
        Ok(lookup)
    }

    // -- residual production --

    /// Residual products known for a target, heaviest first.
    pub fn residual_products(&self, nuclide: &Nuclide, inc: &str) -> Result<Vec<ResidualProduct>, DataError> {
        list_residual_products(&self.layout.residual_listing_dir(inc, &nuclide.to_string()))
    }

    pub fn residual_libraries(
        &self,
        nuclide: &Nuclide,
        inc: &str,
        product: &ResidualProduct,
    ) -> Result<Lookup<LibraryPoint>, DataError> {
        let nuc = nuclide.to_string();
        let code = product.code();
        let mut lookup = Lookup::default();
        for lib in LIB_LIST_RESIDUAL {
            let path = self.layout.library_residual_file(inc, &nuc, lib, &code);
            match read_cross_section_table(&path, lib) {
                Ok(Some(points)) if !points.is_empty() => {
                    lookup.rows.extend(points);
                    lookup.files.push(path);
                }
                Ok(_) => {}
                Err(e) => log::warn!("skipping library table: {e}"),
            }
        }
        log::info!("{nuc}({inc},x){}: {} library table(s)", product.label(), lookup.files.len());
        Ok(lookup)
    }

    pub fn residual_index(
        &self,
        nuclide: &Nuclide,
        inc: &str,
        product: &ResidualProduct,
    ) -> Result<Vec<IndexEntry>, DataError> {
        read_index(&self.layout.exfor_residual_index(inc, &nuclide.to_string(), &product.code()))
    }

    pub fn residual_exfor(
        &self,
        nuclide: &Nuclide,
        inc: &str,
        product: &ResidualProduct,
        entries: &BTreeSet<String>,
    ) -> Result<Lookup<ExforPoint>, DataError> {
        let dir = self
            .layout
            .exfor_residual_dir(inc, &nuclide.to_string(), &product.code());
        read_cross_sections(&dir, entries)
    }

    // -- fission yields --

    pub fn fission_yield_indexes(
        &self,
        nuclide: &Nuclide,
        inc: &str,
        mt: &str,
        band: EnergyBand,
    ) -> Result<FyIndexes, DataError> {
        let nuc = nuclide.to_string();
        Ok(FyIndexes {
            mass_chain: read_fy_index(&self.layout.exfor_fy_index(inc, &nuc, mt, true), band)?,
            za: read_fy_index(&self.layout.exfor_fy_index(inc, &nuc, mt, false), band)?,
        })
    }

    pub fn fission_yield_exfor(
        &self,
        nuclide: &Nuclide,
        inc: &str,
        mt: &str,
        selections: &[FySelection],
    ) -> Result<Lookup<FissionYieldPoint>, DataError> {
        read_fission_yields(&self.layout.exfor_fy_dir(inc, &nuclide.to_string(), mt), mt, selections)
    }

    pub fn fission_yield_libraries(
        &self,
        nuclide: &Nuclide,
        inc: &str,
        mt: &str,
        band: EnergyBand,
    ) -> Result<LibraryYields, DataError> {
        let nuc = nuclide.to_string();
        let mut yields = LibraryYields::default();
        for lib in LIB_LIST_FY {
            let path = self.layout.library_fy_file(inc, &nuc, lib, mt);
            match read_yield_table(&path, lib, band) {
                Ok(Some(points)) if !points.is_empty() => {
                    yields.za.extend(points);
                    yields.files.push(path);
                }
                Ok(_) => {}
                Err(e) => log::warn!("skipping yield table: {e}"),
            }
        }
        yields.a = mass_chain_yields(&yields.za);
        log::info!("{nuc}({inc},f) MT{mt}: {} yield table(s)", yields.files.len());
        Ok(yields)
    }
}
