use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::chart::{default_axes, AxisScale, Axes};
use crate::data::catalog::{Catalog, LibraryYields};
use crate::data::error::{DataError, InputError};
use crate::data::exfor::FySelection;
use crate::data::filter::{filtered_indices, sort_indices, FilterState, SortState};
use crate::data::index::default_selection;
use crate::data::model::{
    ExforPoint, FissionYieldPoint, FyIndexEntry, IndexEntry, LibraryBandPoint, LibraryPoint,
    LibraryYieldPoint, Lookup, Tabular,
};
use crate::data::nuclide::{Nuclide, ResidualProduct};
use crate::data::reaction::{incident_particle, EnergyBand, MtTable, YieldType};

pub const NO_SELECTION: &str = "No selection";

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Page {
    #[default]
    CrossSection,
    Libraries,
    Residual,
    FissionYield,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::CrossSection,
        Page::Libraries,
        Page::Residual,
        Page::FissionYield,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::CrossSection => "Cross Section",
            Page::Libraries => "Multiple Cross Sections (Libs. only)",
            Page::Residual => "Residual Production Cross Section",
            Page::FissionYield => "Fission Yield",
        }
    }
}

/// Tabs shown below a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Datasets,
    RawData,
    Downloads,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Datasets, Tab::RawData, Tab::Downloads];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Datasets => "Dataset List",
            Tab::RawData => "Raw Data",
            Tab::Downloads => "Download Data Files",
        }
    }
}

/// Dataset tables whose selection drives an EXFOR lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelId {
    CrossSection,
    Residual,
    MassChain,
    ChargeDistribution,
}

// ---------------------------------------------------------------------------
// Remembered form inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XsForm {
    pub element: String,
    pub mass: String,
    pub reaction: String,
    pub groupwise: bool,
    pub axes: Axes,
}

impl Default for XsForm {
    fn default() -> Self {
        Self {
            element: "Au".into(),
            mass: "197".into(),
            reaction: "n,g".into(),
            groupwise: true,
            axes: Axes::LOG_LOG,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibsForm {
    pub element: String,
    pub mass: String,
    pub reactions: Vec<String>,
    pub libs: Vec<String>,
    pub groupwise: bool,
    pub axes: Axes,
}

impl Default for LibsForm {
    fn default() -> Self {
        Self {
            element: "Ta".into(),
            mass: "181".into(),
            reactions: vec!["g,xn".into(), "g,2n".into()],
            libs: vec!["iaea.pd".into(), "endfb8.0".into(), "jendl5.0".into()],
            groupwise: true,
            axes: Axes::LOG_LOG,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidualForm {
    pub element: String,
    pub mass: String,
    pub inc: String,
    pub rp_element: String,
    pub rp_mass: String,
    pub axes: Axes,
}

impl Default for ResidualForm {
    fn default() -> Self {
        Self {
            element: "Mo".into(),
            mass: "100".into(),
            inc: "p".into(),
            rp_element: "Tc".into(),
            rp_mass: "99m".into(),
            axes: Axes::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FyForm {
    pub element: String,
    pub mass: String,
    pub inc: String,
    pub yield_type: YieldType,
    pub band: EnergyBand,
    /// Fragment mass shown in the Y(Z,A) chart.
    pub fp_mass: u32,
    pub mass_chain_scale: AxisScale,
    pub charge_scale: AxisScale,
}

impl Default for FyForm {
    fn default() -> Self {
        Self {
            element: "Pu".into(),
            mass: "239".into(),
            inc: "n".into(),
            yield_type: YieldType::Independent,
            band: EnergyBand::Ev,
            fp_mass: 132,
            mass_chain_scale: AxisScale::Linear,
            charge_scale: AxisScale::Log,
        }
    }
}

/// Everything persisted between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Forms {
    pub page: Page,
    pub xs: XsForm,
    pub libs: LibsForm,
    pub residual: ResidualForm,
    pub fy: FyForm,
}

// ---------------------------------------------------------------------------
// Table views
// ---------------------------------------------------------------------------

/// Filter and sort settings of one raw data table.
#[derive(Debug, Clone, Default)]
pub struct TableView {
    pub filters: FilterState,
    pub sort: Option<SortState>,
}

impl TableView {
    /// Row indices that pass the filters, in display order.
    pub fn visible<T: Tabular>(&self, rows: &[T]) -> Vec<usize> {
        let mut indices = filtered_indices(rows, &self.filters);
        if let Some(sort) = &self.sort {
            sort_indices(rows, &mut indices, sort);
        }
        indices
    }

    pub fn sort_by(&mut self, column: &str) {
        self.sort = Some(SortState::toggle(self.sort.as_ref(), column));
    }
}

/// An index table, its selection and the EXFOR records of the selection.
#[derive(Debug, Clone)]
pub struct DatasetPanel<I, P> {
    pub index: Vec<I>,
    pub selected: BTreeSet<usize>,
    pub exfor: Lookup<P>,
    pub raw: TableView,
    pub tab: Tab,
}

impl<I, P> Default for DatasetPanel<I, P> {
    fn default() -> Self {
        Self {
            index: Vec::new(),
            selected: BTreeSet::new(),
            exfor: Lookup::default(),
            raw: TableView::default(),
            tab: Tab::default(),
        }
    }
}

impl<I, P> DatasetPanel<I, P> {
    /// Replace the index and apply the default selection.
    pub fn set_index(&mut self, index: Vec<I>, points: impl Fn(&I) -> u32) {
        self.selected = default_selection(index.iter().map(points)).into_iter().collect();
        self.index = index;
        self.exfor = Lookup::default();
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.selected.clear();
        self.exfor = Lookup::default();
    }

    pub fn toggle(&mut self, row: usize) {
        if !self.selected.remove(&row) && row < self.index.len() {
            self.selected.insert(row);
        }
    }

    pub fn select_all(&mut self) {
        self.selected = (0..self.index.len()).collect();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    pub fn selected_rows(&self) -> impl Iterator<Item = &I> + '_ {
        self.selected.iter().filter_map(|&i| self.index.get(i))
    }
}

// ---------------------------------------------------------------------------
// Page results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct XsQuery {
    pub nuclide: Nuclide,
    pub inc: String,
    pub mt: String,
    pub reaction: String,
}

impl XsQuery {
    pub fn from_form(form: &XsForm, mt_table: &MtTable) -> Result<Self, InputError> {
        let nuclide = Nuclide::parse(&form.element, &form.mass)?;
        let mt = mt_table
            .mt_for(&form.reaction)
            .ok_or_else(|| InputError::UnknownReaction(form.reaction.clone()))?;
        Ok(Self {
            nuclide,
            inc: incident_particle(&form.reaction).to_string(),
            mt: mt.to_string(),
            reaction: form.reaction.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct XsView {
    pub summary: String,
    pub query: Option<XsQuery>,
    pub libraries: Lookup<LibraryPoint>,
    pub panel: DatasetPanel<IndexEntry, ExforPoint>,
}

impl XsView {
    fn clear(&mut self) {
        self.summary = NO_SELECTION.to_string();
        self.query = None;
        self.libraries = Lookup::default();
        self.panel.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct LibsView {
    pub summary: String,
    pub lookup: Lookup<LibraryBandPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResidualQuery {
    pub nuclide: Nuclide,
    pub inc: String,
    pub product: ResidualProduct,
}

impl ResidualQuery {
    pub fn from_form(form: &ResidualForm) -> Result<Self, InputError> {
        Ok(Self {
            nuclide: Nuclide::parse(&form.element, &form.mass)?,
            inc: form.inc.clone(),
            product: ResidualProduct::from_input(&form.rp_element, &form.rp_mass)?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResidualView {
    pub summary: String,
    pub query: Option<ResidualQuery>,
    /// Residual products tabulated for the target, shown as a hint.
    pub products: Vec<ResidualProduct>,
    pub libraries: Lookup<LibraryPoint>,
    pub panel: DatasetPanel<IndexEntry, ExforPoint>,
}

impl ResidualView {
    fn clear(&mut self) {
        self.summary = NO_SELECTION.to_string();
        self.query = None;
        self.products.clear();
        self.libraries = Lookup::default();
        self.panel.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FyQuery {
    pub nuclide: Nuclide,
    pub inc: String,
    pub mt: String,
    pub band: EnergyBand,
}

#[derive(Debug, Clone, Default)]
pub struct FyView {
    pub summary: String,
    pub query: Option<FyQuery>,
    pub libraries: LibraryYields,
    pub mass_chain: DatasetPanel<FyIndexEntry, FissionYieldPoint>,
    pub charge: DatasetPanel<FyIndexEntry, FissionYieldPoint>,
}

impl FyView {
    fn clear(&mut self) {
        self.summary = NO_SELECTION.to_string();
        self.query = None;
        self.libraries = LibraryYields::default();
        self.mass_chain.clear();
        self.charge.clear();
    }

    /// Measured Y(Z,A) points of one fragment mass.
    pub fn charge_points(&self, fp_mass: u32) -> Vec<&FissionYieldPoint> {
        self.charge.exfor.rows.iter().filter(|p| p.a == fp_mass).collect()
    }

    /// Library Y(Z,A) points of one fragment mass, ground state only.
    pub fn library_charge_points(&self, fp_mass: u32) -> Vec<&LibraryYieldPoint> {
        self.libraries
            .za
            .iter()
            .filter(|p| p.a == fp_mass && p.m == 0)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub catalog: Catalog,
    pub forms: Forms,

    pub xs: XsView,
    pub libs: LibsView,
    pub residual: ResidualView,
    pub fy: FyView,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub show_tips: bool,
}

impl AppState {
    pub fn new(catalog: Catalog, forms: Forms) -> Self {
        let mut state = Self {
            catalog,
            forms,
            xs: XsView::default(),
            libs: LibsView::default(),
            residual: ResidualView::default(),
            fy: FyView::default(),
            status_message: None,
            show_tips: false,
        };
        for page in Page::ALL {
            state.refresh(page);
        }
        state
    }

    fn report(&mut self, result: Result<(), DataError>) {
        match result {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::error!("lookup failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Rerun every lookup of `page` after its form changed.
    pub fn refresh(&mut self, page: Page) {
        let result = match page {
            Page::CrossSection => self.refresh_cross_section(),
            Page::Libraries => self.refresh_libraries(),
            Page::Residual => self.refresh_residual(),
            Page::FissionYield => self.refresh_fission_yield(),
        };
        self.report(result);
    }

    /// Reload the EXFOR records of a panel after its selection changed.
    pub fn reload_exfor(&mut self, panel: PanelId) {
        let result = match panel {
            PanelId::CrossSection => self.load_cross_section_exfor(),
            PanelId::Residual => self.load_residual_exfor(),
            PanelId::MassChain => self.load_fission_yield_exfor(true),
            PanelId::ChargeDistribution => self.load_fission_yield_exfor(false),
        };
        self.report(result);
    }

    /// New reaction: reset the axis scales to the reaction's defaults.
    pub fn reaction_changed(&mut self) {
        if let Some(mt) = self.catalog.mt_table.mt_for(&self.forms.xs.reaction) {
            self.forms.xs.axes = default_axes(mt);
        }
        self.refresh(Page::CrossSection);
    }

    // -- cross section --

    fn refresh_cross_section(&mut self) -> Result<(), DataError> {
        self.xs.clear();
        let query = match XsQuery::from_form(&self.forms.xs, &self.catalog.mt_table) {
            Ok(q) => q,
            Err(e) => {
                log::debug!("cross section inputs incomplete: {e}");
                return Ok(());
            }
        };
        let (nuclide, inc, mt) = (&query.nuclide, query.inc.as_str(), query.mt.as_str());
        self.xs.libraries =
            self.catalog
                .cross_section_libraries(nuclide, inc, mt, self.forms.xs.groupwise)?;
        let index = self.catalog.cross_section_index(nuclide, inc, mt)?;
        self.xs.summary = format!(
            "{nuclide}({}), found {} experimental dataset(s).",
            query.reaction,
            index.len()
        );
        self.xs.panel.set_index(index, |e| e.points);
        self.xs.query = Some(query);
        self.load_cross_section_exfor()
    }

    fn load_cross_section_exfor(&mut self) -> Result<(), DataError> {
        let Some(query) = &self.xs.query else {
            return Ok(());
        };
        let entries: BTreeSet<String> = self.xs.panel.selected_rows().map(|e| e.entry.clone()).collect();
        self.xs.panel.exfor =
            self.catalog
                .cross_section_exfor(&query.nuclide, &query.inc, &query.mt, &entries)?;
        Ok(())
    }

    // -- library comparison --

    fn refresh_libraries(&mut self) -> Result<(), DataError> {
        self.libs = LibsView {
            summary: NO_SELECTION.to_string(),
            lookup: Lookup::default(),
        };
        let form = &self.forms.libs;
        let nuclide = match Nuclide::parse(&form.element, &form.mass) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("library comparison inputs incomplete: {e}");
                return Ok(());
            }
        };
        let reactions = self.catalog.mt_table.select(&form.reactions);
        if reactions.is_empty() || form.libs.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = reactions.iter().map(|r| r.reaction.as_str()).collect();
        self.libs.summary = format!("{nuclide}({})", names.join("), ("));
        self.libs.lookup =
            self.catalog
                .library_comparison(&nuclide, &reactions, &form.libs, form.groupwise)?;
        Ok(())
    }

    // -- residual production --

    fn refresh_residual(&mut self) -> Result<(), DataError> {
        self.residual.clear();
        let form = &self.forms.residual;
        if let Ok(target) = Nuclide::parse(&form.element, &form.mass) {
            self.residual.products = self.catalog.residual_products(&target, &form.inc)?;
        }
        let query = match ResidualQuery::from_form(form) {
            Ok(q) => q,
            Err(e) => {
                log::debug!("residual inputs incomplete: {e}");
                return Ok(());
            }
        };
        let (nuclide, inc, product) = (&query.nuclide, query.inc.as_str(), &query.product);
        self.residual.libraries = self.catalog.residual_libraries(nuclide, inc, product)?;
        let index = self.catalog.residual_index(nuclide, inc, product)?;
        self.residual.summary = format!(
            "{nuclide}({inc},x){}{}, found {} experimental dataset(s).",
            product.element(),
            product.mass_code(),
            index.len()
        );
        self.residual.panel.set_index(index, |e| e.points);
        self.residual.query = Some(query);
        self.load_residual_exfor()
    }

    fn load_residual_exfor(&mut self) -> Result<(), DataError> {
        let Some(query) = &self.residual.query else {
            return Ok(());
        };
        let entries: BTreeSet<String> = self
            .residual
            .panel
            .selected_rows()
            .map(|e| e.entry.clone())
            .collect();
        self.residual.panel.exfor =
            self.catalog
                .residual_exfor(&query.nuclide, &query.inc, &query.product, &entries)?;
        Ok(())
    }

    // -- fission yields --

    fn refresh_fission_yield(&mut self) -> Result<(), DataError> {
        self.fy.clear();
        let form = &self.forms.fy;
        let nuclide = match Nuclide::parse(&form.element, &form.mass) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("fission yield inputs incomplete: {e}");
                return Ok(());
            }
        };
        let (inc, mt, band) = (form.inc.as_str(), form.yield_type.mt(), form.band);
        self.fy.libraries = self.catalog.fission_yield_libraries(&nuclide, inc, mt, band)?;
        let indexes = self.catalog.fission_yield_indexes(&nuclide, inc, mt, band)?;
        self.fy.summary = format!(
            "{nuclide}({inc},f) at E:{band}, found {} Y(A) and {} Y(Z,A) experimental dataset(s).",
            indexes.mass_chain.len(),
            indexes.za.len()
        );
        self.fy.mass_chain.set_index(indexes.mass_chain, |e| e.points);
        self.fy.charge.set_index(indexes.za, |e| e.points);
        self.fy.query = Some(FyQuery {
            nuclide,
            inc: inc.to_string(),
            mt: mt.to_string(),
            band,
        });
        self.load_fission_yield_exfor(true)?;
        self.load_fission_yield_exfor(false)
    }

    fn load_fission_yield_exfor(&mut self, mass_chain: bool) -> Result<(), DataError> {
        let Some(query) = &self.fy.query else {
            return Ok(());
        };
        let panel = if mass_chain {
            &mut self.fy.mass_chain
        } else {
            &mut self.fy.charge
        };
        let selections: Vec<FySelection> = panel
            .selected_rows()
            .map(|e| FySelection {
                entry: e.entry.clone(),
                einc: e.einc,
            })
            .collect();
        panel.exfor =
            self.catalog
                .fission_yield_exfor(&query.nuclide, &query.inc, &query.mt, &selections)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::layout::DataLayout;

    fn empty_state() -> AppState {
        let catalog = Catalog::new(DataLayout::new("/nonexistent"), MtTable::builtin());
        AppState::new(catalog, Forms::default())
    }

    fn entry(points: u32) -> IndexEntry {
        IndexEntry {
            filename: String::new(),
            author: "A".into(),
            entry: "1".into(),
            year: "2000".into(),
            points,
            emin: 0.0,
            emax: 0.0,
        }
    }

    #[test]
    fn panels_start_with_the_default_selection() {
        let mut panel: DatasetPanel<IndexEntry, ExforPoint> = DatasetPanel::default();
        panel.set_index(vec![entry(300), entry(10), entry(200)], |e| e.points);
        assert_eq!(panel.selected, BTreeSet::from([1, 2]));

        panel.toggle(0);
        panel.toggle(1);
        assert_eq!(panel.selected, BTreeSet::from([0, 2]));
        panel.toggle(7);
        assert_eq!(panel.selected.len(), 2);

        panel.select_all();
        assert_eq!(panel.selected_rows().count(), 3);
        panel.select_none();
        assert_eq!(panel.selected_rows().count(), 0);
    }

    #[test]
    fn missing_data_tree_gives_empty_pages() {
        let state = empty_state();
        assert_eq!(state.status_message, None);
        assert_eq!(state.xs.summary, "Au197(n,g), found 0 experimental dataset(s).");
        assert!(state.xs.libraries.is_empty());
        assert_eq!(state.libs.summary, "Ta181(g,xn), (g,2n)");
        assert_eq!(
            state.residual.summary,
            "Mo100(p,x)Tc099m, found 0 experimental dataset(s)."
        );
        assert_eq!(
            state.fy.summary,
            "Pu239(n,f) at E:eV, found 0 Y(A) and 0 Y(Z,A) experimental dataset(s)."
        );
    }

    #[test]
    fn invalid_inputs_show_no_selection() {
        let mut state = empty_state();
        state.forms.xs.element = "Xx".into();
        state.refresh(Page::CrossSection);
        assert_eq!(state.xs.summary, NO_SELECTION);
        assert!(state.xs.query.is_none());

        state.forms.residual.rp_mass = String::new();
        state.refresh(Page::Residual);
        assert_eq!(state.residual.summary, NO_SELECTION);
    }

    #[test]
    fn changing_reaction_resets_axes() {
        let mut state = empty_state();
        state.forms.xs.reaction = "n,2n".into();
        state.reaction_changed();
        assert_eq!(state.forms.xs.axes, Axes::default());
        state.forms.xs.reaction = "n,tot".into();
        state.reaction_changed();
        assert_eq!(state.forms.xs.axes, Axes::LOG_LOG);
    }

    #[test]
    fn forms_survive_a_json_round_trip() {
        let mut forms = Forms::default();
        forms.page = Page::FissionYield;
        forms.fy.fp_mass = 140;
        let text = serde_json::to_string(&forms).unwrap();
        let back: Forms = serde_json::from_str(&text).unwrap();
        assert_eq!(back, forms);

        let partial: Forms = serde_json::from_str(r#"{"page":"Residual"}"#).unwrap();
        assert_eq!(partial.page, Page::Residual);
        assert_eq!(partial.xs, XsForm::default());
    }
}
