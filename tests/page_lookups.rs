use std::fs;
use std::io::Cursor;
use std::path::Path;

use tempfile::TempDir;

use nuclide_explorer::data::catalog::Catalog;
use nuclide_explorer::data::export::{download_links, exfor_download_links, save_zip, write_csv};
use nuclide_explorer::data::layout::{DataLayout, ExforKind};
use nuclide_explorer::data::reaction::{EnergyBand, MtTable};
use nuclide_explorer::state::{AppState, Forms, Page, PanelId, NO_SELECTION};

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().expect("fixture path has a parent")).expect("fixture dir should be created");
    fs::write(path, text).expect("fixture should be written");
}

/// Au197 capture with two EXFOR datasets and one Pu239 Y(Z,A) dataset.
fn fixture_tree() -> TempDir {
    let dir = TempDir::new().expect("tempdir should be created");
    let l = DataLayout::new(dir.path());

    write(
        &l.library_xs_file("n", "Au197", "endfb8.0", "102", "", true),
        "# E(MeV) XS(mb)\n1.0E-08 9.0E+04\n1.0E-06 1.0E+04\n1.0E+00 1.0E+02\n",
    );

    let xs_dir = l.exfor_xs_dir("n", "Au197", "102");
    write(
        &l.exfor_xs_index("n", "Au197", "102"),
        "n-Au197-MT102-Smith-12345002.1975 2 1.0E-02 2.0E-02\n\
         n-Au197-MT102-Big-22222002.2010 300 1.0E-03 5.0E+00\n",
    );
    write(
        &xs_dir.join("n-Au197-MT102-Smith-12345002.1975"),
        "1.0E-02 500.0 25.0\n2.0E-02 400.0 20.0\n",
    );
    write(
        &xs_dir.join("n-Au197-MT102-Big-22222002.2010"),
        "1.0E-03 900.0\n1.0E-01 200.0\n5.0E+00 50.0\n",
    );

    let fy_name = "n-Pu239-MT454-Wahl-20014002-E2.53E-08.1988";
    write(
        &l.exfor_fy_index("n", "Pu239", "454", false),
        &format!("{fy_name} 3 2.53E-08 0.0\n"),
    );
    write(
        &l.exfor_fy_dir("n", "Pu239", "454").join(fy_name),
        "# E-inc (MeV)= 2.53000E-08 dE-inc (MeV)= 0.00000E+00\n\
         # Z A Iso FPY dFPY\n\
         53 132 0 2.0E-03 2.0E-04\n\
         54 132 0 1.0E-02 1.0E-03\n\
         54 134 0 4.0E-02 3.0E-03\n",
    );
    dir
}

fn state_for(root: &Path) -> AppState {
    AppState::new(Catalog::new(DataLayout::new(root), MtTable::builtin()), Forms::default())
}

#[test]
fn cross_section_page_selects_small_datasets_first() {
    let tree = fixture_tree();
    let mut state = state_for(tree.path());
    assert_eq!(state.status_message, None);
    assert_eq!(state.xs.summary, "Au197(n,g), found 2 experimental dataset(s).");
    assert_eq!(state.xs.libraries.rows.len(), 3);
    assert_eq!(state.xs.libraries.rows[0].lib, "endfb8.0");

    // Newest first; the 300 point dataset is not selected by default.
    let authors: Vec<&str> = state.xs.panel.index.iter().map(|e| e.author.as_str()).collect();
    assert_eq!(authors, vec!["Big", "Smith"]);
    assert_eq!(state.xs.panel.exfor.rows.len(), 2);
    assert!((state.xs.panel.exfor.rows[0].xs - 0.5).abs() < 1e-12);

    state.xs.panel.toggle(0);
    state.reload_exfor(PanelId::CrossSection);
    assert_eq!(state.xs.panel.exfor.rows.len(), 5);
    assert_eq!(state.xs.panel.exfor.files.len(), 2);

    state.xs.panel.raw.filters.insert("author".into(), "=Big".into());
    assert_eq!(state.xs.panel.raw.visible(&state.xs.panel.exfor.rows).len(), 3);
}

#[test]
fn selected_datasets_export_as_csv_and_zip() {
    let tree = fixture_tree();
    let state = state_for(tree.path());
    let panel = &state.xs.panel;

    let mut csv = Vec::new();
    write_csv(&mut csv, &panel.exfor.rows).expect("csv should be written");
    let text = String::from_utf8(csv).expect("csv is utf-8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "author,year,entry,Energy,dE,XS,dXS");
    assert_eq!(lines.len(), 3);

    let out = TempDir::new().expect("tempdir should be created");
    let zip_path = out.path().join("exfortables.zip");
    save_zip(&zip_path, &panel.exfor.files).expect("zip should be written");
    let bytes = fs::read(&zip_path).expect("zip should be readable");
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid archive");
    assert_eq!(archive.len(), 1);
    let name = archive.by_index(0).expect("first entry").name().to_string();
    assert_eq!(name, "exfortables/n-Au197-MT102-Smith-12345002.1975");

    let exfor_links =
        exfor_download_links(&state.catalog.layout, ExforKind::CrossSection, &panel.exfor.files);
    assert_eq!(exfor_links.len(), 1);
    assert_eq!(exfor_links[0].path, panel.exfor.files[0]);
    assert_eq!(
        exfor_links[0].relative,
        Path::new("libraries/n/Au197/exfor/xs/102/n-Au197-MT102-Smith-12345002.1975")
            .display()
            .to_string()
    );

    let links = download_links(&state.catalog.layout, &state.xs.libraries.files);
    assert_eq!(links.len(), 1);
    assert!(links[0].relative.starts_with("libraries"));
    assert_eq!(links[0].file_name(), "n-Au197-MT102-G1102.endfb8.0.dat");
}

#[test]
fn fission_yield_page_reads_charge_distributions() {
    let tree = fixture_tree();
    let mut state = state_for(tree.path());
    assert_eq!(
        state.fy.summary,
        "Pu239(n,f) at E:eV, found 0 Y(A) and 1 Y(Z,A) experimental dataset(s)."
    );
    assert_eq!(state.fy.charge.selected.len(), 1);
    assert_eq!(state.fy.charge.exfor.rows.len(), 3);
    let at_132 = state.fy.charge.exfor.rows.iter().filter(|p| p.a == 132).count();
    assert_eq!(at_132, 2);

    state.fy.charge.select_none();
    state.reload_exfor(PanelId::ChargeDistribution);
    assert!(state.fy.charge.exfor.rows.is_empty());
}

#[test]
fn spontaneous_fission_reads_zero_energy_datasets() {
    let tree = fixture_tree();
    let l = DataLayout::new(tree.path());
    let name = "0-Cf252-MT454-Hoffman-30001002-E0.00E+00.1990";
    write(
        &l.exfor_fy_index("0", "Cf252", "454", false),
        &format!("{name} 4 0.0 0.0\n"),
    );
    write(
        &l.exfor_fy_dir("0", "Cf252", "454").join(name),
        "# E-inc (MeV)= 0.00000E+00 dE-inc (MeV)= 0.00000E+00\n\
         # Z A Iso FPY dFPY\n\
         54 140 0 2.0E-02 2.0E-03\n\
         55 140 0 3.0E-02 3.0E-03\n\
         56 140 0 1.0E-02 1.0E-03\n\
         53 132 0 5.0E-03 5.0E-04\n",
    );

    let mut state = state_for(tree.path());
    state.forms.fy.element = "cf".into();
    state.forms.fy.mass = "252".into();
    state.forms.fy.inc = "0".into();
    state.forms.fy.band = EnergyBand::Spontaneous;
    state.forms.fy.fp_mass = 140;
    state.refresh(Page::FissionYield);

    assert_eq!(
        state.fy.summary,
        "Cf252(0,f) at E:0, found 0 Y(A) and 1 Y(Z,A) experimental dataset(s)."
    );
    assert_eq!(state.fy.charge.index[0].einc, 0.0);
    assert_eq!(state.fy.charge.exfor.rows.len(), 4);
    assert!(state.fy.charge.exfor.rows.iter().all(|p| p.einc == 0.0));

    let at_140 = state.fy.charge_points(140);
    assert_eq!(at_140.len(), 3);
    assert!(at_140.iter().all(|p| p.a == 140));
    assert_eq!(state.fy.charge_points(132).len(), 1);
    assert!(state.fy.library_charge_points(140).is_empty());

    // The thermal band does not list the zero energy dataset.
    state.forms.fy.band = EnergyBand::Ev;
    state.refresh(Page::FissionYield);
    assert!(state.fy.charge.index.is_empty());
    assert!(state.fy.charge_points(140).is_empty());
}

#[test]
fn unknown_inputs_clear_the_page() {
    let tree = fixture_tree();
    let mut state = state_for(tree.path());
    state.forms.xs.mass = "abc".into();
    state.refresh(Page::CrossSection);
    assert_eq!(state.xs.summary, NO_SELECTION);
    assert!(state.xs.panel.index.is_empty());
    assert!(state.xs.libraries.is_empty());
}
