use std::path::PathBuf;

use eframe::egui::Ui;
use serde::Serialize;

use crate::chart::default_x_window;
use crate::data::layout::{DataLayout, ExforKind};
use crate::data::model::{ExforPoint, FissionYieldPoint, LibraryYieldPoint, Tabular};
use crate::state::{AppState, DatasetPanel, Page, PanelId, Tab};
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// Central panel – chart and tables of the current page
// ---------------------------------------------------------------------------

pub fn central(ui: &mut Ui, state: &mut AppState) {
    match state.forms.page {
        Page::CrossSection => cross_section_page(ui, state),
        Page::Libraries => libraries_page(ui, state),
        Page::Residual => residual_page(ui, state),
        Page::FissionYield => fission_yield_page(ui, state),
    }
}

/// Dataset list, raw data and downloads of one panel. Returns `true` when
/// the dataset selection changed.
fn dataset_tabs<I, P>(
    ui: &mut Ui,
    id: &str,
    panel: &mut DatasetPanel<I, P>,
    kind: ExforKind,
    keep: impl Fn(&P) -> bool,
    layout: &DataLayout,
    library_files: &[PathBuf],
    status: &mut Option<String>,
) -> bool
where
    I: Tabular,
    P: Tabular + Serialize + Clone,
{
    let tabs = Tab::ALL.map(|t| (t, t.title()));
    tables::tab_bar(ui, &mut panel.tab, &tabs);

    let current = panel.tab;
    match current {
        Tab::Datasets => tables::dataset_table(ui, id, panel),
        Tab::RawData => {
            let rows: Vec<P> = panel.exfor.rows.iter().filter(|p| keep(p)).cloned().collect();
            tables::raw_table(ui, id, &rows, &mut panel.raw);
            false
        }
        Tab::Downloads => {
            let rows: Vec<P> = panel.exfor.rows.iter().filter(|p| keep(p)).cloned().collect();
            panels::downloads(ui, layout, &rows, kind, &panel.exfor.files, library_files, status);
            false
        }
    }
}

fn cross_section_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading(&state.xs.summary);
    let axes = state.forms.xs.axes;
    let window = state
        .xs
        .query
        .as_ref()
        .and_then(|q| default_x_window(&q.inc, &q.mt));

    plot::cross_section_chart(
        ui,
        format!("xs {} {axes:?}", state.xs.summary),
        axes,
        window,
        &state.xs.libraries.rows,
        &state.xs.panel.exfor.rows,
    );
    ui.add_space(8.0);

    let changed = dataset_tabs(
        ui,
        "xs_datasets",
        &mut state.xs.panel,
        ExforKind::CrossSection,
        |_| true,
        &state.catalog.layout,
        &state.xs.libraries.files,
        &mut state.status_message,
    );
    if changed {
        state.reload_exfor(PanelId::CrossSection);
    }
}

fn libraries_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading(&state.libs.summary);
    let axes = state.forms.libs.axes;

    plot::library_comparison_chart(
        ui,
        format!("libs {} {axes:?}", state.libs.summary),
        axes,
        &state.libs.lookup.rows,
    );
    ui.add_space(8.0);

    tables::section(ui, Tab::Downloads.title(), |ui: &mut Ui| {
        panels::downloads::<ExforPoint>(
            ui,
            &state.catalog.layout,
            &[],
            ExforKind::CrossSection,
            &[],
            &state.libs.lookup.files,
            &mut state.status_message,
        );
    });
}

fn residual_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading(&state.residual.summary);
    let axes = state.forms.residual.axes;

    plot::cross_section_chart(
        ui,
        format!("residual {} {axes:?}", state.residual.summary),
        axes,
        None,
        &state.residual.libraries.rows,
        &state.residual.panel.exfor.rows,
    );
    ui.add_space(8.0);

    let changed = dataset_tabs(
        ui,
        "residual_datasets",
        &mut state.residual.panel,
        ExforKind::Residual,
        |_| true,
        &state.catalog.layout,
        &state.residual.libraries.files,
        &mut state.status_message,
    );
    if changed {
        state.reload_exfor(PanelId::Residual);
    }
}

fn fission_yield_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading(&state.fy.summary);
    let form = &state.forms.fy;
    let (fp_mass, a_scale, z_scale) = (form.fp_mass, form.mass_chain_scale, form.charge_scale);

    let mut mass_chain_changed = false;
    tables::section(ui, "Mass chain yields Y(A)", |ui: &mut Ui| {
        let libs: Vec<&LibraryYieldPoint> = state.fy.libraries.a.iter().collect();
        let exfor: Vec<&FissionYieldPoint> = state.fy.mass_chain.exfor.rows.iter().collect();
        plot::yield_chart(
            ui,
            format!("fy a {} {a_scale:?}", state.fy.summary),
            "Mass number A",
            a_scale,
            &libs,
            &exfor,
            false,
        );
        mass_chain_changed = dataset_tabs(
            ui,
            "fy_mass_chain",
            &mut state.fy.mass_chain,
            ExforKind::FissionYield,
            |_| true,
            &state.catalog.layout,
            &state.fy.libraries.files,
            &mut state.status_message,
        );
    });
    ui.add_space(8.0);

    let mut charge_changed = false;
    let title = format!("Charge distribution Y(Z,A) for A = {fp_mass}");
    tables::section(ui, &title, |ui: &mut Ui| {
        let libs = state.fy.library_charge_points(fp_mass);
        let exfor = state.fy.charge_points(fp_mass);
        plot::yield_chart(
            ui,
            format!("fy za {} {fp_mass} {z_scale:?}", state.fy.summary),
            "Charge number Z",
            z_scale,
            &libs,
            &exfor,
            true,
        );
        charge_changed = dataset_tabs(
            ui,
            "fy_charge",
            &mut state.fy.charge,
            ExforKind::FissionYield,
            |p: &FissionYieldPoint| p.a == fp_mass,
            &state.catalog.layout,
            &[],
            &mut state.status_message,
        );
    });

    if mass_chain_changed {
        state.reload_exfor(PanelId::MassChain);
    }
    if charge_changed {
        state.reload_exfor(PanelId::ChargeDistribution);
    }
}
