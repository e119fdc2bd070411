use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, TextEdit, Ui};
use serde::Serialize;

use crate::chart::{AxisScale, Axes};
use crate::data::export::{
    copy_file, download_links, exfor_download_links, save_csv, save_zip, DownloadLink,
};
use crate::data::layout::{DataLayout, ExforKind};
use crate::data::library::LIB_LIST_COMPARE;
use crate::data::reaction::{EnergyBand, YieldType, PARTICLES, PARTICLES_FY};
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Top bar – page navigation
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        for page in Page::ALL {
            ui.selectable_value(&mut state.forms.page, page, page.title());
        }

        ui.separator();

        if ui.selectable_label(state.show_tips, "Tips").clicked() {
            state.show_tips = !state.show_tips;
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

pub fn tips_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Tips")
        .open(open)
        .default_width(360.0)
        .show(ctx, |ui: &mut Ui| {
            ui.label("Element symbols are case insensitive: au, AU and Au are the same.");
            ui.label("Use mass 0 for a natural element target, e.g. C 0.");
            ui.label("Append m (or m2) to the mass for a metastable state, e.g. 242m.");
            ui.label("Click rows of the Dataset List to add or remove experimental data.");
            ui.label("Raw Data filters: >2000, <=1e6, =Smith, !=0, or any text to search.");
            ui.label("Drag to pan, scroll to zoom, double click to reset the chart.");
        });
}

// ---------------------------------------------------------------------------
// Left side panel – input forms
// ---------------------------------------------------------------------------

/// Render the left input panel of the current page.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.forms.page.title());
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.forms.page {
            Page::CrossSection => cross_section_form(ui, state),
            Page::Libraries => libraries_form(ui, state),
            Page::Residual => residual_form(ui, state),
            Page::FissionYield => fission_yield_form(ui, state),
        });
}

fn nuclide_inputs(ui: &mut Ui, title: &str, element: &mut String, mass: &mut String) {
    ui.strong(title);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Element");
        ui.add(TextEdit::singleline(element).desired_width(40.0).hint_text("Au"));
        ui.label("Mass");
        ui.add(TextEdit::singleline(mass).desired_width(50.0).hint_text("197"));
    });
}

fn particle_combo(ui: &mut Ui, id: &str, inc: &mut String, particles: &[&str]) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Incident particle");
        egui::ComboBox::from_id_salt(id)
            .selected_text(inc.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for p in particles {
                    ui.selectable_value(inc, p.to_string(), *p);
                }
            });
    });
}

fn scale_selector(ui: &mut Ui, label: &str, scale: &mut AxisScale) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        for s in AxisScale::ALL {
            ui.radio_value(scale, s, s.to_string());
        }
    });
}

fn axes_selector(ui: &mut Ui, axes: &mut Axes) {
    ui.separator();
    scale_selector(ui, "X axis", &mut axes.x);
    scale_selector(ui, "Y axis", &mut axes.y);
}

fn cross_section_form(ui: &mut Ui, state: &mut AppState) {
    let before = state.forms.xs.clone();
    let form = &mut state.forms.xs;

    nuclide_inputs(ui, "Target", &mut form.element, &mut form.mass);
    ui.add_space(6.0);

    ui.strong("Reaction");
    egui::ComboBox::from_id_salt("xs_reaction")
        .selected_text(form.reaction.as_str())
        .height(400.0)
        .show_ui(ui, |ui: &mut Ui| {
            for entry in state.catalog.mt_table.entries() {
                let text = format!("({})  MT {}", entry.reaction, entry.mt);
                ui.selectable_value(&mut form.reaction, entry.reaction.clone(), text);
            }
        });
    ui.checkbox(&mut form.groupwise, "Groupwise (1102 groups)");
    axes_selector(ui, &mut form.axes);

    if form.reaction != before.reaction {
        state.reaction_changed();
    } else if form.element != before.element
        || form.mass != before.mass
        || form.groupwise != before.groupwise
    {
        state.refresh(Page::CrossSection);
    }
}

fn libraries_form(ui: &mut Ui, state: &mut AppState) {
    let before = state.forms.libs.clone();
    let form = &mut state.forms.libs;

    nuclide_inputs(ui, "Target", &mut form.element, &mut form.mass);
    ui.add_space(6.0);

    ui.strong("Reactions");
    let mut remove = None;
    for (i, reaction) in form.reactions.iter().enumerate() {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(format!("({reaction})"));
            if ui.small_button("✖").clicked() {
                remove = Some(i);
            }
        });
    }
    if let Some(i) = remove {
        form.reactions.remove(i);
    }
    egui::ComboBox::from_id_salt("libs_add_reaction")
        .selected_text("Add reaction…")
        .height(400.0)
        .show_ui(ui, |ui: &mut Ui| {
            for entry in state.catalog.mt_table.entries() {
                let text = format!("({})  MT {}", entry.reaction, entry.mt);
                if ui.selectable_label(false, text).clicked() && !form.reactions.contains(&entry.reaction) {
                    form.reactions.push(entry.reaction.clone());
                }
            }
        });
    ui.add_space(6.0);

    ui.strong("Libraries");
    for lib in LIB_LIST_COMPARE {
        let mut checked = form.libs.iter().any(|l| l == lib);
        if ui.checkbox(&mut checked, lib).changed() {
            if checked {
                form.libs.push(lib.to_string());
            } else {
                form.libs.retain(|l| l != lib);
            }
        }
    }
    ui.checkbox(&mut form.groupwise, "Groupwise (1102 groups)");
    axes_selector(ui, &mut form.axes);

    if form.element != before.element
        || form.mass != before.mass
        || form.reactions != before.reactions
        || form.libs != before.libs
        || form.groupwise != before.groupwise
    {
        state.refresh(Page::Libraries);
    }
}

fn residual_form(ui: &mut Ui, state: &mut AppState) {
    let before = state.forms.residual.clone();
    let form = &mut state.forms.residual;

    nuclide_inputs(ui, "Target", &mut form.element, &mut form.mass);
    particle_combo(ui, "residual_inc", &mut form.inc, &PARTICLES);
    ui.add_space(6.0);
    nuclide_inputs(ui, "Residual product", &mut form.rp_element, &mut form.rp_mass);
    axes_selector(ui, &mut form.axes);

    ui.separator();
    ui.strong("Residual products");
    if state.residual.products.is_empty() {
        ui.label("no-data");
    } else {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for product in &state.residual.products {
                if ui.link(product.label()).clicked() {
                    form.rp_element = product.element().to_string();
                    form.rp_mass = format!("{}{}", product.mass, product.isomer);
                }
            }
        });
    }

    if form.element != before.element
        || form.mass != before.mass
        || form.inc != before.inc
        || form.rp_element != before.rp_element
        || form.rp_mass != before.rp_mass
    {
        state.refresh(Page::Residual);
    }
}

fn fission_yield_form(ui: &mut Ui, state: &mut AppState) {
    let before = state.forms.fy.clone();
    let form = &mut state.forms.fy;

    nuclide_inputs(ui, "Fissile nuclide", &mut form.element, &mut form.mass);
    particle_combo(ui, "fy_inc", &mut form.inc, &PARTICLES_FY);
    ui.add_space(6.0);

    ui.strong("Yield type");
    ui.horizontal(|ui: &mut Ui| {
        for t in YieldType::ALL {
            ui.radio_value(&mut form.yield_type, t, t.to_string());
        }
    });
    ui.strong("Incident energy");
    ui.horizontal(|ui: &mut Ui| {
        for band in EnergyBand::ALL {
            ui.radio_value(&mut form.band, band, band.to_string());
        }
    });

    ui.separator();
    scale_selector(ui, "Y(A) axis", &mut form.mass_chain_scale);
    scale_selector(ui, "Y(Z,A) axis", &mut form.charge_scale);
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Fragment mass");
        ui.add(egui::DragValue::new(&mut form.fp_mass).range(1..=250));
    });

    if form.element != before.element
        || form.mass != before.mass
        || form.inc != before.inc
        || form.yield_type != before.yield_type
        || form.band != before.band
    {
        state.refresh(Page::FissionYield);
    }
}

// ---------------------------------------------------------------------------
// Download dialogs
// ---------------------------------------------------------------------------

fn report(status: &mut Option<String>, result: anyhow::Result<()>) {
    match result {
        Ok(()) => *status = None,
        Err(e) => {
            log::error!("download failed: {e:#}");
            *status = Some(format!("Error: {e:#}"));
        }
    }
}

/// Save links for data files, labelled with their path below the data root.
fn file_links(ui: &mut Ui, links: &[DownloadLink], status: &mut Option<String>) {
    for link in links {
        if ui.link(&link.relative).clicked() {
            let dest = rfd::FileDialog::new()
                .set_title("Save data file")
                .set_file_name(link.file_name())
                .save_file();
            if let Some(dest) = dest {
                report(status, copy_file(&link.path, &dest));
            }
        }
    }
}

/// Content of a "Download Data Files" tab.
pub fn downloads<T: Serialize>(
    ui: &mut Ui,
    layout: &DataLayout,
    records: &[T],
    kind: ExforKind,
    exfor_files: &[PathBuf],
    library_files: &[PathBuf],
    status: &mut Option<String>,
) {
    if !records.is_empty() {
        ui.label("Download a CSV file with the selected experimental datasets used for the chart:");
        if ui.button("CSV file").clicked() {
            let dest = rfd::FileDialog::new()
                .set_title("Save CSV")
                .set_file_name("csdata.csv")
                .add_filter("CSV", &["csv"])
                .save_file();
            if let Some(dest) = dest {
                report(status, save_csv(&dest, records));
            }
        }
        ui.add_space(8.0);
    }

    let exfor_links = exfor_download_links(layout, kind, exfor_files);
    if !exfor_links.is_empty() {
        ui.label("Files in EXFORTABLES:");
        if ui.button("Download zip").clicked() {
            let dest = rfd::FileDialog::new()
                .set_title("Save archive")
                .set_file_name("exfortables.zip")
                .add_filter("ZIP", &["zip"])
                .save_file();
            if let Some(dest) = dest {
                let paths: Vec<PathBuf> = exfor_links.iter().map(|l| l.path.clone()).collect();
                report(status, save_zip(&dest, &paths));
            }
        }
        file_links(ui, &exfor_links, status);
        ui.add_space(8.0);
    }

    if !library_files.is_empty() {
        ui.label("Files in ENDFTABLES:");
        file_links(ui, &download_links(layout, library_files), status);
    }

    if records.is_empty() && exfor_links.is_empty() && library_files.is_empty() {
        ui.label("Nothing to download.");
    }
}
