use eframe::egui;

use crate::data::catalog::Catalog;
use crate::state::{AppState, Forms};
use crate::ui::{pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct NuclideExplorerApp {
    pub state: AppState,
}

impl NuclideExplorerApp {
    /// Restore the remembered form inputs unless `reset` is set, then run
    /// the lookups of every page.
    pub fn new(cc: &eframe::CreationContext<'_>, catalog: Catalog, reset: bool) -> Self {
        let forms = match cc.storage {
            Some(storage) if !reset => {
                eframe::get_value::<Forms>(storage, eframe::APP_KEY).unwrap_or_default()
            }
            _ => Forms::default(),
        };
        log::info!("starting on page {:?}", forms.page);
        Self {
            state: AppState::new(catalog, forms),
        }
    }
}

impl eframe::App for NuclideExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: page navigation ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: inputs ----
        egui::SidePanel::left("input_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts and tables ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    pages::central(ui, &mut self.state);
                });
        });

        panels::tips_window(ctx, &mut self.state.show_tips);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.state.forms);
    }
}
