use eframe::egui::{self, Align, Layout, RichText, Sense, TextEdit, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Tabular;
use crate::state::{DatasetPanel, TableView};

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Dataset list – click rows to (de)select datasets
// ---------------------------------------------------------------------------

/// Render an index table; returns `true` when the selection changed.
pub fn dataset_table<I: Tabular, P>(ui: &mut Ui, id: &str, panel: &mut DatasetPanel<I, P>) -> bool {
    let mut changed = false;

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!(
            "{} of {} dataset(s) selected",
            panel.selected.len(),
            panel.index.len()
        ));
        if ui.small_button("All").clicked() {
            panel.select_all();
            changed = true;
        }
        if ui.small_button("None").clicked() {
            panel.select_none();
            changed = true;
        }
    });

    if panel.index.is_empty() {
        ui.label("No experimental datasets.");
        return changed;
    }

    let mut clicked = None;
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .sense(Sense::click())
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(Column::auto().at_least(70.0), I::COLUMNS.len())
            .max_scroll_height(260.0)
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for column in I::COLUMNS {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*column);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, panel.index.len(), |mut row| {
                    let i = row.index();
                    row.set_selected(panel.selected.contains(&i));
                    for column in I::COLUMNS {
                        row.col(|ui: &mut Ui| {
                            ui.label(panel.index[i].cell(column).to_string());
                        });
                    }
                    if row.response().clicked() {
                        clicked = Some(i);
                    }
                });
            });
    });

    if let Some(i) = clicked {
        panel.toggle(i);
        changed = true;
    }
    changed
}

// ---------------------------------------------------------------------------
// Raw data – per-column filter expressions and click-to-sort headers
// ---------------------------------------------------------------------------

pub fn raw_table<T: Tabular>(ui: &mut Ui, id: &str, rows: &[T], view: &mut TableView) {
    let visible = view.visible(rows);
    ui.label(
        RichText::new(format!(
            "{} of {} record(s). Filters: >2000, <=1e6, =Smith, !=0, or text to search.",
            visible.len(),
            rows.len()
        ))
        .weak(),
    );

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(Column::auto().at_least(80.0), T::COLUMNS.len())
            .max_scroll_height(320.0)
            .header(2.0 * ROW_HEIGHT + 8.0, |mut header| {
                for column in T::COLUMNS {
                    header.col(|ui: &mut Ui| {
                        ui.vertical(|ui: &mut Ui| {
                            let arrow = match &view.sort {
                                Some(s) if s.column == *column && s.ascending => " ▲",
                                Some(s) if s.column == *column => " ▼",
                                _ => "",
                            };
                            if ui.button(RichText::new(format!("{column}{arrow}")).strong()).clicked() {
                                view.sort_by(column);
                            }
                            let text = view.filters.entry(column.to_string()).or_default();
                            ui.add(TextEdit::singleline(text).desired_width(70.0).hint_text("filter"));
                        });
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, visible.len(), |mut row| {
                    let record = &rows[visible[row.index()]];
                    for column in T::COLUMNS {
                        row.col(|ui: &mut Ui| {
                            ui.label(record.cell(column).to_string());
                        });
                    }
                });
            });
    });
}

/// Tab strip for the tabs below a chart.
pub fn tab_bar<T: Copy + PartialEq>(ui: &mut Ui, current: &mut T, tabs: &[(T, &str)]) {
    ui.horizontal(|ui: &mut Ui| {
        for (tab, title) in tabs {
            ui.selectable_value(current, *tab, *title);
        }
    });
    ui.add_space(4.0);
    ui.separator();
}

/// Frame around one chart and its tabs.
pub fn section(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.strong(title);
        add_contents(ui);
    });
}
