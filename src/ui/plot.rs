use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Arrows, Legend, Line, LineStyle, MarkerShape, Plot, PlotUi, Points};

use crate::chart::{AxisScale, Axes};
use crate::color::ColorMap;
use crate::data::model::{
    unique_in_order, ExforPoint, FissionYieldPoint, LibraryBandPoint, LibraryPoint,
    LibraryYieldPoint,
};

const ENERGY_LABEL: &str = "Incident energy [eV]";
const XS_LABEL: &str = "Cross section [barn]";
const FPY_LABEL: &str = "Fission yields [/fission]";

const MARKERS: [MarkerShape; 10] = [
    MarkerShape::Circle,
    MarkerShape::Diamond,
    MarkerShape::Square,
    MarkerShape::Up,
    MarkerShape::Down,
    MarkerShape::Cross,
    MarkerShape::Plus,
    MarkerShape::Left,
    MarkerShape::Right,
    MarkerShape::Asterisk,
];

const BAND_COLOR: Color32 = Color32::from_rgba_premultiplied(96, 96, 96, 128);

// ---------------------------------------------------------------------------
// Shared plot setup
// ---------------------------------------------------------------------------

fn base_plot<'a>(id: String, axes: Axes, x_label: &str, y_label: &str) -> Plot<'a> {
    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| axes.x.tick_label(mark.value))
        .y_axis_formatter(move |mark, _range| axes.y.tick_label(mark.value))
        .label_formatter(move |name, value| {
            let x = axes.x.from_plot(value.x);
            let y = axes.y.from_plot(value.y);
            if name.is_empty() {
                format!("{x:.4e}\n{y:.4e}")
            } else {
                format!("{name}\n{x:.4e}\n{y:.4e}")
            }
        })
        .height(420.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
}

fn no_data(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(RichText::new("No data found").color(Color32::from_rgb(255, 165, 0)));
    });
}

fn series(axes: Axes, pairs: impl Iterator<Item = (f64, f64)>) -> Vec<[f64; 2]> {
    pairs.filter_map(|(x, y)| axes.point(x, y)).collect()
}

/// Measured points with error bars, one legend entry per dataset.
struct MeasuredSeries {
    name: String,
    points: Vec<(f64, f64, Option<f64>, Option<f64>)>,
}

/// Smallest positive value of one coordinate, the lower end of error bars
/// that would cross zero on a log axis.
fn positive_floor(values: impl Iterator<Item = f64>) -> f64 {
    values.filter(|v| *v > 0.0).fold(f64::INFINITY, f64::min)
}

/// Error bar segments of one dataset in plot coordinates.
fn error_bars(axes: Axes, points: &[(f64, f64, Option<f64>, Option<f64>)]) -> Vec<[[f64; 2]; 2]> {
    let x_floor = positive_floor(points.iter().map(|p| p.0));
    let y_floor = positive_floor(points.iter().map(|p| p.1));
    let lower = |scale: AxisScale, value: f64, floor: f64| {
        if scale == AxisScale::Log && value <= 0.0 {
            floor
        } else {
            value
        }
    };

    let mut bars = Vec::new();
    for &(x, y, dx, dy) in points {
        if let Some(dy) = dy.filter(|d| *d > 0.0) {
            let low = lower(axes.y, y - dy, y_floor);
            if let (Some(a), Some(b)) = (axes.point(x, low), axes.point(x, y + dy)) {
                bars.push([a, b]);
            }
        }
        if let Some(dx) = dx.filter(|d| *d > 0.0) {
            let low = lower(axes.x, x - dx, x_floor);
            if let (Some(a), Some(b)) = (axes.point(low, y), axes.point(x + dx, y)) {
                bars.push([a, b]);
            }
        }
    }
    bars
}

fn draw_measured(plot_ui: &mut PlotUi, axes: Axes, datasets: &[MeasuredSeries]) {
    let keys: Vec<String> = datasets.iter().map(|d| d.name.clone()).collect();
    let colors = ColorMap::for_datasets(&keys);

    for (i, dataset) in datasets.iter().enumerate() {
        let color = colors.color_for(&dataset.name);

        let bars = error_bars(axes, &dataset.points);
        if !bars.is_empty() {
            let origins: Vec<[f64; 2]> = bars.iter().map(|b| b[0]).collect();
            let tips: Vec<[f64; 2]> = bars.iter().map(|b| b[1]).collect();
            plot_ui.arrows(Arrows::new(origins, tips).tip_length(0.0).color(color));
        }

        let points = series(axes, dataset.points.iter().map(|&(x, y, _, _)| (x, y)));
        plot_ui.points(
            Points::new(points)
                .name(&dataset.name)
                .color(color)
                .shape(MARKERS[i % MARKERS.len()])
                .radius(3.5),
        );
    }
}

fn exfor_series(exfor: &[ExforPoint]) -> Vec<MeasuredSeries> {
    unique_in_order(exfor, |p| &p.entry)
        .into_iter()
        .filter_map(|entry| {
            let rows: Vec<&ExforPoint> = exfor.iter().filter(|p| p.entry == entry).collect();
            let first = rows.first()?;
            Some(MeasuredSeries {
                name: format!("{},{}", first.author, first.year),
                points: rows.iter().map(|p| (p.energy, p.xs, p.de, p.dxs)).collect(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Cross sections (reaction and residual production pages)
// ---------------------------------------------------------------------------

/// Library lines and EXFOR markers of one reaction.
pub fn cross_section_chart(
    ui: &mut Ui,
    id: String,
    axes: Axes,
    x_window: Option<(f64, f64)>,
    libraries: &[LibraryPoint],
    exfor: &[ExforPoint],
) {
    if libraries.is_empty() && exfor.is_empty() {
        no_data(ui);
        return;
    }

    let libs = unique_in_order(libraries, |p| &p.lib);
    let colors = ColorMap::for_libraries(libs.iter().map(String::as_str));
    let measured = exfor_series(exfor);

    let mut plot = base_plot(id, axes, ENERGY_LABEL, XS_LABEL);
    if let Some((min, max)) = x_window {
        if let (Some(min), Some(max)) = (axes.x.to_plot(min), axes.x.to_plot(max)) {
            plot = plot.include_x(min).include_x(max);
        }
    }

    plot.show(ui, |plot_ui| {
        for lib in &libs {
            let points = series(
                axes,
                libraries
                    .iter()
                    .filter(|p| &p.lib == lib)
                    .map(|p| (p.energy, p.xs)),
            );
            plot_ui.line(Line::new(points).name(lib).color(colors.color_for(lib)).width(1.5));
        }
        draw_measured(plot_ui, axes, &measured);
    });
}

// ---------------------------------------------------------------------------
// Library comparison
// ---------------------------------------------------------------------------

fn isomer_style(isomeric: &str) -> LineStyle {
    match isomeric {
        "" => LineStyle::Solid,
        "g" => LineStyle::dotted_dense(),
        _ => LineStyle::dashed_dense(),
    }
}

/// One line per (library, MT, isomer) with its uncertainty band.
pub fn library_comparison_chart(ui: &mut Ui, id: String, axes: Axes, points: &[LibraryBandPoint]) {
    if points.is_empty() {
        no_data(ui);
        return;
    }
    let libs = unique_in_order(points, |p| &p.lib);
    let mts = unique_in_order(points, |p| &p.mt);
    let isomers = unique_in_order(points, |p| &p.isomeric);

    base_plot(id, axes, ENERGY_LABEL, XS_LABEL).show(ui, |plot_ui| {
        for lib in &libs {
            for (shade, mt) in mts.iter().enumerate() {
                let color = crate::color::library_shade(lib, shade);
                for iso in &isomers {
                    let rows: Vec<&LibraryBandPoint> = points
                        .iter()
                        .filter(|p| &p.lib == lib && &p.mt == mt && &p.isomeric == iso)
                        .collect();
                    if rows.is_empty() {
                        continue;
                    }
                    for band in [
                        rows.iter().filter_map(|p| Some((p.energy, p.xs_low?))).collect::<Vec<_>>(),
                        rows.iter().filter_map(|p| Some((p.energy, p.xs_upp?))).collect::<Vec<_>>(),
                    ] {
                        if !band.is_empty() {
                            let edge = series(axes, band.into_iter());
                            plot_ui.line(Line::new(edge).color(BAND_COLOR).width(0.5));
                        }
                    }
                    let mean = series(axes, rows.iter().map(|p| (p.energy, p.xs)));
                    plot_ui.line(
                        Line::new(mean)
                            .name(format!("{lib}-MT:{mt}{iso}"))
                            .color(color)
                            .style(isomer_style(iso))
                            .width(1.5),
                    );
                }
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Fission yields
// ---------------------------------------------------------------------------

fn yield_series(exfor: &[&FissionYieldPoint], x: impl Fn(&FissionYieldPoint) -> u32) -> Vec<MeasuredSeries> {
    let mut out: Vec<MeasuredSeries> = Vec::new();
    let mut keys: Vec<(String, u64)> = Vec::new();
    for p in exfor {
        let key = (p.entry.clone(), p.einc.to_bits());
        let idx = match keys.iter().position(|k| *k == key) {
            Some(i) => i,
            None => {
                keys.push(key);
                out.push(MeasuredSeries {
                    name: format!("{},{}", p.author, crate::data::layout::scientific(p.einc, 2)),
                    points: Vec::new(),
                });
                out.len() - 1
            }
        };
        out[idx].points.push((f64::from(x(p)), p.fpy, None, p.dfpy));
    }
    out
}

/// Yields against mass number (Y(A)) or charge number (Y(Z,A)).
pub fn yield_chart(
    ui: &mut Ui,
    id: String,
    x_label: &str,
    y_scale: AxisScale,
    libraries: &[&LibraryYieldPoint],
    exfor: &[&FissionYieldPoint],
    charge_axis: bool,
) {
    if libraries.is_empty() && exfor.is_empty() {
        no_data(ui);
        return;
    }
    let axes = Axes {
        x: AxisScale::Linear,
        y: y_scale,
    };
    let x_of = |z: u32, a: u32| f64::from(if charge_axis { z } else { a });

    let libs = unique_in_order(libraries, |p| &p.lib);
    let colors = ColorMap::for_libraries(libs.iter().map(String::as_str));
    let measured = yield_series(exfor, |p| if charge_axis { p.z } else { p.a });

    base_plot(id, axes, x_label, FPY_LABEL).show(ui, |plot_ui| {
        for lib in &libs {
            let points = series(
                axes,
                libraries
                    .iter()
                    .filter(|p| &p.lib == lib)
                    .map(|p| (x_of(p.z, p.a), p.fpy)),
            );
            plot_ui.line(Line::new(points).name(lib).color(colors.color_for(lib)).width(1.5));
        }
        draw_measured(plot_ui, axes, &measured);
    });
}
