use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Axis scale
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

impl AxisScale {
    pub const ALL: [AxisScale; 2] = [AxisScale::Linear, AxisScale::Log];

    /// Plot coordinate of a data value; log axes carry log10 values and
    /// drop non-positive ones.
    pub fn to_plot(self, value: f64) -> Option<f64> {
        match self {
            AxisScale::Linear => value.is_finite().then_some(value),
            AxisScale::Log if value > 0.0 && value.is_finite() => Some(value.log10()),
            AxisScale::Log => None,
        }
    }

    pub fn from_plot(self, coordinate: f64) -> f64 {
        match self {
            AxisScale::Linear => coordinate,
            AxisScale::Log => 10f64.powf(coordinate),
        }
    }

    /// Tick label for a plot coordinate.
    pub fn tick_label(self, coordinate: f64) -> String {
        match self {
            AxisScale::Log if (coordinate - coordinate.round()).abs() < 1e-9 => {
                format!("10^{}", coordinate.round() as i64)
            }
            AxisScale::Log => short_number(self.from_plot(coordinate)),
            AxisScale::Linear => short_number(coordinate),
        }
    }
}

impl fmt::Display for AxisScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisScale::Linear => write!(f, "Linear"),
            AxisScale::Log => write!(f, "Log"),
        }
    }
}

fn short_number(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 {
        "0".to_string()
    } else if (1e-3..1e4).contains(&magnitude) {
        let text = format!("{value:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        format!("{value:.1e}")
    }
}

/// Scales of both axes of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Axes {
    pub x: AxisScale,
    pub y: AxisScale,
}

impl Axes {
    pub const LOG_LOG: Axes = Axes {
        x: AxisScale::Log,
        y: AxisScale::Log,
    };

    /// Plot point of a data pair, `None` when either value cannot be shown.
    pub fn point(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        Some([self.x.to_plot(x)?, self.y.to_plot(y)?])
    }
}

// ---------------------------------------------------------------------------
// Reaction-dependent defaults
// ---------------------------------------------------------------------------

/// Reactions whose cross sections span decades: total, elastic, fission,
/// capture and the production MTs.
pub const LOG_AXIS_MTS: [&str; 12] = [
    "001", "002", "018", "019", "102", "201", "202", "203", "204", "205", "206", "207",
];

/// Discrete inelastic levels plotted over a lower energy window.
const LEVEL_MTS: [&str; 3] = ["051", "052", "053"];

pub fn default_axes(mt: &str) -> Axes {
    if LOG_AXIS_MTS.contains(&mt) {
        Axes::LOG_LOG
    } else {
        Axes::default()
    }
}

/// Initial x window (in eV) for neutron reactions plotted on linear scales;
/// `None` lets the chart fit its data.
pub fn default_x_window(inc: &str, mt: &str) -> Option<(f64, f64)> {
    if inc != "n" || LOG_AXIS_MTS.contains(&mt) {
        return None;
    }
    if LEVEL_MTS.contains(&mt) {
        Some((5.0e4, 5.0e6))
    } else {
        Some((1.0e6, 5.0e7))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_axes_drop_non_positive_values() {
        assert_eq!(AxisScale::Log.to_plot(1.0e6), Some(6.0));
        assert_eq!(AxisScale::Log.to_plot(0.0), None);
        assert_eq!(AxisScale::Log.to_plot(-1.0), None);
        assert_eq!(AxisScale::Linear.to_plot(-1.0), Some(-1.0));
        assert_eq!(Axes::LOG_LOG.point(1.0e3, 0.0), None);
        assert_eq!(Axes::LOG_LOG.point(1.0e3, 1.0), Some([3.0, 0.0]));
    }

    #[test]
    fn log_ticks_show_powers_of_ten() {
        assert_eq!(AxisScale::Log.tick_label(6.0), "10^6");
        assert_eq!(AxisScale::Log.tick_label(-2.0), "10^-2");
        assert_eq!(AxisScale::Log.tick_label(0.5_f64.log10() + 1.0), "5");
        assert_eq!(AxisScale::Linear.tick_label(2.5), "2.5");
        assert_eq!(AxisScale::Linear.tick_label(5.0e7), "5.0e7");
    }

    #[test]
    fn defaults_follow_reaction_type() {
        assert_eq!(default_axes("102"), Axes::LOG_LOG);
        assert_eq!(default_axes("201"), Axes::LOG_LOG);
        assert_eq!(default_axes("016"), Axes::default());

        assert_eq!(default_x_window("n", "052"), Some((5.0e4, 5.0e6)));
        assert_eq!(default_x_window("n", "016"), Some((1.0e6, 5.0e7)));
        assert_eq!(default_x_window("n", "102"), None);
        assert_eq!(default_x_window("p", "016"), None);
    }
}
