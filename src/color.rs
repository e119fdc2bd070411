use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            to_color32(hsl.into_color())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Library colour families
// ---------------------------------------------------------------------------

/// Base colour of each evaluated library family, matched by name prefix.
const FAMILIES: [(&str, [u8; 3]); 7] = [
    ("tendl", [0x60, 0x60, 0x60]),
    ("endfb", [0x2E, 0x91, 0xE5]),
    ("jendl", [0x1C, 0xA7, 0x1C]),
    ("jeff", [0xE1, 0x5F, 0x99]),
    ("cendl", [0xCB, 0xAF, 0x48]),
    ("irdff", [0xA9, 0xA9, 0xA9]),
    ("iaea", [0x33, 0xCC, 0xCC]),
];

/// Lightness offsets of the successive shades of one family.
const SHADE_STEPS: [f32; 7] = [0.0, 0.1, 0.2, -0.1, -0.2, 0.3, -0.3];

/// `n`-th shade of the colour family of `lib`; libraries outside the known
/// families get a hue of their own.
pub fn library_shade(lib: &str, n: usize) -> Color32 {
    let Some((_, [r, g, b])) = FAMILIES.iter().find(|(prefix, _)| lib.starts_with(prefix)) else {
        let fallback = generate_palette(12);
        let seed = lib.bytes().map(usize::from).sum::<usize>() + n;
        return fallback[seed % fallback.len()];
    };
    let base: Srgb = Srgb::new(*r, *g, *b).into_format();
    let mut hsl: Hsl = base.into_color();
    hsl.lightness = (hsl.lightness + SHADE_STEPS[n % SHADE_STEPS.len()]).clamp(0.1, 0.9);
    to_color32(hsl.into_color())
}

// ---------------------------------------------------------------------------
// Color mapping: series key → Color32
// ---------------------------------------------------------------------------

/// Maps the series of a chart (libraries, datasets) to colours.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Shades per library family, in order of appearance.
    pub fn for_libraries<'a>(libs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut used: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut mapping: BTreeMap<String, Color32> = BTreeMap::new();
        for lib in libs {
            if mapping.contains_key(lib) {
                continue;
            }
            let family = FAMILIES
                .iter()
                .map(|(prefix, _)| *prefix)
                .find(|prefix| lib.starts_with(prefix))
                .unwrap_or("");
            let n = used.entry(family).or_insert(0);
            mapping.insert(lib.to_string(), library_shade(lib, *n));
            *n += 1;
        }
        Self { mapping }
    }

    /// Evenly spaced hues for experimental datasets.
    pub fn for_datasets(keys: &[String]) -> Self {
        let palette = generate_palette(keys.len());
        let mapping = keys.iter().cloned().zip(palette).collect();
        Self { mapping }
    }

    pub fn color_for(&self, key: &str) -> Color32 {
        self.mapping.get(key).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn first_shade_is_the_family_base() {
        assert_eq!(library_shade("endfb8.0", 0), Color32::from_rgb(0x2E, 0x91, 0xE5));
        assert_eq!(library_shade("tendl.2021", 0), Color32::from_rgb(0x60, 0x60, 0x60));
        assert_ne!(library_shade("jendl5.0", 0), library_shade("jendl5.0", 1));
    }

    #[test]
    fn libraries_of_one_family_get_different_shades() {
        let map = ColorMap::for_libraries(["iaea.pd", "iaea.2019", "endfb8.0"]);
        assert_ne!(map.color_for("iaea.pd"), map.color_for("iaea.2019"));
        assert_eq!(map.color_for("endfb8.0"), library_shade("endfb8.0", 0));
        assert_eq!(map.color_for("unknown"), Color32::GRAY);
    }
}
