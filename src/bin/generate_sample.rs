//! Write a small synthetic LIBRARIES tree for trying the viewer without the
//! real data package. Output is deterministic for a given seed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use nuclide_explorer::data::layout::{fy_energy_field, scientific, DataLayout};
use nuclide_explorer::data::reaction::BUILTIN_MT_TABLE;

#[derive(Debug, Parser)]
#[command(name = "generate_sample", about = "Write a synthetic nuclear data tree")]
struct Args {
    /// Data root to create (the viewer's --data-root).
    #[arg(long, default_value = "./data")]
    out: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Random stream of one nuclide. Streams do not depend on each other, so
/// adding data for one nuclide leaves the others unchanged.
fn nuclide_rng(seed: u64, nuclide: &str) -> StdRng {
    let mixed = nuclide
        .bytes()
        .fold(seed, |h, b| h.rotate_left(5) ^ u64::from(b));
    StdRng::seed_from_u64(mixed)
}

/// Multiplicative measurement scatter around 1.
fn scatter(rng: &mut StdRng, sigma: f64) -> Result<f64> {
    let normal = Normal::new(1.0, sigma).with_context(|| format!("scatter sigma {sigma}"))?;
    Ok(normal.sample(rng))
}

/// Number of files written per category.
#[derive(Debug, Default, Serialize)]
struct Manifest {
    seed: u64,
    files: BTreeMap<&'static str, usize>,
}

struct Writer {
    layout: DataLayout,
    manifest: Manifest,
}

impl Writer {
    fn write(&mut self, category: &'static str, path: &Path, text: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        *self.manifest.files.entry(category).or_default() += 1;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Curves (MeV in, mb out)
// ---------------------------------------------------------------------------

fn log_grid(min: f64, max: f64, n: usize) -> Vec<f64> {
    let (lo, hi) = (min.log10(), max.log10());
    (0..n)
        .map(|i| 10f64.powf(lo + (hi - lo) * i as f64 / (n - 1) as f64))
        .collect()
}

/// 1/v capture with one resonance near 4.9 eV.
fn capture(e_mev: f64) -> f64 {
    let e_ev = e_mev * 1.0e6;
    let one_over_v = 98.7e3 * (0.0253 / e_ev).sqrt();
    let resonance = 3.0e7 / (1.0 + ((e_ev - 4.9) / 0.07).powi(2));
    one_over_v + resonance + 80.0
}

fn lorentzian(e: f64, peak: f64, width: f64, height: f64) -> f64 {
    height / (1.0 + ((e * e - peak * peak) / (e * width)).powi(2))
}

/// Threshold reaction rising above `threshold` and peaking at `peak`.
fn excitation(e: f64, threshold: f64, peak: f64, height: f64) -> f64 {
    if e <= threshold {
        return 0.0;
    }
    let x = (e - threshold) / (peak - threshold);
    height * x * (1.0 - x).exp()
}

fn table_line(values: &[f64]) -> String {
    let fields: Vec<String> = values.iter().map(|v| scientific(*v, 5)).collect();
    format!("  {}\n", fields.join("  "))
}

// ---------------------------------------------------------------------------
// Evaluated library tables
// ---------------------------------------------------------------------------

fn write_capture(w: &mut Writer, rng: &mut StdRng) -> Result<()> {
    let libs = ["endfb8.0", "jendl5.0", "jeff3.3", "tendl.2021"];
    for (i, lib) in libs.iter().enumerate() {
        let scale = 1.0 + 0.04 * i as f64;
        for groupwise in [false, true] {
            let n = if groupwise { 1102 } else { 400 };
            let mut text = String::from("# E(MeV)      XS(mb)\n");
            for e in log_grid(1.0e-11, 20.0, n) {
                text.push_str(&table_line(&[e, capture(e) * scale * scatter(rng, 0.01)?]));
            }
            let path = w.layout.library_xs_file("n", "Au197", lib, "102", "", groupwise);
            w.write("library_xs", &path, &text)?;
        }
    }
    Ok(())
}

fn write_photonuclear(w: &mut Writer) -> Result<()> {
    let libs = ["iaea.pd", "endfb8.0", "jendl5.0"];
    for (i, lib) in libs.iter().enumerate() {
        let shift = 0.15 * i as f64;
        for (mt, iso) in [("201", ""), ("016", ""), ("016", "m")] {
            let mut text = String::from("# E(MeV)      XS(mb)      xslow       xsupp\n");
            for e in log_grid(7.0, 30.0, 160) {
                let xs = match (mt, iso) {
                    ("201", _) => lorentzian(e, 13.5 + shift, 4.5, 320.0) + excitation(e, 14.2, 18.0, 60.0),
                    (_, "") => excitation(e, 14.2, 18.0 + shift, 90.0),
                    _ => excitation(e, 14.2, 18.0 + shift, 20.0),
                };
                let band = if *lib == "iaea.pd" { 0.1 * xs } else { 0.0 };
                text.push_str(&table_line(&[e, xs, xs - band, xs + band]));
            }
            let path = w.layout.library_xs_file("g", "Ta181", lib, mt, iso, false);
            w.write("library_xs", &path, &text)?;
        }
    }
    Ok(())
}

fn write_residual_libraries(w: &mut Writer) -> Result<()> {
    let products = [
        ("043099m", 8.0, 18.0, 250.0),
        ("043099", 8.0, 18.0, 180.0),
        ("043100", 1.0, 7.0, 500.0),
        ("042099", 8.5, 20.0, 140.0),
        ("041097", 12.0, 30.0, 40.0),
    ];
    for (i, lib) in ["tendl.2021", "iaea.2019"].iter().enumerate() {
        for (code, threshold, peak, height) in products {
            if *lib == "iaea.2019" && code != "043099m" {
                continue;
            }
            let mut text = String::from("# E(MeV)      XS(mb)\n");
            for e in log_grid(1.0, 100.0, 200) {
                let xs = excitation(e, threshold, peak + i as f64, height);
                text.push_str(&table_line(&[e, xs]));
            }
            let path = w.layout.library_residual_file("p", "Mo100", lib, code);
            w.write("library_residual", &path, &text)?;
        }
    }
    Ok(())
}

/// Double humped mass chain yield per fission.
fn mass_yield(a: f64, einc_mev: f64) -> f64 {
    let valley = 0.01 * (1.0 + einc_mev);
    let hump = |centre: f64| (-(a - centre).powi(2) / (2.0 * 5.5f64.powi(2))).exp();
    0.06 * (hump(100.0) + hump(138.0)) + valley * (-(a - 119.0).powi(2) / 200.0).exp()
}

/// Gaussian charge distribution around the most probable charge of `a`.
fn charge_fraction(z: f64, a: f64) -> f64 {
    let zp = a * 94.0 / 239.0 - 0.4;
    let sigma: f64 = 0.6;
    (-(z - zp).powi(2) / (2.0 * sigma * sigma)).exp() / (sigma * (2.0 * std::f64::consts::PI).sqrt())
}

fn write_fission_yield_libraries(w: &mut Writer) -> Result<()> {
    for (i, lib) in ["endfb8.0", "jeff3.3", "jendl5.0"].iter().enumerate() {
        let mut text = String::from("# Einc(MeV)   Z   A   M   FPY   dFPY\n");
        for einc in [2.53e-8, 0.5, 14.0] {
            for a in 72..=166u32 {
                let af = f64::from(a);
                for z in 25..=70u32 {
                    let fpy = mass_yield(af + 0.3 * i as f64, einc) * charge_fraction(f64::from(z), af);
                    if fpy < 1.0e-9 {
                        continue;
                    }
                    text.push_str(&format!(
                        "  {}  {z:3}  {a:3}  0  {}  {}\n",
                        scientific(einc, 5),
                        scientific(fpy, 5),
                        scientific(0.05 * fpy, 5)
                    ));
                }
            }
        }
        let path = w.layout.library_fy_file("n", "Pu239", lib, "454");
        w.write("library_fy", &path, &text)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// EXFOR datasets and their indexes
// ---------------------------------------------------------------------------

struct Dataset {
    author: &'static str,
    entry: &'static str,
    year: u32,
    points: usize,
}

const CAPTURE_DATASETS: [Dataset; 5] = [
    Dataset { author: "Macklin", entry: "10102002", year: 1988, points: 60 },
    Dataset { author: "Lederer", entry: "23113002", year: 2011, points: 24 },
    Dataset { author: "Massimi", entry: "23146003", year: 2014, points: 310 },
    Dataset { author: "Poenitz", entry: "10034004", year: 1975, points: 12 },
    Dataset { author: "Kononov", entry: "40007002", year: 1977, points: 35 },
];

const RESIDUAL_DATASETS: [Dataset; 3] = [
    Dataset { author: "Takacs", entry: "D4103003", year: 2003, points: 18 },
    Dataset { author: "Lebeda", entry: "D0681002", year: 2012, points: 9 },
    Dataset { author: "Gagnon", entry: "C1879003", year: 2011, points: 14 },
];

/// Write cross section datasets in MeV / mb plus the `.list` index.
fn write_exfor_cross_sections(
    w: &mut Writer,
    rng: &mut StdRng,
    dir: &Path,
    index: &Path,
    prefix: &str,
    datasets: &[Dataset],
    (emin, emax): (f64, f64),
    curve: impl Fn(f64) -> f64,
) -> Result<()> {
    let mut list = String::from("# filename  points  emin(MeV)  emax(MeV)\n");
    for ds in datasets {
        let lo = rng.gen_range(emin.log10()..emax.log10() - 1.0);
        let hi = rng.gen_range(lo + 0.5..emax.log10());
        let energies = log_grid(10f64.powf(lo), 10f64.powf(hi), ds.points);
        let mut text = String::from("# E(MeV)      XS(mb)      dXS(mb)     dE(MeV)\n");
        for &e in &energies {
            let xs = curve(e) * scatter(rng, 0.06)?;
            text.push_str(&table_line(&[e, xs.max(0.0), 0.05 * xs.abs(), 0.01 * e]));
        }
        let filename = format!("{prefix}-{}-{}.{}", ds.author, ds.entry, ds.year);
        w.write("exfor_dataset", &dir.join(&filename), &text)?;
        list.push_str(&format!(
            "{filename}  {}  {}  {}\n",
            ds.points,
            scientific(energies[0], 4),
            scientific(energies[energies.len() - 1], 4)
        ));
    }
    w.write("exfor_index", index, &list)
}

struct FyDataset {
    author: &'static str,
    entry: &'static str,
    year: u32,
    einc_mev: f64,
    mass_chain: bool,
}

const FY_DATASETS: [FyDataset; 5] = [
    FyDataset { author: "Wahl", entry: "20014002", year: 1988, einc_mev: 2.53e-8, mass_chain: false },
    FyDataset { author: "Rudstam", entry: "20416003", year: 1990, einc_mev: 2.53e-8, mass_chain: false },
    FyDataset { author: "Laurec", entry: "21788005", year: 2010, einc_mev: 2.53e-8, mass_chain: true },
    FyDataset { author: "Gindler", entry: "12855002", year: 1983, einc_mev: 0.5, mass_chain: true },
    FyDataset { author: "Nethaway", entry: "13587004", year: 1977, einc_mev: 14.0, mass_chain: false },
];

fn write_exfor_fission_yields(w: &mut Writer, rng: &mut StdRng) -> Result<()> {
    let dir = w.layout.exfor_fy_dir("n", "Pu239", "454");
    let mut za_list = String::from("# filename  points  einc(MeV)  de(MeV)\n");
    let mut a_list = za_list.clone();

    for ds in &FY_DATASETS {
        let mut text = format!(
            "# E-inc (MeV)= {} dE-inc (MeV)= {}\n# Z   A   Iso  FPY   dFPY\n",
            scientific(ds.einc_mev, 5),
            scientific(0.0, 5)
        );
        let mut points = 0;
        // Step 3 from 84 keeps A = 132 in every Y(Z,A) dataset.
        for a in (84..=150u32).step_by(if ds.mass_chain { 2 } else { 3 }) {
            let af = f64::from(a);
            let y = mass_yield(af, ds.einc_mev);
            if ds.mass_chain {
                let fpy = y * scatter(rng, 0.05)?;
                text.push_str(&format!("  0  {a:3}  0  {}  {}\n", scientific(fpy, 4), scientific(0.04 * fpy, 4)));
                points += 1;
                continue;
            }
            for z in 30..=66u32 {
                let fpy = y * charge_fraction(f64::from(z), af) * scatter(rng, 0.08)?;
                if fpy < 1.0e-6 {
                    continue;
                }
                text.push_str(&format!("  {z}  {a:3}  0  {}  {}\n", scientific(fpy, 4), scientific(0.07 * fpy, 4)));
                points += 1;
            }
        }
        let filename = format!(
            "n-Pu239-MT454-{}-{}-E{}.{}",
            ds.author,
            ds.entry,
            fy_energy_field(ds.einc_mev).trim(),
            ds.year
        );
        w.write("exfor_fy_dataset", &dir.join(&filename), &text)?;
        let row = format!("{filename}  {points}  {}  {}\n", scientific(ds.einc_mev, 4), scientific(0.0, 4));
        if ds.mass_chain {
            a_list.push_str(&row);
        } else {
            za_list.push_str(&row);
        }
    }

    let za_index = w.layout.exfor_fy_index("n", "Pu239", "454", false);
    w.write("exfor_index", &za_index, &za_list)?;
    let a_index = w.layout.exfor_fy_index("n", "Pu239", "454", true);
    w.write("exfor_index", &a_index, &a_list)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let mut w = Writer {
        layout: DataLayout::new(&args.out),
        manifest: Manifest {
            seed: args.seed,
            ..Manifest::default()
        },
    };

    w.write("mt_table", &args.out.join("MT.dat"), BUILTIN_MT_TABLE)?;
    write_capture(&mut w, &mut nuclide_rng(args.seed, "Au197"))?;
    write_photonuclear(&mut w)?;
    write_residual_libraries(&mut w)?;
    write_fission_yield_libraries(&mut w)?;

    let dir = w.layout.exfor_xs_dir("n", "Au197", "102");
    let index = w.layout.exfor_xs_index("n", "Au197", "102");
    write_exfor_cross_sections(
        &mut w,
        &mut nuclide_rng(args.seed, "Au197-exfor"),
        &dir,
        &index,
        "n-Au197-MT102",
        &CAPTURE_DATASETS,
        (1.0e-8, 20.0),
        capture,
    )?;

    let dir = w.layout.exfor_residual_dir("p", "Mo100", "043099m");
    let index = w.layout.exfor_residual_index("p", "Mo100", "043099m");
    write_exfor_cross_sections(
        &mut w,
        &mut nuclide_rng(args.seed, "Mo100"),
        &dir,
        &index,
        "p-Mo100-rp043099m",
        &RESIDUAL_DATASETS,
        (6.0, 70.0),
        |e| excitation(e, 8.0, 18.0, 250.0),
    )?;

    write_exfor_fission_yields(&mut w, &mut nuclide_rng(args.seed, "Pu239"))?;

    let manifest = serde_json::to_string_pretty(&w.manifest).context("serializing manifest")?;
    let manifest_path = args.out.join("manifest.json");
    fs::write(&manifest_path, manifest).with_context(|| format!("writing {}", manifest_path.display()))?;

    let total: usize = w.manifest.files.values().sum();
    log::info!("wrote {total} file(s) below {}", args.out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nuclide_streams_are_repeatable_and_distinct() {
        let mut first = nuclide_rng(42, "Au197");
        let mut again = nuclide_rng(42, "Au197");
        let a: Vec<u64> = (0..4).map(|_| first.gen()).collect();
        let b: Vec<u64> = (0..4).map(|_| again.gen()).collect();
        assert_eq!(a, b);

        let mut au = nuclide_rng(42, "Au197");
        let mut pu = nuclide_rng(42, "Pu239");
        assert_ne!(au.gen::<u64>(), pu.gen::<u64>());
    }

    #[test]
    fn scatter_stays_near_one() {
        let mut rng = nuclide_rng(7, "Mo100");
        let mean = (0..2000)
            .map(|_| scatter(&mut rng, 0.05).expect("valid sigma"))
            .sum::<f64>()
            / 2000.0;
        assert!((mean - 1.0).abs() < 0.01);
        assert!(scatter(&mut rng, f64::NAN).is_err());
    }
}
