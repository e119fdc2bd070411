use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::layout::{DataLayout, ExforKind};

/// Folder that holds the dataset files inside a downloaded archive.
pub const ZIP_FOLDER: &str = "exfortables";

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Write `rows` as CSV with a header taken from the serde field names.
pub fn write_csv<T: Serialize, W: Write>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (i, row) in rows.iter().enumerate() {
        wtr.serialize(row).with_context(|| format!("writing CSV row {i}"))?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(())
}

pub fn save_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(file, rows)?;
    log::info!("saved {} row(s) to {}", rows.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// ZIP
// ---------------------------------------------------------------------------

/// Pack `files` into a deflated archive, each under `exfortables/<name>`.
pub fn write_zip<W: Write + Seek>(writer: W, files: &[PathBuf]) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("{} has no file name", path.display()))?;
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        zip.start_file(format!("{ZIP_FOLDER}/{name}"), options)
            .with_context(|| format!("adding {name} to archive"))?;
        zip.write_all(&bytes)
            .with_context(|| format!("compressing {name}"))?;
    }
    zip.finish().context("finishing archive")
}

pub fn save_zip(path: &Path, files: &[PathBuf]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_zip(file, files)?;
    log::info!("archived {} file(s) into {}", files.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Single files
// ---------------------------------------------------------------------------

/// A data file offered for download, with its path below the data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub path: PathBuf,
    pub relative: String,
}

impl DownloadLink {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

pub fn download_links(layout: &DataLayout, files: &[PathBuf]) -> Vec<DownloadLink> {
    files
        .iter()
        .map(|path| DownloadLink {
            relative: layout.relative_path(path).display().to_string(),
            path: path.clone(),
        })
        .collect()
}

/// Links for EXFOR dataset files, each located again from its file name.
/// Names outside the naming convention are left out.
pub fn exfor_download_links(
    layout: &DataLayout,
    kind: ExforKind,
    files: &[PathBuf],
) -> Vec<DownloadLink> {
    let located: Vec<PathBuf> = files
        .iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let location = layout.exfor_file_location(kind, name);
            if location.is_none() {
                log::warn!("{name} does not follow the EXFOR naming convention");
            }
            location
        })
        .collect();
    download_links(layout, &located)
}

pub fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    std::fs::copy(source, dest)
        .with_context(|| format!("copying {} to {}", source.display(), dest.display()))?;
    log::info!("saved {}", dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ExforPoint, FissionYieldPoint};
    use std::io::{Cursor, Read};
    use tempfile::TempDir;
    use zip::ZipArchive;

    #[test]
    fn cross_section_csv_has_fixed_header() {
        let rows = vec![ExforPoint {
            author: "Smith".into(),
            year: "1975".into(),
            entry: "12345002".into(),
            energy: 1.0e4,
            de: None,
            xs: 0.5,
            dxs: Some(0.025),
        }];
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("author,year,entry,Energy,dE,XS,dXS"));
        assert_eq!(lines.next(), Some("Smith,1975,12345002,10000.0,,0.5,0.025"));
    }

    #[test]
    fn fission_yield_csv_has_fixed_header() {
        let rows = vec![FissionYieldPoint {
            author: "Wahl".into(),
            year: "1988".into(),
            entry: "1".into(),
            einc: 0.0253,
            deinc: 0.0,
            z: 54,
            a: 132,
            iso: 0,
            fpy: 0.015,
            dfpy: None,
        }];
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("author,year,entry,Einc,dEinc,Z,A,Iso,FPY,dFPY\n"));
    }

    #[test]
    fn raw_data_columns_follow_the_csv_header() {
        use crate::data::model::Tabular;
        assert_eq!(
            FissionYieldPoint::COLUMNS.join(","),
            "author,year,entry,Einc,dEinc,Z,A,Iso,FPY,dFPY"
        );
        assert_eq!(ExforPoint::COLUMNS.join(","), "author,year,entry,Energy,dE,XS,dXS");
    }

    #[test]
    fn archive_puts_files_under_exfortables() {
        let dir = TempDir::new().expect("tempdir should be created");
        let a = dir.path().join("n-Au197-MT102-Smith-12345002.1975");
        let b = dir.path().join("n-Au197-MT102-Jones-54321002.1980");
        std::fs::write(&a, "1.0 100.0\n").unwrap();
        std::fs::write(&b, "2.0 200.0\n").unwrap();

        let cursor = write_zip(Cursor::new(Vec::new()), &[a, b]).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("exfortables/n-Au197-MT102-Jones-54321002.1980")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "2.0 200.0\n");
    }

    #[test]
    fn missing_file_fails_the_archive() {
        let err = write_zip(Cursor::new(Vec::new()), &[PathBuf::from("/nonexistent/file")]);
        assert!(err.is_err());
    }

    #[test]
    fn links_are_relative_to_the_data_root() {
        let layout = DataLayout::new("/data");
        let links = download_links(
            &layout,
            &[PathBuf::from("/data/libraries/n/Au197/exfor/xs/102/x.1975")],
        );
        assert_eq!(links[0].relative, "libraries/n/Au197/exfor/xs/102/x.1975");
        assert_eq!(links[0].file_name(), "x.1975");
    }

    #[test]
    fn exfor_links_are_rebuilt_from_file_names() {
        let layout = DataLayout::new("/data");
        let files = [
            PathBuf::from("/tmp/copy/p-Mo100-rp043099m-Lee-C0123002.2001"),
            PathBuf::from("/tmp/copy/p-Mo100-rp043099m.list"),
        ];
        let links = exfor_download_links(&layout, ExforKind::Residual, &files);
        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0].relative,
            "libraries/p/Mo100/exfor/residual/043099m/p-Mo100-rp043099m-Lee-C0123002.2001"
        );
        assert_eq!(
            links[0].path,
            PathBuf::from(
                "/data/libraries/p/Mo100/exfor/residual/043099m/p-Mo100-rp043099m-Lee-C0123002.2001"
            )
        );
    }

    #[test]
    fn copies_a_single_file() {
        let dir = TempDir::new().expect("tempdir should be created");
        let src = dir.path().join("a.dat");
        let dest = dir.path().join("b.dat");
        std::fs::write(&src, "x").unwrap();
        copy_file(&src, &dest).unwrap();
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "x");
    }
}
