use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::data::catalog::Catalog;
use crate::data::layout::DataLayout;
use crate::data::reaction::MtTable;

/// Command line / environment configuration of the viewer.
#[derive(Debug, Clone, Parser)]
#[command(name = "nuclide-explorer", about = "Browse evaluated and experimental nuclear reaction data")]
pub struct Config {
    /// Folder containing the `libraries/` data tree.
    #[arg(long, env = "NUCLIDE_EXPLORER_DATA_ROOT", default_value = "./data")]
    pub data_root: PathBuf,

    /// MT reaction table; the bundled table is used when omitted.
    #[arg(long, env = "NUCLIDE_EXPLORER_MT_TABLE")]
    pub mt_table: Option<PathBuf>,

    /// Start from default inputs instead of the remembered ones.
    #[arg(long)]
    pub reset: bool,
}

impl Config {
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.data_root)
    }

    pub fn load_mt_table(&self) -> Result<MtTable> {
        match &self.mt_table {
            Some(path) => MtTable::load(path)
                .with_context(|| format!("loading MT table {}", path.display())),
            None => Ok(MtTable::builtin()),
        }
    }

    pub fn catalog(&self) -> Result<Catalog> {
        let layout = self.layout();
        if !layout.lib_root.is_dir() {
            log::warn!(
                "{} does not exist, every lookup will be empty",
                layout.lib_root.display()
            );
        }
        Ok(Catalog::new(layout, self.load_mt_table()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "nuclide-explorer",
            "--data-root",
            "/srv/libraries-2022",
            "--reset",
        ])
        .unwrap();
        assert_eq!(config.data_root, PathBuf::from("/srv/libraries-2022"));
        assert!(config.reset);
        assert_eq!(
            config.layout().fy_root,
            PathBuf::from("/srv/libraries-2022/libraries/FY")
        );
    }

    #[test]
    fn bundled_mt_table_is_used_by_default() {
        let config = Config::try_parse_from(["nuclide-explorer", "--data-root", "/tmp/x"]).unwrap();
        let table = config.load_mt_table().unwrap();
        assert_eq!(table.mt_for("n,g"), Some("102"));
    }
}
