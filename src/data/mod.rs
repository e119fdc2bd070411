/// Data layer: naming conventions, parsing, lookups, filtering and export.
///
/// Architecture:
/// ```text
///   form inputs ── nuclide / reaction ──▶ Nuclide, MT, ResidualProduct
///        │
///        ▼
///   ┌──────────┐
///   │  layout   │  (inc, nuclide, MT | rp, lib) → directory + file name
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────────────┐
///   │ index / exfor / library  │  .list + flat tables → typed rows (eV, barn)
///   └──────────────────────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │ catalog   │ ───▶ │  filter   │  column filters + sort → visible rows
///   └──────────┘      └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  CSV / ZIP / single files
///   └──────────┘
/// ```

pub mod catalog;
pub mod error;
pub mod exfor;
pub mod export;
pub mod filter;
pub mod index;
pub mod layout;
pub mod library;
pub mod model;
pub mod nuclide;
pub mod reaction;
pub mod residual;
