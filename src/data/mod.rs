/// Data layer: decimation, parsing, averaging and export.
///
/// Architecture:
/// ```text
///   observation .txt
///        │
///        ▼
///   ┌──────────┐
///   │ decimate  │  keep header + selected rows → <base>_processed.txt
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  whitespace table → SpectralTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ analysis  │  column means → AverageSpectrum, one column → TimeSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  CSV / JSON
///   └──────────┘
/// ```

pub mod analysis;
pub mod decimate;
pub mod error;
pub mod export;
pub mod loader;
pub mod model;
