use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use super::model::{AverageSpectrum, ProcessingParams, SeriesPoint, SpectrumBin, TimeSeries};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Write the averaged spectrum. Dispatch by extension.
///
/// * `.csv`  – `label,frequency_mhz,mean`, one row per bin
/// * `.json` – `{ "source": ..., "params": {...}, "bins": [...] }`
pub fn export_spectrum(
    path: &Path,
    spectrum: &AverageSpectrum,
    source: &Path,
    params: &ProcessingParams,
) -> Result<()> {
    match extension(path).as_str() {
        "csv" => write_csv(path, &spectrum.bins),
        "json" => write_json(
            path,
            &SpectrumDocument {
                source: source.display().to_string(),
                params,
                bins: &spectrum.bins,
            },
        ),
        other => bail!("Unsupported export extension: .{other}"),
    }
}

/// Write one bin's time series. Dispatch by extension.
///
/// * `.csv`  – `time_s,intensity`
/// * `.json` – `{ "label": ..., "frequency_mhz": ..., "interval_s": ..., "points": [...] }`
pub fn export_time_series(path: &Path, series: &TimeSeries) -> Result<()> {
    match extension(path).as_str() {
        "csv" => write_csv(path, &series.points),
        "json" => write_json(
            path,
            &SeriesDocument {
                label: &series.label,
                frequency_mhz: series.frequency_mhz,
                interval_s: series.interval_s,
                points: &series.points,
            },
        ),
        other => bail!("Unsupported export extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SpectrumDocument<'a> {
    source: String,
    params: &'a ProcessingParams,
    bins: &'a [SpectrumBin],
}

#[derive(Serialize)]
struct SeriesDocument<'a> {
    label: &'a str,
    frequency_mhz: f64,
    interval_s: f64,
    points: &'a [SeriesPoint],
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for (i, record) in records.iter().enumerate() {
        writer
            .serialize(record)
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), doc).context("writing JSON")?;
    Ok(())
}
