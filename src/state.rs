use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color::PlotTheme;
use crate::data::analysis::time_series;
use crate::data::decimate::derived_path;
use crate::data::export::{export_spectrum, export_time_series};
use crate::data::loader::{process_file, ProcessedData};
use crate::data::model::{ProcessingParams, TimeSeries};
use crate::render::{save_figure, Figure};

// ---------------------------------------------------------------------------
// Plot kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Spectrum,
    TimeSeries,
}

impl PlotKind {
    pub fn label(self) -> &'static str {
        match self {
            PlotKind::Spectrum => "frequency",
            PlotKind::TimeSeries => "time",
        }
    }

    fn image_suffix(self) -> &'static str {
        match self {
            PlotKind::Spectrum => "_freq_plot.png",
            PlotKind::TimeSeries => "_time_plot.png",
        }
    }

    fn data_suffix(self) -> &'static str {
        match self {
            PlotKind::Spectrum => "_spectrum.csv",
            PlotKind::TimeSeries => "_time_series.csv",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI session, independent of rendering.
///
/// Every action either succeeds and replaces the derived data wholesale, or
/// fails and leaves the previous results untouched.
pub struct AppState {
    /// File chosen by the user (None until one is picked).
    pub input_path: Option<PathBuf>,

    /// Parameters used for the next run.
    pub params: ProcessingParams,

    /// Result of the last successful run.
    pub data: Option<ProcessedData>,

    /// Header label of the bin shown in the time-series plot.
    pub selected_frequency: Option<String>,

    /// Time series for `selected_frequency`.
    pub time_series: Option<TimeSeries>,

    pub theme: PlotTheme,

    /// Status bar text.
    pub status_message: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            input_path: None,
            params: ProcessingParams::default(),
            data: None,
            selected_frequency: None,
            time_series: None,
            theme: PlotTheme::default(),
            status_message: "Ready".to_string(),
        }
    }
}

impl AppState {
    pub fn set_input(&mut self, path: PathBuf) {
        self.status_message = format!("Selected {}", path.display());
        self.input_path = Some(path);
    }

    /// Run the transform on the selected file and plot the first bin.
    pub fn process(&mut self) -> Result<()> {
        let path = self
            .input_path
            .clone()
            .context("Please select a file first")?;

        let data = process_file(&path, &self.params)
            .with_context(|| format!("processing {}", path.display()))?;
        let first = data
            .table
            .labels()
            .first()
            .cloned()
            .context("data has no frequency columns")?;
        let series = time_series(&data.table, &first, self.params.sample_interval_s)?;

        log::info!(
            "Processed {}: {} of {} lines kept, {} bins, written to {}",
            path.display(),
            data.kept_lines,
            data.raw_lines,
            data.spectrum.len(),
            data.processed_path.display()
        );
        self.status_message = format!(
            "Success! Processed data saved to: {}",
            data.processed_path.display()
        );
        self.data = Some(data);
        self.selected_frequency = Some(first);
        self.time_series = Some(series);
        Ok(())
    }

    /// Switch the time-series plot to another bin.
    pub fn select_frequency(&mut self, label: &str) -> Result<()> {
        let data = self.data.as_ref().context("Please process data first")?;
        let series = time_series(&data.table, label, self.params.sample_interval_s)?;
        self.status_message = format!(
            "Time series plot for {label} MHz ({} samples)",
            series.len()
        );
        self.selected_frequency = Some(label.to_string());
        self.time_series = Some(series);
        Ok(())
    }

    /// Recompute the time series after the sampling interval changed.
    pub fn refresh_time_series(&mut self) -> Result<()> {
        match self.selected_frequency.clone() {
            Some(label) if self.data.is_some() => self.select_frequency(&label),
            _ => Ok(()),
        }
    }

    /// Frequency of the selected bin, for the spectrum marker.
    pub fn selected_mhz(&self) -> Option<f64> {
        self.time_series.as_ref().map(|ts| ts.frequency_mhz)
    }

    pub fn has_plot(&self, kind: PlotKind) -> bool {
        match kind {
            PlotKind::Spectrum => self.data.is_some(),
            PlotKind::TimeSeries => self.time_series.is_some(),
        }
    }

    /// Suggested file name for an exported image, next to the input.
    pub fn default_plot_path(&self, kind: PlotKind) -> Option<PathBuf> {
        self.input_path
            .as_deref()
            .map(|p| derived_path(p, kind.image_suffix()))
    }

    /// Suggested file name for exported plot data, next to the input.
    pub fn default_data_path(&self, kind: PlotKind) -> Option<PathBuf> {
        self.input_path
            .as_deref()
            .map(|p| derived_path(p, kind.data_suffix()))
    }

    pub fn figure(&self, kind: PlotKind) -> Option<Figure> {
        match kind {
            PlotKind::Spectrum => self
                .data
                .as_ref()
                .map(|d| Figure::spectrum(&d.spectrum, self.selected_mhz(), &self.theme)),
            PlotKind::TimeSeries => self
                .time_series
                .as_ref()
                .map(|ts| Figure::time_series(ts, &self.theme)),
        }
    }

    pub fn save_plot(&mut self, kind: PlotKind, path: &Path) -> Result<()> {
        let figure = self
            .figure(kind)
            .with_context(|| format!("No {} plot to save", kind.label()))?;
        save_figure(&figure, path).with_context(|| format!("saving {}", path.display()))?;
        self.status_message = format!("Plot saved to: {}", path.display());
        Ok(())
    }

    pub fn export_data(&mut self, kind: PlotKind, path: &Path) -> Result<()> {
        match kind {
            PlotKind::Spectrum => {
                let data = self.data.as_ref().context("No spectrum to export")?;
                export_spectrum(path, &data.spectrum, &data.source, &self.params)?;
            }
            PlotKind::TimeSeries => {
                let series = self.time_series.as_ref().context("No time series to export")?;
                export_time_series(path, series)?;
            }
        }
        log::info!("Exported {} data to {}", kind.label(), path.display());
        self.status_message = format!("Data exported to: {}", path.display());
        Ok(())
    }

    /// Record a failed action in the status bar and the log.
    pub fn fail(&mut self, action: &str, err: &anyhow::Error) {
        log::error!("{action} failed: {err:#}");
        self.status_message = format!("Error: {action} failed");
    }
}
