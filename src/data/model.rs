use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::ProcessError;

/// Sampling interval of the acquisition system, in seconds.
pub const DEFAULT_SAMPLE_INTERVAL_S: f64 = 0.0529;

// ---------------------------------------------------------------------------
// Processing parameters
// ---------------------------------------------------------------------------

/// Which data lines survive decimation.
///
/// The header (line 0) is always kept. A data line at index `i` is kept when
/// `i % stride == phase`. The default (`stride = 2`, `phase = 1`) is the
/// original odd-line rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decimation {
    pub stride: usize,
    pub phase: usize,
}

impl Default for Decimation {
    fn default() -> Self {
        Self {
            stride: 2,
            phase: 1,
        }
    }
}

impl Decimation {
    /// Whether the line at `index` of the raw file is retained.
    pub fn keeps(&self, index: usize) -> bool {
        index == 0 || index % self.stride == self.phase
    }
}

/// User-tunable knobs of the transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingParams {
    pub decimation: Decimation,
    /// Time between consecutive retained rows, in seconds.
    pub sample_interval_s: f64,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            decimation: Decimation::default(),
            sample_interval_s: DEFAULT_SAMPLE_INTERVAL_S,
        }
    }
}

impl ProcessingParams {
    pub fn validate(&self) -> Result<(), ProcessError> {
        let Decimation { stride, phase } = self.decimation;
        if stride == 0 {
            return Err(ProcessError::InvalidParams(
                "decimation stride must be at least 1".into(),
            ));
        }
        if phase >= stride {
            return Err(ProcessError::InvalidParams(format!(
                "decimation phase {phase} must be below the stride {stride}"
            )));
        }
        validate_interval(self.sample_interval_s)
    }
}

pub(crate) fn validate_interval(interval_s: f64) -> Result<(), ProcessError> {
    if !interval_s.is_finite() || interval_s <= 0.0 {
        return Err(ProcessError::InvalidParams(format!(
            "sample interval must be a positive number of seconds, got {interval_s}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// SpectralTable – rows are acquisition instants, columns frequency bins
// ---------------------------------------------------------------------------

/// Parsed numeric samples keyed by the header's frequency labels.
///
/// Stored column-major since every consumer walks a single bin.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralTable {
    labels: Vec<String>,
    frequencies_mhz: Vec<f64>,
    columns: Vec<Vec<f64>>,
}

impl SpectralTable {
    /// Build an empty table from header labels. Labels must be unique and
    /// parse as a frequency in MHz.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Result<Self, ProcessError> {
        let mut seen = BTreeSet::new();
        let mut frequencies_mhz = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            if !seen.insert(label) {
                return Err(ProcessError::DuplicateLabel(label.to_string()));
            }
            let mhz = label
                .parse::<f64>()
                .map_err(|_| ProcessError::InvalidLabel(label.to_string()))?;
            frequencies_mhz.push(mhz);
        }
        Ok(Self {
            labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
            frequencies_mhz,
            columns: vec![Vec::new(); labels.len()],
        })
    }

    /// Append one acquisition. Width must match the header.
    pub(crate) fn push_row(&mut self, values: &[f64]) {
        debug_assert_eq!(values.len(), self.columns.len());
        for (column, &v) in self.columns.iter_mut().zip(values) {
            column.push(v);
        }
    }

    /// Header labels, verbatim and in header order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn frequencies_mhz(&self) -> &[f64] {
        &self.frequencies_mhz
    }

    pub fn width(&self) -> usize {
        self.labels.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Frequency and samples of the bin whose header label is exactly `label`.
    pub fn bin(&self, label: &str) -> Option<(f64, &[f64])> {
        let idx = self.labels.iter().position(|l| l == label)?;
        Some((self.frequencies_mhz[idx], &self.columns[idx]))
    }

    /// `(label, frequency, samples)` per bin in header order.
    pub fn bins(&self) -> impl Iterator<Item = (&str, f64, &[f64])> + '_ {
        self.labels
            .iter()
            .zip(&self.frequencies_mhz)
            .zip(&self.columns)
            .map(|((l, &f), c)| (l.as_str(), f, c.as_slice()))
    }
}

// ---------------------------------------------------------------------------
// AverageSpectrum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumBin {
    pub label: String,
    pub frequency_mhz: f64,
    pub mean: f64,
}

/// Per-bin mean over all retained rows, in header order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AverageSpectrum {
    pub bins: Vec<SpectrumBin>,
}

impl AverageSpectrum {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Mean for an exact header label.
    pub fn mean_of(&self, label: &str) -> Option<f64> {
        self.bins.iter().find(|b| b.label == label).map(|b| b.mean)
    }

    /// `(frequency, mean)` pairs for plotting.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.bins.iter().map(|b| (b.frequency_mhz, b.mean)).collect()
    }
}

// ---------------------------------------------------------------------------
// TimeSeries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time_s: f64,
    pub intensity: f64,
}

/// One frequency bin laid out against elapsed time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub label: String,
    pub frequency_mhz: f64,
    pub interval_s: f64,
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn xy(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.time_s, p.intensity)).collect()
    }
}
