use super::error::ProcessError;
use super::model::{
    validate_interval, AverageSpectrum, SeriesPoint, SpectralTable, SpectrumBin, TimeSeries,
};

/// Mean of every column down the rows.
///
/// NaN samples are skipped. An empty table, or a column with nothing but NaN,
/// is an error rather than a NaN-filled spectrum.
pub fn average_spectrum(table: &SpectralTable) -> Result<AverageSpectrum, ProcessError> {
    if table.is_empty() {
        return Err(ProcessError::Empty);
    }

    let bins = table
        .bins()
        .map(|(label, frequency_mhz, samples)| {
            let (sum, n) = samples
                .iter()
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            if n == 0 {
                return Err(ProcessError::NoSamples(label.to_string()));
            }
            Ok(SpectrumBin {
                label: label.to_string(),
                frequency_mhz,
                mean: sum / n as f64,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AverageSpectrum { bins })
}

/// Lay out one column against elapsed time, `t[i] = i * interval_s`.
///
/// `label` must match a header label exactly.
pub fn time_series(
    table: &SpectralTable,
    label: &str,
    interval_s: f64,
) -> Result<TimeSeries, ProcessError> {
    validate_interval(interval_s)?;

    let (frequency_mhz, samples) = table
        .bin(label)
        .ok_or_else(|| ProcessError::UnknownFrequency(label.to_string()))?;

    let points = samples
        .iter()
        .enumerate()
        .map(|(i, &intensity)| SeriesPoint {
            time_s: i as f64 * interval_s,
            intensity,
        })
        .collect();

    Ok(TimeSeries {
        label: label.to_string(),
        frequency_mhz,
        interval_s,
        points,
    })
}
