use std::path::{Path, PathBuf};

use super::analysis::average_spectrum;
use super::decimate::{decimate, processed_path, split_lines, write_lines, KeptLine};
use super::error::ProcessError;
use super::model::{AverageSpectrum, ProcessingParams, SpectralTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Result of one run of the decimate/average transform.
#[derive(Debug, Clone)]
pub struct ProcessedData {
    pub source: PathBuf,
    pub processed_path: PathBuf,
    /// Lines in the raw file, header included.
    pub raw_lines: usize,
    /// Lines written to `processed_path`, header included.
    pub kept_lines: usize,
    pub table: SpectralTable,
    pub spectrum: AverageSpectrum,
}

/// Decimate `path`, write the decimated copy beside it, then parse and average.
///
/// Expected layout:
///
/// ```text
/// 1419.80 1419.90 1420.00 ...    <- header: frequency bins in MHz
/// -71.2   -70.9   -65.3   ...    <- one row per acquisition
/// ```
///
/// The decimated copy is always written, even when parsing it fails.
pub fn process_file(path: &Path, params: &ProcessingParams) -> Result<ProcessedData, ProcessError> {
    params.validate()?;

    let text = std::fs::read_to_string(path).map_err(|source| ProcessError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let lines = split_lines(&text);
    let kept = decimate(&lines, &params.decimation);
    log::debug!(
        "{}: kept {} of {} lines",
        path.display(),
        kept.len(),
        lines.len()
    );

    let processed_path = processed_path(path);
    if !kept.is_empty() {
        write_lines(&processed_path, &kept)?;
    }

    let table = parse_table(&kept)?;
    let spectrum = average_spectrum(&table)?;

    Ok(ProcessedData {
        source: path.to_path_buf(),
        processed_path,
        raw_lines: lines.len(),
        kept_lines: kept.len(),
        table,
        spectrum,
    })
}

// ---------------------------------------------------------------------------
// Whitespace-delimited table parser
// ---------------------------------------------------------------------------

/// Parse decimated lines: the first is the header, the rest numeric rows.
/// Blank lines are skipped.
pub fn parse_table(lines: &[KeptLine<'_>]) -> Result<SpectralTable, ProcessError> {
    let (header, rows) = lines.split_first().ok_or(ProcessError::MissingHeader)?;

    let labels: Vec<&str> = header.text.split_whitespace().collect();
    if labels.is_empty() {
        return Err(ProcessError::MissingHeader);
    }
    let mut table = SpectralTable::new(&labels)?;

    let mut values = Vec::with_capacity(labels.len());
    for line in rows {
        let line_no = line.index + 1;
        let tokens: Vec<&str> = line.text.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() != labels.len() {
            return Err(ProcessError::Ragged {
                line: line_no,
                expected: labels.len(),
                found: tokens.len(),
            });
        }

        values.clear();
        for (tok, label) in tokens.iter().zip(&labels) {
            let v = tok.parse::<f64>().map_err(|_| ProcessError::Parse {
                line: line_no,
                label: label.to_string(),
                token: tok.to_string(),
            })?;
            values.push(v);
        }
        table.push_row(&values);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::data::model::Decimation;

    /// Scratch directory unique to one test.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "poam-analyzer-{}-{name}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn kept(text: &str) -> Vec<KeptLine<'_>> {
        split_lines(text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| KeptLine { index, text })
            .collect()
    }

    #[test]
    fn processes_reference_example() {
        let dir = scratch_dir("reference");
        let input = dir.join("obs.txt");
        std::fs::write(
            &input,
            "0.0 100.0 200.0\n1 2 3\n4 5 6\n7 8 9\n10 11 12\n",
        )
        .unwrap();

        let data = process_file(&input, &ProcessingParams::default()).unwrap();

        assert_eq!(data.processed_path, dir.join("obs_processed.txt"));
        assert_eq!(
            std::fs::read_to_string(&data.processed_path).unwrap(),
            "0.0 100.0 200.0\n1 2 3\n7 8 9\n"
        );
        assert_eq!(data.raw_lines, 5);
        assert_eq!(data.kept_lines, 3);
        assert_eq!(data.table.row_count(), 2);
        assert_approx_eq!(data.spectrum.mean_of("0.0").unwrap(), 4.0);
        assert_approx_eq!(data.spectrum.mean_of("100.0").unwrap(), 5.0);
        assert_approx_eq!(data.spectrum.mean_of("200.0").unwrap(), 6.0);
    }

    #[test]
    fn processed_file_has_header_width_on_every_line() {
        let dir = scratch_dir("width");
        let input = dir.join("wide.txt");
        let mut text = String::from("1420.0 1420.1 1420.2 1420.3\n");
        for i in 0..7 {
            text.push_str(&format!("{i}  {i}\t{i} {i}\n"));
        }
        std::fs::write(&input, &text).unwrap();

        let data = process_file(&input, &ProcessingParams::default()).unwrap();
        let written = std::fs::read_to_string(&data.processed_path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 1 + 4);
        assert!(lines.iter().all(|l| l.split_whitespace().count() == 4));
    }

    #[test]
    fn header_only_file_is_empty_but_still_written() {
        let dir = scratch_dir("header-only");
        let input = dir.join("h.txt");
        std::fs::write(&input, "1420.0 1421.0\n").unwrap();

        let err = process_file(&input, &ProcessingParams::default()).unwrap_err();
        assert!(matches!(err, ProcessError::Empty));
        assert!(dir.join("h_processed.txt").exists());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = scratch_dir("missing");
        let err = process_file(&dir.join("nope.txt"), &ProcessingParams::default()).unwrap_err();
        assert!(matches!(err, ProcessError::Read { .. }));
    }

    #[test]
    fn empty_file_has_no_header() {
        let dir = scratch_dir("empty");
        let input = dir.join("e.txt");
        std::fs::write(&input, "").unwrap();
        let err = process_file(&input, &ProcessingParams::default()).unwrap_err();
        assert!(matches!(err, ProcessError::MissingHeader));
    }

    #[test]
    fn invalid_params_fail_before_touching_disk() {
        let dir = scratch_dir("params");
        let input = dir.join("p.txt");
        std::fs::write(&input, "1.0\n1\n").unwrap();
        let params = ProcessingParams {
            decimation: Decimation {
                stride: 0,
                phase: 0,
            },
            ..Default::default()
        };
        assert!(matches!(
            process_file(&input, &params),
            Err(ProcessError::InvalidParams(_))
        ));
        assert!(!dir.join("p_processed.txt").exists());
    }

    #[test]
    fn ragged_row_reports_original_line() {
        let err = parse_table(&kept("1.0 2.0\n1 2\n3\n")).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Ragged {
                line: 3,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn non_numeric_cell_is_a_parse_error() {
        let err = parse_table(&kept("1.0 2.0\n1 x\n")).unwrap_err();
        match err {
            ProcessError::Parse { line, label, token } => {
                assert_eq!(line, 2);
                assert_eq!(label, "2.0");
                assert_eq!(token, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        let table = parse_table(&kept("1.0 2.0\n\n1 2\n   \n3 4\n")).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.bin("2.0"), Some((2.0, &[2.0, 4.0][..])));
    }

    #[test]
    fn header_labels_are_kept_verbatim() {
        let table = parse_table(&kept("1420.00 1420.05\n1 2\n")).unwrap();
        assert_eq!(table.labels(), &["1420.00".to_string(), "1420.05".to_string()]);
        assert_eq!(table.frequencies_mhz(), &[1420.0, 1420.05]);
    }
}
