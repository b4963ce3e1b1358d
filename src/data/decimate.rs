use std::path::{Component, Path, PathBuf};

use super::error::ProcessError;
use super::model::Decimation;

// ---------------------------------------------------------------------------
// Line-level decimation
// ---------------------------------------------------------------------------

/// A line of the raw file that survived decimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeptLine<'a> {
    /// 0-based index in the raw file.
    pub index: usize,
    /// Line text including its terminator, if it had one.
    pub text: &'a str,
}

/// Split `text` into lines, keeping terminators so the output can be written
/// back byte-for-byte.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Keep the header and every line selected by `decimation`.
pub fn decimate<'a>(lines: &[&'a str], decimation: &Decimation) -> Vec<KeptLine<'a>> {
    lines
        .iter()
        .enumerate()
        .filter(|(i, _)| decimation.keeps(*i))
        .map(|(index, &text)| KeptLine { index, text })
        .collect()
}

/// Where the decimated copy of `input` is written.
///
/// A leading `./` is dropped and the extension is replaced:
/// `./obs/run1.txt` → `obs/run1_processed.txt`.
pub fn processed_path(input: &Path) -> PathBuf {
    derived_path(input, "_processed.txt")
}

/// `input` with its extension replaced by `suffix` (e.g. `_freq_plot.png`).
pub fn derived_path(input: &Path, suffix: &str) -> PathBuf {
    let cleaned: PathBuf = input
        .components()
        .skip_while(|c| matches!(c, Component::CurDir))
        .collect();
    let stem = cleaned
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    cleaned.with_file_name(format!("{stem}{suffix}"))
}

/// Write the kept lines verbatim. Not atomic: an existing file is truncated.
pub fn write_lines(path: &Path, lines: &[KeptLine<'_>]) -> Result<(), ProcessError> {
    let body: String = lines.iter().map(|l| l.text).collect();
    std::fs::write(path, body).map_err(|source| ProcessError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(kept: &[KeptLine<'a>]) -> Vec<&'a str> {
        kept.iter().map(|l| l.text).collect()
    }

    #[test]
    fn keeps_header_plus_ceil_half_of_data_rows() {
        for data_rows in 0..9usize {
            let mut text = String::from("0.0 1.0\n");
            for i in 0..data_rows {
                text.push_str(&format!("{i} {i}\n"));
            }
            let lines = split_lines(&text);
            let kept = decimate(&lines, &Decimation::default());
            assert_eq!(kept.len(), 1 + data_rows.div_ceil(2), "D = {data_rows}");
            assert_eq!(kept[0].text, "0.0 1.0\n");
        }
    }

    #[test]
    fn preserves_line_terminators() {
        let text = "a b\r\n1 2\r\n3 4\r\n5 6";
        let lines = split_lines(text);
        let kept = decimate(&lines, &Decimation::default());
        assert_eq!(texts(&kept), vec!["a b\r\n", "1 2\r\n", "5 6"]);
        assert_eq!(
            kept.iter().map(|l| l.index).collect::<Vec<_>>(),
            vec![0, 1, 3]
        );
    }

    #[test]
    fn no_decimation_keeps_everything() {
        let lines = split_lines("h\n1\n2\n3\n");
        let all = Decimation {
            stride: 1,
            phase: 0,
        };
        assert_eq!(decimate(&lines, &all).len(), 4);
    }

    #[test]
    fn applying_twice_differs_from_once() {
        let text: String = (0..9).map(|i| format!("{i}\n")).collect();
        let lines = split_lines(&text);
        let once: String = texts(&decimate(&lines, &Decimation::default())).concat();
        let once_lines = split_lines(&once);
        let twice = decimate(&once_lines, &Decimation::default());
        assert_eq!(once, "0\n1\n3\n5\n7\n");
        assert_eq!(texts(&twice), vec!["0\n", "1\n", "5\n"]);
    }

    #[test]
    fn processed_path_strips_current_dir_and_extension() {
        assert_eq!(
            processed_path(Path::new("./obs/run1.txt")),
            PathBuf::from("obs/run1_processed.txt")
        );
        assert_eq!(
            processed_path(Path::new("/data/run.2024.txt")),
            PathBuf::from("/data/run.2024_processed.txt")
        );
        assert_eq!(
            processed_path(Path::new("capture")),
            PathBuf::from("capture_processed.txt")
        );
    }

    #[test]
    fn derived_plot_names() {
        assert_eq!(
            derived_path(Path::new("obs/run1.txt"), "_freq_plot.png"),
            PathBuf::from("obs/run1_freq_plot.png")
        );
    }
}
