use std::path::Path;
use std::sync::{Arc, OnceLock};

use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;

use crate::color::{PlotTheme, Rgb8};
use crate::data::model::{AverageSpectrum, TimeSeries};

/// Exported figures are 6 × 4 inches.
const FIGURE_INCHES: (u32, u32) = (6, 4);
/// Bitmap exports are rendered at print resolution.
const BITMAP_DPI: u32 = 300;
/// SVG and PDF user units per inch.
const SVG_DPI: u32 = 100;

/// Typeface used for every exported figure. plotters has no system font
/// lookup in this build, so the face is registered under `sans-serif`.
const FONT: &[u8] = epaint_default_fonts::UBUNTU_LIGHT;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unsupported image format '.{0}' (use png, jpg, jpeg, svg or pdf)")]
    UnsupportedFormat(String),
    #[error("nothing to plot")]
    NoData,
    #[error("drawing failed: {0}")]
    Draw(String),
    #[error("encoding image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("bundled font could not be loaded")]
    Font,
    #[error("converting to PDF: {0}")]
    Pdf(String),
    #[error("writing {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Export format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Svg,
    Pdf,
}

impl ExportFormat {
    /// Pick the format from the file extension. No extension means PNG.
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png")
            .to_ascii_lowercase();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            other => Err(RenderError::UnsupportedFormat(other.to_string())),
        }
    }

    fn size(self) -> (u32, u32) {
        let dpi = match self {
            Self::Png | Self::Jpeg => BITMAP_DPI,
            Self::Svg | Self::Pdf => SVG_DPI,
        };
        (FIGURE_INCHES.0 * dpi, FIGURE_INCHES.1 * dpi)
    }
}

// ---------------------------------------------------------------------------
// Figure description
// ---------------------------------------------------------------------------

/// Everything needed to draw one line plot, independent of the backend.
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub color: Rgb8,
    /// Optional vertical marker at `x`.
    pub marker_x: Option<(f64, Rgb8)>,
}

impl Figure {
    pub fn spectrum(spectrum: &AverageSpectrum, selected_mhz: Option<f64>, theme: &PlotTheme) -> Self {
        Self {
            title: "Average Amplitude Spectrum".into(),
            x_label: "Frequency (MHz)".into(),
            y_label: "Average Amplitude (dBm)".into(),
            points: spectrum.points(),
            color: theme.spectrum,
            marker_x: selected_mhz.map(|x| (x, theme.marker)),
        }
    }

    pub fn time_series(series: &TimeSeries, theme: &PlotTheme) -> Self {
        Self {
            title: format!("Time Series at {} MHz", series.label),
            x_label: "Time (s)".into(),
            y_label: "Intensity (dBm)".into(),
            points: series.xy(),
            color: theme.time_series,
            marker_x: None,
        }
    }

    /// `(x_min..x_max, y_min..y_max)`, padded so a single point still has area.
    fn ranges(&self) -> Option<(std::ops::Range<f64>, std::ops::Range<f64>)> {
        let (mut x0, mut x1, mut y0, mut y1) = self
            .points
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .fold(
                (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
                |(x0, x1, y0, y1), &(x, y)| (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
            );
        if !x0.is_finite() {
            return None;
        }
        if x1 - x0 < f64::EPSILON {
            x0 -= 0.5;
            x1 += 0.5;
        }
        let pad = if y1 - y0 < f64::EPSILON {
            0.5
        } else {
            (y1 - y0) * 0.05
        };
        y0 -= pad;
        y1 += pad;
        Some((x0..x1, y0..y1))
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Render `figure` to `path`; the format follows the extension.
pub fn save_figure(figure: &Figure, path: &Path) -> Result<(), RenderError> {
    let format = ExportFormat::from_path(path)?;
    let (w, h) = format.size();
    register_font()?;

    match format {
        ExportFormat::Svg => {
            let root = SVGBackend::new(path, (w, h)).into_drawing_area();
            draw(&root, figure, w)?;
            root.present().map_err(draw_err)?;
        }
        ExportFormat::Pdf => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, (w, h)).into_drawing_area();
                draw(&root, figure, w)?;
                root.present().map_err(draw_err)?;
            }
            let pdf = svg_to_pdf(&svg)?;
            std::fs::write(path, pdf).map_err(|source| RenderError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        ExportFormat::Png | ExportFormat::Jpeg => {
            let mut buffer = vec![0u8; (w * h * 3) as usize];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
                draw(&root, figure, w)?;
                root.present().map_err(draw_err)?;
            }
            let img = image::RgbImage::from_raw(w, h, buffer)
                .ok_or_else(|| RenderError::Draw("bitmap buffer has the wrong size".into()))?;
            let encoding = if format == ExportFormat::Png {
                image::ImageFormat::Png
            } else {
                image::ImageFormat::Jpeg
            };
            img.save_with_format(path, encoding)?;
        }
    }

    log::info!("Saved plot '{}' to {}", figure.title, path.display());
    Ok(())
}

/// Make [`FONT`] available to plotters as `sans-serif`. Runs once per process.
fn register_font() -> Result<(), RenderError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| {
        plotters::style::register_font("sans-serif", FontStyle::Normal, FONT).is_ok()
    });
    if ok {
        Ok(())
    } else {
        Err(RenderError::Font)
    }
}

/// Convert a rendered SVG document to a single-page PDF of the same size.
fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, RenderError> {
    use svg2pdf::usvg;

    let mut fonts = usvg::fontdb::Database::new();
    fonts.load_font_data(FONT.to_vec());
    let family = fonts
        .faces()
        .next()
        .and_then(|face| face.families.first())
        .map(|(name, _)| name.clone())
        .ok_or(RenderError::Font)?;
    fonts.set_sans_serif_family(family.clone());

    let options = usvg::Options {
        font_family: family,
        fontdb: Arc::new(fonts),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| RenderError::Pdf(e.to_string()))?;
    let page = svg2pdf::PageOptions {
        dpi: SVG_DPI as f32,
    };
    svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), page)
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    width: u32,
) -> Result<(), RenderError> {
    let (x_range, y_range) = figure.ranges().ok_or(RenderError::NoData)?;
    let (y_min, y_max) = (y_range.start, y_range.end);
    // Font sizes are tuned for a 600 px wide figure.
    let scale = |base: u32| (base * width / 600) as i32;

    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(root)
        .margin(scale(10))
        .caption(&figure.title, ("sans-serif", scale(18)).into_font())
        .x_label_area_size(scale(40))
        .y_label_area_size(scale(60))
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .label_style(("sans-serif", scale(12)).into_font())
        .axis_desc_style(("sans-serif", scale(14)).into_font())
        .draw()
        .map_err(draw_err)?;

    let color = figure.color.plotters();
    chart
        .draw_series(LineSeries::new(
            figure.points.iter().copied(),
            color.stroke_width((width / 600).max(1)),
        ))
        .map_err(draw_err)?;

    if let Some((x, marker)) = figure.marker_x {
        let style = marker.plotters().mix(0.5).stroke_width((width / 600).max(1));
        chart
            .draw_series(DashedLineSeries::new(
                [(x, y_min), (x, y_max)],
                scale(8),
                scale(5),
                style,
            ))
            .map_err(draw_err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::data::analysis::{average_spectrum, time_series};
    use crate::data::model::SpectralTable;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("poam-analyzer-{}-render", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn table() -> SpectralTable {
        let mut t = SpectralTable::new(&["1420.0", "1420.5", "1421.0"]).unwrap();
        t.push_row(&[-70.0, -65.0, -71.0]);
        t.push_row(&[-69.0, -64.0, -70.5]);
        t
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a.PNG")).unwrap(), ExportFormat::Png);
        assert_eq!(ExportFormat::from_path(Path::new("a.jpeg")).unwrap(), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_path(Path::new("a.svg")).unwrap(), ExportFormat::Svg);
        assert_eq!(ExportFormat::from_path(Path::new("a.pdf")).unwrap(), ExportFormat::Pdf);
        assert_eq!(ExportFormat::from_path(Path::new("a")).unwrap(), ExportFormat::Png);
        assert!(matches!(
            ExportFormat::from_path(Path::new("a.tiff")),
            Err(RenderError::UnsupportedFormat(e)) if e == "tiff"
        ));
    }

    #[test]
    fn png_export_is_print_resolution() {
        let spectrum = average_spectrum(&table()).unwrap();
        let fig = Figure::spectrum(&spectrum, Some(1420.5), &PlotTheme::default());
        let path = scratch("spectrum.png");
        save_figure(&fig, &path).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (1800, 1200));
    }

    #[test]
    fn png_export_draws_title_and_axis_text() {
        let spectrum = average_spectrum(&table()).unwrap();
        let theme = PlotTheme::default();
        let plain = Figure::spectrum(&spectrum, None, &theme);
        let mut relabelled = plain.clone();
        relabelled.title = "Calibration Spectrum".into();
        relabelled.x_label = "Channel (MHz)".into();

        let a = scratch("labels-a.png");
        let b = scratch("labels-b.png");
        save_figure(&plain, &a).unwrap();
        save_figure(&relabelled, &b).unwrap();

        let a = image::open(&a).unwrap().to_rgb8();
        let b = image::open(&b).unwrap().to_rgb8();
        assert_ne!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn pdf_export_is_a_pdf_document() {
        let spectrum = average_spectrum(&table()).unwrap();
        let fig = Figure::spectrum(&spectrum, Some(1420.5), &PlotTheme::default());
        let path = scratch("spectrum.pdf");
        save_figure(&fig, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn svg_export_contains_title() {
        let series = time_series(&table(), "1420.5", 0.0529).unwrap();
        let fig = Figure::time_series(&series, &PlotTheme::default());
        let path = scratch("series.svg");
        save_figure(&fig, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Time Series at 1420.5 MHz"));
        assert!(svg.contains("Intensity (dBm)"));
    }

    #[test]
    fn spectrum_marker_is_dashed() {
        let spectrum = average_spectrum(&table()).unwrap();
        let theme = PlotTheme::default();
        let polylines = |fig: &Figure, name: &str| {
            let path = scratch(name);
            save_figure(fig, &path).unwrap();
            std::fs::read_to_string(&path).unwrap().matches("<polyline").count()
        };

        let without = polylines(&Figure::spectrum(&spectrum, None, &theme), "no-marker.svg");
        let with = polylines(&Figure::spectrum(&spectrum, Some(1420.5), &theme), "marker.svg");
        // One solid marker would add a single path; dashes add one per segment.
        assert!(with >= without + 5, "{without} -> {with}");
    }

    #[test]
    fn single_point_still_renders() {
        let mut t = SpectralTable::new(&["1420.0"]).unwrap();
        t.push_row(&[-70.0]);
        let series = time_series(&t, "1420.0", 0.0529).unwrap();
        let fig = Figure::time_series(&series, &PlotTheme::default());
        save_figure(&fig, &scratch("one.jpg")).unwrap();
    }

    #[test]
    fn empty_figure_is_rejected() {
        let fig = Figure {
            title: "empty".into(),
            x_label: String::new(),
            y_label: String::new(),
            points: Vec::new(),
            color: Rgb8(0, 0, 0),
            marker_x: None,
        };
        assert!(matches!(
            save_figure(&fig, &scratch("empty.png")),
            Err(RenderError::NoData)
        ));
    }
}
