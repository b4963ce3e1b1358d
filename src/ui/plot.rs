use eframe::egui::Ui;
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints, VLine};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Averaged spectrum (left half of the central panel)
// ---------------------------------------------------------------------------

pub fn spectrum_plot(ui: &mut Ui, state: &AppState) {
    let Some(data) = &state.data else {
        placeholder(ui, "Select a file and press Process Data");
        return;
    };

    ui.strong("Average Amplitude Spectrum");
    let points: PlotPoints = data
        .spectrum
        .bins
        .iter()
        .map(|b| [b.frequency_mhz, b.mean])
        .collect();
    let marker = state.selected_mhz().zip(
        state
            .selected_frequency
            .as_deref()
            .and_then(|l| data.spectrum.mean_of(l)),
    );

    Plot::new("spectrum_plot")
        .legend(Legend::default())
        .x_axis_label("Frequency (MHz)")
        .y_axis_label("Average Amplitude (dBm)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Average")
                    .color(state.theme.spectrum.color32())
                    .width(1.5),
            );
            if let Some((mhz, mean)) = marker {
                plot_ui.vline(
                    VLine::new(mhz)
                        .name(format!("{mhz} MHz ({mean:.2} dBm)"))
                        .color(state.theme.marker.color32().gamma_multiply(0.5))
                        .style(LineStyle::Dashed { length: 6.0 }),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Time series of the selected bin (right half)
// ---------------------------------------------------------------------------

pub fn time_series_plot(ui: &mut Ui, state: &AppState) {
    let Some(series) = &state.time_series else {
        placeholder(ui, "No frequency selected");
        return;
    };

    ui.strong(format!("Time Series at {} MHz", series.label));
    let points: PlotPoints = series
        .points
        .iter()
        .map(|p| [p.time_s, p.intensity])
        .collect();

    Plot::new("time_series_plot")
        .x_axis_label("Time (s)")
        .y_axis_label("Intensity (dBm)")
        .label_formatter(|_name, value| {
            format!("Time: {:.3}s\nIntensity: {:.2} dBm", value.x, value.y)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .color(state.theme.time_series.color32())
                    .width(1.5),
            );
        });
}

fn placeholder(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(text);
    });
}
