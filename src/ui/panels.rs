use anyhow::Result;
use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, PlotKind};

// ---------------------------------------------------------------------------
// Left side panel – input, parameters, frequency selection
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Input");
    ui.separator();

    match &state.input_path {
        Some(path) => ui.label(path.display().to_string()),
        None => ui.label("No file selected."),
    };
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Browse…").clicked() {
            open_file_dialog(state);
        }
        let process = egui::Button::new(RichText::new("Process Data").strong());
        if ui.add_enabled(state.input_path.is_some(), process).clicked() {
            run_process(state);
        }
    });
    ui.add_space(8.0);

    ui.heading("Processing");
    ui.separator();
    params_grid(ui, state);
    ui.add_space(8.0);

    ui.heading("Frequency");
    ui.separator();
    frequency_selector(ui, state);

    ui.horizontal(|ui: &mut Ui| {
        for kind in [PlotKind::Spectrum, PlotKind::TimeSeries] {
            let text = match kind {
                PlotKind::Spectrum => "Save Freq Plot",
                PlotKind::TimeSeries => "Save Time Plot",
            };
            if ui
                .add_enabled(state.has_plot(kind), egui::Button::new(text))
                .clicked()
            {
                save_plot_dialog(state, kind);
            }
        }
    });
    ui.add_space(8.0);

    if let Some(data) = &state.data {
        egui::CollapsingHeader::new(RichText::new("Average spectrum").strong())
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                let bins = &data.spectrum.bins;
                TableBuilder::new(ui)
                    .striped(true)
                    .column(Column::auto())
                    .column(Column::remainder())
                    .max_scroll_height(260.0)
                    .header(18.0, |mut header| {
                        header.col(|ui: &mut Ui| {
                            ui.strong("MHz");
                        });
                        header.col(|ui: &mut Ui| {
                            ui.strong("Mean (dBm)");
                        });
                    })
                    .body(|body| {
                        body.rows(16.0, bins.len(), |mut row| {
                            let bin = &bins[row.index()];
                            row.col(|ui: &mut Ui| {
                                ui.label(&bin.label);
                            });
                            row.col(|ui: &mut Ui| {
                                ui.label(format!("{:.3}", bin.mean));
                            });
                        });
                    });
            });
    }
}

fn params_grid(ui: &mut Ui, state: &mut AppState) {
    let mut interval_changed = false;

    egui::Grid::new("params")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            let decimation = &mut state.params.decimation;

            ui.label("Keep every");
            ui.add(
                egui::DragValue::new(&mut decimation.stride)
                    .range(1..=64)
                    .suffix(" rows"),
            );
            ui.end_row();

            ui.label("Starting at row");
            let max_phase = decimation.stride.saturating_sub(1);
            decimation.phase = decimation.phase.min(max_phase);
            ui.add(egui::DragValue::new(&mut decimation.phase).range(0..=max_phase));
            ui.end_row();

            ui.label("Sample interval");
            interval_changed = ui
                .add(
                    egui::DragValue::new(&mut state.params.sample_interval_s)
                        .range(0.0001..=60.0)
                        .speed(0.0001)
                        .max_decimals(4)
                        .suffix(" s"),
                )
                .changed();
            ui.end_row();
        });

    if ui.small_button("Reset defaults").clicked() {
        state.params = Default::default();
        interval_changed = true;
    }

    if interval_changed {
        let result = state.refresh_time_series();
        report(state, "Updating the time series", result);
    }
}

fn frequency_selector(ui: &mut Ui, state: &mut AppState) {
    let Some(data) = &state.data else {
        ui.label("Process a file to pick a frequency.");
        return;
    };

    // Clone what we need so we can mutate state inside the closure.
    let labels = data.table.labels().to_vec();
    let current = state.selected_frequency.clone().unwrap_or_default();
    let mut picked = None;

    egui::ComboBox::from_id_salt("frequency")
        .selected_text(format!("{current} MHz"))
        .show_ui(ui, |ui: &mut Ui| {
            for label in &labels {
                if ui.selectable_label(current == *label, label).clicked() {
                    picked = Some(label.clone());
                }
            }
        });

    if let Some(label) = picked {
        let result = state.select_frequency(&label);
        report(state, "Plotting the time series", result);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.input_path.is_some(), egui::Button::new("Process"))
                .clicked()
            {
                run_process(state);
                ui.close_menu();
            }
            ui.separator();
            for kind in [PlotKind::Spectrum, PlotKind::TimeSeries] {
                let enabled = state.has_plot(kind);
                let text = format!("Save {} plot…", kind.label());
                if ui.add_enabled(enabled, egui::Button::new(text)).clicked() {
                    save_plot_dialog(state, kind);
                    ui.close_menu();
                }
                let text = format!("Export {} data…", kind.label());
                if ui.add_enabled(enabled, egui::Button::new(text)).clicked() {
                    export_data_dialog(state, kind);
                    ui.close_menu();
                }
            }
        });

        ui.separator();

        if let Some(data) = &state.data {
            let freqs = data.table.frequencies_mhz();
            let (lo, hi) = freqs
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &f| {
                    (lo.min(f), hi.max(f))
                });
            ui.label(format!(
                "{} rows × {} bins, {lo:.3}–{hi:.3} MHz ({} of {} lines kept)",
                data.table.row_count(),
                data.table.width(),
                data.kept_lines,
                data.raw_lines
            ));
        }
    });
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

pub fn status_bar(ui: &mut Ui, state: &AppState) {
    let text = RichText::new(&state.status_message).small();
    if state.status_message.starts_with("Error") {
        ui.label(text.color(Color32::RED));
    } else {
        ui.label(text);
    }
}

// ---------------------------------------------------------------------------
// Dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Select Data File")
        .add_filter("Text files", &["txt"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        state.set_input(path);
    }
}

fn run_process(state: &mut AppState) {
    let result = state.process();
    report(state, "Processing", result);
}

fn save_plot_dialog(state: &mut AppState, kind: PlotKind) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Save Plot As")
        .add_filter("PNG files", &["png"])
        .add_filter("JPEG files", &["jpg", "jpeg"])
        .add_filter("SVG files", &["svg"])
        .add_filter("PDF files", &["pdf"]);
    if let Some(default) = state.default_plot_path(kind) {
        dialog = with_default_name(dialog, &default);
    }

    if let Some(path) = dialog.save_file() {
        let result = state.save_plot(kind, &path);
        report(state, "Saving the plot", result);
    }
}

fn export_data_dialog(state: &mut AppState, kind: PlotKind) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Export Data As")
        .add_filter("CSV files", &["csv"])
        .add_filter("JSON files", &["json"]);
    if let Some(default) = state.default_data_path(kind) {
        dialog = with_default_name(dialog, &default);
    }

    if let Some(path) = dialog.save_file() {
        let result = state.export_data(kind, &path);
        report(state, "Exporting data", result);
    }
}

fn with_default_name(dialog: rfd::FileDialog, default: &std::path::Path) -> rfd::FileDialog {
    let dialog = match default.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => dialog.set_directory(dir),
        None => dialog,
    };
    match default.file_name() {
        Some(name) => dialog.set_file_name(name.to_string_lossy()),
        None => dialog,
    }
}

/// Surface a failed action: status bar, log and a blocking message box.
fn report(state: &mut AppState, action: &str, result: Result<()>) {
    if let Err(e) = result {
        state.fail(action, &e);
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title("Error")
            .set_description(format!("An error occurred:\n{e:#}"))
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}
