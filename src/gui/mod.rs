pub mod theme;

use crate::animation::{AnimationDriver, MeterFrame};
use crate::audio::{
    list_input_devices, AnalyzerConfig, AudioDeviceDescriptor, CaptureSession, DeviceSelector,
    FrequencySource,
};
use crate::level::{MAX_DB, MIN_DB};
use crate::meter::calculate_cell_colors;
use crate::error::AudioError;
use eframe::egui;

/// Error messages shown under the meter.
///
/// A failed device listing does not hide the readout of a running session,
/// and a later successful listing clears it.
#[derive(Debug, Default)]
struct InputStatus {
    session_error: Option<String>,
    listing_error: Option<String>,
}

impl InputStatus {
    fn record_listing<T>(&mut self, result: &Result<T, AudioError>) {
        self.listing_error = result.as_ref().err().map(|err| err.to_string());
    }

    fn record_session<T>(&mut self, result: &Result<T, AudioError>) {
        self.session_error = result.as_ref().err().map(|err| err.to_string());
    }

    /// The error that replaces the level readout, if any.
    fn readout_blocker(&self) -> Option<&str> {
        self.session_error.as_deref()
    }

    fn listing_error(&self) -> Option<&str> {
        self.listing_error.as_deref()
    }
}

pub struct MeterApp {
    //
    // Audio host and the session currently feeding the meter.
    //
    host: cpal::Host,
    analyzer_config: AnalyzerConfig,
    session: Option<CaptureSession>,
    driver: AnimationDriver,

    //
    // Device picker state.
    //
    devices: Vec<AudioDeviceDescriptor>,
    selected: DeviceSelector,

    last_frame: Option<MeterFrame>,
    peak_hz: Option<f32>,
    status: InputStatus,
}

impl MeterApp {
    pub fn new(
        _cc: &eframe::CreationContext,
        host: cpal::Host,
        analyzer_config: AnalyzerConfig,
        selector: DeviceSelector,
    ) -> Self {
        let mut app = Self {
            host,
            analyzer_config,
            session: None,
            driver: AnimationDriver::new(analyzer_config.frequency_bin_count()),
            devices: Vec::new(),
            selected: selector.clone(),
            last_frame: None,
            peak_hz: None,
            status: InputStatus::default(),
        };

        app.refresh_devices();
        app.open_session(selector);
        app
    }

    fn refresh_devices(&mut self) {
        let listing = list_input_devices(&self.host);
        self.status.record_listing(&listing);
        match listing {
            Ok(devices) => self.devices = devices,
            Err(err) => log::error!("Failed to list input devices: {}", err),
        }
    }

    /// Tears down the current session, then opens `selector`.
    fn open_session(&mut self, selector: DeviceSelector) {
        self.close_session();

        self.selected = selector;
        let opened = CaptureSession::open(&self.host, &self.selected, self.analyzer_config);
        self.status.record_session(&opened);
        match opened {
            Ok(session) => {
                self.driver = AnimationDriver::new(session.frequency_bin_count());
                self.session = Some(session);
            }
            Err(err) => log::error!("Failed to open {}: {}", self.selected, err),
        }
    }

    /// Halts the animation before releasing the stream.
    fn close_session(&mut self) {
        self.driver.stop();
        if let Some(mut session) = self.session.take() {
            session.close();
        }
        self.last_frame = None;
        self.peak_hz = None;
    }

    fn input_summary(&self) -> String {
        match &self.session {
            Some(session) => format!(
                "{} | {} Hz | {} ch | {}",
                session.device_name(),
                session.sample_rate(),
                session.channels(),
                session
                    .analyzer()
                    .map(|analyzer| analyzer.algorithm_name())
                    .unwrap_or_default()
            ),
            None => "No input".to_string(),
        }
    }

    fn draw_device_picker(&mut self, ui: &mut egui::Ui) {
        let mut choice = None;

        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Input")
                .selected_text(self.selected.to_string())
                .width(260.0)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(self.selected == DeviceSelector::Default, "System default")
                        .clicked()
                    {
                        choice = Some(DeviceSelector::Default);
                    }
                    for device in &self.devices {
                        let selector = DeviceSelector::Named(device.id.clone());
                        let label = if device.is_default {
                            format!("{} (default)", device.label)
                        } else {
                            device.label.clone()
                        };
                        if ui.selectable_label(self.selected == selector, label).clicked() {
                            choice = Some(selector);
                        }
                    }
                });

            if ui.button("Refresh").clicked() {
                self.refresh_devices();
            }

            if self.session.is_none() && ui.button("Retry").clicked() {
                choice = Some(self.selected.clone());
            }
        });

        if let Some(selector) = choice {
            if selector != self.selected || self.session.is_none() {
                self.open_session(selector);
            }
        }
    }
}

impl eframe::App for MeterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        //
        // Run one animation step; keep repainting only while it runs.
        //
        if let Some(session) = self.session.as_mut() {
            if let Some(frame) = self.driver.step(session) {
                self.last_frame = Some(frame);
                self.peak_hz = session.peak_frequency();
            }
        }
        if self.session.is_some() && self.driver.is_running() {
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            theme::draw_menu_bar(ui, &self.input_summary());
            ui.add_space(4.0);

            theme::draw_platinum_window(ui, "Input Level", |ui| {
                self.draw_device_picker(ui);
                ui.separator();

                let cells = self
                    .last_frame
                    .map(|frame| frame.cells)
                    .unwrap_or_else(|| calculate_cell_colors(0.0));
                theme::draw_meter(ui, &cells, 36.0);

                ui.add_space(6.0);

                match (&self.last_frame, self.status.readout_blocker()) {
                    (_, Some(status)) => {
                        ui.colored_label(egui::Color32::RED, status);
                    }
                    (Some(frame), None) => {
                        ui.label(
                            egui::RichText::new(format!(
                                "{:>6.1} dBFS   ~{} dB SPL   level {:.2}   peak {}",
                                frame.dbfs,
                                frame.db_spl,
                                frame.level,
                                self.peak_hz
                                    .map(|hz| format!("{:.0} Hz", hz))
                                    .unwrap_or_else(|| "-".to_string())
                            ))
                            .monospace(),
                        );
                    }
                    (None, None) => {
                        ui.label(format!("Waiting for audio ({} to {} dBFS)", MIN_DB, MAX_DB));
                    }
                }

                if let Some(listing) = self.status.listing_error() {
                    ui.colored_label(egui::Color32::DARK_RED, listing);
                }
            });
        });
    }
}

impl Drop for MeterApp {
    fn drop(&mut self) {
        self.close_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_failure_does_not_hide_the_readout() {
        let mut status = InputStatus::default();
        status.record_session(&Ok::<(), AudioError>(()));
        status.record_listing(&Err::<(), _>(AudioError::PlatformUnavailable(
            "host went away".to_string(),
        )));

        assert_eq!(status.readout_blocker(), None);
        assert!(status.listing_error().unwrap().contains("host went away"));

        status.record_listing(&Ok::<(), AudioError>(()));
        assert_eq!(status.listing_error(), None);
    }

    #[test]
    fn session_failure_blocks_until_reopened() {
        let mut status = InputStatus::default();
        status.record_session(&Err::<(), _>(AudioError::HardwareBusy("in use".to_string())));
        assert!(status.readout_blocker().unwrap().contains("in use"));

        // A successful refresh leaves the session error alone.
        status.record_listing(&Ok::<(), AudioError>(()));
        assert!(status.readout_blocker().is_some());

        status.record_session(&Ok::<(), AudioError>(()));
        assert_eq!(status.readout_blocker(), None);
    }
}
