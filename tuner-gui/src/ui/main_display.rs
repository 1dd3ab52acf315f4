//! # Main Display Module
//!
//! Layout of the tuner window: controls on top, the cent meter, the
//! readouts, and the input level bar.

use iced::widget::{button, column, container, pick_list, progress_bar, row, slider, text, Space};
use iced::{Alignment, Color, Element, Length};
use tuner_core::{Classification, DetectionMode, TunerOutput};

use super::cent_meter::{self, CentMeter};

/// Range offered by the reference pitch slider, in Hz.
const REFERENCE_PITCH_RANGE: std::ops::RangeInclusive<f32> = 415.0..=466.0;

/// Modes offered by the picker.
static MODES: [DetectionMode; 2] = DetectionMode::ALL;

/// Creates the complete main application view
pub fn create_main_view(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let title = text("Violin Tuner").size(28);

    let controls = create_controls(data);

    let reading = match data.last_report.as_ref().map(|r| &r.output) {
        Some(TunerOutput::Reading(reading)) => Some(reading),
        _ => None,
    };

    let meter = CentMeter::new(reading.map(|r| (r.cents, r.classification))).view();

    // --- Readouts ---
    let (note, freq, cents, target, color) = match reading {
        Some(r) => (
            r.nearest_note.clone(),
            format!("{:.2} Hz", r.frequency_hz),
            format!("{:+.1} cents", r.cents),
            format!("Target: {} ({:.2} Hz)", r.target_label, r.target_hz),
            cent_meter::classification_color(r.classification),
        ),
        None => (
            "--".to_string(),
            "0.00 Hz".to_string(),
            "0.0 cents".to_string(),
            "Target: --".to_string(),
            Color::from_rgb8(0x90, 0x90, 0x90),
        ),
    };

    let badge = if reading.is_some_and(|r| r.classification == Classification::InTune) {
        text("IN TUNE")
            .size(18)
            .color(cent_meter::classification_color(Classification::InTune))
    } else {
        text("")
    };

    let readout = row![
        text(note).size(64).color(color),
        Space::with_width(30),
        column![text(freq).size(22), text(cents).size(22).color(color), badge].spacing(4),
    ]
    .align_y(Alignment::Center);

    let level = data.last_report.as_ref().map_or(0.0, |r| r.level);
    let level_bar = column![
        text("Input level").size(14),
        progress_bar(0.0..=1.0, level).height(Length::Fixed(8.0)),
    ]
    .spacing(4);

    let content = column![
        title,
        controls,
        meter,
        readout,
        text(target).size(18),
        level_bar,
        text(data.status.clone()).size(14),
    ]
    .spacing(16)
    .padding(20);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Start/stop button, mode picker and reference pitch slider.
fn create_controls(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let toggle_label = if data.listening { "Stop" } else { "Start microphone" };
    let toggle = button(text(toggle_label)).on_press(crate::Message::ToggleListening);

    let mode = pick_list(
        &MODES[..],
        Some(data.config.mode),
        crate::Message::ModeSelected,
    );

    let reference = data.config.reference_pitch();
    let reference_slider = slider(
        REFERENCE_PITCH_RANGE,
        reference,
        crate::Message::ReferencePitchChanged,
    )
    .step(1.0)
    .width(Length::Fixed(200.0));

    row![
        toggle,
        Space::with_width(20),
        mode,
        Space::with_width(20),
        text(format!("A4 = {:.0} Hz", reference)),
        reference_slider,
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}
