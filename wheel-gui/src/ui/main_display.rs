//! # Main Display Module
//!
//! This module contains the main display components and layout logic
//! for the scale wheel application: the wheel on the left, the spelled
//! scale and its chords on the right, and the fretboard underneath.

use iced::widget::{button, column, container, row, text, Column, Space};
use iced::{Alignment, Background, Color, Element, Length};
use wheel_core::rotation::WheelGeometry;

use crate::widgets::{fretboard, wheel};
use crate::{AppDisplayData, ChordButton, Message};

/// Creates the complete main application view.
///
/// # Arguments
/// * `data` - Latest rendered wheel data, `None` before the first render
/// * `selected_chord` - Chord shown in the details line as (spelling, degree)
/// * `geometry` - Wheel dimensions used to map input into view-box units
pub fn create_main_view(
    data: Option<&AppDisplayData>,
    selected_chord: (usize, u8),
    geometry: WheelGeometry,
) -> Element<'static, Message> {
    log::trace!("[VIEW] Rendering GUI...");

    let Some(data) = data else {
        return container(text("Loading...").size(40))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
    };

    let wheel_panel = column![
        text("Scale Wheel").size(28),
        Space::with_height(10),
        wheel::ScaleWheelCanvas::new(data.rotation, data.in_scale, geometry).view(),
        text("Drag to turn, click a note to hear it, arrow keys step the key").size(13),
    ]
    .spacing(5)
    .align_x(Alignment::Center);

    let info_panel = column![
        create_scale_panel(data),
        Space::with_height(20),
        create_chord_panel(data, selected_chord),
    ]
    .width(Length::Fill)
    .spacing(5);

    let fretboard_panel = column![
        text("Fretboard").size(18),
        fretboard::Fretboard::new(data.fretboard.clone()).view(),
    ]
    .spacing(5);

    let main_content = column![
        row![wheel_panel, Space::with_width(30), info_panel].align_y(Alignment::Start),
        Space::with_height(20),
        fretboard_panel,
    ]
    .padding(20);

    container(main_content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Title plus one line of spelled notes per spelling.
fn create_scale_panel(data: &AppDisplayData) -> Element<'static, Message> {
    let lines = data
        .scale_lines
        .iter()
        .fold(Column::new().spacing(6), |col, line| {
            col.push(text(line.clone()).size(18))
        });

    column![text(data.title.clone()).size(24), Space::with_height(10), lines]
        .spacing(5)
        .into()
}

/// One row of chord buttons per spelling, followed by the details of the
/// selected chord.
fn create_chord_panel(
    data: &AppDisplayData,
    selected_chord: (usize, u8),
) -> Element<'static, Message> {
    let rows = data
        .chord_rows
        .iter()
        .fold(Column::new().spacing(8), |col, chords| {
            let buttons = chords.iter().fold(row![].spacing(6), |row, chord| {
                let selected = (chord.spelling, chord.degree) == selected_chord;
                row.push(make_chord_button(chord, selected))
            });
            col.push(buttons)
        });

    let details = match data.triad(selected_chord.0, selected_chord.1) {
        Some(triad) => format!(
            "{} ({}): {}",
            triad.name,
            triad.roman_numeral(),
            triad.notes_text()
        ),
        None => String::new(),
    };

    column![
        text("Chords").size(18),
        Space::with_height(5),
        rows,
        Space::with_height(10),
        text(details).size(16),
    ]
    .spacing(5)
    .into()
}

/// Chord button; the selected chord is highlighted.
fn make_chord_button(chord: &ChordButton, selected: bool) -> Element<'static, Message> {
    let mut chord_button = button(text(chord.label.clone()).size(14))
        .padding([6, 10])
        .on_press(Message::ChordPressed {
            spelling: chord.spelling,
            degree: chord.degree,
        });

    if selected {
        chord_button = chord_button.style(|_theme, _status| button::Style {
            background: Some(Background::Color(Color::from_rgb(0.95, 0.55, 0.20))),
            text_color: Color::WHITE,
            ..button::Style::default()
        });
    }

    chord_button.into()
}
