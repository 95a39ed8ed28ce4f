//! # Fretboard Widget
//!
//! Draws the first twelve frets of a standard-tuned guitar with a dot on
//! every fret that plays a note of the current scale. Open strings get their
//! dot left of the nut.

use iced::widget::canvas::{self, event, Event, Fill, Geometry, Path, Stroke, Text};
use iced::widget::container;
use iced::{alignment, mouse, Color, Element, Length, Pixels, Point, Rectangle, Renderer, Theme};
use wheel_core::tuning::{FRET_COUNT, FretPosition, GUITAR_TUNING};

/// Layout in drawing units, scaled to the widget width.
const FRET_WIDTH: f32 = 60.0;
const STRING_SPACING: f32 = 30.0;
const START_X: f32 = 50.0;
const START_Y: f32 = 30.0;
const DOT_RADIUS: f32 = 12.0;
const DRAWING_WIDTH: f32 = START_X + FRET_COUNT as f32 * FRET_WIDTH + 20.0;

const ROOT_DOT: Color = Color::from_rgb(0.95, 0.55, 0.20);
const SCALE_DOT: Color = Color::from_rgb(0.20, 0.45, 0.75);

/// Scale notes on the guitar neck.
#[derive(Debug, Clone)]
pub struct Fretboard {
    positions: Vec<FretPosition>,
}

impl Fretboard {
    pub fn new(positions: Vec<FretPosition>) -> Self {
        Self { positions }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        let height = START_Y * 2.0 + (GUITAR_TUNING.len() - 1) as f32 * STRING_SPACING + 20.0;
        container(
            canvas::Canvas::new(self)
                .width(Length::Fill)
                .height(Length::Fixed(height)),
        )
        .into()
    }
}

fn grid_stroke(width: f32) -> Stroke<'static> {
    Stroke::default()
        .with_color(Color::from_rgb(0.6, 0.6, 0.6))
        .with_width(width)
}

impl<Message> canvas::Program<Message> for Fretboard {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        _event: Event,
        _bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        (event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let scale = (bounds.width / DRAWING_WIDTH).min(1.0);
        let at = |x: f32, y: f32| Point::new(x * scale, y * scale);
        let last_string_y = START_Y + (GUITAR_TUNING.len() - 1) as f32 * STRING_SPACING;

        // Frets, with the nut drawn heavier.
        for fret in 0..=FRET_COUNT {
            let x = START_X + fret as f32 * FRET_WIDTH;
            let width = if fret == 0 { 4.0 } else { 1.0 };
            frame.stroke(&Path::line(at(x, START_Y), at(x, last_string_y)), grid_stroke(width));
            if fret > 0 {
                frame.fill_text(Text {
                    content: fret.to_string(),
                    position: at(x - FRET_WIDTH / 2.0, last_string_y + 22.0),
                    color: Color::from_rgb(0.6, 0.6, 0.6),
                    size: Pixels(12.0 * scale.max(0.5)),
                    horizontal_alignment: alignment::Horizontal::Center,
                    vertical_alignment: alignment::Vertical::Center,
                    ..Text::default()
                });
            }
        }

        for string in 0..GUITAR_TUNING.len() {
            let y = START_Y + string as f32 * STRING_SPACING;
            let end_x = START_X + FRET_COUNT as f32 * FRET_WIDTH;
            frame.stroke(&Path::line(at(START_X, y), at(end_x, y)), grid_stroke(1.0));
        }

        for position in &self.positions {
            let x = if position.fret == 0 {
                START_X - 20.0
            } else {
                START_X + position.fret as f32 * FRET_WIDTH - FRET_WIDTH / 2.0
            };
            let y = START_Y + position.string as f32 * STRING_SPACING;
            let color = if position.is_root { ROOT_DOT } else { SCALE_DOT };
            frame.fill(&Path::circle(at(x, y), DOT_RADIUS * scale), Fill::from(color));
        }

        vec![frame.into_geometry()]
    }
}
