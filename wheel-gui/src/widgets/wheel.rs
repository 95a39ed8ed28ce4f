//! # Scale Wheel Widget
//!
//! Canvas widget drawing the rotating wheel over twelve fixed note labels.
//! Pointer and touch input are converted into view-box coordinates and
//! forwarded as [`WheelEvent`]s; the core decides what they mean.
//!
//! ## Features
//! - Twelve rotated segments, long for the major pattern and short otherwise
//! - Root segment highlight
//! - Fixed labels, brightened when the note is in the current scale
//! - Mouse and touch input with leave/cancel handling

use iced::widget::canvas::{self, event, Event, Fill, Geometry, Path, Stroke, Text};
use iced::widget::container;
use iced::{
    alignment, mouse, touch, Color, Element, Length, Pixels, Point, Rectangle, Renderer, Theme,
    Vector,
};
use wheel_core::rotation::{MAJOR_PATTERN_SEGMENTS, SEGMENT_COUNT, SEGMENT_DEGREES, WheelGeometry};
use wheel_core::theory::PitchClass;

use crate::{Message, WheelEvent};

/// Rendered side length of the wheel in logical pixels.
pub const WHEEL_SIZE: f32 = 480.0;

/// Line segments used to approximate each segment's outer arc.
const ARC_STEPS: usize = 12;

const ROOT_COLOR: Color = Color::from_rgb(0.95, 0.55, 0.20);
const PATTERN_COLOR: Color = Color::from_rgb(0.20, 0.45, 0.75);
const GAP_COLOR: Color = Color::from_rgb(0.22, 0.22, 0.26);
const OUTLINE_COLOR: Color = Color::from_rgb(0.08, 0.08, 0.10);

/// The interactive wheel.
#[derive(Debug, Clone, Copy)]
pub struct ScaleWheelCanvas {
    rotation: f32,
    in_scale: [bool; 12],
    geometry: WheelGeometry,
}

/// Tracks whether the canvas owns the current press.
#[derive(Debug, Default)]
pub struct PointerState {
    pressed: bool,
}

impl ScaleWheelCanvas {
    pub fn new(rotation: f32, in_scale: [bool; 12], geometry: WheelGeometry) -> Self {
        Self {
            rotation,
            in_scale,
            geometry,
        }
    }

    pub fn view(self) -> Element<'static, Message> {
        container(
            canvas::Canvas::new(self)
                .width(Length::Fixed(WHEEL_SIZE))
                .height(Length::Fixed(WHEEL_SIZE)),
        )
        .into()
    }

    /// Maps a position relative to the canvas into view-box units.
    fn view_point(&self, bounds: Rectangle, position: Point) -> (f64, f64) {
        self.geometry.to_view_point(
            position.x as f64,
            position.y as f64,
            bounds.width as f64,
            bounds.height as f64,
        )
    }

    fn pressed(&self, bounds: Rectangle, position: Point) -> Message {
        let (x, y) = self.view_point(bounds, position);
        Message::Wheel(WheelEvent::Pressed { x, y })
    }

    fn moved(&self, bounds: Rectangle, position: Point) -> Message {
        let (x, y) = self.view_point(bounds, position);
        Message::Wheel(WheelEvent::Moved { x, y })
    }

    fn released(&self, bounds: Rectangle, position: Point) -> Message {
        let (x, y) = self.view_point(bounds, position);
        Message::Wheel(WheelEvent::Released { x, y })
    }
}

/// Point at `radius` from `center`, `degrees` clockwise from 12 o'clock.
fn polar(center: Point, radius: f32, degrees: f32) -> Point {
    let rad = degrees.to_radians();
    Point::new(center.x + radius * rad.sin(), center.y - radius * rad.cos())
}

impl canvas::Program<Message> for ScaleWheelCanvas {
    type State = PointerState;

    fn update(
        &self,
        state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    state.pressed = true;
                    return (event::Status::Captured, Some(self.pressed(bounds, position)));
                }
            }
            Event::Mouse(mouse::Event::CursorMoved { .. }) if state.pressed => {
                return match cursor.position_in(bounds) {
                    Some(position) => (event::Status::Captured, Some(self.moved(bounds, position))),
                    None => {
                        state.pressed = false;
                        (event::Status::Captured, Some(Message::Wheel(WheelEvent::Left)))
                    }
                };
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) if state.pressed => {
                state.pressed = false;
                let message = match cursor.position_in(bounds) {
                    Some(position) => self.released(bounds, position),
                    None => Message::Wheel(WheelEvent::Left),
                };
                return (event::Status::Captured, Some(message));
            }
            Event::Mouse(mouse::Event::CursorLeft) if state.pressed => {
                state.pressed = false;
                return (event::Status::Captured, Some(Message::Wheel(WheelEvent::Left)));
            }
            Event::Touch(touch::Event::FingerPressed { position, .. }) => {
                if bounds.contains(position) {
                    state.pressed = true;
                    let local = position - Vector::new(bounds.x, bounds.y);
                    return (event::Status::Captured, Some(self.pressed(bounds, local)));
                }
            }
            Event::Touch(touch::Event::FingerMoved { position, .. }) if state.pressed => {
                let local = position - Vector::new(bounds.x, bounds.y);
                return (event::Status::Captured, Some(self.moved(bounds, local)));
            }
            Event::Touch(touch::Event::FingerLifted { position, .. }) if state.pressed => {
                state.pressed = false;
                let local = position - Vector::new(bounds.x, bounds.y);
                return (event::Status::Captured, Some(self.released(bounds, local)));
            }
            Event::Touch(touch::Event::FingerLost { .. }) if state.pressed => {
                state.pressed = false;
                return (event::Status::Captured, Some(Message::Wheel(WheelEvent::Left)));
            }
            _ => {}
        }
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
        let scale = bounds.width / self.geometry.view_size as f32;
        let center = Point::new(
            self.geometry.center_x as f32 * scale,
            self.geometry.center_y as f32 * scale,
        );
        let sector = SEGMENT_DEGREES as f32;

        // Segments rotate with the wheel.
        for segment in 0..SEGMENT_COUNT {
            let radius = self.geometry.segment_radius(segment) as f32 * scale;
            let start = segment as f32 * sector + self.rotation;
            let wedge = Path::new(|builder| {
                builder.move_to(center);
                for step in 0..=ARC_STEPS {
                    let angle = start + sector * step as f32 / ARC_STEPS as f32;
                    builder.line_to(polar(center, radius, angle));
                }
                builder.close();
            });

            let color = if segment == 0 {
                ROOT_COLOR
            } else if MAJOR_PATTERN_SEGMENTS.contains(&segment) {
                PATTERN_COLOR
            } else {
                GAP_COLOR
            };
            frame.fill(&wedge, Fill::from(color));
            frame.stroke(
                &wedge,
                Stroke::default().with_color(OUTLINE_COLOR).with_width(2.0),
            );
        }

        // Labels stay where they are.
        let label_radius = self.geometry.label_radius as f32 * scale;
        for pitch_class in PitchClass::all() {
            let index = pitch_class.index() as usize;
            let position = polar(center, label_radius, index as f32 * sector + sector / 2.0);
            let color = if self.in_scale[index] {
                Color::WHITE
            } else {
                Color::from_rgb(0.55, 0.55, 0.60)
            };
            frame.fill_text(Text {
                content: pitch_class.wheel_label().to_string(),
                position,
                color,
                size: Pixels(15.0 * scale.max(0.5)),
                horizontal_alignment: alignment::Horizontal::Center,
                vertical_alignment: alignment::Vertical::Center,
                ..Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}
