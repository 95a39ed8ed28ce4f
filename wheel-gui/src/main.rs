//! # Scale Wheel - Interactive Major Scale Explorer
//!
//! This module contains the main GUI application for the scale wheel. It
//! renders the rotating wheel of pitch classes, the spelled scale, the
//! diatonic chords and the guitar fretboard, and plays notes and chords.
//!
//! ## Architecture
//! - **Core**: `wheel_core::controller::ScaleWheel` owns rotation and theory
//! - **Renderer**: [`DisplaySink`] turns every snapshot into display data
//! - **Frames**: [`FrameRequests`] is serviced by a 60 FPS subscription that
//!   only runs while an animation is waiting for its next frame
//! - **Audio**: `SynthEngine` starts its own output thread on first use

mod ui;
mod widgets;

use std::time::{Duration, Instant};

use iced::{Element, Subscription, Theme, keyboard};
use wheel_core::audio::SynthEngine;
use wheel_core::config::WheelConfig;
use wheel_core::controller::{FrameId, FrameScheduler, Renderer, ScaleWheel};
use wheel_core::theory::{PitchClass, Triad};
use wheel_core::tuning::FretPosition;
use wheel_core::WheelSnapshot;

use ui::main_display::create_main_view;

/// Interval between animation frames (about 60 FPS).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Main entry point for the Scale Wheel application.
///
/// Initializes logging (`RUST_LOG`), then runs the Iced application with the
/// dark theme.
pub fn main() -> iced::Result {
    env_logger::init();
    log::info!("[MAIN] Starting Scale Wheel application...");
    let result = iced::application("Scale Wheel", WheelApp::update, WheelApp::view)
        .subscription(WheelApp::subscription)
        .theme(WheelApp::theme)
        .run();
    log::info!("[MAIN] Application finished with result: {:?}", result);
    result
}

/// Pointer activity on the wheel, in view-box coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelEvent {
    Pressed { x: f64, y: f64 },
    Moved { x: f64, y: f64 },
    Released { x: f64, y: f64 },
    /// Pointer left the wheel or the touch was cancelled.
    Left,
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    Wheel(WheelEvent),
    ChordPressed { spelling: usize, degree: u8 },
    /// Animation frame requested by the wheel.
    Frame,
    /// Arrow keys: turn the wheel by whole sectors.
    StepRoot(i32),
}

/// One chord button.
#[derive(Debug, Clone)]
pub struct ChordButton {
    pub label: String,
    pub spelling: usize,
    pub degree: u8,
}

/// UI-specific data needed for rendering the interface.
///
/// Rebuilt by [`DisplaySink`] every time the wheel renders.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub rotation: f32,
    pub title: String,
    /// One line per spelling. Prefixed with the scale name when there are two.
    pub scale_lines: Vec<String>,
    /// One row of chord buttons per spelling.
    pub chord_rows: Vec<Vec<ChordButton>>,
    pub triads: Vec<Vec<Triad>>,
    /// Membership of each fixed wheel label in the current scale.
    pub in_scale: [bool; 12],
    pub fretboard: Vec<FretPosition>,
}

impl AppDisplayData {
    fn from_snapshot(snapshot: &WheelSnapshot) -> Self {
        let dual = snapshot.spellings.len() > 1;
        let scale_lines = snapshot
            .spellings
            .iter()
            .map(|s| {
                if dual {
                    format!("{}: {}", s.name, s.notes_text())
                } else {
                    s.notes_text()
                }
            })
            .collect();
        let chord_rows = snapshot
            .triads
            .iter()
            .enumerate()
            .map(|(spelling, triads)| {
                triads
                    .iter()
                    .map(|t| ChordButton {
                        label: t.name.clone(),
                        spelling,
                        degree: t.degree,
                    })
                    .collect()
            })
            .collect();

        Self {
            rotation: snapshot.rotation as f32,
            title: snapshot.title(),
            scale_lines,
            chord_rows,
            triads: snapshot.triads.clone(),
            in_scale: std::array::from_fn(|i| snapshot.is_in_scale(PitchClass::new(i as i32))),
            fretboard: snapshot.fretboard.clone(),
        }
    }

    /// Triad shown in the chord details line.
    pub fn triad(&self, spelling: usize, degree: u8) -> Option<&Triad> {
        self.triads
            .get(spelling)?
            .iter()
            .find(|t| t.degree == degree)
    }
}

/// Renderer collaborator handed to the core.
#[derive(Debug, Default)]
pub struct DisplaySink {
    data: Option<AppDisplayData>,
}

impl DisplaySink {
    pub fn data(&self) -> Option<&AppDisplayData> {
        self.data.as_ref()
    }
}

impl Renderer for DisplaySink {
    fn render(&mut self, snapshot: &WheelSnapshot) {
        self.data = Some(AppDisplayData::from_snapshot(snapshot));
    }
}

/// Frame scheduler collaborator: at most one frame is pending, and the
/// subscription delivers it.
#[derive(Debug, Default)]
pub struct FrameRequests {
    next_id: u64,
    pending: Option<FrameId>,
}

impl FrameRequests {
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl FrameScheduler for FrameRequests {
    fn request_frame(&mut self) -> FrameId {
        self.next_id += 1;
        let id = FrameId(self.next_id);
        self.pending = Some(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }

    fn frame_delivered(&mut self, id: FrameId) {
        self.cancel_frame(id);
    }
}

/// Main application state for the scale wheel.
struct WheelApp {
    wheel: ScaleWheel<DisplaySink, SynthEngine, FrameRequests>,
    /// Clock shared by animation starts and frames.
    clock: Instant,
    /// Chord shown in the details line as (spelling, degree).
    selected_chord: (usize, u8),
    shown_root: PitchClass,
}

impl Default for WheelApp {
    fn default() -> Self {
        log::info!("[MAIN] Creating WheelApp...");
        let config = WheelConfig::from_env();
        let wheel = ScaleWheel::new(
            &config,
            DisplaySink::default(),
            SynthEngine::new(&config),
            FrameRequests::default(),
        );
        let shown_root = wheel.selected_root();
        Self {
            wheel,
            clock: Instant::now(),
            selected_chord: (0, 1),
            shown_root,
        }
    }
}

impl WheelApp {
    fn now(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Handles application state updates based on incoming messages.
    fn update(&mut self, message: Message) {
        match message {
            Message::Wheel(event) => match event {
                WheelEvent::Pressed { x, y } => self.wheel.pointer_down(x, y),
                WheelEvent::Moved { x, y } => self.wheel.pointer_move(x, y),
                WheelEvent::Released { x, y } => self.wheel.pointer_up(x, y),
                WheelEvent::Left => self.wheel.pointer_leave(),
            },
            Message::ChordPressed { spelling, degree } => {
                if self.wheel.activate_chord(spelling, degree).is_some() {
                    self.selected_chord = (spelling, degree);
                }
            }
            Message::Frame => {
                let now = self.now();
                self.wheel.on_frame(now);
            }
            Message::StepRoot(steps) => {
                log::debug!("[MAIN] Stepping root by {}", steps);
                let now = self.now();
                self.wheel.step_root(steps, now);
            }
        }

        // A new key shows its first chord again.
        let root = self.wheel.selected_root();
        if root != self.shown_root {
            self.shown_root = root;
            self.selected_chord = (0, 1);
        }
    }

    /// Renders the main application interface.
    fn view(&self) -> Element<'_, Message> {
        create_main_view(
            self.wheel.renderer().data(),
            self.selected_chord,
            *self.wheel.geometry(),
        )
    }

    /// Arrow keys always; animation frames only while one is pending.
    fn subscription(&self) -> Subscription<Message> {
        let keys = keyboard::on_key_press(|key, _modifiers| match key {
            keyboard::Key::Named(keyboard::key::Named::ArrowRight) => Some(Message::StepRoot(1)),
            keyboard::Key::Named(keyboard::key::Named::ArrowLeft) => Some(Message::StepRoot(-1)),
            _ => None,
        });

        if self.wheel.scheduler().is_pending() {
            Subscription::batch([
                keys,
                iced::time::every(FRAME_INTERVAL).map(|_| Message::Frame),
            ])
        } else {
            keys
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_data_for_black_key() {
        let data = AppDisplayData::from_snapshot(&WheelSnapshot::at(30.0));
        assert_eq!(data.title, "C# Major / Db Major");
        assert_eq!(data.scale_lines.len(), 2);
        assert_eq!(data.scale_lines[1], "Db Major: Db, Eb, F, Gb, Ab, Bb, C");
        assert_eq!(data.chord_rows.len(), 2);
        assert_eq!(data.chord_rows[1][1].label, "Ebm");
        assert!(data.in_scale[1] && !data.in_scale[2]);
    }

    #[test]
    fn display_data_for_white_key_has_plain_notes() {
        let data = AppDisplayData::from_snapshot(&WheelSnapshot::at(0.0));
        assert_eq!(data.scale_lines, ["C, D, E, F, G, A, B"]);
        assert_eq!(data.triad(0, 7).map(|t| t.name.as_str()), Some("Bdim"));
    }

    #[test]
    fn frame_requests_track_one_pending_frame() {
        let mut frames = FrameRequests::default();
        let first = frames.request_frame();
        let second = frames.request_frame();
        frames.cancel_frame(first);
        assert!(frames.is_pending());
        frames.cancel_frame(second);
        assert!(!frames.is_pending());
    }

    #[test]
    fn frame_timer_stops_once_animation_settles() {
        let config = WheelConfig::default();
        let mut wheel = ScaleWheel::new(
            &config,
            DisplaySink::default(),
            SynthEngine::new(&config),
            FrameRequests::default(),
        );

        wheel.step_root(1, Duration::ZERO);
        assert!(wheel.scheduler().is_pending());

        wheel.on_frame(Duration::from_millis(100));
        assert!(wheel.scheduler().is_pending());

        wheel.on_frame(Duration::from_millis(500));
        assert!(!wheel.has_pending_frame());
        assert!(!wheel.scheduler().is_pending());
        assert_eq!(wheel.selected_root().index(), 1);
        let title = wheel.renderer().data().map(|d| d.title.as_str());
        assert_eq!(title, Some("C# Major / Db Major"));
    }
}
