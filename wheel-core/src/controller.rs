//! # Wheel Controller Module
//!
//! Connects the rotation state machine to the theory engine and to the
//! outside world. Pointer events and frame callbacks come in; snapshots go
//! to the renderer and pitch classes go to the audio engine.
//!
//! ## Collaborators
//! - [`Renderer`]: draws whatever snapshot it is handed
//! - [`AudioEngine`]: plays notes and chords, started lazily
//! - [`FrameScheduler`]: delivers one frame callback per request, so tests
//!   can step animations deterministically

use std::time::Duration;

use anyhow::Result;

use crate::WheelSnapshot;
use crate::config::WheelConfig;
use crate::rotation::{
    RotationState, SEGMENT_DEGREES, Transition, WheelGeometry, snap_to_nearest_note,
};
use crate::theory::{PitchClass, Triad};

/// Consumer of the derived scale data.
pub trait Renderer {
    /// Called with fresh data after every rotation change.
    fn render(&mut self, snapshot: &WheelSnapshot);
}

/// Sound output for clicked notes and chord buttons.
pub trait AudioEngine {
    /// Prepares the engine for playback. Must be idempotent.
    fn ensure_ready(&mut self) -> Result<()>;
    fn play_note(&mut self, pitch_class: PitchClass);
    fn play_chord(&mut self, pitch_classes: &[PitchClass]);
}

/// Handle of a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Request-next-frame scheduling, tied to the display refresh.
pub trait FrameScheduler {
    /// Asks for [`ScaleWheel::on_frame`] to be called once, at the next frame.
    fn request_frame(&mut self) -> FrameId;
    fn cancel_frame(&mut self, id: FrameId);
    /// The requested frame `id` has been handled.
    fn frame_delivered(&mut self, id: FrameId);
}

/// The interactive scale wheel.
///
/// Owns the rotation state and the latest snapshot, and is the single
/// writer of the rotation.
#[derive(Debug)]
pub struct ScaleWheel<R, A, S> {
    geometry: WheelGeometry,
    state: RotationState,
    pending_frame: Option<FrameId>,
    snapshot: WheelSnapshot,
    renderer: R,
    audio: A,
    scheduler: S,
}

impl<R, A, S> ScaleWheel<R, A, S>
where
    R: Renderer,
    A: AudioEngine,
    S: FrameScheduler,
{
    /// Creates the wheel at rotation 0 (C major) and renders it once.
    pub fn new(config: &WheelConfig, renderer: R, audio: A, scheduler: S) -> Self {
        let state = RotationState::new(config.drag_threshold_degrees, config.animation_duration());
        let mut wheel = Self {
            geometry: config.geometry,
            snapshot: WheelSnapshot::at(state.rotation()),
            state,
            pending_frame: None,
            renderer,
            audio,
            scheduler,
        };
        wheel.refresh();
        wheel
    }

    pub fn geometry(&self) -> &WheelGeometry {
        &self.geometry
    }

    pub fn rotation(&self) -> f64 {
        self.state.rotation()
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn selected_root(&self) -> PitchClass {
        self.state.selected_root()
    }

    pub fn snapshot(&self) -> &WheelSnapshot {
        &self.snapshot
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// True while an animation is waiting for its next frame.
    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Pointer pressed at view-box coordinates `(x, y)`.
    ///
    /// Cancels any animation and starts the audio engine if it is not
    /// running yet, so the first click can already sound.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.cancel_pending_frame();
        self.prepare_audio();
        let angle = self.geometry.angle_from_pointer(x, y);
        let transition = self.state.pointer_down(angle);
        self.apply(transition);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        let angle = self.geometry.angle_from_pointer(x, y);
        let transition = self.state.pointer_move(angle);
        self.apply(transition);
    }

    /// Pointer released at `(x, y)`; plays the segment under it on a click.
    pub fn pointer_up(&mut self, x: f64, y: f64) {
        let segment = self.geometry.segment_at(x, y, self.state.rotation());
        let transition = self.state.pointer_up(segment);
        self.apply(transition);
    }

    /// Pointer left the wheel or the touch was cancelled.
    pub fn pointer_leave(&mut self) {
        let transition = self.state.pointer_leave();
        self.apply(transition);
    }

    /// Starts an eased transition to `target` degrees, replacing any running
    /// one. `now` is the current time on the same clock as [`Self::on_frame`].
    pub fn animate_to_angle(&mut self, target: f64, now: Duration) {
        self.cancel_pending_frame();
        let transition = self.state.begin_animation(target, now);
        self.apply(transition);
        self.pending_frame = Some(self.scheduler.request_frame());
    }

    /// Animates to the sector boundary closest to the current rotation.
    pub fn snap_to_nearest(&mut self, now: Duration) {
        self.animate_to_angle(snap_to_nearest_note(self.state.rotation()), now);
    }

    /// Animates `steps` sectors away from the nearest sector boundary.
    pub fn step_root(&mut self, steps: i32, now: Duration) {
        let target = snap_to_nearest_note(self.state.rotation()) + steps as f64 * SEGMENT_DEGREES;
        self.animate_to_angle(target, now);
    }

    /// Frame callback requested through the scheduler.
    pub fn on_frame(&mut self, now: Duration) {
        if let Some(id) = self.pending_frame.take() {
            self.scheduler.frame_delivered(id);
        }
        let transition = self.state.advance_animation(now);
        self.apply(transition);
        if self.state.is_animating() {
            self.pending_frame = Some(self.scheduler.request_frame());
        }
    }

    /// Plays the triad on `degree` (1-based) of the spelling at index
    /// `spelling` and returns it for display.
    pub fn activate_chord(&mut self, spelling: usize, degree: u8) -> Option<Triad> {
        let triad = self.snapshot.triad(spelling, degree)?.clone();
        if self.prepare_audio() {
            log::debug!("[WHEEL] Playing chord {}", triad.name);
            self.audio.play_chord(&triad.pitch_classes());
        }
        Some(triad)
    }

    /// Recomputes the snapshot for the current rotation and renders it.
    pub fn refresh(&mut self) {
        self.snapshot = WheelSnapshot::at(self.state.rotation());
        self.renderer.render(&self.snapshot);
    }

    fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::RotationChanged => self.refresh(),
            Transition::Settled => {
                log::debug!("[WHEEL] Settled at {:.2}°", self.state.rotation());
                self.refresh();
            }
            Transition::NoteClicked(pitch_class) => {
                if self.prepare_audio() {
                    log::debug!("[WHEEL] Playing note {}", pitch_class);
                    self.audio.play_note(pitch_class);
                }
            }
        }
    }

    fn prepare_audio(&mut self) -> bool {
        match self.audio.ensure_ready() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[WHEEL] Audio unavailable: {:#}", e);
                false
            }
        }
    }

    fn cancel_pending_frame(&mut self) {
        if let Some(id) = self.pending_frame.take() {
            self.scheduler.cancel_frame(id);
        }
    }
}
