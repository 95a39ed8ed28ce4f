//! # Rotation Module
//!
//! Angle math and the interaction state machine behind the rotating wheel.
//!
//! The wheel has 12 sectors of 30°, pitch class 0 sitting at 12 o'clock.
//! Its orientation is a single angle in `[0, 360)`; the selected root is the
//! sector closest to that angle. Pointer drags turn the wheel continuously,
//! and programmatic transitions ease towards a target angle one display
//! frame at a time.
//!
//! ## States
//! - **Idle**: no pointer down, no transition running
//! - **Dragging**: pointer down, deltas applied as the pointer moves
//! - **Animating**: eased transition in flight, cancelled by a new drag

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::theory::PitchClass;

/// Angular width of one wheel sector.
pub const SEGMENT_DEGREES: f64 = 30.0;

/// Number of sectors (one per pitch class).
pub const SEGMENT_COUNT: usize = 12;

/// Unrotated segments drawn long: the major scale pattern from the root.
pub const MAJOR_PATTERN_SEGMENTS: [usize; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Pointer movement (in degrees) above which a gesture is a drag, not a click.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 0.5;

/// Length of an eased transition.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(200);

/// Dimensions of the wheel in view-box units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelGeometry {
    /// Side of the square view box the wheel is drawn in.
    pub view_size: f64,
    pub center_x: f64,
    pub center_y: f64,
    /// Radius of segments belonging to the major pattern.
    pub long_radius: f64,
    /// Radius of the remaining segments.
    pub short_radius: f64,
    /// Radius at which note labels are placed.
    pub label_radius: f64,
}

impl Default for WheelGeometry {
    fn default() -> Self {
        Self {
            view_size: 600.0,
            center_x: 300.0,
            center_y: 300.0,
            long_radius: 220.0,
            short_radius: 160.0,
            label_radius: 190.0,
        }
    }
}

impl WheelGeometry {
    /// Angle of a pointer around the wheel centre, clockwise from 12 o'clock.
    ///
    /// The +90° offset puts angle 0 at the top, where pitch class 0 is drawn.
    /// A pointer exactly on the centre yields 90°.
    ///
    /// # Arguments
    /// * `x`, `y` - Pointer position in view-box units (y grows downwards)
    ///
    /// # Returns
    /// * Angle in degrees within `[0, 360)`
    pub fn angle_from_pointer(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        let mut angle = dy.atan2(dx).to_degrees() + 90.0;
        if angle < 0.0 {
            angle += 360.0;
        }
        angle
    }

    /// Converts a position inside a rendered area of `width` × `height` into
    /// view-box units.
    pub fn to_view_point(&self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
        let scale_x = if width > 0.0 { self.view_size / width } else { 1.0 };
        let scale_y = if height > 0.0 { self.view_size / height } else { 1.0 };
        (x * scale_x, y * scale_y)
    }

    /// Drawn radius of an unrotated segment.
    pub fn segment_radius(&self, segment: usize) -> f64 {
        if MAJOR_PATTERN_SEGMENTS.contains(&(segment % SEGMENT_COUNT)) {
            self.long_radius
        } else {
            self.short_radius
        }
    }

    /// Finds the unrotated segment under a pointer, if any.
    ///
    /// # Arguments
    /// * `x`, `y` - Pointer position in view-box units
    /// * `rotation` - Current wheel rotation in degrees
    ///
    /// # Returns
    /// * `Some(index)` - Segment index (0 is the root segment)
    /// * `None` - Pointer outside the segment's radius
    pub fn segment_at(&self, x: f64, y: f64, rotation: f64) -> Option<usize> {
        let distance = (x - self.center_x).hypot(y - self.center_y);
        let local = wrap_degrees(self.angle_from_pointer(x, y) - rotation);
        let segment = (local / SEGMENT_DEGREES).floor() as usize % SEGMENT_COUNT;
        (distance <= self.segment_radius(segment)).then_some(segment)
    }
}

/// Wraps any angle into `[0, 360)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to 360.0 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed rotation from `from` to `to` going the short way round, in
/// `(-180, 180]`.
pub fn shortest_delta(from: f64, to: f64) -> f64 {
    let delta = wrap_degrees(to - from);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Cubic ease-out: fast start, gentle landing.
pub fn ease_out_cubic(progress: f64) -> f64 {
    1.0 - (1.0 - progress).powi(3)
}

/// Pitch class of the root currently selected by `rotation`.
pub fn selected_root(rotation: f64) -> PitchClass {
    PitchClass::new((rotation / SEGMENT_DEGREES).round() as i32)
}

/// Rounds an angle to the nearest sector boundary.
pub fn snap_to_nearest_note(angle: f64) -> f64 {
    (angle / SEGMENT_DEGREES).round() * SEGMENT_DEGREES
}

/// Pitch class sounded by clicking the unrotated `segment` at `rotation`.
pub fn segment_pitch_class(segment: usize, rotation: f64) -> PitchClass {
    PitchClass::new(segment as i32 + (rotation / SEGMENT_DEGREES).round() as i32)
}

/// An eased transition in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub start_angle: f64,
    /// Short-way rotation to apply over the whole transition.
    pub delta: f64,
    pub target: f64,
    pub started_at: Duration,
    pub duration: Duration,
}

impl Animation {
    fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    Dragging { last_angle: f64, has_dragged: bool },
    Animating(Animation),
}

/// What a transition did, for the caller to forward to collaborators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Nothing observable changed.
    None,
    /// The rotation moved; derived scale data must be recomputed.
    RotationChanged,
    /// The rotation reached the end of an animation and the wheel is idle.
    Settled,
    /// A click (pointer released without dragging) on a segment.
    NoteClicked(PitchClass),
}

/// Rotation of the wheel plus the bookkeeping of the gesture or animation
/// currently driving it.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationState {
    rotation: f64,
    phase: Phase,
    drag_threshold: f64,
    animation_duration: Duration,
}

impl Default for RotationState {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD, DEFAULT_ANIMATION_DURATION)
    }
}

impl RotationState {
    pub fn new(drag_threshold: f64, animation_duration: Duration) -> Self {
        Self {
            rotation: 0.0,
            phase: Phase::Idle,
            drag_threshold,
            animation_duration,
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected_root(&self) -> PitchClass {
        selected_root(self.rotation)
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Animating(_))
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// Starts a drag at `angle`, cancelling any running animation.
    pub fn pointer_down(&mut self, angle: f64) -> Transition {
        if self.is_animating() {
            log::debug!("[ROTATION] Drag cancels animation at {:.2}°", self.rotation);
        }
        self.phase = Phase::Dragging {
            last_angle: angle,
            has_dragged: false,
        };
        Transition::None
    }

    /// Turns the wheel by the pointer's angular movement since the last event.
    ///
    /// The delta is taken the short way round so that crossing 12 o'clock
    /// with a tiny movement is not mistaken for a drag.
    pub fn pointer_move(&mut self, angle: f64) -> Transition {
        let Phase::Dragging {
            last_angle,
            has_dragged,
        } = self.phase
        else {
            return Transition::None;
        };

        let delta = shortest_delta(last_angle, angle);
        self.rotation = wrap_degrees(self.rotation + delta);
        self.phase = Phase::Dragging {
            last_angle: angle,
            has_dragged: has_dragged || delta.abs() > self.drag_threshold,
        };
        Transition::RotationChanged
    }

    /// Ends a drag. Releasing on a segment without having dragged is a click.
    ///
    /// # Arguments
    /// * `segment` - Unrotated segment under the pointer, if any
    pub fn pointer_up(&mut self, segment: Option<usize>) -> Transition {
        let Phase::Dragging { has_dragged, .. } = self.phase else {
            return Transition::None;
        };
        self.phase = Phase::Idle;

        match segment {
            Some(segment) if !has_dragged => {
                Transition::NoteClicked(segment_pitch_class(segment, self.rotation))
            }
            _ => Transition::None,
        }
    }

    /// Ends a drag without a click (pointer left the wheel or touch cancelled).
    pub fn pointer_leave(&mut self) -> Transition {
        if self.is_dragging() {
            self.phase = Phase::Idle;
        }
        Transition::None
    }

    /// Starts an eased transition towards `target`, replacing any drag or
    /// animation in progress. The wheel always turns the short way.
    pub fn begin_animation(&mut self, target: f64, now: Duration) -> Transition {
        let animation = Animation {
            start_angle: self.rotation,
            delta: shortest_delta(self.rotation, target),
            target,
            started_at: now,
            duration: self.animation_duration,
        };
        log::debug!(
            "[ROTATION] Animating {:.2}° -> {:.2}° ({:+.2}°)",
            animation.start_angle,
            target,
            animation.delta
        );
        self.phase = Phase::Animating(animation);
        Transition::None
    }

    /// Samples the running animation at `now`.
    ///
    /// Once the duration has elapsed the rotation is set exactly to the
    /// wrapped target and the wheel returns to idle.
    pub fn advance_animation(&mut self, now: Duration) -> Transition {
        let Phase::Animating(animation) = self.phase else {
            return Transition::None;
        };

        let progress = animation.progress(now);
        if progress >= 1.0 {
            self.rotation = wrap_degrees(animation.target);
            self.phase = Phase::Idle;
            Transition::Settled
        } else {
            self.rotation =
                wrap_degrees(animation.start_angle + animation.delta * ease_out_cubic(progress));
            Transition::RotationChanged
        }
    }
}
