use std::time::Duration;

use anyhow::{Result, anyhow};
use wheel_core::WheelSnapshot;
use wheel_core::config::WheelConfig;
use wheel_core::controller::{AudioEngine, FrameId, FrameScheduler, Renderer, ScaleWheel};
use wheel_core::theory::PitchClass;

#[derive(Default)]
struct RecordingRenderer {
    snapshots: Vec<WheelSnapshot>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, snapshot: &WheelSnapshot) {
        self.snapshots.push(snapshot.clone());
    }
}

#[derive(Default)]
struct RecordingAudio {
    fail: bool,
    ready_calls: usize,
    notes: Vec<PitchClass>,
    chords: Vec<Vec<PitchClass>>,
}

impl AudioEngine for RecordingAudio {
    fn ensure_ready(&mut self) -> Result<()> {
        self.ready_calls += 1;
        if self.fail {
            Err(anyhow!("no device"))
        } else {
            Ok(())
        }
    }

    fn play_note(&mut self, pitch_class: PitchClass) {
        self.notes.push(pitch_class);
    }

    fn play_chord(&mut self, pitch_classes: &[PitchClass]) {
        self.chords.push(pitch_classes.to_vec());
    }
}

#[derive(Default)]
struct ManualScheduler {
    next_id: u64,
    requested: Vec<FrameId>,
    cancelled: Vec<FrameId>,
    delivered: Vec<FrameId>,
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameId {
        self.next_id += 1;
        let id = FrameId(self.next_id);
        self.requested.push(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.cancelled.push(id);
    }

    fn frame_delivered(&mut self, id: FrameId) {
        self.delivered.push(id);
    }
}

type TestWheel = ScaleWheel<RecordingRenderer, RecordingAudio, ManualScheduler>;

fn wheel() -> TestWheel {
    wheel_with_audio(RecordingAudio::default())
}

fn wheel_with_audio(audio: RecordingAudio) -> TestWheel {
    ScaleWheel::new(
        &WheelConfig::default(),
        RecordingRenderer::default(),
        audio,
        ManualScheduler::default(),
    )
}

/// View-box point `radius` units from the centre, `angle` degrees clockwise
/// from 12 o'clock.
fn point_at(angle: f64, radius: f64) -> (f64, f64) {
    let rad = angle.to_radians();
    (300.0 + radius * rad.sin(), 300.0 - radius * rad.cos())
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Drags the wheel from 12 o'clock to `angle` and releases off the wheel.
fn drag_to(wheel: &mut TestWheel, angle: f64) {
    let (x, y) = point_at(0.0, 200.0);
    wheel.pointer_down(x, y);
    let (x, y) = point_at(angle / 2.0, 200.0);
    wheel.pointer_move(x, y);
    let (x, y) = point_at(angle, 200.0);
    wheel.pointer_move(x, y);
    wheel.pointer_leave();
}

#[test]
fn starts_on_c_major_and_renders_once() {
    let wheel = wheel();
    assert_eq!(wheel.renderer().snapshots.len(), 1);
    let snapshot = &wheel.renderer().snapshots[0];
    assert_eq!(snapshot.root, PitchClass::C);
    assert_eq!(snapshot.title(), "C Major");
    assert_eq!(wheel.audio().ready_calls, 0);
}

#[test]
fn click_on_segment_plays_its_note() {
    let mut wheel = wheel();
    let (x, y) = point_at(75.0, 200.0);
    wheel.pointer_down(x, y);
    wheel.pointer_up(x, y);

    assert_eq!(wheel.audio().notes, [PitchClass::new(2)]);
    assert!(wheel.audio().ready_calls >= 2);
    // A click does not rotate anything.
    assert_eq!(wheel.renderer().snapshots.len(), 1);
}

#[test]
fn click_after_rotation_is_offset_by_the_root() {
    let mut wheel = wheel();
    drag_to(&mut wheel, 60.0);
    assert_eq!(wheel.selected_root().index(), 2);

    // Root segment now sits between 60° and 90°.
    let (x, y) = point_at(70.0, 200.0);
    wheel.pointer_down(x, y);
    wheel.pointer_up(x, y);
    assert_eq!(wheel.audio().notes, [PitchClass::new(2)]);
}

#[test]
fn drag_rotates_and_suppresses_the_click() {
    let mut wheel = wheel();
    let (x, y) = point_at(0.0, 200.0);
    wheel.pointer_down(x, y);
    let (x, y) = point_at(90.0, 200.0);
    wheel.pointer_move(x, y);
    wheel.pointer_up(x, y);

    assert!((wheel.rotation() - 90.0).abs() < 1e-6);
    assert_eq!(wheel.selected_root().index(), 3);
    assert!(wheel.audio().notes.is_empty());

    let last = wheel.renderer().snapshots.last().unwrap();
    assert_eq!(last.title(), "D# Major / Eb Major");
    assert_eq!(last.triads.len(), 2);
    assert_eq!(last.spellings[1].notes_text(), "Eb, F, G, Ab, Bb, C, D");
}

#[test]
fn animation_steps_frame_by_frame_the_short_way() {
    let mut wheel = wheel();
    drag_to(&mut wheel, 350.0);
    assert!((wheel.rotation() - 350.0).abs() < 1e-6);
    let renders_before = wheel.renderer().snapshots.len();

    wheel.animate_to_angle(10.0, ms(1_000));
    assert!(wheel.has_pending_frame());
    assert_eq!(wheel.scheduler().requested.len(), 1);

    let mut now = 1_000;
    while wheel.has_pending_frame() {
        now += 16;
        wheel.on_frame(ms(now));
        let r = wheel.rotation();
        assert!(r >= 350.0 - 1e-6 || r <= 10.0 + 1e-6, "went the long way: {}", r);
        assert!(now < 2_000, "animation never settled");
    }

    assert_eq!(wheel.rotation(), 10.0);
    assert_eq!(wheel.selected_root(), PitchClass::C);
    // 200 ms at 16 ms per frame.
    assert_eq!(now, 1_208);
    assert_eq!(wheel.scheduler().requested.len(), 13);
    // Every requested frame is handed back exactly once, the last on settling.
    assert_eq!(wheel.scheduler().delivered, wheel.scheduler().requested);
    assert_eq!(wheel.renderer().snapshots.len(), renders_before + 13);
}

#[test]
fn drag_cancels_a_running_animation() {
    let mut wheel = wheel();
    wheel.animate_to_angle(90.0, ms(0));
    wheel.on_frame(ms(50));
    let frozen = wheel.rotation();
    let pending = *wheel.scheduler().requested.last().unwrap();

    let (x, y) = point_at(180.0, 100.0);
    wheel.pointer_down(x, y);

    assert!(!wheel.has_pending_frame());
    assert_eq!(wheel.scheduler().cancelled, [pending]);
    assert_eq!(wheel.rotation(), frozen);
    assert!(wheel.state().is_dragging());

    // A stray frame arriving after the cancel changes nothing.
    let delivered = wheel.scheduler().delivered.len();
    wheel.on_frame(ms(400));
    assert_eq!(wheel.rotation(), frozen);
    assert!(!wheel.has_pending_frame());
    assert_eq!(wheel.scheduler().delivered.len(), delivered);
}

#[test]
fn new_animation_replaces_the_old_one() {
    let mut wheel = wheel();
    wheel.animate_to_angle(90.0, ms(0));
    let first = wheel.scheduler().requested[0];
    wheel.animate_to_angle(180.0, ms(10));
    assert_eq!(wheel.scheduler().cancelled, [first]);

    wheel.on_frame(ms(500));
    assert_eq!(wheel.rotation(), 180.0);
    assert_eq!(wheel.selected_root().index(), 6);
}

#[test]
fn snap_and_step_use_sector_boundaries() {
    let mut wheel = wheel();
    drag_to(&mut wheel, 50.0);
    wheel.snap_to_nearest(ms(0));
    wheel.on_frame(ms(200));
    assert_eq!(wheel.rotation(), 60.0);

    wheel.step_root(-3, ms(300));
    wheel.on_frame(ms(500));
    assert_eq!(wheel.rotation(), 330.0);
    assert_eq!(wheel.selected_root().index(), 11);
}

#[test]
fn chord_buttons_play_the_triad() {
    let mut wheel = wheel();
    let triad = wheel.activate_chord(0, 5).expect("G chord");
    assert_eq!(triad.name, "G");
    assert_eq!(
        wheel.audio().chords,
        [vec![PitchClass::new(7), PitchClass::new(11), PitchClass::new(2)]]
    );
    assert!(wheel.activate_chord(1, 1).is_none());
}

#[test]
fn audio_failure_does_not_break_the_wheel() {
    let mut wheel = wheel_with_audio(RecordingAudio {
        fail: true,
        ..Default::default()
    });
    let (x, y) = point_at(15.0, 200.0);
    wheel.pointer_down(x, y);
    wheel.pointer_up(x, y);
    assert!(wheel.activate_chord(0, 1).is_some());

    assert!(wheel.audio().notes.is_empty());
    assert!(wheel.audio().chords.is_empty());

    drag_to(&mut wheel, 120.0);
    assert_eq!(wheel.selected_root().index(), 4);
}
