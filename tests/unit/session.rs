use super::*;
use crate::avatar::config::{Accessory, MouthType};
use crate::foundation::error::AvatarError;

fn small_opts() -> SessionOpts {
    SessionOpts {
        canvas: Canvas {
            width: 120,
            height: 120,
        },
        ..SessionOpts::default()
    }
}

/// Succeeds for the first `ok_frames` calls, then fails.
struct FlakyRenderer {
    canvas: Canvas,
    ok_frames: usize,
    calls: usize,
}

impl FrameRenderer for FlakyRenderer {
    fn render(&mut self, _root: &SceneNode) -> AvatarResult<Surface> {
        self.calls += 1;
        if self.calls > self.ok_frames {
            return Err(AvatarError::render("device lost"));
        }
        let mut s = Surface::transparent(self.canvas);
        s.data_mut()?[3] = self.calls as u8;
        Ok(s)
    }

    fn canvas(&self) -> Canvas {
        self.canvas
    }
}

#[test]
fn default_opts() {
    let o = SessionOpts::default();
    assert_eq!((o.canvas.width, o.canvas.height), (300, 300));
    assert_eq!(o.fps.as_f64(), 60.0);
    assert_eq!(o.clear_rgba, None);
}

#[test]
fn mount_starts_with_default_config_and_registers() {
    let mut sched = ManualScheduler::new(Fps::new(60, 1).unwrap());
    let s = AvatarSession::mount(small_opts(), &mut sched).unwrap();
    assert!(sched.is_active());
    assert!(s.is_running());
    assert_eq!(s.config(), &AvatarConfig::default());
    assert_eq!(s.scene().transform.translate, Canvas::new(120, 120).unwrap().center());
    assert!(s.surface().is_some());
}

#[test]
fn staged_config_applies_at_next_frame_without_resetting_time() {
    let mut sched = ManualScheduler::new(Fps::new(10, 1).unwrap());
    let mut s = AvatarSession::mount(small_opts(), &mut sched).unwrap();

    for _ in 0..5 {
        let t = sched.next_frame().unwrap();
        s.frame(t);
    }
    let cfg = AvatarConfig {
        mouth_type: MouthType::Open,
        accessory: Accessory::Crown,
        ..AvatarConfig::default()
    };
    s.deliver_config(cfg.clone());
    assert!(s.has_staged_config());
    assert_eq!(s.config(), &AvatarConfig::default());
    assert!(s.scene().child("accessory").is_none());

    let t = sched.next_frame().unwrap();
    s.frame(t);
    assert!(!s.has_staged_config());
    assert_eq!(s.config(), &cfg);
    assert!(s.scene().child("accessory").is_some());
    assert!((s.elapsed() - 0.5).abs() < 1e-12);
    // The fresh scene was ticked in the same frame.
    assert_eq!(
        s.scene().transform.scale.y,
        crate::animation::clock::AnimationState::at(t).body_scale_y
    );
}

#[test]
fn render_failure_keeps_last_surface() {
    let mut sched = ManualScheduler::new(Fps::new(60, 1).unwrap());
    let renderer = FlakyRenderer {
        canvas: Canvas::new(8, 8).unwrap(),
        ok_frames: 2,
        calls: 0,
    };
    let opts = SessionOpts {
        canvas: Canvas::new(8, 8).unwrap(),
        ..SessionOpts::default()
    };
    let mut s = AvatarSession::mount_with_renderer(opts, Box::new(renderer), &mut sched).unwrap();

    let n = s
        .run(&mut sched, 4, |_, _, surface| {
            assert!(!surface.is_disposed());
            Ok(())
        })
        .unwrap();
    assert_eq!(n, 4);
    assert_eq!(s.failed_frames(), 2);
    assert_eq!(s.surface().and_then(|x| x.pixel(0, 0)), Some([0, 0, 0, 2]));
    assert!(s.is_running());
}

#[test]
fn stop_cancels_and_is_idempotent() {
    let mut sched = ManualScheduler::new(Fps::new(60, 1).unwrap());
    let mut s = AvatarSession::mount(small_opts(), &mut sched).unwrap();
    s.frame(0.0);

    s.stop(&mut sched);
    assert!(!s.is_running());
    assert!(!sched.is_active());
    assert!(s.surface().is_none());
    assert!(sched.next_frame().is_none());
    assert!(s.frame(1.0).is_none());

    s.stop(&mut sched);
    assert!(!s.is_running());
}

#[test]
fn stopped_clock_keeps_last_transforms() {
    let mut sched = ManualScheduler::new(Fps::new(60, 1).unwrap());
    let mut s = AvatarSession::mount(small_opts(), &mut sched).unwrap();
    s.frame(2.0);
    let before = s.scene().clone();
    s.stop(&mut sched);
    s.frame(3.0);
    assert_eq!(s.scene(), &before);
}

#[test]
fn manual_scheduler_steps_by_frame_period() {
    let mut sched = ManualScheduler::new(Fps::new(4, 1).unwrap());
    assert!(sched.next_frame().is_none());
    let h = sched.request_frames();
    let ts: Vec<_> = (0..3).filter_map(|_| sched.next_frame()).collect();
    assert_eq!(ts, vec![0.0, 0.25, 0.5]);
    sched.cancel(FrameHandle(h.0 + 100));
    assert!(sched.is_active());
    sched.cancel(h);
    assert!(!sched.is_active());
    assert_eq!(sched.frames_delivered(), 3);
}

#[test]
fn mount_rejects_renderer_with_other_canvas() {
    let mut sched = ManualScheduler::new(Fps::new(30, 1).unwrap());
    let renderer = FlakyRenderer {
        canvas: Canvas::new(64, 64).unwrap(),
        ok_frames: 1,
        calls: 0,
    };
    let err = AvatarSession::mount_with_renderer(small_opts(), Box::new(renderer), &mut sched)
        .unwrap_err();
    assert!(matches!(err, AvatarError::Validation(_)));
    assert!(!sched.is_active());
}
