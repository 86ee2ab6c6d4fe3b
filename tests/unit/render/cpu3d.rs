use std::sync::Arc;

use glam::Mat4;

use super::*;
use crate::scene3d::mesh::Mesh;
use crate::shading::material::{ToonOptions, outline, toon};

const SIZE: u32 = 32;

fn sphere_scene(color: Rgb) -> Scene3d {
    let mut scene = Scene3d::new();
    scene
        .add_mesh(
            Scene3d::ROOT,
            "ball",
            Mat4::IDENTITY,
            Arc::new(Mesh::uv_sphere(1.0, 24, 16)),
            toon(color, &ToonOptions::default()),
        )
        .unwrap();
    scene
}

fn opaque_count(surface: &Surface) -> usize {
    surface
        .data()
        .unwrap()
        .chunks_exact(4)
        .filter(|px| px[3] == 255)
        .count()
}

#[test]
fn sphere_covers_center_not_corners() {
    let scene = sphere_scene(Rgb::from_u24(0xFF6B9D));
    let mut r = CpuRenderer3d::new();
    let t = r.create_target(SIZE, SIZE).unwrap();
    r.render(&scene, &Camera::default(), &DrawRequest::new(t).cleared([0, 0, 0, 0]))
        .unwrap();

    let s = r.read_pixels(t).unwrap();
    let center = s.pixel(SIZE / 2, SIZE / 2).unwrap();
    assert_eq!(center[3], 255);
    assert!(center[0] > 0);
    assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn back_faces_with_override_draw_flat_black() {
    let scene = sphere_scene(Rgb::WHITE);
    let black = outline();
    let mut r = CpuRenderer3d::new();
    let t = r.create_target(SIZE, SIZE).unwrap();
    let req = DrawRequest::new(t)
        .cleared([0, 0, 0, 0])
        .faces(FaceSide::Back)
        .override_material(&black);
    r.render(&scene, &Camera::default(), &req).unwrap();

    let s = r.read_pixels(t).unwrap();
    assert_eq!(s.pixel(SIZE / 2, SIZE / 2), Some([0, 0, 0, 255]));
    // The scene keeps its own material.
    let ball = scene.find("ball").unwrap();
    assert_eq!(
        scene.get(ball).unwrap().material().unwrap().kind(),
        crate::shading::material::MaterialKind::Toon
    );
}

#[test]
fn hull_offset_grows_coverage() {
    let scene = sphere_scene(Rgb::WHITE);
    let mut r = CpuRenderer3d::new();
    let plain = r.create_target(SIZE, SIZE).unwrap();
    let grown = r.create_target(SIZE, SIZE).unwrap();
    let cam = Camera::default();
    r.render(&scene, &cam, &DrawRequest::new(plain).cleared([0, 0, 0, 0]))
        .unwrap();
    r.render(
        &scene,
        &cam,
        &DrawRequest::new(grown).cleared([0, 0, 0, 0]).hull_offset(0.3),
    )
    .unwrap();

    let a = opaque_count(&r.read_pixels(plain).unwrap());
    let b = opaque_count(&r.read_pixels(grown).unwrap());
    assert!(b > a, "{b} <= {a}");
}

#[test]
fn object_above_origin_lands_in_upper_half() {
    let mut scene = Scene3d::new();
    scene
        .add_mesh(
            Scene3d::ROOT,
            "ball",
            Mat4::from_translation(Vec3::new(0.0, 1.2, 0.0)),
            Arc::new(Mesh::uv_sphere(0.4, 16, 8)),
            outline(),
        )
        .unwrap();
    let mut r = CpuRenderer3d::new();
    let t = r.create_target(SIZE, SIZE).unwrap();
    let req = DrawRequest::new(t).cleared([0, 0, 0, 0]).faces(FaceSide::Double);
    r.render(&scene, &Camera::default(), &req).unwrap();

    let s = r.read_pixels(t).unwrap();
    let data = s.data().unwrap();
    let row_has_ink = |y: u32| (0..SIZE).any(|x| data[((y * SIZE + x) * 4 + 3) as usize] > 0);
    assert!((0..SIZE / 2).any(row_has_ink));
    assert!(!(SIZE / 2..SIZE).any(row_has_ink));
}

fn two_balls(near_first: bool) -> Scene3d {
    let mesh = Arc::new(Mesh::uv_sphere(1.0, 16, 8));
    let near = (
        "near",
        Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0)),
        toon(Rgb::from_u24(0xFF0000), &ToonOptions::default()),
    );
    let far = (
        "far",
        Mat4::IDENTITY,
        toon(Rgb::from_u24(0x0000FF), &ToonOptions::default()),
    );
    let order = if near_first { [near, far] } else { [far, near] };

    let mut scene = Scene3d::new();
    for (name, m, material) in order {
        scene
            .add_mesh(Scene3d::ROOT, name, m, mesh.clone(), material)
            .unwrap();
    }
    scene
}

fn center_of(scene: &Scene3d, req: impl Fn(TargetId) -> DrawRequest<'static>) -> [u8; 4] {
    let mut r = CpuRenderer3d::new();
    let t = r.create_target(SIZE, SIZE).unwrap();
    r.render(scene, &Camera::default(), &req(t)).unwrap();
    r.read_pixels(t).unwrap().pixel(SIZE / 2, SIZE / 2).unwrap()
}

#[test]
fn nearer_geometry_wins_the_depth_test() {
    for near_first in [true, false] {
        let px = center_of(&two_balls(near_first), |t| {
            DrawRequest::new(t).cleared([0, 0, 0, 0])
        });
        assert_eq!(px[3], 255);
        assert!(px[0] > px[2], "near_first={near_first}: {px:?}");
    }
}

#[test]
fn depth_test_holds_when_both_sides_are_drawn() {
    for near_first in [true, false] {
        let px = center_of(&two_balls(near_first), |t| {
            DrawRequest::new(t)
                .cleared([0, 0, 0, 0])
                .faces(FaceSide::Double)
        });
        assert!(px[0] > px[2], "near_first={near_first}: {px:?}");
    }
}

#[test]
fn back_face_pass_shows_the_far_side_of_the_nearest_mesh() {
    // Back faces only: the near ball's far hemisphere (z = 0) beats the far
    // ball's far hemisphere (z = -1).
    let black = outline();
    let mut r = CpuRenderer3d::new();
    let t = r.create_target(SIZE, SIZE).unwrap();
    let req = DrawRequest::new(t)
        .cleared([0, 0, 0, 0])
        .faces(FaceSide::Back)
        .override_material(&black);
    r.render(&two_balls(false), &Camera::default(), &req).unwrap();
    assert_eq!(r.read_pixels(t).unwrap().pixel(SIZE / 2, SIZE / 2), Some([0, 0, 0, 255]));
}

#[test]
fn composite_draws_src_over_target() {
    let scene = sphere_scene(Rgb::WHITE);
    let mut r = CpuRenderer3d::new();
    let bg = r.create_target(SIZE, SIZE).unwrap();
    let fg = r.create_target(SIZE, SIZE).unwrap();
    r.render(&Scene3d::new(), &Camera::default(), &DrawRequest::new(bg).cleared([0, 0, 255, 255]))
        .unwrap();
    r.render(&scene, &Camera::default(), &DrawRequest::new(fg).cleared([0, 0, 0, 0]))
        .unwrap();

    r.composite(bg, &[CompositeOp::Over { src: fg, opacity: 1.0 }])
        .unwrap();
    let s = r.read_pixels(bg).unwrap();
    assert_eq!(s.pixel(0, 0), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(SIZE / 2, SIZE / 2), r.read_pixels(fg).unwrap().pixel(SIZE / 2, SIZE / 2));
}

fn filled(r: &mut CpuRenderer3d, w: u32, h: u32, rgba: [u8; 4]) -> TargetId {
    let t = r.create_target(w, h).unwrap();
    r.render(&Scene3d::new(), &Camera::default(), &DrawRequest::new(t).cleared(rgba))
        .unwrap();
    t
}

#[test]
fn composite_blends_by_opacity_and_coverage() {
    let mut r = CpuRenderer3d::new();
    let black = filled(&mut r, 2, 2, [0, 0, 0, 255]);
    let white = filled(&mut r, 2, 2, [255, 255, 255, 255]);
    let clear = filled(&mut r, 2, 2, [255, 255, 255, 0]);

    r.composite(black, &[CompositeOp::Over { src: clear, opacity: 1.0 }])
        .unwrap();
    assert_eq!(r.read_pixels(black).unwrap().pixel(1, 1), Some([0, 0, 0, 255]));

    r.composite(black, &[CompositeOp::Over { src: white, opacity: 0.0 }])
        .unwrap();
    assert_eq!(r.read_pixels(black).unwrap().pixel(1, 1), Some([0, 0, 0, 255]));

    r.composite(black, &[CompositeOp::Over { src: white, opacity: 0.5 }])
        .unwrap();
    let px = r.read_pixels(black).unwrap().pixel(0, 0).unwrap();
    assert_eq!(px[3], 255);
    assert!((127..=129).contains(&px[0]), "{px:?}");
}

#[test]
fn composite_rejects_mismatched_sizes() {
    let mut r = CpuRenderer3d::new();
    let dst = filled(&mut r, 4, 4, [0, 0, 0, 255]);
    let src = filled(&mut r, 2, 2, [255, 0, 0, 255]);
    let err = r
        .composite(dst, &[CompositeOp::Over { src, opacity: 1.0 }])
        .unwrap_err();
    assert!(matches!(err, AvatarError::Render(_)));
    assert_eq!(r.read_pixels(dst).unwrap().pixel(0, 0), Some([0, 0, 0, 255]));
}

#[test]
fn composite_with_missing_src_keeps_target() {
    let mut r = CpuRenderer3d::new();
    let t = r.create_target(4, 4).unwrap();
    let err = r
        .composite(t, &[CompositeOp::Over { src: TargetId(99), opacity: 1.0 }])
        .unwrap_err();
    assert!(matches!(err, AvatarError::Render(_)));
    assert_eq!(r.target_size(t), Some((4, 4)));
}

#[test]
fn release_is_idempotent_and_invalidates_target() {
    let mut r = CpuRenderer3d::new();
    let t = r.create_target(8, 4).unwrap();
    assert_eq!(r.target_size(t), Some((8, 4)));
    assert!(r.release_target(t));
    assert!(!r.release_target(t));
    assert_eq!(r.live_targets(), 0);
    assert!(r.read_pixels(t).is_err());
    assert!(
        r.render(&Scene3d::new(), &Camera::default(), &DrawRequest::new(t))
            .is_err()
    );
}

#[test]
fn zero_sized_target_is_rejected() {
    let mut r = CpuRenderer3d::new();
    assert!(r.create_target(0, 10).is_err());
}
