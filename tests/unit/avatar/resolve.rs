use super::*;
use crate::avatar::config::{BodyType, EyeType};

fn config_with(mouth: MouthType, accessory: Accessory) -> AvatarConfig {
    AvatarConfig {
        mouth_type: mouth,
        accessory,
        ..AvatarConfig::default()
    }
}

fn part(parts: &[PartRecipe], kind: PartKind) -> &PartRecipe {
    parts.iter().find(|p| p.kind == kind).unwrap()
}

#[test]
fn every_declared_value_resolves_deterministically() {
    for body in BodyType::ALL {
        for eye in EyeType::ALL {
            for mouth in MouthType::ALL {
                for acc in Accessory::ALL {
                    let cfg = AvatarConfig {
                        body_type: body.clone(),
                        eye_type: eye.clone(),
                        mouth_type: mouth.clone(),
                        accessory: acc.clone(),
                        ..AvatarConfig::default()
                    };
                    let a = resolve(&cfg);
                    assert!(!a.is_empty());
                    assert!(a.iter().all(|p| !p.pieces.is_empty()));
                    assert_eq!(a, resolve(&cfg));
                }
            }
        }
    }
}

#[test]
fn parts_come_in_draw_order() {
    let kinds: Vec<_> = resolve(&config_with(MouthType::Smile, Accessory::Hat))
        .iter()
        .map(|p| p.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            PartKind::Body,
            PartKind::Eyes,
            PartKind::Mouth,
            PartKind::Arms,
            PartKind::Accessory
        ]
    );
}

#[test]
fn body_recipe_uses_primary_color() {
    let parts = resolve(&AvatarConfig::default());
    let body = part(&parts, PartKind::Body);
    assert_eq!(body.offset, Vec2::new(0.0, 5.0));
    assert_eq!(
        body.pieces[0].primitive,
        Primitive {
            shape: Shape::Circle {
                center: Point::ORIGIN,
                radius: 40.0
            },
            paint: Paint::fill(Rgb::from_u24(0xFF6B9D)),
        }
    );
}

#[test]
fn eyes_have_white_pupil_and_shine() {
    let parts = resolve(&AvatarConfig::default());
    let eyes = part(&parts, PartKind::Eyes);
    assert_eq!(eyes.offset, Vec2::new(0.0, -15.0));
    assert_eq!(eyes.pieces.len(), 6);

    let by_name = |n: &str| eyes.pieces.iter().find(|p| p.name == n).unwrap();
    assert_eq!(by_name("left_eye_white").offset, Vec2::new(-15.0, 0.0));
    assert_eq!(by_name("right_eye_pupil").offset, Vec2::new(15.0, 0.0));
    assert_eq!(by_name("left_eye_shine").offset, Vec2::new(-17.0, -2.0));
    assert_eq!(by_name("right_eye_shine").offset, Vec2::new(13.0, -2.0));
    assert_eq!(
        by_name("left_eye_pupil").primitive.paint,
        Paint::fill(Rgb::BLACK)
    );
}

#[test]
fn mouth_variants_and_fallback() {
    let shape_of = |m: MouthType| {
        let parts = resolve(&config_with(m, Accessory::None));
        part(&parts, PartKind::Mouth).pieces[0].primitive.shape.clone()
    };

    let smile = shape_of(MouthType::Smile);
    assert!(matches!(smile, Shape::Arc { radius, .. } if radius == 10.0));
    assert!(matches!(shape_of(MouthType::Grin), Shape::Arc { radius, .. } if radius == 15.0));
    assert!(matches!(
        shape_of(MouthType::Open),
        Shape::Ellipse { center, radii } if center == Point::new(0.0, 5.0) && radii == Vec2::new(8.0, 12.0)
    ));
    assert!(matches!(shape_of(MouthType::Neutral), Shape::Line { .. }));
    assert_eq!(shape_of(MouthType::Tongue), smile);
    assert_eq!(shape_of(MouthType::from("pout")), smile);
}

#[test]
fn open_mouth_is_filled_and_outlined() {
    let parts = resolve(&config_with(MouthType::Open, Accessory::None));
    let paint = part(&parts, PartKind::Mouth).pieces[0].primitive.paint;
    assert_eq!(paint.fill, Some(Rgb::from_u24(0xFF69B4)));
    assert!(paint.stroke.is_some());
}

#[test]
fn arms_are_separate_accent_discs() {
    let parts = resolve(&AvatarConfig::default());
    let arms = part(&parts, PartKind::Arms);
    let offsets: Vec<_> = arms.pieces.iter().map(|p| p.offset).collect();
    assert_eq!(offsets, vec![Vec2::new(-50.0, 0.0), Vec2::new(50.0, 0.0)]);
    for p in &arms.pieces {
        assert_eq!(p.primitive.paint, Paint::fill(Rgb::from_u24(0xFFB347)));
    }
}

#[test]
fn no_accessory_for_none_bow_and_unknown() {
    for acc in [Accessory::None, Accessory::Bow, Accessory::from("monocle")] {
        let parts = resolve(&config_with(MouthType::Smile, acc));
        assert_eq!(parts.len(), 4);
    }
}

#[test]
fn crown_has_star_and_five_jewels_at_72_degrees() {
    let parts = resolve(&config_with(MouthType::Smile, Accessory::Crown));
    let crown = part(&parts, PartKind::Accessory);
    assert_eq!(crown.pieces.len(), 6);
    assert!(matches!(
        crown.pieces[0].primitive.shape,
        Shape::Star { points: 5, .. }
    ));
    let center = crown.pieces[0].offset;
    assert_eq!(center, Vec2::new(0.0, -50.0));

    for (i, jewel) in crown.pieces[1..].iter().enumerate() {
        let d = jewel.offset - center;
        assert!((d.hypot() - 15.0).abs() < 1e-9);
        let expected = (i as f64) * 72f64.to_radians();
        let angle = d.y.atan2(d.x).rem_euclid(TAU);
        assert!((angle - expected).abs() < 1e-9, "jewel {i} at {angle}");
    }
}

#[test]
fn glasses_have_two_lenses_and_bridge() {
    let parts = resolve(&config_with(MouthType::Smile, Accessory::Glasses));
    let glasses = part(&parts, PartKind::Accessory);
    let names: Vec<_> = glasses.pieces.iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["left_lens", "right_lens", "bridge"]);
    assert!(glasses.pieces[..2].iter().all(|p| p.primitive.paint.fill.is_none()));
}

#[test]
fn malformed_color_draws_black() {
    let cfg = AvatarConfig {
        primary_color: HexColor::new("rebeccapurple"),
        ..AvatarConfig::default()
    };
    let parts = resolve(&cfg);
    assert_eq!(
        part(&parts, PartKind::Body).pieces[0].primitive.paint.fill,
        Some(Rgb::BLACK)
    );
}

#[test]
fn star_vertices_alternate_radii_from_the_top() {
    let v = star_vertices(Point::ORIGIN, 5, 20.0, 15.0);
    assert_eq!(v.len(), 10);
    assert!((v[0].x).abs() < 1e-9 && (v[0].y + 20.0).abs() < 1e-9);
    assert!(((v[1] - Point::ORIGIN).hypot() - 15.0).abs() < 1e-9);
}

#[test]
fn smile_arc_passes_above_its_center() {
    let path = Shape::Arc {
        center: Point::ORIGIN,
        radius: 10.0,
        start_angle: PI,
        end_angle: 0.0,
    }
    .to_path(0.01);
    let bbox = kurbo::Shape::bounding_box(&path);
    assert!((bbox.min_y() + 10.0).abs() < 0.02);
    assert!(bbox.max_y().abs() < 0.02);
    assert!((bbox.width() - 20.0).abs() < 0.02);
}
