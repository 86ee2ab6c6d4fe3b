use super::*;
use serde_json::json;

fn frag(normal: Vec3, position: Vec3, camera: Vec3) -> Fragment {
    Fragment {
        position,
        normal,
        view_dir: (camera - position).normalize(),
    }
}

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < 1e-5
}

#[test]
fn toon_quantizes_into_bands() {
    assert_eq!(toon_diffuse(0.1, 3.0), 0.0);
    assert!((toon_diffuse(0.4, 3.0) - 1.0 / 3.0).abs() < 1e-6);
    assert!((toon_diffuse(0.7, 3.0) - 2.0 / 3.0).abs() < 1e-6);
    assert!((toon_diffuse(0.95, 3.0) - 2.0 / 3.0).abs() < 1e-6);
    assert_eq!(toon_diffuse(-0.5, 3.0), 0.0);
}

#[test]
fn cell_bands_split_at_thirds() {
    assert_eq!(cell_band(0.8, 3.0), CellBand::Light);
    assert_eq!(cell_band(0.5, 3.0), CellBand::Base);
    assert_eq!(cell_band(0.1, 3.0), CellBand::Dark);
    assert_eq!(cell_band(-1.0, 3.0), CellBand::Dark);
}

#[test]
fn options_default_when_fields_are_missing() {
    let o: ToonOptions = serde_json::from_value(json!({ "bands": 5 })).unwrap();
    assert_eq!(o.bands, 5.0);
    assert_eq!(o.specular_power, DEFAULT_SPECULAR_POWER);
    assert_eq!(o.outline_size, DEFAULT_OUTLINE_SIZE);

    let c: CellShadeOptions = serde_json::from_value(json!({ "cellSize": 4 })).unwrap();
    assert_eq!(c.cell_count, 4.0);
    assert_eq!(c.dark_color, 0x1a1a1a);

    let all: ShaderOptions = serde_json::from_value(json!({})).unwrap();
    assert_eq!(all, ShaderOptions::default());
}

#[test]
fn zero_options_fall_back_to_defaults() {
    let m = toon(
        Rgb::WHITE,
        &ToonOptions {
            bands: 0.0,
            ..ToonOptions::default()
        },
    );
    match m {
        ShaderMaterial::Toon(u) => assert_eq!(u.bands, DEFAULT_BANDS),
        other => panic!("unexpected material {other:?}"),
    }
}

#[test]
fn toon_lit_and_unlit_sides() {
    let m = toon(Rgb::from_u24(0xFF0000), &ToonOptions::default());

    // Facing away from both light and camera: ambient term plus full rim.
    let back = frag(Vec3::NEG_X, Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0));
    let c = m.shade(&back);
    assert!(close(c, Vec3::new(0.3 + 0.3, 0.3, 0.3)), "{c:?}");

    // Light, normal and camera all on +Z: top band plus highlight, no rim.
    let m = toon(
        Rgb::from_u24(0xFF0000),
        &ToonOptions {
            light_position: [0.0, 0.0, 5.0],
            ..ToonOptions::default()
        },
    );
    let lit = frag(Vec3::Z, Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0));
    let c = m.shade(&lit);
    assert!(close(c, Vec3::new(1.0 + 0.5, 0.5, 0.5)), "{c:?}");
}

#[test]
fn cell_shade_picks_band_colors() {
    let base = Rgb::from_u24(0x808080);
    let m = cell_shade(base, &CellShadeOptions::default());
    let camera = Vec3::new(0.0, 0.0, 10.0);
    let toward = Vec3::from_array(DEFAULT_LIGHT_POSITION).normalize();

    let lit = m.shade(&frag(toward, Vec3::ZERO, camera));
    assert!(close(lit, mix(base.to_vec3(), Vec3::ONE, 0.3)));

    let dark = m.shade(&frag(-toward, Vec3::ZERO, camera));
    let want = mix(base.to_vec3(), Rgb::from_u24(0x1a1a1a).to_vec3(), 0.5);
    assert!(close(dark, want));
}

#[test]
fn watercolor_stays_between_half_and_full_base() {
    let base = Rgb::from_u24(0x4A90E2);
    let mut m = watercolor(base, &WatercolorOptions::default());
    let lo = base.to_vec3() * 0.5;
    let hi = base.to_vec3();
    for i in 0..50 {
        let f = i as f32 * 0.13;
        m.set_time(f);
        let n = Vec3::new(f.sin(), f.cos(), 0.3).normalize();
        let c = m.shade(&frag(n, n * 2.0, Vec3::new(0.0, 0.0, 10.0)));
        let min = mix(lo, hi, 0.3);
        assert!(c.cmpge(min - 1e-5).all() && c.cmple(hi + 1e-5).all(), "{c:?}");
    }
}

#[test]
fn watercolor_is_deterministic_for_equal_time() {
    let m = watercolor(Rgb::WHITE, &WatercolorOptions::default());
    let f = frag(Vec3::Y, Vec3::new(0.2, 0.4, 0.6), Vec3::new(0.0, 0.0, 10.0));
    assert_eq!(m.shade(&f), m.shade(&f));
    assert_eq!(watercolor_gradient(1.0, 0.5, 0.7), 1.0);
    assert_eq!(watercolor_gradient(-1.0, 0.5, 0.7), 0.3);
    let n = watercolor_noise(Vec3::new(1.0, 2.0, 3.0));
    assert!((0.0..1.0).contains(&n));
}

#[test]
fn uniform_setters_are_typed_per_variant() {
    let mut w = watercolor(Rgb::WHITE, &WatercolorOptions::default());
    assert!(w.set_time(2.0));
    assert!(!w.set_light_position(Vec3::ONE));

    let mut t = toon(Rgb::WHITE, &ToonOptions::default());
    assert!(!t.set_time(2.0));
    assert!(t.set_light_position(Vec3::ONE));
    t.set_base_color(Rgb::BLACK);
    assert_eq!(t.base_color(), Vec3::ZERO);
}

#[test]
fn outline_is_flat_black_on_back_faces() {
    let o = outline();
    assert_eq!(o.side(), FaceSide::Back);
    assert_eq!(o.kind(), MaterialKind::Outline);
    let f = frag(Vec3::Z, Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0));
    assert_eq!(o.shade(&f), Vec3::ZERO);
}

#[test]
fn every_kind_has_a_fragment_entry_point() {
    for kind in MaterialKind::ALL {
        let m = material_for(kind, Rgb::WHITE, &ShaderOptions::default());
        assert_eq!(m.kind(), kind);
        assert!(m.wgsl_source().contains("@fragment"));
        assert_eq!(kind.as_str().parse::<MaterialKind>().unwrap(), kind);
    }
    assert!("phong".parse::<MaterialKind>().is_err());
}
