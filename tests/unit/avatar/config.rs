use super::*;
use serde_json::json;

#[test]
fn default_matches_documented_fallback() {
    let c = AvatarConfig::default();
    assert_eq!(c.body_type, BodyType::RoundBlue);
    assert_eq!(c.eye_type, EyeType::BigHappy);
    assert_eq!(c.mouth_type, MouthType::Smile);
    assert_eq!(c.accessory, Accessory::None);
    assert_eq!(c.primary_color, HexColor::new("#FF6B9D"));
    assert_eq!(c.accent_color, HexColor::new("#FFB347"));
    c.validate().unwrap();
}

#[test]
fn deserializes_camel_case_and_fills_absent_fields() {
    let c: AvatarConfig = serde_json::from_value(json!({
        "mouthType": "grin",
        "accessory": "crown",
        "primaryColor": "#4A90E2"
    }))
    .unwrap();
    assert_eq!(c.mouth_type, MouthType::Grin);
    assert_eq!(c.accessory, Accessory::Crown);
    assert_eq!(c.primary_color.to_rgb(), Some(Rgb::from_u24(0x4A90E2)));
    assert_eq!(c.body_type, BodyType::RoundBlue);
    assert_eq!(c.accent_color, HexColor::new(DEFAULT_ACCENT_COLOR));
}

#[test]
fn unknown_values_survive_and_fail_validation() {
    let c: AvatarConfig = serde_json::from_value(json!({ "mouthType": "pout" })).unwrap();
    assert_eq!(c.mouth_type, MouthType::Unknown("pout".to_owned()));
    match c.validate() {
        Err(AvatarError::UnknownAttribute { field, value }) => {
            assert_eq!(field, "mouthType");
            assert_eq!(value, "pout");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn serialization_writes_the_style_codes() {
    let v = serde_json::to_value(AvatarConfig::default()).unwrap();
    assert_eq!(
        v,
        json!({
            "bodyType": "round_blue",
            "eyeType": "big_happy",
            "mouthType": "smile",
            "accessory": "none",
            "primaryColor": "#FF6B9D",
            "accentColor": "#FFB347"
        })
    );
}

#[test]
fn lenient_parse_keeps_defaults_for_bad_fields() {
    let c = AvatarConfig::from_json_lenient(&json!({
        "bodyType": 7,
        "eyeType": "star_sparkly",
        "accentColor": null
    }));
    assert_eq!(c.body_type, BodyType::RoundBlue);
    assert_eq!(c.eye_type, EyeType::StarSparkly);
    assert_eq!(c.accent_color, HexColor::new(DEFAULT_ACCENT_COLOR));

    let c = AvatarConfig::from_json_lenient(&json!("not an object"));
    assert_eq!(c, AvatarConfig::default());
}

#[test]
fn lenient_parse_treats_empty_strings_as_absent() {
    let c = AvatarConfig::from_json_lenient(&json!({
        "mouthType": "",
        "accessory": "",
        "primaryColor": "",
        "accentColor": ""
    }));
    assert_eq!(c, AvatarConfig::default());
}

#[test]
fn strict_parse_rejects_wrong_types() {
    assert!(AvatarConfig::from_json_str(r#"{"bodyType": 7}"#).is_err());
    assert!(AvatarConfig::from_json_str("{").is_err());
}

#[test]
fn hex_color_reads_leading_digits_like_parse_int() {
    assert_eq!(HexColor::new("#FF6B9D").numeric_value(), Some(0xFF6B9D));
    assert_eq!(HexColor::new("ff6b9d").numeric_value(), Some(0xFF6B9D));
    assert_eq!(HexColor::new("#12zz").numeric_value(), Some(0x12));
    assert_eq!(HexColor::new("#0x00ff00").numeric_value(), Some(0x00FF00));
    // Only the low 24 bits of a longer run survive.
    assert_eq!(HexColor::new("#FF6B9D80").numeric_value(), Some(0x6B9D80));
    assert_eq!(HexColor::new("#zzzzzz").numeric_value(), None);
    assert_eq!(HexColor::new("").numeric_value(), None);
}

#[test]
fn malformed_colors_fail_strict_validation() {
    for bad in ["FF6B9D", "#FF6B9", "#GG6B9D", "#FF6B9D00"] {
        let c = AvatarConfig {
            primary_color: HexColor::new(bad),
            ..AvatarConfig::default()
        };
        assert!(
            matches!(c.validate(), Err(AvatarError::MalformedColor { field: "primaryColor", .. })),
            "{bad} should be rejected"
        );
    }
}

#[test]
fn random_is_seeded_and_in_domain() {
    let a = AvatarConfig::random(42);
    let b = AvatarConfig::random(42);
    assert_eq!(a, b);
    a.validate().unwrap();

    let distinct = (0..32)
        .map(AvatarConfig::random)
        .collect::<std::collections::HashSet<_>>();
    assert!(distinct.len() > 1);
}

#[test]
fn all_lists_every_declared_value() {
    assert_eq!(BodyType::ALL.len(), 6);
    assert_eq!(EyeType::ALL.len(), 5);
    assert_eq!(MouthType::ALL.len(), 5);
    assert_eq!(Accessory::ALL.len(), 6);
    for m in MouthType::ALL {
        assert_eq!(&MouthType::from(m.as_str()), m);
    }
}
