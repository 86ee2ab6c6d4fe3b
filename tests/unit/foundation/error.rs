use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AvatarError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        AvatarError::config_load("x")
            .to_string()
            .contains("config load error:")
    );
    assert!(
        AvatarError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        AvatarError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn attribute_errors_name_the_field() {
    let e = AvatarError::MalformedColor {
        field: "primaryColor",
        value: "#zzzzzz".to_owned(),
    };
    assert!(e.to_string().contains("primaryColor"));
    assert!(e.to_string().contains("#zzzzzz"));

    let e = AvatarError::UnknownAttribute {
        field: "mouthType",
        value: "pout".to_owned(),
    };
    assert_eq!(e.to_string(), "unknown attribute value: mouthType = \"pout\"");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AvatarError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_convert() {
    let err: AvatarError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, AvatarError::Serde(_)));
}
