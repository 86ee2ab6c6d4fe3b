use std::path::Path;

use rand::SeedableRng as _;
use rand::seq::IndexedRandom as _;

use crate::foundation::core::Rgb;
use crate::foundation::error::{AvatarError, AvatarResult};

/// Declares a closed style-code enum whose out-of-domain strings survive as `Unknown`.
macro_rules! style_enum {
    ($(#[$meta:meta])* $name:ident, $field:literal { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $(#[doc = concat!("`\"", $s, "\"`")]
            $variant,)+
            /// A value outside the declared domain, kept verbatim.
            Unknown(String),
        }

        impl $name {
            /// Every declared value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub(crate) const FIELD: &'static str = $field;

            /// The configuration string for this value.
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $s,)+
                    $name::Unknown(s) => s.as_str(),
                }
            }

            /// `false` for `Unknown` values.
            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Unknown(_))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $($s => $name::$variant,)+
                    _ => $name::Unknown(s),
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                v.as_str().to_owned()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

style_enum!(
    /// Body style. Every body type shares the round body recipe; only the color differs.
    BodyType, "bodyType" {
        RoundBlue => "round_blue",
        RoundPink => "round_pink",
        RoundGreen => "round_green",
        RoundYellow => "round_yellow",
        SquarePurple => "square_purple",
        SquareOrange => "square_orange",
    }
);

style_enum!(
    /// Eye style.
    EyeType, "eyeType" {
        BigHappy => "big_happy",
        BigSleepy => "big_sleepy",
        SmallAngry => "small_angry",
        RoundConfused => "round_confused",
        StarSparkly => "star_sparkly",
    }
);

style_enum!(
    /// Mouth style. Unknown values draw the smile.
    MouthType, "mouthType" {
        Smile => "smile",
        Grin => "grin",
        Open => "open",
        Neutral => "neutral",
        Tongue => "tongue",
    }
);

style_enum!(
    /// Accessory style. Unknown values draw nothing.
    Accessory, "accessory" {
        None => "none",
        Cap => "cap",
        Hat => "hat",
        Crown => "crown",
        Glasses => "glasses",
        Bow => "bow",
    }
);

/// A color as written in the configuration, e.g. `"#FF6B9D"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct HexColor(pub String);

impl HexColor {
    /// Wraps `s` without checking it.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Reads the digits the way the configuration's producers always have: drop the
    /// first `#`, then take the longest leading run of hex digits as a number. Only
    /// the low 24 bits are kept. `None` when no leading hex digit exists.
    pub fn numeric_value(&self) -> Option<u32> {
        let s = self.0.replacen('#', "", 1);
        let s = s.trim_start();
        let s = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        let mut value: u32 = 0;
        let mut digits = 0usize;
        for ch in s.chars() {
            let Some(d) = ch.to_digit(16) else {
                break;
            };
            value = ((value << 4) | d) & 0x00FF_FFFF;
            digits += 1;
        }
        (digits > 0).then_some(value)
    }

    /// Strict `#RRGGBB` check used by [`AvatarConfig::validate`].
    pub fn is_well_formed(&self) -> bool {
        let Some(digits) = self.0.strip_prefix('#') else {
            return false;
        };
        digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// The color [`HexColor::numeric_value`] reads, if any.
    pub fn to_rgb(&self) -> Option<Rgb> {
        self.numeric_value().map(Rgb::from_u24)
    }
}

impl From<&str> for HexColor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Body color used when the configuration gives none.
pub const DEFAULT_PRIMARY_COLOR: &str = "#FF6B9D";
/// Arm color used when the configuration gives none.
pub const DEFAULT_ACCENT_COLOR: &str = "#FFB347";

/// Bright palette random avatars draw their colors from.
pub const CUTE_PALETTE: &[&str] = &[
    "#FF6B9D", "#C44569", "#4A90E2", "#50C878", "#FFB347", "#B39DDB", "#FF6F61", "#6C5CE7",
    "#00D2FF", "#FFA500",
];

/// Style attributes of one monster avatar.
///
/// Absent JSON fields take the value of [`AvatarConfig::default`]; out-of-domain
/// strings deserialize as `Unknown` and resolve to fallback recipes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvatarConfig {
    /// Body style. Every body currently draws the same disc.
    pub body_type: BodyType,
    /// Eye style. Every eye style currently draws the same white, pupil and shine.
    pub eye_type: EyeType,
    /// Mouth style.
    pub mouth_type: MouthType,
    /// Headwear or eyewear drawn over the body.
    pub accessory: Accessory,
    /// Body color.
    pub primary_color: HexColor,
    /// Arm color.
    pub accent_color: HexColor,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            body_type: BodyType::RoundBlue,
            eye_type: EyeType::BigHappy,
            mouth_type: MouthType::Smile,
            accessory: Accessory::None,
            primary_color: HexColor::new(DEFAULT_PRIMARY_COLOR),
            accent_color: HexColor::new(DEFAULT_ACCENT_COLOR),
        }
    }
}

impl AvatarConfig {
    /// Strict JSON parse; wrongly typed fields are an error.
    pub fn from_json_str(s: &str) -> AvatarResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads and strictly parses a JSON file.
    pub fn from_path(path: &Path) -> AvatarResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            AvatarError::config_load(format!("read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }

    /// Field-by-field extraction that never fails: a field that is absent, empty or
    /// not a string keeps its default value.
    pub fn from_json_lenient(v: &serde_json::Value) -> Self {
        let mut out = Self::default();
        let get = |key: &str| {
            v.get(key)
                .and_then(serde_json::Value::as_str)
                .filter(|s| !s.is_empty())
        };

        if let Some(s) = get("bodyType") {
            out.body_type = BodyType::from(s);
        }
        if let Some(s) = get("eyeType") {
            out.eye_type = EyeType::from(s);
        }
        if let Some(s) = get("mouthType") {
            out.mouth_type = MouthType::from(s);
        }
        if let Some(s) = get("accessory") {
            out.accessory = Accessory::from(s);
        }
        if let Some(s) = get("primaryColor") {
            out.primary_color = HexColor::new(s);
        }
        if let Some(s) = get("accentColor") {
            out.accent_color = HexColor::new(s);
        }
        out
    }

    /// Pretty-printed camelCase JSON.
    pub fn to_json_string_pretty(&self) -> AvatarResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Upstream validation. Rendering never requires it; unknown values fall back
    /// and colors are read leniently.
    pub fn validate(&self) -> AvatarResult<()> {
        fn known(field: &'static str, ok: bool, value: &str) -> AvatarResult<()> {
            if ok {
                Ok(())
            } else {
                Err(AvatarError::UnknownAttribute {
                    field,
                    value: value.to_owned(),
                })
            }
        }
        fn color(field: &'static str, c: &HexColor) -> AvatarResult<()> {
            if c.is_well_formed() {
                Ok(())
            } else {
                Err(AvatarError::MalformedColor {
                    field,
                    value: c.0.clone(),
                })
            }
        }

        known(
            BodyType::FIELD,
            self.body_type.is_known(),
            self.body_type.as_str(),
        )?;
        known(
            EyeType::FIELD,
            self.eye_type.is_known(),
            self.eye_type.as_str(),
        )?;
        known(
            MouthType::FIELD,
            self.mouth_type.is_known(),
            self.mouth_type.as_str(),
        )?;
        known(
            Accessory::FIELD,
            self.accessory.is_known(),
            self.accessory.as_str(),
        )?;
        color("primaryColor", &self.primary_color)?;
        color("accentColor", &self.accent_color)
    }

    /// A seeded random avatar drawn from the declared domains and [`CUTE_PALETTE`].
    pub fn random(seed: u64) -> Self {
        fn pick<T: Clone>(rng: &mut rand_chacha::ChaCha8Rng, items: &[T], fallback: T) -> T {
            items.choose(rng).cloned().unwrap_or(fallback)
        }

        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        let d = Self::default();
        Self {
            body_type: pick(&mut rng, BodyType::ALL, d.body_type),
            eye_type: pick(&mut rng, EyeType::ALL, d.eye_type),
            mouth_type: pick(&mut rng, MouthType::ALL, d.mouth_type),
            accessory: pick(&mut rng, Accessory::ALL, d.accessory),
            primary_color: HexColor::new(pick(&mut rng, CUTE_PALETTE, DEFAULT_PRIMARY_COLOR)),
            accent_color: HexColor::new(pick(&mut rng, CUTE_PALETTE, DEFAULT_ACCENT_COLOR)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/avatar/config.rs"]
mod tests;
