use crate::foundation::error::{AvatarError, AvatarResult};

pub use kurbo::{Affine, BezPath, Point, Vec2};

/// Pixel dimensions of a drawable surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Rejects zero sizes and sizes above `u16::MAX`.
    pub fn new(width: u32, height: u32) -> AvatarResult<Self> {
        if width == 0 || height == 0 {
            return Err(AvatarError::validation("canvas dimensions must be > 0"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(AvatarError::validation("canvas dimensions exceed u16"));
        }
        Ok(Self { width, height })
    }

    /// Center point in pixel coordinates.
    pub fn center(self) -> Vec2 {
        Vec2::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// `width * height`.
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

/// Frame rate as a rational `num / den` frames per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator, never zero.
    pub den: u32,
}

impl Fps {
    /// Rejects a zero numerator or denominator.
    pub fn new(num: u32, den: u32) -> AvatarResult<Self> {
        if den == 0 {
            return Err(AvatarError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(AvatarError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Seconds per frame.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Start time of frame `frames`.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

/// Opaque 24-bit sRGB color, the value space of the avatar's hex color strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// `#000000`.
    pub const BLACK: Self = Self::from_u24(0x000000);
    /// `#FFFFFF`.
    pub const WHITE: Self = Self::from_u24(0xFFFFFF);

    /// Reads `0xRRGGBB`; bits above 24 are ignored.
    pub const fn from_u24(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
        }
    }

    /// Packs into `0xRRGGBB`.
    pub fn to_u24(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Normalized `[0, 1]` channels, as consumed by the shading functions.
    pub fn to_vec3(self) -> glam::Vec3 {
        glam::Vec3::new(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }

    /// Inverse of [`Rgb::to_vec3`], clamping each channel to `[0, 1]`.
    pub fn from_vec3(v: glam::Vec3) -> Self {
        fn to_u8(x: f32) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self {
            r: to_u8(v.x),
            g: to_u8(v.y),
            b: to_u8(v.z),
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red, premultiplied.
    pub r: u8,
    /// Green, premultiplied.
    pub g: u8,
    /// Blue, premultiplied.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8Premul {
    /// All channels zero.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// `c` at full alpha.
    pub fn opaque(c: Rgb) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }

    /// Premultiplies straight-alpha channels.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Local transform of a scene node. Rotation and scale pivot on the node origin.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    /// Offset from the parent origin.
    pub translate: Vec2,
    /// Clockwise rotation on screen, in radians.
    pub rotation_rad: f64,
    /// Per-axis scale, `(1, 1)` by default.
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            rotation_rad: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl Transform2D {
    /// Pure translation.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            translate: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// Composes translate, rotate and scale, applied to points in reverse order.
    pub fn to_affine(self) -> Affine {
        let t_translate = Affine::translate(self.translate);
        let t_rotate = Affine::rotate(self.rotation_rad);
        let t_scale = Affine::scale_non_uniform(self.scale.x, self.scale.y);

        // T(translate) * R(rot) * S(scale)
        t_translate * t_rotate * t_scale
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
