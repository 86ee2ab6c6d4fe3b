//! Stylized shading programs for the 3D avatar.
//!
//! Each material is a closed set of typed uniforms plus two evaluations of the same
//! fragment program: [`ShaderMaterial::shade`] on the CPU and
//! [`ShaderMaterial::wgsl_source`] for GPU renderers. Both read the fragment's world
//! position, world normal and direction to the camera.

use glam::Vec3;

use crate::foundation::core::Rgb;
use crate::foundation::error::AvatarError;
use crate::foundation::math::{fract, mix, quantize, reflect, smoothstep, step};

/// Light position used by the toon and cell-shade programs.
pub const DEFAULT_LIGHT_POSITION: [f32; 3] = [5.0, 5.0, 5.0];
/// Toon lighting steps.
pub const DEFAULT_BANDS: f32 = 3.0;
/// Outline thickness in world units.
pub const DEFAULT_OUTLINE_SIZE: f32 = 0.05;
/// Toon highlight exponent.
pub const DEFAULT_SPECULAR_POWER: f32 = 32.0;
/// Cell-shade shadow color.
pub const DEFAULT_DARK_COLOR: u32 = 0x1a1a1a;
/// Cell-shade highlight color.
pub const DEFAULT_LIGHT_COLOR: u32 = 0xffffff;
/// Cell-shade posterization steps.
pub const DEFAULT_CELL_COUNT: f32 = 3.0;
/// Watercolor pigment density.
pub const DEFAULT_WATER_DENSITY: f32 = 0.7;

const CELL_LIGHT_EDGE: f32 = 0.666;
const CELL_BASE_EDGE: f32 = 0.333;

/// Which faces of a mesh a material draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceSide {
    /// Faces wound counter-clockwise towards the camera.
    Front,
    /// Faces pointing away from the camera.
    Back,
    /// Both sides.
    Double,
}

/// The four shading programs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    /// Banded diffuse, hard highlight and rim.
    Toon,
    /// Three flat bands: shadow, base and highlight.
    CellShade,
    /// Soft vertical wash with animated pigment noise.
    Watercolor,
    /// Flat black back faces.
    Outline,
}

impl MaterialKind {
    /// Every kind, in declaration order.
    pub const ALL: [MaterialKind; 4] = [
        MaterialKind::Toon,
        MaterialKind::CellShade,
        MaterialKind::Watercolor,
        MaterialKind::Outline,
    ];

    /// Lowercase snake_case name, as accepted by `FromStr`.
    pub fn as_str(self) -> &'static str {
        match self {
            MaterialKind::Toon => "toon",
            MaterialKind::CellShade => "cell_shade",
            MaterialKind::Watercolor => "watercolor",
            MaterialKind::Outline => "outline",
        }
    }
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MaterialKind {
    type Err = AvatarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "toon" => Ok(MaterialKind::Toon),
            "cell_shade" | "cell-shade" | "cell" => Ok(MaterialKind::CellShade),
            "watercolor" => Ok(MaterialKind::Watercolor),
            "outline" => Ok(MaterialKind::Outline),
            other => Err(AvatarError::validation(format!(
                "unknown material kind '{other}' (expected toon, cell_shade, watercolor or outline)"
            ))),
        }
    }
}

// Option records. Every field is optional in JSON; a zero or non-finite number falls
// back to its default, matching how these options have always been read.

/// Toon material options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToonOptions {
    /// Lighting steps.
    pub bands: f32,
    /// Outline thickness in world units.
    pub outline_size: f32,
    /// Highlight exponent.
    pub specular_power: f32,
    /// World position of the shading light.
    pub light_position: [f32; 3],
}

impl Default for ToonOptions {
    fn default() -> Self {
        Self {
            bands: DEFAULT_BANDS,
            outline_size: DEFAULT_OUTLINE_SIZE,
            specular_power: DEFAULT_SPECULAR_POWER,
            light_position: DEFAULT_LIGHT_POSITION,
        }
    }
}

/// Cell-shade material options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellShadeOptions {
    /// Shadow band color as `0xRRGGBB`.
    pub dark_color: u32,
    /// Highlight band color as `0xRRGGBB`.
    pub light_color: u32,
    /// Posterization steps; `cellSize` is read as an alias.
    #[serde(alias = "cellSize")]
    pub cell_count: f32,
    /// World position of the shading light.
    pub light_position: [f32; 3],
}

impl Default for CellShadeOptions {
    fn default() -> Self {
        Self {
            dark_color: DEFAULT_DARK_COLOR,
            light_color: DEFAULT_LIGHT_COLOR,
            cell_count: DEFAULT_CELL_COUNT,
            light_position: DEFAULT_LIGHT_POSITION,
        }
    }
}

/// Watercolor material options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatercolorOptions {
    /// Pigment density; higher values give stronger noise.
    pub water_density: f32,
}

impl Default for WatercolorOptions {
    fn default() -> Self {
        Self {
            water_density: DEFAULT_WATER_DENSITY,
        }
    }
}

/// Options for every material kind, as read from one JSON document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShaderOptions {
    /// Options for [`toon`].
    pub toon: ToonOptions,
    /// Options for [`cell_shade`].
    pub cell_shade: CellShadeOptions,
    /// Options for [`watercolor`].
    pub watercolor: WatercolorOptions,
}

fn or_default(v: f32, default: f32) -> f32 {
    if v.is_finite() && v != 0.0 { v } else { default }
}

fn color_or_default(v: u32, default: u32) -> u32 {
    if v == 0 { default } else { v }
}

/// Uniforms of the toon program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToonUniforms {
    /// Base color, linear `[0, 1]`.
    pub color: Vec3,
    /// World position of the light.
    pub light_position: Vec3,
    /// Lighting steps.
    pub bands: f32,
    /// Carried for GPU outline programs; the toon fragment program ignores it.
    pub outline_size: f32,
    /// Highlight exponent.
    pub specular_power: f32,
}

/// Uniforms of the cell-shade program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellShadeUniforms {
    /// Base band color.
    pub color: Vec3,
    /// Shadow band color.
    pub dark_color: Vec3,
    /// Highlight band color.
    pub light_color: Vec3,
    /// World position of the light.
    pub light_position: Vec3,
    /// Posterization steps.
    pub cell_count: f32,
}

/// Uniforms of the watercolor program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatercolorUniforms {
    /// Pigment color.
    pub color: Vec3,
    /// Pigment density.
    pub water_density: f32,
    /// Seconds driving the pigment drift.
    pub time: f32,
}

/// Uniforms of the outline program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutlineUniforms {
    /// Flat outline color.
    pub color: Vec3,
}

/// Inputs of one fragment evaluation, all in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    /// Fragment position.
    pub position: Vec3,
    /// Unit surface normal, flipped on back faces.
    pub normal: Vec3,
    /// Unit vector from the fragment towards the camera.
    pub view_dir: Vec3,
}

/// A material with its uniforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShaderMaterial {
    /// See [`toon`].
    Toon(ToonUniforms),
    /// See [`cell_shade`].
    CellShade(CellShadeUniforms),
    /// See [`watercolor`].
    Watercolor(WatercolorUniforms),
    /// See [`outline`].
    Outline(OutlineUniforms),
}

/// Toon material in `base`. Zero or non-finite options take their defaults.
pub fn toon(base: Rgb, opts: &ToonOptions) -> ShaderMaterial {
    ShaderMaterial::Toon(ToonUniforms {
        color: base.to_vec3(),
        light_position: Vec3::from_array(opts.light_position),
        bands: or_default(opts.bands, DEFAULT_BANDS),
        outline_size: or_default(opts.outline_size, DEFAULT_OUTLINE_SIZE),
        specular_power: or_default(opts.specular_power, DEFAULT_SPECULAR_POWER),
    })
}

/// Cell-shade material in `base`. Zero options take their defaults.
pub fn cell_shade(base: Rgb, opts: &CellShadeOptions) -> ShaderMaterial {
    ShaderMaterial::CellShade(CellShadeUniforms {
        color: base.to_vec3(),
        dark_color: Rgb::from_u24(color_or_default(opts.dark_color, DEFAULT_DARK_COLOR)).to_vec3(),
        light_color: Rgb::from_u24(color_or_default(opts.light_color, DEFAULT_LIGHT_COLOR))
            .to_vec3(),
        light_position: Vec3::from_array(opts.light_position),
        cell_count: or_default(opts.cell_count, DEFAULT_CELL_COUNT),
    })
}

/// Watercolor material in `base`, starting at time 0.
pub fn watercolor(base: Rgb, opts: &WatercolorOptions) -> ShaderMaterial {
    ShaderMaterial::Watercolor(WatercolorUniforms {
        color: base.to_vec3(),
        water_density: or_default(opts.water_density, DEFAULT_WATER_DENSITY),
        time: 0.0,
    })
}

/// Flat black, drawn on back faces.
pub fn outline() -> ShaderMaterial {
    ShaderMaterial::Outline(OutlineUniforms { color: Vec3::ZERO })
}

/// Builds the material of `kind` for `base` from the matching option record.
pub fn material_for(kind: MaterialKind, base: Rgb, opts: &ShaderOptions) -> ShaderMaterial {
    match kind {
        MaterialKind::Toon => toon(base, &opts.toon),
        MaterialKind::CellShade => cell_shade(base, &opts.cell_shade),
        MaterialKind::Watercolor => watercolor(base, &opts.watercolor),
        MaterialKind::Outline => outline(),
    }
}

impl ShaderMaterial {
    /// Which program this is.
    pub fn kind(&self) -> MaterialKind {
        match self {
            ShaderMaterial::Toon(_) => MaterialKind::Toon,
            ShaderMaterial::CellShade(_) => MaterialKind::CellShade,
            ShaderMaterial::Watercolor(_) => MaterialKind::Watercolor,
            ShaderMaterial::Outline(_) => MaterialKind::Outline,
        }
    }

    /// Faces drawn by default: back for outlines, front otherwise.
    pub fn side(&self) -> FaceSide {
        match self {
            ShaderMaterial::Outline(_) => FaceSide::Back,
            _ => FaceSide::Front,
        }
    }

    /// The color uniform.
    pub fn base_color(&self) -> Vec3 {
        match self {
            ShaderMaterial::Toon(u) => u.color,
            ShaderMaterial::CellShade(u) => u.color,
            ShaderMaterial::Watercolor(u) => u.color,
            ShaderMaterial::Outline(u) => u.color,
        }
    }

    /// Replaces the color uniform.
    pub fn set_base_color(&mut self, c: Rgb) {
        let c = c.to_vec3();
        match self {
            ShaderMaterial::Toon(u) => u.color = c,
            ShaderMaterial::CellShade(u) => u.color = c,
            ShaderMaterial::Watercolor(u) => u.color = c,
            ShaderMaterial::Outline(u) => u.color = c,
        }
    }

    /// Returns `false` for materials without a light-position uniform.
    pub fn set_light_position(&mut self, p: Vec3) -> bool {
        match self {
            ShaderMaterial::Toon(u) => u.light_position = p,
            ShaderMaterial::CellShade(u) => u.light_position = p,
            _ => return false,
        }
        true
    }

    /// Advances the time uniform; returns `false` for materials without one.
    pub fn set_time(&mut self, t: f32) -> bool {
        match self {
            ShaderMaterial::Watercolor(u) => {
                u.time = t;
                true
            }
            _ => false,
        }
    }

    /// Linear RGB, unclamped.
    pub fn shade(&self, frag: &Fragment) -> Vec3 {
        match self {
            ShaderMaterial::Toon(u) => shade_toon(u, frag),
            ShaderMaterial::CellShade(u) => shade_cell(u, frag),
            ShaderMaterial::Watercolor(u) => shade_watercolor(u, frag),
            ShaderMaterial::Outline(u) => u.color,
        }
    }

    /// WGSL fragment program equivalent to [`ShaderMaterial::shade`].
    pub fn wgsl_source(&self) -> &'static str {
        match self {
            ShaderMaterial::Toon(_) => TOON_WGSL,
            ShaderMaterial::CellShade(_) => CELL_SHADE_WGSL,
            ShaderMaterial::Watercolor(_) => WATERCOLOR_WGSL,
            ShaderMaterial::Outline(_) => OUTLINE_WGSL,
        }
    }
}

/// Quantized Lambert term of the toon program.
pub fn toon_diffuse(n_dot_l: f32, bands: f32) -> f32 {
    quantize(n_dot_l.max(0.0), bands)
}

fn shade_toon(u: &ToonUniforms, frag: &Fragment) -> Vec3 {
    let light_dir = (u.light_position - frag.position).normalize_or_zero();
    let n = frag.normal.normalize_or_zero();

    let diffuse = toon_diffuse(n.dot(light_dir), u.bands);
    let r = reflect(-light_dir, n);
    let specular = step(0.5, frag.view_dir.dot(r).max(0.0).powf(u.specular_power));
    let rim = smoothstep(0.0, 1.0, 1.0 - frag.view_dir.dot(n)) * 0.3;

    u.color * (0.3 + diffuse * 0.7) + Vec3::splat(specular * 0.5) + Vec3::splat(rim)
}

/// Band picked by the cell-shade program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellBand {
    /// Highlight.
    Light,
    /// Base color.
    Base,
    /// Shadow.
    Dark,
}

/// Posterizes `intensity` into `cells` steps and picks the band it lands in.
pub fn cell_band(intensity: f32, cells: f32) -> CellBand {
    let v = quantize(intensity.max(0.0), cells);
    if v > CELL_LIGHT_EDGE {
        CellBand::Light
    } else if v > CELL_BASE_EDGE {
        CellBand::Base
    } else {
        CellBand::Dark
    }
}

fn shade_cell(u: &CellShadeUniforms, frag: &Fragment) -> Vec3 {
    let light_dir = (u.light_position - frag.position).normalize_or_zero();
    let n = frag.normal.normalize_or_zero();
    match cell_band(n.dot(light_dir), u.cell_count) {
        CellBand::Light => mix(u.color, u.light_color, 0.3),
        CellBand::Base => u.color,
        CellBand::Dark => mix(u.color, u.dark_color, 0.5),
    }
}

/// Hash noise in `[0, 1)`: `fract(sin(p · (12.9898, 78.233, 45.164)) * 43758.5453)`.
pub fn watercolor_noise(p: Vec3) -> f32 {
    fract(p.dot(Vec3::new(12.9898, 78.233, 45.164)).sin() * 43758.5453)
}

/// Vertical gradient perturbed by noise, clamped to `[0.3, 1.0]`.
pub fn watercolor_gradient(normal_y: f32, noise: f32, density: f32) -> f32 {
    let g = (normal_y + 1.0) * 0.5 + (noise - 0.5) * density;
    g.clamp(0.3, 1.0)
}

fn shade_watercolor(u: &WatercolorUniforms, frag: &Fragment) -> Vec3 {
    let n = frag.normal.normalize_or_zero();
    let noise = watercolor_noise(frag.position * 3.0 + u.time * 0.1);
    let g = watercolor_gradient(n.y, noise, u.water_density);
    mix(u.color * 0.5, u.color, g)
}

const TOON_WGSL: &str = r#"struct ToonUniforms {
    color: vec3<f32>,
    bands: f32,
    light_pos: vec3<f32>,
    outline_size: f32,
    camera_pos: vec3<f32>,
    specular_power: f32,
};

@group(1) @binding(0) var<uniform> u: ToonUniforms;

struct FragmentIn {
    @builtin(position) clip: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

fn quantize(value: f32, levels: f32) -> f32 {
    return floor(value * levels) / levels;
}

@fragment
fn fs_main(in: FragmentIn) -> @location(0) vec4<f32> {
    let light_dir = normalize(u.light_pos - in.world_pos);
    let n = normalize(in.normal);
    let v = normalize(u.camera_pos - in.world_pos);

    let diffuse = quantize(max(0.0, dot(n, light_dir)), u.bands);
    let r = reflect(-light_dir, n);
    let specular = step(0.5, pow(max(0.0, dot(v, r)), u.specular_power));
    let rim = smoothstep(0.0, 1.0, 1.0 - dot(v, n)) * 0.3;

    var color = u.color * (0.3 + diffuse * 0.7);
    color += vec3<f32>(specular * 0.5);
    color += vec3<f32>(rim);
    return vec4<f32>(color, 1.0);
}
"#;

const CELL_SHADE_WGSL: &str = r#"struct CellShadeUniforms {
    color: vec3<f32>,
    cell_count: f32,
    dark_color: vec3<f32>,
    _pad0: f32,
    light_color: vec3<f32>,
    _pad1: f32,
    light_pos: vec3<f32>,
    _pad2: f32,
};

@group(1) @binding(0) var<uniform> u: CellShadeUniforms;

struct FragmentIn {
    @builtin(position) clip: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@fragment
fn fs_main(in: FragmentIn) -> @location(0) vec4<f32> {
    let light_dir = normalize(u.light_pos - in.world_pos);
    let n = normalize(in.normal);
    let intensity = floor(max(0.0, dot(n, light_dir)) * u.cell_count) / u.cell_count;

    var color = mix(u.color, u.dark_color, 0.5);
    if (intensity > 0.666) {
        color = mix(u.color, u.light_color, 0.3);
    } else if (intensity > 0.333) {
        color = u.color;
    }
    return vec4<f32>(color, 1.0);
}
"#;

const WATERCOLOR_WGSL: &str = r#"struct WatercolorUniforms {
    color: vec3<f32>,
    water_density: f32,
    time: f32,
};

@group(1) @binding(0) var<uniform> u: WatercolorUniforms;

struct FragmentIn {
    @builtin(position) clip: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

fn noise(p: vec3<f32>) -> f32 {
    return fract(sin(dot(p, vec3<f32>(12.9898, 78.233, 45.164))) * 43758.5453);
}

@fragment
fn fs_main(in: FragmentIn) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    var gradient = (n.y + 1.0) * 0.5;
    gradient += (noise(in.world_pos * 3.0 + vec3<f32>(u.time * 0.1)) - 0.5) * u.water_density;
    gradient = clamp(gradient, 0.3, 1.0);
    return vec4<f32>(mix(u.color * 0.5, u.color, gradient), 1.0);
}
"#;

const OUTLINE_WGSL: &str = r#"struct OutlineUniforms {
    color: vec3<f32>,
};

@group(1) @binding(0) var<uniform> u: OutlineUniforms;

@fragment
fn fs_main(@builtin(position) clip: vec4<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(u.color, 1.0);
}
"#;

#[cfg(test)]
#[path = "../../tests/unit/shading/material.rs"]
mod tests;
