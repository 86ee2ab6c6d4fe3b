//! Kindlewick draws procedural cartoon monster avatars.
//!
//! An [`AvatarConfig`] (body, eyes, mouth, accessory, two colors) is turned into pixels
//! in four steps:
//!
//! 1. **Resolve**: `AvatarConfig -> Vec<PartRecipe>`, a pure, total mapping from style
//!    codes to drawing recipes.
//! 2. **Compose**: `&[PartRecipe] -> SceneNode`, a named scene graph at most three
//!    levels deep.
//! 3. **Animate**: [`tick`] poses the graph for a time `t` (breathing, sway, blinking,
//!    arm waves). Only transforms change.
//! 4. **Rasterize**: [`Rasterizer`] draws the graph onto a premultiplied RGBA8
//!    [`Surface`] that can be exported as PNG or base64 PNG.
//!
//! [`AvatarSession`] ties these together behind a frame scheduler and swaps late
//! configurations in at frame boundaries.
//!
//! The shaded path builds the monster from spheres ([`build_avatar_scene`]), lights it
//! with a fixed rig ([`install_light_rig`]) and renders it through a
//! [`Renderer3d`] with toon, cell-shade or watercolor materials and an optional
//! [`OutlinePass`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation {
    pub mod core;
    pub mod error;
    pub mod math;
}

mod avatar {
    pub mod config;
    pub mod resolve;
    pub mod source;
}

mod scene {
    pub mod fingerprint;
    pub mod graph;
}

mod animation {
    pub mod clock;
}

mod render {
    pub mod cpu3d;
    pub mod raster;
    pub mod surface;
}

mod shading {
    pub mod lights;
    pub mod material;
    pub mod outline;
}

mod scene3d {
    pub mod avatar;
    pub mod camera;
    pub mod mesh;
    pub mod model;
}

mod session;

pub use animation::clock::{AnimationState, eyes_closed, tick};
pub use avatar::config::{
    Accessory, AvatarConfig, BodyType, CUTE_PALETTE, DEFAULT_ACCENT_COLOR, DEFAULT_PRIMARY_COLOR,
    EyeType, HexColor, MouthType,
};
pub use avatar::resolve::{
    PartKind, PartRecipe, Paint, PieceRecipe, Primitive, Shape, StrokeStyle, resolve,
    star_vertices,
};
pub use avatar::source::{ConfigSource, ConfigState, ReadyReason};
pub use foundation::core::{
    Affine, BezPath, Canvas, Fps, Point, Rgb, Rgba8Premul, Transform2D, Vec2,
};
pub use foundation::error::{AvatarError, AvatarResult};
pub use foundation::math::{fract, mix, quantize, reflect, smoothstep, step};
pub use render::cpu3d::{CompositeOp, CpuRenderer3d, DrawRequest, Renderer3d, TargetId};
pub use render::raster::{FrameRenderer, Rasterizer, clear_pixel, rasterize};
pub use render::surface::Surface;
pub use scene::fingerprint::{SceneFingerprint, fingerprint_scene};
pub use scene::graph::{Drawable, ROOT_NAME, SceneNode, compose, place_at_center};
pub use scene3d::avatar::{AvatarScene3d, build_avatar_scene};
pub use scene3d::camera::Camera;
pub use scene3d::mesh::{Mesh, Vertex};
pub use scene3d::model::{
    Light, LightKind, MeshInstance, Node3d, NodeId, NodeKind, Scene3d, apply_material,
};
pub use session::{AvatarSession, FrameHandle, FrameScheduler, ManualScheduler, SessionOpts};
pub use shading::lights::{LightRigHandles, install as install_light_rig};
pub use shading::material::{
    CellBand, CellShadeOptions, CellShadeUniforms, FaceSide, Fragment, MaterialKind,
    OutlineUniforms, ShaderMaterial, ShaderOptions, ToonOptions, ToonUniforms,
    WatercolorOptions, WatercolorUniforms, cell_band, cell_shade, material_for, outline, toon,
    toon_diffuse, watercolor, watercolor_gradient, watercolor_noise,
};
pub use shading::outline::OutlinePass;
