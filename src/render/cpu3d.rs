use std::collections::HashMap;

use glam::{Vec3, Vec4};

use crate::foundation::core::{Canvas, Rgb, Rgba8Premul};
use crate::foundation::error::{AvatarError, AvatarResult};
use crate::foundation::math::mul_div255;
use crate::render::surface::Surface;
use crate::scene3d::camera::Camera;
use crate::scene3d::model::Scene3d;
use crate::shading::material::{FaceSide, Fragment, ShaderMaterial};

/// Handle to a render target owned by a [`Renderer3d`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

/// One step of [`Renderer3d::composite`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompositeOp {
    /// Draws `src` over the target with source-over blending.
    Over {
        /// Target read from.
        src: TargetId,
        /// Multiplier on `src`, clamped to `[0, 1]`.
        opacity: f32,
    },
}

/// One scene draw into a render target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRequest<'a> {
    /// Target drawn into.
    pub target: TargetId,
    /// Straight RGBA written to every pixel before drawing; `None` keeps the contents.
    pub clear: Option<[u8; 4]>,
    /// Overrides each material's own face side.
    pub faces: Option<FaceSide>,
    /// Replaces every mesh material for this draw only.
    pub material_override: Option<&'a ShaderMaterial>,
    /// World-space distance vertices are pushed along their normals.
    pub hull_offset: f32,
}

impl<'a> DrawRequest<'a> {
    /// Draws into `target` without clearing, using each material as is.
    pub fn new(target: TargetId) -> Self {
        Self {
            target,
            clear: None,
            faces: None,
            material_override: None,
            hull_offset: 0.0,
        }
    }

    /// Clears to straight-alpha `rgba` first.
    pub fn cleared(mut self, rgba: [u8; 4]) -> Self {
        self.clear = Some(rgba);
        self
    }

    /// Draws only `side` faces, whatever the materials say.
    pub fn faces(mut self, side: FaceSide) -> Self {
        self.faces = Some(side);
        self
    }

    /// Shades every mesh with `material`.
    pub fn override_material(mut self, material: &'a ShaderMaterial) -> Self {
        self.material_override = Some(material);
        self
    }

    /// Inflates every mesh by `offset` along its vertex normals.
    pub fn hull_offset(mut self, offset: f32) -> Self {
        self.hull_offset = offset;
        self
    }
}

/// Render-target based 3D renderer used by the shading passes.
pub trait Renderer3d {
    /// Allocates a transparent `width` x `height` target.
    fn create_target(&mut self, width: u32, height: u32) -> AvatarResult<TargetId>;

    /// Frees a target. Releasing an unknown or already released target is a no-op
    /// and returns `false`.
    fn release_target(&mut self, id: TargetId) -> bool;

    /// Size of a live target.
    fn target_size(&self, id: TargetId) -> Option<(u32, u32)>;

    /// Draws every mesh of `scene` as seen from `camera`, depth tested.
    fn render(&mut self, scene: &Scene3d, camera: &Camera, req: &DrawRequest<'_>)
    -> AvatarResult<()>;

    /// Applies `ops` onto `target` in order. The target is not cleared first.
    fn composite(&mut self, target: TargetId, ops: &[CompositeOp]) -> AvatarResult<()>;

    /// Copies a target's pixels out.
    fn read_pixels(&self, id: TargetId) -> AvatarResult<Surface>;
}

struct CpuTarget {
    canvas: Canvas,
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl CpuTarget {
    fn clear(&mut self, rgba: [u8; 4]) {
        let px = Rgba8Premul::from_straight_rgba(rgba[0], rgba[1], rgba[2], rgba[3]).to_array();
        for chunk in self.color.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
        self.depth.fill(f32::INFINITY);
    }

    /// Premultiplied source-over of `src` scaled by `opacity`. Depth is untouched.
    fn blend_over(&mut self, src: &CpuTarget, opacity: f32) -> AvatarResult<()> {
        if self.canvas != src.canvas {
            return Err(AvatarError::render(format!(
                "composite src is {}x{}, target is {}x{}",
                src.canvas.width, src.canvas.height, self.canvas.width, self.canvas.height
            )));
        }
        let gain = (opacity.clamp(0.0, 1.0) * 255.0).round() as u16;
        if gain == 0 {
            return Ok(());
        }
        for (d, s) in self.color.chunks_exact_mut(4).zip(src.color.chunks_exact(4)) {
            let coverage = mul_div255(u16::from(s[3]), gain);
            if coverage == 0 {
                continue;
            }
            let keep = 255 - coverage;
            for (c, &sc) in d[..3].iter_mut().zip(&s[..3]) {
                let v = mul_div255(u16::from(sc), gain) + mul_div255(u16::from(*c), keep);
                *c = v.min(255) as u8;
            }
            d[3] = (coverage + mul_div255(u16::from(d[3]), keep)).min(255) as u8;
        }
        Ok(())
    }
}

/// Z-buffered triangle rasterizer evaluating [`ShaderMaterial::shade`] per pixel.
#[derive(Default)]
pub struct CpuRenderer3d {
    targets: HashMap<TargetId, CpuTarget>,
    next_id: u32,
}

impl std::fmt::Debug for CpuRenderer3d {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer3d")
            .field("targets", &self.targets.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl CpuRenderer3d {
    /// A renderer with no targets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of targets not yet released.
    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    fn target_mut(&mut self, id: TargetId) -> AvatarResult<&mut CpuTarget> {
        self.targets
            .get_mut(&id)
            .ok_or_else(|| AvatarError::render(format!("render target {id:?} does not exist")))
    }
}

impl Renderer3d for CpuRenderer3d {
    fn create_target(&mut self, width: u32, height: u32) -> AvatarResult<TargetId> {
        let canvas = Canvas::new(width, height)?;
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.targets.insert(
            id,
            CpuTarget {
                canvas,
                color: vec![0; canvas.pixel_count() * 4],
                depth: vec![f32::INFINITY; canvas.pixel_count()],
            },
        );
        tracing::debug!(?id, width, height, "created render target");
        Ok(id)
    }

    fn release_target(&mut self, id: TargetId) -> bool {
        self.targets.remove(&id).is_some()
    }

    fn target_size(&self, id: TargetId) -> Option<(u32, u32)> {
        self.targets
            .get(&id)
            .map(|t| (t.canvas.width, t.canvas.height))
    }

    #[tracing::instrument(skip(self, scene, camera, req), fields(target = ?req.target))]
    fn render(
        &mut self,
        scene: &Scene3d,
        camera: &Camera,
        req: &DrawRequest<'_>,
    ) -> AvatarResult<()> {
        let target = self.target_mut(req.target)?;
        if let Some(rgba) = req.clear {
            target.clear(rgba);
        }

        let w = target.canvas.width as f32;
        let h = target.canvas.height as f32;
        let view_proj = camera.view_projection(w / h);

        for inst in scene.mesh_instances() {
            let material = req.material_override.unwrap_or(inst.material);
            let side = req.faces.unwrap_or_else(|| material.side());

            for tri in inst.mesh.triangles() {
                let normals = tri.map(|v| (inst.normal_matrix * v.normal).normalize_or_zero());
                let mut world = tri.map(|v| inst.world.transform_point3(v.position));
                if req.hull_offset != 0.0 {
                    for (p, n) in world.iter_mut().zip(normals) {
                        *p += n * req.hull_offset;
                    }
                }

                let face_normal = (world[1] - world[0]).cross(world[2] - world[0]);
                let front = face_normal.dot(camera.position - world[0]) > 0.0;
                let visible = match side {
                    FaceSide::Front => front,
                    FaceSide::Back => !front,
                    FaceSide::Double => true,
                };
                if !visible {
                    continue;
                }

                let clip = world.map(|p| view_proj * p.extend(1.0));
                if clip.iter().any(|c| c.w <= 1e-5) {
                    continue;
                }

                let tri = ClipTriangle {
                    clip,
                    world,
                    normals,
                    front,
                };
                rasterize_triangle(target, &tri, material, camera.position);
            }
        }
        Ok(())
    }

    fn composite(&mut self, target: TargetId, ops: &[CompositeOp]) -> AvatarResult<()> {
        let mut dst = self
            .targets
            .remove(&target)
            .ok_or_else(|| AvatarError::render(format!("composite target {target:?} does not exist")))?;

        let mut result = Ok(());
        for op in ops {
            match *op {
                CompositeOp::Over { src, opacity } => {
                    let Some(src) = self.targets.get(&src) else {
                        result = Err(AvatarError::render(format!(
                            "composite src {src:?} does not exist"
                        )));
                        break;
                    };
                    if let Err(e) = dst.blend_over(src, opacity) {
                        result = Err(e);
                        break;
                    }
                }
            }
        }

        self.targets.insert(target, dst);
        result
    }

    fn read_pixels(&self, id: TargetId) -> AvatarResult<Surface> {
        let target = self
            .targets
            .get(&id)
            .ok_or_else(|| AvatarError::render(format!("render target {id:?} does not exist")))?;
        Surface::from_premul_rgba8(target.canvas, target.color.clone())
    }
}

struct ClipTriangle {
    clip: [Vec4; 3],
    world: [Vec3; 3],
    normals: [Vec3; 3],
    front: bool,
}

fn edge(a: Vec3, b: Vec3, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

fn rasterize_triangle(
    target: &mut CpuTarget,
    tri: &ClipTriangle,
    material: &ShaderMaterial,
    eye: Vec3,
) {
    let w = target.canvas.width as f32;
    let h = target.canvas.height as f32;

    // Screen space: x right, y down, z = NDC depth in [0, 1].
    let s = tri.clip.map(|c| {
        let ndc = c.truncate() / c.w;
        Vec3::new((ndc.x * 0.5 + 0.5) * w, (0.5 - ndc.y * 0.5) * h, ndc.z)
    });
    let area = edge(s[0], s[1], s[2].x, s[2].y);
    if area.abs() < 1e-8 {
        return;
    }

    let min_x = s.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let min_y = s.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
    let max_x = s.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil().min(w) as u32;
    let max_y = s.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil().min(h) as u32;
    let inv_w = tri.clip.map(|c| 1.0 / c.w);

    for y in min_y..max_y {
        for x in min_x..max_x {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            let b = [
                edge(s[1], s[2], px, py) / area,
                edge(s[2], s[0], px, py) / area,
                edge(s[0], s[1], px, py) / area,
            ];
            if b.iter().any(|&v| v < 0.0) {
                continue;
            }

            let z = b[0] * s[0].z + b[1] * s[1].z + b[2] * s[2].z;
            let idx = (y * target.canvas.width + x) as usize;
            if !(0.0..=1.0).contains(&z) || z >= target.depth[idx] {
                continue;
            }

            // Perspective-correct weights.
            let pw = [b[0] * inv_w[0], b[1] * inv_w[1], b[2] * inv_w[2]];
            let sum = pw[0] + pw[1] + pw[2];
            let pw = pw.map(|v| v / sum);

            let position = tri.world[0] * pw[0] + tri.world[1] * pw[1] + tri.world[2] * pw[2];
            let mut normal = (tri.normals[0] * pw[0] + tri.normals[1] * pw[1]
                + tri.normals[2] * pw[2])
                .normalize_or_zero();
            if !tri.front {
                normal = -normal;
            }

            let frag = Fragment {
                position,
                normal,
                view_dir: (eye - position).normalize_or_zero(),
            };
            let rgb = Rgb::from_vec3(material.shade(&frag));

            target.depth[idx] = z;
            target.color[idx * 4..idx * 4 + 4].copy_from_slice(&Rgba8Premul::opaque(rgb).to_array());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu3d.rs"]
mod tests;
