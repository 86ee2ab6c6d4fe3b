//! The monster as lit spheres for the shaded 3D path.
//!
//! Layout mirrors the flat avatar at one world unit per 40 px with y pointing up:
//! body, two eyes (white + pupil) grouped for blinking, and two arm spheres.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::animation::clock::AnimationState;
use crate::avatar::config::AvatarConfig;
use crate::avatar::resolve::color_or_black;
use crate::foundation::core::Rgb;
use crate::foundation::error::AvatarResult;
use crate::scene3d::camera::Camera;
use crate::scene3d::mesh::Mesh;
use crate::scene3d::model::{Node3d, NodeId, Scene3d, apply_material};
use crate::shading::lights::{self, LightRigHandles};
use crate::shading::material::{MaterialKind, ShaderOptions, material_for};

const SEGMENTS: u32 = 32;
const RINGS: u32 = 16;

const BODY_CENTER: Vec3 = Vec3::new(0.0, -0.125, 0.0);
const EYES_CENTER: Vec3 = Vec3::new(0.0, 0.375, 0.0);
const EYE_X: f32 = 0.375;
const EYE_Z: f32 = 0.8;
const EYE_WHITE_RADIUS: f32 = 0.3;
const PUPIL_RADIUS: f32 = 0.15;
const ARM_X: f32 = 1.25;
const ARM_RADIUS: f32 = 0.2;

/// The sphere monster and ids of the nodes animation touches.
#[derive(Clone, Debug)]
pub struct AvatarScene3d {
    /// The scene, lights included.
    pub scene: Scene3d,
    /// Root group `monster`.
    pub root: NodeId,
    /// Body sphere.
    pub body: NodeId,
    /// Group holding both eyes; scaled to blink.
    pub eyes: NodeId,
    /// Left arm sphere.
    pub left_arm: NodeId,
    /// Right arm sphere.
    pub right_arm: NodeId,
    /// The installed light rig.
    pub lights: LightRigHandles,
    primary: Rgb,
    accent: Rgb,
    kind: MaterialKind,
}

/// Builds the sphere monster with every mesh shaded by `kind` and installs the
/// light rig.
#[tracing::instrument(skip(config, opts))]
pub fn build_avatar_scene(
    config: &AvatarConfig,
    kind: MaterialKind,
    opts: &ShaderOptions,
) -> AvatarResult<AvatarScene3d> {
    let primary = color_or_black("primaryColor", &config.primary_color);
    let accent = color_or_black("accentColor", &config.accent_color);

    let mut scene = Scene3d::new();
    let root = scene.add_group(Scene3d::ROOT, "monster", Mat4::IDENTITY)?;

    let body = scene.add_mesh(
        root,
        "body",
        Mat4::from_translation(BODY_CENTER),
        Arc::new(Mesh::uv_sphere(1.0, SEGMENTS, RINGS)),
        material_for(kind, primary, opts),
    )?;

    let eyes = scene.add_group(root, "eyes", Mat4::from_translation(EYES_CENTER))?;
    let white = Arc::new(Mesh::uv_sphere(EYE_WHITE_RADIUS, SEGMENTS / 2, RINGS / 2));
    let pupil = Arc::new(Mesh::uv_sphere(PUPIL_RADIUS, SEGMENTS / 2, RINGS / 2));
    for (side, x) in [("left", -EYE_X), ("right", EYE_X)] {
        scene.add_mesh(
            eyes,
            format!("{side}_eye_white"),
            Mat4::from_translation(Vec3::new(x, 0.0, EYE_Z)),
            white.clone(),
            material_for(kind, Rgb::WHITE, opts),
        )?;
        scene.add_mesh(
            eyes,
            format!("{side}_eye_pupil"),
            Mat4::from_translation(Vec3::new(x, 0.0, EYE_Z + 0.2)),
            pupil.clone(),
            material_for(kind, Rgb::BLACK, opts),
        )?;
    }

    let arm = Arc::new(Mesh::uv_sphere(ARM_RADIUS, SEGMENTS / 2, RINGS / 2));
    let mut arm_nodes = [Scene3d::ROOT; 2];
    for (slot, (name, x)) in arm_nodes
        .iter_mut()
        .zip([("left_arm", -ARM_X), ("right_arm", ARM_X)])
    {
        *slot = scene.add_mesh(
            root,
            name,
            Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
            arm.clone(),
            material_for(kind, accent, opts),
        )?;
    }
    let [left_arm, right_arm] = arm_nodes;

    let lights = lights::install(&mut scene)?;

    Ok(AvatarScene3d {
        scene,
        root,
        body,
        eyes,
        left_arm,
        right_arm,
        lights,
        primary,
        accent,
        kind,
    })
}

impl AvatarScene3d {
    /// Program the meshes are currently shaded with.
    pub fn material_kind(&self) -> MaterialKind {
        self.kind
    }

    /// Camera framing the whole monster.
    pub fn camera(&self) -> Camera {
        Camera::new().at(0.0, 0.0, 5.0).looking_at(0.0, 0.0, 0.0)
    }

    /// Reshades every mesh with `kind`, keeping each part's color. Returns the
    /// number of meshes changed.
    pub fn restyle(&mut self, kind: MaterialKind, opts: &ShaderOptions) -> usize {
        self.kind = kind;
        let mut changed = 0;
        for (id, color) in [
            (self.body, self.primary),
            (self.left_arm, self.accent),
            (self.right_arm, self.accent),
        ] {
            changed += apply_material(&mut self.scene, id, &material_for(kind, color, opts));
        }

        let eye_meshes = self.scene.meshes_in(self.eyes);
        for id in eye_meshes {
            let is_pupil = self
                .scene
                .get(id)
                .is_some_and(|n| n.name.ends_with("_pupil"));
            let color = if is_pupil { Rgb::BLACK } else { Rgb::WHITE };
            changed += apply_material(&mut self.scene, id, &material_for(kind, color, opts));
        }
        changed
    }

    /// Poses the monster for time `t` and advances time-driven materials.
    pub fn animate(&mut self, t: f64) -> AnimationState {
        let state = AnimationState::at(t);

        // Screen rotations are clockwise with y down; in y-up space that is -z.
        self.set_transform(
            self.root,
            Mat4::from_rotation_z(-state.body_rotation as f32)
                * Mat4::from_scale(Vec3::new(1.0, state.body_scale_y as f32, 1.0)),
        );
        self.set_transform(
            self.eyes,
            Mat4::from_translation(EYES_CENTER)
                * Mat4::from_scale(Vec3::new(1.0, state.eye_scale_y as f32, 1.0)),
        );
        self.set_transform(
            self.left_arm,
            Mat4::from_translation(Vec3::new(-ARM_X, 0.0, 0.0))
                * Mat4::from_rotation_z(-state.left_arm_rotation as f32),
        );
        self.set_transform(
            self.right_arm,
            Mat4::from_translation(Vec3::new(ARM_X, 0.0, 0.0))
                * Mat4::from_rotation_z(-state.right_arm_rotation as f32),
        );

        let meshes = self.scene.meshes_in(self.root);
        for id in meshes {
            if let Some(m) = self.scene.get_mut(id).and_then(Node3d::material_mut) {
                m.set_time(t as f32);
            }
        }
        state
    }

    fn set_transform(&mut self, id: NodeId, m: Mat4) {
        if let Some(node) = self.scene.get_mut(id) {
            node.transform = m;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene3d/avatar.rs"]
mod tests;
