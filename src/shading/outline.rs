//! Two-pass silhouette outline.
//!
//! Pass 1 draws every mesh's back faces in flat black, pushed out along the vertex
//! normals, into an intermediate target. Pass 2 draws the front faces with the
//! scene's own materials into a second target, which is then composited over the
//! first. The black shell only survives where it pokes out past the silhouette.

use crate::foundation::error::{AvatarError, AvatarResult};
use crate::render::cpu3d::{CompositeOp, DrawRequest, Renderer3d, TargetId};
use crate::scene3d::camera::Camera;
use crate::scene3d::model::Scene3d;
use crate::shading::material::{DEFAULT_OUTLINE_SIZE, FaceSide, outline};

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Owns the two targets of the outline technique until [`OutlinePass::dispose`].
#[derive(Debug)]
pub struct OutlinePass {
    back: Option<TargetId>,
    front: Option<TargetId>,
    thickness: f32,
}

impl OutlinePass {
    /// Allocates the pass's two render targets on `renderer`.
    pub fn new(renderer: &mut dyn Renderer3d, width: u32, height: u32) -> AvatarResult<Self> {
        let back = renderer.create_target(width, height)?;
        let front = match renderer.create_target(width, height) {
            Ok(id) => id,
            Err(e) => {
                renderer.release_target(back);
                return Err(e);
            }
        };
        Ok(Self {
            back: Some(back),
            front: Some(front),
            thickness: DEFAULT_OUTLINE_SIZE,
        })
    }

    /// World-space width of the outline shell.
    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness.max(0.0);
        self
    }

    /// World-space width of the outline shell.
    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// `true` once the targets have been released.
    pub fn is_disposed(&self) -> bool {
        self.back.is_none()
    }

    /// Renders `scene` with outlines and returns the target holding the result.
    ///
    /// The scene's materials are left untouched; the black material is applied as
    /// a per-draw override.
    #[tracing::instrument(skip_all)]
    pub fn render(
        &mut self,
        renderer: &mut dyn Renderer3d,
        scene: &Scene3d,
        camera: &Camera,
    ) -> AvatarResult<TargetId> {
        let (Some(back), Some(front)) = (self.back, self.front) else {
            return Err(AvatarError::render("outline pass used after dispose"));
        };

        let black = outline();
        renderer.render(
            scene,
            camera,
            &DrawRequest::new(back)
                .cleared(TRANSPARENT)
                .faces(FaceSide::Back)
                .override_material(&black)
                .hull_offset(self.thickness),
        )?;
        renderer.render(scene, camera, &DrawRequest::new(front).cleared(TRANSPARENT))?;
        renderer.composite(
            back,
            &[CompositeOp::Over {
                src: front,
                opacity: 1.0,
            }],
        )?;
        Ok(back)
    }

    /// Releases both targets. Returns `false` when already disposed.
    pub fn dispose(&mut self, renderer: &mut dyn Renderer3d) -> bool {
        let (Some(back), Some(front)) = (self.back.take(), self.front.take()) else {
            return false;
        };
        renderer.release_target(back);
        renderer.release_target(front);
        tracing::debug!("outline pass disposed");
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shading/outline.rs"]
mod tests;
