use glam::Vec3;

use crate::foundation::core::Rgb;
use crate::foundation::error::AvatarResult;
use crate::scene3d::model::{Light, LightKind, NodeId, Scene3d};

/// Shadow map resolution of the key light.
pub const KEY_SHADOW_MAP_SIZE: [u32; 2] = [2048, 2048];

/// Ids of the four lights placed by [`install`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightRigHandles {
    /// Main white light, casting shadows.
    pub key: NodeId,
    /// Cool light from the opposite side.
    pub fill: NodeId,
    /// Warm light from behind.
    pub rim: NodeId,
    /// Uniform base light.
    pub ambient: NodeId,
}

impl LightRigHandles {
    /// Key, fill, rim and ambient ids, in that order.
    pub fn ids(&self) -> [NodeId; 4] {
        [self.key, self.fill, self.rim, self.ambient]
    }

    /// Removes exactly the rig's lights; other lights stay. Returns how many were
    /// still present.
    pub fn uninstall(self, scene: &mut Scene3d) -> usize {
        self.ids().into_iter().map(|id| scene.remove(id)).sum()
    }
}

fn directional(position: Vec3, color: u32, intensity: f32, cast_shadow: bool) -> Light {
    Light {
        kind: LightKind::Directional {
            position,
            cast_shadow,
            shadow_map_size: if cast_shadow {
                KEY_SHADOW_MAP_SIZE
            } else {
                [0, 0]
            },
        },
        color: Rgb::from_u24(color),
        intensity,
    }
}

/// Replaces every light in `scene` with the stylized key/fill/rim/ambient rig.
///
/// Installing twice leaves exactly one rig.
pub fn install(scene: &mut Scene3d) -> AvatarResult<LightRigHandles> {
    let existing = scene.lights();
    let removed: usize = existing.into_iter().map(|id| scene.remove(id)).sum();
    if removed > 0 {
        tracing::debug!(removed, "replaced existing lights");
    }

    let key = scene.add_light(
        "key_light",
        directional(Vec3::new(10.0, 10.0, 5.0), 0xffffff, 1.2, true),
    )?;
    let fill = scene.add_light(
        "fill_light",
        directional(Vec3::new(-10.0, 5.0, -10.0), 0x6699ff, 0.5, false),
    )?;
    let rim = scene.add_light(
        "rim_light",
        directional(Vec3::new(0.0, 5.0, -15.0), 0xffaa44, 0.4, false),
    )?;
    let ambient = scene.add_light(
        "ambient_light",
        Light {
            kind: LightKind::Ambient,
            color: Rgb::WHITE,
            intensity: 0.6,
        },
    )?;

    Ok(LightRigHandles {
        key,
        fill,
        rim,
        ambient,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/shading/lights.rs"]
mod tests;
