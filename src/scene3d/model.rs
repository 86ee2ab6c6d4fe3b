use std::sync::Arc;

use glam::{Mat3, Mat4, Vec3};

use crate::foundation::core::Rgb;
use crate::foundation::error::{AvatarError, AvatarResult};
use crate::scene3d::mesh::Mesh;
use crate::shading::material::ShaderMaterial;

/// Index of a node in a [`Scene3d`]. Ids are never reused after removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Kind and placement of a light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    /// Parallel light shining from `position` towards the origin.
    Directional {
        /// Where the light shines from.
        position: Vec3,
        /// Whether the light casts shadows.
        cast_shadow: bool,
        /// Shadow map resolution in texels.
        shadow_map_size: [u32; 2],
    },
    /// Uniform light from every direction.
    Ambient,
}

/// A light in a [`Scene3d`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    /// Kind and placement.
    pub kind: LightKind,
    /// Light color.
    pub color: Rgb,
    /// Brightness multiplier.
    pub intensity: f32,
}

/// What a [`Node3d`] holds.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Transform-only node.
    Group,
    /// Drawable geometry.
    Mesh {
        /// Shared geometry.
        mesh: Arc<Mesh>,
        /// How the mesh is shaded.
        material: ShaderMaterial,
    },
    /// A light source.
    Light(Light),
}

/// One node of a [`Scene3d`].
#[derive(Clone, Debug)]
pub struct Node3d {
    /// Name used by [`Scene3d::find`].
    pub name: String,
    /// Transform relative to the parent.
    pub transform: Mat4,
    /// Payload.
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node3d {
    /// Parent node; `None` only for the scene root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// `true` for mesh nodes.
    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh { .. })
    }

    /// The light, for light nodes.
    pub fn light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(l) => Some(l),
            _ => None,
        }
    }

    /// The material, for mesh nodes.
    pub fn material(&self) -> Option<&ShaderMaterial> {
        match &self.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    /// Mutable material, for mesh nodes.
    pub fn material_mut(&mut self) -> Option<&mut ShaderMaterial> {
        match &mut self.kind {
            NodeKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }
}

/// One mesh ready to draw: world transform, normal matrix, geometry and material.
#[derive(Clone, Copy, Debug)]
pub struct MeshInstance<'a> {
    /// The mesh node.
    pub id: NodeId,
    /// Object-to-world transform.
    pub world: Mat4,
    /// Inverse transpose of the world transform's linear part.
    pub normal_matrix: Mat3,
    /// Geometry.
    pub mesh: &'a Mesh,
    /// Material.
    pub material: &'a ShaderMaterial,
}

/// Arena-backed 3D scene graph. Node 0 is the root group and cannot be removed.
#[derive(Clone, Debug)]
pub struct Scene3d {
    nodes: Vec<Option<Node3d>>,
}

impl Default for Scene3d {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene3d {
    /// The root group every scene starts with.
    pub const ROOT: NodeId = NodeId(0);

    /// An empty scene holding only the root group.
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node3d {
                name: "scene".to_owned(),
                transform: Mat4::IDENTITY,
                kind: NodeKind::Group,
                parent: None,
                children: Vec::new(),
            })],
        }
    }

    /// The live node `id`.
    pub fn get(&self, id: NodeId) -> Option<&Node3d> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Mutable access to the live node `id`.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node3d> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// `true` while `id` has not been removed.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Live nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Never `true` in practice; the root always exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a node under `parent`; fails if `parent` is not live.
    pub fn add(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Mat4,
        kind: NodeKind,
    ) -> AvatarResult<NodeId> {
        let id = NodeId(self.nodes.len());
        let p = self
            .get_mut(parent)
            .ok_or_else(|| AvatarError::validation(format!("parent node {parent:?} not found")))?;
        p.children.push(id);
        self.nodes.push(Some(Node3d {
            name: name.into(),
            transform,
            kind,
            parent: Some(parent),
            children: Vec::new(),
        }));
        Ok(id)
    }

    /// Appends a group node.
    pub fn add_group(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Mat4,
    ) -> AvatarResult<NodeId> {
        self.add(parent, name, transform, NodeKind::Group)
    }

    /// Appends a mesh node.
    pub fn add_mesh(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Mat4,
        mesh: Arc<Mesh>,
        material: ShaderMaterial,
    ) -> AvatarResult<NodeId> {
        self.add(parent, name, transform, NodeKind::Mesh { mesh, material })
    }

    /// Appends a light directly under the root.
    pub fn add_light(&mut self, name: impl Into<String>, light: Light) -> AvatarResult<NodeId> {
        self.add(Self::ROOT, name, Mat4::IDENTITY, NodeKind::Light(light))
    }

    /// Detaches `id` and drops its whole subtree. Returns how many nodes were removed;
    /// removing a missing node or the root removes nothing.
    pub fn remove(&mut self, id: NodeId) -> usize {
        if id == Self::ROOT {
            return 0;
        }
        let Some(parent) = self.get(id).map(|n| n.parent) else {
            return 0;
        };
        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.retain(|&c| c != id);
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(next.0).and_then(Option::take) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    /// First node named `name` in pre-order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.descendants(Self::ROOT)
            .into_iter()
            .find(|&id| self.get(id).is_some_and(|n| n.name == name))
    }

    /// `root` and every node below it, in pre-order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Every light node.
    pub fn lights(&self) -> Vec<NodeId> {
        self.descendants(Self::ROOT)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(|n| n.light().is_some()))
            .collect()
    }

    /// Mesh nodes in the subtree rooted at `root`.
    pub fn meshes_in(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(Node3d::is_mesh))
            .collect()
    }

    /// Product of the transforms from the scene root down to `id`.
    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        let mut m = self.get(id)?.transform;
        let mut cur = self.get(id)?.parent;
        while let Some(p) = cur {
            let node = self.get(p)?;
            m = node.transform * m;
            cur = node.parent;
        }
        Some(m)
    }

    /// Every mesh with its world transform, in pre-order.
    pub fn mesh_instances(&self) -> Vec<MeshInstance<'_>> {
        let mut out = Vec::new();
        let mut stack = vec![(Self::ROOT, Mat4::IDENTITY)];
        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            let world = parent * node.transform;
            if let NodeKind::Mesh { mesh, material } = &node.kind {
                out.push(MeshInstance {
                    id,
                    world,
                    normal_matrix: Mat3::from_mat4(world).inverse().transpose(),
                    mesh,
                    material,
                });
            }
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
        out
    }
}

/// Assigns `material` to every mesh in the subtree under `root`.
///
/// Mesh ids are gathered first over a shared borrow, then updated; the traversal
/// never observes a half-updated tree. Returns the number of meshes changed.
pub fn apply_material(scene: &mut Scene3d, root: NodeId, material: &ShaderMaterial) -> usize {
    let ids = scene.meshes_in(root);
    let mut changed = 0;
    for id in ids {
        if let Some(slot) = scene.get_mut(id).and_then(Node3d::material_mut) {
            *slot = *material;
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
#[path = "../../tests/unit/scene3d/model.rs"]
mod tests;
