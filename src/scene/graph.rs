use crate::avatar::resolve::{PartRecipe, Primitive};
use crate::foundation::core::{Affine, Canvas, Transform2D};

/// Name of the root node; the whole monster hangs below it.
pub const ROOT_NAME: &str = "monster";

/// A node of the avatar scene graph.
///
/// The tree is strict: every node exclusively owns its children. Group nodes carry no
/// primitive. Children draw after their parent, in order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SceneNode {
    /// Unique name within the avatar.
    pub name: &'static str,
    /// Placement relative to the parent.
    pub transform: Transform2D,
    /// What this node draws; `None` for groups.
    pub primitive: Option<Primitive>,
    /// Children in draw order.
    pub children: Vec<SceneNode>,
}

/// A primitive paired with the accumulated transform it is drawn with.
#[derive(Clone, Copy, Debug)]
pub struct Drawable<'a> {
    /// Name of the node the primitive belongs to.
    pub name: &'static str,
    /// Avatar-to-canvas transform, parents folded in.
    pub transform: Affine,
    /// What to draw.
    pub primitive: &'a Primitive,
}

impl SceneNode {
    /// A node without a primitive.
    pub fn group(name: &'static str, transform: Transform2D) -> Self {
        Self {
            name,
            transform,
            primitive: None,
            children: Vec::new(),
        }
    }

    /// A node that draws `primitive`.
    pub fn leaf(name: &'static str, transform: Transform2D, primitive: Primitive) -> Self {
        Self {
            name,
            transform,
            primitive: Some(primitive),
            children: Vec::new(),
        }
    }

    /// Direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&SceneNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First node named `name` in pre-order, this node included.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.name == name {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Mutable form of [`SceneNode::find`].
    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.name == name {
                return Some(node);
            }
            stack.extend(node.children.iter_mut().rev());
        }
        None
    }

    /// Nodes in the subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    /// Levels in the tree; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(SceneNode::depth)
            .max()
            .unwrap_or(0)
    }

    /// Every primitive in draw order (pre-order), with parent transforms folded in.
    pub fn drawables(&self) -> Vec<Drawable<'_>> {
        let mut out = Vec::new();
        let mut stack = vec![(self, Affine::IDENTITY)];
        while let Some((node, parent)) = stack.pop() {
            let world = parent * node.transform.to_affine();
            if let Some(primitive) = &node.primitive {
                out.push(Drawable {
                    name: node.name,
                    transform: world,
                    primitive,
                });
            }
            for child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
        out
    }
}

/// Assembles part recipes into a tree rooted at [`ROOT_NAME`].
///
/// Parts keep recipe order (the accessory, when present, is last). A single-piece
/// part becomes a leaf named after the part; a multi-piece part becomes a group
/// named after the part with one leaf per piece. The root sits at the origin until
/// [`place_at_center`] moves it.
#[tracing::instrument(level = "debug", skip(recipes), fields(parts = recipes.len()))]
pub fn compose(recipes: &[PartRecipe]) -> SceneNode {
    let mut root = SceneNode::group(ROOT_NAME, Transform2D::default());
    root.children = recipes.iter().map(compose_part).collect();
    root
}

fn compose_part(part: &PartRecipe) -> SceneNode {
    let name = part.kind.node_name();
    if let [piece] = part.pieces.as_slice() {
        let offset = part.offset + piece.offset;
        return SceneNode::leaf(
            name,
            Transform2D::at(offset.x, offset.y),
            piece.primitive.clone(),
        );
    }

    let mut group = SceneNode::group(name, Transform2D::at(part.offset.x, part.offset.y));
    group.children = part
        .pieces
        .iter()
        .map(|piece| {
            SceneNode::leaf(
                piece.name,
                Transform2D::at(piece.offset.x, piece.offset.y),
                piece.primitive.clone(),
            )
        })
        .collect();
    group
}

/// Pins the root to the middle of `canvas`.
pub fn place_at_center(root: &mut SceneNode, canvas: Canvas) {
    root.transform.translate = canvas.center();
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
