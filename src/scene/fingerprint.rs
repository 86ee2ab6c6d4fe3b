use crate::avatar::resolve::{Paint, Primitive, Shape};
use crate::foundation::core::{Point, Rgb};
use crate::foundation::math::Fnv1a64;
use crate::scene::graph::SceneNode;

/// 128-bit structural hash of a scene graph.
///
/// Covers node names, tree shape, primitive geometry and paints. Transforms are
/// excluded, so animating a scene leaves its fingerprint unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneFingerprint {
    /// High lane.
    pub hi: u64,
    /// Low lane.
    pub lo: u64,
}

/// Hashes `root` and its subtree.
pub fn fingerprint_scene(root: &SceneNode) -> SceneFingerprint {
    let mut h = PairHasher {
        a: Fnv1a64::new_default(),
        b: Fnv1a64::new(0x9ae1_6a3b_2f90_404f),
    };

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        h.str(node.name);
        h.u64(node.children.len() as u64);
        match &node.primitive {
            Some(p) => {
                h.u8(1);
                h.primitive(p);
            }
            None => h.u8(0),
        }
        stack.extend(node.children.iter().rev());
    }

    SceneFingerprint {
        hi: h.a.finish(),
        lo: h.b.finish(),
    }
}

struct PairHasher {
    a: Fnv1a64,
    b: Fnv1a64,
}

impl PairHasher {
    fn u8(&mut self, v: u8) {
        self.a.write_u8(v);
        self.b.write_u8(v);
    }

    fn u64(&mut self, v: u64) {
        self.a.write_u64(v);
        self.b.write_u64(v);
    }

    fn f64(&mut self, v: f64) {
        self.a.write_f64(v);
        self.b.write_f64(v);
    }

    fn str(&mut self, s: &str) {
        self.a.write_str(s);
        self.b.write_str(s);
    }

    fn point(&mut self, p: Point) {
        self.f64(p.x);
        self.f64(p.y);
    }

    fn rgb(&mut self, c: Rgb) {
        self.u64(u64::from(c.to_u24()));
    }

    fn primitive(&mut self, p: &Primitive) {
        self.str(p.shape.type_name());
        match &p.shape {
            Shape::Circle { center, radius } => {
                self.point(*center);
                self.f64(*radius);
            }
            Shape::Ellipse { center, radii } => {
                self.point(*center);
                self.f64(radii.x);
                self.f64(radii.y);
            }
            Shape::Polygon { points } => {
                self.u64(points.len() as u64);
                for pt in points {
                    self.point(*pt);
                }
            }
            Shape::Star {
                center,
                points,
                outer_radius,
                inner_radius,
            } => {
                self.point(*center);
                self.u64(u64::from(*points));
                self.f64(*outer_radius);
                self.f64(*inner_radius);
            }
            Shape::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                self.point(*center);
                self.f64(*radius);
                self.f64(*start_angle);
                self.f64(*end_angle);
            }
            Shape::Line { from, to } => {
                self.point(*from);
                self.point(*to);
            }
        }
        self.paint(&p.paint);
    }

    fn paint(&mut self, paint: &Paint) {
        match paint.fill {
            Some(c) => {
                self.u8(1);
                self.rgb(c);
            }
            None => self.u8(0),
        }
        match paint.stroke {
            Some(s) => {
                self.u8(1);
                self.f64(s.width);
                self.rgb(s.color);
            }
            None => self.u8(0),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/fingerprint.rs"]
mod tests;
