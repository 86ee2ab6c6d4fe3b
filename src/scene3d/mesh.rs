use glam::Vec3;

/// Mesh vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    /// Object-space position.
    pub position: Vec3,
    /// Unit outward normal.
    pub normal: Vec3,
}

/// Indexed triangle mesh. Triangles wind counter-clockwise seen from outside.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Vertex pool.
    pub vertices: Vec<Vertex>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// UV sphere of `radius` centered on the origin.
    ///
    /// `segments` runs around the Y axis and `rings` from pole to pole. Both are
    /// clamped to their minimum useful values (3 and 2).
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        let mut indices = Vec::with_capacity((rings * segments * 6) as usize);

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = std::f32::consts::TAU * seg as f32 / segments as f32;
                let normal = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());
                vertices.push(Vertex {
                    position: normal * radius,
                    normal,
                });
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;

                indices.extend_from_slice(&[current, current + 1, next]);
                indices.extend_from_slice(&[current + 1, next + 1, next]);
            }
        }

        Self { vertices, indices }
    }

    /// Number of whole triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles with their vertices; out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vertex; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                *self.vertices.get(tri[0] as usize)?,
                *self.vertices.get(tri[1] as usize)?,
                *self.vertices.get(tri[2] as usize)?,
            ])
        })
    }

    /// Axis-aligned bounds as `(min, max)`; `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (lo.min(v.position), hi.max(v.position))
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene3d/mesh.rs"]
mod tests;
