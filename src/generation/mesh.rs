//! Height-field mesh triangulation with LOD decimation

use crate::core::types::{Vec2, Vec3};
use super::noise_map::HeightField;

/// Renderable/collidable triangle mesh built from one height field
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshGeometry {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Triangulate `heights` into a grid mesh centered on the origin, visiting
/// every `skip_factor`-th vertex along both axes.
///
/// `skip_factor` must be >= 1 and divide `width - 1`; the LOD table
/// validation guarantees both before a build is ever requested.
pub fn generate_terrain_mesh(
    heights: &HeightField,
    height_multiplier: f32,
    skip_factor: u32,
) -> MeshGeometry {
    let width = heights.width();
    let height = heights.height();
    let step = skip_factor.max(1) as usize;

    let top_left_x = (width as f32 - 1.0) / -2.0;
    let top_left_z = (height as f32 - 1.0) / 2.0;

    let verts_per_line = ((width - 1) / step + 1) as u32;
    let rows = (height - 1) / step + 1;

    let mut mesh = MeshGeometry {
        vertices: Vec::with_capacity(verts_per_line as usize * rows),
        uvs: Vec::with_capacity(verts_per_line as usize * rows),
        indices: Vec::with_capacity((verts_per_line as usize - 1) * (rows - 1) * 6),
    };

    let mut vertex_index = 0u32;
    for y in (0..height).step_by(step) {
        for x in (0..width).step_by(step) {
            mesh.vertices.push(Vec3::new(
                top_left_x + x as f32,
                heights.get(x, y) * height_multiplier,
                top_left_z - y as f32,
            ));
            mesh.uvs.push(Vec2::new(
                x as f32 / width as f32,
                y as f32 / height as f32,
            ));

            if x < width - 1 && y < height - 1 {
                // Two triangles per quad, wound to face +Y
                let a = vertex_index;
                mesh.indices
                    .extend_from_slice(&[a, a + verts_per_line + 1, a + verts_per_line]);
                mesh.indices.extend_from_slice(&[a + verts_per_line + 1, a, a + 1]);
            }
            vertex_index += 1;
        }
    }

    mesh
}
