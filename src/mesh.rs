//! Indexed mesh builders for the stage geometry.
//!
//! Topology is fixed at construction; the deformation engine only ever
//! rewrites vertex positions.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex data (position + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle mesh
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Subdivided icosahedron projected onto a sphere of `radius`.
    ///
    /// Shared edge midpoints are deduplicated, so vertex count is
    /// 10 * 4^detail + 2 and triangle count 20 * 4^detail.
    pub fn icosphere(radius: f32, detail: u32) -> Self {
        // Golden-ratio icosahedron
        let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
        let base = [
            Vec3::new(-1.0, t, 0.0),
            Vec3::new(1.0, t, 0.0),
            Vec3::new(-1.0, -t, 0.0),
            Vec3::new(1.0, -t, 0.0),
            Vec3::new(0.0, -1.0, t),
            Vec3::new(0.0, 1.0, t),
            Vec3::new(0.0, -1.0, -t),
            Vec3::new(0.0, 1.0, -t),
            Vec3::new(t, 0.0, -1.0),
            Vec3::new(t, 0.0, 1.0),
            Vec3::new(-t, 0.0, -1.0),
            Vec3::new(-t, 0.0, 1.0),
        ];

        let mut positions: Vec<Vec3> = base.iter().map(|v| v.normalize() * radius).collect();

        let mut faces: Vec<[u32; 3]> = vec![
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];

        // Each pass splits every triangle into four, caching edge midpoints
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        for _ in 0..detail {
            let mut next_faces = Vec::with_capacity(faces.len() * 4);
            for [a, b, c] in faces {
                let ab = midpoint(&mut positions, &mut midpoints, a, b, radius);
                let bc = midpoint(&mut positions, &mut midpoints, b, c, radius);
                let ca = midpoint(&mut positions, &mut midpoints, c, a, radius);
                next_faces.push([a, ab, ca]);
                next_faces.push([b, bc, ab]);
                next_faces.push([c, ca, bc]);
                next_faces.push([ab, bc, ca]);
            }
            faces = next_faces;
        }

        let vertices = positions
            .iter()
            .map(|p| {
                let dir = p.normalize();
                Vertex {
                    position: p.to_array(),
                    uv: [
                        0.5 + dir.z.atan2(dir.x) / (2.0 * std::f32::consts::PI),
                        0.5 - dir.y.asin() / std::f32::consts::PI,
                    ],
                }
            })
            .collect();

        let indices = faces.iter().flatten().copied().collect();

        Self { vertices, indices }
    }

    /// Flat XY grid centered at the origin (z = 0), `segments` cells per side.
    pub fn plane(width: f32, height: f32, segments: usize) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for y in 0..=segments {
            for x in 0..=segments {
                let fx = x as f32 / segments as f32;
                let fy = y as f32 / segments as f32;
                vertices.push(Vertex {
                    position: [(fx - 0.5) * width, (fy - 0.5) * height, 0.0],
                    uv: [fx, fy],
                });
            }
        }

        // Triangle indices (counter-clockwise winding)
        for y in 0..segments {
            for x in 0..segments {
                let bottom_left = (y * (segments + 1) + x) as u32;
                let bottom_right = bottom_left + 1;
                let top_left = ((y + 1) * (segments + 1) + x) as u32;
                let top_right = top_left + 1;

                indices.extend_from_slice(&[
                    bottom_left,
                    bottom_right,
                    top_left,
                    top_left,
                    bottom_right,
                    top_right,
                ]);
            }
        }

        Self { vertices, indices }
    }

    /// Axis-aligned cube of edge length `size` centered at the origin.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let corners = [
            [-h, -h, -h],
            [h, -h, -h],
            [h, h, -h],
            [-h, h, -h],
            [-h, -h, h],
            [h, -h, h],
            [h, h, h],
            [-h, h, h],
        ];

        let vertices = corners
            .iter()
            .map(|&position| Vertex {
                position,
                uv: [0.0, 0.0],
            })
            .collect();

        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1,  0, 3, 2, // back   (z = -h)
            4, 5, 6,  4, 6, 7, // front  (z = +h)
            0, 4, 7,  0, 7, 3, // left   (x = -h)
            1, 6, 5,  1, 2, 6, // right  (x = +h)
            0, 1, 5,  0, 5, 4, // bottom (y = -h)
            3, 6, 2,  3, 7, 6, // top    (y = +h)
        ];

        Self { vertices, indices }
    }
}

/// Index of the midpoint of edge (a, b), creating and caching it on demand.
/// New midpoints are projected back onto the sphere.
fn midpoint(
    positions: &mut Vec<Vec3>,
    cache: &mut HashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
    radius: f32,
) -> u32 {
    let key = if a < b { (a, b) } else { (b, a) };
    if let Some(&idx) = cache.get(&key) {
        return idx;
    }

    let mid = (positions[a as usize] + positions[b as usize]) / 2.0;
    let idx = positions.len() as u32;
    positions.push(mid.normalize() * radius);
    cache.insert(key, idx);
    idx
}
