//! Indexed triangle geometry for host primitives and overlay meshes.

use glam::Vec3;
use std::collections::{HashMap, HashSet};
use std::f32::consts::PI;

/// Positions are merged when they agree to this many steps per unit.
const MERGE_PRECISION: f32 = 1.0e4;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    vertices: Vec<Vec3>,
    indices: Vec<[u32; 3]>,
}

impl Geometry {
    pub fn new(vertices: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        Self { vertices, indices }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of distinct undirected edges, i.e. the lines a wireframe draws.
    pub fn edge_count(&self) -> usize {
        let mut edges = HashSet::new();
        for triangle in &self.indices {
            for (a, b) in [
                (triangle[0], triangle[1]),
                (triangle[1], triangle[2]),
                (triangle[2], triangle[0]),
            ] {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.len()
    }

    pub fn bounding_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|vertex| vertex.length())
            .fold(0.0, f32::max)
    }
}

/// Icosahedron projected onto a sphere of `radius`, with every base edge
/// split into `detail + 1` segments. Shared points are merged, giving
/// `10 * (detail + 1)^2 + 2` vertices.
pub fn icosahedron(radius: f32, detail: u32) -> Geometry {
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
    #[rustfmt::skip]
    let faces: [[usize; 3]; 20] = [
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    let mut builder = MergingBuilder::default();
    for face in faces {
        subdivide_face(
            &mut builder,
            base[face[0]],
            base[face[1]],
            base[face[2]],
            detail,
            radius,
        );
    }
    builder.finish()
}

fn subdivide_face(
    builder: &mut MergingBuilder,
    a: Vec3,
    b: Vec3,
    c: Vec3,
    detail: u32,
    radius: f32,
) {
    let cols = detail as usize + 1;
    let mut grid: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);

    for i in 0..=cols {
        let step = i as f32 / cols as f32;
        let left = a.lerp(c, step);
        let right = b.lerp(c, step);
        let rows = cols - i;
        let row = if rows == 0 {
            vec![left]
        } else {
            (0..=rows)
                .map(|j| left.lerp(right, j as f32 / rows as f32))
                .collect()
        };
        grid.push(row);
    }

    let project = |point: Vec3| point.normalize() * radius;

    for i in 0..cols {
        for j in 0..(2 * (cols - i) - 1) {
            let k = j / 2;
            let corners = if j % 2 == 0 {
                [grid[i][k + 1], grid[i + 1][k], grid[i][k]]
            } else {
                [grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]
            };
            builder.push_triangle(corners.map(project));
        }
    }
}

#[derive(Default)]
struct MergingBuilder {
    vertices: Vec<Vec3>,
    lookup: HashMap<[i64; 3], u32>,
    indices: Vec<[u32; 3]>,
}

impl MergingBuilder {
    fn push_triangle(&mut self, corners: [Vec3; 3]) {
        let triangle = corners.map(|corner| self.vertex(corner));
        self.indices.push(triangle);
    }

    fn vertex(&mut self, position: Vec3) -> u32 {
        let key = [position.x, position.y, position.z]
            .map(|component| (component * MERGE_PRECISION).round() as i64);
        *self.lookup.entry(key).or_insert_with(|| {
            self.vertices.push(position);
            (self.vertices.len() - 1) as u32
        })
    }

    fn finish(self) -> Geometry {
        Geometry::new(self.vertices, self.indices)
    }
}

/// Latitude/longitude sphere. Seam and pole vertices are duplicated so the
/// layout matches what texture-mapped engines produce.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width = width_segments.max(3);
    let height = height_segments.max(2);
    let mut vertices = Vec::with_capacity(((width + 1) * (height + 1)) as usize);

    for iy in 0..=height {
        let theta = iy as f32 / height as f32 * PI;
        for ix in 0..=width {
            let phi = ix as f32 / width as f32 * 2.0 * PI;
            vertices.push(Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            ));
        }
    }

    let at = |ix: u32, iy: u32| iy * (width + 1) + ix;
    let mut indices = Vec::new();
    for iy in 0..height {
        for ix in 0..width {
            let a = at(ix + 1, iy);
            let b = at(ix, iy);
            let c = at(ix, iy + 1);
            let d = at(ix + 1, iy + 1);
            if iy != 0 {
                indices.push([a, b, d]);
            }
            if iy != height - 1 {
                indices.push([b, c, d]);
            }
        }
    }

    Geometry::new(vertices, indices)
}

/// Axis-aligned box centred on the origin.
pub fn cuboid(width: f32, height: f32, depth: f32) -> Geometry {
    let half = Vec3::new(width, height, depth) / 2.0;
    let vertices = (0..8)
        .map(|corner| {
            Vec3::new(
                if corner & 1 == 0 { -half.x } else { half.x },
                if corner & 2 == 0 { -half.y } else { half.y },
                if corner & 4 == 0 { -half.z } else { half.z },
            )
        })
        .collect();
    #[rustfmt::skip]
    let indices = vec![
        [0, 2, 1], [1, 2, 3], // -z
        [4, 5, 6], [5, 7, 6], // +z
        [0, 1, 4], [1, 5, 4], // -y
        [2, 6, 3], [3, 6, 7], // +y
        [0, 4, 2], [2, 4, 6], // -x
        [1, 3, 5], [3, 7, 5], // +x
    ];
    Geometry::new(vertices, indices)
}
