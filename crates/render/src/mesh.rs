use cubelight_common::Color;
use cubelight_scene::{Geometry, Material};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Vertex layout shared with the GPU backend: position, normal, linear colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

/// Indexed triangle mesh with colours baked into the vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

/// Box faces as (normal, u axis, v axis) with `u x v = normal`, in the
/// order materials are assigned: +X, -X, +Y, -Y, +Z, -Z.
const BOX_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

impl MeshData {
    /// Bake a scene mesh. Box faces take per-face colours when the material
    /// has six of them; otherwise every vertex gets the first colour.
    pub fn build(geometry: &Geometry, material: &Material) -> Self {
        let colors: Vec<Color> = match material {
            Material::Standard { colors, .. } => colors.clone(),
            Material::Basic { color } => vec![*color],
        };
        match *geometry {
            Geometry::Box {
                width,
                height,
                depth,
            } => box_mesh(Vec3::new(width, height, depth), &colors),
            Geometry::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere_mesh(
                radius,
                width_segments,
                height_segments,
                colors.first().copied().unwrap_or(Color::WHITE),
            ),
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

fn box_mesh(size: Vec3, colors: &[Color]) -> MeshData {
    let half = size * 0.5;
    let mut mesh = MeshData::default();
    for (face, (normal, u, v)) in BOX_FACES.iter().enumerate() {
        let color = colors
            .get(face)
            .or(colors.first())
            .copied()
            .unwrap_or(Color::WHITE)
            .linear_rgba();
        let base = mesh.vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner = (*normal + *u * su + *v * sv) * half;
            mesh.vertices.push(Vertex {
                position: corner.to_array(),
                normal: normal.to_array(),
                color,
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

fn sphere_mesh(radius: f32, width_segments: u32, height_segments: u32, color: Color) -> MeshData {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let color = color.linear_rgba();
    let mut mesh = MeshData::default();

    for iy in 0..=hs {
        let v = iy as f32 / hs as f32;
        for ix in 0..=ws {
            let u = ix as f32 / ws as f32;
            let dir = Vec3::new(
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            );
            mesh.vertices.push(Vertex {
                position: (dir * radius).to_array(),
                normal: dir.normalize_or(Vec3::Y).to_array(),
                color,
            });
        }
    }

    let row = ws + 1;
    for iy in 0..hs {
        for ix in 0..ws {
            let a = (iy * row + ix + 1) as u16;
            let b = (iy * row + ix) as u16;
            let c = ((iy + 1) * row + ix) as u16;
            let d = ((iy + 1) * row + ix + 1) as u16;
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != hs - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

/// The 12 edges of a box as 24 line endpoints, in local space.
pub fn box_edges(geometry: &Geometry) -> Vec<Vec3> {
    let Geometry::Box {
        width,
        height,
        depth,
    } = *geometry
    else {
        return Vec::new();
    };
    let h = Vec3::new(width, height, depth) * 0.5;
    let corner = |x: f32, y: f32, z: f32| Vec3::new(x, y, z) * h;
    let mut points = Vec::with_capacity(24);
    for s in [-1.0, 1.0] {
        for t in [-1.0, 1.0] {
            // Along X, Y, and Z respectively.
            points.extend([corner(-1.0, s, t), corner(1.0, s, t)]);
            points.extend([corner(s, -1.0, t), corner(s, 1.0, t)]);
            points.extend([corner(s, t, -1.0), corner(s, t, 1.0)]);
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(mesh: &MeshData, tri: &[u16]) -> Vec3 {
        let p = |i: u16| Vec3::from(mesh.vertices[i as usize].position);
        let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
        (b - a).cross(c - a).normalize()
    }

    fn cube() -> MeshData {
        let colors = (0..6).map(|i| Color(i * 0x111111)).collect();
        MeshData::build(
            &Geometry::Box {
                width: 2.0,
                height: 2.0,
                depth: 2.0,
            },
            &Material::Standard {
                colors,
                roughness: 1.0,
                metalness: 0.0,
            },
        )
    }

    #[test]
    fn box_counts() {
        let mesh = cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.index_count(), 36);
    }

    #[test]
    fn box_winding_faces_outward() {
        let mesh = cube();
        for tri in mesh.indices.chunks(3) {
            let n = triangle_normal(&mesh, tri);
            let stored = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            assert!(n.abs_diff_eq(stored, 1e-5), "{n} vs {stored}");
        }
    }

    #[test]
    fn box_faces_take_colours_in_order() {
        let mesh = cube();
        for face in 0..6 {
            let v = mesh.vertices[face * 4];
            assert_eq!(v.color, Color(face as u32 * 0x111111).linear_rgba());
            assert_eq!(Vec3::from(v.normal), BOX_FACES[face].0);
        }
    }

    #[test]
    fn flat_box_uses_single_colour() {
        let mesh = MeshData::build(
            &Geometry::Box {
                width: 20.0,
                height: 0.01,
                depth: 20.0,
            },
            &Material::Standard {
                colors: vec![Color(0x2e2e2e)],
                roughness: 0.2,
                metalness: 0.0,
            },
        );
        let expected = Color(0x2e2e2e).linear_rgba();
        assert!(mesh.vertices.iter().all(|v| v.color == expected));
        let max_y = mesh
            .vertices
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        assert!((max_y - 0.005).abs() < 1e-6);
    }

    #[test]
    fn sphere_vertices_on_radius() {
        let mesh = MeshData::build(
            &Geometry::Sphere {
                radius: 0.2,
                width_segments: 16,
                height_segments: 16,
            },
            &Material::Basic {
                color: Color::WHITE,
            },
        );
        assert_eq!(mesh.vertices.len(), 17 * 17);
        // Poles contribute one triangle per segment, other rows two.
        assert_eq!(mesh.indices.len(), (16 * 2 * 16 - 2 * 16) * 3);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 0.2).abs() < 1e-5);
        }
    }

    #[test]
    fn sphere_winding_faces_outward() {
        let mesh = MeshData::build(
            &Geometry::Sphere {
                radius: 1.0,
                width_segments: 8,
                height_segments: 6,
            },
            &Material::Basic {
                color: Color::WHITE,
            },
        );
        for tri in mesh.indices.chunks(3) {
            let n = triangle_normal(&mesh, tri);
            let centre = tri
                .iter()
                .map(|&i| Vec3::from(mesh.vertices[i as usize].position))
                .sum::<Vec3>()
                / 3.0;
            assert!(n.dot(centre) > 0.0);
        }
    }

    #[test]
    fn edges_run_along_axes() {
        let points = box_edges(&Geometry::Box {
            width: 2.0,
            height: 2.0,
            depth: 2.0,
        });
        assert_eq!(points.len(), 24);
        for seg in points.chunks(2) {
            let d = seg[1] - seg[0];
            assert!((d.length() - 2.0).abs() < 1e-6);
            assert_eq!(d.abs().max_element(), 2.0);
        }
        let sphere = Geometry::Sphere {
            radius: 1.0,
            width_segments: 8,
            height_segments: 8,
        };
        assert!(box_edges(&sphere).is_empty());
    }
}
