//! Line geometry for the light helpers, in world space.

use cubelight_scene::{DirectionalLight, SpotLight};
use glam::{Mat3, Vec3};
use std::f32::consts::TAU;

const CIRCLE_SEGMENTS: usize = 32;

/// Rotation taking local +Z onto `dir`.
fn aim(dir: Vec3) -> Mat3 {
    let z = dir.normalize_or(Vec3::NEG_Y);
    let up = if z.cross(Vec3::Y).length_squared() < 1e-8 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let x = up.cross(z).normalize();
    let y = z.cross(x);
    Mat3::from_cols(x, y, z)
}

/// Cone outline: five lines from the apex and a circle at the base.
///
/// The cone is as long as the light's range (1000 when unlimited) and as
/// wide as the cone angle allows at that length.
pub fn spot_cone(spot: &SpotLight, position: Vec3) -> Vec<Vec3> {
    let length = if spot.distance > 0.0 {
        spot.distance
    } else {
        1000.0
    };
    let width = length * spot.angle.tan();
    let scale = Vec3::new(width, width, length);
    let rotation = aim(spot.direction(position));
    let place = |local: Vec3| position + rotation * (local * scale);

    let mut points = Vec::with_capacity((5 + CIRCLE_SEGMENTS) * 2);
    for end in [
        Vec3::Z,
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(-1.0, 0.0, 1.0),
        Vec3::new(0.0, 1.0, 1.0),
        Vec3::new(0.0, -1.0, 1.0),
    ] {
        points.push(place(Vec3::ZERO));
        points.push(place(end));
    }
    for i in 0..CIRCLE_SEGMENTS {
        let a = i as f32 / CIRCLE_SEGMENTS as f32 * TAU;
        let b = (i + 1) as f32 / CIRCLE_SEGMENTS as f32 * TAU;
        points.push(place(Vec3::new(a.cos(), a.sin(), 1.0)));
        points.push(place(Vec3::new(b.cos(), b.sin(), 1.0)));
    }
    points
}

/// Square of half-size `size` at the light, facing its target, plus a line
/// from the light to the target.
pub fn directional_marker(light: &DirectionalLight, position: Vec3, size: f32) -> Vec<Vec3> {
    let rotation = aim(light.direction(position));
    let corners = [
        Vec3::new(-size, size, 0.0),
        Vec3::new(size, size, 0.0),
        Vec3::new(size, -size, 0.0),
        Vec3::new(-size, -size, 0.0),
    ];
    let mut points = Vec::with_capacity(10);
    for i in 0..corners.len() {
        points.push(position + rotation * corners[i]);
        points.push(position + rotation * corners[(i + 1) % corners.len()]);
    }
    points.push(position);
    points.push(light.target);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubelight_common::Color;
    use std::f32::consts::PI;

    fn spot(target: Vec3) -> SpotLight {
        SpotLight {
            color: Color(0xffc0cb),
            intensity: 200.0,
            distance: 20.0,
            angle: PI / 10.0,
            penumbra: 0.0,
            decay: 1.5,
            target,
            shadow: None,
        }
    }

    #[test]
    fn aim_maps_z_to_direction() {
        for dir in [Vec3::X, Vec3::NEG_Y, Vec3::Y, Vec3::new(1.0, -2.0, 0.5)] {
            let r = aim(dir);
            assert!((r * Vec3::Z).abs_diff_eq(dir.normalize(), 1e-5));
            assert!((r.determinant() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn cone_shape() {
        let pos = Vec3::new(5.0, 7.0, 2.0);
        let light = spot(Vec3::ZERO);
        let points = spot_cone(&light, pos);
        assert_eq!(points.len(), (5 + 32) * 2);

        let dir = light.direction(pos);
        let radius = 20.0 * (PI / 10.0).tan();
        let axis_end = pos + dir * 20.0;
        assert!(points[1].abs_diff_eq(axis_end, 1e-4));
        for p in &points[10..] {
            let along = (*p - pos).dot(dir);
            assert!((along - 20.0).abs() < 1e-3);
            assert!(((*p - axis_end).length() - radius).abs() < 1e-3);
        }
    }

    #[test]
    fn sun_marker_faces_target() {
        let light = DirectionalLight {
            color: Color::WHITE,
            intensity: 0.5,
            target: Vec3::ZERO,
            shadow: None,
        };
        let pos = Vec3::new(0.0, 10.0, 0.0);
        let points = directional_marker(&light, pos, 3.0);
        assert_eq!(points.len(), 10);
        // Light looks straight down, so the square lies flat at y = 10.
        for p in &points[..8] {
            assert!((p.y - 10.0).abs() < 1e-5);
            assert!((p.x.abs() - 3.0).abs() < 1e-5);
        }
        assert_eq!(points[9], Vec3::ZERO);
    }
}
