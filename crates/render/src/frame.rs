use crate::helpers;
use crate::lighting::{DirectionalData, Lighting, SpotData};
use crate::mesh::box_edges;
use crate::renderer::RenderView;
use cubelight_common::ObjectId;
use cubelight_scene::{Material, NodeKind, Scene};
use glam::{Mat4, Vec3};

/// One mesh to draw this frame. The mesh itself was uploaded up front and
/// is found by `id`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub id: ObjectId,
    pub model: Mat4,
    pub unlit: bool,
    pub roughness: f32,
    pub metalness: f32,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineVertex {
    pub position: Vec3,
    pub color: [f32; 4],
}

/// Everything a backend needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub clear_color: [f32; 3],
    pub draws: Vec<DrawItem>,
    /// World-space line list: edges and light helpers.
    pub lines: Vec<LineVertex>,
    pub lighting: Lighting,
    pub shadows: bool,
}

impl FrameData {
    pub fn extract(scene: &Scene, view: &RenderView) -> Self {
        let config = scene.config();
        let graph = scene.graph();
        let shadows = config.renderer.shadows;
        let mut draws = Vec::new();
        let mut lines = Vec::new();
        let mut lighting = Lighting::default();

        for (id, node) in graph.iter() {
            if !graph.is_visible(id) {
                continue;
            }
            let Some(world) = graph.world_matrix(id) else {
                continue;
            };
            let position = world.transform_point3(Vec3::ZERO);

            match &node.kind {
                NodeKind::Mesh { material, .. } => {
                    let (unlit, roughness, metalness) = match material {
                        Material::Standard {
                            roughness,
                            metalness,
                            ..
                        } => (false, *roughness, *metalness),
                        Material::Basic { .. } => (true, 1.0, 0.0),
                    };
                    draws.push(DrawItem {
                        id,
                        model: world,
                        unlit,
                        roughness,
                        metalness,
                        cast_shadow: node.cast_shadow,
                        receive_shadow: node.receive_shadow,
                    });
                }
                NodeKind::Edges { geometry, color } => {
                    let color = color.linear_rgba();
                    lines.extend(box_edges(geometry).into_iter().map(|p| LineVertex {
                        position: world.transform_point3(p),
                        color,
                    }));
                }
                NodeKind::AmbientLight(ambient) => {
                    lighting.ambient += Vec3::from(ambient.color.linear()) * ambient.intensity;
                }
                NodeKind::DirectionalLight(sun) => {
                    if lighting.directional.is_some() {
                        tracing::warn!("ignoring extra directional light {}", node.name);
                        continue;
                    }
                    lighting.directional =
                        Some(DirectionalData::new(sun, position, shadows && node.cast_shadow));
                    if config.directional.show_helper {
                        let color = sun.color.linear_rgba();
                        lines.extend(
                            helpers::directional_marker(sun, position, config.directional.helper_size)
                                .into_iter()
                                .map(|p| LineVertex { position: p, color }),
                        );
                    }
                }
                NodeKind::SpotLight(spot) => {
                    if lighting.spot.is_some() {
                        tracing::warn!("ignoring extra spot light {}", node.name);
                        continue;
                    }
                    lighting.spot = Some(SpotData::new(spot, position, shadows && node.cast_shadow));
                    if config.spot.show_helper {
                        let color = spot.color.linear_rgba();
                        lines.extend(
                            helpers::spot_cone(spot, position)
                                .into_iter()
                                .map(|p| LineVertex { position: p, color }),
                        );
                    }
                }
                NodeKind::Group => {}
            }
        }

        Self {
            view_proj: view.view_projection(),
            camera_position: view.eye,
            clear_color: config.renderer.clear_color.linear(),
            draws,
            lines,
            lighting,
            shadows,
        }
    }

    pub fn shadow_casters(&self) -> impl Iterator<Item = (usize, &DrawItem)> {
        self.draws.iter().enumerate().filter(|(_, d)| d.cast_shadow)
    }
}
