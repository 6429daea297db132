use crate::camera::PerspectiveCamera;
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::graph::{Geometry, Material, Node, NodeKind, SceneGraph};
use crate::lights::{AmbientLight, DirectionalLight, OrthoShadow, SpotLight, SpotShadow};
use crate::wander::Wander;
use cubelight_common::{ObjectId, Transform, deg_to_rad};
use glam::Vec3;
use serde::Serialize;

/// What one call to [`Scene::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    pub frame: u64,
    pub elapsed: f32,
    pub cube_rotation: Vec3,
    /// Where the spotlight now points.
    pub spot_target: Vec3,
    /// Where the spotlight is heading.
    pub wander_target: Vec3,
    pub distance: f32,
    pub retargeted: bool,
}

/// The decorative scene: graph, camera, and the animation state.
#[derive(Debug, Clone)]
pub struct Scene {
    graph: SceneGraph,
    camera: PerspectiveCamera,
    cube: ObjectId,
    edges: Option<ObjectId>,
    ground: ObjectId,
    ambient: ObjectId,
    sun: ObjectId,
    sun_marker: ObjectId,
    spot: ObjectId,
    wander: Wander,
    spin_rate: f32,
    frame: u64,
    elapsed: f32,
    seed: u64,
    config: SceneConfig,
}

impl Scene {
    /// Build the scene described by `config`. `seed` drives the spotlight's
    /// choice of targets.
    pub fn from_config(config: &SceneConfig, seed: u64) -> Result<Self, SceneError> {
        config.validate()?;
        let mut graph = SceneGraph::new();

        let cam = &config.camera;
        let camera = PerspectiveCamera {
            position: cam.position,
            target: cam.target,
            fov_degrees: cam.fov_degrees,
            near: cam.near,
            far: cam.far,
            ..PerspectiveCamera::default()
        };

        let ambient = graph.add(Node::new(
            "ambient",
            NodeKind::AmbientLight(AmbientLight {
                color: config.ambient.color,
                intensity: config.ambient.intensity,
            }),
        ));

        let d = &config.directional;
        let sun = graph.add(
            Node::new(
                "directional",
                NodeKind::DirectionalLight(DirectionalLight {
                    color: d.color,
                    intensity: d.intensity,
                    target: d.target,
                    shadow: Some(OrthoShadow {
                        half_extent: d.shadow_extent,
                        near: d.shadow_near,
                        far: d.shadow_far,
                    }),
                }),
            )
            .with_transform(Transform::from_position(d.position))
            .casting_shadow(d.cast_shadow),
        );
        let sun_marker = graph.add(
            Node::new(
                "directional-marker",
                NodeKind::Mesh {
                    geometry: Geometry::Sphere {
                        radius: d.marker_radius,
                        width_segments: 16,
                        height_segments: 16,
                    },
                    material: Material::Basic { color: d.color },
                },
            )
            .with_transform(Transform::from_position(d.position)),
        );

        let s = &config.spot;
        let spot = graph.add(
            Node::new(
                "spot",
                NodeKind::SpotLight(SpotLight {
                    color: s.color,
                    intensity: s.intensity,
                    distance: s.distance,
                    angle: s.angle,
                    penumbra: s.penumbra,
                    decay: s.decay,
                    target: s.target,
                    shadow: Some(SpotShadow {
                        near: s.shadow_near,
                        far: s.shadow_far,
                        fov_degrees: s.shadow_fov_degrees,
                    }),
                }),
            )
            .with_transform(Transform::from_position(s.position))
            .casting_shadow(s.cast_shadow),
        );

        let c = &config.cube;
        let cube_box = Geometry::Box {
            width: c.size,
            height: c.size,
            depth: c.size,
        };
        let cube = graph.add(
            Node::new(
                "cube",
                NodeKind::Mesh {
                    geometry: cube_box.clone(),
                    material: Material::Standard {
                        colors: c.face_colors.in_face_order(),
                        roughness: c.roughness,
                        metalness: c.metalness,
                    },
                },
            )
            .casting_shadow(c.cast_shadow),
        );
        let edges = if c.show_edges {
            Some(graph.add_child(
                cube,
                Node::new(
                    "cube-edges",
                    NodeKind::Edges {
                        geometry: cube_box,
                        color: c.edge_color,
                    },
                ),
            )?)
        } else {
            None
        };

        let g = &config.ground;
        let ground = graph.add(
            Node::new(
                "ground",
                NodeKind::Mesh {
                    geometry: Geometry::Box {
                        width: g.width,
                        height: g.thickness,
                        depth: g.depth,
                    },
                    material: Material::Standard {
                        colors: vec![g.color],
                        roughness: g.roughness,
                        metalness: g.metalness,
                    },
                },
            )
            .with_transform(Transform {
                position: Vec3::new(0.0, g.height, 0.0),
                rotation: Vec3::new(0.0, deg_to_rad(g.yaw_degrees), 0.0),
                ..Transform::default()
            })
            .receiving_shadow(g.receive_shadow),
        );

        let w = &config.wander;
        let wander = Wander::new(
            s.target,
            w.plane_size,
            w.lerp_factor,
            w.arrive_threshold,
            seed,
        );

        tracing::info!(
            "scene built: {} objects, first spotlight target ({:.2}, {:.2}), seed {seed}",
            graph.len(),
            wander.target().x,
            wander.target().z
        );

        Ok(Self {
            graph,
            camera,
            cube,
            edges,
            ground,
            ambient,
            sun,
            sun_marker,
            spot,
            wander,
            spin_rate: c.spin_rate,
            frame: 0,
            elapsed: 0.0,
            seed,
            config: config.clone(),
        })
    }

    /// Advance one frame. `elapsed` is seconds since the animation started.
    pub fn tick(&mut self, elapsed: f32) -> TickReport {
        self.frame += 1;
        self.elapsed = elapsed;

        let angle = self.spin_rate * elapsed;
        if let Some(cube) = self.graph.get_mut(self.cube) {
            cube.transform.rotation.x = angle;
            cube.transform.rotation.y = angle;
        }

        let step = self.wander.step();
        if let Some(Node {
            kind: NodeKind::SpotLight(spot),
            ..
        }) = self.graph.get_mut(self.spot)
        {
            spot.target = step.position;
        }

        TickReport {
            frame: self.frame,
            elapsed,
            cube_rotation: Vec3::new(angle, angle, 0.0),
            spot_target: step.position,
            wander_target: step.target,
            distance: step.distance,
            retargeted: step.retargeted,
        }
    }

    /// Follow a window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        tracing::debug!(
            "viewport {width}x{height}, aspect {:.3}",
            self.camera.aspect
        );
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn wander(&self) -> &Wander {
        &self.wander
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn spin_rate(&self) -> f32 {
        self.spin_rate
    }

    pub fn set_spin_rate(&mut self, rate: f32) {
        self.spin_rate = rate;
    }

    /// Change how quickly the spotlight closes in; clamped to (0, 1].
    pub fn set_lerp_factor(&mut self, factor: f32) {
        self.wander.lerp_factor = factor.clamp(1e-4, 1.0);
    }

    pub fn cube_id(&self) -> ObjectId {
        self.cube
    }

    pub fn edges_id(&self) -> Option<ObjectId> {
        self.edges
    }

    pub fn ground_id(&self) -> ObjectId {
        self.ground
    }

    pub fn ambient_id(&self) -> ObjectId {
        self.ambient
    }

    pub fn directional_id(&self) -> ObjectId {
        self.sun
    }

    pub fn marker_id(&self) -> ObjectId {
        self.sun_marker
    }

    pub fn spot_id(&self) -> ObjectId {
        self.spot
    }

    pub fn spot(&self) -> Option<&SpotLight> {
        match self.graph.get(self.spot).map(|n| &n.kind) {
            Some(NodeKind::SpotLight(spot)) => Some(spot),
            _ => None,
        }
    }

    pub fn directional(&self) -> Option<&DirectionalLight> {
        match self.graph.get(self.sun).map(|n| &n.kind) {
            Some(NodeKind::DirectionalLight(sun)) => Some(sun),
            _ => None,
        }
    }

    pub fn ambient(&self) -> Option<&AmbientLight> {
        match self.graph.get(self.ambient).map(|n| &n.kind) {
            Some(NodeKind::AmbientLight(a)) => Some(a),
            _ => None,
        }
    }

    /// World position of any object.
    pub fn position_of(&self, id: ObjectId) -> Option<Vec3> {
        self.graph
            .world_matrix(id)
            .map(|m| m.transform_point3(Vec3::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubelight_common::Color;

    fn scene() -> Scene {
        Scene::from_config(&SceneConfig::default(), 42).unwrap()
    }

    #[test]
    fn builds_stock_objects() {
        let s = scene();
        assert_eq!(s.graph().len(), 7);
        assert_eq!(s.graph().find_by_name("cube"), Some(s.cube_id()));
        assert_eq!(s.graph().children(s.cube_id()), vec![s.edges_id().unwrap()]);
        assert_eq!(s.frame(), 0);
        assert_eq!(s.camera().fov_degrees, 100.0);
    }

    #[test]
    fn lights_match_config() {
        let s = scene();
        let spot = s.spot().unwrap();
        assert_eq!(spot.intensity, 200.0);
        assert_eq!(spot.color, Color(0xffc0cb));
        assert_eq!(spot.target, Vec3::new(-90.0, -90.0, 0.0));
        assert_eq!(s.position_of(s.spot_id()), Some(Vec3::new(5.0, 7.0, 2.0)));
        assert_eq!(s.directional().unwrap().intensity, 0.5);
        assert_eq!(s.ambient().unwrap().intensity, 0.3);
        assert_eq!(
            s.position_of(s.marker_id()),
            s.position_of(s.directional_id())
        );
    }

    #[test]
    fn ground_is_lowered_and_turned() {
        let s = scene();
        let ground = s.graph().get(s.ground_id()).unwrap();
        assert_eq!(ground.transform.position.y, -2.0);
        assert!((ground.transform.rotation.y - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert!(ground.receive_shadow);
        assert!(!ground.cast_shadow);
    }

    #[test]
    fn tick_spins_cube_with_elapsed_time() {
        let mut s = scene();
        let report = s.tick(2.0);
        assert_eq!(report.frame, 1);
        assert_eq!(report.cube_rotation, Vec3::new(1.0, 1.0, 0.0));
        let cube = s.graph().get(s.cube_id()).unwrap();
        assert_eq!(cube.transform.rotation.x, 1.0);
        assert_eq!(cube.transform.rotation.y, 1.0);
    }

    #[test]
    fn tick_moves_spot_target() {
        let mut s = scene();
        let before = s.spot().unwrap().target;
        let report = s.tick(0.016);
        let after = s.spot().unwrap().target;
        assert_ne!(before, after);
        assert_eq!(after, report.spot_target);
        assert_eq!(report.wander_target, s.wander().target());
    }

    #[test]
    fn edges_follow_cube() {
        let mut s = scene();
        s.tick(1.3);
        let cube = s.graph().world_matrix(s.cube_id()).unwrap();
        let edges = s.graph().world_matrix(s.edges_id().unwrap()).unwrap();
        assert!(cube.abs_diff_eq(edges, 1e-6));
    }

    #[test]
    fn resize_updates_aspect() {
        let mut s = scene();
        s.resize(1920, 1080);
        assert!((s.camera().aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn edges_can_be_disabled() {
        let mut config = SceneConfig::default();
        config.cube.show_edges = false;
        let s = Scene::from_config(&config, 1).unwrap();
        assert!(s.edges_id().is_none());
        assert_eq!(s.graph().len(), 6);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SceneConfig::default();
        config.wander.plane_size = -1.0;
        assert!(Scene::from_config(&config, 1).is_err());
    }

    #[test]
    fn live_tuning() {
        let mut s = scene();
        s.set_spin_rate(1.0);
        assert_eq!(s.tick(0.5).cube_rotation.x, 0.5);
        s.set_lerp_factor(5.0);
        assert_eq!(s.wander().lerp_factor, 1.0);
    }
}
