use cubelight_common::ObjectId;
use cubelight_render::FrameData;
use cubelight_scene::Scene;
use glam::Vec3;
use serde::Serialize;

/// Read-only queries against a running scene.
pub struct SceneInspector;

impl SceneInspector {
    /// Snapshot of the animation state.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let wander = scene.wander();
        let spot_target = scene.spot().map(|s| s.target).unwrap_or(Vec3::ZERO);
        SceneSummary {
            frame: scene.frame(),
            elapsed: scene.elapsed(),
            seed: scene.seed(),
            object_count: scene.graph().len(),
            spot_target,
            wander_target: wander.target(),
            distance: spot_target.distance(wander.target()),
            retargets: wander.retargets(),
            spin_rate: scene.spin_rate(),
            lerp_factor: wander.lerp_factor,
            camera_position: scene.camera().position,
            spot_irradiance: None,
        }
    }

    /// Like [`Self::summary`], plus the unshadowed light arriving at the
    /// spotlight target on an upward facing surface.
    pub fn summary_with_lighting(scene: &Scene, frame: &FrameData) -> SceneSummary {
        let mut summary = Self::summary(scene);
        let irradiance = frame
            .lighting
            .irradiance_at(summary.spot_target, Vec3::Y);
        summary.spot_irradiance = Some(irradiance);
        summary
    }

    pub fn inspect(scene: &Scene, id: ObjectId) -> Option<NodeInfo> {
        let node = scene.graph().get(id)?;
        Some(NodeInfo {
            id,
            name: node.name.clone(),
            position: scene.position_of(id).unwrap_or(node.transform.position),
            rotation: node.transform.rotation,
            scale: node.transform.scale,
            visible: scene.graph().is_visible(id),
        })
    }

    pub fn find(scene: &Scene, name: &str) -> Option<NodeInfo> {
        let id = scene.graph().find_by_name(name)?;
        Self::inspect(scene, id)
    }

    /// Node names in insertion order.
    pub fn list_nodes(scene: &Scene) -> Vec<String> {
        scene
            .graph()
            .iter()
            .map(|(_, node)| node.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub frame: u64,
    pub elapsed: f32,
    pub seed: u64,
    pub object_count: usize,
    pub spot_target: Vec3,
    pub wander_target: Vec3,
    pub distance: f32,
    pub retargets: u64,
    pub spin_rate: f32,
    pub lerp_factor: f32,
    pub camera_position: Vec3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot_irradiance: Option<Vec3>,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let t = self.spot_target;
        let w = self.wander_target;
        write!(
            f,
            "Scene: frame={} elapsed={:.2}s seed={} objects={} spot=({:.2}, {:.2}, {:.2}) \
             wander=({:.2}, {:.2}, {:.2}) distance={:.3} retargets={}",
            self.frame,
            self.elapsed,
            self.seed,
            self.object_count,
            t.x,
            t.y,
            t.z,
            w.x,
            w.y,
            w.z,
            self.distance,
            self.retargets
        )?;
        if let Some(e) = self.spot_irradiance {
            write!(f, " irradiance=({:.3}, {:.3}, {:.3})", e.x, e.y, e.z)?;
        }
        Ok(())
    }
}

/// One scene-graph node with its world position.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub id: ObjectId,
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub visible: bool,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Node [{}] {} pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2}){}",
            self.id.short(),
            self.name,
            self.position.x,
            self.position.y,
            self.position.z,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
            self.scale.x,
            self.scale.y,
            self.scale.z,
            if self.visible { "" } else { " hidden" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubelight_render::RenderView;
    use cubelight_scene::SceneConfig;

    fn scene() -> Scene {
        Scene::from_config(&SceneConfig::default(), 42).unwrap()
    }

    #[test]
    fn summary_of_fresh_scene() {
        let scene = scene();
        let s = SceneInspector::summary(&scene);
        assert_eq!(s.frame, 0);
        assert_eq!(s.seed, 42);
        assert_eq!(s.object_count, 7);
        assert_eq!(s.spot_target, Vec3::new(-90.0, -90.0, 0.0));
        assert_eq!(s.retargets, 0);
        assert!(s.spot_irradiance.is_none());
        assert!((s.lerp_factor - 0.02).abs() < 1e-6);
    }

    #[test]
    fn summary_tracks_ticks() {
        let mut scene = scene();
        for i in 1..=5 {
            scene.tick(i as f32 / 60.0);
        }
        let s = SceneInspector::summary(&scene);
        assert_eq!(s.frame, 5);
        assert!((s.distance - s.spot_target.distance(s.wander_target)).abs() < 1e-5);
        let text = s.to_string();
        assert!(text.starts_with("Scene: frame=5"));
        assert!(text.contains("seed=42"));
    }

    #[test]
    fn lighting_summary_reports_irradiance() {
        let scene = scene();
        let frame = FrameData::extract(&scene, &RenderView::from_camera(scene.camera()));
        let s = SceneInspector::summary_with_lighting(&scene, &frame);
        let e = s.spot_irradiance.unwrap();
        // ambient alone is 0.3 on every channel
        assert!(e.x >= 0.3 - 1e-4);
        assert!(s.to_string().contains("irradiance="));
    }

    #[test]
    fn find_cube_by_name() {
        let scene = scene();
        let info = SceneInspector::find(&scene, "cube").unwrap();
        assert_eq!(info.id, scene.cube_id());
        assert!(info.visible);
        assert!(info.to_string().contains("cube"));
        assert!(SceneInspector::find(&scene, "teapot").is_none());
    }

    #[test]
    fn lists_nodes_in_insertion_order() {
        let names = SceneInspector::list_nodes(&scene());
        assert_eq!(names.first().map(String::as_str), Some("ambient"));
        assert!(names.contains(&"ground".to_string()));
        assert_eq!(names.len(), 7);
    }
}
