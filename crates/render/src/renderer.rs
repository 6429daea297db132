use cubelight_scene::{NodeKind, PerspectiveCamera, Scene};
use glam::{Mat4, Vec3};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from_camera(&PerspectiveCamera::default())
    }
}

impl RenderView {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        Self {
            eye: camera.position,
            target: camera.target,
            fov_degrees: camera.fov_degrees,
            aspect: camera.aspect,
            near: camera.near,
            far: camera.far,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        let camera = PerspectiveCamera {
            position: self.eye,
            target: self.target,
            fov_degrees: self.fov_degrees,
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        };
        camera.view_projection()
    }
}

/// Renderer-agnostic interface.
///
/// The renderer reads the scene and a view, then produces output. It never
/// mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of the scene, for the CLI and for tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn kind_label(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Group => "group",
        NodeKind::Mesh { .. } => "mesh",
        NodeKind::Edges { .. } => "edges",
        NodeKind::AmbientLight(_) => "ambient",
        NodeKind::DirectionalLight(_) => "directional",
        NodeKind::SpotLight(_) => "spot",
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene (frame={}, elapsed={:.2}s, seed={}) ===\n",
            scene.frame(),
            scene.elapsed(),
            scene.seed()
        ));
        out.push_str(&format!("Objects: {}\n", scene.graph().len()));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.2}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees,
            view.aspect
        ));

        for (id, node) in scene.graph().iter() {
            let p = scene.position_of(id).unwrap_or(Vec3::ZERO);
            let r = node.transform.rotation;
            out.push_str(&format!(
                "  [{}] {:<20} {:<12} pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2})",
                id.short(),
                node.name,
                kind_label(&node.kind),
                p.x,
                p.y,
                p.z,
                r.x,
                r.y,
                r.z
            ));
            match &node.kind {
                NodeKind::SpotLight(spot) => {
                    out.push_str(&format!(
                        " color={} intensity={} target=({:.2}, {:.2}, {:.2})",
                        spot.color, spot.intensity, spot.target.x, spot.target.y, spot.target.z
                    ));
                }
                NodeKind::DirectionalLight(sun) => {
                    out.push_str(&format!(" color={} intensity={}", sun.color, sun.intensity));
                }
                NodeKind::AmbientLight(a) => {
                    out.push_str(&format!(" color={} intensity={}", a.color, a.intensity));
                }
                _ => {}
            }
            out.push('\n');
        }

        out
    }
}
