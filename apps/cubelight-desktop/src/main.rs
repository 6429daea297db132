use anyhow::{Context, Result};
use clap::Parser;
use cubelight_input::{Action, Key, OrbitControls, PointerButton, PointerMapper};
use cubelight_render::{FrameData, RenderView};
use cubelight_render_wgpu::{RendererSettings, WgpuRenderer};
use cubelight_scene::{Clock, Scene, SceneConfig};
use cubelight_tools::SceneInspector;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "cubelight-desktop", about = "Cube, ground and a wandering spotlight")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the spotlight's random targets
    #[arg(long)]
    seed: Option<u64>,
}

/// Pixels of trackpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 50.0;

struct AppState {
    scene: Scene,
    controls: OrbitControls,
    mapper: PointerMapper,
    clock: Clock,
    show_inspector: bool,
    fps: f32,
}

impl AppState {
    fn new(scene: Scene) -> Self {
        let controls = OrbitControls::new(scene.camera(), &scene.config().controls);
        Self {
            scene,
            controls,
            mapper: PointerMapper::new(),
            clock: Clock::new(),
            show_inspector: false,
            fps: 0.0,
        }
    }

    /// Apply an action. Returns false when the app should exit.
    fn handle(&mut self, action: Action) -> bool {
        match action {
            Action::Exit => return false,
            Action::ToggleInspector => self.show_inspector = !self.show_inspector,
            Action::Resize { width, height } => {
                self.scene.resize(width, height);
                self.controls.apply(action, self.scene.camera_mut());
            }
            a if a.is_camera() => self.controls.apply(a, self.scene.camera_mut()),
            _ => {}
        }
        true
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        let key = map_key(code);
        if let Some((right, up)) = self.mapper.key_pan(key) {
            let camera = self.scene.camera().clone();
            self.controls.key_pan(right, up, &camera);
            return true;
        }
        let action = self.mapper.key(key);
        self.handle(action)
    }

    fn update(&mut self) {
        let dt = self.clock.delta();
        if dt > 0.0 {
            let instant = 1.0 / dt;
            self.fps = if self.fps == 0.0 {
                instant
            } else {
                self.fps * 0.9 + instant * 0.1
            };
        }

        let report = self.scene.tick(self.clock.elapsed());
        if report.retargeted {
            tracing::debug!(
                "frame {}: spotlight heading to ({:.2}, {:.2})",
                report.frame,
                report.wander_target.x,
                report.wander_target.z
            );
        }
        self.controls.update(self.scene.camera_mut());
    }

    fn draw_ui(&mut self, ctx: &EguiContext, frame: &FrameData) {
        if !self.show_inspector {
            return;
        }

        let summary = SceneInspector::summary_with_lighting(&self.scene, frame);

        egui::Window::new("Inspector")
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.0}", self.fps));
                ui.label(format!(
                    "Frame: {}  Elapsed: {:.1}s  Seed: {}",
                    summary.frame, summary.elapsed, summary.seed
                ));
                ui.separator();

                ui.heading("Spotlight");
                ui.label(format!(
                    "Target: ({:.2}, {:.2}, {:.2})",
                    summary.spot_target.x, summary.spot_target.y, summary.spot_target.z
                ));
                ui.label(format!(
                    "Heading to: ({:.2}, {:.2}, {:.2})",
                    summary.wander_target.x, summary.wander_target.y, summary.wander_target.z
                ));
                ui.label(format!(
                    "Distance: {:.3}  Retargets: {}",
                    summary.distance, summary.retargets
                ));
                if let Some(e) = summary.spot_irradiance {
                    ui.label(format!("Light at target: ({:.2}, {:.2}, {:.2})", e.x, e.y, e.z));
                }
                ui.separator();

                ui.heading("Camera");
                ui.label(format!(
                    "Position: ({:.1}, {:.1}, {:.1})",
                    summary.camera_position.x, summary.camera_position.y, summary.camera_position.z
                ));
                ui.label(format!(
                    "Distance: {:.2}",
                    self.controls.distance(self.scene.camera())
                ));
                if ui.button("Reset view (R)").clicked() {
                    self.controls.reset(self.scene.camera_mut());
                }
                ui.separator();

                ui.heading("Animation");
                let mut spin = self.scene.spin_rate();
                if ui
                    .add(egui::Slider::new(&mut spin, 0.0..=5.0).text("spin rad/s"))
                    .changed()
                {
                    self.scene.set_spin_rate(spin);
                }
                let mut lerp = summary.lerp_factor;
                if ui
                    .add(
                        egui::Slider::new(&mut lerp, 0.001..=0.5)
                            .logarithmic(true)
                            .text("lerp / frame"),
                    )
                    .changed()
                {
                    self.scene.set_lerp_factor(lerp);
                }

                ui.separator();
                ui.small("F1: Inspector | LMB: Orbit | RMB: Pan | Wheel: Zoom | Esc: Quit");
            });
    }
}

fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::KeyR => Key::R,
        KeyCode::F1 => Key::F1,
        KeyCode::Escape => Key::Escape,
        _ => Key::Other,
    }
}

fn map_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Left,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Right => PointerButton::Right,
        _ => PointerButton::Other,
    }
}

/// What a mouse button event tells the mapper. Releases always get through,
/// so a drag that ends over the overlay still stops; presses the overlay
/// took do not.
fn button_update(
    button: MouseButton,
    state: ElementState,
    consumed: bool,
) -> Option<(PointerButton, bool)> {
    let pressed = state == ElementState::Pressed;
    if consumed && pressed {
        return None;
    }
    Some((map_button(button), pressed))
}

/// Window and GPU resources, created on `resumed`.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext, scene: &Scene) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("cubelight")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubelight_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            scene,
            RendererSettings::from_scene(scene),
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend, surface {:?}",
            adapter.get_info().backend.to_str(),
            surface_format
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn draw_overlay(
        &mut self,
        ctx: &EguiContext,
        state: &mut AppState,
        frame: &FrameData,
        view: &wgpu::TextureView,
    ) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx, frame);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    minimized: bool,
}

impl GpuApp {
    fn new(scene: Scene) -> Self {
        Self {
            state: AppState::new(scene),
            gpu: None,
            egui_ctx: EguiContext::default(),
            minimized: false,
        }
    }

    fn redraw(&mut self) {
        self.state.update();

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if self.minimized {
            return;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = FrameData::extract(
            &self.state.scene,
            &RenderView::from_camera(self.state.scene.camera()),
        );
        gpu.renderer.render(&gpu.device, &gpu.queue, &view, &frame);
        gpu.draw_overlay(&self.egui_ctx, &mut self.state, &frame, &view);

        output.present();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx, &self.state.scene) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.handle(Action::Resize {
                    width: size.width,
                    height: size.height,
                });
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("GPU initialisation failed: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                if let WindowEvent::MouseInput { button, state, .. } = event {
                    if let Some((button, pressed)) = button_update(button, state, true) {
                        self.state.mapper.button(button, pressed);
                    }
                }
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                self.minimized = new_size.width == 0 || new_size.height == 0;
                if self.minimized {
                    tracing::debug!("window minimised, pausing rendering");
                    return;
                }
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                self.state.handle(Action::Resize {
                    width: new_size.width,
                    height: new_size.height,
                });
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if !self.state.handle_key(code) {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some((button, pressed)) = button_update(button, state, false) {
                    self.state.mapper.button(button, pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self.state.mapper.moved(position.x as f32, position.y as f32);
                self.state.handle(action);
            }
            WindowEvent::CursorLeft { .. } => self.state.mapper.left_window(),
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                let action = self.state.mapper.wheel(lines);
                self.state.handle(action);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(gpu) = &self.gpu {
                    gpu.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    let seed = cubelight_scene::resolve_seed(cli.seed, &config);
    let scene = Scene::from_config(&config, seed).context("failed to build scene")?;

    tracing::info!("cubelight-desktop starting (seed {seed})");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(scene);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_keeps_presses_but_not_releases() {
        assert_eq!(
            button_update(MouseButton::Left, ElementState::Pressed, true),
            None
        );
        assert_eq!(
            button_update(MouseButton::Left, ElementState::Released, true),
            Some((PointerButton::Left, false))
        );
        assert_eq!(
            button_update(MouseButton::Right, ElementState::Pressed, false),
            Some((PointerButton::Right, true))
        );
    }

    #[test]
    fn drag_released_over_overlay_stops_orbiting() {
        let mut mapper = PointerMapper::new();
        mapper.moved(100.0, 100.0);
        if let Some((b, pressed)) = button_update(MouseButton::Left, ElementState::Pressed, false) {
            mapper.button(b, pressed);
        }
        assert!(matches!(mapper.moved(120.0, 100.0), Action::Orbit { .. }));
        if let Some((b, pressed)) = button_update(MouseButton::Left, ElementState::Released, true) {
            mapper.button(b, pressed);
        }
        assert_eq!(mapper.moved(140.0, 100.0), Action::Noop);
    }

    #[test]
    fn handle_routes_camera_actions() {
        let scene = Scene::from_config(&SceneConfig::default(), 5).unwrap();
        let mut state = AppState::new(scene);
        assert!(state.handle(Action::ToggleInspector));
        assert!(state.show_inspector);
        assert!(state.handle(Action::Zoom(3.0)));
        assert!(state.controls.update(state.scene.camera_mut()));
        assert!(!state.handle(Action::Exit));
    }
}
