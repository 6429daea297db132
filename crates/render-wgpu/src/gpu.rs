use crate::shaders;
use bytemuck::{Pod, Zeroable};
use cubelight_common::ObjectId;
use cubelight_render::{DrawItem, FrameData, LineVertex, MeshData};
use cubelight_scene::{NodeKind, Scene};
use glam::Mat4;
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Shadow map layers: spotlight, then directional light.
const SHADOW_LAYERS: u32 = 2;
const SPOT_LAYER: usize = 0;
const SUN_LAYER: usize = 1;
const MAX_LINE_VERTICES: usize = 4096;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    sun_dir: [f32; 4],
    sun_radiance: [f32; 4],
    sun_view_proj: [[f32; 4]; 4],
    spot_pos: [f32; 4],
    spot_dir: [f32; 4],
    spot_radiance: [f32; 4],
    spot_params: [f32; 4],
    spot_view_proj: [[f32; 4]; 4],
    shadow_params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ShadowUniforms {
    light_view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GpuVertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GpuLineVertex {
    position: [f32; 3],
    color: [f32; 4],
}

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

impl Globals {
    fn from_frame(frame: &FrameData, shadow_map_size: u32) -> Self {
        let l = &frame.lighting;
        let mut g = Globals {
            view_proj: frame.view_proj.to_cols_array_2d(),
            camera_pos: frame.camera_position.extend(1.0).to_array(),
            ambient: l.ambient.extend(0.0).to_array(),
            sun_dir: [0.0, -1.0, 0.0, 0.0],
            sun_radiance: [0.0; 4],
            sun_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            spot_pos: [0.0; 4],
            spot_dir: [0.0, -1.0, 0.0, 0.0],
            spot_radiance: [0.0; 4],
            spot_params: [0.0; 4],
            spot_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            shadow_params: [1.0 / shadow_map_size.max(1) as f32, 0.0005, 0.0, 0.0],
        };
        if let Some(sun) = &l.directional {
            g.sun_dir = sun.direction.extend(1.0).to_array();
            g.sun_radiance = sun.radiance.extend(flag(sun.casts_shadow)).to_array();
            g.sun_view_proj = sun.shadow_view_proj.to_cols_array_2d();
        }
        if let Some(spot) = &l.spot {
            g.spot_pos = spot.position.extend(1.0).to_array();
            g.spot_dir = spot.direction.extend(flag(spot.casts_shadow)).to_array();
            g.spot_radiance = spot.radiance.extend(0.0).to_array();
            g.spot_params = [spot.distance, spot.decay, spot.cos_outer, spot.cos_inner];
            g.spot_view_proj = spot.shadow_view_proj.to_cols_array_2d();
        }
        g
    }
}

impl From<&DrawItem> for InstanceData {
    fn from(item: &DrawItem) -> Self {
        let cols = item.model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            params: [
                flag(item.unlit),
                item.roughness,
                item.metalness,
                flag(item.receive_shadow),
            ],
        }
    }
}

impl From<&LineVertex> for GpuLineVertex {
    fn from(v: &LineVertex) -> Self {
        Self {
            position: v.position.to_array(),
            color: v.color,
        }
    }
}

/// Renderer options fixed for the lifetime of a [`WgpuRenderer`].
#[derive(Debug, Clone, Copy)]
pub struct RendererSettings {
    pub msaa_samples: u32,
    pub shadow_map_size: u32,
}

impl RendererSettings {
    pub fn from_scene(scene: &Scene) -> Self {
        let r = &scene.config().renderer;
        Self {
            msaa_samples: r.msaa_samples,
            shadow_map_size: if r.shadows { r.shadow_map_size } else { 1 },
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Per-light shadow pass resources.
struct ShadowTarget {
    view: wgpu::TextureView,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    shadow_targets: Vec<ShadowTarget>,
    meshes: BTreeMap<ObjectId, GpuMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: usize,
    line_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    msaa_texture: Option<wgpu::TextureView>,
    surface_format: wgpu::TextureFormat,
    settings: RendererSettings,
}

fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x4,
    ];
    const INSTANCE_ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];
    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRS,
        },
    ]
}

impl WgpuRenderer {
    /// Build pipelines and upload every mesh in `scene`.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &Scene,
        settings: RendererSettings,
    ) -> Self {
        let sample_count = settings.msaa_samples.max(1);

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Shadow map array and its comparison sampler
        let shadow_size = settings.shadow_map_size.max(1);
        let shadow_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_map"),
            size: wgpu::Extent3d {
                width: shadow_size,
                height: shadow_size,
                depth_or_array_layers: SHADOW_LAYERS,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let shadow_array_view = shadow_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("shadow_map_array"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_array_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });

        let multisample = wgpu::MultisampleState {
            count: sample_count,
            ..Default::default()
        };
        let color_target = [Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        // Mesh pipeline
        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let mesh_buffers = vertex_layouts();
        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &mesh_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample,
            multiview: None,
            cache: None,
        });

        // Line pipeline
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });
        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GpuLineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample,
            multiview: None,
            cache: None,
        });

        // Shadow pipeline: depth only, one bind group per light
        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shadow_pipeline_layout"),
                bind_group_layouts: &[&shadow_layout],
                push_constant_ranges: &[],
            });
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_SHADER.into()),
        });
        let shadow_buffers = vertex_layouts();
        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &shadow_buffers,
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let shadow_targets = (0..SHADOW_LAYERS)
            .map(|layer| {
                let view = shadow_texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("shadow_layer"),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                });
                let uniform_buffer =
                    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("shadow_uniform_buffer"),
                        contents: bytemuck::bytes_of(&ShadowUniforms {
                            light_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                        }),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("shadow_bind_group"),
                    layout: &shadow_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    }],
                });
                ShadowTarget {
                    view,
                    uniform_buffer,
                    bind_group,
                }
            })
            .collect();

        // Meshes, uploaded once
        let mut meshes = BTreeMap::new();
        for (id, node) in scene.graph().iter() {
            let NodeKind::Mesh { geometry, material } = &node.kind else {
                continue;
            };
            let mesh = MeshData::build(geometry, material);
            let vertices: Vec<GpuVertex> = mesh
                .vertices
                .iter()
                .map(|v| GpuVertex {
                    position: v.position,
                    normal: v.normal,
                    color: v.color,
                })
                .collect();
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{}_vertex_buffer", node.name)),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{}_index_buffer", node.name)),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            meshes.insert(
                id,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.index_count(),
                },
            );
        }
        tracing::debug!("uploaded {} meshes", meshes.len());

        // Instance and line buffers (pre-allocated)
        let max_instances = meshes.len().max(16);
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("line_buffer"),
            size: (MAX_LINE_VERTICES * std::mem::size_of::<GpuLineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height, sample_count);
        let msaa_texture = (sample_count > 1).then(|| {
            Self::create_msaa_texture(device, surface_format, width, height, sample_count)
        });

        Self {
            mesh_pipeline,
            line_pipeline,
            shadow_pipeline,
            globals_buffer,
            globals_bind_group,
            shadow_targets,
            meshes,
            instance_buffer,
            max_instances,
            line_buffer,
            depth_texture,
            msaa_texture,
            surface_format,
            settings,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let samples = self.settings.msaa_samples.max(1);
        self.depth_texture = Self::create_depth_texture(device, width, height, samples);
        if self.msaa_texture.is_some() {
            self.msaa_texture = Some(Self::create_msaa_texture(
                device,
                self.surface_format,
                width,
                height,
                samples,
            ));
        }
    }

    /// Render one frame: shadow passes, then meshes and lines.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &FrameData,
    ) {
        queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals::from_frame(frame, self.settings.shadow_map_size)),
        );

        if frame.draws.len() > self.max_instances {
            tracing::warn!(
                "drawing {} of {} meshes",
                self.max_instances,
                frame.draws.len()
            );
        }
        let instances: Vec<InstanceData> = frame
            .draws
            .iter()
            .take(self.max_instances)
            .map(InstanceData::from)
            .collect();
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        if frame.lines.len() > MAX_LINE_VERTICES {
            tracing::warn!(
                "dropping {} line vertices over capacity",
                frame.lines.len() - MAX_LINE_VERTICES
            );
        }
        let lines: Vec<GpuLineVertex> = frame
            .lines
            .iter()
            .take(MAX_LINE_VERTICES)
            .map(GpuLineVertex::from)
            .collect();
        if !lines.is_empty() {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&lines));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        let lights = [
            (
                SPOT_LAYER,
                frame
                    .lighting
                    .spot
                    .filter(|s| s.casts_shadow)
                    .map(|s| s.shadow_view_proj),
            ),
            (
                SUN_LAYER,
                frame
                    .lighting
                    .directional
                    .filter(|d| d.casts_shadow)
                    .map(|d| d.shadow_view_proj),
            ),
        ];
        for (layer, view_proj) in lights {
            let Some(view_proj) = view_proj else {
                continue;
            };
            let target = &self.shadow_targets[layer];
            queue.write_buffer(
                &target.uniform_buffer,
                0,
                bytemuck::bytes_of(&ShadowUniforms {
                    light_view_proj: view_proj.to_cols_array_2d(),
                }),
            );

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.shadow_pipeline);
            pass.set_bind_group(0, &target.bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (i, item) in frame.shadow_casters() {
                if i >= instances.len() {
                    break;
                }
                if let Some(mesh) = self.meshes.get(&item.id) {
                    let i = i as u32;
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..mesh.index_count, 0, i..i + 1);
                }
            }
        }

        {
            let [r, g, b] = frame.clear_color;
            let (color_view, resolve_target) = match &self.msaa_texture {
                Some(msaa) => (msaa, Some(view)),
                None => (view, None),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            // Meshes
            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (i, item) in frame.draws.iter().take(instances.len()).enumerate() {
                if let Some(mesh) = self.meshes.get(&item.id) {
                    let i = i as u32;
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..mesh.index_count, 0, i..i + 1);
                }
            }

            // Edges and helpers
            if !lines.is_empty() {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.globals_bind_group, &[]);
                pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                pass.draw(0..lines.len() as u32, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    fn create_msaa_texture(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa_color_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubelight_render::RenderView;
    use cubelight_scene::SceneConfig;

    fn frame() -> FrameData {
        let mut scene = Scene::from_config(&SceneConfig::default(), 11).unwrap();
        scene.tick(0.25);
        FrameData::extract(&scene, &RenderView::from_camera(scene.camera()))
    }

    #[test]
    fn gpu_structs_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
        assert_eq!(std::mem::size_of::<Globals>(), 336);
        assert_eq!(std::mem::size_of::<InstanceData>(), 80);
        assert_eq!(std::mem::size_of::<GpuVertex>(), 40);
        assert_eq!(std::mem::size_of::<GpuLineVertex>(), 28);
    }

    #[test]
    fn globals_pack_light_flags() {
        let frame = frame();
        let g = Globals::from_frame(&frame, 1024);
        assert_eq!(g.sun_dir[3], 1.0);
        assert_eq!(g.sun_radiance[3], 1.0);
        assert_eq!(g.spot_pos, [5.0, 7.0, 2.0, 1.0]);
        assert_eq!(g.spot_dir[3], 1.0);
        assert_eq!(g.spot_params[0], 20.0);
        assert_eq!(g.spot_params[1], 1.5);
        assert!((g.shadow_params[0] - 1.0 / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn missing_lights_are_disabled() {
        let mut frame = frame();
        frame.lighting.spot = None;
        frame.lighting.directional = None;
        let g = Globals::from_frame(&frame, 1024);
        assert_eq!(g.sun_dir[3], 0.0);
        assert_eq!(g.spot_pos[3], 0.0);
    }

    #[test]
    fn instance_params_carry_material() {
        let frame = frame();
        for item in &frame.draws {
            let data = InstanceData::from(item);
            assert_eq!(data.params[0], flag(item.unlit));
            assert_eq!(data.params[1], item.roughness);
            assert_eq!(data.params[3], flag(item.receive_shadow));
            assert_eq!(data.model_3[..3], item.model.col(3).truncate().to_array());
        }
    }
}
