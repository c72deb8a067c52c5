//! GPU state and frame rendering.
//!
//! One instanced draw covers every billboard sphere (the points plus the
//! player), a line-list draw outlines the boundary box, and an optional
//! quilt pass repeats the scene across the stereo views. Per-view uniforms
//! live in a single buffer addressed with dynamic offsets so a whole quilt
//! renders from one command encoder.

pub mod camera;
pub mod quilt;
mod shaders;

pub use camera::Camera;
pub use quilt::{QuiltLayout, QuiltState};

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::scene::BOX_HALF_EXTENTS;
use self::shaders::{SPRITE_SHADER, WIRE_SHADER};

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.05,
    a: 1.0,
};

/// One billboard sphere: a point or the player.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 3],
    /// World-space radius.
    pub size: f32,
    pub color: [f32; 3],
    /// 1.0 renders self-lit (the player); 0.0 is lit by the player light.
    pub emissive: f32,
}

/// Per-view uniforms, written once per view each frame.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light_pos: [f32; 3],
    time: f32,
    light_color: [f32; 3],
    _pad: f32,
}

impl Uniforms {
    fn new(view_proj: Mat4, light_pos: Vec3, light_color: Vec3, time: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_pos: light_pos.to_array(),
            time,
            light_color: light_color.to_array(),
            _pad: 0.0,
        }
    }
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    sprite_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    instance_capacity: u32,
    wire_buffer: wgpu::Buffer,
    wire_vertex_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_stride: u64,
    uniform_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::TextureView,
    quilt: Option<QuiltState>,
    pub camera: Camera,
}

impl GpuState {
    /// Initialize the GPU for a window.
    ///
    /// `max_sprites` sizes the instance buffer; `quilt_layout` enables the
    /// stereo quilt path when present.
    pub async fn new(
        window: Arc<Window>,
        max_sprites: u32,
        quilt_layout: Option<QuiltLayout>,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, config.width, config.height);

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Instance Buffer"),
            size: max_sprites as u64 * std::mem::size_of::<SpriteInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let wire_vertices = box_edge_vertices(BOX_HALF_EXTENTS);
        let wire_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Box Edge Buffer"),
            contents: bytemuck::cast_slice(&wire_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // One uniform slot per view, addressed with dynamic offsets.
        let uniform_size = std::mem::size_of::<Uniforms>() as u64;
        let align = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = uniform_size.next_multiple_of(align);
        let view_slots = quilt_layout.map(|l| l.view_count()).unwrap_or(1).max(1);
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: uniform_stride * view_slots as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(uniform_size),
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let sprite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(SPRITE_SHADER.into()),
        });

        let sprite_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &sprite_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x3,
                        },
                        wgpu::VertexAttribute {
                            offset: 12,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32,
                        },
                        wgpu::VertexAttribute {
                            offset: 16,
                            shader_location: 2,
                            format: wgpu::VertexFormat::Float32x3,
                        },
                        wgpu::VertexAttribute {
                            offset: 28,
                            shader_location: 3,
                            format: wgpu::VertexFormat::Float32,
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &sprite_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let wire_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Wire Shader"),
            source: wgpu::ShaderSource::Wgsl(WIRE_SHADER.into()),
        });

        let wire_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Wire Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &wire_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: 12,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &wire_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let quilt = quilt_layout.map(|layout| QuiltState::new(&device, config.format, layout));

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sprite_pipeline,
            wire_pipeline,
            instance_buffer,
            instance_capacity: max_sprites,
            wire_buffer,
            wire_vertex_count: wire_vertices.len() as u32,
            uniform_buffer,
            uniform_stride,
            uniform_bind_group,
            depth_texture,
            quilt,
            camera: Camera::new(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture =
                create_depth_texture(&self.device, self.config.width, self.config.height);
        }
    }

    /// Render one frame: the scene once (flat) or once per quilt view, lit
    /// from `light_pos` with `light_color`.
    pub fn render(
        &mut self,
        sprites: &[SpriteInstance],
        light_pos: Vec3,
        light_color: Vec3,
        time: f32,
    ) -> Result<(), wgpu::SurfaceError> {
        let sprite_count = sprites.len().min(self.instance_capacity as usize);
        if sprite_count > 0 {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&sprites[..sprite_count]),
            );
        }

        match &self.quilt {
            Some(quilt) => {
                let aspect = quilt.layout.tile_aspect();
                for i in 0..quilt.layout.view_count() {
                    let view_proj = self
                        .camera
                        .offset_view_proj(aspect, quilt.layout.view_angle(i));
                    let uniforms = Uniforms::new(view_proj, light_pos, light_color, time);
                    self.queue.write_buffer(
                        &self.uniform_buffer,
                        i as u64 * self.uniform_stride,
                        bytemuck::bytes_of(&uniforms),
                    );
                }
            }
            None => {
                let aspect = self.config.width as f32 / self.config.height as f32;
                let uniforms =
                    Uniforms::new(self.camera.view_proj(aspect), light_pos, light_color, time);
                self.queue
                    .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
            }
        }

        let output = self.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        match &self.quilt {
            Some(quilt) => {
                {
                    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Quilt Scene Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &quilt.view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: Some(
                            wgpu::RenderPassDepthStencilAttachment {
                                view: &quilt.depth_view,
                                depth_ops: Some(wgpu::Operations {
                                    load: wgpu::LoadOp::Clear(1.0),
                                    store: wgpu::StoreOp::Store,
                                }),
                                stencil_ops: None,
                            },
                        ),
                        timestamp_writes: None,
                        occlusion_query_set: None,
                    });

                    for i in 0..quilt.layout.view_count() {
                        let (x, y, w, h) = quilt.layout.viewport(i);
                        pass.set_viewport(x, y, w, h, 0.0, 1.0);
                        self.draw_scene(
                            &mut pass,
                            (i as u64 * self.uniform_stride) as u32,
                            sprite_count as u32,
                        );
                    }
                }
                quilt.blit(&mut encoder, &surface_view);
            }
            None => {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Scene Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &surface_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(CLEAR_COLOR),
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
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                self.draw_scene(&mut pass, 0, sprite_count as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn draw_scene(&self, pass: &mut wgpu::RenderPass<'_>, uniform_offset: u32, sprite_count: u32) {
        pass.set_pipeline(&self.wire_pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[uniform_offset]);
        pass.set_vertex_buffer(0, self.wire_buffer.slice(..));
        pass.draw(0..self.wire_vertex_count, 0..1);

        pass.set_pipeline(&self.sprite_pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[uniform_offset]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..sprite_count);
    }
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// The 12 edges of the boundary box as line-list vertices.
fn box_edge_vertices(half: Vec3) -> Vec<[f32; 3]> {
    let corners: Vec<Vec3> = (0..8u32)
        .map(|i| {
            Vec3::new(
                if i & 1 == 0 { -half.x } else { half.x },
                if i & 2 == 0 { -half.y } else { half.y },
                if i & 4 == 0 { -half.z } else { half.z },
            )
        })
        .collect();

    let mut vertices = Vec::with_capacity(24);
    for a in 0..8u32 {
        for b in (a + 1)..8 {
            // Corners differing in exactly one axis bit share an edge.
            if (a ^ b).count_ones() == 1 {
                vertices.push(corners[a as usize].to_array());
                vertices.push(corners[b as usize].to_array());
            }
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_has_twelve_edges() {
        let vertices = box_edge_vertices(glam::Vec3::new(1.5, 2.0, 1.0));
        assert_eq!(vertices.len(), 24);
    }

    #[test]
    fn test_edges_lie_on_the_box() {
        let half = glam::Vec3::new(1.5, 2.0, 1.0);
        for v in box_edge_vertices(half) {
            assert!(v[0].abs() == half.x || v[1].abs() == half.y || v[2].abs() == half.z);
            assert!(v[0].abs() <= half.x && v[1].abs() <= half.y && v[2].abs() <= half.z);
        }
    }

    #[test]
    fn test_sprite_instance_layout() {
        // The vertex attributes in the sprite pipeline rely on this layout.
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
        assert_eq!(std::mem::offset_of!(SpriteInstance, size), 12);
        assert_eq!(std::mem::offset_of!(SpriteInstance, color), 16);
        assert_eq!(std::mem::offset_of!(SpriteInstance, emissive), 28);
    }
}
