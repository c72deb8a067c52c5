//! Quilt render target for lenticular displays.
//!
//! A quilt is a grid of views of the same scene packed into one texture:
//! view 0 in the bottom-left tile, filling rows left-to-right and
//! bottom-to-top, with the views fanned across a horizontal view cone.
//! Lenticular display pipelines consume quilts directly; the panel-specific
//! interleaving step stays outside this crate. On screen the demo simply
//! blits the quilt to the window with a fullscreen pass.

use super::shaders::BLIT_SHADER;

/// Per-tile resolution (portrait tiles, matching common quilt presets).
const TILE_WIDTH: u32 = 420;
const TILE_HEIGHT: u32 = 560;

/// Grid shape and view cone of a quilt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuiltLayout {
    /// Tile columns.
    pub cols: u32,
    /// Tile rows.
    pub rows: u32,
    /// Total horizontal fan of the views, in radians.
    pub view_cone: f32,
}

impl QuiltLayout {
    /// The common 8x6 quilt with a 40° cone.
    pub fn standard() -> Self {
        Self {
            cols: 8,
            rows: 6,
            view_cone: 40.0_f32.to_radians(),
        }
    }

    /// Total number of views.
    pub fn view_count(&self) -> u32 {
        self.cols * self.rows
    }

    /// Off-axis angle of view `index`, spread evenly across the cone from
    /// left (-cone/2) to right (+cone/2).
    pub fn view_angle(&self, index: u32) -> f32 {
        let n = self.view_count();
        if n <= 1 {
            return 0.0;
        }
        let t = index as f32 / (n - 1) as f32;
        (t - 0.5) * self.view_cone
    }

    /// Pixel size of the full quilt texture.
    pub fn quilt_size(&self) -> (u32, u32) {
        (self.cols * TILE_WIDTH, self.rows * TILE_HEIGHT)
    }

    /// Aspect ratio of a single tile.
    pub fn tile_aspect(&self) -> f32 {
        TILE_WIDTH as f32 / TILE_HEIGHT as f32
    }

    /// Viewport rectangle `(x, y, w, h)` of view `index`, in quilt pixels
    /// with a top-left origin (wgpu viewport convention). View 0 is the
    /// bottom-left tile.
    pub fn viewport(&self, index: u32) -> (f32, f32, f32, f32) {
        let col = index % self.cols;
        let row = index / self.cols;
        let (_, quilt_h) = self.quilt_size();
        let x = col * TILE_WIDTH;
        let y = quilt_h - (row + 1) * TILE_HEIGHT;
        (x as f32, y as f32, TILE_WIDTH as f32, TILE_HEIGHT as f32)
    }
}

/// GPU resources for rendering into and presenting a quilt.
pub struct QuiltState {
    pub layout: QuiltLayout,
    /// Offscreen quilt render target.
    pub view: wgpu::TextureView,
    /// Quilt-sized depth buffer.
    pub depth_view: wgpu::TextureView,
    /// Fullscreen pass presenting the quilt to the window.
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl QuiltState {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        layout: QuiltLayout,
    ) -> Self {
        let (width, height) = layout.quilt_size();

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Quilt Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: surface_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Quilt Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: super::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Quilt Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Quilt Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Quilt Blit Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Quilt Blit Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Quilt Blit Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Quilt Blit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            layout,
            view,
            depth_view,
            pipeline,
            bind_group,
        }
    }

    /// Present the quilt to `target` with a fullscreen pass.
    pub fn blit(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Quilt Blit Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
