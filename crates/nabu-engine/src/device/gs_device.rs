use anyhow::Result;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use bytemuck::{Pod, Zeroable};

use crate::gs::{BlendMode, GsBackend, HwMode, Primitive, ScreenConfig, Transfer};
use crate::paint::Rgba;
use crate::vram::DEFAULT_VRAM_SIZE;

use super::instance::{encode, PrimInstance};
use super::surface::{display_rect, SurfaceErrorAction};
use super::{Gpu, GpuInit};

/// Configuration of the wgpu-backed rasterizer.
#[derive(Debug, Clone)]
pub struct GsInit {
    pub gpu: GpuInit,
    /// Bytes of emulated VRAM (one storage buffer).
    pub vram_size: u32,
    /// Mode reported as the device default.
    pub default_mode: HwMode,
}

impl Default for GsInit {
    fn default() -> Self {
        Self {
            gpu: GpuInit::default(),
            vram_size: DEFAULT_VRAM_SIZE,
            default_mode: HwMode::PAL,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ScreenUniform {
    size: [f32; 2],
    _pad: [f32; 2], // 16-byte alignment
}

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

/// The surface texture currently being drawn into.
struct Backbuffer {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// [`GsBackend`] rendering into a window surface through wgpu.
///
/// VRAM is a single storage buffer written by [`transfer`](GsBackend::transfer);
/// texels are decoded in the fragment shader from a linear layout (row stride
/// = texture width). The logical screen is scaled into a 4:3 display
/// rectangle centered in the window.
pub struct GsDevice<'w> {
    gpu: Gpu<'w>,
    default_mode: HwMode,
    vram_size: u32,

    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    screen_ubo: wgpu::Buffer,
    vram: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
    instance_vbo: wgpu::Buffer,
    instance_capacity: usize,

    screen: Option<ScreenConfig>,
    blend: BlendMode,
    pending: Vec<PrimInstance>,
    clear: Option<Rgba>,
    backbuffer: Option<Backbuffer>,
    active_buffer: u32,
    fatal: bool,
}

impl<'w> GsDevice<'w> {
    pub async fn new(window: &'w Window, init: GsInit) -> Result<Self> {
        let vram_bytes = u64::from(init.vram_size.next_multiple_of(4).max(4));
        let gpu = Gpu::new(window, &init.gpu, vram_bytes).await?;
        let device = gpu.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("nabu gs shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gs.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nabu gs bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ScreenUniform>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(vram_bytes),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("nabu gs pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("nabu gs pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PrimInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let screen_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("nabu gs screen ubo"),
            size: std::mem::size_of::<ScreenUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vram = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("nabu vram"),
            size: vram_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nabu gs bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: screen_ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: vram.as_entire_binding() },
            ],
        });

        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("nabu gs quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let (instance_vbo, instance_capacity) = create_instance_buffer(device, 256);

        log::debug!("gs: {} bytes of vram, surface {:?}", init.vram_size, gpu.surface_format());

        Ok(Self {
            gpu,
            default_mode: init.default_mode,
            vram_size: init.vram_size,
            pipeline,
            bind_group,
            screen_ubo,
            vram,
            quad_ibo,
            instance_vbo,
            instance_capacity,
            screen: None,
            blend: BlendMode::BackToFront,
            pending: Vec::new(),
            clear: None,
            backbuffer: None,
            active_buffer: 0,
            fatal: false,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        // Whatever was acquired belongs to the old configuration.
        self.backbuffer = None;
        self.gpu.resize(new_size);
    }

    /// Set once the surface reported an unrecoverable error.
    pub fn is_lost(&self) -> bool {
        self.fatal
    }

    /// Framebuffer index last selected by the renderer.
    pub fn active_buffer(&self) -> u32 {
        self.active_buffer
    }

    fn acquire(&mut self) -> bool {
        if self.backbuffer.is_some() {
            return true;
        }
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return false;
        }
        match self.gpu.acquire() {
            Ok(surface_texture) => {
                let view = surface_texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.backbuffer = Some(Backbuffer { surface_texture, view });
                // Fresh surface textures have undefined contents.
                self.clear.get_or_insert(Rgba::BLACK);
                true
            }
            Err(err) => {
                match self.gpu.handle_surface_error(&err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("gs: surface lost: {err}");
                        self.fatal = true;
                    }
                    action => log::debug!("gs: surface error {err} ({action:?}); frame skipped"),
                }
                false
            }
        }
    }

    fn ensure_instance_capacity(&mut self, required: usize) {
        if required <= self.instance_capacity {
            return;
        }
        let (vbo, cap) = create_instance_buffer(self.gpu.device(), required);
        self.instance_vbo = vbo;
        self.instance_capacity = cap;
    }
}

fn create_instance_buffer(device: &wgpu::Device, required: usize) -> (wgpu::Buffer, usize) {
    let cap = required.next_power_of_two().max(64);
    let vbo = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("nabu gs instance vbo"),
        size: (cap * std::mem::size_of::<PrimInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    (vbo, cap)
}

fn clear_color(c: Rgba) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(c.r) / 255.0,
        g: f64::from(c.g) / 255.0,
        b: f64::from(c.b) / 255.0,
        a: 1.0,
    }
}

impl GsBackend for GsDevice<'_> {
    fn default_mode(&self) -> HwMode {
        self.default_mode
    }

    fn vram_size(&self) -> u32 {
        self.vram_size
    }

    fn configure_screen(&mut self, screen: &ScreenConfig) {
        let u = ScreenUniform {
            size: [screen.width as f32, screen.height as f32],
            _pad: [0.0; 2],
        };
        self.gpu.queue().write_buffer(&self.screen_ubo, 0, bytemuck::bytes_of(&u));
        self.screen = Some(*screen);
        log::debug!("gs: screen {}x{} mode {:#04x}", screen.width, screen.height, screen.mode.0);
    }

    fn clear(&mut self, color: Rgba) {
        // Anything queued before the clear would be overdrawn.
        self.pending.clear();
        self.clear = Some(color);
    }

    fn sync_flip(&mut self) {
        self.dispatch();
        self.wait_finish();
        self.display_buffer(self.active_buffer);
    }

    fn set_blend(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    fn submit(&mut self, prim: Primitive) {
        self.pending.push(encode(&prim, self.blend));
    }

    fn dispatch(&mut self) {
        if self.pending.is_empty() && self.clear.is_none() {
            return;
        }
        if self.screen.is_none() || !self.acquire() {
            self.pending.clear();
            return;
        }

        let count = self.pending.len();
        self.ensure_instance_capacity(count);
        if count > 0 {
            self.gpu
                .queue()
                .write_buffer(&self.instance_vbo, 0, bytemuck::cast_slice(&self.pending));
        }

        let Some(backbuffer) = self.backbuffer.as_ref() else { return };
        let load = match self.clear.take() {
            Some(c) => wgpu::LoadOp::Clear(clear_color(c)),
            None => wgpu::LoadOp::Load,
        };

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("nabu gs dispatch") });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("nabu gs pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &backbuffer.view,
                    resolve_target: None,
                    ops: wgpu::Operations { load, store: wgpu::StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(d) = display_rect(self.gpu.size()).filter(|_| count > 0) {
                rpass.set_viewport(d.x, d.y, d.width, d.height, 0.0, 1.0);
                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, &self.bind_group, &[]);
                rpass.set_vertex_buffer(0, self.instance_vbo.slice(..));
                rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..6, 0, 0..count as u32);
            }
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        self.pending.clear();
    }

    fn mark_finish(&mut self) {
        // Completion is tracked per queue submission; nothing to enqueue.
    }

    fn wait_finish(&mut self) {
        if let Err(e) = self.gpu.device().poll(wgpu::PollType::wait_indefinitely()) {
            log::warn!("gs: wait for completion failed: {e}");
        }
    }

    fn transfer(&mut self, transfer: &Transfer<'_>) {
        let addr = transfer.addr.get();
        let room = self.vram_size.saturating_sub(addr) as usize;
        let data = &transfer.data[..transfer.data.len().min(room)];
        if data.len() < transfer.data.len() {
            log::warn!("gs: transfer at {addr:#x} truncated to {} bytes", data.len());
        }
        if data.is_empty() {
            return;
        }

        // Buffer writes must be a multiple of four bytes.
        if data.len() % 4 == 0 {
            self.gpu.queue().write_buffer(&self.vram, u64::from(addr), data);
        } else {
            let mut padded = data.to_vec();
            padded.resize(data.len().next_multiple_of(4), 0);
            self.gpu.queue().write_buffer(&self.vram, u64::from(addr), &padded);
        }
    }

    fn display_buffer(&mut self, index: u32) {
        log::trace!("gs: display buffer {index}");
        if let Some(backbuffer) = self.backbuffer.take() {
            backbuffer.surface_texture.present();
        }
    }

    fn set_active_buffer(&mut self, index: u32) {
        self.active_buffer = index;
    }
}
