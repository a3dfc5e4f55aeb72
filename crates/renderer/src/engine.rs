//! The GPU engine: device setup, program compilation and swapping, uniform
//! upload, surface rendering, and offscreen readback.

use std::borrow::Cow;
use std::sync::mpsc;

use anyhow::{anyhow, Context, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use shaderlib::{ParameterUnit, ShaderBuild, ShaderConfig, SlotRole};
use wgpu::naga::ShaderStage;

use crate::binder::UniformBinder;
use crate::cache::ProgramCache;
use crate::types::{even_dimensions, EngineMode, FrameSnapshot};

/// GLSL compile/link failure for one configuration. The previously active
/// program stays active; the caller decides whether to surface or log.
#[derive(Debug, thiserror::Error)]
#[error("shader build failed for {fingerprint}: {diagnostic}")]
pub struct ShaderBuildError {
    pub fingerprint: String,
    pub diagnostic: String,
}

/// A compiled program plus the metadata needed to rebind uniforms.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_names: Vec<&'static str>,
}

pub struct Engine {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    format: wgpu::TextureFormat,
    size: (u32, u32),
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    pipeline_layout: wgpu::PipelineLayout,
    vertex_module: wgpu::ShaderModule,
    binder: UniformBinder,
    cache: ProgramCache<ShaderProgram>,
    active_fingerprint: Option<String>,
    mode: EngineMode,
}

impl Engine {
    /// Creates an engine presenting to a window surface.
    pub fn for_window<T>(target: &T, width: u32, height: u32) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = new_instance();
        let window_handle = target
            .window_handle()
            .map_err(|err| anyhow!("failed to acquire window handle: {err}"))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| anyhow!("failed to acquire display handle: {err}"))?;
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .context("failed to create rendering surface")?;
        Self::init(instance, Some(surface), width, height)
    }

    /// Creates a surfaceless engine for offscreen rendering and tests of
    /// the capture path.
    pub fn headless(width: u32, height: u32) -> Result<Self> {
        let instance = new_instance();
        Self::init(instance, None, width, height)
    }

    fn init(
        instance: wgpu::Instance,
        surface: Option<wgpu::Surface<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: surface.as_ref(),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let adapter_info = adapter.get_info();
        tracing::debug!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("fracview device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        let size = even_dimensions(width, height);

        let (format, surface_config) = match &surface {
            Some(surface) => {
                let caps = surface.get_capabilities(&adapter);
                let format = caps
                    .formats
                    .iter()
                    .copied()
                    .find(|format| !format.is_srgb())
                    .unwrap_or(caps.formats[0]);
                let config = wgpu::SurfaceConfiguration {
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    format,
                    width: size.0,
                    height: size.1,
                    present_mode: wgpu::PresentMode::Fifo,
                    alpha_mode: caps.alpha_modes[0],
                    view_formats: vec![],
                    desired_maximum_frame_latency: 2,
                };
                surface.configure(&device, &config);
                (format, Some(config))
            }
            None => (wgpu::TextureFormat::Rgba8Unorm, None),
        };

        let binder = UniformBinder::default();
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fractal uniform buffer"),
            size: binder.block_size() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fractal pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fullscreen triangle vertex"),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(shaderlib::library::vertex_shader()),
                stage: ShaderStage::Vertex,
                defines: &[],
            },
        });

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            format,
            size,
            uniform_buffer,
            uniform_bind_group,
            pipeline_layout,
            vertex_module,
            binder,
            cache: ProgramCache::default(),
            active_fingerprint: None,
            mode: EngineMode::Idle,
        })
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Capture re-entrancy guard: returns false (and logs) if a capture is
    /// already running.
    pub fn begin_capture(&mut self) -> bool {
        if self.mode == EngineMode::Capturing {
            tracing::warn!("capture already in progress, ignoring request");
            return false;
        }
        self.mode = EngineMode::Capturing;
        true
    }

    pub fn end_capture(&mut self) {
        self.mode = EngineMode::Live;
    }

    /// Tears down the live loop. GPU resources are released when the
    /// engine is dropped.
    pub fn stop(&mut self) {
        self.mode = EngineMode::Idle;
        tracing::debug!("engine stopped");
    }

    /// Assembles, compiles (or fetches from cache), and activates the
    /// program for `config`. On build failure the previously active
    /// program remains active.
    pub fn set_active_configuration(&mut self, config: &ShaderConfig) -> Result<()> {
        let build = shaderlib::assemble(config)?;
        let fingerprint = build.fingerprint.clone();

        let device = &self.device;
        let pipeline_layout = &self.pipeline_layout;
        let vertex_module = &self.vertex_module;
        let format = self.format;
        let program = self.cache.get_or_create(&fingerprint, || {
            build_program(device, pipeline_layout, vertex_module, format, &build)
        })?;

        self.binder.rebind(&program.uniform_names);
        self.active_fingerprint = Some(fingerprint.clone());
        if self.mode == EngineMode::Idle {
            self.mode = EngineMode::Live;
        }
        tracing::info!(fingerprint, "configuration active");
        Ok(())
    }

    /// Resizes the drawing surface exactly, flooring to even dimensions.
    /// Jitter filtering against the host surface is the live loop's job.
    pub fn set_resolution(&mut self, width: u32, height: u32) {
        let target = even_dimensions(width, height);
        if target == self.size {
            return;
        }
        self.size = target;
        if let (Some(surface), Some(config)) = (&self.surface, &mut self.surface_config) {
            config.width = target.0;
            config.height = target.1;
            surface.configure(&self.device, config);
        }
        tracing::debug!(width = target.0, height = target.1, "surface resized");
    }

    /// Reconfigures the surface at the current size; recovers a lost or
    /// outdated swapchain.
    pub fn reconfigure_surface(&mut self) {
        if let (Some(surface), Some(config)) = (&self.surface, &self.surface_config) {
            surface.configure(&self.device, config);
        }
    }

    fn stage_uniforms(&mut self, snapshot: &FrameSnapshot) {
        let binder = &mut self.binder;
        binder.set_vec2("resolution", [self.size.0 as f32, self.size.1 as f32]);
        binder.set_f32("zoom", snapshot.camera.zoom);
        binder.set_f32("maxIterations", snapshot.max_iterations as f32);
        binder.set_f32("offsetShiftX", snapshot.camera.offset.0);
        binder.set_f32("offsetShiftY", snapshot.camera.offset.1);
        binder.set_f32("time", snapshot.time);
        binder.set_vec3("brightness", snapshot.palette.brightness);
        binder.set_vec3("contrast", snapshot.palette.contrast);
        binder.set_vec3("osc", snapshot.palette.osc);
        binder.set_vec3("phase", snapshot.palette.phase);
        for unit in ParameterUnit::ALL {
            binder.set_f32(unit.name(), snapshot.params.live(unit));
        }
        for role in SlotRole::ALL {
            let slot = snapshot.slots.get(role);
            binder.set_f32(role.intensity_uniform(), slot.intensity);
            binder.set_i32(role.condition_uniform(), slot.condition.index());
        }
        self.queue
            .write_buffer(&self.uniform_buffer, 0, self.binder.as_bytes());
    }

    fn active_program(&self) -> Result<&ShaderProgram> {
        let fingerprint = self
            .active_fingerprint
            .as_deref()
            .context("no active configuration")?;
        self.cache
            .get(fingerprint)
            .context("active program missing from cache")
    }

    fn encode_draw(
        &self,
        pipeline: &wgpu::RenderPipeline,
        view: &wgpu::TextureView,
    ) -> wgpu::CommandBuffer {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("fractal frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("fractal pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        encoder.finish()
    }

    /// Renders one live frame to the window surface.
    pub fn render(&mut self, snapshot: &FrameSnapshot) -> Result<()> {
        if !self.mode.permits_live_frame() {
            return Ok(());
        }
        self.stage_uniforms(snapshot);
        let program = self.active_program()?;
        let surface = self.surface.as_ref().context("engine has no surface")?;
        let frame = surface
            .get_current_texture()
            .context("failed to acquire surface frame")?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let commands = self.encode_draw(&program.pipeline, &view);
        self.queue.submit(Some(commands));
        frame.present();
        Ok(())
    }

    /// Renders one frame into an offscreen RGBA8 target and reads it back.
    /// Used by the capture path and by headless rendering.
    pub fn render_to_image(&mut self, snapshot: &FrameSnapshot) -> Result<image::RgbaImage> {
        self.stage_uniforms(snapshot);
        let program = self.active_program()?;
        let (width, height) = self.size;

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("capture target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let draw = self.encode_draw(&program.pipeline, &view);

        // Rows are padded to wgpu's 256-byte copy alignment.
        let unpadded_bytes_per_row = width * 4;
        let padded_bytes_per_row =
            unpadded_bytes_per_row.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
                * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("capture readback"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("capture copy"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit([draw, encoder.finish()]);

        let slice = readback.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|err| anyhow!("device poll failed: {err:?}"))?;
        rx.recv()
            .context("readback mapping callback dropped")?
            .context("failed to map readback buffer")?;

        let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in 0..height {
                let start = (row * padded_bytes_per_row) as usize;
                pixels.extend_from_slice(&data[start..start + unpadded_bytes_per_row as usize]);
            }
        }
        readback.unmap();

        image::RgbaImage::from_raw(width, height, pixels)
            .context("readback produced a short pixel buffer")
    }
}

fn new_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        flags: wgpu::InstanceFlags::default(),
        memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
        backend_options: wgpu::BackendOptions::default(),
    })
}

/// Compiles and links one program, capturing GLSL diagnostics through a
/// validation error scope so a broken configuration cannot poison the
/// device.
fn build_program(
    device: &wgpu::Device,
    pipeline_layout: &wgpu::PipelineLayout,
    vertex_module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    build: &ShaderBuild,
) -> Result<ShaderProgram, ShaderBuildError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fractal fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(build.source.as_str()),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("fractal pipeline"),
        layout: Some(pipeline_layout),
        vertex: wgpu::VertexState {
            module: vertex_module,
            entry_point: Some("main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
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
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    });

    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(ShaderBuildError {
            fingerprint: build.fingerprint.clone(),
            diagnostic: error.to_string(),
        });
    }

    Ok(ShaderProgram {
        pipeline,
        uniform_names: build.uniform_names.clone(),
    })
}

/// Encodes an RGBA image as PNG for submission to the frame sink.
pub fn encode_png(image: &image::RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .context("failed to encode frame as png")?;
    Ok(bytes)
}
