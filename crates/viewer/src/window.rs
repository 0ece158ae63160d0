use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder};

use crate::error::ViewerError;
use crate::figure::{Figure, Figures, DEFAULT_HISTORY};
use crate::plot::{self, Vertex};
use crate::scene::Scene;
use crate::Viewer;

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.08,
    g: 0.08,
    b: 0.1,
    a: 1.0,
};
const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x3];

/// Configuration for a [`WindowViewer`]
#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Samples kept per line
    pub history: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Nao Walking".into(),
            width: 1280,
            height: 720,
            history: DEFAULT_HISTORY,
        }
    }
}

/// Window that draws the scene and the figures as coloured lines.
///
/// Events are pumped from [`Viewer::render`], so the caller keeps control of
/// the loop. Titles and labels are not rasterised; they go to the log and the
/// window title instead.
pub struct WindowViewer {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    base_title: String,
    figures: Figures,
    scene: Scene,
    alive: bool,
    titled_figures: usize,
}

impl WindowViewer {
    /// Opens the window and sets up the GPU pipeline.
    ///
    /// # Errors
    ///
    /// Fails when no window, adapter or device can be created.
    pub fn new(config: WindowConfig) -> Result<Self, ViewerError> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(&config.title)
                .with_inner_size(PhysicalSize::new(config.width, config.height))
                .build(&event_loop)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to get adapter")?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Viewer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))
        .context("failed to request device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            // The simulation paces itself; vsync would stretch its timestep.
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let pipeline = create_pipeline(&device, format);
        let vertex_buffer = create_vertex_buffer(&device, &[]);

        tracing::info!(adapter = ?adapter.get_info().name, width = size.width, height = size.height, "viewer window opened");
        Ok(Self {
            event_loop,
            window,
            surface,
            device,
            queue,
            config: surface_config,
            pipeline,
            vertex_buffer,
            base_title: config.title,
            figures: Figures::new(config.history),
            scene: Scene::default(),
            alive: true,
            titled_figures: 0,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width > 0 && size.height > 0 {
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn pump_events(&mut self) {
        let mut close_requested = false;
        let mut resized = None;
        let status = self.event_loop.pump_events(Some(Duration::ZERO), |event, elwt| {
            if let Event::WindowEvent { event, .. } = event {
                match event {
                    WindowEvent::CloseRequested => {
                        close_requested = true;
                        elwt.exit();
                    }
                    WindowEvent::Resized(size) => resized = Some(size),
                    _ => {}
                }
            }
        });
        if let Some(size) = resized {
            self.resize(size);
        }
        if close_requested || matches!(status, PumpStatus::Exit(_)) {
            tracing::info!("viewer window closed");
            self.alive = false;
        }
    }

    /// Lists figure titles in the window title whenever figures were added.
    fn update_title(&mut self) {
        let figures = self.figures.as_slice();
        if figures.len() == self.titled_figures {
            return;
        }
        let titles: Vec<&str> = figures.iter().map(Figure::display_title).collect();
        for figure in figures {
            let lines: Vec<&str> = figure.lines().iter().map(|line| line.name()).collect();
            tracing::info!(
                figure = figure.display_title(),
                x_label = figure.x_label().unwrap_or(""),
                lines = %lines.join(", "),
                "panel"
            );
        }
        self.window
            .set_title(&format!("{} | {}", self.base_title, titles.join(" / ")));
        self.titled_figures = figures.len();
    }

    fn upload(&mut self, vertices: &[Vertex]) {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        if self.vertex_buffer.size() < bytes.len() as u64 {
            self.vertex_buffer = create_vertex_buffer(&self.device, vertices);
        } else if !bytes.is_empty() {
            self.queue.write_buffer(&self.vertex_buffer, 0, bytes);
        }
    }
}

impl Viewer for WindowViewer {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn figure(&mut self, name: &str) -> &mut Figure {
        self.figures.get_or_create(name)
    }

    fn figures(&self) -> &[Figure] {
        self.figures.as_slice()
    }

    fn update_scene(&mut self, scene: &Scene) {
        self.scene.clone_from(scene);
    }

    fn render(&mut self) -> Result<(), ViewerError> {
        self.pump_events();
        if !self.alive {
            return Ok(());
        }
        self.update_title();

        let vertices = plot::build(&self.scene, self.figures.as_slice());
        self.upload(&vertices);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timed out, skipping frame");
                return Ok(());
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context("failed to acquire surface texture")
                    .into())
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("viewer") });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lines"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rpass.draw(0..vertices.len() as u32, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertices: &[Vertex]) -> wgpu::Buffer {
    // Zero sized vertex buffers are not allowed.
    let placeholder = [Vertex {
        position: [0.0; 2],
        color: [0.0; 3],
    }];
    let contents = if vertices.is_empty() { &placeholder[..] } else { vertices };
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("line vertices"),
        contents: bytemuck::cast_slice(contents),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

fn create_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("line shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("line pipeline layout"),
        bind_group_layouts: &[],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("line pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &VERTEX_ATTRIBUTES,
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}
