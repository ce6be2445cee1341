use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::clock::Clock;
use crate::config::{
    Args, SharedSettings, Settings, SourceKind, BACKGROUND_COLOR, GRID_WIDTH_COARSE_STEP,
    GRID_WIDTH_STEP, THRESHOLD_STEP,
};
use crate::gpu::{GpuContext, RenderParams, RenderPipeline, SwitchBuffers};
use crate::pipeline::Pipeline;
use crate::sampling::acquire;
use crate::viewport::{Viewport, ViewportSample};

/// Application state
pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    switch_buffers: Option<SwitchBuffers>,
    render_pipeline: Option<RenderPipeline>,
    clock: Clock,
    viewport: Option<Viewport>,
    pipeline: Option<Rc<RefCell<Pipeline>>>,
    settings: SharedSettings,
    initial: Settings,
    source: SourceKind,
    filter: image::imageops::FilterType,
    window_size: (u32, u32),
    modifiers: ModifiersState,
    fps: Rc<Cell<Option<f64>>>,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(args: Args) -> Self {
        let initial = args.settings();
        Self {
            window: None,
            gpu: None,
            switch_buffers: None,
            render_pipeline: None,
            clock: Clock::new(),
            viewport: None,
            pipeline: None,
            settings: Rc::new(Cell::new(initial)),
            initial,
            source: args.source,
            filter: args.filter.filter_type(),
            window_size: (args.window_width, args.window_height),
            modifiers: ModifiersState::empty(),
            fps: Rc::new(Cell::new(None)),
            error: None,
        }
    }

    /// Startup failure, if the event loop exited because of one
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let settings = self.settings.get();
        log::info!("Initializing switch mirror...");
        log::info!(
            "Threshold {:.2}, width {}, accent {}, invert {}",
            settings.threshold,
            settings.grid_width,
            settings.accent,
            settings.invert
        );

        // Create window
        let (width, height) = self.window_size;
        let window_attrs = Window::default_attributes()
            .with_title("Switch Mirror - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        // Initialize GPU
        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;

        let viewport_sample = ViewportSample::from_physical(window.inner_size(), window.scale_factor());
        let mut viewport = Viewport::new(viewport_sample);

        // Camera stand-in resolves in the background
        let source = acquire(self.source.clone());
        let pipeline = Rc::new(RefCell::new(Pipeline::new(
            Box::new(source),
            self.settings.clone(),
            viewport_sample,
            self.filter,
        )));
        let dims = pipeline.borrow().dimensions();
        log::info!("Grid {}x{} ({} switches)", dims.width(), dims.height(), dims.cell_count());

        let on_resize = pipeline.clone();
        viewport.on_resize(move |sample| on_resize.borrow_mut().set_viewport(*sample));

        let on_tick = pipeline.clone();
        self.clock.on_tick(move |sample| on_tick.borrow_mut().tick(sample));

        // Frame rate over roughly one-second windows of clock time
        let fps = self.fps.clone();
        let (mut frames, mut window_start) = (0u32, 0.0f64);
        self.clock.on_tick(move |sample| {
            frames += 1;
            let span = sample.elapsed_ms - window_start;
            if span >= 1000.0 {
                fps.set(Some(frames as f64 * 1000.0 / span));
                frames = 0;
                window_start = sample.elapsed_ms;
            }
        });
        log::debug!("{} tick subscribers", self.clock.subscriber_count());

        log::info!("Creating render pipeline...");
        let switch_buffers = SwitchBuffers::new(&gpu.device, dims.cell_count());
        let render_pipeline = RenderPipeline::new(&gpu.device, gpu.format(), BACKGROUND_COLOR);

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Up/Down: Threshold");
        log::info!("  Left/Right: Grid width (Shift for x{})", GRID_WIDTH_COARSE_STEP);
        log::info!("  I: Toggle mirrored sampling");
        log::info!("  C: Cycle accent color");
        log::info!("  R: Reset settings");
        log::info!("  Escape: Quit");

        window.request_redraw();
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.viewport = Some(viewport);
        self.pipeline = Some(pipeline);
        self.switch_buffers = Some(switch_buffers);
        self.render_pipeline = Some(render_pipeline);
        Ok(())
    }

    fn render(&mut self) {
        // Tick subscribers advance the pipeline and FPS counter
        self.clock.tick();

        let (Some(gpu), Some(buffers), Some(render), Some(pipeline), Some(viewport)) = (
            self.gpu.as_ref(),
            self.switch_buffers.as_mut(),
            self.render_pipeline.as_ref(),
            self.pipeline.as_ref(),
            self.viewport.as_ref(),
        ) else {
            return;
        };

        buffers.upload(&gpu.device, &gpu.queue, pipeline.borrow().instances());
        buffers.update_params(
            &gpu.queue,
            &RenderParams::new(&viewport.sample(), gpu.format().is_srgb()),
        );

        // Get surface texture
        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure();
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        let bind_group =
            render.create_bind_group(&gpu.device, &buffers.instance_buffer, &buffers.params_buffer);
        render.draw(&mut encoder, &view, &bind_group, buffers.count());

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let (Some(rate), Some(window)) = (self.fps.take(), &self.window) {
            let settings = self.settings.get();
            let dims = pipeline.borrow().dimensions();
            window.set_title(&format!(
                "Switch Mirror - {:.0} FPS - {}x{} @ {:.2}{}",
                rate,
                dims.width(),
                dims.height(),
                settings.threshold,
                if settings.invert { " [raster]" } else { "" }
            ));
        }
    }

    fn handle_resize(&mut self, size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) {
        if let Some(gpu) = &mut self.gpu {
            if gpu.resize(size) {
                log::info!("Window resized to {}x{}", size.width, size.height);
            }
        }
        if let Some(viewport) = &mut self.viewport {
            viewport.resize(ViewportSample::from_physical(size, scale_factor));
        }
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        let mut settings = self.settings.get();
        let width_step = if self.modifiers.shift_key() {
            GRID_WIDTH_COARSE_STEP
        } else {
            GRID_WIDTH_STEP
        };

        match key_code {
            // Threshold
            KeyCode::ArrowUp => {
                settings = settings.with_threshold(settings.threshold + THRESHOLD_STEP);
                log::info!("Threshold: {:.2}", settings.threshold);
            }
            KeyCode::ArrowDown => {
                settings = settings.with_threshold(settings.threshold - THRESHOLD_STEP);
                log::info!("Threshold: {:.2}", settings.threshold);
            }

            // Grid width
            KeyCode::ArrowRight => {
                settings = settings.with_grid_width(settings.grid_width.saturating_add(width_step));
            }
            KeyCode::ArrowLeft => {
                settings = settings.with_grid_width(settings.grid_width.saturating_sub(width_step));
            }

            // Sampling orientation
            KeyCode::KeyI => {
                settings.invert = !settings.invert;
                log::info!("Sampling: {}", if settings.invert { "raster" } else { "mirrored" });
            }

            // Accent color
            KeyCode::KeyC => {
                settings.accent = settings.next_accent();
                log::info!("Accent: {}", settings.accent);
            }

            // Reset
            KeyCode::KeyR => {
                settings = self.initial;
                log::info!("Settings reset");
            }

            _ => return,
        }

        let previous_width = self.settings.get().grid_width;
        self.settings.set(settings);
        if settings.grid_width != previous_width {
            if let Some(pipeline) = &self.pipeline {
                pipeline.borrow_mut().resize_grid(settings.grid_width);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("Initialization failed: {:#}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                let scale_factor = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                self.handle_resize(new_size, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.handle_resize(size, scale_factor);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                // Request another frame immediately
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
