use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use sketch::{DisplayList, FrameInfo, Projection, Sketch};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::runtime::{run_deadline, FrameCounter, FrameScheduler, FrameStats};
use crate::types::{RendererConfig, SurfaceAlpha};

/// Owns the sketch, its GPU resources and the frame clock for one window.
///
/// `gpu` is declared before `window` so the surface is dropped first.
pub(crate) struct WindowState {
    gpu: GpuState,
    window: Arc<Window>,
    sketch: Box<dyn Sketch>,
    display_list: DisplayList,
    projection: Projection,
    counter: FrameCounter,
    scheduler: FrameScheduler,
    stats: FrameStats,
    target_fps: Option<f32>,
}

impl WindowState {
    pub(crate) fn new(
        window: Arc<Window>,
        config: &RendererConfig,
        sketch: Box<dyn Sketch>,
    ) -> Result<Self> {
        let gpu = GpuState::new(
            window.as_ref(),
            window.inner_size(),
            config.antialiasing,
            config.surface_alpha,
            config.gpu_power,
        )?;
        let projection = Projection::pixel_exact(gpu.viewport());

        let mut state = Self {
            gpu,
            window,
            sketch,
            display_list: DisplayList::new(),
            projection,
            counter: FrameCounter::new(),
            scheduler: FrameScheduler::new(config.target_fps),
            stats: FrameStats::new(Instant::now()),
            target_fps: config.target_fps,
        };
        state.setup();
        Ok(state)
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    /// Runs the sketch's setup against the current surface size.
    fn setup(&mut self) {
        let viewport = self.gpu.viewport();
        let request = self.sketch.setup(viewport);
        self.projection = request.projection;
        let fps = self.target_fps.or(Some(request.frame_rate));
        self.scheduler.set_rate(fps);
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            fps = fps.unwrap_or_default(),
            "sketch set up"
        );
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 || new_size == self.gpu.size() {
            return;
        }
        tracing::debug!(width = new_size.width, height = new_size.height, "resizing surface");
        self.gpu.resize(new_size);
        self.setup();
    }

    pub(crate) fn render_frame(&mut self, now: Instant) -> Result<(), wgpu::SurfaceError> {
        let frame = FrameInfo::new(self.counter.advance(), self.gpu.viewport());
        self.display_list.begin_frame();
        self.sketch.draw(&mut self.display_list, &frame);
        self.gpu.render(&self.display_list, &self.projection)?;

        self.scheduler.mark_rendered(now);
        if self.stats.record(now) {
            tracing::debug!(
                fps = format_args!("{:.1}", self.stats.fps()),
                frame = self.counter.current(),
                ellipses = self.display_list.commands().len(),
                "frame stats"
            );
        }
        Ok(())
    }
}

/// Opens the window and drives `sketch` until it closes, Escape is pressed,
/// or `config.run_for` elapses.
pub(crate) fn run(config: RendererConfig, sketch: Box<dyn Sketch>) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size)
        .with_transparent(config.surface_alpha == SurfaceAlpha::Transparent)
        .with_decorations(config.decorations)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, &config, sketch)
        .map_err(|err| anyhow!("failed to initialise window renderer: {err}"))?;
    let profile = state.gpu.adapter_profile();
    if profile.is_software() {
        tracing::warn!(
            adapter = %profile.name,
            backend = ?profile.backend,
            "software rasterizer detected; animation may not reach its frame rate"
        );
    }

    let deadline = config.run_for.and_then(|duration| {
        let deadline = run_deadline(Instant::now(), duration);
        if deadline.is_none() {
            tracing::warn!(?duration, "run duration too long to schedule; running until closed");
        }
        deadline
    });
    let failure: Rc<RefCell<Option<anyhow::Error>>> = Rc::new(RefCell::new(None));
    let loop_failure = Rc::clone(&failure);

    state.window().request_redraw();

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    tracing::info!("window closed");
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. }
                    if event.state == ElementState::Pressed
                        && matches!(event.logical_key, Key::Named(NamedKey::Escape)) =>
                {
                    tracing::info!("escape pressed; exiting");
                    elwt.exit();
                }
                WindowEvent::Resized(new_size) => {
                    state.resize(new_size);
                }
                WindowEvent::ScaleFactorChanged {
                    mut inner_size_writer,
                    ..
                } => {
                    let _ = inner_size_writer.request_inner_size(state.gpu.size());
                }
                WindowEvent::RedrawRequested => match state.render_frame(Instant::now()) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        tracing::debug!("surface lost or outdated; reconfiguring");
                        state.gpu.reconfigure();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        tracing::warn!("surface timeout; skipping frame");
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        *loop_failure.borrow_mut() = Some(anyhow!("GPU surface out of memory"));
                        elwt.exit();
                    }
                    Err(other) => {
                        tracing::warn!(error = ?other, "surface error; retrying next frame");
                    }
                },
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) {
                tracing::info!("run duration elapsed; exiting");
                elwt.exit();
                return;
            }
            if state.scheduler.ready_for_frame(now) {
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else {
                let wake = match (state.scheduler.next_deadline(), deadline) {
                    (Some(frame), Some(end)) => Some(frame.min(end)),
                    (frame, end) => frame.or(end),
                };
                match wake {
                    Some(wake) => elwt.set_control_flow(ControlFlow::WaitUntil(wake)),
                    None => elwt.set_control_flow(ControlFlow::Wait),
                }
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))?;
    let failure = failure.borrow_mut().take();
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
