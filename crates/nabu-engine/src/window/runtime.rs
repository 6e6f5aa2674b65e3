use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{GsDevice, GsInit};
use crate::render::{RenderInit, Renderer};
use crate::time::FrameClock;

use super::vblank::VblankTicker;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub gs: GsInit,
    pub render: RenderInit,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "nabu".to_string(),
            initial_size: LogicalSize::new(960.0, 768.0),
            gs: GsInit::default(),
            render: RenderInit::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs the event loop until the window closes or the app exits.
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.failure.map_or(Ok(()), Err)
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    renderer: Renderer<GsDevice<'this>>,
}

fn create_renderer(window: &Window, gs: GsInit, render: RenderInit) -> Result<Renderer<GsDevice<'_>>> {
    let device = pollster::block_on(GsDevice::new(window, gs)).context("GPU initialization failed")?;
    Ok(Renderer::new(device, render))
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    app: A,

    entry: Option<WindowEntry>,
    ticker: Option<VblankTicker>,
    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, app: A) -> Self {
        Self {
            config,
            app,
            entry: None,
            ticker: None,
            failure: None,
            exit_requested: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gs = self.config.gs.clone();
        let render = self.config.render.clone();

        let mut entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            renderer_builder: |w| create_renderer(w, gs, render),
        }
        .try_build()?;

        let app = &mut self.app;
        entry
            .with_renderer_mut(|r| app.init(r))
            .context("application init failed")?;

        self.entry = Some(entry);
        self.sync_ticker()?;
        Ok(())
    }

    /// Keeps the vblank ticker running at the current mode's refresh rate.
    fn sync_ticker(&mut self) -> Result<()> {
        let Some(entry) = self.entry.as_ref() else {
            self.ticker = None;
            return Ok(());
        };
        let (hz, signal) = entry.with_renderer(|r| (r.refresh_hz(), r.vsync_signal()));

        if self.ticker.as_ref().is_some_and(|t| t.hz() == hz) {
            return Ok(());
        }
        // Stop the old thread before a new one starts feeding the signal.
        self.ticker = None;
        self.ticker = Some(VblankTicker::spawn(signal, hz).context("failed to spawn vblank thread")?);
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(mut entry) = self.entry.take() {
            entry.with_renderer_mut(|r| r.shutdown());
        }
        self.ticker = None;
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else { return };
        let app = &mut self.app;

        let (control, lost) = entry.with_mut(|fields| {
            let time = fields.clock.tick();
            let renderer = fields.renderer;

            renderer.start_frame();
            let control = {
                let mut ctx = FrameCtx {
                    window: fields.window,
                    renderer: &mut *renderer,
                    time,
                };
                app.on_frame(&mut ctx)
            };

            fields.window.pre_present_notify();
            renderer.end_frame();

            (control, renderer.backend().is_lost())
        });

        if lost {
            self.fail(event_loop, anyhow::anyhow!("render surface lost"));
            return;
        }
        if control == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }
        // The app may have switched video modes during the frame.
        if let Err(e) = self.sync_ticker() {
            self.fail(event_loop, e);
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e.context("failed to create initial window"));
            return;
        }

        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; pacing comes from end_frame.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        let Some(entry) = self.entry.as_ref() else { return };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.exit_requested = true;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_renderer_mut(|r| r.backend_mut().resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_renderer_mut(|r| r.backend_mut().resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
