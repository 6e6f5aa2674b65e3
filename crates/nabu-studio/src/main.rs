//! Nabu studio: a one-window tour of the draw layer.
//!
//! Keys: `P` PAL, `N` NTSC, `A` auto mode, `V` toggles vsync, `Esc` quits.

mod assets;

use anyhow::Result;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use nabu_engine::coords::Vec2;
use nabu_engine::core::{App, AppControl, FrameCtx};
use nabu_engine::device::GsDevice;
use nabu_engine::frame::VideoMode;
use nabu_engine::geometry::{Align, Dim};
use nabu_engine::logging::{init_logging, LoggingConfig};
use nabu_engine::paint::Rgba;
use nabu_engine::render::Renderer;
use nabu_engine::window::{Runtime, RuntimeConfig};

use assets::Assets;

const BACKDROP: Rgba = Rgba::new(0x10, 0x18, 0x30, 0x80);
const PANEL: Rgba = Rgba::new(0x20, 0x28, 0x48, 0x70);
const GRID: Rgba = Rgba::new(0x40, 0x50, 0x80, 0x80);

#[derive(Default)]
struct Studio {
    assets: Option<Assets>,
    /// Mode switch requested by a key press, applied at the next frame.
    pending_mode: Option<VideoMode>,
    toggle_vsync: bool,
}

impl App for Studio {
    fn init(&mut self, renderer: &mut Renderer<GsDevice<'_>>) -> Result<()> {
        self.assets = Some(Assets::load(renderer.textures_mut())?);
        log::info!("studio: {} textures registered", renderer.textures().texture_count());
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        if event.state != ElementState::Pressed || event.repeat {
            return AppControl::Continue;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => return AppControl::Exit,
            PhysicalKey::Code(KeyCode::KeyP) => self.pending_mode = Some(VideoMode::Pal),
            PhysicalKey::Code(KeyCode::KeyN) => self.pending_mode = Some(VideoMode::Ntsc),
            PhysicalKey::Code(KeyCode::KeyA) => self.pending_mode = Some(VideoMode::Auto),
            PhysicalKey::Code(KeyCode::KeyV) => self.toggle_vsync = true,
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let r = &mut *ctx.renderer;

        let vsync = r.vsync_enabled() ^ std::mem::take(&mut self.toggle_vsync);
        if let Some(mode) = self.pending_mode.take() {
            r.set_mode(vsync, mode);
        } else if vsync != r.vsync_enabled() {
            r.set_mode(vsync, r.video_mode());
        }

        let Some(assets) = self.assets.as_ref() else {
            return AppControl::Exit;
        };
        let t = ctx.time.elapsed;
        let (w, h) = {
            let (sw, sh) = r.screen_extents();
            (sw as f32, sh as f32)
        };

        // Backdrop and grid.
        r.draw_rect(0.0, 0.0, Align::TopLeft, Dim::Infinite, Dim::Infinite, BACKDROP);
        let mut x = 0.0;
        while x < w {
            r.draw_line(x, 0.0, x, h, GRID);
            x += 64.0;
        }

        // Clipped panel: a checkerboard sliding through a window.
        r.set_clip(40.0, 40.0, Dim::Px(240.0), Dim::Px(160.0));
        r.draw_rect(40.0, 40.0, Align::TopLeft, Dim::Px(240.0), Dim::Px(160.0), PANEL);
        let slide = (t * 0.8).sin() * 140.0;
        r.draw_pixmap(assets.checker, 160.0 + slide, 120.0, Align::Centered, Dim::Px(128.0), Dim::Px(128.0), Rgba::DEFAULT);
        r.clear_clip();

        // Palette textures: one 8-bit, two 4-bit sharing a palette.
        r.draw_pixmap(assets.plasma, 320.0, 40.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT);
        r.draw_pixmap(assets.stripes, 400.0, 40.0, Align::TopLeft, Dim::Px(64.0), Dim::Px(64.0), Rgba::DEFAULT);
        r.draw_pixmap(assets.rings, 480.0, 40.0, Align::TopLeft, Dim::Px(64.0), Dim::Px(64.0), Rgba::DEFAULT);

        // The same row, squeezed horizontally.
        r.set_aspect_ratio(0.75, 1.0);
        r.draw_pixmap(assets.plasma, 320.0, 120.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT);
        r.draw_pixmap(assets.stripes, 380.0, 120.0, Align::TopLeft, Dim::Px(64.0), Dim::Px(64.0), Rgba::DEFAULT);
        r.reset_aspect_ratio();

        // Overlay: the plasma warped into the frame's window.
        let wobble = (t * 2.0).sin() * 6.0;
        let corners = [
            Vec2::new(10.0 + wobble, 10.0),
            Vec2::new(86.0, 10.0 - wobble),
            Vec2::new(10.0, 62.0 + wobble),
            Vec2::new(86.0 - wobble, 62.0),
        ];
        r.draw_overlay_pixmap(assets.frame, 80.0, 260.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT, assets.plasma, corners);

        // Translated group drawn at half vertical shift.
        r.set_translation(320.0, 0.0);
        r.set_vertical_shift(0.5);
        r.draw_rect(0.0, 480.0, Align::TopLeft, Dim::Px(200.0), Dim::Px(96.0), Rgba::DARKER);
        r.draw_pixmap(assets.rings, 100.0, 560.0, Align::Centered, Dim::Undefined, Dim::Undefined, Rgba::new(0x80, 0x60, 0x60, 0x80));
        r.draw_line(0.0, 480.0, 200.0, 480.0, Rgba::new(0xFF, 0xFF, 0xFF, 0x80));
        r.reset_vertical_shift();
        r.set_translation(0.0, 0.0);

        // Highlight strip from the anchor to the right edge.
        r.draw_rect(0.0, h - 24.0, Align::TopLeft, Dim::Infinite, Dim::Px(24.0), Rgba::FOCUS);

        if ctx.time.frame_index % 600 == 0 {
            let (sw, sh) = r.screen_extents();
            log::debug!("studio: frame {} at {sw}x{sh}, vram epoch {}", ctx.time.frame_index, r.vram().epoch());
        }

        AppControl::Continue
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "nabu studio".to_string(),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, Studio::default())
}
