use periphery_core::{ResponseKey, Scene};
use periphery_experiment::{Display, ExperimentConfig, ExperimentError};
use periphery_render::SkiaRenderer;
use periphery_timing::{HighPrecisionTimer, Timer};
use pixels::{Pixels, SurfaceTexture};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Fullscreen, Window, WindowId},
};

const STARTUP_POLL: Duration = Duration::from_millis(16);
const STARTUP_ATTEMPTS: u32 = 300;

type DisplayResult<T> = Result<T, ExperimentError>;

/// Translates a logical key into the keys the experiment listens for.
pub fn map_key(key: &Key) -> Option<ResponseKey> {
    match key {
        Key::Named(NamedKey::Space) => Some(ResponseKey::Space),
        Key::Named(NamedKey::Enter) => Some(ResponseKey::Enter),
        Key::Named(NamedKey::Backspace) => Some(ResponseKey::Backspace),
        Key::Named(NamedKey::Escape) => Some(ResponseKey::Escape),
        Key::Character(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(' '), None) => Some(ResponseKey::Space),
                (Some(c), None) => Some(ResponseKey::letter(c)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Window state driven by the event loop between `present` and
/// `await_response` calls.
struct WindowState {
    title: String,
    monitor_width_cm: f64,
    font: Option<Vec<u8>>,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    timer: HighPrecisionTimer,
    pending: VecDeque<ResponseKey>,
    last_scene: Option<Scene>,
    close_requested: bool,
    init_error: Option<String>,
}

impl WindowState {
    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow::anyhow!("no monitor available"))?;
        let refresh_rate = monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attributes)?);

        let size = window.inner_size();
        info!(
            width = size.width,
            height = size.height,
            scale_factor = window.scale_factor(),
            refresh_hz = refresh_rate,
            "display configured"
        );

        let font = self
            .font
            .take()
            .ok_or_else(|| anyhow::anyhow!("font already consumed"))?;
        let surface = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        self.pixels = Some(Pixels::new(size.width, size.height, surface)?);
        self.renderer = Some(SkiaRenderer::new(
            size.width,
            size.height,
            self.monitor_width_cm,
            font,
        )?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn draw(&mut self, scene: &Scene) -> DisplayResult<()> {
        let (Some(pixels), Some(renderer)) = (&mut self.pixels, &mut self.renderer) else {
            return Err(ExperimentError::DisplayFailed(
                "surface not initialized".into(),
            ));
        };
        let stats = renderer
            .render_scene(scene, pixels.frame_mut(), &mut self.timer)
            .map_err(|e| ExperimentError::DisplayFailed(e.to_string()))?;
        pixels
            .render()
            .map_err(|e| ExperimentError::DisplayFailed(e.to_string()))?;
        debug!(
            glyphs = stats.glyphs,
            draw_us = stats.draw.as_micros() as u64,
            copy_us = stats.copy.as_micros() as u64,
            "frame presented"
        );
        Ok(())
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(size.width, size.height) {
                warn!("failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(size.width, size.height) {
                warn!("failed to resize buffer: {e}");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(size.width, size.height) {
                warn!("failed to resize canvas: {e}");
            }
        }
        info!(width = size.width, height = size.height, "display resized");
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.init_error.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            self.init_error = Some(e.to_string());
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("window close requested");
                self.close_requested = true;
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && !event.repeat {
                    if let Some(key) = map_key(&event.logical_key) {
                        self.pending.push_back(key);
                    }
                }
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.handle_resize(size);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(scene) = self.last_scene.clone() {
                    if let Err(e) = self.draw(&scene) {
                        warn!("redraw failed: {e}");
                    }
                }
            }
            _ => {}
        }
    }
}

/// Fullscreen window that presents scenes and collects key presses
/// synchronously by pumping the event loop.
pub struct WindowDisplay {
    event_loop: EventLoop<()>,
    state: WindowState,
}

impl WindowDisplay {
    pub fn open(config: &ExperimentConfig) -> DisplayResult<Self> {
        let font_path = &config.display.font_path;
        let font = std::fs::read(font_path).map_err(|e| {
            ExperimentError::DisplayInitFailed(format!(
                "cannot read font {}: {e}",
                font_path.display()
            ))
        })?;
        let event_loop =
            EventLoop::new().map_err(|e| ExperimentError::DisplayInitFailed(e.to_string()))?;

        let mut display = Self {
            event_loop,
            state: WindowState {
                title: config.display.title.clone(),
                monitor_width_cm: config.display.monitor_width_cm,
                font: Some(font),
                window: None,
                pixels: None,
                renderer: None,
                timer: HighPrecisionTimer::new(),
                pending: VecDeque::new(),
                last_scene: None,
                close_requested: false,
                init_error: None,
            },
        };

        for _ in 0..STARTUP_ATTEMPTS {
            if let PumpStatus::Exit(code) = display.pump(Some(STARTUP_POLL)) {
                return Err(ExperimentError::DisplayInitFailed(format!(
                    "event loop exited with code {code}"
                )));
            }
            if let Some(e) = display.state.init_error.take() {
                return Err(ExperimentError::DisplayInitFailed(e));
            }
            if display.state.window.is_some() {
                return Ok(display);
            }
        }
        Err(ExperimentError::DisplayInitFailed(
            "window was never created".into(),
        ))
    }

    fn pump(&mut self, timeout: Option<Duration>) -> PumpStatus {
        self.event_loop.pump_app_events(timeout, &mut self.state)
    }

    /// Processes queued window events and reports a close request as an
    /// abort.
    fn poll(&mut self, timeout: Option<Duration>) -> DisplayResult<()> {
        let status = self.pump(timeout);
        if self.state.close_requested || matches!(status, PumpStatus::Exit(_)) {
            return Err(ExperimentError::AbortedByUser);
        }
        Ok(())
    }
}

impl Display for WindowDisplay {
    fn present(&mut self, scene: &Scene) -> DisplayResult<()> {
        self.poll(Some(Duration::ZERO))?;
        self.state.draw(scene)?;
        self.state.last_scene = Some(scene.clone());
        self.poll(Some(Duration::ZERO))?;
        self.state.pending.clear();
        Ok(())
    }

    fn await_response(&mut self, allowed: &[ResponseKey]) -> DisplayResult<ResponseKey> {
        loop {
            while let Some(key) = self.state.pending.pop_front() {
                if allowed.contains(&key) {
                    return Ok(key);
                }
            }
            self.poll(None)?;
        }
    }
}

impl Drop for WindowDisplay {
    fn drop(&mut self) {
        if let Some(window) = &self.state.window {
            window.set_cursor_visible(true);
        }
        let stats = self.state.timer.frame_stats();
        if stats.samples > 0 {
            info!(
                frames = stats.samples,
                mean_ms = stats.average_frame_time_ns / 1e6,
                jitter_ms = stats.jitter_ns / 1e6,
                min_ms = stats.min_frame_time_ns / 1e6,
                max_ms = stats.max_frame_time_ns / 1e6,
                fps = stats.effective_fps,
                "frame timing"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_are_lowercased() {
        assert_eq!(
            map_key(&Key::Character("E".into())),
            Some(ResponseKey::Char('e'))
        );
        assert_eq!(
            map_key(&Key::Character("p".into())),
            Some(ResponseKey::Char('p'))
        );
    }

    #[test]
    fn named_keys_map_to_controls() {
        assert_eq!(map_key(&Key::Named(NamedKey::Space)), Some(ResponseKey::Space));
        assert_eq!(map_key(&Key::Named(NamedKey::Enter)), Some(ResponseKey::Enter));
        assert_eq!(
            map_key(&Key::Named(NamedKey::Backspace)),
            Some(ResponseKey::Backspace)
        );
        assert_eq!(map_key(&Key::Named(NamedKey::Escape)), Some(ResponseKey::Escape));
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        assert_eq!(map_key(&Key::Named(NamedKey::Tab)), None);
        assert_eq!(map_key(&Key::Character("ab".into())), None);
    }
}
