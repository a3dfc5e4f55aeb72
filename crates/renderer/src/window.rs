//! Interactive viewer: winit event loop wiring input to the camera, the
//! modulation pipeline, and the engine.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use framesink::HttpFrameSink;
use modulation::{Axis, CameraState, Modulator, PaletteState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shaderlib::{adjacent_formula, formula_by_id, ParameterUnit, ShaderConfig};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::capture::run_capture;
use crate::engine::{encode_png, Engine};
use crate::types::{resize_target, EngineOptions, FrameSnapshot};

/// Everything the viewer needs beyond the engine's own options.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub engine: EngineOptions,
    /// Length of a triggered capture, in seconds.
    pub capture_seconds: f32,
    /// Base URL of the frame-encoding service.
    pub frame_server_url: String,
    /// Spread of the parameter randomizer.
    pub randomize_spread: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            engine: EngineOptions::default(),
            capture_seconds: 5.0,
            frame_server_url: "http://localhost:3210".to_string(),
            randomize_spread: 0.4,
        }
    }
}

/// Runs the interactive window until it is closed. Blocks the calling
/// thread for the lifetime of the event loop.
pub fn run_viewer(config: ViewerConfig) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let window = WindowBuilder::new()
        .with_title("fracview")
        .with_inner_size(PhysicalSize::new(config.engine.width, config.engine.height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let size = window.inner_size();
    let mut engine = Engine::for_window(window.as_ref(), size.width, size.height)?;

    let mut shader_config = ShaderConfig::new(&config.engine.formula_id);
    shader_config.ssaa = config.engine.ssaa;

    let mut modulator = Modulator::default();
    // Default pointer mapping: horizontal motion drives the real seed,
    // vertical the imaginary one.
    modulator.bindings.bind(ParameterUnit::SeedR, Axis::X);
    modulator.bindings.bind(ParameterUnit::SeedI, Axis::Y);

    let mut camera = CameraState::default();
    let mut palettes = PaletteState::default();
    palettes.select(config.engine.palette_index);
    let mut max_iterations = config.engine.max_iterations;
    let mut rng = StdRng::from_entropy();

    let formula = formula_by_id(&shader_config.formula_id)?;
    camera.apply_defaults(formula.camera_zoom, formula.camera_offset);
    modulator.params.reset_for(formula.parameter_defaults);
    max_iterations = formula.max_iterations.unwrap_or(max_iterations);
    engine.set_active_configuration(&shader_config)?;
    tracing::info!(formula = formula.name, "viewer started");

    let start = Instant::now();
    let mut last_cursor = PhysicalPosition::new(0.0_f64, 0.0_f64);
    let mut cursor_norm = (0.5_f32, 0.5_f32);
    let mut dragging = false;

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        engine.stop();
                        elwt.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Some((width, height)) =
                            resize_target(engine.size(), (new_size.width, new_size.height))
                        {
                            engine.set_resolution(width, height);
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let (width, height) = engine.size();
                        cursor_norm = (
                            (position.x / width.max(1) as f64) as f32,
                            (position.y / height.max(1) as f64) as f32,
                        );
                        modulator.pointer.set_target(cursor_norm.0, cursor_norm.1);
                        if dragging {
                            let dx = (position.x - last_cursor.x) as f32;
                            let dy = (position.y - last_cursor.y) as f32;
                            camera.pan_pixels(dx, dy, width.min(height) as f32);
                        }
                        last_cursor = position;
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        if button == MouseButton::Left {
                            dragging = state == ElementState::Pressed;
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let scroll = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                        };
                        if scroll != 0.0 {
                            let (width, height) = engine.size();
                            let focus = camera.plane_point(
                                cursor_norm.0,
                                cursor_norm.1,
                                width as f32,
                                height as f32,
                            );
                            camera.zoom_about(focus, scroll > 0.0);
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state != ElementState::Pressed || event.repeat {
                            return;
                        }
                        match event.logical_key {
                            Key::Named(NamedKey::Space) => {
                                if modulator.paused() {
                                    modulator.resume();
                                } else {
                                    modulator.pause(camera.zoom);
                                }
                            }
                            Key::Named(NamedKey::ArrowRight) => {
                                switch_formula(
                                    1,
                                    &mut shader_config,
                                    &mut engine,
                                    &mut camera,
                                    &mut modulator,
                                    &mut max_iterations,
                                    config.engine.max_iterations,
                                );
                            }
                            Key::Named(NamedKey::ArrowLeft) => {
                                switch_formula(
                                    -1,
                                    &mut shader_config,
                                    &mut engine,
                                    &mut camera,
                                    &mut modulator,
                                    &mut max_iterations,
                                    config.engine.max_iterations,
                                );
                            }
                            Key::Named(NamedKey::ArrowUp) => palettes.step(1),
                            Key::Named(NamedKey::ArrowDown) => palettes.step(-1),
                            Key::Named(NamedKey::Home) => {
                                if let Ok(formula) = formula_by_id(&shader_config.formula_id) {
                                    camera.apply_defaults(
                                        formula.camera_zoom,
                                        formula.camera_offset,
                                    );
                                }
                            }
                            Key::Character(ref value) => match value.as_str() {
                                "r" => {
                                    modulator.params.randomize(config.randomize_spread, &mut rng);
                                }
                                "p" => palettes.randomize(&mut rng),
                                "c" => {
                                    shader_config.coloring = shader_config.coloring.stepped(1);
                                    apply_config(&mut engine, &shader_config);
                                }
                                "s" => {
                                    shader_config.ssaa = !shader_config.ssaa;
                                    apply_config(&mut engine, &shader_config);
                                }
                                "v" => {
                                    run_triggered_capture(
                                        &config,
                                        &mut engine,
                                        &mut modulator,
                                        &camera,
                                        &palettes,
                                        &shader_config,
                                        max_iterations,
                                    );
                                }
                                _ => {}
                            },
                            _ => {}
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let time = start.elapsed().as_secs_f32();
                        modulator.tick(time, camera.zoom);
                        let snapshot = FrameSnapshot {
                            camera,
                            palette: palettes.current,
                            params: &modulator.params,
                            slots: shader_config.slots,
                            max_iterations,
                            time,
                        };
                        if let Err(err) = engine.render(&snapshot) {
                            match err.downcast_ref::<wgpu::SurfaceError>() {
                                Some(wgpu::SurfaceError::Lost)
                                | Some(wgpu::SurfaceError::Outdated) => {
                                    let size = window.inner_size();
                                    engine.set_resolution(size.width, size.height);
                                    engine.reconfigure_surface();
                                }
                                Some(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("surface out of memory, exiting");
                                    elwt.exit();
                                }
                                _ => {
                                    tracing::warn!(error = %err, "frame skipped");
                                }
                            }
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}

fn apply_config(engine: &mut Engine, shader_config: &ShaderConfig) {
    // A failed rebuild keeps the previous program on screen.
    if let Err(err) = engine.set_active_configuration(shader_config) {
        tracing::error!(error = %err, "configuration rejected");
    }
}

#[allow(clippy::too_many_arguments)]
fn switch_formula(
    direction: i32,
    shader_config: &mut ShaderConfig,
    engine: &mut Engine,
    camera: &mut CameraState,
    modulator: &mut Modulator,
    max_iterations: &mut u32,
    session_max_iterations: u32,
) {
    let next = adjacent_formula(&shader_config.formula_id, direction);
    shader_config.formula_id = next.id.to_string();
    camera.apply_defaults(next.camera_zoom, next.camera_offset);
    modulator.params.reset_for(next.parameter_defaults);
    *max_iterations = next.max_iterations.unwrap_or(session_max_iterations);
    tracing::info!(formula = next.name, "formula switched");
    apply_config(engine, shader_config);
}

fn run_triggered_capture(
    config: &ViewerConfig,
    engine: &mut Engine,
    modulator: &mut Modulator,
    camera: &CameraState,
    palettes: &PaletteState,
    shader_config: &ShaderConfig,
    max_iterations: u32,
) {
    if !engine.begin_capture() {
        return;
    }
    let mut sink = match HttpFrameSink::new(&config.frame_server_url) {
        Ok(sink) => sink,
        Err(err) => {
            tracing::error!(error = %err, "frame server unavailable");
            engine.end_capture();
            return;
        }
    };
    let abort = AtomicBool::new(false);
    let result = run_capture(config.capture_seconds, &abort, &mut sink, |_, time| {
        modulator.evaluate(time, camera.zoom);
        let snapshot = FrameSnapshot {
            camera: *camera,
            palette: palettes.current,
            params: &modulator.params,
            slots: shader_config.slots,
            max_iterations,
            time,
        };
        let image = engine.render_to_image(&snapshot)?;
        encode_png(&image)
    });
    match result {
        Ok(frames) => tracing::info!(frames, "capture submitted"),
        Err(err) => tracing::error!(error = %err, "capture failed"),
    }
    engine.end_capture();
}
