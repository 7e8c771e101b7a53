//! Moodscape - an audio-reactive 3D visualizer
//!
//! Pick one of three moods (Relax, Meditate, Sleep) and watch the orb and
//! backdrop pulse with the track's bass and treble.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use moodscape::audio::{AudioSystem, Preset, TapState};
use moodscape::camera::OrbitCamera;
use moodscape::cli::Args;
use moodscape::params::{AnalyserConfig, DeformParams, RenderConfig, StageLayout};
use moodscape::rendering::{DrawSlot, MeshUniforms, RenderSystem};
use moodscape::scene::Stage;

/// Pointer travel below this counts as a click, not an orbit drag (pixels)
const CLICK_SLOP_PX: f32 = 4.0;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Simulation systems
    stage: Stage,
    camera: OrbitCamera,
    audio: Option<AudioSystem>,

    // Configuration
    render_config: RenderConfig,
    analyser_config: AnalyserConfig,
    assets_dir: PathBuf,
    autoplay: Option<Preset>,

    // Per-frame scratch for the spectral snapshot
    snapshot: Vec<u8>,

    // Pointer state
    cursor: (f32, f32),
    hovered: Option<Preset>,
    dragging: bool,
    drag_travel_px: f32,

    // Time tracking
    start_time: Instant,
}

impl App {
    fn new(autoplay: Option<Preset>, assets_dir: PathBuf) -> Self {
        let layout = StageLayout::default();
        let deform_params = DeformParams::default();
        let render_config = RenderConfig::default();
        let analyser_config = AnalyserConfig::default();

        let stage = Stage::new(layout, deform_params);
        let camera = OrbitCamera::new(&render_config);
        let snapshot = vec![0u8; analyser_config.bins()];

        Self {
            window: None,
            render_system: None,
            stage,
            camera,
            audio: None,
            render_config,
            analyser_config,
            assets_dir,
            autoplay,
            snapshot,
            cursor: (0.0, 0.0),
            hovered: None,
            dragging: false,
            drag_travel_px: 0.0,
            start_time: Instant::now(),
        }
    }

    /// Bind a preset: stop the current track + tap, start the new one.
    fn select_preset(&mut self, preset: Preset) {
        // Old system drops first: stream stops, analysis thread joins
        self.audio = None;

        match AudioSystem::play(preset, self.analyser_config.clone(), &self.assets_dir) {
            Ok(system) => self.audio = Some(system),
            Err(e) => eprintln!("Could not start \"{}\": {}", preset, e),
        }
    }

    /// Render a single frame
    fn render_frame(&mut self) {
        let Some(ref render_system) = self.render_system else {
            return;
        };

        let time_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;

        // Latest spectral snapshot, if a tap is live
        let snapshot = match &self.audio {
            Some(audio) => match audio.sample_spectrum(&mut self.snapshot) {
                TapState::Ready => Some(self.snapshot.as_slice()),
                TapState::NotRunning => None,
            },
            None => None,
        };

        if let Err(e) = self.stage.update(time_ms, snapshot) {
            eprintln!("Spectrum error: {}", e);
        }

        // Re-upload the deformed meshes
        render_system.update_vertices(DrawSlot::Orb, &self.stage.orb.vertices);
        render_system.update_vertices(DrawSlot::Backdrop, &self.stage.backdrop.vertices);

        // Per-mesh uniforms
        let (view_proj, _camera_pos) = self.camera.view_proj(&self.render_config);
        let layout = &self.stage.layout;

        render_system.update_uniforms(
            DrawSlot::Orb,
            &MeshUniforms::new(view_proj * self.stage.orb_model(), layout.orb_color),
        );
        render_system.update_uniforms(
            DrawSlot::Backdrop,
            &MeshUniforms::new(view_proj * self.stage.backdrop_model(), layout.backdrop_color),
        );
        for i in 0..self.stage.boxes.len() {
            let color = if self.hovered == Some(self.stage.boxes[i].preset) {
                layout.box_hover_color
            } else {
                layout.box_color
            };
            render_system.update_uniforms(
                DrawSlot::PresetBox(i),
                &MeshUniforms::new(view_proj * self.stage.box_model(i), color),
            );
        }

        // Render
        if let Err(e) = render_system.render() {
            eprintln!("Render error: {:?}", e);
        }
    }

    /// Preset box under the pointer, if any
    fn pick_at_cursor(&self) -> Option<Preset> {
        let (origin, dir) = self
            .camera
            .screen_ray(self.cursor.0, self.cursor.1, &self.render_config);
        self.stage.pick(origin, dir)
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        // Create window
        let window_attributes = Window::default_attributes()
            .with_title("Moodscape - Audio-Reactive Visualizer")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());

        // Initialize rendering system
        let render_system =
            pollster::block_on(RenderSystem::new(Arc::clone(&window), &self.stage)).unwrap();

        println!("\nMoodscape is running!");
        println!("Click a box (or press 1/2/3) to choose Relax / Meditate / Sleep");
        println!("Drag to orbit, ESC to quit\n");

        self.window = Some(window);
        self.render_system = Some(render_system);

        if let Some(preset) = self.autoplay.take() {
            self.select_preset(preset);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::Digit1 => self.select_preset(Preset::Relax),
                KeyCode::Digit2 => self.select_preset(Preset::Meditate),
                KeyCode::Digit3 => self.select_preset(Preset::Sleep),
                _ => {}
            },
            WindowEvent::Resized(size) => {
                self.render_config.window_width = size.width;
                self.render_config.window_height = size.height;
                if let Some(render_system) = &mut self.render_system {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                let (dx, dy) = (x - self.cursor.0, y - self.cursor.1);
                self.cursor = (x, y);

                if self.dragging {
                    self.drag_travel_px += dx.abs() + dy.abs();
                    self.camera.rotate(dx, dy);
                } else {
                    self.hovered = self.pick_at_cursor();
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.dragging = true;
                    self.drag_travel_px = 0.0;
                }
                ElementState::Released => {
                    self.dragging = false;
                    // A short press is a click: pick a preset box
                    if self.drag_travel_px < CLICK_SLOP_PX {
                        if let Some(preset) = self.pick_at_cursor() {
                            self.select_preset(preset);
                        }
                    }
                }
            },
            WindowEvent::RedrawRequested => {
                self.render_frame();
            }
            _ => {}
        }
    }
}

fn main() {
    let args = Args::parse();

    println!("Moodscape - audio-reactive 3D visualizer");
    println!("Initializing systems...\n");

    let autoplay = args.parse_preset();
    let mut app = App::new(autoplay, PathBuf::from(args.assets));

    let event_loop = EventLoop::new().unwrap();
    let _ = event_loop.run_app(&mut app);
}
