mod camera;
mod error;
mod frame_loop;
mod gpu;
mod mesh;
mod resources;
mod shader;
mod texture;

use std::io::Read;

use cgmath::Deg;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowBuilder},
};

use camera::OrbitCamera;
use error::{InitializationError, SetupError};
use frame_loop::{FrameLoop, FrameOutcome, InputSnapshot};
use gpu::GpuState;
use mesh::Mesh;

const WINDOW_TITLE: &str = "Pyramid";
const WINDOW_WIDTH: u32 = 1024;
const WINDOW_HEIGHT: u32 = 512;

// The projection is fixed for the process lifetime, aspect included.
const FOV_Y: Deg<f32> = Deg(45.05);
const ASPECT_RATIO: f32 = WINDOW_WIDTH as f32 / WINDOW_HEIGHT as f32;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// Radians the camera orbits per presented frame. No delta time: animation
/// speed is deliberately coupled to the achieved frame rate, like the demo
/// this reproduces.
const ORBIT_STEP: f64 = 0.02;

struct Application {
    // Declared before the window: the surface inside GpuState must be
    // released first.
    frame_loop: FrameLoop<GpuState>,
    window: Window,
    escape_pressed: bool,
    close_requested: bool,
}

impl Application {
    fn new(event_loop: &EventLoop<()>) -> Result<Self, SetupError> {
        let window = WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_resizable(true)
            .build(event_loop)
            .map_err(InitializationError::Window)?;

        let gpu = GpuState::new(&window, &Mesh::pyramid())?;
        let camera = OrbitCamera::new(FOV_Y, ASPECT_RATIO, Z_NEAR, Z_FAR, ORBIT_STEP);

        Ok(Self {
            frame_loop: FrameLoop::new(gpu, camera),
            window,
            escape_pressed: false,
            close_requested: false,
        })
    }

    fn input_snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            escape_pressed: self.escape_pressed,
            close_requested: self.close_requested,
        }
    }

    fn run(mut self, event_loop: EventLoop<()>) -> Result<(), winit::error::EventLoopError> {
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run(move |event, elwt| match event {
            // Continuous redraw: request the next frame as soon as the event
            // queue drains.
            Event::AboutToWait => self.window.request_redraw(),

            Event::WindowEvent { window_id, event } if window_id == self.window.id() => {
                match event {
                    WindowEvent::CloseRequested => self.close_requested = true,

                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                logical_key: Key::Named(NamedKey::Escape),
                                state,
                                ..
                            },
                        ..
                    } => self.escape_pressed = state == ElementState::Pressed,

                    WindowEvent::Resized(physical_size) => {
                        if let Some(gpu) = self.frame_loop.sink_mut() {
                            gpu.resize(physical_size);
                        }
                        self.window.request_redraw();
                    }

                    WindowEvent::RedrawRequested => {
                        let started = instant::Instant::now();
                        let outcome = self.frame_loop.render_frame(self.input_snapshot());
                        log::trace!("frame took {}ms", started.elapsed().as_millis());

                        if outcome == FrameOutcome::Exit {
                            elwt.exit();
                        }
                    }

                    _ => (),
                }
            }

            _ => (),
        })
    }
}

fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new().map_err(InitializationError::EventLoop)?;
    let application = Application::new(&event_loop)?;
    application
        .run(event_loop)
        .map_err(InitializationError::EventLoop)?;
    Ok(())
}

// getchar-style pause so the error stays readable when the process was
// launched from a terminal that closes with it.
fn wait_for_keypress() {
    eprintln!("press enter to quit");
    let _ = std::io::stdin().read(&mut [0u8]);
}

fn main() {
    env_logger::init();

    if let Err(error) = run() {
        eprintln!("{error:#}");
        wait_for_keypress();
        std::process::exit(-1);
    }
}
