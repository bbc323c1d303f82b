use cgmath::Matrix4;

use crate::camera::{Camera, OrbitCamera};

/// Where the loop is in its lifecycle. `Ready` covers the span between a
/// successful setup and the first frame; `Terminated` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Ready,
    Running,
    Terminated,
}

/// Level state of the two inputs the loop reads, sampled once per frame from
/// the window event stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    pub escape_pressed: bool,
    pub close_requested: bool,
}

impl InputSnapshot {
    /// The exit policy: stop when Escape is held down or the window has been
    /// asked to close. Written as the positive condition rather than a
    /// negated continuation guard.
    pub fn wants_exit(&self) -> bool {
        self.escape_pressed || self.close_requested
    }
}

/// Per-frame failures a sink may report. Everything else about a frame is
/// treated as infallible once the loop is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The surface needs reconfiguring; retry on the next frame.
    SurfaceLost,
    /// The device is out of memory. Unrecoverable.
    OutOfMemory,
    /// A transient failure; this frame is dropped.
    Transient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Exit,
}

/// The device-facing side of one frame: clear, bind, upload the combined
/// transform, draw the mesh, present. `GpuState` is the real implementation;
/// tests substitute a recording fake.
pub trait FrameSink {
    fn submit_frame(&mut self, transform: Matrix4<f32>) -> Result<(), FrameError>;

    /// Called after `SurfaceLost` so the sink can rebuild its surface state.
    fn reconfigure(&mut self);
}

/// The render loop core: owns the orbit camera and the frame sink, sequences
/// one frame per call, and walks `Ready → Running → Terminated`. The sink is
/// dropped exactly once, on the terminal transition, which releases every
/// device resource it owns.
pub struct FrameLoop<S: FrameSink> {
    sink: Option<S>,
    camera: OrbitCamera,
    phase: LoopPhase,
}

impl<S: FrameSink> FrameLoop<S> {
    pub fn new(sink: S, camera: OrbitCamera) -> Self {
        Self {
            sink: Some(sink),
            camera,
            phase: LoopPhase::Ready,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// The sink, while the loop is alive. `None` once terminated.
    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    /// Runs one iteration: submit a frame for the current camera state,
    /// advance the orbit, and evaluate the exit condition. A failed frame
    /// aborts the iteration before the camera advances, so animation only
    /// moves on presented frames.
    pub fn render_frame(&mut self, input: InputSnapshot) -> FrameOutcome {
        if self.phase == LoopPhase::Terminated {
            return FrameOutcome::Exit;
        }
        self.phase = LoopPhase::Running;

        let transform = self.camera.build_view_projection_matrix();
        let result = match self.sink.as_mut() {
            Some(sink) => sink.submit_frame(transform),
            None => return FrameOutcome::Exit,
        };

        match result {
            Ok(()) => self.camera.advance(),
            Err(FrameError::SurfaceLost) => {
                log::debug!("surface lost, reconfiguring");
                if let Some(sink) = self.sink.as_mut() {
                    sink.reconfigure();
                }
                return FrameOutcome::Continue;
            }
            Err(FrameError::OutOfMemory) => {
                log::error!("graphics device out of memory, shutting down");
                self.terminate();
                return FrameOutcome::Exit;
            }
            Err(FrameError::Transient) => return FrameOutcome::Continue,
        }

        if input.wants_exit() {
            self.terminate();
            return FrameOutcome::Exit;
        }
        FrameOutcome::Continue
    }

    fn terminate(&mut self) {
        self.phase = LoopPhase::Terminated;
        self.sink = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use cgmath::Deg;

    use super::*;

    #[derive(Default)]
    struct SinkLog {
        frames: usize,
        reconfigures: usize,
        releases: usize,
    }

    struct FakeSink {
        log: Rc<RefCell<SinkLog>>,
        script: Vec<Result<(), FrameError>>,
    }

    impl FakeSink {
        fn new(log: &Rc<RefCell<SinkLog>>) -> Self {
            Self {
                log: Rc::clone(log),
                script: Vec::new(),
            }
        }

        fn failing_with(log: &Rc<RefCell<SinkLog>>, errors: &[FrameError]) -> Self {
            Self {
                log: Rc::clone(log),
                script: errors.iter().map(|e| Err(*e)).collect(),
            }
        }
    }

    impl FrameSink for FakeSink {
        fn submit_frame(&mut self, _transform: Matrix4<f32>) -> Result<(), FrameError> {
            self.log.borrow_mut().frames += 1;
            if self.script.is_empty() {
                Ok(())
            } else {
                self.script.remove(0)
            }
        }

        fn reconfigure(&mut self) {
            self.log.borrow_mut().reconfigures += 1;
        }
    }

    impl Drop for FakeSink {
        fn drop(&mut self) {
            self.log.borrow_mut().releases += 1;
        }
    }

    fn demo_camera() -> OrbitCamera {
        OrbitCamera::new(Deg(45.05), 2.0, 0.1, 100.0, 0.02)
    }

    fn demo_loop(log: &Rc<RefCell<SinkLog>>) -> FrameLoop<FakeSink> {
        FrameLoop::new(FakeSink::new(log), demo_camera())
    }

    #[test]
    fn phase_walks_ready_running_terminated() {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        let mut frame_loop = demo_loop(&log);
        assert_eq!(frame_loop.phase(), LoopPhase::Ready);

        frame_loop.render_frame(InputSnapshot::default());
        assert_eq!(frame_loop.phase(), LoopPhase::Running);

        frame_loop.render_frame(InputSnapshot {
            close_requested: true,
            ..Default::default()
        });
        assert_eq!(frame_loop.phase(), LoopPhase::Terminated);
    }

    #[test]
    fn fifty_frames_orbit_one_radian() {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        let mut frame_loop = demo_loop(&log);
        for _ in 0..50 {
            assert_eq!(
                frame_loop.render_frame(InputSnapshot::default()),
                FrameOutcome::Continue
            );
        }
        assert!((frame_loop.camera().angle() - 1.0).abs() < 1e-12);
        assert_eq!(log.borrow().frames, 50);
    }

    #[test]
    fn exit_policy_matches_negated_continue_guard() {
        // The guard the original loop spelled out: keep going while the
        // escape key is up AND no close was requested.
        let continue_guard = |escape: bool, close: bool| !escape && !close;

        for escape_pressed in [false, true] {
            for close_requested in [false, true] {
                let input = InputSnapshot {
                    escape_pressed,
                    close_requested,
                };
                assert_eq!(
                    input.wants_exit(),
                    !continue_guard(escape_pressed, close_requested),
                );
            }
        }
    }

    #[test]
    fn escape_alone_terminates() {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        let mut frame_loop = demo_loop(&log);
        let outcome = frame_loop.render_frame(InputSnapshot {
            escape_pressed: true,
            close_requested: false,
        });
        assert_eq!(outcome, FrameOutcome::Exit);
        assert_eq!(frame_loop.phase(), LoopPhase::Terminated);
    }

    #[test]
    fn resources_release_exactly_once_and_only_after_termination() {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        let mut frame_loop = demo_loop(&log);

        frame_loop.render_frame(InputSnapshot::default());
        assert_eq!(log.borrow().releases, 0);

        frame_loop.render_frame(InputSnapshot {
            close_requested: true,
            ..Default::default()
        });
        assert_eq!(log.borrow().releases, 1);

        // A frame after termination is refused without touching the sink.
        assert_eq!(
            frame_loop.render_frame(InputSnapshot::default()),
            FrameOutcome::Exit
        );
        assert_eq!(log.borrow().frames, 2);
        assert_eq!(log.borrow().releases, 1);
    }

    #[test]
    fn lost_surface_reconfigures_without_advancing_the_orbit() {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        let sink = FakeSink::failing_with(&log, &[FrameError::SurfaceLost]);
        let mut frame_loop = FrameLoop::new(sink, demo_camera());

        // Even with exit requested, a failed frame aborts the iteration
        // before the exit condition is evaluated.
        let outcome = frame_loop.render_frame(InputSnapshot {
            escape_pressed: true,
            close_requested: false,
        });
        assert_eq!(outcome, FrameOutcome::Continue);
        assert_eq!(log.borrow().reconfigures, 1);
        assert_eq!(frame_loop.camera().angle(), 0.0);

        // The retried frame succeeds and the loop catches up.
        let outcome = frame_loop.render_frame(InputSnapshot::default());
        assert_eq!(outcome, FrameOutcome::Continue);
        assert!((frame_loop.camera().angle() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn out_of_memory_is_fatal() {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        let sink = FakeSink::failing_with(&log, &[FrameError::OutOfMemory]);
        let mut frame_loop = FrameLoop::new(sink, demo_camera());

        let outcome = frame_loop.render_frame(InputSnapshot::default());
        assert_eq!(outcome, FrameOutcome::Exit);
        assert_eq!(frame_loop.phase(), LoopPhase::Terminated);
        assert_eq!(log.borrow().releases, 1);
    }

    #[test]
    fn transient_failure_drops_the_frame() {
        let log = Rc::new(RefCell::new(SinkLog::default()));
        let sink = FakeSink::failing_with(&log, &[FrameError::Transient]);
        let mut frame_loop = FrameLoop::new(sink, demo_camera());

        let outcome = frame_loop.render_frame(InputSnapshot::default());
        assert_eq!(outcome, FrameOutcome::Continue);
        assert_eq!(log.borrow().reconfigures, 0);
        assert_eq!(frame_loop.camera().angle(), 0.0);
    }
}
